use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::storage::KvStorage;

/// 令牌存储键
const AUTH_TOKEN_KEY: &str = "auth_token";
/// 用户资料存储键
const USER_INFO_KEY: &str = "userInfo";
/// 用户ID存储键
const USER_ID_KEY: &str = "user_id";
/// openid 存储键
const USER_OPENID_KEY: &str = "user_openid";
/// 令牌过期时间戳存储键
const TOKEN_EXPIRY_KEY: &str = "token_expiry";

/// 用户资料（来自平台授权弹窗）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub nick_name: String,
    pub avatar_url: String,
}

/// 会话存储
///
/// A session is valid only when both the token and the user profile are
/// present. The expiry timestamp is optional; an absent expiry is treated as
/// already expired by the auth flow.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KvStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KvStorage>) -> Self {
        Self { storage }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some() && self.user_info().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.get_json(AUTH_TOKEN_KEY)
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.get_json(USER_INFO_KEY)
    }

    pub fn user_id(&self) -> Option<String> {
        self.get_json(USER_ID_KEY)
    }

    pub fn openid(&self) -> Option<String> {
        self.get_json(USER_OPENID_KEY)
    }

    /// 令牌过期时间（unix 秒）
    pub fn token_expiry(&self) -> Option<i64> {
        self.get_json(TOKEN_EXPIRY_KEY)
    }

    /// 登录成功后写入整个会话
    pub fn store_login(
        &self,
        token: &str,
        user_info: &UserInfo,
        user_id: Option<&str>,
        openid: Option<&str>,
        expiry: Option<i64>,
    ) {
        self.set_json(AUTH_TOKEN_KEY, &token);
        self.set_json(USER_INFO_KEY, user_info);
        if let Some(id) = user_id {
            self.set_json(USER_ID_KEY, &id);
        }
        if let Some(openid) = openid {
            self.set_json(USER_OPENID_KEY, &openid);
        }
        match expiry {
            Some(ts) => self.set_json(TOKEN_EXPIRY_KEY, &ts),
            None => self.storage.remove(TOKEN_EXPIRY_KEY),
        }
        tracing::info!("Session stored for {}", user_info.nick_name);
    }

    /// 刷新成功后只更新令牌和过期时间
    pub fn update_token(&self, token: &str, expiry: Option<i64>) {
        self.set_json(AUTH_TOKEN_KEY, &token);
        match expiry {
            Some(ts) => self.set_json(TOKEN_EXPIRY_KEY, &ts),
            None => self.storage.remove(TOKEN_EXPIRY_KEY),
        }
    }

    /// 401 时仅撤销令牌，保留资料供重新登录提示使用
    pub fn revoke_token(&self) {
        self.storage.remove(AUTH_TOKEN_KEY);
        self.storage.remove(TOKEN_EXPIRY_KEY);
    }

    /// 登出时清空全部会话键
    pub fn clear(&self) {
        for key in [
            AUTH_TOKEN_KEY,
            USER_INFO_KEY,
            USER_ID_KEY,
            USER_OPENID_KEY,
            TOKEN_EXPIRY_KEY,
        ] {
            self.storage.remove(key);
        }
    }

    /// 过期时间换算：优先绝对时间戳，否则由 expires_in 推算
    pub fn resolve_expiry(expiry: Option<i64>, expires_in: Option<i64>) -> Option<i64> {
        expiry.or_else(|| expires_in.map(|secs| Utc::now().timestamp() + secs))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding unreadable session key {}: {}", key, e);
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.storage.set(key, json),
            Err(e) => tracing::error!("Failed to serialize session key {}: {}", key, e),
        }
    }
}
