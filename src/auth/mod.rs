use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use crate::api::ApiClient;
use crate::api::model::LoginResponse;
use crate::config::Config;
use crate::error::ApiError;
use crate::host::LoginCodeProvider;
use crate::session::{SessionStore, UserInfo};

/// 登录状态检查结果
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// 会话有效（必要时已刷新）
    LoggedIn(UserInfo),
    /// 需要弹出登录框
    NeedsLogin,
    /// 已有检查在进行中，本次跳过
    Skipped,
}

/// 认证流程
///
/// Owns the token lifecycle: code exchange with the stale-code retry loop,
/// the five-minute early-expiry window, refresh, and the in-progress guard
/// that keeps overlapping checks from racing each other.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionStore,
    codes: Arc<dyn LoginCodeProvider>,
    refresh_margin_secs: i64,
    max_login_retries: u32,
    checking: Arc<AtomicBool>,
}

impl AuthService {
    pub fn new(api: ApiClient, codes: Arc<dyn LoginCodeProvider>, config: &Config) -> Self {
        let session = api.session().clone();
        Self {
            api,
            session,
            codes,
            refresh_margin_secs: config.token_refresh_margin_secs as i64,
            max_login_retries: config.login_max_retries,
            checking: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// 没有记录过期时间、或距离过期不足刷新余量时视为已过期
    pub fn is_token_expired(&self) -> bool {
        match self.session.token_expiry() {
            Some(expiry) => Utc::now().timestamp() > expiry - self.refresh_margin_secs,
            None => true,
        }
    }

    /// 登录码交换，成功后写入会话
    ///
    /// A code can be consumed by the identity provider between issuance and
    /// our exchange; on that class of error a fresh code is fetched and the
    /// call retried, at most `max_login_retries` times.
    pub async fn login(
        &self,
        code: &str,
        profile: &UserInfo,
    ) -> Result<LoginResponse, ApiError> {
        let mut code = code.to_string();
        let mut retries = 0;
        loop {
            match self.api.login(&code, profile).await {
                Ok(resp) => {
                    let Some(token) = resp.token.as_deref() else {
                        return Err(ApiError::MissingToken);
                    };
                    let expiry = SessionStore::resolve_expiry(resp.expiry, resp.expires_in);
                    let (user_id, openid) = match &resp.user {
                        Some(user) => (user.id.as_deref(), user.openid.as_deref()),
                        None => (None, None),
                    };
                    self.session
                        .store_login(token, profile, user_id, openid, expiry);
                    return Ok(resp);
                }
                Err(e) if e.is_stale_login_code() && retries < self.max_login_retries => {
                    retries += 1;
                    tracing::info!(
                        "Login code error detected, refreshing code and retrying (attempt {})",
                        retries
                    );
                    code = self.codes.fresh_code().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 用现有会话换新令牌；失败时返回 false，由调用方提示重新登录
    pub async fn refresh_token(&self) -> bool {
        if !self.is_logged_in() {
            tracing::warn!("Refresh requested without an active session");
            return false;
        }
        match self.api.refresh_token().await {
            Ok(resp) => match resp.token {
                Some(token) => {
                    let expiry = SessionStore::resolve_expiry(resp.expiry, resp.expires_in);
                    self.session.update_token(&token, expiry);
                    tracing::info!("Token refresh successful");
                    true
                }
                None => {
                    tracing::warn!("Refresh response missing token");
                    false
                }
            },
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                false
            }
        }
    }

    /// 发起认证请求前调用：未登录返回 false，快过期则先刷新
    pub async fn ensure_valid_token(&self) -> bool {
        if !self.is_logged_in() {
            return false;
        }
        if self.is_token_expired() {
            return self.refresh_token().await;
        }
        true
    }

    /// 页面 onLoad/onShow 的登录检查，带防并发守卫
    pub async fn check_login(&self) -> CheckOutcome {
        if self.checking.swap(true, Ordering::SeqCst) {
            tracing::debug!("Auth check already in progress, skipping");
            return CheckOutcome::Skipped;
        }
        let outcome = self.check_login_inner().await;
        self.checking.store(false, Ordering::SeqCst);
        outcome
    }

    async fn check_login_inner(&self) -> CheckOutcome {
        if !self.is_logged_in() {
            return CheckOutcome::NeedsLogin;
        }
        if self.is_token_expired() {
            tracing::debug!("Token is expired, attempting refresh");
            if !self.refresh_token().await {
                return CheckOutcome::NeedsLogin;
            }
        }
        match self.session.user_info() {
            Some(profile) => CheckOutcome::LoggedIn(profile),
            None => CheckOutcome::NeedsLogin,
        }
    }

    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("Session cleared");
    }
}
