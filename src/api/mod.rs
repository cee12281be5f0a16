pub mod endpoints;
pub mod model;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::host::HostUi;
use crate::session::{SessionStore, UserInfo};
use crate::utils;

use model::{Carpool, CarpoolPayload, LoginRequest, LoginResponse, PostType,
    RefreshTokenResponse, UserStats};

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// 后端 REST 客户端
///
/// Wraps `reqwest` with the bearer-token plumbing and the status-code mapping
/// every flow relies on. A 401 on any authenticated call revokes the stored
/// token and asks the host to prompt re-login before the error surfaces.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    session: SessionStore,
    host: Arc<dyn HostUi>,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore, host: Arc<dyn HostUi>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Arc::from(config.api_base_url.trim_end_matches('/')),
            session,
            host,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        auth: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Making {} request to {}", method, url);

        let mut req = self.http.request(method, &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if auth {
            // 没有本地令牌就不必发起请求
            let token = self.session.token().ok_or_else(|| {
                tracing::error!("Auth token missing for request to {}", path);
                ApiError::TokenMissing
            })?;
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!("Network request to {} failed: {}", path, e);
            ApiError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        tracing::error!("Request to {} failed with status {}", path, status);
        match status.as_u16() {
            401 => {
                // 令牌过期或无效：撤销会话，登录接口本身除外
                self.session.revoke_token();
                if path != endpoints::LOGIN {
                    self.host.prompt_relogin();
                }
                Err(ApiError::TokenExpired)
            }
            400 => match response.json::<ErrorBody>().await.ok().and_then(|b| b.error) {
                Some(msg) => Err(ApiError::BadRequest(msg)),
                None => Err(ApiError::Status(400)),
            },
            500 => match response.json::<ErrorBody>().await.ok().and_then(|b| b.error) {
                Some(msg) => Err(ApiError::Server(msg)),
                None => Err(ApiError::Status(500)),
            },
            code => Err(ApiError::Status(code)),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        auth: bool,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, query, body, auth).await?;
        response.json().await.map_err(ApiError::Malformed)
    }

    fn page_query(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        vec![("page", page.to_string()), ("pageSize", page_size.to_string())]
    }

    // ---- 用户 ----

    /// 单次登录码交换，重试策略在 AuthService 里
    pub async fn login(&self, code: &str, profile: &UserInfo) -> Result<LoginResponse, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            code: code.to_string(),
            nick_name: profile.nick_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        })
        .expect("login request serializes");
        self.request(Method::POST, endpoints::LOGIN, &[], Some(&body), false)
            .await
    }

    pub async fn refresh_token(&self) -> Result<RefreshTokenResponse, ApiError> {
        self.request(Method::POST, endpoints::REFRESH_TOKEN, &[], None, true)
            .await
    }

    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats, ApiError> {
        let path = format!("{}/{}", endpoints::USER_STATS, user_id);
        self.request(Method::GET, &path, &[], None, false).await
    }

    // ---- 拼车帖子 ----

    pub async fn all_carpools(&self, page: u32, page_size: u32) -> Result<Vec<Carpool>, ApiError> {
        self.request(
            Method::GET,
            endpoints::ALL_CARPOOLS,
            &Self::page_query(page, page_size),
            None,
            false,
        )
        .await
    }

    pub async fn carpools_by_type(
        &self,
        post_type: PostType,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Carpool>, ApiError> {
        let path = match post_type {
            PostType::NeedCar => endpoints::NEED_CAR_CARPOOLS,
            PostType::NeedPeople => endpoints::NEED_PEOPLE_CARPOOLS,
        };
        self.request(Method::GET, path, &Self::page_query(page, page_size), None, false)
            .await
    }

    pub async fn today_carpools(&self, page: u32, page_size: u32) -> Result<Vec<Carpool>, ApiError> {
        self.request(
            Method::GET,
            endpoints::TODAY_CARPOOLS,
            &Self::page_query(page, page_size),
            None,
            false,
        )
        .await
    }

    pub async fn this_week_carpools(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Carpool>, ApiError> {
        self.request(
            Method::GET,
            endpoints::THIS_WEEK_CARPOOLS,
            &Self::page_query(page, page_size),
            None,
            false,
        )
        .await
    }

    pub async fn search_carpools(
        &self,
        search: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Carpool>, ApiError> {
        let mut query = Self::page_query(page, page_size);
        query.push(("query", search.to_string()));
        self.request(Method::GET, endpoints::SEARCH_CARPOOLS, &query, None, false)
            .await
    }

    pub async fn carpool_by_id(&self, id: &str) -> Result<Carpool, ApiError> {
        let path = format!("{}/{}", endpoints::CARPOOLS, id);
        self.request(Method::GET, &path, &[], None, false).await
    }

    pub async fn my_posts(&self, archived: bool) -> Result<Vec<Carpool>, ApiError> {
        tracing::debug!("Calling myPosts with archived={}", archived);
        self.request(
            Method::GET,
            endpoints::MY_POSTS,
            &[("archived", archived.to_string())],
            None,
            true,
        )
        .await
    }

    pub async fn create_carpool(&self, payload: &CarpoolPayload) -> Result<Carpool, ApiError> {
        let body = serde_json::to_value(payload).expect("carpool payload serializes");
        self.request(Method::POST, endpoints::CARPOOLS, &[], Some(&body), true)
            .await
    }

    pub async fn update_carpool(
        &self,
        id: &str,
        payload: &CarpoolPayload,
    ) -> Result<Value, ApiError> {
        // 出发时间在发送前重新消毒成合法 ISO 串
        let mut payload = payload.clone();
        payload.departure_time = utils::sanitize_iso(&payload.departure_time);

        let path = format!("{}/{}", endpoints::CARPOOLS, id);
        let body = serde_json::to_value(&payload).expect("carpool payload serializes");
        self.request(Method::PUT, &path, &[], Some(&body), true).await
    }

    pub async fn delete_carpool(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", endpoints::CARPOOLS, id);
        self.send(Method::DELETE, &path, &[], None, true).await?;
        Ok(())
    }
}
