use thiserror::Error;

/// 客户端请求错误
///
/// The `Display` strings are part of the contract: flows match on them the same
/// way the pages match on server error messages (stale login codes, expired
/// tokens), so variants render the exact wire-level message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 发起认证请求时本地没有令牌
    #[error("AUTH_TOKEN_MISSING")]
    TokenMissing,

    /// 服务器返回 401，会话已被清除
    #[error("AUTH_TOKEN_EXPIRED")]
    TokenExpired,

    /// 400 带有后端错误消息
    #[error("{0}")]
    BadRequest(String),

    /// 500 带有后端错误消息
    #[error("SERVER_ERROR: {0}")]
    Server(String),

    /// 其余非 2xx 状态码
    #[error("API_ERROR_{0}")]
    Status(u16),

    /// 网络层失败（断网、DNS、平台超时）
    #[error("NETWORK_ERROR")]
    Network(#[source] reqwest::Error),

    /// 登录响应缺少令牌
    #[error("Login response missing token")]
    MissingToken,

    /// 响应体无法按预期结构解析
    #[error("Malformed response: {0}")]
    Malformed(#[source] reqwest::Error),

    /// 获取新登录码失败
    #[error("Failed to get fresh login code: {0}")]
    LoginCode(String),
}

impl ApiError {
    /// 登录码已被消费或无效，可换新码重试
    pub fn is_stale_login_code(&self) -> bool {
        match self {
            ApiError::BadRequest(msg) | ApiError::Server(msg) => {
                msg.contains("LOGIN_CODE_USED")
                    || msg.contains("INVALID_LOGIN_CODE")
                    || msg.contains("code been used")
            }
            _ => false,
        }
    }
}
