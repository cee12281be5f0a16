use std::env;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub storage_path: String,
    pub token_refresh_margin_secs: u64,
    pub login_max_retries: u32,
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")?,
            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "carpool-session.json".to_string()),
            token_refresh_margin_secs: env::var("TOKEN_REFRESH_MARGIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            login_max_retries: env::var("LOGIN_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://localhost:3000".to_string(),
            storage_path: "carpool-session.json".to_string(),
            token_refresh_margin_secs: 300,
            login_max_retries: 2,
            page_size: 10,
        }
    }
}
