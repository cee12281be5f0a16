use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod carpool;
pub mod config;
pub mod error;
pub mod host;
pub mod posts;
pub mod session;
pub mod storage;
pub mod utils;

use api::ApiClient;
use auth::AuthService;
use config::Config;
use host::{HostUi, LoginCodeProvider, UiState};
use session::SessionStore;
use storage::KvStorage;

/// 应用级共享状态，显式传给各个页面流程
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub auth: AuthService,
    pub ui: UiState,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<dyn KvStorage>,
        host: Arc<dyn HostUi>,
        codes: Arc<dyn LoginCodeProvider>,
    ) -> Self {
        let session = SessionStore::new(storage);
        let api = ApiClient::new(&config, session.clone(), host);
        let auth = AuthService::new(api.clone(), codes, &config);
        Self {
            config,
            session,
            api,
            auth,
            ui: UiState::new(),
        }
    }
}
