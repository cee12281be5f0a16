#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use carpool_client::AppState;
use carpool_client::config::Config;
use carpool_client::error::ApiError;
use carpool_client::host::{HostUi, LoginCodeProvider, ToastKind};
use carpool_client::session::UserInfo;
use carpool_client::storage::MemoryStorage;

/// 记录所有宿主 UI 调用的测试替身
pub struct RecordingHost {
    pub toasts: Mutex<Vec<String>>,
    pub confirm_answer: AtomicBool,
    pub relogin_prompted: AtomicBool,
    pub clipboard: Mutex<Option<String>>,
}

impl RecordingHost {
    pub fn new(confirm_answer: bool) -> Arc<Self> {
        Arc::new(Self {
            toasts: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(confirm_answer),
            relogin_prompted: AtomicBool::new(false),
            clipboard: Mutex::new(None),
        })
    }

    pub fn toast_shown(&self, title: &str) -> bool {
        self.toasts.lock().unwrap().iter().any(|t| t == title)
    }
}

#[async_trait]
impl HostUi for RecordingHost {
    fn show_toast(&self, title: &str, _kind: ToastKind) {
        self.toasts.lock().unwrap().push(title.to_string());
    }

    fn show_loading(&self, _title: &str) {}

    fn hide_loading(&self) {}

    async fn confirm(&self, _title: &str, _content: &str) -> bool {
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn prompt_relogin(&self) {
        self.relogin_prompted.store(true, Ordering::SeqCst);
    }

    fn set_clipboard(&self, data: &str) {
        *self.clipboard.lock().unwrap() = Some(data.to_string());
    }
}

/// 预置登录码队列的身份服务替身
pub struct StaticCodes {
    codes: Mutex<VecDeque<String>>,
    pub calls: AtomicUsize,
}

impl StaticCodes {
    pub fn new(codes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginCodeProvider for StaticCodes {
    async fn fresh_code(&self) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::LoginCode("no more codes".to_string()))
    }
}

pub fn test_state(
    base_url: &str,
    host: Arc<RecordingHost>,
    codes: Arc<StaticCodes>,
) -> AppState {
    let config = Config {
        api_base_url: base_url.to_string(),
        ..Config::default()
    };
    AppState::new(config, Arc::new(MemoryStorage::new()), host, codes)
}

pub fn profile() -> UserInfo {
    UserInfo {
        nick_name: "滑雪的狐狸".to_string(),
        avatar_url: "https://example.com/avatar.png".to_string(),
    }
}
