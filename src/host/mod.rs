use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ApiError;

/// 提示样式，对应宿主 toast 的 icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Plain,
}

/// 宿主 UI 原语
///
/// Modal dialogs, toasts, spinners and the clipboard belong to the host
/// platform; flows only trigger them as side effects through this trait.
#[async_trait]
pub trait HostUi: Send + Sync {
    fn show_toast(&self, title: &str, kind: ToastKind);
    fn show_loading(&self, title: &str);
    fn hide_loading(&self);
    /// 确认对话框，返回用户是否点了确认
    async fn confirm(&self, title: &str, content: &str) -> bool;
    /// 登录过期提示，由 401 处理路径触发
    fn prompt_relogin(&self);
    fn set_clipboard(&self, data: &str);
}

/// 一次性登录码的来源（宿主身份服务）
#[async_trait]
pub trait LoginCodeProvider: Send + Sync {
    async fn fresh_code(&self) -> Result<String, ApiError>;
}

#[derive(Debug, Default)]
struct UiFlags {
    hide_tab_bar: bool,
    selected_tab: usize,
}

/// 跨页面共享的 UI 状态
///
/// Replaces the old global app-state blackboard: the handle is passed
/// explicitly to every flow that needs to toggle the tab bar or mark the
/// selected tab.
#[derive(Clone, Default)]
pub struct UiState {
    flags: Arc<Mutex<UiFlags>>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tab_bar_hidden(&self, hidden: bool) {
        self.flags.lock().unwrap().hide_tab_bar = hidden;
    }

    pub fn tab_bar_hidden(&self) -> bool {
        self.flags.lock().unwrap().hide_tab_bar
    }

    pub fn select_tab(&self, index: usize) {
        self.flags.lock().unwrap().selected_tab = index;
    }

    pub fn selected_tab(&self) -> usize {
        self.flags.lock().unwrap().selected_tab
    }
}
