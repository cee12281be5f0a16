pub mod model;

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::api::model::{Carpool, CarpoolPayload, PostType, normalize_status};
use crate::error::ApiError;
use crate::host::{HostUi, ToastKind, UiState};
use crate::utils;

pub use model::{EditDraft, FormattedPost, MAX_EDIT_PEOPLE, MAX_SEATS, format_my_post, post_status};

/// 「我的发布」页签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Active,
    Archived,
}

/// 状态切换的两个 UI 选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChoice {
    /// 仍在寻找
    Active,
    /// 已找到
    Found,
}

/// 「我的发布」页面的状态胶水
///
/// Seat and status changes are applied to the local list first and persisted
/// with a detached call; a failed persist only raises a toast, the local state
/// is deliberately not rolled back (historical behavior, kept as-is).
/// Deletion is the opposite: local state changes only after the user confirms
/// AND the server accepts.
pub struct PostList {
    api: ApiClient,
    host: Arc<dyn HostUi>,
    ui: UiState,
    pub posts: Vec<FormattedPost>,
    pub active_tab: Tab,
    pub expanded_id: String,
    pub deleting_post_id: String,
    pub editing_post: Option<EditDraft>,
    pub is_loading: bool,
    pub is_submitting_edit: bool,
}

impl PostList {
    pub fn new(api: ApiClient, host: Arc<dyn HostUi>, ui: UiState) -> Self {
        Self {
            api,
            host,
            ui,
            posts: Vec::new(),
            active_tab: Tab::Active,
            expanded_id: String::new(),
            deleting_post_id: String::new(),
            editing_post: None,
            is_loading: true,
            is_submitting_edit: false,
        }
    }

    /// 拉取当前页签的帖子并格式化
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.is_loading = true;
        let archived = self.active_tab == Tab::Archived;

        match self.api.my_posts(archived).await {
            Ok(posts) => {
                // 归档页在客户端再过滤一次，把今天出发的帖子留在进行中
                let posts = if archived {
                    filter_out_today(posts)
                } else {
                    posts
                };
                self.posts = posts.iter().map(|p| format_my_post(p, archived)).collect();
                self.is_loading = false;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load posts: {}", e);
                self.posts.clear();
                self.is_loading = false;
                self.host.show_toast("加载失败", ToastKind::Error);
                Err(e)
            }
        }
    }

    pub async fn switch_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        self.active_tab = tab;
        self.expanded_id.clear();
        let _ = self.load().await;
    }

    /// 再点一次同一条收起，否则展开点中的那条
    pub fn toggle_expand(&mut self, id: &str) {
        if self.expanded_id == id {
            self.expanded_id.clear();
        } else {
            self.expanded_id = id.to_string();
        }
    }

    /// 删除：确认弹窗 → 远端删除 → 本地移除
    pub async fn delete_post(&mut self, id: &str) -> bool {
        let target = id.to_string();
        self.deleting_post_id = target.clone();

        let confirmed = self
            .host
            .confirm("确认删除", "确定要删除这条拼车信息吗？")
            .await;
        if !confirmed {
            self.deleting_post_id.clear();
            return false;
        }

        self.host.show_loading("删除中");
        match self.api.delete_carpool(&target).await {
            Ok(()) => {
                self.posts.retain(|p| p.id != target);
                self.deleting_post_id.clear();
                self.host.hide_loading();
                self.host.show_toast("已删除", ToastKind::Success);
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete post: {}", e);
                self.deleting_post_id.clear();
                self.host.hide_loading();
                self.host.show_toast("删除失败", ToastKind::Error);
                false
            }
        }
    }

    /// 座位数调整（仅车找人），乐观更新 + 后台持久化
    ///
    /// 返回后台任务句柄，便于调用方（和测试）等待持久化完成。
    pub fn update_seats(&mut self, id: &str, seats: i32) -> Option<JoinHandle<()>> {
        let seats = seats.clamp(0, MAX_SEATS);
        let (target, payload) = {
            let Some(post) = self.posts.iter_mut().find(|p| p.id == id) else {
                tracing::error!("Post not found with ID: {}", id);
                return None;
            };
            if post.post_type != PostType::NeedPeople {
                tracing::error!("Wrong post type for seat update: {:?}", post.post_type);
                return None;
            }

            self.host.show_loading("更新中");

            post.number_of_people = seats;
            let (text, class) = post_status(post.post_type, &post.status, seats, false);
            post.status_text = text;
            post.status_class = class;

            let status = normalize_status(&post.status);
            (post.id.clone(), persist_payload(post, seats, status))
        };
        let handle = self.spawn_persist(target, payload);

        self.host.hide_loading();
        self.host.show_toast("座位已更新", ToastKind::Success);
        Some(handle)
    }

    /// 状态切换（人找车），乐观更新 + 后台持久化
    pub fn update_status(&mut self, id: &str, choice: StatusChoice) -> Option<JoinHandle<()>> {
        let (status_value, text, class) = match choice {
            StatusChoice::Active => ("STILL_LOOKING", "仍在寻找", "searching"),
            StatusChoice::Found => ("FOUND", "已找到", "found"),
        };

        let (target, payload) = {
            let Some(post) = self.posts.iter_mut().find(|p| p.id == id) else {
                tracing::error!("Post not found with ID: {}", id);
                return None;
            };

            self.host.show_loading("更新中");

            post.status = status_value.to_string();
            post.status_text = text.to_string();
            post.status_class = class.to_string();

            let seats = post.number_of_people;
            (
                post.id.clone(),
                persist_payload(post, seats, status_value.to_string()),
            )
        };
        let handle = self.spawn_persist(target, payload);

        self.host.hide_loading();
        self.host.show_toast("状态已更新", ToastKind::Success);
        Some(handle)
    }

    // 持久化失败只提示，不回滚乐观状态
    fn spawn_persist(&self, id: String, payload: CarpoolPayload) -> JoinHandle<()> {
        let api = self.api.clone();
        let host = Arc::clone(&self.host);
        tokio::spawn(async move {
            if let Err(e) = api.update_carpool(&id, &payload).await {
                tracing::error!("Post update API error: {}", e);
                host.show_toast("服务器更新失败", ToastKind::Error);
            }
        })
    }

    /// 打开编辑弹窗，隐藏标签栏
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(post) = self.posts.iter().find(|p| p.id == id) else {
            tracing::error!("Post not found with ID: {}", id);
            return false;
        };
        self.editing_post = Some(EditDraft::from_post(post));
        self.ui.set_tab_bar_hidden(true);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing_post = None;
        self.ui.set_tab_bar_hidden(false);
    }

    /// 提交编辑：同步等待远端结果，成功后重新拉取列表
    pub async fn submit_edit(&mut self) -> Result<(), ApiError> {
        let Some(draft) = self.editing_post.clone() else {
            return Ok(());
        };
        if !draft.is_complete() {
            self.host.show_toast("请填写完整信息", ToastKind::Error);
            return Err(ApiError::BadRequest("请填写完整信息".to_string()));
        }

        self.is_submitting_edit = true;
        let result = self.api.update_carpool(&draft.id, &draft.to_payload()).await;
        self.is_submitting_edit = false;
        self.ui.set_tab_bar_hidden(false);

        match result {
            Ok(_) => {
                self.editing_post = None;
                self.host.show_toast("更新成功", ToastKind::Success);
                let _ = self.load().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to submit edit: {}", e);
                self.host.show_toast("更新失败", ToastKind::Error);
                Err(e)
            }
        }
    }
}

fn persist_payload(post: &FormattedPost, seats: i32, status: String) -> CarpoolPayload {
    CarpoolPayload {
        post_type: post.post_type,
        content: if post.content.is_empty() {
            "无详情".to_string()
        } else {
            post.content.clone()
        },
        wechat: post.wechat.clone(),
        departure_time: utils::format_to_iso(&post.departure_time),
        number_of_people: seats,
        share_fare: post.share_fare,
        status,
    }
}

// 归档过滤：只保留今天之前出发的帖子
fn filter_out_today(posts: Vec<Carpool>) -> Vec<Carpool> {
    let today = Utc::now().date_naive();
    let before = posts.len();
    let kept: Vec<Carpool> = posts
        .into_iter()
        .filter(|p| {
            match p.departure_time.as_deref().and_then(utils::parse_flexible) {
                Some(dt) => dt.date_naive() < today,
                None => false,
            }
        })
        .collect();
    tracing::debug!(
        "Filtered out today's posts from archived tab: {} removed",
        before - kept.len()
    );
    kept
}
