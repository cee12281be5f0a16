use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::api::ApiClient;
use crate::api::model::{Carpool, CarpoolPayload, PostType};
use crate::error::ApiError;
use crate::host::{HostUi, ToastKind};
use crate::utils;

/// 浏览页的过滤维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    NeedCar,
    NeedPeople,
    Today,
    ThisWeek,
}

/// 列表展示用的帖子副本
#[derive(Debug, Clone)]
pub struct CarpoolCard {
    pub id: String,
    pub post_type: PostType,
    pub content: String,
    pub truncated_content: String,
    pub wechat: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub number_of_people: i32,
    pub share_fare: bool,
    pub status: String,
    /// `3月7日`
    pub departure_date: String,
    /// `周五`
    pub departure_weekday: String,
    pub time_ago: String,
}

/// 详情页展示用的帖子副本
#[derive(Debug, Clone)]
pub struct CarpoolDetail {
    pub id: String,
    pub post_type: PostType,
    pub content: String,
    pub wechat: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub number_of_people: i32,
    pub share_fare: bool,
    pub status: String,
    /// `3月7日 周五`
    pub departure_date: String,
    /// `15:30`
    pub departure_time_formatted: String,
    pub time_ago: String,
    /// 发布者完成拼车数，拿不到时保留占位值
    pub carpool_count: i64,
}

/// 统计数据缺席时详情页的占位拼车数
const DEFAULT_CARPOOL_COUNT: i64 = 5;

/// 待发布的表单
#[derive(Debug, Clone)]
pub struct PublishForm {
    pub post_type: PostType,
    pub content: String,
    pub wechat: String,
    pub departure_time: String,
    pub number_of_people: i32,
    pub share_fare: bool,
}

impl Default for PublishForm {
    fn default() -> Self {
        Self {
            post_type: PostType::NeedCar,
            content: String::new(),
            wechat: String::new(),
            departure_time: String::new(),
            number_of_people: 0,
            share_fare: false,
        }
    }
}

impl PublishForm {
    pub fn is_complete(&self) -> bool {
        !self.content.is_empty() && !self.wechat.is_empty()
    }

    pub fn into_payload(self) -> CarpoolPayload {
        CarpoolPayload {
            post_type: self.post_type,
            content: self.content,
            wechat: self.wechat,
            departure_time: utils::format_to_iso(&self.departure_time),
            number_of_people: self.number_of_people,
            share_fare: self.share_fare,
            status: "STILL_LOOKING".to_string(),
        }
    }
}

/// 浏览与发布流程
///
/// Listing failures degrade to an empty page instead of crashing the browse
/// UI; only publishing surfaces its error to the caller.
pub struct CarpoolService {
    api: ApiClient,
    host: Arc<dyn HostUi>,
}

impl CarpoolService {
    pub fn new(api: ApiClient, host: Arc<dyn HostUi>) -> Self {
        Self { api, host }
    }

    /// 按过滤器（或搜索词）拉取一页帖子并格式化
    pub async fn list(
        &self,
        filter: Filter,
        search: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Vec<CarpoolCard> {
        let result = match search.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => self.api.search_carpools(query, page, page_size).await,
            None => match filter {
                Filter::All => self.api.all_carpools(page, page_size).await,
                Filter::NeedCar => {
                    self.api
                        .carpools_by_type(PostType::NeedCar, page, page_size)
                        .await
                }
                Filter::NeedPeople => {
                    self.api
                        .carpools_by_type(PostType::NeedPeople, page, page_size)
                        .await
                }
                Filter::Today => self.api.today_carpools(page, page_size).await,
                Filter::ThisWeek => self.api.this_week_carpools(page, page_size).await,
            },
        };

        match result {
            Ok(items) => items.into_iter().map(format_card).collect(),
            Err(e) => {
                tracing::error!("Failed to load carpools for {:?}: {}", filter, e);
                Vec::new()
            }
        }
    }

    /// 详情页：帖子 + 发布者统计（统计失败保留占位值）
    pub async fn detail(&self, id: &str) -> Result<CarpoolDetail, ApiError> {
        let carpool = self.api.carpool_by_id(id).await?;
        let mut detail = format_detail(&carpool);

        if let Some(owner) = carpool.owner_id() {
            match self.api.user_stats(owner).await {
                Ok(stats) => {
                    if let Some(count) = stats.completed_count {
                        detail.carpool_count = count;
                    }
                }
                Err(e) => tracing::warn!("Failed to fetch user carpool stats: {}", e),
            }
        }
        Ok(detail)
    }

    pub async fn publish(&self, form: PublishForm) -> Result<Carpool, ApiError> {
        if !form.is_complete() {
            self.host.show_toast("请填写完整信息", ToastKind::Error);
            return Err(ApiError::BadRequest("请填写完整信息".to_string()));
        }
        let created = self.api.create_carpool(&form.into_payload()).await?;
        self.host.show_toast("发布成功", ToastKind::Success);
        Ok(created)
    }

    /// 复制联系方式到剪贴板
    pub fn copy_contact(&self, wechat: &str) {
        if wechat.is_empty() {
            self.host.show_toast("微信号不可用", ToastKind::Plain);
            return;
        }
        self.host.set_clipboard(wechat);
        self.host.show_toast("已复制微信号", ToastKind::Success);
    }
}

/// 列表项格式化：`3月7日` + 中文星期 + 相对时间 + 摘要
pub fn format_card(item: Carpool) -> CarpoolCard {
    let (departure_date, departure_weekday) = match item
        .departure_time
        .as_deref()
        .and_then(utils::parse_flexible)
    {
        Some(dt) => (
            format!("{}月{}日", dt.month(), dt.day()),
            utils::weekday_zh(dt).to_string(),
        ),
        None => {
            tracing::warn!("Invalid departure date in carpool {}", item.id);
            ("日期错误".to_string(), String::new())
        }
    };

    let time_ago = match item.created_at.as_deref().and_then(utils::parse_flexible) {
        Some(created) => utils::time_ago(created),
        None => utils::time_ago(Utc::now()),
    };

    CarpoolCard {
        id: item.id.clone(),
        post_type: item.post_type,
        truncated_content: utils::truncate_content(&item.content),
        nickname: item.display_nickname().map(str::to_string),
        avatar: item.display_avatar().map(str::to_string),
        content: item.content,
        wechat: item.wechat,
        number_of_people: item.number_of_people,
        share_fare: item.share_fare,
        status: item.status,
        departure_date,
        departure_weekday,
        time_ago,
    }
}

/// 详情格式化：`3月7日 周五` + `15:30`
pub fn format_detail(item: &Carpool) -> CarpoolDetail {
    let (departure_date, departure_time_formatted) = match item
        .departure_time
        .as_deref()
        .and_then(utils::parse_flexible)
    {
        Some(dt) => (
            format!("{}月{}日 {}", dt.month(), dt.day(), utils::weekday_zh(dt)),
            dt.format("%H:%M").to_string(),
        ),
        None => ("日期错误".to_string(), String::new()),
    };

    let time_ago = match item.created_at.as_deref().and_then(utils::parse_flexible) {
        Some(created) => utils::time_ago(created),
        None => "刚刚".to_string(),
    };

    CarpoolDetail {
        id: item.id.clone(),
        post_type: item.post_type,
        content: item.content.clone(),
        wechat: item.wechat.clone(),
        nickname: item.display_nickname().map(str::to_string),
        avatar: item.display_avatar().map(str::to_string),
        number_of_people: item.number_of_people,
        share_fare: item.share_fare,
        status: item.status.clone(),
        departure_date,
        departure_time_formatted,
        time_ago,
        carpool_count: DEFAULT_CARPOOL_COUNT,
    }
}
