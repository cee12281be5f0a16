use crate::api::model::{Carpool, CarpoolPayload, PostType, is_still_looking};
use crate::utils;

/// 管理页座位调节的上限（可选项 0..=4）
pub const MAX_SEATS: i32 = 4;
/// 编辑弹窗人数选择器的上限
///
/// The two paths historically disagree (4 vs 8); both constants are kept as
/// found, one per path.
pub const MAX_EDIT_PEOPLE: i32 = 8;

/// 「我的发布」列表项的展示副本
#[derive(Debug, Clone)]
pub struct FormattedPost {
    pub id: String,
    pub post_type: PostType,
    pub content: String,
    pub wechat: String,
    /// `MM-DD HH:MM`
    pub departure_time: String,
    /// `MM-DD`
    pub departure_date: String,
    pub number_of_people: i32,
    pub share_fare: bool,
    pub create_time: String,
    pub status: String,
    pub is_archived: bool,
    pub status_text: String,
    pub status_class: String,
}

/// 状态角标文案与样式类
pub fn post_status(
    post_type: PostType,
    status: &str,
    seats: i32,
    archived: bool,
) -> (String, String) {
    // 归档页一律按过期展示，不带文案
    if archived {
        return (String::new(), "expired".to_string());
    }
    match post_type {
        PostType::NeedCar => {
            if is_still_looking(status) {
                ("仍在寻找".to_string(), "searching".to_string())
            } else {
                ("已找到".to_string(), "found".to_string())
            }
        }
        PostType::NeedPeople => {
            if seats <= 0 {
                ("已满员".to_string(), "filled".to_string())
            } else {
                (format!("剩余{seats}座"), "active".to_string())
            }
        }
    }
}

/// 线上帖子转为「我的发布」展示副本
pub fn format_my_post(item: &Carpool, archived: bool) -> FormattedPost {
    let create_time = utils::format_to_locale_string(item.created_at.as_deref().unwrap_or(""));
    let departure_time =
        utils::format_to_locale_string(item.departure_time.as_deref().unwrap_or(""));
    let departure_date = departure_time
        .split(' ')
        .next()
        .unwrap_or("")
        .to_string();

    let (status_text, status_class) = post_status(
        item.post_type,
        &item.status,
        item.number_of_people,
        archived,
    );

    FormattedPost {
        id: item.id.clone(),
        post_type: item.post_type,
        content: item.content.clone(),
        wechat: item.wechat.clone(),
        departure_time,
        departure_date,
        number_of_people: item.number_of_people,
        share_fare: item.share_fare,
        create_time,
        status: item.status.clone(),
        is_archived: archived,
        status_text,
        status_class,
    }
}

/// 编辑弹窗的草稿
#[derive(Debug, Clone)]
pub struct EditDraft {
    pub id: String,
    pub post_type: PostType,
    pub content: String,
    pub wechat: String,
    /// `YYYY-MM-DD`
    pub departure_time: String,
    pub number_of_people: i32,
    pub share_fare: bool,
    pub status: String,
}

impl EditDraft {
    pub fn from_post(post: &FormattedPost) -> Self {
        Self {
            id: post.id.clone(),
            post_type: post.post_type,
            content: post.content.clone(),
            wechat: post.wechat.clone(),
            departure_time: utils::format_to_date_only(&post.departure_time),
            number_of_people: post.number_of_people.clamp(0, MAX_EDIT_PEOPLE),
            share_fare: post.share_fare,
            status: post.status.clone(),
        }
    }

    pub fn set_people(&mut self, count: i32) {
        self.number_of_people = count.clamp(0, MAX_EDIT_PEOPLE);
    }

    pub fn is_complete(&self) -> bool {
        !self.content.is_empty() && !self.wechat.is_empty()
    }

    pub fn to_payload(&self) -> CarpoolPayload {
        CarpoolPayload {
            post_type: self.post_type,
            content: self.content.clone(),
            wechat: self.wechat.clone(),
            departure_time: utils::format_to_iso(&self.departure_time),
            number_of_people: self.number_of_people,
            share_fare: self.share_fare,
            status: self.status.clone(),
        }
    }
}
