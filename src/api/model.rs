use serde::{Deserialize, Deserializer, Serialize};

/// 帖子类型：人找车 / 车找人
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    #[serde(rename = "needCar")]
    NeedCar,
    #[serde(rename = "needPeople")]
    NeedPeople,
}

impl PostType {
    pub fn label(&self) -> &'static str {
        match self {
            PostType::NeedCar => "人找车",
            PostType::NeedPeople => "车找人",
        }
    }
}

/// 拼车帖子（线上数据）
///
/// The backend moved from a snake_case schema to a camelCase one; aliases make
/// both generations of payloads deserialize into the same struct, replacing
/// the field-renaming adapters the pages used to carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carpool {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub wechat: String,
    #[serde(default, alias = "departure_time")]
    pub departure_time: Option<String>,
    #[serde(default, alias = "number_of_people", deserialize_with = "de_count")]
    pub number_of_people: i32,
    #[serde(default, alias = "share_fare")]
    pub share_fare: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "create_time", alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
    /// 新 schema 内嵌的发布者信息
    #[serde(default)]
    pub user: Option<EmbeddedUser>,
    /// 旧 schema 把昵称和头像平铺在帖子上
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Carpool {
    pub fn display_nickname(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.nickname.as_deref())
            .or(self.nickname.as_deref())
    }

    pub fn display_avatar(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.avatar.as_deref())
            .or(self.avatar.as_deref())
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.id.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedUser {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub openid: Option<String>,
}

/// 仍在寻找（含旧值 `active`）
pub fn is_still_looking(status: &str) -> bool {
    status == "STILL_LOOKING" || status == "active"
}

/// UI 状态名映射到后端枚举值
pub fn normalize_status(status: &str) -> String {
    match status {
        "active" => "STILL_LOOKING".to_string(),
        "found" => "FOUND".to_string(),
        other => other.to_string(),
    }
}

/// 创建/更新帖子的请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarpoolPayload {
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub content: String,
    pub wechat: String,
    pub departure_time: String,
    pub number_of_people: i32,
    pub share_fare: bool,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub code: String,
    pub nick_name: String,
    pub avatar_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    /// 绝对过期时间（unix 秒）
    #[serde(default)]
    pub expiry: Option<i64>,
    /// 相对有效期（秒）
    #[serde(default, alias = "expires_in")]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<EmbeddedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expiry: Option<i64>,
    #[serde(default, alias = "expires_in")]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub completed_count: Option<i64>,
}

// 帖子ID两代 schema 里一个是数字一个是字符串，统一成字符串
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Str(s) => s,
    })
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Int(n) => n.to_string(),
        Raw::Str(s) => s,
    }))
}

// 座位数偶尔以字符串出现，无法解析时按 0 处理
fn de_count<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => i32::try_from(n).unwrap_or(0),
        Some(Raw::Str(s)) => s.trim().parse().unwrap_or_else(|_| {
            // 混入文字时提取第一段数字
            let digits: String = s.chars().skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }),
        None => 0,
    })
}
