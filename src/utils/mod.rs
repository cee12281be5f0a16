use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// 中文星期名，索引为周日起算的天数
pub const WEEKDAYS: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

/// 宽松解析：接受 ISO-8601、`YYYY-MM-DD`、`MM-DD` 和本地化的 `MM-DD HH:MM`
///
/// The backend migrated schemas once and the display layer round-trips its own
/// formatted strings, so every historical shape has to parse.
pub fn parse_flexible(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }

    let year = Local::now().year();
    // "MM-DD"：取当前年份
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{year}-{input}"), "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    // "MM-DD HH:MM"：本地化显示格式回传
    if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{year}-{input}"), "%Y-%m-%d %H:%M") {
        return Some(dt.and_utc());
    }

    None
}

/// 格式化为本地化显示串 `MM-DD HH:MM`，无法解析时返回空串
pub fn format_to_locale_string(input: &str) -> String {
    match parse_flexible(input) {
        Some(dt) => dt.format("%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

/// 归一化为 `YYYY-MM-DD`，无法解析时返回空串
pub fn format_to_date_only(input: &str) -> String {
    let input = input.trim();
    if NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok() {
        return input.to_string();
    }
    match parse_flexible(input) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

/// 出发日期是否已过期（早于今天）
pub fn is_date_expired(input: &str) -> bool {
    match parse_flexible(input) {
        Some(dt) => dt.date_naive() < Utc::now().date_naive(),
        None => false,
    }
}

/// 转成 ISO-8601（毫秒精度，UTC），解析失败时退回当前时间
///
/// The fallback mirrors the original behavior: a bad date on an update path is
/// replaced rather than rejected, because the post already exists server-side.
pub fn format_to_iso(input: &str) -> String {
    match parse_flexible(input) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// 更新请求发送前的日期消毒：剔除非 ISO 字符后再解析
pub fn sanitize_iso(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | ':' | 'T' | '.' | 'Z'))
        .collect();
    format_to_iso(&cleaned)
}

/// 相对时间：`N天前` / `N小时前` / `N分钟前` / `刚刚`
pub fn time_ago(date: DateTime<Utc>) -> String {
    time_ago_at(date, Utc::now())
}

pub(crate) fn time_ago_at(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(date);
    if diff.num_days() > 0 {
        format!("{}天前", diff.num_days())
    } else if diff.num_hours() > 0 {
        format!("{}小时前", diff.num_hours())
    } else if diff.num_minutes() > 0 {
        format!("{}分钟前", diff.num_minutes())
    } else {
        "刚刚".to_string()
    }
}

/// 中文星期名
pub fn weekday_zh(date: DateTime<Utc>) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
}

/// 列表摘要：超过 50 字符截断并追加省略号
pub fn truncate_content(content: &str) -> String {
    const LIMIT: usize = 50;
    let count = content.chars().count();
    if count > LIMIT {
        let head: String = content.chars().take(LIMIT).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}
