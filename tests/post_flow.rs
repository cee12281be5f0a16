mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carpool_client::posts::{PostList, StatusChoice, Tab};

use common::{profile, test_state, RecordingHost, StaticCodes};
use carpool_client::AppState;

fn fixture_posts() -> Value {
    let tomorrow = (Utc::now() + Duration::days(1)).to_rfc3339();
    json!([
        {
            "id": 1,
            "type": "needPeople",
            "content": "周六早上出发，滑雪场往返",
            "wechat": "wx-101",
            "departureTime": tomorrow,
            "numberOfPeople": 2,
            "shareFare": true,
            "status": "STILL_LOOKING",
            "createdAt": Utc::now().to_rfc3339()
        },
        {
            "id": 2,
            "type": "needCar",
            "content": "两人求带",
            "wechat": "wx-102",
            "departureTime": tomorrow,
            "numberOfPeople": 0,
            "shareFare": false,
            "status": "STILL_LOOKING",
            "createdAt": Utc::now().to_rfc3339()
        }
    ])
}

async fn mount_my_posts(server: &MockServer, archived: bool, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/carpools/user/me"))
        .and(query_param("archived", archived.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn logged_in_state(uri: &str, host: Arc<RecordingHost>) -> AppState {
    let state = test_state(uri, host, StaticCodes::new(&[]));
    state.session.store_login(
        "tok",
        &profile(),
        Some("7"),
        None,
        Some(Utc::now().timestamp() + 3600),
    );
    state
}

async fn loaded_list(state: &AppState, host: Arc<RecordingHost>) -> PostList {
    let mut list = PostList::new(state.api.clone(), host, state.ui.clone());
    list.load().await.unwrap();
    list
}

#[tokio::test]
async fn load_formats_posts_for_display() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let list = loaded_list(&state, host).await;

    assert_eq!(list.posts.len(), 2);
    assert_eq!(list.posts[0].status_text, "剩余2座");
    assert_eq!(list.posts[0].status_class, "active");
    assert_eq!(list.posts[1].status_text, "仍在寻找");
    assert!(!list.is_loading);
}

#[tokio::test]
async fn delete_without_confirmation_is_a_noop() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("DELETE"))
        .and(path("/api/carpools/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let host = RecordingHost::new(false);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host).await;

    assert!(!list.delete_post("1").await);
    assert_eq!(list.posts.len(), 2);
    assert!(list.deleting_post_id.is_empty());
}

#[tokio::test]
async fn delete_removes_post_after_confirmation() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("DELETE"))
        .and(path("/api/carpools/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    assert!(list.delete_post("1").await);
    assert_eq!(list.posts.len(), 1);
    assert_eq!(list.posts[0].id, "2");
    assert!(host.toast_shown("已删除"));
}

#[tokio::test]
async fn delete_failure_keeps_the_list() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("DELETE"))
        .and(path("/api/carpools/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    assert!(!list.delete_post("1").await);
    assert_eq!(list.posts.len(), 2);
    assert!(host.toast_shown("删除失败"));
}

#[tokio::test]
async fn seat_update_is_optimistic_and_persisted() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/1"))
        .and(body_partial_json(json!({
            "numberOfPeople": 1,
            "status": "STILL_LOOKING"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    let handle = list.update_seats("1", 1).unwrap();
    // 本地状态在请求发出前就已经更新
    assert_eq!(list.posts[0].number_of_people, 1);
    assert_eq!(list.posts[0].status_text, "剩余1座");
    assert!(host.toast_shown("座位已更新"));

    handle.await.unwrap();
}

#[tokio::test]
async fn seat_update_clamps_to_the_manage_range() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    let handle = list.update_seats("1", 9).unwrap();
    assert_eq!(list.posts[0].number_of_people, 4);
    assert_eq!(list.posts[0].status_text, "剩余4座");
    handle.await.unwrap();

    let handle = list.update_seats("1", -2).unwrap();
    assert_eq!(list.posts[0].number_of_people, 0);
    assert_eq!(list.posts[0].status_text, "已满员");
    assert_eq!(list.posts[0].status_class, "filled");
    handle.await.unwrap();
}

#[tokio::test]
async fn seat_update_only_applies_to_need_people_posts() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host).await;

    assert!(list.update_seats("2", 1).is_none());
}

#[tokio::test]
async fn persist_failure_keeps_the_optimistic_state() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    let handle = list.update_seats("1", 1).unwrap();
    handle.await.unwrap();

    // 失败只提示，本地座位数不回滚
    assert_eq!(list.posts[0].number_of_people, 1);
    assert_eq!(list.posts[0].status_text, "剩余1座");
    assert!(host.toast_shown("服务器更新失败"));
}

#[tokio::test]
async fn status_update_marks_the_post_found() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/2"))
        .and(body_partial_json(json!({ "status": "FOUND" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    let handle = list.update_status("2", StatusChoice::Found).unwrap();
    assert_eq!(list.posts[1].status, "FOUND");
    assert_eq!(list.posts[1].status_text, "已找到");
    assert_eq!(list.posts[1].status_class, "found");
    assert!(host.toast_shown("状态已更新"));

    handle.await.unwrap();
}

#[tokio::test]
async fn archived_tab_excludes_posts_departing_today() {
    let server = MockServer::start().await;
    let yesterday = (Utc::now() - Duration::days(1)).to_rfc3339();
    let today = Utc::now().to_rfc3339();
    mount_my_posts(
        &server,
        true,
        json!([
            {
                "id": 10,
                "type": "needCar",
                "content": "上周的行程",
                "wechat": "wx-10",
                "departureTime": yesterday,
                "numberOfPeople": 0,
                "status": "FOUND"
            },
            {
                "id": 11,
                "type": "needCar",
                "content": "今天出发",
                "wechat": "wx-11",
                "departureTime": today,
                "numberOfPeople": 0,
                "status": "STILL_LOOKING"
            }
        ]),
    )
    .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = PostList::new(state.api.clone(), host, state.ui.clone());
    list.active_tab = Tab::Archived;
    list.load().await.unwrap();

    assert_eq!(list.posts.len(), 1);
    assert_eq!(list.posts[0].id, "10");
    assert!(list.posts[0].is_archived);
    assert_eq!(list.posts[0].status_class, "expired");
}

#[tokio::test]
async fn edit_submit_validates_required_fields() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    assert!(list.begin_edit("1"));
    list.editing_post.as_mut().unwrap().content.clear();

    assert!(list.submit_edit().await.is_err());
    assert!(host.toast_shown("请填写完整信息"));
}

#[tokio::test]
async fn edit_submit_persists_and_reloads() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;
    Mock::given(method("PUT"))
        .and(path("/api/carpools/1"))
        .and(body_partial_json(json!({ "content": "改成周日出发" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host.clone()).await;

    assert!(list.begin_edit("1"));
    assert!(state.ui.tab_bar_hidden());
    list.editing_post.as_mut().unwrap().content = "改成周日出发".to_string();

    list.submit_edit().await.unwrap();

    assert!(list.editing_post.is_none());
    assert!(!state.ui.tab_bar_hidden());
    assert!(host.toast_shown("更新成功"));
    // 成功后重新拉取列表
    let loads = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(loads, 2);
}

#[tokio::test]
async fn cancel_edit_restores_the_tab_bar() {
    let server = MockServer::start().await;
    mount_my_posts(&server, false, fixture_posts()).await;

    let host = RecordingHost::new(true);
    let state = logged_in_state(&server.uri(), host.clone());
    let mut list = loaded_list(&state, host).await;

    assert!(list.begin_edit("1"));
    assert!(state.ui.tab_bar_hidden());
    list.cancel_edit();
    assert!(list.editing_post.is_none());
    assert!(!state.ui.tab_bar_hidden());
}
