//! Profile and group updates against a mock ingestion API.

use mixpanel_domain::MixpanelError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;

use support::{config_for, params, received, service, TOKEN};

#[tokio::test]
async fn profile_set_posts_engage_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/engage"))
        .and(body_json(json!([{
            "$token": TOKEN,
            "$distinct_id": "u1",
            "$set": {"name": "John"},
            "$ip": "1.2.3.4",
            "$ignore_time": true
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = service(&config_for(&server));
    let items = service
        .execute(
            "profile",
            "set",
            &params(json!({
                "distinct_id": "u1",
                "properties": "{\"name\": \"John\", \"nickname\": \"\"}",
                "ip": "1.2.3.4",
                "ignore_time": true
            })),
        )
        .await
        .expect("profile set should succeed");

    assert_eq!(items, vec![json!({"success": true})]);
}

#[tokio::test]
async fn profile_delete_sends_null_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/engage"))
        .and(body_json(json!([{"$token": TOKEN, "$distinct_id": "u1", "$delete": "null"}])))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = service(&config_for(&server));
    service
        .execute("profile", "delete", &params(json!({"distinct_id": "u1"})))
        .await
        .expect("profile delete should succeed");
}

#[tokio::test]
async fn group_union_posts_groups_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/groups"))
        .and(body_json(json!([{
            "$token": TOKEN,
            "$group_key": "company",
            "$group_id": "acme",
            "$union": {"plans": ["pro"]}
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = service(&config_for(&server));
    service
        .execute(
            "group",
            "union",
            &params(json!({
                "group_key": "company",
                "group_id": "acme",
                "properties": {"plans": ["pro"]}
            })),
        )
        .await
        .expect("group union should succeed");
}

#[tokio::test]
async fn malformed_payload_fails_before_any_request() {
    let server = MockServer::start().await;

    let mut service = service(&config_for(&server));
    let err = service
        .execute(
            "profile",
            "add",
            &params(json!({"distinct_id": "u1", "properties": {"visits": "one"}})),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MixpanelError::InvalidPayload { field, .. } if field == "$add"));
    assert!(received(&server).await.is_empty());
}

#[tokio::test]
async fn group_add_is_not_an_operation() {
    let server = MockServer::start().await;

    let mut service = service(&config_for(&server));
    let err = service.execute("group", "add", &params(json!({}))).await.unwrap_err();

    assert_eq!(
        err,
        MixpanelError::UnknownOperation { resource: "group".into(), operation: "add".into() }
    );
}
