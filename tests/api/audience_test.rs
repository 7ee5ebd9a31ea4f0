use serde_json::json;
use serde_json::Value;
use wiremock::matchers::any;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::create_contact;
use crate::helpers::json_body;
use crate::helpers::send_email;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_without_audience;

#[tokio::test]
async fn check_without_audience_fails() {
    let app = spawn_app_without_audience().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app.get_test_audience().await;
    assert_eq!(resp.status().as_u16(), 500);

    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["error"], "Audience connection test failed");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("not configured"));
}

#[tokio::test]
async fn check_lists_contacts() {
    let app = spawn_app().await;

    Mock::given(path("/audiences/aud_test/contacts"))
        .and(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "ct_1", "email": "a@b.com", "unsubscribed": false}],
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.get_test_audience().await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["message"], "Audience connection successful");
    assert_eq!(body["audienceId"], "aud_test");
    assert_eq!(body["object"], "list");
    assert_eq!(body["data"][0]["email"], "a@b.com");
}

#[tokio::test]
async fn check_surfaces_provider_errors() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "name": "restricted_api_key",
            "message": "This API key is restricted to only send emails",
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.get_test_audience().await;
    assert_eq!(resp.status().as_u16(), 500);

    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["error"], "Audience connection test failed");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("restricted to only send emails"));
}

#[tokio::test]
async fn test_email_requires_email() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app.post_test_audience(&json!({"firstName": "A"})).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"error": "Email is required"})
    );
}

#[tokio::test]
async fn test_email_defaults_names() {
    let app = spawn_app().await;

    create_contact()
        .and(body_json(json!({
            "email": "a@b.com",
            "first_name": "Test",
            "last_name": "User",
            "unsubscribed": false,
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.email_server)
        .await;
    send_email()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_test_audience(&json!({"email": "a@b.com"})).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["message"], "Test welcome email sent");
    assert_eq!(
        body["testData"],
        json!({"email": "a@b.com", "firstName": "Test", "lastName": "User"})
    );

    let email = json_body(&app.provider_requests("/emails").await[0]);
    assert!(email["html"].as_str().unwrap().contains("Hi Test,"));
}

#[tokio::test]
async fn test_email_propagates_send_failure() {
    let app = spawn_app().await;

    create_contact()
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.email_server)
        .await;
    send_email()
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "name": "validation_error",
            "message": "The swarms.world domain is not verified",
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app
        .post_test_audience(&json!({"email": "a@b.com", "firstName": "Ada"}))
        .await;
    assert_eq!(resp.status().as_u16(), 500);

    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["error"], "Welcome email test failed");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("Failed to send welcome email"), "{details}");
    assert!(details.contains("domain is not verified"), "{details}");
}
