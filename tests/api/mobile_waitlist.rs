use serde_json::json;
use serde_json::Value;
use wiremock::matchers::any;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::create_contact;
use crate::helpers::json_body;
use crate::helpers::send_email;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_without_audience;

#[tokio::test]
async fn waitlist_ok() {
    let app = spawn_app().await;

    create_contact()
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "ct_1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;
    send_email()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "em_1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app
        .post_mobile_waitlist(&json!({"email": "valid@example.com"}))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({
            "message": "Successfully added to waitlist!",
            "email": "valid@example.com",
        })
    );

    let contact = json_body(&app.provider_requests("/audiences/aud_test/contacts").await[0]);
    assert_eq!(
        contact,
        json!({"email": "valid@example.com", "unsubscribed": false})
    );

    let email = json_body(&app.provider_requests("/emails").await[0]);
    assert_eq!(email["to"], json!(["valid@example.com"]));
    assert!(email["subject"].as_str().unwrap().contains("Swarms"));
}

#[tokio::test]
async fn waitlist_missing_email() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for (body, msg) in [
        (json!({}), "empty body"),
        (json!({"email": null}), "null email"),
        (json!({"email": ""}), "empty email"),
        (json!({"email": "   "}), "blank email"),
    ] {
        let resp = app.post_mobile_waitlist(&body).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
        assert_eq!(
            resp.json::<Value>().await.unwrap(),
            json!({"error": "Email is required"}),
            "{msg}"
        );
    }
}

#[tokio::test]
async fn waitlist_invalid_email() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for email in [
        json!("not-an-email"),
        json!("john@foo"),
        json!("@foo.com"),
        json!("john doe@foo.com"),
        json!(5),
        json!(true),
        json!({"x": 1}),
    ] {
        let resp = app.post_mobile_waitlist(&json!({ "email": email })).await;
        assert_eq!(resp.status().as_u16(), 400, "{email}");
        assert_eq!(
            resp.json::<Value>().await.unwrap(),
            json!({"error": "Invalid email format"}),
            "{email}"
        );
    }
}

#[tokio::test]
async fn waitlist_survives_provider_outage() {
    let app = spawn_app().await;

    create_contact()
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;
    send_email()
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app
        .post_mobile_waitlist(&json!({"email": "valid@example.com"}))
        .await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn waitlist_existing_contact() {
    let app = spawn_app().await;

    create_contact()
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "statusCode": 409,
            "name": "conflict",
            "message": "Contact already exists",
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;
    send_email()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app
        .post_mobile_waitlist(&json!({"email": "valid@example.com"}))
        .await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn waitlist_without_audience_only_sends_email() {
    let app = spawn_app_without_audience().await;

    send_email()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app
        .post_mobile_waitlist(&json!({"email": "valid@example.com"}))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let received = app.email_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/emails");
}

#[tokio::test]
async fn waitlist_malformed_body() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app.post_raw("/api/mobile-waitlist", "{\"email\":").await;
    assert_eq!(resp.status().as_u16(), 500);

    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["error"], "Failed to join waitlist");
    assert!(!body["details"].as_str().unwrap().is_empty());
}
