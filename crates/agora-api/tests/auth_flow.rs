mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{PASSWORD, TestApp};

#[tokio::test]
async fn register_confirm_login_then_own_channel_is_listed() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;

    let (status, _) = app
        .post("/channel", &alice.token, json!({ "name": "c", "tag": "c" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get("/channel/my", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    let channels = body.as_array().unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0]["tag"], "c");
    assert_eq!(channels[0]["owner"]["id"], alice.id);
}

#[tokio::test]
async fn login_requires_confirmation() {
    let app = TestApp::new();
    app.register("a@test.com").await;

    let (status, body) = app.login("a@test.com", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body[0]["path"], "email");
}

#[tokio::test]
async fn login_failures_are_field_errors() {
    let app = TestApp::new();
    app.signup("a@test.com").await;

    let (status, body) = app.login("nobody@test.com", PASSWORD).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body[0]["path"], "email");

    let (status, body) = app.login("a@test.com", "wrong-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!([{ "path": "password", "message": "Wrong password" }]));
}

#[tokio::test]
async fn login_marks_user_online_and_logout_clears_it() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;

    let (_, me) = app.get("/me", &alice.token).await;
    assert_eq!(me["online"], true);
    assert!(me.get("password").is_none());

    let (status, _) = app.post("/logout", &alice.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, me) = app.get("/me", &alice.token).await;
    assert_eq!(me["online"], false);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new();
    app.register("a@test.com").await;

    let (status, body) = app.register("a@test.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["path"], "email");
}

#[tokio::test]
async fn invalid_registration_lists_every_field() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "123",
                "firstName": "Al",
                "lastName": "Smith"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let paths: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"email"));
    assert!(paths.contains(&"password"));
    assert!(paths.contains(&"firstName"));
    assert!(!paths.contains(&"lastName"));
}

#[tokio::test]
async fn confirmation_key_is_single_use() {
    let app = TestApp::new();
    app.register("a@test.com").await;
    let key = app.mailed_key("a@test.com");

    let (status, body) = app
        .request(Method::POST, &format!("/confirm/{key}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ok");

    let (status, body) = app
        .request(Method::GET, &format!("/confirm/{key}"), None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid");
}

#[tokio::test]
async fn confirmation_can_be_resent_until_confirmed() {
    let app = TestApp::new();
    app.register("a@test.com").await;
    let first = app.mailed_key("a@test.com");

    let (status, _) = app
        .request(
            Method::POST,
            "/confirm",
            None,
            Some(json!({ "email": "a@test.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = app.mailed_key("a@test.com");
    assert_ne!(first, second);

    app.request(Method::GET, &format!("/confirm/{second}"), None, None)
        .await;
    let (status, body) = app
        .request(
            Method::POST,
            "/confirm",
            None,
            Some(json!({ "email": "a@test.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body[0]["message"], "Your user is confirmed already");
}

#[tokio::test]
async fn password_recovery_replaces_password() {
    let app = TestApp::new();
    app.signup("a@test.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/change-password",
            None,
            Some(json!({ "email": "a@test.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let link = app.mailer.last_link_for("a@test.com").unwrap();
    assert!(link.starts_with("http://localhost:8080/forgot-password/"));
    let key = app.mailed_key("a@test.com");

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/change-password/{key}"),
            None,
            Some(json!({ "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("a@test.com", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.login("a@test.com", "brand-new-pass").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/change-password/{key}"),
            None,
            Some(json!({ "password": "another-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body[0]["path"], "password");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/me", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_changes_only_given_fields() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;

    let (status, body) = app
        .put(
            "/user",
            &alice.token,
            json!({ "about": "hello there", "dateOfBirth": "1990-12-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["about"], "hello there");
    assert_eq!(body["dateOfBirth"], "1990-12-01");
    assert_eq!(body["firstName"], "Test");

    let (status, body) = app.get(&format!("/user/{}", alice.id), &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["about"], "hello there");
}

#[tokio::test]
async fn user_lookup_distinguishes_bad_and_missing_ids() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;

    let (status, body) = app.get("/user/abc", &alice.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad user id");

    let (status, body) = app.get("/user/999", &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = app.get("/user/all", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
