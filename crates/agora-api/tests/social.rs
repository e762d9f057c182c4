mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn follow_then_unfollow_updates_follower_count() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let bob = app.signup("b@test.com").await;
    let count_uri = format!("/followers/{}/count", alice.id);

    let (status, _) = app
        .post(&format!("/subscribe/{}", alice.id), &bob.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&count_uri, &bob.token).await;
    assert_eq!(body, json!({ "count": 1 }));

    let (_, body) = app
        .get(&format!("/following/{}/count", bob.id), &bob.token)
        .await;
    assert_eq!(body["count"], 1);

    let (status, _) = app
        .post(&format!("/unsubscribe/{}", alice.id), &bob.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&count_uri, &bob.token).await;
    assert_eq!(body, json!({ "count": 0 }));
}

#[tokio::test]
async fn follow_edges_are_not_idempotent() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let bob = app.signup("b@test.com").await;
    let subscribe = format!("/subscribe/{}", alice.id);
    let unsubscribe = format!("/unsubscribe/{}", alice.id);

    assert_eq!(app.post(&subscribe, &bob.token, json!({})).await.0, StatusCode::OK);
    let (status, body) = app.post(&subscribe, &bob.token, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You are already followed to this user");

    assert_eq!(app.post(&unsubscribe, &bob.token, json!({})).await.0, StatusCode::OK);
    assert_eq!(
        app.post(&unsubscribe, &bob.token, json!({})).await.0,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn self_follow_is_always_rejected() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;

    for action in ["subscribe", "unsubscribe"] {
        let (status, _) = app
            .post(&format!("/{action}/{}", alice.id), &alice.token, json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{action}");
    }
}

#[tokio::test]
async fn follower_listing_filters_by_online() {
    let app = TestApp::new();
    let star = app.signup("star@test.com").await;
    let fan = app.signup("fan@test.com").await;
    let lurker = app.signup("lurker@test.com").await;
    app.post(&format!("/subscribe/{}", star.id), &fan.token, json!({}))
        .await;
    app.post(&format!("/subscribe/{}", star.id), &lurker.token, json!({}))
        .await;
    app.post("/logout", &lurker.token, json!({})).await;

    let (_, all) = app.get(&format!("/followers/{}", star.id), &star.token).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, online) = app
        .get(&format!("/followers/{}?online=true", star.id), &star.token)
        .await;
    let online = online.as_array().unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0]["id"], fan.id);
    assert!(online[0].get("password").is_none());

    let (_, following) = app
        .get(&format!("/following/{}", fan.id), &fan.token)
        .await;
    assert_eq!(following[0]["id"], star.id);
}

#[tokio::test]
async fn like_then_unlike_updates_post_likes() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let bob = app.signup("b@test.com").await;
    let post = app.create_post(&alice, "Hello").await;

    let (status, _) = app
        .post(&format!("/like/{post}"), &bob.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&format!("/post/{post}"), &bob.token).await;
    assert_eq!(body["likes"].as_array().unwrap().len(), 1);
    assert_eq!(body["likes"][0]["userId"], bob.id);

    let (status, _) = app
        .post(&format!("/unlike/{post}"), &bob.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&format!("/post/{post}"), &bob.token).await;
    assert_eq!(body["likes"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn double_like_and_stray_unlike_are_conflicts() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let post = app.create_post(&alice, "Hello").await;

    app.post(&format!("/like/{post}"), &alice.token, json!({}))
        .await;
    let (status, _) = app
        .post(&format!("/like/{post}"), &alice.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.post(&format!("/unlike/{post}"), &alice.token, json!({}))
        .await;
    let (status, _) = app
        .post(&format!("/unlike/{post}"), &alice.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post("/like/4242", &alice.token, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_post_cannot_be_changed() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let bob = app.signup("b@test.com").await;
    let post = app.create_post(&alice, "Hello").await;

    let (status, body) = app.delete(&format!("/post/{post}"), &bob.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Permission denied");
    let (status, _) = app
        .put(&format!("/post/{post}"), &bob.token, json!({ "title": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(&format!("/post/{post}"), &bob.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello");

    let (status, body) = app
        .put(&format!("/post/{post}"), &alice.token, json!({ "title": "Updated" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Updated");
    assert_eq!(body["body"], "Some body text");

    let (status, _) = app.delete(&format!("/post/{post}"), &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/post/{post}"), &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_belong_to_their_sender() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let bob = app.signup("b@test.com").await;
    let post = app.create_post(&alice, "Hello").await;

    let (status, comment) = app
        .post(&format!("/comment/{post}"), &bob.token, json!({ "content": "nice" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_i64().unwrap();

    let (status, _) = app
        .put(&format!("/comment/{comment_id}"), &alice.token, json!({ "content": "edited" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/comment/{comment_id}"), &alice.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get(&format!("/post/{post}"), &alice.token).await;
    assert_eq!(body["comments"][0]["content"], "nice");

    let (status, _) = app.delete(&format!("/comment/{comment_id}"), &bob.token).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&format!("/post/{post}"), &alice.token).await;
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn feed_can_be_limited_to_followed_users() {
    let app = TestApp::new();
    let reader = app.signup("reader@test.com").await;
    let followed = app.signup("followed@test.com").await;
    let stranger = app.signup("stranger@test.com").await;
    let wanted = app.create_post(&followed, "Wanted").await;
    app.create_post(&stranger, "Noise").await;
    app.post(&format!("/subscribe/{}", followed.id), &reader.token, json!({}))
        .await;

    let (_, all) = app.get("/post/all", &reader.token).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, feed) = app.get("/post/all?onlyFollowing=true", &reader.token).await;
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["id"], wanted);

    let (_, by_owner) = app
        .get(&format!("/post/all?userId={}", stranger.id), &reader.token)
        .await;
    assert_eq!(by_owner[0]["title"], "Noise");
}

#[tokio::test]
async fn categories_attach_to_posts() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;

    let (status, rust) = app
        .post("/category", &alice.token, json!({ "name": "rust" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post("/category", &alice.token, json!({ "name": "rust" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, post) = app
        .post(
            "/post",
            &alice.token,
            json!({ "title": "Tagged", "body": "text", "categoryIds": [rust["id"]] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["categories"][0]["name"], "rust");

    let (_, all) = app.get("/category/all", &alice.token).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn uploaded_image_is_served_back() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let boundary = "agora-test-boundary";
    let image: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/image")
        .header(header::AUTHORIZATION, format!("Bearer {}", alice.token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, uploaded) = app.send(req).await;
    assert_eq!(status, StatusCode::OK, "{uploaded}");

    let url = uploaded["imageUrl"].as_str().unwrap();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let name = url.trim_start_matches("/uploads/");
    assert_eq!(std::fs::read(app.uploads.path().join(name)).unwrap(), image);

    let req = Request::builder().uri(url).body(Body::empty()).unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unsupported_image_type_is_rejected() {
    let app = TestApp::new();
    let alice = app.signup("a@test.com").await;
    let boundary = "b";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"a.gif\"\r\n\
         Content-Type: image/gif\r\n\r\nGIF89a\r\n--{boundary}--\r\n"
    );

    let req = Request::builder()
        .method(Method::POST)
        .uri("/image")
        .header(header::AUTHORIZATION, format!("Bearer {}", alice.token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad image format");
}
