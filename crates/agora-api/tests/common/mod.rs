#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use agora_api::mailer::RecordingMailer;
use agora_api::{AppStateInner, router};
use agora_db::Database;

pub const PASSWORD: &str = "secret-pass";

pub struct TestApp {
    pub app: Router,
    pub mailer: Arc<RecordingMailer>,
    pub uploads: TempDir,
}

/// A registered, confirmed and logged-in user.
pub struct Session {
    pub id: i64,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            uploads_dir: uploads.path().to_path_buf(),
            api_base: "http://localhost:3000".into(),
            frontend_host: "http://localhost:8080".into(),
            mailer: mailer.clone(),
        });
        Self {
            app: router(state),
            mailer,
            uploads,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, email: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "email": email,
                "password": PASSWORD,
                "firstName": "Test",
                "lastName": "User"
            })),
        )
        .await
    }

    /// Key from the last confirmation or recovery mail sent to `email`.
    pub fn mailed_key(&self, email: &str) -> String {
        let link = self.mailer.last_link_for(email).expect("no mail sent");
        link.rsplit('/').next().unwrap().to_string()
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register, confirm through the mailed link, and log in.
    pub async fn signup(&self, email: &str) -> Session {
        let (status, _) = self.register(email).await;
        assert_eq!(status, StatusCode::OK);

        let key = self.mailed_key(email);
        let (status, _) = self
            .request(Method::GET, &format!("/confirm/{key}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        Session {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_channel(&self, owner: &Session, tag: &str) -> String {
        let (status, body) = self
            .post("/channel", &owner.token, json!({ "name": tag, "tag": tag }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_post(&self, owner: &Session, title: &str) -> i64 {
        let (status, body) = self
            .post(
                "/post",
                &owner.token,
                json!({ "title": title, "body": "Some body text" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}
