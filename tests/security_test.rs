use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::{DatabaseConnection, EntityTrait};
use securecloud_backend::config::AppConfig;
use securecloud_backend::entities::prelude::{FileRecords, ShareGrants};
use securecloud_backend::infrastructure::database;
use securecloud_backend::services::audit::AuditService;
use securecloud_backend::services::authorization::AuthorizationService;
use securecloud_backend::services::capability::ObjectStore;
use securecloud_backend::services::verifier::{AuthError, Identity, IdentityVerifier};
use securecloud_backend::{AppState, create_app};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct StaticVerifier {
    identities: HashMap<String, Identity>,
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        self.identities.get(credential).cloned().ok_or(AuthError)
    }
}

struct MockObjectStore {
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn issue_upload_url(&self, key: &str, _content_type: &str) -> anyhow::Result<String> {
        Ok(format!("https://s3.example.com/upload/{}", key))
    }

    async fn issue_download_url(&self, key: &str) -> anyhow::Result<String> {
        Ok(format!("https://s3.example.com/download/{}", key))
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

fn identity(id: &str, email: &str, groups: &[&str]) -> Identity {
    Identity {
        id: id.to_string(),
        email: email.to_string(),
        groups: groups.iter().map(|g| g.to_string()).collect(),
    }
}

async fn setup_app(
    identities: HashMap<String, Identity>,
) -> (Router, DatabaseConnection, Arc<MockObjectStore>) {
    let mut opt = sea_orm::ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let store = Arc::new(MockObjectStore {
        deleted: Mutex::new(Vec::new()),
    });
    let verifier = Arc::new(StaticVerifier { identities });
    let audit = AuditService::new(db.clone());
    let authz = Arc::new(AuthorizationService::new(
        db.clone(),
        store.clone(),
        audit,
    ));

    let state = AppState {
        db: db.clone(),
        authz,
        verifier,
        config: AppConfig::default(),
    };

    (create_app(state), db, store)
}

fn default_identities() -> HashMap<String, Identity> {
    let mut ids = HashMap::new();
    ids.insert(
        "owner-token".to_string(),
        identity("owner-1", "owner@example.com", &["user"]),
    );
    ids.insert(
        "other-token".to_string(),
        identity("other-1", "other@example.com", &["user"]),
    );
    ids.insert(
        "friend-token".to_string(),
        identity("friend-1", "friend@example.com", &["user"]),
    );
    ids
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete_req(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn upload_file(app: &Router, token: &str, file_name: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/files/upload-url",
            token,
            &format!(
                r#"{{"fileName": "{}", "fileType": "application/pdf"}}"#,
                file_name
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["fileId"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_cross_owner_access_reads_as_not_found() {
    let (app, db, store) = setup_app(default_identities()).await;

    let file_id = upload_file(&app, "owner-token", "secret.pdf").await;

    // Download, delete, and share by a non-owner all read as 404,
    // never 403.
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/files/{}/download", file_id),
            "other-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(delete_req(&format!("/api/files/{}", file_id), "other-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/files/{}/share", file_id),
            "other-token",
            r#"{"email": "friend@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Metadata and storage object are untouched by the failed attempts.
    let record = FileRecords::find_by_id((file_id.clone(), "owner-1".to_string()))
        .one(&db)
        .await
        .unwrap();
    assert!(record.is_some());
    assert!(store.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shared_download_requires_exact_email_match() {
    let mut ids = default_identities();
    ids.insert(
        "lower-token".to_string(),
        identity("grantee-1", "a@x.com", &["user"]),
    );
    ids.insert(
        "upper-token".to_string(),
        identity("grantee-2", "A@x.com", &["user"]),
    );
    let (app, _db, _store) = setup_app(ids).await;

    let file_id = upload_file(&app, "owner-token", "cased.pdf").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/files/{}/share", file_id),
            "owner-token",
            r#"{"email": "a@x.com"}"#,
        ))
        .await
        .unwrap();
    let share_id = body_json(response).await["shareId"]
        .as_str()
        .unwrap()
        .to_string();

    // Case-sensitive comparison: "A@x.com" cannot reach a grant
    // addressed to "a@x.com".
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/shared/{}/download", share_id),
            "upper-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get(
            &format!("/api/shared/{}/download", share_id),
            "lower-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_orphaned_grant_reads_as_not_found() {
    let (app, db, _store) = setup_app(default_identities()).await;

    let file_id = upload_file(&app, "owner-token", "doomed.pdf").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/files/{}/share", file_id),
            "owner-token",
            r#"{"email": "friend@example.com"}"#,
        ))
        .await
        .unwrap();
    let share_id = body_json(response).await["shareId"]
        .as_str()
        .unwrap()
        .to_string();

    // Owner deletes the file after sharing it.
    let response = app
        .clone()
        .oneshot(delete_req(&format!("/api/files/{}", file_id), "owner-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The grant record survives in the registry...
    let grant = ShareGrants::find_by_id(share_id.clone())
        .one(&db)
        .await
        .unwrap();
    assert!(grant.is_some());

    // ...but it no longer resolves.
    let response = app
        .oneshot(get(
            &format!("/api/shared/{}/download", share_id),
            "friend-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Documents the absence of a duplicate-grant check rather than fixing it:
// repeated identical grants coexist as distinct registry rows.
#[tokio::test]
async fn test_duplicate_grants_coexist() {
    let (app, _db, _store) = setup_app(default_identities()).await;

    let file_id = upload_file(&app, "owner-token", "popular.pdf").await;

    let mut share_ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/files/{}/share", file_id),
                "owner-token",
                r#"{"email": "friend@example.com", "permission": "read"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        share_ids.push(
            body_json(response).await["shareId"]
                .as_str()
                .unwrap()
                .to_string(),
        );
    }
    assert_ne!(share_ids[0], share_ids[1]);

    let response = app
        .oneshot(get("/api/shared", "friend-token"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["shares"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _db, _store) = setup_app(default_identities()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();

    assert_eq!(
        headers.get("strict-transport-security").unwrap(),
        "max-age=31536000; includeSubDomains"
    );
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(
        headers
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("default-src 'none'")
    );
    assert_eq!(
        headers.get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
    assert_eq!(headers.get("server").unwrap(), "securecloud-backend");
    assert_eq!(
        headers.get("cache-control").unwrap(),
        "no-cache, no-store, must-revalidate"
    );
}

#[tokio::test]
async fn test_reject_trace_method() {
    let (app, _db, _store) = setup_app(default_identities()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("TRACE")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_audit_forbidden_for_non_admin_regardless_of_target() {
    let (app, _db, _store) = setup_app(default_identities()).await;

    let response = app
        .clone()
        .oneshot(get("/api/audit", "owner-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get("/api/audit?userId=owner-1", "other-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Admin only");
}
