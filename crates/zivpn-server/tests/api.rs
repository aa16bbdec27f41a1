use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use zivpn_core::testing::{DirSyncBackend, RecordingController, seed_config_root};
use zivpn_core::{AppCore, Settings};
use zivpn_server::{ServerConfig, build_router};
use zivpn_traits::FixedClock;

struct TestApp {
    dir: TempDir,
    router: Router,
    backend: Arc<DirSyncBackend>,
}

fn test_app(api_key: Option<&str>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("etc");
    seed_config_root(&root).unwrap();
    if let Some(key) = api_key {
        std::fs::write(root.join("apikey"), format!("{key}\n")).unwrap();
    }

    let mut settings = Settings::with_root(&root);
    settings.paths.staging_dir = dir.path().join("staging");
    settings.paths.cron_file = dir.path().join("cron.d").join("zivpn-backup");

    let backend = Arc::new(DirSyncBackend::new(dir.path().join("remote")));
    let core = Arc::new(AppCore::with_collaborators(
        settings,
        backend.clone(),
        Arc::new(RecordingController::default()),
        Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
    ));
    let config = ServerConfig::from_core(&core).unwrap();

    TestApp {
        dir,
        router: build_router(core, &config),
        backend,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let app = test_app(Some("s3cret"));

    let (status, body) = send(&app, get("/api/users")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unauthorized");

    let request = Request::builder()
        .uri("/api/users")
        .header("X-API-Key", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/users")
        .header("X-API-Key", "s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_lifecycle() {
    let app = test_app(None);

    let (status, body) = send(
        &app,
        post("/api/user/create", json!({"password": "alice", "days": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created");
    assert_eq!(body["data"]["password"], "alice");
    assert_eq!(body["data"]["expired"], "2024-01-31");
    assert_eq!(body["data"]["domain"], "vpn.example.com");

    let (status, body) = send(
        &app,
        post("/api/user/create", json!({"password": "alice", "days": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "Conflict");

    let (status, body) = send(
        &app,
        post("/api/user/renew", json!({"password": "alice", "days": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expired"], "2024-02-10");

    let (status, body) = send(&app, get("/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([{"password": "alice", "expired": "2024-02-10", "status": "Active"}])
    );

    let (status, _) = send(&app, post("/api/user/delete", json!({"password": "alice"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post("/api/user/delete", json!({"password": "alice"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "NotFound");

    let (_, body) = send(&app, get("/api/users")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_bad_requests_are_invalid_input() {
    let app = test_app(None);

    let (status, body) = send(
        &app,
        post("/api/user/create", json!({"password": "bob", "days": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidInput");

    let request = Request::builder()
        .method("POST")
        .uri("/api/user/create")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, post("/api/restore", json!({"backup_id": "../x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "InvalidInput");
}

#[tokio::test]
async fn test_trial_user() {
    let app = test_app(None);

    let (status, body) = send(&app, post("/api/user/trial", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["password"].as_str().unwrap().starts_with("TRIAL"));
    assert_eq!(body["data"]["expired"], "2024-01-02");
}

#[tokio::test]
async fn test_backup_list_and_restore() {
    let app = test_app(None);

    let (_, body) = send(&app, get("/api/backup/list")).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(&app, post("/api/backup", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let backup_id = body["data"]["backup_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["filename"], format!("{backup_id}.zip"));

    let (_, body) = send(&app, get("/api/backup/list")).await;
    assert_eq!(body["data"][0]["id"], backup_id.as_str());
    assert_eq!(body["data"][0]["remote_id"], format!("remote-{backup_id}.zip"));

    let domain_file = app.dir.path().join("etc").join("domain");
    std::fs::write(&domain_file, "changed.example.com\n").unwrap();

    let (status, body) = send(&app, post("/api/restore", json!({"backup_id": backup_id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["failed"], 0);
    assert_eq!(
        std::fs::read_to_string(&domain_file).unwrap(),
        "vpn.example.com\n"
    );

    let (status, body) = send(&app, post("/api/restore", json!({"backup_id": "nope"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "FetchFailed");
}

#[tokio::test]
async fn test_backup_upload_failure() {
    let app = test_app(None);
    app.backend.fail_uploads("Failed to copy: quota exceeded");

    let (status, body) = send(&app, post("/api/backup", json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "UploadFailed");
    assert!(body["message"].as_str().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn test_cleanup_and_auto_backup() {
    let app = test_app(None);

    let (status, body) = send(&app, post("/api/backup/cleanup", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"deleted": 0, "failed": 0}));

    let (_, body) = send(&app, get("/api/backup/auto")).await;
    assert_eq!(body["data"]["enabled"], false);

    let (status, body) = send(&app, post("/api/backup/auto", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], true);
    assert_eq!(body["data"]["schedule"], "0 3 * * *");
    assert!(app.dir.path().join("cron.d").join("zivpn-backup").exists());
}

#[tokio::test]
async fn test_system_info() {
    let app = test_app(None);
    send(
        &app,
        post("/api/user/create", json!({"password": "alice", "days": 30})),
    )
    .await;

    let (status, body) = send(&app, get("/api/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["domain"], "vpn.example.com");
    assert_eq!(body["data"]["listen"], ":5667");
    assert_eq!(body["data"]["api_port"], 8080);
    assert_eq!(body["data"]["credential_count"], 1);
    assert_eq!(body["data"]["active_count"], 1);
}
