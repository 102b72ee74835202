use axum::http::StatusCode;
use std::sync::Arc;
use tabilog::{api, init_db, Config, Repository, TravelData};
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        cors_address: None,
    };

    let app = api::create_router(api::AppState {
        repo: repo.clone(),
        config,
    });

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn seed_travel(repo: &Repository, project_id: &str, date: &str) {
    repo.create_travel(&TravelData {
        name: "Trip".to_string(),
        description: "Trip".to_string(),
        amount: 10,
        date: date.to_string(),
        category: "Misc".to_string(),
        user_id: "user1".to_string(),
        project_id: project_id.to_string(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_project_calendar_spans_and_filtering() {
    let test_app = setup_test_app().await;
    let with_travels = test_app
        .repo
        .create_project("April trip", "has travels", "user1")
        .await
        .unwrap();
    test_app
        .repo
        .create_project("Idle", "no travels", "user1")
        .await
        .unwrap();

    seed_travel(&test_app.repo, &with_travels.id, "2024-04-01").await;
    seed_travel(&test_app.repo, &with_travels.id, "2024-04-10").await;
    seed_travel(&test_app.repo, &with_travels.id, "2024-04-05").await;

    let (status, body) = get(
        test_app.app,
        "/projects/calendar/user/user1?month=2024-04",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    // Projects without dated travels in the month are filtered out.
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], with_travels.id.as_str());
    assert_eq!(entries[0]["name"], "April trip");
    assert!(entries[0]["startDate"]
        .as_str()
        .unwrap()
        .starts_with("2024-04-01"));
    assert!(entries[0]["endDate"]
        .as_str()
        .unwrap()
        .starts_with("2024-04-10"));
}

#[tokio::test]
async fn test_project_calendar_japanese_month_label() {
    let test_app = setup_test_app().await;
    let project = test_app
        .repo
        .create_project("January", "trip", "user1")
        .await
        .unwrap();
    seed_travel(&test_app.repo, &project.id, "2024-01-20").await;

    // month=2024年1月 percent-encoded.
    let (status, body) = get(
        test_app.app,
        "/projects/calendar/user/user1?month=2024%E5%B9%B41%E6%9C%88",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_project_calendar_missing_month_is_400() {
    let test_app = setup_test_app().await;

    let (status, body) = get(test_app.app, "/projects/calendar/user/user1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_project_calendar_bad_month_is_400() {
    let test_app = setup_test_app().await;
    test_app
        .repo
        .create_project("Any", "any", "user1")
        .await
        .unwrap();

    let (status, _) = get(
        test_app.app,
        "/projects/calendar/user/user1?month=invalid-month",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
