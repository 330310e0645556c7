// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use kudos::application::LedgerService;
use kudos::http;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// A running HTTP instance bound to an ephemeral port.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    _temp: Option<TempDir>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Boot the seeded HTTP stack against a temporary file-backed database.
pub async fn spawn_app() -> Result<TestApp> {
    let (service, temp_dir) = test_service().await?;
    spawn_with(service, Some(temp_dir)).await
}

/// Boot the seeded HTTP stack against an in-memory database.
pub async fn spawn_app_in_memory() -> Result<TestApp> {
    let service = LedgerService::init_in_memory().await?;
    spawn_with(service, None).await
}

async fn spawn_with(service: LedgerService, temp: Option<TempDir>) -> Result<TestApp> {
    service.seed_demo_data().await?;

    let app = http::router(service);
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server error: {e}");
        }
    });

    Ok(TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        _temp: temp,
    })
}
