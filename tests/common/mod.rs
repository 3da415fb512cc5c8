#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use product_service::app::{self, AppState};
use product_service::config::{AppConfig, StorageBackend};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the router on a free port inside the current test runtime.
    /// The task ends with the runtime, so every test gets a fresh store.
    async fn spawn(state: AppState) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.database.backend = StorageBackend::Memory;
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.api.enable_request_logging = false;

        let listener = tokio::net::TcpListener::bind(config.server.bind_addr())
            .await
            .context("failed to bind test listener")?;
        let router = app::router(state, &config);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { port, base_url, client: reqwest::Client::new() })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a product and return the created body
    pub async fn create(&self, name: &str, category: &str, price: f64) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/products/"))
            .json(&json!({ "name": name, "category": category, "price": price }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create failed with {}", res.status());
        Ok(res.json().await?)
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppState::memory()).await
}

pub async fn spawn_server_with(state: AppState) -> Result<TestServer> {
    let server = TestServer::spawn(state).await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}
