#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use roster_api::config::AppConfig;
use roster_api::database::{MemberStore, MemoryStore};
use roster_api::middleware::EditKey;
use roster_api::{app, AppState};

pub const EDIT_KEY: &str = "test-edit-key";

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn members_url(&self, event: &str) -> String {
        format!("{}/api/members/{}", self.base_url, event)
    }

    /// POST a mutation body with the configured edit key
    pub async fn mutate(&self, event: &str, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.members_url(event))
            .header("x-edit-key", EDIT_KEY)
            .json(body)
            .send()
            .await?)
    }

    pub async fn list(&self, event: &str, query: &[(&str, &str)]) -> Result<Value> {
        let res = self.client.get(self.members_url(event)).query(query).send().await?;
        anyhow::ensure!(res.status().is_success(), "list failed with {}", res.status());
        Ok(res.json().await?)
    }
}

/// Start the real router over an in-memory store on a free port. Each test
/// gets its own server so state never leaks between tests.
pub async fn spawn_server(edit_key: Option<&str>) -> Result<TestServer> {
    let mut config = AppConfig::development();
    config.security.edit_key = edit_key.and_then(EditKey::new);

    let store = Arc::new(MemoryStore::new());
    let base_url = serve(store.clone(), &config).await?;

    Ok(TestServer {
        base_url,
        store,
        client: reqwest::Client::new(),
    })
}

/// Serve the router over any store; returns the base URL
pub async fn serve(store: Arc<dyn MemberStore>, config: &AppConfig) -> Result<String> {
    let state = AppState::new(store, config)?;
    let router = app(state, config);

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://{}", addr))
}

/// Twelve members with distinct seq and power_m; two share a power value so
/// the secondary name sort is exercised.
pub fn twelve_members() -> Value {
    let rows: Vec<Value> = (1..=12)
        .map(|seq| {
            let power = if seq == 12 { 110.0 } else { seq as f64 * 10.0 };
            json!({
                "seq": seq,
                "name": format!("Member {:02}", seq),
                "power_m": power,
                "gold": seq * 100,
                "wish_slot": if seq % 2 == 0 { Value::from("front") } else { Value::Null },
                "seat": format!("S{}", seq),
                "note": null
            })
        })
        .collect();
    json!({ "upserts": rows })
}
