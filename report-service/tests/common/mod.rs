#![allow(dead_code)]

use report_service::config::ReportConfig;
use report_service::services::ReportStore;
use report_service::startup::Application;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub store: ReportStore,
    shutdown: CancellationToken,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(ReportConfig::default()).await
    }

    pub async fn spawn_with(mut config: ReportConfig) -> Self {
        config.common.port = 0; // Random port for testing
        // Small charts keep the suite fast
        config.chart.width_px = 400;
        config.chart.height_px = 300;

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let store = app.store().clone();
        let shutdown = app.shutdown_token();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            store,
            shutdown,
        }
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// The smallest valid request.
pub fn minimal_request() -> Value {
    json!({
        "skills": [
            {"name": "Communication", "score": 85},
            {"name": "Delegation", "score": 60}
        ]
    })
}

/// A request using every optional field.
pub fn full_request() -> Value {
    json!({
        "title": "Leadership Skills Report",
        "recipient": {
            "name": "Maria Garcia",
            "position": "Engineering Manager",
            "date": "2025-06-15"
        },
        "skills": [
            {"name": "Communication", "score": 85, "level": "advanced"},
            {"name": "Delegation", "score": 60},
            {"name": "Strategic Thinking", "score": 72},
            {"name": "Conflict Resolution", "score": 48},
            {"name": "Coaching", "score": 91}
        ],
        "overall_score": 71.2,
        "narrative": {
            "summary": "Maria communicates with clarity and coaches her team well.",
            "learning_path": "Focus on structured delegation and on mediating conflicts early."
        }
    })
}
