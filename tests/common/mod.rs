#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use meet_team_api::config::AppConfig;
use meet_team_api::database::schema::migrate;
use meet_team_api::database::DatabaseManager;
use meet_team_api::router::app;
use meet_team_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router served in-process on a free port, backed by a private in-memory
/// database. Lives as long as the test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

/// A registered, logged-in user
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let config = AppConfig::from_source(|key| match key {
            "MEET_TEAM_JWT" => Some(TEST_SECRET.to_string()),
            "API_ENABLE_REQUEST_LOGGING" => Some("false".to_string()),
            _ => None,
        });
        config.validate()?;

        let db = DatabaseManager::in_memory().await?;
        migrate(&db).await?;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = app(AppState::new(config, db));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
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

    /// Send a request and return status plus parsed JSON body
    pub async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, user: &TestUser, path: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, Some(&user.token), None).await
    }

    pub async fn post(&self, user: &TestUser, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(&user.token), Some(body)).await
    }

    pub async fn patch(&self, user: &TestUser, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PATCH, path, Some(&user.token), Some(body)).await
    }

    /// Register `account` (password "pw", display name = account) and log in
    pub async fn user(&self, account: &str) -> Result<TestUser> {
        let (status, body) = self
            .call(
                Method::POST,
                "/user/register",
                None,
                Some(json!({ "account": account, "password": "pw", "name": account })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);

        let (status, body) = self
            .call(
                Method::POST,
                "/user/login",
                None,
                Some(json!({ "account": account, "password": "pw" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);

        Ok(TestUser {
            id: body["data"]["user"]["id"].as_i64().context("missing user id")?,
            token: body["data"]["token"].as_str().context("missing token")?.to_string(),
        })
    }

    /// Course owned by `owner`; returns its id
    pub async fn course(&self, owner: &TestUser, name: &str) -> Result<i64> {
        let (status, body) = self
            .post(owner, "/course", json!({ "name": name, "year": 2024, "semester": 1 }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create course failed: {} {}", status, body);
        body["data"]["id"].as_i64().context("missing course id")
    }

    /// Group in `course` owned by `owner`; returns its id
    pub async fn group(&self, owner: &TestUser, course: i64, name: &str) -> Result<i64> {
        let (status, body) = self
            .post(owner, "/group", json!({ "course_id": course, "name": name }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create group failed: {} {}", status, body);
        body["data"]["id"].as_i64().context("missing group id")
    }

    pub async fn task(&self, creator: &TestUser, group: i64, name: &str) -> Result<i64> {
        let (status, body) = self
            .post(creator, "/task", json!({ "group_id": group, "name": name }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create task failed: {} {}", status, body);
        body["data"]["id"].as_i64().context("missing task id")
    }
}
