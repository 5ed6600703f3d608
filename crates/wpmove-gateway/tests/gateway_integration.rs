use std::net::TcpListener;
use std::sync::Arc;

use async_trait::async_trait;
use wpmove_common::{Error, Result};
use wpmove_config::AppConfig;
use wpmove_db::{Credentials, MigrationStep, SiteConnection, SiteConnector, StepKind};
use wpmove_gateway::GatewayServer;

/// Pick a random available port.
fn random_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind to random port");
    listener.local_addr().unwrap().port()
}

/// Gateway on `port`, migrating databases on a port where nothing listens.
fn test_config(port: u16) -> AppConfig {
    let mut config = AppConfig::default();
    config.gateway.host = "127.0.0.1".to_string();
    config.gateway.port = port;
    config.database.host = "127.0.0.1".to_string();
    config.database.port = random_port();
    config
}

/// Pretends to be a database; optionally fails one step.
struct FakeConnector {
    fail_at: Option<StepKind>,
}

#[async_trait]
impl SiteConnector for FakeConnector {
    async fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn SiteConnection>> {
        Ok(Box::new(FakeConnection {
            fail_at: self.fail_at,
        }))
    }
}

struct FakeConnection {
    fail_at: Option<StepKind>,
}

#[async_trait]
impl SiteConnection for FakeConnection {
    async fn execute(&mut self, step: &MigrationStep) -> Result<u64> {
        if self.fail_at == Some(step.kind) {
            return Err(Error::Statement(format!("UPDATE command denied on {}", step.table)));
        }
        Ok(1)
    }

    async fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Start the gateway in the background and return its base URL.
async fn start_test_gateway(server: GatewayServer, port: u16) -> String {
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Wait for the server to be ready
    for _ in 0..50 {
        if TcpListener::bind(format!("127.0.0.1:{port}")).is_err() {
            break; // port is in use = server is up
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    format!("http://127.0.0.1:{port}")
}

fn move_form(prefix: &str) -> Vec<(&'static str, String)> {
    vec![
        ("actz", "move".to_string()),
        ("dbname", "wp_test".to_string()),
        ("dbuser", "wp".to_string()),
        ("dbpass", "secret".to_string()),
        ("fromURL", "http://old.example.com".to_string()),
        ("toURL", "https://new.example.com".to_string()),
        ("prefix", prefix.to_string()),
        ("move", "Move It!".to_string()),
    ]
}

async fn submit(base: &str, form: &[(&'static str, String)]) -> (u16, String) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/"))
        .form(form)
        .send()
        .await
        .expect("form post failed");
    let status = resp.status().as_u16();
    (status, resp.text().await.unwrap())
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let port = random_port();
    let base = start_test_gateway(GatewayServer::new(test_config(port)), port).await;

    let resp = reqwest::get(format!("{base}/health"))
        .await
        .expect("health request failed");
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn root_serves_the_input_form() {
    let port = random_port();
    let base = start_test_gateway(GatewayServer::new(test_config(port)), port).await;

    let body = reqwest::get(format!("{base}/")).await.unwrap().text().await.unwrap();
    assert!(body.contains("name=\"actz\" value=\"move\""));
    assert!(body.contains("name=\"fromURL\""));
}

#[tokio::test]
async fn unreachable_database_reports_connection_error_only() {
    let port = random_port();
    let base = start_test_gateway(GatewayServer::new(test_config(port)), port).await;

    let (status, body) = submit(&base, &move_form("")).await;

    assert_eq!(status, 200);
    assert!(body.contains("<h3>Could Not Connect:</h3>"));
    assert!(!body.contains("Moving Wordpress"));
    assert!(!body.contains("rows changed"));
    assert!(!body.contains("COMPLETE"));
}

#[tokio::test]
async fn successful_migration_ends_with_complete() {
    let port = random_port();
    let server = GatewayServer::with_connector(
        test_config(port),
        Arc::new(FakeConnector { fail_at: None }),
    );
    let base = start_test_gateway(server, port).await;

    let (status, body) = submit(&base, &move_form("wp_")).await;

    assert_eq!(status, 200);
    assert_eq!(body.matches("1 rows changed").count(), 7);
    assert!(body.contains("<b>Moving CForms Settings:</b>"));
    assert!(body.contains("<h3>COMPLETE</h3>"));
}

#[tokio::test]
async fn failed_step_stops_the_report() {
    let port = random_port();
    let server = GatewayServer::with_connector(
        test_config(port),
        Arc::new(FakeConnector {
            fail_at: Some(StepKind::PostContent),
        }),
    );
    let base = start_test_gateway(server, port).await;

    let (status, body) = submit(&base, &move_form("")).await;

    assert_eq!(status, 200);
    assert_eq!(body.matches("rows changed").count(), 2);
    assert!(body.contains("ERROR:UPDATE command denied on wp_posts"));
    assert!(!body.contains("Moving Additional Content"));
    assert!(!body.contains("COMPLETE"));
}

#[tokio::test]
async fn unknown_field_is_rejected() {
    let port = random_port();
    let base = start_test_gateway(GatewayServer::new(test_config(port)), port).await;

    let mut form = move_form("");
    form.push(("dbhost", "elsewhere".to_string()));
    let (status, body) = submit(&base, &form).await;

    assert_eq!(status, 400);
    assert!(body.contains("unknown field dbhost"));
}
