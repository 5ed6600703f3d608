use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Value};
use tracing::{debug, info};
use wpmove_common::{Error, Result};

use crate::executor::{SiteConnection, SiteConnector};
use crate::plan::MigrationStep;
use crate::request::Credentials;

/// Connects to the WordPress database over the MySQL protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

/// Connection options for `credentials`. `CLIENT_FOUND_ROWS` stays off so
/// the server reports rows whose value changed, not rows the UPDATE matched.
fn connect_opts(credentials: &Credentials) -> OptsBuilder {
    OptsBuilder::default()
        .ip_or_hostname(credentials.host.clone())
        .tcp_port(credentials.port)
        .user(Some(credentials.user.clone()))
        .pass(Some(credentials.password.clone()))
        .db_name(Some(credentials.database.clone()))
        .client_found_rows(false)
}

#[async_trait]
impl SiteConnector for MySqlConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn SiteConnection>> {
        let conn = Conn::new(connect_opts(credentials))
            .await
            .map_err(|e| Error::Connection(driver_message(&e)))?;

        info!(
            "connected to mysql database {} on {}:{}",
            credentials.database, credentials.host, credentials.port
        );
        Ok(Box::new(MySqlSiteConnection { conn }))
    }
}

pub struct MySqlSiteConnection {
    conn: Conn,
}

impl MySqlSiteConnection {
    async fn control(&mut self, sql: &str) -> Result<()> {
        self.conn
            .query_drop(sql)
            .await
            .map_err(|e| Error::Transaction(driver_message(&e)))
    }
}

#[async_trait]
impl SiteConnection for MySqlSiteConnection {
    async fn execute(&mut self, step: &MigrationStep) -> Result<u64> {
        let params: Vec<Value> = step
            .params
            .iter()
            .map(|value| Value::from(value.as_str()))
            .collect();

        self.conn
            .exec_drop(step.statement.as_str(), params)
            .await
            .map_err(|e| Error::Statement(driver_message(&e)))?;
        Ok(self.conn.affected_rows())
    }

    async fn begin(&mut self) -> Result<()> {
        self.control("START TRANSACTION").await
    }

    async fn commit(&mut self) -> Result<()> {
        self.control("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.control("ROLLBACK").await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .disconnect()
            .await
            .map_err(|e| Error::Connection(driver_message(&e)))?;
        debug!("mysql connection closed");
        Ok(())
    }
}

/// The server's own error text when there is one, so reports show what
/// MySQL said rather than the driver's wrapping.
fn driver_message(err: &mysql_async::Error) -> String {
    match err {
        mysql_async::Error::Server(server) => server.message.clone(),
        other => other.to_string(),
    }
}
