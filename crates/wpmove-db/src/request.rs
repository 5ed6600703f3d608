use std::fmt;

use wpmove_common::Result;
use wpmove_security::InputValidator;

/// Database name and account supplied with a migration.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseLogin {
    pub name: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseLogin")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the driver needs to open a connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One validated migration: where to connect and which URL to rewrite into
/// which. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    login: DatabaseLogin,
    from_url: String,
    to_url: String,
    table_prefix: String,
}

impl MigrationRequest {
    /// Validate and assemble a request. A blank `table_prefix` resolves to
    /// `wp_`.
    pub fn new(login: DatabaseLogin, from_url: &str, to_url: &str, table_prefix: &str) -> Result<Self> {
        let login = DatabaseLogin {
            name: InputValidator::require_text("dbname", &login.name)?,
            user: InputValidator::require_text("dbuser", &login.user)?,
            password: login.password,
        };

        Ok(Self {
            login,
            from_url: InputValidator::require_text("fromURL", from_url)?,
            to_url: InputValidator::require_text("toURL", to_url)?,
            table_prefix: InputValidator::validate_table_prefix(table_prefix)?,
        })
    }

    pub fn login(&self) -> &DatabaseLogin {
        &self.login
    }

    pub fn from_url(&self) -> &str {
        &self.from_url
    }

    pub fn to_url(&self) -> &str {
        &self.to_url
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    pub fn credentials(&self, host: &str, port: u16) -> Credentials {
        Credentials {
            host: host.to_string(),
            port,
            database: self.login.name.clone(),
            user: self.login.user.clone(),
            password: self.login.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> DatabaseLogin {
        DatabaseLogin {
            name: "wp_test".into(),
            user: "wp".into(),
            password: "s3cret".into(),
        }
    }

    #[test]
    fn empty_prefix_defaults_to_wp() {
        let request = MigrationRequest::new(login(), "http://a.com", "http://b.com", "").unwrap();
        assert_eq!(request.table_prefix(), "wp_");
        assert_eq!(request.from_url(), "http://a.com");
        assert_eq!(request.to_url(), "http://b.com");
    }

    #[test]
    fn rejects_missing_urls_and_bad_prefix() {
        assert!(MigrationRequest::new(login(), "", "http://b.com", "wp_").is_err());
        assert!(MigrationRequest::new(login(), "http://a.com", "  ", "wp_").is_err());
        assert!(MigrationRequest::new(login(), "http://a.com", "http://b.com", "wp_;--").is_err());
    }

    #[test]
    fn empty_password_is_allowed_but_name_is_not() {
        let mut l = login();
        l.password.clear();
        assert!(MigrationRequest::new(l, "http://a.com", "http://b.com", "").is_ok());

        let mut l = login();
        l.name = " ".into();
        assert!(MigrationRequest::new(l, "http://a.com", "http://b.com", "").is_err());
    }

    #[test]
    fn debug_output_never_shows_the_password() {
        let request = MigrationRequest::new(login(), "http://a.com", "http://b.com", "").unwrap();
        let credentials = request.credentials("localhost", 3306);
        assert_eq!(credentials.password, "s3cret");

        assert!(!format!("{request:?}").contains("s3cret"));
        assert!(!format!("{credentials:?}").contains("s3cret"));
    }
}
