mod banner;
mod wizard;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wpmove_config::{AppConfig, ConfigLoader, apply_env_overrides};
use wpmove_db::{
    DatabaseLogin, ExecutionMode, MigrationRequest, MigrationStep, Migrator, MySqlConnector,
    StepKind,
};
use wpmove_gateway::GatewayServer;
use wpmove_security::InputValidator;

#[derive(Parser)]
#[command(name = "wpmove", version, about = "Move a WordPress site to a new URL")]
struct Cli {
    /// Config file to use instead of ~/.wpmove/config.yml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (shows the SQL being run)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the migration form over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the statements a migration would run, without connecting
    Plan {
        #[arg(long = "from")]
        from_url: String,
        #[arg(long = "to")]
        to_url: String,
        #[arg(long, default_value = "")]
        prefix: String,
        /// Emit the steps as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the URLs in a database from the terminal
    Migrate {
        #[arg(long)]
        dbname: String,
        #[arg(long)]
        dbuser: String,
        /// Prompted for when neither this nor WPMOVE_DB_PASSWORD is set
        #[arg(long, env = "WPMOVE_DB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long = "from")]
        from_url: String,
        #[arg(long = "to")]
        to_url: String,
        #[arg(long, default_value = "")]
        prefix: String,
        /// Roll back every update if one fails
        #[arg(long)]
        transactional: bool,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive setup, writes config.yml
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    match cli.command {
        Command::Serve { host, port } => {
            let loader = config_loader(cli.config.as_deref())?;
            let mut config = load_config(cli.config.as_deref(), &loader)?;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            banner::print_banner(&config, loader.config_dir());
            GatewayServer::new(config).run().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Plan {
            from_url,
            to_url,
            prefix,
            json,
        } => {
            let steps = plan_steps(&from_url, &to_url, &prefix)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&steps)?);
            } else {
                for step in &steps {
                    println!("-- {}", step.label);
                    println!("{};", step.render());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Migrate {
            dbname,
            dbuser,
            password,
            from_url,
            to_url,
            prefix,
            transactional,
            json,
        } => {
            let loader = config_loader(cli.config.as_deref())?;
            let config = load_config(cli.config.as_deref(), &loader)?;
            let password = match password {
                Some(password) => password,
                None => wizard::prompt_password(&dbuser)?,
            };
            let login = DatabaseLogin {
                name: dbname,
                user: dbuser,
                password,
            };
            let request = MigrationRequest::new(login, &from_url, &to_url, &prefix)?;

            let mode = ExecutionMode::from_flag(transactional || config.database.transactional);
            let migrator = Migrator::new(
                Arc::new(MySqlConnector),
                &config.database.host,
                config.database.port,
            )
            .with_mode(mode);
            info!("running migration ({:?})", migrator.mode());

            let report = migrator.run(&request).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
                if report.connection_error.is_some() {
                    println!();
                }
            }

            Ok(if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Init => {
            wizard::run_wizard(&config_loader(cli.config.as_deref())?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Loader for the directory holding `--config`, or `~/.wpmove` without it.
fn config_loader(config_path: Option<&Path>) -> Result<ConfigLoader> {
    match config_path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Ok(ConfigLoader::with_dir(dir))
        }
        None => Ok(ConfigLoader::new()?),
    }
}

fn load_config(config_path: Option<&Path>, loader: &ConfigLoader) -> Result<AppConfig> {
    match config_path {
        Some(path) => {
            let mut config = ConfigLoader::load_from(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => Ok(loader.load()?),
    }
}

fn plan_steps(from_url: &str, to_url: &str, prefix: &str) -> Result<Vec<MigrationStep>> {
    let from_url = InputValidator::require_text("--from", from_url)?;
    let to_url = InputValidator::require_text("--to", to_url)?;
    let prefix = InputValidator::validate_table_prefix(prefix)?;
    Ok(StepKind::ALL
        .iter()
        .map(|&kind| MigrationStep::new(kind, &prefix, &from_url, &to_url))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_migrate_arguments() {
        let cli = Cli::try_parse_from([
            "wpmove",
            "migrate",
            "--dbname",
            "wp_test",
            "--dbuser",
            "wp",
            "--password",
            "pw",
            "--from",
            "http://a.com",
            "--to",
            "http://b.com",
            "--transactional",
        ])
        .unwrap();
        match cli.command {
            Command::Migrate {
                dbname,
                prefix,
                transactional,
                ..
            } => {
                assert_eq!(dbname, "wp_test");
                assert_eq!(prefix, "");
                assert!(transactional);
            }
            _ => panic!("expected migrate"),
        }
    }

    #[test]
    fn bare_config_file_name_resolves_to_current_dir() {
        let loader = config_loader(Some(Path::new("config.yml"))).unwrap();
        assert_eq!(loader.config_dir(), Path::new("."));

        let loader = config_loader(Some(Path::new("/etc/wpmove/config.yml"))).unwrap();
        assert_eq!(loader.config_dir(), Path::new("/etc/wpmove"));
    }

    #[tokio::test]
    async fn plan_runs_without_loading_config() {
        // A config path that does not exist would fail any load attempt.
        let cli = Cli::try_parse_from([
            "wpmove",
            "--config",
            "/nonexistent/wpmove/config.yml",
            "plan",
            "--from",
            "http://a.com",
            "--to",
            "http://b.com",
        ])
        .unwrap();
        assert!(run(cli).await.is_ok());
    }

    #[test]
    fn plan_uses_default_prefix_and_fixed_order() {
        let steps = plan_steps("http://a.com", "http://b.com", "").unwrap();
        assert_eq!(steps.len(), 7);
        assert_eq!(
            steps[0].render(),
            "UPDATE wp_options SET option_value = REPLACE(option_value, 'http://a.com', 'http://b.com') \
             WHERE option_name IN ('home','siteurl')"
        );
        assert!(plan_steps("http://a.com", "http://b.com", "bad prefix").is_err());
        assert!(plan_steps("", "http://b.com", "").is_err());
    }
}
