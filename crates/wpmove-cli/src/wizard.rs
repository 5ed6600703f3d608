use std::io::IsTerminal;

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input, Password};
use tracing::info;
use wpmove_config::{AppConfig, ConfigLoader, DatabaseConfig, GatewayConfig};

/// Run the interactive setup wizard and write `config.yml`.
pub fn run_wizard(loader: &ConfigLoader) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        println!("Non-interactive environment detected.");
        println!(
            "To configure wpmove, edit: {}/config.yml",
            loader.config_dir().display()
        );
        println!();
        println!("Minimal config.yml example:");
        println!("---");
        println!("gateway:");
        println!("  host: 127.0.0.1");
        println!("  port: 8080");
        println!("database:");
        println!("  host: localhost");
        println!("  port: 3306");
        println!("  transactional: false");
        return Ok(());
    }

    println!();
    println!("  wpmove Setup");
    println!("  ------------");
    println!();

    let defaults = AppConfig::default();

    let db_host: String = Input::new()
        .with_prompt("MySQL host")
        .default(defaults.database.host)
        .interact_text()
        .context("database host input cancelled")?;

    let db_port: u16 = Input::new()
        .with_prompt("MySQL port")
        .default(defaults.database.port)
        .interact_text()
        .context("database port input cancelled")?;

    let transactional = Confirm::new()
        .with_prompt("Roll back every update if one of them fails?")
        .default(defaults.database.transactional)
        .interact()
        .context("transaction choice cancelled")?;

    let gateway_port: u16 = Input::new()
        .with_prompt("Port for the web form")
        .default(defaults.gateway.port)
        .interact_text()
        .context("gateway port input cancelled")?;

    let config = AppConfig {
        gateway: GatewayConfig {
            host: defaults.gateway.host,
            port: gateway_port,
        },
        database: DatabaseConfig {
            host: db_host,
            port: db_port,
            transactional,
        },
    };

    let path = loader.save(&config).context("failed to write config")?;
    info!("setup wrote {}", path.display());
    println!();
    println!("  Config written to {}", path.display());
    println!("  Start the form with: wpmove serve");
    println!();
    Ok(())
}

/// Ask for the database password without echoing it.
pub fn prompt_password(user: &str) -> Result<String> {
    if !std::io::stdin().is_terminal() {
        bail!("no password given: pass --password or set WPMOVE_DB_PASSWORD");
    }
    Password::new()
        .with_prompt(format!("Password for MySQL user {user}"))
        .allow_empty_password(true)
        .interact()
        .context("password input cancelled")
}
