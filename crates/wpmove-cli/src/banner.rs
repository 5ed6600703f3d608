use std::path::Path;

use wpmove_config::AppConfig;

/// Print the startup banner with a config summary.
pub fn print_banner(config: &AppConfig, config_dir: &Path) {
    let version = env!("CARGO_PKG_VERSION");

    let url = format!("http://{}:{}", config.gateway.host, config.gateway.port);
    let database = format!("{}:{}", config.database.host, config.database.port);
    let mode = if config.database.transactional {
        "single transaction"
    } else {
        "step by step"
    };
    let dir_display = match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => config_dir.to_string_lossy().replace(&home, "~"),
        _ => config_dir.to_string_lossy().to_string(),
    };

    // Layout
    let width = 64;
    let left_w = 27;
    let right_w = width - left_w - 3; // 3 for "│ " + "│"

    let title = format!("wpmove v{version}");
    let title_dashes = width - 2 - title.len() - 5; // 2 for ╭╮, 5 for "─── " + " "
    let top = format!("╭─── {title} {}╮", "─".repeat(title_dashes));
    let bottom = format!("╰{}╯", "─".repeat(width - 2));

    let row = |l: &str, r: &str| format!("│ {:<left_w$}│  {:<right_w$}│", l, r);

    println!("{top}");
    println!("{}", row("", ""));
    println!("{}", row("  WordPress URL mover", "Form"));
    println!("{}", row("", &url));
    println!("{}", row("", &"─".repeat(right_w - 2)));
    println!("{}", row("", &format!("MySQL     {database}")));
    println!("{}", row("", &format!("Updates   {mode}")));
    println!(
        "{}",
        row(&format!("  {dir_display}"), "Press Ctrl+C to stop")
    );
    println!("{}", row("", ""));
    println!("{bottom}");
}
