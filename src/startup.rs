// Startup module - displays banner and effective settings
//
// Printed once after the store is open and before the server accepts
// traffic, so what it shows reflects what actually initialized.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Print the startup banner
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}samplesink{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}HTTP ingestion endpoint for timestamped samples{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!(
        "  {DIM}Database:{RESET} {GREEN}✓{RESET} {}",
        config.storage.db_path.display()
    );
    if config.logging.file.enabled {
        println!(
            "  {DIM}Log files:{RESET} {}/{}.*",
            config.logging.file.dir.display(),
            config.logging.file.prefix
        );
    }
    println!();

    println!(
        "  {MAGENTA}▸{RESET} Listening on {BOLD}http://{}/{RESET}",
        config.bind_addr
    );
    println!();
}

/// Log startup state for file logs and headless runs
pub fn log_startup(config: &Config) {
    tracing::info!(
        version = VERSION,
        bind_addr = %config.bind_addr,
        db_path = %config.storage.db_path.display(),
        pool_size = config.storage.pool_size,
        "samplesink starting"
    );
}
