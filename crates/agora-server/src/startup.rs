//! Startup banner and summary.

use agora_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r"
     _
    / \   __ _  ___  _ __ __ _
   / _ \ / _` |/ _ \| '__/ _` |
  / ___ \ (_| | (_) | | | (_| |
 /_/   \_\__, |\___/|_|  \__,_|
         |___/
    "
    );
}

/// Logs the bound address and the configured backends.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Environment: {}", config.app.environment);
    info!("REST API:    http://{}/api", addr);
    info!("Health:      http://{}/health", addr);
    info!("Store:       {}", config.store.backend);
    info!("Mail:        {:?}", config.mail.backend);
    info!("Media:       {:?}", config.media.backend);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_output_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
        print_startup_info(&AppConfig::default());
    }
}
