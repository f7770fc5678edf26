// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, load the config and hand both to
//   the UI shell.
// - Returns `anyhow::Result` so any failure prints and exits non-zero.

use anyhow::Context;
use clap::Parser;
use sparkcli::{api, config, ui::{Cli, Shell}, Config};

fn main() -> anyhow::Result<()> {
    // Show info-level progress (and the consent URL) unless RUST_LOG says
    // otherwise.
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "sparkcli=info");
    }
    pretty_env_logger::init();

    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config::locate);
    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let http = api::http_client()?;

    let mut shell = Shell::new(config, http, cli.json);
    shell.run(cli.command)?;
    Ok(())
}
