#![allow(dead_code)]

use mockito::{Server, ServerGuard};
use rstest::fixture;
use sparkcli::config::CONFIG_FILE_NAME;
use sparkcli::Config;
use std::path::PathBuf;
use tempfile::TempDir;

pub const ACCESS_TOKEN: &str = "A";

/// Fake Spark API.
#[fixture]
pub fn server() -> ServerGuard {
    let _ = pretty_env_logger::formatted_builder().is_test(true).try_init();
    Server::new()
}

#[fixture]
pub fn workdir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join(CONFIG_FILE_NAME)
}

/// A config pointing at `server` with an access token, written to disk
/// and loaded back the way the binary does it.
pub fn authenticated_config(server: &ServerGuard, dir: &TempDir) -> Config {
    let path = config_path(dir);
    std::fs::write(
        &path,
        format!(
            "BaseUrl = \"{}\"\nAccessToken = \"{}\"\n",
            server.url(),
            ACCESS_TOKEN
        ),
    )
    .expect("Failed to write config");
    Config::load(&path).expect("Failed to load config")
}
