// Library root
// -----------
// This crate exposes the library surface behind the `sparkcli` binary.
// The binary (`main.rs`) only parses arguments, loads the config and hands
// control to `ui`.
//
// Module responsibilities:
// - `config`: locating, loading and saving `sparkcli.toml`.
// - `login`: OAuth authorization-code and refresh-token exchanges.
// - `api`: authenticated request construction and response handling.
// - `services`: rooms, messages, people and memberships on top of `api`.
// - `ui`: the command tree and output formatting.
pub mod api;
pub mod config;
pub mod error;
pub mod login;
pub mod services;
pub mod ui;

pub use api::SparkClient;
pub use config::Config;
pub use error::{Error, Result};
pub use login::Login;
