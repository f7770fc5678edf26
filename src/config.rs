// Config store: locates, loads, default-fills and saves `sparkcli.toml`.
// The file holds the OAuth client credentials handed out by Spark, the
// tokens obtained at login and a couple of CLI conveniences.

use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use url::form_urlencoded;

/// Name of the config file looked up in each search directory.
pub const CONFIG_FILE_NAME: &str = "sparkcli.toml";

/// Redirect registered for the public sparkcli integration.
pub const DEFAULT_REDIRECT_URI: &str = "http://files.ducbase.com/code.html";

/// Scopes needed to read and write people, rooms, messages and memberships.
pub const DEFAULT_SCOPE: &str = "spark:people_read spark:rooms_read spark:rooms_write \
     spark:messages_read spark:messages_write spark:memberships_read \
     spark:memberships_write";

/// Production v1 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.ciscospark.com/v1";

/// Logical contents of the config file. Keys are written in PascalCase
/// (`BaseUrl`, `ClientId`, ...) and every key is optional at rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_code: String,
    pub redirect_uri: String,
    pub scope: String,
    pub access_token: String,
    pub access_expires: f64,
    pub refresh_token: String,
    pub refresh_expires: f64,
    pub default_room_id: String,

    #[serde(skip)]
    path: PathBuf,
}

/// Access/refresh tokens with their absolute expiries (seconds since epoch).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub access_expires: f64,
    pub refresh_token: String,
    pub refresh_expires: f64,
}

impl TokenSet {
    /// A token is usable while its expiry lies strictly in the future.
    pub fn access_usable(&self, now: f64) -> bool {
        !self.access_token.is_empty() && self.access_expires > now
    }

    pub fn refresh_usable(&self, now: f64) -> bool {
        !self.refresh_token.is_empty() && self.refresh_expires > now
    }
}

/// Current wall-clock time as fractional seconds since the epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Directories probed for `sparkcli.toml`, in priority order: the working
/// directory, `/etc/sparkcli`, then the user's home directory.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(3);
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs.push(PathBuf::from("/etc/sparkcli"));
    // A missing home directory just drops that candidate.
    if let Some(home) = dirs::home_dir() {
        dirs.push(home);
    }
    dirs
}

/// Returns the first `<dir>/sparkcli.toml` that exists, or a bare
/// `sparkcli.toml` (relative to the working directory) when none does.
pub fn find_config_file<P: AsRef<Path>>(dirs: &[P]) -> PathBuf {
    dirs.iter()
        .map(|dir| dir.as_ref().join(CONFIG_FILE_NAME))
        .find(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Resolve the config file using the default search directories.
pub fn locate() -> PathBuf {
    find_config_file(&search_dirs())
}

impl Config {
    /// An empty record bound to `path`. Nothing is read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Config {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Read and parse the file at `path`, then fill in defaults for
    /// `BaseUrl`, `RedirectUri` and `Scope`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Using configuration at {}", path.display());
        let raw = fs::read_to_string(&path).map_err(|source| Error::ConfigIo {
            path: path.clone(),
            source,
        })?;
        let mut config: Config = toml::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.clone(),
            source,
        })?;
        config.path = path;
        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        if self.redirect_uri.is_empty() {
            self.redirect_uri = DEFAULT_REDIRECT_URI.to_string();
        }
        if self.scope.is_empty() {
            self.scope = DEFAULT_SCOPE.to_string();
        }
        if self.base_url.is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
    }

    /// Serialize the whole record back to its file. The new contents are
    /// written to a sibling file first and renamed into place.
    pub fn save(&self) -> Result<()> {
        let encoded = toml::to_string(self)?;
        let tmp = self.path.with_extension("toml.tmp");
        let io_err = |source| Error::ConfigIo {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, encoded).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Verifies ClientId, ClientSecret and AuthCode are present. A missing
    /// AuthCode also logs the consent URL the user has to visit.
    pub fn check_client_config(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::MissingClientId);
        }
        if self.client_secret.is_empty() {
            return Err(Error::MissingClientSecret);
        }
        if self.auth_code.is_empty() {
            self.print_auth_url();
            return Err(Error::MissingAuthCode);
        }
        Ok(())
    }

    /// The OAuth consent page for this client.
    pub fn auth_url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .finish();
        format!("{}/authorize?{}", self.base_url, query)
    }

    pub fn print_auth_url(&self) {
        warn!("Visit \n{}", self.auth_url());
    }

    pub fn tokens(&self) -> TokenSet {
        TokenSet {
            access_token: self.access_token.clone(),
            access_expires: self.access_expires,
            refresh_token: self.refresh_token.clone(),
            refresh_expires: self.refresh_expires,
        }
    }

    /// Replace all four token fields at once. Only the login flow calls this.
    pub(crate) fn set_tokens(&mut self, tokens: TokenSet) {
        self.access_token = tokens.access_token;
        self.access_expires = tokens.access_expires;
        self.refresh_token = tokens.refresh_token;
        self.refresh_expires = tokens.refresh_expires;
    }

    pub fn default_room(&self) -> Option<&str> {
        if self.default_room_id.is_empty() {
            None
        } else {
            Some(&self.default_room_id)
        }
    }

    pub fn set_default_room(&mut self, id: &str) {
        self.default_room_id = id.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn empty_file_gets_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let config = Config::load(&path).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(
            config,
            Config {
                base_url: DEFAULT_BASE_URL.into(),
                redirect_uri: DEFAULT_REDIRECT_URI.into(),
                scope: DEFAULT_SCOPE.into(),
                ..Config::new(&path)
            }
        );
    }

    #[test]
    fn loaded_values_win_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "BaseUrl = \"http://localhost:1234\"\nClientId = \"c\"\nAccessExpires = 4600.5\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:1234");
        assert_eq!(config.client_id, "c");
        assert_eq!(config.access_expires, 4600.5);
        assert_eq!(config.path(), path.as_path());
    }

    #[test]
    fn save_then_load_is_identity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = Config::new(&path);
        config.client_id = "c".into();
        config.client_secret = "s".into();
        config.auth_code = "xyz".into();
        config.default_room_id = "RID".into();
        config.set_tokens(TokenSet {
            access_token: "A".into(),
            access_expires: 4600.25,
            refresh_token: "R".into(),
            refresh_expires: 87400.0,
        });
        config.apply_defaults();
        config.save().unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!dir.path().join("sparkcli.toml.tmp").exists());
    }

    #[test]
    fn missing_file_is_config_io() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert_eq!(err.kind(), "config-io");
    }

    #[test]
    fn malformed_file_is_config_parse() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ClientId = \n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn search_prefers_earlier_dirs() {
        let cwd = TempDir::new().unwrap();
        let etc = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write_config(&etc, "");
        write_config(&home, "");

        let found = find_config_file(&[cwd.path(), etc.path(), home.path()]);
        assert_eq!(found, etc.path().join(CONFIG_FILE_NAME));

        write_config(&cwd, "");
        let found = find_config_file(&[cwd.path(), etc.path(), home.path()]);
        assert_eq!(found, cwd.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn search_falls_back_to_relative_name() {
        let empty = TempDir::new().unwrap();
        assert_eq!(
            find_config_file(&[empty.path()]),
            PathBuf::from(CONFIG_FILE_NAME)
        );
    }

    #[test]
    fn client_config_checks_in_order() {
        let mut config = Config::new("unused.toml");
        assert!(matches!(
            config.check_client_config(),
            Err(Error::MissingClientId)
        ));
        config.client_id = "c".into();
        assert!(matches!(
            config.check_client_config(),
            Err(Error::MissingClientSecret)
        ));
        config.client_secret = "s".into();
        assert!(config.has_client_credentials());
        assert!(matches!(
            config.check_client_config(),
            Err(Error::MissingAuthCode)
        ));
        config.auth_code = "xyz".into();
        assert!(config.check_client_config().is_ok());
    }

    #[test]
    fn auth_url_is_form_encoded() {
        let mut config = Config::new("unused.toml");
        config.apply_defaults();
        config.client_id = "my id".into();
        config.redirect_uri = "http://example/cb".into();
        config.scope = "spark:rooms_read spark:rooms_write".into();

        assert_eq!(
            config.auth_url(),
            "https://api.ciscospark.com/v1/authorize?response_type=code&client_id=my+id\
             &redirect_uri=http%3A%2F%2Fexample%2Fcb&scope=spark%3Arooms_read+spark%3Arooms_write"
        );
    }

    #[test]
    fn token_usability_is_strict() {
        let tokens = TokenSet {
            access_token: "A".into(),
            access_expires: 1000.0,
            refresh_token: String::new(),
            refresh_expires: 5000.0,
        };
        assert!(tokens.access_usable(999.9));
        assert!(!tokens.access_usable(1000.0));
        assert!(!tokens.refresh_usable(0.0));
    }

    #[test]
    fn default_room_round_trip() {
        let mut config = Config::new("unused.toml");
        assert_eq!(config.default_room(), None);
        config.set_default_room("RID");
        assert_eq!(config.default_room(), Some("RID"));
    }
}
