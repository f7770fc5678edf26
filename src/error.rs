// Error types shared by every layer of the library. The binary wraps these
// in `anyhow` at the top; nothing in here terminates the process.

use std::path::PathBuf;

/// Errors that can occur while talking to Spark or managing the config file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to access config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to encode config: {0}")]
    ConfigEncode(#[from] toml::ser::Error),
    #[error("ClientId not configured")]
    MissingClientId,
    #[error("ClientSecret not configured")]
    MissingClientSecret,
    #[error("AuthCode not configured")]
    MissingAuthCode,
    #[error("OAuth token exchange failed: {status} - {body}")]
    OAuthExchangeFailed { status: u16, body: String },
    #[error("No access token configured, run `sparkcli login` first")]
    NotAuthenticated,
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status} - {body}")]
    Http { status: u16, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Validation(String),
    #[error("No DefaultRoomId configured")]
    NoDefaultRoom,
}

impl Error {
    /// Stable, kebab-case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigIo { .. } | Error::ConfigEncode(_) => "config-io",
            Error::ConfigParse { .. } => "config-parse",
            Error::MissingClientId => "missing-client-id",
            Error::MissingClientSecret => "missing-client-secret",
            Error::MissingAuthCode => "missing-auth-code",
            Error::OAuthExchangeFailed { .. } => "oauth-exchange-failed",
            Error::NotAuthenticated => "not-authenticated",
            Error::Transport(_) => "transport-error",
            Error::Http { .. } => "http-error",
            Error::Decode(_) => "decode",
            Error::Attachment { .. } => "attachment",
            Error::Validation(_) => "validation",
            Error::NoDefaultRoom => "no-default-room",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::OAuthExchangeFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_body() {
        let err = Error::Http {
            status: 400,
            body: "bad id".into(),
        };
        assert_eq!(err.kind(), "http-error");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "400 - bad id");
    }

    #[test]
    fn precondition_kinds() {
        assert_eq!(Error::MissingClientId.kind(), "missing-client-id");
        assert_eq!(Error::MissingAuthCode.kind(), "missing-auth-code");
        assert_eq!(Error::NoDefaultRoom.kind(), "no-default-room");
        assert_eq!(Error::validation("id can't be empty").kind(), "validation");
        assert_eq!(Error::NotAuthenticated.status(), None);
    }
}
