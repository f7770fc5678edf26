// Login coordinator: trades the pasted authorization code (or the stored
// refresh token) for a fresh token set and writes it back to the config.

use crate::config::{unix_now, Config, TokenSet};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

/// Body returned by `POST /access_token`. Lifetimes are relative seconds.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: f64,
    refresh_token: String,
    refresh_token_expires_in: f64,
}

impl TokenResponse {
    fn into_tokens(self, now: f64) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            access_expires: now + self.expires_in,
            refresh_token: self.refresh_token,
            refresh_expires: now + self.refresh_token_expires_in,
        }
    }
}

/// Obtains tokens and persists them. The config is only modified once a
/// token response has been fully parsed.
pub struct Login<'a> {
    config: &'a mut Config,
    client: Client,
    clock: fn() -> f64,
}

impl<'a> Login<'a> {
    pub fn new(config: &'a mut Config, client: Client) -> Self {
        Login {
            config,
            client,
            clock: unix_now,
        }
    }

    /// Replace the wall clock used to turn `expires_in` into timestamps.
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    /// Refresh the existing token if there is one, otherwise (or when the
    /// refresh fails) exchange the configured authorization code.
    pub fn authorize(&mut self) -> Result<()> {
        self.config.check_client_config()?;

        if self.config.has_access_token() {
            // Only a failed grant falls through; errors saving the new
            // tokens are returned as is.
            match self.request_refresh() {
                Ok(tokens) => return self.store(tokens),
                Err(e) => warn!("Token refresh failed, falling back to AuthCode: {}", e),
            }
        }
        self.exchange_code()
    }

    /// `grant_type=authorization_code` exchange using `AuthCode`.
    pub fn exchange_code(&mut self) -> Result<()> {
        info!("Exchanging authorization code for an access token");
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", self.config.auth_code.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let tokens = self.request_tokens(&form)?;
        self.store(tokens)
    }

    /// `grant_type=refresh_token` exchange using `RefreshToken`.
    pub fn refresh(&mut self) -> Result<()> {
        let tokens = self.request_refresh()?;
        self.store(tokens)
    }

    fn request_refresh(&self) -> Result<TokenSet> {
        if self.config.refresh_token.is_empty() {
            return Err(Error::validation("RefreshToken not configured"));
        }
        if !self.config.tokens().refresh_usable((self.clock)()) {
            return Err(Error::validation("RefreshToken has expired"));
        }
        info!("Refreshing access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", self.config.refresh_token.as_str()),
        ];
        self.request_tokens(&form)
    }

    fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenSet> {
        let url = format!("{}/access_token", self.config.base_url);
        let res = self.client.post(&url).form(form).send()?;
        let status = res.status();
        let body = res.text()?;
        if !status.is_success() {
            return Err(Error::OAuthExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: TokenResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("unexpected token response: {}", e);
                return Err(Error::OAuthExchangeFailed {
                    status: status.as_u16(),
                    body,
                });
            }
        };
        Ok(parsed.into_tokens((self.clock)()))
    }

    fn store(&mut self, tokens: TokenSet) -> Result<()> {
        self.config.set_tokens(tokens);
        self.config.save()?;
        info!("Login successful, tokens saved to {}", self.config.path().display());
        Ok(())
    }
}
