// API client module: a small blocking HTTP client that talks to the Spark
// REST API. Every request carries the bearer token currently held by the
// config; responses are classified and decoded here so the resource
// services only deal with typed values.

use crate::config::{unix_now, Config};
use crate::error::{Error, Result};
use log::{debug, warn};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Upper bound for any single HTTP exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared blocking transport used for API and token calls.
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("sparkcli/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Authenticated client for the Spark REST API. It borrows the config so
/// the token is read at the moment each request is built.
#[derive(Clone)]
pub struct SparkClient<'a> {
    client: Client,
    config: &'a Config,
}

impl<'a> SparkClient<'a> {
    pub fn new(client: Client, config: &'a Config) -> Self {
        SparkClient { client, config }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Accept and Authorization headers for the current access token.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let tokens = self.config.tokens();
        if tokens.access_token.is_empty() {
            return Err(Error::NotAuthenticated);
        }
        if tokens.access_expires > 0.0 && !tokens.access_usable(unix_now()) {
            warn!("Access token has expired, run `sparkcli login` to refresh it");
        }
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let val = HeaderValue::from_str(&format!("Bearer {}", tokens.access_token))
            .map_err(|_| Error::validation("AccessToken contains invalid characters"))?;
        headers.insert(AUTHORIZATION, val);
        Ok(headers)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let headers = self.auth_headers()?;
        let url = self.url(path);
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url).headers(headers))
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::GET, path)
    }

    /// JSON POST; `json` also sets `Content-Type: application/json`.
    pub fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<RequestBuilder> {
        Ok(self.request(Method::POST, path)?.json(body))
    }

    pub fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<RequestBuilder> {
        Ok(self.request(Method::PUT, path)?.json(body))
    }

    /// multipart/form-data POST: the given text `fields` followed by a
    /// `files` part with the file's bytes, named after its basename.
    pub fn post_file(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        file_path: &Path,
    ) -> Result<RequestBuilder> {
        let builder = self.request(Method::POST, path)?;
        let data = std::fs::read(file_path).map_err(|source| Error::Attachment {
            path: file_path.to_path_buf(),
            source,
        })?;
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                Error::validation(format!("{} has no file name", file_path.display()))
            })?;

        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        let part = multipart::Part::bytes(data).file_name(file_name.to_string());
        Ok(builder.multipart(form.part("files", part)))
    }

    pub fn delete(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::DELETE, path)
    }

    /// Send the request. 2xx responses are returned untouched; anything
    /// else becomes `Error::Http` with the status and body text.
    pub fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let res = request.send()?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let txt = res.text().unwrap_or_default();
        debug!("request failed: {} - {}", status, txt);
        Err(Error::Http {
            status: status.as_u16(),
            body: txt,
        })
    }

    /// Send the request and decode the JSON body of a 2xx response.
    pub fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let res = self.execute(request)?;
        let body = res.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
