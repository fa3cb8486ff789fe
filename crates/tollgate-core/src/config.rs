use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::algorithm::Algorithm;
use crate::error::TokenError;
use crate::validity::StartTime;

pub const DEFAULT_TOKEN_NAME: &str = "__token__";
pub const DEFAULT_FIELD_DELIMITER: char = '~';
pub const DEFAULT_ACL_DELIMITER: char = '!';

/// Immutable, validated token parameters. Built once with
/// [`TokenConfigBuilder`] and frozen thereafter, so concurrent generation
/// calls may share a single record.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    token_name: String,
    key: String,
    algorithm: Algorithm,
    salt: Option<String>,
    ip: Option<String>,
    payload: Option<String>,
    session_id: Option<String>,
    start_time: Option<StartTime>,
    end_time: Option<u64>,
    window_seconds: Option<u64>,
    field_delimiter: char,
    acl_delimiter: char,
    escape_early: bool,
    verbose: bool,
}

impl TokenConfig {
    pub fn builder() -> TokenConfigBuilder {
        TokenConfigBuilder::default()
    }

    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    /// The shared secret as supplied, a hex string. Decoded to raw bytes
    /// during generation.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn salt(&self) -> Option<&str> {
        self.salt.as_deref()
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn start_time(&self) -> Option<StartTime> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<u64> {
        self.end_time
    }

    pub fn window_seconds(&self) -> Option<u64> {
        self.window_seconds
    }

    pub fn field_delimiter(&self) -> char {
        self.field_delimiter
    }

    pub fn acl_delimiter(&self) -> char {
        self.acl_delimiter
    }

    pub fn escape_early(&self) -> bool {
        self.escape_early
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Chainable collection of the optional parameters, validated at
/// [`TokenConfigBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct TokenConfigBuilder {
    token_name: Option<String>,
    key: Option<String>,
    algorithm: Algorithm,
    salt: Option<String>,
    ip: Option<String>,
    payload: Option<String>,
    session_id: Option<String>,
    start_time: Option<StartTime>,
    end_time: Option<u64>,
    window_seconds: Option<u64>,
    field_delimiter: Option<char>,
    acl_delimiter: Option<char>,
    escape_early: bool,
    verbose: bool,
}

impl TokenConfigBuilder {
    pub fn token_name(mut self, name: impl Into<String>) -> Self {
        self.token_name = Some(name.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Signed but never emitted in the token body.
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn start_time(mut self, start_time: StartTime) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Absolute expiry in unix seconds; overrides any window.
    pub fn end_time(mut self, end_time: u64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn window_seconds(mut self, window_seconds: u64) -> Self {
        self.window_seconds = Some(window_seconds);
        self
    }

    pub fn field_delimiter(mut self, delimiter: char) -> Self {
        self.field_delimiter = Some(delimiter);
        self
    }

    pub fn acl_delimiter(mut self, delimiter: char) -> Self {
        self.acl_delimiter = Some(delimiter);
        self
    }

    pub fn escape_early(mut self, enabled: bool) -> Self {
        self.escape_early = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn build(self) -> Result<TokenConfig, TokenError> {
        let key = match self.key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(TokenError::MissingSecret),
        };
        let token_name = match self.token_name {
            None => DEFAULT_TOKEN_NAME.to_string(),
            Some(name) if !name.is_empty() => name,
            Some(_) => return Err(TokenError::MissingTokenName),
        };

        Ok(TokenConfig {
            token_name,
            key,
            algorithm: self.algorithm,
            salt: self.salt,
            ip: self.ip,
            payload: self.payload,
            session_id: self.session_id,
            start_time: self.start_time,
            end_time: self.end_time,
            window_seconds: self.window_seconds,
            field_delimiter: self.field_delimiter.unwrap_or(DEFAULT_FIELD_DELIMITER),
            acl_delimiter: self.acl_delimiter.unwrap_or(DEFAULT_ACL_DELIMITER),
            escape_early: self.escape_early,
            verbose: self.verbose,
        })
    }
}

/// Token parameters loadable from a TOML or YAML file. Mirrors the
/// command-line flags; the front-end lets flags override file values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenFileParams {
    pub token_name: Option<String>,
    pub key: Option<String>,
    pub algorithm: Option<String>,
    pub salt: Option<String>,
    pub ip: Option<String>,
    pub payload: Option<String>,
    pub session_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<u64>,
    pub window: Option<String>,
    pub field_delimiter: Option<char>,
    pub acl_delimiter: Option<char>,
    pub escape_early: Option<bool>,
}

pub fn load_params(path: &Path) -> Result<TokenFileParams> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("unable to read config {}", path.display()))?;
    if path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
    {
        serde_yaml::from_str(&raw).context("failed to parse YAML config")
    } else {
        toml::from_str(&raw).context("failed to parse TOML config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TokenConfig::builder().key("deadbeef").build().unwrap();
        assert_eq!(config.token_name(), "__token__");
        assert_eq!(config.algorithm(), Algorithm::Sha256);
        assert_eq!(config.field_delimiter(), '~');
        assert_eq!(config.acl_delimiter(), '!');
        assert!(!config.escape_early());
        assert!(!config.verbose());
        assert_eq!(config.start_time(), None);
        assert_eq!(config.end_time(), None);
        assert_eq!(config.window_seconds(), None);
    }

    #[test]
    fn missing_key_message_is_stable() {
        let err = TokenConfig::builder().window_seconds(500).build().unwrap_err();
        assert_eq!(err, TokenError::MissingSecret);
        assert_eq!(
            err.to_string(),
            "You must provide a secret in order to generate a new token."
        );
    }

    #[test]
    fn empty_token_name_rejected() {
        let err = TokenConfig::builder()
            .key("deadbeef")
            .token_name("")
            .build()
            .unwrap_err();
        assert_eq!(err, TokenError::MissingTokenName);
    }

    #[test]
    fn builder_collects_every_option() {
        let config = TokenConfig::builder()
            .key("deadbeef")
            .token_name("tkn")
            .algorithm(Algorithm::Sha1)
            .salt("pepper")
            .ip("203.0.113.9")
            .payload("data")
            .session_id("abc")
            .start_time(StartTime::Now)
            .end_time(100)
            .window_seconds(50)
            .field_delimiter(';')
            .acl_delimiter(',')
            .escape_early(true)
            .verbose(true)
            .build()
            .unwrap();
        assert_eq!(config.token_name(), "tkn");
        assert_eq!(config.algorithm(), Algorithm::Sha1);
        assert_eq!(config.salt(), Some("pepper"));
        assert_eq!(config.ip(), Some("203.0.113.9"));
        assert_eq!(config.payload(), Some("data"));
        assert_eq!(config.session_id(), Some("abc"));
        assert_eq!(config.start_time(), Some(StartTime::Now));
        assert_eq!(config.end_time(), Some(100));
        assert_eq!(config.window_seconds(), Some(50));
        assert_eq!(config.field_delimiter(), ';');
        assert_eq!(config.acl_delimiter(), ',');
        assert!(config.escape_early());
        assert!(config.verbose());
    }

    #[test]
    fn file_params_from_toml() {
        let params: TokenFileParams = toml::from_str(
            r#"
            key = "52a152a152a152a152a152a152a1"
            algorithm = "sha1"
            window = "5m"
            escape_early = true
            "#,
        )
        .unwrap();
        assert_eq!(params.key.as_deref(), Some("52a152a152a152a152a152a152a1"));
        assert_eq!(params.algorithm.as_deref(), Some("sha1"));
        assert_eq!(params.window.as_deref(), Some("5m"));
        assert_eq!(params.escape_early, Some(true));
        assert_eq!(params.token_name, None);
    }
}
