use tracing::debug;

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::escape::escape_early;
use crate::validity::resolve_window;

/// Signs edge-auth tokens for one frozen [`TokenConfig`].
///
/// Tokens are delimited `key=value` strings terminated by an `hmac=` field
/// holding the keyed digest of the signed material. For URL tokens the
/// resource is signed (as `url=`) but not emitted; for ACL tokens it is both
/// signed and emitted as `acl=`. A salt is always signed, never emitted.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    config: TokenConfig,
}

impl TokenSigner {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Token authorizing a single URL path.
    pub fn sign_url(&self, url: &str) -> Result<String, TokenError> {
        if url.is_empty() {
            return Err(TokenError::EmptyResource);
        }
        self.generate(url, true)
    }

    /// Token authorizing an ACL expression, possibly several entries already
    /// joined with the ACL delimiter.
    pub fn sign_acl(&self, acl: &str) -> Result<String, TokenError> {
        if acl.is_empty() {
            return Err(TokenError::EmptyResource);
        }
        self.generate(acl, false)
    }

    /// Token authorizing an ordered list of ACL entries.
    pub fn sign_acl_entries<S: AsRef<str>>(&self, entries: &[S]) -> Result<String, TokenError> {
        if entries.is_empty() {
            return Err(TokenError::EmptyResource);
        }
        let delimiter = self.config.acl_delimiter().to_string();
        let joined = entries
            .iter()
            .map(|entry| entry.as_ref())
            .collect::<Vec<_>>()
            .join(&delimiter);
        self.sign_acl(&joined)
    }

    fn generate(&self, resource: &str, is_url: bool) -> Result<String, TokenError> {
        let config = &self.config;
        let (start, end) = resolve_window(config)?;

        if config.verbose() {
            self.dump_parameters(resource, is_url, start, end);
        }

        let escape = config.escape_early();
        let delimiter = config.field_delimiter();

        let mut fields: Vec<String> = Vec::new();
        if let Some(ip) = config.ip() {
            fields.push(format!("ip={}", escape_early(escape, ip)));
        }
        if let Some(start) = start {
            fields.push(format!("st={start}"));
        }
        fields.push(format!("exp={end}"));
        if !is_url {
            fields.push(format!("acl={}", escape_early(escape, resource)));
        }
        if let Some(session_id) = config.session_id() {
            fields.push(format!("id={}", escape_early(escape, session_id)));
        }
        if let Some(payload) = config.payload() {
            fields.push(format!("data={}", escape_early(escape, payload)));
        }

        // The signed material extends the emitted fields; it never drops one.
        let mut signed = fields.clone();
        if is_url {
            signed.push(format!("url={}", escape_early(escape, resource)));
        }
        if let Some(salt) = config.salt() {
            signed.push(format!("salt={salt}"));
        }

        let key = hex::decode(config.key()).map_err(|_| TokenError::InvalidKey)?;
        let separator = delimiter.to_string();
        let digest = config
            .algorithm()
            .hmac_hex(&key, signed.join(&separator).as_bytes())?;

        let mut token = fields.join(&separator);
        token.push(delimiter);
        token.push_str("hmac=");
        token.push_str(&digest);
        Ok(token)
    }

    fn dump_parameters(&self, resource: &str, is_url: bool, start: Option<u64>, end: u64) {
        let config = &self.config;
        debug!(
            resource,
            is_url,
            token_name = config.token_name(),
            algorithm = %config.algorithm(),
            salt = config.salt(),
            ip = config.ip(),
            payload = config.payload(),
            session_id = config.session_id(),
            resolved_start = start,
            resolved_end = end,
            field_delimiter = %config.field_delimiter(),
            acl_delimiter = %config.acl_delimiter(),
            escape_early = config.escape_early(),
            "token generation parameters"
        );
    }
}
