use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

/// One issuance event. `token_id` is a digest prefix of the token string so
/// the log never contains a usable credential.
#[derive(Debug, Serialize)]
pub struct IssuanceRecord<'a> {
    pub timestamp: u64,
    pub token_id: &'a str,
    pub resource: &'a str,
    pub kind: &'a str,
}

static PREVIOUS_HASH: Lazy<Mutex<Option<Vec<u8>>>> = Lazy::new(|| Mutex::new(None));

/// Loggable identifier derived from a token string.
pub fn token_id(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..16])
}

/// Emit an issuance record to the `audit` tracing target, hash-chained to
/// the previous record.
pub fn emit(record: &IssuanceRecord<'_>) {
    let mut prev = PREVIOUS_HASH.lock().expect("audit log mutex poisoned");
    let mut hasher = Sha256::new();
    if let Some(ref previous_hash) = *prev {
        hasher.update(previous_hash);
    }
    let serialized = serde_json::to_vec(record).expect("audit record serializable");
    hasher.update(&serialized);
    let digest = hasher.finalize().to_vec();
    let chain_hash = hex::encode(&digest);
    *prev = Some(digest);

    let log_line = serde_json::json!({
        "timestamp": record.timestamp,
        "token_id": record.token_id,
        "resource": record.resource,
        "kind": record.kind,
        "chain_hash": chain_hash,
    });
    info!(target: "audit", "{}", log_line);
}
