use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;

use crate::error::TokenError;

/// Keyed-hash primitive used to sign the token body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
}

impl Algorithm {
    /// Digest size in bytes; the rendered hex digest is twice this long.
    pub fn digest_len(self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
        }
    }

    pub(crate) fn hmac_hex(self, key: &[u8], message: &[u8]) -> Result<String, TokenError> {
        let digest = match self {
            Algorithm::Md5 => {
                let mut mac =
                    Hmac::<Md5>::new_from_slice(key).map_err(|_| TokenError::InvalidKey)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Algorithm::Sha1 => {
                let mut mac =
                    Hmac::<Sha1>::new_from_slice(key).map_err(|_| TokenError::InvalidKey)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Algorithm::Sha256 => {
                let mut mac =
                    Hmac::<Sha256>::new_from_slice(key).map_err(|_| TokenError::InvalidKey)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(hex::encode(digest))
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("sha256") {
            Ok(Algorithm::Sha256)
        } else if s.eq_ignore_ascii_case("sha1") {
            Ok(Algorithm::Sha1)
        } else if s.eq_ignore_ascii_case("md5") {
            Ok(Algorithm::Md5)
        } else {
            Err(TokenError::UnknownAlgorithm)
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
        };
        f.write_str(name)
    }
}
