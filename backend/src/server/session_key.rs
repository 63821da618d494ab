//! Session cookie settings derived from [`ServerSettings`].
//!
//! Debug builds tolerate a missing key file and fall back to an ephemeral
//! key; release builds require a key of at least [`SESSION_KEY_MIN_LEN`]
//! bytes unless ephemeral keys are explicitly allowed.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

use super::config::ServerSettings;

/// Minimum key file length accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require a real key.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Cookie session parameters handed to the session middleware.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("invalid SameSite policy '{value}'; expected {expected}")]
    InvalidSameSite {
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SameSite=None requires secure session cookies")]
    InsecureSameSiteNone,
}

/// Resolve cookie security, SameSite policy and the signing key.
///
/// # Errors
///
/// Returns [`SessionConfigError`] when the policy is malformed or, in
/// release builds, when the key is missing or short and ephemeral keys are
/// not allowed.
pub fn session_settings(
    settings: &ServerSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = settings.session_cookie_secure;
    let same_site = same_site(settings.session_same_site.as_deref(), mode, cookie_secure)?;
    let key = session_key(
        &settings.session_key_file(),
        mode,
        settings.session_allow_ephemeral,
    )?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn same_site(
    value: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = value else {
        return Ok(if mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        });
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SameSite=None with insecure cookies; browsers may reject the session");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ => Err(SessionConfigError::InvalidSameSite {
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key; sessions will not survive a restart"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyRead {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }
}

/// Truncated SHA-256 fingerprint of the signing key, safe to log.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key_file(len: usize) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().expect("temp key file");
        std::fs::write(file.path(), vec![b'a'; len]).expect("write key");
        file
    }

    #[rstest]
    #[case(None, BuildMode::Debug, SameSite::Lax)]
    #[case(None, BuildMode::Release, SameSite::Strict)]
    #[case(Some("STRICT"), BuildMode::Debug, SameSite::Strict)]
    #[case(Some("none"), BuildMode::Release, SameSite::None)]
    fn same_site_policies(
        #[case] value: Option<&str>,
        #[case] mode: BuildMode,
        #[case] expected: SameSite,
    ) {
        assert_eq!(same_site(value, mode, true).expect("policy"), expected);
    }

    #[rstest]
    fn release_rejects_insecure_same_site_none() {
        let err = same_site(Some("None"), BuildMode::Release, false).expect_err("insecure");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn unknown_same_site_is_rejected() {
        let err = same_site(Some("sometimes"), BuildMode::Debug, true).expect_err("invalid");
        assert!(matches!(err, SessionConfigError::InvalidSameSite { .. }));
    }

    #[rstest]
    fn release_rejects_short_keys() {
        let file = key_file(SESSION_KEY_MIN_LEN - 1);
        let err = session_key(file.path(), BuildMode::Release, false)
            .err()
            .expect("short key rejected");
        assert!(matches!(err, SessionConfigError::KeyTooShort { length: 63, .. }));
    }

    #[rstest]
    fn key_file_is_deterministic() {
        let file = key_file(SESSION_KEY_MIN_LEN);
        let first = session_key(file.path(), BuildMode::Release, false).expect("key");
        let second = session_key(file.path(), BuildMode::Release, false).expect("key");
        assert_eq!(key_fingerprint(&first), key_fingerprint(&second));
    }

    #[rstest]
    #[case(BuildMode::Debug, false, true)]
    #[case(BuildMode::Release, true, true)]
    #[case(BuildMode::Release, false, false)]
    fn missing_key_file_falls_back_only_when_allowed(
        #[case] mode: BuildMode,
        #[case] allow_ephemeral: bool,
        #[case] ok: bool,
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = session_key(&dir.path().join("missing"), mode, allow_ephemeral);
        assert_eq!(result.is_ok(), ok);
    }

    #[rstest]
    fn fingerprint_is_short_hex() {
        let fp = key_fingerprint(&Key::generate());
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
