//! Session key loading and cookie policy.
//!
//! Turns the configured key path and toggles into the values the session
//! middleware needs, applying stricter rules to release builds.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

/// Default location of the session signing key.
pub const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a temporary key with a warning.
    Debug,
    /// Release builds require a real key of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use qna_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
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

/// Inputs for [`session_settings`].
#[derive(Debug, Clone)]
pub struct SessionToggles {
    pub key_file: PathBuf,
    pub allow_ephemeral: bool,
    pub cookie_secure: bool,
}

/// Values handed to the session middleware.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while preparing session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
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
}

/// Load the session key and derive the cookie policy.
///
/// Release builds reject keys shorter than 64 bytes. A missing key file
/// falls back to a generated key in debug builds, or anywhere when
/// `allow_ephemeral` is set; sessions then do not survive a restart.
///
/// # Examples
///
/// ```rust
/// use qna_backend::inbound::http::session_config::{
///     BuildMode, SessionToggles, session_settings,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("qna_session_key_example");
/// std::fs::write(&key_path, vec![b'a'; 64])?;
///
/// let toggles = SessionToggles {
///     key_file: key_path.clone(),
///     allow_ephemeral: false,
///     cookie_secure: true,
/// };
/// let settings = session_settings(&toggles, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
///
/// std::fs::remove_file(&key_path)?;
/// # Ok(())
/// # }
/// ```
pub fn session_settings(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if !toggles.cookie_secure && !mode.is_debug() {
        warn!("session cookies are not marked Secure in a release build");
    }
    let key = load_key(&toggles.key_file, mode, toggles.allow_ephemeral)?;
    let same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    Ok(SessionSettings {
        key,
        cookie_secure: toggles.cookie_secure,
        same_site,
    })
}

fn load_key(path: &Path, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
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
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn key_file(len: usize) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), vec![b'k'; len]).expect("write key");
        file
    }

    fn toggles(path: &Path) -> SessionToggles {
        SessionToggles {
            key_file: path.to_path_buf(),
            allow_ephemeral: false,
            cookie_secure: true,
        }
    }

    #[rstest]
    fn release_accepts_long_key_with_strict_cookies() {
        let file = key_file(64);
        let settings = session_settings(&toggles(file.path()), BuildMode::Release)
            .expect("settings should load");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_rejects_short_key() {
        let file = key_file(16);
        let error = session_settings(&toggles(file.path()), BuildMode::Release)
            .err()
            .expect("short key should fail");
        assert!(matches!(
            error,
            SessionConfigError::KeyTooShort { length: 16, .. }
        ));
    }

    #[rstest]
    fn debug_accepts_short_key_with_lax_cookies() {
        let file = key_file(16);
        let settings = session_settings(&toggles(file.path()), BuildMode::Debug)
            .expect("debug tolerates short keys");
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    #[case(BuildMode::Debug, true)]
    #[case(BuildMode::Release, false)]
    fn missing_key_falls_back_only_in_debug(#[case] mode: BuildMode, #[case] ok: bool) {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent");
        let result = session_settings(&toggles(&missing), mode);
        assert_eq!(result.is_ok(), ok);
        if let Err(error) = result {
            assert!(matches!(error, SessionConfigError::KeyRead { .. }));
        }
    }

    #[rstest]
    fn release_generates_key_when_ephemeral_allowed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = toggles(&dir.path().join("absent"));
        config.allow_ephemeral = true;
        let settings =
            session_settings(&config, BuildMode::Release).expect("ephemeral key permitted");
        assert_eq!(settings.same_site, SameSite::Strict);
    }
}
