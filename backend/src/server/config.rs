//! HTTP server settings loaded via OrthoConfig, and the runtime
//! configuration object built from them.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use foodgram::inbound::http::links::{DEFAULT_MEDIA_PREFIX, PublicLinks};
use foodgram::outbound::persistence::{DEFAULT_POOL_SIZE, DbPool};

use super::session_key::{BuildMode, SessionConfigError, session_settings};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Settings read from CLI flags, `FOODGRAM_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOODGRAM")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum database connections.
    pub pool_size: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Directory uploaded images are written to.
    pub media_root: Option<PathBuf>,
    /// Prefix prepended to stored media paths in responses.
    pub media_url: Option<String>,
    /// Public origin used for absolute links such as short links.
    pub public_url: Option<String>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Accept a generated key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub session_cookie_secure: bool,
    /// `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
}

impl ServerSettings {
    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    pub fn media_url(&self) -> &str {
        self.media_url.as_deref().unwrap_or(DEFAULT_MEDIA_PREFIX)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }
}

/// Errors raised while turning settings into a [`ServerConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ServerConfigError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid public URL '{value}': {source}")]
    PublicUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Session(#[from] SessionConfigError),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) links: PublicLinks,
    pub(crate) media_root: PathBuf,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from explicit parts.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        media_root: PathBuf,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            links: PublicLinks::default(),
            media_root,
            db_pool: None,
        }
    }

    /// Validate settings and resolve the session key.
    ///
    /// # Errors
    ///
    /// Returns [`ServerConfigError`] for a malformed address or URL, or when
    /// session settings are rejected for `mode`.
    pub fn from_settings(
        settings: &ServerSettings,
        mode: BuildMode,
    ) -> Result<Self, ServerConfigError> {
        let bind_addr = settings
            .bind_address()
            .parse()
            .map_err(|source| ServerConfigError::BindAddress {
                value: settings.bind_address().to_owned(),
                source,
            })?;
        let public_base = settings
            .public_url
            .as_deref()
            .map(|value| {
                Url::parse(value).map_err(|source| ServerConfigError::PublicUrl {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()?;
        let session = session_settings(settings, mode)?;
        Ok(Self::new(
            session.key,
            session.cookie_secure,
            session.same_site,
            bind_addr,
            settings.media_root(),
        )
        .with_links(PublicLinks::new(settings.media_url(), public_base)))
    }

    /// Override how response links are rendered.
    #[must_use]
    pub fn with_links(mut self, links: PublicLinks) -> Self {
        self.links = links;
        self
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses the Diesel repositories instead of
    /// the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn key(&self) -> &Key {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "FOODGRAM_BIND_ADDRESS",
        "FOODGRAM_DATABASE_URL",
        "FOODGRAM_POOL_SIZE",
        "FOODGRAM_RUN_MIGRATIONS",
        "FOODGRAM_MEDIA_ROOT",
        "FOODGRAM_MEDIA_URL",
        "FOODGRAM_PUBLIC_URL",
        "FOODGRAM_SESSION_KEY_FILE",
        "FOODGRAM_SESSION_ALLOW_EPHEMERAL",
        "FOODGRAM_SESSION_COOKIE_SECURE",
        "FOODGRAM_SESSION_SAME_SITE",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("foodgram")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_address(), DEFAULT_BIND_ADDRESS);
        assert!(settings.database_url.is_none());
        assert_eq!(settings.pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.run_migrations);
        assert_eq!(settings.media_root(), PathBuf::from(DEFAULT_MEDIA_ROOT));
        assert_eq!(settings.media_url(), DEFAULT_MEDIA_PREFIX);
        assert!(settings.session_cookie_secure);
        assert!(!settings.session_allow_ephemeral);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("FOODGRAM_BIND_ADDRESS", "127.0.0.1:9000"),
            ("FOODGRAM_DATABASE_URL", "postgres://localhost/foodgram"),
            ("FOODGRAM_POOL_SIZE", "4"),
            ("FOODGRAM_RUN_MIGRATIONS", "false"),
            ("FOODGRAM_MEDIA_ROOT", "/srv/media"),
            ("FOODGRAM_PUBLIC_URL", "https://foodgram.example.com/"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_address(), "127.0.0.1:9000");
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/foodgram")
        );
        assert_eq!(settings.pool_size(), 4);
        assert!(!settings.run_migrations);
        assert_eq!(settings.media_root(), PathBuf::from("/srv/media"));
        assert_eq!(
            settings.public_url.as_deref(),
            Some("https://foodgram.example.com/")
        );
    }

    #[rstest]
    fn invalid_bind_address_is_reported() {
        let _guard = lock_env(env_with(&[("FOODGRAM_BIND_ADDRESS", "nowhere")]));
        let settings = load_from_empty_args();

        let err = ServerConfig::from_settings(&settings, BuildMode::Debug)
            .err()
            .expect("invalid address");

        assert!(matches!(err, ServerConfigError::BindAddress { .. }));
    }

    #[rstest]
    fn debug_build_resolves_links_and_ephemeral_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing_key = dir.path().join("missing");
        let missing_key = missing_key.to_str().expect("utf-8 path");
        let _guard = lock_env(env_with(&[
            ("FOODGRAM_BIND_ADDRESS", "127.0.0.1:0"),
            ("FOODGRAM_SESSION_KEY_FILE", missing_key),
            ("FOODGRAM_MEDIA_URL", "https://cdn.example.org/m"),
        ]));
        let settings = load_from_empty_args();

        let config = ServerConfig::from_settings(&settings, BuildMode::Debug).expect("config");

        assert_eq!(config.bind_addr().port(), 0);
        assert_eq!(
            config.links.media_url("users/a.png"),
            "https://cdn.example.org/m/users/a.png"
        );
        assert_eq!(config.same_site, SameSite::Lax);
    }
}
