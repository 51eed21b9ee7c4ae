use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides: `HQ__DATABASE__URL` maps to `database.url`.
pub const ENV_PREFIX: &str = "HQ";

const DEFAULT_CONFIG_FILE: &str = "server";

#[hq_derive::hq_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `HQ__`-prefixed environment variables.
///
/// `path` may omit the extension (`"server"` finds `server.toml`); it defaults to `server` in
/// the working directory.
///
/// # Errors
/// Fails when the file is missing or the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use hq_kernel::config::load_config;
/// use hq_kernel::domain::config::ApiConfig;
///
/// let cfg: ApiConfig = load_config(Some("server")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());
    info!(path = %path.display(), "Loading configuration");

    Config::builder()
        .add_source(File::from(path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        )
        .build()
        .context(format!("Reading {}", path.display()))?
        .try_deserialize::<T>()
        .context("Deserializing configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hq_domain::config::{ApiConfig, MailTransport};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_toml_and_keeps_defaults_for_missing_sections() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("server.toml"),
            "[server]\nport = 6000\n\n[mail]\ntransport = \"smtp\"\nhost = \"mail.local\"\n",
        )
        .expect("write config");

        let cfg: ApiConfig = load_config(Some(dir.path().join("server"))).expect("config");
        assert_eq!(cfg.server.port, 6000);
        assert_eq!(cfg.mail.transport, MailTransport::Smtp);
        assert_eq!(cfg.mail.host, "mail.local");
        assert_eq!(cfg.database.url, "mem://");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let result = load_config::<ApiConfig>(Some(dir.path().join("absent")));
        assert!(matches!(result, Err(ConfigError::Config { context: Some(_), .. })));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("bad.toml"), "[server]\nport = \"not a number\"\n")
            .expect("write config");

        let err = load_config::<ApiConfig>(Some(dir.path().join("bad"))).unwrap_err();
        assert!(err.to_string().contains("Deserializing configuration"));
    }
}
