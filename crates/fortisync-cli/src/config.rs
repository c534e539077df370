//! Runner configuration
//!
//! Every setting `NAME` is resolved, first match wins, from:
//! 1. the file named by `NAME_FILE`
//! 2. the environment variable `NAME`
//! 3. the file `<secrets dir>/<name in lowercase>` (`/secrets/fgt_api_key`, ...)
//! 4. the built-in default
//!
//! File contents are trimmed of surrounding whitespace; an empty value counts
//! as unset.

use anyhow::{Context, Result, bail};
use fortisync_core::config::{ApplianceConfig, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, SyncConfig};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

/// Directory holding mounted secret files
pub const DEFAULT_SECRETS_DIR: &str = "/secrets";

const DEFAULT_HOST: &str = "192.168.1.99";
const DEFAULT_ZONE: &str = "dhcp.internal";
const DEFAULT_VDOM: &str = "root";

/// Resolved runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Pipeline settings
    pub sync: SyncConfig,
    /// Maximum log level
    pub log_level: Level,
}

impl Config {
    /// Load configuration from the process environment and `/secrets`
    pub fn from_env() -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok(), Path::new(DEFAULT_SECRETS_DIR))
    }

    /// Resolve configuration from an arbitrary variable lookup and secrets directory
    pub fn resolve<F>(lookup: F, secrets_dir: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Settings {
            lookup,
            secrets_dir: secrets_dir.to_path_buf(),
        };

        let api_key = settings.string("FGT_API_KEY")?.with_context(|| {
            format!(
                "FGT_API_KEY is required. Set it via FGT_API_KEY, FGT_API_KEY_FILE or {}",
                settings.secrets_dir.join("fgt_api_key").display()
            )
        })?;

        let appliance = ApplianceConfig::new(
            settings
                .string("FGT_HOST")?
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            api_key,
        )
        .with_port(settings.parsed("FGT_PORT")?.unwrap_or(DEFAULT_PORT))
        .with_verify_tls(settings.flag("FGT_VERIFY_TLS")?.unwrap_or(true))
        .with_vdom(
            settings
                .string("FGT_VDOM")?
                .unwrap_or_else(|| DEFAULT_VDOM.to_string()),
        )
        .with_timeout_secs(
            settings
                .parsed("FGT_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let sync = SyncConfig::new(
            appliance,
            settings
                .string("FGT_ZONE")?
                .unwrap_or_else(|| DEFAULT_ZONE.to_string()),
        )
        .with_ipv6(settings.flag("FGT_IPV6")?.unwrap_or(true))
        .with_ttl(settings.parsed("FGT_TTL")?.unwrap_or(0))
        .with_log_records(settings.flag("FGT_LOG_RECORDS")?.unwrap_or(false));

        sync.validate()?;

        let log_level = match settings.string("FGT_LOG_LEVEL")? {
            Some(level) => Level::from_str(&level).map_err(|_| {
                anyhow::anyhow!(
                    "FGT_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    level
                )
            })?,
            None => Level::INFO,
        };

        Ok(Self { sync, log_level })
    }
}

/// Lookup of raw setting values
struct Settings<F> {
    lookup: F,
    secrets_dir: PathBuf,
}

impl<F> Settings<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Raw string value, or `None` when unset everywhere
    fn string(&self, name: &str) -> Result<Option<String>> {
        let file_var = format!("{}_FILE", name);
        if let Some(path) = non_empty((self.lookup)(&file_var)) {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {} ({})", file_var, path))?;
            return Ok(non_empty(Some(contents.trim().to_string())));
        }

        if let Some(value) = non_empty((self.lookup)(name)) {
            return Ok(Some(value));
        }

        let default_path = self.secrets_dir.join(name.to_lowercase());
        match std::fs::read_to_string(&default_path) {
            Ok(contents) => Ok(non_empty(Some(contents.trim().to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read {} for {}", default_path.display(), name)
            }),
        }
    }

    /// Boolean value; see [`parse_flag`]
    fn flag(&self, name: &str) -> Result<Option<bool>> {
        self.string(name)?
            .map(|value| parse_flag(name, &value))
            .transpose()
    }

    /// Numeric value
    fn parsed<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(name)?
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| anyhow::anyhow!("{} '{}' is not valid: {}", name, value, e))
            })
            .transpose()
    }
}

/// Parse a boolean setting
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
/// Anything else is an error rather than a silent `false`.
pub fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => bail!(
            "{} '{}' is not a boolean. Use true or false",
            name,
            value
        ),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)], secrets_dir: &Path) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::resolve(|name| vars.get(name).cloned(), secrets_dir)
    }

    fn empty_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let dir = empty_dir();
        let config = resolve(&[("FGT_API_KEY", "k")], dir.path()).unwrap();

        assert_eq!(config.sync.appliance.host, "192.168.1.99");
        assert_eq!(config.sync.appliance.port, 443);
        assert!(config.sync.appliance.verify_tls);
        assert_eq!(config.sync.appliance.vdom, "root");
        assert_eq!(config.sync.appliance.timeout_secs, 30);
        assert_eq!(config.sync.zone, "dhcp.internal");
        assert!(config.sync.ipv6);
        assert_eq!(config.sync.ttl, 0);
        assert!(!config.sync.log_records);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let dir = empty_dir();
        let err = resolve(&[("FGT_HOST", "fw.lan")], dir.path()).unwrap_err();
        assert!(err.to_string().contains("FGT_API_KEY is required"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let dir = empty_dir();
        let config = resolve(
            &[
                ("FGT_API_KEY", "k"),
                ("FGT_HOST", "fw.example.lan"),
                ("FGT_PORT", "8443"),
                ("FGT_VERIFY_TLS", "False"),
                ("FGT_ZONE", "lan.example"),
                ("FGT_VDOM", "guest"),
                ("FGT_IPV6", "false"),
                ("FGT_LOG_RECORDS", "True"),
                ("FGT_TTL", "300"),
                ("FGT_TIMEOUT_SECS", "5"),
                ("FGT_LOG_LEVEL", "debug"),
            ],
            dir.path(),
        )
        .unwrap();

        assert_eq!(config.sync.appliance.host, "fw.example.lan");
        assert_eq!(config.sync.appliance.port, 8443);
        assert!(!config.sync.appliance.verify_tls);
        assert_eq!(config.sync.zone, "lan.example");
        assert_eq!(config.sync.appliance.vdom, "guest");
        assert!(!config.sync.ipv6);
        assert!(config.sync.log_records);
        assert_eq!(config.sync.ttl, 300);
        assert_eq!(config.sync.appliance.timeout_secs, 5);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn file_variable_wins_over_plain_variable() {
        let dir = empty_dir();
        let key_path = dir.path().join("key");
        std::fs::write(&key_path, "from-file\n").unwrap();

        let config = resolve(
            &[
                ("FGT_API_KEY", "from-env"),
                ("FGT_API_KEY_FILE", key_path.to_str().unwrap()),
            ],
            dir.path(),
        )
        .unwrap();

        assert_eq!(config.sync.appliance.api_key, "from-file");
    }

    #[test]
    fn secrets_dir_is_the_last_resort() {
        let dir = empty_dir();
        std::fs::write(dir.path().join("fgt_api_key"), "mounted-key\n").unwrap();
        std::fs::write(dir.path().join("fgt_host"), "fw.mounted\n").unwrap();

        let config = resolve(&[("FGT_HOST", "fw.env")], dir.path()).unwrap();

        assert_eq!(config.sync.appliance.api_key, "mounted-key");
        assert_eq!(config.sync.appliance.host, "fw.env");
    }

    #[test]
    fn unreadable_file_variable_is_an_error() {
        let dir = empty_dir();
        let missing = dir.path().join("nope");
        let err = resolve(
            &[("FGT_API_KEY_FILE", missing.to_str().unwrap())],
            dir.path(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("FGT_API_KEY_FILE"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let dir = empty_dir();
        let config = resolve(&[("FGT_API_KEY", "k"), ("FGT_ZONE", "")], dir.path()).unwrap();
        assert_eq!(config.sync.zone, "dhcp.internal");
    }

    #[test]
    fn invalid_ttl_is_an_error() {
        let dir = empty_dir();
        let err = resolve(&[("FGT_API_KEY", "k"), ("FGT_TTL", "ten")], dir.path()).unwrap_err();
        assert!(err.to_string().contains("FGT_TTL"));

        let err = resolve(&[("FGT_API_KEY", "k"), ("FGT_TTL", "-1")], dir.path()).unwrap_err();
        assert!(err.to_string().contains("FGT_TTL"));
    }

    #[test]
    fn invalid_log_level_is_an_error() {
        let dir = empty_dir();
        let err =
            resolve(&[("FGT_API_KEY", "k"), ("FGT_LOG_LEVEL", "loud")], dir.path()).unwrap_err();
        assert!(err.to_string().contains("FGT_LOG_LEVEL"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let dir = empty_dir();
        assert!(resolve(&[("FGT_API_KEY", "k"), ("FGT_TIMEOUT_SECS", "0")], dir.path()).is_err());
    }

    #[test]
    fn flags_are_parsed_strictly() {
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(parse_flag("X", "on").unwrap());
        assert!(parse_flag("X", "1").unwrap());
        assert!(!parse_flag("X", "False").unwrap());
        assert!(!parse_flag("X", "no").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn api_key_not_exposed_in_debug() {
        let dir = empty_dir();
        let config = resolve(&[("FGT_API_KEY", "secret_key_12345")], dir.path()).unwrap();
        assert!(!format!("{:?}", config).contains("secret_key_12345"));
    }
}
