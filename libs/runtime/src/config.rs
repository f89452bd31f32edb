use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

/// Sub-directory of the platform home used when `server.home_dir` is not set.
pub const DEFAULT_HOME_SUBDIR: &str = ".church_app";

/// DSN used by `--mock`: a private in-memory SQLite database.
pub const MOCK_DATABASE_URL: &str = "sqlite::memory:";

/// Application configuration: strongly-typed global sections plus a
/// per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Database configuration; the server falls back to the default SQLite file when absent.
    pub database: Option<DatabaseConfig>,
    /// Logging configuration; console-only logging when absent.
    pub logging: Option<LoggingConfig>,
    /// Per-module configuration bag: module name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Normalized to an absolute path at load time.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Per-request timeout in seconds; 0 keeps the HTTP layer default.
    #[serde(default)]
    pub timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite://database/church_app.db`. Relative SQLite
    /// paths are resolved against `server.home_dir`.
    pub url: String,
    /// Maximum pool size (defaults to 10).
    pub max_conns: Option<u32>,
    /// SQLite busy timeout in milliseconds (defaults to 5000).
    pub busy_timeout_ms: Option<u32>,
}

/// Subsystem name → logging settings. The `default` key catches every
/// target that has no section of its own.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// "trace" | "debug" | "info" | "warn" | "error" | "off"
    pub console_level: String,
    /// Log file path, relative to `server.home_dir` unless absolute. Empty disables file output.
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    /// Age after which rotated files are dropped when `max_backups` is unset.
    #[serde(default)]
    pub max_age_days: Option<u32>,
    /// Number of rotated files to keep.
    #[serde(default)]
    pub max_backups: Option<usize>,
    /// Rotate once the file grows past this size.
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => platform default, see `resolve_home_dir`.
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            timeout_sec: 0,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://database/church_app.db".to_string(),
            max_conns: Some(10),
            busy_timeout_ms: Some(5000),
        }
    }
}

pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/church_app.log".to_string(),
            file_level: "debug".to_string(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

fn default_modules() -> HashMap<String, serde_json::Value> {
    let mut modules = HashMap::new();
    modules.insert(
        "congregation".to_string(),
        serde_json::json!({ "default_page_size": 100, "max_page_size": 1000 }),
    );
    modules.insert(
        "api_ingress".to_string(),
        serde_json::json!({ "cors_enabled": true }),
    );
    modules
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig::default()),
            logging: Some(default_logging_config()),
            modules: default_modules(),
        }
    }
}

impl AppConfig {
    /// Layered loading: defaults → YAML file → `APP__` environment variables.
    ///
    /// Optional sections stay `None` unless the file or environment provides
    /// them. `server.home_dir` is normalized and created before returning.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let base = AppConfig {
            server: ServerConfig::default(),
            database: None,
            logging: None,
            modules: HashMap::new(),
        };

        let path = config_path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // APP__DATABASE__URL=... maps to database.url
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        Ok(config)
    }

    /// Load from `config_path` when given, otherwise start from the built-in
    /// defaults (still honouring `APP__` environment overrides).
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        use figment::{
            providers::{Env, Serialized},
            Figment,
        };

        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c: AppConfig = Figment::new()
                    .merge(Serialized::defaults(Self::default()))
                    .merge(Env::prefixed("APP__").split("__"))
                    .extract()
                    .context("Failed to apply environment overrides to defaults")?;
                normalize_home_dir_inplace(&mut c.server)
                    .context("Failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if args.mock {
            self.database = Some(DatabaseConfig {
                url: MOCK_DATABASE_URL.to_string(),
                max_conns: Some(1),
                busy_timeout_ms: None,
            });
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }

    /// Effective database settings: the configured section or the default SQLite file.
    pub fn database_or_default(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }

    /// Deserialize the module's section into `T`, or `T::default()` when the
    /// section is absent. A present but invalid section is an error.
    pub fn module_config<T: DeserializeOwned + Default>(&self, module: &str) -> Result<T> {
        if self.modules.contains_key(module) {
            self.module_config_required(module)
        } else {
            Ok(T::default())
        }
    }

    /// Strict: deserialize the module's section into `T` or fail with the module name.
    pub fn module_config_required<T: DeserializeOwned>(&self, module: &str) -> Result<T> {
        let raw = self
            .modules
            .get(module)
            .ok_or_else(|| anyhow::anyhow!("missing module config: {module}"))?;
        serde_json::from_value(raw.clone()).with_context(|| format!("invalid {module} config"))
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let opt = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved: PathBuf = resolve_home_dir(opt, DEFAULT_HOME_SUBDIR, true)
        .context("home_dir normalization failed")?;

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn is_normalized_path(p: &str) -> bool {
        PathBuf::from(p).is_absolute() && !p.starts_with('~')
    }

    fn yaml_path(s: &Path) -> String {
        s.to_string_lossy().replace('\\', "/")
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct PageCfg {
        default_page_size: u64,
        max_page_size: u64,
    }

    #[test]
    fn default_config_structure() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.home_dir, "");

        let db = config.database.as_ref().unwrap();
        assert_eq!(db.url, "sqlite://database/church_app.db");
        assert_eq!(db.max_conns, Some(10));
        assert_eq!(db.busy_timeout_ms, Some(5000));

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].file, "logs/church_app.log");

        let pages: PageCfg = config.module_config("congregation").unwrap();
        assert_eq!(
            pages,
            PageCfg {
                default_page_size: 100,
                max_page_size: 1000
            }
        );
        assert_eq!(config.modules["api_ingress"]["cors_enabled"], true);
    }

    #[test]
    fn load_layered_reads_yaml_and_normalizes_home_dir() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        let home = tmp.path().join("home");

        let yaml = format!(
            r#"
server:
  home_dir: "{}"
  host: "0.0.0.0"
  port: 9090
  timeout_sec: 30

database:
  url: "sqlite://data/test.db"
  max_conns: 4

logging:
  default:
    console_level: debug
    file: "logs/default.log"

modules:
  congregation:
    default_page_size: 20
    max_page_size: 200
"#,
            yaml_path(&home)
        );
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert!(is_normalized_path(&config.server.home_dir));
        assert!(home.is_dir());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.timeout_sec, 30);

        let db = config.database.as_ref().unwrap();
        assert_eq!(db.url, "sqlite://data/test.db");
        assert_eq!(db.max_conns, Some(4));
        assert_eq!(db.busy_timeout_ms, None);

        let pages: PageCfg = config.module_config_required("congregation").unwrap();
        assert_eq!(pages.max_page_size, 200);
    }

    #[test]
    fn minimal_yaml_leaves_optional_sections_empty() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        let yaml = format!(
            "server:\n  home_dir: \"{}\"\n  host: \"localhost\"\n  port: 8080\n",
            yaml_path(&tmp.path().join("h"))
        );
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(config.database.is_none());
        assert!(config.logging.is_none());
        assert!(config.modules.is_empty());
        assert_eq!(
            config.database_or_default().url,
            "sqlite://database/church_app.db"
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        let yaml = format!(
            "server:\n  home_dir: \"{}\"\n  host: \"h\"\n  port: 1\nbogus: 1\n",
            yaml_path(&tmp.path().join("h"))
        );
        fs::write(&cfg_path, yaml).unwrap();
        assert!(AppConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn cli_overrides_port_verbosity_and_mock() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            port: Some(3000),
            verbose: 2,
            mock: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.as_ref().unwrap()["default"].console_level, "trace");
        let db = config.database.as_ref().unwrap();
        assert_eq!(db.url, MOCK_DATABASE_URL);
        assert_eq!(db.max_conns, Some(1));
    }

    #[test]
    fn cli_verbose_levels() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (5, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                verbose,
                ..Default::default()
            });
            assert_eq!(
                config.logging.as_ref().unwrap()["default"].console_level,
                expected
            );
        }
    }

    #[test]
    fn module_config_rejects_invalid_section() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.module_config::<PageCfg>("missing").unwrap(),
            PageCfg::default()
        );

        config.modules.insert(
            "congregation".into(),
            serde_json::json!({ "default_page_size": "lots" }),
        );
        let err = config.module_config::<PageCfg>("congregation").unwrap_err();
        assert!(format!("{err:#}").contains("invalid congregation config"));
        assert!(config
            .module_config_required::<PageCfg>("congregation")
            .is_err());
        assert!(config.module_config_required::<PageCfg>("missing").is_err());
    }

    #[test]
    fn to_yaml_roundtrip() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("server:"));
        assert!(yaml.contains("congregation:"));

        let back: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.server.port, config.server.port);
    }
}
