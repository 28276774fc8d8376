use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "refresh.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[clap(about = "Refresh configured resources once and notify subscribers", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "REFRESH_CONFIG_PATH", help = "Path to the JSON settings file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "REFRESH_CATALOG_PATH", help = "Path to the JSON resource catalog.")]
    pub catalog_path: Option<PathBuf>,

    #[clap(long, env = "REFRESH_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "REFRESH_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "REFRESH_OUT_DIR", help = "Directory refreshed payloads are written to.")]
    pub out_dir: Option<PathBuf>,

    #[clap(
        long = "resource",
        env = "REFRESH_RESOURCES",
        value_delimiter = ',',
        help = "Resource ids to refresh (default: every resource in the catalog)."
    )]
    pub resources: Option<Vec<String>>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            catalog_path: other.catalog_path.or(self.catalog_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            out_dir: other.out_dir.or(self.out_dir),
            resources: other.resources.or(self.resources),
        }
    }

    fn defaults() -> Config {
        Config {
            catalog_path: Some(PathBuf::from("catalog.json")),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            out_dir: Some(PathBuf::from("./data")),
            ..Default::default()
        }
    }
}

/// Resolves settings: defaults, then the JSON settings file, then env/CLI.
///
/// A missing settings file is skipped. One that exists but cannot be read or
/// parsed is an error.
pub fn load_config(cli_args: Config) -> Result<Config> {
    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = Config::defaults();
    if let Some(file_config) = read_config_file(&config_file_path)? {
        current_config = current_config.merge(file_config);
    }

    Ok(current_config.merge(cli_args))
}

fn read_config_file(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let file_config = serde_json::from_str::<Config>(&config_str)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(Some(file_config))
}
