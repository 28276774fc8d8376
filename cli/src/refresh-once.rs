//! # refresh-once
//!
//! Loads the resource catalog, refreshes each selected resource once and
//! writes every new payload to `<out_dir>/<id>.dat`. Exits with an error if
//! any refresh produced no data or failed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lib_refresh::configs::CatalogConfig;
use lib_refresh::loggers::setup_logging;
use lib_refresh::{LogSubscriber, LoaderService, SubscriptionRegistry, WILDCARD};

mod refresh_logic;
use refresh_logic::config::{self, Config};
use refresh_logic::file_sink::FileSink;

fn main() -> Result<()> {
    let config = config::load_config(Config::parse())?;
    setup_logging(
        config.log_dir.as_deref(),
        config.log_level.as_deref().unwrap_or("info"),
        "refresh_once",
    )?;
    log::debug!("Resolved settings: {:?}", config);

    let catalog_path = config
        .catalog_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("catalog.json"));
    let catalog_config = CatalogConfig::from_file(&catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    log::debug!("{}", catalog_config);

    let catalog = catalog_config.build_catalog()?;
    let service = LoaderService::with_parts(Arc::new(catalog), Arc::new(SubscriptionRegistry::new()));

    let ids = match config.resources.clone() {
        Some(ids) if !ids.is_empty() => ids,
        _ => service.resource_ids(),
    };

    let sink = Arc::new(FileSink::new(
        config.out_dir.clone().unwrap_or_else(|| PathBuf::from("./data")),
    ));
    service.subscribe(WILDCARD, Arc::new(LogSubscriber));
    for id in &ids {
        service.subscribe(id, sink.clone());
    }

    let mut failed = Vec::new();
    for id in &ids {
        match service.load_data(id) {
            Ok(true) => log::info!("Refreshed '{}' into {}", id, sink.path_for(id).display()),
            Ok(false) => {
                log::warn!("No new data for '{}'", id);
                failed.push(id.clone());
            }
            Err(e) => {
                log::error!("Refresh of '{}' failed: {:#}", id, anyhow::Error::from(e));
                failed.push(id.clone());
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} of {} refreshes failed: {}", failed.len(), ids.len(), failed.join(", "));
    }
    log::info!("Refreshed {} resource(s) into {}", ids.len(), sink.out_dir().display());
    Ok(())
}
