use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use discovery_core::{DiscoveryConfig, DiscoveryQuery};
use discovery_engine::{ensure_output_dir, store_filename};

use crate::cli::RunArgs;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<DiscoveryConfig> {
    let Some(path) = path else {
        return Ok(DiscoveryConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn parse_config(text: &str) -> anyhow::Result<DiscoveryConfig> {
    Ok(ron::from_str(text)?)
}

pub fn apply_overrides(mut config: DiscoveryConfig, args: &RunArgs) -> DiscoveryConfig {
    if args.min.is_some() {
        config.min_count = args.min;
    }
    if args.max.is_some() {
        config.max_count = args.max;
    }
    if let Some(settle_ms) = args.settle_ms {
        config.settle_delay_ms = settle_ms;
    }
    if let Some(stall_limit) = args.stall_limit {
        config.stall_limit = stall_limit;
    }
    if let Some(ceiling) = args.ceiling {
        config.iteration_ceiling = ceiling;
    }
    config
}

/// An explicit `--store` wins; otherwise the store is named after the query.
pub fn store_path(args: &RunArgs, query: &DiscoveryQuery) -> anyhow::Result<PathBuf> {
    if let Some(store) = &args.store {
        return Ok(store.clone());
    }
    ensure_output_dir(&args.output_dir)
        .with_context(|| format!("preparing {}", args.output_dir.display()))?;
    Ok(args.output_dir.join(store_filename(&query.label())))
}
