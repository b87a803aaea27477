mod cli;
mod report;
mod settings;

use anyhow::Context;
use clap::Parser;
use discovery_core::{DiscoveryConfig, DiscoveryQuery};
use discovery_engine::{AccumulationStore, CsvStore, Discoverer, FetchSettings, HttpFeedSource};
use engine_logging::{engine_error, engine_info, LogDestination};
use log::LevelFilter;

use crate::cli::{Cli, Command, RunArgs};
use crate::report::{RunReport, StatsReport};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (destination, level) = if cli.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    engine_logging::initialize(destination, level);

    match cli.command {
        Command::Search { term, run } => {
            let config = resolve_config(&run)?;
            let query = DiscoveryQuery::search(&term)?;
            run_discovery(query, config, &run)
        }
        Command::Channel { handle, run } => {
            let config = resolve_config(&run)?;
            let query = DiscoveryQuery::channel(&handle, &config)?;
            run_discovery(query, config, &run)
        }
        Command::Stats { store, json } => {
            let stats = CsvStore::new(&store)
                .stats()
                .with_context(|| format!("reading {}", store.display()))?;
            StatsReport::new(&store, stats).print(json)
        }
    }
}

fn resolve_config(args: &RunArgs) -> anyhow::Result<DiscoveryConfig> {
    let config = settings::load_config(args.config.as_deref())?;
    Ok(settings::apply_overrides(config, args))
}

fn run_discovery(
    query: DiscoveryQuery,
    config: DiscoveryConfig,
    args: &RunArgs,
) -> anyhow::Result<()> {
    let store_path = settings::store_path(args, &query)?;
    let page_param = config.endpoints.page_param.clone();
    let discoverer = Discoverer::new(config).context("invalid discovery settings")?;

    let mut accumulation = AccumulationStore::load(CsvStore::new(&store_path))
        .with_context(|| format!("loading {}", store_path.display()))?;
    let mut source = HttpFeedSource::new(FetchSettings::default(), page_param)?;
    engine_info!("running {:?} against {}", query.label(), store_path.display());

    match discoverer.discover(&mut source, &query, accumulation.known()) {
        Ok(outcome) => {
            let merge = accumulation
                .merge(&outcome.items)
                .with_context(|| format!("writing {}", store_path.display()))?;
            let mut report = RunReport::new(
                query.label(),
                &store_path,
                outcome.iterations,
                outcome.items.len(),
            )
            .merged(merge);
            report.final_state = Some(outcome.final_state);
            report.print(args.json)
        }
        Err(failure) => {
            let partial_merge = accumulation.merge(&failure.partial).map_err(|err| {
                engine_error!("partial items were not stored: {err}");
                err.to_string()
            });
            let merge_error = partial_merge.as_ref().err().cloned();
            let report = RunReport::new(
                query.label(),
                &store_path,
                failure.iterations,
                failure.partial.len(),
            )
            .failed(failure.to_string(), partial_merge);
            report.print(args.json)?;

            let err = anyhow::Error::new(failure).context("discovery did not complete");
            match merge_error {
                Some(merge_error) => {
                    Err(err.context(format!("partial items were not stored: {merge_error}")))
                }
                None => Err(err),
            }
        }
    }
}
