//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::{Context, Result};
use clap::Parser;
use league_metrics::{
    cli::{Commands, LeagueMetrics},
    commands::{
        career::handle_career,
        common::HistorySource,
        fetch::handle_fetch,
        odds::handle_odds,
        seasons::handle_seasons,
        simulate::{handle_simulate, SimulateParams},
    },
    core::logging,
};

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    let app = LeagueMetrics::parse();
    logging::init(app.verbose);

    let source = HistorySource::from(&app.source);
    let verbose = app.verbose;

    match app.command {
        Commands::Fetch => handle_fetch(source.league_id, source.refresh, verbose)
            .await
            .context("fetching league history")?,

        Commands::Seasons { season, json } => handle_seasons(&source, season, json, verbose)
            .await
            .context("computing seasonal metrics")?,

        Commands::Career { json } => handle_career(&source, json, verbose)
            .await
            .context("computing career metrics")?,

        Commands::Odds { season, week, json } => handle_odds(&source, season, week, json, verbose)
            .await
            .with_context(|| format!("pricing week {}", week))?,

        Commands::Simulate {
            season,
            week,
            trials,
            preset,
            seed,
            json,
        } => handle_simulate(
            &source,
            SimulateParams {
                season,
                week,
                trials,
                preset: preset.into(),
                seed,
                as_json: json,
                verbose,
            },
        )
        .await
        .context("simulating playoff futures")?,
    }

    Ok(())
}
