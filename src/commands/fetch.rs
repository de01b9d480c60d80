//! Fetch command implementation

use crate::{core::history_path, sleeper::load_or_fetch_history, sleeper::SleeperClient, LeagueId, Result};

use super::resolve_league_id;

/// Handle the fetch command
pub async fn handle_fetch(league_id: Option<LeagueId>, refresh: bool, verbose: bool) -> Result<()> {
    let league_id = resolve_league_id(league_id)?;

    if refresh {
        println!("Fetching fresh league history from Sleeper...");
    } else {
        println!("Loading league history (cached if available)...");
    }

    let client = SleeperClient::new();
    let history = load_or_fetch_history(&client, league_id, refresh).await?;

    println!("✓ League history loaded: {} seasons", history.seasons.len());

    if verbose {
        println!("League history cached at: {}", history_path(league_id).display());
        for records in &history.seasons {
            println!(
                "  {}: {} rosters, {} matchups, {} bracket games",
                records.season,
                records.rosters.len(),
                records.matchups.len(),
                records.winners_bracket.len() + records.losers_bracket.len()
            );
        }
    }

    Ok(())
}
