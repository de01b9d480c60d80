//! Simulate command implementation

use crate::{
    engine::{
        simulate::{SimulationResult, TrialPreset},
        LeagueAnalysis, OddsEngine,
    },
    Result, Season, Week,
};

use super::common::{format_odds, to_json, truncate_name, CommandContext, HistorySource};

const NAME_WIDTH: usize = 24;

/// Parameters for the simulate command
#[derive(Debug)]
pub struct SimulateParams {
    pub season: Option<Season>,
    pub week: Option<Week>,
    pub trials: Option<usize>,
    pub preset: TrialPreset,
    pub seed: Option<u64>,
    pub as_json: bool,
    pub verbose: bool,
}

fn odds_cell(odds: Option<i32>) -> String {
    odds.map(format_odds).unwrap_or_else(|| "OUT".to_string())
}

/// Futures table, best title chances first.
pub fn render_futures(analysis: &LeagueAnalysis, season: Season, result: &SimulationResult) -> String {
    let name = |roster| {
        analysis
            .season(season)
            .map(|s| s.team_name(roster))
            .unwrap_or_default()
    };
    let mut rows: Vec<_> = result.teams.iter().collect();
    rows.sort_by(|a, b| {
        b.championship_probability
            .total_cmp(&a.championship_probability)
            .then(b.playoff_probability.total_cmp(&a.playoff_probability))
            .then(a.roster_id.cmp(&b.roster_id))
    });

    let mut out = format!(
        "{} trials, {} regular-season weeks left\n{:<w$} {:>8} {:>7} {:>8} {:>7}\n",
        result.trials,
        result.remaining_weeks,
        "Team",
        "Playoff",
        "Odds",
        "Title",
        "Odds",
        w = NAME_WIDTH
    );
    for t in rows {
        out.push_str(&format!(
            "{:<w$} {:>7.1}% {:>7} {:>7.1}% {:>7}\n",
            truncate_name(&name(t.roster_id), NAME_WIDTH),
            t.playoff_probability * 100.0,
            odds_cell(t.playoff_odds),
            t.championship_probability * 100.0,
            odds_cell(t.championship_odds),
            w = NAME_WIDTH
        ));
    }
    out
}

/// Handle the simulate command
pub async fn handle_simulate(source: &HistorySource, params: SimulateParams) -> Result<()> {
    let mut ctx = CommandContext::load(source, params.verbose).await?;
    let season = ctx.season_or_latest(params.season)?;
    ctx.set_current(season, params.week).await;
    let analysis = ctx.analyze();

    let trials = params
        .trials
        .unwrap_or_else(|| params.preset.trials(&ctx.config.simulation));
    if params.verbose {
        println!("Simulating {} with {} trials...", season, trials);
    }

    let engine = OddsEngine::new(ctx.config.clone());
    let result = engine.futures(&analysis, season, trials, params.seed)?;

    if params.as_json {
        println!("{}", to_json(&result)?);
    } else {
        print!("{}", render_futures(&analysis, season, &result));
    }
    Ok(())
}
