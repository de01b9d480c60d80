//! Odds command implementation

use crate::{engine::MatchupQuote, engine::OddsEngine, Result, Season, Week};

use super::common::{format_odds, to_json, truncate_name, CommandContext, HistorySource};

const NAME_WIDTH: usize = 20;

/// `-3.5` / `+3.5`, with `PK` for a pick'em.
pub fn format_spread(spread: f64) -> String {
    if spread == 0.0 {
        "PK".to_string()
    } else {
        format!("{:+.1}", spread)
    }
}

/// One line per matchup: both moneylines, team A's spread and the total.
///
/// A `*` marks a moneyline replaced by the spread-derived line.
pub fn render_board(board: &[MatchupQuote]) -> String {
    let mut out = String::new();
    for q in board {
        let m = &q.quote;
        out.push_str(&format!(
            "{:<w$} {:>5} {:>5.1}%  vs  {:<w$} {:>5}{}  spread {} ({}/{})  total {:.1} (o{} u{})\n",
            truncate_name(&q.name_a, NAME_WIDTH),
            format_odds(m.moneyline_a),
            m.win_probability_a * 100.0,
            truncate_name(&q.name_b, NAME_WIDTH),
            format_odds(m.moneyline_b),
            if m.reconciled { "*" } else { "" },
            format_spread(m.spread),
            format_odds(m.spread_odds_a),
            format_odds(m.spread_odds_b),
            m.total,
            format_odds(m.over_odds),
            format_odds(m.under_odds),
            w = NAME_WIDTH
        ));
    }
    out
}

/// Handle the odds command
pub async fn handle_odds(
    source: &HistorySource,
    season: Option<Season>,
    week: Week,
    as_json: bool,
    verbose: bool,
) -> Result<()> {
    let mut ctx = CommandContext::load(source, verbose).await?;
    let season = ctx.season_or_latest(season)?;
    ctx.set_current(season, Some(week)).await;
    let analysis = ctx.analyze();

    let engine = OddsEngine::new(ctx.config.clone());
    let board = engine.odds_board(&analysis, season, week)?;

    if as_json {
        println!("{}", to_json(&board)?);
        return Ok(());
    }

    if board.is_empty() {
        println!("No matchups found for {} week {}.", season, week);
        return Ok(());
    }
    println!("Odds for {} week {}", season, week);
    print!("{}", render_board(&board));
    Ok(())
}
