//! Career command implementation

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    cli::types::OwnerId,
    engine::{
        career::{CareerMetric, MilestoneEvent, MilestoneKind},
        LeagueAnalysis, UNKNOWN_TEAM,
    },
    Result,
};

use super::common::{to_json, truncate_name, CommandContext, HistorySource};

const NAME_WIDTH: usize = 24;

#[derive(Serialize)]
struct CareerReport<'a> {
    careers: &'a BTreeMap<OwnerId, CareerMetric>,
    milestones: &'a [MilestoneEvent],
}

/// Careers ordered by championships, then adjusted DPR.
pub fn render_careers(analysis: &LeagueAnalysis) -> String {
    let mut rows: Vec<&CareerMetric> = analysis.careers.values().collect();
    rows.sort_by(|a, b| {
        b.championships
            .cmp(&a.championships)
            .then(b.adjusted_dpr.total_cmp(&a.adjusted_dpr))
            .then(a.owner_id.cmp(&b.owner_id))
    });

    let mut out = format!(
        "{:<w$} {:>3} {:>9} {:>9} {:>6} {:>6} {:>5} {:>5} {:>5}\n",
        "Team",
        "Yrs",
        "W-L-T",
        "PF",
        "Win%",
        "DPR",
        "Best",
        "🏆",
        "Plf",
        w = NAME_WIDTH
    );
    for c in rows {
        out.push_str(&format!(
            "{:<w$} {:>3} {:>9} {:>9.1} {:>6.3} {:>6.3} {:>5} {:>5} {:>5}\n",
            truncate_name(&c.team_name, NAME_WIDTH),
            c.seasons_played,
            format!("{}-{}-{}", c.wins, c.losses, c.ties),
            c.points_for,
            c.win_percentage,
            c.adjusted_dpr,
            c.best_finish.to_string(),
            c.championships,
            c.playoff_appearances,
            w = NAME_WIDTH
        ));
    }
    out
}

/// Milestones in the order they were reached.
pub fn render_milestones(analysis: &LeagueAnalysis) -> String {
    let mut out = String::new();
    for e in &analysis.milestones.events {
        let name = analysis
            .careers
            .get(&e.owner_id)
            .map(|c| c.team_name.as_str())
            .unwrap_or(UNKNOWN_TEAM);
        let what = match e.kind {
            MilestoneKind::Wins => format!("{} wins", e.threshold),
            MilestoneKind::Points => format!("{} points", e.threshold),
        };
        out.push_str(&format!("{} week {:>2}: {} reached {}\n", e.season, e.week, name, what));
    }
    out
}

/// Handle the career command
pub async fn handle_career(source: &HistorySource, as_json: bool, verbose: bool) -> Result<()> {
    let mut ctx = CommandContext::load(source, verbose).await?;
    ctx.set_current_latest().await?;
    let analysis = ctx.analyze();

    if as_json {
        let report = CareerReport {
            careers: &analysis.careers,
            milestones: &analysis.milestones.events,
        };
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    println!("{}", render_careers(&analysis));
    if !analysis.milestones.events.is_empty() {
        println!("Milestones");
        print!("{}", render_milestones(&analysis));
    }
    Ok(())
}
