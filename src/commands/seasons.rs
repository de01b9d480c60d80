//! Seasons command implementation

use crate::{
    engine::{seasonal::SeasonalMetric, SeasonAnalysis},
    Result, Season,
};

use super::common::{to_json, truncate_name, CommandContext, HistorySource};

const NAME_WIDTH: usize = 24;

/// Award markers for one row, e.g. `🏆 💯`.
pub fn award_badges(m: &SeasonalMetric) -> String {
    let badges = [
        (m.is_champion, "🏆"),
        (m.is_runner_up, "🥈"),
        (m.is_third_place, "🥉"),
        (m.is_points_champion, "💯"),
        (m.made_playoffs && !(m.is_champion || m.is_runner_up || m.is_third_place), "P"),
    ];
    badges
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, badge)| *badge)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One season as a text table, ordered by final rank then points.
pub fn render_season(season: &SeasonAnalysis) -> String {
    let mut rows: Vec<&SeasonalMetric> = season.metrics.iter().collect();
    rows.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then(b.points_for.total_cmp(&a.points_for))
            .then(a.roster_id.cmp(&b.roster_id))
    });

    let mut out = format!("Season {} ({:?})\n", season.season, season.status);
    out.push_str(&format!(
        "{:>4} {:<w$} {:>8} {:>8} {:>7} {:>6} {:>6} {:>6}  {}\n",
        "Rank",
        "Team",
        "W-L-T",
        "PF",
        "Avg",
        "DPR",
        "AP%",
        "Luck",
        "Awards",
        w = NAME_WIDTH
    ));
    for m in rows {
        out.push_str(&format!(
            "{:>4} {:<w$} {:>8} {:>8.2} {:>7.2} {:>6.3} {:>6.3} {:>+6.2}  {}\n",
            m.rank.to_string(),
            truncate_name(&m.team_name, NAME_WIDTH),
            format!("{}-{}-{}", m.wins, m.losses, m.ties),
            m.points_for,
            m.average_score,
            m.adjusted_dpr,
            m.all_play_win_percentage,
            m.luck_rating,
            award_badges(m),
            w = NAME_WIDTH
        ));
    }
    out
}

/// Handle the seasons command
pub async fn handle_seasons(
    source: &HistorySource,
    season: Option<Season>,
    as_json: bool,
    verbose: bool,
) -> Result<()> {
    let mut ctx = CommandContext::load(source, verbose).await?;
    ctx.set_current_latest().await?;
    let analysis = ctx.analyze();

    let selected: Vec<&SeasonAnalysis> = analysis
        .seasons
        .iter()
        .filter(|s| season.map_or(true, |wanted| s.season == wanted))
        .collect();

    if as_json {
        let rows: Vec<&SeasonalMetric> = selected.iter().flat_map(|s| s.metrics.iter()).collect();
        println!("{}", to_json(&rows)?);
        return Ok(());
    }

    if selected.is_empty() {
        println!("No analyzed seasons match.");
    }
    for s in selected {
        println!("{}", render_season(s));
    }
    Ok(())
}
