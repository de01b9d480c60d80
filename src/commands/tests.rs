//! Unit tests for command handlers and their rendering

use super::*;
use crate::{
    core::config::EngineConfig,
    engine::{
        test_support::{bracket_match, rotating_schedule, season_records},
        OddsEngine,
    },
    sleeper::{save_history, types::LeagueHistory, SleeperClient},
    CurrentPeriod, RosterId, Season, Week,
};

use super::common::{format_odds, truncate_name, CommandContext, HistorySource};

fn history() -> LeagueHistory {
    let mut records = season_records(2024, 4, 7, rotating_schedule(6, &[120.0, 110.0, 100.0, 90.0]));
    records.winners_bracket = vec![bracket_match(1, 1, Some(1), Some(2), Some(1))];
    LeagueHistory {
        league_id: Some("2024".to_string()),
        seasons: vec![records],
    }
}

/// Weeks 1-3 played; weeks 4-6 listed the way Sleeper lists unplayed
/// weeks, as 0-0 pairings.
fn in_progress_history() -> LeagueHistory {
    let mut rows = rotating_schedule(6, &[120.0, 110.0, 100.0, 90.0]);
    for row in rows.iter_mut().filter(|r| r.week > Some(3)) {
        row.team1_score = Some(0.0);
        row.team2_score = Some(0.0);
    }
    LeagueHistory {
        league_id: Some("2024".to_string()),
        seasons: vec![season_records(2024, 4, 7, rows)],
    }
}

fn context() -> CommandContext {
    CommandContext::from_history(history(), EngineConfig::default(), None)
}

#[cfg(test)]
mod command_tests {
    use super::*;

    #[test]
    fn test_resolve_league_id_sources() {
        let explicit = resolve_league_id(Some(LeagueId::new(12345))).unwrap();
        assert_eq!(explicit.as_u64(), 12345);

        std::env::set_var(LEAGUE_ID_ENV_VAR, "1048227123456789504");
        assert_eq!(resolve_league_id(None).unwrap().as_u64(), 1048227123456789504);

        std::env::set_var(LEAGUE_ID_ENV_VAR, "not_a_number");
        assert!(resolve_league_id(None).is_err());

        std::env::remove_var(LEAGUE_ID_ENV_VAR);
        match resolve_league_id(None).unwrap_err() {
            LeagueError::MissingLeagueId { env_var } => assert_eq!(env_var, LEAGUE_ID_ENV_VAR),
            other => panic!("Expected MissingLeagueId error, got {:?}", other),
        }
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_odds(150), "+150");
        assert_eq!(format_odds(-120), "-120");
        assert_eq!(odds::format_spread(0.0), "PK");
        assert_eq!(odds::format_spread(-3.5), "-3.5");
        assert_eq!(odds::format_spread(2.0), "+2.0");
        assert_eq!(truncate_name("Short", 10), "Short");
        assert_eq!(truncate_name("A Very Long Team Name", 8), "A Very …");
    }

    #[tokio::test]
    async fn test_context_loads_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        save_history(&path, &history()).unwrap();

        let source = HistorySource {
            history_file: Some(path),
            ..Default::default()
        };
        let mut ctx = CommandContext::load(&source, false).await.unwrap();
        assert_eq!(ctx.season_or_latest(None).unwrap(), Season::new(2024));

        ctx.set_current(Season::new(2024), Some(Week::new(5))).await;
        assert_eq!(
            ctx.current.map(|c| c.week),
            Some(Week::new(5))
        );
    }

    #[tokio::test]
    async fn test_unplayed_weeks_are_not_ties_without_current_week() {
        let mut ctx = CommandContext::from_history(in_progress_history(), EngineConfig::default(), None);
        ctx.set_current_latest().await.unwrap();
        assert_eq!(ctx.current, None);

        let analysis = ctx.analyze();
        let season = analysis.season(Season::new(2024)).unwrap();
        for m in &season.metrics {
            assert_eq!(m.ties, 0);
            assert_eq!(m.total_games, 3);
            assert!(m.low_score > 0.0);
        }
        let leader = season.metric(RosterId::new(1)).unwrap();
        assert_eq!((leader.wins, leader.losses), (3, 0));
        assert_eq!(leader.low_score, 121.0);
        assert_eq!(season.normalized.remaining_regular_weeks(), 3);
    }

    #[tokio::test]
    async fn test_pricing_future_week_uses_played_weeks_only() {
        let mut ctx = CommandContext::from_history(in_progress_history(), EngineConfig::default(), None);
        ctx.set_current(Season::new(2024), Some(Week::new(6))).await;
        let analysis = ctx.analyze();

        let engine = OddsEngine::new(ctx.config.clone());
        let profiles = engine
            .profiles(&analysis, Season::new(2024), Week::new(6))
            .unwrap();
        assert_eq!(profiles.len(), 4);
        assert!(profiles.values().all(|p| p.games_played == 3));

        let board = engine
            .odds_board(&analysis, Season::new(2024), Week::new(6))
            .unwrap();
        assert_eq!(board.len(), 2);
    }

    #[tokio::test]
    async fn test_week_flag_cannot_move_past_live_week() {
        use wiremock::{
            matchers::{method, path},
            Mock, MockServer, ResponseTemplate,
        };

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state/nfl"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"season": "2024", "week": 4})),
            )
            .mount(&server)
            .await;

        let client = SleeperClient::with_base_url(server.uri());
        let mut ctx = CommandContext::from_history(
            in_progress_history(),
            EngineConfig::default(),
            Some(client),
        );
        let live = CurrentPeriod::new(Season::new(2024), Week::new(4));

        ctx.set_current(Season::new(2024), Some(Week::new(6))).await;
        assert_eq!(ctx.current, Some(live));

        ctx.set_current(Season::new(2024), Some(Week::new(2))).await;
        assert_eq!(ctx.current, Some(CurrentPeriod::new(Season::new(2024), Week::new(2))));

        ctx.set_current_latest().await.unwrap();
        assert_eq!(ctx.current, Some(live));
    }

    #[tokio::test]
    async fn test_empty_history_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        save_history(&path, &LeagueHistory::default()).unwrap();

        let source = HistorySource {
            history_file: Some(path),
            ..Default::default()
        };
        assert!(matches!(
            CommandContext::load(&source, false).await,
            Err(LeagueError::NoData)
        ));
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[test]
    fn test_season_table_lists_champion_first() {
        let analysis = context().analyze();
        let table = seasons::render_season(&analysis.seasons[0]);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("Season 2024"));
        assert!(lines[2].contains("Team 1"));
        assert!(lines[2].contains("🏆"));
        assert!(lines[3].contains("Team 2"));
        assert!(lines.iter().any(|l| l.contains("N/A")));
    }

    #[test]
    fn test_career_table_and_milestones() {
        let analysis = context().analyze();
        let table = career::render_careers(&analysis);
        // Header plus one row per owner.
        assert_eq!(table.lines().count(), 5);
        assert!(table.lines().nth(1).unwrap().starts_with("Team 1"));

        let milestones = career::render_milestones(&analysis);
        assert_eq!(milestones.lines().count(), analysis.milestones.events.len());
    }

    #[test]
    fn test_board_renders_one_line_per_matchup() {
        let ctx = context();
        let analysis = ctx.analyze();
        let engine = OddsEngine::new(ctx.config.clone());
        let board = engine.odds_board(&analysis, Season::new(2024), Week::new(5)).unwrap();
        let text = odds::render_board(&board);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("spread"));
        assert!(text.contains("total"));
    }

    #[test]
    fn test_futures_table_has_every_team() {
        let ctx = context();
        let analysis = ctx.analyze();
        let engine = OddsEngine::new(ctx.config.clone());
        let result = engine.futures(&analysis, Season::new(2024), 250, Some(1)).unwrap();
        let text = simulate::render_futures(&analysis, Season::new(2024), &result);
        assert_eq!(text.lines().count(), 2 + 4);
        assert!(text.starts_with("250 trials, 0 regular-season weeks left"));
    }
}
