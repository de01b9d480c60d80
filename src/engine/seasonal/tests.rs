//! Unit tests for seasonal metrics

use super::*;
use crate::engine::normalize::normalize_season;
use crate::engine::test_support::{bracket_match, matchup, rotating_schedule, season_records};

fn name(roster: RosterId, _owner: Option<&OwnerId>) -> String {
    format!("Team {}", roster)
}

fn metrics_for(rows: Vec<crate::sleeper::types::RawMatchup>, rosters: u32) -> Vec<SeasonalMetric> {
    let records = season_records(2023, rosters, 15, rows);
    let season = normalize_season(&records, None, 15).unwrap();
    compute_season_metrics(&season, name)
}

fn by_roster(metrics: &[SeasonalMetric], roster: u32) -> &SeasonalMetric {
    metrics
        .iter()
        .find(|m| m.roster_id == RosterId::new(roster))
        .unwrap()
}

#[cfg(test)]
mod dpr_tests {
    use super::*;

    #[test]
    fn test_adjusted_dpr_mean_is_one() {
        let base = [120.0, 110.0, 105.0, 100.0, 98.0, 95.0, 90.0, 85.0];
        let metrics = metrics_for(rotating_schedule(10, &base), 8);

        let mean: f64 =
            metrics.iter().map(|m| m.adjusted_dpr).sum::<f64>() / metrics.len() as f64;
        assert!((mean - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefeated_top_scorer_has_max_dpr() {
        let base = [
            140.0, 120.0, 118.0, 115.0, 112.0, 110.0, 105.0, 102.0, 100.0, 95.0, 90.0, 85.0,
        ];
        let metrics = metrics_for(rotating_schedule(14, &base), 12);

        let top = by_roster(&metrics, 1);
        assert_eq!((top.wins, top.losses), (14, 0));
        let max = metrics
            .iter()
            .map(|m| m.adjusted_dpr)
            .fold(f64::MIN, f64::max);
        assert_eq!(top.adjusted_dpr, max);
        assert!(top.adjusted_dpr > 1.0);
    }

    #[test]
    fn test_roster_without_games_is_excluded_from_mean() {
        // Roster 3 only ever has a bye.
        let metrics = metrics_for(
            vec![
                matchup(1, 1, 100.0, Some((2, 80.0))),
                matchup(1, 3, 150.0, None),
            ],
            3,
        );

        let idle = by_roster(&metrics, 3);
        assert_eq!(idle.total_games, 0);
        assert_eq!(idle.raw_dpr, 0.0);
        assert_eq!(idle.adjusted_dpr, 0.0);

        let a = by_roster(&metrics, 1).adjusted_dpr;
        let b = by_roster(&metrics, 2).adjusted_dpr;
        assert!(((a + b) / 2.0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dpr_mean_is_degenerate() {
        assert_eq!(dpr_mean(&[], "season 2023"), 0.0);
        assert_eq!(dpr_mean(&[0.0, 0.0], "season 2023"), 0.0);

        let mut rows = vec![
            SeasonalMetric {
                total_games: 1,
                ..Default::default()
            };
            2
        ];
        normalize_dpr(&mut rows);
        assert!(rows.iter().all(|m| m.adjusted_dpr == 0.0));

        match degenerate("league average score") {
            LeagueError::DegenerateInput { what } => assert_eq!(what, "league average score"),
            other => panic!("Expected DegenerateInput, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_dpr_formula() {
        assert_eq!(raw_dpr(100.0, 150.0, 50.0, 0.5), (600.0 + 400.0 + 200.0) / 10.0);
    }
}

#[cfg(test)]
mod weekly_tests {
    use super::*;

    #[test]
    fn test_bye_adds_points_but_no_game() {
        let metrics = metrics_for(
            vec![
                matchup(1, 1, 100.0, Some((2, 90.0))),
                matchup(1, 3, 110.0, None),
                matchup(2, 3, 95.0, Some((1, 105.0))),
            ],
            3,
        );

        let bye_team = by_roster(&metrics, 3);
        assert_eq!(bye_team.points_for, 205.0);
        assert_eq!(bye_team.total_games, 1);
        // Week 1 bye contributes nothing to the all-play record.
        assert_eq!(bye_team.all_play_wins + bye_team.all_play_losses, 1);
    }

    #[test]
    fn test_luck_and_expected_wins() {
        let metrics = metrics_for(
            vec![
                matchup(1, 1, 100.0, Some((2, 90.0))),
                matchup(1, 3, 80.0, Some((4, 120.0))),
            ],
            4,
        );

        let one = by_roster(&metrics, 1);
        assert_eq!((one.all_play_wins, one.all_play_losses), (2, 1));
        assert!((one.expected_wins - 2.0 / 3.0).abs() < 1e-9);
        assert!((one.luck_rating - 1.0 / 3.0).abs() < 1e-9);

        let two = by_roster(&metrics, 2);
        assert!((two.luck_rating + 1.0 / 3.0).abs() < 1e-9);

        let four = by_roster(&metrics, 4);
        assert_eq!(four.top_score_weeks_count, 1);
        assert_eq!(one.weekly_top2_scores_count, 1);
        assert_eq!(one.top_score_weeks_count, 0);
    }

    #[test]
    fn test_blowouts_and_slim_margins() {
        let metrics = metrics_for(
            vec![
                matchup(1, 1, 150.0, Some((2, 100.0))),
                matchup(1, 3, 101.0, Some((4, 100.0))),
            ],
            4,
        );

        assert_eq!(by_roster(&metrics, 1).blowout_wins, 1);
        assert_eq!(by_roster(&metrics, 2).blowout_losses, 0);
        assert_eq!(by_roster(&metrics, 3).slim_wins, 1);
        assert_eq!(by_roster(&metrics, 4).slim_losses, 1);
    }

    #[test]
    fn test_ties_count_half() {
        let metrics = metrics_for(vec![matchup(1, 1, 100.0, Some((2, 100.0)))], 2);
        let one = by_roster(&metrics, 1);
        assert_eq!(one.ties, 1);
        assert_eq!(one.win_percentage, 0.5);
        assert_eq!(one.all_play_ties, 1);
        assert_eq!(one.luck_rating, 0.0);
    }

    #[test]
    fn test_playoff_weeks_skip_all_play() {
        let records = season_records(
            2023,
            2,
            2,
            vec![
                matchup(1, 1, 100.0, Some((2, 90.0))),
                matchup(2, 1, 70.0, Some((2, 130.0))),
            ],
        );
        let season = normalize_season(&records, None, 15).unwrap();
        let metrics = compute_season_metrics(&season, name);

        let one = by_roster(&metrics, 1);
        assert_eq!((one.wins, one.losses), (1, 1));
        assert_eq!((one.regular_season_wins, one.regular_season_losses), (1, 0));
        assert_eq!(one.all_play_wins + one.all_play_losses, 1);
        assert_eq!(one.high_score, 100.0);
        assert_eq!(one.low_score, 70.0);
    }

    #[test]
    fn test_metrics_through_week_ignores_later_results() {
        let records = season_records(
            2023,
            2,
            15,
            vec![
                matchup(1, 1, 100.0, Some((2, 90.0))),
                matchup(2, 1, 70.0, Some((2, 130.0))),
            ],
        );
        let season = normalize_season(&records, None, 15).unwrap();
        let before_week_two = metrics_through_week(&season, 2, name);

        let one = by_roster(&before_week_two, 1);
        assert_eq!((one.wins, one.losses), (1, 0));
        assert_eq!(one.points_for, 100.0);
    }
}

#[cfg(test)]
mod award_tests {
    use super::*;

    fn complete_metrics() -> Vec<SeasonalMetric> {
        metrics_for(
            vec![
                matchup(1, 1, 120.0, Some((2, 100.0))),
                matchup(1, 3, 120.0, Some((4, 90.0))),
            ],
            4,
        )
    }

    #[test]
    fn test_competition_ranking_skips_after_tie() {
        let ranks = competition_ranks(&[("a", 120.0), ("b", 120.0), ("c", 100.0), ("d", 90.0)]);
        assert_eq!(ranks["a"], 1);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["c"], 3);
        assert_eq!(ranks["d"], 4);
    }

    #[test]
    fn test_awards_applied_for_complete_season() {
        let mut metrics = complete_metrics();
        let status = SeasonStatus::from_winners_bracket(&[bracket_match(1, 1, Some(3), Some(1), Some(1))]);
        let ranks: BTreeMap<RosterId, Rank> = [(3, 1), (1, 2)]
            .into_iter()
            .map(|(r, n)| (RosterId::new(r), Rank::Placed(n)))
            .collect();

        apply_awards(&mut metrics, status, &ranks, &[RosterId::new(1), RosterId::new(3)]);

        let three = by_roster(&metrics, 3);
        assert!(three.is_champion);
        assert!(three.made_playoffs);
        assert_eq!(three.points_rank, Rank::Placed(1));
        assert!(by_roster(&metrics, 1).is_runner_up);
        assert!(by_roster(&metrics, 1).is_points_champion);
        assert_eq!(by_roster(&metrics, 2).points_rank, Rank::Placed(3));
        assert!(by_roster(&metrics, 2).is_third_place_points);
        assert_eq!(by_roster(&metrics, 4).rank, Rank::NotAvailable);
    }

    #[test]
    fn test_in_progress_season_has_no_awards() {
        let mut metrics = complete_metrics();
        let ranks: BTreeMap<RosterId, Rank> =
            [(RosterId::new(3), Rank::Placed(1))].into_iter().collect();

        apply_awards(&mut metrics, SeasonStatus::InProgress, &ranks, &[RosterId::new(3)]);

        for m in &metrics {
            assert!(!m.is_champion && !m.is_points_champion && !m.made_playoffs);
            assert_eq!(m.rank, Rank::NotAvailable);
            assert_eq!(m.points_rank, Rank::NotAvailable);
        }
    }

    #[test]
    fn test_rank_serializes_not_available() {
        assert_eq!(serde_json::to_string(&Rank::NotAvailable).unwrap(), "\"N/A\"");
        assert_eq!(serde_json::to_string(&Rank::Placed(4)).unwrap(), "4");
        assert_eq!(Rank::NotAvailable.to_string(), "N/A");
    }
}
