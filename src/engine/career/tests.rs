//! Unit tests for career aggregation and milestones

use super::*;
use crate::engine::normalize::normalize_season;
use crate::engine::seasonal::compute_season_metrics;
use crate::engine::test_support::{matchup, owner, rotating_schedule, season_records};

fn seasonal_rows(year: u16, base: &[f64], weeks: u16) -> (NormalizedSeason, Vec<SeasonalMetric>) {
    let records = season_records(year, base.len() as u32, 15, rotating_schedule(weeks, base));
    let season = normalize_season(&records, None, 15).unwrap();
    let rows = compute_season_metrics(&season, |r, _| format!("Team {}", r));
    (season, rows)
}

fn owner_name(owner: &OwnerId) -> String {
    owner.as_str().to_uppercase()
}

#[cfg(test)]
mod aggregate_tests {
    use super::*;

    #[test]
    fn test_career_equals_sum_of_seasons() {
        let (_, mut rows) = seasonal_rows(2022, &[110.0, 100.0, 95.0, 90.0], 6);
        let (_, later) = seasonal_rows(2023, &[90.0, 120.0, 100.0, 80.0], 8);
        rows.extend(later);

        let careers = aggregate_careers(&rows, owner_name);
        assert_eq!(careers.len(), 4);

        for (owner, career) in &careers {
            let mine: Vec<&SeasonalMetric> = rows
                .iter()
                .filter(|r| r.owner_id.as_ref() == Some(owner))
                .collect();
            assert_eq!(career.wins, mine.iter().map(|r| r.wins).sum::<u32>());
            assert_eq!(career.losses, mine.iter().map(|r| r.losses).sum::<u32>());
            assert_eq!(career.ties, mine.iter().map(|r| r.ties).sum::<u32>());
            let points: f64 = mine.iter().map(|r| r.points_for).sum();
            assert!((career.points_for - points).abs() < 1e-9);
            assert_eq!(career.seasons_played, 2);
        }
    }

    #[test]
    fn test_career_dpr_recomputed_and_normalized() {
        let (_, mut rows) = seasonal_rows(2022, &[110.0, 100.0, 95.0, 90.0], 6);
        let (_, later) = seasonal_rows(2023, &[90.0, 120.0, 100.0, 80.0], 8);
        rows.extend(later);
        let careers = aggregate_careers(&rows, owner_name);

        let mean: f64 =
            careers.values().map(|c| c.adjusted_dpr).sum::<f64>() / careers.len() as f64;
        assert!((mean - 1.0).abs() < 1e-9);

        let one = &careers[&owner(1)];
        let expected = raw_dpr(one.average_score, one.high_score, one.low_score, one.win_percentage);
        assert!((one.raw_dpr - expected).abs() < 1e-9);
        assert!(one.highest_seasonal_points_avg >= one.lowest_seasonal_points_avg);
        assert_eq!(one.team_name, "OWNER1");
    }

    #[test]
    fn test_award_counts_and_best_finish() {
        let (_, mut rows) = seasonal_rows(2022, &[110.0, 100.0], 2);
        rows[0].is_champion = true;
        rows[0].made_playoffs = true;
        rows[0].rank = Rank::Placed(1);
        let (_, mut later) = seasonal_rows(2023, &[110.0, 100.0], 2);
        later[0].is_runner_up = true;
        later[0].is_points_champion = true;
        later[0].rank = Rank::Placed(2);
        rows.extend(later);

        let careers = aggregate_careers(&rows, owner_name);
        let one = &careers[&owner(1)];
        assert_eq!(one.championships, 1);
        assert_eq!(one.runner_ups, 1);
        assert_eq!(one.points_championships, 1);
        assert_eq!(one.playoff_appearances, 1);
        assert_eq!(one.best_finish, Rank::Placed(1));
        assert_eq!(careers[&owner(2)].best_finish, Rank::NotAvailable);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let (_, rows) = seasonal_rows(2022, &[110.0, 100.0, 95.0, 90.0], 6);
        let first = aggregate_careers(&rows, owner_name);
        let second = aggregate_careers(&rows, owner_name);
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod milestone_tests {
    use super::*;

    #[test]
    fn test_wins_milestone_records_week_and_order() {
        let (season, _) = seasonal_rows(2023, &[110.0, 100.0, 95.0, 90.0], 6);
        let config = MilestoneConfig {
            wins_step: 3,
            points_step: 0.0,
        };
        let timeline = milestone_timeline(&[&season], &config);

        // Roster 1 outscores everyone every week, so it wins weeks 1..=3.
        let first = timeline
            .for_owner(&owner(1))
            .find(|e| e.kind == MilestoneKind::Wins)
            .unwrap();
        assert_eq!(first.threshold, 3);
        assert_eq!(first.week, 3);
        assert_eq!(first.season, Season::new(2023));

        let order = timeline.achievement_order(MilestoneKind::Wins, 3);
        assert_eq!(order.first(), Some(&&owner(1)));
        assert!(timeline.events.iter().all(|e| e.kind == MilestoneKind::Wins));
    }

    #[test]
    fn test_points_milestones_span_seasons() {
        let early = season_records(2022, 2, 15, vec![matchup(1, 1, 60.0, Some((2, 10.0)))]);
        let late = season_records(2023, 2, 15, vec![matchup(1, 1, 50.0, Some((2, 10.0)))]);
        let early = normalize_season(&early, None, 15).unwrap();
        let late = normalize_season(&late, None, 15).unwrap();
        let config = MilestoneConfig {
            wins_step: 100,
            points_step: 100.0,
        };

        // Passed newest first; replay is still chronological.
        let timeline = milestone_timeline(&[&late, &early], &config);
        let crossing: Vec<&MilestoneEvent> = timeline
            .for_owner(&owner(1))
            .filter(|e| e.kind == MilestoneKind::Points)
            .collect();
        assert_eq!(crossing.len(), 1);
        assert_eq!(crossing[0].threshold, 100);
        assert_eq!(crossing[0].season, Season::new(2023));
        assert!(timeline.achievement_order(MilestoneKind::Points, 100).len() == 1);
    }
}
