//! Market generator: moneyline, spread and total for one matchup.
//!
//! The spread is built from scoring and power differentials, not inverted
//! from the win probability. A second moneyline is read off the spread
//! through a fixed band table; when the two lines disagree the spread-derived
//! one wins.

use serde::Serialize;
use tracing::warn;

use crate::{core::config::MarketConfig, error::LeagueError};

/// `(largest spread in band, fair probability of the favorite)`
const SPREAD_BANDS: [(f64, f64); 10] = [
    (0.0, 0.50),
    (1.0, 0.52),
    (2.5, 0.55),
    (3.5, 0.59),
    (5.0, 0.63),
    (7.0, 0.68),
    (10.0, 0.74),
    (14.0, 0.80),
    (20.0, 0.86),
    (30.0, 0.91),
];
const BEYOND_LAST_BAND: f64 = 0.95;

/// One matchup's odds board entry. Team A is the reference side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketQuote {
    pub win_probability_a: f64,
    pub moneyline_a: i32,
    pub moneyline_b: i32,
    /// Team A's line: negative when A is favored.
    pub spread: f64,
    pub spread_odds_a: i32,
    pub spread_odds_b: i32,
    pub total: f64,
    pub over_odds: i32,
    pub under_odds: i32,
    /// The moneyline was replaced by the spread-derived line.
    pub reconciled: bool,
}

/// What the generator needs to price a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketInputs {
    pub win_probability_a: f64,
    pub average_a: f64,
    pub average_b: f64,
    pub power_a: f64,
    pub power_b: f64,
    /// Games played by the less experienced side.
    pub games_played: u32,
    /// Trailing three-season league average per team and game.
    pub historical_team_average: Option<f64>,
}

fn round_half(value: f64) -> f64 {
    // + 0.0 folds -0.0 into 0.0
    (value * 2.0).round() / 2.0 + 0.0
}

/// Vigged probabilities for both sides of a two-way market.
///
/// The favorite is inflated by `vig`, the underdog deflated; at an exact
/// pick'em both sides count as the favorite.
pub fn apply_vig(probability_a: f64, vig: f64) -> (f64, f64) {
    let shade = |p: f64| {
        let shaded = if p >= 0.5 { p * (1.0 + vig) } else { p * (1.0 - vig) };
        shaded.clamp(0.01, 0.99)
    };
    (shade(probability_a), shade(1.0 - probability_a))
}

/// American odds for a (vigged) probability.
pub fn american_odds(probability: f64) -> i32 {
    let p = probability.clamp(0.01, 0.99);
    if p >= 0.5 {
        (-100.0 * p / (1.0 - p)).round() as i32
    } else {
        (100.0 * (1.0 - p) / p).round() as i32
    }
}

/// Probability implied by American odds.
pub fn implied_probability(odds: i32) -> f64 {
    let o = odds as f64;
    if odds < 0 {
        -o / (-o + 100.0)
    } else if odds > 0 {
        100.0 / (o + 100.0)
    } else {
        0.5
    }
}

/// Both sides' American odds after vig.
pub fn moneyline_pair(probability_a: f64, vig: f64) -> (i32, i32) {
    let (a, b) = apply_vig(probability_a, vig);
    (american_odds(a), american_odds(b))
}

/// Multiplier on the raw spread: 0.7 at <= 2 games up to 3.5 at 12+.
pub fn spread_stage_multiplier(games: u32) -> f64 {
    match games {
        0..=2 => 0.7,
        12.. => 3.5,
        g => 0.7 + 2.8 * (g - 2) as f64 / 10.0,
    }
}

/// Team A's spread, rounded to the half point.
pub fn spread_line(inputs: &MarketInputs, config: &MarketConfig) -> f64 {
    let score_diff = inputs.average_a - inputs.average_b;
    let power_diff = inputs.power_a - inputs.power_b;
    let raw = 0.65 * (0.3 * score_diff) + 0.35 * (0.25 * power_diff);
    let scaled = raw * spread_stage_multiplier(inputs.games_played);
    let cap = config.spread_soft_cap.max(1.0);
    let capped = cap * (scaled / cap).tanh();
    if !capped.is_finite() {
        return 0.0;
    }
    round_half(-capped)
}

/// Fair probability that the favorite of a `spread`-point line wins.
pub fn favorite_probability_for_spread(spread: f64) -> f64 {
    let points = spread.abs();
    SPREAD_BANDS
        .iter()
        .find(|(limit, _)| points <= *limit)
        .map(|(_, p)| *p)
        .unwrap_or(BEYOND_LAST_BAND)
}

/// Moneylines implied by team A's spread.
pub fn moneyline_from_spread(spread_a: f64, vig: f64) -> (i32, i32) {
    let favorite = favorite_probability_for_spread(spread_a);
    let probability_a = if spread_a < 0.0 {
        favorite
    } else if spread_a > 0.0 {
        1.0 - favorite
    } else {
        0.5
    };
    moneyline_pair(probability_a, vig)
}

/// Odds on a linear scale where -110 and +110 sit 20 cents apart.
fn cents(odds: i32) -> i32 {
    if odds >= 100 {
        odds - 100
    } else if odds <= -100 {
        odds + 100
    } else {
        0
    }
}

/// Pick between the probability line and the spread line.
///
/// Returns the line to quote and whether the spread line overrode it.
pub fn reconcile_moneylines(
    from_probability: (i32, i32),
    from_spread: (i32, i32),
    config: &MarketConfig,
) -> ((i32, i32), bool) {
    let cents_apart = (cents(from_probability.0) - cents(from_spread.0)).abs();
    let probability_gap =
        (implied_probability(from_probability.0) - implied_probability(from_spread.0)).abs();

    if cents_apart > config.moneyline_tolerance_cents
        || probability_gap >= config.moneyline_tolerance_probability
    {
        let err = LeagueError::InconsistentOdds {
            from_probability: from_probability.0,
            from_spread: from_spread.0,
        };
        warn!("{}; using the spread line", err);
        return (from_spread, true);
    }
    (from_probability, false)
}

/// Weight of the historical total: 0.7 at <= 3 games down to 0.3 at 10+.
pub fn historical_total_weight(games: u32) -> f64 {
    match games {
        0..=3 => 0.7,
        10.. => 0.3,
        g => 0.7 - 0.4 * (g - 3) as f64 / 7.0,
    }
}

/// Projected combined score, clamped to the configured range.
pub fn total_line(inputs: &MarketInputs, config: &MarketConfig) -> f64 {
    let current = inputs.average_a + inputs.average_b;
    let historical = inputs
        .historical_team_average
        .filter(|avg| *avg > 0.0)
        .map(|avg| 2.0 * avg)
        .unwrap_or(current);
    let h = historical_total_weight(inputs.games_played);
    let blended = (1.0 - h) * current + h * historical;
    if !blended.is_finite() {
        return round_half(config.total_min);
    }
    round_half(blended.clamp(config.total_min, config.total_max))
}

/// Price a matchup.
pub fn generate_market(inputs: &MarketInputs, config: &MarketConfig) -> MarketQuote {
    let from_probability = moneyline_pair(inputs.win_probability_a, config.vig);
    let spread = spread_line(inputs, config);
    let from_spread = moneyline_from_spread(spread, config.vig);
    let ((moneyline_a, moneyline_b), reconciled) =
        reconcile_moneylines(from_probability, from_spread, config);

    let (spread_odds_a, spread_odds_b) = moneyline_pair(0.5, config.vig);
    let (over_odds, under_odds) = moneyline_pair(0.5, config.vig);

    MarketQuote {
        win_probability_a: inputs.win_probability_a,
        moneyline_a,
        moneyline_b,
        spread,
        spread_odds_a,
        spread_odds_b,
        total: total_line(inputs, config),
        over_odds,
        under_odds,
        reconciled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_inputs() -> MarketInputs {
        MarketInputs {
            win_probability_a: 0.5,
            average_a: 110.0,
            average_b: 110.0,
            power_a: 50.0,
            power_b: 50.0,
            games_played: 6,
            historical_team_average: None,
        }
    }

    #[test]
    fn test_pickem_at_low_vig() {
        let config = MarketConfig {
            vig: 0.024,
            ..Default::default()
        };
        let quote = generate_market(&even_inputs(), &config);

        assert_eq!(quote.spread, 0.0);
        assert_eq!((quote.moneyline_a, quote.moneyline_b), (-105, -105));
        assert!(!quote.reconciled);
        assert_eq!(quote.total, 220.0);
    }

    #[test]
    fn test_american_odds_conversion() {
        assert_eq!(american_odds(0.75), -300);
        assert_eq!(american_odds(0.25), 300);
        assert_eq!(american_odds(0.5), -100);
        assert!((implied_probability(-300) - 0.75).abs() < 1e-12);
        assert!((implied_probability(300) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_vig_shades_favorite_and_underdog() {
        let (fav, dog) = apply_vig(0.7, 0.05);
        assert!((fav - 0.735).abs() < 1e-12);
        assert!((dog - 0.285).abs() < 1e-12);
        let (a, b) = moneyline_pair(0.7, 0.05);
        assert!(a < 0 && b > 0);
    }

    #[test]
    fn test_spread_is_soft_capped() {
        let config = MarketConfig::default();
        let mismatch = MarketInputs {
            average_a: 400.0,
            average_b: 50.0,
            power_a: 100.0,
            power_b: 0.0,
            games_played: 14,
            ..even_inputs()
        };
        let spread = spread_line(&mismatch, &config);
        assert!(spread < 0.0);
        assert!(spread.abs() <= config.spread_soft_cap);
        assert!(spread.abs() > 30.0);
        assert_eq!(spread * 2.0, (spread * 2.0).round());
    }

    #[test]
    fn test_stage_multiplier_ramp() {
        assert_eq!(spread_stage_multiplier(2), 0.7);
        assert_eq!(spread_stage_multiplier(12), 3.5);
        assert!((spread_stage_multiplier(7) - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_band_table() {
        assert_eq!(favorite_probability_for_spread(0.0), 0.50);
        assert_eq!(favorite_probability_for_spread(-3.0), 0.59);
        assert_eq!(favorite_probability_for_spread(7.0), 0.68);
        assert_eq!(favorite_probability_for_spread(31.0), 0.95);
    }

    #[test]
    fn test_reconciliation_prefers_spread_line() {
        let config = MarketConfig::default();
        let ((a, b), overridden) = reconcile_moneylines((-400, 300), (-150, 130), &config);
        assert!(overridden);
        assert_eq!((a, b), (-150, 130));

        let (line, overridden) = reconcile_moneylines((-150, 130), (-160, 140), &config);
        assert!(!overridden);
        assert_eq!(line, (-150, 130));
    }

    #[test]
    fn test_quoted_line_consistent_with_spread() {
        let config = MarketConfig::default();
        for p in [0.1, 0.3, 0.5, 0.62, 0.9] {
            let inputs = MarketInputs {
                win_probability_a: p,
                average_a: 125.0,
                average_b: 105.0,
                power_a: 62.0,
                power_b: 48.0,
                games_played: 9,
                historical_team_average: Some(110.0),
            };
            let quote = generate_market(&inputs, &config);
            let (spread_a, _) = moneyline_from_spread(quote.spread, config.vig);
            let gap = (implied_probability(spread_a) - implied_probability(quote.moneyline_a)).abs();
            assert!(gap < 0.05, "p = {} gap = {}", p, gap);
        }
    }

    #[test]
    fn test_total_blend_and_clamp() {
        let config = MarketConfig::default();
        let early = MarketInputs {
            games_played: 2,
            historical_team_average: Some(100.0),
            ..even_inputs()
        };
        // 0.3 * 220 + 0.7 * 200
        assert_eq!(total_line(&early, &config), 206.0);

        let wild = MarketInputs {
            average_a: 300.0,
            average_b: 300.0,
            ..even_inputs()
        };
        assert_eq!(total_line(&wild, &config), 300.0);
        assert_eq!(historical_total_weight(10), 0.3);
    }
}
