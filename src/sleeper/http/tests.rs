//! Unit tests for the Sleeper HTTP client

use super::*;
use crate::cli::types::{RosterId, Season};
use serde_json::json;
use wiremock::{
    matchers::{method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

#[cfg(test)]
mod http_tests {
    use super::*;

    async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_league(server: &MockServer, id: &str, season: &str, previous: Option<&str>) {
        mount_json(
            server,
            &format!("/league/{}", id),
            json!({
                "league_id": id,
                "season": season,
                "previous_league_id": previous,
                "settings": {"playoff_week_start": 3}
            }),
        )
        .await;
        mount_json(
            server,
            &format!("/league/{}/rosters", id),
            json!([{"roster_id": 1, "owner_id": "a"}, {"roster_id": 2, "owner_id": "b"}]),
        )
        .await;
        mount_json(
            server,
            &format!("/league/{}/users", id),
            json!([{"user_id": "a", "display_name": "Alpha"}, {"user_id": "b", "display_name": "Bravo"}]),
        )
        .await;
        mount_json(
            server,
            &format!("/league/{}/winners_bracket", id),
            json!([{"r": 1, "m": 1, "t1": 1, "t2": 2, "w": 1, "l": 2, "p": 1}]),
        )
        .await;
        mount_json(server, &format!("/league/{}/losers_bracket", id), json!([])).await;

        Mock::given(method("GET"))
            .and(path_regex(format!(r"^/league/{}/matchups/\d+$", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"roster_id": 1, "matchup_id": 1, "points": 101.5},
                {"roster_id": 2, "matchup_id": 1, "points": 99.0}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_league_null_is_no_data() {
        let server = MockServer::start().await;
        mount_json(&server, "/league/999", serde_json::Value::Null).await;

        let client = SleeperClient::with_base_url(server.uri());
        let result = client.get_league("999").await;

        assert!(matches!(result, Err(LeagueError::NoData)));
    }

    #[tokio::test]
    async fn test_get_nfl_state() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/state/nfl",
            json!({"season": "2024", "week": 9, "season_type": "regular"}),
        )
        .await;

        let client = SleeperClient::with_base_url(format!("{}/", server.uri()));
        let state = client.get_nfl_state().await.unwrap();

        assert_eq!(state.season, Season::new(2024));
        assert_eq!(state.week, 9);
    }

    #[tokio::test]
    async fn test_http_error_status_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/league/1/rosters"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = SleeperClient::with_base_url(server.uri());
        assert!(matches!(
            client.get_rosters("1").await,
            Err(LeagueError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_season_pairs_matchups() {
        let server = MockServer::start().await;
        mount_league(&server, "100", "2024", None).await;

        let client = SleeperClient::with_base_url(server.uri());
        let season = client.fetch_season("100").await.unwrap();

        // playoff_week_start 3 + one bracket round → weeks 1..=3
        assert_eq!(season.season, Season::new(2024));
        assert_eq!(season.matchups.len(), 3);
        assert_eq!(season.matchups[0].team1_roster_id, Some(RosterId::new(1)));
        assert_eq!(season.matchups[0].team2_score, Some(99.0));
        assert_eq!(season.winners_bracket.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_history_follows_previous_league() {
        let server = MockServer::start().await;
        mount_league(&server, "200", "2024", Some("100")).await;
        mount_league(&server, "100", "2023", Some("0")).await;

        let client = SleeperClient::with_base_url(server.uri());
        let history = client.fetch_history("200").await.unwrap();

        assert_eq!(history.league_id.as_deref(), Some("200"));
        let seasons: Vec<_> = history.seasons.iter().map(|s| s.season.as_u16()).collect();
        assert_eq!(seasons, vec![2023, 2024]);
    }
}
