//! End-to-end polling against a mock CDN: fetch, fingerprint, negotiate.

use courtside_client::{Courtside, Negotiation};
use courtside_core::{AppConfig, TtlCache};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GAME: &str = "0022400500";

fn boxscore(home: u64, away: u64) -> Value {
    json!({"game": {
        "gameId": GAME,
        "gameStatusText": "Q4 1:02",
        "gameClock": "PT01M02.00S",
        "period": {"current": 4},
        "homeTeam": {"teamId": 1610612747, "teamTricode": "LAL", "score": home, "players": []},
        "awayTeam": {"teamId": 1610612744, "teamTricode": "GSW", "score": away, "players": []}
    }})
}

fn config(server: &MockServer) -> AppConfig {
    AppConfig { cdn_base_url: server.uri(), max_retries: 0, live_detail_ttl_secs: 0, ..Default::default() }
}

#[tokio::test]
async fn test_poll_negotiation_follows_score_changes() {
    let server = MockServer::start().await;
    let box_path = format!("/static/json/liveData/boxscore/boxscore_{GAME}.json");
    Mock::given(method("GET"))
        .and(path(box_path.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(boxscore(100, 98)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(box_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(boxscore(102, 98)))
        .expect(1)
        .mount(&server)
        .await;

    let service = Courtside::from_config(&config(&server), TtlCache::new()).unwrap();

    let first = service.poll(GAME, None).await.unwrap();
    let Negotiation::Modified { view, token: t1 } = first.negotiation else {
        panic!("first poll must carry the view");
    };
    assert_eq!(view.scores.as_ref().and_then(|s| s.home.score), Some(100));
    assert_eq!(view.status.as_ref().and_then(|s| s.period), Some(4));

    let second = service.poll(GAME, Some(&format!("\"{t1}\""))).await.unwrap();
    assert_eq!(second.negotiation, Negotiation::NotModified { token: t1.clone() });

    let third = service.poll(GAME, Some(&t1)).await.unwrap();
    let Negotiation::Modified { view, token: t2 } = third.negotiation else {
        panic!("score change must produce a new view");
    };
    assert_ne!(t1, t2);
    assert_eq!(view.scores.as_ref().and_then(|s| s.home.score), Some(102));
    assert!(!third.stale);
}

#[tokio::test]
async fn test_poll_before_tipoff_returns_minimal_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/static/json/liveData/boxscore/boxscore_{GAME}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"version": 1}})))
        .mount(&server)
        .await;

    let service = Courtside::from_config(&config(&server), TtlCache::new()).unwrap();
    let outcome = service.poll(GAME, None).await.unwrap();
    let Negotiation::Modified { view, .. } = outcome.negotiation else {
        panic!("expected a view");
    };
    assert!(view.status.is_none());
    assert!(view.scores.is_none());
    assert!(view.players.home.is_empty());
}

#[tokio::test]
async fn test_poll_serves_stale_view_when_upstream_fails() {
    let server = MockServer::start().await;
    let box_path = format!("/static/json/liveData/boxscore/boxscore_{GAME}.json");
    Mock::given(method("GET"))
        .and(path(box_path.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(boxscore(88, 90)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(box_path))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let service = Courtside::from_config(&config(&server), TtlCache::new()).unwrap();
    let first = service.poll(GAME, None).await.unwrap();
    let token = first.negotiation.token().to_string();

    let second = service.poll(GAME, Some(&token)).await.unwrap();
    assert!(second.stale);
    assert!(!second.negotiation.is_modified());
}
