#![allow(clippy::unwrap_used)]

use std::net::TcpListener;

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, header, method, path},
};

use bracket_sync::{
    accounts::Account,
    challonge::ChallongeClient,
    config::SyncConfig,
    error::SyncError,
    reconcile::{Action, Intent, Reconciliation, Reconciler},
    tournament::LocalTournament,
};

// base64("alice:secret")
const AUTHORIZATION: &str = "Basic YWxpY2U6c2VjcmV0";

fn config(api_base: &str) -> SyncConfig {
    SyncConfig {
        api_base: api_base.to_string(),
        timeout_secs: 5,
        game_id: Some(41),
        ..SyncConfig::default()
    }
}

fn owner() -> Account {
    Account {
        username: "alice".to_string(),
        challonge_username: "alice".to_string(),
        challonge_api_key: Some("secret".to_string()),
    }
}

fn tournament() -> LocalTournament {
    LocalTournament {
        id: 1,
        external_id: "summer_series".to_string(),
        name: "Summer Series".to_string(),
        description: "Week one".to_string(),
        scheduled_date: None,
        owner: 1,
    }
}

/// The client blocks, so it runs off the runtime the mock server answers on.
async fn reconcile(
    api_base: String,
    intent: Intent,
) -> anyhow::Result<Result<Reconciliation, SyncError>> {
    let result = tokio::task::spawn_blocking(move || {
        let config = config(&api_base);
        let reconciler = Reconciler::new(ChallongeClient::new(&config)?, &config);
        reconciler.reconcile(&tournament(), &owner(), &intent)
    })
    .await?;

    Ok(result)
}

#[tokio::test]
async fn creates_a_missing_tournament() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tournaments/summer_series.json"))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"errors": ["Requested tournament not found"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tournaments.json"))
        .and(header("authorization", AUTHORIZATION))
        .and(body_partial_json(json!({"tournament": {
            "name": "Summer Series",
            "url": "summer_series",
            "game_id": 41,
            "ranked_by": "swiss system points"
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"tournament": {"url": "summer_series", "state": "pending"}}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let result = reconcile(server.uri(), Intent::Create).await??;
    assert_eq!(result.action, Action::Created);
    assert_eq!(result.address, "summer_series");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let body: Value = requests[1].body_json()?;
    assert!(body["tournament"]["start_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn taken_url_is_reported() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tournaments/summer_series.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tournaments.json"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"errors": ["Url has already been taken"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    match reconcile(server.uri(), Intent::Create).await? {
        Err(SyncError::ExternalService {
            status,
            message,
            raw,
        }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "Url has already been taken");
            assert_eq!(raw, json!({"errors": ["Url has already been taken"]}));
        }
        other => return Err(anyhow::Error::msg(format!("unexpected: {other:?}"))),
    }
    Ok(())
}

#[tokio::test]
async fn underway_rename_keeps_the_start_time() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tournaments/old_series.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"tournament": {"url": "old_series", "state": "underway"}}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/tournaments/old_series.json"))
        .and(header("authorization", AUTHORIZATION))
        .and(body_json(json!({"tournament": {
            "name": "Summer Series",
            "description": "Week one",
            "url": "summer_series"
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"tournament": {"url": "summer_series", "state": "underway"}}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let intent = Intent::new(true, Some("old_series".to_string()));
    let result = reconcile(server.uri(), intent).await??;
    assert_eq!(result.action, Action::Updated);
    assert_eq!(result.payload["tournament"]["url"], "summer_series");
    Ok(())
}

#[test]
fn unreachable_service_is_a_transport_error() -> anyhow::Result<()> {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        format!("http://{}", listener.local_addr()?)
    };
    let config = config(&address);
    let reconciler = Reconciler::new(ChallongeClient::new(&config)?, &config);

    let result = reconciler.reconcile(&tournament(), &owner(), &Intent::new(true, None));

    assert!(matches!(result, Err(SyncError::Transport(_))));
    Ok(())
}
