mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{entry_body, entry_with, TestApp};

async fn setup(app: &TestApp, email: &str, username: &str) -> Result<(String, String)> {
    let token = app.sign_up(email, username).await?;
    let journal = app.create_journal(&token, "Forex Main").await?;
    Ok((token, journal))
}

fn entries_uri(journal: &str) -> String {
    format!("/api/v1/journals/{}/entries", journal)
}

#[tokio::test]
async fn statistics_after_one_winning_trade() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "stats@example.com", "stats").await?;
    let (status, _) = app.create_entry(&token, &journal, entry_body()).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("{}/statistics", entries_uri(&journal)),
            Some(&token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "total_trades": 1,
            "wins": 1,
            "losses": 0,
            "break_even": 0,
            "win_rate": 100.0,
            "total_realized": 120.5,
            "avg_risk_reward": 2.5
        })
    );
    Ok(())
}

#[tokio::test]
async fn statistics_of_an_empty_journal_are_zero() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "empty@example.com", "empty").await?;
    let (status, body) = app
        .send(
            Method::GET,
            &format!("{}/statistics", entries_uri(&journal)),
            Some(&token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_trades"], 0);
    assert_eq!(body["data"]["win_rate"], 0.0);
    assert_eq!(body["data"]["total_realized"], 0.0);
    Ok(())
}

#[tokio::test]
async fn mixed_results_fill_every_bucket() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "mixed@example.com", "mixed").await?;
    for (result, realized, rr) in [("TP", 100.0, 3.0), ("SL", -50.0, 2.0), ("BE", 0.0, 1.0), ("TP", 80.0, 2.0)] {
        let (status, _) = app
            .create_entry(
                &token,
                &journal,
                entry_with(json!({ "result": result, "realized": realized, "max_rr": rr })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app
        .send(
            Method::GET,
            &format!("{}/statistics", entries_uri(&journal)),
            Some(&token),
            None,
        )
        .await?;
    let stats = &body["data"];
    assert_eq!(stats["total_trades"], 4);
    assert_eq!(stats["wins"], 2);
    assert_eq!(stats["losses"], 1);
    assert_eq!(stats["break_even"], 1);
    assert_eq!(stats["win_rate"], 50.0);
    assert_eq!(stats["total_realized"], 130.0);
    assert_eq!(stats["avg_risk_reward"], 2.0);
    Ok(())
}

#[tokio::test]
async fn created_entry_reads_back_with_identical_fields() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "rt@example.com", "roundtrip").await?;
    let (_, created) = app.create_entry(&token, &journal, entry_body()).await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, read) = app
        .send(Method::GET, &format!("{}/{}", entries_uri(&journal), id), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"], created["data"]);

    let sent = entry_body();
    for field in [
        "asset", "ltf", "htf", "entry_charts", "session", "trade_type", "setup", "direction",
        "entry_type", "realized", "max_rr", "result", "notes",
    ] {
        assert_eq!(read["data"][field], sent[field], "field {}", field);
    }
    assert_eq!(read["data"]["journal_id"], Value::String(journal));
    Ok(())
}

#[tokio::test]
async fn max_rr_must_be_strictly_positive() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "rr@example.com", "riskreward").await?;

    let (status, body) = app
        .create_entry(&token, &journal, entry_with(json!({ "max_rr": 0 })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["max_rr"].is_string());

    let (status, body) = app
        .create_entry(&token, &journal, entry_with(json!({ "max_rr": 0.01 })))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["max_rr"], 0.01);
    Ok(())
}

#[tokio::test]
async fn each_invalid_enum_names_its_field() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "enum@example.com", "enums").await?;

    let cases = [
        (json!({ "asset": "BTCUSD" }), "asset", "invalid currency pair asset"),
        (json!({ "ltf": "2H" }), "ltf", "invalid lower timeframe (LTF)"),
        (json!({ "session": "sydney" }), "session", "invalid trading session"),
        (json!({ "direction": "long" }), "direction", "invalid trade direction"),
        (json!({ "result": "WIN" }), "result", "invalid trade result"),
    ];
    for (overrides, field, message) in cases {
        let (status, body) = app.create_entry(&token, &journal, entry_with(overrides)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {}", field);
        assert_eq!(body["error"], message);
        assert_eq!(body["field_errors"][field], message);
    }

    // first failing check wins
    let (_, body) = app
        .create_entry(&token, &journal, entry_with(json!({ "asset": "XXX", "result": "WIN" })))
        .await?;
    assert_eq!(body["error"], "invalid currency pair asset");
    Ok(())
}

#[tokio::test]
async fn entry_seen_through_another_journal_is_forbidden_on_read() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "cross@example.com", "crosser").await?;
    let second = app.create_journal(&token, "Second").await?;
    let (_, created) = app.create_entry(&token, &journal, entry_body()).await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    let wrong = format!("{}/{}", entries_uri(&second), id);
    let (status, body) = app.send(Method::GET, &wrong, Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access denied");

    let (status, _) = app
        .send(Method::PUT, &wrong, Some(&token), Some(entry_body()))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::DELETE, &wrong, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // untouched in its real journal
    let (status, _) = app
        .send(Method::GET, &format!("{}/{}", entries_uri(&journal), id), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn another_users_entries_are_unreachable() -> Result<()> {
    let app = TestApp::new();
    let (owner, journal) = setup(&app, "own@example.com", "owner").await?;
    let intruder = app.sign_up("int@example.com", "intruder").await?;
    let (_, created) = app.create_entry(&owner, &journal, entry_body()).await?;
    let uri = format!("{}/{}", entries_uri(&journal), created["data"]["id"].as_str().unwrap_or_default());

    for method in [Method::GET, Method::DELETE] {
        let (status, _) = app.send(method, &uri, Some(&intruder), None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = app.create_entry(&intruder, &journal, entry_body()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_and_delete_an_entry() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "upd@example.com", "updater").await?;
    let (_, created) = app.create_entry(&token, &journal, entry_body()).await?;
    let uri = format!("{}/{}", entries_uri(&journal), created["data"]["id"].as_str().unwrap_or_default());

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(&token),
            Some(entry_with(json!({ "result": "SL", "realized": -35.75 }))),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "SL");
    assert_eq!(body["data"]["realized"], -35.75);
    assert_eq!(body["data"]["created_at"], created["data"]["created_at"]);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn listing_supports_filters_and_rejects_unknown_values() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "filter@example.com", "filterer").await?;
    app.create_entry(&token, &journal, entry_body()).await?;
    app.create_entry(
        &token,
        &journal,
        entry_with(json!({ "asset": "GBPJPY", "session": "asia", "result": "SL", "day": "2024-04-02T03:00:00Z" })),
    )
    .await?;

    let (status, body) = app
        .send(Method::GET, &format!("{}?asset=GBPJPY", entries_uri(&journal)), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["asset"], "GBPJPY");

    let (_, body) = app
        .send(
            Method::GET,
            &format!("{}?start_date=2024-03-01&end_date=2024-03-31", entries_uri(&journal)),
            Some(&token),
            None,
        )
        .await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["asset"], "EURUSD");

    // newest trade day first
    let (_, body) = app.send(Method::GET, &entries_uri(&journal), Some(&token), None).await?;
    assert_eq!(body["data"]["items"][0]["asset"], "GBPJPY");

    let (status, body) = app
        .send(Method::GET, &format!("{}?session=sydney", entries_uri(&journal)), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["session"], "invalid trading session");
    Ok(())
}

#[tokio::test]
async fn malformed_entry_id_is_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let (token, journal) = setup(&app, "id@example.com", "idcheck").await?;
    let (status, body) = app
        .send(Method::GET, &format!("{}/nope", entries_uri(&journal)), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["entry_id"], "invalid entry ID");
    Ok(())
}
