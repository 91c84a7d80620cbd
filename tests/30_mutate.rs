mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn upsert_inserts_then_replaces_with_null() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let first = json!({ "upserts": [{ "seq": 1, "name": "Alice", "note": "vip", "gold": "250" }] });
    let res = server.mutate("gala", &first).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "ok": true }));

    let row = &server.list("gala", &[]).await?["rows"][0];
    assert_eq!(row["note"], "vip");
    assert_eq!(row["gold"], 250.0);
    let stamped = row["updated_at"].as_str().unwrap_or_default().to_string();
    assert!(!stamped.is_empty());

    let second = json!({ "upserts": [{ "seq": 1, "name": "Alice B", "note": null }] });
    assert_eq!(server.mutate("gala", &second).await?.status(), StatusCode::OK);

    let listed = server.list("gala", &[]).await?;
    assert_eq!(listed["total"], 1);
    let row = &listed["rows"][0];
    assert_eq!(row["name"], "Alice B");
    assert_eq!(row["note"], Value::Null);
    assert_eq!(row["gold"], Value::Null);
    assert_eq!(server.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn combined_upsert_and_delete_in_one_call() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;
    server.mutate("spring", &common::twelve_members()).await?;

    let body = json!({
        "upserts": [{ "seq": 13, "name": "Newcomer", "powerMetric": 5 }],
        "deletes": [{ "seq": 1 }, { "seq": "2" }, { "seq": 99 }]
    });
    assert_eq!(server.mutate("spring", &body).await?.status(), StatusCode::OK);

    let listed = server.list("spring", &[("size", "100")]).await?;
    assert_eq!(listed["total"], 11);
    let seqs: Vec<i64> = listed["rows"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["seq"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(seqs.first(), Some(&3));
    assert_eq!(seqs.last(), Some(&13));
    assert_eq!(listed["rows"][10]["power_m"], 5.0);
    Ok(())
}

#[tokio::test]
async fn deletes_only_touch_the_named_event() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;
    server.mutate("spring", &common::twelve_members()).await?;
    server.mutate("autumn", &common::twelve_members()).await?;

    let res = server.mutate("spring", &json!({ "deletes": [{ "seq": 1 }, { "seq": 2 }, { "seq": 3 }] })).await?;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(server.list("spring", &[]).await?["total"], 9);
    assert_eq!(server.list("autumn", &[]).await?["total"], 12);
    Ok(())
}

#[tokio::test]
async fn empty_mutation_is_a_no_op() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let res = server.mutate("gala", &json!({})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_rejected() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    for raw in ["", "   ", "{not json", "[1,2]", "\"text\""] {
        let res = server
            .client
            .post(server.members_url("gala"))
            .header("x-edit-key", common::EDIT_KEY)
            .header("content-type", "application/json")
            .body(raw)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {:?}", raw);
        let body: Value = res.json().await?;
        assert_eq!(body["ok"], Value::Bool(false));
        assert!(body["error"].is_string());
    }
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn invalid_rows_reject_the_whole_batch() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let bad = [
        json!({ "upserts": [{ "seq": 1, "name": "ok" }, { "name": "missing seq" }] }),
        json!({ "upserts": [{ "seq": 1.5 }] }),
        json!({ "upserts": "nope" }),
        json!({ "deletes": [2] }),
        json!({ "deletes": [{ "seq": "x" }] }),
        json!({ "deletes": 7 }),
    ];
    for body in bad {
        let res = server.mutate("gala", &body).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn repeated_seq_in_one_batch_is_rejected() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let body = json!({ "upserts": [{ "seq": 4, "name": "a" }, { "seq": 4, "name": "b" }] });
    let res = server.mutate("gala", &body).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_405_with_allow() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let res = server.client.put(server.members_url("gala")).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = res
        .headers()
        .get("allow")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(allow, "GET, POST");
    let body: Value = res.json().await?;
    assert_eq!(body["ok"], Value::Bool(false));
    Ok(())
}
