mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn one_row() -> Value {
    json!({ "upserts": [{ "seq": 1, "name": "Alice" }] })
}

#[tokio::test]
async fn missing_key_is_unauthorized_and_changes_nothing() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let res = server
        .client
        .post(server.members_url("gala"))
        .json(&one_row())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "ok": false, "error": "unauthorized" }));
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn wrong_key_is_unauthorized() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    for candidate in ["wrong", "test-edit-ke", "TEST-EDIT-KEY", ""] {
        let res = server
            .client
            .post(server.members_url("gala"))
            .header("x-edit-key", candidate)
            .json(&one_row())
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "key {:?}", candidate);
    }
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn unconfigured_key_refuses_every_mutation() -> Result<()> {
    let server = common::spawn_server(None).await?;

    let res = server
        .client
        .post(server.members_url("gala"))
        .header("x-edit-key", "anything")
        .json(&one_row())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn auth_is_checked_before_the_body() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;

    let res = server
        .client
        .post(server.members_url("gala"))
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn reads_do_not_need_the_key() -> Result<()> {
    let server = common::spawn_server(Some(common::EDIT_KEY)).await?;
    server.mutate("gala", &one_row()).await?;

    let body = server.list("gala", &[]).await?;
    assert_eq!(body["total"], 1);
    Ok(())
}
