//! HTTP surface: real router on an ephemeral port, driven with reqwest.

use std::sync::Arc;

use async_trait::async_trait;
use rizzonator_lib::llm::{provider, CompletionGateway, GatewayError};
use rizzonator_lib::profile::ProfileStore;
use rizzonator_lib::rules::Rules;
use rizzonator_lib::server::{self, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct FixedGateway(&'static str);

#[async_trait]
impl CompletionGateway for FixedGateway {
    async fn complete(&self, _system: &str, _transcript: &str) -> Result<String, GatewayError> {
        Ok(self.0.to_string())
    }
}

async fn start(dir: &std::path::Path) -> String {
    let state = AppState::new(
        Arc::new(FixedGateway("INCOMING\nHey!\nWhat's up?\nYo!")),
        provider::openrouter(),
        None,
        Rules::default(),
        ProfileStore::new(dir),
        1024,
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, state).await.unwrap();
    });
    format!("http://{addr}")
}

fn answers() -> Value {
    json!({
        "name": "Sam",
        "userGender": "Male",
        "targetGender": "Female",
        "struggle": "Getting replies",
        "platform": "Tinder / Bumble / Hinge",
        "blocker": "Not knowing what to say",
        "preferredRizz": "smooth",
        "votes": [false, false, false, false, true, true, false, false]
    })
}

#[tokio::test]
async fn rizz_endpoint_returns_replies() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/api/rizz"))
        .json(&json!({
            "messages": [{ "text": "u up?", "side": "left" }, "what should i text her"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["replies"], json!(["Hey!", "What's up?", "Yo!"]));
    assert_eq!(body["mode"], "suggest_reply");
    assert_eq!(body["direction"], "INCOMING");
}

#[tokio::test]
async fn rizz_endpoint_never_fails_the_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;
    let client = reqwest::Client::new();

    let empty = client
        .post(format!("{base}/api/rizz"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), 200);
    let body: Value = empty.json().await.unwrap();
    assert_eq!(body, json!({ "replies": ["Hey 👋 How can I help?"] }));

    let garbage = client
        .post(format!("{base}/api/rizz"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), 200);
    let body: Value = garbage.json().await.unwrap();
    assert_eq!(body["replies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rizz_endpoint_tolerates_odd_message_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;
    let client = reqwest::Client::new();

    let not_a_list: Value = client
        .post(format!("{base}/api/rizz"))
        .json(&json!({ "messages": "hi" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(not_a_list, json!({ "replies": ["Hey 👋 How can I help?"] }));

    let mixed: Value = client
        .post(format!("{base}/api/rizz"))
        .json(&json!({ "messages": [1, "what should i text her"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mixed["mode"], "suggest_reply");
    assert_eq!(mixed["replies"], json!(["Hey!", "What's up?", "Yo!"]));
}

#[tokio::test]
async fn screenshot_endpoint_accepts_client_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/screenshot"))
        .json(&json!({
            "ocr": { "text": "Today\nhey you\nhow was the concert", "imageWidth": 800 }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["replies"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn onboarding_definition_lists_questions_and_lines() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;

    let body: Value = reqwest::get(format!("{base}/api/onboarding"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["questions"].as_array().unwrap().len(), 7);
    assert_eq!(body["questions"][0]["step"], "name");
    assert_eq!(body["calibrationLines"].as_array().unwrap().len(), 8);
    assert_eq!(body["calibrationLines"][0]["style"], "smooth");
}

#[tokio::test]
async fn profile_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;
    let client = reqwest::Client::new();

    let created = client
        .post(format!("{base}/api/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    let uid = created.json::<Value>().await.unwrap()["uid"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(uid.len(), 6);

    let missing = client
        .get(format!("{base}/api/profile/{uid}"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let saved = client
        .put(format!("{base}/api/profile/{uid}"))
        .json(&answers())
        .send()
        .await
        .unwrap();
    assert_eq!(saved.status(), 200);

    let profile: Value = client
        .get(format!("{base}/api/profile/{uid}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["name"], "Sam");
    // Two "yes" votes on bold lines override the picked style.
    assert_eq!(profile["preferredRizz"], "bold");
    assert_eq!(profile["rizzScore"]["bold"], 2);

    assert!(dir.path().join(format!("profiles/{uid}.json")).exists());
}

#[tokio::test]
async fn profile_errors_map_to_status_codes() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;
    let client = reqwest::Client::new();

    let bad_uid = client
        .get(format!("{base}/api/profile/12ab"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_uid.status(), 400);

    let mut invalid = answers();
    invalid["platform"] = json!("Carrier pigeon");
    let rejected = client
        .put(format!("{base}/api/profile/123456"))
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);
    assert!(rejected.text().await.unwrap().contains("Carrier pigeon"));

    let incomplete = client
        .put(format!("{base}/api/profile/123456"))
        .json(&json!({ "name": "Sam" }))
        .send()
        .await
        .unwrap();
    assert_eq!(incomplete.status(), 400);
    assert!(incomplete.text().await.unwrap().contains("userGender"));
    assert!(!dir.path().join("profiles/123456.json").exists());
}

#[tokio::test]
async fn concurrent_profile_creation_hands_out_distinct_uids() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;
    let client = reqwest::Client::new();

    let requests = (0..8).map(|_| {
        let client = client.clone();
        let url = format!("{base}/api/profile");
        tokio::spawn(async move {
            let resp = client.post(url).send().await.unwrap();
            assert_eq!(resp.status(), 201);
            resp.json::<Value>().await.unwrap()["uid"]
                .as_str()
                .unwrap()
                .to_string()
        })
    });

    let mut uids = std::collections::BTreeSet::new();
    for handle in requests.collect::<Vec<_>>() {
        uids.insert(handle.await.unwrap());
    }
    assert_eq!(uids.len(), 8);

    let registry: Vec<String> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("uids.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(registry.len(), 8);
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(dir.path()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"]["id"], "openrouter");
    assert!(body["provider"]["name"].as_str().unwrap().contains("OpenRouter"));
    assert!(body["provider"].get("envKey").is_none());
    assert_eq!(body["ocr"], false);
}
