//! Live HTTP round trips: the element server on an ephemeral port, driven by
//! the crate's own lookup and score clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use essentia::config::ClientConfig;
use essentia::engine::{Action, EngineConfig, EngineCore};
use essentia::geometry::{Point, Size};
use essentia::remote::{CombinationLookup, HttpCombinationLookup, HttpScoreReporter, ScoreReporter};
use essentia::runtime::spawn_session;
use essentia::server::{self, CombinationGenerator, GenerateError, Recipe, RecipeBook, ServerState};
use essentia::tile::{FixedAdvance, Label};

/// Combines any pair into `"<first><second>✨"`.
struct Concatenate;

#[async_trait::async_trait]
impl CombinationGenerator for Concatenate {
    async fn generate(&self, first: &str, second: &str) -> Result<String, GenerateError> {
        Ok(format!("{first}{second}✨"))
    }
}

async fn start_server() -> (SocketAddr, ServerState) {
    start_with(seed_recipes()).await
}

async fn start_with(state: ServerState) -> (SocketAddr, ServerState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state.clone()));
    (addr, state)
}

fn seed_recipes() -> ServerState {
    let recipes: RecipeBook = [
        Recipe { element1: "Water".into(), element2: "Fire".into(), result: "Steam".into() },
        Recipe { element1: "Stone".into(), element2: "Fire".into(), result: "Lava".into() },
    ]
    .into_iter()
    .collect();
    ServerState::new(recipes)
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig { base_url: format!("http://{addr}"), ..ClientConfig::default() }
}

#[tokio::test]
async fn healthz_is_ok() {
    let (addr, _) = start_server().await;
    let response = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn lookup_client_reads_known_and_unknown_pairs() {
    let (addr, _) = start_server().await;
    let lookup = HttpCombinationLookup::new(&client_config(addr)).unwrap();
    assert_eq!(lookup.combine("Water", "Fire").await.unwrap().as_deref(), Some("Steam"));
    assert_eq!(lookup.combine("Fire", "Stone").await.unwrap().as_deref(), Some("Lava"));
    assert_eq!(lookup.combine("Water", "Stone").await.unwrap(), None);
    // Elements with spaces and emoji survive query encoding.
    assert_eq!(lookup.combine("White House🏛️", "Fire").await.unwrap(), None);
}

#[tokio::test]
async fn lookup_client_sees_generated_pairs() {
    let (addr, state) = start_with(seed_recipes().with_generator(Arc::new(Concatenate))).await;
    let lookup = HttpCombinationLookup::new(&client_config(addr)).unwrap();
    assert_eq!(lookup.combine("Water", "Fire").await.unwrap().as_deref(), Some("Steam"));
    assert_eq!(lookup.combine("Sand", "Heat").await.unwrap().as_deref(), Some("SandHeat✨"));
    assert_eq!(state.recipes.read().await.lookup("Heat", "Sand"), Some("SandHeat✨"));
}

#[tokio::test]
async fn lookup_without_second_element_is_bad_request() {
    let (addr, _) = start_server().await;
    let response = reqwest::get(format!("http://{addr}/get_combination?element1=Water")).await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing element1 or element2");
}

#[tokio::test]
async fn score_client_submits_and_server_records() {
    let (addr, state) = start_server().await;
    let reporter = HttpScoreReporter::new(&client_config(addr)).unwrap();
    let receipt = reporter.submit(3).await.unwrap();
    assert_eq!(receipt.score, 3);
    assert_eq!(receipt.message, "Score received successfully");
    assert_eq!(state.scores_received.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn score_without_value_is_bad_request() {
    let (addr, _) = start_server().await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/submit-score"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No score provided");
}

#[tokio::test]
async fn session_merges_through_live_server() {
    let (addr, state) = start_server().await;
    let config = client_config(addr);
    let core = EngineCore::with_config(
        Size::new(400.0, 300.0),
        EngineConfig { seed: Some(3), ..EngineConfig::default() },
        Box::new(FixedAdvance::default()),
    )
    .with_toolbar([Label::new("Water", "#0077ff"), Label::new("Fire", "#ff4d4d")]);
    let mut session = spawn_session(
        core,
        Arc::new(HttpCombinationLookup::new(&config).unwrap()),
        Arc::new(HttpScoreReporter::new(&config).unwrap()),
    );
    let handle = session.handle.clone();

    for (text, pt) in [("Water", Point::new(100.0, 100.0)), ("Fire", Point::new(170.0, 100.0))] {
        handle.select(Some(text.into())).await.unwrap();
        handle.pointer_down(pt).await.unwrap();
    }
    handle.select(None).await.unwrap();
    handle.pointer_down(Point::new(100.0, 100.0)).await.unwrap();
    handle.pointer_up(Point::new(160.0, 100.0)).await.unwrap();

    let created = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(Action::TilesMerged { created, .. }) = session.events.recv().await {
                return created;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(created.label.text, "Steam");

    handle.submit_score().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.scores_received.load(Ordering::Relaxed) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(state.scores_received.load(Ordering::Relaxed), 1);
}
