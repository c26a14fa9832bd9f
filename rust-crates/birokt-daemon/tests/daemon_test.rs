//! Daemon lifecycle against real adapters (no external commands)

mod test_helpers;

use test_helpers::*;

#[tokio::test]
async fn test_starts_idle_with_empty_draft() {
    let t = test_daemon().await;

    let status = status_json(&t.daemon).await;
    assert_eq!(status["state"], "idle");
    assert_eq!(status["session"]["draft"]["queenSeen"], false);
    assert_eq!(status["session"]["undoAvailable"], false);

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_utterances_need_listening() {
    let t = test_daemon().await;

    t.daemon.utterance("dronning sett");
    assert_eq!(status_json(&t.daemon).await["session"]["draft"]["queenSeen"], false);

    assert_eq!(t.daemon.listen().await.unwrap(), "Listening");
    t.daemon.utterance("dronning sett");
    let status = status_json(&t.daemon).await;
    assert_eq!(status["state"], "listening");
    assert_eq!(status["session"]["draft"]["queenSeen"], true);
    assert_eq!(status["session"]["undoDepth"], 1);

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_toggle_and_mute() {
    let t = test_daemon().await;

    assert_eq!(t.daemon.toggle().await.unwrap(), "Listening");
    assert_eq!(t.daemon.toggle().await.unwrap(), "Muted");
    assert_eq!(t.daemon.listen().await.unwrap(), "Listening");
    assert_eq!(t.daemon.mute().await.unwrap(), "Muted");
    assert_eq!(status_json(&t.daemon).await["state"], "idle");

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_alias_file_loaded() {
    let t = test_daemon_with_aliases(
        r#"
[[aliases]]
phrase = "kongen sett"
canonical = "dronning sett"
"#,
    )
    .await;

    t.daemon.listen().await.unwrap();
    t.daemon.utterance("Kongen sett");
    assert_eq!(status_json(&t.daemon).await["session"]["draft"]["queenSeen"], true);

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_save_writes_inspection_json_once() {
    let t = test_daemon().await;
    t.daemon.listen().await.unwrap();

    t.daemon.utterance("dronning sett, honning mye");
    t.daemon.utterance("lagre inspeksjon");
    t.daemon.utterance("lagre inspeksjon");
    let status = status_json(&t.daemon).await;
    assert_eq!(status["session"]["submitted"], true);

    let saved = t.inspections();
    assert_eq!(saved.len(), 1);
    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(saved[0].join("inspection.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["queenSeen"], true);
    assert_eq!(json["honeyStores"], "mye");
    assert_eq!(json["photos"].as_array().unwrap().len(), 0);

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_photo_without_camera_command_leaves_session_usable() {
    let t = test_daemon().await;
    t.daemon.listen().await.unwrap();

    t.daemon.utterance("ta bilde");
    t.daemon.utterance("egg sett");
    let status = status_json(&t.daemon).await;

    assert_eq!(status["session"]["cameraActive"], false);
    assert_eq!(status["session"]["pendingCapture"], false);
    assert_eq!(status["session"]["photoCount"], 0);
    assert_eq!(status["session"]["draft"]["eggsSeen"], true);

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_prefill_sets_weather() {
    let t = test_daemon().await;

    t.daemon
        .prefill(Some(17.0), Some("Sol".to_string()))
        .unwrap();
    let status = status_json(&t.daemon).await;

    assert_eq!(status["session"]["draft"]["temperature"], 17.0);
    assert_eq!(status["session"]["draft"]["weather"], "Sol");
    assert_eq!(status["session"]["undoAvailable"], false);

    t.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_session() {
    let t = test_daemon().await;
    t.daemon.listen().await.unwrap();

    t.daemon.shutdown().await.unwrap();

    assert!(t.daemon.status().await.is_err());
    assert!(t.daemon.listen().await.is_err());
    assert!(!t.config.ui_socket_path.exists());
}
