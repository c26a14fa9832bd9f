use std::time::Duration;

use birokt_broadcaster::UiBroadcaster;
use birokt_voice::{InspectionDraft, ListeningState, SessionSnapshot};
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;

fn snapshot(photo_count: u32, undo_depth: usize) -> SessionSnapshot {
    let mut draft = InspectionDraft::new();
    draft.queen_seen = true;
    SessionSnapshot {
        draft,
        camera_active: false,
        pending_capture: false,
        photo_count,
        notes_mode: false,
        undo_available: undo_depth > 0,
        undo_depth,
        submitted: false,
    }
}

/// Read lines until `count` arrive or nothing more shows up
async fn read_lines(reader: &mut BufReader<UnixStream>, count: usize) -> Vec<serde_json::Value> {
    let mut events = Vec::new();
    for _ in 0..count {
        let mut line = String::new();
        match tokio::time::timeout(Duration::from_millis(500), reader.read_line(&mut line)).await {
            Ok(Ok(n)) if n > 0 => events.push(serde_json::from_str(line.trim()).unwrap()),
            _ => break,
        }
    }
    events
}

#[tokio::test]
async fn test_broadcaster_lifecycle() {
    let temp_dir = tempdir().unwrap();
    let socket_path = temp_dir.path().join("test.sock");

    let broadcaster = UiBroadcaster::new(&socket_path).await.unwrap();

    broadcaster.start().await.unwrap();
    assert!(socket_path.exists());
    assert!(broadcaster.start().await.is_err());

    broadcaster.stop().await.unwrap();
    assert!(!socket_path.exists());
    assert!(broadcaster.stop().await.is_err());
}

#[tokio::test]
async fn test_client_catch_up() {
    let temp_dir = tempdir().unwrap();
    let socket_path = temp_dir.path().join("test_catchup.sock");

    let broadcaster = UiBroadcaster::new(&socket_path).await.unwrap();
    broadcaster.start().await.unwrap();

    broadcaster.broadcast_state_change(ListeningState::Listening).await;
    broadcaster.start_session(123).await;
    broadcaster.add_feedback("Dronning sett", Duration::from_secs(4)).await;
    broadcaster.broadcast_snapshot(&snapshot(2, 1)).await;

    let stream = UnixStream::connect(&socket_path).await.unwrap();
    let mut reader = BufReader::new(stream);

    // state_change, session_start, feedback, draft, photos, undo
    let events = read_lines(&mut reader, 6).await;
    assert_eq!(events.len(), 6);

    assert_eq!(events[0]["type"], "state_change");
    assert_eq!(events[0]["state"], "listening");
    assert_eq!(events[1]["type"], "session_start");
    assert_eq!(events[1]["session_id"], 123);
    assert_eq!(events[2]["type"], "feedback");
    assert_eq!(events[2]["message"], "Dronning sett");
    assert_eq!(events[2]["ttl_ms"], 4000);
    assert_eq!(events[3]["type"], "draft");
    assert_eq!(events[3]["draft"]["queenSeen"], true);
    assert_eq!(events[4]["type"], "photos");
    assert_eq!(events[4]["count"], 2);
    assert_eq!(events[5]["type"], "undo");
    assert_eq!(events[5]["available"], true);

    broadcaster.stop().await.unwrap();
}

#[tokio::test]
async fn test_catch_up_without_session() {
    let temp_dir = tempdir().unwrap();
    let socket_path = temp_dir.path().join("test_idle.sock");

    let broadcaster = UiBroadcaster::new(&socket_path).await.unwrap();
    broadcaster.start().await.unwrap();

    let stream = UnixStream::connect(&socket_path).await.unwrap();
    let mut reader = BufReader::new(stream);

    // state_change, photos, undo
    let events = read_lines(&mut reader, 3).await;
    let types: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap().to_string()).collect();
    assert_eq!(types, vec!["state_change", "photos", "undo"]);
    assert_eq!(events[0]["state"], "idle");

    broadcaster.stop().await.unwrap();
}

#[tokio::test]
async fn test_broadcast_to_multiple_clients() {
    let temp_dir = tempdir().unwrap();
    let socket_path = temp_dir.path().join("test_multi.sock");

    let broadcaster = UiBroadcaster::new(&socket_path).await.unwrap();
    broadcaster.start().await.unwrap();

    let mut reader1 = BufReader::new(UnixStream::connect(&socket_path).await.unwrap());
    let mut reader2 = BufReader::new(UnixStream::connect(&socket_path).await.unwrap());

    // Drain catch-up so both clients are registered
    read_lines(&mut reader1, 3).await;
    read_lines(&mut reader2, 3).await;
    for _ in 0..50 {
        if broadcaster.client_count().await == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(broadcaster.client_count().await, 2);

    broadcaster.broadcast_correction("dronning sett", 0.92).await;

    for reader in [&mut reader1, &mut reader2] {
        let events = read_lines(reader, 1).await;
        assert_eq!(events[0]["type"], "correction");
        assert_eq!(events[0]["matched"], "dronning sett");
    }

    broadcaster.stop().await.unwrap();
}

#[tokio::test]
async fn test_dead_client_removed() {
    let temp_dir = tempdir().unwrap();
    let socket_path = temp_dir.path().join("test_dead.sock");

    let broadcaster = UiBroadcaster::new(&socket_path).await.unwrap();
    broadcaster.start().await.unwrap();

    {
        let mut reader = BufReader::new(UnixStream::connect(&socket_path).await.unwrap());
        read_lines(&mut reader, 3).await;
    }

    for _ in 0..50 {
        if broadcaster.client_count().await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // Writes to a closed peer fail eventually; a few sends flush it out
    for _ in 0..5 {
        broadcaster.broadcast_notice("Lagring feilet").await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(broadcaster.client_count().await, 0);
    broadcaster.stop().await.unwrap();
}

#[tokio::test]
async fn test_session_start_clears_feedback_log() {
    let temp_dir = tempdir().unwrap();
    let socket_path = temp_dir.path().join("test_log.sock");

    let broadcaster = UiBroadcaster::new(&socket_path).await.unwrap();
    broadcaster.start().await.unwrap();

    broadcaster.start_session(1).await;
    broadcaster.add_feedback("Honning: mye", Duration::from_secs(4)).await;
    broadcaster.add_feedback("Bilde 1 tatt", Duration::from_secs(4)).await;
    assert_eq!(broadcaster.feedback_count().await, 2);

    broadcaster.end_session(1).await;
    assert_eq!(broadcaster.feedback_count().await, 2);

    broadcaster.start_session(2).await;
    assert_eq!(broadcaster.feedback_count().await, 0);

    broadcaster.stop().await.unwrap();
}
