//! Listening controller tests
//!
//! Drives a spawned controller through its handle the way the daemon does.


use std::sync::Arc;
use std::time::Duration;

use birokt_voice::{
    ControllerHandle, HoneyStores, ListeningController, ListeningState, SpeechRecognizer,
    VoiceError,
};
use test_helpers::*;

fn spawn(h: Harness) -> (ControllerHandle, Arc<FakeRecognizer>, Fakes) {
    let recognizer = Arc::new(FakeRecognizer::default());
    let Harness {
        engine,
        events,
        camera,
        speech,
        ..
    } = h;
    let (handle, _task) =
        ListeningController::spawn(engine, events, recognizer.clone() as Arc<dyn SpeechRecognizer>);
    (handle, recognizer, Fakes { camera, speech })
}

struct Fakes {
    camera: Arc<FakeCamera>,
    speech: Arc<RecordingSpeech>,
}

#[tokio::test]
async fn test_utterances_ignored_while_idle() {
    let (handle, _recognizer, _fakes) = spawn(harness());

    handle.on_utterance("dronning sett");
    let status = handle.status().await.unwrap();

    assert_eq!(status.state, ListeningState::Idle);
    assert!(!status.session.draft.queen_seen);
}

#[tokio::test]
async fn test_start_listening_processes_recognized_speech() {
    let (handle, recognizer, fakes) = spawn(harness());

    handle.start_listening().await.unwrap();
    assert!(recognizer.is_started());

    recognizer.hear("Dronning sett, honning mye");
    let status = handle.status().await.unwrap();

    assert_eq!(status.state, ListeningState::Listening);
    assert!(status.session.draft.queen_seen);
    assert_eq!(status.session.undo_depth, 2);
    assert_eq!(fakes.speech.tones(), 1);
}

#[tokio::test]
async fn test_arrival_order_preserved() {
    let (handle, recognizer, _fakes) = spawn(harness());
    handle.start_listening().await.unwrap();

    recognizer.hear("honning lite");
    recognizer.hear("honning mye");
    recognizer.hear("angre");
    recognizer.hear("honning middels");

    let status = handle.status().await.unwrap();
    assert_eq!(status.session.draft.honey_stores, Some(HoneyStores::Middels));
    assert_eq!(status.session.undo_depth, 2);
}

#[tokio::test]
async fn test_stop_listening_halts_dispatch() {
    let (handle, recognizer, _fakes) = spawn(harness());
    handle.start_listening().await.unwrap();

    // Sender kept past stop, as a late platform callback would
    let late = recognizer.sender.lock().unwrap().clone().unwrap();
    handle.stop_listening().await.unwrap();
    assert!(!recognizer.is_started());

    late.on_utterance("dronning sett");
    let status = handle.status().await.unwrap();
    assert!(!status.session.draft.queen_seen);
}

#[tokio::test]
async fn test_toggle() {
    let (handle, _recognizer, fakes) = spawn(harness());

    assert_eq!(handle.toggle().await.unwrap(), ListeningState::Listening);
    assert_eq!(handle.toggle().await.unwrap(), ListeningState::Idle);
    assert_eq!(handle.toggle().await.unwrap(), ListeningState::Listening);

    handle.on_utterance("start kamera");
    handle.status().await.unwrap();
    // One tone per wake, spoken before the first confirmation
    assert_eq!(fakes.speech.tones(), 1);
    assert_eq!(fakes.speech.spoken(), vec!["Kamera på"]);
}

#[tokio::test]
async fn test_pending_photo_completes_through_loop() {
    let (handle, recognizer, fakes) = spawn(harness());
    handle.start_listening().await.unwrap();

    recognizer.hear("ta bilde");
    let status = handle.status().await.unwrap();
    assert!(status.session.pending_capture);

    fakes.camera.set_ready(true);

    let mut photos = 0;
    for _ in 0..100 {
        photos = handle.status().await.unwrap().session.photo_count;
        if photos == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(photos, 1);
}

#[tokio::test]
async fn test_shutdown_closes_session() {
    let (handle, recognizer, fakes) = spawn(harness());
    handle.start_listening().await.unwrap();
    recognizer.hear("start kamera");
    handle.status().await.unwrap();

    handle.shutdown().await.unwrap();

    assert!(!recognizer.is_started());
    assert_eq!(fakes.camera.stops(), 1);
    assert!(matches!(
        handle.status().await,
        Err(VoiceError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_dropping_every_handle_ends_loop() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let Harness {
        engine,
        events,
        camera,
        ..
    } = harness();
    let (handle, task) =
        ListeningController::spawn(engine, events, recognizer.clone() as Arc<dyn SpeechRecognizer>);

    handle.start_listening().await.unwrap();
    recognizer.hear("start kamera");
    handle.status().await.unwrap();

    // The recognizer still holds its utterance sender
    drop(handle);
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("controller loop kept running without handles")
        .unwrap();

    assert!(!recognizer.is_started());
    assert_eq!(camera.stops(), 1);
    recognizer.hear("dronning sett");
}
