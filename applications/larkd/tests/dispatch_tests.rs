mod test_helpers;

use lark_core::LibraryStore;
use lark_playback::{PartyEntry, PartyScope};
use lark_storage::albums;
use larkd::{DaemonEvent, Flow};
use std::time::Duration;
use test_helpers::*;

#[tokio::test]
async fn test_select_plays_and_counts_popularity() {
    let db = TestDb::new().await;
    let (album, tracks) = db.album("Blue", "Trane", "Jazz", &["a1", "a2", "a3"], 60).await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send(&format!("select {}", tracks[0])).await;

    assert_eq!(
        daemon.take_output(),
        vec![
            "ok".to_string(),
            format!("current {}", tracks[0]),
            "status playing".to_string(),
        ]
    );
    assert_eq!(albums::get_by_id(&db.pool, album).await.unwrap().unwrap().popularity, 1);
    assert_eq!(daemon.catalog.popular_albums(40), vec![album]);
}

#[tokio::test]
async fn test_next_and_previous_follow_album_order() {
    let db = TestDb::new().await;
    let (_, tracks) = db.album("Blue", "Trane", "Jazz", &["a1", "a2", "a3"], 60).await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send(&format!("select {} - -", tracks[0])).await;
    daemon.send("next").await;
    assert_eq!(daemon.dispatcher.player().current_track_id(), Some(tracks[1]));

    daemon.send("prev").await;
    daemon.send("prev").await;
    // Wraps to the end of the only album
    assert_eq!(daemon.dispatcher.player().current_track_id(), Some(tracks[2]));
}

#[tokio::test]
async fn test_queue_commands() {
    let db = TestDb::new().await;
    let (_, a) = db.album("A", "X", "Rock", &["a1", "a2"], 60).await;
    let (_, b) = db.album("B", "Y", "Pop", &["b1"], 60).await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send(&format!("select {}", a[0])).await;
    daemon.send(&format!("enqueue {}", b[0])).await;
    daemon.send(&format!("enqueue {}", a[1])).await;
    daemon.take_output();

    daemon.send("queue").await;
    assert_eq!(daemon.take_output(), vec![format!("queue {} {}", b[0], a[1])]);

    daemon.send("dequeue 999").await;
    assert_eq!(daemon.take_output(), vec!["error track 999 is not queued".to_string()]);

    daemon.send("next").await;
    assert_eq!(daemon.dispatcher.player().current_track_id(), Some(b[0]));
    assert!(daemon.take_output().contains(&"playlist 1".to_string()));

    daemon.send("clear-queue").await;
    daemon.send("queue").await;
    assert_eq!(daemon.take_output().last().map(String::as_str), Some("queue"));
}

#[tokio::test]
async fn test_end_of_stream_advances_and_reports_progress() {
    let db = TestDb::new().await;
    let (_, tracks) = db.album("Short", "X", "Rock", &["s1", "s2"], 1).await;
    let mut config = db.config();
    config.playback.progress_interval_ms = 100;
    let mut daemon = Daemon::with_config(&db, config).await;

    daemon.send(&format!("select {}", tracks[0])).await;
    let second = tracks[1];
    tokio::time::timeout(
        Duration::from_secs(10),
        daemon.run_until(|d| d.player().current_track_id() == Some(second)),
    )
    .await
    .expect("end of stream never arrived");

    let output = daemon.take_output();
    assert!(output.iter().any(|line| line.starts_with("progress 0 1")));
    assert!(output.contains(&format!("current {}", second)));
}

#[tokio::test]
async fn test_stale_end_of_stream_is_dropped() {
    let db = TestDb::new().await;
    let (_, tracks) = db.album("A", "X", "Rock", &["a1", "a2"], 60).await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send(&format!("select {}", tracks[0])).await;
    daemon
        .dispatcher
        .handle(DaemonEvent::EndOfStream { generation: 0 })
        .await
        .unwrap();

    assert_eq!(daemon.dispatcher.player().current_track_id(), Some(tracks[0]));
}

#[tokio::test]
async fn test_party_scope_survives_restart() {
    let db = TestDb::new().await;
    db.album("A", "X", "Rock", &["a1"], 60).await;

    let mut daemon = Daemon::start(&db).await;
    daemon.send("party-scope 1,popular").await;
    assert_eq!(
        daemon.take_output(),
        vec!["ok".to_string(), "party-scope 1,popular".to_string()]
    );
    daemon.send("shuffle on").await;

    let restarted = Daemon::start(&db).await;
    let player = restarted.dispatcher.player();
    assert_eq!(
        player.party_scope(),
        &PartyScope::from_entries([PartyEntry::Genre(1), PartyEntry::Popular])
    );
    assert!(player.is_shuffle());
}

#[tokio::test]
async fn test_now_playing() {
    let db = TestDb::new().await;
    let (_, tracks) = db.album("Blue", "Trane", "Jazz", &["Locomotion"], 60).await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send("now").await;
    assert_eq!(daemon.take_output(), vec!["now none".to_string()]);

    daemon.send(&format!("load {}", tracks[0])).await;
    daemon.take_output();
    daemon.send("now").await;

    let output = daemon.take_output();
    assert_eq!(output.len(), 1);
    let json: serde_json::Value = serde_json::from_str(output[0].strip_prefix("now ").unwrap()).unwrap();
    assert_eq!(json["title"], "Locomotion");
    assert_eq!(json["artist"], "Trane");
    assert_eq!(json["genre"], "Jazz");
    assert_eq!(json["status"], "playing");
}

#[tokio::test]
async fn test_bad_lines_and_quit() {
    let db = TestDb::new().await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send("").await;
    daemon.send("dance").await;
    daemon.send("load 77").await;

    let output = daemon.take_output();
    assert_eq!(output.len(), 2);
    assert!(output[0].starts_with("error Invalid command"));
    // Unknown tracks are ignored by the player
    assert_eq!(output[1], "ok");

    let flow = daemon
        .dispatcher
        .handle(DaemonEvent::Line("quit".to_string()))
        .await
        .unwrap();
    assert_eq!(flow, Flow::Quit);
}

#[tokio::test]
async fn test_search() {
    let db = TestDb::new().await;
    let (_, tracks) = db.album("Kind of Blue", "Miles", "Jazz", &["So What", "Blue in Green"], 60).await;
    let mut daemon = Daemon::start(&db).await;

    daemon.send("search green").await;
    assert_eq!(
        daemon.take_output(),
        vec![format!("track {}\tBlue in Green", tracks[1]), "ok".to_string()]
    );
}

#[tokio::test]
async fn test_scan_refreshes_catalog() {
    let db = TestDb::new().await;
    let config = db.config();
    write_silent_wav(&config.library.music_dir.join("new.wav"), 1);
    let mut daemon = Daemon::with_config(&db, config).await;
    assert_eq!(daemon.catalog.track_count(), 0);

    daemon.send("scan").await;
    daemon.send("scan").await;
    tokio::time::timeout(
        Duration::from_secs(10),
        daemon.run_until(|d| !d.is_scanning()),
    )
    .await
    .expect("scan never finished");

    let output = daemon.take_output();
    assert_eq!(output[0], "ok");
    assert_eq!(output[1], "error scan already running");
    assert_eq!(output[2], "scan added=1 kept=0 removed=0 errors=0 genres=1");
    assert_eq!(daemon.catalog.track_count(), 1);
}

#[tokio::test]
async fn test_scan_failure_is_reported() {
    let db = TestDb::new().await;
    let mut daemon = Daemon::start(&db).await;

    // The configured music directory does not exist
    daemon.send("scan").await;
    tokio::time::timeout(
        Duration::from_secs(10),
        daemon.run_until(|d| !d.is_scanning()),
    )
    .await
    .expect("scan never finished");

    let output = daemon.take_output();
    assert!(output[1].starts_with("error scan failed"));
}
