//! Catalog snapshot loaded from a real database


use lark_core::LibraryStore;
use lark_storage::{albums, library, tracks, Catalog};
use std::path::PathBuf;
use test_helpers::*;

#[tokio::test]
async fn test_catalog_loads_library() {
    let db = TestDb::new().await;
    let pool = db.pool();

    let blue = create_test_album(pool, "Blue Train", "Coltrane", "Jazz").await;
    let giant = create_test_album(pool, "Giant Steps", "Coltrane", "Jazz").await;
    let t2 = create_test_track(pool, blue, "Moment's Notice", 2).await;
    let t1 = create_test_track(pool, blue, "Blue Train", 1).await;
    let t3 = create_test_track(pool, giant, "Giant Steps", 1).await;

    let catalog = Catalog::load(pool).await.unwrap();

    assert_eq!(catalog.track_count(), 3);
    assert_eq!(catalog.album_count(), 2);
    assert_eq!(catalog.track_ids_by_album(blue), vec![t1, t2]);
    assert_eq!(catalog.album_id_by_track(t3), Some(giant));

    let album = catalog.album(blue).unwrap();
    assert_eq!(catalog.artist_name(album.artist_id).as_deref(), Some("Coltrane"));
    assert_eq!(catalog.genre_name(album.genre_id).as_deref(), Some("Jazz"));
    assert_eq!(catalog.albums_by_artist(album.artist_id), vec![blue, giant]);
}

#[tokio::test]
async fn test_popularity_flush_persists_bumps() {
    let db = TestDb::new().await;
    let pool = db.pool();

    let a = create_test_album(pool, "A", "X", "Rock").await;
    let b = create_test_album(pool, "B", "X", "Rock").await;
    create_test_track(pool, a, "a1", 1).await;
    create_test_track(pool, b, "b1", 1).await;

    let catalog = Catalog::load(pool).await.unwrap();
    assert!(catalog.popular_albums(40).is_empty());

    catalog.increment_popularity(a);
    catalog.increment_popularity(b);
    catalog.increment_popularity(b);
    assert_eq!(catalog.popular_albums(40), vec![a, b]);

    // Nothing reaches the database before the flush
    assert!(albums::popular(pool, 40).await.unwrap().is_empty());

    let written = catalog.flush_popularity(pool).await.unwrap();
    assert_eq!(written, 2);
    assert_eq!(albums::popular(pool, 40).await.unwrap(), vec![a, b]);
    assert_eq!(albums::get_by_id(pool, b).await.unwrap().unwrap().popularity, 2);

    // The journal is drained
    assert_eq!(catalog.flush_popularity(pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_refresh_picks_up_new_rows() {
    let db = TestDb::new().await;
    let pool = db.pool();

    let a = create_test_album(pool, "A", "X", "Rock").await;
    create_test_track(pool, a, "a1", 1).await;

    let catalog = Catalog::load(pool).await.unwrap();
    catalog.increment_popularity(a);

    let b = create_test_album(pool, "B", "Y", "Pop").await;
    create_test_track(pool, b, "b1", 1).await;

    catalog.refresh(pool).await.unwrap();

    assert_eq!(catalog.track_count(), 2);
    // The bump survives the reload because it was flushed first
    assert_eq!(catalog.album(a).unwrap().popularity, 1);
    let names: Vec<String> = catalog.genres().into_iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["Pop", "Rock"]);
}

#[tokio::test]
async fn test_bump_for_removed_album_does_not_block_refresh() {
    let db = TestDb::new().await;
    let pool = db.pool();

    let a = create_test_album(pool, "A", "X", "Rock").await;
    let b = create_test_album(pool, "B", "X", "Rock").await;
    create_test_track(pool, a, "a1", 1).await;
    create_test_track(pool, b, "b1", 1).await;

    let catalog = Catalog::load(pool).await.unwrap();

    // A scan removes album A while the snapshot still lists it
    let path = PathBuf::from(format!("/music/{}/a1.flac", a));
    assert!(tracks::remove_by_path(pool, &path).await.unwrap());
    assert_eq!(library::clean_orphans(pool).await.unwrap().albums, 1);

    catalog.increment_popularity(a);
    catalog.increment_popularity(b);

    let c = create_test_album(pool, "C", "Y", "Pop").await;
    let c1 = create_test_track(pool, c, "c1", 1).await;

    catalog.refresh(pool).await.unwrap();

    assert!(catalog.album(a).is_none());
    assert_eq!(catalog.album_id_by_track(c1), Some(c));
    assert_eq!(catalog.album(b).unwrap().popularity, 1);

    // The stale bump was dropped, not re-queued
    assert_eq!(catalog.flush_popularity(pool).await.unwrap(), 0);
    catalog.refresh(pool).await.unwrap();
    assert_eq!(catalog.track_count(), 2);
}
