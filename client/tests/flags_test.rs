use anyhow::Result;
use events_dao::{EventDao, RatingDao};
use json_store::GenericDao;
use piazza_client::{ClientError, EngagementFlags, EventsApi};
use reqwest::StatusCode;
use test_utils::{
    TestStore, create_test_categories, create_test_event, spawn_app,
};
use tokio::task::JoinHandle;

async fn start_server() -> Result<(TestStore, EventsApi, JoinHandle<()>)> {
    let store = TestStore::new().await?;
    create_test_categories(&store).await?;

    let uploads_dir = store.path().join("uploads");
    tokio::fs::create_dir_all(&uploads_dir).await?;

    let app = events_http::api_router(store.store.clone(), uploads_dir);
    let (addr, handle) = spawn_app(app).await?;
    let api = EventsApi::new(&format!("http://{addr}"))?;
    Ok((store, api, handle))
}

#[tokio::test]
async fn test_attendance_toggle_counts_once_on_the_server() -> Result<()> {
    let (store, api, _server) = start_server().await?;
    create_test_event(&store, "1", "Jazz Night", "1").await?;
    let flags_path = store.path().join("flags.json");

    let mut flags = EngagementFlags::load(api.clone(), &flags_path).await;
    assert!(!flags.is_attending("1"));

    assert!(flags.toggle_attendance("1").await?);
    assert!(flags.is_attending("1"));

    let dao = EventDao::new(store.store.clone());
    assert_eq!(dao.find_by_id("1".to_string()).await?.attendees, 1);

    // A fresh load sees the persisted flag
    let reloaded = EngagementFlags::load(api, &flags_path).await;
    assert!(reloaded.is_attending("1"));

    // Toggling off is local only, the server count stays
    assert!(!flags.toggle_attendance("1").await?);
    assert!(!flags.is_attending("1"));
    assert_eq!(dao.find_by_id("1".to_string()).await?.attendees, 1);
    Ok(())
}

#[tokio::test]
async fn test_favorite_toggle_mirrors_attendance() -> Result<()> {
    let (store, api, _server) = start_server().await?;
    create_test_event(&store, "1", "Jazz Night", "1").await?;
    let flags_path = store.path().join("flags.json");

    let mut flags = EngagementFlags::load(api, &flags_path).await;
    assert!(flags.toggle_favorite("1").await?);
    assert!(flags.is_favorite("1"));

    let dao = EventDao::new(store.store.clone());
    assert_eq!(dao.find_by_id("1".to_string()).await?.favorites, 1);

    assert!(!flags.toggle_favorite("1").await?);
    assert_eq!(dao.find_by_id("1".to_string()).await?.favorites, 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_toggle_leaves_no_trace() -> Result<()> {
    let (store, api, _server) = start_server().await?;
    let flags_path = store.path().join("flags.json");

    let mut flags = EngagementFlags::load(api, &flags_path).await;
    let err = flags.toggle_attendance("404").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Status { status, .. } if status == StatusCode::NOT_FOUND
    ));

    assert!(!flags.is_attending("404"));
    // Nothing was persisted either
    assert!(!tokio::fs::try_exists(&flags_path).await?);
    Ok(())
}

#[tokio::test]
async fn test_rating_submits_once_per_device() -> Result<()> {
    let (store, api, _server) = start_server().await?;
    create_test_event(&store, "1", "Jazz Night", "1").await?;
    let flags_path = store.path().join("flags.json");

    let mut flags = EngagementFlags::load(api, &flags_path).await;
    let stored = flags.rate("1", 4).await?;
    assert_eq!(stored.map(|r| r.rating), Some(4));
    assert!(flags.has_rated("1"));
    assert_eq!(flags.rating("1"), Some(4));

    // A second vote from this device is refused locally
    assert!(flags.rate("1", 5).await?.is_none());

    let ratings = RatingDao::new(store.store.clone());
    assert_eq!(ratings.for_event("1").await?.len(), 1);

    let dao = EventDao::new(store.store.clone());
    assert_eq!(dao.find_by_id("1".to_string()).await?.average_rating, 4.0);

    // Clearing re-opens the control, the server keeps the vote
    flags.clear_rating("1").await?;
    assert!(!flags.has_rated("1"));
    assert_eq!(ratings.for_event("1").await?.len(), 1);
    Ok(())
}
