use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use chrono::{TimeZone, Utc};
use events_models::{Category, Event, Rating};
use json_store::{JsonStore, StoreConfig};
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};

/// Throwaway JSON store rooted in a private temp directory
pub struct TestStore {
    pub store: JsonStore,
    // Keep the directory alive for the lifetime of this struct
    _dir: TempDir,
}

impl TestStore {
    /// Create a fresh, empty store
    ///
    /// This will:
    /// 1. Allocate a private temp directory
    /// 2. Open a JSON store on `<dir>/db.json`
    /// 3. Return a ready-to-use store with an empty document
    pub async fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        let config = StoreConfig::new(dir.path().join("db.json"));
        let store = JsonStore::open(&config)
            .await
            .context("Failed to open JSON store")?;
        Ok(Self { store, _dir: dir })
    }

    /// Root of the backing temp directory, for tests that need scratch
    /// space next to the database file
    pub fn path(&self) -> &std::path::Path { self._dir.path() }
}

/// Build an event fixture without inserting it. Counters start at zero and
/// the date is a fixed future instant, so tests stay deterministic.
pub fn test_event(id: &str, name: &str, category_id: &str) -> Event {
    Event::builder()
        .id(id.to_owned())
        .name(name.to_owned())
        .description(format!("{name} description"))
        .location("Naples".to_owned())
        .date(
            Utc.with_ymd_and_hms(2031, 6, 15, 20, 0, 0)
                .single()
                .unwrap_or_default(),
        )
        .category_id(category_id.to_owned())
        .build()
}

/// Insert a prebuilt event into the store
pub async fn insert_event(store: &TestStore, event: &Event) -> Result<()> {
    store
        .store
        .collection::<Event>("events")
        .insert(event)
        .await
        .context("Failed to insert event fixture")
}

/// Create and insert a test event, returning it
pub async fn create_test_event(
    store: &TestStore, id: &str, name: &str, category_id: &str,
) -> Result<Event> {
    let event = test_event(id, name, category_id);
    insert_event(store, &event).await?;
    Ok(event)
}

/// Create a test category with the given id and name
pub async fn create_test_category(
    store: &TestStore, id: &str, name: &str,
) -> Result<Category> {
    let category = Category {
        id: id.to_owned(),
        name: name.to_owned(),
    };
    store
        .store
        .collection::<Category>("categories")
        .insert(&category)
        .await
        .context("Failed to insert category fixture")?;
    Ok(category)
}

/// Create two test categories ('Music' and 'Theatre') and return them
pub async fn create_test_categories(
    store: &TestStore,
) -> Result<(Category, Category)> {
    let music = create_test_category(store, "1", "Music").await?;
    let theatre = create_test_category(store, "2", "Theatre").await?;
    Ok((music, theatre))
}

/// Create a test rating for an event, dated now
pub async fn create_test_rating(
    store: &TestStore, id: &str, event_id: &str, rating: i32,
) -> Result<Rating> {
    let record = Rating {
        id: id.to_owned(),
        event_id: event_id.to_owned(),
        rating,
        date: Utc::now(),
    };
    store
        .store
        .collection::<Rating>("ratings")
        .insert(&record)
        .await
        .context("Failed to insert rating fixture")?;
    Ok(record)
}

/// Serve an axum app on an ephemeral local port
///
/// Returns the bound address and the serve task handle. The task runs until
/// aborted or the runtime shuts down.
pub async fn spawn_app(app: Router) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind test listener")?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_starts_empty() {
        let store = TestStore::new().await.unwrap();
        let events =
            store.store.collection::<Event>("events").all().await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_create_test_categories() {
        let store = TestStore::new().await.unwrap();
        let (music, theatre) = create_test_categories(&store).await.unwrap();
        assert_eq!(music.name, "Music");
        assert_eq!(theatre.id, "2");

        let stored = store
            .store
            .collection::<Category>("categories")
            .all()
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_create_test_event() {
        let store = TestStore::new().await.unwrap();
        let event =
            create_test_event(&store, "10", "Jazz Night", "1").await.unwrap();
        assert_eq!(event.attendees, 0);
        assert_eq!(event.average_rating, 0.0);

        let stored = store
            .store
            .collection::<Event>("events")
            .find(|e| e.id == "10")
            .await
            .unwrap();
        assert_eq!(stored.map(|e| e.name), Some("Jazz Night".to_owned()));
    }

    #[tokio::test]
    async fn test_spawn_app_binds_ephemeral_port() {
        let app = Router::new();
        let (addr, handle) = spawn_app(app).await.unwrap();
        assert_ne!(addr.port(), 0);

        let conn = tokio::net::TcpStream::connect(addr).await;
        assert!(conn.is_ok());
        handle.abort();
    }
}
