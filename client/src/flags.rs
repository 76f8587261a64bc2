use std::{collections::BTreeMap, path::PathBuf};

use events_models::Rating;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::{api::EventsApi, error::ClientResult};

/// On-disk shape of the flags file: one map per engagement kind, keyed by
/// event id. Absent key means "not done". Ratings remember the submitted
/// value.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FlagsDocument {
    #[serde(default)]
    attendance: BTreeMap<String, bool>,
    #[serde(default)]
    favorites: BTreeMap<String, bool>,
    #[serde(default)]
    ratings: BTreeMap<String, i32>,
}

/// Per-device record of which events this user attends, favorites, and
/// has rated, persisted as a small JSON file. The server only keeps
/// anonymous counters, so this file is the sole memory of "I already did
/// this".
///
/// Turning a flag on calls the server first and records it only on
/// success. Turning a flag off is local only, since the counters have no
/// decrement.
pub struct EngagementFlags {
    api: EventsApi,
    path: PathBuf,
    doc: FlagsDocument,
}

impl EngagementFlags {
    /// Loads the flags file if present; a missing or unparseable file
    /// starts an empty record.
    pub async fn load(api: EventsApi, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                    warn!(path = %path.display(), error = %err,
                        "flags file did not parse, starting fresh");
                    FlagsDocument::default()
                })
            }
            Err(_) => FlagsDocument::default(),
        };
        Self { api, path, doc }
    }

    pub fn is_attending(&self, event_id: &str) -> bool {
        self.doc.attendance.get(event_id).copied().unwrap_or(false)
    }

    pub fn is_favorite(&self, event_id: &str) -> bool {
        self.doc.favorites.get(event_id).copied().unwrap_or(false)
    }

    pub fn has_rated(&self, event_id: &str) -> bool {
        self.doc.ratings.contains_key(event_id)
    }

    pub fn rating(&self, event_id: &str) -> Option<i32> {
        self.doc.ratings.get(event_id).copied()
    }

    /// Flip attendance for one event. Returns the new flag value. The
    /// "on" path counts on the server before anything is recorded, so a
    /// failed call leaves both sides untouched.
    #[instrument(skip(self))]
    pub async fn toggle_attendance(
        &mut self, event_id: &str,
    ) -> ClientResult<bool> {
        if self.is_attending(event_id) {
            self.doc.attendance.remove(event_id);
            self.persist().await?;
            return Ok(false);
        }

        self.api.mark_attendance(event_id).await?;
        self.doc.attendance.insert(event_id.to_owned(), true);
        self.persist().await?;
        Ok(true)
    }

    /// Flip the favorite flag for one event, same contract as
    /// [`toggle_attendance`](Self::toggle_attendance).
    #[instrument(skip(self))]
    pub async fn toggle_favorite(
        &mut self, event_id: &str,
    ) -> ClientResult<bool> {
        if self.is_favorite(event_id) {
            self.doc.favorites.remove(event_id);
            self.persist().await?;
            return Ok(false);
        }

        self.api.add_favorite(event_id).await?;
        self.doc.favorites.insert(event_id.to_owned(), true);
        self.persist().await?;
        Ok(true)
    }

    /// Submit a rating once per event. An event already rated here is not
    /// re-submitted; the call answers `None` and the server keeps the
    /// original vote.
    #[instrument(skip(self))]
    pub async fn rate(
        &mut self, event_id: &str, rating: i32,
    ) -> ClientResult<Option<Rating>> {
        if self.has_rated(event_id) {
            return Ok(None);
        }

        let stored = self.api.submit_rating(event_id, rating).await?;
        self.doc.ratings.insert(event_id.to_owned(), rating);
        self.persist().await?;
        Ok(Some(stored))
    }

    /// Forget the local "already rated" mark. The submitted rating stays
    /// in the server's aggregate; this only re-opens the rating control.
    #[instrument(skip(self))]
    pub async fn clear_rating(&mut self, event_id: &str) -> ClientResult<()> {
        self.doc.ratings.remove(event_id);
        self.persist().await
    }

    async fn persist(&self) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut bytes = serde_json::to_vec_pretty(&self.doc)?;
        bytes.push(b'\n');
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
