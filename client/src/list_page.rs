use std::time::Duration;

use chrono::{DateTime, Utc};
use events_responses::EventWithCategory;
use flume::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, warn};

use crate::{
    error::ClientError,
    queries::{EventQueries, EventsQueryKey},
};

/// Page size of the event list view.
pub const EVENTS_PER_PAGE: u64 = 3;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Date filter presets offered by the list view. Bounds are taken from the
/// clock at the moment the period is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Past,
    Today,
    Future,
}

/// Observable side effects of paging, for the embedding UI to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ScrollToTop,
}

/// A text filter whose applied value trails the displayed value by the
/// debounce window. Re-arming before the deadline discards the superseded
/// value without ever querying for it.
#[derive(Default)]
struct DebouncedInput {
    value: String,
    applied: String,
    deadline: Option<Instant>,
}

impl DebouncedInput {
    fn set(&mut self, value: &str) {
        self.value = value.to_owned();
        self.deadline = Some(Instant::now() + DEBOUNCE);
    }

    fn apply_if_elapsed(&mut self, now: Instant) {
        if self.deadline.is_some_and(|deadline| deadline <= now) {
            self.applied = self.value.clone();
            self.deadline = None;
        }
    }
}

/// Result of one speculative next-page fetch. `len` is `None` when the
/// fetch itself failed.
struct ProbeOutcome {
    key: EventsQueryKey,
    len: Option<usize>,
}

/// Drives the event list view: filters, debounced text inputs, the page
/// cursor, and the speculative next-page prefetch that stands in for a
/// total count the list endpoint does not return.
///
/// The controller is settled explicitly: mutate filters or the cursor,
/// then call [`settle`](Self::settle) to bring `events()` and the paging
/// gates up to date. After `settle` returns nothing is left in flight.
pub struct ListPageController {
    queries: EventQueries,
    per_page: u64,
    search: DebouncedInput,
    location: DebouncedInput,
    category_id: Option<String>,
    period: Period,
    bounds: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
    current_page: u64,
    events: Vec<EventWithCategory>,
    probe: Option<(EventsQueryKey, Option<usize>)>,
    error: Option<ClientError>,
    effects: Vec<Effect>,
    probe_tx: Sender<ProbeOutcome>,
    probe_rx: Receiver<ProbeOutcome>,
}

impl ListPageController {
    pub fn new(queries: EventQueries) -> Self {
        Self::with_page_size(queries, EVENTS_PER_PAGE)
    }

    pub fn with_page_size(queries: EventQueries, per_page: u64) -> Self {
        let (probe_tx, probe_rx) = flume::unbounded();
        Self {
            queries,
            per_page,
            search: DebouncedInput::default(),
            location: DebouncedInput::default(),
            category_id: None,
            period: Period::All,
            bounds: (None, None),
            current_page: 1,
            events: Vec::new(),
            probe: None,
            error: None,
            effects: Vec::new(),
            probe_tx,
            probe_rx,
        }
    }

    /// Free-text search over names and descriptions. Applied after the
    /// debounce window; the page resets right away.
    pub fn set_search(&mut self, value: &str) {
        self.search.set(value);
        self.current_page = 1;
    }

    /// Location substring filter, debounced like the search box.
    pub fn set_location(&mut self, value: &str) {
        self.location.set(value);
        self.current_page = 1;
    }

    /// Category filter, applied immediately.
    pub fn set_category(&mut self, category_id: Option<&str>) {
        self.category_id = category_id.map(str::to_owned);
        self.current_page = 1;
    }

    /// Date preset, applied immediately. The bounds are pinned to the
    /// clock now so every page of the same view filters against the same
    /// instant.
    pub fn set_period(&mut self, period: Period) {
        let now = Utc::now();
        self.bounds = match period {
            Period::All => (None, None),
            Period::Past => (None, Some(now)),
            Period::Today => {
                let day = now.date_naive();
                (
                    day.and_hms_opt(0, 0, 0).map(|start| start.and_utc()),
                    day.and_hms_milli_opt(23, 59, 59, 999)
                        .map(|end| end.and_utc()),
                )
            }
            Period::Future => (Some(now), None),
        };
        self.period = period;
        self.current_page = 1;
    }

    /// Drive the controller to quiescence: wait out pending debounce
    /// deadlines, fetch the current page, and resolve the speculative
    /// next-page fetch when the current page came back full. A fetch
    /// failure is parked in [`error`](Self::error) and the previously
    /// shown events stay put.
    #[instrument(skip(self))]
    pub async fn settle(&mut self) {
        self.apply_debounce().await;

        let key = self.page_key(self.current_page);
        match self.queries.events_page(&key).await {
            Ok(events) => {
                self.events = events.as_ref().clone();
                self.error = None;
            }
            Err(err) => {
                warn!(page = self.current_page, error = %err,
                    "events page fetch failed");
                self.error = Some(err);
                return;
            }
        }

        if self.events.len() as u64 == self.per_page {
            let next_key = self.page_key(self.current_page + 1);
            if !self.probe_resolved(&next_key) {
                self.spawn_probe(next_key.clone());
                self.await_probe(next_key).await;
            }
        }
    }

    /// Whether the next-page control should be enabled: the current page
    /// is full and the prefetch proved the next one is non-empty.
    pub fn can_next(&self) -> bool {
        if self.events.len() as u64 != self.per_page {
            return false;
        }
        let next_key = self.page_key(self.current_page + 1);
        matches!(
            &self.probe,
            Some((key, Some(len))) if *key == next_key && *len > 0
        )
    }

    pub fn can_previous(&self) -> bool {
        self.current_page > 1
    }

    #[instrument(skip(self))]
    pub async fn next_page(&mut self) {
        if !self.can_next() {
            return;
        }
        self.current_page += 1;
        self.effects.push(Effect::ScrollToTop);
        self.settle().await;
    }

    #[instrument(skip(self))]
    pub async fn previous_page(&mut self) {
        if !self.can_previous() {
            return;
        }
        self.current_page -= 1;
        self.effects.push(Effect::ScrollToTop);
        self.settle().await;
    }

    /// Refetch the current page from the server, bypassing the cache.
    #[instrument(skip(self))]
    pub async fn retry(&mut self) {
        let key = self.page_key(self.current_page);
        self.queries.invalidate_page(&key).await;
        self.settle().await;
    }

    pub fn events(&self) -> &[EventWithCategory] {
        &self.events
    }

    pub fn page(&self) -> u64 {
        self.current_page
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    /// Displayed (not yet necessarily applied) search text.
    pub fn search(&self) -> &str {
        &self.search.value
    }

    pub fn location(&self) -> &str {
        &self.location.value
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Effects recorded since the last call, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    async fn apply_debounce(&mut self) {
        loop {
            let deadline = [self.search.deadline, self.location.deadline]
                .into_iter()
                .flatten()
                .min();
            let Some(deadline) = deadline else { break };
            sleep_until(deadline).await;
            let now = Instant::now();
            self.search.apply_if_elapsed(now);
            self.location.apply_if_elapsed(now);
        }
    }

    fn page_key(&self, page: u64) -> EventsQueryKey {
        EventsQueryKey {
            page,
            limit: self.per_page,
            q: none_if_empty(&self.search.applied),
            category_id: self.category_id.clone(),
            location_like: none_if_empty(&self.location.applied),
            date_gte: self.bounds.0,
            date_lte: self.bounds.1,
        }
    }

    fn probe_resolved(&self, next_key: &EventsQueryKey) -> bool {
        matches!(
            &self.probe,
            Some((key, Some(_))) if key == next_key
        )
    }

    /// Fetch the next page on a background task. It lands in the shared
    /// query cache, so advancing after a successful probe is a cache hit.
    fn spawn_probe(&self, key: EventsQueryKey) {
        let queries = self.queries.clone();
        let tx = self.probe_tx.clone();
        tokio::spawn(async move {
            let len = match queries.events_page(&key).await {
                Ok(events) => Some(events.len()),
                Err(err) => {
                    debug!(error = %err, "speculative prefetch failed");
                    None
                }
            };
            let _ = tx.send(ProbeOutcome { key, len });
        });
    }

    async fn await_probe(&mut self, expected: EventsQueryKey) {
        while let Ok(outcome) = self.probe_rx.recv_async().await {
            let matched = outcome.key == expected;
            self.probe = Some((outcome.key, outcome.len));
            if matched {
                break;
            }
            // Outcome of a probe the filters have since moved past
        }
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EventsApi;

    fn controller() -> ListPageController {
        let api = EventsApi::new("http://localhost:1").unwrap();
        ListPageController::new(EventQueries::new(api))
    }

    #[tokio::test]
    async fn test_today_bounds_cover_the_whole_day() {
        let mut controller = controller();
        controller.set_period(Period::Today);

        let (start, end) = controller.bounds;
        let start = start.unwrap();
        let end = end.unwrap();
        assert_eq!(start.format("%H:%M:%S%.3f").to_string(), "00:00:00.000");
        assert_eq!(end.format("%H:%M:%S%.3f").to_string(), "23:59:59.999");
        assert_eq!(start.date_naive(), end.date_naive());
    }

    #[tokio::test]
    async fn test_filter_change_resets_the_page() {
        let mut controller = controller();
        controller.current_page = 3;

        controller.set_category(Some("2"));
        assert_eq!(controller.page(), 1);

        controller.current_page = 3;
        controller.set_search("jazz");
        assert_eq!(controller.page(), 1);
        assert!(controller.search.deadline.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_filters_stay_off_the_key() {
        let mut controller = controller();
        controller.set_search("");
        controller.apply_debounce().await;

        let key = controller.page_key(1);
        assert_eq!(key.q, None);
        assert_eq!(key.category_id, None);
        assert_eq!(key.date_gte, None);
    }
}
