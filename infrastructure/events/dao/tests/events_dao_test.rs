use chrono::{TimeZone, Utc};
use events_commands::{CreateEventCommand, ReplaceEventCommand};
use events_dao::{CategoryDao, EventDao, RatingDao};
use events_errors::{CategoryError, EventError};
use events_queries::EventFilters;
use json_store::GenericDao;
use test_utils::{TestStore, insert_event, test_event};

async fn setup_test_store() -> anyhow::Result<(TestStore, EventDao)> {
    let store = TestStore::new().await?;
    let event_dao = EventDao::new(store.store.clone());
    Ok((store, event_dao))
}

fn create_request(name: &str) -> CreateEventCommand {
    CreateEventCommand {
        name: name.to_owned(),
        description: format!("{name} description"),
        location: "Naples".to_owned(),
        date: Utc.with_ymd_and_hms(2031, 6, 15, 20, 0, 0).unwrap(),
        category_id: "1".to_owned(),
        image: None,
    }
}

#[tokio::test]
async fn test_create_event_success() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Jazz Night")).await.unwrap();

    assert!(created.id.parse::<i64>().is_ok());
    assert_eq!(created.name, "Jazz Night");
    assert_eq!(created.attendees, 0);
    assert_eq!(created.favorites, 0);
    assert_eq!(created.average_rating, 0.0);
    assert_eq!(created.image, None);
}

#[tokio::test]
async fn test_create_assigns_distinct_ids() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let first = event_dao.create(create_request("First")).await.unwrap();
    let second = event_dao.create(create_request("Second")).await.unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_find_by_id_success() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Wine Fair")).await.unwrap();
    let found = event_dao.find_by_id(created.id.clone()).await.unwrap();

    assert_eq!(found, created);
}

#[tokio::test]
async fn test_find_by_id_not_found() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let result = event_dao.find_by_id("999".to_owned()).await;

    assert!(matches!(result, Err(EventError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_replaces_every_field() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Old Name")).await.unwrap();
    event_dao.increment_attendees(&created.id).await.unwrap();

    let replace = ReplaceEventCommand {
        event_id: created.id.clone(),
        name: "New Name".to_owned(),
        description: "rewritten".to_owned(),
        location: "Salerno".to_owned(),
        date: Utc.with_ymd_and_hms(2032, 1, 1, 18, 30, 0).unwrap(),
        category_id: "2".to_owned(),
        attendees: 0,
        favorites: 0,
        average_rating: 0.0,
        image: Some("/uploads/poster.png".to_owned()),
    };

    let updated =
        event_dao.update(created.id.clone(), replace).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.location, "Salerno");
    assert_eq!(updated.category_id, "2");
    // Counters not echoed back by the caller are reset by the replace.
    assert_eq!(updated.attendees, 0);
    assert_eq!(updated.image, Some("/uploads/poster.png".to_owned()));
}

#[tokio::test]
async fn test_update_not_found() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let replace = ReplaceEventCommand {
        event_id: "999".to_owned(),
        name: "Ghost".to_owned(),
        description: String::new(),
        location: String::new(),
        date: Utc::now(),
        category_id: "1".to_owned(),
        attendees: 0,
        favorites: 0,
        average_rating: 0.0,
        image: None,
    };

    let result = event_dao.update("999".to_owned(), replace).await;

    assert!(matches!(result, Err(EventError::NotFound { .. })));
}

#[tokio::test]
async fn test_delete_event_success() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Doomed")).await.unwrap();
    event_dao.delete(created.id.clone()).await.unwrap();

    let result = event_dao.find_by_id(created.id).await;
    assert!(matches!(result, Err(EventError::NotFound { .. })));
}

#[tokio::test]
async fn test_delete_not_found() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let result = event_dao.delete("999".to_owned()).await;

    assert!(matches!(result, Err(EventError::NotFound { .. })));
}

#[tokio::test]
async fn test_find_with_filters_text_matches_name_or_description() {
    let (store, event_dao) = setup_test_store().await.unwrap();

    insert_event(&store, &test_event("1", "Jazz Night", "1")).await.unwrap();
    let mut tasting = test_event("2", "Wine Fair", "1");
    tasting.description = "an evening of jazz and wine".to_owned();
    insert_event(&store, &tasting).await.unwrap();
    insert_event(&store, &test_event("3", "Marathon", "2")).await.unwrap();

    let filters = EventFilters {
        q: Some("JAZZ".to_owned()),
        ..EventFilters::default()
    };
    let events = event_dao.find_with_filters(&filters).await.unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[tokio::test]
async fn test_find_with_filters_by_category() {
    let (store, event_dao) = setup_test_store().await.unwrap();

    insert_event(&store, &test_event("1", "Jazz Night", "1")).await.unwrap();
    insert_event(&store, &test_event("2", "Marathon", "2")).await.unwrap();

    let filters = EventFilters {
        category_id: Some("2".to_owned()),
        ..EventFilters::default()
    };
    let events = event_dao.find_with_filters(&filters).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "2");
}

#[tokio::test]
async fn test_find_with_filters_by_location_substring() {
    let (store, event_dao) = setup_test_store().await.unwrap();

    let mut naples = test_event("1", "Jazz Night", "1");
    naples.location = "Piazza del Plebiscito, Naples".to_owned();
    insert_event(&store, &naples).await.unwrap();
    let mut salerno = test_event("2", "Wine Fair", "1");
    salerno.location = "Salerno".to_owned();
    insert_event(&store, &salerno).await.unwrap();

    let filters = EventFilters {
        location: Some("naples".to_owned()),
        ..EventFilters::default()
    };
    let events = event_dao.find_with_filters(&filters).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "1");
}

#[tokio::test]
async fn test_find_with_filters_date_bounds_inclusive() {
    let (store, event_dao) = setup_test_store().await.unwrap();

    for (id, day) in [("1", 10), ("2", 15), ("3", 20)] {
        let mut event = test_event(id, "Concert", "1");
        event.date = Utc.with_ymd_and_hms(2031, 6, day, 20, 0, 0).unwrap();
        insert_event(&store, &event).await.unwrap();
    }

    let filters = EventFilters {
        date_from: Some(Utc.with_ymd_and_hms(2031, 6, 10, 20, 0, 0).unwrap()),
        date_to: Some(Utc.with_ymd_and_hms(2031, 6, 15, 20, 0, 0).unwrap()),
        ..EventFilters::default()
    };
    let events = event_dao.find_with_filters(&filters).await.unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[tokio::test]
async fn test_find_with_filters_compose() {
    let (store, event_dao) = setup_test_store().await.unwrap();

    insert_event(&store, &test_event("1", "Jazz Night", "1")).await.unwrap();
    insert_event(&store, &test_event("2", "Jazz Brunch", "2")).await.unwrap();

    let filters = EventFilters {
        q: Some("jazz".to_owned()),
        category_id: Some("2".to_owned()),
        ..EventFilters::default()
    };
    let events = event_dao.find_with_filters(&filters).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "2");
}

#[tokio::test]
async fn test_increment_attendees_returns_previous_count() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Jazz Night")).await.unwrap();

    let before = event_dao.increment_attendees(&created.id).await.unwrap();
    assert_eq!(before, 0);
    let before = event_dao.increment_attendees(&created.id).await.unwrap();
    assert_eq!(before, 1);

    let stored = event_dao.find_by_id(created.id).await.unwrap();
    assert_eq!(stored.attendees, 2);
}

#[tokio::test]
async fn test_increment_attendees_not_found() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let result = event_dao.increment_attendees("999").await;

    assert!(matches!(result, Err(EventError::NotFound { .. })));
}

#[tokio::test]
async fn test_increment_favorites_returns_previous_count() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Jazz Night")).await.unwrap();

    let before = event_dao.increment_favorites(&created.id).await.unwrap();
    assert_eq!(before, 0);

    let stored = event_dao.find_by_id(created.id).await.unwrap();
    assert_eq!(stored.favorites, 1);
    assert_eq!(stored.attendees, 0);
}

#[tokio::test]
async fn test_set_average_rating() {
    let (_store, event_dao) = setup_test_store().await.unwrap();

    let created = event_dao.create(create_request("Jazz Night")).await.unwrap();
    let updated =
        event_dao.set_average_rating(&created.id, 4.3).await.unwrap();

    assert_eq!(updated.average_rating, 4.3);
}

#[tokio::test]
async fn test_rating_dao_create_and_list() {
    let (store, _event_dao) = setup_test_store().await.unwrap();
    let rating_dao = RatingDao::new(store.store.clone());

    let first = rating_dao.create("10", 4).await.unwrap();
    let second = rating_dao.create("10", 5).await.unwrap();
    rating_dao.create("11", 1).await.unwrap();

    assert!(first.id.parse::<i64>().is_ok());
    assert_ne!(first.id, second.id);
    assert!(first.date <= Utc::now());

    let ratings = rating_dao.for_event("10").await.unwrap();
    let values: Vec<i32> = ratings.iter().map(|r| r.rating).collect();
    assert_eq!(values, [4, 5]);
}

#[tokio::test]
async fn test_rating_dao_remove_for_event() {
    let (store, _event_dao) = setup_test_store().await.unwrap();
    let rating_dao = RatingDao::new(store.store.clone());

    rating_dao.create("10", 4).await.unwrap();
    rating_dao.create("10", 5).await.unwrap();
    rating_dao.create("11", 3).await.unwrap();

    let removed = rating_dao.remove_for_event("10").await.unwrap();

    assert_eq!(removed, 2);
    assert!(rating_dao.for_event("10").await.unwrap().is_empty());
    assert_eq!(rating_dao.for_event("11").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_dao_find_and_all() {
    let (store, _event_dao) = setup_test_store().await.unwrap();
    let category_dao = CategoryDao::new(store.store.clone());

    let (music, theatre) =
        test_utils::create_test_categories(&store).await.unwrap();

    let found = category_dao.find_by_id(&music.id).await.unwrap();
    assert_eq!(found.name, "Music");

    let all = category_dao.all().await.unwrap();
    assert_eq!(all, vec![music, theatre]);
}

#[tokio::test]
async fn test_category_dao_not_found() {
    let (store, _event_dao) = setup_test_store().await.unwrap();
    let category_dao = CategoryDao::new(store.store.clone());

    let result = category_dao.find_by_id("999").await;

    assert!(matches!(result, Err(CategoryError::NotFound { .. })));
}
