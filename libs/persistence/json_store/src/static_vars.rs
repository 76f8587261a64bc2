use std::sync::OnceLock;

use tracing::{info, instrument};

use crate::{
    config::StoreConfig,
    store::{JsonStore, StoreError},
};

static JSON_STORE: OnceLock<JsonStore> = OnceLock::new();

#[instrument(skip_all, name = "connect-json-store")]
pub async fn connect_json_store(
    config: &StoreConfig,
) -> Result<(), StoreError> {
    info!(store.path = %config.path().display(), "Opening JSON store");

    let store = JsonStore::open(config).await?;

    if JSON_STORE.set(store).is_err() {
        panic!("JSON store already established")
    }

    Ok(())
}

pub fn get_json_store() -> &'static JsonStore {
    JSON_STORE.get().expect("JSON store not established")
}

impl JsonStore {
    pub fn from_global() -> Self { get_json_store().clone() }
}

impl Default for JsonStore {
    fn default() -> Self { Self::from_global() }
}
