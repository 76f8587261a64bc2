pub use config::StoreConfig;
pub use dao::GenericDao;
pub use static_vars::connect_json_store;
pub use store::{Collection, JsonStore, StoreError};

pub mod config;
mod dao;
mod static_vars;
mod store;
