pub use categories::CategoryDao;
pub use events::EventDao;
pub use ratings::RatingDao;

mod categories;
mod events;
mod ids;
mod ratings;
