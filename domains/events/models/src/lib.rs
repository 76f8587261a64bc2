pub mod categories;
pub mod events;
pub mod ratings;

pub use categories::Category;
pub use events::Event;
pub use ratings::Rating;
