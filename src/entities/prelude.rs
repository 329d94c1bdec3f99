pub use super::anime::Entity as Anime;
pub use super::users::Entity as Users;
pub use super::watchlist_entries::Entity as WatchlistEntries;
