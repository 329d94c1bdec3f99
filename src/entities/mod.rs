pub mod prelude;

pub mod anime;
pub mod users;
pub mod watchlist_entries;
