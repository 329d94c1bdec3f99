pub mod catalog;
pub mod user;
pub mod watchlist;
