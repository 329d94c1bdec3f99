pub mod catalog;
pub mod watchlist;
