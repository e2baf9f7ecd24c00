pub mod scrape;
pub mod verify;
