//! Data types for the style scraper.

pub mod config;
pub mod page;
pub mod style;
