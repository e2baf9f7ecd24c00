//! Extractor implementations.
//!
//! - [`HttpStyleExtractor`] - plain HTTP fetch with static style resolution
//! - [`html`] - static style resolution over a parsed document

pub mod html;
pub mod http;

pub use http::HttpStyleExtractor;
