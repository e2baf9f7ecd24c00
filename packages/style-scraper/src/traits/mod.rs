//! Collaborator seams for the style pipeline.
//!
//! Applications plug in their own page extraction and style analysis by
//! implementing these traits.

pub mod analyst;
pub mod extractor;
