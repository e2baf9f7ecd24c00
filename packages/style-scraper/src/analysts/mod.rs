//! Analyst implementations.

pub mod computed;

pub use computed::ComputedStyleAnalyst;
