//! Colors: the three accepted CSS grammars and channel-wise comparison.
//!
//! Colors are stored exactly as written. Conversion to RGB channels only
//! happens when two colors are compared.

pub mod tolerance;
pub mod value;

pub use tolerance::{
    compare, hex_to_channels, rgb_string_to_channels, ColorComparator, Rgb,
    ToleranceComparison, DEFAULT_TOLERANCE,
};
pub use value::{ColorNotation, ColorValue};
