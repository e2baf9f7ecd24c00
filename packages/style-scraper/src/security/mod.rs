//! SSRF protection: the URL gate and single-use enforcement.
//!
//! The gate runs before any network access. It is a literal pre-flight check
//! and performs no DNS resolution, so a public hostname that later resolves
//! to a private address is not caught here.

pub mod gate;
pub mod single_use;

pub use gate::{CanonicalUrl, RejectReason, SecurityVerdict, UrlGate};
pub use single_use::UseGuard;
