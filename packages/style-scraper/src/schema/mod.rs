//! Closed-schema validation of loosely-typed style records.

pub mod validator;

pub use validator::StyleSchemaValidator;
