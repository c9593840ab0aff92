//! Customer Record Validation
//!
//! Provides the attribute domain table, raw record validation, and the
//! derived attributes computed before encoding.

pub mod attributes;
mod error;
mod record;
mod validator;

pub use attributes::{AttributeKind, AttributeSpec, CustomerType};
pub use error::ValidationError;
pub use record::{AttributeValue, CustomerProfile, RawRecord};
pub use validator::{ValidationConfig, Validator};
