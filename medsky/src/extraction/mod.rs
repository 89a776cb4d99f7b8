//! Schema-constrained extraction.
//!
//! - [`Extractor`] - one structured completion per extractable section
//! - [`decode`] - schema check followed by typed deserialization
//! - [`ExtractionError`] / [`DecodeError`] - transport and decode failures kept apart
//! - [`CallMetrics`] - timing and token estimates per call

pub mod decode;
pub mod error;
pub mod extractor;
pub mod metrics;

pub use decode::{collect_validation_errors, decode, decode_with_schema};
pub use error::{DecodeError, ExtractionError};
pub use extractor::Extractor;
pub use metrics::{estimate_tokens, CallMetrics};
