//! Boundary to the external text-generation service.
//!
//! The service maps a prompt plus the current bundle to either plan prose or
//! a new bundle. Its output is untrusted: code results must pass
//! [`validate_bundle`] before they may become a version.

mod service;
mod validation;

pub use service::{
    GenerationContext, GenerationError, GenerationMode, GenerationOutcome, GenerationService,
};
pub use validation::{ValidationError, validate_bundle};
