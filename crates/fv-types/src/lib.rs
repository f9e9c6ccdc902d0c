//! Foundation types for the feature voting board.
//!
//! This crate provides the single domain entity and the rules that govern
//! it. Every other crate in the workspace depends on `fv-types`.
//!
//! # Key Types
//!
//! - [`Feature`] -- A proposed product feature with a vote counter
//! - [`FeatureId`] -- Store-assigned integer identifier
//! - [`FeatureInput`] -- Client-supplied title/description, prior to validation
//! - [`FeatureDraft`] / [`FeatureChanges`] -- Validated create/update payloads
//! - [`FieldErrors`] -- Field-level validation failures
//! - [`FeatureOrder`] -- Query-time ordering policies
//! - [`VoteDirection`] -- Unit vote mutation with a floor at zero

pub mod error;
pub mod feature;
pub mod order;
pub mod validation;
pub mod vote;

pub use error::TypeError;
pub use feature::{fold_title, Feature, FeatureId};
pub use order::FeatureOrder;
pub use validation::{
    FeatureChanges, FeatureDraft, FeatureInput, FieldErrors, TITLE_MAX_CHARS, TITLE_MIN_CHARS,
};
pub use vote::VoteDirection;
