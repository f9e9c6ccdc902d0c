//! Domain operations and collection queries for the feature voting board.
//!
//! [`FeatureService`] owns the write path: validation, uniqueness, and
//! vote mutation. [`FeatureQueries`] owns the read path: search, paging,
//! top-voted and recent views. Both sit on a shared
//! [`fv_store::FeatureStore`] and take timestamps from a [`Clock`].

pub mod clock;
pub mod error;
pub mod features;
pub mod queries;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ServiceError, ServiceResult};
pub use features::{FeatureService, UpdateMode};
pub use queries::{FeatureQueries, Page, QueryLimits};
