//! HTTP server for the feature voting board.
//!
//! Serves the JSON REST API under `/v1`: feature CRUD, search with
//! pagination, voting, and the top-voted and recent views.

pub mod config;
pub mod cors;
pub mod error;
pub mod handler;
pub mod params;
pub mod router;
pub mod server;
pub mod state;

pub use config::{CorsConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::{HealthResponse, ListResponse, VoteResponse};
pub use server::FeatureVoteServer;
pub use state::AppState;
