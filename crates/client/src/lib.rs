//! Client code for courtside.
//!
//! This crate provides the upstream fetch pipeline, schedule resolution,
//! batch fetching and the slim live view shared by the server.

pub mod batch;
pub mod gateway;
pub mod schedule;
pub mod service;
pub mod slim;
pub mod upstream;

pub use batch::{BatchConfig, BatchCoordinator, BatchItem, BatchOutcome, BatchSummary};
pub use gateway::{Fetched, Gateway, GatewayConfig};
pub use schedule::{ScheduleConfig, ScheduleLayout, ScheduleResolver, VersionedDocument, ids_for_date, parse_iso_date};
pub use service::{Courtside, DateGames, PollOutcome, Resolved};
pub use slim::{Negotiation, SlimView, negotiate, project, validator_matches, view_token};
pub use upstream::{Endpoints, UpstreamClient, UpstreamConfig, UpstreamError};
