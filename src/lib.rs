//! Connectivity-aware resilient HTTP request pipeline.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::schema::ClientConfig;
pub use connectivity::ConnectivityOracle;
pub use error::{PipelineError, UnavailableReason};
pub use lifecycle::Shutdown;
pub use resilience::ResilientPipeline;
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
