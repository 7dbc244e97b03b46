//! Join-request voting engine.
//!
//! The node ties the other crates together:
//! - [`VoteSession`] drives one join request from request card to cleanup
//! - [`SessionRegistry`] maps live request ids to their sessions and tasks
//! - [`RequestRouter`] turns inbound platform events into session work
//!
//! plus the ambient pieces the daemon wires up: configuration, logging,
//! tracing spans, metrics and shutdown.

pub mod ack;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod router;
pub mod session;
pub mod shutdown;
pub mod tracing_spans;

pub use ack::{Ack, AckKind};
pub use config::{LogChannelConfig, NodeConfig};
pub use context::{Services, SessionSettings};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::SessionMetrics;
pub use registry::{RegistryError, SessionRegistry};
pub use router::RequestRouter;
pub use session::{Phase, SessionEnd, VoteSession};
pub use shutdown::ShutdownController;
