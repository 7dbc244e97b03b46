//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the voting engine (ledger, policy storage,
//! messaging gateway) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Keep all state in memory behind a mutex
//! - Record every outbound call for assertions
//! - Can be told to fail specific operations
//!
//! Usage: swap real implementations for nullables in tests.

pub mod gateway;
pub mod store;

pub use gateway::{GatewayCall, GatewayOp, NullGateway};
pub use store::{NullLedger, NullPolicyStore};
