//! Abstract storage traits for the join-request voting bot.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod ledger;
pub mod policy;

pub use error::StoreError;
pub use ledger::Ledger;
pub use policy::PolicyStore;
