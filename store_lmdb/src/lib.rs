//! LMDB storage backend for the join-request voting bot.
//!
//! Implements the storage traits from `joinvote-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment.

pub mod environment;
pub mod error;
pub mod ledger;
pub mod policy;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use ledger::LmdbLedger;
pub use policy::LmdbPolicyStore;

/// Run a transaction on the blocking pool; LMDB writers block on each other.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, LmdbError>
where
    F: FnOnce() -> Result<T, LmdbError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
