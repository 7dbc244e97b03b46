//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::ledger::LmdbLedger;
use crate::policy::LmdbPolicyStore;
use crate::LmdbError;

/// Number of named databases the environment holds.
pub const MAX_DBS: u32 = 4;

/// Default map size: 256 MiB is plenty for an audit trail of join requests.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    join_requests_db: Database<Bytes, Bytes>,
    waiting_index_db: Database<Bytes, Bytes>,
    policies_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment directory is owned by this process and is
        // opened exactly once per process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let join_requests_db = env.create_database(&mut wtxn, Some("join_requests"))?;
        let waiting_index_db = env.create_database(&mut wtxn, Some("waiting_index"))?;
        let policies_db = env.create_database(&mut wtxn, Some("policies"))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            join_requests_db,
            waiting_index_db,
            policies_db,
        })
    }

    /// Ledger view over this environment.
    pub fn ledger(&self) -> LmdbLedger {
        LmdbLedger {
            env: Arc::clone(&self.env),
            join_requests_db: self.join_requests_db,
            waiting_index_db: self.waiting_index_db,
        }
    }

    /// Policy store view over this environment.
    pub fn policy_store(&self) -> LmdbPolicyStore {
        LmdbPolicyStore {
            env: Arc::clone(&self.env),
            policies_db: self.policies_db,
        }
    }
}
