//! Collaborators and settings shared by every session and the router.

use std::sync::Arc;
use std::time::Duration;

use joinvote_gateway::Gateway;
use joinvote_i18n::TextResolver;
use joinvote_store::{Ledger, PolicyStore};
use joinvote_types::{ChatId, GroupPolicy};

use crate::config::NodeConfig;
use crate::metrics::SessionMetrics;

/// Deployment settings sessions read but never change.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    /// Moderation log channel and optional topic.
    pub log_channel: Option<(ChatId, Option<i64>)>,
    /// Delay before a timed-out ballot and its announcement are deleted.
    pub cleanup_delay: Duration,
    /// Username for live-result deep links; looked up when `None`.
    pub bot_username: Option<String>,
    /// Policy for groups without one.
    pub default_policy: GroupPolicy,
}

impl SessionSettings {
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            log_channel: config.log_channel.target(),
            cleanup_delay: Duration::from_secs(config.cleanup_delay_secs),
            bot_username: config.bot_username.clone(),
            default_policy: config.default_policy.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&NodeConfig::default())
    }
}

/// Everything a session needs besides its own state.
pub struct Services {
    pub ledger: Arc<dyn Ledger>,
    pub policies: Arc<dyn PolicyStore>,
    pub gateway: Arc<dyn Gateway>,
    pub texts: TextResolver,
    pub metrics: SessionMetrics,
    pub settings: SessionSettings,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use joinvote_gateway::{Chat, User};
    use joinvote_nullables::{NullGateway, NullLedger, NullPolicyStore};
    use joinvote_types::UserId;

    pub fn group() -> Chat {
        Chat {
            id: ChatId(-1001),
            title: Some("Rustaceans".to_string()),
        }
    }

    pub fn user(id: i64) -> User {
        User {
            id: UserId(id),
            username: None,
            first_name: format!("user{id}"),
            last_name: None,
        }
    }

    pub struct Fixture {
        pub services: Arc<Services>,
        pub ledger: Arc<NullLedger>,
        pub policies: Arc<NullPolicyStore>,
        pub gateway: Arc<NullGateway>,
    }

    pub fn fixture() -> Fixture {
        let ledger = Arc::new(NullLedger::new());
        let policies = Arc::new(NullPolicyStore::new());
        let gateway = Arc::new(NullGateway::new());
        let services = Services {
            ledger: ledger.clone(),
            policies: policies.clone(),
            gateway: gateway.clone(),
            texts: TextResolver::new(),
            metrics: SessionMetrics::new().unwrap(),
            settings: SessionSettings::default(),
        };
        Fixture {
            services: Arc::new(services),
            ledger,
            policies,
            gateway,
        }
    }
}
