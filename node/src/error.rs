use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] joinvote_store::StoreError),

    #[error("gateway error: {0}")]
    Gateway(#[from] joinvote_gateway::GatewayError),

    #[error("registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
