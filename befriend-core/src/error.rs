use thiserror::Error;

use crate::gcn::ModelError;

#[derive(Error, Debug)]
pub enum BefriendError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Other error: {0}")]
    Other(String),
}
