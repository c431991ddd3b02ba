use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid resourceid format")]
    InvalidFormat,

    #[error("invalid action '{0}'")]
    InvalidAction(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
