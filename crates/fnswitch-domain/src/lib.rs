pub mod config;
pub mod error;
pub mod resource;
pub mod types;


pub use config::{AzureIdentity, Endpoints, HandlerConfig};
pub use error::DomainError;
pub use resource::ResourceId;
pub use types::{Action, Outcome, StatusPolicy};
