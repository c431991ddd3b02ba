pub mod controller;
pub mod credential;
pub mod error;
pub mod local;
pub mod secrets;
pub mod web;

pub use controller::{AppController, AzureAppController};
pub use credential::{authenticate_with_certificate, CertificateCredential, TokenError};
pub use error::{Cause, ControlError};
pub use local::LocalAppController;
pub use secrets::{GcpSecretStore, SecretStore, StaticSecrets};
pub use web::{WebClient, WebError};
