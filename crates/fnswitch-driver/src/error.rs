use thiserror::Error;

/// Failure of an invocation after its input has been validated.
///
/// Each layer wraps the failure of the layer below it, so a missing secret
/// reads `Error managing Function App: Error getting web client: Error
/// authenticating with certificate: Error retrieving secret '...': ...`.
/// None of them is retried.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Error retrieving secret '{name}': {message}")]
    SecretAccess { name: String, message: String },

    #[error("Error authenticating with certificate: {0}")]
    AuthConstruction(Cause),

    #[error("Error getting web client: {0}")]
    ClientInit(Cause),

    #[error("Error managing Function App: {0}")]
    Management(Cause),
}

/// What a wrapping [`ControlError`] variant reports: its own message or the
/// failure of the layer below.
#[derive(Debug, Error)]
pub enum Cause {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Nested(Box<ControlError>),
}

impl From<String> for Cause {
    fn from(message: String) -> Self {
        Cause::Message(message)
    }
}

impl From<&str> for Cause {
    fn from(message: &str) -> Self {
        Cause::Message(message.to_string())
    }
}

impl From<ControlError> for Cause {
    fn from(inner: ControlError) -> Self {
        Cause::Nested(Box::new(inner))
    }
}

impl ControlError {
    pub fn auth_construction(cause: impl Into<Cause>) -> Self {
        ControlError::AuthConstruction(cause.into())
    }

    pub fn client_init(cause: impl Into<Cause>) -> Self {
        ControlError::ClientInit(cause.into())
    }

    pub fn management(cause: impl Into<Cause>) -> Self {
        ControlError::Management(cause.into())
    }

    /// The innermost failure, where the chain started.
    pub fn root(&self) -> &ControlError {
        match self {
            ControlError::AuthConstruction(Cause::Nested(inner))
            | ControlError::ClientInit(Cause::Nested(inner))
            | ControlError::Management(Cause::Nested(inner)) => inner.root(),
            other => other,
        }
    }

    /// Kind of the innermost failure, for log fields.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            ControlError::SecretAccess { .. } => "secret_access",
            ControlError::AuthConstruction(_) => "auth_construction",
            ControlError::ClientInit(_) => "client_init",
            ControlError::Management(_) => "management",
        }
    }
}
