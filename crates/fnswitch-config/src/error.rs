use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml parse error in {path}: {source}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required setting '{field}' (set it in the config file or via {env})")]
    Missing { field: &'static str, env: &'static str },

    #[error("domain error: {0}")]
    Domain(#[from] fnswitch_domain::DomainError),
}
