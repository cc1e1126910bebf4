use thiserror::Error;

/// Errors surfaced at the boundaries of the crate. The control loops
/// themselves never fail; they idle instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HoverError {
    #[error("Action has {actual} components, expected {expected}.")]
    ActionShape { expected: usize, actual: usize },
    #[error("Action contains a non-finite component.")]
    NonFiniteAction,
    #[error("The episode is not running, call reset first.")]
    EpisodeNotRunning,
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for '{param}': {message}")]
    Invalid { param: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(param: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            param,
            message: message.into(),
        }
    }
}
