use thiserror::Error;

pub type UpdateResult<T> = Result<T, UpdateError>;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Download of {resource} failed with HTTP {status}")]
    Download { status: u16, resource: String },

    #[error("Version error: {0}")]
    Version(String),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A restore attempt failed after a failed installation.
    /// The plugin's installation directory can no longer be trusted.
    #[error("Installation of '{plugin}' was left in an inconsistent state: {source}")]
    Inconsistent {
        plugin: String,
        #[source]
        source: Box<UpdateError>,
    },
}

impl UpdateError {
    /// True for the severe variant raised when a failed install could not
    /// be rolled back.
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, UpdateError::Inconsistent { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: UpdateError = io.into();
        assert!(matches!(err, UpdateError::Io(_)));
    }

    #[test]
    fn test_download_error_message() {
        let err = UpdateError::Download {
            status: 404,
            resource: "api/plugin/Plugin0/0.2.0.0/download".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("api/plugin/Plugin0/0.2.0.0/download"));
    }

    #[test]
    fn test_inconsistent_carries_source() {
        let inner = UpdateError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "locked",
        ));
        let err = UpdateError::Inconsistent {
            plugin: "Plugin0".to_string(),
            source: Box::new(inner),
        };
        assert!(err.is_inconsistent());
        assert!(err.to_string().contains("Plugin0"));
    }
}
