use std::path::PathBuf;

/// Failures while resolving shader text before the scene can be built
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to start loader runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("shader loader stopped before sending a result")]
    Disconnected,
}

/// Failures while loading or validating the globe configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_names_the_path() {
        let err = LoadError::Io {
            path: PathBuf::from("assets/shaders/earth/vertex.wgsl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("vertex.wgsl"), "{msg}");
        assert!(msg.contains("missing"), "{msg}");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Validation("duplicate marker id 'Japan'".into());
        assert_eq!(err.to_string(), "invalid config: duplicate marker id 'Japan'");

        let err = ConfigError::NotFound(PathBuf::from("/tmp/globe.toml"));
        assert!(err.to_string().contains("/tmp/globe.toml"));
    }

    #[test]
    fn toml_errors_convert() {
        let parse = toml::from_str::<toml::Value>("markers = [").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
