use std::path::PathBuf;
use std::str::FromStr;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where annotations are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationBackend {
    /// One JSON file per video under `annotations_dir`.
    File,
    /// Process memory; lost on restart.
    Memory,
}

impl FromStr for AnnotationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'file' or 'memory', got '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory scanned for `.mp4` files and served under `/videos`.
    pub videos_dir: PathBuf,
    pub annotation_backend: AnnotationBackend,
    /// Directory holding `{video_id}.json` files (default: `videos_dir`).
    pub annotations_dir: PathBuf,
    /// `ffprobe` executable used for metadata.
    pub ffprobe_bin: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `VIDEOS_DIR`           | `./videos`                 |
    /// | `ANNOTATION_BACKEND`   | `file`                     |
    /// | `ANNOTATIONS_DIR`      | value of `VIDEOS_DIR`      |
    /// | `FFPROBE_BIN`          | `ffprobe`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(&var, "PORT", 3000u16)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_var(&var, "REQUEST_TIMEOUT_SECS", 30u64)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let videos_dir = PathBuf::from(var("VIDEOS_DIR").unwrap_or_else(|| "./videos".into()));
        let annotation_backend = parse_var(&var, "ANNOTATION_BACKEND", AnnotationBackend::File)?;
        let annotations_dir = var("ANNOTATIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| videos_dir.clone());
        let ffprobe_bin = PathBuf::from(var("FFPROBE_BIN").unwrap_or_else(|| "ffprobe".into()));

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            videos_dir,
            annotation_backend,
            annotations_dir,
            ffprobe_bin,
        })
    }
}

fn parse_var<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.videos_dir, PathBuf::from("./videos"));
        assert_eq!(config.annotation_backend, AnnotationBackend::File);
        assert_eq!(config.annotations_dir, config.videos_dir);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("VIDEOS_DIR", "/srv/videos"),
            ("ANNOTATION_BACKEND", "Memory"),
            ("ANNOTATIONS_DIR", "/srv/notes"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.annotation_backend, AnnotationBackend::Memory);
        assert_eq!(config.annotations_dir, PathBuf::from("/srv/notes"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert_matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::InvalidValue { key: "PORT", .. })
        );
    }

    #[test]
    fn invalid_backend_is_rejected() {
        let err = load(&[("ANNOTATION_BACKEND", "sqlite")]).unwrap_err();
        assert!(err.to_string().contains("expected 'file' or 'memory'"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert_matches!(
            load(&[("REQUEST_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue { key: "REQUEST_TIMEOUT_SECS", .. })
        );
    }
}
