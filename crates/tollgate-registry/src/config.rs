//! Configuration for the image pusher.

use std::path::PathBuf;

/// Default docker executable.
pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Configuration for [`ImagePusher`](crate::ImagePusher).
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Docker executable name or path.
    pub docker_binary: String,

    /// Parent directory for per-push docker config directories.
    ///
    /// `None` uses the system temporary directory.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            docker_binary: DEFAULT_DOCKER_BINARY.to_string(),
            scratch_dir: None,
        }
    }
}

impl PushConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> PushConfigBuilder {
        PushConfigBuilder::default()
    }
}

/// Builder for [`PushConfig`].
#[derive(Debug, Default)]
pub struct PushConfigBuilder {
    docker_binary: Option<String>,
    scratch_dir: Option<PathBuf>,
}

impl PushConfigBuilder {
    /// Sets the docker executable.
    #[must_use]
    pub fn docker_binary(mut self, binary: impl Into<String>) -> Self {
        self.docker_binary = Some(binary.into());
        self
    }

    /// Sets the parent directory for docker config directories.
    #[must_use]
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> PushConfig {
        let defaults = PushConfig::default();
        PushConfig {
            docker_binary: self.docker_binary.unwrap_or(defaults.docker_binary),
            scratch_dir: self.scratch_dir.or(defaults.scratch_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_config_default() {
        let config = PushConfig::default();
        assert_eq!(config.docker_binary, "docker");
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn test_push_config_builder() {
        let config = PushConfig::builder()
            .docker_binary("/usr/local/bin/podman")
            .scratch_dir("/workspace")
            .build();

        assert_eq!(config.docker_binary, "/usr/local/bin/podman");
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/workspace")));
    }
}
