//! Docker CLI argument vectors.

use std::path::{Path, PathBuf};

use tollgate_core::{ApiKeys, ImageReference};

use crate::command::CommandSpec;

/// Builds docker commands that all share one `--config` directory.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    config_dir: PathBuf,
}

impl DockerCli {
    /// Creates a builder for `binary` using `config_dir` for authentication state.
    pub fn new(binary: impl Into<String>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config_dir: config_dir.into(),
        }
    }

    /// The config directory passed to every command.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .arg("--config")
            .arg(self.config_dir.to_string_lossy())
    }

    /// `docker login [<registry>] -u <access key> --password-stdin`.
    ///
    /// The secret key goes to standard input so it never shows up in the
    /// process list.
    #[must_use]
    pub fn login(&self, registry: Option<&str>, keys: &ApiKeys) -> CommandSpec {
        let mut spec = self.command().arg("login");
        if let Some(registry) = registry.filter(|r| !r.is_empty()) {
            spec = spec.arg(registry);
        }
        spec.args(["-u", keys.access_key.as_str(), "--password-stdin"])
            .stdin(keys.secret_key.as_str())
    }

    /// `docker tag <source> <destination>`.
    #[must_use]
    pub fn tag(&self, source: &ImageReference, destination: &ImageReference) -> CommandSpec {
        self.command()
            .arg("tag")
            .arg(source.name())
            .arg(destination.name())
    }

    /// `docker push <image>`.
    #[must_use]
    pub fn push(&self, image: &ImageReference) -> CommandSpec {
        self.command().arg("push").arg(image.name())
    }

    /// `docker images -q <image>`.
    #[must_use]
    pub fn image_id(&self, image: &ImageReference) -> CommandSpec {
        self.command().args(["images", "-q"]).arg(image.name())
    }
}
