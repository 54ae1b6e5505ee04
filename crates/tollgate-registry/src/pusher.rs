//! Image push to the scanning registry.
//!
//! A push runs `login` (when credentials are present), `tag`, `push` and
//! `images -q` against a docker config directory created for this push
//! alone, then removes the directory. Concurrent pushes on one host therefore
//! never share authentication state.

use tempfile::TempDir;
use tollgate_core::{ApiKeys, ImageReference};
use tracing::{info, warn};

use crate::command::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
use crate::config::PushConfig;
use crate::docker::DockerCli;
use crate::error::{PushError, Result};

const CONFIG_SCOPE_PREFIX: &str = ".tollgate-docker-config-";

/// Outcome of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedImage {
    /// The reference that was pushed.
    pub reference: ImageReference,
    /// Local image id of the pushed reference, if docker reported one.
    pub image_id: Option<String>,
}

/// Pushes images through the docker CLI.
#[derive(Debug)]
pub struct ImagePusher<R = ProcessRunner> {
    config: PushConfig,
    runner: R,
}

impl ImagePusher<ProcessRunner> {
    /// Creates a pusher that runs real docker processes.
    #[must_use]
    pub const fn new(config: PushConfig) -> Self {
        Self {
            config,
            runner: ProcessRunner,
        }
    }
}

impl<R: CommandRunner> ImagePusher<R> {
    /// Creates a pusher with a custom command runner.
    pub const fn with_runner(config: PushConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Returns the pusher configuration.
    pub const fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Tags `source` as `destination`, pushes it and resolves its image id.
    ///
    /// Exit statuses are logged but not acted on: a rejected push shows up as
    /// a missing image id or a failed scan later on.
    ///
    /// # Errors
    ///
    /// - [`PushError::ConfigScope`] if the docker config directory cannot be created.
    /// - [`PushError::Command`] if docker cannot be run at all.
    pub async fn push(
        &self,
        source: &ImageReference,
        destination: &ImageReference,
        credentials: Option<&ApiKeys>,
    ) -> Result<PushedImage> {
        let scope = self.create_config_scope()?;
        let docker = DockerCli::new(&self.config.docker_binary, scope.path());

        let result = self
            .push_in_scope(&docker, source, destination, credentials)
            .await;

        let scope_path = scope.path().to_path_buf();
        if let Err(e) = scope.close() {
            warn!(
                path = %scope_path.display(),
                error = %e,
                "Failed to remove docker config directory"
            );
        }

        result
    }

    async fn push_in_scope(
        &self,
        docker: &DockerCli,
        source: &ImageReference,
        destination: &ImageReference,
        credentials: Option<&ApiKeys>,
    ) -> Result<PushedImage> {
        let registry = destination.registry();

        if let Some(keys) = credentials {
            let output = self.run(&docker.login(registry, keys)).await?;
            let registry = registry.unwrap_or("default registry");
            if output.success() {
                info!("Authenticated with {registry}.");
            } else {
                warn!(
                    status = ?output.status,
                    stderr = %output.stderr.trim(),
                    "Authentication with {registry} failed; continuing without it"
                );
            }
        } else {
            info!("No API keys configured.");
        }

        let tag = docker.tag(source, destination);
        info!("{tag}");
        let output = self.run(&tag).await?;
        log_failure(&tag, &output);

        let push = docker.push(destination);
        info!("{push}");
        let output = self
            .runner
            .run_streaming(&push, &mut |line| info!(target: "tollgate::push", "{line}"))
            .await
            .map_err(|source| command_error(&push, source))?;
        log_failure(&push, &output);

        let output = self.run(&docker.image_id(destination)).await?;
        let image_id = output
            .stdout
            .lines()
            .next()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);

        match &image_id {
            Some(id) => info!("Image to scan: {id}"),
            None => warn!(image = %destination, "Image to scan: unknown image id"),
        }

        Ok(PushedImage {
            reference: destination.clone(),
            image_id,
        })
    }

    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.runner
            .run(spec)
            .await
            .map_err(|source| command_error(spec, source))
    }

    fn create_config_scope(&self) -> Result<TempDir> {
        let parent = self
            .config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        tempfile::Builder::new()
            .prefix(CONFIG_SCOPE_PREFIX)
            .tempdir_in(&parent)
            .map_err(|source| PushError::ConfigScope {
                path: parent,
                source,
            })
    }
}

fn command_error(spec: &CommandSpec, source: std::io::Error) -> PushError {
    PushError::Command {
        command: spec.to_string(),
        source,
    }
}

fn log_failure(spec: &CommandSpec, output: &CommandOutput) {
    if !output.success() {
        warn!(
            command = %spec,
            status = ?output.status,
            stderr = %output.stderr.trim(),
            "Docker command exited unsuccessfully"
        );
    }
}
