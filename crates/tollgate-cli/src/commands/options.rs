//! Argument groups shared by several commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::debug;

use tollgate_compliance::{
    ComplianceConfig, HttpComplianceClient, PollConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES,
};
use tollgate_core::resolver::DEFAULT_SCANNING_REGISTRY;
use tollgate_core::{
    resolve_credentials, ApiKeys, Environment, Error, FileCredentialStore, ImageReference,
    ImageScanStep, InMemoryCredentialStore, Pipeline, ReferenceResolver,
};
use tollgate_registry::{PushConfig, DEFAULT_DOCKER_BINARY};

/// Which image to scan and where to push it.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Pipeline file whose image scan step describes the image
    #[arg(long)]
    pub pipeline: Option<PathBuf>,

    /// Id of the image scan step in the pipeline (default: the first one)
    #[arg(long, requires = "pipeline")]
    pub step: Option<String>,

    /// Repository of the image to scan
    #[arg(long, conflicts_with = "pipeline")]
    pub repository: Option<String>,

    /// Tag of the image to scan (default: latest)
    #[arg(long, conflicts_with = "pipeline")]
    pub tag: Option<String>,

    /// Destination repository template on the scanning registry
    #[arg(long)]
    pub push_repository: Option<String>,

    /// Destination tag template
    #[arg(long)]
    pub push_tag: Option<String>,

    /// Scanning registry host
    #[arg(long, env = "TOLLGATE_REGISTRY_HOST", default_value = DEFAULT_SCANNING_REGISTRY)]
    pub registry_host: String,

    /// Variable available to templates; may be repeated
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,
}

/// Source and destination of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// The image that was built.
    pub source: ImageReference,
    /// Where it goes on the scanning registry.
    pub destination: ImageReference,
    /// Credentials id configured on the scan step, if any.
    #[serde(skip)]
    pub credentials_id: Option<String>,
}

impl Resolution {
    /// Rejects a destination that docker could not push.
    pub fn ensure_pushable(&self) -> tollgate_core::Result<()> {
        if self.destination.is_valid() {
            Ok(())
        } else {
            Err(Error::NoValidDestination {
                name: self.destination.name(),
            })
        }
    }
}

impl TargetArgs {
    /// The process environment with `--env` overrides applied.
    pub fn environment(&self) -> Environment {
        Environment::from_process().with_overrides(self.env.iter().cloned())
    }

    /// Resolves source and destination against the process environment.
    pub fn resolve(&self) -> Result<Resolution> {
        self.resolve_in(&self.environment())
    }

    /// Resolves source and destination against `env`.
    pub fn resolve_in(&self, env: &Environment) -> Result<Resolution> {
        let pipeline = match &self.pipeline {
            Some(path) => Pipeline::load(path)
                .with_context(|| format!("Failed to load pipeline {}", path.display()))?,
            None => Pipeline::default(),
        };

        let (position, settings) = if self.pipeline.is_some() {
            let (position, step) = pipeline.scan_step(self.step.as_deref())?;
            (position, step.clone())
        } else {
            let repository = self.repository.clone().unwrap_or_default();
            let tag = self.tag.clone().unwrap_or_default();
            (0, ImageScanStep::explicit(repository, tag))
        };
        let settings = self.apply_push_templates(settings);
        debug!(?settings, position, "Scan settings");

        let resolver = ReferenceResolver::new(&self.registry_host);
        let source = resolver.resolve_source(&settings, &pipeline.steps, position, env)?;
        let destination = resolver.resolve_destination(&source, &settings, env);

        Ok(Resolution {
            source,
            destination,
            credentials_id: settings.credentials_id,
        })
    }

    fn apply_push_templates(&self, mut settings: ImageScanStep) -> ImageScanStep {
        if let Some(repository) = &self.push_repository {
            settings.push_repository.clone_from(repository);
        }
        if let Some(tag) = &self.push_tag {
            settings.push_tag.clone_from(tag);
        }
        settings
    }
}

/// Where the API keys come from.
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// Id of the API keys in the credentials file
    #[arg(long, env = "TOLLGATE_CREDENTIALS_ID")]
    pub credentials_id: Option<String>,

    /// YAML or JSON file mapping ids to access and secret keys
    #[arg(long, env = "TOLLGATE_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,
}

impl CredentialArgs {
    /// Looks up the API keys.
    ///
    /// `--credentials-id` wins over `configured`, the id set on the scan step.
    /// An id that the credentials file does not contain, or an id given
    /// without a file, is an error.
    pub fn load(&self, configured: Option<&str>) -> Result<Option<ApiKeys>> {
        let id = self.credentials_id.as_deref().or(configured);

        let keys = match &self.credentials_file {
            Some(path) => {
                let store = FileCredentialStore::load(path)?;
                resolve_credentials(&store, id)?
            }
            None => resolve_credentials(&InMemoryCredentialStore::new(), id)?,
        };
        Ok(keys)
    }
}

/// Docker settings for the push.
#[derive(Args, Debug)]
pub struct DockerArgs {
    /// Docker executable
    #[arg(long, env = "TOLLGATE_DOCKER", default_value = DEFAULT_DOCKER_BINARY)]
    pub docker: String,
}

impl DockerArgs {
    /// The pusher configuration.
    pub fn config(&self) -> PushConfig {
        PushConfig::builder().docker_binary(&self.docker).build()
    }
}

/// Compliance endpoint and retry budget.
#[derive(Args, Debug)]
pub struct ComplianceArgs {
    /// Policy compliance endpoint
    #[arg(long, env = "TOLLGATE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Counted attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Delay between attempts in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub poll_interval_ms: u64,
}

impl ComplianceArgs {
    /// The poll configuration.
    pub fn config(&self) -> PollConfig {
        PollConfig::builder()
            .max_retries(self.max_retries)
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
            .build()
    }

    /// An HTTP client for the endpoint.
    pub fn client(&self) -> Result<HttpComplianceClient> {
        HttpComplianceClient::new(&ComplianceConfig::new(&self.endpoint))
            .context("Failed to create compliance client")
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn target() -> TargetArgs {
        TargetArgs {
            pipeline: None,
            step: None,
            repository: None,
            tag: None,
            push_repository: None,
            push_tag: None,
            registry_host: DEFAULT_SCANNING_REGISTRY.to_string(),
            env: Vec::new(),
        }
    }

    fn file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const PIPELINE: &str = r"
steps:
  - type: docker-publish
    id: build
    registry: https://host1
    repository: repoName1
    tag: repoTag1
  - type: command
    run: make test
  - type: image-scan
    id: scan
    credentials_id: tio
";

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_key_val("A=").unwrap(), ("A".to_string(), String::new()));
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_resolve_from_pipeline() {
        let pipeline = file(PIPELINE);
        let args = TargetArgs {
            pipeline: Some(pipeline.path().to_path_buf()),
            ..target()
        };

        let resolution = args.resolve_in(&Environment::new()).unwrap();

        assert_eq!(resolution.source.name(), "host1/repoName1:repoTag1");
        assert_eq!(
            resolution.destination.name(),
            "registry.cloud.tenable.com/host1/repoName1:repoTag1"
        );
        assert_eq!(resolution.credentials_id.as_deref(), Some("tio"));
        resolution.ensure_pushable().unwrap();
    }

    #[test]
    fn test_resolve_explicit_with_templates() {
        let args = TargetArgs {
            repository: Some("team/${APP}".to_string()),
            push_repository: Some("/scans/${PUSH_REPOSITORY}/".to_string()),
            push_tag: Some("${PUSH_TAG}-${BUILD}".to_string()),
            registry_host: "scan.example.com".to_string(),
            ..target()
        };
        let env: Environment = [("APP", "web"), ("BUILD", "7")].into_iter().collect();

        let resolution = args.resolve_in(&env).unwrap();

        assert_eq!(resolution.source.name(), "team/web:latest");
        assert_eq!(
            resolution.destination.name(),
            "scan.example.com/scans/team/web:latest-7"
        );
        assert!(resolution.credentials_id.is_none());
    }

    #[test]
    fn test_resolve_without_image_fails() {
        let err = target().resolve_in(&Environment::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoValidImage)
        ));
    }

    #[test]
    fn test_blank_destination_is_not_pushable() {
        let args = TargetArgs {
            repository: Some("team/app".to_string()),
            push_repository: Some("///".to_string()),
            ..target()
        };

        let resolution = args.resolve_in(&Environment::new()).unwrap();

        let err = resolution.ensure_pushable().unwrap_err();
        assert!(matches!(err, Error::NoValidDestination { .. }));
    }

    #[test]
    fn test_credentials_from_file() {
        let creds = file("tio:\n  access_key: ak\n  secret_key: sk\n");
        let args = CredentialArgs {
            credentials_id: None,
            credentials_file: Some(creds.path().to_path_buf()),
        };

        let keys = args.load(Some("tio")).unwrap().unwrap();
        assert_eq!(keys.header_value(), "accessKey=ak;secretKey=sk;");

        assert!(args.load(None).unwrap().is_none());
        assert!(args.load(Some("  ")).unwrap().is_none());
    }

    #[test]
    fn test_credentials_id_flag_overrides_step() {
        let creds = file(
            "a:\n  access_key: a1\n  secret_key: a2\n\
             b:\n  access_key: b1\n  secret_key: b2\n",
        );
        let args = CredentialArgs {
            credentials_id: Some("b".to_string()),
            credentials_file: Some(creds.path().to_path_buf()),
        };

        let keys = args.load(Some("a")).unwrap().unwrap();
        assert_eq!(keys.access_key, "b1");
    }

    #[test]
    fn test_unknown_credentials_id_is_an_error() {
        let err = CredentialArgs::default().load(Some("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::CredentialsNotFound { id }) if id == "missing"
        ));
    }

    #[test]
    fn test_poll_args_config() {
        let args = ComplianceArgs {
            endpoint: "http://localhost:1/check".to_string(),
            max_retries: 4,
            poll_interval_ms: 250,
        };
        let config = args.config();
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert!(args.client().is_ok());
    }
}
