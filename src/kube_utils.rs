//! Kubernetes client construction
//!
//! Credential plugins are chosen explicitly through [`CredentialProvider`]
//! when the client is built, instead of being registered process-wide.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use kube::config::{ExecConfig, KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::{Error, Result};

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// API version of the client.authentication.k8s.io exec protocol
const EXEC_AUTH_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

/// GKE credential plugin binary
pub const GKE_AUTH_PLUGIN: &str = "gke-gcloud-auth-plugin";

/// Where the client gets its credentials from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CredentialProvider {
    /// Whatever the kubeconfig or in-cluster service account provides
    #[default]
    Kubeconfig,
    /// GKE's exec credential plugin
    GkeAuthPlugin,
    /// Any client.authentication.k8s.io exec plugin
    Exec {
        /// Plugin binary
        command: String,
        /// Arguments passed to the plugin
        args: Vec<String>,
        /// Extra environment variables for the plugin
        env: Vec<(String, String)>,
    },
}

impl CredentialProvider {
    /// Exec configuration to install into the client, if any
    pub fn exec_config(&self) -> Option<ExecConfig> {
        let (command, args, env) = match self {
            CredentialProvider::Kubeconfig => return None,
            CredentialProvider::GkeAuthPlugin => (GKE_AUTH_PLUGIN.to_string(), vec![], vec![]),
            CredentialProvider::Exec { command, args, env } => {
                (command.clone(), args.clone(), env.clone())
            }
        };

        let env = (!env.is_empty()).then(|| {
            env.into_iter()
                .map(|(name, value)| {
                    HashMap::from([
                        ("name".to_string(), name),
                        ("value".to_string(), value),
                    ])
                })
                .collect()
        });

        Some(ExecConfig {
            api_version: Some(EXEC_AUTH_API_VERSION.to_string()),
            command: Some(command),
            args: (!args.is_empty()).then_some(args),
            env,
            drop_env: None,
            interactive_mode: None,
            provide_cluster_info: matches!(self, CredentialProvider::GkeAuthPlugin),
            cluster: None,
        })
    }
}

/// Settings for building a kube Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Explicit kubeconfig path; inferred (env, in-cluster) when None
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// Credential plugin override
    pub credential_provider: CredentialProvider,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Read timeout
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            credential_provider: CredentialProvider::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Create a kube client from the given settings
pub async fn create_client(config: &ClientConfig) -> Result<Client> {
    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..Default::default()
    };

    let mut kube_config = match &config.kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::client("kubeconfig", format!("failed to read {}: {}", path.display(), e))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| Error::client("kubeconfig", format!("failed to load: {}", e)))?
        }
        None if config.context.is_some() => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| Error::client("kubeconfig", format!("failed to load: {}", e)))?,
        None => Config::infer()
            .await
            .map_err(|e| Error::client("infer", format!("failed to infer config: {}", e)))?,
    };

    apply_client_config(&mut kube_config, config);

    Client::try_from(kube_config)
        .map_err(|e| Error::client("build", format!("failed to create client: {}", e)))
}

fn apply_client_config(kube_config: &mut Config, config: &ClientConfig) {
    if let Some(exec) = config.credential_provider.exec_config() {
        debug!(
            command = exec.command.as_deref().unwrap_or_default(),
            "Using exec credential plugin"
        );
        kube_config.auth_info.exec = Some(exec);
        kube_config.auth_info.token = None;
        kube_config.auth_info.token_file = None;
    }
    kube_config.connect_timeout = Some(config.connect_timeout);
    kube_config.read_timeout = Some(config.read_timeout);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::new("https://127.0.0.1:6443".parse().unwrap())
    }

    #[test]
    fn kubeconfig_provider_leaves_auth_untouched() {
        assert!(CredentialProvider::Kubeconfig.exec_config().is_none());

        let mut cfg = base_config();
        apply_client_config(&mut cfg, &ClientConfig::default());
        assert!(cfg.auth_info.exec.is_none());
        assert_eq!(cfg.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert_eq!(cfg.read_timeout, Some(DEFAULT_READ_TIMEOUT));
    }

    #[test]
    fn gke_provider_installs_exec_plugin() {
        let mut cfg = base_config();
        apply_client_config(
            &mut cfg,
            &ClientConfig {
                credential_provider: CredentialProvider::GkeAuthPlugin,
                ..Default::default()
            },
        );

        let exec = cfg.auth_info.exec.expect("exec plugin configured");
        assert_eq!(exec.command.as_deref(), Some(GKE_AUTH_PLUGIN));
        assert_eq!(exec.api_version.as_deref(), Some(EXEC_AUTH_API_VERSION));
        assert!(exec.provide_cluster_info);
        assert!(exec.args.is_none());
    }

    #[test]
    fn custom_exec_provider_passes_args_and_env() {
        let provider = CredentialProvider::Exec {
            command: "aws".to_string(),
            args: vec!["eks".to_string(), "get-token".to_string()],
            env: vec![("AWS_PROFILE".to_string(), "backup".to_string())],
        };

        let exec = provider.exec_config().unwrap();
        assert_eq!(exec.command.as_deref(), Some("aws"));
        assert_eq!(
            exec.args,
            Some(vec!["eks".to_string(), "get-token".to_string()])
        );
        let env = exec.env.unwrap();
        assert_eq!(env[0].get("name").map(String::as_str), Some("AWS_PROFILE"));
        assert_eq!(env[0].get("value").map(String::as_str), Some("backup"));
        assert!(!exec.provide_cluster_info);
        assert!(exec.drop_env.is_none());
        assert!(exec.interactive_mode.is_none());
        assert!(exec.cluster.is_none());
    }

    #[tokio::test]
    async fn missing_kubeconfig_is_a_client_error() {
        // kube::Client has no Debug impl, so unwrap_err is unavailable here
        let err = match create_client(&ClientConfig {
            kubeconfig: Some(PathBuf::from("/nonexistent/kubeconfig")),
            ..Default::default()
        })
        .await
        {
            Ok(_) => panic!("expected a client error for a missing kubeconfig"),
            Err(e) => e,
        };

        assert!(matches!(err, Error::Client { ref context, .. } if context == "kubeconfig"));
    }
}
