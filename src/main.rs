//! velero-csi-resolver - run the CSI plugin lookups against a live cluster

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::{Api, ResourceExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use velero_csi_resolver::crd::{VolumeSnapshot, VolumeSnapshotSpec};
use velero_csi_resolver::kube_utils::{create_client, ClientConfig, CredentialProvider};
use velero_csi_resolver::snapshot::{PollConfig, DEFAULT_POLL_INTERVAL};
use velero_csi_resolver::telemetry::{init_tracing, LogFormat};
use velero_csi_resolver::Resolver;

/// Resolve PVC, pod and CSI snapshot relationships the way Velero's CSI plugin does
#[derive(Parser, Debug)]
#[command(name = "velero-csi-resolver", version, about, long_about = None)]
struct Cli {
    /// Path to a kubeconfig file (defaults to KUBECONFIG or in-cluster config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Credential plugin used to authenticate to the API server
    #[arg(long, global = true, value_enum, default_value_t = CredentialSource::Kubeconfig)]
    credential_provider: CredentialSource,

    /// Log output format (text or json)
    #[arg(long, global = true, env = "VELERO_CSI_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CredentialSource {
    /// Credentials from the kubeconfig or service account
    Kubeconfig,
    /// GKE's gke-gcloud-auth-plugin
    Gke,
}

impl From<CredentialSource> for CredentialProvider {
    fn from(source: CredentialSource) -> Self {
        match source {
            CredentialSource::Kubeconfig => CredentialProvider::Kubeconfig,
            CredentialSource::Gke => CredentialProvider::GkeAuthPlugin,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the PersistentVolume bound to a claim
    Pv(ClaimArgs),

    /// Print the pods mounting a claim
    Pods(ClaimArgs),

    /// Report whether a claim is covered by file-system backup
    FsBackup(ClaimArgs),

    /// Print the VolumeSnapshotClass for a CSI driver
    SnapshotClass {
        /// CSI driver / provisioner name (e.g., ebs.csi.aws.com)
        #[arg(long)]
        provisioner: String,
    },

    /// Wait for a VolumeSnapshot to bind and print its VolumeSnapshotContent
    SnapshotContent(SnapshotContentArgs),
}

/// Claim selection
#[derive(Args, Debug)]
struct ClaimArgs {
    /// Namespace of the claim
    #[arg(short, long)]
    namespace: String,

    /// Name of the PersistentVolumeClaim
    #[arg(long)]
    pvc: String,
}

/// VolumeSnapshot selection and polling bounds
#[derive(Args, Debug)]
struct SnapshotContentArgs {
    /// Namespace of the VolumeSnapshot
    #[arg(short, long)]
    namespace: String,

    /// Name of the VolumeSnapshot
    #[arg(long)]
    snapshot: String,

    /// Seconds between VolumeSnapshot polls
    #[arg(
        long,
        env = "VELERO_CSI_POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval_secs: u64,

    /// Give up after waiting this many seconds (waits forever when unset)
    #[arg(long, env = "VELERO_CSI_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format)?;

    let client = create_client(&ClientConfig {
        kubeconfig: cli.kubeconfig.clone(),
        context: cli.context.clone(),
        credential_provider: cli.credential_provider.into(),
        ..Default::default()
    })
    .await?;

    let resolver = Resolver::new(client.clone());

    match cli.command {
        Commands::Pv(args) => {
            let claims: Api<PersistentVolumeClaim> = Api::namespaced(client, &args.namespace);
            let claim = claims.get(&args.pvc).await?;
            let pv = resolver.persistent_volume(&claim).await?;
            print_json(&pv)
        }
        Commands::Pods(args) => {
            let pods = resolver.pods_using_claim(&args.namespace, &args.pvc).await?;
            let names: Vec<String> = pods.iter().map(|p| p.name_any()).collect();
            print_json(&names)
        }
        Commands::FsBackup(args) => {
            let covered = resolver
                .is_backed_up_by_fs_backup(&args.namespace, &args.pvc)
                .await?;
            print_json(&serde_json::json!({
                "namespace": args.namespace,
                "pvc": args.pvc,
                "fsBackup": covered,
            }))
        }
        Commands::SnapshotClass { provisioner } => {
            let class = resolver.snapshot_class(&provisioner).await?;
            print_json(&class)
        }
        Commands::SnapshotContent(args) => run_snapshot_content(resolver, args).await,
    }
}

async fn run_snapshot_content(resolver: Resolver, args: SnapshotContentArgs) -> anyhow::Result<()> {
    let poll = PollConfig {
        interval: Duration::from_secs(args.poll_interval_secs),
        timeout: args.timeout_secs.map(Duration::from_secs),
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling wait");
            on_signal.cancel();
        }
    });

    let resolver = resolver.with_poll_config(poll).with_cancellation(cancel);

    let mut snapshot = VolumeSnapshot::new(&args.snapshot, VolumeSnapshotSpec::default());
    snapshot.metadata.namespace = Some(args.namespace.clone());

    info!(namespace = %args.namespace, snapshot = %args.snapshot, "Resolving VolumeSnapshotContent");
    let content = resolver.snapshot_content(&snapshot).await?;
    print_json(&content)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("Failed to serialize output: {}", e))?;
    println!("{json}");
    Ok(())
}
