//! RTGF registry server.
//!
//! Serves the registry over newline-delimited JSON-RPC 2.0 on stdio: one
//! request per line on stdin, one response per line on stdout. Logs go to
//! stderr.
//!
//! # Methods
//!
//! | Method             | Params                         | Result                        |
//! |--------------------|--------------------------------|-------------------------------|
//! | `ping`             |                                | `{}`                          |
//! | `healthz`          |                                | `{status, registrySnapshotId, ..}` |
//! | `verify`           | `{tokens:{rmt,imt,cort,psrt}, now?}` | `{valid, revEpoch, reason?}` |
//! | `revocations/get`  |                                | `{revEpoch}`                  |
//! | `revocations/bump` |                                | `{revEpoch}`                  |
//! | `tokens/get`       | `{uri}`                        | raw payload                   |
//! | `tokens/lookup`    | `{type, slug}`                 | raw payload                   |
//! | `catalog`          |                                | catalog document              |
//! | `jwks`             |                                | issuer key set                |
//! | `registry/reload`  |                                | `{registrySnapshotId}`        |

mod rpc;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use rtgf_registry::time::parse_rfc3339;
use rtgf_registry::{RegistryConfig, VerificationService, VerifierKind};

use rpc::{rpc_error, RegistryServer, PARSE_ERROR};

#[derive(Parser, Debug)]
#[command(
    name = "rtgf-registryd",
    about = "RTGF trust registry over stdio JSON-RPC",
    version
)]
struct Args {
    /// JSON config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory holding token payloads and jwks.json
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Token manifest (default: built-in sandbox tokens)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Trust verifier: structural or ed25519
    #[arg(long)]
    verifier: Option<VerifierKind>,

    /// Initial revocation epoch
    #[arg(long)]
    initial_epoch: Option<u64>,

    /// Public base URL used in the catalog
    #[arg(long)]
    base_url: Option<String>,

    /// Verify against this RFC 3339 instant instead of the wall clock
    #[arg(long)]
    fixed_time: Option<String>,

    /// Log level for stderr output
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

impl Args {
    fn into_config(self) -> anyhow::Result<RegistryConfig> {
        let mut config = RegistryConfig::load(self.config.as_deref())
            .context("failed to load registry configuration")?;
        if let Some(dir) = self.static_dir {
            config.static_dir = dir;
        }
        if let Some(manifest) = self.manifest {
            config.manifest = Some(manifest);
        }
        if let Some(verifier) = self.verifier {
            config.verifier = verifier;
        }
        if let Some(epoch) = self.initial_epoch {
            config.initial_epoch = epoch;
        }
        if let Some(url) = self.base_url {
            config.base_url = Some(url);
        }
        if let Some(raw) = self.fixed_time {
            config.fixed_time = Some(parse_rfc3339(&raw).context("invalid --fixed-time")?);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries JSON-RPC responses.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level)
        .init();

    let config = args.into_config()?;
    let static_dir = config.static_dir.clone();
    let service = VerificationService::open(config)
        .with_context(|| format!("failed to open registry at {}", static_dir.display()))?;
    let server = RegistryServer::new(service);
    tracing::info!(static_dir = %static_dir.display(), "rtgf-registryd ready on stdio");

    serve(&server).await
}

async fn serve(server: &RegistryServer) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("stdin read error")? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(request) => server.handle_request(request),
            Err(e) => rpc_error(Value::Null, PARSE_ERROR, format!("parse error: {e}")),
        };

        let mut out = serde_json::to_vec(&response).context("failed to encode response")?;
        out.push(b'\n');
        stdout
            .write_all(&out)
            .await
            .context("failed to write response")?;
        stdout.flush().await.context("failed to flush stdout")?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
