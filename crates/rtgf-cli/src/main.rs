//! RTGF registry CLI, the `rtgf` command.
//!
//! Verifies token bundles against a registry directory, looks tokens up,
//! prints the catalog, and prepares signed token payloads.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use rtgf_registry::crypto::signing::seal_payload;
use rtgf_registry::time::{parse_rfc3339, to_rfc3339};
use rtgf_registry::{
    Ed25519KeyPair, RegistryConfig, VerificationRequest, VerificationService, VerifierKind,
};

// ── CLI structure ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "rtgf",
    about = "RTGF registry CLI",
    version,
    long_about = "rtgf: RTGF registry CLI\n\nVerify token bundles, look up published tokens, inspect the\ncatalog, and seal token payloads for signature verification."
)]
struct Cli {
    #[command(flatten)]
    registry: RegistryArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the registry lives and how it verifies.
#[derive(clap::Args, Debug)]
struct RegistryArgs {
    /// JSON config file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Directory holding token payloads and jwks.json
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,

    /// Token manifest (default: built-in sandbox tokens)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Trust verifier: structural or ed25519
    #[arg(long, global = true)]
    verifier: Option<VerifierKind>,

    /// Verify against this RFC 3339 instant instead of the wall clock
    #[arg(long, global = true)]
    fixed_time: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a token bundle
    Verify {
        /// Regulatory token URI
        #[arg(long)]
        rmt: Option<String>,

        /// Interoperability token URI
        #[arg(long)]
        imt: Option<String>,

        /// Corridor token URI
        #[arg(long)]
        cort: Option<String>,

        /// Participant token URI
        #[arg(long)]
        psrt: Option<String>,

        /// Read the request (`{"tokens": {...}}`) from a file, or `-` for stdin
        #[arg(long, conflicts_with_all = ["rmt", "imt", "cort", "psrt"])]
        request: Option<PathBuf>,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a token payload by URI
    Token {
        /// Token URI (e.g. urn:lane2:token:CORT:VODAFONE.VISA:2025)
        uri: String,
    },

    /// Print a token payload by type and slug
    Lookup {
        /// Token type (case-insensitive, e.g. cort)
        r#type: String,

        /// Token slug (e.g. vodafone-visa-2025)
        slug: String,
    },

    /// Print the registry catalog
    Catalog,

    /// List published token entries
    Entries,

    /// Validate configuration, manifest and fixtures
    Check,

    /// Generate an Ed25519 issuer key
    Keygen {
        /// Key id to publish the key under
        #[arg(long)]
        kid: String,

        /// File to write the hex-encoded secret key to
        #[arg(long)]
        secret_file: PathBuf,
    },

    /// Attach an Ed25519 proof to a token payload
    Seal {
        /// Payload JSON file
        payload: PathBuf,

        /// Key id recorded in the proof
        #[arg(long)]
        kid: String,

        /// Hex-encoded secret key file written by `rtgf keygen`
        #[arg(long)]
        secret_file: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Keygen { kid, secret_file } => cmd_keygen(&kid, &secret_file),
        Commands::Seal {
            payload,
            kid,
            secret_file,
        } => cmd_seal(&payload, &kid, &secret_file),
        command => open_service(&cli.registry).and_then(|service| run(&service, command, verbose)),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// Dispatch the commands that need an open registry.
fn run(service: &VerificationService, command: Commands, verbose: bool) -> Result<()> {
    match command {
        Commands::Verify {
            rmt,
            imt,
            cort,
            psrt,
            request,
            json,
        } => {
            let request = match request {
                Some(path) => read_request(&path)?,
                None => VerificationRequest::new(
                    rmt.unwrap_or_default(),
                    imt.unwrap_or_default(),
                    cort.unwrap_or_default(),
                    psrt.unwrap_or_default(),
                ),
            };
            cmd_verify(service, &request, json, verbose)
        }
        Commands::Token { uri } => cmd_token(service, &uri),
        Commands::Lookup { r#type, slug } => cmd_lookup(service, &r#type, &slug),
        Commands::Catalog => cmd_catalog(service),
        Commands::Entries => cmd_entries(service, verbose),
        Commands::Check => cmd_check(service),
        Commands::Keygen { .. } | Commands::Seal { .. } => {
            Err(anyhow!("command does not use the registry"))
        }
    }
}

// ── Setup helpers ─────────────────────────────────────────────────────────────

fn load_config(args: &RegistryArgs) -> Result<RegistryConfig> {
    let mut config =
        RegistryConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = &args.static_dir {
        config.static_dir = dir.clone();
    }
    if let Some(manifest) = &args.manifest {
        config.manifest = Some(manifest.clone());
    }
    if let Some(verifier) = args.verifier {
        config.verifier = verifier;
    }
    if let Some(raw) = &args.fixed_time {
        config.fixed_time = Some(parse_rfc3339(raw).context("invalid --fixed-time")?);
    }
    Ok(config)
}

fn open_service(args: &RegistryArgs) -> Result<VerificationService> {
    let config = load_config(args)?;
    let dir = config.static_dir.clone();
    log::debug!("opening registry at {} ({} verifier)", dir.display(), config.verifier);
    VerificationService::open(config)
        .with_context(|| format!("failed to open registry at {}", dir.display()))
}

fn read_request(path: &Path) -> Result<VerificationRequest> {
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_slice(&bytes).context("invalid verification request")
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_payload(bytes: &[u8]) -> Result<()> {
    let value: Value = serde_json::from_slice(bytes).context("stored payload is not JSON")?;
    print_json(&value)
}

// ── Command implementations ───────────────────────────────────────────────────

/// `rtgf verify --rmt URI --imt URI --cort URI --psrt URI`
fn cmd_verify(
    service: &VerificationService,
    request: &VerificationRequest,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let now = service.config().now();
    let verdict = service.verify_at(request, now);

    if json {
        print_json(&verdict)?;
    } else if verdict.valid {
        println!("VALID (revEpoch {})", verdict.rev_epoch);
    } else {
        println!("REJECTED: {} (revEpoch {})", verdict.reason, verdict.rev_epoch);
    }
    if verbose {
        println!("  Evaluated at: {}", to_rfc3339(&now));
        println!("  Verifier:     {}", service.verifier_name());
        println!("  Snapshot:     {}", service.snapshot().snapshot_id());
    }

    if !verdict.valid {
        bail!("verification rejected: {}", verdict.reason);
    }
    Ok(())
}

/// `rtgf token URI`
fn cmd_token(service: &VerificationService, uri: &str) -> Result<()> {
    let bytes = service
        .token_by_uri(uri)
        .with_context(|| format!("token {uri}"))?;
    print_payload(&bytes)
}

/// `rtgf lookup TYPE SLUG`
fn cmd_lookup(service: &VerificationService, token_type: &str, slug: &str) -> Result<()> {
    let bytes = service
        .token_by_type_slug(token_type, slug)
        .with_context(|| format!("token {token_type}/{slug}"))?;
    print_payload(&bytes)
}

/// `rtgf catalog`
fn cmd_catalog(service: &VerificationService) -> Result<()> {
    print_json(&service.catalog())
}

/// `rtgf entries`
fn cmd_entries(service: &VerificationService, verbose: bool) -> Result<()> {
    let snapshot = service.snapshot();
    let index = snapshot.index();
    println!("{} token(s) in {}", index.len(), index.snapshot_id());
    for entry in index.iter() {
        let expires = entry
            .expires_at
            .as_ref()
            .map(to_rfc3339)
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:<5} {:<42} slug={} exp={}{}",
            entry.token_type.as_str(),
            entry.uri,
            entry.slug.as_deref().unwrap_or("-"),
            expires,
            if entry.revoked { " REVOKED" } else { "" }
        );
        if verbose {
            println!("        content: {}", entry.content_ref);
            if !entry.version.is_empty() {
                println!("        version: {}", entry.version);
            }
            if !entry.hash.is_empty() {
                println!("        hash:    {}", entry.hash);
            }
        }
    }
    Ok(())
}

/// `rtgf check`
fn cmd_check(service: &VerificationService) -> Result<()> {
    let snapshot = service.snapshot();
    let keys = service.jwks()["keys"].as_array().map_or(0, Vec::len);
    println!("Registry OK");
    println!("  Static dir: {}", service.config().static_dir.display());
    println!("  Tokens:     {}", snapshot.index().len());
    println!("  Snapshot:   {}", snapshot.snapshot_id());
    println!("  Verifier:   {}", service.verifier_name());
    println!("  JWKS keys:  {keys}");
    println!("  Rev epoch:  {}", service.read_epoch());
    Ok(())
}

/// `rtgf keygen --kid KID --secret-file PATH`
fn cmd_keygen(kid: &str, secret_file: &Path) -> Result<()> {
    if secret_file.exists() {
        return Err(anyhow!("{} already exists", secret_file.display()));
    }
    let key = Ed25519KeyPair::generate();
    std::fs::write(secret_file, hex::encode(key.signing_key().to_bytes()))
        .with_context(|| format!("failed to write {}", secret_file.display()))?;
    print_json(&serde_json::json!({ "keys": [key.to_jwk(kid)] }))
}

/// `rtgf seal PAYLOAD --kid KID --secret-file PATH`
fn cmd_seal(payload: &Path, kid: &str, secret_file: &Path) -> Result<()> {
    let key = read_secret(secret_file)?;
    let bytes =
        std::fs::read(payload).with_context(|| format!("failed to read {}", payload.display()))?;
    let object = match serde_json::from_slice::<Value>(&bytes)
        .with_context(|| format!("{} is not JSON", payload.display()))?
    {
        Value::Object(map) => map,
        _ => bail!("{} is not a JSON object", payload.display()),
    };
    let sealed = seal_payload(key.signing_key(), kid, &object)?;
    print_json(&sealed)
}

fn read_secret(path: &Path) -> Result<Ed25519KeyPair> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = hex::decode(text.trim()).context("secret key is not hex")?;
    let bytes: [u8; 32] = raw
        .try_into()
        .map_err(|_| anyhow!("secret key must be 32 bytes"))?;
    Ok(Ed25519KeyPair::from_signing_key_bytes(&bytes))
}
