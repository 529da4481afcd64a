//! # Command Line Interface
//!
//! Operator tooling for exercising an issuer configuration by hand: sign a
//! CSR against a CFSSL endpoint, or check a CA bundle.

pub mod output;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Instrument};
use x509_parser::prelude::X509Certificate;

use crate::config::{self, AppConfig};
use crate::issuer::is_terminal_failure;
use crate::observability::{init_logging, log_config_info};
use crate::provisioners::{validate_ca_bundle, SignContext, SignedBundle, Signer, SigningClient};
use output::{print_bundle_report, BundleReport, CertificateSummary, OutputFormat};

#[derive(Parser)]
#[command(name = "cfssl-issuer")]
#[command(about = "CFSSL issuer signing tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign a certificate request with a CFSSL signing authority
    Sign(SignArgs),

    /// Check that a CA bundle yields at least one trust anchor
    ValidateBundle {
        /// PEM CA bundle
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SignArgs {
    /// CFSSL endpoint, `https://host:port` or bare `host[:port]`
    #[arg(long)]
    pub url: String,

    /// PEM CA bundle, root last
    #[arg(long)]
    pub ca_bundle: PathBuf,

    /// PEM certificate signing request
    #[arg(long)]
    pub csr: PathBuf,

    /// CFSSL signing profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the leaf chain here instead of stdout
    #[arg(long)]
    pub out_cert: Option<PathBuf>,

    /// Write the root CA here instead of stdout
    #[arg(long)]
    pub out_ca: Option<PathBuf>,
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    initialise_logging(&config);
    log_config_info(&config);

    match cli.command {
        Commands::Sign(args) => {
            let bundle = handle_sign(&args, &config).await?;
            write_bundle(&args, &bundle).await?;
        }
        Commands::ValidateBundle { file, output } => {
            let report = handle_validate_bundle(&file).await?;
            print_bundle_report(&report, output)?;
        }
    }

    Ok(())
}

fn initialise_logging(config: &AppConfig) {
    // A subscriber may already be installed by an embedding test harness.
    let _ = init_logging(&config.observability);
}

/// Sign the CSR named by `args`.
///
/// Failures say in the error message whether they are terminal or transient.
pub async fn handle_sign(args: &SignArgs, config: &AppConfig) -> Result<SignedBundle> {
    let ca_bundle = read_file(&args.ca_bundle, "CA bundle").await?;
    let csr = read_file(&args.csr, "certificate request").await?;

    let client = SigningClient::with_settings(
        &args.url,
        args.profile.clone(),
        &ca_bundle,
        &config.client.remote_settings(),
    )?;

    let ctx = match args.timeout {
        Some(seconds) => SignContext::background().with_timeout(Duration::from_secs(seconds)),
        None => SignContext::background(),
    };

    let span = crate::sign_span!(args.url, client.profile());
    match client.sign(&csr, &ctx).instrument(span).await {
        Ok(bundle) => {
            info!(endpoint = %args.url, "Certificate issued");
            Ok(bundle)
        }
        Err(e) => {
            let terminal = is_terminal_failure(&e);
            warn!(endpoint = %args.url, terminal = terminal, error = %e, "Signing failed");
            Err(anyhow::Error::new(e).context(format!(
                "signing failed ({})",
                if terminal { "terminal" } else { "transient" }
            )))
        }
    }
}

/// Parse a CA bundle file and summarize the certificates it contributes.
pub async fn handle_validate_bundle(file: &Path) -> Result<BundleReport> {
    let pem = read_file(file, "CA bundle").await?;
    let pool = validate_ca_bundle(&pem)?;

    let certificates = pool
        .bundle_certificates()
        .iter()
        .map(|der| {
            let (_, cert) = x509_parser::parse_x509_certificate(der.as_ref())
                .map_err(|e| anyhow::anyhow!("failed to parse certificate: {}", e))?;
            Ok(summarize(&cert))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BundleReport { certificates, system_roots: pool.system_roots() })
}

fn summarize(cert: &X509Certificate<'_>) -> CertificateSummary {
    CertificateSummary {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_after: cert.validity().not_after.to_string(),
        is_ca: cert.is_ca(),
    }
}

async fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))
}

async fn write_bundle(args: &SignArgs, bundle: &SignedBundle) -> Result<()> {
    match &args.out_cert {
        Some(path) => tokio::fs::write(path, &bundle.leaf_certificate)
            .await
            .with_context(|| format!("Failed to write certificate to {}", path.display()))?,
        None => print!("{}", String::from_utf8_lossy(&bundle.leaf_certificate)),
    }

    match &args.out_ca {
        Some(path) => tokio::fs::write(path, &bundle.root_ca)
            .await
            .with_context(|| format!("Failed to write root CA to {}", path.display()))?,
        None => print!("{}", String::from_utf8_lossy(&bundle.root_ca)),
    }

    Ok(())
}
