use anyhow::{Context as _, Result};
use securesbom::cli::{self, ConnectionArgs};
use securesbom::{Context, SecureSbomApi};
use std::process::ExitCode;
use std::time::Duration;

/// Sign an SBOM document using the SecureSBOM service.
///
/// Reads the SBOM from a file or stdin and writes the signed document as
/// indented JSON to a file or stdout.
///
/// Examples:
///   sign -key-id my-key-123 -sbom sbom.json -output signed.json
///   cat sbom.json | sign -key-id my-key-123 > signed.json
///   sign -key-id my-key-123 -sbom sbom.json -retries 0
#[derive(clap::Parser, Debug)]
#[command(version, about, verbatim_doc_comment)]
struct Cli {
    /// Key ID to use for signing
    #[arg(
        long = "key-id",
        value_name = "KEY_ID",
        allow_hyphen_values = true,
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    key_id: String,

    /// Path to SBOM file (use '-' or omit for stdin)
    #[arg(long, value_name = "PATH")]
    sbom: Option<String>,

    /// Output file path (use '-' or omit for stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<String>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    if let Err(e) = cli.connection.init_tracing() {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let progress = cli.connection.progress();
    let client = cli
        .connection
        .build_client()
        .context("creating SDK client")?;
    let ctx = Context::with_timeout(
        cli.connection
            .timeout
            .saturating_add(Duration::from_secs(10)),
    );

    progress.step("Loading SBOM...");
    let sbom = cli::read_sbom(cli.sbom.as_deref()).context("loading SBOM")?;
    tracing::debug!(format = %sbom.format(), sha256 = %sbom.digest(), "SBOM loaded");

    progress.step("Connecting to SecureSBOM API...");
    client
        .health_check(&ctx)
        .await
        .context("connecting to API")?;

    progress.step(format!("Signing SBOM with key {}...", cli.key_id));
    let signed = client
        .sign_sbom(&ctx, &cli.key_id, sbom.document())
        .await
        .context("signing SBOM")?;

    let json = cli::to_pretty_json(&signed).context("encoding signed SBOM")?;
    let wrote_file = cli::write_output(cli.output.as_deref(), json.as_bytes())
        .context("writing signed SBOM")?;

    progress.step("✓ SBOM successfully signed");
    match cli.output.as_deref() {
        Some(path) if wrote_file => progress.step(format!("  Output written to: {path}")),
        _ => progress.step("  Output written to stdout"),
    }
    Ok(())
}
