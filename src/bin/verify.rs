use anyhow::{Context as _, Result};
use securesbom::cli::{self, ConnectionArgs, VerifyOutput};
use securesbom::{Context, SbomFormat, SecureSbomApi, VerifyResult};
use std::process::ExitCode;
use std::time::Duration;

/// Verify the authenticity and integrity of a signed SBOM document.
///
/// CycloneDX documents carry their signature inline. For SPDX documents pass
/// the detached signature with -signature.
///
/// Exit codes:
///   0  Signature is valid
///   1  Signature is invalid or verification failed
///
/// Examples:
///   verify -key-id my-key-123 -sbom signed-sbom.json
///   cat signed-sbom.json | verify -key-id my-key-123 -output json
///   verify -key-id my-key-123 -sbom sbom.spdx.json -signature MEUCIQ...
#[derive(clap::Parser, Debug)]
#[command(version, about, verbatim_doc_comment)]
struct Cli {
    /// Key ID used to sign the SBOM
    #[arg(
        long = "key-id",
        value_name = "KEY_ID",
        allow_hyphen_values = true,
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    key_id: String,

    /// Path to signed SBOM file (use '-' or omit for stdin)
    #[arg(long, value_name = "PATH")]
    sbom: Option<String>,

    /// Detached signature to verify (SPDX only)
    #[arg(long, value_name = "SIGNATURE", allow_hyphen_values = true)]
    signature: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = VerifyOutput::Text)]
    output: VerifyOutput,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl Cli {
    /// The detached signature, when one was actually supplied.
    fn spdx_signature(&self) -> Option<&str> {
        self.signature
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
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

    match run(&cli).await {
        Ok(result) if result.valid => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<VerifyResult> {
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
    let sbom = cli::read_sbom(cli.sbom.as_deref()).context("loading signed SBOM")?;

    progress.step("Connecting to SecureSBOM API...");
    client
        .health_check(&ctx)
        .await
        .context("connecting to API")?;

    progress.step(format!(
        "Verifying SBOM signature with key {}...",
        cli.key_id
    ));
    let result = match cli.spdx_signature() {
        Some(signature) => {
            tracing::info!("verifying SPDX SBOM");
            client
                .verify_spdx_sbom(&ctx, &cli.key_id, signature, sbom.document())
                .await
        }
        None => {
            if sbom.format() == SbomFormat::Spdx {
                tracing::warn!("document looks like SPDX but no -signature was given");
            }
            tracing::info!("verifying CycloneDX SBOM");
            client.verify_sbom(&ctx, &cli.key_id, sbom.document()).await
        }
    }
    .context("verifying SBOM")?;

    match cli.output {
        VerifyOutput::Json => {
            let json = cli::to_pretty_json(&cli::render_verify_json(&result))?;
            cli::write_output(None, json.as_bytes())?;
        }
        VerifyOutput::Text => {
            print!("{}", cli::render_verify_text(&result));
        }
    }

    Ok(result)
}
