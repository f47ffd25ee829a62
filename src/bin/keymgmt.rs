use anyhow::{Context as _, Result};
use securesbom::cli::{self, ConnectionArgs, TableOutput};
use securesbom::{Context, SecureSbomApi};
use std::process::ExitCode;

/// Manage signing keys held by the SecureSBOM service.
///
/// Examples:
///   keymgmt list
///   keymgmt list -output json
///   keymgmt generate -save-public my-key.pem
///   keymgmt public my-key-123 -output my-key.pem
#[derive(clap::Parser, Debug)]
#[command(version, about, verbatim_doc_comment)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List all signing keys
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = TableOutput::Table)]
        output: TableOutput,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Generate a new signing key
    Generate {
        /// Output format
        #[arg(long, value_enum, default_value_t = TableOutput::Table)]
        output: TableOutput,

        /// Also save the public key to this file
        #[arg(long = "save-public", value_name = "PATH")]
        save_public: Option<String>,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Fetch the public key for a signing key
    Public {
        /// Key ID
        #[arg(value_name = "KEY_ID", value_parser = clap::builder::NonEmptyStringValueParser::new())]
        key_id: String,

        /// Output file path (omit for stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<String>,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

impl Command {
    fn connection(&self) -> &ConnectionArgs {
        match self {
            Command::List { connection, .. }
            | Command::Generate { connection, .. }
            | Command::Public { connection, .. } => connection,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    if let Err(e) = cli.command.connection().init_tracing() {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &Command) -> Result<()> {
    let connection = command.connection();
    let client = connection
        .build_client()
        .context("creating SDK client")?;
    let ctx = Context::with_timeout(connection.timeout);

    match command {
        Command::List { output, .. } => {
            list_keys(client.as_ref(), &ctx, *output, connection).await
        }
        Command::Generate {
            output,
            save_public,
            ..
        } => generate_key(client.as_ref(), &ctx, *output, save_public.as_deref(), connection).await,
        Command::Public { key_id, output, .. } => {
            public_key(client.as_ref(), &ctx, key_id, output.as_deref(), connection).await
        }
    }
}

async fn list_keys(
    client: &dyn SecureSbomApi,
    ctx: &Context,
    output: TableOutput,
    connection: &ConnectionArgs,
) -> Result<()> {
    connection
        .progress()
        .step("Retrieving keys from SecureSBOM...");
    let list = client.list_keys(ctx).await.context("listing keys")?;
    tracing::debug!(count = list.keys.len(), "keys listed");

    match output {
        TableOutput::Json => {
            let json = cli::to_pretty_json(&list)?;
            cli::write_output(None, json.as_bytes())?;
        }
        TableOutput::Table => print!("{}", cli::render_keys_table(&list)),
    }
    Ok(())
}

async fn generate_key(
    client: &dyn SecureSbomApi,
    ctx: &Context,
    output: TableOutput,
    save_public: Option<&str>,
    connection: &ConnectionArgs,
) -> Result<()> {
    let progress = connection.progress();
    progress.step("Generating new signing key...");
    let key = client.generate_key(ctx).await.context("generating key")?;
    tracing::info!(key_id = %key.id, "key generated");

    match output {
        TableOutput::Json => {
            let json = cli::to_pretty_json(&key)?;
            cli::write_output(None, json.as_bytes())?;
        }
        TableOutput::Table => print!("{}", cli::render_generated_key(&key)),
    }

    if let Some(path) = save_public {
        std::fs::write(path, key.public_key.as_bytes())
            .with_context(|| format!("saving public key to {path}"))?;
        progress.step(format!("✓ Public key saved to: {path}"));
    }
    Ok(())
}

async fn public_key(
    client: &dyn SecureSbomApi,
    ctx: &Context,
    key_id: &str,
    output: Option<&str>,
    connection: &ConnectionArgs,
) -> Result<()> {
    let progress = connection.progress();
    progress.step(format!("Retrieving public key for {key_id}..."));
    let pem = client
        .get_public_key(ctx, key_id)
        .await
        .with_context(|| format!("getting public key for {key_id}"))?;

    match output.filter(|p| !p.is_empty() && *p != "-") {
        Some(path) => {
            std::fs::write(path, pem.as_bytes())
                .with_context(|| format!("writing public key to {path}"))?;
            progress.step(format!("✓ Public key for {key_id} written to: {path}"));
        }
        None => print!("{pem}"),
    }
    Ok(())
}
