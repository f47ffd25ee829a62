//! Shared plumbing for the `sign`, `verify` and `keymgmt` binaries.
//!
//! The binaries accept Go-style single-dash long flags (`-key-id`) as well
//! as the usual `--key-id`; [`normalize_args`] rewrites the declared ones
//! before clap sees them.

use crate::api::SecureSbomApi;
use crate::config::Config;
use crate::error::{Result, SecureSbomError};
use crate::retry::{RetryConfig, RetryingClient};
use crate::sbom::Sbom;
use crate::types::{GeneratedKey, KeyList, VerifyResult};
use anyhow::Context as _;
use clap::{CommandFactory, Parser};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Connection, retry and verbosity flags shared by every binary.
#[derive(clap::Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API key (or set SECURE_SBOM_API_KEY)
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// API base URL (or set SECURE_SBOM_BASE_URL)
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout, e.g. 30s, 500ms, 2m
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Number of attempts for temporary failures (0 disables retries)
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,

    /// Log filter directives, e.g. "debug" or "securesbom=trace"
    #[arg(long = "log-filter", env = "SECURE_SBOM_LOG", value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl ConnectionArgs {
    /// Retry policy implied by `--retries`.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_max_attempts(self.retries)
    }

    /// Build a client from flags and environment, adding retries unless
    /// `--retries 0` was given.
    ///
    /// Flags override `SECURE_SBOM_API_KEY` / `SECURE_SBOM_BASE_URL`.
    pub fn build_client(&self) -> Result<Box<dyn SecureSbomApi>> {
        let mut builder = Config::builder().with_timeout(self.timeout).from_env();
        if let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.with_api_key(api_key);
        }
        if let Some(base_url) = self.base_url.as_deref().filter(|u| !u.is_empty()) {
            builder = builder.with_base_url(base_url);
        }
        let client = builder.build_client()?;

        if self.retries > 0 {
            Ok(Box::new(RetryingClient::new(client, self.retry_config())))
        } else {
            Ok(Box::new(client))
        }
    }

    /// Progress reporter honouring `--quiet`.
    pub fn progress(&self) -> Progress {
        Progress { quiet: self.quiet }
    }

    /// Install the stderr tracing subscriber.
    ///
    /// Defaults to `warn`, or `error` with `--quiet`.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let default = if self.quiet { "error" } else { "warn" };
        let directives = self.log_filter.as_deref().unwrap_or(default);
        let filter = EnvFilter::builder().parse(directives).with_context(|| {
            format!("SECURE_SBOM_LOG contains an invalid log directive: {directives:?}")
        })?;
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        let registry = tracing_subscriber::registry().with(stderr_layer).with(filter);
        tracing::subscriber::set_global_default(registry)
            .context("a global tracing subscriber is already installed")?;
        Ok(())
    }
}

/// Writes progress lines to stderr unless quiet.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    quiet: bool,
}

impl Progress {
    /// Report one step.
    pub fn step(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }
}

/// Output format for `verify`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyOutput {
    /// Human-readable summary.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Output format for `keymgmt list` and `keymgmt generate`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableOutput {
    /// Aligned text table.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

/// Rewrite Go-style `-flag` arguments to `--flag`.
///
/// Only names declared as long flags on `command` (or one of its
/// subcommands) are rewritten. The token right after a flag that takes a
/// value is passed through untouched, so values such as `-k1` survive, as
/// does everything after a `--` terminator.
pub fn normalize_args<I, T>(command: &clap::Command, args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let flags = long_flags(command);
    let mut terminated = false;
    let mut value_next = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if terminated || std::mem::take(&mut value_next) {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                terminated = true;
                return arg;
            }
            let Some(flag) = text.strip_prefix("--").or_else(|| text.strip_prefix('-')) else {
                return arg;
            };
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };
            let Some(&takes_value) = flags.get(name) else {
                return arg;
            };
            value_next = takes_value && !inline_value;
            if text.starts_with("--") {
                arg
            } else {
                OsString::from(format!("-{text}"))
            }
        })
        .collect()
}

/// Long flag names declared anywhere in `command`, mapped to whether the
/// flag consumes a value.
fn long_flags(command: &clap::Command) -> HashMap<String, bool> {
    let mut flags = HashMap::from([("help".to_string(), false), ("version".to_string(), false)]);
    let mut pending = vec![command];
    while let Some(command) = pending.pop() {
        for arg in command.get_arguments() {
            if let Some(long) = arg.get_long() {
                flags.insert(long.to_string(), arg.get_action().takes_values());
            }
        }
        pending.extend(command.get_subcommands());
    }
    flags
}

/// Parse the process arguments into `P`.
///
/// On `--help` the help text is printed and `Err(ExitCode::SUCCESS)` is
/// returned; on a usage error the message is printed and the result is
/// `Err(ExitCode::FAILURE)`.
pub fn parse_args<P: Parser>() -> std::result::Result<P, ExitCode> {
    let mut args = std::env::args_os();
    let program = args.next().unwrap_or_else(|| OsString::from("securesbom"));
    let argv = std::iter::once(program).chain(normalize_args(&P::command(), args));
    P::try_parse_from(argv).map_err(|e| {
        let _ = e.print();
        if e.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}

/// Parse a duration such as `30s`, `1m30s`, `1.5s`, `250ms` or `2h`.
/// A bare number is taken as seconds.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = input.parse::<u64>() {
        return secs
            .checked_mul(1_000_000_000)
            .map(Duration::from_nanos)
            .ok_or_else(|| format!("duration {input:?} is out of range"));
    }

    let mut nanos = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {input:?}"))?;
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            other => return Err(format!("unknown unit {other:?} in duration {input:?}")),
        };
        nanos += value * scale;
        rest = tail;
    }

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(format!("duration {input:?} is out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// A path of `-` (or no path) selects stdin/stdout.
fn file_path(path: Option<&str>) -> Option<&str> {
    path.filter(|p| !p.is_empty() && *p != "-")
}

/// Load an SBOM from `path`, or stdin when the path is absent or `-`.
pub fn read_sbom(path: Option<&str>) -> Result<Sbom> {
    match file_path(path) {
        Some(path) => Sbom::from_file(path),
        None => Sbom::from_reader(std::io::stdin().lock()),
    }
}

/// Write `contents` to `path`, or to stdout (with a trailing newline) when the
/// path is absent or `-`. Returns true when a file was written.
pub fn write_output(path: Option<&str>, contents: &[u8]) -> Result<bool> {
    match file_path(path) {
        Some(path) => {
            std::fs::write(path, contents).map_err(|e| SecureSbomError::io(path, e))?;
            Ok(true)
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(contents)
                .and_then(|_| stdout.write_all(b"\n"))
                .and_then(|_| stdout.flush())
                .map_err(|e| SecureSbomError::io("-", e))?;
            Ok(false)
        }
    }
}

/// Shorten an RFC 3339 timestamp to `YYYY-MM-DD HH:MM`; other strings pass
/// through unchanged.
pub fn short_timestamp(timestamp: &str) -> String {
    let bytes = timestamp.as_bytes();
    if bytes.len() >= 16 && bytes[10] == b'T' && timestamp.is_char_boundary(16) {
        format!("{} {}", &timestamp[..10], &timestamp[11..16])
    } else {
        timestamp.to_string()
    }
}

/// Human-readable verification summary.
pub fn render_verify_text(result: &VerifyResult) -> String {
    let mut out = String::new();
    if result.valid {
        out.push_str("✓ SBOM signature is VALID\n");
    } else {
        out.push_str("✗ SBOM signature is INVALID\n");
    }
    if !result.message.is_empty() {
        let _ = writeln!(out, "Message:    {}", result.message);
    }
    if let Some(key_id) = result.key_id.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Key ID:     {key_id}");
    }
    if let Some(algorithm) = result.algorithm.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Algorithm:  {algorithm}");
    }
    if let Some(timestamp) = result.timestamp.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Verified:   {timestamp}");
    }
    out
}

/// JSON verification summary for automation.
pub fn render_verify_json(result: &VerifyResult) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    out.insert("valid".into(), result.valid.into());
    out.insert(
        "status".into(),
        if result.valid { "VALID" } else { "INVALID" }.into(),
    );
    out.insert("message".into(), result.message.clone().into());
    out.insert(
        "timestamp".into(),
        result
            .timestamp
            .clone()
            .map_or(serde_json::Value::Null, Into::into),
    );
    if let Some(key_id) = result.key_id.as_deref().filter(|s| !s.is_empty()) {
        out.insert("key_id".into(), key_id.into());
    }
    if let Some(algorithm) = result.algorithm.as_deref().filter(|s| !s.is_empty()) {
        out.insert("algorithm".into(), algorithm.into());
    }
    serde_json::Value::Object(out)
}

/// Aligned `KEY ID / CREATED / ALGORITHM` table.
pub fn render_keys_table(list: &KeyList) -> String {
    let mut rows: Vec<[String; 3]> = vec![
        ["KEY ID".into(), "CREATED".into(), "ALGORITHM".into()],
        ["------".into(), "-------".into(), "---------".into()],
    ];
    for key in &list.keys {
        rows.push([
            key.id.clone(),
            short_timestamp(&key.created_at),
            key.algorithm
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "default".to_string()),
        ]);
    }
    if list.keys.is_empty() {
        rows.push(["No keys found".into(), String::new(), String::new()]);
    }

    let widths: Vec<usize> = (0..3)
        .map(|col| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &rows {
        let line = format!(
            "{:<w0$}   {:<w1$}   {}",
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1]
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Summary of a freshly generated key.
pub fn render_generated_key(key: &GeneratedKey) -> String {
    const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

    let mut out = String::from("✓ New key generated successfully\n\n");
    let _ = writeln!(out, "Key ID:     {}", key.id);
    let _ = writeln!(out, "Created:    {}", key.created_at);
    if let Some(algorithm) = key.algorithm.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Algorithm:  {algorithm}");
    }
    if !key.public_key.is_empty() {
        let _ = writeln!(out, "\nPublic Key:\n{RULE}");
        out.push_str(&key.public_key);
        if !key.public_key.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "{RULE}");
    }
    let _ = writeln!(out, "\nYou can now use this key ID for signing:");
    let _ = writeln!(out, "  sign -key-id {} -sbom your-sbom.json", key.id);
    out
}

/// Pretty-print a JSON value with two-space indentation.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SecureSbomError::Decode(format!("failed to encode JSON: {e}")))
}
