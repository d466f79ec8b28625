//! Command-line arguments for `audex`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use serde_json::Value;

use audex_model::ExportFormat;

#[derive(Parser)]
#[command(
    name = "audex",
    version,
    about = "Audited, redacted exports of tabular records",
    long_about = "Redact raw records under a per-module policy and export them as a \
                  spreadsheet (xlsx) or a paginated document (pdf).\n\n\
                  Every file carries an audit record: export id, timestamp, hashed \
                  initiator, checksum over the redacted rows and the redacted fields."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v info, -vv debug, -vvv trace, -q errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw record values in trace output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Redact records and write an export file.
    Export(ExportArgs),

    /// Redact and validate records, then print the rows without writing a file.
    Preview(PreviewArgs),

    /// List the policies in a catalog, or the fields of one module.
    Policies(PoliciesArgs),
}

/// Inputs shared by `export` and `preview`.
#[derive(Args)]
pub struct RequestArgs {
    /// TOML policy catalog.
    #[arg(long = "policies", value_name = "TOML")]
    pub policies: PathBuf,

    /// Records as a JSON array of objects, or CSV with a header row.
    #[arg(long = "records", value_name = "PATH")]
    pub records: PathBuf,

    /// Module whose policy applies.
    #[arg(long = "module", short = 'm')]
    pub module: String,

    #[arg(long = "format", short = 'f', value_enum, default_value = "xlsx")]
    pub format: FormatArg,

    /// Comma-separated field keys (default: the policy's default selection).
    #[arg(long = "fields", value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Start of the date window the records were filtered by (YYYY-MM-DD).
    #[arg(long = "from", value_parser = parse_date, requires = "to")]
    pub from: Option<NaiveDate>,

    /// End of the date window (YYYY-MM-DD).
    #[arg(long = "to", value_parser = parse_date, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Filter recorded in the audit metadata (KEY=VALUE, repeatable).
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, Value)>,

    /// Lift redaction on overridable fields.
    #[arg(long = "full-export")]
    pub full_export: bool,

    /// Confirm a full export on policies that require it.
    #[arg(long = "confirm", requires = "full_export")]
    pub confirm: bool,

    /// Omit the audit sheet/page from the file.
    #[arg(long = "no-audit")]
    pub no_audit: bool,

    /// Identity of the initiator; only its hash is recorded.
    #[arg(long = "user", default_value = "anonymous")]
    pub user: String,

    /// Use the deterministic non-cryptographic hash strategy.
    #[arg(long = "fallback-hash")]
    pub fallback_hash: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Directory the file is written to. Existing files are never replaced.
    #[arg(long = "out", short = 'o', value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Maximum rows to print.
    #[arg(long = "limit", default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args)]
pub struct PoliciesArgs {
    #[arg(long = "policies", value_name = "TOML")]
    pub policies: PathBuf,

    /// Show the fields of this module.
    #[arg(long = "module", short = 'm')]
    pub module: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xlsx => Self::Xlsx,
            FormatArg::Pdf => Self::Pdf,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| format!("{raw}: {err}"))
}

/// `KEY=VALUE`; the value is read as JSON when it parses, otherwise as text.
fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("filter key is empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("audex").chain(args.iter().copied()))
    }

    #[test]
    fn export_args_parse() {
        let cli = parse(&[
            "export",
            "--policies",
            "p.toml",
            "--records",
            "r.csv",
            "-m",
            "plans",
            "-f",
            "pdf",
            "--fields",
            "_id,name",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--filter",
            "status=active",
            "--filter",
            "limit=10",
            "-o",
            "out",
        ])
        .unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        let request = args.request;
        assert_eq!(request.format, FormatArg::Pdf);
        assert_eq!(request.fields, vec!["_id", "name"]);
        assert_eq!(request.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(
            request.filters,
            vec![
                ("status".to_string(), json!("active")),
                ("limit".to_string(), json!(10))
            ]
        );
        assert_eq!(args.out, PathBuf::from("out"));
        assert_eq!(request.user, "anonymous");
    }

    #[test]
    fn date_range_needs_both_ends() {
        assert!(
            parse(&[
                "preview", "--policies", "p.toml", "--records", "r.json", "-m", "plans", "--from",
                "2024-01-01",
            ])
            .is_err()
        );
    }

    #[test]
    fn confirm_requires_full_export() {
        assert!(
            parse(&[
                "export", "--policies", "p.toml", "--records", "r.json", "-m", "plans",
                "--confirm",
            ])
            .is_err()
        );
    }

    #[test]
    fn filter_parser() {
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
        assert_eq!(
            parse_filter("tags=[1,2]").unwrap(),
            ("tags".to_string(), json!([1, 2]))
        );
        assert_eq!(
            parse_filter("q=a=b").unwrap(),
            ("q".to_string(), json!("a=b"))
        );
    }
}
