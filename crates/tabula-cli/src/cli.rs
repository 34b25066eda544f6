//! CLI argument definitions for tabula.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bases` | List bases visible to the token |
//! | `schema` | Show the tables, views and fields of a base |
//! | `enums fields` | Print one field name/id enum per table |
//! | `enums tables` | Print the table name/id enum of a base |
//! | `records list` | List records of a table |
//! | `records get` | Fetch records by id |
//! | `webhooks` | List webhooks of a base |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-key` | `$AIRTABLE_API_KEY` | Personal access token |
//! | `--api-url` | `https://api.airtable.com/v0` | API root |
//! | `--timeout-ms` | `30000` | Request timeout in ms |
//! | `--format` | `json` | Output format (json, text) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! tabula bases --all --pretty
//! tabula enums fields --base appGjiqxJsDA2rAp4 --format text
//! tabula records list --base appGjiqxJsDA2rAp4 --table Users --page-size 50
//! tabula records list --base appGjiqxJsDA2rAp4 --table Users --sort Name --sort Age:desc
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use tabula_core::client::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS};
use tabula_core::{CellFormat, Sort};

/// Schema-validated Airtable CLI.
#[derive(Debug, Parser)]
#[command(name = "tabula", author, version, about = "Schema-validated Airtable CLI")]
pub struct Cli {
    /// Airtable personal access token.
    #[arg(long, global = true, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true, env = "AIRTABLE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in milliseconds.
    #[arg(long, global = true, env = "AIRTABLE_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Envelope as a single JSON object.
    Json,
    /// Human-readable summary; enum text is printed verbatim.
    Text,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List bases visible to the token.
    Bases(BasesArgs),
    /// Show a base's tables, views and fields.
    Schema(BaseArgs),
    /// Generate name/id enums from a base schema.
    Enums(EnumsArgs),
    /// Read records.
    Records(RecordsArgs),
    /// List a base's webhooks.
    Webhooks(BaseArgs),
}

#[derive(Debug, Args)]
pub struct BasesArgs {
    /// Follow offsets and return every page.
    #[arg(long, default_value_t = false, conflicts_with = "offset")]
    pub all: bool,

    /// Continuation token from a previous page.
    #[arg(long)]
    pub offset: Option<String>,
}

#[derive(Debug, Args)]
pub struct BaseArgs {
    /// Base id (`app...`).
    #[arg(long)]
    pub base: String,
}

#[derive(Debug, Args)]
pub struct EnumsArgs {
    #[command(subcommand)]
    pub command: EnumsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnumsCommand {
    /// One field enum per table.
    Fields(BaseArgs),
    /// One enum listing the base's tables.
    Tables(TablesEnumArgs),
}

#[derive(Debug, Args)]
pub struct TablesEnumArgs {
    #[arg(long)]
    pub base: String,

    /// Name of the generated enum.
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List every record matching the options.
    List(ListRecordsArgs),
    /// Fetch records by id.
    Get(GetRecordsArgs),
}

#[derive(Debug, Args)]
pub struct TableArgs {
    #[arg(long)]
    pub base: String,

    /// Table name or id.
    #[arg(long)]
    pub table: String,
}

#[derive(Debug, Args)]
pub struct ListRecordsArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// View name or id.
    #[arg(long)]
    pub view: Option<String>,

    /// Formula records must satisfy.
    #[arg(long)]
    pub formula: Option<String>,

    /// Field to return; repeat for several.
    #[arg(long = "field")]
    pub fields: Vec<String>,

    #[arg(long)]
    pub max_records: Option<u32>,

    #[arg(long)]
    pub page_size: Option<u32>,

    /// Sort key as `FIELD` or `FIELD:asc|desc`; repeat for several.
    #[arg(long = "sort", value_parser = parse_sort)]
    pub sort: Vec<Sort>,

    #[arg(long, value_enum)]
    pub cell_format: Option<CellFormatArg>,

    /// Time zone for `string` cells, e.g. `Europe/Paris`.
    #[arg(long)]
    pub time_zone: Option<String>,

    /// Locale for `string` cells, e.g. `fr`.
    #[arg(long)]
    pub user_locale: Option<String>,

    /// Key returned fields by id instead of name.
    #[arg(long, default_value_t = false)]
    pub field_ids: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CellFormatArg {
    Json,
    String,
}

impl From<CellFormatArg> for CellFormat {
    fn from(value: CellFormatArg) -> Self {
        match value {
            CellFormatArg::Json => Self::Json,
            CellFormatArg::String => Self::String,
        }
    }
}

fn parse_sort(raw: &str) -> Result<Sort, String> {
    let (field, direction) = match raw.rsplit_once(':') {
        Some((field, direction)) => (field, Some(direction)),
        None => (raw, None),
    };
    if field.is_empty() {
        return Err(String::from("sort field must not be empty"));
    }

    match direction {
        None | Some("asc") => Ok(Sort::asc(field)),
        Some("desc") => Ok(Sort::desc(field)),
        Some(other) => Err(format!("unknown sort direction '{other}', expected asc or desc")),
    }
}

#[derive(Debug, Args)]
pub struct GetRecordsArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Record ids (`rec...`).
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_records_get_with_several_ids() {
        let cli = Cli::try_parse_from([
            "tabula",
            "--api-key",
            "pat123",
            "records",
            "get",
            "--base",
            "appGjiqxJsDA2rAp4",
            "--table",
            "Users",
            "rec1",
            "rec2",
        ])
        .expect("arguments should parse");

        let Command::Records(RecordsArgs {
            command: RecordsCommand::Get(args),
        }) = cli.command
        else {
            panic!("expected records get");
        };
        assert_eq!(args.ids, vec!["rec1", "rec2"]);
        assert_eq!(args.table.table, "Users");
    }

    #[test]
    fn parses_sort_keys_with_direction() {
        assert_eq!(parse_sort("Name"), Ok(Sort::asc("Name")));
        assert_eq!(parse_sort("Age:desc"), Ok(Sort::desc("Age")));
        assert_eq!(parse_sort("Due: time:asc"), Ok(Sort::asc("Due: time")));
        assert!(parse_sort("Age:down").is_err());
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn bases_rejects_all_with_offset() {
        let result = Cli::try_parse_from(["tabula", "bases", "--all", "--offset", "itr1"]);
        assert!(result.is_err());
    }
}
