use tabula_core::AirtableClient;

use crate::cli::BaseArgs;
use crate::error::CliError;

use super::{parse_base, CommandResult};

pub async fn run(args: &BaseArgs, client: &AirtableClient) -> Result<CommandResult, CliError> {
    let base_id = parse_base(&args.base)?;
    let schema = client.meta().get_base_schema(&base_id).await?;
    Ok(CommandResult::ok(serde_json::to_value(schema)?))
}
