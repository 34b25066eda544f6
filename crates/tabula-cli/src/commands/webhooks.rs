use tabula_core::AirtableClient;

use crate::cli::BaseArgs;
use crate::error::CliError;

use super::{parse_base, CommandResult};

pub async fn run(args: &BaseArgs, client: &AirtableClient) -> Result<CommandResult, CliError> {
    let base_id = parse_base(&args.base)?;
    let webhooks = client.meta().list_webhooks(&base_id).await?;
    Ok(CommandResult::ok(serde_json::to_value(webhooks)?))
}
