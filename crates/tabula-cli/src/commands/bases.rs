use serde_json::json;
use tabula_core::AirtableClient;

use crate::cli::BasesArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &BasesArgs, client: &AirtableClient) -> Result<CommandResult, CliError> {
    let meta = client.meta();

    let data = if args.all {
        json!({ "bases": meta.list_all_bases().await? })
    } else {
        serde_json::to_value(meta.list_bases(args.offset.as_deref()).await?)?
    };

    Ok(CommandResult::ok(data))
}
