use serde_json::Value;
use tabula_core::AirtableClient;

use crate::cli::{EnumsArgs, EnumsCommand};
use crate::error::CliError;

use super::{parse_base, CommandResult};

pub async fn run(args: &EnumsArgs, client: &AirtableClient) -> Result<CommandResult, CliError> {
    let meta = client.meta();

    let data = match &args.command {
        EnumsCommand::Fields(args) => {
            let base_id = parse_base(&args.base)?;
            let enums = meta.gen_field_id_enums(&base_id).await?;
            Value::from(enums)
        }
        EnumsCommand::Tables(args) => {
            let base_id = parse_base(&args.base)?;
            Value::from(meta.gen_table_id_enums(&args.name, &base_id).await?)
        }
    };

    Ok(CommandResult::ok(data))
}
