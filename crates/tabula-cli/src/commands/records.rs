use serde_json::json;
use tabula_core::{AirtableClient, FieldSet, RecordSchema, SelectQuery, Table};

use crate::cli::{ListRecordsArgs, RecordsArgs, RecordsCommand, TableArgs};
use crate::error::CliError;
use crate::output::EnvelopeError;

use super::{parse_base, CommandResult};

pub async fn run(args: &RecordsArgs, client: &AirtableClient) -> Result<CommandResult, CliError> {
    match &args.command {
        RecordsCommand::List(args) => list(args, client).await,
        RecordsCommand::Get(args) => {
            let table = open_table(&args.table, client)?;
            let mut records = Vec::new();
            let mut errors = Vec::new();

            let results = table.find_records(args.ids.as_slice()).await;
            for (id, result) in args.ids.iter().zip(results) {
                match result {
                    Ok(record) => records.push(record),
                    Err(error) => errors.push(EnvelopeError::from_call(&error, Some(id.clone()))),
                }
            }

            Ok(CommandResult::ok(json!({ "records": records })).with_errors(errors))
        }
    }
}

async fn list(args: &ListRecordsArgs, client: &AirtableClient) -> Result<CommandResult, CliError> {
    let table = open_table(&args.table, client)?;
    let query = build_query(args);

    let mut records = Vec::new();
    let mut errors = Vec::new();
    for result in table.list_records(&query).await? {
        match result {
            Ok(record) => records.push(record),
            Err(error) => errors.push(EnvelopeError::from_call(&error, None)),
        }
    }

    Ok(CommandResult::ok(json!({ "records": records })).with_errors(errors))
}

fn open_table(args: &TableArgs, client: &AirtableClient) -> Result<Table<FieldSet>, CliError> {
    let base_id = parse_base(&args.base)?;
    Ok(client.table(base_id, args.table.as_str(), RecordSchema::any_fields()))
}

fn build_query(args: &ListRecordsArgs) -> SelectQuery {
    let mut query = SelectQuery::new();
    if !args.fields.is_empty() {
        query = query.with_fields(args.fields.iter().cloned());
    }
    if let Some(view) = &args.view {
        query = query.with_view(view.as_str());
    }
    if let Some(formula) = &args.formula {
        query = query.with_formula(formula.as_str());
    }
    if let Some(max_records) = args.max_records {
        query = query.with_max_records(max_records);
    }
    if let Some(page_size) = args.page_size {
        query = query.with_page_size(page_size);
    }
    for sort in &args.sort {
        query = query.with_sort(sort.clone());
    }
    if let Some(cell_format) = args.cell_format {
        query = query.with_cell_format(cell_format.into());
    }
    if let Some(time_zone) = &args.time_zone {
        query = query.with_time_zone(time_zone.as_str());
    }
    if let Some(user_locale) = &args.user_locale {
        query = query.with_user_locale(user_locale.as_str());
    }
    if args.field_ids {
        query = query.returning_field_ids();
    }
    query
}
