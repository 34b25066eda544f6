mod bases;
mod enums;
mod records;
mod schema;
mod webhooks;

use std::time::Instant;

use serde_json::Value;
use tabula_core::{AirtableClient, BaseId, ClientConfig, ConfigError};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Envelope, EnvelopeError, EnvelopeMeta};

pub struct CommandResult {
    pub data: Value,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let client = AirtableClient::new(client_config(cli)?);
    let started = Instant::now();

    let CommandResult { data, errors } = match &cli.command {
        Command::Bases(args) => bases::run(args, &client).await?,
        Command::Schema(args) => schema::run(args, &client).await?,
        Command::Enums(args) => enums::run(args, &client).await?,
        Command::Records(args) => records::run(args, &client).await?,
        Command::Webhooks(args) => webhooks::run(args, &client).await?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(Envelope {
        meta: EnvelopeMeta::new(latency_ms),
        data,
        errors,
    })
}

fn client_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let api_key = cli
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    Ok(ClientConfig::new(api_key)
        .with_api_url(cli.api_url.as_str())
        .with_timeout_ms(cli.timeout_ms))
}

fn parse_base(raw: &str) -> Result<BaseId, CliError> {
    BaseId::parse(raw).map_err(CliError::from)
}
