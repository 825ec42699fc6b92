//! Command execution and dispatch.
//!
//! Keeps `main` minimal: [`run`] maps each [`Commands`] variant onto the
//! request clients and writes human-readable results to the supplied
//! writer.

mod error;

pub use error::RunnerError;

use crate::cli::{Cli, Commands, Kind, SeedArgs, ValidateArgs};
use crate::constants::STATUS_OK;
use crate::model::{Client, Entity, Resource};
use crate::request::{EntityRequest, RequestConfig, expect_status};
use crate::seed;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

/// Execute the command carried by `cli`, writing output to `out`.
///
/// # Errors
///
/// Returns an error when the configuration is invalid, a request fails, a
/// status is unexpected, or a validated body violates its schema.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let command = cli.command.as_ref().ok_or(RunnerError::MissingCommand)?;
    let config = cli.request_config()?;
    debug!(base_url = %config.base_url(), ?command, "running command");
    match command {
        Commands::List { kind } => with_kind(*kind, &config, |ctx| ctx.list(out)),
        Commands::Get { kind, id } => with_kind(*kind, &config, |ctx| ctx.get(id, out)),
        Commands::Seed(args) => seed_command(args, &config, out),
        Commands::Purge { kind } => with_kind(*kind, &config, |ctx| ctx.purge(out)),
        Commands::Validate(args) => with_kind(args.kind, &config, |ctx| ctx.validate(args, out)),
    }
}

/// Type-erased access to the commands shared by every collection.
trait CollectionCommands {
    fn list(&self, out: &mut dyn Write) -> Result<()>;
    fn get(&self, id: &str, out: &mut dyn Write) -> Result<()>;
    fn purge(&self, out: &mut dyn Write) -> Result<()>;
    fn validate(&self, args: &ValidateArgs, out: &mut dyn Write) -> Result<()>;
}

impl<E: Entity> CollectionCommands for EntityRequest<E> {
    fn list(&self, out: &mut dyn Write) -> Result<()> {
        let response = self.list()?;
        expect_status(&response, STATUS_OK)?;
        writeln!(out, "{}", response.pretty()).context("write listing")
    }

    fn get(&self, id: &str, out: &mut dyn Write) -> Result<()> {
        let response = self.get_by_id(id)?;
        expect_status(&response, STATUS_OK)?;
        writeln!(out, "{}", response.pretty()).context("write record")
    }

    fn purge(&self, out: &mut dyn Write) -> Result<()> {
        let deleted = seed::purge(self)?;
        writeln!(out, "deleted {deleted} {}", E::COLLECTION).context("write purge summary")
    }

    fn validate(&self, args: &ValidateArgs, out: &mut dyn Write) -> Result<()> {
        let response = match &args.id {
            Some(id) => self.get_by_id(id)?,
            None => EntityRequest::list(self)?,
        };
        expect_status(&response, STATUS_OK)?;
        let schema = args.schema_name();
        let report = self.check_schema(&response, schema)?;
        if report.is_valid() {
            info!(schema, "body is valid");
            return writeln!(out, "valid against {schema}").context("write validation result");
        }
        for violation in &report.violations {
            writeln!(out, "{violation}").context("write violation")?;
        }
        Err(RunnerError::SchemaViolations {
            schema: schema.to_owned(),
            count: report.violations.len(),
        }
        .into())
    }
}

fn with_kind<F>(kind: Kind, config: &RequestConfig, action: F) -> Result<()>
where
    F: FnOnce(&dyn CollectionCommands) -> Result<()>,
{
    match kind {
        Kind::Clients => action(&EntityRequest::<Client>::new(config)),
        Kind::Resources => action(&EntityRequest::<Resource>::new(config)),
    }
}

fn seed_command(args: &SeedArgs, config: &RequestConfig, out: &mut impl Write) -> Result<()> {
    let count = match (args.kind, args.active) {
        (Kind::Clients, true) => return Err(RunnerError::ActiveFilter.into()),
        (Kind::Clients, false) => {
            seed::ensure_at_least(&EntityRequest::<Client>::new(config), args.at_least, |_| true)?
        }
        (Kind::Resources, active) => seed::ensure_at_least(
            &EntityRequest::<Resource>::new(config),
            args.at_least,
            |resource: &Resource| !active || resource.is_active(),
        )?,
    };
    let label = if args.active { "active " } else { "" };
    writeln!(out, "{count} {label}{}", kind_name(args.kind)).context("write seed summary")
}

const fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Clients => Client::COLLECTION,
        Kind::Resources => Resource::COLLECTION,
    }
}

#[cfg(test)]
mod tests;
