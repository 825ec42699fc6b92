//! Unit tests for command dispatch.

use super::*;
use anyhow::{anyhow, ensure};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use serde_json::json;
use test_support::MockApi;

#[fixture]
fn api() -> MockApi {
    MockApi::start().expect("start mock api")
}

fn repo_dir(name: &str) -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

fn cli_for(api: &MockApi, command: Commands) -> Cli {
    Cli {
        base_url: api.base_url(),
        fixture_dir: repo_dir("data"),
        schema_dir: repo_dir("schemas"),
        command: Some(command),
        ..Cli::default()
    }
}

fn run_to_string(cli: &Cli) -> Result<String> {
    let mut out = Vec::new();
    run(cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[rstest]
fn list_prints_pretty_json(api: MockApi) -> Result<()> {
    api.insert("clients", json!({"name": "Ada"}));
    let output = run_to_string(&cli_for(&api, Commands::List { kind: Kind::Clients }))?;
    let parsed: serde_json::Value = serde_json::from_str(&output)?;
    ensure!(parsed == json!([{"name": "Ada", "id": "1"}]), "output {output}");
    ensure!(output.contains("\n  "), "output should be indented: {output}");
    Ok(())
}

#[rstest]
fn get_of_unknown_id_fails(api: MockApi) -> Result<()> {
    let cli = cli_for(
        &api,
        Commands::Get {
            kind: Kind::Resources,
            id: "9".to_owned(),
        },
    );
    let Err(err) = run_to_string(&cli) else {
        return Err(anyhow!("missing record should fail"));
    };
    ensure!(err.to_string().contains("404"), "error {err}");
    Ok(())
}

#[rstest]
#[case(false, 3, "3 resources")]
#[case(true, 2, "2 active resources")]
fn seed_reports_the_final_count(
    api: MockApi,
    #[case] active: bool,
    #[case] at_least: usize,
    #[case] expected: &str,
) -> Result<()> {
    let cli = cli_for(
        &api,
        Commands::Seed(SeedArgs {
            kind: Kind::Resources,
            at_least,
            active,
        }),
    );
    let output = run_to_string(&cli)?;
    ensure!(output.trim() == expected, "output {output}");
    Ok(())
}

#[rstest]
fn active_filter_is_rejected_for_clients(api: MockApi) {
    let cli = cli_for(
        &api,
        Commands::Seed(SeedArgs {
            kind: Kind::Clients,
            at_least: 1,
            active: true,
        }),
    );
    let err = run_to_string(&cli).expect_err("clients have no activity flag");
    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::ActiveFilter)
    ));
    assert!(api.requests().is_empty());
}

#[rstest]
fn purge_reports_deleted_count(api: MockApi) -> Result<()> {
    api.insert("clients", json!({"name": "A"}));
    api.insert("clients", json!({"name": "B"}));
    let output = run_to_string(&cli_for(&api, Commands::Purge { kind: Kind::Clients }))?;
    ensure!(output.trim() == "deleted 2 clients", "output {output}");
    ensure!(api.records("clients").is_empty());
    Ok(())
}

#[rstest]
fn validate_lists_violations_and_fails(api: MockApi) -> Result<()> {
    api.insert("resources", json!({"name": "Desk"}));
    let cli = cli_for(
        &api,
        Commands::Validate(ValidateArgs {
            kind: Kind::Resources,
            id: None,
            schema: None,
        }),
    );
    let mut out = Vec::new();
    let Err(err) = run(&cli, &mut out) else {
        return Err(anyhow!("resource without an active flag should fail validation"));
    };
    let printed = String::from_utf8(out)?;
    ensure!(printed.contains("active"), "violations printed: {printed}");
    ensure!(
        matches!(
            err.downcast_ref::<RunnerError>(),
            Some(RunnerError::SchemaViolations { count: 1, .. })
        ),
        "error {err:?}"
    );
    Ok(())
}

#[rstest]
fn validate_single_record_uses_item_schema(api: MockApi) -> Result<()> {
    let id = api.insert("clients", json!({"name": "Ada"}));
    let cli = cli_for(
        &api,
        Commands::Validate(ValidateArgs {
            kind: Kind::Clients,
            id: Some(id),
            schema: None,
        }),
    );
    let output = run_to_string(&cli)?;
    ensure!(output.trim() == "valid against clientSchema.json", "output {output}");
    Ok(())
}

#[rstest]
fn missing_command_is_reported() {
    let mut out = Vec::new();
    let err = run(&Cli::default(), &mut out).expect_err("no command");
    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::MissingCommand)
    ));
}
