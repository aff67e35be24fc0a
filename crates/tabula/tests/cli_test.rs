//! Tests for the CLI argument parsing and command handlers.

use clap::Parser;
use serde_json::{Value, json};
use tabula::cli::{Cli, Commands, handle_list_command, handle_show_command};
use tabula::{Dialect, ScriptedExecutor, TableConfig};

fn members() -> ScriptedExecutor {
    ScriptedExecutor::new()
        .with_columns(&[("id", None, "integer"), ("name", Some("Name"), "text")])
        .on("COUNT(*)", ScriptedExecutor::rows(json!([{"cnt": 3}])))
        .on(
            "WHERE id = $1",
            ScriptedExecutor::rows(json!([{"id": 2, "name": "Lee"}])),
        )
        .on(
            "SELECT * FROM member",
            ScriptedExecutor::rows(json!([
                {"id": 1, "name": "Kim"},
                {"id": 2, "name": "Lee"},
                {"id": 3, "name": "Park"}
            ])),
        )
}

fn postgres() -> TableConfig {
    TableConfig::default().with_dialect(Dialect::Postgres)
}

#[test]
fn test_parse_list_arguments() {
    let cli = Cli::try_parse_from([
        "tabula",
        "list",
        "member",
        "--query",
        "sst=name&page=2",
        "--pretty",
    ])
    .unwrap();
    assert!(cli.pretty);
    match cli.command {
        Commands::List {
            table,
            query,
            base_url,
        } => {
            assert_eq!(table, "member");
            assert_eq!(query, "sst=name&page=2");
            assert!(base_url.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_show_arguments() {
    let cli = Cli::try_parse_from(["tabula", "show", "member", "7"]).unwrap();
    assert!(matches!(cli.command, Commands::Show { ref id, .. } if id == "7"));
}

#[test]
fn test_list_command_prints_page() {
    let output = handle_list_command(
        &postgres(),
        members(),
        "member",
        "sst=name&sod=desc",
        None,
        false,
    )
    .unwrap();
    let page: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(page["heading"], "Member");
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["rows"].as_array().unwrap().len(), 3);
    assert!(page["pagination"].as_str().unwrap().contains("/member?"));
}

#[test]
fn test_list_command_custom_base_url() {
    let output = handle_list_command(
        &postgres(),
        members(),
        "member",
        "",
        Some("/admin/member"),
        false,
    )
    .unwrap();
    let page: Value = serde_json::from_str(&output).unwrap();
    assert!(
        page["column_links"][0]["anchor"]
            .as_str()
            .unwrap()
            .contains("href=\"/admin/member?")
    );
}

#[test]
fn test_list_command_rejects_unsafe_table() {
    let err = handle_list_command(
        &postgres(),
        members(),
        "member; DROP TABLE member",
        "",
        None,
        false,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid identifier"));
}

#[test]
fn test_list_command_rejects_schema_qualified_table() {
    let err = handle_list_command(&postgres(), members(), "shop.member", "", None, false)
        .unwrap_err();
    assert!(err.to_string().contains("Invalid identifier 'shop.member'"));
}

#[test]
fn test_show_command_rejects_schema_qualified_table() {
    let err = handle_show_command(&postgres(), members(), "shop.member", "2", "", false)
        .unwrap_err();
    assert!(err.to_string().contains("Invalid identifier"));
}

#[test]
fn test_show_command_prints_row() {
    let output = handle_show_command(&postgres(), members(), "member", "2", "", true).unwrap();
    let page: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(page["row"]["name"], "Lee");
    assert_eq!(page["columns"][1]["label"], "Name");
}

#[test]
fn test_show_command_unknown_table() {
    let err = handle_show_command(
        &postgres(),
        ScriptedExecutor::new(),
        "ghost",
        "1",
        "",
        false,
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
