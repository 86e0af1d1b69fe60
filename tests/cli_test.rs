//! Tests for CLI argument parsing and command execution

use std::fs;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use rowtree::cli::args::{Cli, Commands, ConfigCommands};
use rowtree::cli::commands::execute_command;
use rowtree::exitcode;
use rowtree::DanglingPolicy;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("rowtree").chain(args.iter().copied())).unwrap()
}

#[test]
fn given_build_flags_when_parsing_then_fields_and_links_set() {
    // Act
    let cli = parse(&[
        "-vv",
        "build",
        "rows.json",
        "-o",
        "tree.json",
        "--parent-field",
        "up",
        "--root",
        "top",
        "--on-dangling",
        "drop",
        "--compact",
    ]);

    // Assert
    assert_eq!(cli.verbose, 2);
    let Some(Commands::Build {
        input,
        output,
        fields,
        link,
        format,
    }) = cli.command
    else {
        panic!("expected build command");
    };
    assert_eq!(input.to_str(), Some("rows.json"));
    assert_eq!(output.as_deref().and_then(|p| p.to_str()), Some("tree.json"));
    assert_eq!(fields.parent_field.as_deref(), Some("up"));
    assert_eq!(link.root.as_deref(), Some("top"));
    assert_eq!(link.on_dangling, Some(DanglingPolicy::Drop));
    assert!(format.compact);
}

#[test]
fn given_root_and_no_root_when_parsing_then_conflict() {
    let result = Cli::try_parse_from(["rowtree", "build", "rows.json", "--root", "0", "--no-root"]);
    assert!(result.is_err());
}

#[test]
fn given_unknown_policy_when_parsing_then_error() {
    let result = Cli::try_parse_from(["rowtree", "stats", "rows.json", "--on-dangling", "maybe"]);
    assert!(result.is_err());
}

#[test]
fn given_global_project_dir_after_subcommand_when_parsing_then_accepted() {
    let cli = parse(&["config", "path", "-C", "/tmp/project"]);

    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Path
        })
    ));
    assert_eq!(
        cli.project_dir.as_deref().and_then(|p| p.to_str()),
        Some("/tmp/project")
    );
}

#[test]
fn given_no_command_when_executing_then_usage_exit_code() {
    let temp = TempDir::new().unwrap();
    let cli = parse(&["-C", temp.path().to_str().unwrap()]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_build_with_output_when_executing_then_file_written() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("rows.json");
    let output = temp.path().join("tree.json");
    fs::write(&input, r#"[{"id": 1, "parentId": 0}, {"id": 2, "parentId": 1}]"#).unwrap();
    let cli = parse(&[
        "-C",
        temp.path().to_str().unwrap(),
        "build",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--compact",
    ]);

    // Act
    execute_command(&cli).unwrap();

    // Assert
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "[{\"id\":1,\"parentId\":0,\"children\":[{\"id\":2,\"parentId\":1,\"children\":[]}]}]\n"
    );
}

#[test]
fn given_local_config_when_executing_build_then_config_applied() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".rowtree.toml"), "parent_field = \"up\"\n").unwrap();
    let input = temp.path().join("rows.json");
    let output = temp.path().join("tree.json");
    fs::write(&input, r#"[{"id": 1}, {"id": 2, "up": 1}]"#).unwrap();
    let cli = parse(&[
        "-C",
        temp.path().to_str().unwrap(),
        "build",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--compact",
    ]);

    execute_command(&cli).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "[{\"id\":1,\"children\":[{\"id\":2,\"up\":1,\"children\":[]}]}]\n"
    );
}

#[rstest]
#[case::cycle(r#"[{"id": 1, "parentId": 1}]"#, exitcode::DATAERR)]
#[case::dangling(r#"[{"id": 1, "parentId": 5}]"#, exitcode::DATAERR)]
#[case::bad_json("[{", exitcode::DATAERR)]
fn given_bad_document_when_executing_build_then_data_error(
    #[case] content: &str,
    #[case] expected: i32,
) {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("rows.json");
    fs::write(&input, content).unwrap();
    let cli = parse(&["-C", temp.path().to_str().unwrap(), "build", input.to_str().unwrap()]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), expected);
}

#[test]
fn given_missing_input_when_executing_then_no_input_exit_code() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("absent.json");
    let cli = parse(&["-C", temp.path().to_str().unwrap(), "stats", input.to_str().unwrap()]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_broken_local_config_when_executing_then_config_exit_code() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".rowtree.toml"), "pretty = \"very\"\n").unwrap();
    let cli = parse(&["-C", temp.path().to_str().unwrap(), "config", "show"]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
}

#[test]
fn given_clashing_fields_when_executing_then_usage_exit_code() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("rows.json");
    fs::write(&input, "[]").unwrap();
    let cli = parse(&[
        "-C",
        temp.path().to_str().unwrap(),
        "flatten",
        input.to_str().unwrap(),
        "--children-field",
        "id",
    ]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}
