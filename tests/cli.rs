//! CLI argument parsing and command execution

use clap::Parser;
use frontdoor::cli::{run, Cli, Commands};
use frontdoor::{FrontdoorError, Settings};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn declaration_file(dir: &TempDir, protocol: &str) -> PathBuf {
    let path = dir.path().join("frontend.yaml");
    fs::write(
        &path,
        format!(
            "region: us-east-1\nvpc_id: vpc-0abc\nallow_list:\n  ipv4: [\"10.0.0.0/16\"]\nexposure:\n  protocol: {}\n",
            protocol
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_parse_plan_command() {
    let cli = Cli::try_parse_from(["frontdoor", "plan", "-f", "frontend.yaml", "-o", "yaml"])
        .unwrap();

    assert_eq!(cli.output.as_deref(), Some("yaml"));
    match cli.command {
        Commands::Plan { file } => assert_eq!(file, PathBuf::from("frontend.yaml")),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_apply_with_dry_run() {
    let cli =
        Cli::try_parse_from(["frontdoor", "-v", "apply", "--file", "f.yaml", "--dry-run"]).unwrap();

    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Apply { dry_run: true, .. }));
}

#[test]
fn test_file_argument_is_required() {
    assert!(Cli::try_parse_from(["frontdoor", "validate"]).is_err());
}

#[test]
fn test_run_plan_and_validate() {
    let dir = TempDir::new().unwrap();
    let file = declaration_file(&dir, "http");
    let settings = Settings::default();

    let path = file.to_str().unwrap();
    run(Cli::try_parse_from(["frontdoor", "plan", "-f", path]).unwrap(), &settings).unwrap();
    run(Cli::try_parse_from(["frontdoor", "validate", "-f", path]).unwrap(), &settings).unwrap();
    run(
        Cli::try_parse_from(["frontdoor", "apply", "-f", path, "--dry-run", "-o", "yaml"])
            .unwrap(),
        &settings,
    )
    .unwrap();
}

#[test]
fn test_apply_without_dry_run_is_refused() {
    let dir = TempDir::new().unwrap();
    let file = declaration_file(&dir, "http");

    let cli = Cli::try_parse_from(["frontdoor", "apply", "-f", file.to_str().unwrap()]).unwrap();
    let err = run(cli, &Settings::default()).unwrap_err();
    assert!(err.to_string().contains("--dry-run"));
}

#[test]
fn test_https_without_certificate_exit_code() {
    let dir = TempDir::new().unwrap();
    let file = declaration_file(&dir, "https");

    let cli = Cli::try_parse_from(["frontdoor", "plan", "-f", file.to_str().unwrap()]).unwrap();
    let err = run(cli, &Settings::default()).unwrap_err();

    let frontdoor_error = err.downcast_ref::<FrontdoorError>().unwrap();
    assert!(matches!(frontdoor_error, FrontdoorError::Configuration { .. }));
    assert_eq!(frontdoor_error.exit_code(), 2);
}
