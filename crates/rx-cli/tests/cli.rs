//! Integration tests for the rx-export binary

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODULES: &str = r#"{
    "subjectTypes": [
        {"uuid": "st-person", "name": "Patient", "type": "Person"},
        {"uuid": "st-household", "name": "Household", "type": "Household", "group": true}
    ],
    "programs": [{"uuid": "pr-tb", "name": "TB"}],
    "encounterTypes": [
        {"uuid": "et-visit", "name": "Monthly Visit"},
        {"uuid": "et-survey", "name": "Survey"}
    ],
    "formMappings": [
        {"subjectTypeUUID": "st-person", "programUUID": "pr-tb", "formType": "ProgramEnrolment"},
        {"subjectTypeUUID": "st-person", "programUUID": "pr-tb", "encounterTypeUUID": "et-visit", "formType": "ProgramEncounter"},
        {"subjectTypeUUID": "st-household", "encounterTypeUUID": "et-survey", "formType": "Encounter"}
    ]
}"#;

/// Working directory with a config file and a modules snapshot
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(base_url: &str) -> Self {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            format!(
                "[server]\nbase_url = \"{}\"\nauth_token = \"secret\"\n\n[export]\nrefresh_delay_ms = 10\n\n[output]\ncolor = false\n",
                base_url
            ),
        )
        .unwrap();
        fs::write(dir.path().join("modules.json"), MODULES).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("rx-export").unwrap();
        cmd.current_dir(self.path())
            .env_remove("RX_AUTH_TOKEN")
            .env_remove("RX_SERVER_URL")
            .arg("--config")
            .arg(self.config());
        cmd
    }
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("rx-export")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("modules"));
}

#[test]
fn test_dry_run_prints_request_body() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    let output = fixture
        .cmd()
        .args([
            "export",
            "--modules",
            "modules.json",
            "--report-type",
            "encounter",
            "--subject-type",
            "Patient",
            "--program",
            "TB",
            "--encounter-type",
            "monthly visit",
            "--start-date",
            "2024-01-01",
            "--address-level",
            "A1",
            "--dry-run",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "reportType": "Encounter",
            "subjectType": "st-person",
            "program": "pr-tb",
            "encounterType": "et-visit",
            "startDate": "2024-01-01T00:00:00.000Z",
            "addressLevelIds": ["A1"],
            "includeVoided": false
        })
    );
}

#[test]
fn test_dry_run_drops_program_for_registration() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    fixture
        .cmd()
        .args([
            "export",
            "--modules",
            "modules.json",
            "-t",
            "registration",
            "-s",
            "Patient",
            "-p",
            "TB",
            "--include-voided",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"includeVoided\": true"))
        .stdout(predicate::str::contains("\"program\"").not());
}

#[test]
fn test_incomplete_request_is_not_sent() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    fixture
        .cmd()
        .args(["export", "--modules", "modules.json", "-t", "enrolment", "-s", "Patient"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Select a program"))
        .stderr(predicate::str::contains("incomplete"));
}

#[test]
fn test_invalid_date_reported_in_dry_run() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    fixture
        .cmd()
        .args([
            "export",
            "--modules",
            "modules.json",
            "-t",
            "registration",
            "-s",
            "Patient",
            "--start-date",
            "someday",
            "--dry-run",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Start date is invalid"))
        .stdout(predicate::str::contains("startDate").not());
}

#[test]
fn test_modules_show_from_file() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    fixture
        .cmd()
        .args(["modules", "show", "--file", "modules.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient"))
        .stdout(predicate::str::contains("Monthly Visit"));
}

#[test]
fn test_modules_validate_rejects_unknown_reference() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    fs::write(
        fixture.path().join("broken.json"),
        r#"{
            "subjectTypes": [{"uuid": "st-person", "name": "Patient", "type": "Person"}],
            "programs": [],
            "encounterTypes": [],
            "formMappings": [
                {"subjectTypeUUID": "st-person", "programUUID": "missing", "formType": "ProgramEnrolment"}
            ]
        }"#,
    )
    .unwrap();
    fixture
        .cmd()
        .args(["modules", "validate", "--file", "broken.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_config_path_prints_explicit_file() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    fixture
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_bad_config_is_rejected() {
    let fixture = Fixture::new("ftp://example.org");
    fixture
        .cmd()
        .args(["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_then_refresh_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "admin@demo",
            "privileges": [{"privilegeType": "Analytics"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/export/report"))
        .and(header("AUTH-TOKEN", "secret"))
        .and(body_json(serde_json::json!({
            "reportType": "Registration",
            "subjectType": "st-person",
            "includeVoided": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/export/status"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{
                "uuid": "0b7e4f56-12c3-4d7e-9a4b-3f2d1c0e9a88",
                "status": "STARTED",
                "reportType": "Registration",
                "subjectTypeUUID": "st-person"
            }],
            "totalElements": 1,
            "totalPages": 1,
            "number": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri());
    let mut cmd = fixture.cmd();
    cmd.args([
        "export",
        "--modules",
        "modules.json",
        "-t",
        "registration",
        "-s",
        "Patient",
    ]);
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output
        .assert()
        .success()
        .stdout(predicate::str::contains("STARTED"))
        .stdout(predicate::str::contains("Patient"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "admin@demo",
            "privileges": [{"privilegeType": "Analytics"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/export/report"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Subject type is mandatory"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/export/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fixture = Fixture::new(&server.uri());
    let mut cmd = fixture.cmd();
    cmd.args([
        "export",
        "--modules",
        "modules.json",
        "-t",
        "registration",
        "-s",
        "Patient",
    ]);
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Subject type is mandatory"));
}

#[test]
fn test_doctor_prints_results_under_their_section() {
    let fixture = Fixture::new("http://127.0.0.1:9");
    let output = fixture.cmd().args(["doctor"]).output().unwrap();
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let position = |needle: &str| {
        stdout
            .find(needle)
            .unwrap_or_else(|| panic!("'{}' missing from:\n{}", needle, stdout))
    };
    assert!(position("1. Configuration") < position("Auth token"));
    assert!(position("Auth token") < position("2. Server"));
    assert!(position("2. Server") < position("Server:"));
}
