//! CLI integration tests for the rpc-resource-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("rpc-resource-schema"))
}

// Helper to create a temp catalogue or config file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const CATALOGUE: &str = r#"{
    "methods": {
        "vm.create": {
            "accepts": [{
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "vcpus": { "type": "integer" },
                    "memory": { "type": "integer" }
                }
            }]
        },
        "vm.update": {
            "accepts": [
                { "type": "integer" },
                { "type": "object", "properties": { "memory": { "type": "integer" } } }
            ]
        },
        "vm.delete": { "accepts": [{ "type": "integer" }] },
        "vm.start": { "accepts": [{ "type": "integer", "_name_": "id" }] },
        "share.create": {
            "accepts": [{ "type": "object", "properties": { "path": { "type": "string" } } }]
        },
        "nvmet.port.create": { "accepts": [{ "type": "object", "properties": {} }] },
        "system.info": { "accepts": [] }
    },
    "_metadata": { "truenas_version": "25.04.0", "method_count": 7 }
}"#;

mod generate_command {
    use super::*;

    #[test]
    fn generate_to_stdout() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args(["generate", catalogue.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""method_base":"vm""#))
            .stdout(predicate::str::contains(r#""version":"25.04.0""#))
            .stdout(predicate::str::contains(r#""mutability":"create_only""#));
    }

    #[test]
    fn generate_with_pretty() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args(["generate", catalogue.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn generate_with_output_file() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);
        let output = dir.path().join("plan.json");

        cmd()
            .args([
                "generate",
                catalogue.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let names: Vec<&str> = written["resources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["vm", "share"]);
    }

    #[test]
    fn discovers_newest_catalogue_in_dir() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "truenas-methods-24.10.0.json",
            r#"{"methods": {"old.create": {"accepts": [{"type": "object", "properties": {"a": {}}}]}}}"#,
        );
        write_temp_file(&dir, "truenas-methods-25.04.0.json", CATALOGUE);

        cmd()
            .args(["generate", "--dir", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stderr(predicate::str::contains("truenas-methods-25.04.0.json"))
            .stdout(predicate::str::contains(r#""method_base":"vm""#))
            .stdout(predicate::str::contains(r#""method_base":"old""#).not());
    }

    #[test]
    fn skip_resource_flag() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args([
                "generate",
                catalogue.to_str().unwrap(),
                "--skip-resource",
                "share",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"share","reason":"excluded""#));
    }

    #[test]
    fn config_file_applied() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);
        let config = write_temp_file(
            &dir,
            "config.json",
            r#"{"start_suppressed": ["vm"], "stop_wait_secs": 5}"#,
        );

        cmd()
            .args([
                "generate",
                catalogue.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("start_on_create").not());
    }
}

mod coverage_command {
    use super::*;

    #[test]
    fn lists_unconsumed_methods() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args(["coverage", catalogue.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Not generating the following API methods:\nnvmet.port.create\nsystem.info\n",
            ))
            .stdout(predicate::str::contains("vm.create").not());
    }

    #[test]
    fn skipped_section() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args(["coverage", catalogue.to_str().unwrap(), "--skipped"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipped:"))
            .stdout(predicate::str::contains("nvmet.port (empty_properties)"));
    }
}

mod inspect_command {
    use super::*;

    #[test]
    fn inspect_by_method_base() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args(["inspect", "vm", catalogue.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""id_wire_type":"integer""#))
            .stdout(predicate::str::contains(r#""update_fields":["memory"]"#));
    }

    #[test]
    fn inspect_unknown_resource() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);

        cmd()
            .args(["inspect", "nvmet.port", catalogue.to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no resource named nvmet.port"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["generate", "/nonexistent/methods.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn no_catalogue_in_dir() {
        let dir = TempDir::new().unwrap();

        cmd()
            .args(["generate", "--dir", dir.path().to_str().unwrap()])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("no catalogue matching truenas-methods-*.json"));
    }

    #[test]
    fn invalid_json_catalogue() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "bad.json", r#"{ not valid json"#);

        cmd()
            .args(["generate", catalogue.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn malformed_envelope() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "bad.json", r#"{"methods": {"vm.create": 1}}"#);

        cmd()
            .args(["generate", catalogue.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid catalogue"));
    }

    #[test]
    fn unknown_config_key() {
        let dir = TempDir::new().unwrap();
        let catalogue = write_temp_file(&dir, "methods.json", CATALOGUE);
        let config = write_temp_file(&dir, "config.json", r#"{"skip_everything": true}"#);

        cmd()
            .args([
                "generate",
                catalogue.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid config"));
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Infer resource descriptors from a remote API method catalogue",
            ));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("rpc-resource-schema"));
    }

    #[test]
    fn generate_help() {
        cmd()
            .args(["generate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--dir"))
            .stdout(predicate::str::contains("--skip-resource"))
            .stdout(predicate::str::contains("--output"));
    }
}

mod remote {
    use super::*;

    #[test]
    fn generate_from_url() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/methods.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOGUE)
            .create();

        cmd()
            .args(["generate", &format!("{}/methods.json", server.url())])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""method_base":"vm""#));
    }

    #[test]
    fn url_404() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing.json").with_status(404).create();

        cmd()
            .args(["generate", &format!("{}/missing.json", server.url())])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("failed to fetch"));
    }
}
