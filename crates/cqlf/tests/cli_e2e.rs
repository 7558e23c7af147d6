//! End-to-end tests running the cqlf binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

const CONFIG: &str = r#"
[output]
color = false

[[schema]]
name = "name"
type = "text"

[[schema]]
name = "size"
type = "integer"

[[schema]]
name = "address.city"
type = "text"

[[schema]]
name = "owner"
type = "text"
resolvable = true
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), CONFIG).unwrap();
        fs::write(
            dir.path().join("records.json"),
            json!([
                {"name": "alpha", "size": 1, "address": {"city": "Oulu", "zip": "90100"}},
                {"name": "beta", "size": 7, "address": {"city": "Turku", "zip": "20100"}},
                {"name": "gamma", "address": {"city": "Oulu", "zip": "90500"}},
            ])
            .to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("groups.json"),
            json!({
                "north": [{"size": 1}, {"size": 2}],
                "south": [{"size": 9}],
            })
            .to_string(),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        run_with_config(&self.path("config.toml"), args)
    }
}

fn run_with_config(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cqlf"))
        .arg("--schema")
        .arg(config)
        .arg("--no-color")
        .args(args)
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn stderr_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stderr).unwrap()
}

#[test]
fn test_parse_json() {
    let fixture = Fixture::new();
    let output = fixture.run(&["--json", "parse", "size>3 AND name='a'"]);

    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["normalized"], "name='a' AND size>3");
    assert_eq!(value["filters"][0]["pattern"], "EQUAL");
    assert_eq!(value["filters"][1]["pattern"], "GT");
}

#[test]
fn test_parse_table() {
    let fixture = Fixture::new();
    let output = fixture.run(&["parse", "name IS NOT NULL"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Operator"));
    assert!(stdout.contains("NOT_NULL"));
}

#[test]
fn test_parse_error_exit_code() {
    let fixture = Fixture::new();
    let output = fixture.run(&["--json", "parse", "size=1 OR name=2"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr_json(&output)["error"]["code"], "ILLEGAL_FILTER");
}

#[test]
fn test_filter_records() {
    let fixture = Fixture::new();
    let input = fixture.path("records.json");
    let output = fixture.run(&[
        "--json",
        "filter",
        "address.city='Oulu'",
        "--input",
        input.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let names: Vec<Value> = stdout_json(&output)
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("alpha"), json!("gamma")]);
}

#[test]
fn test_filter_with_fields() {
    let fixture = Fixture::new();
    let input = fixture.path("records.json");
    let output = fixture.run(&[
        "--json",
        "filter",
        "size BETWEEN 5 AND 10",
        "--input",
        input.to_str().unwrap(),
        "--fields",
        "name,address,-address.zip",
    ]);

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([{"name": "beta", "address": {"city": "Turku"}}])
    );
}

#[test]
fn test_filter_table_counts() {
    let fixture = Fixture::new();
    let input = fixture.path("records.json");
    let output = fixture.run(&["filter", "size IS NULL", "-i", input.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"gamma\""));
    assert!(stdout.ends_with("1 matching record\n"));
}

#[test]
fn test_filter_grouped() {
    let fixture = Fixture::new();
    let input = fixture.path("groups.json");
    let output = fixture.run(&[
        "--json",
        "filter",
        "size=2",
        "--grouped",
        "--input",
        input.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"north": [{"size": 1}, {"size": 2}]})
    );
}

#[test]
fn test_filter_wrong_input_shape() {
    let fixture = Fixture::new();
    let input = fixture.path("groups.json");
    let output = fixture.run(&["--json", "filter", "size=2", "-i", input.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stderr_json(&output)["error"]["code"], "INPUT_ERROR");
}

#[test]
fn test_filter_unknown_property() {
    let fixture = Fixture::new();
    let input = fixture.path("records.json");
    let output = fixture.run(&["--json", "filter", "colour='red'", "-i", input.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr_json(&output)["error"]["code"],
        "FILTER_PROPERTY_NOT_FOUND"
    );
}

#[test]
fn test_filter_conversion_error() {
    let fixture = Fixture::new();
    let input = fixture.path("records.json");
    let output = fixture.run(&["--json", "filter", "size=true", "-i", input.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr_json(&output)["error"]["code"], "CONVERSION_ERROR");
}

#[test]
fn test_constraints() {
    let fixture = Fixture::new();
    let output = fixture.run(&["--json", "constraints", "size IN (1,2) AND owner='x'"]);

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({
            "EQUAL": [{"property": "owner", "values": ["x"]}],
            "IN": [{"property": "size", "values": [1, 2]}],
        })
    );
}

#[test]
fn test_missing_schema_is_config_error() {
    let dir = TempDir::new().unwrap();
    let output = run_with_config(&dir.path().join("none.toml"), &["constraints", "a=1"]);

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("cqlf config init"));
}

#[test]
fn test_config_init_then_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("cqlf").join("config.toml");

    let output = run_with_config(&config, &["config", "init"]);
    assert!(output.status.success());
    assert!(config.exists());

    let output = run_with_config(&config, &["--json", "config", "path"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["exists"], true);

    let output = run_with_config(&config, &["config", "init"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_completions() {
    let fixture = Fixture::new();
    let output = fixture.run(&["completions", "bash"]);

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("cqlf"));
}
