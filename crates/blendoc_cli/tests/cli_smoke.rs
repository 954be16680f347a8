#![allow(missing_docs)]

use std::path::PathBuf;
use std::process::Command;

use blendoc_testkit::Test1Fixture;
use serde_json::Value;

fn write_fixture(name: &str) -> PathBuf {
	let mut path = std::env::temp_dir();
	path.push(format!("blendoc_cli_smoke_{name}_{}.blend", std::process::id()));
	std::fs::write(&path, Test1Fixture::build()).expect("fixture writes to disk");
	path
}

fn run_json(args: &[&str]) -> Value {
	let output = Command::new(env!("CARGO_BIN_EXE_blendoc")).args(args).output().expect("command executes");
	assert!(output.status.success(), "command should succeed, stderr: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

#[test]
fn info_json_reports_header_fields() {
	let path = write_fixture("info");
	let json = run_json(&["info", path.to_str().unwrap(), "--json"]);
	assert_eq!(json["pointer_width"], 8);
	assert_eq!(json["endian"], "little");
	assert_eq!(json["version"], "2.77");
	let _ = std::fs::remove_file(path);
}

#[test]
fn structures_json_lists_registered_struct_names() {
	let path = write_fixture("structures");
	let json = run_json(&["structures", path.to_str().unwrap(), "--json"]);
	let names: Vec<String> = serde_json::from_value(json).expect("array of names");
	assert!(names.iter().any(|name| name == "World"));
	let _ = std::fs::remove_file(path);
}

#[test]
fn find_json_resolves_a_named_record() {
	let path = write_fixture("find");
	let json = run_json(&["find", path.to_str().unwrap(), "World", "TestWorld", "--json"]);
	assert_eq!(json["type"], "World");
	assert!(json["fields"]["aodist"].is_number());
	let _ = std::fs::remove_file(path);
}

#[test]
fn find_on_unnameable_type_fails_with_nonzero_exit() {
	let path = write_fixture("unnameable");
	let output = Command::new(env!("CARGO_BIN_EXE_blendoc")).args(["find", path.to_str().unwrap(), "rctf", "x"]).output().expect("command executes");
	assert!(!output.status.success(), "expected a nonzero exit for an unnameable type");
	let _ = std::fs::remove_file(path);
}

#[test]
fn tree_renders_recursive_field_layout() {
	let path = write_fixture("tree");
	let output = Command::new(env!("CARGO_BIN_EXE_blendoc")).args(["tree", path.to_str().unwrap(), "World", "--recursive"]).output().expect("command executes");
	assert!(output.status.success());
	let rendered = String::from_utf8_lossy(&output.stdout);
	assert!(rendered.contains("aodist: float"));
	assert!(rendered.contains("id: ID"));
	let _ = std::fs::remove_file(path);
}
