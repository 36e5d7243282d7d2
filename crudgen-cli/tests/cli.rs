//! Integration tests for the crudgen binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "package": "example",
    "records": [
        {
            "name": "Foo",
            "fields": [
                { "name": "ID", "type": "uint64", "tag": "db:\"id\"" },
                { "name": "Name", "type": "string", "tag": "db:\"name\"" },
                { "name": "DeletedAt", "type": "time.Time", "tag": "db:\"deleted_at\"" }
            ]
        },
        { "name": "Status", "kind": "int" }
    ]
}"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("types.json"), MANIFEST).unwrap();
    dir
}

fn crudgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crudgen"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_generate_to_stdout() {
    let dir = workspace();
    let output = crudgen(dir.path(), &["generate", "Foo", "--manifest", "types.json"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("package example\n"));
    assert!(text.contains("`SELECT id, name FROM Foo WHERE id = $1 AND deleted_at IS NULL`"));
    assert!(text.contains("func DeleteFoo(db cruderExecer, id interface{}) error"));
}

#[test]
fn test_selected_operations_and_overrides() {
    let dir = workspace();
    let output = crudgen(
        dir.path(),
        &[
            "generate",
            "Foo",
            "--manifest",
            "types.json",
            "--fn",
            "get",
            "--fn",
            "delete",
            "--table",
            "foos",
            "--skipsuffix",
        ],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("func Get(db cruderQueryRower"));
    assert!(text.contains("func Delete(db cruderExecer"));
    assert!(!text.contains("func Create("));
    assert!(text.contains("FROM foos WHERE"));
}

#[test]
fn test_config_file_is_applied() {
    let dir = workspace();
    fs::write(
        dir.path().join("crudgen.toml"),
        "operations = [\"list\"]\npackage = \"store\"\n",
    )
    .unwrap();
    let output = crudgen(dir.path(), &["generate", "Foo", "--manifest", "types.json"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("package store\n"));
    assert!(text.contains("func ListFoo("));
    assert!(!text.contains("func GetFoo("));
}

#[test]
fn test_inline_fields() {
    let dir = workspace();
    let output = crudgen(
        dir.path(),
        &[
            "generate",
            "Bar",
            "--field",
            "ID:int64:id",
            "--field",
            "Label:string:label",
            "--pkg",
            "store",
            "--fn",
            "create",
        ],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("`INSERT INTO Bar (label) VALUES ($1) RETURNING id, label`"));
}

#[test]
fn test_output_and_check() {
    let dir = workspace();
    let args = ["generate", "Foo", "--manifest", "types.json", "--output", "gen/foo_crud.go"];

    let output = crudgen(dir.path(), &args);
    assert!(output.status.success(), "{}", stderr(&output));
    let written = fs::read_to_string(dir.path().join("gen/foo_crud.go")).unwrap();
    assert!(written.contains("func CreateFoo("));

    let mut check = args.to_vec();
    check.push("--check");
    let output = crudgen(dir.path(), &check);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    fs::write(dir.path().join("gen/foo_crud.go"), written.replace("CreateFoo", "MakeFoo")).unwrap();
    let output = crudgen(dir.path(), &check);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("+func CreateFoo("));
    let unchanged = fs::read_to_string(dir.path().join("gen/foo_crud.go")).unwrap();
    assert!(unchanged.contains("MakeFoo"));
}

#[test]
fn test_errors_exit_with_one() {
    let dir = workspace();
    for args in [
        vec!["generate", "Foo", "--manifest", "types.json", "--readfields", "ID,Age"],
        vec!["generate", "Missing", "--manifest", "types.json"],
        vec!["generate", "Status", "--manifest", "types.json"],
        vec!["generate", "Foo", "--manifest", "types.json", "--fn", "upsert"],
        vec!["generate", "Foo", "--manifest", "types.json", "--softdeletefield", "ID"],
        vec!["generate", "Foo", "--manifest", "types.json", "--writefields", "ID"],
    ] {
        let output = crudgen(dir.path(), &args);
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        assert!(stdout(&output).is_empty(), "{args:?}");
    }

    let output = crudgen(
        dir.path(),
        &["generate", "Foo", "--manifest", "types.json", "--readfields", "ID,Age"],
    );
    assert!(stderr(&output).contains("the field Age does not exist in struct Foo"));
}

#[test]
fn test_inspect() {
    let dir = workspace();
    let output = crudgen(dir.path(), &["inspect", "Foo", "--manifest", "types.json"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("[primary, read]"));
    assert!(text.contains("[soft-delete]"));
}
