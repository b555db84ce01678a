//! End-to-end runs over the fixture documents

use oasup_cli::{Error, Pipeline};
use oasup_core::RunConfig;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

async fn run(config: RunConfig) -> (oasup_cli::Result<Value>, String, String) {
    let pipeline = Pipeline::with_defaults(&config, false).unwrap();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = pipeline.run(&config, &mut stdout, &mut stderr).await;
    (
        result,
        String::from_utf8(stdout).unwrap(),
        String::from_utf8(stderr).unwrap(),
    )
}

fn cli_config(source: &str) -> oasup_core::RunConfigBuilder {
    RunConfig::builder(source).resolve(true).patch(true)
}

#[tokio::test]
async fn test_json_petstore_converts_to_indented_json() {
    let config = cli_config(&fixture("petstore-swagger2.yaml")).build();
    let (result, stdout, stderr) = run(config).await;

    let document = result.unwrap();
    assert_eq!(document["openapi"], "3.0.0");
    assert!(stdout.starts_with("{\n  \"openapi\": \"3."));
    assert!(stderr.is_empty());

    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed, document);
    assert!(parsed["components"]["schemas"]["Pet"].is_object());
}

#[tokio::test]
async fn test_block_yaml_petstore_stays_yaml() {
    let config = cli_config(&fixture("petstore-swagger2-yaml.yaml")).build();
    let (result, stdout, _) = run(config).await;

    assert!(result.is_ok());
    assert!(stdout.starts_with("openapi:"));
    let parsed: Value = serde_yaml::from_str(&stdout).unwrap();
    assert_eq!(parsed["info"]["title"], "Swagger Petstore");
}

#[tokio::test]
async fn test_broken_document_reports_one_concise_warning() {
    let (result, stdout, stderr) = run(cli_config(&fixture("broken.json")).build()).await;

    assert!(matches!(result, Err(Error::Validation { warnings: 1, .. })));
    assert!(stdout.is_empty());

    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 2, "stderr was: {stderr}");
    assert_eq!(lines[0], "Failed OpenAPI3 schema validation");
    assert!(lines[1].ends_with(" /paths/~1pets/get/responses/200"));
}

#[tokio::test]
async fn test_bae_renders_detailed_block_for_the_same_warning() {
    let config = cli_config(&fixture("broken.json")).detailed_diagnostics(true).build();
    let (result, stdout, stderr) = run(config).await;

    assert!(matches!(result, Err(Error::Validation { warnings: 1, .. })));
    assert!(stdout.is_empty());
    assert!(stderr.starts_with("Failed OpenAPI3 schema validation\n"));
    assert!(stderr.lines().count() > 3);
    assert!(stderr.contains("ONEOF "));
    assert!(stderr.contains("\"description\": 42"));
    assert!(stderr.contains("^"));
}

#[tokio::test]
async fn test_trace_is_printed_above_default_verbosity() {
    let config = cli_config(&fixture("broken.json")).verbose(2).build();
    let (_, _, stderr) = run(config).await;
    assert!(stderr.contains("ValidationError: Failed OpenAPI3 schema validation"));
}

#[tokio::test]
async fn test_output_converts_again_without_warnings() {
    let (first, stdout, _) = run(cli_config(&fixture("petstore-swagger2.yaml")).build()).await;
    let first = first.unwrap();

    let dir = TempDir::new().unwrap();
    let converted = dir.path().join("openapi.json");
    std::fs::write(&converted, &stdout).unwrap();

    let (second, again, stderr) = run(cli_config(&converted.to_string_lossy()).build()).await;
    assert_eq!(second.unwrap(), first);
    assert_eq!(again, stdout);
    assert!(stderr.is_empty());
}

#[tokio::test]
async fn test_missing_file_aborts_with_load_error() {
    let (result, stdout, stderr) = run(cli_config("does/not/exist.json").build()).await;
    match result.unwrap_err() {
        Error::Core(err) => assert!(err.is_load_error()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
}

/// Write an edited copy of the JSON petstore fixture into `dir`
fn edited_petstore(dir: &TempDir, edit: impl FnOnce(&mut Value)) -> String {
    let text = std::fs::read_to_string(fixture("petstore-swagger2.yaml")).unwrap();
    let mut swagger: Value = serde_json::from_str(&text).unwrap();
    edit(&mut swagger);
    let path = dir.path().join("api.json");
    std::fs::write(&path, swagger.to_string()).unwrap();
    path.to_string_lossy().to_string()
}

#[tokio::test]
async fn test_deep_definition_ref_converts_and_validates() {
    let dir = TempDir::new().unwrap();
    let source = edited_petstore(&dir, |swagger| {
        swagger["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["schema"] =
            serde_json::json!({"$ref": "#/definitions/Pet/properties/id"});
    });

    let (result, stdout, stderr) = run(cli_config(&source).build()).await;
    assert!(stderr.is_empty(), "stderr was: {stderr}");
    let document = result.unwrap();
    assert_eq!(
        document["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"]["$ref"],
        "#/components/schemas/Pet/properties/id"
    );
    assert!(!stdout.is_empty());
}

#[tokio::test]
async fn test_recursive_external_model_validates() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("models.json"),
        serde_json::json!({"Node": {
            "type": "object",
            "properties": {"children": {"type": "array", "items": {"$ref": "#/Node"}}}
        }})
        .to_string(),
    )
    .unwrap();
    let source = edited_petstore(&dir, |swagger| {
        swagger["definitions"]["Node"] = serde_json::json!({"$ref": "models.json#/Node"});
    });

    let (result, _, stderr) = run(cli_config(&source).build()).await;
    assert!(stderr.is_empty(), "stderr was: {stderr}");
    let document = result.unwrap();
    assert_eq!(
        document["components"]["schemas"]["Node2"]["properties"]["children"]["items"]["$ref"],
        "#/components/schemas/Node2"
    );
}

#[tokio::test]
async fn test_semantic_failure_with_bae_prints_message_and_location() {
    let dir = TempDir::new().unwrap();
    let source = edited_petstore(&dir, |swagger| {
        swagger["paths"]["/pets"]["post"]["operationId"] = "listPets".into();
    });
    let config = cli_config(&source).detailed_diagnostics(true).build();

    let (result, stdout, stderr) = run(config).await;
    assert!(matches!(result, Err(Error::Validation { warnings: 0, .. })));
    assert!(stdout.is_empty());
    assert_eq!(
        stderr,
        "Duplicate operationId 'listPets' (first used at /paths/~1pets/get)\n/paths/~1pets/post\n"
    );
}

/// Run the binary in an empty home so no configuration file is picked up
fn oasup(args: &[&str]) -> Output {
    oasup_in(&TempDir::new().unwrap(), args)
}

/// Run the binary with `home` as both working directory and home
fn oasup_in(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oasup"))
        .args(args)
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("OASUP_CONFIG")
        .env_remove("OASUP_SCHEMA_PATH")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_binary_exit_codes() {
    let ok = oasup(&[&fixture("petstore-swagger2.yaml")]);
    assert_eq!(ok.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&ok.stdout).starts_with("{\n  \"openapi\": \"3."));

    let broken = oasup(&["--no-color", &fixture("broken.json")]);
    assert_eq!(broken.status.code(), Some(1));
    assert!(broken.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&broken.stderr);
    assert!(stderr.starts_with("Failed OpenAPI3 schema validation\n"));
    assert!(stderr.contains("/paths/~1pets/get/responses/200"));
    assert!(stderr.contains("Error: Failed OpenAPI3 schema validation"));
}

#[test]
fn test_binary_requires_a_source() {
    let output = oasup(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_binary_lint_failure() {
    let output = oasup(&["--no-color", "--lint", &fixture("petstore-swagger2.yaml")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Linting failed: "));
    assert!(stderr.contains("info-contact") || stderr.contains("contact"));
}

#[test]
fn test_binary_warns_about_broken_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".oasup.json"), "{ not json").unwrap();

    let output = oasup_in(&home, &["--no-color", &fixture("petstore-swagger2.yaml")]);
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipping configuration file"), "stderr was: {stderr}");
    assert!(stderr.contains(".oasup.json"));
}
