//! End-to-end tests for loading and converting source documents


use oasup_core::{
    serialize_document, Converter, Error, LoadedSource, RunConfig, SourceFormat, SourceLoader,
    SwaggerConverter,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use test_support::{petstore_swagger, write_file};

struct NoNetwork;

#[async_trait::async_trait]
impl oasup_core::Fetch for NoNetwork {
    async fn fetch(&self, url: &url::Url) -> oasup_core::Result<String> {
        Err(Error::Http {
            message: format!("network disabled for {}", url),
            status_code: None,
            source: None,
        })
    }
}

fn loader() -> SourceLoader {
    SourceLoader::new(Arc::new(NoNetwork))
}

fn config(source: &str) -> RunConfig {
    RunConfig::builder(source).resolve(true).patch(true).build()
}

#[tokio::test]
async fn test_convert_local_json_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "petstore-swagger2.yaml", &petstore_swagger().to_string());
    let designator = path.to_string_lossy().to_string();

    let context = SwaggerConverter::new()
        .convert_file(&loader(), &designator, &config(&designator))
        .await
        .unwrap();

    assert_eq!(context.source_format, SourceFormat::Json);
    assert_eq!(context.patches, 0);
    let output = serialize_document(&context.openapi, context.source_format).unwrap();
    assert!(output.starts_with("{\n  \"openapi\": \"3."));
}

#[tokio::test]
async fn test_convert_block_yaml_file() {
    let dir = TempDir::new().unwrap();
    let yaml = serde_yaml::to_string(&petstore_swagger()).unwrap();
    let path = write_file(dir.path(), "petstore.yaml", &yaml);
    let designator = path.to_string_lossy().to_string();

    let context = SwaggerConverter::new()
        .convert_file(&loader(), &designator, &config(&designator))
        .await
        .unwrap();

    assert_eq!(context.source_format, SourceFormat::Yaml);
    let output = serialize_document(&context.openapi, context.source_format).unwrap();
    assert!(output.starts_with("openapi:"));
}

#[tokio::test]
async fn test_external_refs_are_inlined_for_local_sources() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "models.yaml",
        "Pet:\n  type: object\n  properties:\n    name:\n      type: string\n      x-nullable: true\n",
    );
    let mut swagger = petstore_swagger();
    swagger["definitions"]["Pet"] = json!({"$ref": "models.yaml#/Pet"});
    let path = write_file(dir.path(), "api.json", &swagger.to_string());
    let designator = path.to_string_lossy().to_string();

    let context = SwaggerConverter::new()
        .convert_file(&loader(), &designator, &config(&designator))
        .await
        .unwrap();

    assert_eq!(
        context.openapi["components"]["schemas"]["Pet"],
        json!({"type": "object", "properties": {"name": {"type": "string", "nullable": true}}})
    );
    // The original document keeps the reference as written
    assert_eq!(context.original["definitions"]["Pet"]["$ref"], "models.yaml#/Pet");
}

#[tokio::test]
async fn test_remote_fetch_failure_aborts_before_conversion() {
    let err = SwaggerConverter::new()
        .convert_url(
            &loader(),
            "https://example.invalid/api.json",
            &config("https://example.invalid/api.json"),
        )
        .await
        .unwrap_err();
    assert!(err.is_load_error());
}

#[test]
fn test_converting_output_again_is_stable() {
    let converter = SwaggerConverter::new();
    let first = converter
        .convert(
            LoadedSource::from_text("api.json", petstore_swagger().to_string(), "."),
            &config("api.json"),
        )
        .unwrap();

    let text = serialize_document(&first.openapi, SourceFormat::Json).unwrap();
    let second = converter
        .convert(LoadedSource::from_text("api.json", text, "."), &config("api.json"))
        .unwrap();

    assert_eq!(second.openapi, first.openapi);
    assert_eq!(second.patches, 0);
}

#[test]
fn test_unsupported_version_is_conversion_error() {
    let err = SwaggerConverter::new()
        .convert(
            LoadedSource::from_text("old.json", r#"{"swaggerVersion": "1.2"}"#, "."),
            &config("old.json"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Conversion { .. }));
}

#[test]
fn test_deep_definition_ref_keeps_its_path() {
    let mut swagger = petstore_swagger();
    swagger["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["schema"] =
        json!({"$ref": "#/definitions/Pet/properties/id"});

    let context = SwaggerConverter::new()
        .convert(
            LoadedSource::from_text("api.json", swagger.to_string(), "."),
            &config("api.json"),
        )
        .unwrap();

    let schema = &context.openapi["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["content"]
        ["application/json"]["schema"];
    assert_eq!(schema["$ref"], "#/components/schemas/Pet/properties/id");

    let target = context
        .openapi
        .pointer("/components/schemas/Pet/properties/id")
        .unwrap();
    assert_eq!(target["type"], "integer");
}

#[tokio::test]
async fn test_recursive_external_model_converts() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "models.json",
        &json!({"Node": {
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "children": {"type": "array", "items": {"$ref": "#/Node"}}
            }
        }})
        .to_string(),
    );
    let mut swagger = petstore_swagger();
    swagger["definitions"]["Node"] = json!({"$ref": "models.json#/Node"});
    let path = write_file(dir.path(), "api.json", &swagger.to_string());
    let designator = path.to_string_lossy().to_string();

    let context = SwaggerConverter::new()
        .convert_file(&loader(), &designator, &config(&designator))
        .await
        .unwrap();

    let schemas = &context.openapi["components"]["schemas"];
    assert_eq!(schemas["Node"], json!({"$ref": "#/components/schemas/Node2"}));
    assert_eq!(
        schemas["Node2"]["properties"]["children"]["items"],
        json!({"$ref": "#/components/schemas/Node2"})
    );
}
