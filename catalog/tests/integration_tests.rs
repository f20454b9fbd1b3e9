use std::path::Path;

use schema_builder_catalog::{CatalogConfig, CatalogError, Manifest, SchemaCatalog};
use schema_builder_core::*;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CONFIG_YAML: &str = r#"
version: "1.0"
base_id: https://schemas.example.com/shop
parse:
  mode: collect_all
output:
  pretty: true
  extension: .json
"#;

fn config() -> CatalogConfig {
    CatalogConfig::from_yaml_str(CONFIG_YAML).unwrap()
}

/// A small shop catalog: a recursive category tree and an order document
/// sharing an address definition.
fn shop_catalog(config: CatalogConfig, max_quantity: i64) -> SchemaCatalog {
    let definitions = RefTable::new();
    definitions
        .register(
            "address",
            object((
                property("street", string().min_length(1)),
                property("city", string().min_length(1)),
                optional_property("zip", string().pattern(r"^\d{4,5}$").unwrap()),
            ))
            .unwrap()
            .additional_properties(false),
        )
        .unwrap();
    definitions
        .register(
            "category",
            object((
                property("name", string()),
                optional_property(
                    "children",
                    array(definitions.forward_reference("category")),
                ),
            ))
            .unwrap(),
        )
        .unwrap();

    let line = object((
        property("sku", string().pattern("^[A-Z]{3}-[0-9]+$").unwrap()),
        property("quantity", integer().minimum(1).maximum(max_quantity)),
    ))
    .unwrap();
    let order = object((
        property("id", integer()),
        property("shipTo", definitions.reference("address").unwrap()),
        property("lines", array(line).min_items(1)),
        optional_property("note", either(string(), null())),
    ))
    .unwrap()
    .title("Order");

    SchemaCatalog::builder(config)
        .definitions(definitions.clone())
        .document("order", order)
        .document("category", definitions.reference("category").unwrap())
        .build()
        .unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn test_rendered_document_shape() {
    let catalog = shop_catalog(config(), 10);
    let order = catalog.render("order").unwrap();

    assert_eq!(order["$schema"], json!("https://json-schema.org/draft/2020-12/schema"));
    assert_eq!(order["$id"], json!("https://schemas.example.com/shop/order.json"));
    assert_eq!(order["title"], json!("Order"));
    assert_eq!(order["required"], json!(["id", "shipTo", "lines"]));
    assert_eq!(order["properties"]["shipTo"], json!({"$ref": "#/$defs/address"}));
    assert_eq!(
        order["properties"]["note"],
        json!({"anyOf": [{"type": "string"}, {"type": "null"}]})
    );

    let defs = order["$defs"].as_object().unwrap();
    assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["address", "category"]);
    assert_eq!(
        defs["category"]["properties"]["children"]["items"],
        json!({"$ref": "#/$defs/category"})
    );
}

#[test]
fn test_reference_root_document() {
    let catalog = shop_catalog(config(), 10);
    let category = catalog.render("category").unwrap();
    assert_eq!(category["$ref"], json!("#/$defs/category"));
    assert!(category["$defs"].get("category").is_some());
}

#[test]
fn test_render_is_deterministic() {
    let a = shop_catalog(config(), 10);
    let b = shop_catalog(config(), 10);
    for ((name_a, doc_a), (name_b, doc_b)) in a.render_all().into_iter().zip(b.render_all()) {
        assert_eq!(name_a, name_b);
        assert_eq!(doc_a.to_string(), doc_b.to_string());
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_validate_accepts_valid_order() {
    let catalog = shop_catalog(config(), 10);
    let order = json!({
        "id": 7,
        "shipTo": {"street": "Main St 1", "city": "Turku", "zip": "20100"},
        "lines": [{"sku": "ABC-1", "quantity": 2}],
        "note": null
    });
    assert_eq!(catalog.validate("order", &order).unwrap(), order);
}

#[test]
fn test_validate_collects_every_error() {
    let catalog = shop_catalog(config(), 10);
    let order = json!({
        "id": 7,
        "shipTo": {"street": "", "city": "Turku", "country": "FI"},
        "lines": [{"sku": "abc", "quantity": 0}]
    });

    let Err(CatalogError::Invalid { errors, .. }) = catalog.validate("order", &order) else {
        panic!("expected the order to be rejected");
    };
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "$.shipTo.street",
            "$.shipTo.country",
            "$.lines[0].sku",
            "$.lines[0].quantity",
        ]
    );
}

#[test]
fn test_validate_recursive_document() {
    let catalog = shop_catalog(config(), 10);
    let tree = json!({
        "name": "root",
        "children": [{"name": "tools", "children": [{"name": 3}]}]
    });

    let Err(CatalogError::Invalid { errors, .. }) = catalog.validate("category", &tree) else {
        panic!("expected the tree to be rejected");
    };
    assert_eq!(errors.first().path.to_string(), "$.children[0].children[0].name");
}

// ---------------------------------------------------------------------------
// Writing and drift detection
// ---------------------------------------------------------------------------

#[test]
fn test_write_dir_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("schemas");
    let catalog = shop_catalog(config(), 10);

    let manifest = catalog.write_dir(&out).unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.get("order").unwrap().file, "order.json");

    let on_disk = read_json(&out.join("order.json"));
    assert_eq!(on_disk, catalog.render("order").unwrap());
    assert_eq!(manifest.get("order").unwrap().checksum, Manifest::checksum(&on_disk));

    let text = std::fs::read_to_string(out.join("category.json")).unwrap();
    assert!(text.starts_with("{\n  \"$schema\""));
    assert!(text.ends_with("}\n"));

    assert!(manifest.verify(&out).unwrap().is_empty());
}

#[test]
fn test_compact_output_has_same_checksums() {
    let dir = tempfile::tempdir().unwrap();
    let mut compact = config();
    compact.output.pretty = false;

    let pretty = shop_catalog(config(), 10).write_dir(dir.path().join("pretty")).unwrap();
    let dense = shop_catalog(compact, 10).write_dir(dir.path().join("dense")).unwrap();

    assert!(pretty.diff(&dense).is_empty());
    let text = std::fs::read_to_string(dir.path().join("dense/order.json")).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn test_manifest_detects_schema_change() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.json");

    let committed = shop_catalog(config(), 10).write_dir(dir.path()).unwrap();
    committed.save(&manifest_path).unwrap();

    let rebuilt = shop_catalog(config(), 99).write_dir(dir.path()).unwrap();
    let diff = Manifest::load(&manifest_path).unwrap().diff(&rebuilt);

    assert_eq!(diff.changed, vec!["order"]);
    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
}

#[test]
fn test_verify_detects_hand_edits() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = shop_catalog(config(), 10).write_dir(dir.path()).unwrap();

    let path = dir.path().join("category.json");
    let mut edited = read_json(&path);
    edited["description"] = json!("edited by hand");
    std::fs::write(&path, serde_json::to_vec_pretty(&edited).unwrap()).unwrap();
    std::fs::remove_file(dir.path().join("order.json")).unwrap();

    assert_eq!(manifest.verify(dir.path()).unwrap(), vec!["category", "order"]);
}

// ---------------------------------------------------------------------------
// Configuration files
// ---------------------------------------------------------------------------

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.yml");
    std::fs::write(&path, CONFIG_YAML).unwrap();

    let loaded = CatalogConfig::load(&path).unwrap();
    assert_eq!(loaded, config());
    assert_eq!(loaded.parse.mode, ErrorMode::CollectAll);

    let copy = dir.path().join("copy.yml");
    loaded.save(&copy).unwrap();
    assert_eq!(CatalogConfig::load(&copy).unwrap(), loaded);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let error = CatalogConfig::load(dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(error, CatalogError::Io(_)));
}
