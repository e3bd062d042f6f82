use std::fs;

use carddb_core::catalog::{load_catalog, load_catalog_file};
use carddb_core::error::{Error, LoadError};
use carddb_core::projector::{project, project_catalog};
use carddb_core::service_index::ServiceIndex;
use carddb_core::types::canonical_service_key;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {"id": "1", "name": "Marta Silva", "company": "CleanCo", "email": "marta@cleanco.pt", "phone": "+351 900",
   "city": "Lisbon", "services": ["Cleaning", " Window Washing "], "prices": {"cleaning": 50, "Window Washing": 30.5}},
  {"id": "2", "name": "Jonas Weber", "company": "CleanCo Plus", "email": "jonas@example.de", "phone": "",
   "city": "Berlin", "services": ["cleaning", "plumbing"], "prices": {}},
  {"id": "3", "name": "Ana Costa", "company": "FixIt", "email": "ana@fixit.pt", "phone": "+351 911",
   "city": "", "services": ["PLUMBING", "plumbing"], "prices": {"plumbing": 80}}
]"#;

#[test]
fn load_preserves_order_and_canonicalises_price_keys() {
    let catalog = load_catalog(CATALOG.as_bytes()).expect("load");
    let ids: Vec<&str> = catalog.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);

    let marta = catalog.get("1").expect("record 1");
    assert_eq!(marta.services, ["Cleaning", " Window Washing "], "raw service strings are kept");
    assert_eq!(marta.price_for("window washing"), Some(30.5));
    assert_eq!(marta.price_for("  CLEANING"), Some(50.0));
    assert_eq!(catalog.get("2").expect("record 2").price_for("cleaning"), None);
    assert!(catalog.get("missing").is_none());
}

#[test]
fn missing_required_field_aborts_load() {
    let input = r#"[{"id": "1", "name": "A", "company": "B", "email": "", "phone": ""}]"#;
    match load_catalog(input.as_bytes()) {
        Err(Error::Load(LoadError::MissingField { index: 0, field: "city" })) => {}
        other => panic!("expected missing city, got {other:?}"),
    }

    let null_city = r#"[{"id": "1", "name": "A", "company": "B", "email": "", "phone": "", "city": null}]"#;
    assert!(matches!(load_catalog(null_city.as_bytes()), Err(Error::Load(LoadError::MissingField { .. }))));
}

#[test]
fn empty_strings_and_absent_collections_are_accepted() {
    let input = r#"[{"id": "x", "name": "", "company": "", "email": "", "phone": "", "city": ""}]"#;
    let catalog = load_catalog(input.as_bytes()).expect("load");
    let record = &catalog.records()[0];
    assert!(record.services.is_empty());
    assert!(record.prices.is_empty());
}

#[test]
fn duplicate_id_aborts_load() {
    let input = r#"[
      {"id": "7", "name": "A", "company": "", "email": "", "phone": "", "city": ""},
      {"id": "8", "name": "B", "company": "", "email": "", "phone": "", "city": ""},
      {"id": "7", "name": "C", "company": "", "email": "", "phone": "", "city": ""}
    ]"#;
    match load_catalog(input.as_bytes()) {
        Err(Error::Load(LoadError::DuplicateId { id, first: 0, second: 2 })) => assert_eq!(id, "7"),
        other => panic!("expected duplicate id, got {other:?}"),
    }
}

#[test]
fn malformed_input_and_bad_prices_abort_load() {
    for input in [
        "{}",
        "not json",
        r#"[{"id": 1, "name": "A", "company": "", "email": "", "phone": "", "city": ""}]"#,
        r#"[{"id": "1", "name": "A", "company": "", "email": "", "phone": "", "city": "", "prices": {"x": "cheap"}}]"#,
    ] {
        assert!(matches!(load_catalog(input.as_bytes()), Err(Error::Load(LoadError::Malformed(_)))), "input: {input}");
    }

    let negative = r#"[{"id": "1", "name": "A", "company": "", "email": "", "phone": "", "city": "", "prices": {"x": -1}}]"#;
    assert!(matches!(load_catalog(negative.as_bytes()), Err(Error::Load(LoadError::NegativePrice { .. }))));

    let colliding = r#"[{"id": "1", "name": "A", "company": "", "email": "", "phone": "", "city": "", "prices": {"Paint": 1, "paint ": 2}}]"#;
    assert!(matches!(load_catalog(colliding.as_bytes()), Err(Error::Load(LoadError::DuplicatePriceKey { .. }))));
}

#[test]
fn load_catalog_file_reads_from_disk() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cards.json");
    fs::write(&path, CATALOG).unwrap();
    assert_eq!(load_catalog_file(&path).expect("load").len(), 3);

    let missing = tmp.path().join("nope.json");
    assert!(matches!(load_catalog_file(&missing), Err(Error::Load(LoadError::Io(_)))));
}

#[test]
fn service_index_lists_every_declared_service_in_catalog_order() {
    let catalog = load_catalog(CATALOG.as_bytes()).expect("load");
    let index = ServiceIndex::build(&catalog);

    for (position, record) in catalog.records().iter().enumerate() {
        for service in &record.services {
            assert!(index.lookup(service).contains(&position), "{} missing under {service:?}", record.id);
        }
    }
    assert_eq!(index.lookup("cleaning"), [0, 1]);
    assert_eq!(index.lookup(" Window washing"), [0]);
    assert!(index.lookup("roofing").is_empty());
    assert_eq!(index.keys().collect::<Vec<_>>(), ["cleaning", "plumbing", "window washing"]);
}

#[test]
fn service_index_keeps_duplicate_declarations() {
    let catalog = load_catalog(CATALOG.as_bytes()).expect("load");
    let index = ServiceIndex::build(&catalog);
    // record 3 declares "PLUMBING" and "plumbing"
    assert_eq!(index.lookup("plumbing"), [1, 2, 2]);
}

#[test]
fn repeated_load_and_build_are_identical() {
    let a = load_catalog(CATALOG.as_bytes()).expect("load a");
    let b = load_catalog(CATALOG.as_bytes()).expect("load b");
    assert_eq!(a, b);
    assert_eq!(ServiceIndex::build(&a), ServiceIndex::build(&b));
}

#[test]
fn canonical_key_trims_and_lowercases() {
    assert_eq!(canonical_service_key("  Home Cleaning\t"), "home cleaning");
    assert_eq!(canonical_service_key("   "), "");
}

#[test]
fn projection_is_single_line_and_deterministic() {
    let catalog = load_catalog(CATALOG.as_bytes()).expect("load");
    let doc = project(&catalog.records()[0]);
    assert_eq!(doc.id, "1");
    assert_eq!(
        doc.text,
        "Provider: Marta Silva Company: CleanCo City: Lisbon Services: Cleaning, Window Washing \
         Prices: cleaning:€50 | window washing:€30.5 Contact: marta@cleanco.pt +351 900"
    );
    assert!(!doc.text.contains('\n'));
    assert_eq!(doc.metadata.get("services").map(String::as_str), Some("Cleaning, Window Washing "));
    assert_eq!(doc.metadata.get("city").map(String::as_str), Some("Lisbon"));

    let again = project_catalog(&load_catalog(CATALOG.as_bytes()).expect("reload"));
    assert_eq!(again[0], doc);
    assert_eq!(again.len(), 3);
}

#[test]
fn projection_renders_missing_values_as_empty() {
    let catalog = load_catalog(CATALOG.as_bytes()).expect("load");
    let doc = project(&catalog.records()[1]);
    assert!(doc.text.contains("Prices: Contact: jonas@example.de"), "text: {}", doc.text);
    assert!(!doc.text.ends_with(' '));
    assert!(!doc.text.contains("null"));
}
