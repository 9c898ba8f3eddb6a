use std::path::Path;

use schemakb_core::error::{BuildError, ResolutionError};
use schemakb_core::synonyms::SynonymGenerator;
use schemakb_core::table::{describe_columns, InMemoryTable};
use schemakb_core::traits::{QueryPattern, SearchBackend};
use schemakb_core::types::KbField;
use schemakb_text::{index_exists, load_descriptors, KbIndex, KbIndexBuilder};
use tempfile::TempDir;

fn sales_table() -> InMemoryTable {
    InMemoryTable::new()
        .with_column("Region", "object", ["East", "West", "East"])
        .with_column("Revenue", "float64", ["10.5", "20.0"])
}

fn build(root: &Path, table: &InMemoryTable) -> KbIndex {
    KbIndexBuilder::new(root).build("sales", table).expect("build");
    KbIndex::open(root, "sales").expect("open")
}

#[test]
fn build_then_open_round_trip() {
    let tmp = TempDir::new().unwrap();
    let report = KbIndexBuilder::new(tmp.path()).build("sales", &sales_table()).expect("build");
    assert_eq!(report.documents, 2);
    assert!(index_exists(tmp.path(), "sales"));
    assert!(!tmp.path().join("sales_kb_index.staging").exists());

    let index = KbIndex::open(tmp.path(), "sales").expect("open");
    assert_eq!(index.num_docs(), 2);
    let docs = index.documents().expect("documents");
    assert_eq!(docs[0].column_name, "'Region', 'object'");
    assert_eq!(docs[0].bare_name(), "Region");
    assert_eq!(docs[0].unique_values, vec!["East", "West"]);
    assert_eq!(docs[0].synonyms, vec!["Region", "Regions"]);
    assert!(docs[1].unique_values.is_empty());
}

#[test]
fn rebuild_replaces_previous_index() {
    let tmp = TempDir::new().unwrap();
    let index = build(tmp.path(), &sales_table());
    assert_eq!(index.num_docs(), 2);
    drop(index);

    let index = build(tmp.path(), &sales_table());
    assert_eq!(index.num_docs(), 2);
    drop(index);

    let smaller = InMemoryTable::new().with_column("Region", "object", ["North"]);
    let index = build(tmp.path(), &smaller);
    assert_eq!(index.num_docs(), 1);
    assert!(index.search(KbField::UniqueValues, &QueryPattern::exact("east"), None).unwrap().is_empty());
}

#[test]
fn missing_index_and_bad_input() {
    let tmp = TempDir::new().unwrap();
    match KbIndex::open(tmp.path(), "nope") {
        Err(ResolutionError::IndexMissing(path)) => assert!(path.ends_with("nope_kb_index")),
        other => panic!("expected IndexMissing, got {:?}", other.err()),
    }
    assert!(!index_exists(tmp.path(), "nope"));

    let err = KbIndexBuilder::new(tmp.path()).build("  ", &sales_table()).unwrap_err();
    assert!(matches!(err, BuildError::EmptyDatasetId));

    let mut descriptors = describe_columns(&sales_table(), &SynonymGenerator::new()).unwrap();
    descriptors.push(descriptors[0].clone());
    let err = KbIndexBuilder::new(tmp.path()).build_from_descriptors("sales", &descriptors).unwrap_err();
    assert!(matches!(err, BuildError::Dataset(_)));
    assert!(!index_exists(tmp.path(), "sales"));
}

#[test]
fn wildcard_and_fuzzy_search_report_matched_entries() {
    let tmp = TempDir::new().unwrap();
    let index = build(tmp.path(), &sales_table());

    let hits = index.search(KbField::UniqueValues, &QueryPattern::contains("eas"), None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].column_name, "Region");
    assert_eq!(hits[0].matched_terms, vec!["East"]);
    assert!(hits[0].score > 0.0);

    assert_eq!(index.search(KbField::UniqueValues, &QueryPattern::exact("East"), None).unwrap().len(), 1);
    assert!(index.search(KbField::UniqueValues, &QueryPattern::exact("eas"), None).unwrap().is_empty());

    let fuzzy = QueryPattern::parse("eest~1/1");
    let hits = index.search(KbField::UniqueValues, &fuzzy, None).unwrap();
    assert_eq!(hits[0].matched_terms, vec!["East"]);

    let hits = index.search(KbField::Synonyms, &QueryPattern::prefix("rev"), None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].column_name, "Revenue");
    assert_eq!(hits[0].matched_terms, vec!["Revenue", "Revenues"]);

    let both = index.search(KbField::Synonyms, &QueryPattern::contains("re"), Some(1)).unwrap();
    assert_eq!(both.len(), 1);
}

#[test]
fn spell_correction_uses_field_vocabulary() {
    let tmp = TempDir::new().unwrap();
    let index = build(tmp.path(), &sales_table());
    assert_eq!(index.spell_correct(KbField::Synonyms, "regoin").unwrap(), Some("region".to_string()));
    assert_eq!(index.spell_correct(KbField::UniqueValues, "Wset").unwrap(), None);
    assert_eq!(index.spell_correct(KbField::UniqueValues, "wesst").unwrap(), Some("west".to_string()));
}

#[test]
fn datetime_columns_carry_their_dtype_marker() {
    let tmp = TempDir::new().unwrap();
    let table = sales_table().with_column("OrderDate", "datetime64[ns]", ["2024-01-01"]);
    let index = build(tmp.path(), &table);
    let hits = index.search(KbField::Synonyms, &QueryPattern::exact("datetime64"), None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].column_name, "OrderDate");
    assert_eq!(hits[0].matched_terms, vec!["datetime64[ns]"]);
}

#[test]
fn descriptors_are_persisted_next_to_the_index() {
    let tmp = TempDir::new().unwrap();
    let report = KbIndexBuilder::new(tmp.path()).build("sales", &sales_table()).expect("build");
    assert!(report.descriptors_path.ends_with("sales.json"));
    let loaded = load_descriptors(tmp.path(), "sales").expect("descriptors");
    assert_eq!(loaded, describe_columns(&sales_table(), &SynonymGenerator::new()).unwrap());
    assert!(load_descriptors(tmp.path(), "other").is_err());
}
