use std::fs;

use schemakb_core::keywords::{KeywordExtractor, DATETIME_MARKERS};
use schemakb_core::synonyms::{pluralize, split_case, SynonymGenerator};
use schemakb_core::table::{describe_columns, InMemoryTable};
use schemakb_core::types::{DataType, IndexDocument};
use tempfile::TempDir;

#[test]
fn synonyms_are_deterministic_for_a_table() {
    let table = InMemoryTable::new()
        .with_column("city", "object", ["Pune", "Delhi"])
        .with_column("Status", "category", ["open", "closed"])
        .with_column("Order", "int64", Vec::<String>::new());
    let generator = SynonymGenerator::new();
    let first = describe_columns(&table, &generator).expect("describe");
    let second = describe_columns(&table, &generator).expect("describe");
    assert_eq!(first, second);

    assert!(first[0].synonyms.contains(&"cities".to_string()));
    assert_eq!(first[1].synonyms, vec!["Status", "Statuses"]);
    assert_eq!(first[2].synonyms[1], "Orders");
    assert_eq!(first[1].data_type, DataType::Categorical);
}

#[test]
fn display_form_is_stable_under_repetition() {
    for name in ["customer_id", "CustomerID", "shipToCity", "ABCTotal", "plain"] {
        let display = split_case(name);
        assert_eq!(split_case(&display), display);
        assert_eq!(pluralize(&split_case(&display)), pluralize(&display));
    }
}

#[test]
fn noise_words_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("noise.txt");
    fs::write(&path, "Revenue\nshow\n\n").unwrap();

    let extractor = KeywordExtractor::from_file(&path).expect("load noise words");
    let tokens = extractor.extract("Show revenue by Region");
    assert_eq!(tokens.free, vec!["by", "region"]);

    assert!(KeywordExtractor::from_file(&tmp.path().join("missing.txt")).is_err());
}

#[test]
fn date_query_tokens_target_datetime_documents() {
    let tokens = KeywordExtractor::default().extract("orders last quarter");
    assert!(tokens.date_present);
    assert!(tokens.free.ends_with(&DATETIME_MARKERS.map(String::from)));

    let table = InMemoryTable::new().with_column("OrderDate", "datetime64[ns]", ["2024-01-01"]);
    let descriptors = describe_columns(&table, &SynonymGenerator::new()).unwrap();
    let doc = IndexDocument::from_descriptor(&descriptors[0]);
    assert!(doc.synonyms.iter().any(|s| s.starts_with(DATETIME_MARKERS[0])));
}
