use std::sync::Arc;
use std::thread;

use schemakb_core::config::{CombineMode, SearchMode};
use schemakb_core::table::InMemoryTable;
use schemakb_resolve::{ResolveOptions, SchemaKb, SuggestOptions};
use schemakb_text::{KbIndex, KbIndexBuilder};
use tempfile::TempDir;

fn open_sales(tmp: &TempDir) -> SchemaKb<KbIndex> {
    let table = InMemoryTable::new()
        .with_column("Region", "object", ["East", "West", "North East"])
        .with_column("Revenue", "float64", ["1.0", "2.5"])
        .with_column("OrderDate", "datetime64[ns]", ["2024-01-01"]);
    KbIndexBuilder::new(tmp.path()).build("sales", &table).expect("build");
    SchemaKb::new(KbIndex::open(tmp.path(), "sales").expect("open"))
}

#[test]
fn schema_fragment_for_a_question() {
    let tmp = TempDir::new().unwrap();
    let kb = open_sales(&tmp);

    let schema = kb.dynamic_schema("total revenue for 'West'").unwrap();
    assert_eq!(
        schema,
        "Revenue -- also referred to as: 'Revenue', 'Revenues'\nRegion -- has these unique values: 'West'\n"
    );

    let resolution = kb.resolve("revenue in march 2024").unwrap();
    assert_eq!(resolution.columns, vec!["Revenue", "OrderDate"]);
    assert_eq!(resolution.synonym_matches.terms("OrderDate"), ["datetime64[ns]"]);
}

#[test]
fn strict_and_flexi_value_matching() {
    let tmp = TempDir::new().unwrap();
    let kb = open_sales(&tmp);
    assert!(kb.resolve("sales in ea").unwrap().value_matches.is_empty());

    let kb = kb.with_resolve_options(ResolveOptions { mode: SearchMode::Flexi, ..ResolveOptions::default() });
    let resolution = kb.resolve("sales in eas").unwrap();
    assert_eq!(resolution.value_matches.terms("Region"), ["East", "North East"]);

    let kb = kb.with_resolve_options(ResolveOptions { mode: SearchMode::Flexi, combine: CombineMode::Intersection, ..ResolveOptions::default() });
    assert!(kb.resolve("sales in eas").unwrap().columns.is_empty());
}

#[test]
fn suggestions_from_the_index() {
    let tmp = TempDir::new().unwrap();
    let kb = open_sales(&tmp);

    assert!(kb.suggest("revenue by re").is_empty());
    assert_eq!(kb.suggest("revenue by regi"), vec!["revenue by Region"]);
    assert_eq!(kb.suggest("sales in wes"), vec!["sales in West <'Region'>"]);
    assert_eq!(kb.suggest("revenue by regoin"), vec!["revenue by Region"]);

    let kb = kb.with_suggest_options(SuggestOptions { spell_correct: false, ..SuggestOptions::default() });
    assert!(kb.suggest("revenue by regoin").is_empty());
}

#[test]
fn fuzzy_suggestions_without_spelling_correction() {
    let tmp = TempDir::new().unwrap();
    let kb = open_sales(&tmp).with_suggest_options(SuggestOptions { spell_correct: false, ..SuggestOptions::default() });
    assert!(kb.suggest("revenue by regiin").is_empty());

    let kb = kb.with_suggest_options(SuggestOptions { fuzzy: true, spell_correct: false, ..SuggestOptions::default() });
    assert_eq!(kb.suggest("revenue by regiin"), vec!["revenue by Region"]);
    // the first three characters must match
    assert!(kb.suggest("revenue by rgion").is_empty());
}

#[test]
fn fuzzy_schema_resolution() {
    let tmp = TempDir::new().unwrap();
    let kb = open_sales(&tmp);
    assert_eq!(kb.dynamic_schema("total revnue for 'Wesst'").unwrap(), "");

    let kb = kb.with_resolve_options(ResolveOptions { fuzzy: true, ..ResolveOptions::default() });
    assert_eq!(
        kb.dynamic_schema("total revnue for 'Wesst'").unwrap(),
        "Revenue -- also referred to as: 'Revenue'\nRegion -- has these unique values: 'West'\n"
    );
}

#[test]
fn shared_session_across_threads() {
    let tmp = TempDir::new().unwrap();
    let kb = Arc::new(open_sales(&tmp));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let kb = Arc::clone(&kb);
            thread::spawn(move || (kb.dynamic_schema("total revenue for 'West'").unwrap(), kb.suggest("revenue by regi")))
        })
        .collect();
    for handle in handles {
        let (schema, suggestions) = handle.join().unwrap();
        assert_eq!(schema, "Revenue -- also referred to as: 'Revenue', 'Revenues'\nRegion -- has these unique values: 'West'\n");
        assert_eq!(suggestions, vec!["revenue by Region"]);
    }
}
