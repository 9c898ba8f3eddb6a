use std::path::{Path, PathBuf};
use std::{env, process};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use schemakb_core::synonyms::SynonymGenerator;
use schemakb_core::table::InMemoryTable;
use schemakb_text::KbIndexBuilder;
use tracing::{info, warn};

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} <dataset.json|dataset_dir> [--index-root DIR]", prog);
    eprintln!("Each dataset file is indexed under its file stem, e.g. sales.json -> sales_kb_index");
    process::exit(1);
}

fn dataset_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() { return vec![input.to_path_buf()]; }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn main() -> anyhow::Result<()> {
    schemakb_cli::init_tracing();
    let settings = schemakb_cli::load_settings()?;
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    let mut input = None; let mut index_root = None;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--index-root" => { match args.get(i + 1) { Some(dir) => { index_root = Some(PathBuf::from(dir)); i += 1; } None => { eprintln!("Error: --index-root requires a directory"); process::exit(1); } } }
        "-h" | "--help" => usage(&prog),
        a if !a.starts_with('-') => input = Some(PathBuf::from(a)), _ => {} } i += 1; }
    let Some(input) = input else { usage(&prog) };
    let index_root = index_root.unwrap_or_else(|| settings.index_root());

    let files = dataset_files(&input);
    if files.is_empty() { anyhow::bail!("no dataset files found at {}", input.display()); }
    println!("schemakb indexer\n================");
    println!("Datasets: {}  Index root: {}", files.len(), index_root.display());

    let synonyms = SynonymGenerator::from_settings(&settings.synonyms, None).context("kb.synonyms")?;
    let builder = KbIndexBuilder::new(index_root).with_synonyms(synonyms);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} datasets {msg}")?.progress_chars("#>-"));
    let mut built = 0usize; let mut failed = 0usize;
    for path in &files {
        let dataset_id = path.file_stem().and_then(|s| s.to_str()).with_context(|| format!("invalid file name {}", path.display()))?;
        pb.set_message(dataset_id.to_string());
        let result = InMemoryTable::from_json_file(path).and_then(|table| builder.build(dataset_id, &table));
        match result {
            Ok(report) => { built += 1; info!(dataset = dataset_id, columns = report.documents, path = %report.index_dir.display(), "indexed"); }
            Err(e) => { failed += 1; warn!(dataset = dataset_id, error = %e, "indexing failed"); }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!("\n✅ Indexed {} dataset(s), {} failed", built, failed);
    println!("💡 To query, use: cargo run --bin schemakb-schema <dataset_id> '<question>'");
    if failed > 0 { process::exit(2); }
    Ok(())
}
