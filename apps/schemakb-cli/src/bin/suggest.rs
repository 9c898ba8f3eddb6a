use std::path::PathBuf;
use std::{env, process};

use schemakb_resolve::SuggestOptions;

fn main() -> anyhow::Result<()> {
    schemakb_cli::init_tracing();
    let settings = schemakb_cli::load_settings()?;
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    let mut fuzzy = settings.suggest.fuzzy; let mut spell_correct = settings.suggest.spell_correct; let mut index_root = None;
    let mut positional = Vec::new();
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--fuzzy" | "-f" => fuzzy = true,
        "--no-spell" => spell_correct = false,
        "--index-root" => { match args.get(i + 1) { Some(dir) => { index_root = Some(PathBuf::from(dir)); i += 1; } None => { eprintln!("Error: --index-root requires a directory"); process::exit(1); } } }
        _ => positional.push(args[i].clone()) } i += 1; }
    if positional.len() < 2 {
        eprintln!("Usage: {} <dataset_id> <partial sentence> [--fuzzy] [--no-spell] [--index-root DIR]", prog);
        eprintln!("Example: {} sales \"revenue by reg\"", prog);
        process::exit(1);
    }
    let dataset_id = &positional[0];
    let text = positional[1..].join(" ");

    let options = SuggestOptions { fuzzy, spell_correct, ..SuggestOptions::from(&settings.suggest) };
    let kb = schemakb_cli::open_session(&settings, dataset_id, index_root.as_deref())?.with_suggest_options(options);
    let suggestions = kb.suggest(&text);
    if suggestions.is_empty() { println!("(no suggestions)"); }
    for (i, s) in suggestions.iter().enumerate() { println!("  {}. {}", i + 1, s); }
    Ok(())
}
