use std::path::PathBuf;
use std::{env, process};

fn main() -> anyhow::Result<()> {
    schemakb_cli::init_tracing();
    let settings = schemakb_cli::load_settings()?;
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <dataset_id> <question> [index_root]", args[0]);
        eprintln!("Example: {} sales \"total revenue for 'East' in march 2024\"", args[0]);
        process::exit(1);
    }
    let (dataset_id, question) = (&args[1], &args[2]);
    let index_root = args.get(3).map(PathBuf::from);

    let kb = schemakb_cli::open_session(&settings, dataset_id, index_root.as_deref())?;
    let resolution = kb.resolve(question)?;
    println!("🔍 {} column(s) for: \"{}\"", resolution.columns.len(), question);
    if resolution.schema.is_empty() {
        println!("(no matching columns)");
    } else {
        print!("{}", resolution.schema);
    }
    Ok(())
}
