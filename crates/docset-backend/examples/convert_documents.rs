//! Convert documents from the command line
//!
//! ```text
//! cargo run --example convert_documents -- [--format CSV] [--clean] FILE...
//! ```
//!
//! One file prints its statistics and a preview; several files run as a
//! batch and are archived together. Settings not given on the command line
//! come from `~/.docset.toml` and `./.docset.toml`.

use docset_backend::DocumentConverter;
use docset_core::OutputFormat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let converter = DocumentConverter::from_config_files()?;
    let mut format = converter.config().format;
    let mut cleaning = converter.config().cleaning_options().copied();
    let mut files = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => {
                let value = args.next().ok_or("--format needs a value")?;
                format = value.parse::<OutputFormat>()?;
            }
            "--clean" => cleaning = Some(converter.config().cleaning),
            _ => files.push(arg),
        }
    }

    match files.as_slice() {
        [] => {
            eprintln!("usage: convert_documents [--format JSON|CSV|XML|AI_TRAINING] [--clean] FILE...");
            std::process::exit(2);
        }
        [file] => {
            let output = converter.process_file(file, format, cleaning.as_ref())?;
            println!("{}\n", output.status_message());
            println!("{}", output.statistics);
            println!("{}", output.preview);
        }
        _ => {
            let report = converter.process_batch(&files, format, cleaning.as_ref())?;
            println!("{}", report.summary());
            if let Some(archive) = &report.archive {
                println!("\nArchive: {}", archive.display());
            }
        }
    }

    Ok(())
}
