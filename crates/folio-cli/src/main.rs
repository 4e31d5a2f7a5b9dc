//! Folio CLI
//!
//! Runs the bibliographic demonstration: seed, merge detached graphs, list.

use clap::{Parser, ValueEnum};
use folio_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Folio - detached graph merge over SQLite", long_about = None)]
struct Cli {
    #[command(flatten)]
    demo: commands::demo::DemoArgs,

    /// Emit structured logs to stderr in the given format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();

    match cli.log_format {
        Some(LogFormat::Pretty) => init(Profile::Development),
        Some(LogFormat::Json) => init(Profile::Production),
        None => {}
    }

    let stdout = std::io::stdout();
    if let Err(e) = commands::demo::execute(cli.demo, &mut stdout.lock()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
