use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use docxide_walk::{TextOptions, docx_to_text};

#[derive(Parser)]
#[command(name = "docxide-walk")]
#[command(version)]
#[command(about = "Walk a DOCX document and print its text", long_about = None)]
struct Cli {
    /// Input DOCX file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Leave out header and footer text
    #[arg(long)]
    no_headers: bool,

    /// Separator between table cells
    #[arg(long, value_name = "SEP", default_value = "\t")]
    cell_separator: String,

    /// Print hyperlink text only, without targets
    #[arg(long)]
    no_link_targets: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let options = TextOptions {
        include_headers_footers: !cli.no_headers,
        cell_separator: cli.cell_separator,
        show_hyperlink_targets: !cli.no_link_targets,
    };

    let text = match docx_to_text(&cli.input, &options) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let written = match &cli.output {
        Some(path) => std::fs::write(path, &text),
        None => {
            print!("{text}");
            Ok(())
        }
    };
    if let Err(e) = written {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
