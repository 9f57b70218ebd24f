//! Print the OpenAPI document.

use std::io::Write;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use fittrack::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(about = "Print the FitTrack OpenAPI document")]
struct Args {
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let doc = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Json => doc.to_pretty_json()?,
        Format::Yaml => doc.to_yaml()?,
    };
    writeln!(std::io::stdout().lock(), "{rendered}")?;
    Ok(())
}
