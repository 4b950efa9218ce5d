use anyhow::{Context, Result};
use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Wrap a raster image in a single PDF page of the same size.
///
/// Exactly two positional arguments and no flags; every argument, including
/// `--` and anything starting with `-`, is taken as a path.
#[derive(Parser, Debug)]
#[command(
    name = "imgpdf",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// Raster image to convert (PNG, JPEG, BMP, GIF, TIFF, WebP)
    #[arg(value_parser = OsStringValueParser::new().map(PathBuf::from))]
    input_image_path: PathBuf,

    /// Destination PDF, overwritten if it exists
    #[arg(value_parser = OsStringValueParser::new().map(PathBuf::from))]
    output_pdf_path: PathBuf,
}

/// Parses the full argument vector, program name included.
///
/// The count is checked on the raw arguments so that clap's `--` handling
/// can never change how many paths were given.
fn parse_args(args: Vec<OsString>) -> Option<Cli> {
    let [program, input, output]: [OsString; 3] = match args.try_into() {
        Ok(args) => args,
        Err(rest) => {
            debug!(count = rest.len().saturating_sub(1), "wrong number of arguments");
            return None;
        }
    };

    match Cli::try_parse_from([program, "--".into(), input, output]) {
        Ok(cli) => Some(cli),
        Err(err) => {
            debug!(kind = ?err.kind(), "rejected arguments");
            None
        }
    }
}

fn usage(program: &str) -> String {
    format!("Usage: {program} <input_image_path> <output_pdf_path>")
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "imgpdf".to_string())
}

fn init_tracing() {
    // stdout is reserved for the usage/confirmation line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let Some(cli) = parse_args(std::env::args_os().collect()) else {
        println!("{}", usage(&program_name()));
        std::process::exit(1);
    };

    imgpdf::convert(&cli.input_image_path, &cli.output_pdf_path).with_context(|| {
        format!(
            "failed to convert {} to {}",
            cli.input_image_path.display(),
            cli.output_pdf_path.display()
        )
    })?;

    println!("PDF saved to: {}", cli.output_pdf_path.display());
    Ok(())
}
