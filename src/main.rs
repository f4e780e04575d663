//! imgaudit - find unreferenced and oversized images in EPUB files

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use imgaudit::{DEFAULT_PIXEL_THRESHOLD, Options, audit_epub};

#[derive(Parser)]
#[command(name = "imgaudit")]
#[command(
    version,
    about = "Find unreferenced and oversized images in EPUB files",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    imgaudit book.epub                        Report with default options
    imgaudit --include-css --include-svg book.epub
    imgaudit --json --display-prefix uploads/book.epub book.epub")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Also scan .html and .htm documents
    #[arg(long)]
    include_html: bool,

    /// Scan stylesheets and <style> blocks for url() references
    #[arg(long)]
    include_css: bool,

    /// Scan SVG documents and <image> links
    #[arg(long)]
    include_svg: bool,

    /// Consider images outside "images" directories
    #[arg(long)]
    search_all_images: bool,

    /// Only consider images declared in the package manifest
    #[arg(long)]
    follow_manifest_only: bool,

    /// Pixel area at which an image counts as oversized
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_PIXEL_THRESHOLD)]
    pixel_threshold: u64,

    /// Prefix joined onto each path in the output
    #[arg(long, value_name = "PREFIX", default_value = "")]
    display_prefix: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details of skipped documents and images
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String, String> {
    let bytes = std::fs::read(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;

    let options = Options::default()
        .with_html(cli.include_html)
        .with_css(cli.include_css)
        .with_svg(cli.include_svg)
        .with_search_all_images(cli.search_all_images)
        .with_follow_manifest_only(cli.follow_manifest_only)
        .with_pixel_threshold(cli.pixel_threshold);

    let report = audit_epub(&bytes, &options).map_err(|e| format!("{}: {e}", cli.input))?;

    if cli.json {
        let mut json = report.to_json(&cli.display_prefix).map_err(|e| e.to_string())?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(report.summary(&cli.display_prefix))
    }
}
