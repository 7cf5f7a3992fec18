use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use sros_services::{ConfigurationDocument, ParseOptions, format_markdown_summary, parse_bytes};
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "sros-services")]
#[command(about = "Summarize the services defined in SR-OS configuration files")]
struct Cli {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the parsed documents as JSON instead of a markdown summary
    #[arg(long)]
    json: bool,

    /// JSON file with parse options
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(long)]
    no_qos_rates: bool,

    #[arg(long)]
    no_port_details: bool,

    #[arg(long)]
    no_base_router: bool,

    #[arg(long)]
    drop_admin_down: bool,

    /// Increase logging level (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let options = load_options(&cli)?;
    debug!(?options, "parse options");

    let mut documents = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes = fs::read(path)?;
        let document = parse_bytes(&bytes, &options)
            .map_err(|err| format!("{}: {err}", path.display()))?;
        info!(
            file = %path.display(),
            services = document.services.len(),
            "parsed"
        );
        documents.push(document);
    }

    if cli.json {
        print_json(&documents)?;
    } else {
        let summaries = cli
            .files
            .iter()
            .zip(&documents)
            .map(|(path, document)| format_markdown_summary(document, &path.display().to_string()))
            .collect::<Vec<_>>();
        println!("{}", summaries.join("\n"));
    }

    Ok(())
}

fn init_tracing(verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_options(cli: &Cli) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.options {
        Some(path) => read_options(path)?,
        None => ParseOptions::default(),
    };
    if cli.no_qos_rates {
        options = options.with_qos_rates(false);
    }
    if cli.no_port_details {
        options = options.with_port_details(false);
    }
    if cli.no_base_router {
        options = options.with_base_router(false);
    }
    if cli.drop_admin_down {
        options = options.with_admin_down_dropped(true);
    }
    Ok(options)
}

fn read_options(path: &Path) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let options = serde_json::from_str(&raw)
        .map_err(|err| format!("{}: invalid options: {err}", path.display()))?;
    Ok(options)
}

fn print_json(documents: &[ConfigurationDocument]) -> Result<(), serde_json::Error> {
    let json = match documents {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    println!("{json}");
    Ok(())
}
