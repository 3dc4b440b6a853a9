//! slidepack - Markdown slide decks to SCORM packages

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use slidepack::export::{PackageConfig, ScormExporter};
use slidepack::logging::{LogConfig, LogFormat, init_logging};
use slidepack::server::{self, ServerConfig};
use slidepack::{build_toc, segment};

#[derive(Parser)]
#[command(name = "slidepack")]
#[command(version, about = "Package markdown slide decks as SCORM 1.2 courses", long_about = None)]
#[command(after_help = "EXAMPLES:
    slidepack build deck.md -o course.zip     Package a deck
    slidepack toc deck.md                     Show the sidebar entries
    slidepack serve --bind 0.0.0.0:5000       Run the build endpoint")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (compact or json)
    #[arg(long, default_value = "compact", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Package a markdown deck into a SCORM archive
    Build {
        /// Markdown deck
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output archive
        #[arg(short, long, value_name = "OUTPUT", default_value = "scorm_package.zip")]
        output: PathBuf,

        /// Course title
        #[arg(long)]
        title: Option<String>,

        /// Title of the lesson item
        #[arg(long)]
        item_title: Option<String>,
    },
    /// Print the table of contents of a deck
    Toc {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Serve the HTTP build endpoint
    Serve {
        /// Address to listen on (defaults to $SLIDEPACK_BIND or 127.0.0.1:5000)
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("warning: could not initialize logging: {e}");
    }

    let result = match cli.command {
        Command::Build {
            input,
            output,
            title,
            item_title,
        } => build(&input, &output, title, item_title),
        Command::Toc { input } => show_toc(&input),
        Command::Serve { bind } => serve(bind),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build(
    input: &Path,
    output: &Path,
    title: Option<String>,
    item_title: Option<String>,
) -> Result<(), String> {
    let markdown = std::fs::read_to_string(input)
        .map_err(|e| format!("cannot read {}: {e}", input.display()))?;

    let mut config = PackageConfig::default();
    if let Some(title) = title {
        config = config.with_course_title(title);
    }
    if let Some(item_title) = item_title {
        config = config.with_item_title(item_title);
    }

    let archive = ScormExporter::new()
        .with_config(config)
        .export_to_vec(&markdown)
        .map_err(|e| e.to_string())?;
    std::fs::write(output, &archive)
        .map_err(|e| format!("cannot write {}: {e}", output.display()))?;

    println!("Wrote {} ({} bytes)", output.display(), archive.len());
    Ok(())
}

fn show_toc(input: &Path) -> Result<(), String> {
    let markdown = std::fs::read_to_string(input)
        .map_err(|e| format!("cannot read {}: {e}", input.display()))?;
    let slides = segment(&markdown);

    println!("Slides: {}", slides.len());
    for entry in build_toc(&slides) {
        let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
        println!("{:>4}  {indent}{}", entry.index, entry.title);
    }
    Ok(())
}

fn serve(bind: Option<std::net::SocketAddr>) -> Result<(), String> {
    let mut config = ServerConfig::from_env();
    if let Some(bind) = bind {
        config.bind = bind;
    }

    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime
        .block_on(server::serve(config))
        .map_err(|e| e.to_string())
}
