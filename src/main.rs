mod enrich;
mod ui;

use clap::Parser;

use crate::enrich::{EnrichCommands, handle_enrich_command};
use crate::ui::prelude::{Level, OutputFormat, emit};

/// Planfuse: annotate draft video edit plans
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for messages
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text, global = true)]
    output_format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: EnrichCommands,
}

fn main() {
    let cli = Cli::parse();

    ui::init(cli.output_format, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(error) = handle_enrich_command(cli.command) {
        emit(
            Level::Error,
            "planfuse.error",
            &format!("Error: {error:#}"),
            None,
        );
        std::process::exit(1);
    }
}
