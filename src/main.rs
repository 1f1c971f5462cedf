mod demo;
mod engine;
mod graph;
mod logging;
mod visit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use visit::{DotExporter, DumpVisitor};

#[derive(Parser)]
#[command(name = "miniflow")]
#[command(about = "Minimal workflow engine - typed node graphs driven by activation tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the demo workflow and report its terminal status
    Run,

    /// Print a structured dump of the demo workflow graph
    Dump,

    /// Print a Graphviz dot rendering of the demo workflow graph
    Export,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug, cli.quiet)?;

    match cli.command {
        Commands::Run => {
            let mut execution = demo::sample_execution()?;
            let status = execution.execute()?;
            println!("status: {status}");
            println!("nodes completed: {}", execution.executed_trace().len());
            for (key, value) in execution.state() {
                println!("  {} -> {}", key, value);
            }
        }

        Commands::Dump => {
            let execution = demo::sample_execution()?;
            let mut dump = DumpVisitor::new();
            execution.accept(&mut dump)?;
            println!("{}", dump.to_json()?);
        }

        Commands::Export => {
            let execution = demo::sample_execution()?;
            let mut exporter = DotExporter::new();
            execution.accept(&mut exporter)?;
            println!("{}", exporter.render());
        }
    }

    Ok(())
}
