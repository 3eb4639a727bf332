use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use homeport::config::AppConfig;
use homeport::{stack_order, synth_all};

#[derive(Parser)]
#[command(name = "homeport")]
#[command(about = "Declarative AWS infrastructure for the home portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the Terraform-JSON plans
    Synth {
        /// Directory the plans are written to
        #[arg(short, long, default_value = "homeport.out")]
        out_dir: PathBuf,
    },
    /// List the stacks in apply order
    Stacks,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::default();

    match cli.command {
        Commands::Synth { out_dir } => {
            let output = synth_all(&config, &out_dir)?;
            println!("{}", "Synthesized plans (apply in this order):".bold());
            for stack in output.stacks() {
                println!(
                    "  {} {} ({} resources) -> {}",
                    "✓".green(),
                    stack.name.cyan(),
                    stack.resource_count,
                    stack.path.display()
                );
            }
        }
        Commands::Stacks => {
            for name in stack_order(&config)? {
                println!("{name}");
            }
        }
    }
    Ok(())
}
