use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Tasks for the project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the workspace
    Build,
    /// Run all tests
    Test,
    /// Query the simulated supervisor through the CLI
    Demo,
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Build => {
            println!("Building workspace...");
            cargo(&["build", "--workspace"])?;
        }
        Commands::Test => {
            println!("Running tests...");
            cargo(&["test", "--workspace"])?;
        }
        Commands::Demo => {
            println!("Running CLI against the simulator...");
            for sub in ["version", "housekeeping", "power-cycle"] {
                cargo(&["run", "-q", "-p", "iobc-supervisor-cli", "--", sub])?;
            }
            cargo(&[
                "run",
                "-q",
                "-p",
                "iobc-supervisor-cli",
                "--",
                "--inject-faults",
                "2",
                "--retries",
                "2",
                "housekeeping",
            ])?;
        }
    }

    Ok(())
}
