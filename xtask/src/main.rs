use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Generate a small demo source tree for exercising the selector
    Fixtures {
        /// Where to create the tree
        #[arg(long, default_value = "fixtures/demo")]
        dest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::Fixtures { dest } => generate_fixtures(&dest)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn generate_fixtures(dest: &PathBuf) -> Result<()> {
    fs::create_dir_all(dest.join("src/core"))?;
    fs::create_dir_all(dest.join("notebooks"))?;
    fs::create_dir_all(dest.join("docs"))?;

    fs::write(
        dest.join("src/main.py"),
        "# demo entry point\n\ndef main():\n    value = compute()\n    print(value)\n",
    )?;
    fs::write(
        dest.join("src/core/lib.c"),
        "int add(int a, int b) {\n    return a + b;\n}\n",
    )?;
    fs::write(dest.join("docs/guide.md"), "# Guide\n\nNothing counted here.\n")?;

    let notebook = json!({
        "cells": [
            {"cell_type": "markdown", "source": ["# Analysis\n"]},
            {"cell_type": "code", "source": ["total = 0\n", "for n in range(10):\n", "    total += n\n"]}
        ],
        "nbformat": 4,
        "nbformat_minor": 5
    });
    fs::write(
        dest.join("notebooks/analysis.ipynb"),
        serde_json::to_string_pretty(&notebook)?,
    )?;

    println!("fixture tree written to {}", dest.display());
    Ok(())
}
