//! Command line interface.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::count::StepCounter;
use crate::app::report::{ReportFormat, ReportOptions, Reporter};
use crate::infra::config::Config;
use crate::ui::app::UiApp;

/// Estimate logical step counts across source trees.
#[derive(Debug, Parser)]
#[command(name = "stepcount", version, about)]
pub struct Cli {
    /// Directory to browse in the interactive selector. Defaults to the
    /// working directory.
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Count logical steps in the given directories without the UI.
    Count {
        /// Directories to count. Defaults to the working directory. Each
        /// directory is counted independently; overlapping directories
        /// double-count.
        dirs: Vec<PathBuf>,
        /// Report format for stdout.
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        /// Also write the rendered report to this path.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Copy the rendered report to the clipboard.
        #[arg(long)]
        copy: bool,
    },
    /// Emit a shell completion script on stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Dispatch the parsed invocation.
    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Count {
                dirs,
                format,
                output,
                copy,
            }) => run_count(dirs, format, output, copy),
            Some(Command::Completions { shell }) => {
                let mut command = Cli::command();
                let name = command.get_name().to_string();
                clap_complete::generate(shell, &mut command, name, &mut io::stdout());
                Ok(())
            }
            None => {
                let mut app = UiApp::default();
                app.run(self.root)
            }
        }
    }
}

fn run_count(
    dirs: Vec<PathBuf>,
    format: Option<ReportFormat>,
    output: Option<PathBuf>,
    copy: bool,
) -> Result<()> {
    let config = Config::load()?;
    let dirs = if dirs.is_empty() {
        vec![std::env::current_dir().context("unable to determine working directory")?]
    } else {
        dirs
    };

    let counter = StepCounter::from_config(&config);
    let report = counter.count_folders(&dirs);

    let mut options = ReportOptions::from_config(&config);
    if let Some(format) = format {
        options.format = format;
    }
    options.output_path = output;
    options.copy_to_clipboard = copy;

    let reporter = Reporter::new()?;
    let result = reporter.publish(&report, &options)?;
    println!("{}", result.rendered);
    Ok(())
}
