//! Count report rendering and publishing.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::model::CountReport;
use crate::infra::clipboard::Clipboard;
use crate::infra::config::Config;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Markdown document with a per-folder table.
    Markdown,
    /// Plain text report.
    Plain,
}

impl ReportFormat {
    /// Stable identifier for configuration and templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Plain => "plain",
        }
    }

    /// Recommended file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Plain => "txt",
        }
    }

    fn template_name(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown_report",
            ReportFormat::Plain => "plain_report",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" | "commonmark" => Ok(ReportFormat::Markdown),
            "plain" | "text" | "txt" => Ok(ReportFormat::Plain),
            other => Err(ReportFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`ReportFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ReportFormatParseError {
    #[error("unknown report format '{0}'")]
    UnknownFormat(String),
}

/// Runtime options controlling report output.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub output_path: Option<PathBuf>,
    pub copy_to_clipboard: bool,
}

impl ReportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        let format =
            <ReportFormat as FromStr>::from_str(&config.defaults.report_format)
                .unwrap_or(ReportFormat::Markdown);
        Self {
            format,
            output_path: None,
            copy_to_clipboard: false,
        }
    }
}

/// Result of publishing a report.
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub rendered: String,
    pub output_path: Option<PathBuf>,
    pub copied_to_clipboard: bool,
}

/// Renders count reports and writes/copies the artifacts.
pub struct Reporter {
    env: Environment<'static>,
    clipboard: Mutex<Clipboard>,
}

impl Reporter {
    /// Create a new reporter with built-in templates loaded.
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: default_environment()?,
            clipboard: Mutex::new(Clipboard::new()),
        })
    }

    /// Render the report into a string using the selected format.
    pub fn render(&self, report: &CountReport, options: &ReportOptions) -> Result<String> {
        let context = build_template_context(report)?;
        let name = options.format.template_name();
        let template = self
            .env
            .get_template(name)
            .map_err(|err| anyhow!("report template '{name}' missing: {err}"))?;
        template
            .render(&context)
            .map_err(|err| anyhow!("failed to render report template '{name}': {err}"))
    }

    /// Render the report and persist/copy outputs based on options.
    pub fn publish(&self, report: &CountReport, options: &ReportOptions) -> Result<ReportResult> {
        let rendered = self.render(report, options)?;

        if let Some(path) = &options.output_path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory: {}", parent.display())
                })?;
            }
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }

        if options.copy_to_clipboard {
            self.clipboard
                .lock()
                .unwrap()
                .copy(&rendered)
                .context("failed to copy report to clipboard")?;
        }

        Ok(ReportResult {
            rendered,
            output_path: options.output_path.clone(),
            copied_to_clipboard: options.copy_to_clipboard,
        })
    }
}

fn default_environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("markdown_report", MARKDOWN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register markdown report template: {err}"))?;
    env.add_template("plain_report", PLAIN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register plain report template: {err}"))?;
    Ok(env)
}

fn build_template_context(report: &CountReport) -> Result<TemplateContext> {
    let generated_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format report timestamp")?;

    let folders = report
        .folders
        .iter()
        .map(|folder| TemplateFolder {
            path: folder.display_path.clone(),
            steps: folder.steps,
            files: folder.files,
        })
        .collect();

    Ok(TemplateContext {
        generated_at,
        folders,
        total_steps: report.total_steps,
        total_files: report.total_files(),
    })
}

#[derive(Serialize)]
struct TemplateContext {
    generated_at: String,
    folders: Vec<TemplateFolder>,
    total_steps: usize,
    total_files: usize,
}

#[derive(Serialize)]
struct TemplateFolder {
    path: String,
    steps: usize,
    files: usize,
}

const MARKDOWN_TEMPLATE: &str = r#"# Logical Step Count

Generated at: {{ generated_at }}

| Folder | Files | Steps |
| --- | ---: | ---: |
{% for folder in folders %}
| {{ folder.path }} | {{ folder.files }} | {{ folder.steps }} |
{% endfor %}

**Total: {{ total_steps }} steps across {{ total_files }} files**
"#;

const PLAIN_TEMPLATE: &str = r#"Logical step count generated at {{ generated_at }}

{% for folder in folders %}
{{ folder.path }}: {{ folder.steps }} steps ({{ folder.files }} files)
{% endfor %}
Total: {{ total_steps }} steps across {{ total_files }} files
"#;
