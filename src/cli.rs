//! Command-line interface for cellshape.
//!
//! This module handles CLI argument parsing and the `echo`, `fonts`,
//! `examples` and `version` subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cellshape_config::Config;
use cellshape_fonts::Direction;
use clap::{CommandFactory, Parser, Subcommand};

use crate::console::Console;
use crate::host::{self, WidthStrategy};
use crate::measure::px_to_cells;
use crate::{pipeline, width_override};

/// cellshape - shaping-aware terminal cell widths for complex scripts
#[derive(Parser)]
#[command(name = "cellshape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Config file to use instead of ~/.config/cellshape/config.yaml
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print text with and without cluster-aware widths
    Echo {
        /// Text to print
        text: String,

        /// Script tag for shaping (e.g. arab, deva, telu); detected when omitted
        #[arg(long)]
        script: Option<String>,

        /// Text direction (ltr or rtl)
        #[arg(long, default_value = "ltr")]
        direction: Direction,

        /// Language tag for shaping (defaults to the configured language)
        #[arg(long)]
        language: Option<String>,

        /// Print the cluster breakdown
        #[arg(long)]
        debug: bool,

        /// Do not insert hair spaces after complex-script characters
        #[arg(long)]
        no_improve: bool,
    },

    /// List available fonts
    Fonts {
        /// Only fonts for this script tag (e.g. arab, deva)
        #[arg(long)]
        script: Option<String>,
    },

    /// Show sample texts in several scripts
    Examples,

    /// Show version information
    Version,
}

/// Sample texts shown by `examples`: name, text, script tag
const EXAMPLES: &[(&str, &str, Option<&str>)] = &[
    ("Telugu", "తెలుగు", Some("telu")),
    ("Hindi", "हिन्दी", Some("deva")),
    ("Arabic", "مرحبا", Some("arab")),
    ("Tamil", "தமிழ்", Some("taml")),
    ("Mixed", "English, తెలుగు, हिन्दी, مرحبا", None),
];

/// Run the parsed command line; returns the process exit code
pub fn run(cli: Cli) -> Result<i32> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(1);
    };

    if let Commands::Version = command {
        println!("cellshape version {}", crate::VERSION);
        return Ok(0);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    crate::debug::apply_config_level(config.log_level.to_level_filter());
    pipeline::init_global(&config);

    match command {
        Commands::Echo {
            text,
            script,
            direction,
            language,
            debug,
            no_improve,
        } => {
            let language = language.unwrap_or_else(|| config.language.clone());
            echo_command(
                &config,
                &text,
                EchoOptions {
                    script: script.as_deref(),
                    direction,
                    language: &language,
                    debug,
                    improve: config.improve_display && !no_improve,
                },
            )?;
        }
        Commands::Fonts { script } => fonts_command(script.as_deref())?,
        Commands::Examples => examples_command(&config)?,
        Commands::Version => {}
    }
    Ok(0)
}

struct EchoOptions<'a> {
    script: Option<&'a str>,
    direction: Direction,
    language: &'a str,
    debug: bool,
    improve: bool,
}

fn echo_command(config: &Config, text: &str, options: EchoOptions<'_>) -> Result<()> {
    debug_info!(
        "ECHO",
        "{} bytes, script {:?}, {}",
        text.len(),
        options.script,
        options.direction
    );
    width_override::install()?;

    let mut console = Console::stdout().with_improve_display(options.improve);
    console.println("With cellshape:")?;
    console.println(text)?;
    console.println(&format!("Width: {} cells", console.cell_len(text)))?;

    let pristine: Arc<dyn WidthStrategy> = host::pristine();
    let mut plain = Console::stdout()
        .with_strategy(Arc::clone(&pristine))
        .with_improve_display(false);
    plain.blank_line()?;
    plain.println("Without cellshape:")?;
    plain.println(text)?;
    plain.println(&format!("Width: {} cells", pristine.cell_len(text)))?;

    if options.debug {
        let clusters =
            pipeline::shape_text(text, options.direction, options.script, options.language)?;

        plain.blank_line()?;
        plain.println("Debug information:")?;
        plain.println(&format!("Script: {}", options.script.unwrap_or("auto")))?;
        plain.println(&format!("Direction: {}", options.direction))?;
        plain.println(&format!("Language: {}", options.language))?;

        for (i, cluster) in clusters.iter().enumerate() {
            let cells = px_to_cells(cluster.advance_px, config.cell_width_px)?;
            plain.println(&format!(
                "Cluster {}: '{}' - {}px - {} cells",
                i + 1,
                cluster.text,
                cluster.advance_px,
                cells
            ))?;
        }

        let total_px: i32 = clusters
            .iter()
            .fold(0i32, |sum, c| sum.saturating_add(c.advance_px));
        let total_cells = px_to_cells(total_px, config.cell_width_px)?;
        plain.blank_line()?;
        plain.println(&format!("Total width: {total_px}px - {total_cells} cells"))?;
    }

    console.flush()?;
    plain.flush()?;
    Ok(())
}

fn fonts_command(script: Option<&str>) -> Result<()> {
    let fonts = pipeline::shape_cache()
        .engine()
        .resolver()
        .list_fonts(script);
    debug_log!("FONTS", "{} families for {:?}", fonts.len(), script);

    let mut console = Console::stdout().with_improve_display(false);
    match script {
        Some(tag) => console.println(&format!("Available fonts for script '{tag}':"))?,
        None => console.println("Available fonts:")?,
    }

    if fonts.is_empty() {
        console.println("No matching fonts found.")?;
    } else {
        for font in &fonts {
            console.println(&format!("- {font}"))?;
        }
        console.blank_line()?;
        console.println(&format!("Found {} fonts.", fonts.len()))?;
    }
    Ok(())
}

fn examples_command(config: &Config) -> Result<()> {
    width_override::install()?;

    let mut console = Console::stdout().with_improve_display(config.improve_display);
    let pristine = host::pristine();

    let header = ["Name", "Script", "Text", "Cells", "Codepoint cells"];
    let rows: Vec<[String; 5]> = EXAMPLES
        .iter()
        .map(|(name, text, script)| {
            [
                name.to_string(),
                script.unwrap_or("mixed").to_string(),
                text.to_string(),
                console.cell_len(text).to_string(),
                pristine.cell_len(text).to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| console.display_len(h));
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(console.display_len(cell));
        }
    }

    console.println("Example texts:")?;
    console.blank_line()?;
    let header_row: Vec<(&str, usize)> = header.iter().copied().zip(widths).collect();
    console.print_row(&header_row)?;
    for row in &rows {
        let columns: Vec<(&str, usize)> = row.iter().map(String::as_str).zip(widths).collect();
        console.print_row(&columns)?;
    }
    console.flush()?;
    Ok(())
}
