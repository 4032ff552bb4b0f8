use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, WrapErr};
use serde::Deserialize;

use dh_statblock::config::ImporterConfig;
use dh_statblock::core::compendium::CompendiumIndex;
use dh_statblock::core::logging::{self, ColorPalette};
use dh_statblock::ingestion::ttrpg::document::to_document;
use dh_statblock::ingestion::ttrpg::export::export_statblock;
use dh_statblock::ingestion::ttrpg::preview::render_preview;
use dh_statblock::ingestion::ttrpg::{import_text, EntityKind, ImportReport, ParsedEntity, SeparatorMode};

#[derive(Parser)]
#[command(name = "dh-statblock")]
#[command(about = "Daggerheart statblock importer", long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose per-chunk logging
    #[arg(long, global = true, env = "DH_STATBLOCK_DEBUG")]
    debug: bool,

    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse statblocks and print host documents as JSON
    #[command(visible_alias = "i")]
    Import(ImportArgs),

    /// Parse statblocks and print what was found in each one
    #[command(visible_alias = "v")]
    Validate(ImportArgs),

    /// Format parsed adversaries or environments back into statblock text
    #[command(visible_alias = "e")]
    Export {
        /// JSON file holding one parsed entity or an array of them
        input: Option<PathBuf>,

        /// Adversary index files used to name potential adversaries
        #[arg(long, num_args = 1..)]
        adversaries: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct ImportArgs {
    /// Text file with pasted statblocks (reads stdin if omitted)
    input: Option<PathBuf>,

    /// Kind of statblock (adversary, environment, weapon, armor, feature,
    /// domain-card, loot, consumable)
    #[arg(short, long)]
    kind: Option<EntityKind>,

    /// How multiple statblocks are separated (blank-line or separator)
    #[arg(short, long)]
    separator: Option<SeparatorMode>,

    /// Feature index files, in selection order
    #[arg(long, num_args = 1..)]
    features: Vec<PathBuf>,

    /// Adversary index files, in selection order
    #[arg(long, num_args = 1..)]
    adversaries: Vec<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityInput {
    Many(Vec<ParsedEntity>),
    One(Box<ParsedEntity>),
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ImporterConfig::load_from(path),
        None => ImporterConfig::load(),
    }
    .into_diagnostic()
    .wrap_err("Failed to load configuration")?;

    let _log_guard = logging::init(cli.debug || config.debug, &ImporterConfig::log_dir());
    log::info!("{} v{} starting", dh_statblock::NAME, dh_statblock::VERSION);

    match cli.command {
        Commands::Import(args) => {
            let report = run_import(&args, &config)?;
            let documents: Vec<_> = report
                .successes()
                .map(|entity| to_document(entity, &config.import_options(Some(report.kind))))
                .collect();
            let json = serde_json::to_string_pretty(&documents).into_diagnostic()?;
            println!("{json}");
            print_summary(&report);
        }
        Commands::Validate(args) => {
            let report = run_import(&args, &config)?;
            let caps = logging::terminal_caps();
            let palette = ColorPalette::default();
            println!("{}", palette.preview(&render_preview(&report), caps.should_colorize()));
        }
        Commands::Export { input, adversaries } => {
            let index = load_index(&[], &adversaries, &config)?;
            let text = read_input(input.as_deref())?;
            let entities = match serde_json::from_str::<EntityInput>(&text)
                .into_diagnostic()
                .wrap_err("Input is not a parsed entity or an array of them")?
            {
                EntityInput::Many(entities) => entities,
                EntityInput::One(entity) => vec![*entity],
            };

            let blocks: Vec<String> = entities
                .iter()
                .filter_map(|entity| {
                    let block = export_statblock(entity, &index);
                    if block.is_none() {
                        log::warn!("Skipping '{}': only actors can be exported", entity.name);
                    }
                    block
                })
                .collect();
            println!("{}", blocks.join("\n\n"));
        }
    }

    Ok(())
}

fn run_import(args: &ImportArgs, config: &ImporterConfig) -> miette::Result<ImportReport> {
    let index = load_index(&args.features, &args.adversaries, config)?;

    let mut options = config.import_options(args.kind);
    if let Some(mode) = args.separator {
        options = options.with_separator(mode);
    }

    let text = read_input(args.input.as_deref())?;
    Ok(import_text(&text, &options, &index))
}

/// Command-line index files replace the configured ones for that kind.
fn load_index(
    features: &[PathBuf],
    adversaries: &[PathBuf],
    config: &ImporterConfig,
) -> miette::Result<CompendiumIndex> {
    let features: &[PathBuf] = if features.is_empty() {
        &config.compendium.feature_indexes
    } else {
        features
    };
    let adversaries: &[PathBuf] = if adversaries.is_empty() {
        &config.compendium.adversary_indexes
    } else {
        adversaries
    };

    let index = CompendiumIndex::load(features, adversaries)?;
    log::debug!(
        "Compendium index ready: {} features, {} adversaries",
        index.feature_count(),
        index.adversary_count()
    );
    Ok(index)
}

fn read_input(path: Option<&Path>) -> miette::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()
                .wrap_err("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn print_summary(report: &ImportReport) {
    let palette = ColorPalette::default();
    for failure in report.failures() {
        eprintln!(
            "{} #{} {}: {}",
            palette.warning("Skipped"),
            failure.chunk_index,
            failure.first_line_excerpt,
            failure.message
        );
    }

    let summary = report.summary();
    if report.failures().next().is_some() {
        eprintln!("{}", palette.warning(&summary));
    } else {
        eprintln!("{}", palette.success(&summary));
    }
}
