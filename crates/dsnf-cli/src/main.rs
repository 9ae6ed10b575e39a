//! DSNF CLI - Command-line interface
//!
//! Usage:
//!   dsnf extract <input.conll> [-o triples.jsonl] [-c config.toml]
//!   dsnf entities <input.conll> [-c config.toml]
//!   dsnf config [-c config.toml]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dsnf_core::config::{AppConfig, LoggingConfig};
use dsnf_extractor::{split_conll_document, ConllParser, Extractor, JsonlSink, TripleSink};

#[derive(Parser)]
#[command(name = "dsnf")]
#[command(about = "Dependency-pattern triple extraction for Chinese text")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract triples from a CoNLL file as JSON Lines
    Extract {
        /// Parsed sentences, one CoNLL block per sentence
        input: PathBuf,
        /// Append triples to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the entities detected in each sentence
    Entities {
        /// Parsed sentences, one CoNLL block per sentence
        input: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Extract { input, output } => {
            let output = output.or_else(|| config.output.path.clone());
            extract(&config, &input, output.as_deref())?;
        }
        Commands::Entities { input } => {
            entities(&config, &input)?;
        }
        Commands::Config => {
            config.validate()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Log to stderr so stdout stays free for triples
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("dsnf={0},dsnf_extractor={0}", logging.level)))
        .context("invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn read_blocks(input: &Path) -> anyhow::Result<Vec<String>> {
    let document = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    Ok(split_conll_document(&document))
}

fn extract(config: &AppConfig, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let blocks = read_blocks(input)?;
    let mut extractor = Extractor::from_config(Box::new(ConllParser::new()), config)?;

    match output {
        Some(path) => {
            let mut sink = JsonlSink::create(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            run_extraction(&mut extractor, &blocks, &mut sink)
        }
        None => {
            let stdout = std::io::stdout();
            let mut sink = JsonlSink::new(stdout.lock());
            run_extraction(&mut extractor, &blocks, &mut sink)
        }
    }
}

fn run_extraction(
    extractor: &mut Extractor,
    blocks: &[String],
    sink: &mut dyn TripleSink,
) -> anyhow::Result<()> {
    let report = extractor.extract_document(blocks, sink)?;
    eprintln!(
        "{} triples from {} sentences ({} skipped), {} sequence ids issued",
        report.written,
        report.stats.sentences,
        report.skipped,
        extractor.context().issued()
    );
    Ok(())
}

fn entities(config: &AppConfig, input: &Path) -> anyhow::Result<()> {
    let blocks = read_blocks(input)?;
    let extractor = Extractor::from_config(Box::new(ConllParser::new()), config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (index, block) in blocks.iter().enumerate() {
        let sentence = match extractor.parse(block) {
            Ok(sentence) => sentence,
            Err(e) => {
                tracing::warn!(sentence = index, error = %e, "skipping sentence");
                continue;
            }
        };
        let found: Vec<&str> = extractor
            .detector()
            .get_entities(&sentence)
            .iter()
            .map(|w| w.lemma.as_str())
            .collect();
        let line = serde_json::json!({ "sentence": sentence.text, "entities": found });
        writeln!(out, "{line}")?;
    }
    Ok(())
}
