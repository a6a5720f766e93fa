use clap::{Parser, Subcommand};
use melody_timeseries::config::{load_config, PipelineConfig};
use melody_timeseries::pipeline::save_report;
use melody_timeseries::{KernSource, NpySink, Pipeline, PipelineError};
use std::path::PathBuf;

/// Folk-song melody dataset preparation
#[derive(Parser)]
#[command(name = "prepare-dataset")]
#[command(about = "Encode Humdrum folk songs into next-token training data")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage and write the training tensors
    Run {
        /// Configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory searched for .krn files
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Directory for the encoded songs
        #[arg(long)]
        songs_dir: Option<PathBuf>,

        /// Corpus file
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Vocabulary file
        #[arg(long)]
        mappings: Option<PathBuf>,

        /// Training window width
        #[arg(long)]
        sequence_length: Option<usize>,

        /// Output directory for inputs.npy and targets.npy
        #[arg(short, long, default_value = "./tensors")]
        output: PathBuf,

        /// Write the preprocessing report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the effective configuration before running
        #[arg(long)]
        show_config: bool,
    },
    /// Only encode the scores into the songs directory
    Preprocess {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config: PathBuf,
    },
    /// Show default configuration
    ShowConfig,
}

fn base_config(path: Option<PathBuf>) -> melody_timeseries::Result<PipelineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<(), PipelineError> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            dataset,
            songs_dir,
            corpus,
            mappings,
            sequence_length,
            output,
            report,
            show_config,
        } => {
            let mut config = base_config(config)?;
            if let Some(dataset) = dataset {
                config.dataset_path = dataset;
            }
            if let Some(songs_dir) = songs_dir {
                config.songs_dir = songs_dir;
            }
            if let Some(corpus) = corpus {
                config.universal_dataset = corpus;
            }
            if let Some(mappings) = mappings {
                config.mappings_path = mappings;
            }
            if let Some(sequence_length) = sequence_length {
                config.sequence_length = sequence_length;
            }

            if show_config {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }

            let pipeline = Pipeline::new(config)?;
            let mut sink = NpySink::new(&output);
            let summary = pipeline.run(&KernSource, &mut sink)?;

            if let Some(path) = report {
                save_report(&summary.report, path)?;
            }

            println!(
                "{} of {} scores accepted, {} corpus tokens, vocabulary of {}, {} sequences written to {}",
                summary.report.accepted.len(),
                summary.report.discovered,
                summary.corpus_tokens,
                summary.vocabulary_size,
                summary.sequences,
                output.display()
            );
        }
        Commands::Preprocess { config } => {
            let pipeline = Pipeline::new(base_config(config)?)?;
            let report = pipeline.preprocess(&KernSource)?;
            println!(
                "{} of {} scores accepted",
                report.accepted.len(),
                report.discovered
            );
        }
        Commands::ValidateConfig { config } => {
            let config = load_config(config)?;
            println!("Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::ShowConfig => {
            let config = PipelineConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
