use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use dx_core::dataset::Dataset;
use dx_core::history::SqliteHistory;
use dx_core::logging::{init_logging, LogConfig, LogFormat};
use dx_core::persistence::{save_encoders, save_model};
use dx_core::training::{train, TrainOptions};
use dx_core::{Diagnosis, DiagnosisEngine, DxConfig, PredictError};

#[derive(Parser)]
#[command(
    name = "dx_engine",
    version,
    about = "Predict the most likely disease from a set of symptoms"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    paths: PathArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatArg,

    /// Allow symptom names to appear in logs.
    #[arg(long = "log-data", global = true)]
    log_data: bool,
}

#[derive(Args)]
struct PathArgs {
    /// Directory holding artifacts, dataset and history database.
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    dir: PathBuf,

    /// Model artifact (default: <DIR>/model.bin).
    #[arg(long, value_name = "PATH", global = true)]
    model: Option<PathBuf>,

    /// Encoder artifact (default: <DIR>/encoders.bin).
    #[arg(long, value_name = "PATH", global = true)]
    encoders: Option<PathBuf>,

    /// Training dataset (default: <DIR>/dataset.csv).
    #[arg(long, value_name = "PATH", global = true)]
    dataset: Option<PathBuf>,

    /// History database (default: <DIR>/disease_prediction.db).
    #[arg(long, value_name = "PATH", global = true)]
    database: Option<PathBuf>,
}

impl PathArgs {
    fn config(&self) -> DxConfig {
        let mut config = DxConfig::in_dir(&self.dir);
        if let Some(path) = &self.model {
            config.model_path = path.clone();
        }
        if let Some(path) = &self.encoders {
            config.encoders_path = path.clone();
        }
        if let Some(path) = &self.dataset {
            config.dataset_path = path.clone();
        }
        if let Some(path) = &self.database {
            config.database_path = path.clone();
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fit encoders and model from the dataset and save them.
    Train(TrainArgs),

    /// Predict a disease from three or more symptoms.
    Predict(PredictArgs),

    /// Show recorded predictions, newest first.
    History,

    /// List the symptoms the model knows.
    Symptoms,
}

#[derive(Args)]
struct TrainArgs {
    /// Share of rows held out to measure accuracy.
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Seed of the holdout shuffle.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Additive smoothing of the naive Bayes counts.
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,
}

#[derive(Args)]
struct PredictArgs {
    /// Symptom names in slot order; only the first four are used.
    #[arg(required = true, value_name = "SYMPTOM")]
    symptoms: Vec<String>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Do not record the prediction in the history database.
    #[arg(long = "no-history")]
    no_history: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_format(format)
            .with_ansi(io::stderr().is_terminal())
            .with_log_data(cli.log_data),
    );

    let config = cli.paths.config();
    let result = match &cli.command {
        Command::Train(args) => run_train(&config, args),
        Command::Predict(args) => run_predict(&config, args),
        Command::History => run_history(&config),
        Command::Symptoms => run_symptoms(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::from(2)
        }
        Err(CliError::Failed(message)) => {
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

enum CliError {
    /// The user can fix the request.
    Usage(String),
    Failed(String),
}

impl<E: std::error::Error> From<E> for CliError {
    fn from(err: E) -> Self {
        CliError::Failed(err.to_string())
    }
}

fn run_train(config: &DxConfig, args: &TrainArgs) -> Result<(), CliError> {
    let dataset = Dataset::from_csv(&config.dataset_path)?;
    let options = TrainOptions {
        test_fraction: args.test_fraction,
        seed: args.seed,
        alpha: args.alpha,
    };
    let artifacts = train(&dataset, options)?;
    save_model(&artifacts.model, &config.model_path)?;
    save_encoders(&artifacts.store, &config.encoders_path)?;

    if let Some(accuracy) = artifacts.report.accuracy {
        println!("Model Accuracy: {:.2}%", accuracy * 100.0);
    }
    println!(
        "{} {} and {}",
        "Saved".green().bold(),
        config.model_path.display(),
        config.encoders_path.display()
    );
    Ok(())
}

fn run_predict(config: &DxConfig, args: &PredictArgs) -> Result<(), CliError> {
    let engine = DiagnosisEngine::load(config);
    let diagnosis = if args.no_history {
        engine.predict(args.symptoms.as_slice())
    } else {
        match SqliteHistory::open(&config.database_path) {
            Ok(history) => engine.predict_and_record(args.symptoms.as_slice(), &history),
            Err(err) => {
                tracing::warn!(error = %err, "history store unavailable, prediction not recorded");
                engine.predict(args.symptoms.as_slice())
            }
        }
    };

    let diagnosis = diagnosis.map_err(|err| match err {
        PredictError::InsufficientSymptoms(_) => CliError::Usage(err.to_string()),
        PredictError::Unavailable { .. } => CliError::Failed(format!(
            "{err}\nhint: run `dx_engine train` to create the model"
        )),
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    } else {
        print_diagnosis(&diagnosis);
    }
    Ok(())
}

fn print_diagnosis(diagnosis: &Diagnosis) {
    println!("Symptoms: {}", diagnosis.symptoms.join(", "));
    println!(
        "Predicted disease: {} ({:.2}%)",
        diagnosis.predicted_disease.as_str().bold().cyan(),
        diagnosis.probability
    );
    println!("\nTop 3:");
    for (i, ranked) in diagnosis.top3.iter().enumerate() {
        println!("  {}. {} ({:.2}%)", i + 1, ranked.disease, ranked.percent);
    }
}

fn run_history(config: &DxConfig) -> Result<(), CliError> {
    let records = SqliteHistory::open(&config.database_path)?.recent()?;
    if records.is_empty() {
        println!("No predictions recorded yet.");
        return Ok(());
    }
    for record in records {
        println!(
            "{:>4}  {}  {} ({:.2}%)  [{}]",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.predicted_disease.as_str().bold(),
            record.probability,
            record.symptoms
        );
    }
    Ok(())
}

fn run_symptoms(config: &DxConfig) -> Result<(), CliError> {
    let engine = DiagnosisEngine::load(config);
    if let Some(reason) = engine.unavailable_reason() {
        return Err(CliError::Failed(reason.to_string()));
    }
    for symptom in engine.symptoms() {
        println!("{symptom}");
    }
    Ok(())
}
