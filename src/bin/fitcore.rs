//! Fitcore CLI - Command-line interface for Fitness Insight
//!
//! Commands:
//! - register / update / plan / profile / delete: Maintain profiles in a JSON store
//! - bmi / calories: Body metrics and calorie targets for a profile
//! - insights: Health insights with cohort percentile and recommendation
//! - research: Researcher registration and anonymized population aggregations
//! - doctor: Diagnose store and configuration health

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fitness_insight::calculator::{bmi_report, calorie_plan};
use fitness_insight::config::{MIN_COHORT_SIZE_ENV, MIN_SAMPLE_SIZE_ENV};
use fitness_insight::plan_details::plan_details;
use fitness_insight::{
    profiles, research, ClientId, FitnessGoal, Gender, GoalPlan, InMemoryProfileStore,
    InMemoryResearcherStore, InsightConfig, InsightEngine, InsightError, InsightResult,
    NewProfile, NewResearcher, PlanDetails, PlanStrategy, ProfileStore, ResearchConfig,
    ENGINE_VERSION, PRODUCER_NAME,
};

/// Fitcore - Health insight scoring for fitness profiles
#[derive(Parser)]
#[command(name = "fitcore")]
#[command(author = "TeamX Fitness")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score fitness profiles and report health insights", long_about = None)]
struct Cli {
    /// JSON file holding the profile store
    #[arg(long, env = "FITNESS_STORE", default_value = "profiles.json", global = true)]
    store: PathBuf,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new profile under a fresh mobile client id
    Register {
        #[command(flatten)]
        metrics: MetricsArgs,
    },

    /// Replace the body metrics of a profile
    Update {
        #[command(flatten)]
        client: ClientArg,

        #[command(flatten)]
        metrics: MetricsArgs,
    },

    /// Attach or replace a profile's goal plan
    Plan {
        #[command(flatten)]
        client: ClientArg,

        /// Body composition goal
        #[arg(long, value_enum)]
        goal: GoalArg,

        /// Plan strategy
        #[arg(long, value_enum)]
        strategy: StrategyArg,

        /// Target weight change in kilograms
        #[arg(long)]
        target_change: f64,

        /// Plan duration in weeks
        #[arg(long)]
        weeks: u32,

        /// Training sessions per week
        #[arg(long, default_value = "0")]
        frequency: u32,
    },

    /// Show a stored profile
    Profile {
        #[command(flatten)]
        client: ClientArg,
    },

    /// Delete a profile
    Delete {
        #[command(flatten)]
        client: ClientArg,
    },

    /// Report BMI and its category
    Bmi {
        #[command(flatten)]
        client: ClientArg,
    },

    /// Report BMR and daily calorie targets
    Calories {
        #[command(flatten)]
        client: ClientArg,
    },

    /// Build health insights for a profile
    Insights {
        #[command(flatten)]
        client: ClientArg,

        /// Minimum cohort size for percentiles (overrides FITNESS_MIN_COHORT_SIZE)
        #[arg(long)]
        min_cohort_size: Option<usize>,
    },

    /// Anonymized population aggregations
    Research {
        #[command(subcommand)]
        command: ResearchCommands,
    },

    /// Diagnose store and configuration health
    Doctor,
}

#[derive(Subcommand)]
enum ResearchCommands {
    /// Register a research client and print its client id
    Register {
        /// Researcher or lab name
        #[arg(long)]
        name: String,

        /// Contact email, unique per researcher
        #[arg(long)]
        email: String,

        /// JSON file holding registered researchers
        #[arg(long, env = "FITNESS_RESEARCHERS", default_value = "researchers.json")]
        researchers: PathBuf,
    },

    /// Age, gender and body metric distribution
    Demographics {
        #[command(flatten)]
        client: ClientArg,
    },

    /// BMI and plan metrics per fitness goal
    PopulationHealth {
        #[command(flatten)]
        client: ClientArg,
    },
}

#[derive(clap::Args)]
struct ClientArg {
    /// Client id (mobile-... or research-...)
    #[arg(long = "client", env = "FITNESS_CLIENT_ID")]
    id: String,
}

impl ClientArg {
    fn client_id(&self) -> Result<ClientId, InsightError> {
        ClientId::parse(&self.id)
    }
}

#[derive(clap::Args)]
struct MetricsArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Weight in kilograms
    #[arg(long)]
    weight: f64,

    /// Height in centimeters
    #[arg(long)]
    height: f64,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    birth_date: NaiveDate,

    #[arg(long, value_enum)]
    gender: Option<GenderArg>,
}

impl From<MetricsArgs> for NewProfile {
    fn from(args: MetricsArgs) -> Self {
        NewProfile {
            name: args.name,
            weight_kg: args.weight,
            height_cm: args.height,
            birth_date: args.birth_date,
            gender: args.gender.map(Gender::from),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GoalArg {
    /// Lose weight
    Cut,
    /// Gain weight
    Bulk,
}

impl From<GoalArg> for FitnessGoal {
    fn from(arg: GoalArg) -> Self {
        match arg {
            GoalArg::Cut => FitnessGoal::Cut,
            GoalArg::Bulk => FitnessGoal::Bulk,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Workout,
    Diet,
    Both,
}

impl From<StrategyArg> for PlanStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Workout => PlanStrategy::Workout,
            StrategyArg::Diet => PlanStrategy::Diet,
            StrategyArg::Both => PlanStrategy::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    let today = chrono::Local::now().date_naive();
    let store_path = cli.store.as_path();

    match cli.command {
        Commands::Register { metrics } => {
            let store = load_store(store_path)?;
            let saved = profiles::register(&store, metrics.into(), today)?;
            save_store(store_path, &store)?;
            emit(&saved)
        }
        Commands::Update { client, metrics } => {
            let store = load_store(store_path)?;
            let saved = profiles::update_metrics(&store, &client.client_id()?, metrics.into(), today)?;
            save_store(store_path, &store)?;
            emit(&saved)
        }
        Commands::Plan {
            client,
            goal,
            strategy,
            target_change,
            weeks,
            frequency,
        } => {
            let store = load_store(store_path)?;
            let plan = GoalPlan {
                goal: goal.into(),
                plan_strategy: strategy.into(),
                target_change_kg: target_change,
                target_duration_weeks: weeks,
                training_frequency_per_week: frequency,
            };
            let saved = profiles::configure_plan(&store, &client.client_id()?, plan)?;
            save_store(store_path, &store)?;
            emit(&saved)
        }
        Commands::Profile { client } => {
            let store = load_store(store_path)?;
            emit(&profiles::profile(&store, &client.client_id()?)?)
        }
        Commands::Delete { client } => {
            let store = load_store(store_path)?;
            let client_id = client.client_id()?;
            if !profiles::delete(&store, &client_id)? {
                return Err(InsightError::ProfileNotFound(client_id.to_string()).into());
            }
            save_store(store_path, &store)?;
            emit(&serde_json::json!({ "deleted": client_id }))
        }
        Commands::Bmi { client } => {
            let store = load_store(store_path)?;
            let profile = profiles::profile(&store, &client.client_id()?)?;
            emit(&bmi_report(&profile)?)
        }
        Commands::Calories { client } => {
            let store = load_store(store_path)?;
            let profile = profiles::profile(&store, &client.client_id()?)?;
            emit(&calorie_plan(&profile, today)?)
        }
        Commands::Insights {
            client,
            min_cohort_size,
        } => {
            let config = match min_cohort_size {
                Some(size) => InsightConfig::with_min_cohort_size(size)?,
                None => InsightConfig::from_env()?,
            };
            let engine = InsightEngine::new(load_store(store_path)?, config);
            let profile = profiles::profile(engine.store(), &client.client_id()?)?;
            emit(&InsightsOutput {
                insights: engine.build_insights(&profile)?,
                plan_details: plan_details(&profile),
            })
        }
        Commands::Research { command } => match command {
            ResearchCommands::Register {
                name,
                email,
                researchers,
            } => {
                let store = load_researchers(&researchers)?;
                let saved = research::register_researcher(&store, NewResearcher { name, email })?;
                fs::write(&researchers, store.to_json()?)?;
                info!(path = %researchers.display(), "Saved researcher store");
                emit(&serde_json::json!({ "clientId": saved.client_id }))
            }
            ResearchCommands::Demographics { client } => {
                let population = load_store(store_path)?.fetch_all()?;
                let config = ResearchConfig::from_env()?;
                emit(&research::demographics(
                    &client.client_id()?,
                    &population,
                    today,
                    &config,
                )?)
            }
            ResearchCommands::PopulationHealth { client } => {
                let population = load_store(store_path)?.fetch_all()?;
                emit(&research::population_health(&client.client_id()?, &population)?)
            }
        },
        Commands::Doctor => cmd_doctor(store_path),
    }
}

fn load_store(path: &Path) -> Result<InMemoryProfileStore, CliFailure> {
    if !path.exists() {
        return Ok(InMemoryProfileStore::new());
    }
    let json = fs::read_to_string(path)?;
    if json.trim().is_empty() {
        return Ok(InMemoryProfileStore::new());
    }
    Ok(InMemoryProfileStore::from_json(&json)?)
}

fn load_researchers(path: &Path) -> Result<InMemoryResearcherStore, CliFailure> {
    match fs::read_to_string(path) {
        Ok(json) if !json.trim().is_empty() => Ok(InMemoryResearcherStore::from_json(&json)?),
        Ok(_) => Ok(InMemoryResearcherStore::new()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(InMemoryResearcherStore::new()),
        Err(e) => Err(e.into()),
    }
}

fn save_store(path: &Path, store: &InMemoryProfileStore) -> Result<(), CliFailure> {
    fs::write(path, store.to_json()?)?;
    info!(path = %path.display(), profiles = store.len()?, "Saved profile store");
    Ok(())
}

/// Pretty JSON for terminals, compact JSON for pipes
fn emit<T: Serialize>(value: &T) -> Result<(), CliFailure> {
    let json = if atty::is(atty::Stream::Stdout) {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_doctor(store_path: &Path) -> Result<(), CliFailure> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck::ok(
        "engine_version",
        format!("Engine version {ENGINE_VERSION}"),
    ));

    // Store file
    let store_check = if !store_path.exists() {
        DoctorCheck::warning(
            "store",
            format!("{} does not exist yet; it is created on first write", store_path.display()),
        )
    } else {
        match load_store(store_path) {
            Ok(store) => match store.fetch_all() {
                Ok(population) => {
                    let incomplete = population
                        .iter()
                        .filter(|p| bmi_report(p).is_err())
                        .count();
                    if incomplete == 0 {
                        DoctorCheck::ok(
                            "store",
                            format!("{} profiles loaded", population.len()),
                        )
                    } else {
                        DoctorCheck::warning(
                            "store",
                            format!(
                                "{} profiles loaded, {incomplete} without a computable BMI",
                                population.len()
                            ),
                        )
                    }
                }
                Err(e) => DoctorCheck::error("store", e.to_string()),
            },
            Err(e) => DoctorCheck::error("store", CliError::from(e).message),
        }
    };
    checks.push(store_check);

    // Environment configuration
    checks.push(match InsightConfig::from_env() {
        Ok(config) => DoctorCheck::ok(
            "min_cohort_size",
            format!("Minimum cohort size {}", config.min_cohort_size),
        ),
        Err(e) => DoctorCheck::error("min_cohort_size", format!("{MIN_COHORT_SIZE_ENV}: {e}")),
    });
    checks.push(match ResearchConfig::from_env() {
        Ok(config) => DoctorCheck::ok(
            "min_sample_size",
            format!("Minimum research sample size {}", config.min_sample_size),
        ),
        Err(e) => DoctorCheck::error("min_sample_size", format!("{MIN_SAMPLE_SIZE_ENV}: {e}")),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };
    emit(&report)?;

    if report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error))
    {
        Err(CliFailure::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Insight(InsightError),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<InsightError> for CliFailure {
    fn from(e: InsightError) -> Self {
        CliFailure::Insight(e)
    }
}

impl From<serde_json::Error> for CliFailure {
    fn from(e: serde_json::Error) -> Self {
        CliFailure::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        match e {
            CliFailure::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the --store path and its permissions".to_string()),
            },
            CliFailure::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliFailure::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            CliFailure::Insight(e) => {
                let (code, hint) = match &e {
                    InsightError::InvalidInput(_) => ("INVALID_INPUT", None),
                    InsightError::MissingField(_) => (
                        "MISSING_FIELD",
                        Some("Run 'fitcore plan' to complete the goal plan"),
                    ),
                    InsightError::ProfileNotFound(_) => (
                        "PROFILE_NOT_FOUND",
                        Some("Run 'fitcore register' to create a profile"),
                    ),
                    InsightError::Forbidden(_) => (
                        "FORBIDDEN",
                        Some("Research commands require a research-... client id"),
                    ),
                    InsightError::InsufficientData(_) => ("INSUFFICIENT_DATA", None),
                    InsightError::InvalidConfig(_) => (
                        "INVALID_CONFIG",
                        Some("Check FITNESS_* environment variables"),
                    ),
                    InsightError::Store(_) => ("STORE_ERROR", None),
                    InsightError::Json(_) => (
                        "STORE_CORRUPT",
                        Some("The store file must hold a JSON array of profiles"),
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: hint.map(str::to_string),
                }
            }
        }
    }
}

// Report types

#[derive(Serialize)]
struct InsightsOutput {
    #[serde(flatten)]
    insights: InsightResult,
    #[serde(flatten)]
    plan_details: PlanDetails,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        Self::new(name, CheckStatus::Ok, message)
    }

    fn warning(name: &str, message: String) -> Self {
        Self::new(name, CheckStatus::Warning, message)
    }

    fn error(name: &str, message: String) -> Self {
        Self::new(name, CheckStatus::Error, message)
    }

    fn new(name: &str, status: CheckStatus, message: String) -> Self {
        Self {
            name: name.to_string(),
            status,
            message,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
