use crate::demo::{run_demo, DemoArgs};
use crate::infra::{build_service, load_scoring_config};
use crate::server;
use assessment_scoring::config::AppConfig;
use assessment_scoring::error::AppError;
use assessment_scoring::scoring::{CriterionJudge, SubmissionPayload};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Assessment Scoring",
    about = "Score candidate assessments with an LLM rubric from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a submission stored as a JSON file using the configured judge
    Score(ScoreArgs),
    /// Print the configured skill catalog
    Skills(SkillsArgs),
    /// Score a built-in sample submission with a canned judge (no API key needed)
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a submission JSON document
    pub(crate) path: PathBuf,
    /// Only compute the legacy total, skipping skill scores
    #[arg(long)]
    pub(crate) legacy_only: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SkillsArgs {
    /// Scoring configuration JSON (defaults to SCORING_CONFIG_PATH, then the built-in rubric)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Skills(args) => run_skills(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.path)?;
    let payload: SubmissionPayload = serde_json::from_str(&raw)?;

    let service = build_service(&config, CriterionJudge::from_config(&config.judge))?;
    let service = if args.legacy_only {
        service.with_skill_based_scoring(false)
    } else {
        service
    };

    let response = service.score(payload).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_skills(args: SkillsArgs) -> Result<(), AppError> {
    let path = args
        .config
        .or_else(|| std::env::var_os("SCORING_CONFIG_PATH").map(PathBuf::from));
    let config = load_scoring_config(path.as_deref())?;
    let skills: Vec<_> = config.skills().collect();

    println!("{}", serde_json::to_string_pretty(&skills)?);
    Ok(())
}
