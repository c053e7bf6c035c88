use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "diagnostico",
    version,
    about = "AI maturity self-assessment: web form, scoring and submission storage"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Read only this config file instead of the layered lookup
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the questionnaire as a web form
    Serve(ServeCommand),
    /// Score seven answers without storing them
    Score(ScoreCommand),
    /// Score and store one submission
    Submit(SubmitCommand),
    /// Show the most recent rows of the CSV store
    Tail(TailCommand),
    /// Print the questionnaire
    Questions,
}

#[derive(Args)]
pub struct ServeCommand {
    /// Listen address; overrides server.bind
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct ScoreCommand {
    /// Seven letters a-d, e.g. "abcdabc" or "a,b,c,d,a,b,c"
    pub answers: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct SubmitCommand {
    /// Seven letters a-d, e.g. "abcdabc"
    #[arg(long)]
    pub answers: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    /// Employee-size bucket, e.g. "Entre 11 y 50"
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub sector: Option<String>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct TailCommand {
    #[arg(
        short = 'n',
        long,
        default_value_t = 10,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub rows: usize,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}
