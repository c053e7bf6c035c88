mod cli;
mod config;
mod error;
mod intake;
mod report;
mod scoring;
mod sink;
mod types;
mod web;

use crate::error::DiagError;
use crate::intake::{FormInput, Submission};
use crate::sink::csv_file::CsvSink;
use crate::types::config::Backend;
use crate::types::questionnaire::parse_answer_list;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const REJECTED: i32 = 1;
    pub const NOT_RECORDED: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report_format(format: &cli::ReportFormat) -> report::OutputFormat {
    match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
    }
}

fn run() -> Result<i32, DiagError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let root = std::env::current_dir()?;
    let loaded = config::load_config(&root, cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Serve(cmd) => {
            let addr = match cmd.bind {
                Some(bind) => bind.parse::<SocketAddr>().map_err(|_| {
                    DiagError::ConfigParse(format!("--bind is not a socket address: {bind}"))
                })?,
                None => loaded.bind_addr()?,
            };
            let state = Arc::new(web::AppState {
                sink: sink::from_config(&loaded, &root)?,
                contact_required: loaded.form.contact_required,
            });
            if !cli.quiet {
                println!("diagnostico listening on http://{addr}");
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(web::serve(state, addr))?;
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Score(cmd) => {
            let letters = parse_answer_list(&cmd.answers).ok_or_else(|| {
                DiagError::InvalidAnswers(format!("expected letters a-d, got {}", cmd.answers))
            })?;
            match scoring::score_letters(&letters) {
                Ok(assessment) => {
                    println!("{}", report::render(&assessment, report_format(&cmd.format))?);
                    Ok(exit_code::SUCCESS)
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    Ok(exit_code::REJECTED)
                }
            }
        }
        cli::Commands::Submit(cmd) => {
            let letters = parse_answer_list(&cmd.answers).ok_or_else(|| {
                DiagError::InvalidAnswers(format!("expected letters a-d, got {}", cmd.answers))
            })?;
            if letters.len() > types::questionnaire::QUESTION_COUNT {
                eprintln!(
                    "error: {}",
                    scoring::ScoreError::TooManyAnswers {
                        answered: letters.len(),
                        expected: types::questionnaire::QUESTION_COUNT,
                    }
                );
                return Ok(exit_code::REJECTED);
            }
            let input = FormInput {
                email: cmd.email,
                nombre: cmd.name,
                empresa: cmd.company,
                tamano_empleados: cmd.size,
                sector: cmd.sector,
                ..FormInput::default()
            }
            .with_answers(&letters);

            let submission = match Submission::from_form(
                &input,
                loaded.form.contact_required,
                intake::now_local(),
            ) {
                Ok(submission) => submission,
                Err(err) => {
                    eprintln!("error: {err}");
                    return Ok(exit_code::REJECTED);
                }
            };
            println!(
                "{}",
                report::render(&submission.assessment, report_format(&cmd.format))?
            );

            let sink = match sink::from_config(&loaded, &root) {
                Ok(sink) => sink,
                Err(err) => {
                    eprintln!("error: submission not recorded: {err}");
                    return Ok(exit_code::NOT_RECORDED);
                }
            };
            match intake::record(sink.as_ref(), &submission) {
                Ok(()) => {
                    if !cli.quiet {
                        eprintln!("saved to {} store", sink.name());
                    }
                    Ok(exit_code::SUCCESS)
                }
                Err(err) => {
                    eprintln!("error: submission not recorded: {err}");
                    Ok(exit_code::NOT_RECORDED)
                }
            }
        }
        cli::Commands::Tail(cmd) => {
            if loaded.storage.backend != Backend::Csv {
                return Err(DiagError::ConfigParse(
                    "tail only reads the csv store (storage.backend = \"csv\")".to_string(),
                ));
            }
            let store = CsvSink::new(sink::resolve(&root, &loaded.storage.csv_path));
            let rows = store.tail(cmd.rows)?;
            if rows.is_empty() {
                println!("tail: no stored submissions in {}", store.path().display());
            } else {
                print!("{}", report::md::rows_table(&rows));
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Questions => {
            print!("{}", report::md::questionnaire_markdown());
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
