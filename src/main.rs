use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use card_validation::{BatchSummary, CardValidator, ValidatorConfig, CONFIG_ENV_VAR, VERSION};

const USAGE: &str = "\
Usage:
  card-validation check <number>... [--config <path>]
  card-validation batch <file.csv> [--config <path>]
  card-validation config

A card number containing spaces must be quoted. The CSV needs a `number` column.
The config path may also be set with CARD_VALIDATION_CONFIG.";

#[derive(Debug, Deserialize)]
struct CardRow {
    number: String,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (config_path, rest) = split_config_flag(args)?;
    let env_path = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);

    match rest.first().map(String::as_str) {
        Some("check") if rest.len() > 1 => {
            let validator = load_validator(config_path, env_path)?;
            if !run_check(&validator, &rest[1..])? {
                std::process::exit(1);
            }
        }
        Some("batch") if rest.len() == 2 => {
            let validator = load_validator(config_path, env_path)?;
            run_batch(&validator, Path::new(&rest[1]))?;
        }
        Some("config") => {
            println!("{}", ValidatorConfig::reference().to_json_pretty()?);
        }
        Some("--version") => {
            println!("card-validation {}", VERSION);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Pull `--config <path>` out of the argument list
fn split_config_flag(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--config" {
            match iter.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("--config requires a path"),
            }
        } else {
            rest.push(arg);
        }
    }

    Ok((config, rest))
}

/// `--config` wins over the environment variable; neither means the reference tables
fn load_validator(config_path: Option<PathBuf>, env_path: Option<PathBuf>) -> Result<CardValidator> {
    match config_path.or(env_path) {
        Some(path) => {
            let config = ValidatorConfig::from_file(&path)?;
            CardValidator::from_config(config)
                .with_context(|| format!("Invalid card tables in {:?}", path))
        }
        None => Ok(CardValidator::reference()),
    }
}

/// Print one report per number. Returns true when every number is valid.
fn run_check(validator: &CardValidator, numbers: &[String]) -> Result<bool> {
    let mut all_valid = true;

    for number in numbers {
        let report = validator.report(number);
        all_valid &= report.valid;
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(all_valid)
}

fn run_batch(validator: &CardValidator, csv_path: &Path) -> Result<()> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut summary = BatchSummary::default();
    for result in rdr.deserialize() {
        let row: CardRow = result.context("Failed to deserialize card row")?;
        summary.record(&validator.report(&row.number));
    }

    tracing::info!(total = summary.total, valid = summary.valid, "Batch complete");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
