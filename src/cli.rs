use std::path::PathBuf;

use crate::config::Settings;
use crate::data::clean::{clean_file, IconMode, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
use crate::data::dataset::DatasetError;
use crate::data::normalize::normalize_dataset_file;
use crate::data::validate::{validate_dataset, EXIT_INPUT_FAILURE};
use crate::server;

pub const EXIT_USAGE: i32 = 2;

const USAGE: &str = "usage: navlist <validate|normalize|clean|serve>";
const CLEAN_USAGE: &str =
    "usage: navlist clean [--input|-i <path>] [--output|-o <path>] [--icon-mode|-m <google|dataurl>] [--multi]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Validate,
    Normalize,
    Clean,
    Serve,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("validate") => Some(Command::Validate),
        Some("normalize") => Some(Command::Normalize),
        Some("clean") => Some(Command::Clean),
        Some("serve") => Some(Command::Serve),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let settings = Settings::from_env();
    match parse_command(args) {
        Some(Command::Validate) => validate_command(dataset_arg(args, &settings)),
        Some(Command::Normalize) => normalize_command(dataset_arg(args, &settings)),
        Some(Command::Clean) => clean_command(args.get(2..).unwrap_or_default(), &settings),
        Some(Command::Serve) => handle_serve(settings),
        None => {
            eprintln!("{USAGE}");
            EXIT_USAGE
        }
    }
}

fn dataset_arg(args: &[String], settings: &Settings) -> PathBuf {
    args.get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.dataset_path.clone())
}

fn report_input_error(err: &DatasetError) -> i32 {
    eprintln!("{} {}", err.category(), err);
    EXIT_INPUT_FAILURE
}

/// Prints `{ ok, report }` and returns 0 (pass), 2 (fatal rule violation) or 1 (unusable input).
pub fn validate_command(path: impl Into<PathBuf>) -> i32 {
    let path = path.into();
    let outcome = match validate_dataset(&path) {
        Ok(outcome) => outcome,
        Err(err) => return report_input_error(&err),
    };
    match serde_json::to_string_pretty(&outcome) {
        Ok(payload) => {
            println!("{payload}");
            outcome.exit_code()
        }
        Err(err) => {
            eprintln!("failed to serialize validation report: {err}");
            EXIT_INPUT_FAILURE
        }
    }
}

pub fn normalize_command(path: impl Into<PathBuf>) -> i32 {
    let path = path.into();
    let records = match normalize_dataset_file(&path) {
        Ok(records) => records,
        Err(err) => return report_input_error(&err),
    };
    match serde_json::to_string_pretty(&records) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize records: {err}");
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub icon_mode: IconMode,
    pub multi: bool,
}

impl Default for CleanArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            icon_mode: IconMode::default(),
            multi: false,
        }
    }
}

pub fn parse_clean_args(options: &[String]) -> Result<CleanArgs, String> {
    let mut parsed = CleanArgs::default();
    let mut iter = options.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--input" | "-i" => parsed.input = PathBuf::from(value()?),
            "--output" | "-o" => parsed.output = PathBuf::from(value()?),
            "--icon-mode" | "-m" => parsed.icon_mode = value()?.parse()?,
            "--multi" => parsed.multi = true,
            other => return Err(format!("unknown option '{other}'")),
        }
    }
    Ok(parsed)
}

pub fn clean_command(options: &[String], settings: &Settings) -> i32 {
    let args = match parse_clean_args(options) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{CLEAN_USAGE}");
            return EXIT_USAGE;
        }
    };

    match clean_file(
        &args.input,
        &args.output,
        &settings.registry_path,
        args.icon_mode,
        args.multi,
    ) {
        Ok(summary) => {
            println!(
                "clean complete: records={}, output='{}'",
                summary.record_count, summary.output_path
            );
            0
        }
        Err(err) => {
            eprintln!("clean failed: {err}");
            1
        }
    }
}

fn handle_serve(settings: Settings) -> i32 {
    match server::run_server(settings) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}
