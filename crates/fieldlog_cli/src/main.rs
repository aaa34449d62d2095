//! Command-line front end for field sampling records.
//!
//! # Responsibility
//! - Load trip and template JSON files, validate them and report warnings.
//! - Instantiate templates, extract templates from trips and export CSV.
//! - Read WTW meter printouts into measurements.
//!
//! Logging is off unless `--log-dir` or `FIELDLOG_LOG` names a directory.

use anyhow::{bail, Context, Result};
use fieldlog_core::ids::now_millis;
use fieldlog_core::{
    core_version, default_log_level, init_logging, trip_to_csv, DataObjectBase,
    DataObjectTemplate, DataObjectWithTemplate, SamplingTrip, SamplingTripTemplate, WtwReceiver,
};
use serde_json::json;
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "FIELDLOG_LOG";

const USAGE: &str = "usage: fieldlog [--log-dir DIR] [--log-level LEVEL] <command>

commands:
  check-trip <trip.json>          validate a trip and list warnings
  check-template <template.json>  validate a trip template and list warnings
  instantiate <template.json>     print a new trip created from a template
  extract <trip.json>             print a template extracted from a trip
  csv <trip.json> [OUT_DIR]       write the trip as CSV
  wtw <printout.txt>              print measurements read from a WTW meter printout
  version";

struct Options {
    log_dir: Option<String>,
    log_level: Option<String>,
    command: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        log_dir: None,
        log_level: None,
        command: Vec::new(),
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-dir" => {
                options.log_dir = Some(args.next().context("--log-dir needs a value")?);
            }
            "--log-level" => {
                options.log_level = Some(args.next().context("--log-level needs a value")?);
            }
            _ => options.command.push(arg),
        }
    }
    if options.log_dir.is_none() {
        options.log_dir = std::env::var(LOG_DIR_ENV).ok().filter(|v| !v.trim().is_empty());
    }
    Ok(options)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read `{}`", path.display()))
}

fn load<T: DataObjectBase>(path: &str) -> Result<T> {
    let text = read_file(Path::new(path))?;
    T::from_json_str(&text).with_context(|| format!("cannot load `{path}`"))
}

fn report<T: DataObjectBase>(record: &T) -> Result<()> {
    record.validate(&[])?;
    let warnings = record.warnings_check(false);
    if warnings.is_empty() {
        println!("{}: ok", record.type_name());
    }
    for warning in warnings {
        println!("{}: warning: {warning}", record.type_name());
    }
    Ok(())
}

fn print_json<T: DataObjectBase>(record: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&record.to_json())?);
    Ok(())
}

fn write_csv(trip_path: &str, out_dir: Option<&str>) -> Result<()> {
    let trip: SamplingTrip = load(trip_path)?;
    trip.validate(&[])?;
    let csv = trip_to_csv(&trip);
    let dir = PathBuf::from(out_dir.unwrap_or("."));
    let target = dir.join(&csv.filename);
    std::fs::write(&target, csv.content)
        .with_context(|| format!("cannot write `{}`", target.display()))?;
    println!("{}", target.display());
    Ok(())
}

fn print_wtw(path: &str) -> Result<()> {
    let text = read_file(Path::new(path))?;
    let records: Vec<_> = WtwReceiver::new()
        .add(&text, now_millis())
        .into_iter()
        .map(|record| {
            let measurements: Vec<_> = record.measurements.iter().map(|m| m.to_json()).collect();
            json!({ "raw": record.raw, "measurements": measurements })
        })
        .collect();
    if records.is_empty() {
        bail!("no complete WTW record in `{path}`");
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn run(options: Options) -> Result<()> {
    if let Some(dir) = &options.log_dir {
        let level = options.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, dir).map_err(anyhow::Error::msg)?;
        info!("event=cli_start module=cli status=ok");
    }

    let command: Vec<&str> = options.command.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["check-trip", path] => report(&load::<SamplingTrip>(path)?),
        ["check-template", path] => report(&load::<SamplingTripTemplate>(path)?),
        ["instantiate", path] => {
            let template: SamplingTripTemplate = load(path)?;
            template.validate(&[])?;
            print_json(&template.template_to_object())
        }
        ["extract", path] => {
            let trip: SamplingTrip = load(path)?;
            print_json(&trip.extract_template())
        }
        ["csv", path] => write_csv(path, None),
        ["csv", path, out] => write_csv(path, Some(*out)),
        ["wtw", path] => print_wtw(path),
        ["version"] => {
            println!("fieldlog {}", core_version());
            Ok(())
        }
        [] | ["help" | "--help" | "-h", ..] => {
            eprintln!("{USAGE}");
            Ok(())
        }
        _ => bail!("unknown command: {}\n\n{USAGE}", options.command.join(" ")),
    }
}

fn main() -> ExitCode {
    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_args;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_are_separated_from_command() {
        let options =
            parse_args(args(&["--log-level", "warn", "csv", "trip.json", "--log-dir", "/tmp/x"]))
                .expect("valid args");
        assert_eq!(options.log_level.as_deref(), Some("warn"));
        assert_eq!(options.log_dir.as_deref(), Some("/tmp/x"));
        assert_eq!(options.command, args(&["csv", "trip.json"]));
    }

    #[test]
    fn flag_without_value_is_an_error() {
        assert!(parse_args(args(&["--log-dir"])).is_err());
    }
}
