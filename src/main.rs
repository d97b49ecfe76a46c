use clap::Parser;
use log::{debug, info, LevelFilter};

use std::path::Path;

use snafu::prelude::*;

mod args;
mod survey;

use crate::args::Args;
use crate::survey::*;

/// Builds the configuration from the configuration file, then applies the command line overrides.
fn build_config(args: &Args) -> SurveyResult<SurveyConfig> {
    let mut config = match (&args.config, &args.input) {
        (Some(config_path), _) => read_config(config_path)?,
        (None, Some(input)) => SurveyConfig::from_input(input),
        (None, None) => whatever!("Either --config or --input must be provided"),
    };
    if let (Some(_), Some(input)) = (&args.config, &args.input) {
        config.data_source.file_path = resolve_cli_path(input)?;
    }
    if let Some(input_type) = &args.input_type {
        config.data_source.provider = input_type.clone();
    }
    if let Some(mapping) = &args.mapping {
        config.data_source.column_mapping = Some(mapping.clone());
    }
    if let Some(name) = &args.excel_worksheet_name {
        config.data_source.excel_worksheet_name = Some(name.clone());
    }
    if let Some(out) = &args.out {
        let out = match &args.config {
            Some(_) if out != "stdout" => resolve_cli_path(out)?,
            _ => out.clone(),
        };
        config.output_settings.output_path = Some(out);
    }
    // Without any output location, the summary goes to the terminal.
    if config.output_settings.output_path.is_none() {
        config.output_settings.output_path = Some("stdout".to_string());
    }
    Ok(config)
}

/// The paths of the configuration file are relative to its directory, but the
/// paths given on the command line are relative to the working directory.
fn resolve_cli_path(path: &str) -> SurveyResult<String> {
    let p = Path::new(path);
    if p.is_absolute() {
        return Ok(path.to_string());
    }
    let cwd = std::env::current_dir().context(WorkingDirSnafu {})?;
    Ok(cwd.join(p).display().to_string())
}

fn run(args: &Args) -> SurveyResult<()> {
    let config = build_config(args)?;
    debug!("run: config: {:?}", config);
    let root_p = match &args.config {
        Some(config_path) => Path::new(config_path)
            .parent()
            .context(MissingParentDirSnafu {})?
            .to_path_buf(),
        None => Path::new(".").to_path_buf(),
    };
    run_survey(&config, &root_p, args.reference.clone())?;
    info!("Survey {:?} processed", config.output_settings.survey_name);
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = run(&args) {
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &[&str]) -> Args {
        Args::parse_from(cmd.to_vec())
    }

    #[test]
    fn input_only() {
        let config = build_config(&args(&["surveytab", "--input", "data/encuesta.xlsx"])).unwrap();
        assert_eq!(config.data_source.provider, "xlsx");
        assert_eq!(config.data_source.file_path, "data/encuesta.xlsx");
        assert_eq!(config.output_settings.output_path, Some("stdout".to_string()));
    }

    #[test]
    fn overrides() {
        let config = build_config(&args(&[
            "surveytab",
            "-i",
            "encuesta.txt",
            "--input-type",
            "csv",
            "--mapping",
            "header",
            "-o",
            "summary.json",
        ]))
        .unwrap();
        assert_eq!(config.data_source.provider, "csv");
        assert_eq!(config.data_source.column_mapping, Some("header".to_string()));
        assert_eq!(
            config.output_settings.output_path,
            Some("summary.json".to_string())
        );
    }

    #[test]
    fn overrides_are_relative_to_the_working_directory() {
        let config_p = format!(
            "{}/tests/data/encuesta_config.json",
            env!("CARGO_MANIFEST_DIR")
        );
        let config = build_config(&args(&[
            "surveytab",
            "--config",
            config_p.as_str(),
            "--input",
            "mine.csv",
            "--out",
            "summary.json",
        ]))
        .unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            config.data_source.file_path,
            cwd.join("mine.csv").display().to_string()
        );
        assert_eq!(
            config.output_settings.output_path,
            Some(cwd.join("summary.json").display().to_string())
        );

        // Joining an absolute path onto the configuration directory keeps it unchanged.
        let root = Path::new(&config_p).parent().unwrap();
        assert_eq!(root.join(&config.data_source.file_path), cwd.join("mine.csv"));

        let config =
            build_config(&args(&["surveytab", "-c", config_p.as_str(), "-o", "stdout"])).unwrap();
        assert_eq!(config.output_settings.output_path, Some("stdout".to_string()));
        assert_eq!(config.data_source.file_path, "encuesta.csv");
    }

    #[test]
    fn missing_input() {
        assert!(build_config(&args(&["surveytab"])).is_err());
    }
}
