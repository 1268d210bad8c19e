use chart_autodetect::api::{ChartProcessor, ChartProcessorConfig};
use chart_autodetect::core::{ChartDefinition, Row};
use chart_autodetect::telemetry::init_default_tracing;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: chart_autodetect [--input <rows.jsonl>] [--definitions <definitions.json>] [--config <config.json>] [--output <path>]";

#[derive(Debug, Default)]
struct CliArgs {
    input: Option<PathBuf>,
    definitions: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn main() {
    let _ = init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    let definitions = match &args.definitions {
        Some(path) => ChartDefinition::list_from_json_str(&read_file(path)?)
            .map_err(|err| err.to_string())?,
        None => Vec::new(),
    };
    let config = match &args.config {
        Some(path) => {
            ChartProcessorConfig::from_json_str(&read_file(path)?).map_err(|err| err.to_string())?
        }
        None => ChartProcessorConfig::default(),
    };
    let mut processor = ChartProcessor::new(definitions, config).map_err(|err| err.to_string())?;

    let reader: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            fs::File::open(path)
                .map_err(|err| format!("failed to open `{}`: {err}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|err| format!("failed to read rows: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = Row::from_json_str(&line).map_err(|err| format!("line {}: {err}", index + 1))?;
        processor.add_row(&row);
    }

    let json = processor
        .finalize()
        .to_json_contract_v1_pretty()
        .map_err(|err| err.to_string())?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("failed to read `{}`: {err}", path.display()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs::default();

    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("missing value for {name}"))
        };
        match flag.as_str() {
            "--input" => parsed.input = Some(value("--input")?),
            "--definitions" => parsed.definitions = Some(value("--definitions")?),
            "--config" => parsed.config = Some(value("--config")?),
            "--output" => parsed.output = Some(value("--output")?),
            "--help" | "-h" => return Err(USAGE.to_owned()),
            other => return Err(format!("unknown flag `{other}`\n{USAGE}")),
        }
    }

    Ok(parsed)
}
