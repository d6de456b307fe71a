use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use reshaper::{Error, Hints, ReshapeConfig, Reshaper, Result, SchemaParser, Value};

/// Reshape JSON data into the shape described by a schema.
#[derive(Parser, Debug)]
#[command(name = "reshaper", version, about)]
struct Cli {
    /// Schema as JSON, e.g. '["Number"]' or '{"names": ["String"]}'
    #[arg(short, long)]
    schema: String,

    /// Property name to prefer; repeat for several leaf positions
    #[arg(short = 'H', long = "hint")]
    hints: Vec<String>,

    /// Hints as a JSON object mapping output keys to property names
    #[arg(long, conflicts_with = "hints")]
    keyed_hints: Option<String>,

    /// Pretty-print the result
    #[arg(short, long)]
    pretty: bool,

    /// Do not treat schema keys as hints
    #[arg(long)]
    no_key_hints: bool,

    /// Do not reuse the property chosen for earlier array elements
    #[arg(long)]
    no_pinning: bool,

    /// Do not wrap a single match in an array
    #[arg(long)]
    no_single_backoff: bool,

    /// JSON input file; reads stdin when omitted
    input: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> ReshapeConfig {
        ReshapeConfig {
            schema_keys_as_hints: !self.no_key_hints,
            pin_array_keys: !self.no_pinning,
            single_element_backoff: !self.no_single_backoff,
        }
    }

    fn hints(&self, parser: &SchemaParser) -> Result<Hints> {
        if let Some(keyed) = &self.keyed_hints {
            let json: serde_json::Value = serde_json::from_str(keyed)?;
            return match parser.parse_hints(&json)? {
                keyed @ Hints::Keyed(_) => Ok(keyed),
                _ => Err(Error::SchemaError(
                    "--keyed-hints must be a JSON object".to_string(),
                )),
            };
        }
        Ok(match self.hints.as_slice() {
            [] => Hints::None,
            [single] => Hints::Single(single.clone()),
            many => Hints::Ordered(many.to_vec()),
        })
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let parser = SchemaParser::new();
    let schema = parser.parse_schema(&serde_json::from_str(&cli.schema)?)?;
    let hints = cli.hints(&parser)?;
    debug!("schema {}, hints {:?}", schema, hints);

    let source: serde_json::Value = serde_json::from_str(&cli.read_input()?)?;
    let result = Reshaper::with_config(cli.config()).reshape(&Value::from(&source), &schema, hints)?;
    let json = serde_json::Value::from(result);

    let text = if cli.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("reshaper: {}", err);
            ExitCode::FAILURE
        }
    }
}
