mod config;
mod dates;
mod engine;
mod error;
mod grouping;
mod merge;
mod sink;
mod transform;
mod types;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use clap::Parser;

use crate::{
    config::{
        Config, DEFAULT_DAY_FORMAT, DEFAULT_EXCHANGE, DEFAULT_INPUT_DATE_FORMAT,
        DEFAULT_LONG_DATE_FORMAT, DateFormat,
    },
    engine::{Engine, Stats},
    sink::CsvSink,
    types::common::RawRow,
};

#[derive(Debug, Parser)]
#[command(name = "binance-ledger-merge")]
#[command(about = "Merges Binance transaction history rows into accounting import records")]
struct Cli {
    /// Binance transaction history export
    input: PathBuf,
    /// Where to write the merged records
    output: PathBuf,
    /// Pattern of the UTC_Time column
    #[arg(long, default_value = DEFAULT_INPUT_DATE_FORMAT)]
    input_date_format: String,
    /// Pattern of the written Fecha column
    #[arg(long, default_value = DEFAULT_LONG_DATE_FORMAT)]
    output_date_format: String,
    /// Pattern used to split the input into days
    #[arg(long, default_value = DEFAULT_DAY_FORMAT)]
    day_format: String,
    /// Value of the Exchange column
    #[arg(long, default_value = DEFAULT_EXCHANGE)]
    exchange: String,
    /// Input delimiter, detected from the header line when omitted
    #[arg(long)]
    delimiter: Option<char>,
    /// Delimiter of the written records
    #[arg(long, default_value_t = ',')]
    output_delimiter: char,
    /// Write every row as is, without merging
    #[arg(long)]
    no_merge: bool,
}

impl Cli {
    fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let input_delimiter = self.delimiter.map(single_byte).transpose()?;
        let output_delimiter = single_byte(self.output_delimiter)?;

        Ok(Config {
            dates: DateFormat {
                input: self.input_date_format.clone(),
                long: self.output_date_format.clone(),
                day: self.day_format.clone(),
            },
            merge: !self.no_merge,
            exchange: self.exchange.clone(),
            input_delimiter,
            output_delimiter,
        })
    }
}

fn single_byte(delimiter: char) -> Result<u8, String> {
    u8::try_from(delimiter).map_err(|_| format!("delimiter {:?} is not a single byte", delimiter))
}

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Picks the candidate delimiter that occurs most often in the header line.
///
/// Falls back to a comma when none occurs.
fn detect_delimiter(path: &Path) -> Result<u8, error::Error> {
    let mut header = String::new();
    BufReader::new(File::open(path)?).read_line(&mut header)?;

    let mut best = (b',', 0);
    for candidate in CANDIDATE_DELIMITERS {
        let count = header.bytes().filter(|&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    Ok(best.0)
}

/// Streams `input` through the engine into `output`.
fn convert(input: &Path, output: &Path, config: Config) -> Result<Stats, error::Error> {
    let delimiter = match config.input_delimiter {
        Some(delimiter) => delimiter,
        None => {
            let detected = detect_delimiter(input)?;
            log::debug!("Detected input delimiter {:?}", detected as char);
            detected
        }
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_path(input)?;
    let mut sink = CsvSink::create(output, config.output_delimiter)?;

    let stats = Engine::binance(config)?.run(rdr.deserialize::<RawRow>(), &mut sink)?;
    sink.finish()?;
    Ok(stats)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.config()?;

    log::info!(
        "Reading {} into {}",
        cli.input.display(),
        cli.output.display()
    );
    convert(&cli.input, &cli.output, config)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = run() {
        log::error!("{}", err);
        process::exit(1);
    }
}
