use crate::{dates::check_pattern, error::ConfigError};

pub const DEFAULT_INPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_LONG_DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
pub const DEFAULT_DAY_FORMAT: &str = "%d-%m-%Y";
pub const DEFAULT_EXCHANGE: &str = "Binance";

/// Date patterns used to read `UTC_Time` and to render timestamps and days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pub input: String,
    pub long: String,
    pub day: String,
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat {
            input: DEFAULT_INPUT_DATE_FORMAT.to_string(),
            long: DEFAULT_LONG_DATE_FORMAT.to_string(),
            day: DEFAULT_DAY_FORMAT.to_string(),
        }
    }
}

impl DateFormat {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_pattern(&self.input)?;
        check_pattern(&self.long)?;
        check_pattern(&self.day)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dates: DateFormat,
    /// When false every normalized record is written as is.
    pub merge: bool,
    pub exchange: String,
    /// Detected from the header line when unset.
    pub input_delimiter: Option<u8>,
    pub output_delimiter: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dates: DateFormat::default(),
            merge: true,
            exchange: DEFAULT_EXCHANGE.to_string(),
            input_delimiter: None,
            output_delimiter: b',',
        }
    }
}
