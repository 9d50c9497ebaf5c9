//! Group and block keys.
//!
//! A group key names the records that merge together. A block key (the day of
//! the record) bounds how long a group may stay open.

use std::collections::HashMap;

use crate::{
    config::{Config, DateFormat},
    dates::format_date,
    error::{ConfigError, Error},
    types::{
        common::{BlockKey, GroupKey},
        record::{Field, Record, RecordType},
    },
};

const SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPart {
    /// The record type.
    Kind,
    /// The originating user id.
    User,
    Field(Field),
    /// The day of a timestamp field.
    Day(Field),
}

pub struct GroupKeys {
    rules: HashMap<RecordType, Vec<KeyPart>>,
    dates: DateFormat,
}

impl GroupKeys {
    pub fn new(
        rules: HashMap<RecordType, Vec<KeyPart>>,
        dates: DateFormat,
    ) -> Result<Self, ConfigError> {
        for (kind, parts) in &rules {
            let kind_at_edge =
                parts.first() == Some(&KeyPart::Kind) || parts.last() == Some(&KeyPart::Kind);
            if !kind_at_edge {
                return Err(ConfigError::GroupRule { kind: kind.clone() });
            }
        }
        Ok(GroupKeys { rules, dates })
    }

    pub fn binance(config: &Config) -> Result<Self, ConfigError> {
        let rules = HashMap::from([
            (
                RecordType::Staking,
                vec![
                    KeyPart::Kind,
                    KeyPart::Field(Field::BuyCoin),
                    KeyPart::Day(Field::Timestamp),
                ],
            ),
            (
                RecordType::Trade,
                vec![KeyPart::User, KeyPart::Field(Field::Timestamp), KeyPart::Kind],
            ),
            (
                RecordType::Dust,
                vec![KeyPart::User, KeyPart::Field(Field::Timestamp), KeyPart::Kind],
            ),
            (
                RecordType::Deposit,
                vec![
                    KeyPart::User,
                    KeyPart::Field(Field::BuyCoin),
                    KeyPart::Field(Field::Timestamp),
                    KeyPart::Kind,
                ],
            ),
            (
                RecordType::Withdrawal,
                vec![
                    KeyPart::User,
                    KeyPart::Field(Field::SellCoin),
                    KeyPart::Field(Field::Timestamp),
                    KeyPart::Kind,
                ],
            ),
        ]);
        GroupKeys::new(rules, config.dates.clone())
    }

    /// The group `record` belongs to, `None` when its type has no rule.
    pub fn key(&self, record: &Record) -> Result<Option<GroupKey>, Error> {
        let Some(parts) = self.rules.get(record.kind()) else {
            return Ok(None);
        };

        let mut key = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                key.push(SEPARATOR);
            }
            match part {
                KeyPart::Kind => key.push_str(record.kind().as_str()),
                KeyPart::User => key.push_str(record.user_id()),
                KeyPart::Field(field) => key.push_str(record.get(*field)),
                KeyPart::Day(field) => key.push_str(&day_of(record, *field, &self.dates)?),
            }
        }
        Ok(Some(key))
    }
}

/// The day a record falls on, used to decide when open groups are complete.
pub fn block_key(record: &Record, dates: &DateFormat) -> Result<BlockKey, Error> {
    day_of(record, Field::Timestamp, dates)
}

fn day_of(record: &Record, field: Field, dates: &DateFormat) -> Result<String, Error> {
    format_date(record.get(field), &dates.long, &dates.day)
        .map_err(|source| Error::Malformed { field, source })
}
