use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::{error::MalformedInput, types::common::UserId};

pub const FIELD_COUNT: usize = 12;

/// Output columns, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Type,
    Op,
    BuyAmount,
    BuyCoin,
    SellAmount,
    SellCoin,
    FeeAmount,
    FeeCoin,
    Exchange,
    GroupId,
    Comment,
    Timestamp,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Type,
        Field::Op,
        Field::BuyAmount,
        Field::BuyCoin,
        Field::SellAmount,
        Field::SellCoin,
        Field::FeeAmount,
        Field::FeeCoin,
        Field::Exchange,
        Field::GroupId,
        Field::Comment,
        Field::Timestamp,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        match self {
            Field::Type => "Tipo",
            Field::Op => "Operacion",
            Field::BuyAmount => "Compra",
            Field::BuyCoin => "MonedaC",
            Field::SellAmount => "Venta",
            Field::SellCoin => "MonedaV",
            Field::FeeAmount => "Comision",
            Field::FeeCoin => "MonedaF",
            Field::Exchange => "Exchange",
            Field::GroupId => "Grupo",
            Field::Comment => "Comentario",
            Field::Timestamp => "Fecha",
        }
    }

    pub fn headers() -> impl Iterator<Item = &'static str> {
        Field::ALL.into_iter().map(Field::header)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    Staking,
    Dust,
    Trade,
    Deposit,
    Withdrawal,
    /// A type value with no rules attached, kept verbatim.
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::Staking => "Staking",
            RecordType::Dust => "Dust",
            RecordType::Trade => "Trade",
            RecordType::Deposit => "Deposit",
            RecordType::Withdrawal => "Withdrawal",
            RecordType::Other(value) => value,
        }
    }

    pub fn from_value(value: &str) -> Self {
        match value {
            "Staking" => RecordType::Staking,
            "Dust" => RecordType::Dust,
            "Trade" => RecordType::Trade,
            "Deposit" => RecordType::Deposit,
            "Withdrawal" => RecordType::Withdrawal,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an exchange amount, accepting scientific notation such as `1E-8`.
pub fn parse_decimal(value: &str) -> Result<Decimal, MalformedInput> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(&trimmed.to_ascii_lowercase()))
        .map_err(|_| MalformedInput::Decimal {
            value: value.to_string(),
        })
}

/// A normalized ledger record.
///
/// Fields that do not apply to a record hold the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordType,
    user_id: UserId,
    values: [String; FIELD_COUNT],
}

impl Record {
    pub fn new(user_id: impl Into<UserId>, values: [String; FIELD_COUNT]) -> Self {
        Record {
            kind: RecordType::from_value(&values[Field::Type.index()]),
            user_id: user_id.into(),
            values,
        }
    }

    pub fn kind(&self) -> &RecordType {
        &self.kind
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn has(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if field == Field::Type {
            self.kind = RecordType::from_value(&value);
        }
        self.values[field.index()] = value;
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Parsed amount of `field`, `None` when the field is empty.
    pub fn amount(&self, field: Field) -> Result<Option<Decimal>, MalformedInput> {
        let value = self.get(field);
        if value.is_empty() {
            return Ok(None);
        }
        parse_decimal(value).map(Some)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordBuilder {
    user_id: UserId,
    values: [String; FIELD_COUNT],
}

#[cfg(test)]
impl RecordBuilder {
    pub fn new(kind: RecordType) -> Self {
        RecordBuilder::default().field(Field::Type, kind.as_str())
    }

    pub fn user(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn field(mut self, field: Field, value: &str) -> Self {
        self.values[field.index()] = value.to_string();
        self
    }

    pub fn buy(self, amount: &str, coin: &str) -> Self {
        self.field(Field::BuyAmount, amount)
            .field(Field::BuyCoin, coin)
    }

    pub fn sell(self, amount: &str, coin: &str) -> Self {
        self.field(Field::SellAmount, amount)
            .field(Field::SellCoin, coin)
    }

    pub fn fee(self, amount: &str, coin: &str) -> Self {
        self.field(Field::FeeAmount, amount)
            .field(Field::FeeCoin, coin)
    }

    pub fn build(self) -> Record {
        Record::new(self.user_id, self.values)
    }
}
