//! Derivation of normalized records from raw export rows.
//!
//! Each output field is computed independently by a [`FieldRule`]: a function
//! applied to an ordered list of raw fields. A rule without a function copies
//! its single source field verbatim.

use rust_decimal::Decimal;

use crate::{
    config::Config,
    dates::format_date,
    error::{ConfigError, Error, MalformedInput},
    types::{
        common::{RawField, RawRow},
        record::{FIELD_COUNT, Field, Record, RecordType, parse_decimal},
    },
};

pub type Derive = Box<dyn Fn(&[&str]) -> Result<String, MalformedInput>>;

pub struct FieldRule {
    pub field: Field,
    pub sources: Vec<RawField>,
    pub derive: Option<Derive>,
}

impl FieldRule {
    pub fn copy(field: Field, source: RawField) -> Self {
        FieldRule {
            field,
            sources: vec![source],
            derive: None,
        }
    }

    pub fn derived<F>(field: Field, sources: Vec<RawField>, derive: F) -> Self
    where
        F: Fn(&[&str]) -> Result<String, MalformedInput> + 'static,
    {
        FieldRule {
            field,
            sources,
            derive: Some(Box::new(derive)),
        }
    }
}

pub struct RowTransformer {
    rules: Vec<FieldRule>,
}

impl RowTransformer {
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, ConfigError> {
        for rule in &rules {
            if rule.derive.is_none() && rule.sources.len() != 1 {
                return Err(ConfigError::FieldRule {
                    field: rule.field,
                    keys: rule.sources.len(),
                });
            }
        }
        Ok(RowTransformer { rules })
    }

    /// Rules for the Binance transaction history export.
    pub fn binance(config: &Config) -> Result<Self, ConfigError> {
        let exchange = config.exchange.clone();
        let dates = config.dates.clone();
        let amount_sources = vec![RawField::Operation, RawField::Change];
        let coin_sources = vec![RawField::Operation, RawField::Change, RawField::Coin];

        RowTransformer::new(vec![
            FieldRule::derived(Field::Type, vec![RawField::Operation], |args| {
                Ok(record_type(args[0]).to_string())
            }),
            FieldRule::copy(Field::Op, RawField::Operation),
            FieldRule::derived(Field::BuyAmount, amount_sources.clone(), side_amount(Side::Buy)),
            FieldRule::derived(Field::BuyCoin, coin_sources.clone(), side_coin(Side::Buy)),
            FieldRule::derived(Field::SellAmount, amount_sources.clone(), side_amount(Side::Sell)),
            FieldRule::derived(Field::SellCoin, coin_sources.clone(), side_coin(Side::Sell)),
            FieldRule::derived(Field::FeeAmount, amount_sources, side_amount(Side::Fee)),
            FieldRule::derived(Field::FeeCoin, coin_sources, side_coin(Side::Fee)),
            FieldRule::derived(Field::Exchange, vec![], move |_| Ok(exchange.clone())),
            FieldRule::copy(Field::GroupId, RawField::Account),
            FieldRule::copy(Field::Comment, RawField::Remark),
            FieldRule::derived(Field::Timestamp, vec![RawField::UtcTime], move |args| {
                format_date(args[0], &dates.input, &dates.long)
            }),
        ])
    }

    pub fn transform(&self, row: &RawRow) -> Result<Record, Error> {
        let mut values: [String; FIELD_COUNT] = Default::default();

        for rule in &self.rules {
            let args: Vec<&str> = rule.sources.iter().map(|source| row.get(*source)).collect();
            values[rule.field.index()] = match &rule.derive {
                Some(derive) => derive(args.as_slice()).map_err(|source| Error::Malformed {
                    field: rule.field,
                    source,
                })?,
                None => args[0].to_string(),
            };
        }

        Ok(Record::new(row.get(RawField::UserId), values))
    }
}

pub fn record_type(operation: &str) -> RecordType {
    match operation {
        "Deposit" => RecordType::Deposit,
        "Withdraw" => RecordType::Withdrawal,
        "Small assets exchange BNB" => RecordType::Dust,
        "Buy" | "Sell" | "Fee" | "Transaction Related" | "Transaction Buy"
        | "Transaction Spend" | "Transaction Fee" | "Transaction Revenue"
        | "Transaction Sold" => RecordType::Trade,
        "POS savings interest"
        | "Savings Interest"
        | "Staking Rewards"
        | "ETH 2.0 Staking Rewards"
        | "Launchpool Interest"
        | "Simple Earn Flexible Interest"
        | "Simple Earn Locked Rewards"
        | "Savings distribution"
        | "Flexible Savings Interest" => RecordType::Staking,
        other => RecordType::Other(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
    Fee,
}

fn side_of(operation: &str, change: Decimal) -> Side {
    match operation {
        "Fee" | "Transaction Fee" => Side::Fee,
        _ if change.is_sign_negative() => Side::Sell,
        _ => Side::Buy,
    }
}

/// `[Operation, Change]` -> absolute change when the row falls on `target`.
fn side_amount(target: Side) -> impl Fn(&[&str]) -> Result<String, MalformedInput> {
    move |args| {
        let change = parse_decimal(args[1])?;
        if side_of(args[0], change) == target {
            Ok(change.abs().to_string())
        } else {
            Ok(String::new())
        }
    }
}

/// `[Operation, Change, Coin]` -> coin when the row falls on `target`.
fn side_coin(target: Side) -> impl Fn(&[&str]) -> Result<String, MalformedInput> {
    move |args| {
        let change = parse_decimal(args[1])?;
        if side_of(args[0], change) == target {
            Ok(args[2].to_string())
        } else {
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(operation: &str, coin: &str, change: &str) -> RawRow {
        RawRow {
            user_id: "42".to_string(),
            utc_time: "2024-01-01 10:00:00".to_string(),
            account: "Spot".to_string(),
            operation: operation.to_string(),
            coin: coin.to_string(),
            change: change.to_string(),
            remark: String::new(),
        }
    }

    fn transformer() -> RowTransformer {
        RowTransformer::binance(&Config::default()).unwrap()
    }

    #[test]
    fn test_transform_buy_leg() {
        let record = transformer().transform(&row("Buy", "BTC", "0.5")).unwrap();

        assert_eq!(*record.kind(), RecordType::Trade);
        assert_eq!(record.get(Field::Op), "Buy");
        assert_eq!(record.get(Field::BuyAmount), "0.5");
        assert_eq!(record.get(Field::BuyCoin), "BTC");
        assert_eq!(record.get(Field::SellAmount), "");
        assert_eq!(record.get(Field::FeeCoin), "");
        assert_eq!(record.get(Field::Exchange), "Binance");
        assert_eq!(record.get(Field::GroupId), "Spot");
        assert_eq!(record.get(Field::Timestamp), "01-01-2024 10:00:00");
        assert_eq!(record.user_id(), "42");
    }

    #[test]
    fn test_transform_sell_leg_uses_absolute_change() {
        let record = transformer()
            .transform(&row("Sell", "USDT", "-20000.00"))
            .unwrap();

        assert_eq!(record.get(Field::SellAmount), "20000.00");
        assert_eq!(record.get(Field::SellCoin), "USDT");
        assert_eq!(record.get(Field::BuyCoin), "");
    }

    #[test]
    fn test_transform_fee_leg() {
        let record = transformer().transform(&row("Fee", "BNB", "-0.001")).unwrap();

        assert_eq!(record.get(Field::FeeAmount), "0.001");
        assert_eq!(record.get(Field::FeeCoin), "BNB");
        assert_eq!(record.get(Field::SellCoin), "");
        assert_eq!(record.get(Field::BuyCoin), "");
    }

    #[test]
    fn test_transform_staking_and_withdrawal() {
        let transformer = transformer();
        let staking = transformer
            .transform(&row("POS savings interest", "DOT", "1E-8"))
            .unwrap();
        let withdrawal = transformer.transform(&row("Withdraw", "ETH", "-1")).unwrap();

        assert_eq!(*staking.kind(), RecordType::Staking);
        assert_eq!(staking.get(Field::BuyAmount), "0.00000001");
        assert_eq!(*withdrawal.kind(), RecordType::Withdrawal);
        assert_eq!(withdrawal.get(Field::SellAmount), "1");
    }

    #[test]
    fn test_transform_unknown_operation() {
        let record = transformer()
            .transform(&row("Card Cashback", "BNB", "0.1"))
            .unwrap();

        assert_eq!(
            *record.kind(),
            RecordType::Other("Card Cashback".to_string())
        );
        assert_eq!(record.get(Field::Type), "Card Cashback");
    }

    #[test]
    fn test_transform_malformed_change() {
        let err = transformer()
            .transform(&row("Buy", "BTC", "lots"))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Malformed {
                field: Field::BuyAmount,
                source: MalformedInput::Decimal { .. }
            }
        ));
    }

    #[test]
    fn test_transform_malformed_date() {
        let mut raw = row("Deposit", "BTC", "1");
        raw.utc_time = "01/01/2024".to_string();

        let err = transformer().transform(&raw).unwrap_err();
        assert!(matches!(
            err,
            Error::Malformed {
                field: Field::Timestamp,
                source: MalformedInput::Date { .. }
            }
        ));
    }

    #[test]
    fn test_copy_rule_is_verbatim() {
        let transformer =
            RowTransformer::new(vec![FieldRule::copy(Field::Comment, RawField::Remark)]).unwrap();
        let mut raw = row("Deposit", "BTC", "1");
        raw.remark = "  spaced remark ".to_string();

        let record = transformer.transform(&raw).unwrap();
        assert_eq!(record.get(Field::Comment), "  spaced remark ");
        assert_eq!(record.get(Field::Type), "");
    }

    #[test]
    fn test_rule_without_derive_needs_one_key() {
        let no_keys = FieldRule {
            field: Field::Exchange,
            sources: vec![],
            derive: None,
        };
        let two_keys = FieldRule {
            field: Field::Comment,
            sources: vec![RawField::Remark, RawField::Account],
            derive: None,
        };

        assert!(matches!(
            RowTransformer::new(vec![no_keys]),
            Err(ConfigError::FieldRule { keys: 0, .. })
        ));
        assert!(matches!(
            RowTransformer::new(vec![two_keys]),
            Err(ConfigError::FieldRule { keys: 2, .. })
        ));
    }
}
