//! Type-specific merging of completed groups.
//!
//! Mergers borrow the group and build new records; the records they return
//! replace the whole group in the output.

pub mod dust;
pub mod staking;
pub mod trade;

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    error::MergeError,
    types::record::{Field, Record, RecordType},
};

pub use dust::DustFields;
pub use staking::StakingFields;
pub use trade::TradeFields;

/// The coin and amount columns of one side of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideFields {
    pub coin: Field,
    pub amount: Field,
    pub label: &'static str,
}

impl SideFields {
    pub const BUY: SideFields = SideFields {
        coin: Field::BuyCoin,
        amount: Field::BuyAmount,
        label: "buy",
    };
    pub const SELL: SideFields = SideFields {
        coin: Field::SellCoin,
        amount: Field::SellAmount,
        label: "sell",
    };
    pub const FEE: SideFields = SideFields {
        coin: Field::FeeCoin,
        amount: Field::FeeAmount,
        label: "fee",
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merger {
    Staking(StakingFields),
    Trade(TradeFields),
    Dust(DustFields),
    Identity,
}

impl Merger {
    pub fn apply(&self, group: Vec<Record>) -> Result<Vec<Record>, MergeError> {
        match self {
            Merger::Staking(fields) => staking::merge(&group, fields).map(|record| vec![record]),
            Merger::Trade(fields) => trade::merge(&group, fields),
            Merger::Dust(fields) => dust::merge(&group, fields).map(|record| vec![record]),
            Merger::Identity => Ok(group),
        }
    }
}

/// Routes each group to the merger registered for its record type.
pub struct Dispatcher {
    mergers: HashMap<RecordType, Merger>,
}

impl Dispatcher {
    pub fn new(mergers: HashMap<RecordType, Merger>) -> Self {
        Dispatcher { mergers }
    }

    pub fn binance() -> Self {
        Dispatcher::new(HashMap::from([
            (RecordType::Staking, Merger::Staking(StakingFields::default())),
            (RecordType::Trade, Merger::Trade(TradeFields::default())),
            (RecordType::Dust, Merger::Dust(DustFields::default())),
        ]))
    }

    pub fn merger_for(&self, kind: &RecordType) -> &Merger {
        self.mergers.get(kind).unwrap_or(&Merger::Identity)
    }

    /// Merges one group. Failures are logged with the full group and returned.
    pub fn merge(&self, key: &str, group: Vec<Record>) -> Result<Vec<Record>, MergeError> {
        let merger = match group.first() {
            Some(record) => self.merger_for(record.kind()),
            None => &Merger::Identity,
        };

        merger.apply(group).inspect_err(|err| {
            log::error!("Failed to merge group {:?}: {}", key, err);
            for record in err.group() {
                log::error!("  {:?}", record);
            }
        })
    }
}

fn required_amount(record: &Record, field: Field, group: &[Record]) -> Result<Decimal, MergeError> {
    match record.amount(field) {
        Ok(Some(amount)) => Ok(amount),
        _ => Err(MergeError::InvalidAmount {
            field,
            value: record.get(field).to_string(),
            group: group.to_vec(),
        }),
    }
}

/// Fills whichever side of `acc` is empty from `leg`.
fn fold_leg(
    acc: &mut Record,
    leg: &Record,
    sides: [SideFields; 2],
    comment: Field,
    group: &[Record],
) -> Result<(), MergeError> {
    for side in sides {
        match (acc.has(side.coin), leg.has(side.coin)) {
            (true, true) => {
                return Err(MergeError::DuplicateOperationLeg {
                    side: side.label,
                    group: group.to_vec(),
                });
            }
            (false, false) => {
                return Err(MergeError::MissingOperationLeg {
                    side: side.label,
                    group: group.to_vec(),
                });
            }
            (false, true) => {
                acc.set(side.coin, leg.get(side.coin));
                acc.set(side.amount, leg.get(side.amount));
            }
            (true, false) => {}
        }
    }

    append_comment(acc, comment, leg.get(comment));
    Ok(())
}

fn append_comment(record: &mut Record, field: Field, note: &str) {
    if note.is_empty() || record.get(field).split("; ").any(|existing| existing == note) {
        return;
    }
    let joined = if record.has(field) {
        format!("{}; {}", record.get(field), note)
    } else {
        note.to_string()
    };
    record.set(field, joined);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::RecordBuilder;

    #[test]
    fn test_unregistered_type_passes_through() {
        let dispatcher = Dispatcher::binance();
        let group = vec![
            RecordBuilder::new(RecordType::Deposit).buy("1", "BTC").build(),
            RecordBuilder::new(RecordType::Deposit).buy("2", "BTC").build(),
        ];

        let merged = dispatcher.merge("deposit", group.clone()).unwrap();
        assert_eq!(merged, group);
    }

    #[test]
    fn test_pass_through_is_idempotent() {
        let dispatcher = Dispatcher::binance();
        let group = vec![RecordBuilder::new(RecordType::Withdrawal).sell("1", "ETH").build()];

        let once = dispatcher.merge("w", group.clone()).unwrap();
        let twice = dispatcher.merge("w", once.clone()).unwrap();
        assert_eq!(once, group);
        assert_eq!(twice, group);
    }

    #[test]
    fn test_dispatch_by_type() {
        let dispatcher = Dispatcher::binance();
        let group = vec![
            RecordBuilder::new(RecordType::Staking).buy("1", "DOT").build(),
            RecordBuilder::new(RecordType::Staking).buy("2", "DOT").build(),
        ];

        let merged = dispatcher.merge("staking", group).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get(Field::BuyAmount), "3");
    }

    #[test]
    fn test_dispatch_error_carries_group() {
        let dispatcher = Dispatcher::binance();
        let group = vec![
            RecordBuilder::new(RecordType::Staking).buy("1", "DOT").build(),
            RecordBuilder::new(RecordType::Staking).buy("2", "ADA").build(),
        ];

        let err = dispatcher.merge("staking", group.clone()).unwrap_err();
        assert_eq!(err.group(), group.as_slice());
    }

    #[test]
    fn test_empty_group_merges_to_nothing() {
        let merged = Dispatcher::binance().merge("empty", vec![]).unwrap();
        assert!(merged.is_empty());
    }

    #[test]
    fn test_append_comment_skips_duplicates() {
        let mut record = RecordBuilder::new(RecordType::Trade).build();

        append_comment(&mut record, Field::Comment, "first");
        append_comment(&mut record, Field::Comment, "");
        append_comment(&mut record, Field::Comment, "first");
        append_comment(&mut record, Field::Comment, "second");

        assert_eq!(record.get(Field::Comment), "first; second");
    }
}
