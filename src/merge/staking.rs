use crate::{
    error::MergeError,
    merge::required_amount,
    types::record::{Field, Record},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingFields {
    pub coin: Field,
    pub amount: Field,
}

impl Default for StakingFields {
    fn default() -> Self {
        StakingFields {
            coin: Field::BuyCoin,
            amount: Field::BuyAmount,
        }
    }
}

/// Sums the rewards of one coin into the first record of the group.
pub fn merge(group: &[Record], fields: &StakingFields) -> Result<Record, MergeError> {
    let Some((first, rest)) = group.split_first() else {
        return Err(MergeError::WrongGroupSize {
            expected: "at least 1",
            group: Vec::new(),
        });
    };

    let coin = first.get(fields.coin);
    let mut total = required_amount(first, fields.amount, group)?;

    for record in rest {
        if record.get(fields.coin) != coin {
            return Err(MergeError::CoinMismatch {
                expected: coin.to_string(),
                found: record.get(fields.coin).to_string(),
                group: group.to_vec(),
            });
        }
        total = total
            .checked_add(required_amount(record, fields.amount, group)?)
            .ok_or_else(|| MergeError::AmountOverflow {
                field: fields.amount,
                group: group.to_vec(),
            })?;
    }

    Ok(first.clone().with(fields.amount, total.to_string()))
}
