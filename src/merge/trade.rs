use crate::{
    error::MergeError,
    merge::{SideFields, append_comment, fold_leg, required_amount},
    types::record::{Field, Record},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFields {
    pub buy: SideFields,
    pub sell: SideFields,
    pub fee: SideFields,
    pub comment: Field,
}

impl Default for TradeFields {
    fn default() -> Self {
        TradeFields {
            buy: SideFields::BUY,
            sell: SideFields::SELL,
            fee: SideFields::FEE,
            comment: Field::Comment,
        }
    }
}

/// Merges the legs of one order execution.
///
/// A group holds up to three records: a buy leg, a sell leg and at most one fee
/// leg. The operation legs fold into one record and the fee is netted into it
/// when it is paid in one of the traded coins. A fee that cannot be netted is
/// returned as a second record.
pub fn merge(group: &[Record], fields: &TradeFields) -> Result<Vec<Record>, MergeError> {
    if group.is_empty() || group.len() > 3 {
        return Err(MergeError::WrongGroupSize {
            expected: "1 to 3",
            group: group.to_vec(),
        });
    }

    let mut merged = Vec::new();
    let mut acc: Option<Record> = None;
    let mut fee: Option<&Record> = None;
    let mut fee_seen = false;

    for record in group {
        if record.has(fields.fee.coin) {
            if fee_seen {
                return Err(MergeError::DuplicateFeeLeg {
                    group: group.to_vec(),
                });
            }
            fee_seen = true;

            // A fee ahead of the only operation leg has nothing to net into.
            if group.len() == 2 && acc.is_none() {
                merged.push(record.clone());
            } else {
                fee = Some(record);
            }
            continue;
        }

        match acc.as_mut() {
            None => acc = Some(record.clone()),
            Some(acc) => fold_leg(
                acc,
                record,
                [fields.buy, fields.sell],
                fields.comment,
                group,
            )?,
        }
    }

    match (acc, fee) {
        (Some(acc), Some(fee)) => merged.extend(net_fee(acc, fee, fields, group)?),
        (Some(acc), None) => merged.push(acc),
        (None, Some(fee)) => merged.push(fee.clone()),
        (None, None) => {}
    }
    Ok(merged)
}

fn net_fee(
    acc: Record,
    fee: &Record,
    fields: &TradeFields,
    group: &[Record],
) -> Result<Vec<Record>, MergeError> {
    let fee_coin = fee.get(fields.fee.coin);
    let fee_amount = required_amount(fee, fields.fee.amount, group)?;

    if fee_coin == acc.get(fields.buy.coin) {
        let buy = required_amount(&acc, fields.buy.amount, group)?;
        if buy > fee_amount {
            let netted_buy = buy
                .checked_sub(fee_amount)
                .ok_or_else(|| overflow(fields.buy.amount, group))?;
            let netted = acc
                .with(fields.buy.amount, netted_buy.to_string())
                .with(fields.fee.coin, fee_coin)
                .with(fields.fee.amount, fee.get(fields.fee.amount));
            return Ok(vec![netted]);
        }
    } else if fee_coin == acc.get(fields.sell.coin) {
        let sell = required_amount(&acc, fields.sell.amount, group)?;
        let netted_sell = sell
            .checked_add(fee_amount)
            .ok_or_else(|| overflow(fields.sell.amount, group))?;
        let netted = acc
            .with(fields.sell.amount, netted_sell.to_string())
            .with(fields.fee.coin, fee_coin)
            .with(fields.fee.amount, fee.get(fields.fee.amount));
        return Ok(vec![netted]);
    }

    let mut residual = fee.clone();
    let note = format!(
        "Fee for trade {}=>{}",
        acc.get(fields.sell.coin),
        acc.get(fields.buy.coin)
    );
    append_comment(&mut residual, fields.comment, &note);
    Ok(vec![acc, residual])
}

fn overflow(field: Field, group: &[Record]) -> MergeError {
    MergeError::AmountOverflow {
        field,
        group: group.to_vec(),
    }
}
