use crate::{
    error::MergeError,
    merge::{SideFields, fold_leg},
    types::record::{Field, Record},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustFields {
    pub buy: SideFields,
    pub sell: SideFields,
    pub comment: Field,
}

impl Default for DustFields {
    fn default() -> Self {
        DustFields {
            buy: SideFields::BUY,
            sell: SideFields::SELL,
            comment: Field::Comment,
        }
    }
}

/// Folds a dust conversion, the small balance sold and the BNB received, into one record.
pub fn merge(group: &[Record], fields: &DustFields) -> Result<Record, MergeError> {
    let [first, second] = group else {
        return Err(MergeError::WrongGroupSize {
            expected: "2",
            group: group.to_vec(),
        });
    };

    let mut acc = first.clone();
    fold_leg(&mut acc, second, [fields.buy, fields.sell], fields.comment, group)?;
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{RecordBuilder, RecordType};

    fn dust() -> RecordBuilder {
        RecordBuilder::new(RecordType::Dust).field(Field::Op, "Small assets exchange BNB")
    }

    #[test]
    fn test_merge_dust_pair() {
        let group = [dust().sell("0.3", "DOGE").build(), dust().buy("0.0001", "BNB").build()];

        let merged = merge(&group, &DustFields::default()).unwrap();

        assert_eq!(merged.get(Field::SellAmount), "0.3");
        assert_eq!(merged.get(Field::SellCoin), "DOGE");
        assert_eq!(merged.get(Field::BuyAmount), "0.0001");
        assert_eq!(merged.get(Field::BuyCoin), "BNB");
    }

    #[test]
    fn test_merge_dust_joins_remarks() {
        let group = [
            dust().sell("0.3", "DOGE").field(Field::Comment, "converted").build(),
            dust().buy("0.0001", "BNB").field(Field::Comment, "to BNB").build(),
        ];

        let merged = merge(&group, &DustFields::default()).unwrap();
        assert_eq!(merged.get(Field::Comment), "converted; to BNB");
    }

    #[test]
    fn test_merge_dust_wrong_size() {
        let single = [dust().sell("0.3", "DOGE").build()];
        let triple = [
            dust().sell("0.3", "DOGE").build(),
            dust().buy("0.0001", "BNB").build(),
            dust().sell("0.1", "SHIB").build(),
        ];

        assert!(matches!(
            merge(&single, &DustFields::default()),
            Err(MergeError::WrongGroupSize { .. })
        ));
        assert!(matches!(
            merge(&triple, &DustFields::default()),
            Err(MergeError::WrongGroupSize { .. })
        ));
        assert!(matches!(
            merge(&[], &DustFields::default()),
            Err(MergeError::WrongGroupSize { .. })
        ));
    }

    #[test]
    fn test_merge_dust_two_sells() {
        let group = [dust().sell("0.3", "DOGE").build(), dust().sell("0.1", "SHIB").build()];

        // Sides are checked buy first, so the empty buy side is reported.
        assert!(matches!(
            merge(&group, &DustFields::default()),
            Err(MergeError::MissingOperationLeg { side: "buy", .. })
        ));
    }
}
