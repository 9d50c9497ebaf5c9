pub type UserId = String;
pub type GroupKey = String;
pub type BlockKey = String;

/// One row of a Binance transaction history export.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RawRow {
    #[serde(rename = "User_ID")]
    pub user_id: UserId,
    #[serde(rename = "UTC_Time")]
    pub utc_time: String,
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Operation")]
    pub operation: String,
    #[serde(rename = "Coin")]
    pub coin: String,
    #[serde(rename = "Change")]
    pub change: String,
    #[serde(rename = "Remark", default)]
    pub remark: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawField {
    UserId,
    UtcTime,
    Account,
    Operation,
    Coin,
    Change,
    Remark,
}

impl RawRow {
    pub fn get(&self, field: RawField) -> &str {
        match field {
            RawField::UserId => &self.user_id,
            RawField::UtcTime => &self.utc_time,
            RawField::Account => &self.account,
            RawField::Operation => &self.operation,
            RawField::Coin => &self.coin,
            RawField::Change => &self.change,
            RawField::Remark => &self.remark,
        }
    }
}
