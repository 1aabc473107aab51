use serde::{Deserialize, Serialize};

/// A card linked to the user's wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedCard {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "cardholderName")]
    pub cardholder_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub last4: String,
    #[serde(rename = "expMonth")]
    pub exp_month: u8,
    #[serde(rename = "expYear")]
    pub exp_year: u16,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// A bank account linked to the user's wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAccount {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "accountName")]
    pub account_name: String,
    #[serde(rename = "accountNumberMasked")]
    pub account_number_masked: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// Payload for linking a new card.
#[derive(Debug, Clone, Serialize)]
pub struct NewCard {
    #[serde(rename = "cardNumber")]
    pub card_number: String,
    #[serde(rename = "cardholderName")]
    pub cardholder_name: String,
    #[serde(rename = "expMonth")]
    pub exp_month: u8,
    #[serde(rename = "expYear")]
    pub exp_year: u16,
}

/// Payload for linking a new bank account.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "accountName")]
    pub account_name: String,
    #[serde(rename = "accountNumber")]
    pub account_number: String,
}
