use crate::enums::{ContractStatus, KycStatus, UserRole};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// An investment contract binding a client to a product for a fixed term.
///
/// `amount` is carried as the store's decimal-as-string representation; use
/// [`Contract::principal`] to obtain it as a `Decimal`. Malformed or negative
/// amounts read as zero rather than failing, since incomplete records are
/// expected in an evolving data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub amount: String,
    pub status: ContractStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// The contract principal as a non-negative decimal, zero when unparseable.
    pub fn principal(&self) -> Decimal {
        parse_decimal_or_zero(&self.amount)
    }
}

/// An investment product with an annual interest rate in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub interest_rate: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The annual interest rate as a non-negative decimal, zero when unparseable.
    pub fn annual_rate(&self) -> Decimal {
        parse_decimal_or_zero(&self.interest_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: KycStatus,
    pub created_at: DateTime<Utc>,
}

/// Parses a decimal-as-string field, falling back to zero for malformed or
/// negative values. Incomplete records must never abort an aggregation.
fn parse_decimal_or_zero(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|value| !value.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}
