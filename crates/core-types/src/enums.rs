use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of an investment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    ReadyToStart,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Partner,
    Admin,
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(UserRole::Client),
            "partner" => Ok(UserRole::Partner),
            "admin" => Ok(UserRole::Admin),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// Verification state of a KYC document submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "kyc_status", rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}
