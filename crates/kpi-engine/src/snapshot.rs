use chrono::{DateTime, Utc};
use core_types::{Contract, KycRecord, Product, User};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One full, consistent read of the four entity collections.
///
/// The aggregation is a pure function of this snapshot plus a reference
/// instant; the collections are re-read in full for every computation
/// (staleness window zero, no pagination at this scale).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub contracts: Vec<Contract>,
    pub products: Vec<Product>,
    pub users: Vec<User>,
    pub kyc_records: Vec<KycRecord>,
}

/// The complete KPI snapshot served to the admin dashboard.
///
/// Ephemeral: recomputed on every request and never persisted. Apart from
/// `calculated_at` (the explicit reference instant), every field is a pure
/// function of the input entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    pub financial: FinancialKpis,
    pub clients: ClientKpis,
    pub partners: PartnerKpis,
    pub operational: OperationalKpis,
    pub strategic: StrategicKpis,
    pub business_health: BusinessHealth,
    pub monthly_evolution: Vec<MonthlyEvolutionPoint>,
    pub calculated_at: DateTime<Utc>,
}

/// Capital aggregates and the liquidity ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialKpis {
    /// Assets under management: summed principal of all active contracts.
    pub total_aum: Decimal,
    /// Principal of contracts created since the start of the current month.
    pub new_capital_month: Decimal,
    /// Principal of contracts cancelled (updated) this month.
    pub withdrawn_capital_month: Decimal,
    /// Net capital flow of the month as a percentage of AUM.
    pub monthly_growth_ratio: Decimal,
    /// Amount-weighted average of the resolved product interest rates.
    /// Contracts whose product cannot be resolved are excluded entirely.
    pub average_portfolio_return: Decimal,
    /// Cumulative liquidity ladder: principal of active contracts maturing
    /// within each horizon. A contract maturing in 20 days counts toward all
    /// three buckets; the buckets are intentionally not disjoint.
    pub liquidity_30_days: Decimal,
    pub liquidity_60_days: Decimal,
    pub liquidity_90_days: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientKpis {
    /// Distinct users holding at least one active contract. Being a client
    /// is structural, not a role check.
    pub active_clients: u64,
    /// Distinct users with any contract created this month. This is an
    /// approximation of "new clients": it does not check that the user's
    /// first-ever contract falls in the month.
    pub new_clients_month: u64,
    pub average_ticket_per_client: Decimal,
    /// Top 10 clients by summed active principal, descending. Ties keep the
    /// order in which the clients first appear in the contract collection.
    pub top_clients: Vec<TopClient>,
    pub pending_kyc: u64,
    pub pending_kyc_percentage: Decimal,
    /// Renewal figures derived from the assumed renewal ratio applied to
    /// expired contracts; no actual renewal linkage exists in the store.
    pub renewal_rate: Decimal,
    pub renewals: u64,
    pub non_renewals: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClient {
    pub user_id: Uuid,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerKpis {
    /// Capped placeholder, not a real activity test.
    pub active_partners: u64,
    pub new_partners_month: u64,
    /// Flat commission applied to the month's new capital.
    pub total_commissions_month: Decimal,
    pub partner_conversion_ratio: Decimal,
    /// Top 5 partners by a synthetic decreasing volume allocation. No
    /// partner-client relationship exists in the data model, hence the
    /// `simulated_volume` name.
    pub top_partners: Vec<TopPartner>,
    pub inactive_partners: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPartner {
    pub user_id: Uuid,
    pub name: String,
    pub simulated_volume: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalKpis {
    /// Counts of active contracts maturing within each horizon. Same
    /// cumulative-bucket semantics as the liquidity ladder.
    pub contracts_expiring_30_days: u64,
    pub contracts_expiring_60_days: u64,
    pub contracts_expiring_90_days: u64,
    /// Share of KYC records no longer pending; reads 100 when no records
    /// exist (nothing pending is fully complete).
    pub kyc_completion_rate: Decimal,
    /// Placeholder metrics injected from configuration; no incident or
    /// compliance entities exist in the store.
    pub open_incidents: u32,
    pub avg_resolution_time_hours: u32,
    pub compliance_issues: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicKpis {
    /// Placeholder retention percentage injected from configuration.
    pub client_retention_rate: Decimal,
    /// Placeholder growth percentage injected from configuration.
    pub client_growth_rate: Decimal,
    /// Month's commissions plus a flat management fee on AUM. Not actually
    /// time-scaled to the elapsed part of the year.
    pub total_revenue_ytd: Decimal,
}

/// Coarse red/yellow/green classification of business health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHealth {
    pub status: HealthStatus,
    pub percentage: Decimal,
    /// Summed (cumulative, deliberately not deduplicated) expiring-contract
    /// counts over the three horizons, as a percentage of AUM.
    pub contracts_at_risk_percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Red,
    Yellow,
    Green,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Red => "red",
            HealthStatus::Yellow => "yellow",
            HealthStatus::Green => "green",
        };
        write!(f, "{label}")
    }
}

/// One point of the synthetic monthly evolution series.
///
/// The store keeps no historical snapshots, so the series is a straight-line
/// projection of the current totals back to the fixed June epoch. It is a
/// clearly-labelled approximation, not reconstructed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEvolutionPoint {
    pub month: String,
    pub capital: Decimal,
    pub clients: Decimal,
    pub revenue: Decimal,
    pub retention: Decimal,
}
