use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub assumptions: KpiAssumptions,
}

/// Network settings for the KPI web server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// The socket address the web server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Business-assumption constants used by the KPI aggregation.
///
/// Several reference KPIs are not derived from tracked data (no renewal
/// linkage, no partner-client relationship, no incident entity exists yet).
/// They are modelled here as injectable knobs instead of constants buried in
/// the engine, so tests and downstream consumers can tell real aggregates
/// from assumptions.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiAssumptions {
    /// Assumed fraction of expired contracts that renew (no renewal-tracking
    /// data exists to derive the real figure).
    #[serde(default = "default_renewal_ratio")]
    pub renewal_ratio: Decimal,

    /// Flat partner commission applied to the month's new capital.
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,

    /// Flat annual management fee applied to assets under management.
    #[serde(default = "default_management_fee_rate")]
    pub management_fee_rate: Decimal,

    /// Hard cap standing in for a real partner-activity test.
    #[serde(default = "default_active_partners_cap")]
    pub active_partners_cap: u64,

    /// Placeholder retention percentage until churn tracking exists.
    #[serde(default = "default_client_retention_rate")]
    pub client_retention_rate: Decimal,

    /// Placeholder year-over-year client growth percentage.
    #[serde(default = "default_client_growth_rate")]
    pub client_growth_rate: Decimal,

    /// Placeholder: no incident-tracking entity exists.
    #[serde(default)]
    pub open_incidents: u32,

    /// Placeholder mean incident resolution time, in hours.
    #[serde(default = "default_avg_resolution_time_hours")]
    pub avg_resolution_time_hours: u32,

    /// Placeholder: no compliance-case entity exists.
    #[serde(default)]
    pub compliance_issues: u32,
}

impl Default for KpiAssumptions {
    fn default() -> Self {
        Self {
            renewal_ratio: default_renewal_ratio(),
            commission_rate: default_commission_rate(),
            management_fee_rate: default_management_fee_rate(),
            active_partners_cap: default_active_partners_cap(),
            client_retention_rate: default_client_retention_rate(),
            client_growth_rate: default_client_growth_rate(),
            open_incidents: 0,
            avg_resolution_time_hours: default_avg_resolution_time_hours(),
            compliance_issues: 0,
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_renewal_ratio() -> Decimal {
    dec!(0.70)
}

fn default_commission_rate() -> Decimal {
    dec!(0.01)
}

fn default_management_fee_rate() -> Decimal {
    dec!(0.015)
}

fn default_active_partners_cap() -> u64 {
    2
}

fn default_client_retention_rate() -> Decimal {
    dec!(100)
}

fn default_client_growth_rate() -> Decimal {
    dec!(25)
}

fn default_avg_resolution_time_hours() -> u32 {
    48
}
