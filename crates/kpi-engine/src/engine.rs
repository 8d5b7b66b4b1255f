use crate::error::KpiError;
use crate::snapshot::{
    BusinessHealth, ClientKpis, EntitySnapshot, FinancialKpis, HealthStatus, KpiSnapshot,
    MonthlyEvolutionPoint, OperationalKpis, PartnerKpis, StrategicKpis, TopClient, TopPartner,
};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use configuration::KpiAssumptions;
use core_types::{Contract, ContractStatus, KycStatus, User, UserRole};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const TOP_CLIENTS_LIMIT: usize = 10;
const TOP_PARTNERS_LIMIT: usize = 5;

/// The dashboard series starts at a fixed June epoch (month-index 5).
const EVOLUTION_EPOCH_MONTH0: u32 = 5;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A stateless calculator deriving the dashboard KPI snapshot from the raw
/// back-office entities.
#[derive(Debug, Clone, Default)]
pub struct KpiEngine {
    assumptions: KpiAssumptions,
}

impl KpiEngine {
    pub fn new(assumptions: KpiAssumptions) -> Self {
        Self { assumptions }
    }

    /// The main entry point for computing the KPI snapshot.
    ///
    /// # Arguments
    ///
    /// * `data` - One full read of the four entity collections.
    /// * `now` - The explicit reference instant for all time windows. Passing
    ///   it in (instead of reading an ambient clock) keeps the computation a
    ///   pure function of its arguments.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `KpiSnapshot` or a `KpiError`. Empty
    /// collections and inconsistent records never fail: every ratio guards
    /// its denominator and degrades to a defined fallback.
    pub fn compute(
        &self,
        data: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> Result<KpiSnapshot, KpiError> {
        tracing::debug!(
            contracts = data.contracts.len(),
            products = data.products.len(),
            users = data.users.len(),
            kyc_records = data.kyc_records.len(),
            "Computing KPI snapshot"
        );

        let month_start = start_of_month(now);
        let active: Vec<&Contract> = data
            .contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .collect();

        let financial = self.financial_kpis(data, &active, now, month_start)?;
        let clients = self.client_kpis(data, &active, &financial, now, month_start);
        let partners = self.partner_kpis(data, &financial, clients.active_clients, month_start);
        let operational = self.operational_kpis(data, &active, now);
        let strategic = self.strategic_kpis(&financial, &partners)?;
        let business_health = self.business_health(&financial, &clients, &operational);
        let monthly_evolution = self.monthly_evolution(&financial, &clients, &strategic, now);

        Ok(KpiSnapshot {
            financial,
            clients,
            partners,
            operational,
            strategic,
            business_health,
            monthly_evolution,
            calculated_at: now,
        })
    }

    /// Capital aggregates, monthly flows and the cumulative liquidity ladder.
    fn financial_kpis(
        &self,
        data: &EntitySnapshot,
        active: &[&Contract],
        now: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<FinancialKpis, KpiError> {
        let total_aum: Decimal = active.iter().map(|c| c.principal()).sum();

        let new_capital_month: Decimal = data
            .contracts
            .iter()
            .filter(|c| c.created_at >= month_start)
            .map(|c| c.principal())
            .sum();

        let withdrawn_capital_month: Decimal = data
            .contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Cancelled && c.updated_at >= month_start)
            .map(|c| c.principal())
            .sum();

        let monthly_growth_ratio = ratio_pct(new_capital_month - withdrawn_capital_month, total_aum);

        // Amount-weighted rate over contracts whose product resolves. A
        // dangling product id drops the contract from numerator and
        // denominator alike.
        let rates: HashMap<Uuid, Decimal> = data
            .products
            .iter()
            .map(|p| (p.id, p.annual_rate()))
            .collect();
        let mut weighted_rate_sum = Decimal::ZERO;
        let mut weight_sum = Decimal::ZERO;
        for contract in active {
            if let Some(rate) = rates.get(&contract.product_id) {
                let amount = contract.principal();
                weighted_rate_sum += amount
                    .checked_mul(*rate)
                    .ok_or_else(|| KpiError::Overflow("average_portfolio_return".to_string()))?;
                weight_sum += amount;
            }
        }
        let average_portfolio_return = if weight_sum > Decimal::ZERO {
            weighted_rate_sum / weight_sum
        } else {
            Decimal::ZERO
        };

        Ok(FinancialKpis {
            total_aum,
            new_capital_month,
            withdrawn_capital_month,
            monthly_growth_ratio,
            average_portfolio_return,
            liquidity_30_days: maturing_principal(active, now, 30),
            liquidity_60_days: maturing_principal(active, now, 60),
            liquidity_90_days: maturing_principal(active, now, 90),
        })
    }

    /// Client base, ticket sizes, KYC progress and the renewal estimate.
    fn client_kpis(
        &self,
        data: &EntitySnapshot,
        active: &[&Contract],
        financial: &FinancialKpis,
        now: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> ClientKpis {
        let active_client_ids: HashSet<Uuid> = active.iter().map(|c| c.user_id).collect();
        let active_clients = active_client_ids.len() as u64;

        // Approximation: any user with a contract created this month, not
        // "users whose first-ever contract is this month".
        let new_clients_month = data
            .contracts
            .iter()
            .filter(|c| c.created_at >= month_start)
            .map(|c| c.user_id)
            .collect::<HashSet<_>>()
            .len() as u64;

        let average_ticket_per_client = if active_clients > 0 {
            financial.total_aum / Decimal::from(active_clients)
        } else {
            Decimal::ZERO
        };

        // Stable ranking: first-seen order in the contract collection breaks
        // amount ties.
        let mut order: Vec<Uuid> = Vec::new();
        let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
        for contract in active {
            let total = totals.entry(contract.user_id).or_insert_with(|| {
                order.push(contract.user_id);
                Decimal::ZERO
            });
            *total += contract.principal();
        }
        let mut top_clients: Vec<TopClient> = order
            .into_iter()
            .map(|user_id| TopClient {
                user_id,
                total_amount: totals[&user_id],
            })
            .collect();
        top_clients.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
        top_clients.truncate(TOP_CLIENTS_LIMIT);

        let total_kyc = data.kyc_records.len() as u64;
        let pending_kyc = data
            .kyc_records
            .iter()
            .filter(|r| r.status == KycStatus::Pending)
            .count() as u64;
        let pending_kyc_percentage = ratio_pct(Decimal::from(pending_kyc), Decimal::from(total_kyc));

        // The expired book: completed contracts whose term has run out. No
        // renewal linkage exists, so renewals are the configured ratio of the
        // expired count; an empty expired book reads as fully renewed.
        let expired = data
            .contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Completed && c.end_date <= now)
            .count() as u64;
        let renewals = (self.assumptions.renewal_ratio * Decimal::from(expired))
            .floor()
            .to_u64()
            .unwrap_or(0)
            .min(expired);
        let non_renewals = expired - renewals;
        let renewal_rate = if expired > 0 {
            ratio_pct(Decimal::from(renewals), Decimal::from(expired))
        } else {
            Decimal::ONE_HUNDRED
        };

        ClientKpis {
            active_clients,
            new_clients_month,
            average_ticket_per_client,
            top_clients,
            pending_kyc,
            pending_kyc_percentage,
            renewal_rate,
            renewals,
            non_renewals,
        }
    }

    /// Partner KPIs. Activity and volume are synthetic placeholders: the data
    /// model has no partner-client relationship to derive them from.
    fn partner_kpis(
        &self,
        data: &EntitySnapshot,
        financial: &FinancialKpis,
        active_clients: u64,
        month_start: DateTime<Utc>,
    ) -> PartnerKpis {
        let partners: Vec<&User> = data
            .users
            .iter()
            .filter(|u| u.role == UserRole::Partner)
            .collect();
        let partner_count = partners.len() as u64;

        let active_partners = partner_count.min(self.assumptions.active_partners_cap);
        let new_partners_month = partners
            .iter()
            .filter(|u| u.created_at >= month_start)
            .count() as u64;
        let total_commissions_month =
            financial.new_capital_month * self.assumptions.commission_rate;
        let partner_conversion_ratio = if active_partners > 0 {
            Decimal::from(active_clients) / Decimal::from(active_partners)
        } else {
            Decimal::ZERO
        };

        // Synthetic decreasing allocation of AUM across partners.
        let base_volume = if partner_count > 0 {
            financial.total_aum / Decimal::from(partner_count)
        } else {
            Decimal::ZERO
        };
        let step = Decimal::new(2, 1); // 0.2
        let top_partners: Vec<TopPartner> = partners
            .iter()
            .take(TOP_PARTNERS_LIMIT)
            .enumerate()
            .map(|(index, user)| TopPartner {
                user_id: user.id,
                name: user.name.clone(),
                simulated_volume: base_volume
                    * (Decimal::ONE - step * Decimal::from(index as u64)),
            })
            .collect();

        PartnerKpis {
            active_partners,
            new_partners_month,
            total_commissions_month,
            partner_conversion_ratio,
            top_partners,
            inactive_partners: partner_count.saturating_sub(active_partners),
        }
    }

    /// Maturity counts and KYC completion, plus the injected incident
    /// placeholders (no incident-tracking entity exists).
    fn operational_kpis(
        &self,
        data: &EntitySnapshot,
        active: &[&Contract],
        now: DateTime<Utc>,
    ) -> OperationalKpis {
        let total_kyc = data.kyc_records.len() as u64;
        let pending_kyc = data
            .kyc_records
            .iter()
            .filter(|r| r.status == KycStatus::Pending)
            .count() as u64;
        let kyc_completion_rate = if total_kyc > 0 {
            ratio_pct(Decimal::from(total_kyc - pending_kyc), Decimal::from(total_kyc))
        } else {
            // Nothing pending reads as fully complete.
            Decimal::ONE_HUNDRED
        };

        OperationalKpis {
            contracts_expiring_30_days: maturing_count(active, now, 30),
            contracts_expiring_60_days: maturing_count(active, now, 60),
            contracts_expiring_90_days: maturing_count(active, now, 90),
            kyc_completion_rate,
            open_incidents: self.assumptions.open_incidents,
            avg_resolution_time_hours: self.assumptions.avg_resolution_time_hours,
            compliance_issues: self.assumptions.compliance_issues,
        }
    }

    fn strategic_kpis(
        &self,
        financial: &FinancialKpis,
        partners: &PartnerKpis,
    ) -> Result<StrategicKpis, KpiError> {
        let management_fees = financial
            .total_aum
            .checked_mul(self.assumptions.management_fee_rate)
            .ok_or_else(|| KpiError::Overflow("total_revenue_ytd".to_string()))?;

        Ok(StrategicKpis {
            client_retention_rate: self.assumptions.client_retention_rate,
            client_growth_rate: self.assumptions.client_growth_rate,
            total_revenue_ytd: partners.total_commissions_month + management_fees,
        })
    }

    /// Traffic-light classification, evaluated in strict order: the red rule
    /// wins over the yellow rule, which wins over green.
    fn business_health(
        &self,
        financial: &FinancialKpis,
        clients: &ClientKpis,
        operational: &OperationalKpis,
    ) -> BusinessHealth {
        // The three horizon counts are summed as-is (cumulative, not
        // deduplicated) before being set against AUM.
        let at_risk = operational.contracts_expiring_30_days
            + operational.contracts_expiring_60_days
            + operational.contracts_expiring_90_days;
        let contracts_at_risk_percentage = ratio_pct(Decimal::from(at_risk), financial.total_aum);

        let (status, percentage) = if clients.renewal_rate < Decimal::from(50)
            || financial.withdrawn_capital_month > financial.new_capital_month
        {
            (HealthStatus::Red, Decimal::from(45))
        } else if contracts_at_risk_percentage > Decimal::from(10)
            || clients.renewal_rate < Decimal::from(80)
        {
            (HealthStatus::Yellow, Decimal::from(85))
        } else {
            (HealthStatus::Green, Decimal::from(95))
        };

        BusinessHealth {
            status,
            percentage,
            contracts_at_risk_percentage,
        }
    }

    /// Straight-line projection of the current totals back to the June
    /// epoch. The store keeps no historical snapshots; this is a synthetic
    /// series, not reconstructed history.
    fn monthly_evolution(
        &self,
        financial: &FinancialKpis,
        clients: &ClientKpis,
        strategic: &StrategicKpis,
        now: DateTime<Utc>,
    ) -> Vec<MonthlyEvolutionPoint> {
        let current = now.month0();
        if current < EVOLUTION_EPOCH_MONTH0 {
            return Vec::new();
        }

        let months_elapsed = current - EVOLUTION_EPOCH_MONTH0 + 1;
        let span = Decimal::from(months_elapsed);
        let retention_floor = Decimal::from(75);

        (0..months_elapsed)
            .map(|i| {
                // Multiply before dividing: 90000 * (1/3) would carry the
                // repeating-fraction error into every point.
                let elapsed = Decimal::from(i + 1);
                MonthlyEvolutionPoint {
                    month: MONTH_NAMES[(EVOLUTION_EPOCH_MONTH0 + i) as usize].to_string(),
                    capital: financial.total_aum * elapsed / span,
                    clients: Decimal::from(clients.active_clients) * elapsed / span,
                    revenue: strategic.total_revenue_ytd * elapsed / span,
                    retention: (self.assumptions.client_retention_rate * elapsed / span)
                        .max(retention_floor),
                }
            })
            .collect()
    }
}

/// Summed principal of active contracts maturing within `days` of `now`.
/// Already-matured contracts still count; the buckets are cumulative.
fn maturing_principal(active: &[&Contract], now: DateTime<Utc>, days: i64) -> Decimal {
    let horizon = now + Duration::days(days);
    active
        .iter()
        .filter(|c| c.end_date <= horizon)
        .map(|c| c.principal())
        .sum()
}

fn maturing_count(active: &[&Contract], now: DateTime<Utc>, days: i64) -> u64 {
    let horizon = now + Duration::days(days);
    active.iter().filter(|c| c.end_date <= horizon).count() as u64
}

/// Percentage with a guarded denominator: zero denominator reads as zero.
fn ratio_pct(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{KycRecord, Product};
    use rust_decimal_macros::dec;

    fn reference_now() -> DateTime<Utc> {
        // Mid-August: the evolution series spans June, July, August.
        Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap()
    }

    fn engine() -> KpiEngine {
        KpiEngine::new(KpiAssumptions::default())
    }

    fn contract(
        user_id: Uuid,
        product_id: Uuid,
        amount: &str,
        status: ContractStatus,
        end_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            amount: amount.to_string(),
            status,
            start_date: created_at,
            end_date,
            created_at,
            updated_at: created_at,
        }
    }

    fn product(id: Uuid, rate: &str) -> Product {
        Product {
            id,
            name: "Fixed Income 12M".to_string(),
            interest_rate: rate.to_string(),
            created_at: reference_now() - Duration::days(400),
        }
    }

    fn user(role: UserRole, created_at: DateTime<Utc>) -> User {
        let id = Uuid::new_v4();
        User {
            id,
            name: format!("user-{id}"),
            email: format!("{id}@example.com"),
            role,
            created_at,
        }
    }

    fn kyc(status: KycStatus) -> KycRecord {
        KycRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            created_at: reference_now() - Duration::days(3),
        }
    }

    #[test]
    fn empty_dataset_yields_defined_fallbacks() {
        let snapshot = engine()
            .compute(&EntitySnapshot::default(), reference_now())
            .unwrap();

        assert_eq!(snapshot.financial.total_aum, Decimal::ZERO);
        assert_eq!(snapshot.financial.monthly_growth_ratio, Decimal::ZERO);
        assert_eq!(snapshot.financial.average_portfolio_return, Decimal::ZERO);
        assert_eq!(snapshot.clients.average_ticket_per_client, Decimal::ZERO);
        assert_eq!(snapshot.clients.pending_kyc_percentage, Decimal::ZERO);
        assert_eq!(snapshot.operational.kyc_completion_rate, dec!(100));
        assert_eq!(snapshot.clients.renewal_rate, dec!(100));
        assert_eq!(snapshot.business_health.status, HealthStatus::Green);
        assert_eq!(snapshot.business_health.percentage, dec!(95));
    }

    #[test]
    fn single_contract_scenario() {
        let now = reference_now();
        let product_id = Uuid::new_v4();
        let data = EntitySnapshot {
            contracts: vec![contract(
                Uuid::new_v4(),
                product_id,
                "100000",
                ContractStatus::Active,
                now + Duration::days(10),
                now - Duration::days(300),
            )],
            products: vec![product(product_id, "9.00")],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.financial.total_aum, dec!(100000));
        assert_eq!(snapshot.financial.average_portfolio_return, dec!(9.0));
        assert_eq!(snapshot.financial.liquidity_30_days, dec!(100000));
        assert_eq!(snapshot.financial.liquidity_60_days, dec!(100000));
        assert_eq!(snapshot.financial.liquidity_90_days, dec!(100000));
        assert_eq!(snapshot.operational.contracts_expiring_30_days, 1);
        assert_eq!(snapshot.operational.contracts_expiring_60_days, 1);
        assert_eq!(snapshot.operational.contracts_expiring_90_days, 1);
    }

    #[test]
    fn unresolved_product_is_excluded_from_weighted_return() {
        let now = reference_now();
        let product_id = Uuid::new_v4();
        let end = now + Duration::days(200);
        let created = now - Duration::days(100);
        let data = EntitySnapshot {
            contracts: vec![
                contract(
                    Uuid::new_v4(),
                    product_id,
                    "50000",
                    ContractStatus::Active,
                    end,
                    created,
                ),
                // Dangling product reference: excluded from numerator and
                // denominator, not treated as a zero-rate holding.
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "50000",
                    ContractStatus::Active,
                    end,
                    created,
                ),
            ],
            products: vec![product(product_id, "8.00")],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.financial.total_aum, dec!(100000));
        assert_eq!(snapshot.financial.average_portfolio_return, dec!(8.00));
    }

    #[test]
    fn liquidity_ladder_is_cumulative_and_monotonic() {
        let now = reference_now();
        let created = now - Duration::days(100);
        let data = EntitySnapshot {
            contracts: vec![
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "10000",
                    ContractStatus::Active,
                    now + Duration::days(20),
                    created,
                ),
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "20000",
                    ContractStatus::Active,
                    now + Duration::days(45),
                    created,
                ),
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "40000",
                    ContractStatus::Active,
                    now + Duration::days(80),
                    created,
                ),
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "80000",
                    ContractStatus::Active,
                    now + Duration::days(200),
                    created,
                ),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();
        let financial = &snapshot.financial;

        assert_eq!(financial.liquidity_30_days, dec!(10000));
        assert_eq!(financial.liquidity_60_days, dec!(30000));
        assert_eq!(financial.liquidity_90_days, dec!(70000));
        assert!(financial.liquidity_30_days <= financial.liquidity_60_days);
        assert!(financial.liquidity_60_days <= financial.liquidity_90_days);
        assert_eq!(snapshot.operational.contracts_expiring_30_days, 1);
        assert_eq!(snapshot.operational.contracts_expiring_60_days, 2);
        assert_eq!(snapshot.operational.contracts_expiring_90_days, 3);
    }

    #[test]
    fn low_renewal_rate_wins_over_at_risk_rule() {
        let now = reference_now();
        // One expired contract: floor(0.7 * 1) = 0 renewals, rate 0 < 50.
        let mut contracts = vec![contract(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "10000",
            ContractStatus::Completed,
            now - Duration::days(5),
            now - Duration::days(400),
        )];
        // Plenty of soon-maturing actives so the at-risk percentage is high
        // too; the red rule must still win.
        for _ in 0..5 {
            contracts.push(contract(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "10",
                ContractStatus::Active,
                now + Duration::days(5),
                now - Duration::days(200),
            ));
        }
        let data = EntitySnapshot {
            contracts,
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.clients.renewal_rate, Decimal::ZERO);
        assert!(snapshot.business_health.contracts_at_risk_percentage > dec!(10));
        assert_eq!(snapshot.business_health.status, HealthStatus::Red);
        assert_eq!(snapshot.business_health.percentage, dec!(45));
    }

    #[test]
    fn capital_outflow_forces_red_status() {
        let now = reference_now();
        let mut cancelled = contract(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "15000",
            ContractStatus::Cancelled,
            now + Duration::days(100),
            now - Duration::days(60),
        );
        cancelled.updated_at = now - Duration::days(2);
        let data = EntitySnapshot {
            contracts: vec![
                cancelled,
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "10000",
                    ContractStatus::Active,
                    now + Duration::days(300),
                    now - Duration::days(3),
                ),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.financial.new_capital_month, dec!(10000));
        assert_eq!(snapshot.financial.withdrawn_capital_month, dec!(15000));
        assert_eq!(snapshot.financial.monthly_growth_ratio, dec!(-50));
        // Renewal rate is 100 (nothing expired), so only the outflow rule
        // can trip red here.
        assert_eq!(snapshot.clients.renewal_rate, dec!(100));
        assert_eq!(snapshot.business_health.status, HealthStatus::Red);
    }

    #[test]
    fn partial_renewal_rate_yields_yellow() {
        let now = reference_now();
        // Three expired contracts: floor(0.7 * 3) = 2 renewals, rate 66.7%.
        let contracts = (0..3)
            .map(|_| {
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "5000",
                    ContractStatus::Completed,
                    now - Duration::days(30),
                    now - Duration::days(400),
                )
            })
            .collect();
        let data = EntitySnapshot {
            contracts,
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.clients.renewals, 2);
        assert_eq!(snapshot.clients.non_renewals, 1);
        assert!(snapshot.clients.renewal_rate >= dec!(50));
        assert!(snapshot.clients.renewal_rate < dec!(80));
        assert_eq!(snapshot.business_health.status, HealthStatus::Yellow);
        assert_eq!(snapshot.business_health.percentage, dec!(85));
    }

    #[test]
    fn client_aggregates_and_stable_top_ranking() {
        let now = reference_now();
        let end = now + Duration::days(300);
        let created = now - Duration::days(90);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let data = EntitySnapshot {
            contracts: vec![
                contract(a, Uuid::new_v4(), "30000", ContractStatus::Active, end, created),
                contract(b, Uuid::new_v4(), "40000", ContractStatus::Active, end, created),
                contract(a, Uuid::new_v4(), "20000", ContractStatus::Active, end, created),
                // Same total as B; A-then-B insertion order must hold for A's
                // aggregate, while C ties with nobody.
                contract(c, Uuid::new_v4(), "10000", ContractStatus::Active, end, created),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.clients.active_clients, 3);
        assert_eq!(
            snapshot.clients.average_ticket_per_client,
            dec!(100000) / dec!(3)
        );
        let ranked: Vec<Uuid> = snapshot
            .clients
            .top_clients
            .iter()
            .map(|t| t.user_id)
            .collect();
        assert_eq!(ranked, vec![a, b, c]);
        assert_eq!(snapshot.clients.top_clients[0].total_amount, dec!(50000));
    }

    #[test]
    fn top_client_ties_keep_first_seen_order() {
        let now = reference_now();
        let end = now + Duration::days(300);
        let created = now - Duration::days(90);
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let data = EntitySnapshot {
            contracts: vec![
                contract(first, Uuid::new_v4(), "40000", ContractStatus::Active, end, created),
                contract(second, Uuid::new_v4(), "40000", ContractStatus::Active, end, created),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();
        let ranked: Vec<Uuid> = snapshot
            .clients
            .top_clients
            .iter()
            .map(|t| t.user_id)
            .collect();
        assert_eq!(ranked, vec![first, second]);
    }

    #[test]
    fn new_clients_month_counts_distinct_users() {
        let now = reference_now();
        let end = now + Duration::days(300);
        let this_month = now - Duration::days(2);
        let last_month = now - Duration::days(45);
        let repeat = Uuid::new_v4();
        let data = EntitySnapshot {
            contracts: vec![
                contract(repeat, Uuid::new_v4(), "1000", ContractStatus::Active, end, this_month),
                contract(repeat, Uuid::new_v4(), "1000", ContractStatus::Active, end, this_month),
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "1000",
                    ContractStatus::ReadyToStart,
                    end,
                    this_month,
                ),
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "1000",
                    ContractStatus::Active,
                    end,
                    last_month,
                ),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();
        assert_eq!(snapshot.clients.new_clients_month, 2);
    }

    #[test]
    fn kyc_percentages() {
        let now = reference_now();
        let data = EntitySnapshot {
            kyc_records: vec![
                kyc(KycStatus::Pending),
                kyc(KycStatus::Pending),
                kyc(KycStatus::Approved),
                kyc(KycStatus::Rejected),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        assert_eq!(snapshot.clients.pending_kyc, 2);
        assert_eq!(snapshot.clients.pending_kyc_percentage, dec!(50));
        assert_eq!(snapshot.operational.kyc_completion_rate, dec!(50));
    }

    #[test]
    fn partner_kpis_use_capped_activity_and_simulated_volumes() {
        let now = reference_now();
        let end = now + Duration::days(300);
        let data = EntitySnapshot {
            contracts: vec![
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "90000",
                    ContractStatus::Active,
                    end,
                    now - Duration::days(3),
                ),
                contract(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "30000",
                    ContractStatus::Active,
                    end,
                    now - Duration::days(60),
                ),
            ],
            users: vec![
                user(UserRole::Partner, now - Duration::days(200)),
                user(UserRole::Partner, now - Duration::days(200)),
                user(UserRole::Partner, now - Duration::days(1)),
                user(UserRole::Client, now - Duration::days(200)),
            ],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();
        let partners = &snapshot.partners;

        assert_eq!(partners.active_partners, 2);
        assert_eq!(partners.inactive_partners, 1);
        assert_eq!(partners.new_partners_month, 1);
        // 1% of the 90000 created this month.
        assert_eq!(partners.total_commissions_month, dec!(900));
        // Two active clients across the cap of two active partners.
        assert_eq!(partners.partner_conversion_ratio, dec!(1));

        // AUM 120000 over 3 partners, decreasing 20% per rank.
        let volumes: Vec<Decimal> = partners
            .top_partners
            .iter()
            .map(|p| p.simulated_volume)
            .collect();
        assert_eq!(volumes, vec![dec!(40000), dec!(32000.0), dec!(24000.0)]);
    }

    #[test]
    fn revenue_combines_commissions_and_management_fee() {
        let now = reference_now();
        let data = EntitySnapshot {
            contracts: vec![contract(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "200000",
                ContractStatus::Active,
                now + Duration::days(300),
                now - Duration::days(2),
            )],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();

        // 1% of 200000 new capital + 1.5% of 200000 AUM.
        assert_eq!(snapshot.partners.total_commissions_month, dec!(2000));
        assert_eq!(snapshot.strategic.total_revenue_ytd, dec!(5000));
        assert_eq!(snapshot.strategic.client_retention_rate, dec!(100));
        assert_eq!(snapshot.strategic.client_growth_rate, dec!(25));
    }

    #[test]
    fn monthly_evolution_projects_from_june_epoch() {
        let now = reference_now(); // August
        let data = EntitySnapshot {
            contracts: vec![contract(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "90000",
                ContractStatus::Active,
                now + Duration::days(300),
                now - Duration::days(100),
            )],
            ..Default::default()
        };

        let snapshot = engine().compute(&data, now).unwrap();
        let series = &snapshot.monthly_evolution;

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].month, "June");
        assert_eq!(series[1].month, "July");
        assert_eq!(series[2].month, "August");
        assert_eq!(series[0].capital, dec!(30000));
        assert_eq!(series[1].capital, dec!(60000));
        assert_eq!(series[2].capital, dec!(90000));
        // Retention is floored at 75 for the interpolated early points.
        assert_eq!(series[0].retention, dec!(75));
        assert_eq!(series[1].retention, dec!(75));
        assert_eq!(series[2].retention, dec!(100));
        // The last point always carries the current totals.
        assert_eq!(series[2].clients, Decimal::from(snapshot.clients.active_clients));
        assert_eq!(series[2].revenue, snapshot.strategic.total_revenue_ytd);
    }

    #[test]
    fn monthly_evolution_is_empty_before_june() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let snapshot = engine().compute(&EntitySnapshot::default(), now).unwrap();
        assert!(snapshot.monthly_evolution.is_empty());
    }

    #[test]
    fn recomputation_with_same_inputs_is_identical() {
        let now = reference_now();
        let product_id = Uuid::new_v4();
        let data = EntitySnapshot {
            contracts: vec![contract(
                Uuid::new_v4(),
                product_id,
                "75000",
                ContractStatus::Active,
                now + Duration::days(40),
                now - Duration::days(10),
            )],
            products: vec![product(product_id, "11.50")],
            users: vec![user(UserRole::Partner, now - Duration::days(30))],
            kyc_records: vec![kyc(KycStatus::Pending)],
        };

        let first = engine().compute(&data, now).unwrap();
        let second = engine().compute(&data, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let now = reference_now();
        let snapshot = engine().compute(&EntitySnapshot::default(), now).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json["financial"]["totalAum"].is_string() || json["financial"]["totalAum"].is_number());
        assert!(json["financial"].get("liquidity30Days").is_some());
        assert!(json["operational"].get("contractsExpiring90Days").is_some());
        assert_eq!(json["businessHealth"]["status"], "green");
        assert!(json.get("calculatedAt").is_some());
    }
}
