use serde::Serialize;

use super::error::{CalcError, CalcResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Compounding {
    Daily,
    Monthly,
    Quarterly,
    Annually,
}

impl Compounding {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Compounding::Daily => 365,
            Compounding::Monthly => 12,
            Compounding::Quarterly => 4,
            Compounding::Annually => 1,
        }
    }
}

/// Where the recurring contribution lands relative to the period's growth.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContributionTiming {
    /// Ordinary annuity: grow, then contribute.
    #[default]
    EndOfPeriod,
    /// Annuity due: contribute, then grow.
    StartOfPeriod,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    Affordable,
    NonPositiveBudget,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum AccountType {
    Roth,
    Traditional,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum HousingChoice {
    Buy,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub extra_monthly_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub period_index: u32,
    pub payment_total: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub remaining_balance: f64,
    pub cumulative_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub principal: f64,
    pub base_periodic_payment: f64,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub payoff_period_count: u32,
    pub baseline_total_interest: f64,
    pub interest_saved_vs_baseline: f64,
    pub periods_saved: u32,
    pub schedule: Vec<AmortizationRow>,
}

/// Calendar month, `month` in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> CalcResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CalcError::InvalidMonth { value: month });
        }
        Ok(Self { year, month })
    }

    pub fn plus_months(self, months: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(months);
        Self {
            year: i32::try_from(index.div_euclid(12)).unwrap_or(i32::MAX),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPlan {
    pub opening_balance: f64,
    pub periodic_contribution: f64,
    pub total_periods: u32,
    pub periodic_rate_percent: f64,
    pub dividend_yield_percent: Option<f64>,
    /// Snapshot interval in periods; 0 records only the final period.
    pub snapshot_every: u32,
    pub contribution_timing: ContributionTiming,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSnapshot {
    pub period_index: u32,
    pub balance: f64,
    pub contributed: f64,
    pub dividends: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    pub closing_balance: f64,
    pub total_contributed: f64,
    pub total_earnings: f64,
    pub dividend_income_accrued: f64,
    pub snapshots: Vec<GrowthSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffordabilityQuery {
    pub gross_annual_income: f64,
    pub monthly_debt_obligations: f64,
    pub down_payment: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub property_tax_rate_percent: f64,
    pub monthly_insurance: f64,
    pub dti_ceiling_percent: f64,
}

impl AffordabilityQuery {
    pub const DEFAULT_DTI_CEILING_PERCENT: f64 = 43.0;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub principal_interest: f64,
    pub taxes: f64,
    pub insurance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityResult {
    pub status: BudgetStatus,
    pub max_home_price: f64,
    pub max_loan_amount: f64,
    pub monthly_breakdown: MonthlyBreakdown,
    pub total_monthly_payment: f64,
    pub resulting_dti_percent: f64,
    pub income_required: f64,
}

/// Outcome of a two-option comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict<O> {
    pub preferred: O,
    pub difference: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchInput {
    pub salary: f64,
    pub contribution_percent: f64,
    pub match_rate_percent: f64,
    pub match_limit_percent: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    pub annual_return_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub employee_annual: f64,
    pub employer_match: f64,
    pub total_annual: f64,
    pub match_fully_captured: bool,
    pub missed_match: f64,
    pub employer_match_future_value: f64,
    pub total_future_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RothInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_balance: f64,
    pub annual_contribution: f64,
    pub annual_return_percent: f64,
    pub current_tax_rate_percent: f64,
    pub retirement_tax_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RothComparison {
    pub roth: GrowthResult,
    pub traditional: GrowthResult,
    pub traditional_annual_contribution: f64,
    pub roth_after_tax: f64,
    pub traditional_after_tax: f64,
    pub verdict: Verdict<AccountType>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentVsBuyInput {
    pub home_price: f64,
    pub down_payment: f64,
    pub annual_rate_percent: f64,
    pub loan_term_years: u32,
    pub property_tax_rate_percent: f64,
    pub monthly_insurance: f64,
    pub maintenance_rate_percent: f64,
    pub home_appreciation_percent: f64,
    pub monthly_rent: f64,
    pub rent_increase_percent: f64,
    pub investment_return_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthPoint {
    pub year: u32,
    pub buy_net_worth: f64,
    pub rent_net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyResult {
    pub buy_net_worth: f64,
    pub buy_monthly_payment: f64,
    pub mortgage_payment: f64,
    pub buy_total_interest: f64,
    pub remaining_loan_balance: f64,
    pub home_equity: f64,
    pub home_appreciation: f64,
    pub rent_net_worth: f64,
    pub rent_total_paid: f64,
    pub invested_down_payment: f64,
    pub invested_savings: f64,
    pub monthly_cash_flow_difference: f64,
    pub break_even_year: Option<u32>,
    pub yearly: Vec<NetWorthPoint>,
    pub verdict: Verdict<HousingChoice>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcaInput {
    pub initial_investment: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    pub annual_return_percent: f64,
    pub dividend_yield_percent: f64,
    pub tax_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaResult {
    pub growth: GrowthResult,
    pub after_tax_value: f64,
    pub effective_annual_return_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_balance: f64,
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub employer_match_percent: f64,
    pub match_limit_percent: f64,
    pub salary: f64,
    pub dividend_yield_percent: f64,
    pub capital_gains_tax_percent: f64,
}

impl RetirementInput {
    pub const DEFAULT_CAPITAL_GAINS_TAX_PERCENT: f64 = 15.0;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementResult {
    pub growth: GrowthResult,
    pub monthly_employer_match: f64,
    pub employee_contributions: f64,
    pub employer_match_total: f64,
    pub total_earnings: f64,
    pub after_tax_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsaInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_balance: f64,
    pub annual_contribution: f64,
    pub annual_return_percent: f64,
    pub tax_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HsaResult {
    pub growth: GrowthResult,
    pub tax_savings: f64,
    pub equivalent_taxable_balance: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundInput {
    pub principal: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    pub annual_return_percent: f64,
    pub compounding: Compounding,
    pub tax_rate_percent: f64,
    pub inflation_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResult {
    pub growth: GrowthResult,
    pub after_tax_value: f64,
    pub inflation_adjusted_value: f64,
    pub effective_annual_return_percent: Option<f64>,
}
