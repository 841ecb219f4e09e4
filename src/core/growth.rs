//! Balance compounding with recurring contributions and dividend reinvestment.
//!
//! Every savings-style calculator (DCA, retirement, HSA, compound interest, the 401k match
//! projection and both sides of the account comparisons) runs through [`simulate_growth`]
//! and differs only in the plan it builds and the adjustment it applies to the result.

use super::error::{
    CalcResult, MAX_GROWTH_PERIODS, ensure_amount, ensure_growth_rate, ensure_periods, ensure_rate,
};
use super::types::{Compounding, ContributionTiming, GrowthPlan, GrowthResult, GrowthSnapshot};

/// `(1 + rate)^periods` for a fractional `rate`.
pub(crate) fn compound_factor(rate: f64, periods: u32) -> f64 {
    let base = 1.0 + rate;
    match i32::try_from(periods) {
        Ok(n) => base.powi(n),
        Err(_) => base.powf(f64::from(periods)),
    }
}

impl GrowthPlan {
    /// Plan spanning `years` at the given compounding, with one snapshot per year.
    pub fn annual(
        opening_balance: f64,
        contribution_per_period: f64,
        years: u32,
        annual_return_percent: f64,
        compounding: Compounding,
    ) -> Self {
        let periods_per_year = compounding.periods_per_year();
        Self {
            opening_balance,
            periodic_contribution: contribution_per_period,
            total_periods: years.saturating_mul(periods_per_year),
            periodic_rate_percent: annual_return_percent / periods_per_year as f64,
            dividend_yield_percent: None,
            snapshot_every: periods_per_year,
            contribution_timing: ContributionTiming::default(),
        }
    }

    /// Reinvests `periodic_yield_percent` of the post-contribution balance every period.
    pub fn with_dividend_yield(mut self, periodic_yield_percent: f64) -> Self {
        self.dividend_yield_percent = Some(periodic_yield_percent);
        self
    }

    pub fn with_timing(mut self, timing: ContributionTiming) -> Self {
        self.contribution_timing = timing;
        self
    }
}

/// Running totals of one trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GrowthState {
    pub balance: f64,
    pub contributed: f64,
    pub dividends: f64,
}

impl GrowthState {
    pub fn opening(plan: &GrowthPlan) -> Self {
        Self {
            balance: plan.opening_balance,
            contributed: plan.opening_balance,
            dividends: 0.0,
        }
    }

    pub fn step(&mut self, plan: &GrowthPlan) {
        let growth = 1.0 + plan.periodic_rate_percent / 100.0;
        match plan.contribution_timing {
            ContributionTiming::EndOfPeriod => {
                self.balance *= growth;
                self.contribute(plan.periodic_contribution);
            }
            ContributionTiming::StartOfPeriod => {
                self.contribute(plan.periodic_contribution);
                self.balance *= growth;
            }
        }
        if let Some(yield_percent) = plan.dividend_yield_percent {
            let dividend = self.balance * yield_percent / 100.0;
            self.balance += dividend;
            self.dividends += dividend;
        }
    }

    fn contribute(&mut self, amount: f64) {
        self.balance += amount;
        self.contributed += amount;
    }

    fn snapshot(&self, period_index: u32) -> GrowthSnapshot {
        GrowthSnapshot {
            period_index,
            balance: self.balance,
            contributed: self.contributed,
            dividends: self.dividends,
        }
    }
}

pub fn simulate_growth(plan: &GrowthPlan) -> CalcResult<GrowthResult> {
    validate_plan(plan)?;

    let mut state = GrowthState::opening(plan);
    let mut snapshots = Vec::new();
    for period_index in 1..=plan.total_periods {
        state.step(plan);
        let on_interval = plan.snapshot_every > 0 && period_index % plan.snapshot_every == 0;
        if on_interval || period_index == plan.total_periods {
            snapshots.push(state.snapshot(period_index));
        }
    }

    Ok(GrowthResult {
        closing_balance: state.balance,
        total_contributed: state.contributed,
        total_earnings: state.balance - state.contributed,
        dividend_income_accrued: state.dividends,
        snapshots,
    })
}

pub(crate) fn validate_plan(plan: &GrowthPlan) -> CalcResult<()> {
    ensure_periods("total_periods", i64::from(plan.total_periods), MAX_GROWTH_PERIODS)?;
    ensure_amount("opening_balance", plan.opening_balance)?;
    ensure_amount("periodic_contribution", plan.periodic_contribution)?;
    ensure_growth_rate("periodic_rate_percent", plan.periodic_rate_percent)?;
    if let Some(yield_percent) = plan.dividend_yield_percent {
        ensure_rate("dividend_yield_percent", yield_percent, None)?;
    }
    Ok(())
}
