use tracing::debug;

use super::error::{CalcResult, ensure_amount, ensure_rate, ensure_term_months};
use super::growth::compound_factor;
use super::types::{AmortizationResult, AmortizationRow, LoanTerms, YearMonth};

/// Remaining balance below this is treated as paid off.
const BALANCE_EPSILON: f64 = 1e-7;

pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Fixed annuity payment for `principal` over `periods` at `periodic_rate` (a fraction).
///
/// A zero rate falls back to straight-line repayment instead of evaluating the annuity
/// formula's `0/0` form. A term long enough to overflow the growth factor converges to the
/// interest-only payment.
pub fn periodic_payment(principal: f64, periodic_rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return principal;
    }
    if periodic_rate.abs() < 1e-12 {
        return principal / periods as f64;
    }
    let growth = compound_factor(periodic_rate, periods);
    if !growth.is_finite() {
        return principal * periodic_rate;
    }
    principal * periodic_rate * growth / (growth - 1.0)
}

pub fn amortize(terms: &LoanTerms) -> CalcResult<AmortizationResult> {
    validate_terms(terms)?;

    let rate = monthly_rate(terms.annual_rate_percent);
    let payment = periodic_payment(terms.principal, rate, terms.term_months);

    let actual = run_schedule(
        terms.principal,
        rate,
        payment,
        terms.extra_monthly_payment,
        terms.term_months,
    );
    let (baseline_interest, baseline_periods) = if terms.extra_monthly_payment > 0.0 {
        let baseline = run_schedule(terms.principal, rate, payment, 0.0, terms.term_months);
        (baseline.total_interest, baseline.rows.len())
    } else {
        (actual.total_interest, actual.rows.len())
    };

    let payoff_period_count = actual.rows.len() as u32;
    debug!(
        principal = terms.principal,
        payment,
        payoff_period_count,
        term_months = terms.term_months,
        "amortized loan"
    );

    Ok(AmortizationResult {
        principal: terms.principal,
        base_periodic_payment: payment,
        total_interest_paid: actual.total_interest,
        total_paid: terms.principal + actual.total_interest,
        payoff_period_count,
        baseline_total_interest: baseline_interest,
        interest_saved_vs_baseline: baseline_interest - actual.total_interest,
        periods_saved: baseline_periods.saturating_sub(actual.rows.len()) as u32,
        schedule: actual.rows,
    })
}

impl AmortizationResult {
    /// Outstanding balance once `periods` payments have been made.
    pub fn balance_after(&self, periods: u32) -> f64 {
        if periods == 0 {
            return self.principal;
        }
        self.schedule
            .get(periods as usize - 1)
            .map(|row| row.remaining_balance)
            .unwrap_or(0.0)
    }

    /// Calendar month of the last payment when the first one falls in `first_payment`.
    /// `None` when nothing was borrowed.
    pub fn payoff_month(&self, first_payment: YearMonth) -> Option<YearMonth> {
        let last = self.payoff_period_count.checked_sub(1)?;
        Some(first_payment.plus_months(last))
    }

    /// Interest paid across the first `periods` payments.
    pub fn interest_through(&self, periods: u32) -> f64 {
        let paid = (periods as usize).min(self.schedule.len());
        if paid == 0 {
            return 0.0;
        }
        self.schedule[paid - 1].cumulative_interest
    }
}

fn validate_terms(terms: &LoanTerms) -> CalcResult<()> {
    ensure_term_months("term_months", terms.term_months)?;
    ensure_amount("principal", terms.principal)?;
    ensure_rate("annual_rate_percent", terms.annual_rate_percent, None)?;
    ensure_amount("extra_monthly_payment", terms.extra_monthly_payment)?;
    Ok(())
}

struct ScheduleRun {
    rows: Vec<AmortizationRow>,
    total_interest: f64,
}

fn run_schedule(principal: f64, rate: f64, payment: f64, extra: f64, term: u32) -> ScheduleRun {
    let mut balance = principal;
    let mut cumulative_interest = 0.0;
    let mut rows = Vec::with_capacity(term as usize);

    for period_index in 1..=term {
        if balance <= 0.0 {
            break;
        }
        let interest = balance * rate;
        let mut principal_portion = (payment - interest + extra).max(0.0);
        // The last scheduled period always clears whatever float residue is left.
        if period_index == term || principal_portion >= balance - BALANCE_EPSILON {
            principal_portion = balance;
        }
        balance -= principal_portion;
        cumulative_interest += interest;

        rows.push(AmortizationRow {
            period_index,
            payment_total: principal_portion + interest,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
            cumulative_interest,
        });
    }

    ScheduleRun {
        rows,
        total_interest: cumulative_interest,
    }
}
