use super::error::{
    CalcResult, ensure_amount, ensure_percent, ensure_rate, ensure_years, years_between,
};
use super::growth::{GrowthState, compound_factor, simulate_growth, validate_plan};
use super::types::{
    Compounding, CompoundInput, CompoundResult, DcaInput, DcaResult, GrowthPlan, HsaInput,
    HsaResult, RetirementInput, RetirementResult,
};

pub fn calculate_dca(input: &DcaInput) -> CalcResult<DcaResult> {
    ensure_years("years", input.years)?;
    ensure_percent("tax_rate_percent", input.tax_rate_percent)?;
    ensure_rate("dividend_yield_percent", input.dividend_yield_percent, None)?;

    let plan = GrowthPlan::annual(
        input.initial_investment,
        input.monthly_contribution,
        input.years,
        input.annual_return_percent,
        Compounding::Monthly,
    )
    .with_dividend_yield(input.dividend_yield_percent / 12.0);
    let growth = simulate_growth(&plan)?;

    Ok(DcaResult {
        after_tax_value: tax_earnings(
            growth.closing_balance,
            growth.total_earnings,
            input.tax_rate_percent,
        ),
        effective_annual_return_percent: effective_annual_return(
            input.initial_investment,
            growth.closing_balance,
            input.years,
        ),
        growth,
    })
}

pub fn calculate_retirement(input: &RetirementInput) -> CalcResult<RetirementResult> {
    let years = years_between(input.current_age, input.retirement_age)?;
    ensure_amount("monthly_contribution", input.monthly_contribution)?;
    ensure_amount("salary", input.salary)?;
    ensure_rate("employer_match_percent", input.employer_match_percent, None)?;
    ensure_rate("match_limit_percent", input.match_limit_percent, None)?;
    ensure_rate("dividend_yield_percent", input.dividend_yield_percent, None)?;
    ensure_percent("capital_gains_tax_percent", input.capital_gains_tax_percent)?;

    // Match is fixed up front: capped at the limit share of monthly salary.
    let match_cap = input.salary / 12.0 * (input.match_limit_percent / 100.0);
    let monthly_employer_match =
        input.monthly_contribution.min(match_cap) * (input.employer_match_percent / 100.0);

    let plan = GrowthPlan::annual(
        input.current_balance,
        input.monthly_contribution + monthly_employer_match,
        years,
        input.annual_return_percent,
        Compounding::Monthly,
    )
    .with_dividend_yield(input.dividend_yield_percent / 12.0);
    let growth = simulate_growth(&plan)?;

    let months = f64::from(plan.total_periods);
    let employee_contributions = input.current_balance + input.monthly_contribution * months;
    let employer_match_total = monthly_employer_match * months;
    let total_earnings = growth.closing_balance - employee_contributions - employer_match_total;

    Ok(RetirementResult {
        after_tax_value: tax_earnings(
            growth.closing_balance,
            total_earnings,
            input.capital_gains_tax_percent,
        ),
        monthly_employer_match,
        employee_contributions,
        employer_match_total,
        total_earnings,
        growth,
    })
}

pub fn calculate_hsa(input: &HsaInput) -> CalcResult<HsaResult> {
    let years = years_between(input.current_age, input.retirement_age)?;
    ensure_rate("tax_rate_percent", input.tax_rate_percent, Some(100.0))?;

    let plan = GrowthPlan::annual(
        input.current_balance,
        input.annual_contribution,
        years,
        input.annual_return_percent,
        Compounding::Annually,
    );
    let growth = simulate_growth(&plan)?;

    let tax_share = input.tax_rate_percent / 100.0;
    let tax_savings = (growth.total_contributed - input.current_balance) * tax_share;
    Ok(HsaResult {
        equivalent_taxable_balance: growth.closing_balance / (1.0 - tax_share),
        total_value: growth.closing_balance + tax_savings,
        tax_savings,
        growth,
    })
}

pub fn calculate_compound(input: &CompoundInput) -> CalcResult<CompoundResult> {
    ensure_years("years", input.years)?;
    ensure_percent("tax_rate_percent", input.tax_rate_percent)?;
    ensure_rate("inflation_rate_percent", input.inflation_rate_percent, None)?;

    let periods_per_year = input.compounding.periods_per_year();
    let contribution_per_period = input.monthly_contribution * 12.0 / periods_per_year as f64;
    let plan = GrowthPlan::annual(
        input.principal,
        contribution_per_period,
        input.years,
        input.annual_return_percent,
        input.compounding,
    );
    let growth = simulate_growth(&plan)?;

    let inflation = compound_factor(input.inflation_rate_percent / 100.0, input.years);
    Ok(CompoundResult {
        after_tax_value: tax_earnings(
            growth.closing_balance,
            growth.total_earnings,
            input.tax_rate_percent,
        ),
        inflation_adjusted_value: growth.closing_balance / inflation,
        effective_annual_return_percent: effective_annual_return(
            input.principal,
            growth.closing_balance,
            input.years,
        ),
        growth,
    })
}

/// Whole years of monthly saving needed for the balance to reach `goal`.
///
/// Returns `None` when the goal is still out of reach after `max_years`.
pub fn years_to_goal(
    opening_balance: f64,
    monthly_contribution: f64,
    goal: f64,
    annual_return_percent: f64,
    max_years: u32,
) -> CalcResult<Option<u32>> {
    ensure_amount("goal", goal)?;
    let plan = GrowthPlan::annual(
        opening_balance,
        monthly_contribution,
        max_years,
        annual_return_percent,
        Compounding::Monthly,
    );
    validate_plan(&plan)?;

    let mut state = GrowthState::opening(&plan);
    if state.balance >= goal {
        return Ok(Some(0));
    }
    for year in 1..=max_years {
        for _ in 0..12 {
            state.step(&plan);
        }
        if state.balance >= goal {
            return Ok(Some(year));
        }
    }
    Ok(None)
}

/// Balance after the earnings portion is taxed at `tax_rate_percent`.
fn tax_earnings(balance: f64, earnings: f64, tax_rate_percent: f64) -> f64 {
    balance - earnings.max(0.0) * (tax_rate_percent / 100.0)
}

/// Annualized growth of the opening amount alone; undefined for an empty start.
fn effective_annual_return(opening: f64, closing: f64, years: u32) -> Option<f64> {
    if opening <= 0.0 || years == 0 {
        return None;
    }
    Some(((closing / opening).powf(1.0 / years as f64) - 1.0) * 100.0)
}
