use super::error::{CalcResult, ensure_amount, ensure_rate, years_between};
use super::growth::simulate_growth;
use super::types::{Compounding, GrowthPlan, MatchInput, MatchResult};

pub fn calculate_match(input: &MatchInput) -> CalcResult<MatchResult> {
    ensure_amount("salary", input.salary)?;
    ensure_rate("contribution_percent", input.contribution_percent, None)?;
    ensure_rate("match_rate_percent", input.match_rate_percent, None)?;
    ensure_rate("match_limit_percent", input.match_limit_percent, None)?;
    let years = years_between(input.current_age, input.retirement_age)?;

    let match_rate = input.match_rate_percent / 100.0;
    let employee_annual = input.salary * (input.contribution_percent / 100.0);
    let employer_cap = input.salary * (input.match_limit_percent / 100.0);
    let employer_match = employee_annual.min(employer_cap) * match_rate;
    let total_annual = employee_annual + employer_match;

    let match_fully_captured = input.contribution_percent >= input.match_limit_percent;
    let missed_match = if match_fully_captured {
        0.0
    } else {
        (employer_cap - employee_annual).max(0.0) * match_rate
    };

    let project = |annual_contribution: f64| {
        let plan = GrowthPlan::annual(
            0.0,
            annual_contribution,
            years,
            input.annual_return_percent,
            Compounding::Annually,
        );
        simulate_growth(&plan).map(|growth| growth.closing_balance)
    };

    Ok(MatchResult {
        employee_annual,
        employer_match,
        total_annual,
        match_fully_captured,
        missed_match,
        employer_match_future_value: project(employer_match)?,
        total_future_value: project(total_annual)?,
    })
}
