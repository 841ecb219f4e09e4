use tracing::debug;

use super::amortization::{monthly_rate, periodic_payment};
use super::error::{CalcError, CalcResult, ensure_amount, ensure_rate, ensure_term_months};
use super::growth::compound_factor;
use super::types::{AffordabilityQuery, AffordabilityResult, BudgetStatus, MonthlyBreakdown};

/// Fixed bisection depth. 100 halvings of any realistic price range is far below a cent.
const SEARCH_ITERATIONS: u32 = 100;

#[derive(Debug, Clone, Copy)]
struct HousingCost {
    loan: f64,
    principal_interest: f64,
    taxes: f64,
    insurance: f64,
}

impl HousingCost {
    fn total(self) -> f64 {
        self.principal_interest + self.taxes + self.insurance
    }
}

pub fn solve_affordability(query: &AffordabilityQuery) -> CalcResult<AffordabilityResult> {
    validate_query(query)?;

    let monthly_income = query.gross_annual_income / 12.0;
    let budget =
        monthly_income * (query.dti_ceiling_percent / 100.0) - query.monthly_debt_obligations;
    if budget <= 0.0 || query.monthly_insurance > budget {
        debug!(budget, "no housing budget left after debts");
        return Ok(non_positive_budget(query));
    }

    let rate = monthly_rate(query.annual_rate_percent);
    let max_loan = analytical_max_loan(budget, rate, query.term_months);

    let mut lo = 0.0;
    let mut hi = 2.0 * max_loan + query.down_payment;
    let mut best = 0.0;
    for _ in 0..SEARCH_ITERATIONS {
        let mid = (lo + hi) * 0.5;
        if housing_cost(query, rate, mid).total() <= budget {
            best = mid;
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let cost = housing_cost(query, rate, best);
    let total = cost.total();
    debug!(max_home_price = best, budget, total, "affordability search converged");

    Ok(AffordabilityResult {
        status: BudgetStatus::Affordable,
        max_home_price: best,
        max_loan_amount: cost.loan,
        monthly_breakdown: MonthlyBreakdown {
            principal_interest: cost.principal_interest,
            taxes: cost.taxes,
            insurance: cost.insurance,
        },
        total_monthly_payment: total,
        resulting_dti_percent: (total + query.monthly_debt_obligations) / monthly_income * 100.0,
        income_required: (total + query.monthly_debt_obligations) * 12.0,
    })
}

/// Largest loan whose payment alone fits `budget`, ignoring taxes and insurance.
fn analytical_max_loan(budget: f64, rate: f64, months: u32) -> f64 {
    if rate.abs() < 1e-12 {
        return budget * months as f64;
    }
    budget / rate * (1.0 - 1.0 / compound_factor(rate, months))
}

fn housing_cost(query: &AffordabilityQuery, rate: f64, price: f64) -> HousingCost {
    let loan = (price - query.down_payment).max(0.0);
    HousingCost {
        loan,
        principal_interest: periodic_payment(loan, rate, query.term_months),
        taxes: price * (query.property_tax_rate_percent / 100.0 / 12.0),
        insurance: query.monthly_insurance,
    }
}

fn non_positive_budget(query: &AffordabilityQuery) -> AffordabilityResult {
    AffordabilityResult {
        status: BudgetStatus::NonPositiveBudget,
        max_home_price: 0.0,
        max_loan_amount: 0.0,
        monthly_breakdown: MonthlyBreakdown {
            principal_interest: 0.0,
            taxes: 0.0,
            insurance: 0.0,
        },
        total_monthly_payment: 0.0,
        resulting_dti_percent: 0.0,
        income_required: query.monthly_debt_obligations * 12.0,
    }
}

fn validate_query(query: &AffordabilityQuery) -> CalcResult<()> {
    ensure_term_months("term_months", query.term_months)?;
    ensure_amount("gross_annual_income", query.gross_annual_income)?;
    ensure_amount("monthly_debt_obligations", query.monthly_debt_obligations)?;
    ensure_amount("down_payment", query.down_payment)?;
    ensure_amount("monthly_insurance", query.monthly_insurance)?;
    ensure_rate("annual_rate_percent", query.annual_rate_percent, None)?;
    ensure_rate("property_tax_rate_percent", query.property_tax_rate_percent, None)?;
    let dti = query.dti_ceiling_percent;
    if !dti.is_finite() || dti <= 0.0 || dti > 100.0 {
        return Err(CalcError::InvalidRate {
            field: "dti_ceiling_percent",
            value: dti,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_query() -> AffordabilityQuery {
        AffordabilityQuery {
            gross_annual_income: 120_000.0,
            monthly_debt_obligations: 500.0,
            down_payment: 60_000.0,
            annual_rate_percent: 6.5,
            term_months: 360,
            property_tax_rate_percent: 1.2,
            monthly_insurance: 150.0,
            dti_ceiling_percent: AffordabilityQuery::DEFAULT_DTI_CEILING_PERCENT,
        }
    }

    #[test]
    fn converged_price_spends_the_whole_budget() {
        let query = sample_query();
        let result = solve_affordability(&query).expect("valid query");
        let budget = 120_000.0 / 12.0 * 0.43 - 500.0;

        assert_eq!(result.status, BudgetStatus::Affordable);
        assert!(result.max_home_price > query.down_payment);
        assert_close(result.total_monthly_payment, budget, 0.01);
        assert_close(result.resulting_dti_percent, 43.0, 0.01);
        assert_close(result.max_loan_amount, result.max_home_price - 60_000.0, 1e-6);
        assert_close(
            result.monthly_breakdown.taxes,
            result.max_home_price * 0.012 / 12.0,
            1e-6,
        );
        assert_eq!(result.monthly_breakdown.insurance, 150.0);
    }

    #[test]
    fn zero_rate_uses_straight_line_payment() {
        let mut query = sample_query();
        query.annual_rate_percent = 0.0;
        query.property_tax_rate_percent = 0.0;
        query.monthly_insurance = 0.0;
        let result = solve_affordability(&query).expect("valid query");
        let budget = 120_000.0 / 12.0 * 0.43 - 500.0;
        assert_close(result.max_loan_amount, budget * 360.0, 0.01);
    }

    #[test]
    fn debts_exceeding_the_ceiling_report_non_positive_budget() {
        let mut query = sample_query();
        query.monthly_debt_obligations = 5_000.0;
        let result = solve_affordability(&query).expect("not an error");
        assert_eq!(result.status, BudgetStatus::NonPositiveBudget);
        assert_eq!(result.max_home_price, 0.0);
        assert_eq!(result.total_monthly_payment, 0.0);
        assert!(result.max_home_price.is_finite());
    }

    #[test]
    fn insurance_alone_over_budget_is_non_positive_budget() {
        let mut query = sample_query();
        query.monthly_debt_obligations = 4_000.0;
        query.monthly_insurance = 400.0;
        let result = solve_affordability(&query).expect("not an error");
        assert_eq!(result.status, BudgetStatus::NonPositiveBudget);
    }

    #[test]
    fn invalid_dti_ceiling_is_rejected() {
        let mut query = sample_query();
        query.dti_ceiling_percent = 0.0;
        assert!(matches!(
            solve_affordability(&query),
            Err(CalcError::InvalidRate {
                field: "dti_ceiling_percent",
                ..
            })
        ));
    }

    #[test]
    fn terms_past_the_cap_are_rejected_without_overflow() {
        let mut query = sample_query();
        query.term_months = 2_147_483_648;
        assert!(matches!(
            solve_affordability(&query),
            Err(CalcError::InvalidTerm {
                field: "term_months",
                ..
            })
        ));
        query.term_months = 1_201;
        assert!(solve_affordability(&query).is_err());
        query.term_months = 1_200;
        let longest = solve_affordability(&query).expect("longest accepted term");
        assert!(longest.max_home_price.is_finite());
    }

    #[test]
    fn analytical_loan_matches_payment_formula() {
        let rate = monthly_rate(6.0);
        let loan = analytical_max_loan(1_199.10, rate, 360);
        assert_close(periodic_payment(loan, rate, 360), 1_199.10, 1e-6);
        assert_close(loan, 200_000.0, 1.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(40))]

        #[test]
        fn prop_resulting_dti_respects_ceiling(
            income in 20_000u32..500_000,
            debts in 0u32..3_000,
            down in 0u32..200_000,
            rate_bp in 0u32..1_200,
            term_years in 5u32..41,
            tax_bp in 0u32..300,
            insurance in 0u32..400,
            dti in 20u32..60
        ) {
            let query = AffordabilityQuery {
                gross_annual_income: income as f64,
                monthly_debt_obligations: debts as f64,
                down_payment: down as f64,
                annual_rate_percent: rate_bp as f64 / 100.0,
                term_months: term_years * 12,
                property_tax_rate_percent: tax_bp as f64 / 100.0,
                monthly_insurance: insurance as f64,
                dti_ceiling_percent: dti as f64,
            };
            let result = solve_affordability(&query).expect("valid query");
            prop_assert!(result.max_home_price >= 0.0);
            prop_assert!(result.max_home_price.is_finite());
            prop_assert!(result.resulting_dti_percent <= dti as f64 + 0.1);
        }
    }
}
