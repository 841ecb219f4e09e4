//! Two-trajectory comparisons: Roth vs Traditional, and renting vs buying.

use tracing::debug;

use super::amortization::amortize;
use super::error::{
    CalcResult, ensure_amount, ensure_growth_rate, ensure_percent, ensure_rate, ensure_years,
    years_between,
};
use super::growth::{compound_factor, simulate_growth};
use super::types::{
    AccountType, Compounding, GrowthPlan, HousingChoice, LoanTerms, NetWorthPoint, RentVsBuyInput,
    RentVsBuyResult, RothComparison, RothInput, Verdict,
};

/// Picks `a` only when it is strictly ahead; ties go to `b`.
fn decide<O>(a_value: f64, b_value: f64, a: O, b: O) -> Verdict<O> {
    Verdict {
        preferred: if a_value > b_value { a } else { b },
        difference: (a_value - b_value).abs(),
    }
}

pub fn compare_roth_traditional(input: &RothInput) -> CalcResult<RothComparison> {
    let years = years_between(input.current_age, input.retirement_age)?;
    ensure_amount("annual_contribution", input.annual_contribution)?;
    ensure_rate("current_tax_rate_percent", input.current_tax_rate_percent, Some(100.0))?;
    ensure_percent("retirement_tax_rate_percent", input.retirement_tax_rate_percent)?;

    // Traditional invests the pre-tax dollars it takes to net the same Roth contribution.
    let traditional_annual_contribution =
        input.annual_contribution / (1.0 - input.current_tax_rate_percent / 100.0);

    let plan_for = |contribution: f64| {
        GrowthPlan::annual(
            input.current_balance,
            contribution,
            years,
            input.annual_return_percent,
            Compounding::Annually,
        )
    };
    let roth = simulate_growth(&plan_for(input.annual_contribution))?;
    let traditional = simulate_growth(&plan_for(traditional_annual_contribution))?;

    let roth_after_tax = roth.closing_balance;
    let traditional_after_tax =
        traditional.closing_balance * (1.0 - input.retirement_tax_rate_percent / 100.0);

    Ok(RothComparison {
        verdict: decide(
            roth_after_tax,
            traditional_after_tax,
            AccountType::Roth,
            AccountType::Traditional,
        ),
        roth,
        traditional,
        traditional_annual_contribution,
        roth_after_tax,
        traditional_after_tax,
    })
}

pub fn compare_rent_vs_buy(input: &RentVsBuyInput) -> CalcResult<RentVsBuyResult> {
    validate_rent_vs_buy(input)?;
    let years = input.years;
    let price = input.home_price;
    let down = input.down_payment;

    // Buy side. An all-cash purchase carries no loan.
    let principal = (price - down).max(0.0);
    let loan = if principal > 0.0 {
        Some(amortize(&LoanTerms {
            principal,
            annual_rate_percent: input.annual_rate_percent,
            term_months: input.loan_term_years * 12,
            extra_monthly_payment: 0.0,
        })?)
    } else {
        None
    };
    let balance_after = |months: u32| loan.as_ref().map_or(0.0, |l| l.balance_after(months));
    let mortgage_payment = loan.as_ref().map_or(0.0, |l| l.base_periodic_payment);
    let monthly_tax = price * (input.property_tax_rate_percent / 100.0 / 12.0);
    let monthly_maintenance = price * (input.maintenance_rate_percent / 100.0 / 12.0);
    let buy_monthly_payment =
        mortgage_payment + monthly_tax + input.monthly_insurance + monthly_maintenance;

    // Rent side: whatever buying would have cost beyond rent gets invested monthly.
    let monthly_savings = (buy_monthly_payment - input.monthly_rent).max(0.0);
    let savings = simulate_growth(&GrowthPlan::annual(
        0.0,
        monthly_savings,
        years,
        input.investment_return_percent,
        Compounding::Monthly,
    ))?;

    let appreciation_rate = input.home_appreciation_percent / 100.0;
    let investment_rate = input.investment_return_percent / 100.0;
    let mut yearly = Vec::with_capacity(years as usize);
    for (year, snapshot) in (1..=years).zip(&savings.snapshots) {
        let equity = price - balance_after(year * 12);
        let appreciation = price * compound_factor(appreciation_rate, year) - price;
        let invested_down = down * compound_factor(investment_rate, year);
        yearly.push(NetWorthPoint {
            year,
            buy_net_worth: down + equity + appreciation,
            rent_net_worth: invested_down + snapshot.balance,
        });
    }

    let break_even_year = yearly
        .iter()
        .find(|point| point.buy_net_worth >= point.rent_net_worth)
        .map(|point| point.year);

    let months = years * 12;
    let remaining_loan_balance = balance_after(months);
    let home_equity = price - remaining_loan_balance;
    let home_appreciation = price * compound_factor(appreciation_rate, years) - price;
    let buy_net_worth = down + home_equity + home_appreciation;
    let invested_down_payment = down * compound_factor(investment_rate, years);
    let invested_savings = savings.closing_balance;
    let rent_net_worth = invested_down_payment + invested_savings;

    let rent_rate = input.rent_increase_percent / 100.0;
    let rent_total_paid = (0..years)
        .map(|year| input.monthly_rent * 12.0 * compound_factor(rent_rate, year))
        .sum();

    debug!(
        buy_net_worth,
        rent_net_worth,
        ?break_even_year,
        "projected rent vs buy"
    );

    Ok(RentVsBuyResult {
        buy_net_worth,
        buy_monthly_payment,
        mortgage_payment,
        buy_total_interest: loan.as_ref().map_or(0.0, |l| l.interest_through(months)),
        remaining_loan_balance,
        home_equity,
        home_appreciation,
        rent_net_worth,
        rent_total_paid,
        invested_down_payment,
        invested_savings,
        monthly_cash_flow_difference: buy_monthly_payment - input.monthly_rent,
        break_even_year,
        yearly,
        verdict: decide(
            buy_net_worth,
            rent_net_worth,
            HousingChoice::Buy,
            HousingChoice::Rent,
        ),
    })
}

fn validate_rent_vs_buy(input: &RentVsBuyInput) -> CalcResult<()> {
    ensure_years("years", input.years)?;
    ensure_amount("home_price", input.home_price)?;
    ensure_amount("down_payment", input.down_payment)?;
    if input.home_price > input.down_payment {
        ensure_years("loan_term_years", input.loan_term_years)?;
    }
    ensure_amount("monthly_insurance", input.monthly_insurance)?;
    ensure_amount("monthly_rent", input.monthly_rent)?;
    ensure_rate("property_tax_rate_percent", input.property_tax_rate_percent, None)?;
    ensure_rate("maintenance_rate_percent", input.maintenance_rate_percent, None)?;
    ensure_growth_rate("home_appreciation_percent", input.home_appreciation_percent)?;
    ensure_growth_rate("rent_increase_percent", input.rent_increase_percent)?;
    ensure_growth_rate("investment_return_percent", input.investment_return_percent)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CalcError;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn roth_input() -> RothInput {
        RothInput {
            current_age: 30,
            retirement_age: 65,
            current_balance: 10_000.0,
            annual_contribution: 7_000.0,
            annual_return_percent: 7.0,
            current_tax_rate_percent: 22.0,
            retirement_tax_rate_percent: 12.0,
        }
    }

    fn rent_vs_buy_input() -> RentVsBuyInput {
        RentVsBuyInput {
            home_price: 400_000.0,
            down_payment: 80_000.0,
            annual_rate_percent: 6.5,
            loan_term_years: 30,
            property_tax_rate_percent: 1.1,
            monthly_insurance: 125.0,
            maintenance_rate_percent: 1.0,
            home_appreciation_percent: 3.5,
            monthly_rent: 2_200.0,
            rent_increase_percent: 3.0,
            investment_return_percent: 7.0,
            years: 10,
        }
    }

    #[test]
    fn lower_retirement_bracket_favours_traditional() {
        let result = compare_roth_traditional(&roth_input()).expect("valid input");
        assert_close(result.traditional_annual_contribution, 7_000.0 / 0.78, 1e-9);
        assert_eq!(result.verdict.preferred, AccountType::Traditional);
        assert_close(
            result.verdict.difference,
            result.traditional_after_tax - result.roth_after_tax,
            1e-9,
        );
    }

    #[test]
    fn higher_retirement_bracket_favours_roth() {
        let mut input = roth_input();
        input.current_tax_rate_percent = 12.0;
        input.retirement_tax_rate_percent = 32.0;
        let result = compare_roth_traditional(&input).expect("valid input");
        assert_eq!(result.verdict.preferred, AccountType::Roth);
        assert!(result.verdict.difference > 0.0);
    }

    #[test]
    fn equal_brackets_tie_to_traditional_with_zero_balance() {
        let mut input = roth_input();
        input.current_balance = 0.0;
        input.current_tax_rate_percent = 25.0;
        input.retirement_tax_rate_percent = 25.0;
        let result = compare_roth_traditional(&input).expect("valid input");
        assert!(result.verdict.difference < 1e-6);
    }

    #[test]
    fn full_current_tax_rate_is_rejected() {
        let mut input = roth_input();
        input.current_tax_rate_percent = 100.0;
        assert!(matches!(
            compare_roth_traditional(&input),
            Err(CalcError::InvalidRate { .. })
        ));
    }

    #[test]
    fn rent_vs_buy_net_worths_follow_their_components() {
        let input = rent_vs_buy_input();
        let result = compare_rent_vs_buy(&input).expect("valid input");

        assert_close(result.home_equity, 400_000.0 - result.remaining_loan_balance, 1e-9);
        assert_close(
            result.buy_net_worth,
            80_000.0 + result.home_equity + result.home_appreciation,
            1e-6,
        );
        assert_close(
            result.rent_net_worth,
            result.invested_down_payment + result.invested_savings,
            1e-6,
        );
        assert_close(result.invested_down_payment, 80_000.0 * 1.07_f64.powi(10), 1e-6);
        assert_close(
            result.monthly_cash_flow_difference,
            result.buy_monthly_payment - 2_200.0,
            1e-9,
        );
        let expected_rent: f64 = (0..10).map(|y| 2_200.0 * 12.0 * 1.03_f64.powi(y)).sum();
        assert_close(result.rent_total_paid, expected_rent, 1e-6);
        assert!(result.remaining_loan_balance > 0.0);
        assert!(result.buy_total_interest > 0.0);
    }

    #[test]
    fn yearly_trajectory_ends_at_reported_net_worths() {
        let result = compare_rent_vs_buy(&rent_vs_buy_input()).expect("valid input");
        assert_eq!(result.yearly.len(), 10);
        let last = result.yearly.last().expect("ten years");
        assert_eq!(last.year, 10);
        assert_close(last.buy_net_worth, result.buy_net_worth, 1e-6);
        assert_close(last.rent_net_worth, result.rent_net_worth, 1e-6);
    }

    #[test]
    fn cash_purchase_has_no_mortgage() {
        let mut input = rent_vs_buy_input();
        input.down_payment = 400_000.0;
        let result = compare_rent_vs_buy(&input).expect("valid input");
        assert_eq!(result.mortgage_payment, 0.0);
        assert_eq!(result.remaining_loan_balance, 0.0);
        assert_eq!(result.buy_total_interest, 0.0);
    }

    #[test]
    fn horizon_past_the_loan_term_has_paid_off_house() {
        let mut input = rent_vs_buy_input();
        input.loan_term_years = 15;
        input.years = 20;
        let result = compare_rent_vs_buy(&input).expect("valid input");
        assert_eq!(result.remaining_loan_balance, 0.0);
        assert_close(result.home_equity, 400_000.0, 1e-9);
    }

    #[test]
    fn expensive_rent_leaves_nothing_to_invest() {
        let mut input = rent_vs_buy_input();
        input.monthly_rent = 10_000.0;
        let result = compare_rent_vs_buy(&input).expect("valid input");
        assert_eq!(result.invested_savings, 0.0);
        assert_eq!(result.verdict.preferred, HousingChoice::Buy);
        assert_eq!(result.break_even_year, Some(1));
    }

    #[test]
    fn interest_free_purchase_matches_hand_computed_totals() {
        let input = RentVsBuyInput {
            home_price: 120_000.0,
            down_payment: 0.0,
            annual_rate_percent: 0.0,
            loan_term_years: 10,
            property_tax_rate_percent: 1.2,
            monthly_insurance: 100.0,
            maintenance_rate_percent: 1.0,
            home_appreciation_percent: 0.0,
            monthly_rent: 1_000.0,
            rent_increase_percent: 0.0,
            investment_return_percent: 6.0,
            years: 5,
        };
        let result = compare_rent_vs_buy(&input).expect("valid input");

        // 1000 principal + 120 tax + 100 insurance + 100 maintenance.
        assert_close(result.mortgage_payment, 1_000.0, 1e-9);
        assert_close(result.buy_monthly_payment, 1_320.0, 1e-9);
        assert_close(result.monthly_cash_flow_difference, 320.0, 1e-9);

        // The 320 a month not spent on rent, saved for 60 months at 0.5% a month.
        let r: f64 = 0.005;
        let annuity = 320.0 * ((1.0 + r).powi(60) - 1.0) / r;
        assert_close(result.invested_savings, annuity, 1e-6);
        assert_close(result.rent_net_worth, annuity, 1e-6);

        assert_close(result.remaining_loan_balance, 60_000.0, 1e-9);
        assert_close(result.home_equity, 60_000.0, 1e-9);
        assert_close(result.home_appreciation, 0.0, 1e-9);
        assert_close(result.buy_net_worth, 60_000.0, 1e-9);
        assert_close(result.rent_total_paid, 60_000.0, 1e-9);
        assert_eq!(result.buy_total_interest, 0.0);
        assert_eq!(result.verdict.preferred, HousingChoice::Buy);
    }

    #[test]
    fn loan_term_is_checked_only_when_financing() {
        let mut input = rent_vs_buy_input();
        input.loan_term_years = 0;
        assert!(matches!(
            compare_rent_vs_buy(&input),
            Err(CalcError::InvalidTerm {
                field: "loan_term_years",
                value: 0,
                ..
            })
        ));

        input.down_payment = input.home_price;
        let cash = compare_rent_vs_buy(&input).expect("all-cash purchase needs no term");
        assert_eq!(cash.mortgage_payment, 0.0);
        assert_eq!(cash.remaining_loan_balance, 0.0);
    }

    #[test]
    fn horizon_and_term_caps_apply() {
        let mut input = rent_vs_buy_input();
        input.years = 101;
        assert!(matches!(
            compare_rent_vs_buy(&input),
            Err(CalcError::InvalidTerm { field: "years", .. })
        ));
        input.years = 10;
        input.loan_term_years = 400_000_000;
        assert!(matches!(
            compare_rent_vs_buy(&input),
            Err(CalcError::InvalidTerm {
                field: "loan_term_years",
                ..
            })
        ));
    }

    #[test]
    fn zero_year_horizon_is_rejected() {
        let mut input = rent_vs_buy_input();
        input.years = 0;
        assert!(matches!(
            compare_rent_vs_buy(&input),
            Err(CalcError::InvalidTerm { .. })
        ));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_break_even_year_is_first_buy_lead(
            price in 100_000u32..1_500_000,
            down_pct in 0u32..60,
            rent in 500u32..8_000,
            appreciation_bp in 0u32..800,
            return_bp in 0u32..1_200,
            years in 1u32..31
        ) {
            let mut input = rent_vs_buy_input();
            input.home_price = price as f64;
            input.down_payment = price as f64 * down_pct as f64 / 100.0;
            input.monthly_rent = rent as f64;
            input.home_appreciation_percent = appreciation_bp as f64 / 100.0;
            input.investment_return_percent = return_bp as f64 / 100.0;
            input.years = years;

            let result = compare_rent_vs_buy(&input).expect("valid input");
            prop_assert_eq!(result.yearly.len(), years as usize);
            match result.break_even_year {
                Some(year) => {
                    let idx = (year - 1) as usize;
                    let point = &result.yearly[idx];
                    prop_assert!(point.buy_net_worth >= point.rent_net_worth);
                    for point in &result.yearly[..idx] {
                        prop_assert!(point.buy_net_worth < point.rent_net_worth);
                    }
                }
                None => {
                    for point in &result.yearly {
                        prop_assert!(point.buy_net_worth < point.rent_net_worth);
                    }
                }
            }
            prop_assert!(result.verdict.difference >= 0.0);
        }
    }
}
