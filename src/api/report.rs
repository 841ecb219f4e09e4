//! Plain-text summaries printed by the CLI.

use crate::core::format::{
    format_compact, format_month_year, format_percent, format_usd, format_usd_cents,
    format_years_months,
};
use crate::core::{
    AccountType, AffordabilityResult, BudgetStatus, DcaResult, GrowthResult, HousingChoice,
    HsaResult, MatchResult, RentVsBuyResult, RetirementResult, RothComparison,
};

use super::{CompoundOutcome, GOAL_SEARCH_YEARS, MortgageOutcome};

const LABEL_WIDTH: usize = 30;

#[derive(Default)]
struct Report {
    text: String,
}

impl Report {
    fn heading(&mut self, title: &str) -> &mut Self {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(title);
        self.text.push('\n');
        self
    }

    fn line(&mut self, label: &str, value: impl AsRef<str>) -> &mut Self {
        let value = value.as_ref();
        self.text.push_str(&format!("  {label:<width$}{value}\n", width = LABEL_WIDTH));
        self
    }

    fn raw(&mut self, line: String) -> &mut Self {
        self.text.push_str(&line);
        self.text.push('\n');
        self
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

pub(super) fn mortgage(outcome: &MortgageOutcome, extra_payment: f64, schedule: bool) -> String {
    let result = &outcome.result;
    let mut report = Report::default();
    report
        .heading("Mortgage payoff")
        .line("Loan amount", format_usd(result.principal))
        .line("Monthly payment", format_usd_cents(result.base_periodic_payment))
        .line("Total interest", format_usd(result.total_interest_paid))
        .line("Total paid", format_usd(result.total_paid))
        .line("Paid off in", format_years_months(result.payoff_period_count));
    if let Some(month) = outcome.payoff_month {
        report.line("Final payment", format_month_year(month));
    }
    if extra_payment > 0.0 {
        report
            .line("Extra each month", format_usd_cents(extra_payment))
            .line("Interest saved", format_usd(result.interest_saved_vs_baseline))
            .line("Time saved", format_years_months(result.periods_saved));
    }
    if schedule {
        report.heading("Schedule").raw(format!(
            "  {:>6}  {:>12}  {:>12}  {:>12}  {:>14}",
            "Month", "Payment", "Principal", "Interest", "Balance"
        ));
        for row in &result.schedule {
            report.raw(format!(
                "  {:>6}  {:>12}  {:>12}  {:>12}  {:>14}",
                row.period_index,
                format_usd_cents(row.payment_total),
                format_usd_cents(row.principal_portion),
                format_usd_cents(row.interest_portion),
                format_usd_cents(row.remaining_balance),
            ));
        }
    }
    report.finish()
}

pub(super) fn affordability(result: &AffordabilityResult) -> String {
    let mut report = Report::default();
    report.heading("Home affordability");
    if result.status == BudgetStatus::NonPositiveBudget {
        return report
            .line("Max home price", format_usd(0.0))
            .raw("  Existing debts leave no room for housing under the DTI ceiling.".into())
            .finish();
    }
    let breakdown = &result.monthly_breakdown;
    report
        .line("Max home price", format_usd(result.max_home_price))
        .line("Loan amount", format_usd(result.max_loan_amount))
        .line("Principal & interest", format_usd_cents(breakdown.principal_interest))
        .line("Property taxes", format_usd_cents(breakdown.taxes))
        .line("Insurance", format_usd_cents(breakdown.insurance))
        .line("Total monthly payment", format_usd_cents(result.total_monthly_payment))
        .line("Resulting DTI", format_percent(result.resulting_dti_percent, 1))
        .line("Income required", format_usd(result.income_required))
        .finish()
}

fn growth_lines(report: &mut Report, growth: &GrowthResult) {
    report
        .line("Final balance", format_usd(growth.closing_balance))
        .line("Total contributed", format_usd(growth.total_contributed))
        .line("Total earnings", format_usd(growth.total_earnings));
    if growth.dividend_income_accrued > 0.0 {
        report.line("Dividends reinvested", format_usd(growth.dividend_income_accrued));
    }
}

fn yearly_balances(report: &mut Report, growth: &GrowthResult, periods_per_year: u32) {
    report.heading("Balance by year");
    for snapshot in &growth.snapshots {
        let year = snapshot.period_index.div_ceil(periods_per_year.max(1));
        report.raw(format!(
            "  {year:>4}  {:>10}",
            format_compact(snapshot.balance.round())
        ));
    }
}

pub(super) fn dca(result: &DcaResult) -> String {
    let mut report = Report::default();
    report.heading("Dollar-cost averaging");
    growth_lines(&mut report, &result.growth);
    report.line("After-tax value", format_usd(result.after_tax_value));
    if let Some(effective) = result.effective_annual_return_percent {
        report.line("Effective annual return", format_percent(effective, 2));
    }
    yearly_balances(&mut report, &result.growth, 12);
    report.finish()
}

pub(super) fn retirement(result: &RetirementResult) -> String {
    let mut report = Report::default();
    report
        .heading("Retirement savings")
        .line("Balance at retirement", format_usd(result.growth.closing_balance))
        .line("Your contributions", format_usd(result.employee_contributions))
        .line("Employer match", format_usd(result.employer_match_total))
        .line("Monthly employer match", format_usd_cents(result.monthly_employer_match))
        .line("Investment earnings", format_usd(result.total_earnings))
        .line("After-tax value", format_usd(result.after_tax_value));
    yearly_balances(&mut report, &result.growth, 12);
    report.finish()
}

pub(super) fn hsa(result: &HsaResult) -> String {
    let mut report = Report::default();
    report.heading("Health savings account");
    growth_lines(&mut report, &result.growth);
    report
        .line("Tax savings", format_usd(result.tax_savings))
        .line("Taxable equivalent", format_usd(result.equivalent_taxable_balance))
        .line("Total value", format_usd(result.total_value))
        .finish()
}

pub(super) fn compound(outcome: &CompoundOutcome) -> String {
    let result = &outcome.result;
    let mut report = Report::default();
    report.heading("Compound interest");
    growth_lines(&mut report, &result.growth);
    report
        .line("After-tax value", format_usd(result.after_tax_value))
        .line("In today's dollars", format_usd(result.inflation_adjusted_value));
    if let Some(effective) = result.effective_annual_return_percent {
        report.line("Effective annual return", format_percent(effective, 2));
    }
    if let Some(goal) = outcome.goal {
        let reached = match outcome.years_to_goal {
            Some(1) => "1 year".to_string(),
            Some(years) => format!("{years} years"),
            None => format!("not within {GOAL_SEARCH_YEARS} years"),
        };
        report.line(&format!("Time to {}", format_usd(goal)), reached);
    }
    report.finish()
}

pub(super) fn match_401k(result: &MatchResult) -> String {
    let mut report = Report::default();
    report
        .heading("401k employer match")
        .line("Your contribution", format_usd(result.employee_annual))
        .line("Employer match", format_usd(result.employer_match))
        .line("Total per year", format_usd(result.total_annual))
        .line("Match value at retirement", format_usd(result.employer_match_future_value))
        .line("Total at retirement", format_usd(result.total_future_value));
    if result.match_fully_captured {
        report.raw("  Full employer match captured.".to_string());
    } else {
        report.line("Match left on the table", format_usd(result.missed_match));
    }
    report.finish()
}

pub(super) fn roth(result: &RothComparison) -> String {
    let winner = match result.verdict.preferred {
        AccountType::Roth => "Roth",
        AccountType::Traditional => "Traditional",
    };
    Report::default()
        .heading("Roth vs Traditional")
        .line("Roth after tax", format_usd(result.roth_after_tax))
        .line("Traditional after tax", format_usd(result.traditional_after_tax))
        .line(
            "Traditional yearly deposit",
            format_usd(result.traditional_annual_contribution),
        )
        .line(
            "Better choice",
            format!("{winner} by {}", format_usd(result.verdict.difference)),
        )
        .finish()
}

pub(super) fn rent_vs_buy(result: &RentVsBuyResult) -> String {
    let winner = match result.verdict.preferred {
        HousingChoice::Buy => "Buying",
        HousingChoice::Rent => "Renting",
    };
    let break_even = match result.break_even_year {
        Some(year) => format!("year {year}"),
        None => "never within the horizon".to_string(),
    };
    let mut report = Report::default();
    report
        .heading("Buying")
        .line("Monthly cost", format_usd_cents(result.buy_monthly_payment))
        .line("Mortgage payment", format_usd_cents(result.mortgage_payment))
        .line("Interest paid", format_usd(result.buy_total_interest))
        .line("Home equity", format_usd(result.home_equity))
        .line("Appreciation", format_usd(result.home_appreciation))
        .line("Net worth", format_usd(result.buy_net_worth))
        .heading("Renting")
        .line("Rent paid", format_usd(result.rent_total_paid))
        .line("Invested down payment", format_usd(result.invested_down_payment))
        .line("Invested savings", format_usd(result.invested_savings))
        .line("Net worth", format_usd(result.rent_net_worth))
        .heading("Verdict")
        .line(
            "Better choice",
            format!("{winner} by {}", format_usd(result.verdict.difference)),
        )
        .line("Buying catches up", break_even)
        .heading("Net worth by year");
    for point in &result.yearly {
        report.raw(format!(
            "  {:>4}  buy {:>10}  rent {:>10}",
            point.year,
            format_compact(point.buy_net_worth.round()),
            format_compact(point.rent_net_worth.round()),
        ));
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        AffordabilityArgs, Calculator, CompoundArgs, MortgageArgs, RentVsBuyArgs, RothArgs,
    };

    #[test]
    fn mortgage_report_lists_payment_and_savings() {
        let args = MortgageArgs {
            principal: 120_000.0,
            annual_rate: 0.0,
            term_years: 10,
            extra_payment: 1_000.0,
            schedule: true,
            first_payment_year: Some(2030),
            first_payment_month: 1,
        };
        let result = args.evaluate().expect("valid input");
        let text = args.render(&result);
        assert!(text.contains("Monthly payment"));
        assert!(text.contains("$1,000.00"));
        assert!(text.contains("Paid off in                   5 years"));
        assert!(text.contains("Final payment                 Dec 2034"));
        assert!(text.contains("Time saved                    5 years"));
        assert_eq!(text.lines().filter(|l| l.contains("$2,000.00")).count(), 60);
    }

    #[test]
    fn mortgage_report_omits_final_payment_without_a_start() {
        let args = MortgageArgs::default();
        let text = args.render(&args.evaluate().expect("valid input"));
        assert!(!text.contains("Final payment"));
    }

    #[test]
    fn affordability_report_explains_empty_budget() {
        let args = AffordabilityArgs {
            monthly_debts: 10_000.0,
            ..AffordabilityArgs::default()
        };
        let result = args.evaluate().expect("valid input");
        let text = args.render(&result);
        assert!(text.contains("no room for housing"));
        assert!(!text.contains("Resulting DTI"));
    }

    #[test]
    fn comparison_reports_name_the_winner() {
        let roth = RothArgs::default();
        let text = roth.render(&roth.evaluate().expect("valid input"));
        assert!(text.contains("Better choice                 Traditional by $"));

        let rent = RentVsBuyArgs::default();
        let result = rent.evaluate().expect("valid input");
        let text = rent.render(&result);
        assert!(text.contains("Net worth by year"));
        assert_eq!(
            text.lines().filter(|l| l.contains(" buy ")).count(),
            result.yearly.len()
        );
    }

    #[test]
    fn compound_report_includes_goal_line() {
        let args = CompoundArgs {
            goal: Some(1_000_000_000.0),
            monthly_contribution: 0.0,
            principal: 1.0,
            annual_return: 0.0,
            ..CompoundArgs::default()
        };
        let text = args.render(&args.evaluate().expect("valid input"));
        assert!(text.contains("Time to $1,000,000,000"));
        assert!(text.contains("not within 100 years"));
    }
}
