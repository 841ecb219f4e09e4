use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    AffordabilityQuery, AffordabilityResult, AmortizationResult, CalcError, CalcResult,
    CompoundInput, CompoundResult, Compounding, DcaInput, DcaResult, HsaInput, HsaResult,
    LoanTerms, MatchInput, MatchResult, RentVsBuyInput, RentVsBuyResult, RetirementInput,
    RetirementResult, RothComparison, RothInput, YearMonth, amortize, calculate_compound,
    calculate_dca,
    calculate_hsa, calculate_match, calculate_retirement, compare_rent_vs_buy,
    compare_roth_traditional, solve_affordability, years_to_goal,
};

mod report;
mod server;

pub use server::{router, run_http_server};

/// Longest horizon searched when a compound-interest goal is given.
const GOAL_SEARCH_YEARS: u32 = 100;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// A calculator reachable from both the CLI and the HTTP API.
///
/// Implementors are the argument records: clap fills them from flags, serde from a query
/// string or JSON body, and any field left out keeps the CLI default.
pub trait Calculator {
    type Output: Serialize;

    fn evaluate(&self) -> CalcResult<Self::Output>;

    fn render(&self, output: &Self::Output) -> String;
}

#[derive(Parser, Debug, PartialEq)]
#[command(
    name = "fincalc",
    about = "Personal-finance calculators: mortgage payoff, affordability, savings growth \
             and account comparisons"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Print the result as pretty JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Amortization schedule with optional extra monthly payments
    Mortgage(MortgageArgs),
    /// Highest home price that fits a debt-to-income ceiling
    Affordability(AffordabilityArgs),
    /// Dollar-cost averaging with dividend reinvestment
    Dca(DcaArgs),
    /// Retirement savings with an employer match
    Retirement(RetirementArgs),
    /// Health savings account growth and tax savings
    Hsa(HsaArgs),
    /// Compound interest at a chosen frequency
    Compound(CompoundArgs),
    /// Employer 401k match capture
    #[command(name = "match-401k")]
    Match401k(MatchArgs),
    /// Roth vs Traditional after-tax comparison
    Roth(RothArgs),
    /// Net worth of renting vs buying over a horizon
    RentVsBuy(RentVsBuyArgs),
    /// Serve every calculator over HTTP
    Serve(ServeArgs),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundingArg {
    Daily,
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl From<CompoundingArg> for Compounding {
    fn from(value: CompoundingArg) -> Self {
        match value {
            CompoundingArg::Daily => Compounding::Daily,
            CompoundingArg::Monthly => Compounding::Monthly,
            CompoundingArg::Quarterly => Compounding::Quarterly,
            CompoundingArg::Annually => Compounding::Annually,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgageArgs {
    #[arg(long, default_value_t = 300_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 6.5, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,
    #[arg(long, default_value_t = 0.0, help = "Extra principal paid every month")]
    pub extra_payment: f64,
    #[arg(long, help = "Print every row of the amortization schedule")]
    pub schedule: bool,
    #[arg(long, help = "Year of the first payment; enables the payoff month")]
    pub first_payment_year: Option<i32>,
    #[arg(long, default_value_t = 1, help = "Month of the first payment, 1-12")]
    pub first_payment_month: u32,
}

impl Default for MortgageArgs {
    fn default() -> Self {
        Self {
            principal: 300_000.0,
            annual_rate: 6.5,
            term_years: 30,
            extra_payment: 0.0,
            schedule: false,
            first_payment_year: None,
            first_payment_month: 1,
        }
    }
}

impl From<&MortgageArgs> for LoanTerms {
    fn from(args: &MortgageArgs) -> Self {
        LoanTerms {
            principal: args.principal,
            annual_rate_percent: args.annual_rate,
            term_months: args.term_years.saturating_mul(12),
            extra_monthly_payment: args.extra_payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageOutcome {
    #[serde(flatten)]
    pub result: AmortizationResult,
    pub payoff_month: Option<YearMonth>,
}

impl Calculator for MortgageArgs {
    type Output = MortgageOutcome;

    fn evaluate(&self) -> CalcResult<MortgageOutcome> {
        let first_payment = self
            .first_payment_year
            .map(|year| YearMonth::new(year, self.first_payment_month))
            .transpose()?;
        let result = amortize(&self.into())?;
        let payoff_month = first_payment.and_then(|first| result.payoff_month(first));
        Ok(MortgageOutcome {
            result,
            payoff_month,
        })
    }

    fn render(&self, output: &MortgageOutcome) -> String {
        report::mortgage(output, self.extra_payment, self.schedule)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AffordabilityArgs {
    #[arg(long, default_value_t = 100_000.0)]
    pub annual_income: f64,
    #[arg(long, default_value_t = 500.0, help = "Existing monthly debt payments")]
    pub monthly_debts: f64,
    #[arg(long, default_value_t = 60_000.0)]
    pub down_payment: f64,
    #[arg(long, default_value_t = 6.5, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,
    #[arg(long, default_value_t = 1.1, help = "Annual property tax in percent of price")]
    pub property_tax_rate: f64,
    #[arg(long, default_value_t = 125.0)]
    pub monthly_insurance: f64,
    #[arg(
        long,
        default_value_t = AffordabilityQuery::DEFAULT_DTI_CEILING_PERCENT,
        help = "Maximum debt-to-income ratio in percent"
    )]
    pub dti_ceiling: f64,
}

impl Default for AffordabilityArgs {
    fn default() -> Self {
        Self {
            annual_income: 100_000.0,
            monthly_debts: 500.0,
            down_payment: 60_000.0,
            annual_rate: 6.5,
            term_years: 30,
            property_tax_rate: 1.1,
            monthly_insurance: 125.0,
            dti_ceiling: AffordabilityQuery::DEFAULT_DTI_CEILING_PERCENT,
        }
    }
}

impl From<&AffordabilityArgs> for AffordabilityQuery {
    fn from(args: &AffordabilityArgs) -> Self {
        AffordabilityQuery {
            gross_annual_income: args.annual_income,
            monthly_debt_obligations: args.monthly_debts,
            down_payment: args.down_payment,
            annual_rate_percent: args.annual_rate,
            term_months: args.term_years.saturating_mul(12),
            property_tax_rate_percent: args.property_tax_rate,
            monthly_insurance: args.monthly_insurance,
            dti_ceiling_percent: args.dti_ceiling,
        }
    }
}

impl Calculator for AffordabilityArgs {
    type Output = AffordabilityResult;

    fn evaluate(&self) -> CalcResult<AffordabilityResult> {
        solve_affordability(&self.into())
    }

    fn render(&self, output: &AffordabilityResult) -> String {
        report::affordability(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DcaArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_investment: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long, default_value_t = 7.0, help = "Expected annual return in percent")]
    pub annual_return: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual dividend yield in percent, reinvested")]
    pub dividend_yield: f64,
    #[arg(long, default_value_t = 15.0, help = "Tax on earnings in percent")]
    pub tax_rate: f64,
}

impl Default for DcaArgs {
    fn default() -> Self {
        Self {
            initial_investment: 10_000.0,
            monthly_contribution: 500.0,
            years: 30,
            annual_return: 7.0,
            dividend_yield: 0.0,
            tax_rate: 15.0,
        }
    }
}

impl From<&DcaArgs> for DcaInput {
    fn from(args: &DcaArgs) -> Self {
        DcaInput {
            initial_investment: args.initial_investment,
            monthly_contribution: args.monthly_contribution,
            years: args.years,
            annual_return_percent: args.annual_return,
            dividend_yield_percent: args.dividend_yield,
            tax_rate_percent: args.tax_rate,
        }
    }
}

impl Calculator for DcaArgs {
    type Output = DcaResult;

    fn evaluate(&self) -> CalcResult<DcaResult> {
        calculate_dca(&self.into())
    }

    fn render(&self, output: &DcaResult) -> String {
        report::dca(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 25_000.0)]
    pub current_balance: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 7.0, help = "Expected annual return in percent")]
    pub annual_return: f64,
    #[arg(long, default_value_t = 50.0, help = "Employer match in percent of contributions")]
    pub employer_match: f64,
    #[arg(long, default_value_t = 6.0, help = "Matched share of salary in percent")]
    pub match_limit: f64,
    #[arg(long, default_value_t = 75_000.0)]
    pub salary: f64,
    #[arg(long, default_value_t = 0.0)]
    pub dividend_yield: f64,
    #[arg(long, default_value_t = RetirementInput::DEFAULT_CAPITAL_GAINS_TAX_PERCENT)]
    pub capital_gains_tax: f64,
}

impl Default for RetirementArgs {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 65,
            current_balance: 25_000.0,
            monthly_contribution: 500.0,
            annual_return: 7.0,
            employer_match: 50.0,
            match_limit: 6.0,
            salary: 75_000.0,
            dividend_yield: 0.0,
            capital_gains_tax: RetirementInput::DEFAULT_CAPITAL_GAINS_TAX_PERCENT,
        }
    }
}

impl From<&RetirementArgs> for RetirementInput {
    fn from(args: &RetirementArgs) -> Self {
        RetirementInput {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            current_balance: args.current_balance,
            monthly_contribution: args.monthly_contribution,
            annual_return_percent: args.annual_return,
            employer_match_percent: args.employer_match,
            match_limit_percent: args.match_limit,
            salary: args.salary,
            dividend_yield_percent: args.dividend_yield,
            capital_gains_tax_percent: args.capital_gains_tax,
        }
    }
}

impl Calculator for RetirementArgs {
    type Output = RetirementResult;

    fn evaluate(&self) -> CalcResult<RetirementResult> {
        calculate_retirement(&self.into())
    }

    fn render(&self, output: &RetirementResult) -> String {
        report::retirement(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HsaArgs {
    #[arg(long, default_value_t = 35)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 5_000.0)]
    pub current_balance: f64,
    #[arg(long, default_value_t = 4_150.0)]
    pub annual_contribution: f64,
    #[arg(long, default_value_t = 6.0)]
    pub annual_return: f64,
    #[arg(long, default_value_t = 24.0, help = "Marginal income tax rate in percent")]
    pub tax_rate: f64,
}

impl Default for HsaArgs {
    fn default() -> Self {
        Self {
            current_age: 35,
            retirement_age: 65,
            current_balance: 5_000.0,
            annual_contribution: 4_150.0,
            annual_return: 6.0,
            tax_rate: 24.0,
        }
    }
}

impl From<&HsaArgs> for HsaInput {
    fn from(args: &HsaArgs) -> Self {
        HsaInput {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            current_balance: args.current_balance,
            annual_contribution: args.annual_contribution,
            annual_return_percent: args.annual_return,
            tax_rate_percent: args.tax_rate,
        }
    }
}

impl Calculator for HsaArgs {
    type Output = HsaResult;

    fn evaluate(&self) -> CalcResult<HsaResult> {
        calculate_hsa(&self.into())
    }

    fn render(&self, output: &HsaResult) -> String {
        report::hsa(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 200.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 20)]
    pub years: u32,
    #[arg(long, default_value_t = 7.0)]
    pub annual_return: f64,
    #[arg(long, value_enum, default_value_t = CompoundingArg::Monthly)]
    pub compounding: CompoundingArg,
    #[arg(long, default_value_t = 0.0, help = "Tax on earnings in percent")]
    pub tax_rate: f64,
    #[arg(long, default_value_t = 2.5)]
    pub inflation_rate: f64,
    #[arg(long, help = "Target balance; reports the whole years of monthly saving needed")]
    pub goal: Option<f64>,
}

impl Default for CompoundArgs {
    fn default() -> Self {
        Self {
            principal: 10_000.0,
            monthly_contribution: 200.0,
            years: 20,
            annual_return: 7.0,
            compounding: CompoundingArg::Monthly,
            tax_rate: 0.0,
            inflation_rate: 2.5,
            goal: None,
        }
    }
}

impl From<&CompoundArgs> for CompoundInput {
    fn from(args: &CompoundArgs) -> Self {
        CompoundInput {
            principal: args.principal,
            monthly_contribution: args.monthly_contribution,
            years: args.years,
            annual_return_percent: args.annual_return,
            compounding: args.compounding.into(),
            tax_rate_percent: args.tax_rate,
            inflation_rate_percent: args.inflation_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundOutcome {
    #[serde(flatten)]
    pub result: CompoundResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
    pub years_to_goal: Option<u32>,
}

impl Calculator for CompoundArgs {
    type Output = CompoundOutcome;

    fn evaluate(&self) -> CalcResult<CompoundOutcome> {
        let result = calculate_compound(&self.into())?;
        let years_to_goal = match self.goal {
            Some(goal) => years_to_goal(
                self.principal,
                self.monthly_contribution,
                goal,
                self.annual_return,
                GOAL_SEARCH_YEARS,
            )?,
            None => None,
        };
        Ok(CompoundOutcome {
            result,
            goal: self.goal,
            years_to_goal,
        })
    }

    fn render(&self, output: &CompoundOutcome) -> String {
        report::compound(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchArgs {
    #[arg(long, default_value_t = 80_000.0)]
    pub salary: f64,
    #[arg(long, default_value_t = 6.0, help = "Employee contribution in percent of salary")]
    pub contribution: f64,
    #[arg(long, default_value_t = 50.0, help = "Employer match in percent of contributions")]
    pub match_rate: f64,
    #[arg(long, default_value_t = 6.0, help = "Matched share of salary in percent")]
    pub match_limit: f64,
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 7.0)]
    pub annual_return: f64,
}

impl Default for MatchArgs {
    fn default() -> Self {
        Self {
            salary: 80_000.0,
            contribution: 6.0,
            match_rate: 50.0,
            match_limit: 6.0,
            current_age: 30,
            retirement_age: 65,
            annual_return: 7.0,
        }
    }
}

impl From<&MatchArgs> for MatchInput {
    fn from(args: &MatchArgs) -> Self {
        MatchInput {
            salary: args.salary,
            contribution_percent: args.contribution,
            match_rate_percent: args.match_rate,
            match_limit_percent: args.match_limit,
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            annual_return_percent: args.annual_return,
        }
    }
}

impl Calculator for MatchArgs {
    type Output = MatchResult;

    fn evaluate(&self) -> CalcResult<MatchResult> {
        calculate_match(&self.into())
    }

    fn render(&self, output: &MatchResult) -> String {
        report::match_401k(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RothArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 0.0)]
    pub current_balance: f64,
    #[arg(long, default_value_t = 7_000.0)]
    pub annual_contribution: f64,
    #[arg(long, default_value_t = 7.0)]
    pub annual_return: f64,
    #[arg(long, default_value_t = 22.0, help = "Marginal tax rate today in percent")]
    pub current_tax_rate: f64,
    #[arg(long, default_value_t = 12.0, help = "Expected tax rate in retirement in percent")]
    pub retirement_tax_rate: f64,
}

impl Default for RothArgs {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 65,
            current_balance: 0.0,
            annual_contribution: 7_000.0,
            annual_return: 7.0,
            current_tax_rate: 22.0,
            retirement_tax_rate: 12.0,
        }
    }
}

impl From<&RothArgs> for RothInput {
    fn from(args: &RothArgs) -> Self {
        RothInput {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            current_balance: args.current_balance,
            annual_contribution: args.annual_contribution,
            annual_return_percent: args.annual_return,
            current_tax_rate_percent: args.current_tax_rate,
            retirement_tax_rate_percent: args.retirement_tax_rate,
        }
    }
}

impl Calculator for RothArgs {
    type Output = RothComparison;

    fn evaluate(&self) -> CalcResult<RothComparison> {
        compare_roth_traditional(&self.into())
    }

    fn render(&self, output: &RothComparison) -> String {
        report::roth(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RentVsBuyArgs {
    #[arg(long, default_value_t = 400_000.0)]
    pub home_price: f64,
    #[arg(long, default_value_t = 80_000.0)]
    pub down_payment: f64,
    #[arg(long, default_value_t = 6.5, help = "Mortgage rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 30)]
    pub loan_term_years: u32,
    #[arg(long, default_value_t = 1.1)]
    pub property_tax_rate: f64,
    #[arg(long, default_value_t = 125.0)]
    pub monthly_insurance: f64,
    #[arg(long, default_value_t = 1.0, help = "Yearly maintenance in percent of price")]
    pub maintenance_rate: f64,
    #[arg(long, default_value_t = 3.5)]
    pub home_appreciation: f64,
    #[arg(long, default_value_t = 2_200.0)]
    pub monthly_rent: f64,
    #[arg(long, default_value_t = 3.0)]
    pub rent_increase: f64,
    #[arg(long, default_value_t = 7.0, help = "Return on invested savings in percent")]
    pub investment_return: f64,
    #[arg(long, default_value_t = 10, help = "Comparison horizon in years")]
    pub years: u32,
}

impl Default for RentVsBuyArgs {
    fn default() -> Self {
        Self {
            home_price: 400_000.0,
            down_payment: 80_000.0,
            annual_rate: 6.5,
            loan_term_years: 30,
            property_tax_rate: 1.1,
            monthly_insurance: 125.0,
            maintenance_rate: 1.0,
            home_appreciation: 3.5,
            monthly_rent: 2_200.0,
            rent_increase: 3.0,
            investment_return: 7.0,
            years: 10,
        }
    }
}

impl From<&RentVsBuyArgs> for RentVsBuyInput {
    fn from(args: &RentVsBuyArgs) -> Self {
        RentVsBuyInput {
            home_price: args.home_price,
            down_payment: args.down_payment,
            annual_rate_percent: args.annual_rate,
            loan_term_years: args.loan_term_years,
            property_tax_rate_percent: args.property_tax_rate,
            monthly_insurance: args.monthly_insurance,
            maintenance_rate_percent: args.maintenance_rate,
            home_appreciation_percent: args.home_appreciation,
            monthly_rent: args.monthly_rent,
            rent_increase_percent: args.rent_increase,
            investment_return_percent: args.investment_return,
            years: args.years,
        }
    }
}

impl Calculator for RentVsBuyArgs {
    type Output = RentVsBuyResult;

    fn evaluate(&self) -> CalcResult<RentVsBuyResult> {
        compare_rent_vs_buy(&self.into())
    }

    fn render(&self, output: &RentVsBuyResult) -> String {
        report::rent_vs_buy(output)
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let json = cli.json;
    match cli.command {
        Command::Mortgage(args) => print_outcome(&args, json),
        Command::Affordability(args) => print_outcome(&args, json),
        Command::Dca(args) => print_outcome(&args, json),
        Command::Retirement(args) => print_outcome(&args, json),
        Command::Hsa(args) => print_outcome(&args, json),
        Command::Compound(args) => print_outcome(&args, json),
        Command::Match401k(args) => print_outcome(&args, json),
        Command::Roth(args) => print_outcome(&args, json),
        Command::RentVsBuy(args) => print_outcome(&args, json),
        Command::Serve(args) => Ok(run_http_server(args.port).await?),
    }
}

fn print_outcome<C: Calculator>(args: &C, json: bool) -> Result<(), AppError> {
    print!("{}", outcome_text(args, json)?);
    Ok(())
}

fn outcome_text<C: Calculator>(args: &C, json: bool) -> Result<String, AppError> {
    let output = args.evaluate()?;
    if json {
        let mut text = serde_json::to_string_pretty(&output)?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(args.render(&output))
    }
}
