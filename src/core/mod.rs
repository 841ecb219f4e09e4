mod affordability;
mod amortization;
mod compare;
mod error;
pub mod format;
mod growth;
mod match401k;
mod savings;
mod types;

pub use affordability::solve_affordability;
pub use amortization::{amortize, monthly_rate, periodic_payment};
pub use compare::{compare_rent_vs_buy, compare_roth_traditional};
pub use error::{CalcError, CalcResult};
pub use growth::simulate_growth;
pub use match401k::calculate_match;
pub use savings::{
    calculate_compound, calculate_dca, calculate_hsa, calculate_retirement, years_to_goal,
};
pub use types::{
    AccountType, AffordabilityQuery, AffordabilityResult, AmortizationResult, AmortizationRow,
    BudgetStatus, CompoundInput, CompoundResult, Compounding, ContributionTiming, DcaInput,
    DcaResult, GrowthPlan, GrowthResult, GrowthSnapshot, HousingChoice, HsaInput, HsaResult,
    LoanTerms, MatchInput, MatchResult, MonthlyBreakdown, NetWorthPoint, RentVsBuyInput,
    RentVsBuyResult, RetirementInput, RetirementResult, RothComparison, RothInput, Verdict,
    YearMonth,
};
