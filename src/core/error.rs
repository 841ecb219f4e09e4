use thiserror::Error;

/// Rejected calculation input.
///
/// Inputs arrive from form controls that already clamp ranges, so anything that lands here
/// is reported back to the caller for re-prompting rather than silently coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("{field} must be between 1 and {max}, got {value}")]
    InvalidTerm {
        field: &'static str,
        value: i64,
        max: u32,
    },
    #[error("{field} must be a finite, non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("{field} is out of range: {value}")]
    InvalidRate { field: &'static str, value: f64 },
    #[error("month must be between 1 and 12, got {value}")]
    InvalidMonth { value: u32 },
}

pub type CalcResult<T> = Result<T, CalcError>;

/// Longest loan term accepted, in months.
pub const MAX_TERM_MONTHS: u32 = 1_200;
/// Longest savings or comparison horizon accepted, in years.
pub const MAX_HORIZON_YEARS: u32 = 100;
/// Upper bound on simulated periods: the longest horizon at daily compounding.
pub const MAX_GROWTH_PERIODS: u32 = MAX_HORIZON_YEARS * 365;

pub(crate) fn ensure_amount(field: &'static str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::InvalidAmount { field, value });
    }
    Ok(())
}

/// Non-negative rate with an exclusive upper bound (`None` for unbounded).
pub(crate) fn ensure_rate(field: &'static str, value: f64, below: Option<f64>) -> CalcResult<()> {
    let out_of_range = !value.is_finite() || value < 0.0 || below.is_some_and(|max| value >= max);
    if out_of_range {
        return Err(CalcError::InvalidRate { field, value });
    }
    Ok(())
}

/// Growth or return rate in percent; may be negative but never wipes out the base.
pub(crate) fn ensure_growth_rate(field: &'static str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value <= -100.0 {
        return Err(CalcError::InvalidRate { field, value });
    }
    Ok(())
}

/// Share of a whole, `0..=100`.
pub(crate) fn ensure_percent(field: &'static str, value: f64) -> CalcResult<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CalcError::InvalidRate { field, value });
    }
    Ok(())
}

/// Period count in `1..=max`.
pub(crate) fn ensure_periods(field: &'static str, value: i64, max: u32) -> CalcResult<u32> {
    match u32::try_from(value) {
        Ok(periods) if (1..=max).contains(&periods) => Ok(periods),
        _ => Err(CalcError::InvalidTerm { field, value, max }),
    }
}

pub(crate) fn ensure_term_months(field: &'static str, months: u32) -> CalcResult<u32> {
    ensure_periods(field, i64::from(months), MAX_TERM_MONTHS)
}

pub(crate) fn ensure_years(field: &'static str, years: u32) -> CalcResult<u32> {
    ensure_periods(field, i64::from(years), MAX_HORIZON_YEARS)
}

pub(crate) fn years_between(current_age: u32, retirement_age: u32) -> CalcResult<u32> {
    ensure_periods(
        "years until retirement",
        i64::from(retirement_age) - i64::from(current_age),
        MAX_HORIZON_YEARS,
    )
}
