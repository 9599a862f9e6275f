//! Financial projections: savings growth, compound interest, loan
//! amortization, and a simple retirement plan.
//!
//! Pure functions; all rates are decimals (0.05 = 5% annual).

use crate::domain::error::TradelogError;

/// Withdrawal-phase estimates stop here even if the balance never depletes.
const MAX_RETIREMENT_YEARS: f64 = 50.0;

/// Month-by-month savings timeline: contribute, then compound monthly.
/// Returns `periods + 1` values, starting with the initial balance.
pub fn savings_growth(
    initial: f64,
    monthly: f64,
    annual_rate: f64,
    periods: u32,
) -> Result<Vec<f64>, TradelogError> {
    if initial < 0.0 {
        return Err(TradelogError::validation("initial", "cannot be negative"));
    }
    if monthly < 0.0 {
        return Err(TradelogError::validation("monthly", "cannot be negative"));
    }
    if annual_rate < 0.0 {
        return Err(TradelogError::validation(
            "annual_rate",
            "cannot be negative",
        ));
    }
    if periods == 0 {
        return Err(TradelogError::validation("periods", "must be positive"));
    }

    let monthly_rate = annual_rate / 12.0;
    let mut values = Vec::with_capacity(periods as usize + 1);
    let mut balance = initial;
    values.push(balance);
    for _ in 0..periods {
        balance += monthly;
        balance *= 1.0 + monthly_rate;
        values.push(balance);
    }
    Ok(values)
}

/// `P(1 + r/n)^(nt)`.
pub fn compound_interest(
    principal: f64,
    annual_rate: f64,
    times_per_year: u32,
    years: f64,
) -> Result<f64, TradelogError> {
    if principal < 0.0 {
        return Err(TradelogError::validation("principal", "cannot be negative"));
    }
    if annual_rate < 0.0 {
        return Err(TradelogError::validation(
            "annual_rate",
            "cannot be negative",
        ));
    }
    if times_per_year == 0 {
        return Err(TradelogError::validation(
            "times_per_year",
            "must be positive",
        ));
    }
    if years < 0.0 {
        return Err(TradelogError::validation("years", "cannot be negative"));
    }

    let n = f64::from(times_per_year);
    Ok(principal * (1.0 + annual_rate / n).powf(n * years))
}

#[derive(Debug, Clone, Copy)]
pub struct LoanSchedule {
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    pub num_payments: u32,
}

/// Standard amortized payment; a zero rate degenerates to straight division.
pub fn loan_payment(
    loan_amount: f64,
    annual_rate: f64,
    years: u32,
) -> Result<LoanSchedule, TradelogError> {
    if loan_amount <= 0.0 {
        return Err(TradelogError::validation("loan_amount", "must be positive"));
    }
    if annual_rate < 0.0 {
        return Err(TradelogError::validation(
            "annual_rate",
            "cannot be negative",
        ));
    }
    if years == 0 {
        return Err(TradelogError::validation("years", "must be positive"));
    }

    let monthly_rate = annual_rate / 12.0;
    let num_payments = years * 12;
    let n = f64::from(num_payments);

    let (monthly_payment, total_interest) = if monthly_rate == 0.0 {
        (loan_amount / n, 0.0)
    } else {
        let factor = (1.0 + monthly_rate).powf(n);
        let payment = loan_amount * (monthly_rate * factor) / (factor - 1.0);
        (payment, payment * n - loan_amount)
    };

    Ok(LoanSchedule {
        loan_amount,
        monthly_payment,
        total_interest,
        total_paid: loan_amount + total_interest,
        num_payments,
    })
}

#[derive(Debug, Clone)]
pub struct RetirementPlan {
    pub years_to_retirement: u32,
    pub total_contributions: f64,
    pub retirement_balance: f64,
    pub annual_withdrawal: f64,
    pub monthly_withdrawal: f64,
    /// Years the balance lasts in the withdrawal phase, capped at 50.
    pub estimated_years_lasting: f64,
    pub savings_timeline: Vec<f64>,
}

/// Accumulation via [`savings_growth`] until retirement age, then a
/// fixed-rate withdrawal phase drawn down month by month.
pub fn retirement_plan(
    current_age: u32,
    retirement_age: u32,
    current_savings: f64,
    monthly_contribution: f64,
    annual_return: f64,
    withdrawal_rate: f64,
) -> Result<RetirementPlan, TradelogError> {
    if current_age >= retirement_age {
        return Err(TradelogError::validation(
            "retirement_age",
            "must be greater than current_age",
        ));
    }
    if !(withdrawal_rate > 0.0 && withdrawal_rate <= 1.0) {
        return Err(TradelogError::validation(
            "withdrawal_rate",
            "must be between 0 and 1",
        ));
    }

    let years_to_retirement = retirement_age - current_age;
    let months = years_to_retirement * 12;
    let timeline = savings_growth(
        current_savings,
        monthly_contribution,
        annual_return,
        months,
    )?;
    let retirement_balance = *timeline.last().unwrap_or(&current_savings);

    let annual_withdrawal = retirement_balance * withdrawal_rate;
    let monthly_withdrawal = annual_withdrawal / 12.0;
    let monthly_return = annual_return / 12.0;

    let mut balance = retirement_balance;
    let mut years_lasting = 0.0;
    while balance > 0.0 && years_lasting < MAX_RETIREMENT_YEARS {
        balance = balance * (1.0 + monthly_return) - monthly_withdrawal;
        years_lasting += 1.0 / 12.0;
    }

    Ok(RetirementPlan {
        years_to_retirement,
        total_contributions: monthly_contribution * f64::from(months),
        retirement_balance,
        annual_withdrawal,
        monthly_withdrawal,
        estimated_years_lasting: years_lasting,
        savings_timeline: timeline,
    })
}
