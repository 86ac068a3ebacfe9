use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use uuid::Uuid;

// Fixed policy rates applied to every payroll unless the caller overrides them.
pub const DEFAULT_TAX_RATE: Decimal = dec!(16);
pub const DEFAULT_HEALTH_INSURANCE: Decimal = dec!(2000);
pub const DEFAULT_RETIREMENT_RATE: Decimal = dec!(5);

const HUNDRED: Decimal = dec!(100);
const NET_FLOOR_DIVISOR: Decimal = dec!(3);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayRates {
    /// Percent of gross salary withheld as tax.
    pub tax_rate: Decimal,
    /// Flat amount deducted for health insurance.
    pub health_insurance: Decimal,
    /// Percent of gross salary contributed to retirement.
    pub retirement_rate: Decimal,
}

impl Default for PayRates {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            health_insurance: DEFAULT_HEALTH_INSURANCE,
            retirement_rate: DEFAULT_RETIREMENT_RATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollBreakdown {
    pub tax_amount: Decimal,
    pub retirement_amount: Decimal,
    pub net_salary: Decimal,
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Pure payroll arithmetic, all of it in base-10 decimals. Currency totals
/// get summed across many records downstream, so binary floats are off
/// limits here.
pub fn compute_payroll(
    gross_salary: Decimal,
    allowances: Decimal,
    other_deductions: Decimal,
    rates: &PayRates,
) -> PayrollBreakdown {
    let tax_amount = to_cents(gross_salary * rates.tax_rate / HUNDRED);
    let retirement_amount = to_cents(gross_salary * rates.retirement_rate / HUNDRED);
    let net_salary = to_cents(
        gross_salary + allowances
            - other_deductions
            - tax_amount
            - rates.health_insurance
            - retirement_amount,
    );

    PayrollBreakdown {
        tax_amount,
        retirement_amount,
        net_salary,
    }
}

/// Policy floor: net pay may not fall below one third of gross. This blocks
/// creation, it is not a data-integrity constraint.
pub fn violates_net_floor(net_salary: Decimal, gross_salary: Decimal) -> bool {
    net_salary < gross_salary / NET_FLOOR_DIVISOR
}

/// Builds the human-readable payroll identifier: `PAY-YYYYMM-EEEE-XXXXXX`,
/// employee id zero-padded to four digits, suffix taken from a v4 UUID.
/// Assigned once at first save and never regenerated; the real uniqueness
/// guard is the (employee, pay_period) constraint, not the random suffix.
pub fn generate_reference_id(employee_id: u64, pay_period: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "PAY-{}{:02}-{:04}-{}",
        pay_period.year(),
        pay_period.month(),
        employee_id,
        &suffix[..6]
    )
}

/// First day of the month a pay date falls in. Payrolls are stored against
/// this normalized date so the unique constraint enforces one-per-month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn computes_standard_breakdown() {
        // 90,000 gross at the default rates.
        let result = compute_payroll(dec!(90000), dec!(0), dec!(0), &PayRates::default());
        assert_eq!(result.tax_amount, dec!(14400.00));
        assert_eq!(result.retirement_amount, dec!(4500.00));
        assert_eq!(result.net_salary, dec!(69100.00));
        assert!(!violates_net_floor(result.net_salary, dec!(90000)));
    }

    #[test]
    fn small_salary_passes_floor() {
        let result = compute_payroll(dec!(9000), dec!(0), dec!(0), &PayRates::default());
        assert_eq!(result.net_salary, dec!(5110.00));
        assert!(!violates_net_floor(result.net_salary, dec!(9000)));
    }

    #[test]
    fn tiny_salary_breaches_floor() {
        let result = compute_payroll(dec!(3500), dec!(0), dec!(0), &PayRates::default());
        assert_eq!(result.net_salary, dec!(765.00));
        assert!(violates_net_floor(result.net_salary, dec!(3500)));
    }

    #[test]
    fn allowances_and_deductions_feed_into_net() {
        let result = compute_payroll(dec!(50000), dec!(2500), dec!(1200), &PayRates::default());
        // 50,000 - 8,000 tax - 2,000 health - 2,500 retirement + 2,500 - 1,200
        assert_eq!(result.net_salary, dec!(38800.00));
    }

    #[test]
    fn decimal_sums_do_not_drift() {
        let result = compute_payroll(dec!(0.10), dec!(0), dec!(0), &PayRates::default());
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += result.net_salary;
        }
        assert_eq!(total, result.net_salary * dec!(1000));
    }

    #[test]
    fn reference_id_shape() {
        let id = generate_reference_id(7, d(2026, 3, 15));
        assert!(id.starts_with("PAY-202603-0007-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn reference_ids_differ_per_call() {
        let a = generate_reference_id(1, d(2026, 1, 1));
        let b = generate_reference_id(1, d(2026, 1, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn month_start_normalizes_any_day() {
        assert_eq!(month_start(d(2026, 2, 28)), d(2026, 2, 1));
        assert_eq!(month_start(d(2026, 2, 1)), d(2026, 2, 1));
    }
}
