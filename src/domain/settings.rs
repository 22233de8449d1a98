use super::money::Money;
use crate::error::{Result, WorkZenError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Company-level payroll and attendance settings.
///
/// Missing fields in a settings file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// Provident fund rate withheld from the employee, in percent of prorated basic.
    pub pf_employee_rate: Decimal,
    /// Provident fund rate paid by the employer. Informational only.
    pub pf_employer_rate: Decimal,
    /// Flat monthly professional tax, never prorated.
    pub professional_tax: Money,
    pub working_days_per_week: u8,
    pub consider_half_days: bool,
    pub deduct_absent_days: bool,
    pub paid_leave_counts_as_present: bool,
    pub full_day_hours: Decimal,
    pub half_day_hours: Decimal,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            pf_employee_rate: dec!(12),
            pf_employer_rate: dec!(12),
            professional_tax: Money::new(dec!(200)),
            working_days_per_week: 5,
            consider_half_days: true,
            deduct_absent_days: true,
            paid_leave_counts_as_present: false,
            full_day_hours: dec!(8),
            half_day_hours: dec!(4),
        }
    }
}

impl PayrollSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("pf_employee_rate", self.pf_employee_rate),
            ("pf_employer_rate", self.pf_employer_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(WorkZenError::validation(format!(
                    "{name} must be between 0 and 100, got {rate}"
                )));
            }
        }
        if self.professional_tax.is_negative() {
            return Err(WorkZenError::validation("professional_tax must not be negative"));
        }
        if !(1..=7).contains(&self.working_days_per_week) {
            return Err(WorkZenError::validation(format!(
                "working_days_per_week must be between 1 and 7, got {}",
                self.working_days_per_week
            )));
        }
        if self.half_day_hours <= Decimal::ZERO
            || self.half_day_hours > self.full_day_hours
            || self.full_day_hours > dec!(24)
        {
            return Err(WorkZenError::validation(
                "expected 0 < half_day_hours <= full_day_hours <= 24",
            ));
        }
        Ok(())
    }
}
