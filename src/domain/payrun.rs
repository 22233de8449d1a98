use super::employee::{CompanyId, EmployeeId};
use super::money::Money;
use crate::error::{Result, WorkZenError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type PayrunId = u32;

/// An inclusive date range.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(WorkZenError::validation(format!(
                "pay period starts on {start} but ends on {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn calendar_days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    /// `floor(calendar_days * working_days_per_week / 7)`.
    pub fn working_days(&self, working_days_per_week: u8) -> u32 {
        self.calendar_days() * u32::from(working_days_per_week) / 7
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayrunStatus {
    #[default]
    Draft,
    Computed,
    Validated,
}

/// One payroll cycle of a company.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payrun {
    pub id: PayrunId,
    pub company: CompanyId,
    pub period: PayPeriod,
    pub status: PayrunStatus,
}

impl Payrun {
    pub fn new(id: PayrunId, company: CompanyId, period: PayPeriod) -> Self {
        Self {
            id,
            company,
            period,
            status: PayrunStatus::Draft,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.status == PayrunStatus::Validated
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Earning,
    Deduction,
    /// Paid by the employer on top of the salary; not part of net pay.
    EmployerContribution,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PayslipLine {
    pub name: String,
    pub kind: LineKind,
    pub amount: Money,
}

impl PayslipLine {
    pub fn new(name: impl Into<String>, kind: LineKind, amount: Money) -> Self {
        Self {
            name: name.into(),
            kind,
            amount,
        }
    }
}

/// Computed pay of one employee for one payrun.
///
/// Every figure is rounded to two decimals independently from the full
/// precision result, so line amounts may differ from the totals by a cent.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payslip {
    pub payrun: PayrunId,
    pub employee: EmployeeId,
    pub monthly_wage: Money,
    pub total_working_days: u32,
    pub paid_days: Decimal,
    pub attendance_ratio: Decimal,
    /// Unprorated basic salary.
    pub basic_salary: Money,
    /// Unprorated sum of all earnings.
    pub gross_salary: Money,
    pub prorated_basic: Money,
    pub prorated_gross: Money,
    /// Scaled component deductions plus employee PF plus professional tax.
    pub total_deductions: Money,
    pub pf_employee: Money,
    pub pf_employer: Money,
    pub professional_tax: Money,
    pub net_salary: Money,
    pub lines: Vec<PayslipLine>,
}
