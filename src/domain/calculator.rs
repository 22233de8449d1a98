//! Payroll derivation for a single employee.
//!
//! Earnings are derived in two passes: first every earning that does not
//! depend on basic salary (which yields basic salary itself), then every
//! `percentage_of_basic` earning. Declaration order of the components does
//! not influence the amounts.

use super::attendance::AttendanceSummary;
use super::money::Money;
use super::payrun::{LineKind, PayrunId, Payslip, PayslipLine};
use super::salary::{ComponentKind, SalaryStructure};
use super::settings::PayrollSettings;
use crate::error::{Result, WorkZenError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const PF_EMPLOYEE_LINE: &str = "Provident Fund (Employee)";
pub const PF_EMPLOYER_LINE: &str = "Provident Fund (Employer)";
pub const PROFESSIONAL_TAX_LINE: &str = "Professional Tax";

/// Everything needed to compute one payslip.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInput<'a> {
    pub payrun: PayrunId,
    pub structure: &'a SalaryStructure,
    pub attendance: &'a AttendanceSummary,
    pub settings: &'a PayrollSettings,
    pub total_working_days: u32,
}

/// Unprorated earnings of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Earnings {
    pub basic_salary: Money,
    pub gross_salary: Money,
    /// Amount per component, in declaration order. `None` for deductions.
    pub amounts: Vec<Option<Money>>,
}

pub fn derive_earnings(structure: &SalaryStructure) -> Result<Earnings> {
    let wage = structure.monthly_wage;
    let mut amounts = vec![None; structure.components.len()];
    let mut basic_salary = None;

    for (i, component) in structure.components.iter().enumerate() {
        if component.kind != ComponentKind::Earning || component.depends_on_basic() {
            continue;
        }
        let amount = component.amount(wage, Money::ZERO)?;
        if basic_salary.is_none() && component.is_basic() {
            basic_salary = Some(amount);
        }
        amounts[i] = Some(amount);
    }

    let basic_salary = basic_salary.unwrap_or(Money::ZERO);
    for (i, component) in structure.components.iter().enumerate() {
        if component.kind == ComponentKind::Earning && component.depends_on_basic() {
            amounts[i] = Some(component.amount(wage, basic_salary)?);
        }
    }

    let gross_salary = Money::checked_sum(amounts.iter().flatten())?;
    Ok(Earnings {
        basic_salary,
        gross_salary,
        amounts,
    })
}

/// Days paid for: present days plus half days (and paid leave when the
/// settings say so), capped at the working days of the period.
pub fn paid_days(
    attendance: &AttendanceSummary,
    settings: &PayrollSettings,
    total_working_days: u32,
) -> Decimal {
    let mut days = Decimal::from(attendance.present_days);
    if settings.consider_half_days {
        days += Decimal::from(attendance.half_days) * dec!(0.5);
    }
    if settings.paid_leave_counts_as_present {
        days += Decimal::from(attendance.paid_leave_days);
    }
    days.min(Decimal::from(total_working_days))
}

/// Share of the period that is paid. Always 1 when absences are not
/// deducted, including periods without working days.
pub fn attendance_ratio(
    paid_days: Decimal,
    settings: &PayrollSettings,
    total_working_days: u32,
) -> Decimal {
    if settings.deduct_absent_days {
        paid_days / Decimal::from(total_working_days)
    } else {
        Decimal::ONE
    }
}

pub fn compute_payslip(input: &PayrollInput<'_>) -> Result<Payslip> {
    let PayrollInput {
        payrun,
        structure,
        attendance,
        settings,
        total_working_days,
    } = *input;

    if total_working_days == 0 && settings.deduct_absent_days {
        return Err(WorkZenError::validation(format!(
            "pay period of payrun {payrun} has no working days"
        )));
    }

    let earnings = derive_earnings(structure)?;
    let paid_days = paid_days(attendance, settings, total_working_days);
    let ratio = attendance_ratio(paid_days, settings, total_working_days);

    let prorated_basic = earnings.basic_salary.scale(ratio)?;
    let prorated_gross = earnings.gross_salary.scale(ratio)?;

    let mut lines = Vec::with_capacity(structure.components.len() + 3);
    for (component, amount) in structure.components.iter().zip(&earnings.amounts) {
        if let Some(amount) = amount {
            lines.push(PayslipLine::new(
                component.name.clone(),
                LineKind::Earning,
                amount.scale(ratio)?.rounded(),
            ));
        }
    }

    let mut component_deductions = Money::ZERO;
    for component in structure.deductions() {
        let amount = component
            .amount(structure.monthly_wage, earnings.basic_salary)?
            .scale(ratio)?;
        component_deductions = component_deductions.checked_add(amount)?;
        lines.push(PayslipLine::new(
            component.name.clone(),
            LineKind::Deduction,
            amount.rounded(),
        ));
    }

    let pf_employee = prorated_basic.percent(settings.pf_employee_rate)?;
    let pf_employer = prorated_basic.percent(settings.pf_employer_rate)?;
    let professional_tax = settings.professional_tax;

    lines.push(PayslipLine::new(
        PF_EMPLOYEE_LINE,
        LineKind::Deduction,
        pf_employee.rounded(),
    ));
    if professional_tax != Money::ZERO {
        lines.push(PayslipLine::new(
            PROFESSIONAL_TAX_LINE,
            LineKind::Deduction,
            professional_tax.rounded(),
        ));
    }
    lines.push(PayslipLine::new(
        PF_EMPLOYER_LINE,
        LineKind::EmployerContribution,
        pf_employer.rounded(),
    ));

    let total_deductions = component_deductions
        .checked_add(pf_employee)?
        .checked_add(professional_tax)?;
    let net_salary = prorated_gross.checked_sub(total_deductions)?;

    Ok(Payslip {
        payrun,
        employee: structure.employee,
        monthly_wage: structure.monthly_wage.rounded(),
        total_working_days,
        paid_days: paid_days.normalize(),
        attendance_ratio: ratio.round_dp(4).normalize(),
        basic_salary: earnings.basic_salary.rounded(),
        gross_salary: earnings.gross_salary.rounded(),
        prorated_basic: prorated_basic.rounded(),
        prorated_gross: prorated_gross.rounded(),
        total_deductions: total_deductions.rounded(),
        pf_employee: pf_employee.rounded(),
        pf_employer: pf_employer.rounded(),
        professional_tax: professional_tax.rounded(),
        net_salary: net_salary.rounded(),
        lines,
    })
}
