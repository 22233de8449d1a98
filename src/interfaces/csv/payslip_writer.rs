use crate::application::reports::PayrunReport;
use crate::domain::employee::EmployeeId;
use crate::domain::money::Money;
use crate::domain::payrun::{LineKind, PayrunId, Payslip};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PayslipRow {
    payrun: PayrunId,
    employee: EmployeeId,
    monthly_wage: Money,
    working_days: u32,
    paid_days: Decimal,
    attendance_ratio: Decimal,
    basic_salary: Money,
    gross_salary: Money,
    prorated_basic: Money,
    prorated_gross: Money,
    total_deductions: Money,
    pf_employee: Money,
    pf_employer: Money,
    professional_tax: Money,
    net_salary: Money,
}

impl From<&Payslip> for PayslipRow {
    fn from(p: &Payslip) -> Self {
        Self {
            payrun: p.payrun,
            employee: p.employee,
            monthly_wage: p.monthly_wage,
            working_days: p.total_working_days,
            paid_days: p.paid_days.normalize(),
            attendance_ratio: p.attendance_ratio.normalize(),
            basic_salary: p.basic_salary,
            gross_salary: p.gross_salary,
            prorated_basic: p.prorated_basic,
            prorated_gross: p.prorated_gross,
            total_deductions: p.total_deductions,
            pf_employee: p.pf_employee,
            pf_employer: p.pf_employer,
            professional_tax: p.professional_tax,
            net_salary: p.net_salary,
        }
    }
}

#[derive(Serialize)]
struct LineRow<'a> {
    payrun: PayrunId,
    employee: EmployeeId,
    name: &'a str,
    kind: LineKind,
    amount: Money,
}

#[derive(Serialize)]
struct StructureCheckRow<'a> {
    employee: EmployeeId,
    valid: bool,
    reason: &'a str,
}

/// Writes payrun results as CSV.
pub struct PayslipWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PayslipWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    /// One row per payslip.
    pub fn write_payslips(&mut self, payslips: &[Payslip]) -> Result<()> {
        for payslip in payslips {
            self.writer.serialize(PayslipRow::from(payslip))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// One row per payslip line, in payslip order.
    pub fn write_lines(&mut self, payslips: &[Payslip]) -> Result<()> {
        for payslip in payslips {
            for line in &payslip.lines {
                self.writer.serialize(LineRow {
                    payrun: payslip.payrun,
                    employee: payslip.employee,
                    name: &line.name,
                    kind: line.kind,
                    amount: line.amount,
                })?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_report(&mut self, report: &PayrunReport) -> Result<()> {
        self.writer.serialize(report)?;
        self.writer.flush()?;
        Ok(())
    }

    /// `employee,valid,reason`; `reason` is empty for valid structures.
    pub fn write_structure_checks<'a>(
        &mut self,
        checks: impl IntoIterator<Item = (EmployeeId, Option<&'a str>)>,
    ) -> Result<()> {
        for (employee, problem) in checks {
            self.writer.serialize(StructureCheckRow {
                employee,
                valid: problem.is_none(),
                reason: problem.unwrap_or_default(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
