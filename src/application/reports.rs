use super::engine::HrEngine;
use crate::domain::access::{Action, Actor};
use crate::domain::attendance::AttendanceSummary;
use crate::domain::employee::CompanyId;
use crate::domain::money::Money;
use crate::domain::payrun::{PayPeriod, PayrunId, PayrunStatus};
use crate::error::Result;
use serde::Serialize;

/// Totals of one payrun.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrunReport {
    pub payrun: PayrunId,
    pub company: CompanyId,
    pub period_start: chrono::NaiveDate,
    pub period_end: chrono::NaiveDate,
    pub status: PayrunStatus,
    pub employees: usize,
    pub total_gross: Money,
    pub total_deductions: Money,
    pub total_employer_pf: Money,
    pub total_net: Money,
}

impl HrEngine {
    /// Sums the payslips of a payrun. `total_gross` is the prorated gross.
    pub async fn payrun_report(&self, actor: &Actor, id: PayrunId) -> Result<PayrunReport> {
        let payrun = self.payrun(actor, id).await?;
        let payslips = self.stores.payruns.payslips(id).await?;

        Ok(PayrunReport {
            payrun: id,
            company: payrun.company,
            period_start: payrun.period.start,
            period_end: payrun.period.end,
            status: payrun.status,
            employees: payslips.len(),
            total_gross: Money::checked_sum(payslips.iter().map(|p| &p.prorated_gross))?,
            total_deductions: Money::checked_sum(payslips.iter().map(|p| &p.total_deductions))?,
            total_employer_pf: Money::checked_sum(payslips.iter().map(|p| &p.pf_employer))?,
            total_net: Money::checked_sum(payslips.iter().map(|p| &p.net_salary))?,
        })
    }

    /// Attendance summary of every active employee of the actor's company.
    pub async fn attendance_report(
        &self,
        actor: &Actor,
        period: PayPeriod,
    ) -> Result<Vec<AttendanceSummary>> {
        actor.authorize(Action::ViewReports)?;
        let employees = self.stores.employees.list(actor.company).await?;

        let mut report = Vec::with_capacity(employees.len());
        for employee in employees.iter().filter(|e| e.is_active()) {
            let records = self.stores.attendance.range(employee.id, period).await?;
            report.push(AttendanceSummary::from_records(employee.id, &records));
        }
        Ok(report)
    }
}
