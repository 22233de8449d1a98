use super::engine::HrEngine;
use crate::domain::access::{Action, Actor};
use crate::domain::attendance::{AttendanceRecord, AttendanceSummary};
use crate::domain::employee::EmployeeId;
use crate::domain::payrun::PayPeriod;
use crate::error::{Result, WorkZenError};
use chrono::NaiveDateTime;
use tracing::{debug, info};

impl HrEngine {
    /// Opens the attendance day of `employee` at `at`.
    pub async fn check_in(
        &self,
        actor: &Actor,
        employee: EmployeeId,
        at: NaiveDateTime,
    ) -> Result<AttendanceRecord> {
        actor.authorize(Action::ActFor(employee))?;
        self.active_employee_of(actor, employee).await?;

        let date = at.date();
        if let Some(existing) = self.stores.attendance.get(employee, date).await? {
            if existing.status.is_leave() {
                return Err(WorkZenError::validation(format!(
                    "employee {employee} is on leave on {date}"
                )));
            }
            if existing.check_in.is_some() {
                return Err(WorkZenError::validation(format!(
                    "employee {employee} already checked in on {date}"
                )));
            }
        }

        let record = AttendanceRecord::checked_in(employee, date, at.time());
        debug!(employee, %at, "checked in");
        self.stores.attendance.store(record.clone()).await?;
        Ok(record)
    }

    /// Closes the attendance day of `employee`; the status follows from the
    /// hours worked and the company's thresholds.
    pub async fn check_out(
        &self,
        actor: &Actor,
        employee: EmployeeId,
        at: NaiveDateTime,
    ) -> Result<AttendanceRecord> {
        actor.authorize(Action::ActFor(employee))?;
        let profile = self.active_employee_of(actor, employee).await?;
        let settings = self.settings(profile.company).await?;

        let date = at.date();
        let mut record = self
            .stores
            .attendance
            .get(employee, date)
            .await?
            .ok_or_else(|| {
                WorkZenError::validation(format!(
                    "employee {employee} has not checked in on {date}"
                ))
            })?;
        record.check_out(at.time(), &settings)?;

        debug!(employee, %at, status = ?record.status, "checked out");
        self.stores.attendance.store(record.clone()).await?;
        Ok(record)
    }

    /// Sets the status of a day directly, e.g. when importing a timesheet.
    pub async fn mark_attendance(&self, actor: &Actor, record: AttendanceRecord) -> Result<()> {
        actor.authorize(Action::ManageEmployees)?;
        self.employee_of(actor, record.employee).await?;
        self.stores.attendance.store(record).await
    }

    pub async fn attendance_summary(
        &self,
        actor: &Actor,
        employee: EmployeeId,
        period: PayPeriod,
    ) -> Result<AttendanceSummary> {
        if !actor.permits(Action::ViewReports) {
            actor.authorize(Action::ActFor(employee))?;
        }
        self.employee_of(actor, employee).await?;
        let records = self.stores.attendance.range(employee, period).await?;
        let summary = AttendanceSummary::from_records(employee, &records);
        info!(employee, %period, present = summary.present_days, "attendance summarized");
        Ok(summary)
    }
}
