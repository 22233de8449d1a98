use super::employee::EmployeeId;
use super::settings::PayrollSettings;
use crate::error::{Result, WorkZenError};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    HalfDay,
    Absent,
    PaidLeave,
    UnpaidLeave,
}

impl AttendanceStatus {
    pub fn is_leave(&self) -> bool {
        matches!(self, Self::PaidLeave | Self::UnpaidLeave)
    }
}

/// One employee's attendance for one calendar day.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AttendanceRecord {
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// A manually marked day without clock times.
    pub fn marked(employee: EmployeeId, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            employee,
            date,
            check_in: None,
            check_out: None,
            status,
        }
    }

    /// An open day: checked in, not yet checked out. Counts as absent until
    /// check-out settles the status.
    pub fn checked_in(employee: EmployeeId, date: NaiveDate, at: NaiveTime) -> Self {
        Self {
            employee,
            date,
            check_in: Some(at),
            check_out: None,
            status: AttendanceStatus::Absent,
        }
    }

    /// Closes the day and derives its status from the hours worked.
    pub fn check_out(&mut self, at: NaiveTime, settings: &PayrollSettings) -> Result<()> {
        let check_in = self.check_in.ok_or_else(|| {
            WorkZenError::validation(format!(
                "employee {} has not checked in on {}",
                self.employee, self.date
            ))
        })?;
        if self.check_out.is_some() {
            return Err(WorkZenError::validation(format!(
                "employee {} already checked out on {}",
                self.employee, self.date
            )));
        }
        if at <= check_in {
            return Err(WorkZenError::validation("check-out must be after check-in"));
        }

        self.check_out = Some(at);
        let hours = self.worked_hours().unwrap_or(Decimal::ZERO);
        self.status = if hours >= settings.full_day_hours {
            AttendanceStatus::Present
        } else if hours >= settings.half_day_hours {
            AttendanceStatus::HalfDay
        } else {
            AttendanceStatus::Absent
        };
        Ok(())
    }

    pub fn worked_hours(&self) -> Option<Decimal> {
        let minutes = (self.check_out? - self.check_in?).num_minutes();
        Some(Decimal::from(minutes) / Decimal::from(60))
    }
}

/// Day counts for one employee over a date range.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct AttendanceSummary {
    pub employee: EmployeeId,
    pub present_days: u32,
    pub half_days: u32,
    pub absent_days: u32,
    pub paid_leave_days: u32,
    pub unpaid_leave_days: u32,
}

impl AttendanceSummary {
    pub fn empty(employee: EmployeeId) -> Self {
        Self {
            employee,
            ..Default::default()
        }
    }

    pub fn from_records<'a>(
        employee: EmployeeId,
        records: impl IntoIterator<Item = &'a AttendanceRecord>,
    ) -> Self {
        let mut summary = Self::empty(employee);
        for record in records.into_iter().filter(|r| r.employee == employee) {
            match record.status {
                AttendanceStatus::Present => summary.present_days += 1,
                AttendanceStatus::HalfDay => summary.half_days += 1,
                AttendanceStatus::Absent => summary.absent_days += 1,
                AttendanceStatus::PaidLeave => summary.paid_leave_days += 1,
                AttendanceStatus::UnpaidLeave => summary.unpaid_leave_days += 1,
            }
        }
        summary
    }
}
