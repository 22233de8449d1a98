use super::employee::EmployeeId;
use crate::error::{Result, WorkZenError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type LeaveId = u32;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Paid,
    Sick,
    Unpaid,
}

impl LeaveType {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid | Self::Sick)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A leave application and its review state.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LeaveRequest {
    pub id: LeaveId,
    pub employee: EmployeeId,
    pub leave_type: LeaveType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub reviewed_by: Option<EmployeeId>,
    pub review_note: Option<String>,
}

impl LeaveRequest {
    pub fn new(
        id: LeaveId,
        employee: EmployeeId,
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
        reason: impl Into<String>,
    ) -> Result<Self> {
        if start > end {
            return Err(WorkZenError::validation(format!(
                "leave starts on {start} but ends on {end}"
            )));
        }
        Ok(Self {
            id,
            employee,
            leave_type,
            start,
            end,
            reason: reason.into(),
            status: LeaveStatus::Pending,
            reviewed_by: None,
            review_note: None,
        })
    }

    /// Calendar days covered, both ends inclusive.
    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Pending and approved requests block the days they cover.
    pub fn is_active(&self) -> bool {
        matches!(self.status, LeaveStatus::Pending | LeaveStatus::Approved)
    }

    pub fn overlaps(&self, other: &LeaveRequest) -> bool {
        self.employee == other.employee && self.start <= other.end && other.start <= self.end
    }

    pub fn approve(&mut self, reviewer: EmployeeId, note: Option<String>) -> Result<()> {
        self.transition(LeaveStatus::Approved)?;
        self.reviewed_by = Some(reviewer);
        self.review_note = note;
        Ok(())
    }

    pub fn reject(&mut self, reviewer: EmployeeId, note: Option<String>) -> Result<()> {
        self.transition(LeaveStatus::Rejected)?;
        self.reviewed_by = Some(reviewer);
        self.review_note = note;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(LeaveStatus::Cancelled)
    }

    // Only a pending request can change state.
    fn transition(&mut self, to: LeaveStatus) -> Result<()> {
        if self.status != LeaveStatus::Pending {
            return Err(WorkZenError::InvalidTransition {
                entity: "leave request",
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn request(start: u32, end: u32) -> LeaveRequest {
        LeaveRequest::new(1, 10, LeaveType::Paid, date(start), date(end), "family").unwrap()
    }

    #[test]
    fn test_days_are_inclusive() {
        let leave = request(3, 5);
        assert_eq!(leave.days(), 3);
        assert_eq!(leave.dates().collect::<Vec<_>>(), vec![date(3), date(4), date(5)]);
        assert_eq!(request(7, 7).days(), 1);
    }

    #[test]
    fn test_rejects_inverted_range() {
        assert!(LeaveRequest::new(1, 10, LeaveType::Sick, date(5), date(3), "").is_err());
    }

    #[test]
    fn test_overlap() {
        assert!(request(3, 5).overlaps(&request(5, 9)));
        assert!(request(3, 5).overlaps(&request(1, 3)));
        assert!(!request(3, 5).overlaps(&request(6, 9)));
    }

    #[test]
    fn test_approve_then_cannot_cancel() {
        let mut leave = request(3, 5);
        leave.approve(2, Some("enjoy".into())).unwrap();
        assert_eq!(leave.status, LeaveStatus::Approved);
        assert_eq!(leave.reviewed_by, Some(2));

        let err = leave.cancel().unwrap_err();
        assert!(matches!(err, WorkZenError::InvalidTransition { .. }));
        assert!(leave.reject(2, None).is_err());
    }

    #[test]
    fn test_cancel_pending() {
        let mut leave = request(3, 5);
        leave.cancel().unwrap();
        assert_eq!(leave.status, LeaveStatus::Cancelled);
        assert!(!leave.is_active());
        assert!(leave.approve(2, None).is_err());
    }

    #[test]
    fn test_paid_types() {
        assert!(LeaveType::Paid.is_paid());
        assert!(LeaveType::Sick.is_paid());
        assert!(!LeaveType::Unpaid.is_paid());
    }
}
