use super::engine::HrEngine;
use crate::domain::access::{Action, Actor};
use crate::domain::attendance::{AttendanceRecord, AttendanceStatus};
use crate::domain::employee::EmployeeId;
use crate::domain::leave::{LeaveId, LeaveRequest, LeaveType};
use crate::error::{Result, WorkZenError};
use chrono::NaiveDate;
use tracing::info;

impl HrEngine {
    /// Files a pending leave request for `employee`.
    pub async fn apply_leave(
        &self,
        actor: &Actor,
        employee: EmployeeId,
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
        reason: &str,
    ) -> Result<LeaveRequest> {
        actor.authorize(Action::ActFor(employee))?;
        self.active_employee_of(actor, employee).await?;

        let mut request = LeaveRequest::new(0, employee, leave_type, start, end, reason)?;
        let existing = self.stores.leaves.list(employee).await?;
        if let Some(clash) = existing
            .iter()
            .find(|r| r.is_active() && r.overlaps(&request))
        {
            return Err(WorkZenError::validation(format!(
                "leave overlaps request {} ({} to {})",
                clash.id, clash.start, clash.end
            )));
        }

        request.id = self.stores.leaves.next_id().await?;
        info!(leave = request.id, employee, days = request.days(), "leave requested");
        self.stores.leaves.store(request.clone()).await?;
        Ok(request)
    }

    /// Approves a pending request and marks every day it covers as leave.
    ///
    /// The days are written before the request, so a failed write leaves the
    /// request pending and approving it again is safe.
    pub async fn approve_leave(
        &self,
        actor: &Actor,
        id: LeaveId,
        note: Option<String>,
    ) -> Result<LeaveRequest> {
        actor.authorize(Action::ReviewLeave)?;
        let mut request = self.leave_of(actor, id).await?;
        request.approve(actor.employee, note)?;

        let status = if request.leave_type.is_paid() {
            AttendanceStatus::PaidLeave
        } else {
            AttendanceStatus::UnpaidLeave
        };
        for date in request.dates() {
            self.stores
                .attendance
                .store(AttendanceRecord::marked(request.employee, date, status))
                .await?;
        }
        self.stores.leaves.store(request.clone()).await?;

        info!(leave = id, reviewer = actor.employee, "leave approved");
        Ok(request)
    }

    pub async fn reject_leave(
        &self,
        actor: &Actor,
        id: LeaveId,
        note: Option<String>,
    ) -> Result<LeaveRequest> {
        actor.authorize(Action::ReviewLeave)?;
        let mut request = self.leave_of(actor, id).await?;
        request.reject(actor.employee, note)?;
        info!(leave = id, reviewer = actor.employee, "leave rejected");
        self.stores.leaves.store(request.clone()).await?;
        Ok(request)
    }

    /// Withdraws a pending request. Only the applicant, HR or Admin may.
    pub async fn cancel_leave(&self, actor: &Actor, id: LeaveId) -> Result<LeaveRequest> {
        let mut request = self.leave_of(actor, id).await?;
        actor.authorize(Action::ActFor(request.employee))?;
        request.cancel()?;
        info!(leave = id, "leave cancelled");
        self.stores.leaves.store(request.clone()).await?;
        Ok(request)
    }

    pub async fn leave_requests(
        &self,
        actor: &Actor,
        employee: EmployeeId,
    ) -> Result<Vec<LeaveRequest>> {
        if !actor.permits(Action::ReviewLeave) {
            actor.authorize(Action::ActFor(employee))?;
        }
        self.employee_of(actor, employee).await?;
        self.stores.leaves.list(employee).await
    }

    async fn leave_of(&self, actor: &Actor, id: LeaveId) -> Result<LeaveRequest> {
        let request = self
            .stores
            .leaves
            .get(id)
            .await?
            .ok_or_else(|| WorkZenError::not_found("leave request", id))?;
        // Tenant check through the applicant. Store failures pass through.
        match self.employee_of(actor, request.employee).await {
            Ok(_) => Ok(request),
            Err(WorkZenError::NotFound { .. }) => Err(WorkZenError::not_found("leave request", id)),
            Err(e) => Err(e),
        }
    }
}
