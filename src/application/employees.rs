use super::engine::HrEngine;
use crate::domain::access::{Action, Actor};
use crate::domain::employee::{Employee, EmployeeId, EmploymentStatus};
use crate::error::{Result, WorkZenError};
use tracing::info;

impl HrEngine {
    /// Creates or updates an employee record of the actor's company.
    pub async fn register_employee(&self, actor: &Actor, employee: Employee) -> Result<()> {
        actor.authorize(Action::ManageEmployees)?;
        actor.authorize_company(employee.company, "employee", employee.id)?;
        if employee.name.trim().is_empty() {
            return Err(WorkZenError::validation(format!(
                "employee {} has no name",
                employee.id
            )));
        }
        // Ids are global, an id owned by another tenant cannot be taken over.
        if let Some(existing) = self.stores.employees.get(employee.id).await? {
            actor.authorize_company(existing.company, "employee", employee.id)?;
        }

        info!(employee = employee.id, company = employee.company, "employee registered");
        self.stores.employees.store(employee).await
    }

    pub async fn deactivate_employee(&self, actor: &Actor, id: EmployeeId) -> Result<()> {
        actor.authorize(Action::ManageEmployees)?;
        let mut employee = self.employee_of(actor, id).await?;
        employee.status = EmploymentStatus::Inactive;
        info!(employee = id, "employee deactivated");
        self.stores.employees.store(employee).await
    }

    /// Reads one employee: the employee themself, HR, Payroll or Admin.
    pub async fn employee(&self, actor: &Actor, id: EmployeeId) -> Result<Employee> {
        if !actor.permits(Action::ViewReports) {
            actor.authorize(Action::ActFor(id))?;
        }
        self.employee_of(actor, id).await
    }

    /// Every employee of the actor's company, ordered by id.
    pub async fn list_employees(&self, actor: &Actor) -> Result<Vec<Employee>> {
        actor.authorize(Action::ViewReports)?;
        self.stores.employees.list(actor.company).await
    }
}
