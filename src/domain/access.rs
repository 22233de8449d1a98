use super::employee::{CompanyId, EmployeeId, Role};
use crate::error::{Result, WorkZenError};
use std::fmt;

/// Something a caller wants to do, checked against its [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageEmployees,
    ManageSalaryStructures,
    RunPayroll,
    ReviewLeave,
    ActFor(EmployeeId),
    ViewReports,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ManageEmployees => write!(f, "manage employees"),
            Action::ManageSalaryStructures => write!(f, "manage salary structures"),
            Action::RunPayroll => write!(f, "run payroll"),
            Action::ReviewLeave => write!(f, "review leave requests"),
            Action::ActFor(employee) => write!(f, "act for employee {}", employee),
            Action::ViewReports => write!(f, "view reports"),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub employee: EmployeeId,
    pub company: CompanyId,
    pub role: Role,
}

impl Actor {
    pub fn new(employee: EmployeeId, company: CompanyId, role: Role) -> Self {
        Self {
            employee,
            company,
            role,
        }
    }

    /// Admin actor used by batch jobs such as the CLI importer.
    pub fn system(company: CompanyId) -> Self {
        Self::new(0, company, Role::Admin)
    }

    pub fn permits(&self, action: Action) -> bool {
        match (self.role, action) {
            (Role::Admin, _) => true,
            (_, Action::ActFor(employee)) if employee == self.employee => true,
            (Role::Hr, Action::ManageEmployees | Action::ReviewLeave | Action::ActFor(_)) => true,
            (Role::Hr | Role::Payroll, Action::ViewReports) => true,
            (Role::Payroll, Action::ManageSalaryStructures | Action::RunPayroll) => true,
            _ => false,
        }
    }

    pub fn authorize(&self, action: Action) -> Result<()> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(WorkZenError::PermissionDenied {
                role: self.role,
                action,
            })
        }
    }

    /// Rejects access to another tenant's records. Reported as not found so
    /// foreign ids are not disclosed.
    pub fn authorize_company(
        &self,
        company: CompanyId,
        entity: &'static str,
        id: impl ToString,
    ) -> Result<()> {
        if company == self.company {
            Ok(())
        } else {
            Err(WorkZenError::not_found(entity, id))
        }
    }
}
