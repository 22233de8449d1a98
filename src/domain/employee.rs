use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tenant identifier. Every record in WorkZen belongs to exactly one company.
pub type CompanyId = u16;
pub type EmployeeId = u32;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Payroll,
    Employee,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    #[default]
    Active,
    Inactive,
}

/// An employee record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Employee {
    pub id: EmployeeId,
    pub company: CompanyId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub date_of_joining: Option<NaiveDate>,
    #[serde(default)]
    pub status: EmploymentStatus,
}

impl Employee {
    pub fn new(id: EmployeeId, company: CompanyId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            company,
            name: name.into(),
            email: String::new(),
            role,
            department: None,
            date_of_joining: None,
            status: EmploymentStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EmploymentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_employee_is_active() {
        let employee = Employee::new(7, 1, "Asha Rao", Role::Employee);
        assert!(employee.is_active());
        assert_eq!(employee.company, 1);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Payroll).unwrap(), "\"payroll\"");
        let role: Role = serde_json::from_str("\"hr\"").unwrap();
        assert_eq!(role, Role::Hr);
    }
}
