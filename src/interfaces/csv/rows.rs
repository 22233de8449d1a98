//! Row layouts of the CSV input files.

use crate::domain::attendance::{AttendanceRecord, AttendanceStatus};
use crate::domain::employee::{CompanyId, Employee, EmployeeId, EmploymentStatus, Role};
use crate::domain::money::Money;
use crate::domain::salary::{CalculationBasis, ComponentKind, SalaryComponent, SalaryStructure};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// `employee,company,name,email,role,department,monthly_wage`
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct EmployeeRow {
    pub employee: EmployeeId,
    pub company: CompanyId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub monthly_wage: Option<Money>,
}

impl EmployeeRow {
    pub fn to_employee(&self) -> Employee {
        Employee {
            id: self.employee,
            company: self.company,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            department: self.department.clone().filter(|d| !d.is_empty()),
            date_of_joining: None,
            status: EmploymentStatus::Active,
        }
    }
}

/// `employee,component,kind,basis,value`; one row per component, in
/// declaration order.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ComponentRow {
    pub employee: EmployeeId,
    pub component: String,
    pub kind: ComponentKind,
    pub basis: CalculationBasis,
    pub value: Decimal,
}

impl From<ComponentRow> for SalaryComponent {
    fn from(row: ComponentRow) -> Self {
        SalaryComponent::new(row.component, row.kind, row.basis, row.value)
    }
}

/// `employee,date,status`
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AttendanceRow {
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord::marked(row.employee, row.date, row.status)
    }
}

/// Groups component rows into one structure per employee, keeping the
/// order in which employees and components first appear.
///
/// Structures are returned unvalidated. Rows of employees without a known
/// wage are returned separately.
pub fn assemble_structures(
    wages: &HashMap<EmployeeId, Money>,
    rows: impl IntoIterator<Item = ComponentRow>,
) -> (Vec<SalaryStructure>, Vec<ComponentRow>) {
    let mut structures: Vec<SalaryStructure> = Vec::new();
    let mut index: HashMap<EmployeeId, usize> = HashMap::new();
    let mut orphans = Vec::new();

    for row in rows {
        let Some(wage) = wages.get(&row.employee) else {
            orphans.push(row);
            continue;
        };
        let slot = *index.entry(row.employee).or_insert_with(|| {
            structures.push(SalaryStructure {
                employee: row.employee,
                monthly_wage: *wage,
                components: Vec::new(),
            });
            structures.len() - 1
        });
        structures[slot].components.push(row.into());
    }

    (structures, orphans)
}
