use super::engine::HrEngine;
use crate::domain::access::{Action, Actor};
use crate::domain::employee::EmployeeId;
use crate::domain::salary::SalaryStructure;
use crate::error::Result;
use tracing::{info, warn};

impl HrEngine {
    /// Validates and stores the salary structure of an employee, replacing
    /// any previous one.
    pub async fn define_salary_structure(
        &self,
        actor: &Actor,
        structure: SalaryStructure,
    ) -> Result<()> {
        actor.authorize(Action::ManageSalaryStructures)?;
        self.employee_of(actor, structure.employee).await?;

        if let Err(e) = structure.validate() {
            warn!(employee = structure.employee, "salary structure rejected: {}", e);
            return Err(e);
        }

        info!(
            employee = structure.employee,
            wage = %structure.monthly_wage,
            components = structure.components.len(),
            "salary structure defined"
        );
        self.stores.structures.store(structure).await
    }

    pub async fn salary_structure(
        &self,
        actor: &Actor,
        employee: EmployeeId,
    ) -> Result<Option<SalaryStructure>> {
        if !actor.permits(Action::ManageSalaryStructures) {
            actor.authorize(Action::ActFor(employee))?;
        }
        self.employee_of(actor, employee).await?;
        self.stores.structures.get(employee).await
    }
}
