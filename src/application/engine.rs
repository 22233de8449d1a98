use crate::domain::access::{Action, Actor};
use crate::domain::employee::{CompanyId, Employee, EmployeeId};
use crate::domain::ports::Stores;
use crate::domain::settings::PayrollSettings;
use crate::error::{Result, WorkZenError};
use tracing::debug;

/// The main entry point of the HR and payroll application.
///
/// `HrEngine` owns the storage backends and exposes every operation as an
/// async method taking the calling [`Actor`]. Each operation awaits its
/// storage calls in order, so one call is one consistent unit of work.
pub struct HrEngine {
    pub(crate) stores: Stores,
}

impl HrEngine {
    /// Creates a new `HrEngine` on top of the given stores.
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Payroll settings of a company, or the defaults when none are stored.
    pub async fn settings(&self, company: CompanyId) -> Result<PayrollSettings> {
        match self.stores.settings.get(company).await? {
            Some(settings) => Ok(settings),
            None => {
                debug!(company, "no payroll settings stored, using defaults");
                Ok(PayrollSettings::default())
            }
        }
    }

    /// Replaces the payroll settings of the actor's company.
    pub async fn update_settings(&self, actor: &Actor, settings: PayrollSettings) -> Result<()> {
        actor.authorize(Action::RunPayroll)?;
        settings.validate()?;
        self.stores.settings.store(actor.company, settings).await
    }

    /// Loads an employee of the actor's company.
    pub(crate) async fn employee_of(&self, actor: &Actor, id: EmployeeId) -> Result<Employee> {
        let employee = self
            .stores
            .employees
            .get(id)
            .await?
            .ok_or_else(|| WorkZenError::not_found("employee", id))?;
        actor.authorize_company(employee.company, "employee", id)?;
        Ok(employee)
    }

    /// Like [`HrEngine::employee_of`], but rejects inactive employees.
    pub(crate) async fn active_employee_of(
        &self,
        actor: &Actor,
        id: EmployeeId,
    ) -> Result<Employee> {
        let employee = self.employee_of(actor, id).await?;
        if !employee.is_active() {
            return Err(WorkZenError::validation(format!("employee {id} is inactive")));
        }
        Ok(employee)
    }
}
