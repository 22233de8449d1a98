use super::attendance::AttendanceRecord;
use super::employee::{CompanyId, Employee, EmployeeId};
use super::leave::{LeaveId, LeaveRequest};
use super::payrun::{PayPeriod, Payrun, PayrunId, Payslip};
use super::salary::SalaryStructure;
use super::settings::PayrollSettings;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn store(&self, employee: Employee) -> Result<()>;
    async fn get(&self, id: EmployeeId) -> Result<Option<Employee>>;
    /// All employees of a company, ordered by id.
    async fn list(&self, company: CompanyId) -> Result<Vec<Employee>>;
}

#[async_trait]
pub trait SalaryStructureStore: Send + Sync {
    async fn store(&self, structure: SalaryStructure) -> Result<()>;
    async fn get(&self, employee: EmployeeId) -> Result<Option<SalaryStructure>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts or replaces the record of `(employee, date)`.
    async fn store(&self, record: AttendanceRecord) -> Result<()>;
    async fn get(&self, employee: EmployeeId, date: NaiveDate) -> Result<Option<AttendanceRecord>>;
    /// Records of one employee within the period, ordered by date.
    async fn range(&self, employee: EmployeeId, period: PayPeriod) -> Result<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Allocates the next unused leave id.
    async fn next_id(&self) -> Result<LeaveId>;
    async fn store(&self, request: LeaveRequest) -> Result<()>;
    async fn get(&self, id: LeaveId) -> Result<Option<LeaveRequest>>;
    /// Requests of one employee, ordered by id.
    async fn list(&self, employee: EmployeeId) -> Result<Vec<LeaveRequest>>;
}

#[async_trait]
pub trait PayrunStore: Send + Sync {
    async fn store(&self, payrun: Payrun) -> Result<()>;
    async fn get(&self, id: PayrunId) -> Result<Option<Payrun>>;
    /// Atomically stores `payrun` and replaces all of its payslips.
    ///
    /// Either every payslip of the previous computation is removed and the
    /// new ones are visible together with the updated payrun, or nothing
    /// changes.
    async fn replace_payslips(&self, payrun: Payrun, payslips: Vec<Payslip>) -> Result<()>;
    /// Payslips of a payrun, ordered by employee id.
    async fn payslips(&self, id: PayrunId) -> Result<Vec<Payslip>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn store(&self, company: CompanyId, settings: PayrollSettings) -> Result<()>;
    async fn get(&self, company: CompanyId) -> Result<Option<PayrollSettings>>;
}

pub type EmployeeStoreBox = Box<dyn EmployeeStore>;
pub type SalaryStructureStoreBox = Box<dyn SalaryStructureStore>;
pub type AttendanceStoreBox = Box<dyn AttendanceStore>;
pub type LeaveStoreBox = Box<dyn LeaveStore>;
pub type PayrunStoreBox = Box<dyn PayrunStore>;
pub type SettingsStoreBox = Box<dyn SettingsStore>;

/// Builds a fresh set of stores, e.g. one per test or per tenant shard.
pub type StoresFactory = Box<dyn Fn() -> Stores + Send + Sync>;

/// The storage backends an [`HrEngine`](crate::application::engine::HrEngine) runs on.
pub struct Stores {
    pub employees: EmployeeStoreBox,
    pub structures: SalaryStructureStoreBox,
    pub attendance: AttendanceStoreBox,
    pub leaves: LeaveStoreBox,
    pub payruns: PayrunStoreBox,
    pub settings: SettingsStoreBox,
}
