use crate::domain::attendance::AttendanceRecord;
use crate::domain::employee::{CompanyId, Employee, EmployeeId};
use crate::domain::leave::{LeaveId, LeaveRequest};
use crate::domain::payrun::{PayPeriod, Payrun, PayrunId, Payslip};
use crate::domain::ports::{
    AttendanceStore, EmployeeStore, LeaveStore, PayrunStore, SalaryStructureStore, SettingsStore,
    Stores,
};
use crate::domain::salary::SalaryStructure;
use crate::domain::settings::PayrollSettings;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

/// Returns a full set of empty in-memory stores.
pub fn stores() -> Stores {
    Stores {
        employees: Box::new(InMemoryEmployeeStore::new()),
        structures: Box::new(InMemorySalaryStructureStore::new()),
        attendance: Box::new(InMemoryAttendanceStore::new()),
        leaves: Box::new(InMemoryLeaveStore::new()),
        payruns: Box::new(InMemoryPayrunStore::new()),
        settings: Box::new(InMemorySettingsStore::new()),
    }
}

/// A thread-safe in-memory store for employee records.
///
/// A `BTreeMap` keeps listings ordered by employee id.
#[derive(Default, Clone)]
pub struct InMemoryEmployeeStore {
    employees: Arc<RwLock<BTreeMap<EmployeeId, Employee>>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn store(&self, employee: Employee) -> Result<()> {
        let mut employees = self.employees.write().await;
        employees.insert(employee.id, employee);
        Ok(())
    }

    async fn get(&self, id: EmployeeId) -> Result<Option<Employee>> {
        let employees = self.employees.read().await;
        Ok(employees.get(&id).cloned())
    }

    async fn list(&self, company: CompanyId) -> Result<Vec<Employee>> {
        let employees = self.employees.read().await;
        Ok(employees
            .values()
            .filter(|e| e.company == company)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySalaryStructureStore {
    structures: Arc<RwLock<HashMap<EmployeeId, SalaryStructure>>>,
}

impl InMemorySalaryStructureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SalaryStructureStore for InMemorySalaryStructureStore {
    async fn store(&self, structure: SalaryStructure) -> Result<()> {
        let mut structures = self.structures.write().await;
        structures.insert(structure.employee, structure);
        Ok(())
    }

    async fn get(&self, employee: EmployeeId) -> Result<Option<SalaryStructure>> {
        let structures = self.structures.read().await;
        Ok(structures.get(&employee).cloned())
    }
}

/// Attendance keyed by `(employee, date)` so a period is one range scan.
#[derive(Default, Clone)]
pub struct InMemoryAttendanceStore {
    records: Arc<RwLock<BTreeMap<(EmployeeId, NaiveDate), AttendanceRecord>>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn store(&self, record: AttendanceRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert((record.employee, record.date), record);
        Ok(())
    }

    async fn get(&self, employee: EmployeeId, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(employee, date)).cloned())
    }

    async fn range(
        &self,
        employee: EmployeeId,
        period: PayPeriod,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = self.records.read().await;
        Ok(records
            .range((employee, period.start)..=(employee, period.end))
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryLeaveStore {
    requests: Arc<RwLock<BTreeMap<LeaveId, LeaveRequest>>>,
    last_id: Arc<AtomicU32>,
}

impl InMemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveStore for InMemoryLeaveStore {
    async fn next_id(&self) -> Result<LeaveId> {
        Ok(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn store(&self, request: LeaveRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: LeaveId) -> Result<Option<LeaveRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn list(&self, employee: EmployeeId) -> Result<Vec<LeaveRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .filter(|r| r.employee == employee)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct PayrunTables {
    payruns: HashMap<PayrunId, Payrun>,
    payslips: HashMap<PayrunId, Vec<Payslip>>,
}

/// Payruns and their payslips behind a single lock, so a replace is seen
/// by readers either entirely or not at all.
#[derive(Default, Clone)]
pub struct InMemoryPayrunStore {
    tables: Arc<RwLock<PayrunTables>>,
}

impl InMemoryPayrunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayrunStore for InMemoryPayrunStore {
    async fn store(&self, payrun: Payrun) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.payruns.insert(payrun.id, payrun);
        Ok(())
    }

    async fn get(&self, id: PayrunId) -> Result<Option<Payrun>> {
        let tables = self.tables.read().await;
        Ok(tables.payruns.get(&id).cloned())
    }

    async fn replace_payslips(&self, payrun: Payrun, mut payslips: Vec<Payslip>) -> Result<()> {
        payslips.sort_by_key(|p| p.employee);
        let mut tables = self.tables.write().await;
        tables.payslips.insert(payrun.id, payslips);
        tables.payruns.insert(payrun.id, payrun);
        Ok(())
    }

    async fn payslips(&self, id: PayrunId) -> Result<Vec<Payslip>> {
        let tables = self.tables.read().await;
        Ok(tables.payslips.get(&id).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<HashMap<CompanyId, PayrollSettings>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn store(&self, company: CompanyId, settings: PayrollSettings) -> Result<()> {
        let mut all = self.settings.write().await;
        all.insert(company, settings);
        Ok(())
    }

    async fn get(&self, company: CompanyId) -> Result<Option<PayrollSettings>> {
        let all = self.settings.read().await;
        Ok(all.get(&company).cloned())
    }
}
