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
use crate::error::{Result, WorkZenError};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CF_EMPLOYEES: &str = "employees";
pub const CF_STRUCTURES: &str = "salary_structures";
pub const CF_ATTENDANCE: &str = "attendance";
pub const CF_LEAVES: &str = "leaves";
pub const CF_PAYRUNS: &str = "payruns";
pub const CF_PAYSLIPS: &str = "payslips";
pub const CF_SETTINGS: &str = "settings";

const COLUMN_FAMILIES: [&str; 7] = [
    CF_EMPLOYEES,
    CF_STRUCTURES,
    CF_ATTENDANCE,
    CF_LEAVES,
    CF_PAYRUNS,
    CF_PAYSLIPS,
    CF_SETTINGS,
];

/// A persistent store implementation using RocksDB.
///
/// Each aggregate lives in its own column family, values are JSON and keys
/// are big-endian so iteration follows numeric order:
///
/// * attendance: `employee ++ days_from_ce(date)`
/// * payslips: `payrun ++ employee`
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    // Last allocated leave id, loaded lazily from the highest stored key.
    leave_seq: Arc<Mutex<Option<LeaveId>>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            leave_seq: Arc::new(Mutex::new(None)),
        })
    }

    /// Uses this database for every port.
    pub fn into_stores(self) -> Stores {
        Stores {
            employees: Box::new(self.clone()),
            structures: Box::new(self.clone()),
            attendance: Box::new(self.clone()),
            leaves: Box::new(self.clone()),
            payruns: Box::new(self.clone()),
            settings: Box::new(self),
        }
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            WorkZenError::InternalError(Box::new(std::io::Error::other(format!(
                "column family '{name}' not found"
            ))))
        })
    }

    fn put_json<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Values whose key lies in `[from, to]`, in key order.
    fn scan_json<T: DeserializeOwned>(&self, cf: &str, from: &[u8], to: &[u8]) -> Result<Vec<T>> {
        let iter = self
            .db
            .iterator_cf(self.cf(cf)?, IteratorMode::From(from, Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if key.as_ref() > to {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn scan_all_json<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for item in self.db.iterator_cf(self.cf(cf)?, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn attendance_key(employee: EmployeeId, date: NaiveDate) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&employee.to_be_bytes());
    key[4..].copy_from_slice(&date.num_days_from_ce().to_be_bytes());
    key
}

fn payslip_key(payrun: PayrunId, employee: EmployeeId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&payrun.to_be_bytes());
    key[4..].copy_from_slice(&employee.to_be_bytes());
    key
}

#[async_trait]
impl EmployeeStore for RocksDBStore {
    async fn store(&self, employee: Employee) -> Result<()> {
        self.put_json(CF_EMPLOYEES, &employee.id.to_be_bytes(), &employee)
    }

    async fn get(&self, id: EmployeeId) -> Result<Option<Employee>> {
        self.get_json(CF_EMPLOYEES, &id.to_be_bytes())
    }

    async fn list(&self, company: CompanyId) -> Result<Vec<Employee>> {
        let employees: Vec<Employee> = self.scan_all_json(CF_EMPLOYEES)?;
        Ok(employees.into_iter().filter(|e| e.company == company).collect())
    }
}

#[async_trait]
impl SalaryStructureStore for RocksDBStore {
    async fn store(&self, structure: SalaryStructure) -> Result<()> {
        self.put_json(CF_STRUCTURES, &structure.employee.to_be_bytes(), &structure)
    }

    async fn get(&self, employee: EmployeeId) -> Result<Option<SalaryStructure>> {
        self.get_json(CF_STRUCTURES, &employee.to_be_bytes())
    }
}

#[async_trait]
impl AttendanceStore for RocksDBStore {
    async fn store(&self, record: AttendanceRecord) -> Result<()> {
        self.put_json(CF_ATTENDANCE, &attendance_key(record.employee, record.date), &record)
    }

    async fn get(&self, employee: EmployeeId, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        self.get_json(CF_ATTENDANCE, &attendance_key(employee, date))
    }

    async fn range(
        &self,
        employee: EmployeeId,
        period: PayPeriod,
    ) -> Result<Vec<AttendanceRecord>> {
        self.scan_json(
            CF_ATTENDANCE,
            &attendance_key(employee, period.start),
            &attendance_key(employee, period.end),
        )
    }
}

#[async_trait]
impl LeaveStore for RocksDBStore {
    async fn next_id(&self) -> Result<LeaveId> {
        let mut seq = self.leave_seq.lock().await;
        let last = match *seq {
            Some(last) => last,
            None => match self.db.iterator_cf(self.cf(CF_LEAVES)?, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    let bytes: [u8; 4] = key.as_ref().try_into().map_err(|_| {
                        WorkZenError::InternalError(Box::new(std::io::Error::other(
                            "malformed leave key",
                        )))
                    })?;
                    LeaveId::from_be_bytes(bytes)
                }
                None => 0,
            },
        };
        let next = last + 1;
        *seq = Some(next);
        Ok(next)
    }

    async fn store(&self, request: LeaveRequest) -> Result<()> {
        self.put_json(CF_LEAVES, &request.id.to_be_bytes(), &request)
    }

    async fn get(&self, id: LeaveId) -> Result<Option<LeaveRequest>> {
        self.get_json(CF_LEAVES, &id.to_be_bytes())
    }

    async fn list(&self, employee: EmployeeId) -> Result<Vec<LeaveRequest>> {
        let requests: Vec<LeaveRequest> = self.scan_all_json(CF_LEAVES)?;
        Ok(requests.into_iter().filter(|r| r.employee == employee).collect())
    }
}

#[async_trait]
impl PayrunStore for RocksDBStore {
    async fn store(&self, payrun: Payrun) -> Result<()> {
        self.put_json(CF_PAYRUNS, &payrun.id.to_be_bytes(), &payrun)
    }

    async fn get(&self, id: PayrunId) -> Result<Option<Payrun>> {
        self.get_json(CF_PAYRUNS, &id.to_be_bytes())
    }

    async fn replace_payslips(&self, payrun: Payrun, payslips: Vec<Payslip>) -> Result<()> {
        let payslips_cf = self.cf(CF_PAYSLIPS)?;
        let mut batch = WriteBatch::default();

        // Range end is exclusive; one byte longer than any key of this payrun.
        let mut end = payrun.id.to_be_bytes().to_vec();
        end.extend_from_slice(&[0xFF; 5]);
        batch.delete_range_cf(payslips_cf, payslip_key(payrun.id, 0).to_vec(), end);

        for payslip in &payslips {
            batch.put_cf(
                payslips_cf,
                payslip_key(payrun.id, payslip.employee),
                serde_json::to_vec(payslip)?,
            );
        }
        batch.put_cf(
            self.cf(CF_PAYRUNS)?,
            payrun.id.to_be_bytes(),
            serde_json::to_vec(&payrun)?,
        );

        self.db.write(batch)?;
        Ok(())
    }

    async fn payslips(&self, id: PayrunId) -> Result<Vec<Payslip>> {
        self.scan_json(
            CF_PAYSLIPS,
            &payslip_key(id, 0),
            &payslip_key(id, EmployeeId::MAX),
        )
    }
}

#[async_trait]
impl SettingsStore for RocksDBStore {
    async fn store(&self, company: CompanyId, settings: PayrollSettings) -> Result<()> {
        self.put_json(CF_SETTINGS, &company.to_be_bytes(), &settings)
    }

    async fn get(&self, company: CompanyId) -> Result<Option<PayrollSettings>> {
        self.get_json(CF_SETTINGS, &company.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attendance::AttendanceStatus;
    use crate::domain::employee::Role;
    use crate::domain::leave::LeaveType;
    use crate::domain::money::Money;
    use crate::domain::payrun::PayrunStatus;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    fn payslip(payrun: PayrunId, employee: EmployeeId) -> Payslip {
        Payslip {
            payrun,
            employee,
            monthly_wage: Money::new(dec!(1000)),
            total_working_days: 20,
            paid_days: dec!(20),
            attendance_ratio: dec!(1),
            basic_salary: Money::ZERO,
            gross_salary: Money::ZERO,
            prorated_basic: Money::ZERO,
            prorated_gross: Money::ZERO,
            total_deductions: Money::ZERO,
            pf_employee: Money::ZERO,
            pf_employer: Money::ZERO,
            professional_tax: Money::ZERO,
            net_salary: Money::new(dec!(1000)),
            lines: vec![],
        }
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in COLUMN_FAMILIES {
            assert!(store.db.cf_handle(name).is_some(), "{name}");
        }
    }

    #[tokio::test]
    async fn test_rocksdb_employee_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let employee = Employee::new(1, 1, "Asha", Role::Payroll);
        EmployeeStore::store(&store, employee.clone()).await.unwrap();
        EmployeeStore::store(&store, Employee::new(2, 2, "Ravi", Role::Employee))
            .await
            .unwrap();

        assert_eq!(EmployeeStore::get(&store, 1).await.unwrap(), Some(employee));
        assert_eq!(EmployeeStore::list(&store, 1).await.unwrap().len(), 1);
        assert!(EmployeeStore::get(&store, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_attendance_range() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        for (employee, day) in [(1, 3), (1, 20), (1, 1), (2, 3)] {
            AttendanceStore::store(
                &store,
                AttendanceRecord::marked(employee, date(day), AttendanceStatus::Present),
            )
            .await
            .unwrap();
        }

        let period = PayPeriod::new(date(2), date(20)).unwrap();
        let records = AttendanceStore::range(&store, 1, period).await.unwrap();
        assert_eq!(
            records.iter().map(|r| r.date).collect::<Vec<_>>(),
            vec![date(3), date(20)]
        );
    }

    #[tokio::test]
    async fn test_rocksdb_replace_payslips() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut payrun = Payrun::new(7, 1, PayPeriod::new(date(1), date(28)).unwrap());
        payrun.status = PayrunStatus::Computed;
        store
            .replace_payslips(payrun.clone(), vec![payslip(7, 1), payslip(7, 2)])
            .await
            .unwrap();
        store
            .replace_payslips(
                Payrun::new(8, 1, payrun.period),
                vec![payslip(8, 1)],
            )
            .await
            .unwrap();

        assert_eq!(store.payslips(7).await.unwrap().len(), 2);

        store.replace_payslips(payrun, vec![payslip(7, 3)]).await.unwrap();
        let payslips = store.payslips(7).await.unwrap();
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].employee, 3);
        // Other payruns are untouched.
        assert_eq!(store.payslips(8).await.unwrap().len(), 1);
        assert_eq!(
            PayrunStore::get(&store, 7).await.unwrap().unwrap().status,
            PayrunStatus::Computed
        );
    }

    #[tokio::test]
    async fn test_rocksdb_leave_ids_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            for _ in 0..2 {
                let id = store.next_id().await.unwrap();
                let request =
                    LeaveRequest::new(id, 1, LeaveType::Paid, date(3), date(4), "trip").unwrap();
                LeaveStore::store(&store, request).await.unwrap();
            }
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(store.next_id().await.unwrap(), 3);
        assert_eq!(LeaveStore::list(&store, 1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rocksdb_settings_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let settings = PayrollSettings {
            working_days_per_week: 6,
            ..Default::default()
        };
        SettingsStore::store(&store, 4, settings.clone()).await.unwrap();
        assert_eq!(SettingsStore::get(&store, 4).await.unwrap(), Some(settings));
    }
}
