use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use workzen::application::engine::HrEngine;
use workzen::config;
use workzen::domain::access::Actor;
use workzen::domain::employee::{CompanyId, EmployeeId};
use workzen::domain::money::Money;
use workzen::domain::payrun::{PayPeriod, PayrunId};
use workzen::domain::ports::Stores;
use workzen::domain::salary::SalaryStructure;
use workzen::infrastructure::in_memory;
use workzen::interfaces::csv::payslip_writer::PayslipWriter;
use workzen::interfaces::csv::record_reader::RecordReader;
use workzen::interfaces::csv::rows::{AttendanceRow, ComponentRow, EmployeeRow, assemble_structures};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "WORKZEN_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Payroll settings JSON file (optional). Defaults apply otherwise.
    #[arg(long, env = "WORKZEN_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Computes the payslips of one company for a pay period.
    Payrun {
        /// Employees CSV file
        #[arg(long)]
        employees: PathBuf,
        /// Salary components CSV file
        #[arg(long)]
        structures: PathBuf,
        /// Attendance CSV file
        #[arg(long)]
        attendance: Option<PathBuf>,
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the period, inclusive
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, default_value_t = 1)]
        company: CompanyId,
        #[arg(long, default_value_t = 1)]
        payrun_id: PayrunId,
        /// Validate the payrun after computing it
        #[arg(long)]
        validate: bool,
        #[arg(long, value_enum, default_value_t = Output::Payslips)]
        output: Output,
    },
    /// Checks every salary structure against its employee's wage.
    CheckStructures {
        #[arg(long)]
        employees: PathBuf,
        #[arg(long)]
        structures: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Payslips,
    Lines,
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init_tracing();
    let cli = Cli::parse();

    let settings = config::load_settings(cli.settings.as_deref()).into_diagnostic()?;

    match cli.command {
        Command::Payrun {
            employees,
            structures,
            attendance,
            from,
            to,
            company,
            payrun_id,
            validate,
            output,
        } => {
            let period = PayPeriod::new(from, to).into_diagnostic()?;
            let engine = HrEngine::new(open_stores(cli.db_path)?);
            let admin = Actor::system(company);
            engine.update_settings(&admin, settings).await.into_diagnostic()?;

            let companies = import_employees(&engine, &employees).await?;
            let wages: HashMap<EmployeeId, Money> = companies
                .iter()
                .map(|(id, (_, wage))| (*id, *wage))
                .collect();
            for structure in read_structures(&wages, &structures)? {
                let Some((owner, _)) = companies.get(&structure.employee) else {
                    continue;
                };
                let employee = structure.employee;
                if let Err(e) = engine
                    .define_salary_structure(&Actor::system(*owner), structure)
                    .await
                {
                    error!("Error defining salary structure of employee {}: {}", employee, e);
                }
            }
            if let Some(path) = attendance {
                import_attendance(&engine, &companies, &path).await?;
            }

            engine.open_payrun(&admin, payrun_id, period).await.into_diagnostic()?;
            let payslips = engine.compute_payrun(&admin, payrun_id).await.into_diagnostic()?;
            info!("Computed {} payslips for payrun {} ({})", payslips.len(), payrun_id, period);

            if validate {
                let issues = engine.validate_payrun(&admin, payrun_id).await.into_diagnostic()?;
                if !issues.is_empty() {
                    warn!("Payrun {} left unvalidated: {} issue(s)", payrun_id, issues.len());
                }
            }

            let stdout = io::stdout();
            let mut writer = PayslipWriter::new(stdout.lock());
            match output {
                Output::Payslips => writer.write_payslips(&payslips).into_diagnostic()?,
                Output::Lines => writer.write_lines(&payslips).into_diagnostic()?,
                Output::Summary => {
                    let report = engine.payrun_report(&admin, payrun_id).await.into_diagnostic()?;
                    writer.write_report(&report).into_diagnostic()?
                }
            }
        }
        Command::CheckStructures {
            employees,
            structures,
        } => {
            let mut wages = HashMap::new();
            for row in read_rows::<EmployeeRow>(&employees, "employee")? {
                if let Some(wage) = row.monthly_wage {
                    wages.insert(row.employee, wage);
                }
            }
            let structures = read_structures(&wages, &structures)?;
            let problems: Vec<(EmployeeId, Option<String>)> = structures
                .iter()
                .map(|s| (s.employee, s.validate().err().map(|e| e.to_string())))
                .collect();

            let stdout = io::stdout();
            let mut writer = PayslipWriter::new(stdout.lock());
            writer
                .write_structure_checks(problems.iter().map(|(id, p)| (*id, p.as_deref())))
                .into_diagnostic()?;
        }
    }

    Ok(())
}

fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if let Some(db_path) = db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use workzen::infrastructure::rocksdb::RocksDBStore;
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            return Ok(store.into_stores());
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let _ = db_path;
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not \
                 enabled. Falling back to In-Memory storage."
            );
        }
    }
    Ok(in_memory::stores())
}

/// Reads every well-formed row of a CSV file; malformed rows are logged and
/// skipped.
fn read_rows<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let file = File::open(path).into_diagnostic()?;
    let mut rows = Vec::new();
    for row in RecordReader::new(file).records::<T>() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => error!("Error reading {} row: {}", what, e),
        }
    }
    Ok(rows)
}

/// Registers the employees of a CSV file, each under its own company.
/// Returns the company and wage of every employee that has a wage.
async fn import_employees(
    engine: &HrEngine,
    path: &Path,
) -> Result<HashMap<EmployeeId, (CompanyId, Money)>> {
    let mut registered = HashMap::new();
    for row in read_rows::<EmployeeRow>(path, "employee")? {
        let actor = Actor::system(row.company);
        if let Err(e) = engine.register_employee(&actor, row.to_employee()).await {
            error!("Error registering employee {}: {}", row.employee, e);
            continue;
        }
        match row.monthly_wage {
            Some(wage) => {
                registered.insert(row.employee, (row.company, wage));
            }
            None => warn!("Employee {} has no monthly wage", row.employee),
        }
    }
    Ok(registered)
}

fn read_structures(
    wages: &HashMap<EmployeeId, Money>,
    path: &Path,
) -> Result<Vec<SalaryStructure>> {
    let rows = read_rows::<ComponentRow>(path, "salary component")?;
    let (structures, orphans) = assemble_structures(wages, rows);
    for row in orphans {
        warn!(
            "Skipping component '{}' of employee {}: no employee with a monthly wage",
            row.component, row.employee
        );
    }
    Ok(structures)
}

async fn import_attendance(
    engine: &HrEngine,
    companies: &HashMap<EmployeeId, (CompanyId, Money)>,
    path: &Path,
) -> Result<()> {
    for row in read_rows::<AttendanceRow>(path, "attendance")? {
        let Some((company, _)) = companies.get(&row.employee) else {
            warn!("Skipping attendance of unknown employee {}", row.employee);
            continue;
        };
        let employee = row.employee;
        if let Err(e) = engine
            .mark_attendance(&Actor::system(*company), row.into())
            .await
        {
            error!("Error recording attendance of employee {}: {}", employee, e);
        }
    }
    Ok(())
}
