use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Monday to Friday of February 2025.
pub fn february_weekdays() -> Vec<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 2, 1)
        .unwrap()
        .iter_days()
        .take(28)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// Writes `employees` employees of company 1, each with a 10000 wage paid
/// entirely as basic, and a random attendance sheet for February 2025.
///
/// Returns the number of present days drawn for every employee.
pub fn generate_company(
    dir: &Path,
    employees: u32,
    seed: u64,
) -> Result<BTreeMap<u32, u32>, Error> {
    let mut rng = StdRng::seed_from_u64(seed);
    let days = february_weekdays();

    let mut people = csv::Writer::from_writer(File::create(dir.join("employees.csv"))?);
    let mut structures = csv::Writer::from_writer(File::create(dir.join("structures.csv"))?);
    let mut attendance = csv::Writer::from_writer(File::create(dir.join("attendance.csv"))?);
    people.write_record([
        "employee",
        "company",
        "name",
        "email",
        "role",
        "department",
        "monthly_wage",
    ])?;
    structures.write_record(["employee", "component", "kind", "basis", "value"])?;
    attendance.write_record(["employee", "date", "status"])?;

    let mut present = BTreeMap::new();
    for id in 1..=employees {
        let id_str = id.to_string();
        let name = format!("Employee {id}");
        let key = id_str.as_str();
        people.write_record([key, "1", name.as_str(), "", "employee", "", "10000"])?;
        structures.write_record([key, "Basic", "earning", "percentage_of_wage", "100"])?;

        let mut count = 0;
        for day in &days {
            let status = if rng.gen_bool(0.8) {
                count += 1;
                "present"
            } else {
                "absent"
            };
            attendance.write_record([key, day.to_string().as_str(), status])?;
        }
        present.insert(id, count);
    }

    people.flush()?;
    structures.flush()?;
    attendance.flush()?;
    Ok(present)
}
