use super::engine::HrEngine;
use crate::domain::access::{Action, Actor};
use crate::domain::attendance::AttendanceSummary;
use crate::domain::calculator::{PayrollInput, compute_payslip};
use crate::domain::employee::EmployeeId;
use crate::domain::payrun::{PayPeriod, Payrun, PayrunId, PayrunStatus, Payslip};
use crate::error::{Result, WorkZenError};
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// A problem found while validating a computed payrun.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrunIssue {
    pub employee: Option<EmployeeId>,
    pub message: String,
}

impl fmt::Display for PayrunIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.employee {
            Some(employee) => write!(f, "employee {}: {}", employee, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl HrEngine {
    /// Creates a draft payrun for the actor's company, or returns the
    /// existing one when `id` already covers the same period.
    pub async fn open_payrun(
        &self,
        actor: &Actor,
        id: PayrunId,
        period: PayPeriod,
    ) -> Result<Payrun> {
        actor.authorize(Action::RunPayroll)?;

        if let Some(existing) = self.stores.payruns.get(id).await? {
            actor.authorize_company(existing.company, "payrun", id)?;
            if existing.period != period {
                return Err(WorkZenError::validation(format!(
                    "payrun {id} already covers {}",
                    existing.period
                )));
            }
            return Ok(existing);
        }

        let payrun = Payrun::new(id, actor.company, period);
        info!(payrun = id, company = actor.company, %period, "payrun opened");
        self.stores.payruns.store(payrun.clone()).await?;
        Ok(payrun)
    }

    /// Computes the payslips of every active employee with a salary
    /// structure and replaces whatever the payrun held before.
    ///
    /// Payslips are all derived before anything is written; the replace
    /// itself is one atomic store call.
    pub async fn compute_payrun(&self, actor: &Actor, id: PayrunId) -> Result<Vec<Payslip>> {
        actor.authorize(Action::RunPayroll)?;
        let mut payrun = self.payrun_of(actor, id).await?;
        if payrun.is_locked() {
            return Err(WorkZenError::PayrunLocked(id));
        }

        let settings = self.settings(payrun.company).await?;
        let total_working_days = payrun.period.working_days(settings.working_days_per_week);
        // Without working days only the unprorated pay is defined.
        if total_working_days == 0 && settings.deduct_absent_days {
            return Err(WorkZenError::validation(format!(
                "pay period {} has no working days",
                payrun.period
            )));
        }

        let employees = self.stores.employees.list(payrun.company).await?;
        let mut payslips = Vec::with_capacity(employees.len());
        for employee in employees.iter().filter(|e| e.is_active()) {
            let Some(structure) = self.stores.structures.get(employee.id).await? else {
                warn!(payrun = id, employee = employee.id, "no salary structure, skipping");
                continue;
            };
            let records = self.stores.attendance.range(employee.id, payrun.period).await?;
            let attendance = AttendanceSummary::from_records(employee.id, &records);

            payslips.push(compute_payslip(&PayrollInput {
                payrun: id,
                structure: &structure,
                attendance: &attendance,
                settings: &settings,
                total_working_days,
            })?);
        }

        payrun.status = PayrunStatus::Computed;
        info!(
            payrun = id,
            payslips = payslips.len(),
            working_days = total_working_days,
            "payrun computed"
        );
        self.stores
            .payruns
            .replace_payslips(payrun, payslips.clone())
            .await?;
        Ok(payslips)
    }

    /// Checks a computed payrun. With no issues the payrun becomes validated
    /// and can no longer be recomputed; otherwise it stays computed and the
    /// issues are returned.
    pub async fn validate_payrun(
        &self,
        actor: &Actor,
        id: PayrunId,
    ) -> Result<Vec<PayrunIssue>> {
        actor.authorize(Action::RunPayroll)?;
        let mut payrun = self.payrun_of(actor, id).await?;
        if payrun.status != PayrunStatus::Computed {
            return Err(WorkZenError::InvalidTransition {
                entity: "payrun",
                from: format!("{:?}", payrun.status).to_lowercase(),
                to: "validated".to_string(),
            });
        }

        let payslips = self.stores.payruns.payslips(id).await?;
        let mut issues = Vec::new();
        if payslips.is_empty() {
            issues.push(PayrunIssue {
                employee: None,
                message: "payrun has no payslips".to_string(),
            });
        }
        for payslip in payslips.iter().filter(|p| p.net_salary.is_negative()) {
            issues.push(PayrunIssue {
                employee: Some(payslip.employee),
                message: format!("net salary is negative ({})", payslip.net_salary),
            });
        }
        let paid: HashSet<EmployeeId> = payslips.iter().map(|p| p.employee).collect();
        for employee in self.stores.employees.list(payrun.company).await? {
            if employee.is_active() && !paid.contains(&employee.id) {
                issues.push(PayrunIssue {
                    employee: Some(employee.id),
                    message: "active employee has no payslip".to_string(),
                });
            }
        }

        if issues.is_empty() {
            payrun.status = PayrunStatus::Validated;
            self.stores.payruns.store(payrun).await?;
            info!(payrun = id, "payrun validated");
        } else {
            for issue in &issues {
                warn!(payrun = id, "{}", issue);
            }
        }
        Ok(issues)
    }

    pub async fn payrun(&self, actor: &Actor, id: PayrunId) -> Result<Payrun> {
        actor.authorize(Action::ViewReports)?;
        self.payrun_of(actor, id).await
    }

    pub async fn payslips(&self, actor: &Actor, id: PayrunId) -> Result<Vec<Payslip>> {
        actor.authorize(Action::ViewReports)?;
        self.payrun_of(actor, id).await?;
        self.stores.payruns.payslips(id).await
    }

    /// One employee's payslip; employees may read their own.
    pub async fn payslip(
        &self,
        actor: &Actor,
        id: PayrunId,
        employee: EmployeeId,
    ) -> Result<Payslip> {
        if !actor.permits(Action::ViewReports) {
            actor.authorize(Action::ActFor(employee))?;
        }
        self.payrun_of(actor, id).await?;
        self.stores
            .payruns
            .payslips(id)
            .await?
            .into_iter()
            .find(|p| p.employee == employee)
            .ok_or_else(|| WorkZenError::not_found("payslip", format!("{id}/{employee}")))
    }

    async fn payrun_of(&self, actor: &Actor, id: PayrunId) -> Result<Payrun> {
        let payrun = self
            .stores
            .payruns
            .get(id)
            .await?
            .ok_or_else(|| WorkZenError::not_found("payrun", id))?;
        actor.authorize_company(payrun.company, "payrun", id)?;
        Ok(payrun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::domain::employee::{Employee, Role};
    use crate::domain::money::Money;
    use crate::domain::salary::{CalculationBasis, SalaryComponent, SalaryStructure};
    use crate::domain::settings::PayrollSettings;
    use crate::infrastructure::in_memory;
    use chrono::{Datelike, NaiveDate, Weekday};
    use rust_decimal_macros::dec;

    fn february() -> PayPeriod {
        PayPeriod::new(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        )
        .unwrap()
    }

    fn weekdays() -> impl Iterator<Item = NaiveDate> {
        february()
            .start
            .iter_days()
            .take_while(|d| *d <= february().end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
    }

    async fn engine() -> HrEngine {
        let engine = HrEngine::new(in_memory::stores());
        let admin = Actor::system(1);
        engine
            .register_employee(&admin, Employee::new(1, 1, "Meera", Role::Employee))
            .await
            .unwrap();
        engine
            .define_salary_structure(
                &admin,
                SalaryStructure::new(
                    1,
                    Money::new(dec!(50000)),
                    vec![
                        SalaryComponent::earning(
                            "House Rent Allowance",
                            CalculationBasis::PercentageOfBasic,
                            dec!(50),
                        ),
                        SalaryComponent::earning(
                            "Basic Salary",
                            CalculationBasis::PercentageOfWage,
                            dec!(50),
                        ),
                        SalaryComponent::earning(
                            "Special Allowance",
                            CalculationBasis::Fixed,
                            dec!(5000),
                        ),
                        SalaryComponent::deduction("Canteen", CalculationBasis::Fixed, dec!(500)),
                    ],
                )
                .unwrap(),
            )
            .await
            .unwrap();

        // 18 present days and 2 half days out of 20 weekdays.
        for (i, date) in weekdays().enumerate() {
            let status = if i < 18 {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::HalfDay
            };
            engine
                .mark_attendance(&admin, AttendanceRecord::marked(1, date, status))
                .await
                .unwrap();
        }
        engine
    }

    #[tokio::test]
    async fn test_compute_payrun() {
        let engine = engine().await;
        let payroll = Actor::new(9, 1, Role::Payroll);

        engine.open_payrun(&payroll, 1, february()).await.unwrap();
        let payslips = engine.compute_payrun(&payroll, 1).await.unwrap();

        assert_eq!(payslips.len(), 1);
        let payslip = &payslips[0];
        assert_eq!(payslip.total_working_days, 20);
        assert_eq!(payslip.paid_days, dec!(19));
        assert_eq!(payslip.net_salary, Money::new(dec!(36850)));
        assert_eq!(
            engine.payrun(&payroll, 1).await.unwrap().status,
            PayrunStatus::Computed
        );
    }

    #[tokio::test]
    async fn test_recompute_replaces_payslips() {
        let engine = engine().await;
        let admin = Actor::system(1);

        engine.open_payrun(&admin, 1, february()).await.unwrap();
        engine.compute_payrun(&admin, 1).await.unwrap();

        // A second employee appears and attendance changes; recompute.
        engine
            .register_employee(&admin, Employee::new(2, 1, "Kabir", Role::Employee))
            .await
            .unwrap();
        engine
            .define_salary_structure(
                &admin,
                SalaryStructure::new(
                    2,
                    Money::new(dec!(10000)),
                    vec![SalaryComponent::earning(
                        "Basic",
                        CalculationBasis::PercentageOfWage,
                        dec!(100),
                    )],
                )
                .unwrap(),
            )
            .await
            .unwrap();
        for date in weekdays() {
            let record = AttendanceRecord::marked(1, date, AttendanceStatus::Present);
            engine.mark_attendance(&admin, record).await.unwrap();
        }

        engine.compute_payrun(&admin, 1).await.unwrap();
        let payslips = engine.payslips(&admin, 1).await.unwrap();
        assert_eq!(payslips.len(), 2);
        assert_eq!(payslips[0].net_salary, Money::new(dec!(38800)));
        // No attendance for employee 2: only professional tax remains.
        assert_eq!(payslips[1].net_salary, Money::new(dec!(-200)));

        // Same inputs, same result.
        let again = engine.compute_payrun(&admin, 1).await.unwrap();
        assert_eq!(again, payslips);
    }

    #[tokio::test]
    async fn test_employees_without_structure_or_inactive_are_skipped() {
        let engine = engine().await;
        let admin = Actor::system(1);
        engine
            .register_employee(&admin, Employee::new(2, 1, "Kabir", Role::Employee))
            .await
            .unwrap();

        engine.open_payrun(&admin, 1, february()).await.unwrap();
        assert_eq!(engine.compute_payrun(&admin, 1).await.unwrap().len(), 1);

        engine.deactivate_employee(&admin, 1).await.unwrap();
        assert!(engine.compute_payrun(&admin, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_locks_payrun() {
        let engine = engine().await;
        let admin = Actor::system(1);

        engine.open_payrun(&admin, 1, february()).await.unwrap();
        engine.compute_payrun(&admin, 1).await.unwrap();

        let issues = engine.validate_payrun(&admin, 1).await.unwrap();
        assert!(issues.is_empty());
        assert_eq!(engine.payrun(&admin, 1).await.unwrap().status, PayrunStatus::Validated);

        let result = engine.compute_payrun(&admin, 1).await;
        assert!(matches!(result, Err(WorkZenError::PayrunLocked(1))));
    }

    #[tokio::test]
    async fn test_validate_reports_issues_and_keeps_computed() {
        let engine = engine().await;
        let admin = Actor::system(1);
        // Employee without structure and without attendance.
        engine
            .register_employee(&admin, Employee::new(2, 1, "Kabir", Role::Employee))
            .await
            .unwrap();

        engine.open_payrun(&admin, 1, february()).await.unwrap();
        engine.compute_payrun(&admin, 1).await.unwrap();

        let issues = engine.validate_payrun(&admin, 1).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].employee, Some(2));
        assert_eq!(engine.payrun(&admin, 1).await.unwrap().status, PayrunStatus::Computed);
    }

    #[tokio::test]
    async fn test_validate_requires_computed() {
        let engine = engine().await;
        let admin = Actor::system(1);
        engine.open_payrun(&admin, 1, february()).await.unwrap();
        let result = engine.validate_payrun(&admin, 1).await;
        assert!(matches!(result, Err(WorkZenError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_open_payrun_rejects_period_change() {
        let engine = engine().await;
        let admin = Actor::system(1);
        engine.open_payrun(&admin, 1, february()).await.unwrap();
        assert!(engine.open_payrun(&admin, 1, february()).await.is_ok());

        let march = PayPeriod::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap();
        assert!(engine.open_payrun(&admin, 1, march).await.is_err());
    }

    #[tokio::test]
    async fn test_payrun_is_tenant_scoped() {
        let engine = engine().await;
        engine.open_payrun(&Actor::system(1), 1, february()).await.unwrap();

        let result = engine.compute_payrun(&Actor::system(2), 1).await;
        assert!(matches!(result, Err(WorkZenError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_employee_reads_own_payslip_only() {
        let engine = engine().await;
        let admin = Actor::system(1);
        engine.open_payrun(&admin, 1, february()).await.unwrap();
        engine.compute_payrun(&admin, 1).await.unwrap();

        let me = Actor::new(1, 1, Role::Employee);
        assert_eq!(engine.payslip(&me, 1, 1).await.unwrap().employee, 1);
        assert!(engine.payslips(&me, 1).await.is_err());

        let other = Actor::new(2, 1, Role::Employee);
        assert!(engine.payslip(&other, 1, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_period_without_working_days() {
        let engine = engine().await;
        let admin = Actor::system(1);
        let day = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        engine
            .open_payrun(&admin, 2, PayPeriod::new(day, day).unwrap())
            .await
            .unwrap();
        assert!(matches!(
            engine.compute_payrun(&admin, 2).await,
            Err(WorkZenError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_period_without_working_days_pays_full_wage_without_deduction() {
        let engine = HrEngine::new(in_memory::stores());
        let admin = Actor::system(1);
        let settings = PayrollSettings {
            deduct_absent_days: false,
            ..Default::default()
        };
        engine.update_settings(&admin, settings).await.unwrap();
        engine
            .register_employee(&admin, Employee::new(1, 1, "Meera", Role::Employee))
            .await
            .unwrap();
        engine
            .define_salary_structure(
                &admin,
                SalaryStructure::new(
                    1,
                    Money::new(dec!(1000)),
                    vec![SalaryComponent::earning(
                        "Basic",
                        CalculationBasis::PercentageOfWage,
                        dec!(100),
                    )],
                )
                .unwrap(),
            )
            .await
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        engine
            .open_payrun(&admin, 2, PayPeriod::new(day, day).unwrap())
            .await
            .unwrap();
        let payslips = engine.compute_payrun(&admin, 2).await.unwrap();

        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].total_working_days, 0);
        assert_eq!(payslips[0].attendance_ratio, dec!(1));
        assert_eq!(payslips[0].net_salary, Money::new(dec!(680)));
    }

    #[tokio::test]
    async fn test_validate_flags_payrun_without_payslips() {
        let engine = engine().await;
        // Company 3 has nobody to pay.
        let admin = Actor::system(3);

        engine.open_payrun(&admin, 5, february()).await.unwrap();
        assert!(engine.compute_payrun(&admin, 5).await.unwrap().is_empty());

        let issues = engine.validate_payrun(&admin, 5).await.unwrap();
        assert_eq!(
            issues,
            vec![PayrunIssue {
                employee: None,
                message: "payrun has no payslips".to_string(),
            }]
        );
        assert_eq!(engine.payrun(&admin, 5).await.unwrap().status, PayrunStatus::Computed);
    }
}
