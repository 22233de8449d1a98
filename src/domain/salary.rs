use super::employee::EmployeeId;
use super::money::Money;
use crate::error::{Result, WorkZenError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Earning,
    Deduction,
}

/// How a component's `value` turns into an amount.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CalculationBasis {
    /// `value` is the amount itself.
    Fixed,
    /// `value` percent of the monthly wage.
    PercentageOfWage,
    /// `value` percent of the derived basic salary.
    PercentageOfBasic,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SalaryComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub basis: CalculationBasis,
    pub value: Decimal,
}

impl SalaryComponent {
    pub fn new(
        name: impl Into<String>,
        kind: ComponentKind,
        basis: CalculationBasis,
        value: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            basis,
            value,
        }
    }

    pub fn earning(name: impl Into<String>, basis: CalculationBasis, value: Decimal) -> Self {
        Self::new(name, ComponentKind::Earning, basis, value)
    }

    pub fn deduction(name: impl Into<String>, basis: CalculationBasis, value: Decimal) -> Self {
        Self::new(name, ComponentKind::Deduction, basis, value)
    }

    pub fn depends_on_basic(&self) -> bool {
        self.basis == CalculationBasis::PercentageOfBasic
    }

    /// Whether this component defines the basic salary: an earning computed
    /// from the wage or a fixed amount, whose name mentions "basic".
    pub fn is_basic(&self) -> bool {
        self.kind == ComponentKind::Earning
            && !self.depends_on_basic()
            && self.name.to_lowercase().contains("basic")
    }

    /// Unprorated amount of this component.
    pub fn amount(&self, monthly_wage: Money, basic_salary: Money) -> Result<Money> {
        match self.basis {
            CalculationBasis::Fixed => Ok(Money::new(self.value)),
            CalculationBasis::PercentageOfWage => monthly_wage.percent(self.value),
            CalculationBasis::PercentageOfBasic => basic_salary.percent(self.value),
        }
    }
}

/// The pay definition of one employee: monthly wage plus an ordered list of
/// components.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SalaryStructure {
    pub employee: EmployeeId,
    pub monthly_wage: Money,
    pub components: Vec<SalaryComponent>,
}

impl SalaryStructure {
    /// Builds a structure and rejects it if it is not valid.
    pub fn new(
        employee: EmployeeId,
        monthly_wage: Money,
        components: Vec<SalaryComponent>,
    ) -> Result<Self> {
        let structure = Self {
            employee,
            monthly_wage,
            components,
        };
        structure.validate()?;
        Ok(structure)
    }

    pub fn earnings(&self) -> impl Iterator<Item = &SalaryComponent> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Earning)
    }

    pub fn deductions(&self) -> impl Iterator<Item = &SalaryComponent> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Deduction)
    }

    /// The component that defines basic salary. The first one in declaration
    /// order wins when several match.
    pub fn basic_component(&self) -> Option<&SalaryComponent> {
        self.components.iter().find(|c| c.is_basic())
    }

    /// Wage allocated up front: fixed earnings plus percentage-of-wage
    /// earnings. Percentage-of-basic earnings are not counted.
    pub fn allocated_wage(&self) -> Result<Money> {
        self.earnings()
            .filter(|c| !c.depends_on_basic())
            .try_fold(Money::ZERO, |total, c| {
                total.checked_add(c.amount(self.monthly_wage, Money::ZERO)?)
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.monthly_wage.value() <= Decimal::ZERO {
            return Err(WorkZenError::validation(format!(
                "monthly wage of employee {} must be positive",
                self.employee
            )));
        }

        let mut names = HashSet::new();
        for component in &self.components {
            let name = component.name.trim();
            if name.is_empty() {
                return Err(WorkZenError::validation("component name must not be empty"));
            }
            if !names.insert(name.to_lowercase()) {
                return Err(WorkZenError::validation(format!(
                    "duplicate component '{name}'"
                )));
            }
            if component.value < Decimal::ZERO {
                return Err(WorkZenError::validation(format!(
                    "component '{name}' has a negative value"
                )));
            }
            if component.basis != CalculationBasis::Fixed
                && component.value > Decimal::ONE_HUNDRED
            {
                return Err(WorkZenError::validation(format!(
                    "component '{name}' exceeds 100 percent"
                )));
            }
        }

        if self.components.iter().any(|c| c.depends_on_basic())
            && self.basic_component().is_none()
        {
            return Err(WorkZenError::validation(format!(
                "employee {} uses percentage_of_basic without a basic earning",
                self.employee
            )));
        }

        let allocated = self.allocated_wage()?;
        if allocated > self.monthly_wage {
            return Err(WorkZenError::StructureExceedsWage {
                allocated: allocated.value(),
                wage: self.monthly_wage.value(),
            });
        }

        // Every total a payslip derives from the structure must be representable.
        let basic = match self.basic_component() {
            Some(component) => component.amount(self.monthly_wage, Money::ZERO)?,
            None => Money::ZERO,
        };
        for kind in [ComponentKind::Earning, ComponentKind::Deduction] {
            let amounts = self
                .components
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.amount(self.monthly_wage, basic))
                .collect::<Result<Vec<_>>>()?;
            Money::checked_sum(&amounts)?;
        }

        Ok(())
    }
}
