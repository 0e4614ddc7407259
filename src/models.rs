//! Domain models that mirror the SQLite schema and get passed between the DAO
//! and the terminal front-end. They stay plain value objects: the store owns
//! the persisted rows, and these are copies handed back and forth.

use std::fmt;

use crate::error::{DaoError, Entity, Result};

/// Primary key of a [`Department`] (`depno`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepartmentId(pub i64);

/// Primary key of an [`Employee`] (`empno`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmployeeId(pub i64);

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A company department. `depno` is the identity the store matches on.
pub struct Department {
    pub depno: DepartmentId,
    pub name: String,
    pub location: String,
}

impl Department {
    pub fn new(depno: i64, name: &str, location: &str) -> Self {
        Self {
            depno: DepartmentId(depno),
            name: name.to_string(),
            location: location.to_string(),
        }
    }

    /// Reject negative keys and blank text before anything reaches the store.
    pub fn validate(&self) -> Result<()> {
        validate_key(Entity::Department, self.depno.0)?;
        require_text("Department name", &self.name)?;
        require_text("Department location", &self.location)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.depno, self.name, self.location)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An employee row. `depno` is a soft reference: nothing stops it from
/// pointing at a department that was deleted or never existed.
pub struct Employee {
    pub empno: EmployeeId,
    pub name: String,
    pub position: String,
    /// Owning department, `None` when the employee is unassigned.
    pub depno: Option<DepartmentId>,
}

impl Employee {
    pub fn new(empno: i64, name: &str, position: &str, depno: Option<DepartmentId>) -> Self {
        Self {
            empno: EmployeeId(empno),
            name: name.to_string(),
            position: position.to_string(),
            depno,
        }
    }

    /// Department number as shown in tables, `-` when unassigned.
    pub fn depno_label(&self) -> String {
        self.depno
            .map(|depno| depno.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(Entity::Employee, self.empno.0)?;
        require_text("Employee name", &self.name)?;
        require_text("Employee position", &self.position)?;
        if let Some(depno) = self.depno {
            validate_key(Entity::Department, depno.0)?;
        }
        Ok(())
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}, {} [dept {}]",
            self.empno,
            self.name,
            self.position,
            self.depno_label()
        )
    }
}

/// Identity values are non-negative integers.
pub(crate) fn validate_key(entity: Entity, key: i64) -> Result<()> {
    if key < 0 {
        Err(DaoError::Validation(format!(
            "Invalid {entity} number {key}: must not be negative."
        )))
    } else {
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(DaoError::Validation(format!("{field} cannot be empty.")))
    } else {
        Ok(())
    }
}
