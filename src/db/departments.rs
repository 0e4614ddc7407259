use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{DepartmentDao, SqliteDao};
use crate::error::{DaoError, Entity, Result};
use crate::models::{validate_key, Department, DepartmentId};

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        depno: DepartmentId(row.get(0)?),
        name: row.get(1)?,
        location: row.get(2)?,
    })
}

/// Retrieve every department sorted by key.
pub(crate) fn fetch_departments(conn: &Connection) -> Result<Vec<Department>> {
    let mut stmt = conn.prepare("SELECT depno, name, location FROM departments ORDER BY depno")?;

    let departments = stmt
        .query_map([], department_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(departments)
}

pub(crate) fn fetch_department(conn: &Connection, depno: DepartmentId) -> Result<Department> {
    conn.query_row(
        "SELECT depno, name, location FROM departments WHERE depno = ?1",
        params![depno.0],
        department_from_row,
    )
    .optional()?
    .ok_or_else(|| DaoError::not_found(Entity::Department, depno.0))
}

pub(crate) fn insert_department(conn: &Connection, department: &Department) -> Result<()> {
    conn.execute(
        "INSERT INTO departments (depno, name, location) VALUES (?1, ?2, ?3)",
        params![department.depno.0, department.name, department.location],
    )
    .map_err(|err| DaoError::from_sqlite(err, Entity::Department, department.depno.0))?;
    Ok(())
}

/// Overwrite name and location for an existing key. Zero touched rows means
/// the department was never there.
pub(crate) fn update_department_row(conn: &Connection, department: &Department) -> Result<()> {
    let updated = conn.execute(
        "UPDATE departments SET name = ?1, location = ?2 WHERE depno = ?3",
        params![department.name, department.location, department.depno.0],
    )?;

    if updated == 0 {
        Err(DaoError::not_found(Entity::Department, department.depno.0))
    } else {
        Ok(())
    }
}

/// Remove a department row. Employees keep their `depno`.
pub(crate) fn delete_department_row(conn: &Connection, depno: DepartmentId) -> Result<Department> {
    let existing = fetch_department(conn, depno)?;
    conn.execute("DELETE FROM departments WHERE depno = ?1", params![depno.0])?;
    Ok(existing)
}

impl DepartmentDao for SqliteDao {
    fn add_department(&mut self, department: &Department) -> Result<()> {
        department.validate()?;
        insert_department(self.conn()?, department)?;
        info!(depno = department.depno.0, "department added");
        Ok(())
    }

    fn delete_department(&mut self, depno: DepartmentId) -> Result<Department> {
        validate_key(Entity::Department, depno.0)?;
        let deleted = delete_department_row(self.conn()?, depno)?;
        info!(depno = depno.0, "department deleted");
        Ok(deleted)
    }

    fn update_department(&mut self, department: &Department) -> Result<()> {
        department.validate()?;
        update_department_row(self.conn()?, department)?;
        info!(depno = department.depno.0, "department updated");
        Ok(())
    }

    fn find_department_by_id(&mut self, depno: DepartmentId) -> Result<Department> {
        validate_key(Entity::Department, depno.0)?;
        let result = fetch_department(self.conn()?, depno);
        if result.is_err() {
            debug!(depno = depno.0, "department lookup missed");
        }
        result
    }

    fn find_all_departments(&mut self) -> Result<Vec<Department>> {
        let departments = fetch_departments(self.conn()?)?;
        debug!(count = departments.len(), "loaded departments");
        Ok(departments)
    }
}
