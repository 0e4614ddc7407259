use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{EmployeeDao, SqliteDao};
use crate::error::{DaoError, Entity, Result};
use crate::models::{validate_key, DepartmentId, Employee, EmployeeId};

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        empno: EmployeeId(row.get(0)?),
        name: row.get(1)?,
        position: row.get(2)?,
        depno: row.get::<_, Option<i64>>(3)?.map(DepartmentId),
    })
}

/// Fetch every employee ordered by key.
pub(crate) fn fetch_employees(conn: &Connection) -> Result<Vec<Employee>> {
    let mut stmt =
        conn.prepare("SELECT empno, name, position, depno FROM employees ORDER BY empno")?;

    let employees = stmt
        .query_map([], employee_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(employees)
}

/// Employees pointing at a department, whether or not that department still
/// exists.
pub(crate) fn fetch_employees_for_department(
    conn: &Connection,
    depno: DepartmentId,
) -> Result<Vec<Employee>> {
    let mut stmt = conn.prepare(
        "SELECT empno, name, position, depno
         FROM employees
         WHERE depno = ?1
         ORDER BY empno",
    )?;

    let employees = stmt
        .query_map(params![depno.0], employee_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(employees)
}

pub(crate) fn fetch_employee(conn: &Connection, empno: EmployeeId) -> Result<Employee> {
    conn.query_row(
        "SELECT empno, name, position, depno FROM employees WHERE empno = ?1",
        params![empno.0],
        employee_from_row,
    )
    .optional()?
    .ok_or_else(|| DaoError::not_found(Entity::Employee, empno.0))
}

pub(crate) fn insert_employee(conn: &Connection, employee: &Employee) -> Result<()> {
    conn.execute(
        "INSERT INTO employees (empno, name, position, depno) VALUES (?1, ?2, ?3, ?4)",
        params![
            employee.empno.0,
            employee.name,
            employee.position,
            employee.depno.map(|depno| depno.0)
        ],
    )
    .map_err(|err| DaoError::from_sqlite(err, Entity::Employee, employee.empno.0))?;
    Ok(())
}

pub(crate) fn update_employee_row(conn: &Connection, employee: &Employee) -> Result<()> {
    let updated = conn.execute(
        "UPDATE employees SET name = ?1, position = ?2, depno = ?3 WHERE empno = ?4",
        params![
            employee.name,
            employee.position,
            employee.depno.map(|depno| depno.0),
            employee.empno.0
        ],
    )?;

    if updated == 0 {
        Err(DaoError::not_found(Entity::Employee, employee.empno.0))
    } else {
        Ok(())
    }
}

pub(crate) fn delete_employee_row(conn: &Connection, empno: EmployeeId) -> Result<Employee> {
    let existing = fetch_employee(conn, empno)?;
    conn.execute("DELETE FROM employees WHERE empno = ?1", params![empno.0])?;
    Ok(existing)
}

impl EmployeeDao for SqliteDao {
    fn add_employee(&mut self, employee: &Employee) -> Result<()> {
        employee.validate()?;
        insert_employee(self.conn()?, employee)?;
        info!(
            empno = employee.empno.0,
            depno = ?employee.depno.map(|depno| depno.0),
            "employee added"
        );
        Ok(())
    }

    fn delete_employee(&mut self, empno: EmployeeId) -> Result<Employee> {
        validate_key(Entity::Employee, empno.0)?;
        let deleted = delete_employee_row(self.conn()?, empno)?;
        info!(empno = empno.0, "employee deleted");
        Ok(deleted)
    }

    fn update_employee(&mut self, employee: &Employee) -> Result<()> {
        employee.validate()?;
        update_employee_row(self.conn()?, employee)?;
        info!(empno = employee.empno.0, "employee updated");
        Ok(())
    }

    fn find_employee_by_id(&mut self, empno: EmployeeId) -> Result<Employee> {
        validate_key(Entity::Employee, empno.0)?;
        let result = fetch_employee(self.conn()?, empno);
        if result.is_err() {
            debug!(empno = empno.0, "employee lookup missed");
        }
        result
    }

    fn find_all_employees(&mut self) -> Result<Vec<Employee>> {
        let employees = fetch_employees(self.conn()?)?;
        debug!(count = employees.len(), "loaded employees");
        Ok(employees)
    }

    fn find_employees_by_dept(&mut self, depno: DepartmentId) -> Result<Vec<Employee>> {
        validate_key(Entity::Department, depno.0)?;
        let employees = fetch_employees_for_department(self.conn()?, depno)?;
        debug!(depno = depno.0, count = employees.len(), "loaded department employees");
        Ok(employees)
    }
}
