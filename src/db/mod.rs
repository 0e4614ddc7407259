//! Persistence layer split across logical submodules. The traits here are the
//! contract the driver codes against; `SqliteDao` is the one adapter, backed
//! by an embedded SQLite file.

mod connection;
mod departments;
mod employees;

pub use connection::SqliteDao;

use crate::error::Result;
use crate::models::{Department, DepartmentId, Employee, EmployeeId};

/// Department half of the data-access contract.
///
/// Operations take `&mut self` because an adapter may have to open its store
/// lazily on first use.
pub trait DepartmentDao {
    /// Insert a new department. Duplicate keys are rejected by the store.
    fn add_department(&mut self, department: &Department) -> Result<()>;

    /// Remove the department with `depno` and hand back what was stored.
    /// Employees referencing it are left untouched.
    fn delete_department(&mut self, depno: DepartmentId) -> Result<Department>;

    /// Replace the stored department whose key matches `department.depno`.
    fn update_department(&mut self, department: &Department) -> Result<()>;

    fn find_department_by_id(&mut self, depno: DepartmentId) -> Result<Department>;

    fn find_all_departments(&mut self) -> Result<Vec<Department>>;
}

/// Employee half of the data-access contract.
pub trait EmployeeDao {
    /// Insert a new employee. A dangling `depno` is accepted.
    fn add_employee(&mut self, employee: &Employee) -> Result<()>;

    fn delete_employee(&mut self, empno: EmployeeId) -> Result<Employee>;

    /// Replace the stored employee whose key matches `employee.empno`.
    fn update_employee(&mut self, employee: &Employee) -> Result<()>;

    fn find_employee_by_id(&mut self, empno: EmployeeId) -> Result<Employee>;

    fn find_all_employees(&mut self) -> Result<Vec<Employee>>;

    /// Every employee whose `depno` equals `depno`. Empty when nobody matches,
    /// including when the department itself does not exist.
    fn find_employees_by_dept(&mut self, depno: DepartmentId) -> Result<Vec<Employee>>;
}

/// Lifecycle of the file behind a DAO.
pub trait FileHandler {
    /// Whether the backing database file is present on disk.
    fn check_db_exists(&self) -> bool;

    /// Release the store handle. Later operations fail with a connection
    /// error until the store is opened again.
    fn close_connection(&mut self) -> Result<()>;
}

/// Everything the driver needs from a store.
pub trait CompanyDao: DepartmentDao + EmployeeDao + FileHandler {}

impl<T> CompanyDao for T where T: DepartmentDao + EmployeeDao + FileHandler {}
