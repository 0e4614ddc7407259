use company_manager::{
    DaoError, Department, DepartmentDao, DepartmentId, Employee, EmployeeDao, EmployeeId, Entity,
    FileHandler, SqliteDao,
};
use tempfile::TempDir;

fn open_temp_dao() -> (SqliteDao, TempDir) {
    let dir = TempDir::new().unwrap();
    let dao = SqliteDao::new(dir.path().join("company.sqlite"));
    (dao, dir)
}

fn sales() -> Department {
    Department::new(1, "Sales", "Madrid")
}

fn ana() -> Employee {
    Employee::new(100, "Ana", "Clerk", Some(DepartmentId(1)))
}

#[test]
fn added_department_is_found_unchanged() {
    let (mut dao, _dir) = open_temp_dao();
    dao.add_department(&sales()).unwrap();

    assert_eq!(dao.find_department_by_id(DepartmentId(1)).unwrap(), sales());
}

#[test]
fn deleted_department_is_not_found() {
    let (mut dao, _dir) = open_temp_dao();
    dao.add_department(&sales()).unwrap();

    let deleted = dao.delete_department(DepartmentId(1)).unwrap();
    assert_eq!(deleted, sales());

    match dao.find_department_by_id(DepartmentId(1)) {
        Err(DaoError::NotFound {
            entity: Entity::Department,
            key: 1,
        }) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn update_replaces_the_whole_record() {
    let (mut dao, _dir) = open_temp_dao();
    dao.add_department(&sales()).unwrap();

    let moved = Department::new(1, "Sales & Marketing", "Barcelona");
    dao.update_department(&moved).unwrap();

    assert_eq!(dao.find_department_by_id(DepartmentId(1)).unwrap(), moved);
}

#[test]
fn update_and_delete_of_missing_keys_report_not_found() {
    let (mut dao, _dir) = open_temp_dao();

    assert!(dao
        .update_department(&Department::new(5, "Ghost", "Nowhere"))
        .unwrap_err()
        .is_not_found());
    assert!(dao
        .delete_department(DepartmentId(5))
        .unwrap_err()
        .is_not_found());
    assert!(dao
        .update_employee(&Employee::new(5, "Ghost", "None", None))
        .unwrap_err()
        .is_not_found());
    assert!(dao.delete_employee(EmployeeId(5)).unwrap_err().is_not_found());
    assert!(dao.find_employee_by_id(EmployeeId(5)).unwrap_err().is_not_found());
}

#[test]
fn find_all_tracks_adds_minus_deletes() {
    let (mut dao, _dir) = open_temp_dao();
    for depno in 1..=5 {
        dao.add_department(&Department::new(depno, "Dept", "City")).unwrap();
    }
    dao.delete_department(DepartmentId(2)).unwrap();
    dao.delete_department(DepartmentId(4)).unwrap();

    let departments = dao.find_all_departments().unwrap();
    assert_eq!(departments.len(), 3);
    let keys: Vec<i64> = departments.iter().map(|d| d.depno.0).collect();
    assert_eq!(keys, vec![1, 3, 5]);
}

#[test]
fn employees_by_department_match_exactly() {
    let (mut dao, _dir) = open_temp_dao();
    dao.add_department(&sales()).unwrap();
    dao.add_department(&Department::new(2, "Ops", "Sevilla")).unwrap();

    let staff = [
        Employee::new(1, "Ana", "Clerk", Some(DepartmentId(1))),
        Employee::new(2, "Bea", "Driver", Some(DepartmentId(2))),
        Employee::new(3, "Cris", "Chef", Some(DepartmentId(1))),
        Employee::new(4, "Dani", "Intern", None),
    ];
    for employee in &staff {
        dao.add_employee(employee).unwrap();
    }

    let sales_staff = dao.find_employees_by_dept(DepartmentId(1)).unwrap();
    assert_eq!(sales_staff, vec![staff[0].clone(), staff[2].clone()]);

    assert!(dao
        .find_employees_by_dept(DepartmentId(3))
        .unwrap()
        .is_empty());
    assert_eq!(dao.find_all_employees().unwrap().len(), 4);
}

#[test]
fn deleting_a_department_does_not_cascade() {
    let (mut dao, _dir) = open_temp_dao();
    dao.add_department(&sales()).unwrap();
    dao.add_employee(&ana()).unwrap();

    assert_eq!(
        dao.find_employees_by_dept(DepartmentId(1)).unwrap(),
        vec![ana()]
    );

    dao.delete_department(DepartmentId(1)).unwrap();

    assert!(dao
        .find_department_by_id(DepartmentId(1))
        .unwrap_err()
        .is_not_found());
    assert_eq!(dao.find_employee_by_id(EmployeeId(100)).unwrap(), ana());
    assert_eq!(
        dao.find_employees_by_dept(DepartmentId(1)).unwrap(),
        vec![ana()]
    );
}

#[test]
fn dangling_department_reference_is_accepted() {
    let mut dao = SqliteDao::in_memory();
    let orphan = Employee::new(7, "Eva", "Analyst", Some(DepartmentId(99)));
    dao.add_employee(&orphan).unwrap();

    assert_eq!(dao.find_employee_by_id(EmployeeId(7)).unwrap(), orphan);
}

#[test]
fn employee_update_can_unassign_department() {
    let mut dao = SqliteDao::in_memory();
    dao.add_employee(&ana()).unwrap();

    let unassigned = Employee::new(100, "Ana", "Senior Clerk", None);
    dao.update_employee(&unassigned).unwrap();

    assert_eq!(dao.find_employee_by_id(EmployeeId(100)).unwrap(), unassigned);
    assert!(dao
        .find_employees_by_dept(DepartmentId(1))
        .unwrap()
        .is_empty());
}

#[test]
fn duplicate_keys_are_validation_errors() {
    let mut dao = SqliteDao::in_memory();
    dao.add_department(&sales()).unwrap();
    dao.add_employee(&ana()).unwrap();

    match dao.add_department(&Department::new(1, "Other", "Lugo")) {
        Err(DaoError::Validation(message)) => {
            assert_eq!(message, "department 1 already exists.")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(matches!(
        dao.add_employee(&Employee::new(100, "Leo", "Clerk", None)),
        Err(DaoError::Validation(_))
    ));
    assert_eq!(dao.find_department_by_id(DepartmentId(1)).unwrap(), sales());
}

#[test]
fn malformed_records_are_rejected_before_the_store() {
    let mut dao = SqliteDao::in_memory();

    assert!(matches!(
        dao.add_department(&Department::new(-1, "Sales", "Madrid")),
        Err(DaoError::Validation(_))
    ));
    assert!(matches!(
        dao.add_department(&Department::new(1, "   ", "Madrid")),
        Err(DaoError::Validation(_))
    ));
    assert!(matches!(
        dao.add_employee(&Employee::new(1, "Ana", "", None)),
        Err(DaoError::Validation(_))
    ));
    match dao.add_employee(&Employee::new(2, "Leo", "Clerk", Some(DepartmentId(-1)))) {
        Err(DaoError::Validation(message)) => {
            assert_eq!(message, "Invalid department number -1: must not be negative.")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(matches!(
        dao.find_employees_by_dept(DepartmentId(-3)),
        Err(DaoError::Validation(_))
    ));
    assert!(dao.find_all_departments().unwrap().is_empty());
    assert!(dao.find_all_employees().unwrap().is_empty());
}

#[test]
fn operations_after_close_are_connection_errors() {
    let (mut dao, _dir) = open_temp_dao();
    dao.add_department(&sales()).unwrap();
    dao.close_connection().unwrap();
    assert!(!dao.is_open());

    assert!(matches!(
        dao.find_all_departments(),
        Err(DaoError::Connection(_))
    ));
    assert!(matches!(
        dao.add_employee(&ana()),
        Err(DaoError::Connection(_))
    ));

    // closing twice is harmless
    dao.close_connection().unwrap();

    dao.open().unwrap();
    assert_eq!(dao.find_all_departments().unwrap(), vec![sales()]);
}

#[test]
fn first_operation_opens_lazily_and_creates_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("company.sqlite");
    let mut dao = SqliteDao::new(&path);

    assert!(!dao.check_db_exists());
    assert!(!dao.is_open());

    assert!(dao.find_all_employees().unwrap().is_empty());
    assert!(dao.is_open());
    assert!(dao.check_db_exists());
    assert_eq!(dao.path(), Some(path.as_path()));
}

#[test]
fn data_survives_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("company.sqlite");

    {
        let mut dao = SqliteDao::new(&path);
        dao.add_department(&sales()).unwrap();
        dao.add_employee(&ana()).unwrap();
        dao.close_connection().unwrap();
    }

    let mut reopened = SqliteDao::new(&path);
    assert_eq!(reopened.find_all_departments().unwrap(), vec![sales()]);
    assert_eq!(reopened.find_all_employees().unwrap(), vec![ana()]);
}

#[test]
fn unreachable_store_is_a_connection_error() {
    let dir = TempDir::new().unwrap();
    // a directory where the database file should be
    let mut dao = SqliteDao::new(dir.path());

    assert!(matches!(
        dao.find_all_departments(),
        Err(DaoError::Connection(_))
    ));
}

#[test]
fn company_scenario() {
    let mut dao = SqliteDao::in_memory();
    dao.add_department(&Department::new(1, "Sales", "Madrid")).unwrap();
    dao.add_employee(&Employee::new(100, "Ana", "Clerk", Some(DepartmentId(1)))).unwrap();

    assert_eq!(
        dao.find_employees_by_dept(DepartmentId(1)).unwrap(),
        vec![Employee::new(100, "Ana", "Clerk", Some(DepartmentId(1)))]
    );

    dao.delete_department(DepartmentId(1)).unwrap();
    assert!(dao
        .find_department_by_id(DepartmentId(1))
        .unwrap_err()
        .is_not_found());
    assert!(dao.find_employee_by_id(EmployeeId(100)).is_ok());
}
