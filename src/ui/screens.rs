use crate::models::{Department, DepartmentId, Employee};

/// A list of records plus the highlighted row. Keeps the selection in bounds
/// whenever the backing rows change.
pub(crate) struct Selection<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

impl<T> Selection<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        let mut selection = Self { items, selected: 0 };
        selection.ensure_in_bounds();
        selection
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Highlight the first row matching `predicate`, returning whether one
    /// was found.
    pub(crate) fn select_where<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        match self.items.iter().position(predicate) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.ensure_in_bounds();
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.items.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.items.len() {
            self.selected = self.items.len() - 1;
        }
    }
}

/// Which employees the employee screen is showing.
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum EmployeeScope {
    All,
    /// Employees of one department. The department may have been deleted
    /// while its employees remain.
    Department(DepartmentId, Option<Department>),
}

pub(crate) struct EmployeeScreen {
    pub(crate) scope: EmployeeScope,
    pub(crate) list: Selection<Employee>,
}

impl EmployeeScreen {
    pub(crate) fn new(scope: EmployeeScope, employees: Vec<Employee>) -> Self {
        Self {
            scope,
            list: Selection::new(employees),
        }
    }

    /// Department pre-filled into new employees created from this screen.
    pub(crate) fn scope_department(&self) -> Option<DepartmentId> {
        match &self.scope {
            EmployeeScope::All => None,
            EmployeeScope::Department(depno, _) => Some(*depno),
        }
    }

    pub(crate) fn title(&self) -> String {
        match &self.scope {
            EmployeeScope::All => "All Employees".to_string(),
            EmployeeScope::Department(_, Some(department)) => {
                format!("Employees of {} ({})", department.name, department.depno)
            }
            EmployeeScope::Department(depno, None) => {
                format!("Employees of department {depno} (deleted)")
            }
        }
    }
}

/// Top-level navigation state.
pub(crate) enum Screen {
    Departments,
    Employees(EmployeeScreen),
}
