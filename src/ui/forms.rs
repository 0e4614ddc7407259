use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::Entity;
use crate::models::{Department, DepartmentId, Employee, EmployeeId};

/// Render a `Label: value` line, highlighting the focused field and greying
/// out placeholders. Locked fields are shown dimmed and never take focus.
fn field_line(
    field_name: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
    locked: bool,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if locked {
        Style::default().fg(Color::DarkGray)
    } else if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

fn parse_key(raw: &str, label: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("{label} is required."));
    }
    raw.parse::<i64>()
        .map_err(|_| anyhow!("{label} must be an integer."))
}

fn required_text(raw: &str, label: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        Err(anyhow!("{label} is required."))
    } else {
        Ok(value.to_string())
    }
}

/// Internal representation of the department form fields.
#[derive(Default, Clone)]
pub(crate) struct DepartmentForm {
    pub(crate) depno: String,
    pub(crate) name: String,
    pub(crate) location: String,
    pub(crate) active: DepartmentField,
    /// Set when editing: the key identifies the row being replaced.
    pub(crate) key_locked: bool,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum DepartmentField {
    #[default]
    Number,
    Name,
    Location,
}

impl DepartmentForm {
    /// Seed the form with the suggested next department number.
    pub(crate) fn with_number(number: i64) -> Self {
        let mut form = Self::default();
        if number > 0 {
            form.depno = number.to_string();
        }
        form
    }

    /// Populate the form from an existing department when editing.
    pub(crate) fn from_department(department: &Department) -> Self {
        Self {
            depno: department.depno.to_string(),
            name: department.name.clone(),
            location: department.location.clone(),
            active: DepartmentField::Name,
            key_locked: true,
            error: None,
        }
    }

    /// Cycle focus, skipping the key when it is locked.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            DepartmentField::Number => DepartmentField::Name,
            DepartmentField::Name => DepartmentField::Location,
            DepartmentField::Location if self.key_locked => DepartmentField::Name,
            DepartmentField::Location => DepartmentField::Number,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            DepartmentField::Number => {
                if !self.key_locked && ch.is_ascii_digit() {
                    self.depno.push(ch);
                    true
                } else {
                    false
                }
            }
            DepartmentField::Name if !ch.is_control() => {
                self.name.push(ch);
                true
            }
            DepartmentField::Location if !ch.is_control() => {
                self.location.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            DepartmentField::Number => {
                if !self.key_locked {
                    self.depno.pop();
                }
            }
            DepartmentField::Name => {
                self.name.pop();
            }
            DepartmentField::Location => {
                self.location.pop();
            }
        }
    }

    /// Validate the inputs and build the department ready for persistence.
    pub(crate) fn parse_inputs(&self) -> Result<Department> {
        let depno = parse_key(&self.depno, "Department number")?;
        let name = required_text(&self.name, "Department name")?;
        let location = required_text(&self.location, "Location")?;
        Ok(Department {
            depno: DepartmentId(depno),
            name,
            location,
        })
    }

    pub(crate) fn build_line(&self, field: DepartmentField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            DepartmentField::Number => field_line(
                "Number",
                &self.depno,
                "<required>",
                is_active,
                self.key_locked,
            ),
            DepartmentField::Name => field_line("Name", &self.name, "<required>", is_active, false),
            DepartmentField::Location => {
                field_line("Location", &self.location, "<required>", is_active, false)
            }
        }
    }

    /// Cursor column offset and row for the active field.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        match self.active {
            DepartmentField::Number => (
                ("Number: ".len() + self.depno.chars().count()) as u16,
                0,
            ),
            DepartmentField::Name => (("Name: ".len() + self.name.chars().count()) as u16, 1),
            DepartmentField::Location => (
                ("Location: ".len() + self.location.chars().count()) as u16,
                2,
            ),
        }
    }
}

/// Form state for employee creation and editing.
#[derive(Default, Clone)]
pub(crate) struct EmployeeForm {
    pub(crate) empno: String,
    pub(crate) name: String,
    pub(crate) position: String,
    pub(crate) depno: String,
    pub(crate) active: EmployeeField,
    pub(crate) key_locked: bool,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum EmployeeField {
    #[default]
    Number,
    Name,
    Position,
    Department,
}

impl EmployeeForm {
    /// Blank form, optionally pre-assigned to a department.
    pub(crate) fn new(number: i64, depno: Option<DepartmentId>) -> Self {
        let mut form = Self::default();
        if number > 0 {
            form.empno = number.to_string();
        }
        if let Some(depno) = depno {
            form.depno = depno.to_string();
        }
        form
    }

    pub(crate) fn from_employee(employee: &Employee) -> Self {
        Self {
            empno: employee.empno.to_string(),
            name: employee.name.clone(),
            position: employee.position.clone(),
            depno: employee
                .depno
                .map(|depno| depno.to_string())
                .unwrap_or_default(),
            active: EmployeeField::Name,
            key_locked: true,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            EmployeeField::Number => EmployeeField::Name,
            EmployeeField::Name => EmployeeField::Position,
            EmployeeField::Position => EmployeeField::Department,
            EmployeeField::Department if self.key_locked => EmployeeField::Name,
            EmployeeField::Department => EmployeeField::Number,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            EmployeeField::Number if !self.key_locked && ch.is_ascii_digit() => {
                self.empno.push(ch);
                true
            }
            EmployeeField::Department if ch.is_ascii_digit() => {
                self.depno.push(ch);
                true
            }
            EmployeeField::Name if !ch.is_control() => {
                self.name.push(ch);
                true
            }
            EmployeeField::Position if !ch.is_control() => {
                self.position.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            EmployeeField::Number => {
                if !self.key_locked {
                    self.empno.pop();
                }
            }
            EmployeeField::Name => {
                self.name.pop();
            }
            EmployeeField::Position => {
                self.position.pop();
            }
            EmployeeField::Department => {
                self.depno.pop();
            }
        }
    }

    /// Validate inputs. A blank department leaves the employee unassigned.
    pub(crate) fn parse_inputs(&self) -> Result<Employee> {
        let empno = parse_key(&self.empno, "Employee number")?;
        let name = required_text(&self.name, "Employee name")?;
        let position = required_text(&self.position, "Position")?;
        let depno = if self.depno.trim().is_empty() {
            None
        } else {
            Some(DepartmentId(parse_key(&self.depno, "Department number")?))
        };
        Ok(Employee {
            empno: EmployeeId(empno),
            name,
            position,
            depno,
        })
    }

    pub(crate) fn build_line(&self, field: EmployeeField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            EmployeeField::Number => field_line(
                "Number",
                &self.empno,
                "<required>",
                is_active,
                self.key_locked,
            ),
            EmployeeField::Name => field_line("Name", &self.name, "<required>", is_active, false),
            EmployeeField::Position => {
                field_line("Position", &self.position, "<required>", is_active, false)
            }
            EmployeeField::Department => {
                field_line("Department", &self.depno, "<none>", is_active, false)
            }
        }
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        match self.active {
            EmployeeField::Number => (
                ("Number: ".len() + self.empno.chars().count()) as u16,
                0,
            ),
            EmployeeField::Name => (("Name: ".len() + self.name.chars().count()) as u16, 1),
            EmployeeField::Position => (
                ("Position: ".len() + self.position.chars().count()) as u16,
                2,
            ),
            EmployeeField::Department => (
                ("Department: ".len() + self.depno.chars().count()) as u16,
                3,
            ),
        }
    }
}

/// What a pending Y/N dialog is about to delete.
#[derive(Clone)]
pub(crate) enum ConfirmDelete {
    Department(Department),
    Employee(Employee),
}

/// Inline "find by number" prompt.
#[derive(Clone)]
pub(crate) struct FindState {
    pub(crate) target: Entity,
    pub(crate) query: String,
}

impl FindState {
    pub(crate) fn new(target: Entity) -> Self {
        Self {
            target,
            query: String::new(),
        }
    }

    /// Only digits are accepted, matching what a key can hold.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            self.query.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_key(&self) -> Result<i64> {
        let label = match self.target {
            Entity::Department => "Department number",
            Entity::Employee => "Employee number",
        };
        parse_key(&self.query, label)
    }

    pub(crate) fn prompt(&self) -> &'static str {
        match self.target {
            Entity::Department => "Find department: ",
            Entity::Employee => "Find employee: ",
        }
    }
}
