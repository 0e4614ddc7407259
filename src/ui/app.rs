use std::mem;

use anyhow::{anyhow, Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::db::CompanyDao;
use crate::error::{DaoError, Entity};
use crate::models::{Department, DepartmentId, EmployeeId};

use super::forms::{
    ConfirmDelete, DepartmentField, DepartmentForm, EmployeeField, EmployeeForm, FindState,
};
use super::helpers::{
    centered_rect, department_header, department_row, employee_header, employee_row, key_hints,
    surface_error,
};
use super::screens::{EmployeeScope, EmployeeScreen, Screen, Selection};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab strip at the top of the window.
const TABS_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered on top of the current screen.
enum Mode {
    Normal,
    AddingDepartment(DepartmentForm),
    EditingDepartment(DepartmentForm),
    AddingEmployee(EmployeeForm),
    EditingEmployee(EmployeeForm),
    ConfirmDelete(ConfirmDelete),
    Finding(FindState),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. The app owns the DAO for the whole session and
/// every user action goes through its contract.
pub struct App<D: CompanyDao> {
    dao: D,
    departments: Selection<Department>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<D: CompanyDao> App<D> {
    /// Build the app and load the department list.
    pub fn new(mut dao: D) -> Result<Self> {
        let departments = dao
            .find_all_departments()
            .context("failed to load departments")?;
        Ok(Self {
            dao,
            departments: Selection::new(departments),
            screen: Screen::Departments,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Release the store handle. Called once when the event loop ends.
    pub fn close(&mut self) -> Result<()> {
        self.dao
            .close_connection()
            .context("failed to close database connection")
    }

    /// Feed one key press through the state machine. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingDepartment(form) => self.handle_department_form(code, form, false),
            Mode::EditingDepartment(form) => self.handle_department_form(code, form, true),
            Mode::AddingEmployee(form) => self.handle_employee_form(code, form, false),
            Mode::EditingEmployee(form) => self.handle_employee_form(code, form, true),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Finding(state) => self.handle_find(code, state),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => match self.screen {
                Screen::Departments => *exit = true,
                Screen::Employees(_) => {
                    self.clear_status();
                    self.screen = Screen::Departments;
                }
            },
            KeyCode::Tab | KeyCode::BackTab => {
                self.clear_status();
                match self.screen {
                    Screen::Departments => {
                        let result = self.open_all_employees();
                        self.report(result);
                    }
                    Screen::Employees(_) => self.screen = Screen::Departments,
                }
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.select_edge(true),
            KeyCode::End => self.select_edge(false),
            KeyCode::Enter => {
                if let Screen::Departments = self.screen {
                    match self.departments.current().cloned() {
                        Some(department) => {
                            self.clear_status();
                            let result = self.open_department_employees(department);
                            self.report(result);
                        }
                        None => self.set_status("No department selected.", StatusKind::Error),
                    }
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                let result = self.reload(None, None);
                self.report(result);
                if self.status.is_none() {
                    self.set_status("Reloaded.", StatusKind::Info);
                }
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                let target = match self.screen {
                    Screen::Departments => Entity::Department,
                    Screen::Employees(_) => Entity::Employee,
                };
                return Mode::Finding(FindState::new(target));
            }
            KeyCode::Char('+') => {
                self.clear_status();
                let scope = match &self.screen {
                    Screen::Departments => None,
                    Screen::Employees(screen) => Some(screen.scope_department()),
                };
                return match scope {
                    None => {
                        let number = self.next_department_number();
                        Mode::AddingDepartment(DepartmentForm::with_number(number))
                    }
                    Some(depno) => {
                        let number = self.next_employee_number();
                        Mode::AddingEmployee(EmployeeForm::new(number, depno))
                    }
                };
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                let form = match &self.screen {
                    Screen::Departments => self.departments.current().map(|department| {
                        Mode::EditingDepartment(DepartmentForm::from_department(department))
                    }),
                    Screen::Employees(screen) => screen.list.current().map(|employee| {
                        Mode::EditingEmployee(EmployeeForm::from_employee(employee))
                    }),
                };
                match form {
                    Some(mode) => {
                        self.clear_status();
                        return mode;
                    }
                    None => self.set_status("Nothing selected to edit.", StatusKind::Error),
                }
            }
            KeyCode::Char('-') => {
                let confirm = match &self.screen {
                    Screen::Departments => self
                        .departments
                        .current()
                        .cloned()
                        .map(ConfirmDelete::Department),
                    Screen::Employees(screen) => {
                        screen.list.current().cloned().map(ConfirmDelete::Employee)
                    }
                };
                match confirm {
                    Some(confirm) => {
                        self.clear_status();
                        return Mode::ConfirmDelete(confirm);
                    }
                    None => self.set_status("Nothing selected to delete.", StatusKind::Error),
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_department_form(
        &mut self,
        code: KeyCode,
        mut form: DepartmentForm,
        editing: bool,
    ) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if editing {
                    "Edit cancelled."
                } else {
                    "Add department cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.next_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let result = if editing {
                    self.save_existing_department(&form)
                } else {
                    self.save_new_department(&form)
                };
                match result {
                    Ok(()) => keep_open = false,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        match (keep_open, editing) {
            (false, _) => Mode::Normal,
            (true, true) => Mode::EditingDepartment(form),
            (true, false) => Mode::AddingDepartment(form),
        }
    }

    fn handle_employee_form(
        &mut self,
        code: KeyCode,
        mut form: EmployeeForm,
        editing: bool,
    ) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if editing {
                    "Edit cancelled."
                } else {
                    "Add employee cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.next_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let result = if editing {
                    self.save_existing_employee(&form)
                } else {
                    self.save_new_employee(&form)
                };
                match result {
                    Ok(()) => keep_open = false,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        match (keep_open, editing) {
            (false, _) => Mode::Normal,
            (true, true) => Mode::EditingEmployee(form),
            (true, false) => Mode::AddingEmployee(form),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self.perform_delete(&confirm);
                self.report(result);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_find(&mut self, code: KeyCode, mut state: FindState) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Enter => {
                let result = self.find(&state);
                self.report(result);
                return Mode::Normal;
            }
            KeyCode::Char(ch) => {
                state.push_char(ch);
            }
            _ => {}
        }
        Mode::Finding(state)
    }

    fn find(&mut self, state: &FindState) -> Result<()> {
        let key = state.parse_key()?;
        match state.target {
            Entity::Department => {
                let department = self.dao.find_department_by_id(DepartmentId(key))?;
                self.screen = Screen::Departments;
                self.reload_departments(Some(department.depno))?;
                self.set_status(format!("Found department {department}."), StatusKind::Info);
            }
            Entity::Employee => {
                let employee = self.dao.find_employee_by_id(EmployeeId(key))?;
                let in_view = match &mut self.screen {
                    Screen::Employees(screen) => {
                        screen.list.select_where(|candidate| candidate.empno == employee.empno)
                    }
                    Screen::Departments => false,
                };
                if !in_view {
                    self.open_all_employees()?;
                    if let Screen::Employees(screen) = &mut self.screen {
                        screen.list.select_where(|candidate| candidate.empno == employee.empno);
                    }
                }
                self.set_status(format!("Found employee {employee}."), StatusKind::Info);
            }
        }
        Ok(())
    }

    fn save_new_department(&mut self, form: &DepartmentForm) -> Result<()> {
        let department = form.parse_inputs()?;
        self.dao.add_department(&department)?;
        self.reload_departments(Some(department.depno))?;
        self.set_status(
            format!("Added department {}.", department.depno),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_existing_department(&mut self, form: &DepartmentForm) -> Result<()> {
        let department = form.parse_inputs()?;
        self.dao.update_department(&department)?;
        self.reload(Some(department.depno), None)?;
        self.set_status(
            format!("Updated department {}.", department.depno),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Insert an employee after the same checks the interactive menu always
    /// made: the number must be free and a given department must exist. The
    /// DAO itself accepts dangling department numbers.
    fn save_new_employee(&mut self, form: &EmployeeForm) -> Result<()> {
        let employee = form.parse_inputs()?;
        match self.dao.find_employee_by_id(employee.empno) {
            Ok(_) => {
                return Err(anyhow!(
                    "There is already an employee with number {}.",
                    employee.empno
                ))
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }
        self.ensure_department_exists(employee.depno)?;

        self.dao.add_employee(&employee)?;
        self.reload_employees(Some(employee.empno))?;
        self.set_status(
            format!("Added employee {}.", employee.empno),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Only a changed department is checked, so employees left behind by a
    /// deleted department stay editable.
    fn save_existing_employee(&mut self, form: &EmployeeForm) -> Result<()> {
        let employee = form.parse_inputs()?;
        let stored = self.dao.find_employee_by_id(employee.empno)?;
        if stored.depno != employee.depno {
            self.ensure_department_exists(employee.depno)?;
        }
        self.dao.update_employee(&employee)?;
        self.reload_employees(Some(employee.empno))?;
        self.set_status(
            format!("Updated employee {}.", employee.empno),
            StatusKind::Info,
        );
        Ok(())
    }

    fn ensure_department_exists(&mut self, depno: Option<DepartmentId>) -> Result<()> {
        let Some(depno) = depno else {
            return Ok(());
        };
        match self.dao.find_department_by_id(depno) {
            Ok(_) => Ok(()),
            Err(DaoError::NotFound { .. }) => {
                Err(anyhow!("There is no department with number {depno}."))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> Result<()> {
        match confirm {
            ConfirmDelete::Department(department) => {
                let deleted = self.dao.delete_department(department.depno)?;
                self.reload(None, None)?;
                self.set_status(
                    format!("Deleted department {}.", deleted.depno),
                    StatusKind::Info,
                );
            }
            ConfirmDelete::Employee(employee) => {
                let deleted = self.dao.delete_employee(employee.empno)?;
                self.reload_employees(None)?;
                self.set_status(
                    format!("Deleted employee {}.", deleted.empno),
                    StatusKind::Info,
                );
            }
        }
        Ok(())
    }

    fn open_all_employees(&mut self) -> Result<()> {
        let employees = self
            .dao
            .find_all_employees()
            .context("failed to load employees")?;
        self.screen = Screen::Employees(EmployeeScreen::new(EmployeeScope::All, employees));
        Ok(())
    }

    fn open_department_employees(&mut self, department: Department) -> Result<()> {
        let employees = self
            .dao
            .find_employees_by_dept(department.depno)
            .context("failed to load department employees")?;
        let scope = EmployeeScope::Department(department.depno, Some(department));
        self.screen = Screen::Employees(EmployeeScreen::new(scope, employees));
        Ok(())
    }

    fn reload(
        &mut self,
        department: Option<DepartmentId>,
        employee: Option<EmployeeId>,
    ) -> Result<()> {
        self.reload_departments(department)?;
        self.reload_employees(employee)
    }

    fn reload_departments(&mut self, focus: Option<DepartmentId>) -> Result<()> {
        let departments = self
            .dao
            .find_all_departments()
            .context("failed to load departments")?;
        self.departments.set_items(departments);
        if let Some(depno) = focus {
            self.departments.select_where(|department| department.depno == depno);
        }
        Ok(())
    }

    /// Refresh the employee screen, if it is showing, keeping its scope. A
    /// scoped department that disappeared stays listed by number.
    fn reload_employees(&mut self, focus: Option<EmployeeId>) -> Result<()> {
        let scope = match &self.screen {
            Screen::Employees(screen) => screen.scope.clone(),
            Screen::Departments => return Ok(()),
        };

        let (scope, employees) = match scope {
            EmployeeScope::All => (
                EmployeeScope::All,
                self.dao
                    .find_all_employees()
                    .context("failed to load employees")?,
            ),
            EmployeeScope::Department(depno, _) => {
                let department = match self.dao.find_department_by_id(depno) {
                    Ok(department) => Some(department),
                    Err(err) if err.is_not_found() => None,
                    Err(err) => return Err(err.into()),
                };
                let employees = self
                    .dao
                    .find_employees_by_dept(depno)
                    .context("failed to load department employees")?;
                (EmployeeScope::Department(depno, department), employees)
            }
        };

        if let Screen::Employees(screen) = &mut self.screen {
            screen.scope = scope;
            screen.list.set_items(employees);
            if let Some(empno) = focus {
                screen.list.select_where(|employee| employee.empno == empno);
            }
        }
        Ok(())
    }

    fn next_department_number(&self) -> i64 {
        self.departments
            .items
            .iter()
            .map(|department| department.depno.0)
            .max()
            .map_or(1, |highest| highest.checked_add(1).unwrap_or(0))
    }

    /// Suggest one past the highest employee number, or leave the field blank
    /// when the store cannot be read.
    fn next_employee_number(&mut self) -> i64 {
        match self.dao.find_all_employees() {
            Ok(employees) => employees
                .iter()
                .map(|employee| employee.empno.0)
                .max()
                .map_or(1, |highest| highest.checked_add(1).unwrap_or(0)),
            Err(err) => {
                warn!(error = %err, "could not suggest an employee number");
                0
            }
        }
    }

    fn move_selection(&mut self, offset: isize) {
        match &mut self.screen {
            Screen::Departments => self.departments.move_selection(offset),
            Screen::Employees(screen) => screen.list.move_selection(offset),
        }
    }

    fn select_edge(&mut self, first: bool) {
        match (&mut self.screen, first) {
            (Screen::Departments, true) => self.departments.select_first(),
            (Screen::Departments, false) => self.departments.select_last(),
            (Screen::Employees(screen), true) => screen.list.select_first(),
            (Screen::Employees(screen), false) => screen.list.select_last(),
        }
    }

    /// Turn a failed action into a red status line.
    fn report(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.log_failure(&err);
            self.set_status(surface_error(&err), StatusKind::Error);
        }
    }

    fn log_failure(&self, err: &anyhow::Error) {
        match err.downcast_ref::<DaoError>() {
            Some(DaoError::NotFound { .. }) | Some(DaoError::Validation(_)) => {
                info!(error = %format!("{err:#}"), "operation rejected")
            }
            _ => warn!(error = %format!("{err:#}"), "operation failed"),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TABS_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match &self.screen {
            Screen::Departments => self.draw_departments(frame, chunks[1]),
            Screen::Employees(screen) => self.draw_employees(frame, chunks[1], screen),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingDepartment(form) => {
                self.draw_department_form(frame, area, "Add Department", form)
            }
            Mode::EditingDepartment(form) => {
                self.draw_department_form(frame, area, "Edit Department", form)
            }
            Mode::AddingEmployee(form) => self.draw_employee_form(frame, area, "Add Employee", form),
            Mode::EditingEmployee(form) => {
                self.draw_employee_form(frame, area, "Edit Employee", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Finding(state) => self.draw_find_bar(frame, chunks[0], state),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let active = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let inactive = Style::default().fg(Color::Gray);
        let (departments_style, employees_style) = match self.screen {
            Screen::Departments => (active, inactive),
            Screen::Employees(_) => (inactive, active),
        };

        let tabs = Paragraph::new(Line::from(vec![
            Span::styled(" Departments ", departments_style),
            Span::raw("|"),
            Span::styled(" Employees ", employees_style),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Company Manager"));
        frame.render_widget(tabs, area);
    }

    fn draw_departments(&self, frame: &mut Frame, area: Rect) {
        let title = format!("Departments ({})", self.departments.items.len());
        let rows = self.departments.items.iter().map(department_row).collect();
        self.draw_table(
            frame,
            area,
            &title,
            department_header(),
            rows,
            self.departments.selected,
            "No departments yet. Press '+' to add one.",
        );
    }

    fn draw_employees(&self, frame: &mut Frame, area: Rect, screen: &EmployeeScreen) {
        let title = format!("{} ({})", screen.title(), screen.list.items.len());
        let rows = screen.list.items.iter().map(employee_row).collect();
        self.draw_table(
            frame,
            area,
            &title,
            employee_header(),
            rows,
            screen.list.selected,
            "No employees here. Press '+' to add one.",
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_table(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        header: String,
        rows: Vec<String>,
        selected: usize,
        empty_message: &str,
    ) {
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        if rows.is_empty() {
            let message = Paragraph::new(empty_message.to_string())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, inner);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let header = Paragraph::new(Span::styled(
            format!("  {header}"),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(selected));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::Finding(_)) => key_hints(&[
                ("[0-9]", "Number"),
                ("[Enter]", "Find"),
                ("[Esc]", "Cancel"),
            ]),
            (_, Mode::ConfirmDelete(_)) => key_hints(&[("[Y]", "Delete"), ("[N/Esc]", "Keep")]),
            (_, Mode::AddingDepartment(_))
            | (_, Mode::EditingDepartment(_))
            | (_, Mode::AddingEmployee(_))
            | (_, Mode::EditingEmployee(_)) => {
                key_hints(&[("[Tab]", "Next Field"), ("[Enter]", "Save"), ("[Esc]", "Cancel")])
            }
            (Screen::Departments, Mode::Normal) => key_hints(&[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Employees"),
                ("[Tab]", "All Employees"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[/]", "Find"),
                ("[r]", "Reload"),
                ("[q]", "Quit"),
            ]),
            (Screen::Employees(_), Mode::Normal) => key_hints(&[
                ("[↑↓]", "Navigate"),
                ("[Tab/Esc]", "Departments"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[/]", "Find"),
                ("[r]", "Reload"),
                ("[q]", "Quit"),
            ]),
        }
    }

    fn draw_form_popup(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        error: Option<&String>,
        cursor: (u16, u16),
    ) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        if let Some(error) = error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (column, row) = cursor;
        frame.set_cursor_position((inner.x + column, inner.y + row));
    }

    fn draw_department_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        form: &DepartmentForm,
    ) {
        let lines = vec![
            form.build_line(DepartmentField::Number),
            form.build_line(DepartmentField::Name),
            form.build_line(DepartmentField::Location),
        ];
        self.draw_form_popup(frame, area, title, lines, form.error.as_ref(), form.cursor());
    }

    fn draw_employee_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        form: &EmployeeForm,
    ) {
        let lines = vec![
            form.build_line(EmployeeField::Number),
            form.build_line(EmployeeField::Name),
            form.build_line(EmployeeField::Position),
            form.build_line(EmployeeField::Department),
        ];
        self.draw_form_popup(frame, area, title, lines, form.error.as_ref(), form.cursor());
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let (question, note) = match confirm {
            ConfirmDelete::Department(department) => (
                format!("Delete department {department}?"),
                "Its employees are kept and still point at this number.",
            ),
            ConfirmDelete::Employee(employee) => (
                format!("Delete employee {employee}?"),
                "This cannot be undone.",
            ),
        };

        let lines = vec![
            Line::from(question),
            Line::from(note),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_find_bar(&self, frame: &mut Frame, area: Rect, state: &FindState) {
        frame.render_widget(Clear, area);

        let block = Block::default().borders(Borders::ALL).title("Find");
        let prompt = state.prompt();
        let paragraph = Paragraph::new(Span::raw(format!("{prompt}{}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let inner = block.inner(area);
        let cursor_x = inner.x + prompt.len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DepartmentDao, EmployeeDao, SqliteDao};
    use crate::models::Employee;

    fn app_with(departments: &[Department], employees: &[Employee]) -> App<SqliteDao> {
        let mut dao = SqliteDao::in_memory();
        for department in departments {
            dao.add_department(department).unwrap();
        }
        for employee in employees {
            dao.add_employee(employee).unwrap();
        }
        App::new(dao).unwrap()
    }

    fn type_text<D: CompanyDao>(app: &mut App<D>, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn status(app: &App<SqliteDao>) -> (String, StatusKind) {
        let status = app.status.as_ref().expect("status set");
        (status.text.clone(), status.kind)
    }

    #[test]
    fn add_department_through_form() {
        let mut app = app_with(&[], &[]);
        app.handle_key(KeyCode::Char('+'));
        assert!(matches!(app.mode, Mode::AddingDepartment(_)));

        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Sales");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Madrid");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status(&app), ("Added department 1.".to_string(), StatusKind::Info));
        assert_eq!(
            app.dao.find_department_by_id(DepartmentId(1)).unwrap(),
            Department::new(1, "Sales", "Madrid")
        );
    }

    #[test]
    fn duplicate_department_keeps_form_open() {
        let mut app = app_with(&[Department::new(1, "Sales", "Madrid")], &[]);
        app.handle_key(KeyCode::Char('+'));
        if let Mode::AddingDepartment(form) = &mut app.mode {
            form.depno = "1".to_string();
            form.name = "Other".to_string();
            form.location = "Lugo".to_string();
        }
        app.handle_key(KeyCode::Enter);

        match &app.mode {
            Mode::AddingDepartment(form) => {
                assert_eq!(form.error.as_deref(), Some("department 1 already exists."))
            }
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn enter_opens_department_employees() {
        let mut app = app_with(
            &[
                Department::new(1, "Sales", "Madrid"),
                Department::new(2, "Ops", "Sevilla"),
            ],
            &[
                Employee::new(100, "Ana", "Clerk", Some(DepartmentId(1))),
                Employee::new(101, "Bea", "Driver", Some(DepartmentId(2))),
            ],
        );
        app.handle_key(KeyCode::Enter);

        match &app.screen {
            Screen::Employees(screen) => {
                assert_eq!(screen.list.items.len(), 1);
                assert_eq!(screen.list.items[0].empno, EmployeeId(100));
            }
            Screen::Departments => panic!("expected employee screen"),
        }

        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.screen, Screen::Departments));
    }

    #[test]
    fn adding_employee_requires_existing_department() {
        let mut app = app_with(&[Department::new(1, "Sales", "Madrid")], &[]);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('+'));
        if let Mode::AddingEmployee(form) = &mut app.mode {
            form.name = "Ana".to_string();
            form.position = "Clerk".to_string();
            form.depno = "9".to_string();
        }
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            status(&app),
            (
                "There is no department with number 9.".to_string(),
                StatusKind::Error
            )
        );
        assert!(app.dao.find_all_employees().unwrap().is_empty());
    }

    #[test]
    fn adding_employee_rejects_taken_number() {
        let mut app = app_with(&[], &[Employee::new(5, "Eva", "Analyst", None)]);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('+'));
        if let Mode::AddingEmployee(form) = &mut app.mode {
            form.empno = "5".to_string();
            form.name = "Leo".to_string();
            form.position = "Clerk".to_string();
        }
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            status(&app).0,
            "There is already an employee with number 5."
        );
    }

    #[test]
    fn delete_department_keeps_employees() {
        let mut app = app_with(
            &[Department::new(1, "Sales", "Madrid")],
            &[Employee::new(100, "Ana", "Clerk", Some(DepartmentId(1)))],
        );
        app.handle_key(KeyCode::Char('-'));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Char('y'));

        assert!(app.departments.items.is_empty());
        assert!(app.dao.find_employee_by_id(EmployeeId(100)).is_ok());
    }

    #[test]
    fn declining_delete_changes_nothing() {
        let mut app = app_with(&[Department::new(1, "Sales", "Madrid")], &[]);
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.departments.items.len(), 1);
        assert_eq!(status(&app).0, "Deletion cancelled.");
    }

    #[test]
    fn find_reports_missing_department() {
        let mut app = app_with(&[Department::new(1, "Sales", "Madrid")], &[]);
        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "42");
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            status(&app),
            ("department 42 not found".to_string(), StatusKind::Error)
        );
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn find_employee_jumps_to_row() {
        let mut app = app_with(
            &[],
            &[
                Employee::new(1, "Ana", "Clerk", None),
                Employee::new(2, "Bea", "Driver", None),
                Employee::new(3, "Cris", "Chef", None),
            ],
        );
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "3");
        app.handle_key(KeyCode::Enter);

        match &app.screen {
            Screen::Employees(screen) => {
                assert_eq!(screen.list.current().map(|e| e.empno), Some(EmployeeId(3)))
            }
            Screen::Departments => panic!("expected employee screen"),
        }
    }

    #[test]
    fn edit_employee_updates_store() {
        let mut app = app_with(
            &[Department::new(2, "Ops", "Sevilla")],
            &[Employee::new(7, "Ana", "Clerk", None)],
        );
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('e'));
        if let Mode::EditingEmployee(form) = &mut app.mode {
            form.position = "Manager".to_string();
            form.depno = "2".to_string();
        }
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            app.dao.find_employee_by_id(EmployeeId(7)).unwrap(),
            Employee::new(7, "Ana", "Manager", Some(DepartmentId(2)))
        );
    }

    #[test]
    fn employee_of_deleted_department_stays_editable() {
        let mut app = app_with(
            &[Department::new(1, "Sales", "Madrid")],
            &[Employee::new(100, "Ana", "Clerk", Some(DepartmentId(1)))],
        );
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('y'));

        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('e'));
        if let Mode::EditingEmployee(form) = &mut app.mode {
            form.position = "Manager".to_string();
        }
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            status(&app),
            ("Updated employee 100.".to_string(), StatusKind::Info)
        );
        assert_eq!(
            app.dao.find_employee_by_id(EmployeeId(100)).unwrap(),
            Employee::new(100, "Ana", "Manager", Some(DepartmentId(1)))
        );
    }

    #[test]
    fn moving_employee_to_missing_department_is_refused() {
        let mut app = app_with(&[], &[Employee::new(7, "Ana", "Clerk", None)]);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('e'));
        if let Mode::EditingEmployee(form) = &mut app.mode {
            form.depno = "3".to_string();
        }
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            status(&app),
            (
                "There is no department with number 3.".to_string(),
                StatusKind::Error
            )
        );
        assert_eq!(app.dao.find_employee_by_id(EmployeeId(7)).unwrap().depno, None);
    }

    #[test]
    fn highest_possible_key_leaves_number_blank() {
        let mut app = app_with(
            &[Department::new(i64::MAX, "Sales", "Madrid")],
            &[Employee::new(i64::MAX, "Ana", "Clerk", None)],
        );
        app.handle_key(KeyCode::Char('+'));
        match &app.mode {
            Mode::AddingDepartment(form) => assert!(form.depno.is_empty()),
            _ => panic!("expected department form"),
        }

        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('+'));
        match &app.mode {
            Mode::AddingEmployee(form) => assert!(form.empno.is_empty()),
            _ => panic!("expected employee form"),
        }
    }

    #[test]
    fn next_numbers_follow_the_highest_key() {
        let mut app = app_with(
            &[Department::new(4, "Sales", "Madrid")],
            &[Employee::new(9, "Ana", "Clerk", None)],
        );
        assert_eq!(app.next_department_number(), 5);
        assert_eq!(app.next_employee_number(), 10);

        app.close().unwrap();
        assert_eq!(app.next_employee_number(), 0);
    }

    #[test]
    fn quit_closes_cleanly() {
        let mut app = app_with(&[], &[]);
        assert!(app.handle_key(KeyCode::Char('q')));
        app.close().unwrap();
        assert!(app.dao.find_all_departments().is_err());
    }
}
