use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Department, Employee};

/// Column widths shared by headers and rows so the lists line up.
const NUMBER_WIDTH: usize = 6;
const TEXT_WIDTH: usize = 22;

/// Left-align `value` in exactly `width` characters, cutting long text.
pub(crate) fn fit_cell(value: &str, width: usize) -> String {
    let mut cell: String = value.chars().take(width).collect();
    let len = cell.chars().count();
    if len < width {
        cell.push_str(&" ".repeat(width - len));
    }
    cell
}

pub(crate) fn department_header() -> String {
    format!(
        "{} {} {}",
        fit_cell("DEPNO", NUMBER_WIDTH),
        fit_cell("NAME", TEXT_WIDTH),
        fit_cell("LOCATION", TEXT_WIDTH)
    )
}

pub(crate) fn department_row(department: &Department) -> String {
    format!(
        "{} {} {}",
        fit_cell(&department.depno.to_string(), NUMBER_WIDTH),
        fit_cell(&department.name, TEXT_WIDTH),
        fit_cell(&department.location, TEXT_WIDTH)
    )
}

pub(crate) fn employee_header() -> String {
    format!(
        "{} {} {} {}",
        fit_cell("EMPNO", NUMBER_WIDTH),
        fit_cell("NAME", TEXT_WIDTH),
        fit_cell("POSITION", TEXT_WIDTH),
        fit_cell("DEPNO", NUMBER_WIDTH)
    )
}

pub(crate) fn employee_row(employee: &Employee) -> String {
    format!(
        "{} {} {} {}",
        fit_cell(&employee.empno.to_string(), NUMBER_WIDTH),
        fit_cell(&employee.name, TEXT_WIDTH),
        fit_cell(&employee.position, TEXT_WIDTH),
        fit_cell(&employee.depno_label(), NUMBER_WIDTH)
    )
}

/// Footer hint line built from `(key, action)` pairs.
pub(crate) fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (idx, (key, action)) in hints.iter().enumerate() {
        spans.push(Span::styled(*key, key_style));
        if idx + 1 == hints.len() {
            spans.push(Span::raw(format!(" {action}")));
        } else {
            spans.push(Span::raw(format!(" {action}   ")));
        }
    }
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    use crate::error::{DaoError, Entity};
    use crate::models::DepartmentId;

    #[test]
    fn fit_cell_pads_and_truncates() {
        assert_eq!(fit_cell("ab", 4), "ab  ");
        assert_eq!(fit_cell("abcdef", 3), "abc");
        assert_eq!(fit_cell("Málaga", 6), "Málaga");
    }

    #[test]
    fn unassigned_employee_shows_dash() {
        let employee = Employee::new(1, "Ana", "Clerk", None);
        assert!(employee_row(&employee).trim_end().ends_with('-'));

        let assigned = Employee::new(2, "Leo", "Clerk", Some(DepartmentId(10)));
        assert!(employee_row(&assigned).trim_end().ends_with("10"));
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(DaoError::not_found(Entity::Department, 3))
            .context("failed to load department")
            .unwrap_err();
        assert_eq!(surface_error(&err), "department 3 not found");
    }
}
