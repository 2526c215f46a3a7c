//! Plain-text projection of a controller snapshot.

use std::fmt::Write as _;

use client_core::{DraftState, Snapshot};
use shared::protocol::{UserFields, UserRecord};

const HEADERS: [&str; 4] = ["ID", "Name", "Email", "Action"];

pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::from("User Table\n[add] Add New User\n");

    if let DraftState::AddingNew { fields } = &snapshot.draft {
        out.push_str("\nAdd New User\n");
        push_form(&mut out, fields);
        out.push_str("[save-add] Save New User  [cancel] Cancel\n");
    }

    out.push('\n');
    let editing = snapshot.draft.editing_target();
    let rows: Vec<[String; 4]> = snapshot
        .records
        .iter()
        .map(|user| match (&snapshot.draft, editing == Some(user.id)) {
            (DraftState::EditingExisting { fields, .. }, true) => editing_row(user, fields),
            _ => [
                user.id.to_string(),
                user.name.clone(),
                user.email.clone(),
                format!("[edit {0}] [delete {0}]", user.id),
            ],
        })
        .collect();
    push_table(&mut out, &rows);

    if let DraftState::EditingExisting { fields, .. } = &snapshot.draft {
        out.push_str("\nEdit User\n");
        push_form(&mut out, fields);
        out.push_str("[save] Save Changes\n");
    }
    out
}

fn editing_row(user: &UserRecord, fields: &UserFields) -> [String; 4] {
    [
        user.id.to_string(),
        format!("<{}>", fields.name),
        format!("<{}>", fields.email),
        "[save] Update".to_string(),
    ]
}

fn push_form(out: &mut String, fields: &UserFields) {
    let _ = writeln!(out, "Name:  <{}>", fields.name);
    let _ = writeln!(out, "Email: <{}>", fields.email);
}

fn push_table(out: &mut String, rows: &[[String; 4]]) {
    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let headers = HEADERS.map(str::to_string);
    push_row(out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in rows {
        push_row(out, row, &widths);
    }
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
