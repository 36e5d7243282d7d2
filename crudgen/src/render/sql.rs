//! SQL statement text
//!
//! PostgreSQL dialect with `$n` placeholders. Column lists arrive already in
//! ordinal order; nothing here reorders them.

use crate::state::placeholders;

fn list(columns: &[String]) -> String {
    columns.join(", ")
}

/// `SELECT <columns> FROM <table>`
#[must_use]
pub fn select(columns: &[String], table: &str) -> String {
    format!("SELECT {} FROM {table}", list(columns))
}

/// `<column> IS NULL`
#[must_use]
pub fn is_null(column: &str) -> String {
    format!("{column} IS NULL")
}

/// `<column> = $<index>`
#[must_use]
pub fn equals(column: &str, index: usize) -> String {
    format!("{column} = ${index}")
}

/// `WHERE <primary> = $<index>[ AND <soft delete> IS NULL]`
#[must_use]
pub fn where_primary(primary: &str, index: usize, soft_delete: Option<&str>) -> String {
    let mut clause = format!("WHERE {}", equals(primary, index));
    if let Some(column) = soft_delete {
        clause.push_str(" AND ");
        clause.push_str(&is_null(column));
    }
    clause
}

fn returning(columns: &[String]) -> String {
    if columns.is_empty() {
        String::new()
    } else {
        format!(" RETURNING {}", list(columns))
    }
}

/// `INSERT INTO <table> (<columns>) VALUES ($1..$n) RETURNING <returning>`
///
/// An empty column list inserts `DEFAULT VALUES`.
#[must_use]
pub fn insert(table: &str, columns: &[String], returning_columns: &[String]) -> String {
    let values = if columns.is_empty() {
        "DEFAULT VALUES".to_string()
    } else {
        format!(
            "({}) VALUES ({})",
            list(columns),
            list(&placeholders(columns.len()))
        )
    };
    format!("INSERT INTO {table} {values}{}", returning(returning_columns))
}

/// `UPDATE <table> SET <c1> = $1, ... WHERE <primary> = $<n+1>... RETURNING ...`
#[must_use]
pub fn update(
    table: &str,
    columns: &[String],
    primary: &str,
    soft_delete: Option<&str>,
    returning_columns: &[String],
) -> String {
    let assignments: Vec<_> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| equals(column, i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} {}{}",
        list(&assignments),
        where_primary(primary, columns.len() + 1, soft_delete),
        returning(returning_columns)
    )
}

/// Logical delete: `UPDATE <table> SET <sd> = NOW() WHERE <primary> = $1 AND <sd> IS NULL`
#[must_use]
pub fn soft_delete(table: &str, primary: &str, soft_delete: &str) -> String {
    format!(
        "UPDATE {table} SET {soft_delete} = NOW() {}",
        where_primary(primary, 1, Some(soft_delete))
    )
}

/// Physical delete: `DELETE FROM <table> WHERE <primary> = $1`
#[must_use]
pub fn delete(table: &str, primary: &str) -> String {
    format!("DELETE FROM {table} {}", where_primary(primary, 1, None))
}
