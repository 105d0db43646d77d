//! Statement builders. All table names are prefixed with the configured table prefix.

/// Maximum number of placeholders in a single MySQL statement.
pub const MAX_PLACEHOLDERS: usize = u16::MAX as usize;

/// `SELECT a, b FROM {prefix}{table} WHERE {condition} ORDER BY {order_by}`
pub fn select(
    prefix: &str,
    table: &str,
    columns: &[&str],
    condition: &str,
    order_by: &str,
) -> String {
    format!(
        "SELECT {} FROM {}{} WHERE {} ORDER BY {}",
        columns.join(", "),
        prefix,
        table,
        condition,
        order_by
    )
}

/// `INSERT INTO {prefix}{table} (a, b) VALUES (?, ?), (?, ?)` with `rows` value groups.
pub fn insert(prefix: &str, table: &str, columns: &[&str], rows: usize) -> String {
    let group = format!("({})", vec!["?"; columns.len()].join(", "));

    format!(
        "INSERT INTO {}{} ({}) VALUES {}",
        prefix,
        table,
        columns.join(", "),
        vec![group; rows].join(", ")
    )
}

/// `UPDATE {prefix}{table} SET b = ?, c = ? WHERE a = ?` where `a` is the first column.
/// The values are bound in column order with the key moved to the end.
pub fn update(prefix: &str, table: &str, columns: &[&str]) -> String {
    let (key, rest) = match columns.split_first() {
        Some(split) => split,
        None => return String::new(),
    };

    let set: Vec<String> = rest.iter().map(|column| format!("{} = ?", column)).collect();

    format!(
        "UPDATE {}{} SET {} WHERE {} = ?",
        prefix,
        table,
        set.join(", "),
        key
    )
}

/// `DELETE FROM {prefix}{table} WHERE {column} = ?`
pub fn delete(prefix: &str, table: &str, column: &str) -> String {
    format!("DELETE FROM {}{} WHERE {} = ?", prefix, table, column)
}

/// Number of rows that fit into a single insert statement.
pub fn rows_per_insert(columns: usize) -> usize {
    (MAX_PLACEHOLDERS / columns.max(1)).max(1)
}

/// Condition selecting rows of the squads table belonging to a tournament.
pub fn squads_of_tmnt(prefix: &str) -> String {
    format!(
        "event_id IN (SELECT id FROM {}events WHERE tmnt_id = ?)",
        prefix
    )
}

/// Condition selecting rows with a `squad_id` belonging to a tournament.
pub fn squad_children_of_tmnt(prefix: &str) -> String {
    format!(
        "squad_id IN (SELECT s.id FROM {p}squads s JOIN {p}events e ON s.event_id = e.id \
         WHERE e.tmnt_id = ?)",
        p = prefix
    )
}
