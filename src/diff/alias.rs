//! Schema aliases for attached stores.

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_alias(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Aliases for the two sides of a pair, `<identity>_<position>`.
///
/// Distinct positions can sanitize to the same alias (`a-b` and `a_b`), and
/// SQLite compares schema names without regard to ASCII case (`Prod` and
/// `prod`). Such pairs get `_1`/`_2` suffixes so both schemas can be attached.
pub fn pair_aliases(
    identity: &str,
    left_position: Option<&str>,
    right_position: Option<&str>,
) -> (String, String) {
    let left = sanitize_alias(&format!("{}_{}", identity, left_position.unwrap_or_default()));
    let right = sanitize_alias(&format!("{}_{}", identity, right_position.unwrap_or_default()));
    if left.eq_ignore_ascii_case(&right) {
        (format!("{}_1", left), format!("{}_2", right))
    } else {
        (left, right)
    }
}

/// Quote an alias as an SQL identifier.
pub fn quote_identifier(alias: &str) -> String {
    format!("\"{}\"", alias.replace('"', "\"\""))
}
