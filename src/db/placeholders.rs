//! Placeholder rewriting.
//!
//! Both passes walk the query with a small state machine so that `?` and `:`
//! inside string literals, quoted identifiers and comments are left alone.

use crate::db::driver::BindStyle;
use std::borrow::Cow;

#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
}

fn starts_with_at(bytes: &[u8], idx: usize, pat: &[u8]) -> bool {
    bytes.get(idx..idx + pat.len()) == Some(pat)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Advance the non-`Normal` states by one byte. Returns how many bytes were
/// consumed (1 or 2) and the next state.
fn step_quoted(state: State, bytes: &[u8], idx: usize) -> (usize, State) {
    let b = bytes[idx];
    match state {
        State::Normal => (1, State::Normal),
        State::SingleQuoted if b == b'\'' => {
            if bytes.get(idx + 1) == Some(&b'\'') {
                (2, state)
            } else {
                (1, State::Normal)
            }
        }
        State::DoubleQuoted if b == b'"' => {
            if bytes.get(idx + 1) == Some(&b'"') {
                (2, state)
            } else {
                (1, State::Normal)
            }
        }
        State::LineComment if b == b'\n' => (1, State::Normal),
        State::BlockComment(depth) if starts_with_at(bytes, idx, b"/*") => {
            (2, State::BlockComment(depth + 1))
        }
        State::BlockComment(depth) if starts_with_at(bytes, idx, b"*/") => {
            if depth == 1 {
                (2, State::Normal)
            } else {
                (2, State::BlockComment(depth - 1))
            }
        }
        _ => (1, state),
    }
}

/// Enter a quoted/comment state from `Normal`, if `idx` starts one.
fn enter_state(bytes: &[u8], idx: usize) -> Option<(usize, State)> {
    match bytes[idx] {
        b'\'' => Some((1, State::SingleQuoted)),
        b'"' => Some((1, State::DoubleQuoted)),
        _ if starts_with_at(bytes, idx, b"--") => Some((2, State::LineComment)),
        _ if starts_with_at(bytes, idx, b"/*") => Some((2, State::BlockComment(1))),
        _ => None,
    }
}

/// Rewrite `?` placeholders into the given bind style.
///
/// Returns a borrowed `Cow` when no changes are needed, which is always the
/// case for [`BindStyle::Question`] and [`BindStyle::Unknown`].
pub fn rebind(style: BindStyle, sql: &str) -> Cow<'_, str> {
    if matches!(style, BindStyle::Question | BindStyle::Unknown) || !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut state = State::Normal;
    let mut copied = 0;
    let mut n = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if let State::Normal = state {
            if let Some((len, next)) = enter_state(bytes, idx) {
                state = next;
                idx += len;
                continue;
            }
            if bytes[idx] == b'?' {
                out.push_str(&sql[copied..idx]);
                n += 1;
                style.push_placeholder(&mut out, n);
                idx += 1;
                copied = idx;
                continue;
            }
            idx += 1;
        } else {
            let (len, next) = step_quoted(state, bytes, idx);
            state = next;
            idx += len;
        }
    }

    if n == 0 {
        return Cow::Borrowed(sql);
    }
    out.push_str(&sql[copied.min(sql.len())..]);
    Cow::Owned(out)
}

/// A `:name` query compiled for a bind style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    /// The query with each `:name` replaced by a positional placeholder.
    pub sql: String,
    /// Parameter names in placeholder order. Repeated names appear repeatedly.
    pub names: Vec<String>,
}

/// Compile a query using `:name` parameters.
///
/// `::` is an escaped literal colon, so Postgres casts must be written as
/// `col::::text` to come out as `col::text`. Names consist of ASCII
/// alphanumerics, `_` and `.`. A `:` not followed by a name is kept as is.
pub fn compile_named(style: BindStyle, sql: &str) -> NamedQuery {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut names = Vec::new();
    let mut state = State::Normal;
    let mut copied = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if let State::Normal = state {
            if let Some((len, next)) = enter_state(bytes, idx) {
                state = next;
                idx += len;
                continue;
            }
            if bytes[idx] == b':' {
                if bytes.get(idx + 1) == Some(&b':') {
                    out.push_str(&sql[copied..=idx]);
                    idx += 2;
                    copied = idx;
                    continue;
                }
                let start = idx + 1;
                let mut end = start;
                while end < bytes.len() && is_name_byte(bytes[end]) {
                    end += 1;
                }
                if end > start {
                    out.push_str(&sql[copied..idx]);
                    names.push(sql[start..end].to_string());
                    style.push_placeholder(&mut out, names.len());
                    idx = end;
                    copied = idx;
                    continue;
                }
            }
            idx += 1;
        } else {
            let (len, next) = step_quoted(state, bytes, idx);
            state = next;
            idx += len;
        }
    }

    out.push_str(&sql[copied.min(sql.len())..]);
    NamedQuery { sql: out, names }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinds_to_dollar() {
        let res = rebind(BindStyle::Dollar, "select * from t where a = ? and b = ?");
        assert_eq!(res, "select * from t where a = $1 and b = $2");
    }

    #[test]
    fn rebinds_to_at_and_named() {
        assert_eq!(rebind(BindStyle::At, "a = ? or b = ?"), "a = @p1 or b = @p2");
        assert_eq!(rebind(BindStyle::Named, "a = ?"), "a = :arg1");
    }

    #[test]
    fn question_style_is_borrowed() {
        let sql = "select * from t where a = ?";
        assert!(matches!(rebind(BindStyle::Question, sql), Cow::Borrowed(_)));
        assert!(matches!(rebind(BindStyle::Unknown, sql), Cow::Borrowed(_)));
        assert!(matches!(
            rebind(BindStyle::Dollar, "select 1"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn rebind_skips_literals_and_comments() {
        let sql = "select '?', \"a?\" -- ?\n/* ? /* ? */ ? */ from t where a = ?";
        let res = rebind(BindStyle::Dollar, sql);
        assert_eq!(
            res,
            "select '?', \"a?\" -- ?\n/* ? /* ? */ ? */ from t where a = $1"
        );
    }

    #[test]
    fn rebind_handles_escaped_quotes_and_utf8() {
        let sql = "select 'it''s ?', 'é' from t where a = ? and b = 'ü'";
        let res = rebind(BindStyle::Dollar, sql);
        assert_eq!(res, "select 'it''s ?', 'é' from t where a = $1 and b = 'ü'");
    }

    #[test]
    fn compiles_named_params() {
        let q = compile_named(
            BindStyle::Dollar,
            "INSERT INTO person (name, age) VALUES (:name, :age)",
        );
        assert_eq!(q.sql, "INSERT INTO person (name, age) VALUES ($1, $2)");
        assert_eq!(q.names, vec!["name", "age"]);
    }

    #[test]
    fn compiles_repeated_names_in_order() {
        let q = compile_named(BindStyle::Question, "a = :x OR b = :y OR c = :x");
        assert_eq!(q.sql, "a = ? OR b = ? OR c = ?");
        assert_eq!(q.names, vec!["x", "y", "x"]);
    }

    #[test]
    fn double_colon_is_escaped() {
        let q = compile_named(BindStyle::Dollar, "select :id::::int, 'a:b'");
        assert_eq!(q.sql, "select $1::int, 'a:b'");
        assert_eq!(q.names, vec!["id"]);
    }

    #[test]
    fn lone_colon_is_kept() {
        let q = compile_named(BindStyle::Question, "select ' x ' || : ");
        assert_eq!(q.sql, "select ' x ' || : ");
        assert!(q.names.is_empty());
    }

    #[test]
    fn named_skips_comments() {
        let q = compile_named(BindStyle::Question, "-- :skip\nselect :keep /* :skip */");
        assert_eq!(q.sql, "-- :skip\nselect ? /* :skip */");
        assert_eq!(q.names, vec!["keep"]);
    }

    #[test]
    fn dotted_names() {
        let q = compile_named(BindStyle::Dollar, "where id = :user.id");
        assert_eq!(q.sql, "where id = $1");
        assert_eq!(q.names, vec!["user.id"]);
    }
}
