//! Parameter binding utilities for database queries.
//!
//! This module converts `SqlValue` slices into `AnyArguments`, so the same
//! argument list can be used with `query_with`, `query_as_with`,
//! `query_scalar_with` and prepared statements.

use crate::error::{DbError, DbResult};
use crate::models::SqlValue;
use sqlx::Arguments;
use sqlx::any::AnyArguments;

/// Add a single parameter to an Any argument list.
fn add_param<'q>(arguments: &mut AnyArguments<'q>, param: &'q SqlValue) -> DbResult<()> {
    let added = match param {
        SqlValue::Null => arguments.add(None::<String>),
        SqlValue::Bool(v) => arguments.add(*v),
        SqlValue::Int(v) => arguments.add(*v),
        SqlValue::Float(v) => arguments.add(*v),
        SqlValue::Text(v) => arguments.add(v.as_str()),
        SqlValue::Bytes(v) => arguments.add(v.as_slice()),
    };
    added.map_err(|e| {
        DbError::invalid_input(format!(
            "Failed to bind {} parameter: {}",
            param.type_name(),
            e
        ))
    })
}

/// Build Any arguments from positional parameters.
pub(crate) fn to_arguments(params: &[SqlValue]) -> DbResult<AnyArguments<'_>> {
    let mut arguments = AnyArguments::default();
    for param in params {
        add_param(&mut arguments, param)?;
    }
    Ok(arguments)
}
