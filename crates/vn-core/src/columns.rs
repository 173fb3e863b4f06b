//! Column renaming from the vendor's lowercase field names to the
//! Yahoo Finance schema expected downstream.

use polars::prelude::DataFrame;

use crate::error::Result;

/// Vendor field name to target column name.
pub const COLUMN_MAPPING: &[(&str, &str)] = &[
    ("date", "Date"),
    ("open", "Open"),
    ("high", "High"),
    ("low", "Low"),
    ("close", "Close"),
    ("volume", "Volume"),
    ("adjust", "Adj Close"),
];

/// Returns the target name for a vendor column, if it is a known field.
///
/// Only exact lowercase names match, so target names map to nothing and
/// renaming an already normalized frame is a no-op.
#[must_use]
pub fn target_name(column: &str) -> Option<&'static str> {
    COLUMN_MAPPING
        .iter()
        .find(|(from, _)| *from == column)
        .map(|(_, to)| *to)
}

/// Renames known vendor columns in place and returns the frame.
///
/// Unrecognized columns are left untouched. A known field is skipped when
/// the frame already carries its target name.
///
/// # Errors
/// Returns an error if polars rejects a rename.
pub fn normalize_columns(mut df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for name in &names {
        let Some(target) = target_name(name) else {
            continue;
        };
        if names.iter().any(|existing| existing == target) {
            continue;
        }
        df.rename(name, target.into())?;
    }

    Ok(df)
}
