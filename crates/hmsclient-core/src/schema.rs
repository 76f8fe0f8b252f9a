//! Compact column specifications.
//!
//! A compact spec is `"name:type"` or just `"name"`, in which case the column
//! type is `string`.

use crate::model::{FieldSchema, DEFAULT_COLUMN_TYPE};
use crate::{Error, Result};

/// Build a field schema list from compact `name:type` specs.
///
/// Each entry is split on its first `:`. A missing or empty type becomes
/// `string`. Entries without a name are rejected.
pub fn make_schema<I, S>(params: I) -> Result<Vec<FieldSchema>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    params
        .into_iter()
        .map(|param| {
            let param = param.as_ref();
            let (name, field_type) = match param.split_once(':') {
                Some((name, "")) => (name, DEFAULT_COLUMN_TYPE),
                Some((name, field_type)) => (name, field_type),
                None => (param, DEFAULT_COLUMN_TYPE),
            };

            if name.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "Column spec '{}' has no column name",
                    param
                )));
            }

            Ok(FieldSchema::new(name, field_type))
        })
        .collect()
}

/// Render each field as a tab-delimited `name\ttype` line.
pub fn parse_schema(schemas: &[FieldSchema]) -> impl Iterator<Item = String> + '_ {
    schemas
        .iter()
        .map(|s| format!("{}\t{}", s.name, s.field_type))
}
