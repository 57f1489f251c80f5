//! Logical type to native type mapping.

use super::{DialectConfig, UnsetLength};
use crate::column::{ColumnDefinition, LogicalType};
use crate::error::{DdlError, Result};

impl DialectConfig {
    /// Maps a column's logical type and facets to a native type name.
    ///
    /// An explicit `column_type` always wins. `is_key` selects the key
    /// length for strings and binaries without an explicit length.
    ///
    /// # Errors
    ///
    /// Returns [`DdlError::UnmappableFacetCombination`] when the facets
    /// contradict each other (scale without precision, row-version on a
    /// non-binary type, precision on a non-decimal type).
    pub fn map_type(&self, column: &ColumnDefinition, is_key: bool) -> Result<String> {
        if let Some(explicit) = &column.column_type {
            return Ok(explicit.clone());
        }

        let lt = column.logical_type;
        if column.row_version {
            if lt != LogicalType::Binary {
                return Err(self.unmappable(lt, "row_version"));
            }
            return Ok(self.types.row_version.clone());
        }
        if column.precision.is_some() || column.scale.is_some() {
            if lt != LogicalType::Decimal {
                return Err(self.unmappable(lt, "precision/scale"));
            }
            if column.precision.is_none() {
                return Err(self.unmappable(lt, "scale without precision"));
            }
        }

        match lt {
            LogicalType::String => Ok(self.string_type(column, is_key)),
            LogicalType::Binary => Ok(self.binary_type(column.max_length, is_key)),
            LogicalType::Decimal => Ok(match (column.precision, column.scale) {
                (Some(p), Some(s)) => format!("{}({p},{s})", self.types.decimal),
                (Some(p), None) => format!("{}({p})", self.types.decimal),
                _ => format!(
                    "{}({},{})",
                    self.types.decimal, self.types.default_precision, self.types.default_scale
                ),
            }),
            scalar => self
                .types
                .scalars
                .get(&scalar)
                .cloned()
                .ok_or_else(|| self.unmappable(scalar, "none")),
        }
    }

    fn string_type(&self, column: &ColumnDefinition, is_key: bool) -> String {
        let t = &self.types;
        let (bounded, cap, oversized) = if column.is_unicode() {
            (&t.unicode_string, t.unicode_cap, &t.oversized_unicode)
        } else {
            (&t.ansi_string, t.ansi_cap, &t.oversized_ansi)
        };
        let length = column
            .max_length
            .or_else(|| if is_key { t.key_length } else { None });

        match length {
            Some(n) if n <= cap => format!("{bounded}({n})"),
            Some(_) => oversized.clone(),
            None => match t.unset_length {
                UnsetLength::Cap => format!("{bounded}({cap})"),
                UnsetLength::Oversized => oversized.clone(),
            },
        }
    }

    fn binary_type(&self, max_length: Option<u32>, is_key: bool) -> String {
        let length = max_length.or_else(|| if is_key { self.types.key_length } else { None });
        match length {
            Some(n) if n <= self.types.binary_cap => format!("{}({n})", self.types.binary),
            _ => self.types.oversized_binary.clone(),
        }
    }

    fn unmappable(&self, logical_type: LogicalType, facets: &str) -> DdlError {
        DdlError::UnmappableFacetCombination {
            dialect: self.name.clone(),
            logical_type: logical_type.to_string(),
            facets: facets.to_string(),
        }
    }
}
