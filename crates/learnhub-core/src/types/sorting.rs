//! Sorting types for list endpoints.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse a user-supplied direction, defaulting to descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// A column a list can be sorted on.
///
/// Every list endpoint only exposes a fixed set of columns, so the column
/// name that reaches SQL always comes from this enum and never from input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Creation timestamp.
    #[default]
    CreatedAt,
    /// Last update timestamp.
    UpdatedAt,
    /// Title or name column.
    Title,
}

impl SortColumn {
    /// Parse a user-supplied column, falling back to `created_at`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("updated_at") => Self::UpdatedAt,
            Some("title") | Some("name") => Self::Title,
            _ => Self::CreatedAt,
        }
    }
}

/// A sort order: a column and a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Column to sort by.
    pub column: SortColumn,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Render an `ORDER BY` clause, using `title_column` for [`SortColumn::Title`].
    pub fn order_by(&self, title_column: &str) -> String {
        let column = match self.column {
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
            SortColumn::Title => title_column,
        };
        format!("ORDER BY {column} {}, id ASC", self.direction.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(SortDirection::parse(None), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortColumn::parse(Some("drop table")), SortColumn::CreatedAt);
    }

    #[test]
    fn test_order_by() {
        let sort = SortField::new(SortColumn::Title, SortDirection::Asc);
        assert_eq!(sort.order_by("name"), "ORDER BY name ASC, id ASC");
    }
}
