//! Backend-neutral query description built from request query parameters.
//!
//! The list handler translates the query string into this structure; storage
//! adapters consume it without ever seeing transport-level text again.
//!
//! Recognized parameters are `limit`, `offset` and `sort=field,-field2`
//! (leading `-` means descending). Every other key becomes an exact-match
//! filter. Malformed `limit`/`offset` values keep the defaults rather than
//! failing the request.

use indexmap::IndexMap;

/// Default page size when the request does not specify one.
pub const DEFAULT_LIMIT: usize = 10;

/// Pagination window. `limit == 0` means unbounded (a backend-defined cap
/// may still apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Sort direction for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A single sort criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Filters, pagination and sort as understood by every storage adapter.
///
/// Filters are exact-match and AND-combined; sort criteria apply in listed
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescription {
    pub filters: IndexMap<String, String>,
    pub pagination: Pagination,
    pub sort: Vec<Sort>,
}

impl QueryDescription {
    /// Build from request query parameters.
    ///
    /// Later occurrences of the same filter key overwrite earlier ones, but
    /// the key keeps its first position.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = QueryDescription::default();

        for (key, value) in params {
            match key {
                "limit" => {
                    if let Ok(limit) = value.parse::<usize>() {
                        query.pagination.limit = limit;
                    }
                }
                "offset" => {
                    if let Ok(offset) = value.parse::<usize>() {
                        query.pagination.offset = offset;
                    }
                }
                "sort" => {
                    query.sort = parse_sort(value);
                }
                _ => {
                    query.filters.insert(key.to_string(), value.to_string());
                }
            }
        }

        query
    }

    /// Convenience: a query with a single exact-match filter and limit 1.
    /// Used by the auth provider's login lookup.
    pub fn single_match(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut filters = IndexMap::new();
        filters.insert(field.into(), value.into());
        QueryDescription {
            filters,
            pagination: Pagination {
                limit: 1,
                offset: 0,
            },
            sort: Vec::new(),
        }
    }
}

/// Parse `sort=name,-age` into ordered criteria.
fn parse_sort(raw: &str) -> Vec<Sort> {
    raw.split(',')
        .filter(|field| !field.is_empty() && *field != "-")
        .map(|field| {
            if let Some(stripped) = field.strip_prefix('-') {
                Sort {
                    field: stripped.to_string(),
                    direction: SortDirection::Desc,
                }
            } else {
                Sort {
                    field: field.to_string(),
                    direction: SortDirection::Asc,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        pairs.to_vec()
    }

    #[test]
    fn test_default_pagination() {
        let query = QueryDescription::from_params(params(&[]));
        assert_eq!(query.pagination.limit, 10);
        assert_eq!(query.pagination.offset, 0);
        assert!(query.filters.is_empty());
        assert!(query.sort.is_empty());
    }

    #[test]
    fn test_limit_offset() {
        let query = QueryDescription::from_params(params(&[("limit", "25"), ("offset", "50")]));
        assert_eq!(query.pagination.limit, 25);
        assert_eq!(query.pagination.offset, 50);
    }

    #[test]
    fn test_malformed_limit_keeps_default() {
        let query = QueryDescription::from_params(params(&[("limit", "lots"), ("offset", "-3")]));
        assert_eq!(query.pagination.limit, 10);
        assert_eq!(query.pagination.offset, 0);
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        let query = QueryDescription::from_params(params(&[("limit", "0")]));
        assert_eq!(query.pagination.limit, 0);
    }

    #[test]
    fn test_sort_parsing() {
        let query = QueryDescription::from_params(params(&[("sort", "name,-age")]));
        assert_eq!(
            query.sort,
            vec![
                Sort {
                    field: "name".to_string(),
                    direction: SortDirection::Asc,
                },
                Sort {
                    field: "age".to_string(),
                    direction: SortDirection::Desc,
                },
            ]
        );
    }

    #[test]
    fn test_sort_single_descending() {
        let query = QueryDescription::from_params(params(&[("sort", "-age")]));
        assert_eq!(query.sort.len(), 1);
        assert_eq!(query.sort[0].field, "age");
        assert_eq!(query.sort[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_unrecognized_keys_become_filters() {
        let query = QueryDescription::from_params(params(&[
            ("status", "active"),
            ("limit", "5"),
            ("name", "Ada"),
        ]));
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters["status"], "active");
        assert_eq!(query.filters["name"], "Ada");
        assert_eq!(query.pagination.limit, 5);
    }

    #[test]
    fn test_duplicate_filter_last_wins_first_position() {
        let query = QueryDescription::from_params(params(&[
            ("status", "active"),
            ("name", "Ada"),
            ("status", "archived"),
        ]));
        assert_eq!(query.filters["status"], "archived");
        assert_eq!(
            query.filters.keys().collect::<Vec<_>>(),
            vec!["status", "name"]
        );
    }

    #[test]
    fn test_single_match() {
        let query = QueryDescription::single_match("email", "a@b.c");
        assert_eq!(query.filters["email"], "a@b.c");
        assert_eq!(query.pagination.limit, 1);
    }
}
