//! Catalog query parameters
//!
//! One `QueryParams` value is an immutable snapshot of everything that
//! identifies a page of the catalog: pagination, filters, and sort. It is
//! equality-comparable so callers can skip refetches when nothing changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sort direction, `asc`/`desc` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Query parameters for one catalog fetch
///
/// Filters are a name → value map (`search`, `genre`, `director`,
/// `minOscars`, `maxOscars` are what the backend understands); an absent
/// key means the filter is not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub page: u32,
    pub page_size: u32,
    pub filters: BTreeMap<String, String>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

impl Default for QueryParams {
    /// Initial list view: first page, ten rows, sorted by id ascending
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 10,
            filters: BTreeMap::new(),
            sort_field: "id".to_string(),
            sort_direction: SortDirection::Asc,
        }
    }
}

impl QueryParams {
    /// Render the REST query-string pairs for this snapshot
    ///
    /// Pair names match the backend: `page`, `size`, `sort`, `order`, plus
    /// one pair per filter.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.page_size.to_string()),
            ("sort".to_string(), self.sort_field.clone()),
            ("order".to_string(), self.sort_direction.as_str().to_string()),
        ];
        for (name, value) in &self.filters {
            pairs.push((name.clone(), value.clone()));
        }
        pairs
    }

    /// Merge a partial update into this snapshot, producing the new one
    ///
    /// Filter entries are merged key-wise; an empty-string value removes
    /// the key (mirrors clearing a filter input in the UI).
    pub fn merged(&self, update: &QueryParamsUpdate) -> Self {
        let mut next = self.clone();
        if let Some(page) = update.page {
            next.page = page;
        }
        if let Some(page_size) = update.page_size {
            next.page_size = page_size.max(1);
        }
        if let Some(sort_field) = &update.sort_field {
            next.sort_field = sort_field.clone();
        }
        if let Some(sort_direction) = update.sort_direction {
            next.sort_direction = sort_direction;
        }
        for (name, value) in &update.filters {
            if value.is_empty() {
                next.filters.remove(name);
            } else {
                next.filters.insert(name.clone(), value.clone());
            }
        }
        next
    }
}

/// Partial form of [`QueryParams`]; `None`/absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamsUpdate {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: BTreeMap<String, String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl QueryParamsUpdate {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn sort(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort_field: Some(field.into()),
            sort_direction: Some(direction),
            ..Self::default()
        }
    }

    pub fn filter(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut filters = BTreeMap::new();
        filters.insert(name.into(), value.into());
        Self {
            filters,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_initial_list_view() {
        let params = QueryParams::default();
        assert_eq!(params.page, 0);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.sort_field, "id");
        assert_eq!(params.sort_direction, SortDirection::Asc);
        assert!(params.filters.is_empty());
    }

    #[test]
    fn query_pairs_include_filters() {
        let params = QueryParams::default().merged(&QueryParamsUpdate::filter("genre", "COMEDY"));
        let pairs = params.to_query_pairs();
        assert!(pairs.contains(&("page".to_string(), "0".to_string())));
        assert!(pairs.contains(&("size".to_string(), "10".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "id".to_string())));
        assert!(pairs.contains(&("order".to_string(), "asc".to_string())));
        assert!(pairs.contains(&("genre".to_string(), "COMEDY".to_string())));
    }

    #[test]
    fn merged_replaces_and_removes_filters() {
        let base = QueryParams::default().merged(&QueryParamsUpdate::filter("genre", "ACTION"));

        let replaced = base.merged(&QueryParamsUpdate::filter("genre", "FANTASY"));
        assert_eq!(replaced.filters.get("genre").map(String::as_str), Some("FANTASY"));

        let cleared = base.merged(&QueryParamsUpdate::filter("genre", ""));
        assert!(cleared.filters.is_empty());
    }

    #[test]
    fn empty_update_is_identity() {
        let base = QueryParams::default().merged(&QueryParamsUpdate::page(3));
        assert_eq!(base.merged(&QueryParamsUpdate::default()), base);
    }

    #[test]
    fn page_size_is_clamped_to_positive() {
        let params = QueryParams::default().merged(&QueryParamsUpdate {
            page_size: Some(0),
            ..QueryParamsUpdate::default()
        });
        assert_eq!(params.page_size, 1);
    }
}
