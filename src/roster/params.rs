use crate::error::ApiError;
use crate::filter::filter_order::FilterOrder;
use crate::filter::{Column, Range, SortSpec};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_SORT: &str = "seq:asc";

/// Raw list query string. Everything stays text so that bad numbers fall
/// back to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    /// Collect from decoded query pairs. Each field is read on its own: a
    /// repeated key keeps its first value and unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut query.page,
                "size" => &mut query.size,
                "search" => &mut query.search,
                "sort" => &mut query.sort,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// Validated list parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub page: i64,
    pub size: i64,
    pub search: Option<String>,
    pub sort: Vec<SortSpec>,
}

impl ListParams {
    pub fn from_query(query: &ListQuery) -> Self {
        Self {
            page: parse_page(query.page.as_deref()),
            size: parse_size(query.size.as_deref()),
            search: parse_search(query.search.as_deref()),
            sort: parse_sort(query.sort.as_deref()),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Fetch window covering rows `[offset, offset + size - 1]`
    pub fn range(&self) -> Range {
        Range { offset: self.offset(), limit: self.size }
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::from_query(&ListQuery::default())
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// At least 1; anything unparseable is page 1
pub fn parse_page(raw: Option<&str>) -> i64 {
    parse_int(raw).unwrap_or(DEFAULT_PAGE).max(1)
}

/// Clamped to [5, 100]; anything unparseable is 20
pub fn parse_size(raw: Option<&str>) -> i64 {
    parse_int(raw).unwrap_or(DEFAULT_PAGE_SIZE).clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

pub fn parse_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Allow-listed sort specs; never empty, falling back to `seq asc`
pub fn parse_sort(raw: Option<&str>) -> Vec<SortSpec> {
    let specs = FilterOrder::parse(raw.unwrap_or(DEFAULT_SORT));
    if specs.is_empty() { vec![SortSpec::asc(Column::Seq)] } else { specs }
}

/// Event slug from the path, required on every request
pub fn parse_event(raw: &str) -> Result<String, ApiError> {
    let slug = raw.trim();
    if slug.is_empty() {
        return Err(ApiError::bad_request("event required"));
    }
    Ok(slug.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_floors_at_one() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-7")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some(" 3 ")), 3);
    }

    #[test]
    fn size_clamps_to_bounds() {
        assert_eq!(parse_size(None), 20);
        assert_eq!(parse_size(Some("nope")), 20);
        assert_eq!(parse_size(Some("1")), 5);
        assert_eq!(parse_size(Some("-50")), 5);
        assert_eq!(parse_size(Some("5")), 5);
        assert_eq!(parse_size(Some("100")), 100);
        assert_eq!(parse_size(Some("1000")), 100);
        assert_eq!(parse_size(Some("42")), 42);
    }

    #[test]
    fn empty_search_means_no_filter() {
        assert_eq!(parse_search(None), None);
        assert_eq!(parse_search(Some("   ")), None);
        assert_eq!(parse_search(Some("  kim ")), Some("kim".to_string()));
    }

    #[test]
    fn sort_defaults_to_seq_asc() {
        let default = vec![SortSpec::asc(Column::Seq)];
        assert_eq!(parse_sort(None), default);
        assert_eq!(parse_sort(Some("")), default);
        assert_eq!(parse_sort(Some("secret:desc,event_slug")), default);
    }

    #[test]
    fn sort_keeps_allowed_tokens_in_order() {
        assert_eq!(
            parse_sort(Some("power_m:desc,name:asc")),
            vec![SortSpec::desc(Column::PowerM), SortSpec::asc(Column::Name)]
        );
    }

    #[test]
    fn range_is_inclusive_window() {
        let params = ListParams::from_query(&ListQuery {
            page: Some("2".into()),
            size: Some("5".into()),
            ..Default::default()
        });
        assert_eq!(params.offset(), 5);
        assert_eq!(params.range(), Range::inclusive(5, 9));
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let params = ListParams::from_query(&ListQuery {
            page: Some(i64::MAX.to_string()),
            size: Some("100".into()),
            ..Default::default()
        });
        assert_eq!(params.offset(), i64::MAX);
        assert_eq!(params.range().limit, 100);
    }

    #[test]
    fn repeated_key_keeps_first_value_and_others_survive() {
        let query = ListQuery::from_pairs([
            ("search", "alice"),
            ("page", "2"),
            ("page", "9"),
            ("color", "red"),
        ]);
        assert_eq!(
            query,
            ListQuery {
                page: Some("2".into()),
                search: Some("alice".into()),
                ..Default::default()
            }
        );
        let params = ListParams::from_query(&query);
        assert_eq!(params.page, 2);
        assert_eq!(params.search.as_deref(), Some("alice"));
    }

    #[test]
    fn bad_field_only_resets_itself() {
        let params = ListParams::from_query(&ListQuery::from_pairs([
            ("page", "abc"),
            ("size", "10"),
            ("sort", "name:desc"),
        ]));
        assert_eq!(params.page, 1);
        assert_eq!(params.size, 10);
        assert_eq!(params.sort, vec![SortSpec::desc(Column::Name)]);
    }

    #[test]
    fn event_is_required() {
        assert!(parse_event("").is_err());
        assert!(parse_event("   ").is_err());
        assert_eq!(parse_event(" spring-cup ").unwrap(), "spring-cup");
    }
}
