//! Query-string parsing for list and show calls
//!
//! Parameters repeat (`?fields=id&fields=name`), so they arrive as ordered
//! pairs rather than a struct.

use l2gw_core::{L2gwError, L2gwResult, ListQuery, SortDir};

/// Build a list query; any key that is not a paging or projection parameter
/// is a filter.
pub fn list_query(params: &[(String, String)]) -> L2gwResult<ListQuery> {
    let mut query = ListQuery::new();
    let mut sort_keys = Vec::new();
    let mut sort_dirs = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            "fields" => query.fields.get_or_insert_with(Vec::new).push(value.clone()),
            "sort_key" => sort_keys.push(value.clone()),
            "sort_dir" => sort_dirs.push(value.parse::<SortDir>()?),
            "limit" => {
                let limit = value.parse::<usize>().map_err(|_| {
                    L2gwError::InvalidQuery(format!(
                        "limit must be a non-negative integer, got '{}'",
                        value
                    ))
                })?;
                // limit=0 means no limit
                query.limit = (limit > 0).then_some(limit);
            }
            "marker" => query.marker = Some(value.clone()),
            "page_reverse" => query.page_reverse = parse_bool(value)?,
            _ => query = query.filter(key.clone(), value.clone()),
        }
    }

    if !sort_dirs.is_empty() && sort_dirs.len() != sort_keys.len() {
        return Err(L2gwError::InvalidQuery(
            "sort_key and sort_dir must be supplied in pairs".into(),
        ));
    }
    for (i, key) in sort_keys.into_iter().enumerate() {
        let dir = sort_dirs.get(i).copied().unwrap_or_default();
        query = query.sort(key, dir);
    }

    Ok(query)
}

/// `fields` parameters of a show call
pub fn fields(params: &[(String, String)]) -> Option<Vec<String>> {
    let fields: Vec<String> = params
        .iter()
        .filter(|(k, _)| k == "fields")
        .map(|(_, v)| v.clone())
        .collect();
    (!fields.is_empty()).then_some(fields)
}

fn parse_bool(value: &str) -> L2gwResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(L2gwError::InvalidQuery(format!(
            "page_reverse must be a boolean, got '{}'",
            value
        ))),
    }
}
