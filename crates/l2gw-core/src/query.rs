//! List-query helpers: filters, sorting, marker paging and field projection.
//!
//! Resources are rendered to JSON objects first and the query runs over
//! those, so gateways and connections share one implementation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{L2gwError, L2gwResult};

/// A rendered resource, possibly restricted to a subset of its fields
pub type Projection = Map<String, Value>;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortDir {
    type Err = L2gwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(L2gwError::InvalidQuery(format!(
                "sort direction must be 'asc' or 'desc', got '{}'",
                s
            ))),
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub key: String,
    pub dir: SortDir,
}

/// Filters, projection, sorting and paging for a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// attribute -> accepted values (an item matches if it equals any of them)
    pub filters: BTreeMap<String, Vec<String>>,
    /// Attributes to return; `None` returns everything
    pub fields: Option<Vec<String>>,
    /// Sort keys in priority order; `id` ascending is always the final tiebreak
    pub sorts: Vec<SortKey>,
    pub limit: Option<usize>,
    /// Id of the last item of the previous page
    pub marker: Option<String>,
    /// Page backwards from the marker
    pub page_reverse: bool,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn sort(mut self, key: impl Into<String>, dir: SortDir) -> Self {
        self.sorts.push(SortKey {
            key: key.into(),
            dir,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn reverse(mut self) -> Self {
        self.page_reverse = true;
        self
    }

    /// Run this query over rendered resources.
    ///
    /// `allowed` lists the attributes that may be used as filter or sort keys.
    pub fn apply(&self, items: Vec<Projection>, allowed: &[&str]) -> L2gwResult<Vec<Projection>> {
        for key in self.filters.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(L2gwError::InvalidQuery(format!("unknown filter '{}'", key)));
            }
        }
        for sort in &self.sorts {
            if !allowed.contains(&sort.key.as_str()) {
                return Err(L2gwError::InvalidQuery(format!(
                    "unknown sort key '{}'",
                    sort.key
                )));
            }
        }

        let mut items: Vec<Projection> = items
            .into_iter()
            .filter(|item| self.matches(item))
            .collect();

        items.sort_by(|a, b| self.compare(a, b));
        if self.page_reverse {
            items.reverse();
        }

        if let Some(ref marker) = self.marker {
            let pos = items
                .iter()
                .position(|item| item.get("id").and_then(Value::as_str) == Some(marker.as_str()))
                .ok_or_else(|| L2gwError::InvalidQuery(format!("marker {} not found", marker)))?;
            items.drain(..=pos);
        }

        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        if self.page_reverse {
            items.reverse();
        }

        Ok(items
            .into_iter()
            .map(|item| project(item, self.fields.as_deref()))
            .collect())
    }

    fn matches(&self, item: &Projection) -> bool {
        self.filters.iter().all(|(key, accepted)| {
            let rendered = item.get(key).map(render).unwrap_or_default();
            accepted.iter().any(|v| *v == rendered)
        })
    }

    fn compare(&self, a: &Projection, b: &Projection) -> Ordering {
        for sort in &self.sorts {
            let ord = compare_values(a.get(&sort.key), b.get(&sort.key));
            let ord = match sort.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        compare_values(a.get("id"), b.get("id"))
    }
}

/// Render a resource to a projection
pub fn to_projection<T: Serialize>(item: &T) -> L2gwResult<Projection> {
    match serde_json::to_value(item) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(L2gwError::Storage("resource did not render to an object".into())),
        Err(e) => Err(L2gwError::Storage(e.to_string())),
    }
}

/// Keep only `fields` of a rendered resource (all of them when `None`).
///
/// Unknown field names are ignored.
///
/// ```
/// # use l2gw_core::query::project;
/// let item = serde_json::json!({"id": "gw1", "name": "edge"});
/// let item = item.as_object().unwrap().clone();
/// let only_name = project(item, Some(&["name".to_string()]));
/// assert_eq!(only_name.len(), 1);
/// ```
pub fn project(item: Projection, fields: Option<&[String]>) -> Projection {
    match fields {
        Some(fields) if !fields.is_empty() => item
            .into_iter()
            .filter(|(k, _)| fields.iter().any(|f| f == k))
            .collect(),
        _ => item,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    sort_rank(a).cmp(&sort_rank(b)).then_with(|| match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => render(x).cmp(&render(y)),
        _ => Ordering::Equal,
    })
}

// Missing, null and "" (the unset segmentation id) sort before numbers,
// numbers before strings.
fn sort_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::String(s)) if s.is_empty() => 0,
        Some(Value::Number(_)) => 1,
        Some(_) => 2,
    }
}
