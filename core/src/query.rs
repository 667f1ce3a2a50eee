//! Query parameter building and serialization.
//!
//! `QueryParams` is mutated through chained calls while an operation is
//! being prepared, then frozen by `serialize` into ordered string pairs.
//! Arrays are comma-joined into a single value; there is no repeated-key or
//! bracket encoding.

use std::fmt;

/// A single query value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryScalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryScalar::Str(s) => f.write_str(s),
            QueryScalar::Int(n) => write!(f, "{n}"),
            QueryScalar::Float(n) => write!(f, "{n}"),
            QueryScalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryScalar {
    fn from(v: &str) -> Self {
        QueryScalar::Str(v.to_string())
    }
}

impl From<String> for QueryScalar {
    fn from(v: String) -> Self {
        QueryScalar::Str(v)
    }
}

impl From<&String> for QueryScalar {
    fn from(v: &String) -> Self {
        QueryScalar::Str(v.clone())
    }
}

impl From<i32> for QueryScalar {
    fn from(v: i32) -> Self {
        QueryScalar::Int(v.into())
    }
}

impl From<i64> for QueryScalar {
    fn from(v: i64) -> Self {
        QueryScalar::Int(v)
    }
}

impl From<u32> for QueryScalar {
    fn from(v: u32) -> Self {
        QueryScalar::Int(v.into())
    }
}

impl From<f64> for QueryScalar {
    fn from(v: f64) -> Self {
        QueryScalar::Float(v)
    }
}

impl From<bool> for QueryScalar {
    fn from(v: bool) -> Self {
        QueryScalar::Bool(v)
    }
}

/// A query entry before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Scalar(QueryScalar),
    List(Vec<QueryScalar>),
    /// Present key with no value (`undefined`/`null`); dropped on serialize.
    Absent,
}

macro_rules! scalar_query_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(v: $ty) -> Self {
                    QueryValue::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_query_value!(&str, String, &String, i32, i64, u32, f64, bool);

impl<T: Into<QueryScalar>> From<Vec<T>> for QueryValue {
    fn from(v: Vec<T>) -> Self {
        QueryValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryScalar>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(QueryValue::Absent, |v| QueryValue::Scalar(v.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub order_by: Option<String>,
}

/// Ordered query parameter set. Re-adding a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set `key`. `Absent` values are recorded but dropped on serialize.
    pub fn add(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Set `key` only when `value` is `Some`.
    pub fn add_opt<V: Into<QueryValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.add(key, value),
            None => self,
        }
    }

    /// Set `key` to a list; an empty list is ignored.
    pub fn add_array<V: Into<QueryScalar>>(self, key: &str, values: Vec<V>) -> Self {
        if values.is_empty() {
            return self;
        }
        self.add(key, QueryValue::List(values.into_iter().map(Into::into).collect()))
    }

    pub fn add_bool(self, key: &str, value: bool) -> Self {
        self.add(key, value)
    }

    pub fn extend<K, V, I>(mut self, params: I) -> Self
    where
        K: AsRef<str>,
        V: Into<QueryValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in params {
            self.insert(key.as_ref(), value.into());
        }
        self
    }

    pub fn paginate(self, pagination: &PaginationParams) -> Self {
        self.add_opt("page", pagination.page)
            .add_opt("limit", pagination.limit)
            .add_opt("offset", pagination.offset)
            .add_opt("per_page", pagination.per_page)
    }

    pub fn sort(self, sort: &SortParams) -> Self {
        self.add_opt("sort_by", sort.sort_by.as_deref())
            .add_opt("sort_order", sort.sort_order.map(|o| o.as_str()))
            .add_opt("order_by", sort.order_by.as_deref())
    }

    pub fn reset(mut self) -> Self {
        self.entries.clear();
        self
    }

    /// Freeze into serialized pairs.
    pub fn build(&self) -> Vec<(String, String)> {
        serialize(self)
    }

    fn insert(&mut self, key: &str, value: QueryValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

/// Serialize to ordered string pairs.
///
/// Absent values, empty strings and empty lists are omitted, lists are
/// joined with `,` and booleans become `true`/`false`. Output order follows
/// insertion order.
pub fn serialize(params: &QueryParams) -> Vec<(String, String)> {
    params
        .entries
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                QueryValue::Absent => return None,
                QueryValue::Scalar(scalar) => scalar.to_string(),
                QueryValue::List(items) => items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            };
            (!text.is_empty()).then(|| (key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn arrays_are_comma_joined() {
        let params = QueryParams::new().add("a", vec![1, 2, 3]);
        assert_eq!(serialize(&params), pairs(&[("a", "1,2,3")]));
    }

    #[test]
    fn absent_and_empty_values_are_omitted() {
        let params = QueryParams::new()
            .add("a", QueryValue::Absent)
            .add("b", "")
            .add("c", Vec::<String>::new());
        assert!(serialize(&params).is_empty());
    }

    #[test]
    fn booleans_are_lowercase_literals() {
        let params = QueryParams::new().add("flag", true).add_bool("other", false);
        assert_eq!(serialize(&params), pairs(&[("flag", "true"), ("other", "false")]));
    }

    #[test]
    fn zero_is_kept() {
        let params = QueryParams::new().add("page", 0);
        assert_eq!(serialize(&params), pairs(&[("page", "0")]));
    }

    #[test]
    fn insertion_order_is_preserved_and_replacement_is_in_place() {
        let params = QueryParams::new()
            .add("z", "1")
            .add("a", "2")
            .add("m", "3")
            .add("z", "9");
        assert_eq!(serialize(&params), pairs(&[("z", "9"), ("a", "2"), ("m", "3")]));
    }

    #[test]
    fn serialize_is_deterministic() {
        let params = QueryParams::new().add("x", 1.5).add("tags", vec!["a", "b"]);
        assert_eq!(serialize(&params), serialize(&params));
        assert_eq!(serialize(&params), pairs(&[("x", "1.5"), ("tags", "a,b")]));
    }

    #[test]
    fn add_opt_skips_none() {
        let params = QueryParams::new()
            .add_opt("username", Some("bob"))
            .add_opt::<&str>("password", None);
        assert_eq!(serialize(&params), pairs(&[("username", "bob")]));
    }

    #[test]
    fn add_array_ignores_empty_list() {
        let params = QueryParams::new().add_array::<&str>("tags", Vec::new());
        assert!(params.is_empty());
    }

    #[test]
    fn pagination_and_sort_helpers() {
        let params = QueryParams::new()
            .paginate(&PaginationParams {
                page: Some(2),
                per_page: Some(50),
                ..Default::default()
            })
            .sort(&SortParams {
                sort_by: Some("name".to_string()),
                sort_order: Some(SortOrder::Desc),
                order_by: None,
            });
        assert_eq!(
            params.build(),
            pairs(&[("page", "2"), ("per_page", "50"), ("sort_by", "name"), ("sort_order", "desc")])
        );
    }

    #[test]
    fn extend_and_reset() {
        let params = QueryParams::new().extend([("a", 1), ("b", 2)]);
        assert_eq!(params.build(), pairs(&[("a", "1"), ("b", "2")]));
        assert!(params.reset().is_empty());
    }
}
