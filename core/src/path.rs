//! Path templating: `{name}` placeholder validation and expansion.

use std::fmt;

use crate::error::ApiError;

/// A value substituted into a path placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Bool(bool),
}

impl PathValue {
    /// Only the empty string counts as missing; `0` and `false` are valid.
    fn is_empty(&self) -> bool {
        matches!(self, PathValue::Str(s) if s.is_empty())
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::Str(s) => f.write_str(s),
            PathValue::Int(n) => write!(f, "{n}"),
            PathValue::UInt(n) => write!(f, "{n}"),
            PathValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for PathValue {
    fn from(v: &str) -> Self {
        PathValue::Str(v.to_string())
    }
}

impl From<String> for PathValue {
    fn from(v: String) -> Self {
        PathValue::Str(v)
    }
}

impl From<&String> for PathValue {
    fn from(v: &String) -> Self {
        PathValue::Str(v.clone())
    }
}

impl From<i32> for PathValue {
    fn from(v: i32) -> Self {
        PathValue::Int(v.into())
    }
}

impl From<i64> for PathValue {
    fn from(v: i64) -> Self {
        PathValue::Int(v)
    }
}

impl From<u32> for PathValue {
    fn from(v: u32) -> Self {
        PathValue::UInt(v.into())
    }
}

impl From<u64> for PathValue {
    fn from(v: u64) -> Self {
        PathValue::UInt(v)
    }
}

impl From<bool> for PathValue {
    fn from(v: bool) -> Self {
        PathValue::Bool(v)
    }
}

/// Placeholder name to value, in insertion order. A `None` entry records an
/// explicitly absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, Option<PathValue>)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: impl Into<PathValue>) -> Self {
        self.with_opt(name, Some(value))
    }

    pub fn with_opt<V: Into<PathValue>>(mut self, name: &str, value: Option<V>) -> Self {
        let value = value.map(Into::into);
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&PathValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.as_ref())
    }

    fn usable(&self, name: &str) -> Option<&PathValue> {
        self.get(name).filter(|v| !v.is_empty())
    }
}

/// Placeholder names in template order. Repeated names appear once per
/// occurrence.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// Fail with `MissingPathParameter` for the first placeholder that has no
/// non-empty value.
pub fn validate(template: &str, params: &PathParams) -> Result<(), ApiError> {
    match placeholders(template)
        .into_iter()
        .find(|name| params.usable(name).is_none())
    {
        Some(name) => Err(ApiError::MissingPathParameter {
            name: name.to_string(),
            template: template.to_string(),
        }),
        None => Ok(()),
    }
}

/// Replace every `{name}` with the percent-encoded value in one left-to-right
/// scan. Substituted text is never rescanned. Placeholders without a value
/// and an unterminated `{` are copied literally; call `validate` first.
///
/// Only RFC 3986 unreserved characters (`A-Z a-z 0-9 - _ . ~`) survive
/// unescaped, so `!'()*` are percent-encoded as well.
pub fn expand(template: &str, params: &PathParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match params.usable(name) {
            Some(value) => out.push_str(&urlencoding::encode(&value.to_string())),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// `validate` then `expand`.
pub fn render(template: &str, params: &PathParams) -> Result<String, ApiError> {
    validate(template, params)?;
    Ok(expand(template, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_delimiters_are_escaped() {
        let params = PathParams::new().with("username", "o'neil(!)*");
        assert_eq!(expand("/user/{username}", &params), "/user/o%27neil%28%21%29%2A");
    }

    #[test]
    fn zero_and_false_are_valid_values() {
        let params = PathParams::new().with("petId", 0).with("flag", false);
        assert!(validate("/pet/{petId}/{flag}", &params).is_ok());
        assert_eq!(expand("/pet/{petId}/{flag}", &params), "/pet/0/false");
    }

    #[test]
    fn empty_string_is_missing() {
        let params = PathParams::new().with("username", "");
        let err = validate("/user/{username}", &params).unwrap_err();
        assert!(matches!(err, ApiError::MissingPathParameter { ref name, .. } if name == "username"));
    }

    #[test]
    fn explicit_absence_is_missing() {
        let params = PathParams::new().with_opt::<i64>("orderId", None);
        assert!(validate("/store/order/{orderId}", &params).is_err());
        assert!(validate("/store/order/{orderId}", &PathParams::new()).is_err());
    }

    #[test]
    fn template_without_placeholders_always_validates() {
        assert!(validate("/store/inventory", &PathParams::new()).is_ok());
        assert_eq!(expand("/store/inventory", &PathParams::new()), "/store/inventory");
    }

    #[test]
    fn repeated_placeholder_gets_same_value() {
        let params = PathParams::new().with("id", 42);
        assert_eq!(expand("/a/{id}/b/{id}", &params), "/a/42/b/42");
    }

    #[test]
    fn values_are_percent_encoded() {
        let params = PathParams::new().with("username", "john doe/admin");
        assert_eq!(expand("/user/{username}", &params), "/user/john%20doe%2Fadmin");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let params = PathParams::new().with("a", "{b}").with("b", "x");
        assert_eq!(expand("/{a}", &params), "/%7Bb%7D");
    }

    #[test]
    fn unterminated_brace_is_literal() {
        let params = PathParams::new().with("id", 1);
        assert_eq!(expand("/x/{id}/{oops", &params), "/x/1/{oops");
        assert_eq!(placeholders("/x/{id}/{oops"), vec!["id"]);
    }

    #[test]
    fn render_reports_first_missing_name() {
        let params = PathParams::new().with("petId", 3);
        let err = render("/pet/{petId}/{other}", &params).unwrap_err();
        assert!(matches!(err, ApiError::MissingPathParameter { ref name, ref template }
            if name == "other" && template == "/pet/{petId}/{other}"));
    }
}
