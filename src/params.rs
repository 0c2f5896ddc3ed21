//! Path parameters extracted from a matched route.

use std::str::FromStr;

use crate::error::Error;

/// Values captured by `{name}` segments, in template order.
///
/// For a route `/posts/{post_id}/edit` dispatched at `/posts/42/edit`:
///
/// ```rust
/// # use kiln::PathParams;
/// let params: PathParams = [("post_id", "42")].into_iter().collect();
/// assert_eq!(params.get("post_id"), Some("42"));
/// assert_eq!(params.parse::<u64>("post_id").unwrap(), 42);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Raw string value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parses a parameter into `T`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, Error> {
        let value = self.get(name).ok_or_else(|| Error::MissingParam(name.to_owned()))?;
        value.parse().map_err(|_| Error::InvalidParam {
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
