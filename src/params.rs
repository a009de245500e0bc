//! Path parameters extracted by the router.

/// Named path segments of a matched route, in pattern order.
///
/// For a route `/users/{id}/posts/{post}` matched against `/users/7/posts/9`:
///
/// ```rust
/// # use restwire::Params;
/// # let params = Params::from_iter([("id", "7"), ("post", "9")]);
/// assert_eq!(params.get("id"), Some("7"));
/// assert_eq!(params.get("post"), Some("9"));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&matchit::Params<'_, '_>> for Params {
    fn from(params: &matchit::Params<'_, '_>) -> Self {
        params.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_pattern_order() {
        let p = Params::from_iter([("b", "2"), ("a", "1")]);
        let names: Vec<_> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn converts_from_matchit() {
        let mut tree = matchit::Router::new();
        tree.insert("/users/{id}/files/{*path}", ()).unwrap();
        let matched = tree.at("/users/42/files/a/b.txt").unwrap();

        let params = Params::from(&matched.params);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("path"), Some("a/b.txt"));
    }

    #[test]
    fn empty_by_default() {
        assert!(Params::new().is_empty());
    }
}
