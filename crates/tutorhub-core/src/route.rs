//! Route access table.
//!
//! Maps location patterns to the access level a view needs. Patterns are
//! slash-separated segments where `:name` matches any single segment and a
//! trailing `*` matches the rest of the path (including nothing). A `*`
//! anywhere else is an ordinary literal segment.

use serde::{Deserialize, Serialize};

use crate::guard::RouteRequirements;

/// Access level of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAccess {
    Public,
    /// Only reachable while logged out (login, registration).
    GuestOnly,
    Authenticated,
    /// Requires the privileged (teacher) role.
    Privileged,
}

impl RouteAccess {
    /// Requirements handed to the protected-route guard.
    ///
    /// `GuestOnly` has none because it is handled by the guest guard.
    pub fn requirements(self) -> RouteRequirements {
        match self {
            Self::Public | Self::GuestOnly => RouteRequirements::PUBLIC,
            Self::Authenticated => RouteRequirements::AUTHENTICATED,
            Self::Privileged => RouteRequirements::PRIVILEGED,
        }
    }
}

/// A single `pattern = access` entry, as written in config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub pattern: String,
    pub access: RouteAccess,
}

impl RouteRule {
    pub fn new(pattern: impl Into<String>, access: RouteAccess) -> Self {
        Self {
            pattern: pattern.into(),
            access,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Rest,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    segments: Vec<Segment>,
    access: RouteAccess,
}

impl CompiledRule {
    fn compile(rule: &RouteRule) -> Self {
        let count = split_path(&rule.pattern).count();
        let segments = split_path(&rule.pattern)
            .enumerate()
            .map(|(index, segment)| match segment {
                "*" if index + 1 == count => Segment::Rest,
                s if s.starts_with(':') => Segment::Param,
                s => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            segments,
            access: rule.access,
        }
    }

    fn matches(&self, path: &[&str]) -> bool {
        let mut index = 0;
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Param => {
                    if index >= path.len() {
                        return false;
                    }
                }
                Segment::Literal(expected) => {
                    if path.get(index) != Some(&expected.as_str()) {
                        return false;
                    }
                }
            }
            index += 1;
        }
        index == path.len()
    }
}

/// Ordered list of route rules; the first matching rule wins and unmatched
/// locations are public.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<CompiledRule>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from rules in priority order.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a RouteRule>) -> Self {
        Self {
            rules: rules.into_iter().map(CompiledRule::compile).collect(),
        }
    }

    /// Appends a rule with the lowest priority so far.
    pub fn with_rule(mut self, pattern: &str, access: RouteAccess) -> Self {
        self.rules
            .push(CompiledRule::compile(&RouteRule::new(pattern, access)));
        self
    }

    /// The marketplace's views.
    pub fn marketplace() -> Self {
        Self::from_rules(&default_rules())
    }

    /// The marketplace's views, preceded by `overrides`.
    pub fn marketplace_with(overrides: &[RouteRule]) -> Self {
        let rules: Vec<RouteRule> = overrides.iter().cloned().chain(default_rules()).collect();
        Self::from_rules(&rules)
    }

    /// Resolves the access level of a location (query and fragment ignored).
    pub fn resolve(&self, location: &str) -> RouteAccess {
        let path: Vec<&str> = split_path(strip_query(location)).collect();
        self.rules
            .iter()
            .find(|rule| rule.matches(&path))
            .map(|rule| rule.access)
            .unwrap_or(RouteAccess::Public)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn default_rules() -> Vec<RouteRule> {
    vec![
        RouteRule::new("/login", RouteAccess::GuestOnly),
        RouteRule::new("/register", RouteAccess::GuestOnly),
        RouteRule::new("/teacher/onboarding", RouteAccess::Authenticated),
        RouteRule::new("/teacher/*", RouteAccess::Privileged),
        RouteRule::new("/courses/:id/reviews/new", RouteAccess::Authenticated),
        RouteRule::new("/user/*", RouteAccess::Authenticated),
    ]
}

/// Path part of a location.
pub fn strip_query(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_table() {
        let table = RouteTable::marketplace();

        assert_eq!(table.resolve("/"), RouteAccess::Public);
        assert_eq!(table.resolve("/search?q=guitar"), RouteAccess::Public);
        assert_eq!(table.resolve("/courses/42"), RouteAccess::Public);
        assert_eq!(table.resolve("/login"), RouteAccess::GuestOnly);
        assert_eq!(table.resolve("/register/"), RouteAccess::GuestOnly);
        assert_eq!(table.resolve("/user"), RouteAccess::Authenticated);
        assert_eq!(table.resolve("/user/reviews#latest"), RouteAccess::Authenticated);
        assert_eq!(table.resolve("/courses/42/reviews/new"), RouteAccess::Authenticated);
        assert_eq!(table.resolve("/teacher/onboarding"), RouteAccess::Authenticated);
        assert_eq!(table.resolve("/teacher/dashboard"), RouteAccess::Privileged);
        assert_eq!(table.resolve("/teacher/courses/7/edit"), RouteAccess::Privileged);
    }

    #[test]
    fn test_param_matches_exactly_one_segment() {
        let table = RouteTable::new().with_rule("/courses/:id", RouteAccess::Authenticated);

        assert_eq!(table.resolve("/courses/1"), RouteAccess::Authenticated);
        assert_eq!(table.resolve("/courses"), RouteAccess::Public);
        assert_eq!(table.resolve("/courses/1/extra"), RouteAccess::Public);
    }

    #[test]
    fn test_inner_star_is_literal() {
        let table = RouteTable::new().with_rule("/a/*/b", RouteAccess::Privileged);

        assert_eq!(table.resolve("/a/x/y"), RouteAccess::Public);
        assert_eq!(table.resolve("/a/x/b"), RouteAccess::Public);
        assert_eq!(table.resolve("/a/*/b"), RouteAccess::Privileged);
    }

    #[test]
    fn test_overrides_take_priority() {
        let overrides = vec![RouteRule::new("/teacher/dashboard", RouteAccess::Authenticated)];
        let table = RouteTable::marketplace_with(&overrides);

        assert_eq!(table.resolve("/teacher/dashboard"), RouteAccess::Authenticated);
        assert_eq!(table.resolve("/teacher/courses"), RouteAccess::Privileged);
    }

    #[test]
    fn test_requirements() {
        assert_eq!(RouteAccess::GuestOnly.requirements(), RouteRequirements::PUBLIC);
        assert_eq!(RouteAccess::Privileged.requirements(), RouteRequirements::PRIVILEGED);
    }

    #[test]
    fn test_rule_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            rules: Vec<RouteRule>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[rules]]
            pattern = "/admin/*"
            access = "privileged"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.rules, vec![RouteRule::new("/admin/*", RouteAccess::Privileged)]);
    }
}
