//! Namespaced attribute request matching.
//!
//! A specification is a comma separated list of `namespace:key`,
//! `namespace:*` or `*` tokens. Tokens that do not fit that shape are dropped
//! so that requests naming attributes from newer namespaces or typos never
//! fail the whole query.

use std::fmt;

/// Token that selects every namespace and key.
pub const WILDCARD: &str = "*";

#[derive(Clone, Debug, Eq, PartialEq)]
enum KeySelection {
    All,
    Keys(Vec<String>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct NamespaceRule {
    namespace: String,
    selection: KeySelection,
}

/// Parsed predicate over `(namespace, key)` pairs.
///
/// For a single namespace the matcher stores either a wildcard or a finite set
/// of explicit keys; a wildcard absorbs any keys named for the same namespace.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeMatcher {
    all: bool,
    rules: Vec<NamespaceRule>,
}

impl AttributeMatcher {
    /// Parses a specification string.
    ///
    /// An empty specification yields a matcher that matches nothing.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let mut matcher = Self::default();
        for token in spec.split(',') {
            matcher.add_token(token);
        }
        matcher
    }

    /// Adds a single token to the matcher, ignoring it when malformed.
    pub(crate) fn add_token(&mut self, token: &str) {
        match parse_token(token) {
            Some(Token::All) => {
                self.all = true;
            }
            Some(Token::Namespace(namespace)) => self.add_wildcard(namespace),
            Some(Token::Key(namespace, key)) => self.add_key(namespace, key),
            None => {}
        }
    }

    fn rule_mut(&mut self, namespace: &str) -> Option<&mut NamespaceRule> {
        self.rules
            .iter_mut()
            .find(|rule| rule.namespace == namespace)
    }

    fn rule(&self, namespace: &str) -> Option<&NamespaceRule> {
        self.rules.iter().find(|rule| rule.namespace == namespace)
    }

    fn add_wildcard(&mut self, namespace: &str) {
        if let Some(rule) = self.rule_mut(namespace) {
            rule.selection = KeySelection::All;
        } else {
            self.rules.push(NamespaceRule {
                namespace: namespace.to_owned(),
                selection: KeySelection::All,
            });
        }
    }

    fn add_key(&mut self, namespace: &str, key: &str) {
        match self.rule_mut(namespace) {
            Some(NamespaceRule {
                selection: KeySelection::All,
                ..
            }) => {}
            Some(NamespaceRule {
                selection: KeySelection::Keys(keys),
                ..
            }) => {
                if !keys.iter().any(|existing| existing == key) {
                    keys.push(key.to_owned());
                }
            }
            None => self.rules.push(NamespaceRule {
                namespace: namespace.to_owned(),
                selection: KeySelection::Keys(vec![key.to_owned()]),
            }),
        }
    }

    /// Reports whether the request covers `namespace:key`.
    ///
    /// `key` may be given bare (`context`) or qualified (`selinux:context`).
    #[must_use]
    pub fn matches(&self, namespace: &str, key: &str) -> bool {
        if self.all {
            return true;
        }
        let key = strip_namespace(namespace, key);
        match self.rule(namespace) {
            Some(NamespaceRule {
                selection: KeySelection::All,
                ..
            }) => true,
            Some(NamespaceRule {
                selection: KeySelection::Keys(keys),
                ..
            }) => keys.iter().any(|candidate| candidate == key),
            None => false,
        }
    }

    /// Reports whether the request covers at least one key of `namespace`.
    #[must_use]
    pub fn matches_namespace(&self, namespace: &str) -> bool {
        self.all || self.rule(namespace).is_some()
    }

    /// Reports whether every key of `namespace` was requested.
    #[must_use]
    pub fn enumerates_all(&self, namespace: &str) -> bool {
        self.all
            || matches!(
                self.rule(namespace),
                Some(NamespaceRule {
                    selection: KeySelection::All,
                    ..
                })
            )
    }

    /// Iterates over the keys explicitly named for `namespace`.
    ///
    /// Yields nothing when the namespace is covered by a wildcard; callers
    /// check [`enumerates_all`](Self::enumerates_all) first and list the
    /// namespace instead. Calling again restarts the sequence.
    pub fn explicit_keys<'a>(&'a self, namespace: &str) -> ExplicitKeys<'a> {
        let keys = if self.all {
            &[][..]
        } else {
            match self.rule(namespace) {
                Some(NamespaceRule {
                    selection: KeySelection::Keys(keys),
                    ..
                }) => keys.as_slice(),
                _ => &[][..],
            }
        };
        ExplicitKeys { inner: keys.iter() }
    }

    /// Iterates over every namespace named in the request, in request order.
    ///
    /// Unknown namespaces are included so callers can populate them.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.namespace.as_str())
    }

    /// Reports whether the global wildcard was given.
    #[must_use]
    pub const fn matches_all(&self) -> bool {
        self.all
    }

    /// Reports whether the matcher selects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.all && self.rules.is_empty()
    }
}

impl fmt::Display for AttributeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all {
            return f.write_str(WILDCARD);
        }
        let mut first = true;
        for rule in &self.rules {
            let keys: &[String] = match &rule.selection {
                KeySelection::All => &[],
                KeySelection::Keys(keys) => keys,
            };
            if matches!(rule.selection, KeySelection::All) {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{}:*", rule.namespace)?;
                first = false;
            }
            for key in keys {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{}:{key}", rule.namespace)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Iterator returned by [`AttributeMatcher::explicit_keys`].
#[derive(Clone, Debug)]
pub struct ExplicitKeys<'a> {
    inner: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for ExplicitKeys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ExplicitKeys<'_> {}

pub(crate) enum Token<'a> {
    All,
    Namespace(&'a str),
    Key(&'a str, &'a str),
}

/// Splits a token into its namespace and key.
///
/// Accepts `namespace:key` and the doubled `namespace::key` separator.
pub(crate) fn parse_token(token: &str) -> Option<Token<'_>> {
    let token = token.trim();
    if token == WILDCARD {
        return Some(Token::All);
    }
    let (namespace, rest) = token.split_once(':')?;
    let key = rest.strip_prefix(':').unwrap_or(rest);
    if namespace.is_empty() || key.is_empty() || namespace == WILDCARD {
        return None;
    }
    if key == WILDCARD {
        Some(Token::Namespace(namespace))
    } else {
        Some(Token::Key(namespace, key))
    }
}

fn strip_namespace<'k>(namespace: &str, key: &'k str) -> &'k str {
    key.strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix(':'))
        .map_or(key, |rest| rest.strip_prefix(':').unwrap_or(rest))
}
