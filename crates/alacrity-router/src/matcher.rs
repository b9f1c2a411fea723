//! Template compilation and path matching.
//!
//! A [`PathMatcher`] owns every route registered under one grouping key
//! (typically one HTTP method). Literal templates go into a hash map and
//! match in O(1); parametric templates are compiled to anchored capturing
//! regexes and scanned in registration order.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use crate::params::Params;

/// A template that could not be compiled into a matcher.
///
/// Surfaces at registration time, never during lookup.
#[derive(Debug, Error)]
#[error("route template {template:?} did not compile: {source}")]
pub struct PatternError {
    /// The offending template.
    pub template: String,
    /// The underlying regex compilation error.
    #[source]
    pub source: regex::Error,
}

/// Identity of a registered route within its matcher.
///
/// Used to reverse a registration; removal matches on this id, not on a
/// re-parse of the template string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(u64);

/// A successful lookup.
///
/// Borrows the matched route's template name and payload from the owning
/// matcher, and owns the queried path, the query tail, and the raw captured
/// variables.
#[derive(Debug)]
pub struct Matched<'r, T> {
    pub(crate) path: String,
    pub(crate) name: &'r str,
    pub(crate) tail: String,
    pub(crate) vars: Params,
    pub(crate) payload: &'r T,
    pub(crate) id: RouteId,
}

impl<'r, T> Matched<'r, T> {
    /// The queried path, query excluded.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The template that matched.
    #[must_use]
    pub fn name(&self) -> &'r str {
        self.name
    }

    /// Everything after `?` in the queried path (empty when absent).
    #[must_use]
    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Raw captured variables; empty for a literal match.
    #[must_use]
    pub fn vars(&self) -> &Params {
        &self.vars
    }

    /// The payload stored at registration.
    #[must_use]
    pub fn payload(&self) -> &'r T {
        self.payload
    }

    /// The registered route's identity.
    #[must_use]
    pub fn id(&self) -> RouteId {
        self.id
    }
}

struct LiteralEntry<T> {
    id: RouteId,
    payload: T,
}

struct PatternEntry<T> {
    id: RouteId,
    template: String,
    regex: Regex,
    var_names: Vec<String>,
    payload: T,
}

/// Literal + parametric route index for a single grouping key.
pub struct PathMatcher<T> {
    literals: HashMap<String, LiteralEntry<T>>,
    patterns: Vec<PatternEntry<T>>,
    next_id: u64,
}

impl<T> Default for PathMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathMatcher<T> {
    /// Creates an empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            literals: HashMap::new(),
            patterns: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers `template` with its payload.
    ///
    /// Templates without a `/:` segment are literal and replace any earlier
    /// registration of the same string. Parametric templates are appended to
    /// the scan list, so earlier registrations win on overlap.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the compiled pattern is rejected by the
    /// regex engine.
    pub fn add(&mut self, template: &str, payload: T) -> Result<RouteId, PatternError> {
        let id = RouteId(self.next_id);
        self.next_id += 1;

        if template.contains("/:") {
            let (regex, var_names) = compile_template(template)?;
            self.patterns.push(PatternEntry {
                id,
                template: template.to_string(),
                regex,
                var_names,
                payload,
            });
        } else {
            self.literals
                .insert(template.to_string(), LiteralEntry { id, payload });
        }
        Ok(id)
    }

    /// Looks up a request path, which may carry a `?query` suffix.
    ///
    /// The query fragment is split off and retained as the match tail; it
    /// never participates in matching. A miss returns `None` — callers
    /// distinguish not-found from error.
    #[must_use]
    pub fn lookup(&self, target: &str) -> Option<Matched<'_, T>> {
        let (path, tail) = match target.split_once('?') {
            Some((path, tail)) => (path, tail),
            None => (target, ""),
        };

        if let Some((name, entry)) = self.literals.get_key_value(path) {
            return Some(Matched {
                path: path.to_string(),
                name: name.as_str(),
                tail: tail.to_string(),
                vars: Params::new(),
                payload: &entry.payload,
                id: entry.id,
            });
        }

        for entry in &self.patterns {
            if let Some(caps) = entry.regex.captures(path) {
                let mut vars = Params::new();
                for (i, name) in entry.var_names.iter().enumerate() {
                    if let Some(value) = caps.get(i + 1) {
                        vars.push(name.clone(), value.as_str());
                    }
                }
                return Some(Matched {
                    path: path.to_string(),
                    name: &entry.template,
                    tail: tail.to_string(),
                    vars,
                    payload: &entry.payload,
                    id: entry.id,
                });
            }
        }

        None
    }

    /// Removes the route registered under `id`, returning its payload.
    pub fn remove(&mut self, id: RouteId) -> Option<T> {
        if let Some(template) = self
            .literals
            .iter()
            .find_map(|(k, e)| (e.id == id).then(|| k.clone()))
        {
            return self.literals.remove(&template).map(|e| e.payload);
        }
        self.patterns
            .iter()
            .position(|e| e.id == id)
            .map(|i| self.patterns.remove(i).payload)
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }

    /// Returns `true` when no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.patterns.is_empty()
    }
}

/// Compiles a parametric template into an anchored capturing regex plus the
/// ordered capture names.
///
/// Each `/:<name>` segment becomes `/([^/]*)`; literal text in between is
/// escaped so metacharacters (a bare `)` in particular) cannot corrupt the
/// pattern. The trailing group lets the path continue past `/` or `?` without
/// affecting the match.
fn compile_template(template: &str) -> Result<(Regex, Vec<String>), PatternError> {
    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push('^');

    let mut names = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find("/:") {
        pattern.push_str(&regex::escape(&rest[..pos]));
        pattern.push_str("/([^/]*)");

        let seg = &rest[pos + 2..];
        let end = seg.find('/').unwrap_or(seg.len());
        names.push(seg[..end].to_string());
        rest = &seg[end..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push_str("([/?].*)?$");

    let regex = Regex::new(&pattern).map_err(|source| PatternError {
        template: template.to_string(),
        source,
    })?;
    Ok((regex, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_lookup() {
        let mut m = PathMatcher::new();
        m.add("/status", 1).unwrap();

        let hit = m.lookup("/status").unwrap();
        assert_eq!(hit.name(), "/status");
        assert_eq!(*hit.payload(), 1);
        assert!(hit.vars().is_empty());

        assert!(m.lookup("/status/extra").is_none());
    }

    #[test]
    fn test_parametric_capture_and_tail() {
        let mut m = PathMatcher::new();
        m.add("/:a/:b/echo", "echo").unwrap();

        let hit = m.lookup("/1/2/echo?x=9").unwrap();
        assert_eq!(hit.path(), "/1/2/echo");
        assert_eq!(hit.name(), "/:a/:b/echo");
        assert_eq!(hit.vars().get("a"), Some("1"));
        assert_eq!(hit.vars().get("b"), Some("2"));
        assert_eq!(hit.tail(), "x=9");
    }

    #[test]
    fn test_tail_retained_for_literals() {
        let mut m = PathMatcher::new();
        m.add("/ping", ()).unwrap();

        let hit = m.lookup("/ping?a=1&b=2").unwrap();
        assert_eq!(hit.tail(), "a=1&b=2");
    }

    #[test]
    fn test_trailing_suffix_tolerated() {
        let mut m = PathMatcher::new();
        m.add("/a/:b", ()).unwrap();

        assert!(m.lookup("/a/5").is_some());
        assert!(m.lookup("/a/5/").is_some());
        assert!(m.lookup("/a/5/zed").is_some());
        assert!(m.lookup("/a/5?x=1").is_some());
        // No segment boundary before "extra", so this is a different path.
        assert!(m.lookup("/ab/5").is_none());
    }

    #[test]
    fn test_metacharacters_in_literal_text_are_escaped() {
        let mut m = PathMatcher::new();
        m.add("/foo)bar/:id", ()).unwrap();

        let hit = m.lookup("/foo)bar/42").unwrap();
        assert_eq!(hit.vars().get("id"), Some("42"));
        assert!(m.lookup("/fooXbar/42").is_none());

        // The full metacharacter gauntlet must compile, `)` included.
        m.add("/a.b[c(d*e+f{g|h\\i^j$k=l/:v", ()).unwrap();
        let hit = m.lookup("/a.b[c(d*e+f{g|h\\i^j$k=l/ok").unwrap();
        assert_eq!(hit.vars().get("v"), Some("ok"));
        // Escaped "." matches only a literal dot.
        assert!(m.lookup("/aXb[c(d*e+f{g|h\\i^j$k=l/ok").is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        let mut m = PathMatcher::new();
        m.add("/:x/special", "specific").unwrap();
        m.add("/:x/:y", "general").unwrap();

        assert_eq!(*m.lookup("/a/special").unwrap().payload(), "specific");
        assert_eq!(*m.lookup("/a/other").unwrap().payload(), "general");
    }

    #[test]
    fn test_registration_order_not_specificity() {
        let mut m = PathMatcher::new();
        m.add("/:x/:y", "general").unwrap();
        m.add("/:x/special", "specific").unwrap();

        // The general pattern was registered first, so it shadows the
        // specific one. Explicit policy: callers order their registrations.
        assert_eq!(*m.lookup("/a/special").unwrap().payload(), "general");
    }

    #[test]
    fn test_capture_stops_at_slash() {
        let mut m = PathMatcher::new();
        m.add("/kid/:k/bar", ()).unwrap();

        let hit = m.lookup("/kid/one/bar").unwrap();
        assert_eq!(hit.vars().get("k"), Some("one"));
        assert!(m.lookup("/kid/one/two/bar").is_none());
    }

    #[test]
    fn test_remove_literal_and_pattern() {
        let mut m = PathMatcher::new();
        let lit = m.add("/fixed", 1).unwrap();
        let pat = m.add("/fixed/:id", 2).unwrap();
        assert_eq!(m.len(), 2);

        assert_eq!(m.remove(lit), Some(1));
        assert!(m.lookup("/fixed").is_none());
        assert!(m.lookup("/fixed/9").is_some());

        assert_eq!(m.remove(pat), Some(2));
        assert!(m.lookup("/fixed/9").is_none());
        assert!(m.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut m = PathMatcher::new();
        let id = m.add("/here", ()).unwrap();
        m.remove(id);
        assert_eq!(m.remove(id), None);
    }

    #[test]
    fn test_lookup_is_pure() {
        let mut m = PathMatcher::new();
        m.add("/:a/:b", ()).unwrap();

        let first = m.lookup("/x/y?q=1").map(|h| (h.name().to_string(), h.tail().to_string()));
        let second = m.lookup("/x/y?q=1").map(|h| (h.name().to_string(), h.tail().to_string()));
        assert_eq!(first, second);
    }
}
