//! Segment trie: the route table.
//!
//! Patterns are split on `/` (empty tokens skipped) and each segment becomes
//! one level of the trie:
//!
//! ```text
//!  Syntax    Type
//!  users     literal segment
//!  {id}      named parameter, matches exactly one segment
//!  *         wildcard, matches one or more trailing segments
//! ```
//!
//! Lookup walks the path one segment at a time and at every level tries, in
//! order, the literal child, the parameter child and the wildcard child. The
//! first two recurse and backtrack on a dead end, so the most specific full
//! match always wins:
//!
//! ```text
//!  Routes:  /users/*   /users/delete/{id}   /users/new
//!
//!  /users/new            → /users/new
//!  /users/delete/23      → /users/delete/{id}    id = "23"
//!  /users/delete         → /users/*              (delete/ is not terminal)
//!  /users/delete/23/foo  → /users/*              (backtracked out of delete/)
//!  /users                → no match              (* needs a segment)
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::RouteError;
use crate::handler::BoxedHandler;
use crate::method::{Method, MethodTable};

/// Parameter name under which a wildcard stores the part of the path it consumed.
pub(crate) const WILDCARD: &str = "*";

enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
    Wildcard,
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str, pattern: &str) -> Result<Self, RouteError> {
        if raw == WILDCARD {
            return Ok(Self::Wildcard);
        }
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some("") => Err(RouteError::EmptyParam { pattern: pattern.to_owned() }),
            Some(name) => Ok(Self::Param(name)),
            None => Ok(Self::Literal(raw)),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

pub(crate) struct Node {
    segment: String,
    children: HashMap<String, Node>,
    param: Option<Box<Node>>,
    wildcard: Option<Box<Node>>,
    handlers: MethodTable,
    pattern: Option<String>,
    allow: OnceLock<String>,
}

impl Node {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_owned(),
            children: HashMap::new(),
            param: None,
            wildcard: None,
            handlers: MethodTable::default(),
            pattern: None,
            allow: OnceLock::new(),
        }
    }

    fn child_or_insert(&mut self, seg: Segment<'_>, pattern: &str) -> Result<&mut Node, RouteError> {
        match seg {
            Segment::Literal(s) => Ok(self
                .children
                .entry(s.to_owned())
                .or_insert_with(|| Node::new(s))),
            Segment::Param(name) => {
                let child = self.param.get_or_insert_with(|| Box::new(Node::new(name)));
                if child.segment != name {
                    return Err(RouteError::ParamConflict {
                        pattern: pattern.to_owned(),
                        existing: child.segment.clone(),
                        name: name.to_owned(),
                    });
                }
                Ok(&mut **child)
            }
            Segment::Wildcard => {
                let child = self.wildcard.get_or_insert_with(|| Box::new(Node::new(WILDCARD)));
                Ok(&mut **child)
            }
        }
    }

    fn is_terminal(&self) -> bool {
        !self.handlers.is_empty()
    }

    pub(crate) fn handler(&self, method: Method) -> Option<&BoxedHandler> {
        self.handlers.get(method)
    }

    /// The pattern last registered at this node.
    pub(crate) fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Value for the `Allow` header: registered methods plus `OPTIONS`,
    /// sorted and joined with `", "`. Computed on first use.
    pub(crate) fn allow(&self) -> &str {
        self.allow.get_or_init(|| {
            let mut methods: Vec<&str> = self.handlers.methods().map(Method::as_str).collect();
            if self.handlers.get(Method::Options).is_none() {
                methods.push(Method::Options.as_str());
            }
            methods.sort_unstable();
            methods.join(", ")
        })
    }

    fn find<'t, 'p>(
        &'t self,
        path: &'p str,
        pos: usize,
        params: &mut Vec<(&'t str, &'p str)>,
    ) -> Option<&'t Node> {
        let rest = &path[pos..];
        let start = pos + (rest.len() - rest.trim_start_matches('/').len());
        if start == path.len() {
            return self.is_terminal().then_some(self);
        }

        let end = path[start..].find('/').map_or(path.len(), |i| start + i);
        let segment = &path[start..end];

        if let Some(found) = self.children.get(segment).and_then(|c| c.find(path, end, params)) {
            return Some(found);
        }

        if let Some(child) = &self.param {
            params.push((child.segment.as_str(), segment));
            if let Some(found) = child.find(path, end, params) {
                return Some(found);
            }
            params.pop();
        }

        match &self.wildcard {
            Some(child) if child.is_terminal() => {
                params.push((WILDCARD, path[start..].trim_end_matches('/')));
                Some(child)
            }
            _ => None,
        }
    }
}

/// A successful lookup.
pub(crate) struct Match<'t, 'p> {
    pub(crate) node: &'t Node,
    pub(crate) params: Vec<(&'t str, &'p str)>,
}

pub(crate) struct Trie {
    root: Node,
}

impl Trie {
    pub(crate) fn new() -> Self {
        Self { root: Node::new("/") }
    }

    /// Stores `handler` at `pattern` for each of `methods`, replacing any
    /// handler already registered there for the same method.
    pub(crate) fn insert(
        &mut self,
        pattern: &str,
        methods: &[Method],
        handler: BoxedHandler,
    ) -> Result<(), RouteError> {
        let segs: Vec<&str> = segments(pattern).collect();
        let mut node = &mut self.root;
        for (i, raw) in segs.iter().enumerate() {
            let seg = Segment::parse(raw, pattern)?;
            if matches!(seg, Segment::Wildcard) && i + 1 != segs.len() {
                return Err(RouteError::WildcardNotLast { pattern: pattern.to_owned() });
            }
            node = node.child_or_insert(seg, pattern)?;
        }

        for &method in methods {
            node.handlers.insert(method, Arc::clone(&handler));
        }
        node.pattern = Some(pattern.to_owned());
        node.allow = OnceLock::new();
        Ok(())
    }

    pub(crate) fn lookup<'t, 'p>(&'t self, path: &'p str) -> Option<Match<'t, 'p>> {
        let mut params = Vec::new();
        let node = self.root.find(path, 0, &mut params)?;
        Some(Match { node, params })
    }
}
