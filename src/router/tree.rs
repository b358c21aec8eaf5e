//! Radix tree storage and matching for route patterns.
//!
//! One [`Tree`] holds every pattern registered for a single HTTP method.
//! Patterns are stored byte-wise in a compact prefix tree: literal runs
//! share nodes, and `{...}` tokens become parametric children that capture
//! slices of the request path at lookup time.
//!
//! ## Pattern syntax
//!
//! - Literal bytes match verbatim.
//! - `{name}` captures up to the next `/`, or up to the first byte for
//!   which the node has a literal child (which is what makes
//!   `{year}-{slug}` work).
//! - `{name?}` also matches when the input is exhausted, capturing `""`.
//! - `{name*}` captures the remainder of the path, `/` included, and must
//!   be the final token of its pattern.
//! - `{name:pattern}` captures the longest regex match anchored at the
//!   current position.
//!
//! ## Match selection
//!
//! Literal children are preferred over parametric children at every node.
//! When only parametric branches can match, the route with the lowest
//! insertion order wins; subtrees whose minimum order cannot beat the best
//! match found so far are pruned without being descended.
//!
//! Lookup never allocates for routes with at most [`MAX_INLINE_PARAMS`]
//! parameters: captured values are borrowed slices of the request path and
//! the speculative scratch copy used while exploring competing parametric
//! branches lives on the stack.

use std::sync::Arc;

use regex::bytes::Regex;
use smallvec::SmallVec;

use crate::error::RouterError;
use crate::handler::HandlerChain;

/// Maximum number of path parameters before heap allocation.
///
/// Most REST APIs have at most a handful of path params (e.g.
/// `/users/{id}/posts/{post_id}`); the speculative scratch buffer used
/// during lookup is a `SmallVec` sized by this constant so the hot path
/// stays allocation-free in the common case.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Routing tree for a single HTTP method.
pub struct Tree {
    root: Node,
    count: usize,
}

impl Tree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new_static(Vec::new()),
            count: 0,
        }
    }

    /// Insert a route pattern and its handler chain.
    ///
    /// Returns the number of named parameters in the pattern. The insertion
    /// counter is bumped once per call and becomes the route's priority:
    /// lower values win when overlapping parametric patterns compete for
    /// the same input. Registering the identical literal path twice is a
    /// silent no-op (the first registration wins).
    ///
    /// # Errors
    ///
    /// Fails when a wildcard token is followed by more pattern text, or
    /// when a `{name:pattern}` regex does not compile. Both are
    /// configuration mistakes surfaced at startup, never at match time.
    pub fn add(&mut self, pattern: &str, handlers: HandlerChain) -> Result<usize, RouterError> {
        self.count += 1;
        let inserted = self.root.add(pattern.as_bytes(), &handlers, self.count)?;
        // The root has an empty key, so insertion always finds a slot.
        Ok(inserted.unwrap_or(0))
    }

    /// Match a request path against the tree.
    ///
    /// Captured parameter values are written into `pvalues` as borrowed
    /// slices of `path`; the buffer must be at least as large as the
    /// largest parameter count across every registered route. Returns the
    /// matched handler chain and the ordered parameter names, or `None`
    /// when nothing matches — a no-match is a normal outcome, not an
    /// error.
    pub fn get<'p>(
        &self,
        path: &'p str,
        pvalues: &mut [&'p str],
    ) -> Option<(&HandlerChain, &[Arc<str>])> {
        let m = self.root.get(path.as_bytes(), pvalues)?;
        Some((m.handlers, m.pnames))
    }

    /// Number of `add` calls made against this tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether any route has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// A successful match inside the tree, carrying the route's priority so
/// callers can compare competing branches.
struct TreeMatch<'n> {
    handlers: &'n HandlerChain,
    pnames: &'n [Arc<str>],
    order: usize,
}

/// Static children indexed by their first key byte.
///
/// There is at most one static child per byte value; insertion conflicts
/// are resolved by node splitting before a slot is ever reused.
struct ByteChildren {
    slots: Vec<Option<Box<Node>>>,
}

impl ByteChildren {
    fn new() -> Self {
        Self {
            slots: (0..256).map(|_| None).collect(),
        }
    }

    #[inline]
    fn get(&self, byte: u8) -> Option<&Node> {
        self.slots[byte as usize].as_deref()
    }

    fn get_mut(&mut self, byte: u8) -> Option<&mut Node> {
        self.slots[byte as usize].as_deref_mut()
    }

    #[inline]
    fn contains(&self, byte: u8) -> bool {
        self.slots[byte as usize].is_some()
    }

    fn insert(&mut self, byte: u8, node: Node) -> &mut Node {
        self.slots[byte as usize].insert(Box::new(node))
    }
}

/// One vertex of the radix tree: either a literal byte run or a single
/// `{...}` token.
struct Node {
    /// Literal segment node; parametric nodes have this unset.
    is_static: bool,
    /// `{name?}` — matches the empty remainder, capturing `""`.
    optional: bool,
    /// `{name*}` — consumes the rest of the path.
    wildcard: bool,
    /// Literal bytes, or the raw token text for parametric nodes. Only
    /// consulted during insertion and (for static nodes) matching.
    key: Vec<u8>,
    /// Compiled `{name:pattern}` regex, anchored at the current position.
    regex: Option<Regex>,

    /// Handler chain when this node terminates a registered route.
    handlers: Option<HandlerChain>,
    /// Insertion order of the terminating route; lower wins among
    /// competing parametric branches.
    order: usize,
    /// Minimum order anywhere in this subtree, used to prune branches
    /// that cannot beat an already-found match.
    min_order: usize,

    children: ByteChildren,
    pchildren: Vec<Node>,

    /// Parameter names accumulated from the root down to this node. A
    /// parametric node's value slot is `pnames.len() - 1`.
    pnames: Vec<Arc<str>>,
}

impl Node {
    fn new_static(key: Vec<u8>) -> Self {
        Self {
            is_static: true,
            optional: false,
            wildcard: false,
            key,
            regex: None,
            handlers: None,
            order: 0,
            min_order: 0,
            children: ByteChildren::new(),
            pchildren: Vec::new(),
            pnames: Vec::new(),
        }
    }

    fn new_param(token: Vec<u8>) -> Self {
        Self {
            is_static: false,
            ..Self::new_static(token)
        }
    }

    /// Value-buffer slot of a parametric node.
    #[inline]
    fn slot(&self) -> usize {
        self.pnames.len() - 1
    }

    /// Insert `key` below this node.
    ///
    /// Returns `Ok(Some(param_count))` when the route was attached in this
    /// subtree, `Ok(None)` when the key diverges before this node's key is
    /// consumed and the caller should try a sibling instead.
    fn add(
        &mut self,
        key: &[u8],
        handlers: &HandlerChain,
        order: usize,
    ) -> Result<Option<usize>, RouterError> {
        let mut matched = 0;
        while matched < key.len() && matched < self.key.len() && key[matched] == self.key[matched] {
            matched += 1;
        }

        if matched == self.key.len() && matched == key.len() {
            // Exact node: first registration wins, duplicates are ignored.
            if self.handlers.is_none() {
                self.handlers = Some(handlers.clone());
                self.order = order;
            }
            return Ok(Some(self.pnames.len()));
        }

        if matched == self.key.len() {
            let child_key = &key[matched..];
            if let Some(lit) = self.children.get_mut(child_key[0]) {
                if let Some(count) = lit.add(child_key, handlers, order)? {
                    return Ok(Some(count));
                }
            }
            for pc in &mut self.pchildren {
                if let Some(count) = pc.add(child_key, handlers, order)? {
                    return Ok(Some(count));
                }
            }
            return self.add_child(child_key, handlers, order).map(Some);
        }

        if matched == 0 || !self.is_static {
            return Ok(None);
        }

        // Partial overlap on a static node: split off the old suffix into a
        // child carrying this node's handlers and children, truncate this
        // node to the common prefix, then retry the insertion from here.
        let rest = self.key.split_off(matched);
        let split = Node {
            is_static: true,
            optional: false,
            wildcard: false,
            key: rest,
            regex: self.regex.take(),
            handlers: self.handlers.take(),
            order: self.order,
            min_order: self.min_order,
            children: std::mem::replace(&mut self.children, ByteChildren::new()),
            pchildren: std::mem::take(&mut self.pchildren),
            pnames: self.pnames.clone(),
        };
        let first = split.key[0];
        self.children.insert(first, split);

        self.add(key, handlers, order)
    }

    /// Create the chain of nodes for `key` below this node, parsing the
    /// first `{...}` token found.
    fn add_child(
        &mut self,
        key: &[u8],
        handlers: &HandlerChain,
        order: usize,
    ) -> Result<usize, RouterError> {
        let (mut open, mut close) = (None, None);
        for (i, &b) in key.iter().enumerate() {
            match b {
                b'{' => open = Some(i),
                b'}' => {
                    if open.is_some() {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        let (Some(open), Some(close)) = (open, close) else {
            // Pure literal remainder.
            let mut lit = Node::new_static(key.to_vec());
            lit.min_order = order;
            lit.pnames = self.pnames.clone();
            lit.handlers = Some(handlers.clone());
            lit.order = order;
            let count = lit.pnames.len();
            self.children.insert(key[0], lit);
            return Ok(count);
        };

        if open > 0 {
            // Split the literal prefix off first, then parse the token
            // below it.
            let mut prefix = Node::new_static(key[..open].to_vec());
            prefix.min_order = order;
            prefix.pnames = self.pnames.clone();
            let prefix = self.children.insert(key[0], prefix);
            return prefix.add_child(&key[open..], handlers, order);
        }

        let token = &key[open..=close];
        let mut child = Node::new_param(token.to_vec());
        child.min_order = order;
        child.pnames = self.pnames.clone();

        // A leading `*` is relocated to the end so `{*name}` and `{name*}`
        // parse identically.
        let mut raw = token[1..token.len() - 1].to_vec();
        if raw.len() > 1 && raw[0] == b'*' {
            raw.remove(0);
            raw.push(b'*');
        }

        let (mut name, pattern) = match raw.iter().position(|&b| b == b':') {
            Some(colon) => (&raw[..colon], &raw[colon + 1..]),
            None => (&raw[..], &[][..]),
        };

        if let [rest @ .., b'?'] = name {
            child.optional = true;
            name = rest;
        }

        if let [rest @ .., b'*'] = name {
            child.wildcard = true;
            name = rest;
            if close + 1 != key.len() {
                return Err(RouterError::WildcardNotTerminal {
                    pattern: String::from_utf8_lossy(key).into_owned(),
                });
            }
        }

        if !pattern.is_empty() {
            let pattern = String::from_utf8_lossy(pattern);
            let anchored = format!("^{pattern}");
            child.regex = Some(Regex::new(&anchored).map_err(|source| {
                RouterError::InvalidRegex {
                    pattern: pattern.into_owned(),
                    source,
                }
            })?);
        }

        child
            .pnames
            .push(Arc::from(String::from_utf8_lossy(name).into_owned()));

        let count = if close + 1 == key.len() {
            child.handlers = Some(handlers.clone());
            child.order = order;
            child.pnames.len()
        } else {
            child.add_child(&key[close + 1..], handlers, order)?
        };

        self.pchildren.push(child);
        Ok(count)
    }

    /// Match `path` against this node and its subtree.
    ///
    /// Tentative captures from competing parametric branches are staged in
    /// a scratch copy of `pvalues` and committed only when the branch
    /// produced a strictly better match, so a failed deeper exploration
    /// never corrupts values already written for the best match so far.
    fn get<'n, 'p>(&'n self, path: &'p [u8], pvalues: &mut [&'p str]) -> Option<TreeMatch<'n>> {
        let mut node = self;
        let mut path = path;

        loop {
            // Whether a trailing `/` of a static key was forgiven because
            // the input ended right before it; only optional parameters may
            // complete such a match.
            let mut slash_elided = false;

            if node.is_static {
                if !path.starts_with(&node.key) {
                    if node.key.len() == path.len() + 1
                        && node.key.last() == Some(&b'/')
                        && node.key.starts_with(path)
                    {
                        slash_elided = true;
                        path = &path[path.len()..];
                    } else {
                        return None;
                    }
                } else {
                    path = &path[node.key.len()..];
                }
            } else if let Some(regex) = &node.regex {
                if path.is_empty() && node.optional {
                    pvalues[node.slot()] = "";
                } else if let Some(m) = regex.find(path) {
                    pvalues[node.slot()] = as_value(&path[..m.end()])?;
                    path = &path[m.end()..];
                } else {
                    return None;
                }
            } else if node.wildcard {
                pvalues[node.slot()] = as_value(path)?;
                path = &path[path.len()..];
            } else if path.is_empty() {
                if node.optional {
                    pvalues[node.slot()] = "";
                } else {
                    return None;
                }
            } else {
                let mut idx = 0;
                while idx < path.len() && path[idx] != b'/' {
                    if node.children.contains(path[idx]) {
                        break;
                    }
                    idx += 1;
                }
                pvalues[node.slot()] = as_value(&path[..idx])?;
                path = &path[idx..];
            }

            if !path.is_empty() {
                if let Some(lit) = node.children.get(path[0]) {
                    if node.pchildren.is_empty() {
                        // Purely literal fork: descend without recursing.
                        node = lit;
                        continue;
                    }
                    // A literal branch beats every parametric branch at
                    // this node, regardless of insertion order.
                    if let Some(m) = lit.get(path, pvalues) {
                        return Some(m);
                    }
                }
            } else if !slash_elided {
                if let Some(handlers) = &node.handlers {
                    return Some(TreeMatch {
                        handlers,
                        pnames: &node.pnames,
                        order: node.order,
                    });
                }
            }

            // Only parametric branches remain; the lowest insertion order
            // wins among those that can match.
            let mut best: Option<TreeMatch<'n>> = None;
            let mut best_order = usize::MAX;
            let mut scratch: Option<SmallVec<[&'p str; MAX_INLINE_PARAMS]>> = None;

            for pc in &node.pchildren {
                if pc.min_order >= best_order {
                    continue;
                }
                if slash_elided && !pc.optional {
                    continue;
                }
                if best.is_some() {
                    let tmp = scratch.get_or_insert_with(|| SmallVec::from_slice(pvalues));
                    if let Some(m) = pc.get(path, tmp) {
                        if m.order < best_order {
                            let slot = pc.slot();
                            pvalues[slot..].copy_from_slice(&tmp[slot..]);
                            best_order = m.order;
                            best = Some(m);
                        }
                    }
                } else if let Some(m) = pc.get(path, pvalues) {
                    if m.order < best_order {
                        best_order = m.order;
                        best = Some(m);
                    }
                }
            }

            return best;
        }
    }
}

/// Borrow a captured byte range back as `&str`.
///
/// The request path arrives as valid UTF-8; a capture can only fail the
/// conversion when a boundary byte picked by matching falls inside a
/// multi-byte character, in which case the branch is treated as a
/// non-match rather than slicing a char in half.
#[inline]
fn as_value(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes).ok()
}
