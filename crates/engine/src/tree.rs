//! Profile tree reconstruction
//!
//! Records only know their parent token and their immediate child tokens.
//! [`TreeBuilder`] follows those tokens through the backend and assembles
//! a [`ProfileTree`]: an arena holding one node per token, linked by
//! [`NodeId`].
//!
//! ## Resolution order
//!
//! 1. The requested record becomes the root node.
//! 2. Parent chain: each recorded parent is fetched in turn. A missing
//!    parent ends the chain and the reference is dropped.
//! 3. Children: starting from the topmost ancestor, every listed child is
//!    fetched and expanded depth-first. Missing children are skipped; a
//!    child resolved under a node gets that node as its parent.
//! 4. Each profile's `parent` and `children` are rewritten from the
//!    resolved links, so a dropped reference is gone from the profile too.
//!
//! Expansion runs on an explicit frame stack, so deep chains do not grow
//! the call stack.
//!
//! ## Cycles
//!
//! Before descending into a token the builder checks the current
//! resolution path (the ancestor chain plus the descent stack). Meeting a
//! token already on that path fails with [`Error::CyclicData`]. A token
//! listed under two different nodes is linked under both but expanded
//! once.

use profiler_core::{Error, KeyNamer, Profile, ProfileRecord, Result};
use profiler_storage::CacheBackend;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

/// Index of a node inside a [`ProfileTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A profile with its resolved links
#[derive(Debug, Clone)]
pub struct ProfileNode {
    /// The decoded profile
    pub profile: Profile,
    /// Resolved parent, `None` at the top or when the parent is gone
    pub parent: Option<NodeId>,
    /// Resolved children, in record order
    pub children: Vec<NodeId>,
}

/// A profile and its reachable relatives
#[derive(Debug, Clone)]
pub struct ProfileTree {
    nodes: Vec<ProfileNode>,
    by_token: FxHashMap<String, NodeId>,
    root: NodeId,
}

impl ProfileTree {
    /// The node that was requested
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The requested profile
    pub fn root_profile(&self) -> &Profile {
        &self.nodes[self.root.0].profile
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &ProfileNode {
        &self.nodes[id.0]
    }

    /// Profile by id
    pub fn profile(&self, id: NodeId) -> &Profile {
        &self.nodes[id.0].profile
    }

    /// Resolved parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Resolved children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Look up a node by token
    pub fn find(&self, token: &str) -> Option<NodeId> {
        self.by_token.get(token).copied()
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            if parent == id || ancestors.contains(&parent) {
                break;
            }
            ancestors.push(parent);
            current = self.nodes[parent.0].parent;
        }
        ancestors
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ProfileNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }
}

/// Rebuilds a [`ProfileTree`] from per-token records
pub struct TreeBuilder<'a> {
    backend: &'a dyn CacheBackend,
    namer: &'a KeyNamer,
    nodes: Vec<ProfileNode>,
    by_token: FxHashMap<String, NodeId>,
    expanded: FxHashSet<NodeId>,
    misses: FxHashSet<String>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder reading through `backend`
    pub fn new(backend: &'a dyn CacheBackend, namer: &'a KeyNamer) -> Self {
        Self {
            backend,
            namer,
            nodes: Vec::new(),
            by_token: FxHashMap::default(),
            expanded: FxHashSet::default(),
            misses: FxHashSet::default(),
        }
    }

    /// Build the tree around `token`, whose record was already fetched
    pub fn build(mut self, token: &str, record: ProfileRecord) -> Result<ProfileTree> {
        let root = self.add_node(token, &record, None);

        // Parent chain, nearest first
        let mut chain = vec![root];
        let mut current = root;
        let mut next = record.parent_token().map(str::to_string);
        while let Some(parent_token) = next.take() {
            if self.by_token.contains_key(&parent_token) {
                return Err(Error::CyclicData { token: parent_token });
            }
            let Some(parent_record) = self.fetch(&parent_token)? else {
                debug!(token, parent = %parent_token, "parent record missing, dropping reference");
                break;
            };
            let parent = self.add_node(&parent_token, &parent_record, None);
            self.nodes[current.0].parent = Some(parent);
            chain.push(parent);
            current = parent;
            next = parent_record.parent_token().map(str::to_string);
        }

        // Children, from the topmost ancestor down
        let mut on_path: FxHashSet<NodeId> = FxHashSet::default();
        for &id in chain.iter().rev() {
            if !self.expanded.contains(&id) {
                self.expand(id, &mut on_path)?;
            }
            on_path.insert(id);
        }

        self.apply_resolved_links();
        Ok(ProfileTree {
            nodes: self.nodes,
            by_token: self.by_token,
            root,
        })
    }

    /// Depth-first expansion with an explicit frame stack
    ///
    /// `on_path` holds the ancestors above `start`; frames push and pop
    /// their own node as they are entered and left.
    fn expand(&mut self, start: NodeId, on_path: &mut FxHashSet<NodeId>) -> Result<()> {
        self.expanded.insert(start);
        on_path.insert(start);
        let mut frames: Vec<(NodeId, usize)> = vec![(start, 0)];

        while let Some(frame) = frames.last_mut() {
            let (id, next) = *frame;
            let Some(child_token) = self.nodes[id.0].profile.children.get(next).cloned() else {
                on_path.remove(&id);
                frames.pop();
                continue;
            };
            frame.1 += 1;

            let child = match self.by_token.get(&child_token) {
                Some(&existing) => {
                    if on_path.contains(&existing) {
                        return Err(Error::CyclicData { token: child_token });
                    }
                    self.nodes[id.0].children.push(existing);
                    if self.expanded.contains(&existing) {
                        continue;
                    }
                    existing
                }
                None => {
                    let Some(child_record) = self.fetch(&child_token)? else {
                        debug!(parent = %self.nodes[id.0].profile.token, child = %child_token, "child record missing, skipping");
                        continue;
                    };
                    let child = self.add_node(&child_token, &child_record, Some(id));
                    self.nodes[id.0].children.push(child);
                    child
                }
            };

            self.expanded.insert(child);
            on_path.insert(child);
            frames.push((child, 0));
        }
        Ok(())
    }

    /// Make each profile's parent and children agree with its resolved
    /// links, so dropped references do not survive a read
    fn apply_resolved_links(&mut self) {
        for i in 0..self.nodes.len() {
            let parent = self.nodes[i]
                .parent
                .map(|p| self.nodes[p.0].profile.token.clone());
            let children = self.nodes[i]
                .children
                .iter()
                .map(|c| self.nodes[c.0].profile.token.clone())
                .collect();
            let profile = &mut self.nodes[i].profile;
            profile.parent = parent;
            profile.children = children;
        }
    }

    fn add_node(&mut self, token: &str, record: &ProfileRecord, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ProfileNode {
            profile: record.decode(token),
            parent,
            children: Vec::new(),
        });
        self.by_token.insert(token.to_string(), id);
        id
    }

    /// Fetch and decode a record; misses, backend failures, corrupt
    /// records and tokens that cannot name a record all read as `None`
    fn fetch(&mut self, token: &str) -> Result<Option<ProfileRecord>> {
        if self.misses.contains(token) {
            return Ok(None);
        }
        let key = match self.namer.item_key(token) {
            Ok(key) => key,
            Err(e) if e.is_invalid_token() => {
                warn!(token, error = %e, "unresolvable relative token");
                self.misses.insert(token.to_string());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let record = match self.backend.get(&key) {
            Ok(Some(bytes)) => match ProfileRecord::from_bytes(&bytes) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key = %key, error = %e, "undecodable profile record");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(backend = self.backend.name(), key = %key, error = %e, "profile fetch failed");
                None
            }
        };
        if record.is_none() {
            self.misses.insert(token.to_string());
        }
        Ok(record)
    }
}
