//! Model node hierarchies.
//!
//! Nodes live in an arena and link to each other by [`NodeId`]. A node is
//! decoded once per address; a child or sibling pointer back to an address
//! already seen links to the existing node, so cyclic input terminates.

use std::collections::{HashMap, HashSet};

use bincode::{Decode, Encode};
use bitflags::bitflags;

use crate::ninja::{label, Attach, DecodeError, ImageView, LabelSet, ModelFormat, Result};

pub const OBJECT_SIZE: usize = 0x34;

/// Upper bound on nodes in one hierarchy
pub const MAX_NODES: usize = 0x4000;

bitflags! {
    /// NJS_OBJECT evaluation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObjectFlags: u32 {
        const NO_POSITION = 0x0001;
        const NO_ROTATE = 0x0002;
        const NO_SCALE = 0x0004;
        const NO_DISPLAY = 0x0008;
        const NO_CHILDREN = 0x0010;
        const ROTATE_ZYX = 0x0020;
        const NO_ANIMATE = 0x0040;
        const NO_MORPH = 0x0080;
        const CLIP = 0x0100;
        const MODIFIER = 0x0200;
        const QUATERNION = 0x0400;
        const ROTATE_BASE = 0x0800;
        const ROTATE_SET = 0x1000;
        const ENVELOPE = 0x2000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Node {
    pub label: String,
    pub flags: u32,
    /// Index into [`Model::attaches`]
    pub attach: Option<u32>,
    pub position: [f32; 3],
    pub angle: [i32; 3],
    pub scale: [f32; 3],
    pub child: Option<NodeId>,
    pub sibling: Option<NodeId>,
}

impl Node {
    fn empty(label: String) -> Self {
        Self {
            label,
            flags: 0,
            attach: None,
            position: [0.0; 3],
            angle: [0; 3],
            scale: [1.0; 3],
            child: None,
            sibling: None,
        }
    }

    pub fn flags(&self) -> ObjectFlags {
        ObjectFlags::from_bits_retain(self.flags)
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Model {
    pub format: ModelFormat,
    pub root: NodeId,
    pub nodes: Vec<Node>,
    pub attaches: Vec<Attach>,
}

struct Builder<'v, 'a> {
    view: &'v ImageView<'a>,
    format: ModelFormat,
    nodes: Vec<Node>,
    attaches: Vec<Attach>,
    node_at: HashMap<usize, NodeId>,
    attach_at: HashMap<usize, u32>,
    pending: Vec<(NodeId, usize)>,
}

impl Builder<'_, '_> {
    fn node(&mut self, offset: usize) -> Result<NodeId> {
        if let Some(&id) = self.node_at.get(&offset) {
            return Ok(id);
        }
        if self.nodes.len() >= MAX_NODES {
            return Err(DecodeError::TooMany {
                what: "node",
                count: self.nodes.len() + 1,
                limit: MAX_NODES,
            });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::empty(label("object", offset)));
        self.node_at.insert(offset, id);
        self.pending.push((id, offset));
        Ok(id)
    }

    fn attach(&mut self, offset: usize) -> Result<u32> {
        if let Some(&idx) = self.attach_at.get(&offset) {
            return Ok(idx);
        }
        let attach = Attach::decode(self.view, offset, self.format)?;
        let idx = self.attaches.len() as u32;
        self.attaches.push(attach);
        self.attach_at.insert(offset, idx);
        Ok(idx)
    }

    fn fill(&mut self, id: NodeId, offset: usize) -> Result<()> {
        let view = self.view;
        view.bytes(offset, OBJECT_SIZE)?;

        let attach = match view.pointer(offset + 4)? {
            Some(a) => Some(self.attach(a)?),
            None => None,
        };
        let child = match view.pointer(offset + 44)? {
            Some(c) => Some(self.node(c)?),
            None => None,
        };
        let sibling = match view.pointer(offset + 48)? {
            Some(s) => Some(self.node(s)?),
            None => None,
        };

        let node = &mut self.nodes[id.index()];
        node.flags = view.u32(offset)?;
        node.attach = attach;
        node.position = view.vec3(offset + 8)?;
        node.angle = view.ivec3(offset + 20)?;
        node.scale = view.vec3(offset + 32)?;
        node.child = child;
        node.sibling = sibling;
        Ok(())
    }
}

impl Model {
    /// Decode the hierarchy rooted at `offset`
    pub fn decode(view: &ImageView, offset: usize, format: ModelFormat) -> Result<Self> {
        let mut b = Builder {
            view,
            format,
            nodes: Vec::new(),
            attaches: Vec::new(),
            node_at: HashMap::new(),
            attach_at: HashMap::new(),
            pending: Vec::new(),
        };
        let root = b.node(offset)?;
        while let Some((id, off)) = b.pending.pop() {
            b.fill(id, off)?;
        }
        Ok(Self {
            format,
            root,
            nodes: b.nodes,
            attaches: b.attaches,
        })
    }

    /// A single node holding the attach at `offset`, for bare geometry exports
    pub fn wrap_attach(view: &ImageView, offset: usize, format: ModelFormat) -> Result<Self> {
        let attach = Attach::decode(view, offset, format)?;
        let mut root = Node::empty(label("object", offset));
        root.attach = Some(0);
        Ok(Self {
            format,
            root: NodeId(0),
            nodes: vec![root],
            attaches: vec![attach],
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Label of the root node
    pub fn label(&self) -> &str {
        self.node(self.root).map(|n| n.label.as_str()).unwrap_or("")
    }

    /// Root label, then per node in depth-first order its label and
    /// attach labels, children before siblings
    pub fn label_set(&self) -> LabelSet {
        let mut set = LabelSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };
            set.insert(node.label.as_str());
            if let Some(a) = node.attach.and_then(|a| self.attaches.get(a as usize)) {
                a.collect_labels(&mut set);
            }
            if let Some(s) = node.sibling {
                stack.push(s);
            }
            if let Some(c) = node.child {
                stack.push(c);
            }
        }
        set
    }

    /// Number of nodes a motion for this model animates
    pub fn count_animated(&self) -> usize {
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };
            if !node.flags().contains(ObjectFlags::NO_ANIMATE) {
                count += 1;
            }
            stack.extend(node.sibling);
            stack.extend(node.child);
        }
        count
    }
}
