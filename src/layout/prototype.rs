//! Immutable description of the graph being laid out.
//!
//! A [`GraphPrototype`] lists node prototypes (box size and ports), the
//! nodes instantiating them, and directed links from an output port of one
//! node to an input port of another. Layouts never modify it; individuals
//! only carry node positions and resolve everything else here.

use crate::geometry::{Aabb, Vec2};
use thiserror::Error;

/// Box edge a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// A connection point on a node box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Port {
    pub side: Side,
    /// Fraction along the side, `0.0` at the top/left end.
    pub position: f64,
}

impl Port {
    pub fn new(side: Side, position: f64) -> Self {
        Self { side, position }
    }

    /// Offset of the port from the top-left corner of a box of `size`.
    pub fn offset(&self, size: Vec2) -> Vec2 {
        match self.side {
            Side::Left => Vec2::new(0.0, self.position * size.y),
            Side::Right => Vec2::new(size.x, self.position * size.y),
            Side::Top => Vec2::new(self.position * size.x, 0.0),
            Side::Bottom => Vec2::new(self.position * size.x, size.y),
        }
    }
}

/// `count` ports spread evenly over `side` at `(k + 1) / (count + 1)`.
fn spread(side: Side, count: usize) -> Vec<Port> {
    let step = 1.0 / (count + 1) as f64;
    (0..count)
        .map(|k| Port::new(side, (k + 1) as f64 * step))
        .collect()
}

/// Shape shared by all nodes of one kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePrototype {
    pub name: String,
    pub size: Vec2,
    pub in_ports: Vec<Port>,
    pub out_ports: Vec<Port>,
}

impl NodePrototype {
    /// A prototype with inputs spread over the left side and outputs over
    /// the right side.
    pub fn new(name: impl Into<String>, size: Vec2, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            size,
            in_ports: spread(Side::Left, inputs),
            out_ports: spread(Side::Right, outputs),
        }
    }

    /// Position of input port `k` for a node whose top-left is `origin`.
    pub fn in_port_position(&self, k: usize, origin: Vec2) -> Vec2 {
        origin + self.in_ports[k].offset(self.size)
    }

    /// Position of output port `k` for a node whose top-left is `origin`.
    pub fn out_port_position(&self, k: usize, origin: Vec2) -> Vec2 {
        origin + self.out_ports[k].offset(self.size)
    }
}

/// An instance of a node prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Index into [`GraphPrototype::prototypes`].
    pub prototype: usize,
    /// Display name; empty to use the prototype's name.
    pub name: String,
}

/// Directed link from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub source_node: usize,
    pub source_port: usize,
    pub target_node: usize,
    pub target_port: usize,
}

impl Link {
    pub fn new(source_node: usize, source_port: usize, target_node: usize, target_port: usize) -> Self {
        Self {
            source_node,
            source_port,
            target_node,
            target_port,
        }
    }
}

/// Structural error while building a [`GraphPrototype`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node size must be positive and finite, got {w} x {h}")]
    InvalidSize { w: f64, h: f64 },

    #[error("canvas size must be positive and finite, got {w} x {h}")]
    InvalidCanvas { w: f64, h: f64 },

    #[error("unknown prototype {prototype} ({count} defined)")]
    UnknownPrototype { prototype: usize, count: usize },

    #[error("unknown node {node} ({count} defined)")]
    UnknownNode { node: usize, count: usize },

    #[error("node {node} has no output port {port} ({count} defined)")]
    UnknownOutPort { node: usize, port: usize, count: usize },

    #[error("node {node} has no input port {port} ({count} defined)")]
    UnknownInPort { node: usize, port: usize, count: usize },
}

fn valid_extent(v: Vec2) -> bool {
    v.x > 0.0 && v.y > 0.0 && v.x.is_finite() && v.y.is_finite()
}

/// Read-only graph description consumed by the fitness evaluator.
///
/// # Examples
///
/// ```
/// use u_nodelayout::geometry::Vec2;
/// use u_nodelayout::layout::{GraphPrototype, Link, NodePrototype};
///
/// let mut graph = GraphPrototype::new(Vec2::new(600.0, 600.0)).unwrap();
/// let p = graph.add_prototype(NodePrototype::new("op", Vec2::new(100.0, 60.0), 1, 1)).unwrap();
/// let a = graph.add_node(p, "a").unwrap();
/// let b = graph.add_node(p, "b").unwrap();
/// graph.add_link(Link::new(a, 0, b, 0)).unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.link_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphPrototype {
    canvas: Vec2,
    prototypes: Vec<NodePrototype>,
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Default for GraphPrototype {
    fn default() -> Self {
        Self {
            canvas: Vec2::new(1200.0, 1200.0),
            prototypes: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl GraphPrototype {
    pub fn new(canvas: Vec2) -> Result<Self, GraphError> {
        let mut graph = Self::default();
        graph.set_canvas(canvas)?;
        Ok(graph)
    }

    pub fn set_canvas(&mut self, canvas: Vec2) -> Result<(), GraphError> {
        if !valid_extent(canvas) {
            return Err(GraphError::InvalidCanvas {
                w: canvas.x,
                h: canvas.y,
            });
        }
        self.canvas = canvas;
        Ok(())
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn prototypes(&self) -> &[NodePrototype] {
        &self.prototypes
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Adds a prototype and returns its index.
    pub fn add_prototype(&mut self, prototype: NodePrototype) -> Result<usize, GraphError> {
        if !valid_extent(prototype.size) {
            return Err(GraphError::InvalidSize {
                w: prototype.size.x,
                h: prototype.size.y,
            });
        }
        self.prototypes.push(prototype);
        Ok(self.prototypes.len() - 1)
    }

    /// Adds a node of prototype `prototype` and returns its index.
    pub fn add_node(&mut self, prototype: usize, name: impl Into<String>) -> Result<usize, GraphError> {
        if prototype >= self.prototypes.len() {
            return Err(GraphError::UnknownPrototype {
                prototype,
                count: self.prototypes.len(),
            });
        }
        self.nodes.push(Node {
            prototype,
            name: name.into(),
        });
        Ok(self.nodes.len() - 1)
    }

    /// Adds a link after checking both endpoints exist.
    pub fn add_link(&mut self, link: Link) -> Result<usize, GraphError> {
        let source = self.checked_node(link.source_node)?;
        if link.source_port >= source.out_ports.len() {
            return Err(GraphError::UnknownOutPort {
                node: link.source_node,
                port: link.source_port,
                count: source.out_ports.len(),
            });
        }
        let target = self.checked_node(link.target_node)?;
        if link.target_port >= target.in_ports.len() {
            return Err(GraphError::UnknownInPort {
                node: link.target_node,
                port: link.target_port,
                count: target.in_ports.len(),
            });
        }
        self.links.push(link);
        Ok(self.links.len() - 1)
    }

    fn checked_node(&self, node: usize) -> Result<&NodePrototype, GraphError> {
        match self.nodes.get(node) {
            Some(n) => Ok(&self.prototypes[n.prototype]),
            None => Err(GraphError::UnknownNode {
                node,
                count: self.nodes.len(),
            }),
        }
    }

    /// Prototype of node `i`.
    pub fn node_prototype(&self, i: usize) -> &NodePrototype {
        &self.prototypes[self.nodes[i].prototype]
    }

    pub fn node_size(&self, i: usize) -> Vec2 {
        self.node_prototype(i).size
    }

    /// Display name of node `i`, falling back to its prototype's name.
    pub fn node_name(&self, i: usize) -> &str {
        let node = &self.nodes[i];
        if node.name.is_empty() {
            &self.prototypes[node.prototype].name
        } else {
            &node.name
        }
    }

    /// Box of node `i` placed with its top-left corner at `origin`.
    pub fn node_box(&self, i: usize, origin: Vec2) -> Aabb {
        Aabb::from_origin_size(origin, self.node_size(i))
    }

    /// Port positions of `link` given the top-left corners of its source
    /// and target nodes.
    pub fn link_endpoints(&self, link: &Link, source_origin: Vec2, target_origin: Vec2) -> (Vec2, Vec2) {
        let source = self
            .node_prototype(link.source_node)
            .out_port_position(link.source_port, source_origin);
        let target = self
            .node_prototype(link.target_node)
            .in_port_position(link.target_port, target_origin);
        (source, target)
    }

    /// Number of genes of a layout: one (x, y) pair per node.
    pub fn genotype_len(&self) -> usize {
        2 * self.nodes.len()
    }
}
