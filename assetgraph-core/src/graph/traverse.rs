//! Graph Traversal
//!
//! Depth-first and breadth-first walks over a [`Graph`].
//!
//! Both walks keep a visited set, so a node reachable along several paths
//! (or through a cycle) is visited exactly once. There is no in-progress
//! colouring: a back edge is simply not followed, never reported.
//!
//! Walks use an explicit stack or queue rather than recursion.

use std::collections::{HashSet, VecDeque};

use super::directed::Graph;
use super::node::{Edge, GraphNode, NodeId};

/// Controls handed to a visitor during [`Graph::traverse`].
#[derive(Debug, Default)]
pub struct TraversalActions {
    skipped: bool,
    stopped: bool,
}

impl TraversalActions {
    /// Do not descend into the children of the node being visited.
    pub fn skip_children(&mut self) {
        self.skipped = true;
    }

    /// Halt the whole traversal after the current visit returns.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Successors,
    Predecessors,
}

impl<N: GraphNode> Graph<N> {
    /// Pre-order depth-first walk from `start`, or from the root when `start`
    /// is `None`.
    ///
    /// `visit` receives the node, the context inherited from its parent and
    /// the traversal controls. A `Some` return becomes the context passed to
    /// that node's children; `None` passes the inherited context through.
    ///
    /// Returns the current context if the visitor called
    /// [`TraversalActions::stop`], otherwise `None`.
    pub fn traverse<C, F>(&self, start: Option<&str>, visit: F) -> Option<C>
    where
        C: Clone,
        F: FnMut(&N, Option<&C>, &mut TraversalActions) -> Option<C>,
    {
        let start = match start {
            Some(id) => Some(NodeId::new(id)),
            None => self.root.clone(),
        };
        self.walk(start?, Direction::Successors, visit)
    }

    /// Same walk as [`Graph::traverse`] but following incoming edges, which
    /// reaches every transitive dependent of `start`.
    pub fn traverse_ancestors<C, F>(&self, start: &str, visit: F) -> Option<C>
    where
        C: Clone,
        F: FnMut(&N, Option<&C>, &mut TraversalActions) -> Option<C>,
    {
        self.walk(NodeId::new(start), Direction::Predecessors, visit)
    }

    fn walk<C, F>(&self, start: NodeId, direction: Direction, mut visit: F) -> Option<C>
    where
        C: Clone,
        F: FnMut(&N, Option<&C>, &mut TraversalActions) -> Option<C>,
    {
        let adjacency = match direction {
            Direction::Successors => &self.outbound,
            Direction::Predecessors => &self.inbound,
        };

        let mut visited = HashSet::new();
        let mut stack: Vec<(NodeId, Option<C>)> = vec![(start, None)];
        let mut actions = TraversalActions::default();

        while let Some((id, inherited)) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(node) = self.nodes.get(id.as_str()) else {
                continue;
            };

            actions.skipped = false;
            let context = visit(node, inherited.as_ref(), &mut actions).or(inherited);
            if actions.stopped {
                return context;
            }
            if actions.skipped {
                continue;
            }

            if let Some(children) = adjacency.get(id.as_str()) {
                for child in children.iter().rev() {
                    if !visited.contains(child) {
                        stack.push((child.clone(), context.clone()));
                    }
                }
            }
        }

        None
    }

    /// Breadth-first walk from the root. Returns the first node for which
    /// `visit` returns `true`.
    pub fn bfs<F>(&self, mut visit: F) -> Option<&N>
    where
        F: FnMut(&N) -> bool,
    {
        let root = self.root.clone()?;
        let mut visited = HashSet::from([root.clone()]);
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get(id.as_str()) else {
                continue;
            };
            if visit(node) {
                return Some(node);
            }

            if let Some(children) = self.outbound.get(id.as_str()) {
                for child in children {
                    if visited.insert(child.clone()) {
                        queue.push_back(child.clone());
                    }
                }
            }
        }

        None
    }

    /// Extract an independent graph rooted at `id` containing everything
    /// reachable from it and the edges between those nodes.
    ///
    /// Returns an empty graph if `id` is not in this graph.
    pub fn sub_graph(&self, id: &str) -> Graph<N>
    where
        N: Clone,
    {
        let mut graph = Graph::new();
        let Some(root) = self.get_node(id) else {
            return graph;
        };
        graph.set_root_node(root.clone());

        self.traverse::<(), _>(Some(id), |node, _, _| {
            graph.add_node(node.clone());
            None
        });

        let reached: Vec<NodeId> = graph.node_ids().cloned().collect();
        for from in &reached {
            for to in self.successor_ids(from) {
                if graph.has_node(&to) {
                    graph.add_edge(Edge::new(from, to));
                }
            }
        }
        graph
    }
}
