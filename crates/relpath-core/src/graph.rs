//! Dependency graph over a parent-labelled edge list.
//!
//! Edges are read child → parent. The directed graph answers root, ancestor
//! and subtree queries; its undirected projection (built lazily on the first
//! path query) answers shortest-path queries. A graph is immutable after
//! construction and can be shared between threads.

use crate::error::{Malformed, PathError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

/// A labelled edge from a child node to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub child: String,
    pub parent: String,
    pub label: String,
    /// Surface text, present only when the child is a terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Link {
    pub fn new(
        child: impl Into<String>,
        parent: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
            label: label.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Direction of a traversed edge relative to the edge itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From a child to its parent.
    Up,
    /// From a parent to its child.
    Down,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// One hop of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub from: String,
    pub to: String,
    pub direction: Direction,
    pub label: String,
}

impl Step {
    /// The same hop walked the other way.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            direction: self.direction.flipped(),
            label: self.label.clone(),
        }
    }
}

/// Directed dependency graph built once per sentence.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    /// One link per (parent, child) pair, in first-seen order.
    links: Vec<Link>,
    /// parent → child → index into `links`.
    edge_index: HashMap<String, HashMap<String, usize>>,
    /// Every node, with its children in first-seen order.
    children: BTreeMap<String, Vec<String>>,
    /// Every node, with its parents in first-seen order.
    parents: BTreeMap<String, Vec<String>>,
    undirected: OnceLock<BTreeMap<String, BTreeSet<String>>>,
}

impl DepGraph {
    /// Build a graph from links. A repeated (parent, child) pair replaces the
    /// earlier link but keeps its position.
    pub fn new(links: impl IntoIterator<Item = Link>) -> Self {
        let mut graph = Self::default();
        for link in links {
            let existing = graph
                .edge_index
                .get(&link.parent)
                .and_then(|children| children.get(&link.child))
                .copied();
            if let Some(i) = existing {
                graph.links[i] = link;
                continue;
            }

            graph
                .edge_index
                .entry(link.parent.clone())
                .or_default()
                .insert(link.child.clone(), graph.links.len());
            graph
                .children
                .entry(link.parent.clone())
                .or_default()
                .push(link.child.clone());
            graph.children.entry(link.child.clone()).or_default();
            graph
                .parents
                .entry(link.child.clone())
                .or_default()
                .push(link.parent.clone());
            graph.parents.entry(link.parent.clone()).or_default();
            graph.links.push(link);
        }
        graph
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.children.contains_key(node)
    }

    /// All node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// The link from `parent` down to `child`, if that edge exists.
    pub fn link(&self, parent: &str, child: &str) -> Option<&Link> {
        let i = *self.edge_index.get(parent)?.get(child)?;
        self.links.get(i)
    }

    pub fn children(&self, node: &str) -> &[String] {
        self.children.get(node).map_or(&[], Vec::as_slice)
    }

    /// Direct parents of `node`, in edge-list order.
    pub fn parents(&self, node: &str) -> &[String] {
        self.parents.get(node).map_or(&[], Vec::as_slice)
    }

    /// Distinct labels of the edges entering `node`, in edge-list order.
    pub fn incoming_labels(&self, node: &str) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for parent in self.parents(node) {
            let Some(link) = self.link(parent, node) else {
                continue;
            };
            if !labels.contains(&link.label.as_str()) {
                labels.push(link.label.as_str());
            }
        }
        labels
    }

    fn require(&self, node: &str) -> Result<(), PathError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(PathError::UnknownNode(node.to_string()))
        }
    }

    /// The unique node without parents.
    ///
    /// Fails when the edge set is empty, contains a cycle, or has more than
    /// one parentless node.
    pub fn root(&self) -> Result<&str, PathError> {
        if self.links.is_empty() {
            return Err(Malformed::Empty.into());
        }
        let order = self.topological_order()?;

        let roots: Vec<String> = self
            .parents
            .iter()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(node, _)| node.clone())
            .collect();
        if roots.len() > 1 {
            return Err(Malformed::MultipleRoots { roots }.into());
        }

        Ok(order[0])
    }

    /// Kahn's algorithm over parent → child edges, parentless nodes first.
    fn topological_order(&self) -> Result<Vec<&str>, Malformed> {
        let mut in_degree: BTreeMap<&str, usize> = self
            .parents
            .iter()
            .map(|(node, parents)| (node.as_str(), parents.len()))
            .collect();
        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for child in self.children(node) {
                if let Some(degree) = in_degree.get_mut(child.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(child.as_str());
                    }
                }
            }
        }

        if order.len() < in_degree.len() {
            let node = in_degree
                .iter()
                .find(|(_, degree)| **degree > 0)
                .map(|(node, _)| (*node).to_string())
                .unwrap_or_default();
            return Err(Malformed::Cycle { node });
        }
        Ok(order)
    }

    /// Shortest upward distance from `node` to each of its ancestors,
    /// including `node` itself at distance 0.
    fn upward_distances<'a>(&'a self, node: &'a str) -> BTreeMap<&'a str, usize> {
        let mut distances = BTreeMap::from([(node, 0)]);
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            let next = distances[current] + 1;
            for parent in self.parents(current) {
                if !distances.contains_key(parent.as_str()) {
                    distances.insert(parent.as_str(), next);
                    queue.push_back(parent.as_str());
                }
            }
        }
        distances
    }

    /// Every node reachable from `node` by following child → parent edges.
    pub fn ancestors(&self, node: &str) -> Result<BTreeSet<String>, PathError> {
        self.require(node)?;
        Ok(self
            .upward_distances(node)
            .into_keys()
            .filter(|ancestor| *ancestor != node)
            .map(str::to_string)
            .collect())
    }

    /// Common ancestors of both nodes (each node counts as its own ancestor),
    /// with the summed downward distance to the two nodes, in id order.
    fn common_ancestors<'a>(
        &'a self,
        one: &'a str,
        another: &'a str,
    ) -> Result<Vec<(&'a str, usize)>, PathError> {
        self.require(one)?;
        self.require(another)?;

        let from_another = self.upward_distances(another);
        let common: Vec<(&str, usize)> = self
            .upward_distances(one)
            .into_iter()
            .filter_map(|(node, d)| from_another.get(node).map(|e| (node, d + e)))
            .collect();

        if common.is_empty() {
            return Err(PathError::NoCommonAncestor {
                one: one.to_string(),
                another: another.to_string(),
            });
        }
        Ok(common)
    }

    /// The lowest common ancestor of two nodes in the directed graph.
    ///
    /// Candidates are common ancestors with no other common ancestor below
    /// them. Remote edges can leave several; the one closest to both nodes
    /// wins, then the smallest id.
    pub fn lowest_common_ancestor<'a>(
        &'a self,
        one: &'a str,
        another: &'a str,
    ) -> Result<&'a str, PathError> {
        let common = self.common_ancestors(one, another)?;

        let mut dominated: HashSet<&str> = HashSet::new();
        for (node, _) in &common {
            dominated.extend(
                self.upward_distances(node)
                    .into_keys()
                    .filter(|ancestor| ancestor != node),
            );
        }

        let lowest = common
            .iter()
            .filter(|(node, _)| !dominated.contains(node))
            .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        // Only a cycle through the common ancestors leaves nothing undominated.
        let (node, _) = lowest.unwrap_or(&common[0]);
        Ok(*node)
    }

    /// Smallest terminal position anywhere in the subtree below `node`.
    fn first_position<'a, F>(
        &'a self,
        node: &'a str,
        position: &F,
        memo: &mut HashMap<&'a str, Option<usize>>,
    ) -> Option<usize>
    where
        F: Fn(&str) -> Option<usize>,
    {
        if let Some(known) = memo.get(node) {
            return *known;
        }
        memo.insert(node, None);
        let best = self
            .children(node)
            .iter()
            .filter_map(|child| self.first_position(child, position, memo))
            .chain(position(node))
            .min();
        memo.insert(node, best);
        best
    }

    /// Children of `node` in text order: by first terminal position, subtrees
    /// without terminals last, then by id.
    fn ordered_children<'a, F>(
        &'a self,
        node: &'a str,
        position: &F,
        memo: &mut HashMap<&'a str, Option<usize>>,
    ) -> Vec<&'a str>
    where
        F: Fn(&str) -> Option<usize>,
    {
        let mut keyed: Vec<(Option<usize>, &str)> = self
            .children(node)
            .iter()
            .map(|child| (self.first_position(child, position, memo), child.as_str()))
            .collect();
        keyed.sort_by_key(|(first, child)| (first.is_none(), *first, *child));
        keyed.into_iter().map(|(_, child)| child).collect()
    }

    /// All links of the subtree rooted at `ancestor`, in pre-order.
    ///
    /// `position` maps terminal ids to their token position; siblings are
    /// visited in text order so the links read left to right. Each link is
    /// emitted once even when remote edges reach a node twice.
    pub fn subtree_links<F>(&self, ancestor: &str, position: F) -> Result<Vec<Link>, PathError>
    where
        F: Fn(&str) -> Option<usize>,
    {
        self.require(ancestor)?;

        let mut memo = HashMap::new();
        let mut expanded: HashSet<&str> = HashSet::from([ancestor]);
        let mut stack: Vec<(&str, &str)> = self
            .ordered_children(ancestor, &position, &mut memo)
            .into_iter()
            .rev()
            .map(|child| (ancestor, child))
            .collect();

        let mut links = Vec::new();
        while let Some((parent, child)) = stack.pop() {
            if let Some(link) = self.link(parent, child) {
                links.push(link.clone());
            }
            if expanded.insert(child) {
                let next = self.ordered_children(child, &position, &mut memo);
                stack.extend(next.into_iter().rev().map(|grandchild| (child, grandchild)));
            }
        }
        Ok(links)
    }

    /// Links of the subtree under the lowest common ancestor of two nodes,
    /// in text-ordered pre-order (see [`DepGraph::subtree_links`]).
    pub fn lca_subgraph_links<F>(
        &self,
        one: &str,
        another: &str,
        position: F,
    ) -> Result<Vec<Link>, PathError>
    where
        F: Fn(&str) -> Option<usize>,
    {
        let lca = self.lowest_common_ancestor(one, another)?;
        tracing::debug!("lowest common ancestor of {} and {} is {}", one, another, lca);
        self.subtree_links(lca, position)
    }

    /// The cheapest full subtree containing both nodes.
    ///
    /// Every common ancestor (each node counts as its own) is a candidate; its
    /// subtree is scored with `cost(terminals, one, another)` where
    /// `terminals` are the subtree's terminals in id order. Ties go to the
    /// ancestor with the smallest id. A leaf has no links below it, so it is
    /// never a candidate: the result always contains both nodes.
    pub fn minimal_subgraph<P, C, K>(
        &self,
        one: &str,
        another: &str,
        is_terminal: P,
        cost: C,
    ) -> Result<DepGraph, PathError>
    where
        P: Fn(&str) -> bool,
        C: Fn(&[String], &str, &str) -> K,
        K: Ord,
    {
        let candidates = self.common_ancestors(one, another)?;

        let mut best: Option<(K, &str, DepGraph)> = None;
        for (ancestor, _) in candidates {
            let subtree = DepGraph::new(self.subtree_links(ancestor, |_| None)?);
            if !subtree.contains(one) || !subtree.contains(another) {
                continue;
            }
            let terminals = subtree.terminals(&is_terminal);
            let score = cost(terminals.as_slice(), one, another);
            if best.as_ref().is_none_or(|(lowest, _, _)| score < *lowest) {
                best = Some((score, ancestor, subtree));
            }
        }

        let (_, ancestor, subtree) = best.ok_or_else(|| PathError::NoCommonAncestor {
            one: one.to_string(),
            another: another.to_string(),
        })?;
        tracing::debug!("minimal subtree for {} and {} is rooted at {}", one, another, ancestor);
        Ok(subtree)
    }

    /// Child nodes accepted by `is_terminal`, sorted and deduplicated.
    pub fn terminals<P>(&self, is_terminal: P) -> Vec<String>
    where
        P: Fn(&str) -> bool,
    {
        self.links
            .iter()
            .map(|link| link.child.as_str())
            .filter(|&child| is_terminal(child))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn undirected(&self) -> &BTreeMap<String, BTreeSet<String>> {
        self.undirected.get_or_init(|| {
            let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            for link in &self.links {
                if link.child == link.parent {
                    continue;
                }
                adjacency
                    .entry(link.child.clone())
                    .or_default()
                    .insert(link.parent.clone());
                adjacency
                    .entry(link.parent.clone())
                    .or_default()
                    .insert(link.child.clone());
            }
            adjacency
        })
    }

    /// Breadth-first search over the undirected projection, neighbours in
    /// ascending id order.
    fn shortest_node_path<'a>(&'a self, source: &'a str, target: &'a str) -> Option<Vec<&'a str>> {
        let adjacency = self.undirected();
        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::from([source]);
        let mut queue = VecDeque::from([source]);

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut path = vec![target];
                while let Some(prev) = previous.get(path[path.len() - 1]) {
                    path.push(*prev);
                }
                path.reverse();
                return Some(path);
            }
            for neighbor in adjacency.get(current).into_iter().flatten() {
                if seen.insert(neighbor.as_str()) {
                    previous.insert(neighbor.as_str(), current);
                    queue.push_back(neighbor.as_str());
                }
            }
        }
        None
    }

    fn step(&self, from: &str, to: &str) -> Step {
        let (direction, link) = match self.link(from, to) {
            Some(link) => (Direction::Down, Some(link)),
            None => (Direction::Up, self.link(to, from)),
        };
        Step {
            from: from.to_string(),
            to: to.to_string(),
            direction,
            label: link.map(|l| l.label.clone()).unwrap_or_default(),
        }
    }

    /// Shortest path between two nodes ignoring edge direction, one [`Step`]
    /// per hop.
    ///
    /// Among equally short paths the one found first by a breadth-first
    /// search from the smaller endpoint id wins, so
    /// `undirected_steps(b, a)` is always `undirected_steps(a, b)` walked
    /// backwards.
    pub fn undirected_steps(&self, start: &str, end: &str) -> Result<Vec<Step>, PathError> {
        self.require(start)?;
        self.require(end)?;

        let (source, target) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        let mut nodes = self
            .shortest_node_path(source, target)
            .ok_or_else(|| PathError::NoPath {
                from: start.to_string(),
                to: end.to_string(),
            })?;
        if source != start {
            nodes.reverse();
        }

        Ok(nodes
            .windows(2)
            .map(|pair| self.step(pair[0], pair[1]))
            .collect())
    }

    /// Hop count from the nearest of `sources` to every reachable node of the
    /// undirected projection.
    pub fn distances_from(&self, sources: &[&str]) -> BTreeMap<String, usize> {
        let adjacency = self.undirected();
        let mut distances: BTreeMap<String, usize> = BTreeMap::new();
        let mut queue = VecDeque::new();
        for source in sources {
            if self.contains(source) && !distances.contains_key(*source) {
                distances.insert((*source).to_string(), 0);
                queue.push_back(*source);
            }
        }

        while let Some(current) = queue.pop_front() {
            let next = distances[current] + 1;
            for neighbor in adjacency.get(current).into_iter().flatten() {
                if !distances.contains_key(neighbor) {
                    distances.insert(neighbor.clone(), next);
                    queue.push_back(neighbor.as_str());
                }
            }
        }
        distances
    }
}
