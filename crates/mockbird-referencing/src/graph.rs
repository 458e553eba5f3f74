//! Reference topology of a document.
//!
//! One eager traversal collects every object location, every `$ref` edge, and
//! a cycle census computed with Tarjan's strongly connected components. Nodes
//! are identified by their string form, so a pointer-shaped reference
//! (`#/$defs/A`) and the location it targets are the same node. Anchor and
//! `$id` references stay distinct nodes and never participate in cycles.
use ahash::{AHashMap, AHashSet};
use serde_json::Value;

use crate::pointer::escape;

/// The `$ref` topology of one document: locations, edges, and cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefGraph {
    pointers: AHashSet<String>,
    refs: AHashSet<String>,
    edges: AHashMap<String, AHashSet<String>>,
    reverse_edges: AHashMap<String, AHashSet<String>>,
    cycles: Vec<Vec<String>>,
    cyclic_refs: AHashSet<String>,
    order: Vec<String>,
}

impl RefGraph {
    /// Traverse `document` once and build the full graph.
    #[must_use]
    pub fn build(document: &Value) -> RefGraph {
        let mut pointers = AHashSet::new();
        let mut refs = AHashSet::new();
        let mut edges: AHashMap<String, AHashSet<String>> = AHashMap::new();
        let mut reverse_edges: AHashMap<String, AHashSet<String>> = AHashMap::new();

        // Explicit stack; documents may nest too deeply for recursion.
        let mut stack: Vec<(String, &Value)> = vec![(String::from("#"), document)];
        while let Some((pointer, value)) = stack.pop() {
            match value {
                Value::Object(object) => {
                    if let Some(Value::String(reference)) = object.get("$ref") {
                        refs.insert(reference.clone());
                        edges
                            .entry(pointer.clone())
                            .or_default()
                            .insert(reference.clone());
                        reverse_edges
                            .entry(reference.clone())
                            .or_default()
                            .insert(pointer.clone());
                    }
                    for (key, child) in object {
                        // `$ref` holds a string, not a subschema.
                        if key == "$ref" {
                            continue;
                        }
                        if child.is_object() || child.is_array() {
                            stack.push((format!("{pointer}/{}", escape(key)), child));
                        }
                    }
                    pointers.insert(pointer);
                }
                Value::Array(items) => {
                    for (index, child) in items.iter().enumerate() {
                        if child.is_object() || child.is_array() {
                            stack.push((format!("{pointer}/{index}"), child));
                        }
                    }
                }
                _ => {}
            }
        }

        let (cycles, cyclic_refs, order) = census(&pointers, &refs, &edges);
        RefGraph {
            pointers,
            refs,
            edges,
            reverse_edges,
            cycles,
            cyclic_refs,
            order,
        }
    }

    /// Every object location in the document, in canonical `#/…` form.
    pub fn pointers(&self) -> &AHashSet<String> {
        &self.pointers
    }

    /// Every distinct `$ref` string in the document.
    pub fn refs(&self) -> &AHashSet<String> {
        &self.refs
    }

    /// References leaving the schema at `pointer`, if any.
    #[must_use]
    pub fn refs_from(&self, pointer: &str) -> Option<&AHashSet<String>> {
        self.edges.get(pointer)
    }

    /// Locations whose `$ref` is exactly `reference`.
    #[must_use]
    pub fn sources_of(&self, reference: &str) -> Option<&AHashSet<String>> {
        self.reverse_edges.get(reference)
    }

    /// Strongly connected components of size ≥ 2, plus self-loops, members
    /// sorted within each cycle.
    #[must_use]
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    /// Union of all nodes participating in any cycle.
    pub fn cyclic_refs(&self) -> &AHashSet<String> {
        &self.cyclic_refs
    }

    /// Whether `node` (a pointer or a ref string) participates in a cycle.
    #[must_use]
    pub fn is_cyclic(&self, node: &str) -> bool {
        self.cyclic_refs.contains(node)
    }

    /// Cycle-breaking depth-first order over all nodes; stable across runs.
    #[must_use]
    pub fn processing_order(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn contains_pointer(&self, pointer: &str) -> bool {
        self.pointers.contains(pointer)
    }
}

/// Run Tarjan SCC over nodes = pointers ∪ refs and derive the cycle census
/// plus a deterministic processing order.
fn census(
    pointers: &AHashSet<String>,
    refs: &AHashSet<String>,
    edges: &AHashMap<String, AHashSet<String>>,
) -> (Vec<Vec<String>>, AHashSet<String>, Vec<String>) {
    // Sorted node list makes every derived structure independent of hash
    // iteration order.
    let mut nodes: Vec<&str> = pointers
        .iter()
        .chain(refs.iter())
        .map(String::as_str)
        .collect();
    nodes.sort_unstable();
    nodes.dedup();

    let ids: AHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(id, node)| (*node, id))
        .collect();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (source, targets) in edges {
        let source = ids[source.as_str()];
        let mut targets: Vec<usize> = targets.iter().map(|t| ids[t.as_str()]).collect();
        targets.sort_unstable();
        adjacency[source] = targets;
    }

    let components = strongly_connected_components(&adjacency);

    let mut cycles = Vec::new();
    let mut cyclic_refs = AHashSet::new();
    for component in &components {
        let non_trivial = component.len() > 1
            || adjacency[component[0]].binary_search(&component[0]).is_ok();
        if non_trivial {
            let mut members: Vec<String> =
                component.iter().map(|&id| nodes[id].to_string()).collect();
            members.sort_unstable();
            cyclic_refs.extend(members.iter().cloned());
            cycles.push(members);
        }
    }
    cycles.sort_unstable();

    let order = depth_first_order(&nodes, &adjacency);
    (cycles, cyclic_refs, order)
}

/// Iterative Tarjan; the explicit frame stack keeps ~100k-node-deep
/// documents from overflowing the call stack.
fn strongly_connected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let node_count = adjacency.len();
    let mut index: Vec<Option<usize>> = vec![None; node_count];
    let mut lowlink: Vec<usize> = vec![0; node_count];
    let mut on_stack: Vec<bool> = vec![false; node_count];
    let mut stack: Vec<usize> = Vec::new();
    let mut counter = 0usize;
    let mut components = Vec::new();

    for root in 0..node_count {
        if index[root].is_some() {
            continue;
        }
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(counter);
        lowlink[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;

        loop {
            let Some(&(node, next)) = frames.last() else {
                break;
            };
            if next < adjacency[node].len() {
                let target = adjacency[node][next];
                frames.last_mut().expect("frame exists").1 += 1;
                if index[target].is_none() {
                    index[target] = Some(counter);
                    lowlink[target] = counter;
                    counter += 1;
                    stack.push(target);
                    on_stack[target] = true;
                    frames.push((target, 0));
                } else if on_stack[target] {
                    lowlink[node] = lowlink[node].min(index[target].expect("indexed above"));
                }
            } else {
                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[node]);
                }
                if lowlink[node] == index[node].expect("indexed on push") {
                    let mut component = Vec::new();
                    loop {
                        let member = stack.pop().expect("stack holds the component");
                        on_stack[member] = false;
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    components.push(component);
                }
            }
        }
    }
    components
}

/// Depth-first post-order, reversed; edges into already-visited nodes
/// (including those still on the visit stack) are skipped, which breaks
/// cycles.
fn depth_first_order(nodes: &[&str], adjacency: &[Vec<usize>]) -> Vec<String> {
    let node_count = nodes.len();
    let mut visited = vec![false; node_count];
    let mut post_order: Vec<usize> = Vec::with_capacity(node_count);

    for root in 0..node_count {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        loop {
            let Some(&(node, next)) = frames.last() else {
                break;
            };
            if next < adjacency[node].len() {
                let target = adjacency[node][next];
                frames.last_mut().expect("frame exists").1 += 1;
                if !visited[target] {
                    visited[target] = true;
                    frames.push((target, 0));
                }
            } else {
                frames.pop();
                post_order.push(node);
            }
        }
    }
    post_order
        .iter()
        .rev()
        .map(|&id| nodes[id].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::RefGraph;
    use serde_json::json;

    #[test]
    fn collects_pointers_and_refs() {
        let document = json!({
            "components": {
                "schemas": {
                    "User": {"type": "object", "properties": {"pet": {"$ref": "#/components/schemas/Pet"}}},
                    "Pet": {"type": "object"},
                }
            }
        });
        let graph = RefGraph::build(&document);
        assert!(graph.contains_pointer("#"));
        assert!(graph.contains_pointer("#/components/schemas/User"));
        assert!(graph.contains_pointer("#/components/schemas/User/properties/pet"));
        assert!(graph.refs().contains("#/components/schemas/Pet"));
        assert_eq!(
            graph
                .refs_from("#/components/schemas/User/properties/pet")
                .unwrap()
                .len(),
            1
        );
        assert!(graph
            .sources_of("#/components/schemas/Pet")
            .unwrap()
            .contains("#/components/schemas/User/properties/pet"));
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let graph = RefGraph::build(&json!({"$ref": "#"}));
        assert!(graph.is_cyclic("#"));
        assert_eq!(graph.cycles(), [vec![String::from("#")]]);
    }

    #[test]
    fn mutual_defs_cycle() {
        let document = json!({
            "$defs": {
                "A": {"$ref": "#/$defs/B"},
                "B": {"$ref": "#/$defs/A"},
            },
            "$ref": "#/$defs/A",
        });
        let graph = RefGraph::build(&document);
        assert!(graph.is_cyclic("#/$defs/A"));
        assert!(graph.is_cyclic("#/$defs/B"));
        assert!(!graph.is_cyclic("#"));
        assert_eq!(graph.cycles().len(), 1);
        assert_eq!(
            graph.cycles()[0],
            vec![String::from("#/$defs/A"), String::from("#/$defs/B")]
        );
    }

    #[test]
    fn escaped_keys_produce_escaped_pointers() {
        let graph = RefGraph::build(&json!({"paths": {"/users/{id}": {"get": {}}}}));
        assert!(graph.contains_pointer("#/paths/~1users~1{id}/get"));
    }

    #[test]
    fn census_is_idempotent() {
        let document = json!({
            "$defs": {
                "A": {"$ref": "#/$defs/B"},
                "B": {"$ref": "#/$defs/A"},
                "C": {"$ref": "#/$defs/C"},
                "D": {"items": {"$ref": "#/$defs/A"}},
            }
        });
        let first = RefGraph::build(&document);
        let second = RefGraph::build(&document);
        assert_eq!(first.cycles(), second.cycles());
        assert_eq!(first.cyclic_refs(), second.cyclic_refs());
        assert_eq!(first.processing_order(), second.processing_order());
    }

    #[test]
    fn unresolvable_refs_still_appear_in_the_graph() {
        let graph = RefGraph::build(&json!({"$ref": "#/nowhere"}));
        assert!(graph.refs().contains("#/nowhere"));
        assert!(!graph.is_cyclic("#/nowhere"));
    }

    #[test]
    fn processing_order_is_topological_outside_cycles() {
        let document = json!({
            "$defs": {
                "Leaf": {"type": "string"},
                "Mid": {"$ref": "#/$defs/Leaf"},
                "Top": {"$ref": "#/$defs/Mid"},
            }
        });
        let order = RefGraph::build(&document).processing_order().to_vec();
        let position = |node: &str| order.iter().position(|n| n == node).unwrap();
        assert!(position("#/$defs/Top") < position("#/$defs/Mid"));
        assert!(position("#/$defs/Mid") < position("#/$defs/Leaf"));
    }
}
