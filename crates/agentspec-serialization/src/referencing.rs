//! Reference structure of a component graph
//!
//! For every component reachable from a root, records the set of parent
//! ids across the whole graph. Shared components (more than one parent) and
//! orphans (declared but unreachable) are informational, never fatal.

use agentspec_core::{Component, ComponentRef};
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::VecDeque;

/// Components referenced directly by `component`, first occurrence order
///
/// Follows lists, maps and model objects, one component level deep.
#[must_use]
pub fn direct_children(component: &Component) -> Vec<ComponentRef> {
    let mut seen = IndexMap::new();
    component.for_each_child(|child| {
        seen.entry(child.id().to_string())
            .or_insert_with(|| ComponentRef::clone(child));
    });
    seen.into_values().collect()
}

/// Parent relation over every component reachable from a root
#[derive(Debug, Clone)]
pub struct ReferencingStructure {
    root_id: String,
    parents: IndexMap<String, IndexSet<String>>,
    components: IndexMap<String, ComponentRef>,
}

/// Walk the graph under `root` breadth-first
///
/// Each distinct id is expanded once, so work is bounded by the number of
/// distinct components regardless of sharing.
#[must_use]
pub fn compute_referencing_structure(root: &ComponentRef) -> ReferencingStructure {
    let mut parents: IndexMap<String, IndexSet<String>> = IndexMap::new();
    let mut components: IndexMap<String, ComponentRef> = IndexMap::new();
    let mut queue = VecDeque::new();

    parents.insert(root.id().to_string(), IndexSet::new());
    components.insert(root.id().to_string(), ComponentRef::clone(root));
    queue.push_back(ComponentRef::clone(root));

    while let Some(current) = queue.pop_front() {
        for child in direct_children(&current) {
            parents
                .entry(child.id().to_string())
                .or_default()
                .insert(current.id().to_string());
            if !components.contains_key(child.id()) {
                components.insert(child.id().to_string(), ComponentRef::clone(&child));
                queue.push_back(child);
            }
        }
    }

    ReferencingStructure {
        root_id: root.id().to_string(),
        parents,
        components,
    }
}

impl ReferencingStructure {
    /// Root component id
    #[inline]
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Parent ids of a component
    #[inline]
    #[must_use]
    pub fn parents_of(&self, id: &str) -> Option<&IndexSet<String>> {
        self.parents.get(id)
    }

    /// Check if a component is reachable from the root
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Reachable component by id
    #[inline]
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&ComponentRef> {
        self.components.get(id)
    }

    /// Reachable components in discovery order, root first
    #[inline]
    pub fn components(&self) -> impl Iterator<Item = &ComponentRef> {
        self.components.values()
    }

    /// Ids of components with more than one parent
    pub fn shared_components(&self) -> impl Iterator<Item = &str> {
        self.parents
            .iter()
            .filter(|(_, parents)| parents.len() > 1)
            .map(|(id, _)| id.as_str())
    }

    /// Declared ids that are not reachable from the root
    #[must_use]
    pub fn orphans<'a>(&self, declared: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        declared.into_iter().filter(|id| !self.contains(id)).collect()
    }

    /// Reachable components ordered so that children precede parents
    #[must_use]
    pub fn children_first_order(&self) -> Vec<&ComponentRef> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (child, parents) in &self.parents {
            graph.add_node(child.as_str());
            for parent in parents {
                graph.add_edge(child.as_str(), parent.as_str(), ());
            }
        }

        // Distinct components sharing an id can close a loop; fall back to
        // reverse discovery order in that case.
        match toposort(&graph, None) {
            Ok(order) => order
                .into_iter()
                .filter_map(|id| self.components.get(id))
                .collect(),
            Err(_) => self.components.values().rev().collect(),
        }
    }

    /// Number of reachable components, root included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false: the root is reachable from itself
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentspec_core::prelude::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register("Leaf", ComponentShape::new(), validating_factory)
            .unwrap();
        registry
            .register(
                "Pair",
                ComponentShape::new()
                    .with_field(FieldDescriptor::new("left", FieldKind::any_component()))
                    .with_field(FieldDescriptor::new(
                        "right",
                        FieldKind::list(FieldKind::any_component()),
                    )),
                validating_factory,
            )
            .unwrap();
        registry
    }

    fn leaf(registry: &TypeRegistry, id: &str) -> ComponentRef {
        Component::builder("Leaf", id).id(id).build(registry).unwrap()
    }

    #[test]
    fn diamond_is_shared() {
        let registry = registry();
        let shared = leaf(&registry, "shared");
        let a = Component::builder("Pair", "a")
            .id("a")
            .field("left", &shared)
            .field("right", Vec::<FieldValue>::new())
            .build(&registry)
            .unwrap();
        let b = Component::builder("Pair", "b")
            .id("b")
            .field("left", &shared)
            .field("right", vec![shared.clone()])
            .build(&registry)
            .unwrap();
        let root = Component::builder("Pair", "root")
            .id("root")
            .field("left", &a)
            .field("right", vec![b.clone()])
            .build(&registry)
            .unwrap();

        assert_eq!(direct_children(&b).len(), 1);

        let structure = compute_referencing_structure(&root);
        assert_eq!(structure.len(), 4);
        assert_eq!(structure.shared_components().collect::<Vec<_>>(), vec!["shared"]);
        assert_eq!(
            structure.parents_of("shared").unwrap().iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(structure.parents_of("root").unwrap().is_empty());
        assert_eq!(structure.orphans(["a", "elsewhere"]), vec!["elsewhere"]);

        let order: Vec<&str> = structure
            .children_first_order()
            .into_iter()
            .map(|c| c.id())
            .collect();
        let position = |id: &str| order.iter().position(|o| *o == id).unwrap();
        assert!(position("shared") < position("a"));
        assert!(position("shared") < position("b"));
        assert!(position("a") < position("root"));
        assert_eq!(order.len(), 4);
    }
}
