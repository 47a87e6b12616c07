//! Generic parent/child navigation over hierarchical preference nodes.
//!
//! Node sources may hand back freshly materialized values on every query, so
//! two nodes are the same node iff their ids are equal. Reference identity is
//! never consulted.

use std::sync::{Arc, Weak};

use crate::error::{CoreError, Result};

/// A node in a hierarchy that can be navigated by id.
pub trait TreeNode: Clone {
    /// Identifier of this node. Must be non-empty.
    fn id(&self) -> &str;

    /// Direct children, in display order.
    fn children(&self) -> Vec<Self>;
}

fn ensure_well_formed<N: TreeNode>(node: &N, role: &str) -> Result<()> {
    if node.id().is_empty() {
        return Err(CoreError::invalid_argument(format!(
            "{role} node has an empty id"
        )));
    }
    Ok(())
}

/// Find the node whose direct children include a node with `target`'s id.
///
/// Depth-first pre-order over an explicit stack. A node carrying the target
/// id is never descended into, so `find_parent(root, root)` is `Ok(None)`.
/// Returns `Ok(None)` when the target is not reachable from `root`.
///
/// # Errors
///
/// Returns `InvalidArgument` if `root` or `target` has an empty id.
pub fn find_parent<N: TreeNode>(root: &N, target: &N) -> Result<Option<N>> {
    ensure_well_formed(root, "root")?;
    ensure_well_formed(target, "target")?;
    let target_id = target.id();

    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if node.id() == target_id {
            continue;
        }
        let children = node.children();
        if children.iter().any(|child| child.id() == target_id) {
            return Ok(Some(node));
        }
        // Reverse so the leftmost child is visited first.
        stack.extend(children.into_iter().rev());
    }

    Ok(None)
}

/// Find the first node (pre-order) carrying `id`, including `root` itself.
pub fn find_node<N: TreeNode>(root: &N, id: &str) -> Option<N> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return Some(node);
        }
        stack.extend(node.children().into_iter().rev());
    }
    None
}

pub fn children<N: TreeNode>(node: &N) -> Vec<N> {
    node.children()
}

pub fn has_children<N: TreeNode>(node: &N) -> bool {
    !node.children().is_empty()
}

/// Tree content provider for a preference-style viewer.
///
/// Holds a weak reference to the bound root; the caller owns the tree.
#[derive(Debug)]
pub struct TreeContentProvider<N> {
    input: Option<Weak<N>>,
}

impl<N> Default for TreeContentProvider<N> {
    fn default() -> Self {
        Self { input: None }
    }
}

impl<N: TreeNode> TreeContentProvider<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new root. The previous binding is simply dropped.
    pub fn set_input(&mut self, root: &Arc<N>) {
        self.input = Some(Arc::downgrade(root));
    }

    pub fn dispose(&mut self) {
        self.input = None;
    }

    /// The bound root, if it is still alive.
    pub fn input(&self) -> Option<Arc<N>> {
        self.input.as_ref().and_then(Weak::upgrade)
    }

    /// Top-level rows: the children of `root`. The root itself is never a row.
    pub fn elements(&self, root: &N) -> Vec<N> {
        root.children()
    }

    pub fn children(&self, node: &N) -> Vec<N> {
        children(node)
    }

    pub fn has_children(&self, node: &N) -> bool {
        has_children(node)
    }

    /// Parent of `node` within the bound root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no live root is bound and
    /// `InvalidArgument` for nodes with empty ids.
    pub fn parent(&self, node: &N) -> Result<Option<N>> {
        let root = self
            .input()
            .ok_or_else(|| CoreError::invalid_state("tree content provider has no input"))?;
        find_parent(root.as_ref(), node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Test node that rebuilds its children on every call, like a model
    /// accessor that materializes fresh wrappers per query.
    #[derive(Debug, Clone, PartialEq)]
    struct Page {
        id: String,
        kids: Vec<Page>,
    }

    impl Page {
        fn leaf(id: &str) -> Self {
            Self {
                id: id.to_string(),
                kids: Vec::new(),
            }
        }

        fn with(id: &str, kids: Vec<Page>) -> Self {
            Self {
                id: id.to_string(),
                kids,
            }
        }
    }

    impl TreeNode for Page {
        fn id(&self) -> &str {
            &self.id
        }

        fn children(&self) -> Vec<Self> {
            self.kids.clone()
        }
    }

    fn sample() -> Page {
        Page::with(
            "root",
            vec![
                Page::with(
                    "general",
                    vec![Page::leaf("appearance"), Page::with("keys", vec![Page::leaf("emacs")])],
                ),
                Page::with("capabilities", vec![Page::leaf("advanced")]),
            ],
        )
    }

    #[test]
    fn finds_direct_and_nested_parents() {
        let root = sample();
        let parent = find_parent(&root, &Page::leaf("general")).unwrap().unwrap();
        assert_eq!(parent.id(), "root");

        let parent = find_parent(&root, &Page::leaf("emacs")).unwrap().unwrap();
        assert_eq!(parent.id(), "keys");

        let parent = find_parent(&root, &Page::leaf("advanced")).unwrap().unwrap();
        assert_eq!(parent.id(), "capabilities");
    }

    #[test]
    fn matches_by_id_not_by_value() {
        let root = sample();
        // Same id, different children: still the same node.
        let impostor = Page::with("keys", vec![Page::leaf("vi")]);
        let parent = find_parent(&root, &impostor).unwrap().unwrap();
        assert_eq!(parent.id(), "general");
    }

    #[test]
    fn root_has_no_parent() {
        let root = sample();
        assert!(find_parent(&root, &root).unwrap().is_none());
    }

    #[test]
    fn unreachable_target_is_not_found() {
        let root = sample();
        assert!(find_parent(&root, &Page::leaf("missing")).unwrap().is_none());
    }

    #[test]
    fn empty_ids_are_rejected() {
        let root = sample();
        let err = find_parent(&root, &Page::leaf("")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        let err = find_parent(&Page::leaf(""), &root).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn find_node_includes_root() {
        let root = sample();
        assert_eq!(find_node(&root, "root").unwrap().id(), "root");
        assert_eq!(find_node(&root, "emacs").unwrap().id(), "emacs");
        assert!(find_node(&root, "nope").is_none());
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut node = Page::leaf("n0");
        for i in 1..1_000 {
            node = Page::with(&format!("n{i}"), vec![node]);
        }
        let parent = find_parent(&node, &Page::leaf("n0")).unwrap().unwrap();
        assert_eq!(parent.id(), "n1");
    }

    #[test]
    fn provider_elements_skip_the_root() {
        let provider = TreeContentProvider::<Page>::new();
        let root = sample();
        let ids: Vec<String> = provider.elements(&root).iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["general", "capabilities"]);
        assert!(provider.has_children(&root));
        assert!(!provider.has_children(&Page::leaf("x")));
    }

    #[test]
    fn provider_parent_uses_bound_input() {
        let mut provider = TreeContentProvider::new();
        let root = Arc::new(sample());
        provider.set_input(&root);
        let parent = provider.parent(&Page::leaf("appearance")).unwrap().unwrap();
        assert_eq!(parent.id(), "general");

        let other = Arc::new(Page::with("other", vec![Page::leaf("appearance")]));
        provider.set_input(&other);
        let parent = provider.parent(&Page::leaf("appearance")).unwrap().unwrap();
        assert_eq!(parent.id(), "other");
    }

    #[test]
    fn provider_without_live_input_is_invalid_state() {
        let mut provider = TreeContentProvider::new();
        assert!(matches!(
            provider.parent(&Page::leaf("a")),
            Err(CoreError::InvalidState(_))
        ));

        let root = Arc::new(sample());
        provider.set_input(&root);
        drop(root);
        assert!(matches!(
            provider.parent(&Page::leaf("general")),
            Err(CoreError::InvalidState(_))
        ));

        let root = Arc::new(sample());
        provider.set_input(&root);
        provider.dispose();
        assert!(provider.input().is_none());
    }

    fn arb_tree() -> impl Strategy<Value = Page> {
        // Ids are assigned afterwards so they stay unique.
        let leaf = Just(Page::leaf(""));
        leaf.prop_recursive(4, 40, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(|kids| Page::with("", kids))
        })
    }

    fn number(page: &mut Page, next: &mut usize) {
        page.id = format!("p{next}");
        *next += 1;
        for kid in &mut page.kids {
            number(kid, next);
        }
    }

    fn collect_edges(page: &Page, out: &mut Vec<(String, String)>) {
        for kid in &page.kids {
            out.push((page.id.clone(), kid.id.clone()));
            collect_edges(kid, out);
        }
    }

    proptest! {
        #[test]
        fn every_reachable_node_finds_its_unique_parent(mut tree in arb_tree()) {
            let mut next = 0;
            number(&mut tree, &mut next);
            let mut edges = Vec::new();
            collect_edges(&tree, &mut edges);

            for (parent, child) in edges {
                let found = find_parent(&tree, &Page::leaf(&child)).unwrap();
                prop_assert_eq!(found.map(|p| p.id), Some(parent));
            }
            prop_assert!(find_parent(&tree, &tree).unwrap().is_none());
        }
    }
}
