//! Node-children cache
//!
//! Memoizes children produced by resolver functions, keyed by node id.
//! An entry is only valid for the context it was computed with.

use super::node::{Context, NavigationNode, NodeId};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    context: Context,
    children: Vec<NavigationNode>,
}

#[derive(Debug, Default)]
pub struct ChildrenCache {
    entries: RefCell<HashMap<NodeId, Entry>>,
}

impl ChildrenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeId, context: &Context) -> Option<Vec<NavigationNode>> {
        self.entries
            .borrow()
            .get(id)
            .filter(|e| &e.context == context)
            .map(|e| e.children.clone())
    }

    pub fn insert(&self, id: NodeId, context: Context, children: Vec<NavigationNode>) {
        self.entries.borrow_mut().insert(id, Entry { context, children });
    }

    /// Drop the entry for `id` and everything beneath it.
    pub fn invalidate_below(&self, id: &NodeId) {
        let prefix = format!("{}.", id.as_str());
        self.entries
            .borrow_mut()
            .retain(|k, _| k != id && !k.as_str().starts_with(&prefix));
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_context_bound_and_prefix_invalidated() {
        let cache = ChildrenCache::new();
        let a = NodeId::root().child(0);
        let b = a.child(1);
        let other = NodeId::root().child(1);
        let mut ctx = Context::new();
        ctx.insert("k".into(), "v".into());

        cache.insert(a.clone(), ctx.clone(), vec![NavigationNode::new("x")]);
        cache.insert(b.clone(), ctx.clone(), vec![]);
        cache.insert(other.clone(), ctx.clone(), vec![]);

        assert!(cache.get(&a, &ctx).is_some());
        assert!(cache.get(&a, &Context::new()).is_none());

        cache.invalidate_below(&a);
        assert!(cache.get(&a, &ctx).is_none());
        assert!(cache.get(&b, &ctx).is_none());
        assert!(cache.get(&other, &ctx).is_some());
    }
}
