//! Node collection along each XPath axis.

use crate::ast::Axis;
use crate::datasource::DataSourceNode;
use std::collections::HashSet;

/// Collects all nodes reachable from `context_nodes` along `axis`, deduplicated,
/// preserving the axis traversal order (document order for forward axes).
pub fn collect<'a, N>(axis: Axis, context_nodes: &[N]) -> Vec<N>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &node in context_nodes {
        walk(axis, node, &mut seen, &mut out);
    }
    out
}

fn add<'a, N: DataSourceNode<'a>>(node: N, seen: &mut HashSet<N>, out: &mut Vec<N>) {
    if seen.insert(node) {
        out.push(node);
    }
}

fn walk<'a, N>(axis: Axis, node: N, seen: &mut HashSet<N>, out: &mut Vec<N>)
where
    N: DataSourceNode<'a> + 'a,
{
    match axis {
        Axis::SelfAxis => add(node, seen, out),
        Axis::Child => {
            for child in node.children() {
                add(child, seen, out);
            }
        }
        Axis::Attribute => {
            for attr in node.attributes() {
                add(attr, seen, out);
            }
        }
        Axis::Descendant => descend(node, seen, out),
        Axis::DescendantOrSelf => {
            add(node, seen, out);
            descend(node, seen, out);
        }
        Axis::Parent => {
            if let Some(parent) = node.parent() {
                add(parent, seen, out);
            }
        }
        Axis::Ancestor => {
            let mut current = node.parent();
            while let Some(p) = current {
                add(p, seen, out);
                current = p.parent();
            }
        }
        Axis::FollowingSibling => {
            for sibling in siblings_after(node) {
                add(sibling, seen, out);
            }
        }
        Axis::PrecedingSibling => {
            for sibling in siblings_before(node) {
                add(sibling, seen, out);
            }
        }
        Axis::Following => {
            let mut current = Some(node);
            while let Some(c) = current {
                for sibling in siblings_after(c) {
                    add(sibling, seen, out);
                    descend(sibling, seen, out);
                }
                current = c.parent();
            }
        }
        Axis::Preceding => {
            let mut current = Some(node);
            while let Some(c) = current {
                for sibling in siblings_before(c) {
                    add(sibling, seen, out);
                    descend(sibling, seen, out);
                }
                current = c.parent();
            }
        }
    }
}

/// Depth-first, document-order walk over all descendants of `node`.
fn descend<'a, N>(node: N, seen: &mut HashSet<N>, out: &mut Vec<N>)
where
    N: DataSourceNode<'a> + 'a,
{
    for child in node.children() {
        add(child, seen, out);
        descend(child, seen, out);
    }
}

fn siblings_after<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    parent
        .children()
        .skip_while(|&s| s != node)
        .skip(1)
        .collect()
}

fn siblings_before<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    parent.children().take_while(|&s| s != node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::sample_tree;

    #[test]
    fn child_axis_preserves_order() {
        let tree = sample_tree();
        let result = tree.node(1);
        let children = collect(Axis::Child, &[result]);
        let ids: Vec<_> = children.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 10, 14]);
    }

    #[test]
    fn descendant_axis_is_document_order() {
        let tree = sample_tree();
        let descendants = collect(Axis::Descendant, &[tree.root()]);
        let ids: Vec<_> = descendants.iter().map(|n| n.id).collect();
        // Attributes are not on the descendant axis.
        assert_eq!(ids, vec![1, 2, 5, 6, 7, 8, 9, 10, 12, 13, 14]);
    }

    #[test]
    fn ancestor_axis_walks_to_root() {
        let tree = sample_tree();
        let text = tree.node(6);
        let ancestors = collect(Axis::Ancestor, &[text]);
        let ids: Vec<_> = ancestors.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 2, 1, 0]);
    }

    #[test]
    fn sibling_axes() {
        let tree = sample_tree();
        let item1 = tree.node(2);
        let after = collect(Axis::FollowingSibling, &[item1]);
        assert_eq!(after.iter().map(|n| n.id).collect::<Vec<_>>(), vec![10, 14]);

        let pi = tree.node(14);
        let before = collect(Axis::PrecedingSibling, &[pi]);
        assert_eq!(before.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 10]);
    }

    #[test]
    fn following_includes_descendants_of_later_siblings() {
        let tree = sample_tree();
        let cost_text = tree.node(9);
        let mut following = collect(Axis::Following, &[cost_text]);
        following.sort();
        let ids: Vec<_> = following.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![10, 12, 13, 14]);
    }

    #[test]
    fn preceding_excludes_ancestors() {
        let tree = sample_tree();
        let item2 = tree.node(10);
        let mut preceding = collect(Axis::Preceding, &[item2]);
        preceding.sort();
        let ids: Vec<_> = preceding.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn attribute_axis() {
        let tree = sample_tree();
        let attrs = collect(Axis::Attribute, &[tree.node(2)]);
        assert_eq!(attrs.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 4]);
    }
}
