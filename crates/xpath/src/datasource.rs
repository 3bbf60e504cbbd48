//! The abstraction over a navigable, read-only document tree.

use std::hash::Hash;

/// A qualified name: optional prefix plus local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

/// Node kinds of the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// Contract for a node in a read-only, hierarchical document.
///
/// The parser and engine are written exclusively against this trait, so any
/// tree representation (a parsed XML document, a mock tree in tests) can be
/// queried. `Ord` must order nodes by document position.
///
/// `'a` is the lifetime of the underlying document.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    /// The kind of this node.
    fn node_type(&self) -> NodeType;

    /// The qualified name, or `None` for unnamed kinds (root, text, comment).
    /// For a processing instruction this is its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The string value per the XPath 1.0 `string()` function: text content
    /// for text nodes, concatenated descendant text for elements, the value
    /// for attributes, the content for comments and processing instructions.
    fn string_value(&self) -> String;

    /// Attribute nodes of this node; empty for non-elements.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// Child nodes; empty for leaves and attributes.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// Parent node, `None` for the root.
    fn parent(&self) -> Option<Self>;
}

/// A small in-memory tree used by the engine's own tests and exported for
/// downstream integration testing.
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::hash::Hasher;

    #[derive(Debug)]
    struct MockNodeData {
        node_type: NodeType,
        name: Option<QName<'static>>,
        value: &'static str,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// Flat arena of nodes; indices double as document order.
    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    impl MockTree {
        fn push(
            &mut self,
            node_type: NodeType,
            name: Option<(&'static str, Option<&'static str>)>,
            value: &'static str,
            parent: Option<usize>,
        ) -> usize {
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                node_type,
                name: name.map(|(local, prefix)| QName {
                    prefix,
                    local_part: local,
                }),
                value,
                parent,
                children: Vec::new(),
                attributes: Vec::new(),
            });
            if let Some(pid) = parent {
                if node_type == NodeType::Attribute {
                    self.nodes[pid].attributes.push(id);
                } else {
                    self.nodes[pid].children.push(id);
                }
            }
            id
        }

        pub fn root(&self) -> MockNode<'_> {
            MockNode { id: 0, tree: self }
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }
    }

    /// A node handle carrying a reference to its arena so it can navigate.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'t> {
        pub id: usize,
        tree: &'t MockTree,
    }

    impl<'t> PartialEq for MockNode<'t> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl<'t> Eq for MockNode<'t> {}

    impl<'t> PartialOrd for MockNode<'t> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl<'t> Ord for MockNode<'t> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl<'t> Hash for MockNode<'t> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'t> DataSourceNode<'t> for MockNode<'t> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'t>> {
            self.tree.nodes[self.id].name
        }

        fn string_value(&self) -> String {
            self.tree.nodes[self.id].value.to_string()
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 't> {
            let tree = self.tree;
            let ids = tree.nodes[self.id].attributes.clone();
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 't> {
            let tree = self.tree;
            let ids = tree.nodes[self.id].children.clone();
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| MockNode {
                id,
                tree: self.tree,
            })
        }
    }

    /// Builds a response-shaped sample tree:
    ///
    /// ```text
    /// (root)                                       id 0
    /// └── Result                                   id 1
    ///     ├── Item type="Part" state="Released"    id 2 (attrs 3, 4)
    ///     │   ├── item_number → "P-1001"           id 5 (text 6)
    ///     │   ├── <!-- legacy record -->           id 7
    ///     │   └── cost → "42.5"                    id 8 (text 9)
    ///     ├── Item type="Part"                     id 10 (attr 11)
    ///     │   └── item_number → "P-1002"           id 12 (text 13)
    ///     └── <?audit trail?>                      id 14
    /// ```
    pub fn sample_tree() -> MockTree {
        let mut tree = MockTree { nodes: Vec::new() };
        let root = tree.push(NodeType::Root, None, "P-100142.5P-1002", None);
        let result = tree.push(
            NodeType::Element,
            Some(("Result", None)),
            "P-100142.5P-1002",
            Some(root),
        );
        let item1 = tree.push(
            NodeType::Element,
            Some(("Item", None)),
            "P-100142.5",
            Some(result),
        );
        tree.push(
            NodeType::Attribute,
            Some(("type", None)),
            "Part",
            Some(item1),
        );
        tree.push(
            NodeType::Attribute,
            Some(("state", None)),
            "Released",
            Some(item1),
        );
        let number1 = tree.push(
            NodeType::Element,
            Some(("item_number", None)),
            "P-1001",
            Some(item1),
        );
        tree.push(NodeType::Text, None, "P-1001", Some(number1));
        tree.push(NodeType::Comment, None, " legacy record ", Some(item1));
        let cost = tree.push(NodeType::Element, Some(("cost", None)), "42.5", Some(item1));
        tree.push(NodeType::Text, None, "42.5", Some(cost));
        let item2 = tree.push(
            NodeType::Element,
            Some(("Item", None)),
            "P-1002",
            Some(result),
        );
        tree.push(
            NodeType::Attribute,
            Some(("type", None)),
            "Part",
            Some(item2),
        );
        let number2 = tree.push(
            NodeType::Element,
            Some(("item_number", None)),
            "P-1002",
            Some(item2),
        );
        tree.push(NodeType::Text, None, "P-1002", Some(number2));
        tree.push(
            NodeType::ProcessingInstruction,
            Some(("audit", None)),
            "trail",
            Some(result),
        );
        tree
    }
}
