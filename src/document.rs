//! roxmltree-backed implementation of the XPath engine's document contract.

use roxmltree::Node;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use xmlcheck_xpath::{DataSourceNode, NodeType, QName};

/// An immutable XML document snapshot, as retrieved from the remote system.
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        Ok(Self {
            doc: roxmltree::Document::parse(text)?,
        })
    }

    pub fn root_node(&self) -> XmlNode<'_, 'input> {
        XmlNode::Tree(self.doc.root())
    }
}

/// A navigable handle into the document. roxmltree keeps attributes as data
/// on their element rather than as tree nodes, so attribute handles carry
/// the owning element plus the attribute index.
#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    Tree(Node<'a, 'input>),
    Attr {
        owner: Node<'a, 'input>,
        index: usize,
    },
}

impl<'a, 'input> XmlNode<'a, 'input> {
    /// Document-order sort key: owning tree node first, attributes after
    /// their element, attribute index as the tiebreaker.
    fn sort_key(&self) -> (usize, u8, usize) {
        match self {
            XmlNode::Tree(node) => (node.id().get_usize(), 0, 0),
            XmlNode::Attr { owner, index } => (owner.id().get_usize(), 1, *index),
        }
    }
}

impl<'a, 'input> PartialEq for XmlNode<'a, 'input> {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}
impl<'a, 'input> Eq for XmlNode<'a, 'input> {}

impl<'a, 'input> PartialOrd for XmlNode<'a, 'input> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<'a, 'input> Ord for XmlNode<'a, 'input> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl<'a, 'input> Hash for XmlNode<'a, 'input> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl<'a> DataSourceNode<'a> for XmlNode<'a, 'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Tree(node) => {
                if node.is_root() {
                    NodeType::Root
                } else if node.is_text() {
                    NodeType::Text
                } else if node.is_comment() {
                    NodeType::Comment
                } else if node.is_pi() {
                    NodeType::ProcessingInstruction
                } else {
                    NodeType::Element
                }
            }
            XmlNode::Attr { .. } => NodeType::Attribute,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Tree(node) => {
                if node.is_element() {
                    Some(QName {
                        prefix: None,
                        local_part: node.tag_name().name(),
                    })
                } else if node.is_pi() {
                    node.pi().map(|pi| QName {
                        prefix: None,
                        local_part: pi.target,
                    })
                } else {
                    None
                }
            }
            XmlNode::Attr { owner, index } => owner.attributes().nth(*index).map(|attr| QName {
                prefix: None,
                local_part: attr.name(),
            }),
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Tree(node) => {
                if node.is_element() || node.is_root() {
                    node.descendants()
                        .filter(|n| n.is_text())
                        .filter_map(|n| n.text())
                        .collect()
                } else if node.is_pi() {
                    node.pi()
                        .and_then(|pi| pi.value)
                        .unwrap_or_default()
                        .to_string()
                } else {
                    // Text and comment nodes.
                    node.text().unwrap_or_default().to_string()
                }
            }
            XmlNode::Attr { owner, index } => owner
                .attributes()
                .nth(*index)
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Tree(node) => {
                let owner = *node;
                let count = node.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attr { owner, index }))
            }
            XmlNode::Attr { .. } => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Tree(node) => Box::new(node.children().map(XmlNode::Tree)),
            XmlNode::Attr { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Tree(node) => node.parent().map(XmlNode::Tree),
            XmlNode::Attr { owner, .. } => Some(XmlNode::Tree(*owner)),
        }
    }
}
