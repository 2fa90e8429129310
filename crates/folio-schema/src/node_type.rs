use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The concrete node variant a type is bound to.
///
/// Every registered type binds to exactly one kind. The binding is fixed at
/// registration and never changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a document tree.
    Document,
    /// Block of running text (raw text or inline children).
    Paragraph,
    /// Heading block.
    Header,
    /// Container of other blocks.
    Blockquote,
    /// Inline run of characters.
    Text,
    /// Atomic node without content (images, breaks, rules).
    Leaf,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Paragraph => write!(f, "paragraph"),
            Self::Header => write!(f, "header"),
            Self::Blockquote => write!(f, "blockquote"),
            Self::Text => write!(f, "text"),
            Self::Leaf => write!(f, "leaf"),
        }
    }
}

/// Schema flags for a node type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node carries a raw string instead of child nodes.
    #[serde(default)]
    pub text: bool,
    /// Node participates in inline flow.
    #[serde(default)]
    pub inline: bool,
    /// Node has no content.
    #[serde(default)]
    pub leaf: bool,
    /// Node isolates its content from edits that span its edges.
    #[serde(default)]
    pub boundary: bool,
    /// Node can be selected as a whole.
    #[serde(default)]
    pub selectable: bool,
    /// Group name used by content expressions (e.g. `"block"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Content expression, interpreted by the [`ContentValidator`](crate::ContentValidator).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NodeSpec {
    /// Spec for a text-bearing node.
    pub fn text() -> Self {
        Self {
            text: true,
            ..Default::default()
        }
    }

    /// Spec for an inline atomic node.
    pub fn inline_leaf() -> Self {
        Self {
            inline: true,
            leaf: true,
            selectable: true,
            ..Default::default()
        }
    }

    /// Spec for a container with the given content expression.
    pub fn container(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_inline(mut self) -> Self {
        self.inline = true;
        self
    }

    /// Fill every field the patch leaves unset from `self`.
    pub fn merged(&self, patch: &NodeSpecPatch) -> Self {
        Self {
            text: patch.text.unwrap_or(self.text),
            inline: patch.inline.unwrap_or(self.inline),
            leaf: patch.leaf.unwrap_or(self.leaf),
            boundary: patch.boundary.unwrap_or(self.boundary),
            selectable: patch.selectable.unwrap_or(self.selectable),
            group: patch.group.clone().or_else(|| self.group.clone()),
            content: patch.content.clone().or_else(|| self.content.clone()),
        }
    }
}

/// Partial [`NodeSpec`] used by `Registry::extend`; `None` fields inherit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpecPatch {
    pub text: Option<bool>,
    pub inline: Option<bool>,
    pub leaf: Option<bool>,
    pub boundary: Option<bool>,
    pub selectable: Option<bool>,
    pub group: Option<String>,
    pub content: Option<String>,
}

/// An immutable node type descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique registry key.
    pub name: String,
    /// Concrete variant this type builds.
    pub kind: NodeKind,
    pub spec: NodeSpec,
    /// Free-form metadata for collaborators (renderers, serializers).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
}

impl NodeType {
    pub fn new(name: impl Into<String>, kind: NodeKind, spec: NodeSpec) -> Self {
        Self {
            name: name.into(),
            kind,
            spec,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn is_text(&self) -> bool {
        self.spec.text
    }

    /// Inline node that is not text: occupies exactly one position.
    pub fn is_inline_leaf(&self) -> bool {
        self.spec.inline && !self.spec.text
    }

    pub fn is_leaf(&self) -> bool {
        self.spec.leaf
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.spec.group.as_deref() == Some(group)
    }

    /// Why `kind` and `spec` disagree, if they do.
    pub(crate) fn binding_conflict(&self) -> Option<String> {
        let spec = &self.spec;
        let conflict = match self.kind {
            NodeKind::Text if !spec.text => Some("text kind requires the `text` flag"),
            NodeKind::Leaf if spec.text => Some("leaf kind cannot be text-bearing"),
            NodeKind::Leaf if !spec.leaf => Some("leaf kind requires the `leaf` flag"),
            NodeKind::Document if spec.text || spec.inline || spec.leaf => {
                Some("document kind must be a block container")
            }
            NodeKind::Blockquote if spec.text || spec.leaf => {
                Some("blockquote kind must be a container")
            }
            _ if spec.text && spec.leaf => Some("`text` and `leaf` are exclusive"),
            _ => None,
        };
        conflict.map(str::to_string)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_inherits_unset_fields() {
        let base = NodeSpec::container("inline*").with_group("block");
        let patch = NodeSpecPatch {
            boundary: Some(true),
            ..Default::default()
        };
        let merged = base.merged(&patch);
        assert!(merged.boundary);
        assert_eq!(merged.group.as_deref(), Some("block"));
        assert_eq!(merged.content.as_deref(), Some("inline*"));
    }

    #[test]
    fn merged_overrides_set_fields() {
        let base = NodeSpec::text().with_group("block");
        let patch = NodeSpecPatch {
            group: Some("heading".into()),
            ..Default::default()
        };
        assert_eq!(base.merged(&patch).group.as_deref(), Some("heading"));
        assert!(base.merged(&patch).text);
    }

    #[test]
    fn inline_leaf_is_not_text() {
        let image = NodeType::new("image", NodeKind::Leaf, NodeSpec::inline_leaf());
        assert!(image.is_inline_leaf());
        assert!(!image.is_text());

        let text = NodeType::new("text", NodeKind::Text, NodeSpec::text().with_inline());
        assert!(!text.is_inline_leaf());
    }

    #[test]
    fn binding_conflicts_detected() {
        let bad = NodeType::new("text", NodeKind::Text, NodeSpec::default());
        assert!(bad.binding_conflict().is_some());

        let doc = NodeType::new("doc", NodeKind::Document, NodeSpec::text());
        assert!(doc.binding_conflict().is_some());

        let para = NodeType::new("paragraph", NodeKind::Paragraph, NodeSpec::text());
        assert!(para.binding_conflict().is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let ty = NodeType::new("header", NodeKind::Header, NodeSpec::text().with_group("block"))
            .with_meta("tag", Value::from("h1"));
        let json = serde_json::to_string(&ty).unwrap();
        let parsed: NodeType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, parsed);
    }
}
