//! JSON form of nodes and fragments.
//!
//! ```json
//! { "id": "…", "type": "doc", "content": { "size": 3, "nodes": [
//!     { "id": "…", "type": "paragraph", "text": "abc", "content": { "size": 0, "nodes": [] } }
//! ] } }
//! ```
//!
//! `attrs` is emitted only when non-empty and `text` only for text-bearing
//! nodes. Ids are carried along but are not stable across processes, so a
//! persistence layer must not key on them.

use std::sync::Arc;

use folio_schema::Schema;
use folio_types::{trace, NodeId};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use crate::error::{ModelErrorKind, ModelResult};
use crate::factory::check_content;
use crate::fragment::Fragment;
use crate::node::{Attrs, Node};

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 5)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("type", self.type_name())?;
        if self.attrs().is_empty() {
            state.skip_field("attrs")?;
        } else {
            state.serialize_field("attrs", self.attrs())?;
        }
        match self.text() {
            Some(text) => state.serialize_field("text", text)?,
            None => state.skip_field("text")?,
        }
        state.serialize_field("content", self.content())?;
        state.end()
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Fragment", 2)?;
        state.serialize_field("size", &self.size())?;
        state.serialize_field("nodes", self.nodes())?;
        state.end()
    }
}

impl Node {
    pub fn to_json(&self) -> ModelResult<Value> {
        serde_json::to_value(self).map_err(|e| ModelErrorKind::Json(e.to_string()).into())
    }

    /// Rebuild a tree from its JSON form, looking types up in `schema`.
    ///
    /// Ids are kept when present and minted otherwise. A `size` that does not
    /// match the rebuilt content is rejected.
    pub fn from_json(schema: &Schema, value: &Value) -> ModelResult<Node> {
        let _op = trace::enter("Node::from_json");
        let object = value
            .as_object()
            .ok_or_else(|| malformed("node must be an object"))?;
        let name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("node is missing `type`"))?;
        let node_type = schema.get(name)?;

        let id = match object.get("id") {
            None | Some(Value::Null) => NodeId::new(),
            Some(Value::String(raw)) => raw
                .parse::<NodeId>()
                .map_err(|e| malformed(&e.to_string()))?,
            Some(_) => return Err(malformed("`id` must be a string").into()),
        };
        let attrs: Attrs = match object.get("attrs") {
            None | Some(Value::Null) => Attrs::new(),
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(_) => return Err(malformed("`attrs` must be an object").into()),
        };

        if node_type.is_text() {
            let text = object
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(&format!("text-bearing `{name}` is missing `text`")))?;
            return Ok(Node::from_parts(
                id,
                node_type,
                attrs,
                Fragment::empty(),
                Some(text.to_string()),
            ));
        }

        let content = match object.get("content") {
            None | Some(Value::Null) => Fragment::empty(),
            Some(value) => Fragment::from_json(schema, value)?,
        };
        if (node_type.is_leaf() || node_type.is_inline_leaf()) && !content.is_empty() {
            return Err(malformed(&format!("leaf `{name}` cannot hold content")).into());
        }
        check_content(schema, &node_type, &content)?;
        Ok(Node::from_parts(id, Arc::clone(&node_type), attrs, content, None))
    }
}

impl Fragment {
    pub fn from_json(schema: &Schema, value: &Value) -> ModelResult<Fragment> {
        let nodes = value
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("fragment is missing `nodes`"))?;
        let fragment = nodes
            .iter()
            .map(|n| Node::from_json(schema, n))
            .collect::<ModelResult<Vec<_>>>()
            .map(Fragment::from_nodes)?;
        if let Some(size) = value.get("size").and_then(Value::as_u64) {
            if size as usize != fragment.size() {
                return Err(malformed(&format!(
                    "fragment declares size {size} but holds {}",
                    fragment.size()
                ))
                .into());
            }
        }
        Ok(fragment)
    }
}

fn malformed(reason: &str) -> ModelErrorKind {
    ModelErrorKind::Json(reason.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_util::*;

    fn sample() -> Node {
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), Value::from(2));
        doc(vec![
            header("Title").with_attrs(attrs),
            line(vec![t("ab"), img()]),
            blockquote(vec![p("quoted")]),
        ])
    }

    #[test]
    fn shape_matches_wire_format() {
        let d = sample();
        let value = d.to_json().unwrap();
        assert_eq!(value["type"], "doc");
        assert_eq!(value["id"], d.id().to_string());
        assert_eq!(value["content"]["size"], d.content_size());
        let header = &value["content"]["nodes"][0];
        assert_eq!(header["text"], "Title");
        assert_eq!(header["attrs"]["level"], 2);
        assert!(value["content"]["nodes"][1].get("text").is_none());
        assert!(value["content"]["nodes"][1].get("attrs").is_none());
    }

    #[test]
    fn roundtrip_preserves_tree_and_ids() {
        let d = sample();
        let value = d.to_json().unwrap();
        let rebuilt = Node::from_json(schema(), &value).unwrap();
        assert_eq!(rebuilt, d);
        assert!(rebuilt.strict_eq(&d));
        assert_eq!(rebuilt.node_size(), d.node_size());
    }

    #[test]
    fn missing_ids_are_minted() {
        let value = json!({
            "type": "doc",
            "content": { "nodes": [ { "type": "paragraph", "text": "hi" } ] }
        });
        let node = Node::from_json(schema(), &value).unwrap();
        assert_eq!(node.content_size(), 2);
        assert_eq!(node.child(0).unwrap().text(), Some("hi"));
    }

    #[test]
    fn unknown_type_is_reported() {
        let value = json!({ "type": "table" });
        let err = Node::from_json(schema(), &value).unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::UnknownType("table".into()));
    }

    #[test]
    fn malformed_input_is_reported() {
        let missing_text = json!({ "type": "paragraph" });
        assert!(matches!(
            Node::from_json(schema(), &missing_text).unwrap_err().kind,
            ModelErrorKind::Json(_)
        ));

        let wrong_size = json!({
            "type": "doc",
            "content": { "size": 9, "nodes": [ { "type": "paragraph", "text": "hi" } ] }
        });
        let err = Node::from_json(schema(), &wrong_size).unwrap_err();
        assert!(err.to_string().contains("declares size 9"));

        let leaf_with_content = json!({
            "type": "image",
            "content": { "nodes": [ { "type": "text", "text": "x" } ] }
        });
        assert!(Node::from_json(schema(), &leaf_with_content).is_err());

        let bad_id = json!({ "type": "paragraph", "id": "nope", "text": "x" });
        assert!(Node::from_json(schema(), &bad_id).is_err());
    }
}
