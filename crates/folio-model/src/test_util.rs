//! Tree builders shared by the unit tests.

use std::sync::LazyLock;

use folio_schema::{basic_registry, Schema};

use crate::factory::NodeFactory;
use crate::node::{Attrs, Node};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| basic_registry().into_schema());

pub(crate) fn schema() -> &'static Schema {
    &SCHEMA
}

pub(crate) fn p(text: &str) -> Node {
    SCHEMA.text("paragraph", text).unwrap()
}

pub(crate) fn header(text: &str) -> Node {
    SCHEMA.text("header", text).unwrap()
}

pub(crate) fn t(text: &str) -> Node {
    SCHEMA.text("text", text).unwrap()
}

pub(crate) fn img() -> Node {
    SCHEMA.leaf("image", Attrs::new()).unwrap()
}

pub(crate) fn line(children: Vec<Node>) -> Node {
    SCHEMA.node("line", Attrs::new(), children).unwrap()
}

pub(crate) fn blockquote(children: Vec<Node>) -> Node {
    SCHEMA.node("blockquote", Attrs::new(), children).unwrap()
}

pub(crate) fn doc(children: Vec<Node>) -> Node {
    SCHEMA.doc(children).unwrap()
}
