//! The slice of the pandoc JSON AST this filter reads and writes.
//!
//! Everything else in a document stays an untyped [`serde_json::Value`] and
//! is passed through byte-for-byte; only code blocks are decoded, and only
//! the replacement `Para [Image]` node is encoded.
//!
//! ```text
//! {"t":"CodeBlock","c":[["id",["d2"],[["theme","6"]]],"a -> b"]}
//!                       └──────────── Attr ───────────┘ └ text ┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `[identifier, classes, key/value pairs]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr(pub String, pub Vec<String>, pub Vec<(String, String)>);

impl Attr {
    pub fn new(id: impl Into<String>, classes: Vec<String>, pairs: Vec<(String, String)>) -> Self {
        Attr(id.into(), classes, pairs)
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn classes(&self) -> &[String] {
        &self.1
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.2
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }
}

/// `[url, title]` of a link or image.
pub type Target = (String, String);

/// A fenced code block decoded from its JSON node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub attr: Attr,
    pub text: String,
}

impl CodeBlock {
    /// Decode `value` if it is a well-formed `CodeBlock` node.
    pub fn from_node(value: &Value) -> Option<CodeBlock> {
        let object = value.as_object()?;
        if object.get("t")?.as_str()? != "CodeBlock" {
            return None;
        }
        let (attr, text): (Attr, String) = serde_json::from_value(object.get("c")?.clone()).ok()?;
        Some(CodeBlock { attr, text })
    }
}

/// Block nodes produced by the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Block {
    Para(Vec<Inline>),
}

/// Inline nodes produced by the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    Str(String),
    Image(Attr, Vec<Inline>, Target),
}

impl Block {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
