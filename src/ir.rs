use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// Deepest tree accepted unless the caller configures otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One concept in the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Envelope returned by the summarization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMap {
    pub root: TreeNode,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("input is not valid JSON: {0}")]
    Json(String),
    #[error("tree is empty: no root node")]
    EmptyTree,
    #[error("node at {path} is missing required field `{field}`")]
    MissingField { path: String, field: &'static str },
    #[error("node at {path} has an invalid `{field}`: expected {expected}")]
    InvalidField {
        path: String,
        field: &'static str,
        expected: &'static str,
    },
    #[error("tree is deeper than the supported maximum of {max_depth} levels")]
    TooDeep { max_depth: usize },
}

impl TreeNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            details: None,
            children: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Text shown on hover.
    pub fn tooltip(&self) -> &str {
        match self.details.as_deref() {
            Some(details) if !details.trim().is_empty() => details,
            _ => self.label.as_str(),
        }
    }

    /// Pre-order walk yielding each node with its depth.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![(self, 0)],
        }
    }

    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }

    pub fn height(&self) -> usize {
        self.descendants().map(|(_, depth)| depth).max().unwrap_or(0)
    }
}

pub struct Descendants<'a> {
    stack: Vec<(&'a TreeNode, usize)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (&'a TreeNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((node, depth))
    }
}

impl MindMap {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    /// Parse either `{ "root": {...} }` or a bare node object.
    pub fn from_json(input: &str, max_depth: usize) -> Result<Self, TreeError> {
        let value: Value =
            serde_json::from_str(input).map_err(|err| TreeError::Json(err.to_string()))?;
        Self::from_value(&value, max_depth)
    }

    pub fn from_value(value: &Value, max_depth: usize) -> Result<Self, TreeError> {
        let root = match value {
            Value::Null => return Err(TreeError::EmptyTree),
            Value::Object(map) if map.is_empty() => return Err(TreeError::EmptyTree),
            Value::Object(map) if map.contains_key("root") => match map.get("root") {
                None | Some(Value::Null) => return Err(TreeError::EmptyTree),
                Some(root) => root,
            },
            other => other,
        };
        let root = node_from_value(root, "root", 0, max_depth)?;
        let map = Self { root };
        map.validate(max_depth)?;
        Ok(map)
    }

    /// Structural checks for trees built in code rather than parsed.
    pub fn validate(&self, max_depth: usize) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        let mut stack = vec![(&self.root, 0usize, "root".to_string())];
        while let Some((node, depth, path)) = stack.pop() {
            if depth > max_depth {
                return Err(TreeError::TooDeep { max_depth });
            }
            if node.id.trim().is_empty() {
                return Err(TreeError::MissingField { path, field: "id" });
            }
            if node.label.trim().is_empty() {
                return Err(TreeError::MissingField {
                    path,
                    field: "label",
                });
            }
            if !seen.insert(node.id.as_str()) {
                warn!(id = %node.id, path = %path, "duplicate node id");
            }
            for (idx, child) in node.children.iter().enumerate().rev() {
                stack.push((child, depth + 1, format!("{path}.children[{idx}]")));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn node_from_value(
    value: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
) -> Result<TreeNode, TreeError> {
    if depth > max_depth {
        return Err(TreeError::TooDeep { max_depth });
    }
    let Value::Object(map) = value else {
        return Err(TreeError::InvalidField {
            path: path.to_string(),
            field: "node",
            expected: "an object",
        });
    };

    let id = match map.get("id") {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_text(value).ok_or_else(|| TreeError::InvalidField {
            path: path.to_string(),
            field: "id",
            expected: "a string",
        })?),
    };
    let id = id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| TreeError::MissingField {
            path: path.to_string(),
            field: "id",
        })?;

    let label = match map.get("label") {
        None | Some(Value::Null) => {
            return Err(TreeError::MissingField {
                path: path.to_string(),
                field: "label",
            });
        }
        Some(value) => scalar_text(value).ok_or_else(|| TreeError::InvalidField {
            path: path.to_string(),
            field: "label",
            expected: "a string",
        })?,
    };
    if label.trim().is_empty() {
        return Err(TreeError::MissingField {
            path: path.to_string(),
            field: "label",
        });
    }

    let details = match map.get("details") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            return Err(TreeError::InvalidField {
                path: path.to_string(),
                field: "details",
                expected: "a string",
            });
        }
    };

    let children = match map.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut children = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let child_path = format!("{path}.children[{idx}]");
                children.push(node_from_value(item, &child_path, depth + 1, max_depth)?);
            }
            children
        }
        Some(_) => {
            return Err(TreeError::InvalidField {
                path: path.to_string(),
                field: "children",
                expected: "an array",
            });
        }
    };

    Ok(TreeNode {
        id,
        label,
        details,
        children,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
