//! Destination property paths.
//!
//! Grammar:
//!   node/.../Component.property[.subfield]
//! - '/' separates the scene-graph node path
//! - the last segment names the component, followed by `.`-separated property selectors
//!
//!   "scene/Cube/Transform.translation" -> nodes=["scene","Cube"], component="Transform", properties=["translation"]
//!   "Light.intensity" -> nodes=[], component="Light", properties=["intensity"]

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty property path")]
    Empty,
    #[error("empty node segment in '{0}'")]
    EmptyNode(String),
    #[error("missing component name in '{0}'")]
    EmptyComponent(String),
    #[error("empty property selector in '{0}'")]
    EmptyProperty(String),
    #[error("whitespace in property path '{0}'")]
    Whitespace(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedPath {
    /// Scene-graph node segments leading to the component (may be empty).
    pub nodes: Vec<String>,
    /// Component that owns the animated property.
    pub component: String,
    /// Property selectors on the component (may be empty).
    pub properties: Vec<String>,
}

impl TypedPath {
    pub fn new(
        nodes: Vec<String>,
        component: impl Into<String>,
        properties: Vec<String>,
    ) -> Self {
        Self {
            nodes,
            component: component.into(),
            properties,
        }
    }

    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(PathError::Whitespace(s.to_string()));
        }

        let (node_part, leaf) = match s.rsplit_once('/') {
            Some((nodes, leaf)) => (Some(nodes), leaf),
            None => (None, s),
        };

        let nodes = match node_part {
            Some(n) => n
                .split('/')
                .map(|seg| {
                    if seg.is_empty() {
                        Err(PathError::EmptyNode(s.to_string()))
                    } else {
                        Ok(seg.to_string())
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let mut selectors = leaf.split('.');
        let component = selectors.next().unwrap_or_default();
        if component.is_empty() {
            return Err(PathError::EmptyComponent(s.to_string()));
        }
        let properties = selectors
            .map(|p| {
                if p.is_empty() {
                    Err(PathError::EmptyProperty(s.to_string()))
                } else {
                    Ok(p.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(nodes, component, properties))
    }

    /// Node path joined with '/'.
    pub fn node_path(&self) -> String {
        self.nodes.join("/")
    }

    /// Name of the leaf property, falling back to the component name.
    pub fn property_name(&self) -> &str {
        self.properties
            .last()
            .map(String::as_str)
            .unwrap_or(&self.component)
    }
}

impl fmt::Display for TypedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}/")?;
        }
        f.write_str(&self.component)?;
        for prop in &self.properties {
            write!(f, ".{prop}")?;
        }
        Ok(())
    }
}

impl FromStr for TypedPath {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypedPath::parse(s)
    }
}

// Serialized as its string form.
impl Serialize for TypedPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypedPath {
    fn deserialize<D>(deserializer: D) -> Result<TypedPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypedPath::parse(&s).map_err(de::Error::custom)
    }
}
