//! Typed attribute records, one shape per family of node kinds.
//!
//! Hosts address attributes by name (`set_attribute(id, "align", "center")`),
//! so every record can also be read and written through string keys. The
//! string path goes through the same validation as typed construction.

use crate::error::{ModelError, ModelResult};
use crate::schema::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::mem;

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub const ALL: [Align; 4] = [Align::Left, Align::Center, Align::Right, Align::Justify];

    pub fn name(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }

    pub fn parse(value: &str) -> Option<Align> {
        Align::ALL.into_iter().find(|a| a.name() == value)
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Loosely typed attribute value used at the string-keyed boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Int(i64),
    Str(String),
}

impl AttrValue {
    fn into_opt_string(self) -> Option<Option<String>> {
        match self {
            AttrValue::Null => Some(None),
            AttrValue::Str(s) => Some(Some(s)),
            AttrValue::Int(_) => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            AttrValue::Str(s) => s.parse().ok(),
            AttrValue::Null => None,
        }
    }

    fn from_opt(value: &Option<String>) -> AttrValue {
        value.clone().map_or(AttrValue::Null, AttrValue::Str)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

/// Attribute record of a node. The variant is fixed by the node kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Attrs {
    None,
    Block {
        id: Option<String>,
    },
    Paragraph {
        id: Option<String>,
        align: Align,
    },
    Heading {
        id: Option<String>,
        level: u8,
        align: Align,
    },
    Cell {
        colspan: u32,
        rowspan: u32,
        background: Option<String>,
    },
    Image {
        src: String,
        alt: Option<String>,
        title: Option<String>,
    },
}

impl Attrs {
    pub fn default_for(kind: NodeKind) -> Attrs {
        match kind {
            NodeKind::Paragraph => Attrs::Paragraph {
                id: None,
                align: Align::Left,
            },
            NodeKind::Heading => Attrs::Heading {
                id: None,
                level: 1,
                align: Align::Left,
            },
            NodeKind::TableCell | NodeKind::TableHeader => Attrs::Cell {
                colspan: 1,
                rowspan: 1,
                background: None,
            },
            NodeKind::Image => Attrs::Image {
                src: String::new(),
                alt: None,
                title: None,
            },
            kind if kind.carries_id() => Attrs::Block { id: None },
            _ => Attrs::None,
        }
    }

    pub fn heading(level: u8) -> Attrs {
        Attrs::Heading {
            id: None,
            level,
            align: Align::Left,
        }
    }

    pub fn image(src: impl Into<String>) -> Attrs {
        Attrs::Image {
            src: src.into(),
            alt: None,
            title: None,
        }
    }

    /// Whether this record has the shape `kind` expects.
    pub fn fits(&self, kind: NodeKind) -> bool {
        mem::discriminant(self) == mem::discriminant(&Attrs::default_for(kind))
    }

    pub fn validate(&self, kind: NodeKind) -> ModelResult<()> {
        if !self.fits(kind) {
            return Err(ModelError::schema(kind, "attribute record does not match node kind"));
        }
        match self {
            Attrs::Heading { level, .. } if !(1..=6).contains(level) => Err(ModelError::schema(
                kind,
                format!("heading level {} is outside 1..=6", level),
            )),
            Attrs::Cell { colspan, rowspan, .. } if *colspan == 0 || *rowspan == 0 => {
                Err(ModelError::schema(kind, "cell spans must be at least 1"))
            }
            Attrs::Image { src, .. } if src.is_empty() => {
                Err(ModelError::schema(kind, "image requires a src"))
            }
            _ => Ok(()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Attrs::Block { id } | Attrs::Paragraph { id, .. } | Attrs::Heading { id, .. } => {
                id.as_deref()
            }
            _ => None,
        }
    }

    pub fn has_id_slot(&self) -> bool {
        matches!(
            self,
            Attrs::Block { .. } | Attrs::Paragraph { .. } | Attrs::Heading { .. }
        )
    }

    pub fn with_id(mut self, value: Option<String>) -> Attrs {
        if let Attrs::Block { id } | Attrs::Paragraph { id, .. } | Attrs::Heading { id, .. } =
            &mut self
        {
            *id = value;
        }
        self
    }

    pub fn align(&self) -> Option<Align> {
        match self {
            Attrs::Paragraph { align, .. } | Attrs::Heading { align, .. } => Some(*align),
            _ => None,
        }
    }

    pub fn with_align(mut self, value: Align) -> Attrs {
        if let Attrs::Paragraph { align, .. } | Attrs::Heading { align, .. } = &mut self {
            *align = value;
        }
        self
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Attrs::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn background(&self) -> Option<&str> {
        match self {
            Attrs::Cell { background, .. } => background.as_deref(),
            _ => None,
        }
    }

    /// Set one attribute by name, validating the resulting record.
    pub fn set(&mut self, kind: NodeKind, key: &str, value: AttrValue) -> ModelResult<()> {
        let wrong_type = || ModelError::schema(kind, format!("invalid value for attribute `{}`", key));

        let mut next = self.clone();
        match (&mut next, key) {
            (
                Attrs::Block { id } | Attrs::Paragraph { id, .. } | Attrs::Heading { id, .. },
                "id",
            ) => *id = value.into_opt_string().ok_or_else(wrong_type)?,
            (Attrs::Paragraph { align, .. } | Attrs::Heading { align, .. }, "align") => {
                *align = match &value {
                    AttrValue::Str(s) => Align::parse(s).ok_or_else(wrong_type)?,
                    _ => return Err(wrong_type()),
                }
            }
            (Attrs::Heading { level, .. }, "level") => {
                *level = value
                    .as_int()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(wrong_type)?
            }
            (Attrs::Cell { colspan, .. }, "colspan") => {
                *colspan = value
                    .as_int()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(wrong_type)?
            }
            (Attrs::Cell { rowspan, .. }, "rowspan") => {
                *rowspan = value
                    .as_int()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(wrong_type)?
            }
            (Attrs::Cell { background, .. }, "background") => {
                *background = value.into_opt_string().ok_or_else(wrong_type)?
            }
            (Attrs::Image { src, .. }, "src") => {
                *src = value.into_opt_string().flatten().ok_or_else(wrong_type)?
            }
            (Attrs::Image { alt, .. }, "alt") => {
                *alt = value.into_opt_string().ok_or_else(wrong_type)?
            }
            (Attrs::Image { title, .. }, "title") => {
                *title = value.into_opt_string().ok_or_else(wrong_type)?
            }
            _ => {
                return Err(ModelError::schema(
                    kind,
                    format!("unknown attribute `{}`", key),
                ))
            }
        }

        next.validate(kind)?;
        *self = next;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<AttrValue> {
        self.to_map().remove(key)
    }

    pub fn to_map(&self) -> BTreeMap<String, AttrValue> {
        let mut map = BTreeMap::new();
        match self {
            Attrs::None => {}
            Attrs::Block { id } => {
                map.insert("id".to_string(), AttrValue::from_opt(id));
            }
            Attrs::Paragraph { id, align } => {
                map.insert("id".to_string(), AttrValue::from_opt(id));
                map.insert("align".to_string(), AttrValue::from(align.name()));
            }
            Attrs::Heading { id, level, align } => {
                map.insert("id".to_string(), AttrValue::from_opt(id));
                map.insert("level".to_string(), AttrValue::Int(i64::from(*level)));
                map.insert("align".to_string(), AttrValue::from(align.name()));
            }
            Attrs::Cell {
                colspan,
                rowspan,
                background,
            } => {
                map.insert("colspan".to_string(), AttrValue::Int(i64::from(*colspan)));
                map.insert("rowspan".to_string(), AttrValue::Int(i64::from(*rowspan)));
                map.insert("background".to_string(), AttrValue::from_opt(background));
            }
            Attrs::Image { src, alt, title } => {
                map.insert("src".to_string(), AttrValue::from(src.as_str()));
                map.insert("alt".to_string(), AttrValue::from_opt(alt));
                map.insert("title".to_string(), AttrValue::from_opt(title));
            }
        }
        map
    }

    /// Build the record for `kind` from a name-keyed map. Missing keys take
    /// their defaults.
    pub fn from_map(kind: NodeKind, map: BTreeMap<String, AttrValue>) -> ModelResult<Attrs> {
        let mut attrs = Attrs::default_for(kind);
        // src is required, so it must land before the record is validated
        let mut entries: Vec<(String, AttrValue)> = map.into_iter().collect();
        entries.sort_by_key(|(key, _)| key != "src");
        for (key, value) in entries {
            attrs.set(kind, &key, value)?;
        }
        attrs.validate(kind)?;
        Ok(attrs)
    }
}

impl Default for Attrs {
    fn default() -> Self {
        Attrs::None
    }
}
