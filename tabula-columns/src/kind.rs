//! Value kinds: the closed set of cell value types a column can hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Type of the values stored in a column's cells; the column's `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "string[]")]
    StringList,
    #[serde(rename = "number[]")]
    NumberList,
    #[serde(rename = "date[]")]
    DateList,
    #[serde(rename = "boolean[]")]
    BooleanList,
}

impl ValueKind {
    pub const ALL: [ValueKind; 8] = [
        ValueKind::String,
        ValueKind::Number,
        ValueKind::Date,
        ValueKind::Boolean,
        ValueKind::StringList,
        ValueKind::NumberList,
        ValueKind::DateList,
        ValueKind::BooleanList,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Boolean => "boolean",
            ValueKind::StringList => "string[]",
            ValueKind::NumberList => "number[]",
            ValueKind::DateList => "date[]",
            ValueKind::BooleanList => "boolean[]",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ValueKind::StringList
                | ValueKind::NumberList
                | ValueKind::DateList
                | ValueKind::BooleanList
        )
    }

    /// Schema of a single cell value of this kind.
    pub fn value_schema(&self) -> Schema {
        match self {
            ValueKind::String => Schema::string(),
            ValueKind::Number => Schema::number(),
            ValueKind::Date => Schema::date(),
            ValueKind::Boolean => Schema::boolean(),
            ValueKind::StringList => Schema::array(Schema::string()),
            ValueKind::NumberList => Schema::array(Schema::number()),
            ValueKind::DateList => Schema::array(Schema::date()),
            ValueKind::BooleanList => Schema::array(Schema::boolean()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Type of a filter or config option value: any value kind, or a reference
/// to another column by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Value(ValueKind),
    Column,
}

impl OptionKind {
    /// Every option kind, in registration order.
    pub const ALL: [OptionKind; 9] = [
        OptionKind::Value(ValueKind::Boolean),
        OptionKind::Value(ValueKind::String),
        OptionKind::Value(ValueKind::Date),
        OptionKind::Value(ValueKind::Number),
        OptionKind::Column,
        OptionKind::Value(ValueKind::StringList),
        OptionKind::Value(ValueKind::NumberList),
        OptionKind::Value(ValueKind::BooleanList),
        OptionKind::Value(ValueKind::DateList),
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            OptionKind::Value(kind) => kind.tag(),
            OptionKind::Column => "column",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Schema of the option's value. A column reference is a column id.
    pub fn value_schema(&self) -> Schema {
        match self {
            OptionKind::Value(kind) => kind.value_schema(),
            OptionKind::Column => Schema::string(),
        }
    }
}

impl From<ValueKind> for OptionKind {
    fn from(kind: ValueKind) -> Self {
        OptionKind::Value(kind)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
