use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canvas schema: the unit exchanged with the textual format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: u32,
    pub name: String,
    /// Declaration order is significant and drives generated output order.
    pub columns: Vec<Column>,
    /// Canvas placement; the codec ignores it on read and never invents it on write.
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_table_width")]
    pub width: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

fn default_table_width() -> f64 {
    220.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    /// Implies `Integer`, `nullable = false` and `primary_key = true`.
    #[serde(default)]
    pub auto_increment: bool,
}

/// Column type, serialized as its canvas name ("integer", "json", "enum:role", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Varchar,
    Text,
    Boolean,
    Timestamp,
    Date,
    Json,
    /// Reference to a declared enum, tagged `enum:<name>`.
    Enum(String),
}

impl ColumnType {
    /// Parse a canvas type name. Unknown names degrade to `Text` so an
    /// unrecognized custom type never aborts an import.
    pub fn from_name(name: &str) -> Self {
        if let Some(enum_name) = name.strip_prefix("enum:") {
            return ColumnType::Enum(enum_name.to_string());
        }
        match name {
            "integer" => ColumnType::Integer,
            "varchar" => ColumnType::Varchar,
            "boolean" => ColumnType::Boolean,
            "timestamp" => ColumnType::Timestamp,
            "date" => ColumnType::Date,
            "json" => ColumnType::Json,
            _ => ColumnType::Text,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Varchar => write!(f, "varchar"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Json => write!(f, "json"),
            ColumnType::Enum(name) => write!(f, "enum:{}", name),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ColumnType::from_name(&name))
    }
}

/// Declared enum: stored name plus the ordered list of permitted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub id: u32,
    pub name: String,
    pub values: Vec<String>,
}

/// A link between two columns. `from` is the referenced ("one") side and
/// `to` is the referencing ("many") side holding the foreign key.
///
/// For deduplication the link is undirected: swapping the endpoints still
/// describes the same relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: u32,
    pub from_table_id: u32,
    pub from_column_id: u32,
    pub to_table_id: u32,
    pub to_column_id: u32,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "one-to-one")]
    OneToOne,
    #[serde(rename = "one-to-many")]
    OneToMany,
    #[serde(rename = "many-to-many")]
    ManyToMany,
}

impl Schema {
    pub fn table(&self, id: u32) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }
}

impl Table {
    /// A table at the default canvas placement; the importer positions it later.
    pub fn new(id: u32, name: String, columns: Vec<Column>) -> Self {
        Table {
            id,
            name,
            columns,
            position: Position::default(),
            width: default_table_width(),
        }
    }

    pub fn column(&self, id: u32) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary-key column, falling back to the first column.
    pub fn primary_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .or_else(|| self.columns.first())
    }
}
