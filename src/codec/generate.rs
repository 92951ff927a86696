//! Schema to Drizzle source generation.

use std::collections::HashMap;

use crate::codec::types::type_keyword;
use crate::model::{Column, ColumnType, EnumDef, Relation, RelationKind, Schema, Table};

/// Render a Schema as Drizzle declarations. Output is deterministic: tables,
/// columns and relations are emitted in stored order.
pub fn generate(schema: &Schema) -> String {
    let mut out = String::new();

    let idents: HashMap<u32, String> = schema
        .tables
        .iter()
        .map(|t| (t.id, table_ident(t)))
        .collect();

    push_imports(&mut out, schema);

    for e in &schema.enums {
        push_enum(&mut out, e);
    }

    for table in &schema.tables {
        push_table(&mut out, table);
    }

    for table in &schema.tables {
        push_relations_block(&mut out, schema, table, &idents);
    }

    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

fn push_imports(out: &mut String, schema: &Schema) {
    let mut used = vec!["pgTable"];
    if !schema.enums.is_empty() {
        used.push("pgEnum");
    }
    for keyword in [
        "serial",
        "integer",
        "varchar",
        "text",
        "boolean",
        "timestamp",
        "date",
        "jsonb",
    ] {
        if keyword_used(schema, keyword) {
            used.push(keyword);
        }
    }

    out.push_str(&format!(
        "import {{ {} }} from 'drizzle-orm/pg-core';\n",
        used.join(", ")
    ));
    if !schema.relations.is_empty() {
        out.push_str("import { relations } from 'drizzle-orm';\n");
    }
    out.push('\n');
}

fn keyword_used(schema: &Schema, keyword: &str) -> bool {
    schema.tables.iter().flat_map(|t| &t.columns).any(|c| {
        if c.auto_increment {
            keyword == "serial"
        } else {
            type_keyword(&c.ty) == Some(keyword)
        }
    })
}

fn push_enum(out: &mut String, def: &EnumDef) {
    let values = def
        .values
        .iter()
        .map(|v| format!("'{}'", escape(v)))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!(
        "export const {} = pgEnum('{}', [{}]);\n\n",
        enum_ident(&def.name),
        escape(&def.name),
        values
    ));
}

fn push_table(out: &mut String, table: &Table) {
    out.push_str(&format!(
        "export const {} = pgTable('{}', {{\n",
        table_ident(table),
        escape(&table.name)
    ));
    for column in &table.columns {
        push_column(out, column);
    }
    out.push_str("});\n\n");
}

fn push_column(out: &mut String, column: &Column) {
    let ctor = if column.auto_increment {
        format!("serial('{}')", escape(&column.name))
    } else {
        match &column.ty {
            ColumnType::Varchar => {
                format!("varchar('{}', {{ length: 255 }})", escape(&column.name))
            }
            ColumnType::Enum(name) => format!("{}('{}')", enum_ident(name), escape(&column.name)),
            ty => format!(
                "{}('{}')",
                type_keyword(ty).unwrap_or("text"),
                escape(&column.name)
            ),
        }
    };

    out.push_str(&format!("  {}: {}", column.name, ctor));
    if !column.nullable {
        out.push_str(".notNull()");
    }
    if column.unique {
        out.push_str(".unique()");
    }
    // serial already implies the primary key
    if column.primary_key && !column.auto_increment {
        out.push_str(".primaryKey()");
    }
    out.push_str(",\n");
}

fn push_relations_block(
    out: &mut String,
    schema: &Schema,
    table: &Table,
    idents: &HashMap<u32, String>,
) {
    let outgoing: Vec<&Relation> = schema
        .relations
        .iter()
        .filter(|r| r.from_table_id == table.id)
        .collect();
    let incoming: Vec<&Relation> = schema
        .relations
        .iter()
        .filter(|r| r.to_table_id == table.id)
        .collect();
    if outgoing.is_empty() && incoming.is_empty() {
        return;
    }

    let ident = &idents[&table.id];
    out.push_str(&format!(
        "export const {}Relations = relations({}, ({{ one, many }}) => ({{\n",
        ident, ident
    ));

    for r in outgoing {
        let Some(target_ident) = idents.get(&r.to_table_id) else {
            continue;
        };
        let field = lower_first(target_ident);
        match r.kind {
            RelationKind::OneToOne => {
                out.push_str(&format!("  {}: one({}),\n", field, target_ident));
            }
            RelationKind::OneToMany => {
                out.push_str(&format!("  {}: many({}),\n", field, target_ident));
            }
            RelationKind::ManyToMany => {
                out.push_str(&format!("  {}s: many({}),\n", field, target_ident));
            }
        }
    }

    for r in incoming {
        let Some(source) = schema.table(r.from_table_id) else {
            continue;
        };
        let Some(source_ident) = idents.get(&source.id) else {
            continue;
        };
        let Some(fk_col) = table.column(r.to_column_id) else {
            continue;
        };
        let Some(ref_col) = source.column(r.from_column_id) else {
            continue;
        };
        out.push_str(&format!(
            "  {}: one({}, {{ fields: [{}.{}], references: [{}.{}] }}),\n",
            lower_first(source_ident),
            source_ident,
            ident,
            fk_col.name,
            source_ident,
            ref_col.name
        ));
    }

    out.push_str("}));\n\n");
}

/// Declaration identifier for a table: the name with non-alphanumeric
/// characters stripped.
fn table_ident(table: &Table) -> String {
    let ident = sanitize(&table.name);
    if ident.is_empty() {
        format!("table{}", table.id)
    } else {
        ident
    }
}

fn enum_ident(name: &str) -> String {
    let base = lower_first(&sanitize(name));
    if base.is_empty() {
        "unnamedEnum".to_string()
    } else {
        format!("{}Enum", base)
    }
}

fn sanitize(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
