//! Drizzle source to Schema parsing.
//!
//! The input is arbitrary, loosely formatted text. Declaration heads are
//! located with regexes; everything that needs balancing (argument lists,
//! the column object, relation callbacks) goes through the scanner, which
//! is string- and comment-aware. Unrecognized fragments are skipped so a
//! hand-written or partially generated schema still imports.

use std::collections::HashMap;

use lazy_regex::{regex, regex_captures, regex_is_match};

use crate::model::{Column, ColumnType, EnumDef, Relation, RelationKind, Schema, Table};
use crate::scanner;

use super::relations::{already_connected, fk_candidate, infer_kind};
use super::types::type_from_keyword;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no table declarations found in the source text")]
    NoTables,
}

/// Id counters local to one parse call; repeated parses never share state.
#[derive(Default)]
struct IdMint {
    tables: u32,
    columns: u32,
    enums: u32,
}

impl IdMint {
    fn next_table(&mut self) -> u32 {
        self.tables += 1;
        self.tables
    }

    fn next_column(&mut self) -> u32 {
        self.columns += 1;
        self.columns
    }

    fn next_enum(&mut self) -> u32 {
        self.enums += 1;
        self.enums
    }
}

/// Inline `.references(() => decl.prop)` cross-reference, recorded while
/// table bodies may still mention tables parsed later.
struct PendingRef {
    referenced_decl: String,
    referenced_prop: String,
    referencing_decl: String,
    referencing_prop: String,
}

/// A resolved link: referenced (table, column), referencing (table, column).
struct Link {
    from: (u32, u32),
    to: (u32, u32),
    kind: RelationKind,
}

/// Parse Drizzle declarations out of arbitrary source text.
///
/// Fails only when no table declaration can be extracted at all; individual
/// malformed declarations and unrecognized fragments are skipped.
pub fn parse(source: &str) -> Result<Schema, ParseError> {
    let mut ids = IdMint::default();

    // Enum declarations first: column types may reference them regardless
    // of declaration order.
    let mut enums: Vec<EnumDef> = Vec::new();
    let mut enum_decls: HashMap<String, String> = HashMap::new();
    for cap in regex!(r"(\w+)\s*=\s*pgEnum\s*\(").captures_iter(source) {
        let ident = cap.get(1).unwrap().as_str();
        let open = cap.get(0).unwrap().end() - 1;
        let Some(close) = scanner::match_delimiter(source, open, '(', ')') else {
            continue;
        };
        let args = scanner::split_top_level(&source[open + 1..close]);
        let Some(name) = args.first().and_then(|s| unquote(s)) else {
            continue;
        };
        let values = args
            .get(1)
            .and_then(|list| {
                let list = list.trim();
                list.strip_prefix('[')?.strip_suffix(']')
            })
            .map(|inner| {
                scanner::split_top_level(inner)
                    .iter()
                    .filter_map(|v| unquote(v))
                    .collect()
            })
            .unwrap_or_default();
        enum_decls.insert(ident.to_string(), name.clone());
        enums.push(EnumDef {
            id: ids.next_enum(),
            name,
            values,
        });
    }

    let mut tables: Vec<Table> = Vec::new();
    let mut table_decls: HashMap<String, u32> = HashMap::new();
    let mut pending: Vec<PendingRef> = Vec::new();

    for cap in regex!(r"(\w+)\s*=\s*pgTable\s*\(").captures_iter(source) {
        let ident = cap.get(1).unwrap().as_str();
        let open = cap.get(0).unwrap().end() - 1;
        let Some(close) = scanner::match_delimiter(source, open, '(', ')') else {
            continue;
        };
        let args = scanner::split_top_level(&source[open + 1..close]);

        // First argument must be the stored-name string literal, and the
        // column object is the first brace-delimited argument after it.
        let Some(name) = args.first().and_then(|s| unquote(s)) else {
            continue;
        };
        let Some(body) = args
            .iter()
            .skip(1)
            .find_map(|s| s.strip_prefix('{')?.strip_suffix('}'))
        else {
            continue;
        };

        let mut columns = Vec::new();
        for entry in scanner::split_top_level(body) {
            let entry = strip_leading_comments(entry);
            let Some((prop, expr)) = entry.split_once(':') else {
                continue;
            };
            let prop = prop.trim();
            let prop = unquote(prop).unwrap_or_else(|| prop.to_string());
            if prop.is_empty() {
                continue;
            }
            let Some(column) = parse_column(&mut ids, &prop, expr, &enum_decls) else {
                continue;
            };
            if let Some((target_decl, target_prop)) = parse_inline_reference(expr) {
                pending.push(PendingRef {
                    referenced_decl: target_decl,
                    referenced_prop: target_prop,
                    referencing_decl: ident.to_string(),
                    referencing_prop: prop.clone(),
                });
            }
            columns.push(column);
        }

        let table = Table::new(ids.next_table(), name, columns);
        table_decls.insert(ident.to_string(), table.id);
        tables.push(table);
    }

    if tables.is_empty() {
        return Err(ParseError::NoTables);
    }

    let mut relations: Vec<Relation> = Vec::new();

    // Inline references resolve once every table is registered; forward
    // references across tables are allowed.
    for p in &pending {
        let Some(link) = resolve_pending(&tables, &table_decls, p) else {
            continue;
        };
        push_relation(&mut relations, link);
    }

    // Explicit relation blocks supplement the inline references; whatever
    // they re-declare is deduplicated by column pair.
    for cap in regex!(r"\w+\s*=\s*relations\s*\(").captures_iter(source) {
        let open = cap.get(0).unwrap().end() - 1;
        let Some(close) = scanner::match_delimiter(source, open, '(', ')') else {
            continue;
        };
        let args = scanner::split_top_level(&source[open + 1..close]);
        let Some(base_id) = args
            .first()
            .and_then(|decl| table_decls.get(decl.trim()))
            .copied()
        else {
            continue;
        };
        let Some(callback) = args.get(1) else {
            continue;
        };
        let Some(arrow) = callback.find("=>") else {
            continue;
        };
        let rest = &callback[arrow + 2..];
        let Some(brace) = rest.find('{') else {
            continue;
        };
        let Some(body_close) = scanner::match_delimiter(rest, brace, '{', '}') else {
            continue;
        };

        for entry in scanner::split_top_level(&rest[brace + 1..body_close]) {
            let entry = strip_leading_comments(entry);
            let Some((_, expr)) = entry.split_once(':') else {
                continue;
            };
            let Some(link) = resolve_relation_call(&tables, &table_decls, base_id, expr) else {
                continue;
            };
            push_relation(&mut relations, link);
        }
    }

    Ok(Schema {
        tables,
        enums,
        relations,
    })
}

fn parse_column(
    ids: &mut IdMint,
    name: &str,
    expr: &str,
    enum_decls: &HashMap<String, String>,
) -> Option<Column> {
    let (_, keyword) = regex_captures!(r"^\s*(\w+)", expr)?;

    let not_null = expr.contains(".notNull()");
    let primary_key = expr.contains(".primaryKey()");
    let unique = expr.contains(".unique()");

    let ty = match enum_decls.get(keyword) {
        Some(enum_name) => ColumnType::Enum(enum_name.clone()),
        None => type_from_keyword(keyword),
    };

    let mut column = Column {
        id: ids.next_column(),
        name: name.to_string(),
        ty,
        nullable: !not_null,
        primary_key,
        unique,
        auto_increment: false,
    };

    // serial overrides whatever modifiers were spelled out
    if keyword == "serial" {
        column.ty = ColumnType::Integer;
        column.nullable = false;
        column.primary_key = true;
        column.auto_increment = true;
    }

    Some(column)
}

fn parse_inline_reference(expr: &str) -> Option<(String, String)> {
    let (_, table, prop) = regex_captures!(
        r"\.references\s*\(\s*\(\s*\)\s*=>\s*(\w+)\s*\.\s*(\w+)",
        expr
    )?;
    Some((table.to_string(), prop.to_string()))
}

fn resolve_pending(
    tables: &[Table],
    decls: &HashMap<String, u32>,
    p: &PendingRef,
) -> Option<Link> {
    let referenced = table_by_decl(tables, decls, &p.referenced_decl)?;
    let referenced_col = referenced.column_by_name(&p.referenced_prop)?;
    let referencing = table_by_decl(tables, decls, &p.referencing_decl)?;
    let referencing_col = referencing.column_by_name(&p.referencing_prop)?;
    Some(Link {
        from: (referenced.id, referenced_col.id),
        to: (referencing.id, referencing_col.id),
        kind: infer_kind(referencing_col),
    })
}

fn resolve_relation_call(
    tables: &[Table],
    decls: &HashMap<String, u32>,
    base_id: u32,
    expr: &str,
) -> Option<Link> {
    let expr = expr.trim();

    if let Some((_, target_decl)) = regex_captures!(r"^many\s*\(\s*(\w+)\s*\)", expr) {
        // Collection reference names no columns; find the foreign key on
        // the target by naming convention.
        let base = table_by_id(tables, base_id)?;
        let target = table_by_decl(tables, decls, target_decl)?;
        let base_pk = base.primary_column()?;
        let fk = fk_candidate(base, target)?;
        return Some(Link {
            from: (base.id, base_pk.id),
            to: (target.id, fk.id),
            kind: infer_kind(fk),
        });
    }

    if regex_is_match!(r"^one\s*\(", expr) {
        // Scalar reference carries the column pair explicitly; which side
        // is `fields` vs `references` decides direction, not the block the
        // call appears in.
        let (_, f_decl, f_prop) = regex_captures!(r"fields\s*:\s*\[\s*(\w+)\s*\.\s*(\w+)", expr)?;
        let (_, r_decl, r_prop) =
            regex_captures!(r"references\s*:\s*\[\s*(\w+)\s*\.\s*(\w+)", expr)?;
        let referencing = table_by_decl(tables, decls, f_decl)?;
        let referencing_col = referencing.column_by_name(f_prop)?;
        let referenced = table_by_decl(tables, decls, r_decl)?;
        let referenced_col = referenced.column_by_name(r_prop)?;
        return Some(Link {
            from: (referenced.id, referenced_col.id),
            to: (referencing.id, referencing_col.id),
            kind: infer_kind(referencing_col),
        });
    }

    None
}

fn push_relation(relations: &mut Vec<Relation>, link: Link) {
    if already_connected(relations.iter(), link.from, link.to) {
        return;
    }
    relations.push(Relation {
        id: relations.len() as u32 + 1,
        from_table_id: link.from.0,
        from_column_id: link.from.1,
        to_table_id: link.to.0,
        to_column_id: link.to.1,
        kind: link.kind,
    });
}

fn table_by_id(tables: &[Table], id: u32) -> Option<&Table> {
    tables.iter().find(|t| t.id == id)
}

fn table_by_decl<'a>(
    tables: &'a [Table],
    decls: &HashMap<String, u32>,
    decl: &str,
) -> Option<&'a Table> {
    table_by_id(tables, *decls.get(decl)?)
}

/// Drop comments leading an entry; a comment trailing a comma otherwise
/// becomes part of the next property name.
fn strip_leading_comments(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("//") {
            match rest.find('\n') {
                Some(i) => s = &rest[i + 1..],
                None => return "",
            }
        } else if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(i) => s = &rest[i + 2..],
                None => return "",
            }
        } else {
            return s;
        }
    }
}

/// Strip one level of quoting, honoring backslash escapes. Returns `None`
/// for anything that is not a complete quoted literal.
fn unquote(s: &str) -> Option<String> {
    let s = s.trim();
    let mut chars = s.chars();
    let quote = chars.next()?;
    if !matches!(quote, '\'' | '"' | '`') {
        return None;
    }

    let mut out = String::new();
    let mut escaped = false;
    for c in chars {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(out);
        } else {
            out.push(c);
        }
    }
    None
}
