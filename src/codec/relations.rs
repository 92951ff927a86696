//! Relation inference and reconciliation.
//!
//! A relation links the referenced ("one") side to the referencing ("many")
//! side holding the foreign key. However many ways the source text declared
//! the same link, at most one relation per column pair survives.

use crate::model::{Column, RelationKind, Table};

/// Cardinality inferred from the foreign-key column: a unique foreign key
/// can match at most one row, so the link is one-to-one.
pub fn infer_kind(fk_column: &Column) -> RelationKind {
    if fk_column.unique {
        RelationKind::OneToOne
    } else {
        RelationKind::OneToMany
    }
}

/// True when `existing` already connects the same column pair, in either
/// direction. This equality rule is also the contract relations created
/// interactively on the canvas must satisfy.
pub fn already_connected<'a, I>(existing: I, from: (u32, u32), to: (u32, u32)) -> bool
where
    I: IntoIterator<Item = &'a crate::model::Relation>,
{
    existing.into_iter().any(|r| {
        let a = (r.from_table_id, r.from_column_id);
        let b = (r.to_table_id, r.to_column_id);
        (a == from && b == to) || (a == to && b == from)
    })
}

/// Find the foreign-key column a collection reference (`many(target)`)
/// points through, by naming convention against the singularized base name.
///
/// Preference order: an exact `<singular>id` match, then any column whose
/// name contains the singular base name and ends in an id suffix, then any
/// id-suffixed column that is not the target's own bare `id`.
pub fn fk_candidate<'a>(base: &Table, target: &'a Table) -> Option<&'a Column> {
    let singular = singularize(&normalize(&base.name));

    let exact = format!("{}id", singular);
    if let Some(col) = target.columns.iter().find(|c| normalize(&c.name) == exact) {
        return Some(col);
    }

    if let Some(col) = target.columns.iter().find(|c| {
        let name = normalize(&c.name);
        name.contains(&singular) && name.ends_with("id")
    }) {
        return Some(col);
    }

    target.columns.iter().find(|c| {
        let name = normalize(&c.name);
        name.ends_with("id") && name != "id"
    })
}

/// Lowercase and strip separators so `authorId`, `author_id` and `authorid`
/// all compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = name.strip_suffix('s') {
        stem.to_string()
    } else {
        name.to_string()
    }
}
