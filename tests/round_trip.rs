//! Round-trip coverage: a generated schema, parsed back and regenerated,
//! must describe the same tables, columns and relations. Ids are freshly
//! minted on every parse, so comparison is structural, never by id.

use std::collections::BTreeSet;

use proptest::prelude::*;

use schemadraw::codec::{generate, parse};
use schemadraw::model::{Column, ColumnType, EnumDef, Relation, RelationKind, Schema, Table};

fn column(id: u32, name: &str, ty: ColumnType) -> Column {
    Column {
        id,
        name: name.into(),
        ty,
        nullable: true,
        primary_key: false,
        unique: false,
        auto_increment: false,
    }
}

fn serial_pk(id: u32, name: &str) -> Column {
    Column {
        id,
        name: name.into(),
        ty: ColumnType::Integer,
        nullable: false,
        primary_key: true,
        unique: false,
        auto_increment: true,
    }
}

fn relation_keys(schema: &Schema) -> BTreeSet<(String, String, String, String, String)> {
    schema
        .relations
        .iter()
        .map(|r| {
            let from_table = schema.table(r.from_table_id).unwrap();
            let from_col = from_table.column(r.from_column_id).unwrap();
            let to_table = schema.table(r.to_table_id).unwrap();
            let to_col = to_table.column(r.to_column_id).unwrap();
            (
                from_table.name.clone(),
                from_col.name.clone(),
                to_table.name.clone(),
                to_col.name.clone(),
                format!("{:?}", r.kind),
            )
        })
        .collect()
}

fn assert_round_trip(original: &Schema) {
    let code = generate(original);
    let parsed = parse(&code).unwrap_or_else(|e| {
        panic!("parsing generated source failed: {e}\n\nGenerated source:\n{code}")
    });

    assert_eq!(
        original.tables.len(),
        parsed.tables.len(),
        "table count mismatch\n\nGenerated source:\n{code}"
    );
    for (a, b) in original.tables.iter().zip(parsed.tables.iter()) {
        assert_eq!(a.name, b.name, "table name mismatch");
        assert_eq!(
            a.columns.len(),
            b.columns.len(),
            "column count mismatch for table '{}'",
            a.name
        );
        for (ca, cb) in a.columns.iter().zip(b.columns.iter()) {
            assert_eq!(ca.name, cb.name, "column name mismatch in '{}'", a.name);
            assert_eq!(ca.ty, cb.ty, "type mismatch for '{}.{}'", a.name, ca.name);
            assert_eq!(
                (ca.nullable, ca.primary_key, ca.unique, ca.auto_increment),
                (cb.nullable, cb.primary_key, cb.unique, cb.auto_increment),
                "constraint mismatch for '{}.{}'",
                a.name,
                ca.name
            );
        }
    }

    assert_eq!(original.enums.len(), parsed.enums.len(), "enum count mismatch");
    for (a, b) in original.enums.iter().zip(parsed.enums.iter()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.values, b.values);
    }

    assert_eq!(
        relation_keys(original),
        relation_keys(&parsed),
        "relation mismatch\n\nGenerated source:\n{code}"
    );
}

#[test]
fn round_trip_all_column_types() {
    let schema = Schema {
        tables: vec![Table::new(
            1,
            "samples".into(),
            vec![
                serial_pk(1, "id"),
                column(2, "count", ColumnType::Integer),
                column(3, "label", ColumnType::Varchar),
                column(4, "body", ColumnType::Text),
                column(5, "active", ColumnType::Boolean),
                column(6, "createdAt", ColumnType::Timestamp),
                column(7, "bornOn", ColumnType::Date),
                column(8, "meta", ColumnType::Json),
            ],
        )],
        enums: vec![],
        relations: vec![],
    };
    assert_round_trip(&schema);
}

#[test]
fn round_trip_constraint_flags() {
    let mut email = column(2, "email", ColumnType::Varchar);
    email.nullable = false;
    email.unique = true;
    let mut code = column(3, "code", ColumnType::Text);
    code.primary_key = true;

    let schema = Schema {
        tables: vec![Table::new(1, "users".into(), vec![serial_pk(1, "id"), email, code])],
        enums: vec![],
        relations: vec![],
    };
    assert_round_trip(&schema);
}

#[test]
fn round_trip_enum_column() {
    let schema = Schema {
        tables: vec![Table::new(
            1,
            "orders".into(),
            vec![
                serial_pk(1, "id"),
                column(2, "status", ColumnType::Enum("OrderStatus".into())),
            ],
        )],
        enums: vec![EnumDef {
            id: 1,
            name: "OrderStatus".into(),
            values: vec!["open".into(), "shipped".into(), "closed".into()],
        }],
        relations: vec![],
    };
    assert_round_trip(&schema);
}

#[test]
fn round_trip_one_to_many() {
    let mut user_id = column(3, "userId", ColumnType::Integer);
    user_id.nullable = false;

    let schema = Schema {
        tables: vec![
            Table::new(1, "users".into(), vec![serial_pk(1, "id")]),
            Table::new(2, "posts".into(), vec![serial_pk(2, "id"), user_id]),
        ],
        enums: vec![],
        relations: vec![Relation {
            id: 1,
            from_table_id: 1,
            from_column_id: 1,
            to_table_id: 2,
            to_column_id: 3,
            kind: RelationKind::OneToMany,
        }],
    };
    assert_round_trip(&schema);
}

#[test]
fn round_trip_one_to_one() {
    let mut user_id = column(3, "userId", ColumnType::Integer);
    user_id.unique = true;

    let schema = Schema {
        tables: vec![
            Table::new(1, "users".into(), vec![serial_pk(1, "id")]),
            Table::new(2, "profiles".into(), vec![serial_pk(2, "id"), user_id]),
        ],
        enums: vec![],
        relations: vec![Relation {
            id: 1,
            from_table_id: 1,
            from_column_id: 1,
            to_table_id: 2,
            to_column_id: 3,
            kind: RelationKind::OneToOne,
        }],
    };
    assert_round_trip(&schema);
}

#[test]
fn round_trip_self_relation() {
    let parent_id = column(2, "parentId", ColumnType::Integer);

    let schema = Schema {
        tables: vec![Table::new(
            1,
            "categories".into(),
            vec![serial_pk(1, "id"), parent_id],
        )],
        enums: vec![],
        relations: vec![Relation {
            id: 1,
            from_table_id: 1,
            from_column_id: 1,
            to_table_id: 1,
            to_column_id: 2,
            kind: RelationKind::OneToMany,
        }],
    };
    assert_round_trip(&schema);
}

#[test]
fn generated_text_is_stable() {
    // generate -> parse -> generate must reproduce the text byte for byte
    let mut user_id = column(3, "userId", ColumnType::Integer);
    user_id.nullable = false;

    let schema = Schema {
        tables: vec![
            Table::new(1, "users".into(), vec![serial_pk(1, "id")]),
            Table::new(2, "posts".into(), vec![serial_pk(2, "id"), user_id]),
        ],
        enums: vec![],
        relations: vec![Relation {
            id: 1,
            from_table_id: 1,
            from_column_id: 1,
            to_table_id: 2,
            to_column_id: 3,
            kind: RelationKind::OneToMany,
        }],
    };

    let code = generate(&schema);
    let reparsed = parse(&code).unwrap();
    assert_eq!(generate(&reparsed), code);
}

fn arb_column_type() -> impl Strategy<Value = ColumnType> {
    prop_oneof![
        Just(ColumnType::Integer),
        Just(ColumnType::Varchar),
        Just(ColumnType::Text),
        Just(ColumnType::Boolean),
        Just(ColumnType::Timestamp),
        Just(ColumnType::Date),
        Just(ColumnType::Json),
    ]
}

type ColumnSeed = (String, ColumnType, bool, bool, bool, bool);

fn arb_column() -> impl Strategy<Value = ColumnSeed> {
    (
        "[a-z][a-z0-9]{0,8}",
        arb_column_type(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop::bool::weighted(0.2),
    )
}

fn arb_schema() -> impl Strategy<Value = Schema> {
    prop::collection::vec(
        ("[a-z][a-z0-9]{0,8}", prop::collection::vec(arb_column(), 1..6)),
        1..4,
    )
    .prop_map(|tables| {
        let mut table_id = 0u32;
        let mut column_id = 0u32;
        Schema {
            tables: tables
                .into_iter()
                .map(|(name, columns)| {
                    table_id += 1;
                    let columns = columns
                        .into_iter()
                        .map(|(name, ty, nullable, unique, primary_key, auto_increment)| {
                            column_id += 1;
                            if auto_increment {
                                Column {
                                    id: column_id,
                                    name,
                                    ty: ColumnType::Integer,
                                    nullable: false,
                                    primary_key: true,
                                    unique,
                                    auto_increment: true,
                                }
                            } else {
                                Column {
                                    id: column_id,
                                    name,
                                    ty,
                                    nullable,
                                    primary_key,
                                    unique,
                                    auto_increment: false,
                                }
                            }
                        })
                        .collect();
                    Table::new(table_id, name, columns)
                })
                .collect(),
            enums: vec![],
            relations: vec![],
        }
    })
}

proptest! {
    #[test]
    fn prop_round_trip_tables(schema in arb_schema()) {
        assert_round_trip(&schema);
    }
}
