//! Drizzle type keyword mapping.

use crate::model::ColumnType;

/// Map a column constructor keyword to the internal type.
///
/// Unknown keywords degrade to `Text` so a schema using a custom or
/// unsupported constructor still imports instead of aborting.
pub fn type_from_keyword(keyword: &str) -> ColumnType {
    match keyword {
        "integer" | "serial" => ColumnType::Integer,
        "varchar" => ColumnType::Varchar,
        "text" => ColumnType::Text,
        "boolean" => ColumnType::Boolean,
        "timestamp" => ColumnType::Timestamp,
        "date" => ColumnType::Date,
        "json" | "jsonb" => ColumnType::Json,
        _ => ColumnType::Text,
    }
}

/// Constructor keyword emitted for a primitive type. Enum references are
/// rendered through their declaration identifier instead.
pub fn type_keyword(ty: &ColumnType) -> Option<&'static str> {
    match ty {
        ColumnType::Integer => Some("integer"),
        ColumnType::Varchar => Some("varchar"),
        ColumnType::Text => Some("text"),
        ColumnType::Boolean => Some("boolean"),
        ColumnType::Timestamp => Some("timestamp"),
        ColumnType::Date => Some("date"),
        ColumnType::Json => Some("jsonb"),
        ColumnType::Enum(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for ty in [
            ColumnType::Integer,
            ColumnType::Varchar,
            ColumnType::Text,
            ColumnType::Boolean,
            ColumnType::Timestamp,
            ColumnType::Date,
            ColumnType::Json,
        ] {
            let keyword = type_keyword(&ty).unwrap();
            assert_eq!(type_from_keyword(keyword), ty);
        }
    }

    #[test]
    fn test_json_external_name_differs() {
        assert_eq!(type_keyword(&ColumnType::Json), Some("jsonb"));
        assert_eq!(type_from_keyword("jsonb"), ColumnType::Json);
    }

    #[test]
    fn test_serial_is_integer() {
        assert_eq!(type_from_keyword("serial"), ColumnType::Integer);
    }

    #[test]
    fn test_unknown_keyword_degrades_to_text() {
        assert_eq!(type_from_keyword("uuid"), ColumnType::Text);
        assert_eq!(type_from_keyword("decimal"), ColumnType::Text);
    }
}
