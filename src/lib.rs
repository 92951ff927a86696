pub mod codec;
pub mod model;
pub mod scanner;

use wasm_bindgen::prelude::*;

use model::Schema;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Convert the canvas schema model (JSON) to Drizzle schema source.
#[wasm_bindgen(js_name = "schemaToCode")]
pub fn schema_to_code(schema_json: &str) -> Result<String, String> {
    let schema: Schema = serde_json::from_str(schema_json).map_err(|e| e.to_string())?;
    Ok(codec::generate(&schema))
}

/// Parse Drizzle schema source into the canvas schema model (JSON).
///
/// On failure the error is a human-readable message and no model is
/// produced; the caller keeps whatever it had.
#[wasm_bindgen(js_name = "codeToSchema")]
pub fn code_to_schema(source: &str) -> Result<String, String> {
    let schema = codec::parse(source).map_err(|e| e.to_string())?;
    serde_json::to_string(&schema).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_to_schema_reports_failure() {
        let err = code_to_schema("nothing declarative here").unwrap_err();
        assert!(err.contains("no table declarations"));
    }

    #[test]
    fn test_boundary_json_round_trip() {
        let source = r#"
            export const users = pgTable('users', {
                id: serial('id'),
                name: varchar('name', { length: 255 }).notNull(),
            });
        "#;
        let json = code_to_schema(source).unwrap();
        let code = schema_to_code(&json).unwrap();
        assert!(code.contains("export const users = pgTable('users', {"));
        assert!(code.contains("  name: varchar('name', { length: 255 }).notNull(),"));
    }
}
