//! C source generation for builtin resources and resource ids

use std::fmt::Write as _;

use crate::ball::ResourceBall;
use crate::definition::StorageClass;

const GENERATED_BANNER: &str = "// Generated by respack. Do not edit.\n";

/// Bytes per line in emitted arrays
const BYTES_PER_LINE: usize = 16;

/// Uppercase identifier with every non-alphanumeric character replaced by `_`
pub fn symbol_name(name: &str) -> String {
    let mut symbol: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert(0, '_');
    }
    symbol
}

/// Render the builtin resource table for link-time embedding
///
/// Each builtin resource becomes an 8-byte aligned static array. The table
/// maps `RESOURCE_ID_*` values to pointer and length.
pub fn embed(ball: &ResourceBall) -> String {
    let mut out = String::new();
    out.push_str(GENERATED_BANNER);
    out.push_str("#include <stddef.h>\n#include <stdint.h>\n\n");
    out.push_str("#include \"resource_ids.auto.h\"\n\n");
    out.push_str("typedef struct {\n  uint32_t resource_id;\n  const uint8_t *address;\n  size_t num_bytes;\n} BuiltinResourceData;\n\n");

    let builtins: Vec<_> = ball
        .objects_with_storage(StorageClass::LinkEmbedded)
        .collect();

    for object in &builtins {
        let symbol = symbol_name(object.name());
        let _ = writeln!(
            out,
            "static const uint8_t s_{}[] __attribute__((aligned(8))) = {{",
            symbol.to_ascii_lowercase()
        );
        for chunk in object.data().chunks(BYTES_PER_LINE) {
            let line: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
            let _ = writeln!(out, "  {},", line.join(", "));
        }
        out.push_str("};\n\n");
    }

    out.push_str("const BuiltinResourceData g_builtin_resources[] = {\n");
    for object in &builtins {
        let symbol = symbol_name(object.name());
        let _ = writeln!(
            out,
            "  {{ RESOURCE_ID_{}, s_{}, {} }},",
            symbol,
            symbol.to_ascii_lowercase(),
            object.data().len()
        );
    }
    out.push_str("};\n\n");
    let _ = writeln!(
        out,
        "const uint32_t g_num_builtin_resources = {};",
        builtins.len()
    );

    tracing::info!("Builtin table rendered: {} resources", builtins.len());
    out
}

/// Render the `RESOURCE_ID_*` enum for every resource and alias
pub fn id_header(ball: &ResourceBall) -> String {
    let mut out = String::new();
    out.push_str(GENERATED_BANNER);
    out.push_str("#pragma once\n\n");
    out.push_str("typedef enum {\n  INVALID_RESOURCE = 0,\n  RESOURCE_ID_INVALID = 0,\n");
    for (name, id) in ball.resource_ids() {
        let _ = writeln!(out, "  RESOURCE_ID_{} = {},", symbol_name(&name), id);
    }
    let _ = writeln!(out, "  NUM_RESOURCES = {},", ball.len());
    out.push_str("} ResourceId;\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_name() {
        assert_eq!(symbol_name("image-logo.v2"), "IMAGE_LOGO_V2");
        assert_eq!(symbol_name("1BIT"), "_1BIT");
        assert_eq!(symbol_name("FONT_14"), "FONT_14");
    }
}
