//! Declarations for the far side of the boundary
//!
//! Renders record layouts as a C header and as a Python `ctypes` module. Both
//! outputs carry their own size and offset checks, so the other side fails at
//! compile/import time if it ever drifts from the layout it was generated from.

use crate::layout::RecordLayout;
use std::collections::BTreeSet;

/// Render a C header declaring every layout as a `typedef struct`.
///
/// `guard` is used for the include guard and is upper-cased.
pub fn render_c_header(layouts: &[RecordLayout], guard: &str) -> String {
    let guard = guard.to_ascii_uppercase();
    log::debug!("Rendering C header for {} record(s)", layouts.len());

    let mut out = String::new();
    out.push_str("/* Generated by interop-cli. Do not edit. */\n");
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str("#include <stdbool.h>\n#include <stddef.h>\n#include <stdint.h>\n");

    for layout in layouts {
        out.push_str("\ntypedef struct {\n");
        for field in &layout.fields {
            out.push_str(&format!("    {} {};\n", field.kind.c_type(), field.name));
        }
        out.push_str(&format!("}} {};\n\n", layout.name));

        out.push_str(&format!(
            "_Static_assert(sizeof({name}) == {size}, \"{name} size\");\n",
            name = layout.name,
            size = layout.size
        ));
        for field in &layout.fields {
            out.push_str(&format!(
                "_Static_assert(offsetof({name}, {field}) == {offset}, \"{name}.{field} offset\");\n",
                name = layout.name,
                field = field.name,
                offset = field.offset
            ));
        }
    }

    out.push_str(&format!("\n#endif /* {guard} */\n"));
    out
}

/// Render a Python module with one `ctypes.Structure` per layout
pub fn render_ctypes(layouts: &[RecordLayout]) -> String {
    log::debug!("Rendering ctypes module for {} record(s)", layouts.len());

    let mut imports: BTreeSet<&str> = layouts
        .iter()
        .flat_map(|layout| layout.fields.iter().map(|f| f.kind.ctypes_type()))
        .collect();
    imports.insert("Structure");
    imports.insert("sizeof");

    let mut out = String::new();
    out.push_str("# Generated by interop-cli. Do not edit.\n");
    out.push_str(&format!(
        "from ctypes import {}\n",
        imports.into_iter().collect::<Vec<_>>().join(", ")
    ));

    for layout in layouts {
        out.push_str(&format!("\n\nclass {}(Structure):\n", layout.name));
        out.push_str("    _fields_ = [\n");
        for field in &layout.fields {
            out.push_str(&format!(
                "        (\"{}\", {}),\n",
                field.name,
                field.kind.ctypes_type()
            ));
        }
        out.push_str("    ]\n\n\n");

        out.push_str(&format!("assert sizeof({}) == {}\n", layout.name, layout.size));
        for field in &layout.fields {
            out.push_str(&format!(
                "assert {}.{}.offset == {}\n",
                layout.name, field.name, field.offset
            ));
        }
    }

    out
}
