//! Report generation
//!
//! Renders record layouts and peer check results as plain text or JSON.

use interop_records::{LayoutMismatch, RecordLayout};
use serde::Serialize;

/// Outcome of checking one peer declaration
#[derive(Debug, Clone, Serialize)]
pub struct RecordCheck {
    /// Peer's name for the record
    pub peer: String,
    /// Our record it was checked against
    pub record: String,
    pub mismatches: Vec<LayoutMismatch>,
    /// Set when the declaration could not be checked at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordCheck {
    pub fn is_compatible(&self) -> bool {
        self.error.is_none() && self.mismatches.is_empty()
    }
}

/// Render layouts as an ASCII table per record
pub fn layouts_txt(layouts: &[RecordLayout]) -> String {
    let mut out = String::new();
    for layout in layouts {
        out.push_str(&format!(
            "{} (size {}, align {})\n",
            layout.name, layout.size, layout.align
        ));
        out.push_str("  offset  kind  name\n");
        for field in &layout.fields {
            out.push_str(&format!(
                "  {:>6}  {:<4}  {}\n",
                field.offset,
                field.kind.to_string(),
                field.name
            ));
        }
        if layout.padding_bytes() > 0 {
            out.push_str(&format!("  ({} padding bytes)\n", layout.padding_bytes()));
        }
        out.push('\n');
    }
    out
}

/// Render peer check results
pub fn checks_txt(checks: &[RecordCheck]) -> String {
    let mut out = String::new();
    for check in checks {
        let heading = if check.peer == check.record {
            check.record.clone()
        } else {
            format!("{} -> {}", check.peer, check.record)
        };

        if let Some(error) = &check.error {
            out.push_str(&format!("✗ {}: {}\n", heading, error));
        } else if check.mismatches.is_empty() {
            out.push_str(&format!("✓ {}\n", heading));
        } else {
            out.push_str(&format!(
                "✗ {} ({} mismatch(es))\n",
                heading,
                check.mismatches.len()
            ));
            for mismatch in &check.mismatches {
                out.push_str(&format!("    - {}\n", mismatch));
            }
        }
    }

    let failed = checks.iter().filter(|c| !c.is_compatible()).count();
    out.push_str(&format!(
        "\n{} record(s) checked, {} incompatible\n",
        checks.len(),
        failed
    ));
    out
}
