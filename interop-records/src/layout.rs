//! Machine-readable layout contract
//!
//! Each record can describe its own layout as the Rust compiler laid it out
//! ([`InteropRecord::layout`]) and as the boundary contract says it must be
//! laid out ([`InteropRecord::contract_layout`], computed with C struct rules).
//! A peer's declaration (from a C header, a `ctypes.Structure`, ...) can be
//! described with [`PeerRecord`] and compared positionally against ours, so a
//! drifted field shows up as a reported [`LayoutMismatch`] instead of garbage
//! values at runtime.
//!
//! Compatibility is structural: two records match when they have the same
//! field count, kinds, offsets and size. Field names are only compared when
//! [`CompareConfig::match_field_names`] is set, with one exception: a name
//! that both sides use at different positions is always reported as a
//! reorder, since that is the classic way a swap of same-width fields slips
//! through a purely structural check.

use crate::config::CompareConfig;
use crate::types::{Color, Event, InteropError, Point, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::{align_of, offset_of, size_of};
use std::str::FromStr;

/// Scalar field types a record declaration can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// C `_Bool` / Rust `bool` / `ctypes.c_bool`: one byte
    Bool,
}

impl ScalarKind {
    /// Width in bytes
    pub const fn size(self) -> usize {
        match self {
            ScalarKind::I8 | ScalarKind::U8 | ScalarKind::Bool => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    /// Natural alignment, assumed equal to the width.
    ///
    /// This holds on the 64-bit targets the boundary runs on. 32-bit x86
    /// aligns 8-byte scalars to 4, which only matters for peers that declare
    /// 64-bit fields; such peers should state explicit offsets.
    pub const fn align(self) -> usize {
        self.size()
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    /// Fixed-width C type name
    pub fn c_type(self) -> &'static str {
        match self {
            ScalarKind::I8 => "int8_t",
            ScalarKind::U8 => "uint8_t",
            ScalarKind::I16 => "int16_t",
            ScalarKind::U16 => "uint16_t",
            ScalarKind::I32 => "int32_t",
            ScalarKind::U32 => "uint32_t",
            ScalarKind::I64 => "int64_t",
            ScalarKind::U64 => "uint64_t",
            ScalarKind::F32 => "float",
            ScalarKind::F64 => "double",
            ScalarKind::Bool => "bool",
        }
    }

    /// Python `ctypes` type name with a pinned width
    pub fn ctypes_type(self) -> &'static str {
        match self {
            ScalarKind::I8 => "c_int8",
            ScalarKind::U8 => "c_uint8",
            ScalarKind::I16 => "c_int16",
            ScalarKind::U16 => "c_uint16",
            ScalarKind::I32 => "c_int32",
            ScalarKind::U32 => "c_uint32",
            ScalarKind::I64 => "c_int64",
            ScalarKind::U64 => "c_uint64",
            ScalarKind::F32 => "c_float",
            ScalarKind::F64 => "c_double",
            ScalarKind::Bool => "c_bool",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::I8 => "i8",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::U16 => "u16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// One field of a record layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    /// Field name as used at the boundary (e.g. `keyCode`)
    pub name: String,
    pub kind: ScalarKind,
    /// Byte offset from the start of the record
    pub offset: usize,
}

impl FieldLayout {
    /// First byte past this field
    pub fn end(&self) -> usize {
        self.offset + self.kind.size()
    }
}

/// Complete layout of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub name: String,
    /// Total size in bytes, including trailing padding
    pub size: usize,
    pub align: usize,
    /// Fields in declaration order
    pub fields: Vec<FieldLayout>,
}

impl RecordLayout {
    /// Compute a layout from field declarations using C struct rules
    pub fn from_c_fields(name: &str, fields: &[(&str, ScalarKind)]) -> Result<Self> {
        let mut builder = CLayoutBuilder::new();
        for (field_name, kind) in fields {
            builder.push(field_name, *kind)?;
        }
        builder.finish(name)
    }

    /// Describe a layout the compiler already produced for `T`
    pub fn from_compiled<T>(name: &str, fields: &[(&str, ScalarKind, usize)]) -> Self {
        Self {
            name: name.to_string(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            fields: fields
                .iter()
                .map(|(field_name, kind, offset)| FieldLayout {
                    name: field_name.to_string(),
                    kind: *kind,
                    offset: *offset,
                })
                .collect(),
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Bytes of the record not covered by any field
    pub fn padding_bytes(&self) -> usize {
        let used: usize = self.fields.iter().map(|f| f.kind.size()).sum();
        self.size.saturating_sub(used)
    }
}

/// Largest offset a declaration may state, the same bound Rust puts on object sizes
pub const MAX_OFFSET: usize = isize::MAX as usize;

fn align_up(value: usize, align: usize) -> Result<usize> {
    value
        .checked_next_multiple_of(align)
        .ok_or_else(|| too_large(value))
}

fn too_large(value: usize) -> InteropError {
    InteropError::InvalidDeclaration(format!(
        "layout extends past {} bytes (at {})",
        MAX_OFFSET, value
    ))
}

/// Places fields one after another the way a C compiler does
struct CLayoutBuilder {
    cursor: usize,
    align: usize,
    fields: Vec<FieldLayout>,
}

impl CLayoutBuilder {
    fn new() -> Self {
        Self {
            cursor: 0,
            align: 1,
            fields: Vec::new(),
        }
    }

    fn push(&mut self, name: &str, kind: ScalarKind) -> Result<()> {
        let offset = align_up(self.cursor, kind.align())?;
        self.place(name, kind, offset)
    }

    /// Place a field at an offset measured on the far side
    fn push_at(&mut self, name: &str, kind: ScalarKind, offset: usize) -> Result<()> {
        if offset < self.cursor {
            return Err(InteropError::InvalidDeclaration(format!(
                "field `{}` at offset {} overlaps the previous field ending at {}",
                name, offset, self.cursor
            )));
        }
        self.place(name, kind, offset)
    }

    fn place(&mut self, name: &str, kind: ScalarKind, offset: usize) -> Result<()> {
        let end = offset
            .checked_add(kind.size())
            .filter(|end| *end <= MAX_OFFSET)
            .ok_or_else(|| too_large(offset))?;
        self.cursor = end;
        self.align = self.align.max(kind.align());
        self.fields.push(FieldLayout {
            name: name.to_string(),
            kind,
            offset,
        });
        Ok(())
    }

    fn natural_size(&self) -> Result<usize> {
        align_up(self.cursor, self.align)
    }

    fn finish(self, name: &str) -> Result<RecordLayout> {
        let size = self.natural_size()?;
        Ok(RecordLayout {
            name: name.to_string(),
            size,
            align: self.align,
            fields: self.fields,
        })
    }
}

/// A record type that crosses the language boundary
pub trait InteropRecord: Copy + Send + Sync + 'static {
    /// Record name used at the boundary
    const NAME: &'static str;

    /// The boundary contract: field names and kinds, in order
    const CONTRACT: &'static [(&'static str, ScalarKind)];

    /// Layout as compiled on this side
    fn layout() -> RecordLayout;

    /// Layout computed independently from [`Self::CONTRACT`] with C rules
    fn contract_layout() -> Result<RecordLayout> {
        RecordLayout::from_c_fields(Self::NAME, Self::CONTRACT)
    }
}

impl InteropRecord for Event {
    const NAME: &'static str = "Event";
    const CONTRACT: &'static [(&'static str, ScalarKind)] = &[
        ("type", ScalarKind::I32),
        ("keyCode", ScalarKind::I32),
        ("mouseX", ScalarKind::I32),
        ("mouseY", ScalarKind::I32),
        ("mouseButton", ScalarKind::I32),
        ("isPressed", ScalarKind::I32),
    ];

    fn layout() -> RecordLayout {
        RecordLayout::from_compiled::<Self>(
            Self::NAME,
            &[
                ("type", ScalarKind::I32, offset_of!(Event, event_type)),
                ("keyCode", ScalarKind::I32, offset_of!(Event, key_code)),
                ("mouseX", ScalarKind::I32, offset_of!(Event, mouse_x)),
                ("mouseY", ScalarKind::I32, offset_of!(Event, mouse_y)),
                ("mouseButton", ScalarKind::I32, offset_of!(Event, mouse_button)),
                ("isPressed", ScalarKind::I32, offset_of!(Event, is_pressed)),
            ],
        )
    }
}

impl InteropRecord for Color {
    const NAME: &'static str = "Color";
    const CONTRACT: &'static [(&'static str, ScalarKind)] = &[
        ("r", ScalarKind::F32),
        ("g", ScalarKind::F32),
        ("b", ScalarKind::F32),
        ("a", ScalarKind::F32),
    ];

    fn layout() -> RecordLayout {
        RecordLayout::from_compiled::<Self>(
            Self::NAME,
            &[
                ("r", ScalarKind::F32, offset_of!(Color, r)),
                ("g", ScalarKind::F32, offset_of!(Color, g)),
                ("b", ScalarKind::F32, offset_of!(Color, b)),
                ("a", ScalarKind::F32, offset_of!(Color, a)),
            ],
        )
    }
}

impl InteropRecord for Point {
    const NAME: &'static str = "Point";
    const CONTRACT: &'static [(&'static str, ScalarKind)] =
        &[("x", ScalarKind::F32), ("y", ScalarKind::F32)];

    fn layout() -> RecordLayout {
        RecordLayout::from_compiled::<Self>(
            Self::NAME,
            &[
                ("x", ScalarKind::F32, offset_of!(Point, x)),
                ("y", ScalarKind::F32, offset_of!(Point, y)),
            ],
        )
    }
}

/// The records of this crate, by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Event,
    Color,
    Point,
}

impl RecordKind {
    /// All records, in declaration order
    pub const ALL: [RecordKind; 3] = [RecordKind::Event, RecordKind::Color, RecordKind::Point];

    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Event => Event::NAME,
            RecordKind::Color => Color::NAME,
            RecordKind::Point => Point::NAME,
        }
    }

    /// Compiled layout of this record
    pub fn layout(self) -> RecordLayout {
        match self {
            RecordKind::Event => Event::layout(),
            RecordKind::Color => Color::layout(),
            RecordKind::Point => Point::layout(),
        }
    }

    /// Layout computed from the boundary contract
    pub fn contract_layout(self) -> Result<RecordLayout> {
        match self {
            RecordKind::Event => Event::contract_layout(),
            RecordKind::Color => Color::contract_layout(),
            RecordKind::Point => Point::contract_layout(),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordKind {
    type Err = InteropError;

    /// Case-insensitive lookup by record name
    fn from_str(s: &str) -> Result<Self> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InteropError::UnknownRecord(s.to_string()))
    }
}

/// Compiled layouts of every record, in declaration order
pub fn record_layouts() -> Vec<RecordLayout> {
    RecordKind::ALL.iter().map(|kind| kind.layout()).collect()
}

/// Compiled layout of the record with the given name (case-insensitive)
pub fn layout_by_name(name: &str) -> Result<RecordLayout> {
    name.parse::<RecordKind>().map(RecordKind::layout)
}

/// One difference between our layout and a peer's
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "mismatch", rename_all = "snake_case")]
pub enum LayoutMismatch {
    #[error("record size differs: ours is {ours} bytes, theirs is {theirs} bytes")]
    Size { ours: usize, theirs: usize },

    #[error("field #{index} `{name}` is missing on the peer side")]
    MissingField { index: usize, name: String },

    #[error("peer declares extra field #{index} `{name}`")]
    ExtraField { index: usize, name: String },

    #[error("field #{index} `{name}`: ours is {ours}, theirs is {theirs}")]
    Kind {
        index: usize,
        name: String,
        ours: ScalarKind,
        theirs: ScalarKind,
    },

    #[error("field #{index} `{name}`: ours is at offset {ours}, theirs at offset {theirs}")]
    Offset {
        index: usize,
        name: String,
        ours: usize,
        theirs: usize,
    },

    #[error("field #{index}: ours is named `{ours}`, theirs `{theirs}`")]
    Name {
        index: usize,
        ours: String,
        theirs: String,
    },

    #[error(
        "field `{name}` is #{ours_index} (offset {ours_offset}) on our side \
         but #{theirs_index} (offset {theirs_offset}) on theirs"
    )]
    Reordered {
        name: String,
        ours_index: usize,
        theirs_index: usize,
        ours_offset: usize,
        theirs_offset: usize,
    },
}

/// Compare two layouts field by field, by position.
///
/// Returns every difference found; an empty list means the layouts are
/// interchangeable.
pub fn compare_layouts(
    ours: &RecordLayout,
    theirs: &RecordLayout,
    config: &CompareConfig,
) -> Vec<LayoutMismatch> {
    log::debug!("Comparing layout {} against peer {}", ours.name, theirs.name);

    let mut mismatches = Vec::new();

    if config.check_record_size && ours.size != theirs.size {
        mismatches.push(LayoutMismatch::Size {
            ours: ours.size,
            theirs: theirs.size,
        });
    }

    let count = ours.fields.len().max(theirs.fields.len());
    for index in 0..count {
        match (ours.fields.get(index), theirs.fields.get(index)) {
            (Some(o), Some(t)) => {
                if config.match_field_names && o.name != t.name {
                    mismatches.push(LayoutMismatch::Name {
                        index,
                        ours: o.name.clone(),
                        theirs: t.name.clone(),
                    });
                }
                if o.kind != t.kind {
                    mismatches.push(LayoutMismatch::Kind {
                        index,
                        name: o.name.clone(),
                        ours: o.kind,
                        theirs: t.kind,
                    });
                }
                if o.offset != t.offset {
                    mismatches.push(LayoutMismatch::Offset {
                        index,
                        name: o.name.clone(),
                        ours: o.offset,
                        theirs: t.offset,
                    });
                }
            }
            (Some(o), None) => mismatches.push(LayoutMismatch::MissingField {
                index,
                name: o.name.clone(),
            }),
            (None, Some(t)) => mismatches.push(LayoutMismatch::ExtraField {
                index,
                name: t.name.clone(),
            }),
            (None, None) => {}
        }
    }

    for (ours_index, field) in ours.fields.iter().enumerate() {
        let Some(theirs_index) = theirs.position(&field.name) else {
            continue;
        };
        if theirs_index != ours_index {
            mismatches.push(LayoutMismatch::Reordered {
                name: field.name.clone(),
                ours_index,
                theirs_index,
                ours_offset: field.offset,
                theirs_offset: theirs.fields[theirs_index].offset,
            });
        }
    }

    for mismatch in &mismatches {
        log::debug!("{}: {}", ours.name, mismatch);
    }

    mismatches
}

/// Like [`compare_layouts`], but fails with every mismatch attached
pub fn verify_layout(
    ours: &RecordLayout,
    theirs: &RecordLayout,
    config: &CompareConfig,
) -> Result<()> {
    let mismatches = compare_layouts(ours, theirs, config);
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(InteropError::LayoutMismatch {
            record: ours.name.clone(),
            mismatches,
        })
    }
}

/// A record as declared on the far side of the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// The peer's own name for the record (e.g. `PythonColor`)
    pub name: String,

    /// Which of our records this declaration binds to (defaults to `name`)
    #[serde(default)]
    pub record: Option<String>,

    /// Size measured on the far side (`sizeof`); computed when absent
    #[serde(default)]
    pub size: Option<usize>,

    pub fields: Vec<PeerField>,
}

/// One field of a peer declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerField {
    pub name: String,
    pub kind: ScalarKind,

    /// Offset measured on the far side (`offsetof`); computed when absent
    #[serde(default)]
    pub offset: Option<usize>,
}

impl PeerRecord {
    /// Name of our record this declaration is checked against
    pub fn binds_to(&self) -> &str {
        self.record.as_deref().unwrap_or(&self.name)
    }

    /// Resolve the declaration into a concrete layout.
    ///
    /// Fields without an explicit offset are placed with C rules after the
    /// previous field.
    pub fn layout(&self) -> Result<RecordLayout> {
        if self.fields.is_empty() {
            return Err(InteropError::InvalidDeclaration(format!(
                "record `{}` declares no fields",
                self.name
            )));
        }

        let mut builder = CLayoutBuilder::new();
        for field in &self.fields {
            match field.offset {
                Some(offset) => builder.push_at(&field.name, field.kind, offset)?,
                None => builder.push(&field.name, field.kind)?,
            }
        }

        let natural = builder.natural_size()?;
        let mut layout = builder.finish(&self.name)?;
        if let Some(size) = self.size {
            let used = layout.fields.last().map(FieldLayout::end).unwrap_or(0);
            if size < used {
                return Err(InteropError::InvalidDeclaration(format!(
                    "record `{}` declares size {} but its fields end at {}",
                    self.name, size, used
                )));
            }
            if size != natural {
                log::debug!(
                    "Peer record {} declares size {} (natural size {})",
                    self.name,
                    size,
                    natural
                );
            }
            layout.size = size;
        }

        Ok(layout)
    }

    /// Compare this declaration against the record it binds to
    pub fn compare(&self, config: &CompareConfig) -> Result<Vec<LayoutMismatch>> {
        let kind: RecordKind = self.binds_to().parse()?;
        let theirs = self.layout()?;
        Ok(compare_layouts(&kind.layout(), &theirs, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(name: &str, fields: &[(&str, ScalarKind)]) -> PeerRecord {
        PeerRecord {
            name: name.to_string(),
            record: None,
            size: None,
            fields: fields
                .iter()
                .map(|(n, k)| PeerField {
                    name: n.to_string(),
                    kind: *k,
                    offset: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_compiled_matches_contract() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.layout(), kind.contract_layout().unwrap(), "{}", kind);
        }
    }

    #[test]
    fn test_event_layout() {
        let layout = Event::layout();
        assert_eq!(layout.size, 24);
        assert_eq!(layout.align, 4);
        assert_eq!(layout.padding_bytes(), 0);
        let offsets: Vec<usize> = layout.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 4, 8, 12, 16, 20]);
        assert_eq!(layout.field("isPressed").map(|f| f.kind), Some(ScalarKind::I32));
    }

    #[test]
    fn test_c_rules_insert_padding() {
        let layout = RecordLayout::from_c_fields(
            "Mixed",
            &[
                ("flag", ScalarKind::Bool),
                ("value", ScalarKind::F64),
                ("tag", ScalarKind::U16),
            ],
        )
        .unwrap();
        assert_eq!(layout.fields[1].offset, 8);
        assert_eq!(layout.fields[2].offset, 16);
        assert_eq!(layout.size, 24);
        assert_eq!(layout.align, 8);
        assert_eq!(layout.padding_bytes(), 13);
    }

    #[test]
    fn test_record_kind_lookup() {
        assert_eq!("event".parse::<RecordKind>().unwrap(), RecordKind::Event);
        assert_eq!(" Color ".parse::<RecordKind>().unwrap(), RecordKind::Color);
        assert!(matches!(
            "Rect".parse::<RecordKind>(),
            Err(InteropError::UnknownRecord(_))
        ));
        assert_eq!(layout_by_name("POINT").unwrap().size, 8);
    }

    #[test]
    fn test_identical_peer_has_no_mismatches() {
        let peer = peer("Point", Point::CONTRACT);
        assert!(peer.compare(&CompareConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_names_ignored_by_default() {
        let renamed = peer("Point", &[("px", ScalarKind::F32), ("py", ScalarKind::F32)]);
        assert!(renamed.compare(&CompareConfig::default()).unwrap().is_empty());

        let strict = CompareConfig::new().with_field_names(true);
        let mismatches = renamed.compare(&strict).unwrap();
        assert_eq!(mismatches.len(), 2);
        assert!(matches!(&mismatches[0], LayoutMismatch::Name { index: 0, .. }));
    }

    #[test]
    fn test_widened_field_reports_kind_offset_and_size() {
        let widened = peer("Point", &[("x", ScalarKind::F64), ("y", ScalarKind::F64)]);
        let mismatches = widened.compare(&CompareConfig::default()).unwrap();

        assert!(mismatches.contains(&LayoutMismatch::Size { ours: 8, theirs: 16 }));
        assert!(mismatches.contains(&LayoutMismatch::Kind {
            index: 0,
            name: "x".to_string(),
            ours: ScalarKind::F32,
            theirs: ScalarKind::F64,
        }));
        assert!(mismatches.contains(&LayoutMismatch::Offset {
            index: 1,
            name: "y".to_string(),
            ours: 4,
            theirs: 8,
        }));
    }

    #[test]
    fn test_swapped_same_width_fields_are_reported() {
        let swapped = peer(
            "Event",
            &[
                ("type", ScalarKind::I32),
                ("mouseX", ScalarKind::I32),
                ("keyCode", ScalarKind::I32),
                ("mouseY", ScalarKind::I32),
                ("mouseButton", ScalarKind::I32),
                ("isPressed", ScalarKind::I32),
            ],
        );
        let mismatches = swapped.compare(&CompareConfig::default()).unwrap();
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches.contains(&LayoutMismatch::Reordered {
            name: "keyCode".to_string(),
            ours_index: 1,
            theirs_index: 2,
            ours_offset: 4,
            theirs_offset: 8,
        }));
    }

    #[test]
    fn test_missing_and_extra_fields() {
        let short = peer(
            "Color",
            &[
                ("r", ScalarKind::F32),
                ("g", ScalarKind::F32),
                ("b", ScalarKind::F32),
            ],
        );
        let mismatches = short
            .compare(&CompareConfig::new().with_record_size(false))
            .unwrap();
        assert_eq!(
            mismatches,
            vec![LayoutMismatch::MissingField {
                index: 3,
                name: "a".to_string()
            }]
        );

        let long = peer(
            "Point",
            &[
                ("x", ScalarKind::F32),
                ("y", ScalarKind::F32),
                ("z", ScalarKind::F32),
            ],
        );
        let mismatches = long.compare(&CompareConfig::default()).unwrap();
        assert!(mismatches.contains(&LayoutMismatch::ExtraField {
            index: 2,
            name: "z".to_string()
        }));
        assert!(mismatches.contains(&LayoutMismatch::Size { ours: 8, theirs: 12 }));
    }

    #[test]
    fn test_explicit_offsets() {
        let mut packed = peer("Point", Point::CONTRACT);
        packed.fields[1].offset = Some(6);
        let layout = packed.layout().unwrap();
        assert_eq!(layout.fields[1].offset, 6);
        assert_eq!(layout.size, 12);

        packed.fields[1].offset = Some(2);
        assert!(matches!(packed.layout(), Err(InteropError::InvalidDeclaration(_))));
    }

    #[test]
    fn test_oversized_offsets_are_rejected() {
        let json = r#"{"name":"Point","fields":[
            {"name":"x","kind":"f32","offset":18446744073709551614}
        ]}"#;
        let huge: PeerRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(
            huge.compare(&CompareConfig::default()),
            Err(InteropError::InvalidDeclaration(_))
        ));

        // Just past the bound, and a computed field following one at the bound
        let mut edge = peer("Point", Point::CONTRACT);
        edge.fields[0].offset = Some(MAX_OFFSET);
        assert!(matches!(edge.layout(), Err(InteropError::InvalidDeclaration(_))));

        edge.fields[0].offset = Some(MAX_OFFSET - 4);
        assert!(matches!(edge.layout(), Err(InteropError::InvalidDeclaration(_))));

        // MAX_OFFSET - 11 is a multiple of 4, so y lands right after x
        edge.fields[0].offset = Some(MAX_OFFSET - 11);
        let layout = edge.layout().unwrap();
        assert_eq!(layout.fields[1].offset, MAX_OFFSET - 7);
        assert_eq!(layout.size, MAX_OFFSET - 3);
    }

    #[test]
    fn test_explicit_size() {
        let mut sized = peer("Point", Point::CONTRACT);
        sized.size = Some(16);
        let mismatches = sized.compare(&CompareConfig::default()).unwrap();
        assert_eq!(mismatches, vec![LayoutMismatch::Size { ours: 8, theirs: 16 }]);

        sized.size = Some(6);
        assert!(sized.layout().is_err());
    }

    #[test]
    fn test_binding_and_empty_declarations() {
        let mut python_color = peer("PythonColor", Color::CONTRACT);
        assert!(matches!(
            python_color.compare(&CompareConfig::default()),
            Err(InteropError::UnknownRecord(_))
        ));
        python_color.record = Some("Color".to_string());
        assert_eq!(python_color.binds_to(), "Color");
        assert!(python_color.compare(&CompareConfig::default()).unwrap().is_empty());

        let empty = peer("Point", &[]);
        assert!(matches!(empty.layout(), Err(InteropError::InvalidDeclaration(_))));
    }

    #[test]
    fn test_verify_layout_collects_all() {
        let theirs = RecordLayout::from_c_fields("Point", &[("x", ScalarKind::F64)]).unwrap();
        let err = verify_layout(&Point::layout(), &theirs, &CompareConfig::default()).unwrap_err();
        match err {
            InteropError::LayoutMismatch { record, mismatches } => {
                assert_eq!(record, "Point");
                assert_eq!(mismatches.len(), 2); // kind of x, missing y; sizes are both 8
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatch_serializes_with_tag() {
        let json = serde_json::to_value(LayoutMismatch::Size { ours: 8, theirs: 16 }).unwrap();
        assert_eq!(json["mismatch"], "size");
        assert_eq!(json["theirs"], 16);
    }
}
