//! Interop Records Library
//!
//! Fixed-layout records shared verbatim across a language boundary: an input
//! [`Event`], an RGBA [`Color`] and a 2D [`Point`]. Both sides of the boundary
//! declare the same fields in the same order with the same widths, and
//! exchange instances by reading and writing the same bytes.
//!
//! # Architecture
//!
//! - `types`: the `#[repr(C)]` records, pinned by compile-time size and offset
//!   assertions
//! - `layout`: machine-readable layouts and positional comparison against a
//!   peer's declaration
//! - `image`: reading and writing a record's exact byte image
//! - `bindings`: C header and Python `ctypes` declarations for the far side
//!
//! The library does NOT:
//! - Interpret the `type` discriminator of an [`Event`]
//! - Validate channel ranges or coordinates
//! - Move records across the boundary (that is the transport's job)
//!
//! # Example Usage
//!
//! ```
//! use interop_records::{
//!     decode_image, encode_image, CompareConfig, Event, ImageByteOrder, PeerField, PeerRecord,
//!     ScalarKind,
//! };
//!
//! let event = Event::new(1, 65, 0, 0, 0, 1);
//! let bytes = encode_image(&event, ImageByteOrder::Native).unwrap();
//! let back: Event = decode_image(&bytes, ImageByteOrder::Native).unwrap();
//! assert_eq!(back.key_code, 65);
//!
//! // A host that declared `x` as a double would read garbage
//! let peer = PeerRecord {
//!     name: "Point".to_string(),
//!     record: None,
//!     size: None,
//!     fields: vec![
//!         PeerField { name: "x".to_string(), kind: ScalarKind::F64, offset: None },
//!         PeerField { name: "y".to_string(), kind: ScalarKind::F32, offset: None },
//!     ],
//! };
//! let mismatches = peer.compare(&CompareConfig::default()).unwrap();
//! assert!(!mismatches.is_empty());
//! ```

// Public modules
pub mod bindings;
pub mod config;
pub mod image;
pub mod layout;
pub mod types;

// Re-export main types for convenience
pub use bindings::{render_c_header, render_ctypes};
pub use config::CompareConfig;
pub use image::{decode_image, decode_image_slice, encode_image, ImageByteOrder, RecordImage};
pub use layout::{
    compare_layouts, layout_by_name, record_layouts, verify_layout, FieldLayout, InteropRecord,
    LayoutMismatch, PeerField, PeerRecord, RecordKind, RecordLayout, ScalarKind,
};
pub use types::{Color, Event, InteropError, Point, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
