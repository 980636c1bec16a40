//! Core record types shared across the language boundary
//!
//! Every record here is `#[repr(C)]` with explicitly sized fields. The far side
//! (a C header, a Python `ctypes.Structure`, a Swift struct) declares the same
//! fields in the same order, and both sides read and write the same bytes.
//! Nothing in this module validates values: range checks and interpretation of
//! the `type` discriminator belong to the producer and consumer.

use crate::layout::LayoutMismatch;
use serde::{Deserialize, Serialize};
use std::mem::{offset_of, size_of};

/// Result type for interop operations
pub type Result<T> = std::result::Result<T, InteropError>;

/// One discrete input occurrence (keyboard or mouse).
///
/// All fields are present for every kind of event. Fields that do not apply to
/// the event's `type` carry no meaning; the producer makes no promise about
/// their value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Input kind discriminator. The enumeration is owned by the producer.
    #[serde(rename = "type")]
    pub event_type: i32,
    /// Key identifier, meaningful for keyboard events only
    pub key_code: i32,
    /// Cursor X in the producer's coordinate space
    pub mouse_x: i32,
    /// Cursor Y in the producer's coordinate space
    pub mouse_y: i32,
    /// Button identifier, meaningful for button events only
    pub mouse_button: i32,
    /// Nonzero = pressed, zero = released. Kept as `i32`: a Rust `bool` is one
    /// byte and would not match the 32-bit slot on the other side.
    pub is_pressed: i32,
}

impl Event {
    /// Create an event from all six fields, in boundary order
    pub const fn new(
        event_type: i32,
        key_code: i32,
        mouse_x: i32,
        mouse_y: i32,
        mouse_button: i32,
        is_pressed: i32,
    ) -> Self {
        Self {
            event_type,
            key_code,
            mouse_x,
            mouse_y,
            mouse_button,
            is_pressed,
        }
    }
}

/// RGBA color with four single-precision channels.
///
/// Channels are expected in `[0.0, 1.0]` but out-of-range values are carried
/// unchanged.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// 2D coordinate with single-precision components
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// Layout pins. A change to any record that moves a field fails the build here
// before it can reach the other side.
const _: () = assert!(size_of::<Event>() == 24);
const _: () = {
    assert!(offset_of!(Event, event_type) == 0);
    assert!(offset_of!(Event, key_code) == 4);
    assert!(offset_of!(Event, mouse_x) == 8);
    assert!(offset_of!(Event, mouse_y) == 12);
    assert!(offset_of!(Event, mouse_button) == 16);
    assert!(offset_of!(Event, is_pressed) == 20);
};

const _: () = assert!(size_of::<Color>() == 16);
const _: () = {
    assert!(offset_of!(Color, r) == 0);
    assert!(offset_of!(Color, g) == 4);
    assert!(offset_of!(Color, b) == 8);
    assert!(offset_of!(Color, a) == 12);
};

const _: () = assert!(size_of::<Point>() == 8);
const _: () = {
    assert!(offset_of!(Point, x) == 0);
    assert!(offset_of!(Point, y) == 4);
};

/// Errors raised by the layout and image tooling.
///
/// The records themselves never fail; these cover comparing declarations and
/// decoding byte images.
#[derive(Debug, thiserror::Error)]
pub enum InteropError {
    #[error("Layout mismatch for record {record}: {} difference(s)", .mismatches.len())]
    LayoutMismatch {
        record: String,
        mismatches: Vec<LayoutMismatch>,
    },

    #[error("Unknown record: {0}")]
    UnknownRecord(String),

    #[error("Invalid record declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Image size mismatch for {record}: expected {expected} bytes, got {actual}")]
    ImageSize {
        record: String,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
