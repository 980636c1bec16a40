//! Memory image codec
//!
//! Writes and reads the exact bytes a record occupies in memory. None of the
//! records has padding, so the image is the fields back to back in
//! declaration order. With [`ImageByteOrder::Native`] the image is identical
//! to the in-memory `#[repr(C)]` value; the explicit orders exist for images
//! captured on a machine of different endianness.

use crate::layout::InteropRecord;
use crate::types::{Color, Event, InteropError, Point, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Write};
use std::mem::size_of;

/// Byte order of a record image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageByteOrder {
    /// Byte order of the running machine, i.e. a raw memory image
    #[default]
    Native,
    Little,
    Big,
}

/// A record that can be written to and read from its memory image
pub trait RecordImage: InteropRecord + Sized {
    /// Image length in bytes, equal to `size_of::<Self>()`
    const IMAGE_SIZE: usize;

    fn write_image<B: ByteOrder, W: Write>(&self, writer: &mut W) -> std::io::Result<()>;

    fn read_image<B: ByteOrder, R: Read>(reader: &mut R) -> std::io::Result<Self>;
}

impl RecordImage for Event {
    const IMAGE_SIZE: usize = size_of::<Event>();

    fn write_image<B: ByteOrder, W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<B>(self.event_type)?;
        writer.write_i32::<B>(self.key_code)?;
        writer.write_i32::<B>(self.mouse_x)?;
        writer.write_i32::<B>(self.mouse_y)?;
        writer.write_i32::<B>(self.mouse_button)?;
        writer.write_i32::<B>(self.is_pressed)?;
        Ok(())
    }

    fn read_image<B: ByteOrder, R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Event {
            event_type: reader.read_i32::<B>()?,
            key_code: reader.read_i32::<B>()?,
            mouse_x: reader.read_i32::<B>()?,
            mouse_y: reader.read_i32::<B>()?,
            mouse_button: reader.read_i32::<B>()?,
            is_pressed: reader.read_i32::<B>()?,
        })
    }
}

impl RecordImage for Color {
    const IMAGE_SIZE: usize = size_of::<Color>();

    fn write_image<B: ByteOrder, W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<B>(self.r)?;
        writer.write_f32::<B>(self.g)?;
        writer.write_f32::<B>(self.b)?;
        writer.write_f32::<B>(self.a)?;
        Ok(())
    }

    fn read_image<B: ByteOrder, R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Color {
            r: reader.read_f32::<B>()?,
            g: reader.read_f32::<B>()?,
            b: reader.read_f32::<B>()?,
            a: reader.read_f32::<B>()?,
        })
    }
}

impl RecordImage for Point {
    const IMAGE_SIZE: usize = size_of::<Point>();

    fn write_image<B: ByteOrder, W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<B>(self.x)?;
        writer.write_f32::<B>(self.y)?;
        Ok(())
    }

    fn read_image<B: ByteOrder, R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Point {
            x: reader.read_f32::<B>()?,
            y: reader.read_f32::<B>()?,
        })
    }
}

/// Encode a record into its image
pub fn encode_image<R: RecordImage>(record: &R, order: ImageByteOrder) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(R::IMAGE_SIZE);
    match order {
        ImageByteOrder::Native => record.write_image::<NativeEndian, _>(&mut buf)?,
        ImageByteOrder::Little => record.write_image::<LittleEndian, _>(&mut buf)?,
        ImageByteOrder::Big => record.write_image::<BigEndian, _>(&mut buf)?,
    }
    Ok(buf)
}

/// Decode exactly one record from its image.
///
/// The slice must be exactly `IMAGE_SIZE` bytes long.
pub fn decode_image<R: RecordImage>(bytes: &[u8], order: ImageByteOrder) -> Result<R> {
    if bytes.len() != R::IMAGE_SIZE {
        return Err(InteropError::ImageSize {
            record: R::NAME.to_string(),
            expected: R::IMAGE_SIZE,
            actual: bytes.len(),
        });
    }
    read_one(&mut Cursor::new(bytes), order)
}

/// Decode a run of consecutive images (e.g. a dumped event queue)
pub fn decode_image_slice<R: RecordImage>(bytes: &[u8], order: ImageByteOrder) -> Result<Vec<R>> {
    if bytes.len() % R::IMAGE_SIZE != 0 {
        return Err(InteropError::ImageSize {
            record: R::NAME.to_string(),
            expected: (bytes.len() / R::IMAGE_SIZE + 1) * R::IMAGE_SIZE,
            actual: bytes.len(),
        });
    }

    let count = bytes.len() / R::IMAGE_SIZE;
    log::debug!("Decoding {} {} image(s)", count, R::NAME);

    let mut cursor = Cursor::new(bytes);
    (0..count).map(|_| read_one(&mut cursor, order)).collect()
}

fn read_one<R: RecordImage>(cursor: &mut Cursor<&[u8]>, order: ImageByteOrder) -> Result<R> {
    let record = match order {
        ImageByteOrder::Native => R::read_image::<NativeEndian, _>(cursor)?,
        ImageByteOrder::Little => R::read_image::<LittleEndian, _>(cursor)?,
        ImageByteOrder::Big => R::read_image::<BigEndian, _>(cursor)?,
    };
    Ok(record)
}
