use std::io::{self, Write};

use arrow::buffer::Buffer;

use crate::alignment;
use crate::format::{MessageKind, CONTINUATION_MARKER};

const PADDING: [u8; alignment::ALIGNMENT] = [0; alignment::ALIGNMENT];

/// Encoded output unit for one stream message.
///
/// A payload owns its serialized header bytes and a reference to every body
/// buffer, in emission order. Absent entries mark omitted buffers (an
/// all-valid bitmap, or a type with an unused buffer slot); they occupy a
/// metadata slot but contribute no bytes. Buffers are reference-counted
/// `arrow` buffers: dropping the payload releases every retained buffer
/// without touching storage still shared with the source arrays.
pub struct Payload {
    kind: MessageKind,
    header: Vec<u8>,
    body: Vec<Option<Buffer>>,
    body_size: i64,
}

impl Payload {
    /// Create an empty payload of the given kind.
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            header: Vec::new(),
            body: Vec::new(),
            body_size: 0,
        }
    }

    /// Create a body-less payload carrying pre-serialized header bytes.
    pub fn with_header(kind: MessageKind, header: Vec<u8>) -> Self {
        Self {
            kind,
            header,
            body: Vec::new(),
            body_size: 0,
        }
    }

    /// Message kind of this payload.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Serialized header bytes.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Body buffers in emission order.
    pub fn body(&self) -> &[Option<Buffer>] {
        &self.body
    }

    /// Total padded size of the body in bytes.
    pub fn body_size(&self) -> i64 {
        self.body_size
    }

    pub(crate) fn push_buffer(&mut self, buffer: Option<Buffer>) {
        self.body.push(buffer);
    }

    pub(crate) fn set_header(&mut self, header: Vec<u8>) {
        self.header = header;
    }

    pub(crate) fn set_body_size(&mut self, body_size: i64) {
        self.body_size = body_size;
    }

    /// Write the framed message to `sink`: continuation marker, padded
    /// header length, header bytes, then each body buffer zero-padded to an
    /// 8-byte boundary. Returns the total number of bytes written.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<usize> {
        let header_padding = alignment::padding_for(self.header.len());
        let header_len = self.header.len() + header_padding;

        sink.write_all(&CONTINUATION_MARKER)?;
        sink.write_all(&(header_len as u32).to_le_bytes())?;
        sink.write_all(&self.header)?;
        if header_padding > 0 {
            sink.write_all(&PADDING[..header_padding])?;
        }

        let mut written = CONTINUATION_MARKER.len() + 4 + header_len;
        for buffer in self.body.iter().flatten() {
            let bytes = buffer.as_slice();
            sink.write_all(bytes)?;
            let padding = alignment::padding_for(bytes.len());
            if padding > 0 {
                sink.write_all(&PADDING[..padding])?;
            }
            written += bytes.len() + padding;
        }

        Ok(written)
    }
}
