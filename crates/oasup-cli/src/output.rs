//! Writing the converted document
//!
//! The document goes to stdout in the format of the original source: YAML
//! sources are written back as YAML, everything else as JSON with a
//! two-space indent.

use crate::error::Result;
use oasup_core::{serialize_document, SourceFormat};
use serde_json::Value;
use std::io::Write;
use tracing::debug;

/// Writes serialized documents to an output stream
pub struct OutputWriter<'w> {
    writer: &'w mut dyn Write,
}

impl<'w> OutputWriter<'w> {
    pub fn new(writer: &'w mut dyn Write) -> Self {
        Self { writer }
    }

    /// Serialize a document and write it followed by a newline
    pub fn document(&mut self, document: &Value, format: SourceFormat) -> Result<()> {
        let text = serialize_document(document, format)?;
        debug!(%format, bytes = text.len(), "writing converted document");

        self.writer.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
