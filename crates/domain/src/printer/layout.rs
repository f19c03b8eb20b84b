//! Status inquiry layouts per dialect.
//!
//! Layouts are data, not code: both can be overridden from configuration
//! when a firmware revision moves a field. A response that does not match
//! the configured layout is rejected instead of guessed at.

use serde::{Deserialize, Serialize};

use super::dialect::Dialect;
use super::status::PrinterStatus;
use crate::error::StatusError;

const STX: u8 = 0x02;
const ETX: u8 = 0x03;

/// Position of a flag inside a textual status block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Zero-based index of the STX/ETX frame
    pub frame: usize,
    /// Zero-based index of the comma-separated field in that frame
    pub field: usize,
}

/// Position of a flag inside a binary status block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRef {
    pub byte: usize,
    pub mask: u8,
}

/// Textual host-status layout (ZPL `~HS`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStatusLayout {
    pub inquiry: String,
    pub frames: usize,
    pub paper_out: FieldRef,
    pub paused: FieldRef,
    pub head_open: FieldRef,
}

impl Default for TextStatusLayout {
    fn default() -> Self {
        Self {
            inquiry: "~HS".to_string(),
            frames: 3,
            paper_out: FieldRef { frame: 0, field: 1 },
            paused: FieldRef { frame: 0, field: 2 },
            head_open: FieldRef { frame: 1, field: 2 },
        }
    }
}

/// Binary status-byte layout (CPCL `ESC h`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryStatusLayout {
    pub inquiry: Vec<u8>,
    pub length: usize,
    pub paper_out: BitRef,
    pub head_open: BitRef,
    /// The canonical block has no pause bit; `None` reports "not paused"
    pub paused: Option<BitRef>,
}

impl Default for BinaryStatusLayout {
    fn default() -> Self {
        Self {
            inquiry: vec![0x1B, 0x68],
            length: 1,
            paper_out: BitRef {
                byte: 0,
                mask: 0x02,
            },
            head_open: BitRef {
                byte: 0,
                mask: 0x04,
            },
            paused: None,
        }
    }
}

/// Status layouts for every supported dialect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLayouts {
    pub zpl: TextStatusLayout,
    pub cpcl: BinaryStatusLayout,
}

impl StatusLayouts {
    /// Bytes that ask the printer for its status
    pub fn inquiry(&self, dialect: Dialect) -> &[u8] {
        match dialect {
            Dialect::Zpl => self.zpl.inquiry.as_bytes(),
            Dialect::Cpcl => &self.cpcl.inquiry,
        }
    }

    /// Whether `bytes` already holds a full response for `dialect`
    pub fn is_complete(&self, dialect: Dialect, bytes: &[u8]) -> bool {
        match dialect {
            Dialect::Zpl => split_frames(bytes).len() >= self.zpl.frames,
            Dialect::Cpcl => bytes.len() >= self.cpcl.length,
        }
    }

    /// Decode a status response. Truncated or unknown layouts are errors.
    pub fn decode(&self, dialect: Dialect, bytes: &[u8]) -> Result<PrinterStatus, StatusError> {
        let status = match dialect {
            Dialect::Zpl => decode_text(&self.zpl, bytes)?,
            Dialect::Cpcl => decode_binary(&self.cpcl, bytes)?,
        };
        Ok(status.with_raw(bytes.escape_ascii().to_string()))
    }
}

/// Extract the payload of every complete STX ... ETX frame.
fn split_frames(bytes: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    let mut start = None;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            STX => start = Some(i + 1),
            ETX => {
                if let Some(s) = start.take() {
                    frames.push(&bytes[s..i]);
                }
            }
            _ => {}
        }
    }

    frames
}

fn decode_text(layout: &TextStatusLayout, bytes: &[u8]) -> Result<PrinterStatus, StatusError> {
    let frames = split_frames(bytes);
    if frames.len() < layout.frames {
        return Err(StatusError::Unparseable(format!(
            "expected {} status frames, got {}",
            layout.frames,
            frames.len()
        )));
    }

    let fields = frames
        .iter()
        .map(|frame| {
            std::str::from_utf8(frame)
                .map(|text| text.split(',').map(str::trim).collect::<Vec<&str>>())
        })
        .collect::<Result<Vec<Vec<&str>>, _>>()
        .map_err(|_| StatusError::Unparseable("status frame is not ASCII".to_string()))?;

    let flag = |name: &str, at: FieldRef| -> Result<bool, StatusError> {
        let value = fields
            .get(at.frame)
            .and_then(|frame| frame.get(at.field))
            .ok_or_else(|| {
                StatusError::Unparseable(format!(
                    "{} field missing (frame {}, field {})",
                    name, at.frame, at.field
                ))
            })?;
        match *value {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(StatusError::Unparseable(format!(
                "{} flag has unexpected value '{}'",
                name, other
            ))),
        }
    };

    Ok(PrinterStatus::new(
        flag("head open", layout.head_open)?,
        flag("paper out", layout.paper_out)?,
        flag("paused", layout.paused)?,
    ))
}

fn decode_binary(layout: &BinaryStatusLayout, bytes: &[u8]) -> Result<PrinterStatus, StatusError> {
    if bytes.len() != layout.length {
        return Err(StatusError::Unparseable(format!(
            "expected {} status byte(s), got {}",
            layout.length,
            bytes.len()
        )));
    }

    let bit = |name: &str, at: BitRef| -> Result<bool, StatusError> {
        bytes
            .get(at.byte)
            .map(|b| b & at.mask != 0)
            .ok_or_else(|| {
                StatusError::Unparseable(format!("{} byte {} out of range", name, at.byte))
            })
    };

    let paused = match layout.paused {
        Some(at) => bit("paused", at)?,
        None => false,
    };

    Ok(PrinterStatus::new(
        bit("head open", layout.head_open)?,
        bit("paper out", layout.paper_out)?,
        paused,
    ))
}
