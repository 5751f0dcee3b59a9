/// Per-frame parameter sequences with single-entry broadcasting
use crate::error::{CameraError, Result};

/// An ordered, non-empty list of per-frame values.
///
/// A sequence holding exactly one entry is broadcast: every frame index
/// resolves to that entry, without the value being repeated in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence<T> {
    entries: Vec<T>,
}

impl<T> FrameSequence<T> {
    /// Wrap `entries`, rejecting an empty list. `field` names the parameter in errors.
    pub fn new(field: &'static str, entries: Vec<T>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CameraError::EmptySequence { field });
        }
        Ok(Self { entries })
    }

    /// A sequence with one value shared by all frames.
    pub fn constant(value: T) -> Self {
        Self {
            entries: vec![value],
        }
    }

    /// Number of stored entries (1 for a broadcast sequence).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; sequences are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_broadcast(&self) -> bool {
        self.entries.len() == 1
    }

    /// Entry for `frame`. Broadcast sequences ignore the index; per-frame
    /// sequences return `None` past their end.
    pub fn get(&self, frame: usize) -> Option<&T> {
        if self.is_broadcast() {
            self.entries.first()
        } else {
            self.entries.get(frame)
        }
    }

    /// Like [`FrameSequence::get`], reporting a missing entry as out of range.
    pub fn at(&self, frame: usize) -> Result<&T> {
        self.get(frame).ok_or(CameraError::FrameOutOfRange {
            index: frame as i64,
            n_frames: self.entries.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Check each entry with `check`, reporting the first failure.
    pub fn validate<F>(&self, mut check: F) -> Result<()>
    where
        F: FnMut(usize, &T) -> Result<()>,
    {
        for (frame, value) in self.entries.iter().enumerate() {
            check(frame, value)?;
        }
        Ok(())
    }
}

/// Resolve the shared frame count of several sequences.
///
/// Broadcast sequences (length 1) fit any count. All sequences with more than
/// one entry must agree on their length, otherwise the first offending field
/// is reported as a shape mismatch.
pub fn frame_count(lengths: &[(&'static str, usize)]) -> Result<usize> {
    let mut count: Option<(&'static str, usize)> = None;

    for &(field, len) in lengths {
        if len == 0 {
            return Err(CameraError::EmptySequence { field });
        }
        if len == 1 {
            continue;
        }
        match count {
            None => count = Some((field, len)),
            Some((_, expected)) if expected != len => {
                return Err(CameraError::ShapeMismatch {
                    field,
                    expected,
                    actual: len,
                });
            }
            Some(_) => {}
        }
    }

    Ok(count.map_or(1, |(_, len)| len))
}
