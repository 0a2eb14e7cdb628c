/// Linear PCM playback source with a forward-only read cursor.
///
/// Invariant: `cursor <= len()`. The cursor moves only through `take` and
/// `skip`, both of which reject moves that would reach or pass the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl SourceBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Return the next `count` bytes and advance past them.
    ///
    /// Returns `None` without moving when `cursor + count` is not strictly
    /// below the length: the tail that would end exactly at the last byte is
    /// never handed out, so an exhausted source keeps producing `None`.
    pub fn take(&mut self, count: usize) -> Option<&[u8]> {
        let end = self.cursor.checked_add(count).filter(|&end| end < self.bytes.len())?;
        let start = std::mem::replace(&mut self.cursor, end);
        Some(&self.bytes[start..end])
    }

    /// Move the cursor forward by `count` bytes if the new position stays
    /// strictly below the length. Returns whether it moved.
    pub fn skip(&mut self, count: usize) -> bool {
        match self.cursor.checked_add(count) {
            Some(end) if end < self.bytes.len() => {
                self.cursor = end;
                true
            }
            _ => false,
        }
    }
}
