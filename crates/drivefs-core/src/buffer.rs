//! In-memory body of an open file.
//!
//! The store only offers whole-object download and whole-object upload, so
//! an open file keeps the complete content in a [`BodyBuffer`]:
//! 1. On first access: the current content is downloaded (or started empty)
//! 2. On write: bytes are spliced in or appended
//! 3. After each write: the entire buffer is uploaded again

/// The buffered content of one open file.
///
/// # Example
///
/// ```
/// use drivefs_core::BodyBuffer;
///
/// let mut body = BodyBuffer::new(b"hello".to_vec());
/// body.append(b" world");
/// assert_eq!(body.read(6, 5), b"world");
///
/// body.splice(0, b"J");
/// assert_eq!(body.content(), b"Jello world");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyBuffer {
    content: Vec<u8>,
}

#[allow(clippy::cast_possible_truncation)]
fn to_index(offset: u64) -> usize {
    offset as usize
}

impl BodyBuffer {
    /// Buffer holding previously downloaded content.
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Buffer for content that was never fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy `data` over the buffer starting at `offset`.
    ///
    /// Bytes past the end of `data` are kept. If `offset` lies beyond the
    /// current end the gap is filled with zeros.
    ///
    /// # Returns
    ///
    /// The number of bytes written (always equals `data.len()`).
    pub fn splice(&mut self, offset: u64, data: &[u8]) -> usize {
        let offset = to_index(offset);
        let end = offset + data.len();

        if end > self.content.len() {
            // 1.5x growth keeps sequential writes linear
            let new_capacity = std::cmp::max(end, (self.content.capacity() * 3) / 2);
            if new_capacity > self.content.capacity() {
                self.content.reserve(new_capacity - self.content.len());
            }
            self.content.resize(end, 0);
        }

        self.content[offset..end].copy_from_slice(data);
        data.len()
    }

    /// Add `data` at the end regardless of any cursor.
    pub fn append(&mut self, data: &[u8]) -> usize {
        self.content.extend_from_slice(data);
        data.len()
    }

    /// Bytes `[offset, offset + size)`, clamped to the end of the buffer.
    ///
    /// Returns an empty slice if `offset` is past the end.
    pub fn read(&self, offset: u64, size: usize) -> &[u8] {
        let offset = to_index(offset);
        if offset >= self.content.len() {
            return &[];
        }
        let end = offset.saturating_add(size).min(self.content.len());
        &self.content[offset..end]
    }

    /// Keep at most the first `size` bytes. Never extends the buffer.
    pub fn truncate(&mut self, size: u64) {
        let size = to_index(size);
        if size < self.content.len() {
            self.content.truncate(size);
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_overwrites_in_place() {
        let mut body = BodyBuffer::new(b"abcdef".to_vec());
        assert_eq!(body.splice(2, b"XY"), 2);
        assert_eq!(body.content(), b"abXYef");
    }

    #[test]
    fn test_splice_extends_past_end() {
        let mut body = BodyBuffer::new(b"abc".to_vec());
        body.splice(2, b"XYZ");
        assert_eq!(body.content(), b"abXYZ");
    }

    #[test]
    fn test_splice_fills_gap_with_zeros() {
        let mut body = BodyBuffer::empty();
        body.splice(3, b"x");
        assert_eq!(body.content(), &[0, 0, 0, b'x']);
    }

    #[test]
    fn test_append_ignores_offsets() {
        let mut body = BodyBuffer::new(b"hello".to_vec());
        assert_eq!(body.append(b" world"), 6);
        assert_eq!(body.content(), b"hello world");
        assert_eq!(body.len(), 11);
    }

    #[test]
    fn test_read_clamps() {
        let body = BodyBuffer::new(b"hello".to_vec());
        assert_eq!(body.read(0, 5), b"hello");
        assert_eq!(body.read(3, 100), b"lo");
        assert!(body.read(5, 1).is_empty());
        assert!(body.read(99, 1).is_empty());
        assert_eq!(body.read(1, usize::MAX), b"ello");
    }

    #[test]
    fn test_truncate_never_extends() {
        let mut body = BodyBuffer::new(b"hello".to_vec());
        body.truncate(10);
        assert_eq!(body.content(), b"hello");
        body.truncate(2);
        assert_eq!(body.content(), b"he");
        body.truncate(0);
        assert!(body.is_empty());
    }
}

/// Property-based tests using proptest.
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any sequence of splices matches the same edits on a plain Vec.
        #[test]
        fn splice_sequence_matches_reference(
            initial in prop::collection::vec(any::<u8>(), 0..100),
            ops in prop::collection::vec(
                (0usize..200, prop::collection::vec(any::<u8>(), 0..50)),
                0..20
            )
        ) {
            let mut body = BodyBuffer::new(initial.clone());
            let mut reference = initial;

            for (offset, data) in ops {
                body.splice(offset as u64, &data);

                let end = offset + data.len();
                if end > reference.len() {
                    reference.resize(end, 0);
                }
                reference[offset..end].copy_from_slice(&data);
            }

            prop_assert_eq!(body.content(), reference.as_slice());
        }

        /// Truncation only ever shortens.
        #[test]
        fn truncate_is_monotonic(
            initial in prop::collection::vec(any::<u8>(), 0..100),
            size in 0u64..200
        ) {
            let mut body = BodyBuffer::new(initial.clone());
            body.truncate(size);
            let expected = initial.len().min(size as usize);
            prop_assert_eq!(body.content(), &initial[..expected]);
        }
    }
}
