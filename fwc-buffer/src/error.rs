/// Errors raised by [`crate::ByteBuffer`] and [`crate::TypedArray`].
///
/// These map onto the "Internal" tier of the diagnostic taxonomy (§7):
/// indexing or reading past the end of a buffer is always a toolchain bug,
/// never a user-facing condition, so callers in `fwc-asm`/`fwc-object`
/// convert it into their own fatal `Internal` diagnostic variant rather
/// than surfacing it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The requested offset or index is not within the buffer's current
    /// data size.
    #[error("offset {offset} is out of range for a buffer of size {size}")]
    OutOfRange {
        /// The offset or index that was requested.
        offset: usize,
        /// The buffer's data size at the time of the request.
        size: usize,
    },
}
