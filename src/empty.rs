use std::mem::size_of;

/// Check whether a band buffer contains only zero bytes.
///
/// The buffer is scanned one machine word at a time, the trailing bytes
/// that don't fill a whole word are checked one by one.
#[must_use]
pub fn is_empty_band(band: &[u8]) -> bool {
    let words = band.chunks_exact(size_of::<usize>());
    let remainder = words.remainder();

    for word in words {
        let mut raw = [0u8; size_of::<usize>()];
        raw.copy_from_slice(word);
        if usize::from_ne_bytes(raw) != 0 {
            return false;
        }
    }
    remainder.iter().all(|&byte| byte == 0)
}
