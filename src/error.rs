//! Error types for page banding and compression.
//!
//! This module defines all possible errors that can occur while a page is
//! sliced into bands and handed to the compression strategies.

use crate::compression::Compression;
use thiserror::Error;

/// Main error type for banding operations.
///
/// A returned error terminates the processing of the page: nothing is
/// retried and the caller should drop the page.
#[derive(Error, Debug)]
pub enum Error {
    /// The page carries a strategy code outside of the supported set.
    #[error("Compression algorithm 0x{0:X} does not exist")]
    UnknownCompression(u8),

    /// The registry has no factory for this strategy.
    ///
    /// The code is valid but no implementation was provided when the
    /// registry was configured.
    #[error("Compression algorithm {0} is not available")]
    AlgorithmUnavailable(Compression),

    /// The strategy family was compiled out.
    ///
    /// JBIG based strategies are only built with the `jbig` feature.
    #[error("Compression algorithm {0} has been disabled during the compilation, enable the `jbig` feature")]
    AlgorithmDisabled(Compression),

    #[error("Too many colors: {0} (at most 4 planes are supported)")]
    TooManyColors(usize),

    #[error("A page needs at least one color plane")]
    NoColors,

    /// A plane buffer is smaller than the page geometry requires.
    #[error("Plane {index} is too small: expected {expected} bytes, found {actual}")]
    InvalidPlane {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// The hard margins do not leave any printable area.
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    /// The plane buffers have already been released.
    #[error("Plane buffers have been flushed")]
    PlanesFlushed,

    /// A whole page strategy kept producing bands past the page height.
    #[error("Compression did not terminate after {limit} bands")]
    RunawayCompression { limit: u32 },
}
