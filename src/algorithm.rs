//! Compression strategies as seen by the banding layer.
//!
//! The encoders themselves live outside of this crate. They are reached
//! through the [`Algorithm`] trait and created on demand by a [`Registry`].
//! [`PackBits`] is bundled as a simple general purpose strategy.

use std::{collections::HashMap, fmt};

use log::error;

use crate::{
    compression::Compression,
    error::Error,
    page::BandPlane,
    request::Request,
};

/// A compression strategy.
///
/// Instances are created by a [`Registry`] and live for the
/// [`crate::Scope`] of their compression: strategies of the
/// [`crate::Scope::Plane`] scope receive a single band plane,
/// [`crate::Scope::Page`] strategies are called for every band
/// of the page and can accumulate state, such as [`Algorithm::header`].
pub trait Algorithm {
    /// The band has to be stored column by column instead of line by line.
    fn needs_transposed_layout(&self) -> bool {
        false
    }

    /// The band bytes have to be inverted before compression.
    fn needs_inverted_bits(&self) -> bool {
        false
    }

    /// Compress a band buffer of `width` pixels by `height` rows.
    ///
    /// Returns `None` when the strategy declines the band. This is not an
    /// error, the banding layer decides what to do next.
    fn compress(
        &mut self,
        request: &Request,
        band: &[u8],
        width: u32,
        height: u32,
    ) -> Option<BandPlane>;

    /// Header data accumulated while compressing, attached to the page.
    fn header(&self) -> Option<Vec<u8>> {
        None
    }
}

/// Factory of strategy instances.
pub trait Registry {
    /// Create a new instance of the strategy, `None` when it isn't provided.
    fn create(&self, compression: Compression) -> Option<Box<dyn Algorithm>>;
}

type Factory = Box<dyn Fn() -> Box<dyn Algorithm>>;

/// [`Registry`] backed by a table of factory closures.
///
/// # Example
///
/// ```
/// use qpdl_band::{AlgorithmTable, Compression, PackBits};
///
/// let registry = AlgorithmTable::new()
///     .with(Compression::Algo0E, || Box::new(PackBits::new()));
/// assert!(registry.provides(Compression::Algo0E));
/// assert!(!registry.provides(Compression::Algo15));
/// ```
#[derive(Default)]
pub struct AlgorithmTable {
    factories: HashMap<Compression, Factory>,
}

impl AlgorithmTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, compression: Compression, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Algorithm> + 'static,
    {
        self.factories.insert(compression, Box::new(factory));
        self
    }

    pub fn provides(&self, compression: Compression) -> bool {
        self.factories.contains_key(&compression)
    }
}

impl Registry for AlgorithmTable {
    fn create(&self, compression: Compression) -> Option<Box<dyn Algorithm>> {
        self.factories.get(&compression).map(|factory| factory())
    }
}

impl fmt::Debug for AlgorithmTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<Compression> = self.factories.keys().copied().collect();
        codes.sort_by_key(Compression::code);
        f.debug_struct("AlgorithmTable")
            .field("compressions", &codes)
            .finish()
    }
}

/// Create an instance of `compression`, failing when it was compiled out or
/// isn't provided by the registry.
pub(crate) fn instantiate(
    registry: &dyn Registry,
    compression: Compression,
) -> Result<Box<dyn Algorithm>, Error> {
    if !compression.is_enabled() {
        error!(
            "Compression algorithm {} has been disabled during the compilation",
            compression
        );
        return Err(Error::AlgorithmDisabled(compression));
    }
    registry.create(compression).ok_or_else(|| {
        error!("Compression algorithm {} is not available", compression);
        Error::AlgorithmUnavailable(compression)
    })
}

/// Longest run or literal sequence a PackBits control byte can describe.
const PACK_BITS_MAX: usize = 128;

/// PackBits run length encoding over the whole band buffer.
///
/// A control byte `n` in `0..=127` is followed by `n + 1` literal bytes, a
/// control byte `n` in `-127..=-1` is followed by one byte repeated
/// `1 - n` times.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackBits {
    strict: bool,
}

impl PackBits {
    pub fn new() -> Self {
        PackBits { strict: false }
    }

    /// A PackBits strategy that declines bands it can't make smaller.
    pub fn strict() -> Self {
        PackBits { strict: true }
    }

    pub fn pack(data: &[u8]) -> Vec<u8> {
        let mut packed = Vec::new();
        let mut i = 0;

        while i < data.len() {
            let run_value = data[i];
            let mut run_length = 1;

            while i + run_length < data.len()
                && run_length < PACK_BITS_MAX
                && data[i + run_length] == run_value
            {
                run_length += 1;
            }

            if run_length > 1 {
                packed.push((1 - run_length as i16) as i8 as u8);
                packed.push(run_value);
                i += run_length;
            } else {
                // a literal stops where a run of two starts
                let mut literal_run = 1;
                while i + literal_run < data.len()
                    && literal_run < PACK_BITS_MAX
                    && !(i + literal_run + 1 < data.len()
                        && data[i + literal_run] == data[i + literal_run + 1])
                {
                    literal_run += 1;
                }

                packed.push(literal_run as u8 - 1);
                packed.extend_from_slice(&data[i..i + literal_run]);
                i += literal_run;
            }
        }

        packed
    }

    pub fn unpack(packed: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut i = 0;

        while i < packed.len() {
            let control = packed[i] as i8;
            i += 1;
            if control >= 0 {
                let end = (i + control as usize + 1).min(packed.len());
                data.extend_from_slice(&packed[i..end]);
                i = end;
            } else if control != -128 {
                if let Some(&value) = packed.get(i) {
                    let count = (1 - i16::from(control)) as usize;
                    data.extend(std::iter::repeat(value).take(count));
                }
                i += 1;
            }
        }

        data
    }
}

impl Algorithm for PackBits {
    fn compress(
        &mut self,
        _request: &Request,
        band: &[u8],
        _width: u32,
        _height: u32,
    ) -> Option<BandPlane> {
        let packed = Self::pack(band);
        if self.strict && packed.len() >= band.len() {
            return None;
        }
        Some(BandPlane::new(packed))
    }
}
