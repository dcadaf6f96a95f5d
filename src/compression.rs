use std::fmt;

use crate::error::Error;

/// Compression strategies understood by the banding layer.
///
/// Each variant is identified by the code the printer description assigns to
/// the page. The set is closed: any other code is rejected by
/// [`Compression::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Cheap encoding that may decline a band, see [`Compression::fallback`].
    Algo0D,
    /// General purpose encoding, also the fallback of `Algo0D`.
    Algo0E,
    Algo11,
    /// JBIG, the whole page is handed over as a single band.
    Algo13,
    /// JBIG, banded with a shared encoder for all the planes.
    Algo15,
}

/// How a page is cut before reaching the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Independent planes, one strategy instance per band plane.
    Banded,
    /// All the planes of a band through one stateful strategy instance.
    Combined,
    /// The page is a single oversized band.
    WholePage,
}

/// Lifetime of a strategy instance created by a [`crate::Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Created for a single band plane and dropped after one `compress` call.
    Plane,
    /// Created once per compressed page (per color for whole page
    /// compression) and kept until the page is done. The instance may keep
    /// state between calls, such as header metadata.
    Page,
}

impl Compression {
    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0x0D => Ok(Self::Algo0D),
            0x0E => Ok(Self::Algo0E),
            0x11 => Ok(Self::Algo11),
            0x13 => Ok(Self::Algo13),
            0x15 => Ok(Self::Algo15),
            _ => Err(Error::UnknownCompression(code)),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Algo0D => 0x0D,
            Self::Algo0E => 0x0E,
            Self::Algo11 => 0x11,
            Self::Algo13 => 0x13,
            Self::Algo15 => 0x15,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Self::Algo0D | Self::Algo0E | Self::Algo11 => Family::Banded,
            Self::Algo13 => Family::WholePage,
            Self::Algo15 => Family::Combined,
        }
    }

    pub fn scope(&self) -> Scope {
        match self.family() {
            Family::Banded => Scope::Plane,
            Family::Combined | Family::WholePage => Scope::Page,
        }
    }

    /// Strategy to retry with when this one declines a band.
    ///
    /// `Algo0D` only encodes some bands; the rest have to go through
    /// `Algo0E`, which expects non inverted bytes.
    pub fn fallback(&self) -> Option<Compression> {
        match self {
            Self::Algo0D => Some(Self::Algo0E),
            _ => None,
        }
    }

    /// Whether the strategy was built into this binary.
    pub fn is_enabled(&self) -> bool {
        match self.family() {
            Family::Banded => true,
            Family::Combined | Family::WholePage => cfg!(feature = "jbig"),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.code())
    }
}
