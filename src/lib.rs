//! QPDL raster banding
//!
//! This crate cuts decoded printer pages into bands and hands them to the
//! compression strategies of QPDL (Samsung/Xerox/Dell) laser printers. The
//! bands registered on the [`Page`] are then written by the command
//! serializer of the driver.
//!
//! Three banding schemes are selected by the compression code of the page:
//!
//! * 0x0D, 0x0E, 0x11: each color plane of a band is compressed on its own,
//!   with 0x0E as the fallback of 0x0D.
//! * 0x15: one JBIG encoder for all the planes of the page, lines padded to
//!   256 pixels.
//! * 0x13: the whole page is given to a JBIG encoder at once.
//!
//! The encoders are provided through a [`Registry`].
//!
//! # Example
//!
//! ```rust
//! use qpdl_band::{compress_page, AlgorithmTable, Compression, PackBits, Page, Request};
//!
//! let registry = AlgorithmTable::new()
//!     .with(Compression::Algo0D, || Box::new(PackBits::strict()))
//!     .with(Compression::Algo0E, || Box::new(PackBits::new()));
//! let request = Request::new(128).hard_margin_x(4.0).hard_margin_y(4.0);
//!
//! let plane = vec![0x0F; 80 * 500];
//! let mut page = Page::new(640, 500, 600, 600, 0x0D, vec![plane]).unwrap();
//! compress_page(&request, &mut page, &registry).unwrap();
//!
//! for band in page.bands() {
//!     println!("band {}: {} planes", band.index(), band.planes().len());
//! }
//! ```

mod algorithm;
mod banded;
pub mod combined;
mod compress;
mod compression;
mod empty;
mod error;
mod page;
mod request;
pub mod whole_page;

pub use crate::{
    algorithm::{Algorithm, AlgorithmTable, PackBits, Registry},
    compress::compress_page,
    compression::{Compression, Family, Scope},
    empty::is_empty_band,
    error::Error,
    page::{Band, BandPlane, Page, PerColor, BLACK_COLOR, MAX_COLORS},
    request::Request,
};
