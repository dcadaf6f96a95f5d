use log::{error, info};

use crate::{
    algorithm::Registry,
    banded, combined,
    compression::Family,
    error::Error,
    page::Page,
    request::Request,
    whole_page,
};

/// Cut the page in bands and compress them with the strategy of the page.
///
/// On success the page geometry is trimmed by the hard margins, the
/// compressed bands are registered on the page and the plane buffers are
/// released. On failure the page must not be processed any further.
///
/// # Errors
/// Fails when the page strategy code is unknown, when the strategy is not
/// available from `registry` or was compiled out, when a plane is smaller
/// than the page geometry and when the page geometry leaves nothing to print.
///
/// # Example
///
/// ```
/// use qpdl_band::{compress_page, AlgorithmTable, Compression, Page, PackBits, Request};
///
/// let registry = AlgorithmTable::new()
///     .with(Compression::Algo0E, || Box::new(PackBits::new()));
/// let mut plane = vec![0u8; 100 * 300];
/// plane[5] = 0xFF;
/// let mut page = Page::new(800, 300, 600, 600, 0x0E, vec![plane]).unwrap();
///
/// compress_page(&Request::new(128), &mut page, &registry).unwrap();
/// assert_eq!(page.bands_nr(), 1);
/// assert!(page.is_flushed());
/// ```
pub fn compress_page(
    request: &Request,
    page: &mut Page,
    registry: &dyn Registry,
) -> Result<(), Error> {
    let compression = match page
        .compression_kind()
        .and_then(|compression| page.check_planes().map(|_| compression))
    {
        Ok(compression) => compression,
        Err(err) => {
            error!("{}", err);
            return Err(err);
        }
    };

    info!(
        "Compress page {}x{} ({} colors) with algorithm {}",
        page.width(),
        page.height(),
        page.colors(),
        compression
    );

    match compression.family() {
        Family::Banded => banded::compress(request, page, compression, registry),
        Family::Combined => combined::compress(request, page, compression, registry),
        Family::WholePage => whole_page::compress(request, page, compression, registry),
    }
}

/// Hard margins of the device at the page resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Margins {
    /// Horizontal margin in bytes, i.e. in multiples of 8 pixels.
    pub x_in_b: usize,
    /// Vertical margin in rows.
    pub y: u32,
}

impl Margins {
    pub fn new(request: &Request, page: &Page) -> Self {
        let (margin_x, margin_y) = request.hard_margins();
        let x = page.convert_to_x_resolution(margin_x).ceil().max(0.0) as usize;
        let y = page.convert_to_y_resolution(margin_y).ceil().max(0.0) as u32;

        Margins {
            x_in_b: x.div_ceil(8),
            y,
        }
    }

    /// Horizontal margin in pixels.
    pub fn x(&self) -> Result<u32, Error> {
        self.x_in_b
            .checked_mul(8)
            .and_then(|x| u32::try_from(x).ok())
            .ok_or_else(|| {
                let msg = format!("horizontal margin of {} bytes is too large", self.x_in_b);
                error!("{}", msg);
                Error::InvalidGeometry(msg)
            })
    }
}

/// Band height configured for the device, which can't be zero.
pub(crate) fn band_height(request: &Request) -> Result<u32, Error> {
    match request.band_height() {
        0 => {
            error!("Band height must not be zero");
            Err(Error::InvalidConfig("band height must not be zero".to_string()))
        }
        n => Ok(n),
    }
}

/// Remove `margin` from `length`, failing when nothing is left to print.
pub(crate) fn trim(length: u32, margin: u32, what: &str) -> Result<u32, Error> {
    length.checked_sub(margin).ok_or_else(|| {
        let msg = format!("{} margin {} exceeds the page {} {}", what, margin, what, length);
        error!("{}", msg);
        Error::InvalidGeometry(msg)
    })
}

/// Line width in bytes of a `width` pixels wide plane.
pub(crate) fn line_width_in_b(width: u32) -> usize {
    (width as usize + 7) / 8
}
