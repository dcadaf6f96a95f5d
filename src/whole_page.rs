//! Compression of the whole page as a single band (JBIG, 0x13).
//!
//! The strategy receives the trimmed page, padded to a multiple of the band
//! height, and hands back one band per call until it has nothing left.

use log::{debug, error, info};

use crate::{
    algorithm::{instantiate, Algorithm, Registry},
    compress::{band_height, line_width_in_b, trim, Margins},
    compression::Compression,
    empty::is_empty_band,
    error::Error,
    page::{Band, Page, PerColor},
    request::Request,
};

/// Page height rounded up to a multiple of `band_height`.
///
/// Returns `None` for a zero band height, or when `height + band_height - 1`
/// doesn't fit in a `u32`.
///
/// ```
/// use qpdl_band::whole_page::padded_height;
///
/// assert_eq!(padded_height(300, 128), Some(384));
/// assert_eq!(padded_height(300, u32::MAX), None);
/// ```
pub fn padded_height(height: u32, band_height: u32) -> Option<u32> {
    let last = band_height.checked_sub(1)?;
    let rounded = height.checked_add(last)? / band_height;
    rounded.checked_mul(band_height)
}

pub(crate) fn compress(
    request: &Request,
    page: &mut Page,
    compression: Compression,
    registry: &dyn Registry,
) -> Result<(), Error> {
    // one encoder per color, kept for the whole page
    let mut algos: PerColor<Box<dyn Algorithm>> = PerColor::new();
    for _ in 0..page.colors() {
        algos.push(instantiate(registry, compression)?)?;
    }

    let margins = Margins::new(request, page);
    let band_height = band_height(request)?;
    let width = trim(page.width(), margins.x()?.saturating_mul(2), "width")?;
    let height = trim(page.height(), margins.y.saturating_mul(2), "height")?;
    let source_line_width = line_width_in_b(page.width());
    let line_width = line_width_in_b(width);
    let plane_height = padded_height(height, band_height).ok_or_else(|| {
        let msg = format!(
            "band height {} is too large for a {} lines page",
            band_height, height
        );
        error!("{}", msg);
        Error::InvalidConfig(msg)
    })?;
    let limit = plane_height / band_height;

    info!(
        "Whole page {}x{} padded to {} lines ({} bands)",
        width, height, plane_height, limit
    );

    let bands = {
        let planes = page.planes()?;
        // rows past the page are never written and stay blank
        let mut buffer = vec![0u8; line_width * plane_height as usize];
        let content_end = line_width * height as usize;
        let mut bands = Vec::new();
        let mut band_number = 0u32;

        loop {
            let mut current: Option<Band> = None;

            for (color, (plane, algo)) in planes.iter().zip(algos.iter_mut()).enumerate() {
                for y in 0..height as usize {
                    let start = (margins.y as usize + y) * source_line_width + margins.x_in_b;
                    buffer[y * line_width..][..line_width]
                        .copy_from_slice(&plane[start..][..line_width]);
                }
                if is_empty_band(&buffer[..content_end]) {
                    continue;
                }

                let compressed = algo.compress(request, &buffer, width, plane_height);
                if let Some(mut compressed) = compressed {
                    compressed.set_color(color as u8 + 1);
                    current
                        .get_or_insert_with(|| {
                            let rows = height.saturating_sub(band_number * band_height);
                            Band::new(band_number, width, band_height, rows.min(band_height))
                        })
                        .register_plane(compressed);
                }
            }

            match current {
                Some(band) if band_number >= limit => {
                    error!(
                        "Compression algorithm {} produced band {} of a {} bands page",
                        compression,
                        band.index(),
                        limit
                    );
                    return Err(Error::RunawayCompression { limit });
                }
                Some(band) => {
                    debug!("Band {} with {} planes", band_number, band.planes().len());
                    bands.push(band);
                    band_number += 1;
                }
                None => break,
            }
        }
        bands
    };

    page.set_width(width);
    page.set_height(height);
    for band in bands {
        page.register_band(band);
    }
    page.flush_planes();
    Ok(())
}
