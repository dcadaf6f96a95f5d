//! Banding for the JBIG strategy (0x15) where one encoder instance handles
//! every plane of every band of the page.

use log::{debug, info};

use crate::{
    algorithm::{instantiate, Algorithm, Registry},
    compress::{band_height, line_width_in_b, trim, Margins},
    compression::Compression,
    empty::is_empty_band,
    error::Error,
    page::{Band, Page, PerColor, BLACK_COLOR},
    request::Request,
};

/// The encoder works on lines that are a multiple of this many pixels.
pub const ALIGNMENT: u32 = 256;

/// Width of the buffers given to the encoder for a `width` pixels wide page.
///
/// The width is rounded to the nearest multiple of [`ALIGNMENT`], the
/// remainder has to exceed half of the alignment to round up. Pages
/// narrower than that still get one aligned block.
///
/// ```
/// use qpdl_band::combined::buffer_width;
///
/// assert_eq!(buffer_width(1000), 1024);
/// assert_eq!(buffer_width(850), 768);
/// ```
pub fn buffer_width(width: u32) -> u32 {
    let mut buffer_width = width & !(ALIGNMENT - 1);
    if buffer_width + ALIGNMENT / 2 < width {
        buffer_width += ALIGNMENT;
    }
    buffer_width.max(ALIGNMENT)
}

pub(crate) fn compress(
    request: &Request,
    page: &mut Page,
    compression: Compression,
    registry: &dyn Registry,
) -> Result<(), Error> {
    let mut algo = instantiate(registry, compression)?;

    let margins = Margins::new(request, page);
    let height = band_height(request)?;
    let page_height = trim(page.height(), margins.y, "height")?;
    trim(page.width(), margins.x()?.saturating_mul(2), "width")?;
    let line_width = line_width_in_b(page.width());
    let width = buffer_width(page.width());
    let width_in_b = line_width_in_b(width);
    // bytes kept from each line, between both horizontal margins
    let copied = width_in_b.min(line_width - 2 * margins.x_in_b);

    info!(
        "JBIG banded page {}x{} padded to {} pixels, bands of {} lines",
        page.width(),
        page_height,
        width,
        height
    );

    let bands = {
        let planes = page.planes()?;
        let colors = planes.len();
        let band_size = width_in_b * height as usize;

        let mut scratch: PerColor<Vec<u8>> = PerColor::new();
        for _ in 0..colors {
            scratch.push(vec![0; band_size])?;
        }

        let mut bands = Vec::new();
        let mut index = margins.y as usize * line_width;
        let mut remaining = page_height;
        let mut band_number = 0u32;

        while remaining > 0 {
            let rows = remaining.min(height) as usize;

            for (plane, band) in planes.iter().zip(scratch.iter_mut()) {
                if rows < height as usize {
                    band.iter_mut().for_each(|b| *b = 0);
                }
                for y in 0..rows {
                    let src = &plane[index + y * line_width + margins.x_in_b..][..copied];
                    let dst = &mut band[y * width_in_b..][..width_in_b];
                    dst[..copied].copy_from_slice(src);
                    dst[copied..].iter_mut().for_each(|b| *b = 0);
                }
            }

            let mut current = Band::new(band_number, width, height, rows as u32);
            let black = colors - 1;
            let cmy_has_data = scratch.iter().take(black).any(|band| !is_empty_band(band));

            if cmy_has_data {
                for (color, band) in scratch.iter().enumerate() {
                    if let Some(mut plane) = algo.compress(request, band, width, height) {
                        plane.set_color(color as u8 + 1);
                        current.register_plane(plane);
                    }
                }
            } else if let Some(band) = scratch.get(black).filter(|band| !is_empty_band(band)) {
                // only the black plane carries data
                if let Some(mut plane) = algo.compress(request, band, width, height) {
                    plane.set_color(BLACK_COLOR);
                    current.register_plane(plane);
                }
            }

            if current.is_empty() {
                debug!("Band {} is blank", band_number);
            } else {
                bands.push(current);
            }
            band_number += 1;
            index += height as usize * line_width;
            remaining -= rows as u32;
        }
        bands
    };

    page.set_width(width);
    page.set_height(page_height);
    for band in bands {
        page.register_band(band);
    }
    attach_header(page, algo.as_ref());
    page.flush_planes();
    Ok(())
}

fn attach_header(page: &mut Page, algo: &dyn Algorithm) {
    if page.bands_nr() > 0 {
        if let Some(header) = algo.header() {
            debug!("Attach a {} bytes header to the page", header.len());
            page.set_header(header);
        }
    }
}
