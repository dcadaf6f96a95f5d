//! Banding for the strategies that compress each color plane on its own
//! (0x0D, 0x0E and 0x11).

use log::{debug, info};

use crate::{
    algorithm::{instantiate, Registry},
    compress::{band_height, line_width_in_b, trim, Margins},
    compression::Compression,
    empty::is_empty_band,
    error::Error,
    page::{Band, BandPlane, Page},
    request::Request,
};

/// Where the band is taken from in the page planes.
#[derive(Debug, Clone, Copy)]
struct Geometry {
    line_width_in_b: usize,
    hard_margin_x_in_b: usize,
    band_height: usize,
}

/// Band sized buffer a plane is copied into before compression.
struct Scratch {
    data: Vec<u8>,
    transposed: bool,
    inverted: bool,
}

impl Scratch {
    fn new(geometry: &Geometry) -> Self {
        Scratch {
            data: vec![0; geometry.line_width_in_b * geometry.band_height],
            transposed: false,
            inverted: false,
        }
    }

    /// Copy `rows` lines of `plane` starting at byte `index`, shifted left by
    /// the horizontal margin.
    fn load(
        &mut self,
        plane: &[u8],
        index: usize,
        rows: usize,
        geometry: &Geometry,
        transposed: bool,
    ) {
        let Geometry {
            line_width_in_b,
            hard_margin_x_in_b,
            band_height,
        } = *geometry;
        let copied = line_width_in_b - hard_margin_x_in_b;

        // rows past the end of the page must compress as blank
        if rows < band_height {
            self.data.iter_mut().for_each(|b| *b = 0);
        }

        for y in 0..rows {
            let line = &plane[index + y * line_width_in_b..][..line_width_in_b];
            for x in 0..line_width_in_b {
                let value = if x < copied {
                    line[x + hard_margin_x_in_b]
                } else {
                    0
                };
                if transposed {
                    self.data[x * band_height + y] = value;
                } else {
                    self.data[x + y * line_width_in_b] = value;
                }
            }
        }

        self.transposed = transposed;
        self.inverted = false;
    }

    fn set_inverted(&mut self, inverted: bool) {
        if self.inverted != inverted {
            self.data.iter_mut().for_each(|b| *b = !*b);
            self.inverted = inverted;
        }
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

pub(crate) fn compress(
    request: &Request,
    page: &mut Page,
    compression: Compression,
    registry: &dyn Registry,
) -> Result<(), Error> {
    // Fail on a missing strategy before touching the page
    instantiate(registry, compression)?;
    if let Some(fallback) = compression.fallback() {
        instantiate(registry, fallback)?;
    }

    let margins = Margins::new(request, page);
    let width = page.width();
    let page_height = trim(page.height(), margins.y, "height")?;
    trim(width, margins.x()?, "width")?;
    let line_width = line_width_in_b(width);

    let mut height = band_height(request)?;
    // 300 dpi devices print half bands
    if page.x_resolution() == 300 && page.y_resolution() == 300 {
        height /= 2;
        if height == 0 {
            return Err(Error::InvalidConfig(
                "band height is too small for 300 dpi".to_string(),
            ));
        }
    }

    let geometry = Geometry {
        line_width_in_b: line_width,
        hard_margin_x_in_b: margins.x_in_b,
        band_height: height as usize,
    };
    info!(
        "Banded page {}x{}, {} bytes per line, bands of {} lines",
        width, page_height, line_width, height
    );

    let bands = {
        let planes = page.planes()?;
        let band_size = line_width * height as usize;
        let mut scratch = Scratch::new(&geometry);
        let mut bands = Vec::new();
        let mut index = margins.y as usize * line_width;
        let mut remaining = page_height;
        let mut band_number = 0u32;

        while remaining > 0 {
            let rows = remaining.min(height);
            let mut current: Option<Band> = None;

            for (color, plane) in planes.iter().map(Vec::as_slice).enumerate() {
                let mut algo = instantiate(registry, compression)?;

                let transposed = algo.needs_transposed_layout();
                scratch.load(plane, index, rows as usize, &geometry, transposed);
                if is_empty_band(scratch.data()) {
                    continue;
                }

                scratch.set_inverted(algo.needs_inverted_bits());
                let mut compressed = algo.compress(request, scratch.data(), width, height);

                if compressed.is_none() {
                    if let Some(fallback) = compression.fallback() {
                        debug!(
                            "Band {} color {} declined by {}, retry with {}",
                            band_number,
                            color + 1,
                            compression,
                            fallback
                        );
                        compressed = retry(
                            request,
                            registry,
                            fallback,
                            &mut scratch,
                            Source {
                                plane,
                                index,
                                rows: rows as usize,
                            },
                            &geometry,
                            width,
                        )?;
                    }
                }

                if let Some(mut compressed) = compressed {
                    compressed.set_color(color as u8 + 1);
                    current
                        .get_or_insert_with(|| Band::new(band_number, width, height, rows))
                        .register_plane(compressed);
                }
            }

            match current {
                Some(band) => bands.push(band),
                None => debug!("Band {} is blank", band_number),
            }
            band_number += 1;
            index += band_size;
            remaining -= rows;
        }
        bands
    };

    // the width is kept, the horizontal margin is shifted out of each line
    page.set_height(page_height);
    for band in bands {
        page.register_band(band);
    }
    page.flush_planes();
    Ok(())
}

struct Source<'a> {
    plane: &'a [u8],
    index: usize,
    rows: usize,
}

/// Second attempt on a band the primary strategy declined.
///
/// The band is brought back to the layout and polarity the fallback
/// strategy expects before it is compressed again.
fn retry(
    request: &Request,
    registry: &dyn Registry,
    fallback: Compression,
    scratch: &mut Scratch,
    source: Source<'_>,
    geometry: &Geometry,
    width: u32,
) -> Result<Option<BandPlane>, Error> {
    let mut algo = instantiate(registry, fallback)?;

    if algo.needs_transposed_layout() != scratch.transposed {
        scratch.load(
            source.plane,
            source.index,
            source.rows,
            geometry,
            algo.needs_transposed_layout(),
        );
    }
    scratch.set_inverted(algo.needs_inverted_bits());

    Ok(algo.compress(request, scratch.data(), width, geometry.band_height as u32))
}
