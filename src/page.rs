use log::debug;

use crate::{compression::Compression, error::Error};

/// Maximum number of ink planes (cyan, magenta, yellow, black).
pub const MAX_COLORS: usize = 4;

/// Color number given to the black plane by the combined strategy.
pub const BLACK_COLOR: u8 = 4;

/// Fixed capacity container holding one value per color plane.
///
/// Values are indexed `0..len()`; pushing a fifth value fails with
/// [`Error::TooManyColors`].
#[derive(Debug, Clone)]
pub struct PerColor<T> {
    slots: [Option<T>; MAX_COLORS],
    len: usize,
}

impl<T> PerColor<T> {
    pub fn new() -> Self {
        PerColor {
            slots: [None, None, None, None],
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) -> Result<(), Error> {
        if self.len >= MAX_COLORS {
            return Err(Error::TooManyColors(self.len + 1));
        }
        self.slots[self.len] = Some(value);
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots[..self.len].iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots[..self.len].iter_mut().filter_map(Option::as_mut)
    }
}

impl<T> Default for PerColor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compressed data of one color plane of a band.
///
/// The payload is opaque to the banding layer; it is produced by an
/// [`crate::Algorithm`] and written as is by the command serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandPlane {
    color: u8,
    data: Vec<u8>,
}

impl BandPlane {
    pub fn new(data: Vec<u8>) -> Self {
        BandPlane { color: 0, data }
    }

    /// 1-based color number, 0 until the plane is attached to a band.
    pub fn color(&self) -> u8 {
        self.color
    }

    pub fn set_color(&mut self, color: u8) {
        self.color = color;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// One slice of device rows with the compressed planes that carry data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    index: u32,
    width: u32,
    height: u32,
    content_height: u32,
    planes: Vec<BandPlane>,
}

impl Band {
    /// Create an empty band.
    ///
    /// `height` is the height of the buffer given to the strategy and
    /// `content_height` the number of rows coming from the page; they only
    /// differ on the last band of the page.
    pub fn new(index: u32, width: u32, height: u32, content_height: u32) -> Self {
        Band {
            index,
            width,
            height,
            content_height,
            planes: Vec::new(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn content_height(&self) -> u32 {
        self.content_height
    }

    pub fn register_plane(&mut self, plane: BandPlane) {
        self.planes.push(plane);
    }

    pub fn planes(&self) -> &[BandPlane] {
        &self.planes
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

/// A decoded page waiting to be compressed.
///
/// Each plane holds `height` rows of `ceil(width / 8)` bytes, most
/// significant bit first. Compressing the page trims its geometry in place,
/// registers the bands and releases the planes.
#[derive(Debug)]
pub struct Page {
    width: u32,
    height: u32,
    x_resolution: u32,
    y_resolution: u32,
    compression: u8,
    colors: usize,
    planes: Option<PerColor<Vec<u8>>>,
    bands: Vec<Band>,
    header: Option<Vec<u8>>,
}

impl Page {
    /// Create a page from its decoded planes, given in printer order
    /// (cyan, magenta, yellow, black for color pages).
    ///
    /// # Errors
    /// Fails when there is no plane, more than [`MAX_COLORS`] planes, or
    /// a plane is shorter than `height * ceil(width / 8)` bytes.
    pub fn new(
        width: u32,
        height: u32,
        x_resolution: u32,
        y_resolution: u32,
        compression: u8,
        buffers: Vec<Vec<u8>>,
    ) -> Result<Self, Error> {
        if buffers.is_empty() {
            return Err(Error::NoColors);
        }
        if buffers.len() > MAX_COLORS {
            return Err(Error::TooManyColors(buffers.len()));
        }

        let expected = plane_size(width, height);
        let mut planes = PerColor::new();
        for (index, buffer) in buffers.into_iter().enumerate() {
            if buffer.len() < expected {
                return Err(Error::InvalidPlane {
                    index,
                    expected,
                    actual: buffer.len(),
                });
            }
            planes.push(buffer)?;
        }
        assert!(planes.len() <= MAX_COLORS);

        Ok(Page {
            width,
            height,
            x_resolution,
            y_resolution,
            compression,
            colors: planes.len(),
            planes: Some(planes),
            bands: Vec::new(),
            header: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn x_resolution(&self) -> u32 {
        self.x_resolution
    }

    pub fn y_resolution(&self) -> u32 {
        self.y_resolution
    }

    pub fn colors(&self) -> usize {
        self.colors
    }

    /// Raw strategy code of the page.
    pub fn compression(&self) -> u8 {
        self.compression
    }

    /// Strategy code checked against the supported set.
    pub fn compression_kind(&self) -> Result<Compression, Error> {
        Compression::from_code(self.compression)
    }

    pub fn plane_buffer(&self, color: usize) -> Result<&[u8], Error> {
        let planes = self.planes.as_ref().ok_or(Error::PlanesFlushed)?;
        planes
            .get(color)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::InvalidConfig(format!("no plane for color {}", color)))
    }

    /// All the plane buffers, indexed by color.
    pub fn planes(&self) -> Result<&PerColor<Vec<u8>>, Error> {
        self.planes.as_ref().ok_or(Error::PlanesFlushed)
    }

    /// Check every plane still covers the current geometry, which can have
    /// grown since the page was created.
    pub fn check_planes(&self) -> Result<(), Error> {
        let expected = plane_size(self.width, self.height);
        for (index, plane) in self.planes()?.iter().enumerate() {
            if plane.len() < expected {
                return Err(Error::InvalidPlane {
                    index,
                    expected,
                    actual: plane.len(),
                });
            }
        }
        Ok(())
    }

    /// Release the decoded planes. They can't be read anymore afterwards.
    pub fn flush_planes(&mut self) {
        if self.planes.take().is_some() {
            debug!("Plane buffers released");
        }
    }

    pub fn is_flushed(&self) -> bool {
        self.planes.is_none()
    }

    pub fn register_band(&mut self, band: Band) {
        self.bands.push(band);
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn bands_nr(&self) -> usize {
        self.bands.len()
    }

    pub fn set_header(&mut self, header: Vec<u8>) {
        self.header = Some(header);
    }

    /// Strategy header (JBIG BIH) to embed before the bands, if any.
    pub fn header(&self) -> Option<&[u8]> {
        self.header.as_deref()
    }

    /// Convert a horizontal length in points to device pixels.
    pub fn convert_to_x_resolution(&self, points: f64) -> f64 {
        points * f64::from(self.x_resolution) / 72.0
    }

    /// Convert a vertical length in points to device pixels.
    pub fn convert_to_y_resolution(&self, points: f64) -> f64 {
        points * f64::from(self.y_resolution) / 72.0
    }
}

/// Bytes of a `width` by `height` pixels plane, one bit per pixel.
fn plane_size(width: u32, height: u32) -> usize {
    ((width as usize + 7) / 8).saturating_mul(height as usize)
}
