/// Printer settings used while banding a page.
///
/// Hard margins are expressed in points (1/72 inch), the unit used by the
/// printer description. They are converted to device pixels with the page
/// resolution, see [`crate::Page::convert_to_x_resolution`].
///
/// # Example
///
/// ```
/// use qpdl_band::Request;
///
/// let request = Request::new(128).hard_margin_x(12.0).hard_margin_y(12.0);
/// assert_eq!(request.band_height(), 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    hard_margin_x: f64,
    hard_margin_y: f64,
    band_height: u32,
}

impl Request {
    /// Initialize the request with the band height of the device, in rows,
    /// and no hard margins.
    pub fn new(band_height: u32) -> Request {
        Request {
            hard_margin_x: 0.0,
            hard_margin_y: 0.0,
            band_height,
        }
    }

    pub fn hard_margin_x(self, points: f64) -> Self {
        Request {
            hard_margin_x: points,
            ..self
        }
    }

    pub fn hard_margin_y(self, points: f64) -> Self {
        Request {
            hard_margin_y: points,
            ..self
        }
    }

    pub fn hard_margins(&self) -> (f64, f64) {
        (self.hard_margin_x, self.hard_margin_y)
    }

    pub fn band_height(&self) -> u32 {
        self.band_height
    }
}
