#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use qpdl_band::{Algorithm, BandPlane, Request};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What a strategy received in one `compress` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Seen {
    pub band: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub type Log = Rc<RefCell<Vec<Seen>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Strategy recording every band it is given.
#[derive(Clone)]
pub struct Recorder {
    pub log: Log,
    pub transposed: bool,
    pub inverted: bool,
    pub decline: bool,
    pub header: Option<Vec<u8>>,
}

impl Recorder {
    pub fn new(log: &Log) -> Self {
        Recorder {
            log: log.clone(),
            transposed: false,
            inverted: false,
            decline: false,
            header: None,
        }
    }

    pub fn transposed(self) -> Self {
        Recorder {
            transposed: true,
            ..self
        }
    }

    pub fn inverted(self) -> Self {
        Recorder {
            inverted: true,
            ..self
        }
    }

    pub fn declining(self) -> Self {
        Recorder {
            decline: true,
            ..self
        }
    }

    pub fn with_header(self, header: &[u8]) -> Self {
        Recorder {
            header: Some(header.to_vec()),
            ..self
        }
    }
}

impl Algorithm for Recorder {
    fn needs_transposed_layout(&self) -> bool {
        self.transposed
    }

    fn needs_inverted_bits(&self) -> bool {
        self.inverted
    }

    fn compress(
        &mut self,
        _request: &Request,
        band: &[u8],
        width: u32,
        height: u32,
    ) -> Option<BandPlane> {
        self.log.borrow_mut().push(Seen {
            band: band.to_vec(),
            width,
            height,
        });
        if self.decline {
            None
        } else {
            Some(BandPlane::new(vec![band.len() as u8]))
        }
    }

    fn header(&self) -> Option<Vec<u8>> {
        self.header.clone()
    }
}

/// Plane of `height` lines of `ceil(width / 8)` blank bytes.
pub fn blank(width: u32, height: u32) -> Vec<u8> {
    vec![0; ((width as usize + 7) / 8) * height as usize]
}

/// Set one byte of a plane.
pub fn mark(plane: &mut [u8], width: u32, row: usize, byte: usize, value: u8) {
    let line = (width as usize + 7) / 8;
    plane[row * line + byte] = value;
}
