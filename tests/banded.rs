mod common;

use common::{blank, init, log, mark, Recorder};
use qpdl_band::{compress_page, AlgorithmTable, Compression, Error, Page, Request};

fn registry(compression: Compression, recorder: Recorder) -> AlgorithmTable {
    AlgorithmTable::new().with(compression, move || Box::new(recorder.clone()))
}

#[test]
fn blank_page_has_no_band() {
    init();
    for code in [0x0D, 0x0E, 0x11] {
        let seen = log();
        let fallback = Recorder::new(&seen);
        // 0x0D needs its 0x0E fallback
        let table = registry(Compression::from_code(code).unwrap(), Recorder::new(&seen))
            .with(Compression::Algo0E, move || Box::new(fallback.clone()));
        let mut page = Page::new(800, 300, 600, 600, code, vec![blank(800, 300); 4]).unwrap();

        compress_page(&Request::new(128), &mut page, &table).unwrap();

        assert_eq!(page.bands_nr(), 0);
        assert!(seen.borrow().is_empty(), "blank bands reach the strategy");
        assert!(page.is_flushed());
    }
}

#[test]
fn page_is_cut_in_bands() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen));
    let mut plane = blank(800, 300);
    mark(&mut plane, 800, 5, 3, 0xF0);
    mark(&mut plane, 800, 260, 99, 0x01);
    let mut page = Page::new(800, 300, 600, 600, 0x0E, vec![plane]).unwrap();

    compress_page(&Request::new(128), &mut page, &table).unwrap();

    // the blank middle band is skipped but keeps its number
    let indexes: Vec<u32> = page.bands().iter().map(|b| b.index()).collect();
    assert_eq!(indexes, vec![0, 2]);
    assert_eq!(page.bands()[0].height(), 128);
    assert_eq!(page.bands()[0].content_height(), 128);
    assert_eq!(page.bands()[1].height(), 128);
    assert_eq!(page.bands()[1].content_height(), 44);
    assert_eq!(page.bands()[1].width(), 800);
    assert_eq!(page.bands()[1].planes()[0].color(), 1);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    for call in seen.iter() {
        assert_eq!(call.band.len(), 100 * 128);
        assert_eq!(call.width, 800);
        assert_eq!(call.height, 128);
    }
    assert_eq!(seen[0].band[5 * 100 + 3], 0xF0);
    assert_eq!(seen[1].band[4 * 100 + 99], 0x01);
    assert!(seen[1].band[44 * 100..].iter().all(|&b| b == 0));

    assert_eq!(page.width(), 800);
    assert_eq!(page.height(), 300);
    assert!(page.is_flushed());
}

#[test]
fn last_band_is_blank_past_the_page() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen).inverted());
    let plane = vec![0xFF; 100 * 150];
    let mut page = Page::new(800, 150, 600, 600, 0x0E, vec![plane.clone(), plane]).unwrap();

    compress_page(&Request::new(128), &mut page, &table).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 4);
    // inverted, so the padding rows are 0xFF and the content 0x00
    for call in &seen[2..] {
        assert!(call.band[..22 * 100].iter().all(|&b| b == 0x00));
        assert!(call.band[22 * 100..].iter().all(|&b| b == 0xFF));
    }
}

#[test]
fn band_height_is_halved_at_300_dpi() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen));
    let plane = vec![0x55; 10 * 200];
    let mut page = Page::new(80, 200, 300, 300, 0x0E, vec![plane]).unwrap();

    compress_page(&Request::new(128), &mut page, &table).unwrap();

    let heights: Vec<u32> = page.bands().iter().map(|b| b.content_height()).collect();
    assert_eq!(heights, vec![64, 64, 64, 8]);
    assert!(seen.borrow().iter().all(|call| call.height == 64));
}

#[test]
fn only_600_by_600_keeps_full_bands() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen));
    let mut page = Page::new(80, 200, 300, 600, 0x0E, vec![vec![0x55; 10 * 200]]).unwrap();

    compress_page(&Request::new(128), &mut page, &table).unwrap();

    assert_eq!(page.bands_nr(), 2);
}

#[test]
fn hard_margins_are_trimmed() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen));
    let plane: Vec<u8> = (1..=18).collect();
    let mut page = Page::new(24, 6, 72, 72, 0x0E, vec![plane]).unwrap();
    // 8 pixels and 2 lines at 72 dpi
    let request = Request::new(8).hard_margin_x(8.0).hard_margin_y(2.0);

    compress_page(&request, &mut page, &table).unwrap();

    assert_eq!(page.height(), 4);
    assert_eq!(page.width(), 24);
    assert_eq!(page.bands()[0].content_height(), 4);
    let seen = seen.borrow();
    let mut expected = vec![0u8; 3 * 8];
    expected[..12].copy_from_slice(&[8, 9, 0, 11, 12, 0, 14, 15, 0, 17, 18, 0]);
    assert_eq!(seen[0].band, expected);
}

#[test]
fn transposed_strategies_get_columns() {
    init();
    let seen = log();
    let table = registry(Compression::Algo11, Recorder::new(&seen).transposed());
    let plane = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let mut page = Page::new(16, 4, 600, 600, 0x11, vec![plane]).unwrap();

    compress_page(&Request::new(4), &mut page, &table).unwrap();

    assert_eq!(seen.borrow()[0].band, vec![1, 3, 5, 7, 2, 4, 6, 8]);
}

#[test]
fn planes_are_numbered_from_one() {
    init();
    let seen = log();
    let table = registry(Compression::Algo11, Recorder::new(&seen));
    let mut magenta = blank(64, 16);
    mark(&mut magenta, 64, 3, 2, 0x18);
    let planes = vec![blank(64, 16), magenta, blank(64, 16), blank(64, 16)];
    let mut page = Page::new(64, 16, 600, 600, 0x11, planes).unwrap();

    compress_page(&Request::new(16), &mut page, &table).unwrap();

    assert_eq!(page.bands_nr(), 1);
    let colors: Vec<u8> = page.bands()[0].planes().iter().map(|p| p.color()).collect();
    assert_eq!(colors, vec![2]);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn declined_bands_fall_back_on_0e() {
    init();
    let primary = log();
    let secondary = log();
    let first = Recorder::new(&primary).inverted().declining();
    let second = Recorder::new(&secondary);
    let table = AlgorithmTable::new()
        .with(Compression::Algo0D, move || Box::new(first.clone()))
        .with(Compression::Algo0E, move || Box::new(second.clone()));
    let plane: Vec<u8> = (0..8 * 16).map(|i| (i * 37 % 251) as u8).collect();
    let mut page = Page::new(64, 16, 600, 600, 0x0D, vec![plane.clone()]).unwrap();

    compress_page(&Request::new(16), &mut page, &table).unwrap();

    let inverted: Vec<u8> = plane.iter().map(|b| !b).collect();
    assert_eq!(primary.borrow()[0].band, inverted);
    assert_eq!(secondary.borrow()[0].band, plane);
    assert_eq!(page.bands_nr(), 1);
    assert_eq!(page.bands()[0].planes()[0].color(), 1);
}

#[test]
fn fallback_gets_its_own_layout() {
    init();
    let primary = log();
    let secondary = log();
    let first = Recorder::new(&primary).transposed().inverted().declining();
    let second = Recorder::new(&secondary);
    let table = AlgorithmTable::new()
        .with(Compression::Algo0D, move || Box::new(first.clone()))
        .with(Compression::Algo0E, move || Box::new(second.clone()));
    // 2 bytes per line, 4 lines
    let plane = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let mut page = Page::new(16, 4, 600, 600, 0x0D, vec![plane.clone()]).unwrap();

    compress_page(&Request::new(4), &mut page, &table).unwrap();

    let columns: Vec<u8> = [1u8, 3, 5, 7, 2, 4, 6, 8].iter().map(|b| !b).collect();
    assert_eq!(primary.borrow()[0].band, columns);
    assert_eq!(secondary.borrow()[0].band, plane);
    assert_eq!(page.bands_nr(), 1);
}

#[test]
fn accepted_bands_do_not_fall_back() {
    init();
    let primary = log();
    let secondary = log();
    let first = Recorder::new(&primary).inverted();
    let second = Recorder::new(&secondary);
    let table = AlgorithmTable::new()
        .with(Compression::Algo0D, move || Box::new(first.clone()))
        .with(Compression::Algo0E, move || Box::new(second.clone()));
    let mut page = Page::new(64, 16, 600, 600, 0x0D, vec![vec![0x3C; 8 * 16]]).unwrap();

    compress_page(&Request::new(16), &mut page, &table).unwrap();

    assert_eq!(primary.borrow().len(), 1);
    assert!(secondary.borrow().is_empty());
    assert_eq!(page.bands_nr(), 1);
}

#[test]
fn declined_bands_without_fallback_are_dropped() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen).declining());
    let mut page = Page::new(64, 32, 600, 600, 0x0E, vec![vec![0x3C; 8 * 32]]).unwrap();

    compress_page(&Request::new(16), &mut page, &table).unwrap();

    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(page.bands_nr(), 0);
}

#[test]
fn unknown_compression_leaves_the_page_alone() {
    init();
    let table = registry(Compression::Algo0E, Recorder::new(&log()));
    let mut page = Page::new(64, 32, 600, 600, 0x42, vec![vec![0x3C; 8 * 32]]).unwrap();

    let err = compress_page(&Request::new(16).hard_margin_y(1.0), &mut page, &table).unwrap_err();

    assert!(matches!(err, Error::UnknownCompression(0x42)));
    assert_eq!(page.height(), 32);
    assert!(!page.is_flushed());
}

#[test]
fn missing_strategy_leaves_the_page_alone() {
    init();
    let table = registry(Compression::Algo0D, Recorder::new(&log()));
    let mut page = Page::new(64, 32, 600, 600, 0x0D, vec![vec![0x3C; 8 * 32]]).unwrap();

    let err = compress_page(&Request::new(16).hard_margin_y(1.0), &mut page, &table).unwrap_err();

    // 0x0D can't be used without its fallback
    assert!(matches!(
        err,
        Error::AlgorithmUnavailable(Compression::Algo0E)
    ));
    assert_eq!(page.height(), 32);
    assert_eq!(page.bands_nr(), 0);
    assert!(!page.is_flushed());
}

#[test]
fn oversized_margins_are_rejected() {
    init();
    let table = registry(Compression::Algo0E, Recorder::new(&log()));
    let mut page = Page::new(64, 32, 72, 72, 0x0E, vec![vec![0x3C; 8 * 32]]).unwrap();

    let err = compress_page(&Request::new(16).hard_margin_y(40.0), &mut page, &table).unwrap_err();

    assert!(matches!(err, Error::InvalidGeometry(_)));
    assert!(!page.is_flushed());
}

#[test]
fn zero_band_height_is_rejected() {
    init();
    let table = registry(Compression::Algo0E, Recorder::new(&log()));
    let mut page = Page::new(64, 32, 600, 600, 0x0E, vec![vec![0x3C; 8 * 32]]).unwrap();

    let err = compress_page(&Request::new(0), &mut page, &table).unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn grown_page_is_rejected() {
    init();
    let seen = log();
    let table = registry(Compression::Algo0E, Recorder::new(&seen));
    let mut page = Page::new(8, 1, 600, 600, 0x0E, vec![vec![0xFF]]).unwrap();
    page.set_height(100);

    let err = compress_page(&Request::new(16), &mut page, &table).unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidPlane {
            index: 0,
            expected: 100,
            actual: 1
        }
    ));
    assert!(seen.borrow().is_empty());
    assert_eq!(page.height(), 100);
    assert!(!page.is_flushed());
}

#[test]
fn huge_horizontal_margin_is_rejected() {
    init();
    let table = registry(Compression::Algo0E, Recorder::new(&log()));
    let mut page = Page::new(64, 32, 600, 600, 0x0E, vec![vec![0x3C; 8 * 32]]).unwrap();

    let err = compress_page(&Request::new(16).hard_margin_x(1e12), &mut page, &table).unwrap_err();

    assert!(matches!(err, Error::InvalidGeometry(_)));
    assert_eq!(page.width(), 64);
    assert!(!page.is_flushed());
}
