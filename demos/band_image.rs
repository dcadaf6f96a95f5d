use image::{GrayImage, Luma};
use qpdl_band::{compress_page, AlgorithmTable, Compression, PackBits, Page, Request};
use qrcode::QrCode;
use std::env;

//
// cargo run --example band_image -- qr
// cargo run --example band_image -- path/to/page.png
//

const RESOLUTION: u32 = 600;
const THRESHOLD: u8 = 80;

fn print_usage() {
    println!("Usage: cargo run --example band_image -- [qr | IMAGE]");
    println!("  qr      Band a rendered QR code");
    println!("  IMAGE   Band a grayscale version of the image file");
}

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();

    let image = match args.get(1).map(String::as_str) {
        None | Some("--help") | Some("-h") => {
            print_usage();
            return;
        }
        Some("qr") => {
            let qrcode = QrCode::new("https://github.com/kyasu1/rust-ptouch-usb").unwrap();
            qrcode
                .render::<Luma<u8>>()
                .min_dimensions(2400, 2400)
                .build()
        }
        Some(file) => match image::open(file) {
            Ok(image) => image.to_luma8(),
            Err(err) => {
                eprintln!("Error: can't open '{}': {}", file, err);
                return;
            }
        },
    };

    let (width, height) = image.dimensions();
    let plane = step_filter(&image, THRESHOLD);
    println!(
        "Page {}x{} at {} dpi, {} bytes",
        width,
        height,
        RESOLUTION,
        plane.len()
    );

    let registry = AlgorithmTable::new()
        .with(Compression::Algo0D, || Box::new(PackBits::strict()))
        .with(Compression::Algo0E, || Box::new(PackBits::new()));
    let request = Request::new(128).hard_margin_x(12.0).hard_margin_y(12.0);

    let mut page = match Page::new(width, height, RESOLUTION, RESOLUTION, 0x0D, vec![plane]) {
        Ok(page) => page,
        Err(err) => {
            eprintln!("Error: {}", err);
            return;
        }
    };

    match compress_page(&request, &mut page, &registry) {
        Ok(()) => {
            let mut total = 0;
            for band in page.bands() {
                let size: usize = band.planes().iter().map(|p| p.data().len()).sum();
                total += size;
                println!(
                    "band {:>3}: {}x{} ({} rows), {} bytes",
                    band.index(),
                    band.width(),
                    band.height(),
                    band.content_height(),
                    size
                );
            }
            println!(
                "{} bands, {} bytes after trimming to {}x{}",
                page.bands_nr(),
                total,
                page.width(),
                page.height()
            );
        }
        Err(err) => println!("ERROR {:#?}", err),
    }
}

/// Convert a grayscale image to a 1-bit plane, most significant bit first,
/// where dark pixels are inked.
fn step_filter(image: &GrayImage, threshold: u8) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let line = (width as usize + 7) / 8;
    let mut plane = vec![0u8; line * height as usize];

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[0] <= threshold {
            plane[y as usize * line + x as usize / 8] |= 0x80 >> (x % 8);
        }
    }
    plane
}
