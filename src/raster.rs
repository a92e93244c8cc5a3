//! Best-effort bitmap rendering of preview markup using resvg.
//!
//! Bitmaps are only produced for cart thumbnails, so this step is allowed to
//! fail or time out. Callers treat every error here as "no bitmap".

use std::io::Cursor;
use std::sync::{Arc, OnceLock, mpsc};
use std::thread;
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::fontdb::Database;
use resvg::usvg::{Options, Tree};

use crate::error::{Error, Result};

/// Families tried, in order, for the generic `sans-serif` fallback.
const SANS_SERIF_CANDIDATES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
    "Noto Sans",
];

// ============================================================================
// Fonts
// ============================================================================

/// System fonts, loaded once per process.
///
/// Previews are all text, so an empty database would rasterize to a bare
/// backdrop. The markup always ends its font list with `sans-serif`, which is
/// mapped to the first installed candidate family.
fn font_database() -> Arc<Database> {
    static FONTS: OnceLock<Arc<Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            let installed = |family: &str| {
                db.faces()
                    .any(|face| face.families.iter().any(|(name, _)| name == family))
            };
            let fallback = SANS_SERIF_CANDIDATES
                .into_iter()
                .find(|family| installed(*family))
                .map(|family| family.to_string())
                .or_else(|| {
                    db.faces()
                        .next()
                        .and_then(|face| face.families.first())
                        .map(|(name, _)| name.clone())
                });
            match fallback {
                Some(family) => {
                    tracing::debug!(faces = db.len(), %family, "loaded system fonts");
                    db.set_sans_serif_family(family);
                }
                None => tracing::warn!("no system fonts found, bitmaps will have no text"),
            }
            Arc::new(db)
        })
        .clone()
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders markup to an RGBA image whose longest edge is `size` pixels.
pub fn render_svg(markup: &str, size: u32) -> Result<RgbaImage> {
    let opts = Options {
        fontdb: font_database(),
        ..Options::default()
    };
    let tree = Tree::from_str(markup, &opts).map_err(|e| Error::Raster(e.to_string()))?;

    let svg_size = tree.size();
    let scale = (size as f32) / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Raster(format!("invalid bitmap size {width}x{height}")))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Encodes an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::Raster(e.to_string()))?;
    Ok(bytes)
}

/// Renders and encodes in one step.
pub fn rasterize_png(markup: &str, size: u32) -> Result<Vec<u8>> {
    render_svg(markup, size).and_then(|img| encode_png(&img))
}

/// Rasterizes on a worker thread, giving up after `timeout`.
///
/// A timed out worker is detached and its result discarded.
pub fn rasterize_with_timeout(markup: String, size: u32, timeout: Duration) -> Result<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(rasterize_png(&markup, size));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            let ms = timeout.as_millis() as u64;
            tracing::warn!(timeout_ms = ms, "preview rasterization timed out");
            Err(Error::RasterTimeout(ms))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(Error::Raster("rasterization worker exited".to_string()))
        }
    }
}

fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    // tiny_skia stores premultiplied alpha
    for (src, dst) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        *dst = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
    }
    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    if a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let a_f = a as f32 / 255.0;
    let channel = |c: u8| (c as f32 / a_f).round().min(255.0) as u8;
    Rgba([channel(r), channel(g), channel(b), a])
}
