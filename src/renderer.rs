use crate::board::{BOARD_SIZE, Board};
use crate::win;
use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Font file stems tried first, best first. All cover Latin-1.
const PREFERRED_FONTS: &[&str] = &[
    "DejaVuSans", "NotoSans-Regular", "LiberationSans-Regular", "Roboto-Regular", "SegoeUI", "Arial", "Helvetica"
];

const CELL_PX: u32 = 128;
const PADDING: u32 = 20;
const HEADER_PX: u32 = 36;

const BACKGROUND: Rgb<u8> = Rgb([245, 245, 245]);
const GOLDEN_BACKGROUND: Rgb<u8> = Rgb([250, 236, 180]);
const GRID: Rgb<u8> = Rgb([30, 30, 30]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const CHECKED_FILL: Rgb<u8> = Rgb([176, 222, 176]);
const LINE_FILL: Rgb<u8> = Rgb([96, 186, 110]);
const GOLDEN_FILL: Rgb<u8> = Rgb([212, 175, 55]);

/// How a tile is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileShade {
    Plain,
    Checked,
    /// Part of at least one finished line.
    OnLine,
    Golden,
}

impl TileShade {
    fn fill(self) -> Option<Rgb<u8>> {
        match self {
            TileShade::Plain => None,
            TileShade::Checked => Some(CHECKED_FILL),
            TileShade::OnLine => Some(LINE_FILL),
            TileShade::Golden => Some(GOLDEN_FILL),
        }
    }
}

pub fn tile_shades(board: &Board) -> Vec<TileShade> {
    let checked = board.checked();
    if win::has_golden_bingo(&checked) {
        return vec![TileShade::Golden; checked.len()];
    }
    let mut shades: Vec<TileShade> = checked
        .iter()
        .map(|&c| if c { TileShade::Checked } else { TileShade::Plain })
        .collect();
    for line in win::completed_lines(&checked) {
        for &i in line {
            shades[i] = TileShade::OnLine;
        }
    }
    shades
}

/// Directories scanned for `.ttf`/`.otf` files: the user's font directory
/// first, then the platform's shared ones.
fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = dirs_next::font_dir().into_iter().collect();
    let shared: &[&str] = match std::env::consts::OS {
        "macos" => &["/Library/Fonts", "/System/Library/Fonts"],
        "windows" => &["C:/Windows/Fonts"],
        _ => &["/usr/local/share/fonts", "/usr/share/fonts"],
    };
    dirs.extend(shared.iter().map(PathBuf::from));
    dirs.retain(|dir| dir.is_dir());
    dirs.dedup();
    dirs
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
}

fn preference_rank(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    PREFERRED_FONTS.iter().position(|name| name.eq_ignore_ascii_case(stem))
}

fn find_system_font_data(override_path: Option<&Path>) -> Option<Vec<u8>> {
    if let Some(path) = override_path {
        match fs::read(path) {
            Ok(bytes) => return Some(bytes),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot read configured font"),
        }
    }

    let font_files: Vec<PathBuf> = font_search_dirs()
        .iter()
        .flat_map(|dir| walkdir::WalkDir::new(dir).follow_links(true).into_iter().filter_map(|e| e.ok()))
        .filter(|entry| entry.file_type().is_file() && is_font_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    tracing::debug!(count = font_files.len(), "scanned font directories");

    let preferred = font_files
        .iter()
        .filter_map(|path| Some((preference_rank(path)?, path)))
        .min_by_key(|(rank, _)| *rank);
    if let Some(data) = preferred.and_then(|(_, path)| fs::read(path).ok()) {
        return Some(data);
    }

    // No well-known name: take whichever font covers most printable ASCII.
    font_files
        .iter()
        .filter_map(|path| {
            let bytes = fs::read(path).ok()?;
            let font = Font::try_from_vec(bytes.clone())?;
            let score = (32u8..=126).filter(|&ch| font.glyph(ch as char).id().0 != 0).count();
            Some((score, bytes))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, bytes)| bytes)
}

struct TextPainter {
    font: Font<'static>,
    scale: Scale,
    line_height: f32,
}

impl TextPainter {
    fn new(font_data: Vec<u8>, px: f32) -> Result<Self, Box<dyn Error>> {
        let font = Font::try_from_vec(font_data).ok_or("Invalid font data")?;
        let scale = Scale::uniform(px);
        let v = font.v_metrics(scale);
        let line_height = (v.ascent - v.descent + v.line_gap).ceil();
        Ok(Self { font, scale, line_height })
    }

    fn word_width(&self, word: &str) -> f32 {
        self.font
            .layout(word, self.scale, point(0.0, 0.0))
            .filter_map(|g| g.pixel_bounding_box().map(|bb| bb.max.x as f32))
            .fold(0.0, f32::max)
    }

    fn draw_wrapped(&self, img: &mut RgbImage, text: &str, left: u32, top: u32, max_w: u32, max_h: u32) {
        let ascent = self.font.v_metrics(self.scale).ascent;
        let mut lines: Vec<String> = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            let candidate = if line.is_empty() { word.to_string() } else { format!("{line} {word}") };
            if !line.is_empty() && self.word_width(&candidate) > max_w as f32 {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() { lines.push(line); }

        let mut pen_y = 0.0f32;
        for line in &lines {
            if pen_y + self.line_height > max_h as f32 { break; }
            self.draw_line(img, line, left, top, pen_y + ascent);
            pen_y += self.line_height;
        }
    }

    fn draw_line(&self, img: &mut RgbImage, text: &str, left: u32, top: u32, baseline_y: f32) {
        for glyph in self.font.layout(text, self.scale, point(0.0, baseline_y)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|x, y, v| {
                    if v < 0.05 { return; }
                    let gx = left as i32 + x as i32 + bb.min.x;
                    let gy = top as i32 + y as i32 + bb.min.y;
                    if gx >= 0 && gy >= 0 && (gx as u32) < img.width() && (gy as u32) < img.height() {
                        let dst = img.get_pixel_mut(gx as u32, gy as u32);
                        for i in 0..3 { dst[i] = ((dst[i] as f32) * (1.0 - v) + (TEXT[i] as f32) * v) as u8; }
                    }
                });
            }
        }
    }
}

/// Pixel origin of tile `index` inside the rendered image.
pub fn tile_origin(index: usize) -> (u32, u32) {
    let row = (index / BOARD_SIZE) as u32;
    let col = (index % BOARD_SIZE) as u32;
    (PADDING + col * CELL_PX, PADDING + HEADER_PX + row * CELL_PX)
}

/// Draws the board (and an optional caption above it) as a PNG.
///
/// Without any usable font the grid and shading are still drawn.
pub fn render_board_to_png(board: &Board, caption: &str, font_path: Option<&Path>, path: &Path) -> Result<(), Box<dyn Error>> {
    let size = BOARD_SIZE as u32;
    let grid_px = size * CELL_PX;
    let img_w = grid_px + PADDING * 2;
    let img_h = grid_px + PADDING * 2 + HEADER_PX;

    let shades = tile_shades(board);
    let golden = shades.iter().all(|s| *s == TileShade::Golden);
    let mut img = RgbImage::from_pixel(img_w, img_h, if golden { GOLDEN_BACKGROUND } else { BACKGROUND });

    for (index, shade) in shades.iter().enumerate() {
        let Some(fill) = shade.fill() else { continue };
        let (x0, y0) = tile_origin(index);
        for y in y0..y0 + CELL_PX {
            for x in x0..x0 + CELL_PX { img.put_pixel(x, y, fill); }
        }
    }

    let top = PADDING + HEADER_PX;
    for i in 0..=size {
        let y = top + i * CELL_PX;
        for x in PADDING..=(PADDING + grid_px) { img.put_pixel(x, y, GRID); }
        let x = PADDING + i * CELL_PX;
        for y in top..=(top + grid_px) { img.put_pixel(x, y, GRID); }
    }

    match find_system_font_data(font_path).map(|data| TextPainter::new(data, 18.0)) {
        Some(Ok(painter)) => {
            painter.draw_wrapped(&mut img, caption, PADDING, PADDING / 2, grid_px, HEADER_PX);
            for (index, tile) in board.tiles().iter().enumerate() {
                let (x0, y0) = tile_origin(index);
                painter.draw_wrapped(&mut img, &tile.text, x0 + 10, y0 + 10, CELL_PX - 20, CELL_PX - 20);
            }
        }
        Some(Err(e)) => tracing::warn!(error = %e, "font unusable, rendering board without text"),
        None => tracing::warn!("no system font found, rendering board without text"),
    }

    let mut file = File::create(path)?;
    img.write_to(&mut file, image::ImageFormat::Png)?;
    tracing::debug!(path = %path.display(), "wrote board image");
    Ok(())
}
