//! 2D structure depictions, rendered to PNG.

use std::io::Cursor;

use base64::prelude::*;
use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::{
    element::Element,
    layout::{self, Bounds, Point},
    molecule::{Atom, BondOrder, Molecule},
    smiles::{self, SmilesError},
};

/// Width, height in pixels.
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (400, 300);

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BOND_COLOR: [u8; 3] = [30, 30, 30];
/// Upper bound on bond length, so small molecules aren't drawn huge.
const MAX_BOND_PX: f64 = 48.;
const PADDING_PX: f64 = 20.;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

#[derive(Debug, Error)]
pub enum DepictError {
    #[error(transparent)]
    Smiles(#[from] SmilesError),

    #[error("image size must be non-zero, got {0}x{1}")]
    ZeroSize(u32, u32),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render a structure encoding as a PNG of the given (width, height). `None` if the
/// encoding doesn't parse, or the size is degenerate.
pub fn render_2d(structure_encoding: &str, size: (u32, u32)) -> Option<Vec<u8>> {
    match depict_png(structure_encoding, size) {
        Ok(png) => Some(png),
        Err(e) => {
            log::debug!("No depiction for {structure_encoding:?}: {e}");
            None
        }
    }
}

/// Like [`render_2d`], but reports why rendering failed.
pub fn depict_png(structure_encoding: &str, size: (u32, u32)) -> Result<Vec<u8>, DepictError> {
    let (w, h) = size;
    if w == 0 || h == 0 {
        return Err(DepictError::ZeroSize(w, h));
    }
    let mol = smiles::parse(structure_encoding)?;
    encode_png(&draw_molecule(&mol, size))
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, DepictError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// A `data:` URI embedding PNG bytes, for inline display.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png))
}

/// Maps layout coordinates to pixels. Y is flipped; the drawing is centred.
#[derive(Debug, Clone, Copy)]
struct Transform {
    scale: f64,
    src_center: Point,
    dst_center: Point,
}

impl Transform {
    fn fit(points: &[Point], width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        let pad = PADDING_PX.min(w / 4.).min(h / 4.);
        let avail_w = (w - 2. * pad).max(1.);
        let avail_h = (h - 2. * pad).max(1.);

        let (scale, src_center) = match Bounds::of(points) {
            Some(b) => {
                let sx = if b.width() > 1e-9 { avail_w / b.width() } else { f64::INFINITY };
                let sy = if b.height() > 1e-9 { avail_h / b.height() } else { f64::INFINITY };
                (sx.min(sy).min(MAX_BOND_PX), b.center())
            }
            None => (MAX_BOND_PX, Point::default()),
        };

        Self {
            scale,
            src_center,
            dst_center: Point::new(w / 2., h / 2.),
        }
    }

    fn to_screen(&self, p: Point) -> Point {
        Point::new(
            self.dst_center.x + (p.x - self.src_center.x) * self.scale,
            self.dst_center.y - (p.y - self.src_center.y) * self.scale,
        )
    }
}

/// Text drawn at an atom position, or `None` for a plain skeletal carbon.
fn atom_label(mol: &Molecule, i: usize) -> Option<String> {
    let atom: &Atom = &mol.atoms[i];
    let plain_carbon = atom.element == Element::C
        && atom.charge == 0
        && atom.isotope.is_none()
        && mol.degree(i) > 0;
    if plain_carbon {
        return None;
    }

    let mut label = String::new();
    if let Some(iso) = atom.isotope {
        label.push_str(&iso.to_string());
    }
    label.push_str(atom.element.symbol());
    match atom.hydrogens {
        0 => {}
        1 => label.push('H'),
        n => {
            label.push('H');
            label.push_str(&n.to_string());
        }
    }
    match atom.charge {
        0 => {}
        1 => label.push('+'),
        -1 => label.push('-'),
        c if c > 0 => label.push_str(&format!("{c}+")),
        c => label.push_str(&format!("{}-", -(c as i16))),
    }
    Some(label)
}

/// Draw a molecule on a white canvas of (width, height).
pub fn draw_molecule(mol: &Molecule, (width, height): (u32, u32)) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);
    if mol.atom_count() == 0 || width == 0 || height == 0 {
        return img;
    }

    let coords = layout::compute_2d(mol);
    let tf = Transform::fit(&coords, width, height);
    let screen: Vec<Point> = coords.iter().map(|&p| tf.to_screen(p)).collect();

    let line_w = (tf.scale * 0.06).clamp(1.2, 4.);
    let gap = tf.scale * 0.18;
    let glyph_px = ((tf.scale * 0.4) / GLYPH_H as f64).round().clamp(1., 4.) as u32;
    let label_r = (GLYPH_H * glyph_px) as f64 * 0.8;

    let labels: Vec<Option<String>> = (0..mol.atom_count()).map(|i| atom_label(mol, i)).collect();
    let atom_color = |i: usize| {
        if labels[i].is_some() {
            mol.atoms[i].element.color()
        } else {
            BOND_COLOR
        }
    };

    for (bi, bond) in mol.bonds.iter().enumerate() {
        let (mut p, mut q) = (screen[bond.a], screen[bond.b]);
        let len = p.dist(q);
        if len < 1e-6 {
            continue;
        }
        let (ux, uy) = ((q.x - p.x) / len, (q.y - p.y) / len);
        if labels[bond.a].is_some() {
            p = Point::new(p.x + ux * label_r, p.y + uy * label_r);
        }
        if labels[bond.b].is_some() {
            q = Point::new(q.x - ux * label_r, q.y - uy * label_r);
        }
        if p.dist(q) < 1. {
            continue;
        }
        let (ca, cb) = (atom_color(bond.a), atom_color(bond.b));
        // Unit normal.
        let (nx, ny) = (-uy, ux);
        let offset = |pt: Point, d: f64| Point::new(pt.x + nx * d, pt.y + ny * d);

        match bond.order {
            BondOrder::Single | BondOrder::Aromatic => {
                draw_split_line(&mut img, p, q, line_w, ca, cb);
            }
            BondOrder::Double if mol.is_ring_bond(bi) => {
                draw_split_line(&mut img, p, q, line_w, ca, cb);

                // Second line inside the smallest ring holding this bond.
                let ring_center = mol
                    .rings()
                    .iter()
                    .filter(|r| r.contains_bond(bi))
                    .min_by_key(|r| r.len())
                    .map(|r| {
                        let n = r.atoms.len() as f64;
                        let (sx, sy) = r
                            .atoms
                            .iter()
                            .fold((0., 0.), |(x, y), &a| (x + screen[a].x, y + screen[a].y));
                        Point::new(sx / n, sy / n)
                    });
                let side = match ring_center {
                    Some(c) => {
                        let mid = Point::new((p.x + q.x) / 2., (p.y + q.y) / 2.);
                        if (c.x - mid.x) * nx + (c.y - mid.y) * ny >= 0. { 1. } else { -1. }
                    }
                    None => 1.,
                };
                let trim = 0.15;
                let pi = Point::new(p.x + (q.x - p.x) * trim, p.y + (q.y - p.y) * trim);
                let qi = Point::new(q.x - (q.x - p.x) * trim, q.y - (q.y - p.y) * trim);
                draw_split_line(
                    &mut img,
                    offset(pi, side * gap),
                    offset(qi, side * gap),
                    line_w,
                    ca,
                    cb,
                );
            }
            BondOrder::Double => {
                for d in [-gap / 2., gap / 2.] {
                    draw_split_line(&mut img, offset(p, d), offset(q, d), line_w, ca, cb);
                }
            }
            BondOrder::Triple | BondOrder::Quadruple => {
                for d in [-gap, 0., gap] {
                    draw_split_line(&mut img, offset(p, d), offset(q, d), line_w, ca, cb);
                }
            }
        }
    }

    // Circles for rings written in aromatic form.
    for ring in mol.rings() {
        let written_aromatic = ring
            .bonds
            .iter()
            .all(|&b| mol.bonds[b].order == BondOrder::Aromatic);
        if !written_aromatic || ring.is_empty() {
            continue;
        }
        let n = ring.len() as f64;
        let (sx, sy) = ring
            .atoms
            .iter()
            .fold((0., 0.), |(x, y), &a| (x + screen[a].x, y + screen[a].y));
        let c = Point::new(sx / n, sy / n);
        let r = ring.atoms.iter().map(|&a| screen[a].dist(c)).sum::<f64>() / n * 0.6;
        draw_circle(&mut img, c, r, line_w, BOND_COLOR);
    }

    for (i, label) in labels.iter().enumerate() {
        if let Some(text) = label {
            draw_text(&mut img, screen[i], text, glyph_px, mol.atoms[i].element.color());
        }
    }

    img
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, color: [u8; 3], alpha: f64) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for (c, &target) in px.0.iter_mut().zip(&color) {
        *c = (*c as f64 * (1. - alpha) + target as f64 * alpha).round() as u8;
    }
}

fn dist_to_segment(c: Point, p: Point, q: Point) -> f64 {
    let (dx, dy) = (q.x - p.x, q.y - p.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-12 {
        return c.dist(p);
    }
    let t = (((c.x - p.x) * dx + (c.y - p.y) * dy) / len_sq).clamp(0., 1.);
    c.dist(Point::new(p.x + t * dx, p.y + t * dy))
}

/// Anti-aliased thick line; coverage falls off over the last pixel at the edge.
fn draw_line(img: &mut RgbaImage, p: Point, q: Point, width: f64, color: [u8; 3]) {
    let half = width / 2.;
    let x0 = (p.x.min(q.x) - half - 1.).floor() as i64;
    let x1 = (p.x.max(q.x) + half + 1.).ceil() as i64;
    let y0 = (p.y.min(q.y) - half - 1.).floor() as i64;
    let y1 = (p.y.max(q.y) + half + 1.).ceil() as i64;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let c = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let coverage = (half + 0.5 - dist_to_segment(c, p, q)).clamp(0., 1.);
            if coverage > 0. {
                blend(img, x, y, color, coverage);
            }
        }
    }
}

/// Each half of the bond takes the colour of the atom at its end.
fn draw_split_line(
    img: &mut RgbaImage,
    p: Point,
    q: Point,
    width: f64,
    color_p: [u8; 3],
    color_q: [u8; 3],
) {
    if color_p == color_q {
        draw_line(img, p, q, width, color_p);
        return;
    }
    let mid = Point::new((p.x + q.x) / 2., (p.y + q.y) / 2.);
    draw_line(img, p, mid, width, color_p);
    draw_line(img, mid, q, width, color_q);
}

fn draw_circle(img: &mut RgbaImage, center: Point, radius: f64, width: f64, color: [u8; 3]) {
    let half = width / 2.;
    let reach = radius + half + 1.;
    let x0 = (center.x - reach).floor() as i64;
    let x1 = (center.x + reach).ceil() as i64;
    let y0 = (center.y - reach).floor() as i64;
    let y1 = (center.y + reach).ceil() as i64;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let c = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let d = (c.dist(center) - radius).abs();
            let coverage = (half + 0.5 - d).clamp(0., 1.);
            if coverage > 0. {
                blend(img, x, y, color, coverage);
            }
        }
    }
}

/// Draw `text` centred on `at`, each font pixel scaled to a `px`-sized block. The area
/// behind the text is cleared first so it reads over any nearby lines.
fn draw_text(img: &mut RgbaImage, at: Point, text: &str, px: u32, color: [u8; 3]) {
    let advance = (GLYPH_W + 1) * px;
    let n = text.chars().count() as u32;
    let w = (n * advance).saturating_sub(px);
    let h = GLYPH_H * px;
    let x0 = (at.x - w as f64 / 2.).round() as i64;
    let y0 = (at.y - h as f64 / 2.).round() as i64;

    for y in (y0 - 1)..(y0 + h as i64 + 1) {
        for x in (x0 - 1)..(x0 + w as i64 + 1) {
            blend(img, x, y, [255, 255, 255], 1.);
        }
    }

    for (ci, ch) in text.chars().enumerate() {
        let gx = x0 + (ci as u32 * advance) as i64;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..px {
                    for dx in 0..px {
                        blend(
                            img,
                            gx + (col * px + dx) as i64,
                            y0 + (row as u32 * px + dy) as i64,
                            color,
                            1.,
                        );
                    }
                }
            }
        }
    }
}

/// 5x7 bitmap font; bit 4 is the leftmost column.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'g' => [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn ihdr_size(png: &[u8]) -> (u32, u32) {
        let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (w, h)
    }

    #[test]
    fn morphine_renders_to_png_at_default_size() {
        let png = render_2d(
            "CN1CCC23C4C1CC5=C2C(=C(C=C5)O)OC3C(C=C4)O",
            DEFAULT_IMAGE_SIZE,
        )
        .unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(ihdr_size(&png), (400, 300));
    }

    #[test]
    fn custom_size_is_respected() {
        let png = render_2d("CCO", (123, 77)).unwrap();
        assert_eq!(ihdr_size(&png), (123, 77));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (123, 77));
    }

    #[test]
    fn bad_input_gives_none() {
        assert!(render_2d("", DEFAULT_IMAGE_SIZE).is_none());
        assert!(render_2d("C1CC", DEFAULT_IMAGE_SIZE).is_none());
        assert!(render_2d("CCO", (0, 300)).is_none());
        assert!(matches!(
            depict_png("CCO", (10, 0)),
            Err(DepictError::ZeroSize(10, 0))
        ));
    }

    #[test]
    fn oxygen_is_drawn_red() {
        let mol = smiles::parse("CCO").unwrap();
        let img = draw_molecule(&mol, (200, 150));
        let reddish = img
            .pixels()
            .any(|p| p.0[0] > 180 && p.0[1] < 90 && p.0[2] < 90);
        assert!(reddish);
    }

    #[test]
    fn carbon_skeleton_has_ink_but_no_colour() {
        let mol = smiles::parse("c1ccccc1").unwrap();
        let img = draw_molecule(&mol, (200, 150));
        assert!(img.pixels().any(|p| p.0[0] < 100));
        assert!(img.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn labels() {
        let label = |s: &str, i: usize| atom_label(&smiles::parse(s).unwrap(), i);
        assert_eq!(label("CCO", 0), None);
        assert_eq!(label("CCO", 2).as_deref(), Some("OH"));
        assert_eq!(label("C", 0).as_deref(), Some("CH4"));
        assert_eq!(label("[NH4+]", 0).as_deref(), Some("NH4+"));
        assert_eq!(label("[O-2]", 0).as_deref(), Some("O2-"));
        assert_eq!(label("C[13CH3]", 1).as_deref(), Some("13CH3"));
    }

    #[test]
    fn data_uri() {
        assert_eq!(to_data_uri(&[0x89, b'P', b'N']), "data:image/png;base64,iVBO");
    }
}
