//! Embedded 5x7 pixel glyphs for grid labels. A-Z and 0-9 only; anything
//! else advances the cursor without drawing.

use image::{Rgba, RgbaImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;

/// Seven rows per glyph, low five bits used, bit 4 is the leftmost column.
type Glyph = [u8; 7];

const DIGITS: [Glyph; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

const LETTERS: [Glyph; 26] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
];

fn glyph_for(character: char) -> Option<&'static Glyph> {
    let upper = character.to_ascii_uppercase();
    match upper {
        'A'..='Z' => Some(&LETTERS[(upper as u8 - b'A') as usize]),
        '0'..='9' => Some(&DIGITS[(upper as u8 - b'0') as usize]),
        _ => None,
    }
}

/// Horizontal advance of one glyph cell at the given scale.
pub fn advance(scale: u32) -> u32 {
    (GLYPH_WIDTH + 1) * scale
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * advance(scale)
}

/// Draw text with its top-left corner at (x, y); clips at image borders.
pub fn draw_text(
    image: &mut RgbaImage,
    x: u32,
    y: u32,
    scale: u32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = scale.max(1);
    let (image_width, image_height) = image.dimensions();
    let mut cursor_x = x;
    for character in text.chars() {
        if let Some(glyph) = glyph_for(character) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = cursor_x + col * scale + dx;
                            let py = y + row as u32 * scale + dy;
                            if px < image_width && py < image_height {
                                image.put_pixel(px, py, color);
                            }
                        }
                    }
                }
            }
        }
        cursor_x += advance(scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_known_glyph_pixels() {
        let mut canvas = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let ink = Rgba([255, 255, 255, 255]);
        draw_text(&mut canvas, 0, 0, 1, ink, "T");
        // Top row of T is solid, stem is centered.
        for col in 0..5 {
            assert_eq!(*canvas.get_pixel(col, 0), ink);
        }
        assert_eq!(*canvas.get_pixel(2, 6), ink);
        assert_ne!(*canvas.get_pixel(0, 6), ink);
    }

    #[test]
    fn unknown_characters_advance_without_drawing() {
        let mut canvas = RgbaImage::from_pixel(32, 16, Rgba([0, 0, 0, 255]));
        let ink = Rgba([255, 255, 255, 255]);
        draw_text(&mut canvas, 0, 0, 1, ink, "? 1");
        // Glyph cells for '?' and ' ' stay untouched.
        for x in 0..12 {
            for y in 0..7 {
                assert_ne!(*canvas.get_pixel(x, y), ink);
            }
        }
        // '1' lands at the third glyph cell.
        assert_eq!(*canvas.get_pixel(12 + 2, 1), ink);
    }

    #[test]
    fn clipping_does_not_panic() {
        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        draw_text(
            &mut canvas,
            6,
            6,
            2,
            Rgba([255, 255, 255, 255]),
            "Z26",
        );
    }
}
