pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// size of the packed, one-bit-per-pixel export
pub const SCREEN_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT / 8;

/// 64x32 monochrome frame. One byte per pixel for simplicity; only the low
/// bit is ever set.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
    }

    /// is the pixel at (x, y) lit; out of range pixels are never lit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.pixels[x + y * SCREEN_WIDTH] == 1
    }

    /// XOR an 8-wide sprite onto the frame with its top-left corner at (x, y).
    /// The corner wraps round the screen, but the sprite itself is clipped at
    /// the right and bottom edges. Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let x = x % SCREEN_WIDTH;
        let y = y % SCREEN_HEIGHT;
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            let py = y + dy;
            if py >= SCREEN_HEIGHT {
                break;
            }
            for dx in 0..8 {
                let px = x + dx;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if row & (0x80 >> dx) != 0 {
                    let pixel = &mut self.pixels[px + py * SCREEN_WIDTH];
                    collision |= *pixel == 1;
                    *pixel ^= 1;
                }
            }
        }
        collision
    }

    /// pack into one bit per pixel, msb first, rows top to bottom; this is
    /// what a Display is handed to draw
    pub fn packed(&self) -> [u8; SCREEN_BUFFER_SIZE] {
        let mut data = [0u8; SCREEN_BUFFER_SIZE];
        for (i, pixel) in self.pixels.iter().enumerate() {
            data[i / 8] |= (pixel & 1) << (7 - i % 8);
        }
        data
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.chunks(SCREEN_WIDTH) {
            let line: String = row.iter().map(|&p| if p == 1 { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
