use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw packed one-bit-per-pixel data, msb first, rows top to bottom
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&self) -> usize;
}

// store useful metadata about the frame: width, height, bitplanes
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coords of every pixel whose bit equals `bitplane`
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    scale: u16,
}

impl MonoTermDisplay {
    /// `scale` terminal cells per pixel in each direction, as far as the
    /// terminal has room
    pub fn new(x: usize, y: usize, scale: u16) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y, 1),
            scale: scale.max(1),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "MonoTermDisplay expects {} bytes, got {}",
                    self.resolution.byte_count(),
                    data.len()
                ),
            ));
        }

        let resolution = &self.resolution;
        let scale = self.scale;
        self.terminal.draw(|f| {
            let screen = f.size();
            let size = Rect::new(
                0,
                0,
                (resolution.0 as u16)
                    .saturating_mul(scale)
                    .saturating_add(2)
                    .min(screen.width),
                (resolution.1 as u16)
                    .saturating_mul(scale)
                    .saturating_add(2)
                    .min(screen.height),
            );

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // expand each bitplane into x, y float coords, suitable for
                    // rendering with TUI. this just prints blocky points for now
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 0).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    fn get_display_size_bytes(&self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for testing non-display routines; keeps every frame it's given
pub struct DummyDisplay {
    pub frames: Vec<Vec<u8>>,
    size_bytes: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay::with_size(crate::framebuffer::SCREEN_BUFFER_SIZE)
    }

    /// a display expecting frames of some other size
    pub fn with_size(size_bytes: usize) -> Self {
        DummyDisplay {
            frames: Vec::new(),
            size_bytes,
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        DummyDisplay::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames.push(data.to_vec());
        Ok(())
    }

    fn get_display_size_bytes(&self) -> usize {
        self.size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_byte_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.byte_count(), 256)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplane_split() {
        let r = Resolution(64, 32, 1);
        let mut data = [0u8; 256];
        data[0] = 0b1000_0001;
        data[255] = 0b0000_0001;
        let mut lit: Vec<(f64, f64)> = r.bitplane_from_data(&data, 1).collect();
        lit.reverse();
        assert_eq!(lit, vec![(0.0, 0.0), (7.0, 0.0), (63.0, -31.0)]);
        assert_eq!(r.bitplane_from_data(&data, 0).count(), 2048 - 3);
    }

    #[test]
    fn test_dummy_display_records_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&[0; 256])?;
        assert_eq!(d.frames.len(), 1);
        assert_eq!(d.get_display_size_bytes(), 256);
        Ok(())
    }
}
