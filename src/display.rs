use crate::machine::RunState;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;
const CHIP8_DISPLAY_PIXELS: usize = CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT;

/// The machine's 64x32 monochrome screen, row-major (index = y * 64 + x).
/// Only the clear-screen and draw-sprite instructions change it.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [bool; CHIP8_DISPLAY_PIXELS],
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [false; CHIP8_DISPLAY_PIXELS],
        }
    }

    pub fn clear(&mut self) {
        self.fill(false);
    }

    pub(crate) fn fill(&mut self, lit: bool) {
        self.pixels = [lit; CHIP8_DISPLAY_PIXELS];
    }

    /// every pixel, row-major
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * CHIP8_DISPLAY_WIDTH + x]
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// XOR a sprite onto the screen with its top-left corner at (x, y).
    ///
    /// The origin wraps to the screen but the sprite itself is clipped: a
    /// row stops at the right edge and the draw stops at the bottom edge.
    /// Each sprite byte is one row, most significant bit leftmost. Returns
    /// true if any lit pixel was hit by a set sprite bit.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let x0 = x as usize % CHIP8_DISPLAY_WIDTH;
        let y0 = y as usize % CHIP8_DISPLAY_HEIGHT;
        let mut collision = false;

        for (dy, row) in rows.iter().enumerate() {
            let py = y0 + dy;
            if py >= CHIP8_DISPLAY_HEIGHT {
                break;
            }
            for dx in 0..8 {
                let px = x0 + dx;
                if px >= CHIP8_DISPLAY_WIDTH {
                    break;
                }
                let bit = (row >> (7 - dx)) & 1 == 1;
                let pixel = &mut self.pixels[py * CHIP8_DISPLAY_WIDTH + px];
                if bit && *pixel {
                    collision = true;
                }
                *pixel ^= bit;
            }
        }
        collision
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.chunks(CHIP8_DISPLAY_WIDTH) {
            let line: String = row.iter().map(|&p| if p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Display is used by the host to put the frame buffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// present the frame; `state` lets the display show paused/halted
    fn draw(&mut self, frame: &FrameBuffer, state: RunState) -> Result<(), io::Error>;
}

// store useful metadata about the terminal canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coords of every pixel that is (or isn't) lit
    fn points_from_frame<'a>(
        &self,
        frame: &'a FrameBuffer,
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        frame
            .pixels()
            .iter()
            .enumerate()
            .filter(move |&(_, &p)| p == lit)
            .map(move |(i, _)| ((i % w) as f64, -1.0 * (i / w) as f64))
    }
}

fn title_for(state: RunState) -> &'static str {
    match state {
        RunState::Running => "CHIP-8",
        RunState::Paused => "CHIP-8 [PAUSED]",
        RunState::Halted => "CHIP-8 [HALTED]",
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer, state: RunState) -> Result<(), io::Error> {
        let lit: Vec<(f64, f64)> = self.resolution.points_from_frame(frame, true).collect();
        let unlit: Vec<(f64, f64)> = self.resolution.points_from_frame(frame, false).collect();
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );

        // 1:1 between chip-8 pixels and terminal cells
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title_for(state))
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &unlit,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for driving the host loop without a terminal
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub last_frame: Option<FrameBuffer>,
    pub last_state: Option<RunState>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &FrameBuffer, state: RunState) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        self.last_state = Some(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_points_from_frame() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(3, 2, &[0x80]);
        let lit: Vec<_> = r.points_from_frame(&fb, true).collect();
        assert_eq!(lit, vec![(3.0, -2.0)]);
        assert_eq!(r.points_from_frame(&fb, false).count(), 2047);
    }

    // FrameBuffer tests
    #[test]
    fn test_new_is_blank() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.pixels().len(), 2048);
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.fill(true);
        assert_eq!(fb.lit_count(), 2048);
        fb.clear();
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn test_draw_msb_is_leftmost() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(0, 0, &[0b1010_0001]));
        assert!(fb.get(0, 0));
        assert!(!fb.get(1, 0));
        assert!(fb.get(2, 0));
        assert!(fb.get(7, 0));
        assert_eq!(fb.lit_count(), 3);
        // row-major indexing
        assert!(fb.pixels()[7]);
    }

    #[test]
    fn test_draw_twice_erases_and_collides() {
        let mut fb = FrameBuffer::new();
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];
        assert!(!fb.draw_sprite(10, 5, &sprite));
        assert_eq!(fb.lit_count(), 14);
        assert!(fb.draw_sprite(10, 5, &sprite));
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn test_zero_bits_never_collide() {
        let mut fb = FrameBuffer::new();
        fb.fill(true);
        assert!(!fb.draw_sprite(0, 0, &[0x00, 0x00]));
        assert_eq!(fb.lit_count(), 2048);
    }

    #[test]
    fn test_origin_wraps() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(64 + 4, 32 + 1, &[0x80]);
        assert!(fb.get(4, 1));
    }

    #[test]
    fn test_clips_right_edge() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(60, 0, &[0xff]);
        assert_eq!(fb.lit_count(), 4);
        assert!(fb.get(63, 0));
        assert!(!fb.get(0, 0));
    }

    #[test]
    fn test_clips_bottom_edge() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80]);
        assert_eq!(fb.lit_count(), 2);
        assert!(fb.get(0, 31));
        assert!(!fb.get(0, 0));
    }

    #[test]
    fn test_debug_render() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xc0]);
        let s = format!("{:?}", fb);
        assert!(s.starts_with("##......"));
        assert_eq!(s.lines().count(), 32);
    }

    // DummyDisplay tests
    #[test]
    fn test_dummy_records_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&FrameBuffer::new(), RunState::Paused)?;
        assert_eq!(d.frames_drawn, 1);
        assert_eq!(d.last_state, Some(RunState::Paused));
        Ok(())
    }

    #[test]
    fn test_titles() {
        assert_eq!(title_for(RunState::Running), "CHIP-8");
        assert_eq!(title_for(RunState::Halted), "CHIP-8 [HALTED]");
    }
}
