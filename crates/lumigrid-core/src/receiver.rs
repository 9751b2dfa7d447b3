//! Controller-side frame buffer.
//!
//! Applies decoded messages the way the controller does: pixel updates land
//! in a staged buffer and only become visible on `Show`. `Clear` blanks the
//! staged buffer and shows it immediately. Writes past the strip are
//! ignored.

use crate::color::Color;
use crate::protocol::Message;

/// Effect of one applied message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Number of staged pixels written.
    Staged(usize),
    Shown,
    Cleared,
    /// Nothing in range to write.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    staged: Vec<Color>,
    displayed: Vec<Color>,
    shows: u64,
}

impl FrameBuffer {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            staged: vec![Color::BLACK; pixel_count],
            displayed: vec![Color::BLACK; pixel_count],
            shows: 0,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.staged.len()
    }

    pub fn staged(&self) -> &[Color] {
        &self.staged
    }

    pub fn displayed(&self) -> &[Color] {
        &self.displayed
    }

    /// Number of times the staged buffer was materialized.
    pub fn shows(&self) -> u64 {
        self.shows
    }

    pub fn apply(&mut self, message: &Message) -> Applied {
        match message {
            Message::SetPixel { index, color } => match self.staged.get_mut(*index as usize) {
                Some(pixel) => {
                    *pixel = *color;
                    Applied::Staged(1)
                }
                None => Applied::Ignored,
            },
            Message::SetRange { start, colors } => {
                let mut written = 0;
                for (pixel, color) in self.staged.iter_mut().skip(*start as usize).zip(colors) {
                    *pixel = *color;
                    written += 1;
                }
                if written == 0 {
                    Applied::Ignored
                } else {
                    Applied::Staged(written)
                }
            }
            Message::SetAll { color } => {
                self.staged.fill(*color);
                Applied::Staged(self.staged.len())
            }
            Message::Show => {
                self.show();
                Applied::Shown
            }
            Message::Clear => {
                self.staged.fill(Color::BLACK);
                self.show();
                Applied::Cleared
            }
        }
    }

    fn show(&mut self) {
        self.displayed.copy_from_slice(&self.staged);
        self.shows += 1;
    }
}
