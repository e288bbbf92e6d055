//! Terminal presenter: flushes a pixel frame to a real terminal.
//!
//! Each character cell shows two stacked pixels as an upper-half block with
//! the top pixel as foreground and the bottom pixel as background. Only runs of
//! cells that changed since the previous frame are redrawn.

use std::io::{self, Write};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{QueueableCommand, cursor, terminal};

use crate::renderer::{Frame, Rgb};

const HALF_BLOCK: char = '▀';

/// One terminal cell: two vertically stacked pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellPair {
    pub top: Rgb,
    pub bottom: Rgb,
}

/// Fold a pixel frame into rows of half-block cells. An odd last pixel row
/// pairs with black.
pub fn fold_cells(frame: &Frame) -> Vec<CellPair> {
    let w = frame.width();
    let rows = frame.height().div_ceil(2);
    let mut cells = Vec::with_capacity(w * rows);
    for row in 0..rows {
        for x in 0..w {
            cells.push(CellPair {
                top: frame.get(x, row * 2).unwrap_or(Rgb::BLACK),
                bottom: frame.get(x, row * 2 + 1).unwrap_or(Rgb::BLACK),
            });
        }
    }
    cells
}

/// Terminal size in pixels (two pixel rows per cell, last row kept for status)
pub fn pixel_size(cols: u16, rows: u16) -> (usize, usize) {
    (cols as usize, rows.saturating_sub(1) as usize * 2)
}

pub struct TerminalPresenter {
    stdout: io::Stdout,
    last: Option<Vec<CellPair>>,
    last_width: usize,
    last_status: String,
    release_events: bool,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            last_width: 0,
            last_status: String::new(),
            release_events: false,
        }
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;

        self.release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            self.stdout.queue(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        self.stdout.flush()?;
        log::debug!("Terminal entered, key release events: {}", self.release_events);
        Ok(())
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if self.release_events {
            self.stdout.queue(PopKeyboardEnhancementFlags)?;
        }
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Whether the terminal reports key releases
    pub fn release_events(&self) -> bool {
        self.release_events
    }

    /// Force the next present to be a full redraw
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw `frame` and the status line below it
    pub fn present(&mut self, frame: &Frame, status: &str) -> io::Result<()> {
        let cells = fold_cells(frame);
        let width = frame.width();

        let prev = match self.last.take() {
            Some(prev) if self.last_width == width && prev.len() == cells.len() => prev,
            _ => {
                self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
                self.last_status.clear();
                Vec::new()
            }
        };

        let mut current: Option<CellPair> = None;
        for (x, y, len) in changed_runs(&prev, &cells, width) {
            self.stdout.queue(cursor::MoveTo(x as u16, y as u16))?;
            for cell in &cells[y * width + x..y * width + x + len] {
                if current != Some(*cell) {
                    self.stdout.queue(SetForegroundColor(to_color(cell.top)))?;
                    self.stdout.queue(SetBackgroundColor(to_color(cell.bottom)))?;
                    current = Some(*cell);
                }
                self.stdout.queue(Print(HALF_BLOCK))?;
            }
        }
        self.stdout.queue(ResetColor)?;

        if status != self.last_status {
            let status_row = cells.len().checked_div(width).unwrap_or(0);
            self.stdout.queue(cursor::MoveTo(0, status_row as u16))?;
            self.stdout.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
            self.stdout.queue(SetAttribute(Attribute::Bold))?;
            self.stdout.queue(Print(status))?;
            self.stdout.queue(SetAttribute(Attribute::Reset))?;
            self.last_status = status.to_string();
        }
        self.stdout.flush()?;

        self.last = Some(cells);
        self.last_width = width;
        Ok(())
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Runs `(x, y, len)` of cells that differ between two frames of the same
/// width. A size mismatch marks every row dirty.
pub fn changed_runs(prev: &[CellPair], next: &[CellPair], width: usize) -> Vec<(usize, usize, usize)> {
    let mut runs = Vec::new();
    if width == 0 {
        return runs;
    }
    let rows = next.len() / width;

    if prev.len() != next.len() {
        runs.extend((0..rows).map(|y| (0, y, width)));
        return runs;
    }

    for y in 0..rows {
        let row = y * width;
        let mut x = 0;
        while x < width {
            if prev[row + x] == next[row + x] {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && prev[row + x] != next[row + x] {
                x += 1;
            }
            runs.push((start, y, x - start));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_cells_pairs_rows() {
        let mut frame = Frame::new(2, 3);
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        frame.put(0, 0, red);
        frame.put(0, 1, blue);
        frame.put(1, 2, red);

        let cells = fold_cells(&frame);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], CellPair { top: red, bottom: blue });
        assert_eq!(cells[3], CellPair { top: red, bottom: Rgb::BLACK });
    }

    #[test]
    fn test_changed_runs_coalesce_adjacent_cells() {
        let prev = vec![CellPair::default(); 5];
        let mut next = prev.clone();
        for cell in &mut next[1..=3] {
            cell.top = Rgb::WHITE;
        }
        assert_eq!(changed_runs(&prev, &next, 5), vec![(1, 0, 3)]);
        assert!(changed_runs(&next, &next, 5).is_empty());
    }

    #[test]
    fn test_changed_runs_full_redraw_on_resize() {
        let next = vec![CellPair::default(); 6];
        assert_eq!(changed_runs(&[], &next, 3), vec![(0, 0, 3), (0, 1, 3)]);
    }

    #[test]
    fn test_pixel_size_reserves_status_row() {
        assert_eq!(pixel_size(80, 24), (80, 46));
        assert_eq!(pixel_size(10, 0), (10, 0));
    }
}
