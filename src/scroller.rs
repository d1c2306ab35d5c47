/*
 *  scroller.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Character-window label scroller
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use arrayvec::ArrayString;
use log::debug;

use crate::constants::{LABEL_PADDING, LABEL_WINDOW_BYTES, LABEL_WINDOW_CHARS};

/// The visible slice of a label, kept on the stack.
pub type LabelWindow = ArrayString<LABEL_WINDOW_BYTES>;

/// Build the scroll source, `value` to one decimal followed by `unit`, padded
/// both sides so the text scrolls in from and out to blank.
pub fn format_label(value: f64, unit: &str) -> String {
    let pad = " ".repeat(LABEL_PADDING);
    format!("{pad}{value:.1} {unit}{pad}")
}

/// Characters `[start, start + width)` of `text`, clipped to its end.
pub fn window(text: &str, start: usize, width: usize) -> LabelWindow {
    let mut out = LabelWindow::new();
    for ch in text.chars().skip(start).take(width) {
        if out.try_push(ch).is_err() {
            break;
        }
    }
    out
}

/// Cursor into the label. Advances one character per frame and wraps once it
/// has run a full window past the end of the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollCursor {
    position: usize,
}

impl ScrollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Step forward for a label of `text_len` characters.
    pub fn advance(&mut self, text_len: usize) {
        self.position += 1;
        if self.position >= text_len + LABEL_WINDOW_CHARS {
            self.position = 0;
        }
    }
}

/// Produces one visible window per frame from a value and its unit label.
#[derive(Debug, Default)]
pub struct LabelScroller {
    cursor: ScrollCursor,
}

impl LabelScroller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Back to the start of the label, used on a page change.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Window for this frame, then advance the cursor.
    pub fn next_window(&mut self, value: f64, unit: &str) -> LabelWindow {
        let message = format_label(value, unit);
        let visible = window(&message, self.cursor.position(), LABEL_WINDOW_CHARS);
        debug!("label [{}] '{}'", self.cursor.position(), visible);
        self.cursor.advance(message.chars().count());
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_label_padding() {
        let label = format_label(21.46, "hPa");
        assert_eq!(label, "          21.5 hPa          ");
        assert_eq!(label.len(), 10 + "21.5 hPa".len() + 10);
    }

    #[test]
    fn test_window_clips_at_end() {
        assert_eq!(window("abcdef", 0, 4).as_str(), "abcd");
        assert_eq!(window("abcdef", 4, 4).as_str(), "ef");
        assert_eq!(window("abcdef", 6, 4).as_str(), "");
        assert_eq!(window("abcdef", 60, 4).as_str(), "");
    }

    #[test]
    fn test_window_is_char_based() {
        assert_eq!(window("25.0 °C ok", 5, 2).as_str(), "°C");
    }

    #[test]
    fn test_cursor_wraps_after_len_plus_window() {
        let len = 28;
        let mut cursor = ScrollCursor::new();
        for step in 1..(len + LABEL_WINDOW_CHARS) {
            cursor.advance(len);
            assert_eq!(cursor.position(), step);
        }
        cursor.advance(len);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_cursor_wraps_when_label_shrinks() {
        let mut cursor = ScrollCursor::new();
        for _ in 0..40 {
            cursor.advance(100);
        }
        assert_eq!(cursor.position(), 40);
        cursor.advance(10);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_scroller_slides_one_char_per_frame() {
        let mut scroller = LabelScroller::new();
        let first = scroller.next_window(1013.24, "hPa");
        assert_eq!(first.as_str(), "          1013.2 hPa");
        let second = scroller.next_window(1013.24, "hPa");
        assert_eq!(second.as_str(), "         1013.2 hPa ");
        assert_eq!(scroller.position(), 2);

        scroller.reset();
        assert_eq!(scroller.position(), 0);
    }

    #[test]
    fn test_scroller_full_cycle_returns_to_start() {
        let mut scroller = LabelScroller::new();
        let len = format_label(50.0, "%: humidity acceptable").chars().count();
        for _ in 0..(len + LABEL_WINDOW_CHARS) {
            scroller.next_window(50.0, "%: humidity acceptable");
        }
        assert_eq!(scroller.position(), 0);
    }
}
