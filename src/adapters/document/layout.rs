//! Line flow for the fixed template: wraps blocks to the text width and
//! spills onto new A4 pages when the current one is full.

use super::helvetica;
use super::template::{Align, Block};
use crate::ports::RenderError;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
const MARGIN_X: f32 = 56.0;
const MARGIN_TOP: f32 = 56.0;
const MARGIN_BOTTOM: f32 = 56.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

pub const MAX_PAGES: usize = 10_000;

/// A wrapped line with its final position (baseline origin, in points).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    /// WinAnsi-encoded text.
    pub text: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Place `blocks` onto pages.
///
/// # Errors
///
/// `RenderError::PageLimitExceeded` when more than `MAX_PAGES` are needed.
pub fn paginate(blocks: &[Block]) -> Result<Vec<Page>, RenderError> {
    let mut pages = vec![Page::default()];
    let mut cursor = PAGE_HEIGHT - MARGIN_TOP;

    for block in blocks {
        let encoded = helvetica::encode(&block.text);
        for line in wrap(&encoded, block.font_size, TEXT_WIDTH) {
            if cursor - block.leading < MARGIN_BOTTOM {
                if pages.len() == MAX_PAGES {
                    return Err(RenderError::PageLimitExceeded {
                        pages: MAX_PAGES + 1,
                        max: MAX_PAGES,
                    });
                }
                pages.push(Page::default());
                cursor = PAGE_HEIGHT - MARGIN_TOP;
            }
            cursor -= block.leading;

            let width = helvetica::text_width(&line, block.font_size);
            let x = match block.align {
                Align::Left => MARGIN_X,
                Align::Center => MARGIN_X + (TEXT_WIDTH - width).max(0.0) / 2.0,
                Align::Right => MARGIN_X + (TEXT_WIDTH - width).max(0.0),
            };

            if let Some(page) = pages.last_mut() {
                page.lines.push(PlacedLine {
                    x,
                    y: cursor,
                    font_size: block.font_size,
                    text: line,
                });
            }
        }
        cursor -= block.space_after;
    }

    Ok(pages)
}

/// Greedy word wrap of encoded text. Words wider than a whole line are
/// broken between characters. Always yields at least one line.
fn wrap(text: &[u8], font_size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in text.split(|&b| b == b' ').filter(|w| !w.is_empty()) {
        let candidate_width = if current.is_empty() {
            helvetica::text_width(word, font_size)
        } else {
            helvetica::text_width(&current, font_size)
                + helvetica::text_width(b" ", font_size)
                + helvetica::text_width(word, font_size)
        };

        if candidate_width <= max_width {
            if !current.is_empty() {
                current.push(b' ');
            }
            current.extend_from_slice(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if helvetica::text_width(word, font_size) <= max_width {
            current.extend_from_slice(word);
            continue;
        }

        for &byte in word {
            let grown = helvetica::text_width(&current, font_size)
                + helvetica::text_width(&[byte], font_size);
            if grown > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push(byte);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, align: Align) -> Block {
        Block {
            text: text.to_string(),
            align,
            font_size: 12.0,
            leading: 16.0,
            space_after: 0.0,
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap(b"1. short", 12.0, TEXT_WIDTH), vec![b"1. short".to_vec()]);
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap(b"", 12.0, TEXT_WIDTH), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn long_text_wraps_within_width() {
        let text = "palavra ".repeat(60);
        let lines = wrap(text.as_bytes(), 12.0, TEXT_WIDTH);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(helvetica::text_width(line, 12.0) <= TEXT_WIDTH);
        }
        let rejoined: Vec<u8> = lines.join(&b' ');
        assert_eq!(rejoined, text.trim_end().as_bytes());
    }

    #[test]
    fn overlong_word_is_split() {
        let word = "W".repeat(200);
        let lines = wrap(word.as_bytes(), 12.0, TEXT_WIDTH);

        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word.as_bytes());
    }

    #[test]
    fn alignment_controls_x_position() {
        let pages = paginate(&[
            block("left", Align::Left),
            block("center", Align::Center),
            block("right", Align::Right),
        ])
        .unwrap();
        let lines = &pages[0].lines;

        assert_eq!(lines[0].x, MARGIN_X);
        assert!(lines[1].x > MARGIN_X);
        assert!(lines[2].x > lines[1].x);
        let right_edge = lines[2].x + helvetica::text_width(b"right", 12.0);
        assert!((right_edge - (PAGE_WIDTH - MARGIN_X)).abs() < 0.01);
    }

    #[test]
    fn lines_descend_down_the_page() {
        let pages = paginate(&[block("a", Align::Left), block("b", Align::Left)]).unwrap();
        assert!(pages[0].lines[0].y > pages[0].lines[1].y);
    }

    #[test]
    fn overflow_starts_a_new_page() {
        let blocks: Vec<Block> = (0..100).map(|i| block(&format!("{}. q", i), Align::Left)).collect();
        let pages = paginate(&blocks).unwrap();

        assert!(pages.len() >= 2);
        let total: usize = pages.iter().map(|p| p.lines.len()).sum();
        assert_eq!(total, 100);
        for page in &pages {
            for line in &page.lines {
                assert!(line.y >= MARGIN_BOTTOM);
            }
        }
    }
}
