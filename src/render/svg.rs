//! SVG Clock Rendering
//!
//! Draws the clock face into an in-memory buffer. The canvas writes straight
//! into a `String`, so a render never touches process output.

use std::fmt::Write;

use super::clock::{escape_text, TimeFormat};
use super::{PayloadSource, RenderError, RenderResult};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// XML prologue for standalone SVG documents
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

/// Minimal SVG writer over a string buffer
pub struct SvgCanvas {
    buf: String,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(256),
        }
    }

    /// Open the `<svg>` element
    pub fn start(&mut self, width: u32, height: u32) -> RenderResult<&mut Self> {
        writeln!(
            self.buf,
            "<svg width=\"{}\" height=\"{}\"\n     xmlns=\"{}\"\n     xmlns:xlink=\"{}\">",
            width, height, SVG_NAMESPACE, XLINK_NAMESPACE
        )?;
        Ok(self)
    }

    pub fn circle(&mut self, cx: u32, cy: u32, r: u32) -> RenderResult<&mut Self> {
        writeln!(self.buf, "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" />", cx, cy, r)?;
        Ok(self)
    }

    /// Write a text node; `content` is escaped
    pub fn text(&mut self, x: u32, y: u32, content: &str, style: &str) -> RenderResult<&mut Self> {
        writeln!(
            self.buf,
            "<text x=\"{}\" y=\"{}\" style=\"{}\">{}</text>",
            x,
            y,
            escape_text(style),
            escape_text(content)
        )?;
        Ok(self)
    }

    /// Close the `<svg>` element and return the markup
    pub fn end(mut self) -> RenderResult<String> {
        writeln!(self.buf, "</svg>")?;
        Ok(self.buf)
    }
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Circle with the current time centered on it
#[derive(Debug, Clone)]
pub struct SvgClock {
    width: u32,
    height: u32,
    format: TimeFormat,
}

impl SvgClock {
    pub const TEXT_STYLE: &'static str = "text-anchor:middle; font-size: 16px; fill: white";

    pub fn new(width: u32, height: u32, format: TimeFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Render the clock face with a fixed label
    pub fn render_with(&self, label: &str) -> RenderResult<String> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }

        let (cx, cy) = (self.width / 2, self.height / 2);
        let radius = self.width.min(self.height) / 2;

        let mut canvas = SvgCanvas::new();
        canvas
            .start(self.width, self.height)?
            .circle(cx, cy, radius)?
            .text(cx, cy, label, Self::TEXT_STYLE)?;
        canvas.end()
    }

    /// Render as a standalone document with the XML prologue
    pub fn render_document(&self) -> RenderResult<String> {
        let body = self.render()?;
        Ok(format!("{}{}", XML_DECLARATION, body))
    }
}

impl Default for SvgClock {
    fn default() -> Self {
        Self::new(400, 400, TimeFormat::default())
    }
}

impl PayloadSource for SvgClock {
    fn render(&self) -> RenderResult<String> {
        self.render_with(&self.format.now())
    }
}
