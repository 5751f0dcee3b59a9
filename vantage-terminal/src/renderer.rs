/// ASCII line rasterizer for terminal camera previews
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use vantage_core::Camera;

use crate::scene::Segment;

/// Terminal cells are roughly twice as tall as they are wide.
pub const CELL_ASPECT: u32 = 2;

/// Samples taken along a segment that leaves the clip volume.
const CLIPPED_SAMPLES: usize = 96;

/// ASCII renderer that rasterizes world-space segments through a camera
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Viewport to hand to the camera so that the preview is not stretched
    /// by the cell shape.
    pub fn viewport_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32 * CELL_ASPECT)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn render_segments(&mut self, segments: &[Segment], camera: &Camera) {
        for segment in segments {
            self.render_segment(segment, camera);
        }
    }

    fn render_segment(&mut self, segment: &Segment, camera: &Camera) {
        let start = camera.project_to_screen(&segment.start);
        let end = camera.project_to_screen(&segment.end);

        // Fully visible segments are stepped per cell, others are sampled in
        // world space so the visible part still shows up.
        let samples = match (start, end) {
            (Some(a), Some(b)) => {
                let dx = b.0 - a.0;
                let dy = (b.1 - a.1) / CELL_ASPECT as f32;
                (dx.abs().max(dy.abs()).ceil() as usize).max(1)
            }
            _ => CLIPPED_SAMPLES,
        };

        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            let point = segment.start + (segment.end - segment.start) * t;
            if let Some((x, y, depth)) = camera.project_to_screen(&point) {
                self.plot(x, y / CELL_ASPECT as f32, depth, segment.glyph, segment.color);
            }
        }
    }

    fn plot(&mut self, x: f32, y: f32, depth: f32, glyph: char, color: Color) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = glyph;
            self.color_buffer[idx] = color;
        }
    }

    /// Character at a cell, mostly useful for inspecting a rendered frame.
    pub fn glyph_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
