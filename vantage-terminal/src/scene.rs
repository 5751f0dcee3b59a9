/// Reference geometry drawn by the preview: ground grid, world axes and a unit cube
use crossterm::style::Color;
use nalgebra::Point3;

/// A world-space line segment with the glyph used to draw it.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub glyph: char,
    pub color: Color,
}

impl Segment {
    pub fn new(start: Point3<f32>, end: Point3<f32>, glyph: char, color: Color) -> Self {
        Self {
            start,
            end,
            glyph,
            color,
        }
    }
}

/// Ground grid on the XZ plane spanning `[-half_extent, half_extent]`.
pub fn ground_grid(half_extent: i32) -> Vec<Segment> {
    let h = half_extent as f32;
    (-half_extent..=half_extent)
        .flat_map(|i| {
            let i = i as f32;
            [
                Segment::new(Point3::new(i, 0.0, -h), Point3::new(i, 0.0, h), '.', Color::DarkGrey),
                Segment::new(Point3::new(-h, 0.0, i), Point3::new(h, 0.0, i), '.', Color::DarkGrey),
            ]
        })
        .collect()
}

/// X, Y and Z axes of the given length.
pub fn axes(length: f32) -> Vec<Segment> {
    let origin = Point3::origin();
    vec![
        Segment::new(origin, Point3::new(length, 0.0, 0.0), 'x', Color::Red),
        Segment::new(origin, Point3::new(0.0, length, 0.0), 'y', Color::Green),
        Segment::new(origin, Point3::new(0.0, 0.0, length), 'z', Color::Blue),
    ]
}

/// Wireframe cube of edge length `size` resting on the ground at the origin.
pub fn cube(size: f32) -> Vec<Segment> {
    let h = size / 2.0;
    let corner = |i: usize| {
        Point3::new(
            if i & 1 == 0 { -h } else { h },
            if i & 2 == 0 { 0.0 } else { size },
            if i & 4 == 0 { -h } else { h },
        )
    };

    // Corners differing in exactly one bit share an edge
    let mut edges = Vec::with_capacity(12);
    for a in 0..8 {
        for bit in [1, 2, 4] {
            let b = a | bit;
            if b != a {
                edges.push(Segment::new(corner(a), corner(b), '#', Color::Cyan));
            }
        }
    }
    edges
}

/// The full reference scene.
pub fn reference_scene() -> Vec<Segment> {
    let mut segments = ground_grid(5);
    segments.extend(cube(1.0));
    segments.extend(axes(2.0));
    segments
}
