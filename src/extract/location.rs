//! Location-based text accumulation: glyph runs are collected with their
//! baseline geometry, sorted into reading order, and joined with spaces and
//! line breaks.

use crate::core::geometry::Vector;
use crate::extract::event::TextRenderInfo;

/// Decides whether a space goes between `chunk` and the `previous` chunk on
/// the same line.
pub type BoundaryFn = fn(chunk: &TextChunk, previous: &TextChunk) -> bool;

#[derive(Debug, Clone, PartialEq)]
pub struct TextChunkLocation {
    start: Vector,
    end: Vector,
    orientation: Vector,
    orientation_magnitude: i32,
    dist_perpendicular: i32,
    dist_parallel_start: f32,
    dist_parallel_end: f32,
    char_space_width: f32,
}

impl TextChunkLocation {
    pub fn new(start: Vector, end: Vector, char_space_width: f32) -> Self {
        let mut orientation = end.subtract(&start);
        if orientation.length() == 0.0 {
            orientation = Vector::new(1.0, 0.0, 0.0);
        }
        let orientation = orientation.normalize();
        let orientation_magnitude = (orientation.y.atan2(orientation.x) * 1000.0) as i32;

        let origin = Vector::new(0.0, 0.0, 1.0);
        let dist_perpendicular = start.subtract(&origin).cross(&orientation).z as i32;
        let dist_parallel_start = orientation.dot(&start.subtract(&origin));
        let dist_parallel_end = orientation.dot(&end.subtract(&origin));

        Self {
            start,
            end,
            orientation,
            orientation_magnitude,
            dist_perpendicular,
            dist_parallel_start,
            dist_parallel_end,
            char_space_width,
        }
    }

    pub fn start(&self) -> Vector {
        self.start
    }

    pub fn end(&self) -> Vector {
        self.end
    }

    pub fn orientation(&self) -> Vector {
        self.orientation
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn dist_perpendicular(&self) -> i32 {
        self.dist_perpendicular
    }

    pub fn dist_parallel_start(&self) -> f32 {
        self.dist_parallel_start
    }

    pub fn dist_parallel_end(&self) -> f32 {
        self.dist_parallel_end
    }

    pub fn char_space_width(&self) -> f32 {
        self.char_space_width
    }

    pub fn same_line(&self, other: &Self) -> bool {
        self.orientation_magnitude == other.orientation_magnitude
            && self.dist_perpendicular == other.dist_perpendicular
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub location: TextChunkLocation,
}

impl TextChunk {
    pub fn new(text: impl Into<String>, location: TextChunkLocation) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

/// Gap-based boundary used when nothing else is injected: a space when the
/// gap exceeds half a space, or the chunks overlap by more than one.
pub fn default_word_boundary(chunk: &TextChunk, previous: &TextChunk) -> bool {
    let space = chunk.location.char_space_width();
    let dist = chunk.location.dist_parallel_start() - previous.location.dist_parallel_end();
    dist < -space || dist > space / 2.0
}

#[derive(Clone)]
pub struct LocationTextAccumulator {
    chunks: Vec<TextChunk>,
    is_boundary: BoundaryFn,
}

impl std::fmt::Debug for LocationTextAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationTextAccumulator")
            .field("chunks", &self.chunks)
            .finish_non_exhaustive()
    }
}

impl Default for LocationTextAccumulator {
    fn default() -> Self {
        Self::new(default_word_boundary)
    }
}

impl LocationTextAccumulator {
    pub fn new(is_boundary: BoundaryFn) -> Self {
        Self {
            chunks: Vec::new(),
            is_boundary,
        }
    }

    pub fn add_render_info(&mut self, info: &TextRenderInfo) {
        let location =
            TextChunkLocation::new(info.baseline_start, info.baseline_end, info.single_space_width);
        self.chunks.push(TextChunk::new(info.text.clone(), location));
    }

    pub fn add_chunk(&mut self, chunk: TextChunk) {
        self.chunks.push(chunk);
    }

    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    /// Text of all chunks in reading order.
    pub fn result_text(&self) -> String {
        let mut sorted: Vec<&TextChunk> = self.chunks.iter().collect();
        sorted.sort_by(|a, b| {
            let (a, b) = (&a.location, &b.location);
            a.orientation_magnitude
                .cmp(&b.orientation_magnitude)
                .then(a.dist_perpendicular.cmp(&b.dist_perpendicular))
                .then(a.dist_parallel_start.total_cmp(&b.dist_parallel_start))
        });

        let mut out = String::new();
        let mut last: Option<&TextChunk> = None;
        for chunk in sorted {
            if let Some(previous) = last {
                if chunk.location.same_line(&previous.location) {
                    if (self.is_boundary)(chunk, previous)
                        && !chunk.text.starts_with(' ')
                        && !previous.text.ends_with(' ')
                    {
                        out.push(' ');
                    }
                } else {
                    out.push('\n');
                }
            }
            out.push_str(&chunk.text);
            last = Some(chunk);
        }
        out
    }
}
