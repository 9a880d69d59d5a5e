use serde::{Deserialize, Serialize};

/// Axis-aligned box in OCR pixel space: `(x0, y0)` is the top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn from_array(coords: [f32; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Rectangle in PDF user space: lower-left corner plus extent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Homogeneous 2D point/direction. `z` is 1 for points and 0 for directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn point(x: f32, y: f32) -> Self {
        Self::new(x, y, 1.0)
    }

    pub fn subtract(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }

    /// Row vector times matrix, the PDF convention.
    pub fn cross_matrix(&self, m: &Matrix) -> Self {
        let v = &m.vals;
        Self::new(
            self.x * v[0] + self.y * v[3] + self.z * v[6],
            self.x * v[1] + self.y * v[4] + self.z * v[7],
            self.x * v[2] + self.y * v[5] + self.z * v[8],
        )
    }
}

/// 3x3 affine matrix stored row-major, as `[a b 0 c d 0 e f 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    vals: [f32; 9],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const I11: usize = 0;
    pub const I12: usize = 1;
    pub const I21: usize = 3;
    pub const I22: usize = 4;
    pub const I31: usize = 6;
    pub const I32: usize = 7;

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Builds the matrix from the six operands of a `cm` or `Tm` operator.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            vals: [a, b, 0.0, c, d, 0.0, e, f, 1.0],
        }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn get(&self, index: usize) -> f32 {
        self.vals[index]
    }

    /// `self × by`: applies `self` first, then `by`.
    pub fn multiply(&self, by: &Matrix) -> Self {
        let a = &self.vals;
        let b = &by.vals;
        let mut out = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
            }
        }
        Self { vals: out }
    }
}
