//! Math utilities and types
//!
//! Provides the vector types shared by the spatial index and the particle
//! simulation.

pub use nalgebra::{Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (RGBA colors)
pub type Vec4 = Vector4<f32>;

/// Unit axis directions used by thrust and ray queries
pub mod axes {
    use super::Vec3;

    /// World up (+Y)
    pub fn up() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// Forward is -Z, matching the right-handed camera convention
    pub fn forward() -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }

    /// Back (+Z)
    pub fn back() -> Vec3 {
        Vec3::new(0.0, 0.0, 1.0)
    }

    /// Left (-X)
    pub fn left() -> Vec3 {
        Vec3::new(-1.0, 0.0, 0.0)
    }

    /// Right (+X)
    pub fn right() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.0)
    }
}

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Distance between two points ignoring the Y axis
    pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
        let dx = a.x - b.x;
        let dz = a.z - b.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Componentwise minimum of two vectors
    pub fn component_min(a: Vec3, b: Vec3) -> Vec3 {
        Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
    }

    /// Componentwise maximum of two vectors
    pub fn component_max(a: Vec3, b: Vec3) -> Vec3 {
        Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
    }
}
