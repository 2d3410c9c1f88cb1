//! Axis-aligned bounding box

use serde::{Serialize, Deserialize};

use crate::foundation::math::{utils, Vec3};

/// Axis-aligned bounding box
///
/// Invariant: `min <= max` on every axis. Zero-thickness boxes are valid
/// (a perfectly flat terrain patch has one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from two opposite corners
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: utils::component_min(a, b),
            max: utils::component_max(a, b),
        }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Tight box around a set of points, `None` when the set is empty
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |bounds, p| Self {
            min: utils::component_min(bounds.min, p),
            max: utils::component_max(bounds.max, p),
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box by `margin` on every side
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        let margin = Vec3::repeat(margin.max(0.0));
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Check if this AABB contains a point (boundary inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB fully contains another
    pub fn contains_box(&self, other: &AABB) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// One of the eight equal octants around the center
    ///
    /// Octant layout (bit 0 = +X, bit 1 = +Y, bit 2 = +Z):
    /// 0: -X, -Y, -Z ... 7: +X, +Y, +Z
    pub fn octant(&self, index: usize) -> AABB {
        let center = self.center();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if index & bit != 0 { (mid, hi) } else { (lo, mid) }
        };
        let (min_x, max_x) = pick(1, self.min.x, center.x, self.max.x);
        let (min_y, max_y) = pick(2, self.min.y, center.y, self.max.y);
        let (min_z, max_z) = pick(4, self.min.z, center.z, self.max.z);
        AABB {
            min: Vec3::new(min_x, min_y, min_z),
            max: Vec3::new(max_x, max_y, max_z),
        }
    }

    /// Test ray intersection with this AABB using the slab method
    ///
    /// Returns the parametric `(enter, exit)` distances along `ray_dir`,
    /// with `enter` clamped to 0 when the origin is inside. Axes where the
    /// direction is zero are handled as "origin must lie within the slab",
    /// which keeps flat boxes and axis-aligned rays free of `0 * inf` NaNs.
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<(f32, f32)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray_origin[axis];
            let dir = ray_dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() <= f32::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_exit >= t_enter && t_exit >= 0.0 {
            Some((t_enter.max(0.0), t_exit))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> AABB {
        AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_new_orders_corners() {
        let aabb = AABB::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, -3.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_points() {
        assert!(AABB::from_points(std::iter::empty()).is_none());
        let aabb = AABB::from_points([Vec3::new(1.0, 0.0, 0.0), Vec3::new(-2.0, 5.0, 1.0)]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 5.0, 1.0));
    }

    #[test]
    fn test_contains_and_intersects() {
        let aabb = unit_box();
        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains_point(Vec3::new(1.1, 0.0, 0.0)));

        let touching = AABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let apart = AABB::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(aabb.intersects(&touching));
        assert!(!aabb.intersects(&apart));
    }

    #[test]
    fn test_octants_tile_parent() {
        let aabb = unit_box();
        let mut volume = 0.0;
        for index in 0..8 {
            let octant = aabb.octant(index);
            assert!(aabb.contains_box(&octant));
            let size = octant.max - octant.min;
            volume += size.x * size.y * size.z;
        }
        assert_relative_eq!(volume, 8.0);
        assert_eq!(aabb.octant(7).min, Vec3::zeros());
        assert_eq!(aabb.octant(0).max, Vec3::zeros());
    }

    #[test]
    fn test_ray_hits_from_outside() {
        let (enter, exit) = unit_box()
            .intersect_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .unwrap();
        assert_relative_eq!(enter, 4.0);
        assert_relative_eq!(exit, 6.0);
    }

    #[test]
    fn test_ray_misses_and_points_away() {
        let aabb = unit_box();
        assert!(aabb.intersect_ray(Vec3::new(3.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0)).is_none());
        assert!(aabb.intersect_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_ray_through_flat_box() {
        let flat = AABB::new(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 0.0, 10.0));
        let (enter, _) = flat
            .intersect_ray(Vec3::new(-10.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .unwrap();
        assert_relative_eq!(enter, 3.0);
    }
}
