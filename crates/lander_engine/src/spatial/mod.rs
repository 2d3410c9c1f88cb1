//! Spatial partitioning data structures
//!
//! Provides the static terrain index used for collision detection and
//! ray casting: bounding boxes, the triangle mesh and the octree over it.

mod aabb;
mod mesh;
mod octree;

pub use aabb::AABB;
pub use mesh::{MeshError, TriangleMesh};
pub use octree::{NodeIndex, Octree, OctreeConfig, OctreeNode, NO_TERRAIN_DISTANCE};
