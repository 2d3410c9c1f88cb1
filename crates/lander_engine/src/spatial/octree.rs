//! Octree spatial partitioning over a static triangle mesh
//!
//! The tree is built once from the terrain mesh and is read-only afterwards.
//! Nodes live in a flat arena addressed by [`NodeIndex`]; the root is always
//! index 0. Each node splits its box into eight equal octants about its
//! center, and every octant that overlaps at least one of the parent's
//! triangle bounding boxes becomes a child. Triangles straddling an octant
//! boundary are stored in every leaf they overlap.
//!
//! Rebuilding constructs a complete new arena and then swaps it in, so a
//! query can never see a half-built tree.

use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;
use crate::foundation::time::Stopwatch;
use crate::physics::collision::{PointContact, Ray, RayHit};
use crate::spatial::{TriangleMesh, AABB};

/// Index of a node inside the octree arena
pub type NodeIndex = u32;

/// Arena index of the root node
pub const ROOT: NodeIndex = 0;

/// Height reported when no terrain lies under a downward ray
pub const NO_TERRAIN_DISTANCE: f32 = 99_999.0;

/// Slack added to node boxes during ray traversal so hits exactly on an
/// octant boundary are not lost to rounding
const RAY_BOX_EPSILON: f32 = 1.0e-4;

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Maximum subdivision depth (0 = the root is the only leaf)
    pub max_depth: u32,

    /// Nodes holding this many triangles or fewer are not split further
    pub leaf_threshold: usize,

    /// Distance within which a probe point counts as touching a triangle
    pub contact_tolerance: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            leaf_threshold: 4,
            contact_tolerance: 0.25,
        }
    }
}

impl OctreeConfig {
    /// Default configuration with a signed depth; non-positive depths
    /// produce a single-leaf tree
    pub fn with_max_depth(max_depth: i32) -> Self {
        Self {
            max_depth: max_depth.max(0).unsigned_abs(),
            ..Self::default()
        }
    }
}

/// Single node in the octree arena
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: AABB,

    /// Depth in the tree (0 = root)
    pub depth: u32,

    /// Child nodes by octant, all `None` for a leaf
    pub children: [Option<NodeIndex>; 8],

    /// Triangle indices into the mesh (leaves only)
    pub triangles: Vec<u32>,
}

impl OctreeNode {
    fn leaf(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            children: [None; 8],
            triangles: Vec::new(),
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Indices of the children that exist
    pub fn child_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.children.iter().flatten().copied()
    }
}

/// Octree over a shared, externally owned triangle mesh
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    mesh: Arc<TriangleMesh>,
    config: OctreeConfig,
}

/// Scratch state threaded through the recursive build
struct BuildContext<'a> {
    nodes: Vec<OctreeNode>,
    triangle_bounds: &'a [AABB],
    config: &'a OctreeConfig,
}

impl BuildContext<'_> {
    fn build_node(&mut self, bounds: AABB, depth: u32, triangles: Vec<u32>) -> NodeIndex {
        #[allow(clippy::cast_possible_truncation)]
        let index = self.nodes.len() as NodeIndex;
        self.nodes.push(OctreeNode::leaf(bounds, depth));

        if depth >= self.config.max_depth || triangles.len() <= self.config.leaf_threshold {
            self.nodes[index as usize].triangles = triangles;
            return index;
        }

        // A flat axis yields identical lower and upper octants; keep the lower one
        let extents = bounds.extents();
        let flat_mask = (0..3)
            .filter(|&axis| extents[axis] <= f32::EPSILON)
            .fold(0usize, |mask, axis| mask | (1 << axis));

        let partitions: Vec<(usize, AABB, Vec<u32>)> = (0..8)
            .filter(|octant| octant & flat_mask == 0)
            .filter_map(|octant| {
                let child_bounds = bounds.octant(octant);
                let members: Vec<u32> = triangles
                    .iter()
                    .copied()
                    .filter(|&t| self.triangle_bounds[t as usize].intersects(&child_bounds))
                    .collect();
                (!members.is_empty()).then_some((octant, child_bounds, members))
            })
            .collect();

        // Splitting is pointless when no octant sheds a single triangle
        if partitions.iter().all(|(_, _, members)| members.len() == triangles.len()) {
            self.nodes[index as usize].triangles = triangles;
            return index;
        }

        let mut children = [None; 8];
        for (octant, child_bounds, members) in partitions {
            children[octant] = Some(self.build_node(child_bounds, depth + 1, members));
        }
        self.nodes[index as usize].children = children;
        index
    }
}

impl Octree {
    /// Build an octree over `mesh`
    ///
    /// An empty mesh yields a single empty leaf; every query on it reports
    /// no intersection.
    pub fn build(mesh: Arc<TriangleMesh>, config: OctreeConfig) -> Self {
        let stopwatch = Stopwatch::start_new();

        let triangle_bounds: Vec<AABB> = mesh.triangles().map(|(_, t)| t.bounds()).collect();
        let root_bounds = mesh
            .bounds()
            .unwrap_or_else(|| AABB::new(Vec3::zeros(), Vec3::zeros()));

        #[allow(clippy::cast_possible_truncation)]
        let all_triangles: Vec<u32> = (0..mesh.triangle_count() as u32).collect();

        let mut context = BuildContext {
            nodes: Vec::new(),
            triangle_bounds: &triangle_bounds,
            config: &config,
        };
        context.build_node(root_bounds, 0, all_triangles);
        let nodes = context.nodes;

        let octree = Self { nodes, mesh, config };
        log::info!(
            "Built octree: {} triangles, {} nodes, {} leaves, depth {} (limit {}) in {:.2} ms",
            octree.mesh.triangle_count(),
            octree.node_count(),
            octree.leaf_count(),
            octree.depth(),
            octree.config.max_depth,
            stopwatch.elapsed_millis(),
        );
        octree
    }

    /// Build with the default configuration and a signed depth limit
    pub fn with_depth(mesh: Arc<TriangleMesh>, max_depth: i32) -> Self {
        Self::build(mesh, OctreeConfig::with_max_depth(max_depth))
    }

    /// Rebuild from the same mesh with a new configuration
    ///
    /// The replacement is built completely before it is published.
    pub fn rebuild(&mut self, config: OctreeConfig) {
        let rebuilt = Self::build(Arc::clone(&self.mesh), config);
        *self = rebuilt;
    }

    /// The mesh this tree indexes
    pub fn mesh(&self) -> &Arc<TriangleMesh> {
        &self.mesh
    }

    /// Configuration used for the current tree
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Root node
    pub fn root(&self) -> &OctreeNode {
        &self.nodes[ROOT as usize]
    }

    /// Node by arena index
    pub fn node(&self, index: NodeIndex) -> Option<&OctreeNode> {
        self.nodes.get(index as usize)
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Deepest node depth
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Leaf boxes for debug wireframes; call again to restart
    pub fn leaf_bounds(&self) -> impl Iterator<Item = AABB> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf()).map(|n| n.bounds)
    }

    /// Probe a point against the terrain
    ///
    /// A point touches the terrain when it lies within the contact tolerance
    /// of a triangle, or anywhere beneath the surface. The terrain is treated
    /// as a heightfield: a point is beneath it when the first triangle
    /// straight above faces up. Returns the nearest contact, so a point that
    /// moved far past the surface in one step still collides.
    pub fn intersect_point(&self, point: Vec3) -> Option<PointContact> {
        self.surface_contact(point).or_else(|| self.buried_contact(point))
    }

    /// Contact within the tolerance band around the surface
    ///
    /// Descends only into nodes whose box overlaps the point inflated by the
    /// contact tolerance, then tests the real triangle geometry in each
    /// reached leaf.
    fn surface_contact(&self, point: Vec3) -> Option<PointContact> {
        let tolerance = self.config.contact_tolerance;
        let probe = AABB::from_center_extents(point, Vec3::repeat(tolerance));
        if !self.root().bounds.intersects(&probe) {
            return None;
        }

        let mut best: Option<PointContact> = None;
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.is_leaf() {
                for &triangle in &node.triangles {
                    let Some(contact) = self.mesh.triangle(triangle).contact(triangle, point, tolerance) else {
                        continue;
                    };
                    if best.map_or(true, |b| contact.distance < b.distance) {
                        best = Some(contact);
                    }
                }
            } else {
                stack.extend(
                    node.child_indices()
                        .filter(|&child| self.nodes[child as usize].bounds.intersects(&probe)),
                );
            }
        }
        best
    }

    /// Contact for a point under the surface, measured straight up
    fn buried_contact(&self, point: Vec3) -> Option<PointContact> {
        let hit = self.intersect_ray(point, Vec3::new(0.0, 1.0, 0.0))?;
        (hit.normal.y > 0.0).then_some(PointContact {
            triangle: hit.triangle,
            surface_point: hit.point,
            normal: hit.normal,
            displacement: point - hit.point,
            distance: hit.distance,
        })
    }

    /// True when the point touches the terrain
    pub fn collides(&self, point: Vec3) -> bool {
        self.intersect_point(point).is_some()
    }

    /// Cast a ray into the terrain and return the nearest hit
    ///
    /// Children are visited nearest-first; a subtree whose entry distance is
    /// beyond the best hit so far is skipped.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        let ray = Ray::new(origin, direction)?;
        self.root()
            .bounds
            .expanded(RAY_BOX_EPSILON)
            .intersect_ray(ray.origin, ray.direction)?;

        let mut best = None;
        self.visit_ray(ROOT, &ray, &mut best);
        best
    }

    /// Distance straight down to the terrain, or [`NO_TERRAIN_DISTANCE`]
    pub fn height_above(&self, point: Vec3) -> f32 {
        self.intersect_ray(point, Vec3::new(0.0, -1.0, 0.0))
            .map_or(NO_TERRAIN_DISTANCE, |hit| hit.distance)
    }

    fn visit_ray(&self, index: NodeIndex, ray: &Ray, best: &mut Option<RayHit>) {
        let node = &self.nodes[index as usize];

        if node.is_leaf() {
            for &triangle_index in &node.triangles {
                let triangle = self.mesh.triangle(triangle_index);
                let Some((distance, _, _)) = triangle.intersect_ray(ray) else {
                    continue;
                };
                if best.map_or(true, |b| distance < b.distance) {
                    *best = Some(RayHit {
                        triangle: triangle_index,
                        distance,
                        point: ray.point_at(distance),
                        normal: triangle.normal().unwrap_or(-ray.direction),
                    });
                }
            }
            return;
        }

        let mut crossings: Vec<(f32, NodeIndex)> = node
            .child_indices()
            .filter_map(|child| {
                self.nodes[child as usize]
                    .bounds
                    .expanded(RAY_BOX_EPSILON)
                    .intersect_ray(ray.origin, ray.direction)
                    .map(|(enter, _)| (enter, child))
            })
            .collect();
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (enter, child) in crossings {
            if best.map_or(false, |b| enter > b.distance) {
                break;
            }
            self.visit_ray(child, ray, best);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn bumpy_terrain(seed: u64) -> Arc<TriangleMesh> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise: Vec<f32> = (0..64).map(|_| rng.gen_range(-0.5..0.5)).collect();
        Arc::new(TriangleMesh::grid((-20.0, -20.0), 2.5, 16, 16, move |x, z| {
            let cell = ((x.abs() * 3.0 + z.abs() * 7.0) as usize) % noise.len();
            (x * 0.2).sin() * 3.0 + (z * 0.15).cos() * 2.0 + noise[cell]
        }))
    }

    fn brute_force_ray(mesh: &TriangleMesh, origin: Vec3, direction: Vec3) -> Option<f32> {
        let ray = Ray::new(origin, direction)?;
        mesh.triangles()
            .filter_map(|(_, t)| t.intersect_ray(&ray).map(|(distance, _, _)| distance))
            .min_by(f32::total_cmp)
    }

    fn brute_force_point(mesh: &TriangleMesh, point: Vec3, tolerance: f32) -> Option<f32> {
        let surface = mesh
            .triangles()
            .filter_map(|(i, t)| t.contact(i, point, tolerance).map(|c| c.distance))
            .min_by(f32::total_cmp);
        surface.or_else(|| {
            let up = Ray::new(point, Vec3::new(0.0, 1.0, 0.0))?;
            let (distance, facing_up) = mesh
                .triangles()
                .filter_map(|(_, t)| {
                    let (distance, _, _) = t.intersect_ray(&up)?;
                    Some((distance, t.normal().map_or(false, |n| n.y > 0.0)))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0))?;
            facing_up.then_some(distance)
        })
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let mesh = bumpy_terrain(1);
        let octree = Octree::with_depth(Arc::clone(&mesh), 0);
        assert_eq!(octree.node_count(), 1);
        assert!(octree.root().is_leaf());
        assert_eq!(octree.root().triangles.len(), mesh.triangle_count());
    }

    #[test]
    fn test_negative_depth_clamps_to_single_leaf() {
        let octree = Octree::with_depth(bumpy_terrain(2), -3);
        assert_eq!(octree.config().max_depth, 0);
        assert_eq!(octree.leaf_count(), 1);
    }

    #[test]
    fn test_empty_mesh_reports_no_intersection() {
        let octree = Octree::build(Arc::new(TriangleMesh::default()), OctreeConfig::default());
        assert_eq!(octree.node_count(), 1);
        assert!(octree.root().triangles.is_empty());
        assert!(octree.intersect_point(Vec3::zeros()).is_none());
        assert!(octree.intersect_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0)).is_none());
        assert_eq!(octree.height_above(Vec3::new(0.0, 5.0, 0.0)), NO_TERRAIN_DISTANCE);
    }

    #[test]
    fn test_children_nested_and_every_triangle_in_a_leaf() {
        let mesh = bumpy_terrain(3);
        let octree = Octree::with_depth(Arc::clone(&mesh), 5);
        assert!(octree.node_count() > 1);
        assert!(octree.depth() <= 5);

        for index in 0..octree.node_count() {
            let node = octree.node(index as NodeIndex).unwrap();
            for child in node.child_indices() {
                let child = octree.node(child).unwrap();
                assert!(node.bounds.contains_box(&child.bounds));
                assert_eq!(child.depth, node.depth + 1);
            }
            if !node.is_leaf() {
                assert!(node.triangles.is_empty());
            }
        }

        for (index, triangle) in mesh.triangles() {
            let bounds = triangle.bounds();
            let placed = octree.nodes.iter().any(|node| {
                node.is_leaf() && node.triangles.contains(&index) && node.bounds.intersects(&bounds)
            });
            assert!(placed, "triangle {index} missing from every leaf");
        }
    }

    #[test]
    fn test_ray_matches_brute_force_at_every_depth() {
        let mesh = bumpy_terrain(4);
        let mut rng = StdRng::seed_from_u64(99);
        let origins: Vec<Vec3> = (0..40)
            .map(|_| Vec3::new(rng.gen_range(-25.0..25.0), rng.gen_range(8.0..30.0), rng.gen_range(-25.0..25.0)))
            .collect();

        for depth in 0..=7 {
            let octree = Octree::with_depth(Arc::clone(&mesh), depth);
            for &origin in &origins {
                let down = Vec3::new(0.0, -1.0, 0.0);
                let expected = brute_force_ray(&mesh, origin, down);
                let actual = octree.intersect_ray(origin, down).map(|hit| hit.distance);
                match (expected, actual) {
                    (Some(e), Some(a)) => assert_relative_eq!(e, a, epsilon = 1.0e-4),
                    (None, None) => {}
                    other => panic!("depth {depth}, origin {origin:?}: {other:?}"),
                }

                let slanted = Vec3::new(0.3, -1.0, -0.2);
                let expected = brute_force_ray(&mesh, origin, slanted);
                let actual = octree.intersect_ray(origin, slanted).map(|hit| hit.distance);
                match (expected, actual) {
                    (Some(e), Some(a)) => assert_relative_eq!(e, a, epsilon = 1.0e-4),
                    (None, None) => {}
                    other => panic!("depth {depth}, slanted from {origin:?}: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_ray_on_flat_terrain() {
        let mesh = Arc::new(TriangleMesh::grid((-10.0, -10.0), 2.0, 10, 10, |_, _| -1.0));
        let octree = Octree::with_depth(mesh, 6);
        let hit = octree.intersect_ray(Vec3::new(0.0, 9.0, 0.0), Vec3::new(0.0, -1.0, 0.0)).unwrap();
        assert_relative_eq!(hit.distance, 10.0, epsilon = 1.0e-5);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1.0e-5);
        assert_eq!(octree.height_above(Vec3::new(50.0, 9.0, 0.0)), NO_TERRAIN_DISTANCE);
    }

    #[test]
    fn test_point_query_matches_brute_force() {
        let mesh = bumpy_terrain(5);
        let octree = Octree::with_depth(Arc::clone(&mesh), 6);
        let tolerance = octree.config().contact_tolerance;
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let x = rng.gen_range(-19.0..19.0);
            let z = rng.gen_range(-19.0..19.0);
            let surface = octree.intersect_ray(Vec3::new(x, 50.0, z), Vec3::new(0.0, -1.0, 0.0)).unwrap().point;
            let point = surface + Vec3::new(0.0, rng.gen_range(-2.0..0.5), 0.0);

            let expected = brute_force_point(&mesh, point, tolerance);
            let actual = octree.intersect_point(point).map(|c| c.distance);
            match (expected, actual) {
                (Some(e), Some(a)) => assert_relative_eq!(e, a, epsilon = 1.0e-5),
                (None, None) => {}
                other => panic!("point {point:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_point_contact_on_flat_terrain() {
        let mesh = Arc::new(TriangleMesh::grid((-10.0, -10.0), 2.0, 10, 10, |_, _| 0.0));
        let octree = Octree::with_depth(mesh, 6);

        let contact = octree.intersect_point(Vec3::new(1.3, 0.1, -2.7)).unwrap();
        assert_relative_eq!(contact.distance, 0.1, epsilon = 1.0e-5);
        assert_relative_eq!(contact.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1.0e-5);
        assert!(octree.intersect_point(Vec3::new(1.3, 2.0, -2.7)).is_none());
        assert!(octree.collides(Vec3::new(9.9, -0.2, 9.9)));
        assert!(!octree.collides(Vec3::new(30.0, 0.0, 0.0)));
    }

    #[test]
    fn test_point_below_surface_collides_at_any_depth() {
        let mesh = Arc::new(TriangleMesh::grid((-10.0, -10.0), 2.0, 10, 10, |_, _| -1.0));
        let octree = Octree::with_depth(mesh, 6);

        let contact = octree.intersect_point(Vec3::new(0.5, -1.5, 0.5)).unwrap();
        assert_relative_eq!(contact.distance, 0.5, epsilon = 1.0e-5);
        assert_relative_eq!(contact.surface_point, Vec3::new(0.5, -1.0, 0.5), epsilon = 1.0e-5);
        assert_relative_eq!(contact.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1.0e-5);
        assert_relative_eq!(contact.displacement, Vec3::new(0.0, -0.5, 0.0), epsilon = 1.0e-5);

        assert!(octree.collides(Vec3::new(-3.3, -40.0, 7.1)));
        assert!(!octree.collides(Vec3::new(30.0, -5.0, 0.0)));
    }

    #[test]
    fn test_point_above_downward_faces_is_not_buried() {
        // Flipped winding: faces point down, so a point below is in open air
        let vertices = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0)];
        let mesh = Arc::new(TriangleMesh::from_triangles(vertices, vec![[0, 1, 2]]).unwrap());
        let octree = Octree::with_depth(mesh, 0);
        assert!(octree.intersect_point(Vec3::new(1.0, -2.0, 1.0)).is_none());
        assert!(octree.intersect_point(Vec3::new(1.0, -0.1, 1.0)).is_some());
    }

    #[test]
    fn test_leaf_bounds_restartable() {
        let octree = Octree::with_depth(bumpy_terrain(6), 4);
        let first: Vec<AABB> = octree.leaf_bounds().collect();
        let second: Vec<AABB> = octree.leaf_bounds().collect();
        assert_eq!(first.len(), octree.leaf_count());
        assert_eq!(first, second);
        for leaf in &first {
            assert!(octree.root().bounds.contains_box(leaf));
        }
    }

    #[test]
    fn test_rebuild_replaces_tree() {
        let mut octree = Octree::with_depth(bumpy_terrain(8), 0);
        assert_eq!(octree.node_count(), 1);
        octree.rebuild(OctreeConfig::with_max_depth(4));
        assert!(octree.node_count() > 1);
        assert_eq!(octree.config().max_depth, 4);
    }
}
