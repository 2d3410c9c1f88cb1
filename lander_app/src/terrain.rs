//! Procedural heightfield terrain with a flat landing pad

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lander_engine::core::config::LandingZoneConfig;
use lander_engine::foundation::math::{utils, Vec3};
use lander_engine::spatial::TriangleMesh;

/// Half-width of the generated terrain square
const HALF_EXTENT: f32 = 60.0;
const CELL_SIZE: f32 = 2.0;
const CELLS: u32 = 60;

/// Extra flat margin around the pad before the hills start
const PAD_MARGIN: f32 = 3.0;
const BLEND_WIDTH: f32 = 6.0;

/// Rolling hills with per-vertex jitter, flattened around the landing zone
pub fn generate(zone: &LandingZoneConfig, seed: u64) -> TriangleMesh {
    let mut rng = StdRng::seed_from_u64(seed);
    let stride = (CELLS + 1) as usize;
    let jitter: Vec<f32> = (0..stride * stride).map(|_| rng.gen_range(-0.4..0.4)).collect();

    let pad = zone.position;
    let flat_radius = zone.radius + PAD_MARGIN;

    TriangleMesh::grid((-HALF_EXTENT, -HALF_EXTENT), CELL_SIZE, CELLS, CELLS, move |x, z| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (i, j) = (
            ((x + HALF_EXTENT) / CELL_SIZE).round() as usize,
            ((z + HALF_EXTENT) / CELL_SIZE).round() as usize,
        );
        let hills = pad.y + 2.0 + (x * 0.08).sin() * 4.0 + (z * 0.11).cos() * 3.0 + jitter[j * stride + i];

        let distance = utils::horizontal_distance(Vec3::new(x, 0.0, z), pad);
        let blend = ((distance - flat_radius) / BLEND_WIDTH).clamp(0.0, 1.0);
        utils::lerp(pad.y, hills, blend)
    })
}
