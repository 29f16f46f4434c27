//! World assembly: tiles the chunk layout and the debris ideal set along the
//! travel axis and instantiates them in the rendering backend.
//!
//! Planning is pure (`plan_*` functions produce [`ObjectDesc`]s); only
//! [`instantiate`] and [`World::release_debris`] touch the backend.

use glam::Vec3;

use crate::city::config::CityConfig;
use crate::city::debris::DebrisSpec;
use crate::city::layout::{BuildingSpec, ChunkLayout};
use crate::scene::{
    Geometry, Layer, LocalTransform, Material, ObjectDesc, ObjectHandle, Pivot, RenderBackend,
};

/// Chunk indices kept alive: one ahead of the start, the rest behind.
pub fn chunk_indices(config: &CityConfig) -> impl Iterator<Item = i32> {
    (0..config.chunks_at_a_time as i32).map(|i| 1 - i)
}

/// Travel-axis offsets of every instantiated chunk, front to back.
pub fn chunk_offsets(config: &CityConfig) -> impl Iterator<Item = f32> + '_ {
    chunk_indices(config).map(move |cz| cz as f32 * config.chunk_size)
}

/// Describe one building.
///
/// Rotated buildings get their pivot moved to the base so the rotation reads
/// as toppling; upright ones are lifted so the base sits at `y`.
pub fn building_desc(spec: &BuildingSpec, material: Material, name: String) -> ObjectDesc {
    let (geometry, transform) = if spec.is_rotated() {
        let angles = Vec3::new(
            spec.rotation_degrees.x.to_radians(),
            spec.rotation_degrees.y.to_radians(),
            spec.rotation_degrees.z.to_radians(),
        );
        (
            Geometry::Box { size: spec.size, pivot: Pivot::Base },
            LocalTransform::from_euler(spec.position, angles),
        )
    } else {
        (
            Geometry::Box { size: spec.size, pivot: Pivot::Center },
            LocalTransform::from_position(spec.position + Vec3::new(0.0, spec.size.y * 0.5, 0.0)),
        )
    };

    ObjectDesc {
        name,
        layer: Layer::Buildings,
        geometry,
        material,
        transform,
    }
}

/// Describe one debris piece.
pub fn debris_desc(spec: &DebrisSpec, material: Material, name: String) -> ObjectDesc {
    ObjectDesc {
        name,
        layer: Layer::Debris,
        geometry: Geometry::Box {
            size: Vec3::new(spec.size, spec.height, spec.size),
            pivot: Pivot::Center,
        },
        material,
        transform: LocalTransform::from_euler(spec.position, spec.rotation_radians()),
    }
}

/// Describe the ground tile of the chunk at `z_offset`.
pub fn ground_desc(config: &CityConfig, z_offset: f32, name: String) -> ObjectDesc {
    ObjectDesc {
        name,
        layer: Layer::Ground,
        geometry: Geometry::Plane {
            width: config.chunk_size,
            depth: config.chunk_size,
        },
        material: Material { color: config.palette.ground },
        transform: LocalTransform::from_position(Vec3::new(0.0, 0.0, z_offset)),
    }
}

/// Ground tiles for every chunk.
pub fn plan_ground(config: &CityConfig) -> Vec<ObjectDesc> {
    chunk_indices(config)
        .map(|cz| ground_desc(config, cz as f32 * config.chunk_size, format!("ground[{cz}]")))
        .collect()
}

/// Every building of the layout, stamped into every chunk.
pub fn plan_buildings(config: &CityConfig, layout: &ChunkLayout) -> Vec<ObjectDesc> {
    let material = Material { color: config.palette.building };
    chunk_indices(config)
        .flat_map(|cz| {
            layout
                .tile(cz as f32 * config.chunk_size)
                .enumerate()
                .map(move |(i, spec)| building_desc(&spec, material, format!("building[{cz}:{i}]")))
        })
        .collect()
}

/// The ideal set stamped into every chunk.
pub fn plan_debris(config: &CityConfig, ideal_set: &[DebrisSpec]) -> Vec<DebrisSpec> {
    chunk_offsets(config)
        .flat_map(|z| ideal_set.iter().map(move |spec| spec.offset_z(z)))
        .collect()
}

/// Live debris piece plus its wrap-around animation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisInstance {
    pub handle: ObjectHandle,
    /// Current position; only `y` animates.
    pub position: Vec3,
    /// Current XYZ rotation in radians, each kept in `[0, 2π)`.
    pub angles: Vec3,
}

impl DebrisInstance {
    pub fn transform(&self) -> LocalTransform {
        LocalTransform::from_euler(self.position, self.angles)
    }
}

/// Handles of everything the assembler created.
#[derive(Debug, Default)]
pub struct World {
    pub ground: Vec<ObjectHandle>,
    pub buildings: Vec<ObjectHandle>,
    pub debris: Vec<DebrisInstance>,
}

impl World {
    /// Release every debris handle and empty the collection.
    pub fn release_debris(&mut self, backend: &mut impl RenderBackend) {
        for piece in self.debris.drain(..) {
            backend.remove_object(piece.handle);
        }
    }

    /// Total live objects owned by this world.
    pub fn object_count(&self) -> usize {
        self.ground.len() + self.buildings.len() + self.debris.len()
    }
}

/// Create the debris instances for `ideal_set` across all chunks.
pub fn instantiate_debris(
    config: &CityConfig,
    ideal_set: &[DebrisSpec],
    backend: &mut impl RenderBackend,
) -> Vec<DebrisInstance> {
    let material = Material { color: config.palette.building };
    plan_debris(config, ideal_set)
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let desc = debris_desc(spec, material, format!("debris[{i}]"));
            DebrisInstance {
                handle: backend.create_object(desc),
                position: spec.position,
                angles: spec.rotation_radians(),
            }
        })
        .collect()
}

/// Build the whole world: ground, buildings, and debris for every chunk.
pub fn instantiate(
    config: &CityConfig,
    layout: &ChunkLayout,
    ideal_set: &[DebrisSpec],
    backend: &mut impl RenderBackend,
) -> World {
    let debris = instantiate_debris(config, ideal_set, backend);
    let ground = plan_ground(config)
        .into_iter()
        .map(|desc| backend.create_object(desc))
        .collect();
    let buildings = plan_buildings(config, layout)
        .into_iter()
        .map(|desc| backend.create_object(desc))
        .collect();

    let world = World { ground, buildings, debris };
    log::info!(
        "Built {} chunks: {} ground tiles, {} buildings, {} debris",
        config.chunks_at_a_time,
        world.ground.len(),
        world.buildings.len(),
        world.debris.len()
    );
    world
}
