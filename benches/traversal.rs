use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::{IVec3, Vec3};
use voxelgrid::math::{Aabb, Region};
use voxelgrid::spatial::{Bounded, SpatialOctree};
use voxelgrid::voxel::{Voxel, VoxelVolume};

fn test_volume(edge: i32) -> VoxelVolume {
    let region = Region::cube(IVec3::ZERO, edge);
    let mut volume = VoxelVolume::new(region).unwrap();
    for z in 0..edge {
        for y in 0..edge {
            for x in 0..edge {
                let color = ((x ^ y ^ z) & 0xFF) as u16 + 1;
                volume
                    .set_voxel(IVec3::new(x, y, z), Voxel::from_rgb565(color, 1))
                    .unwrap();
            }
        }
    }
    volume
}

fn bench_point_access_scan(c: &mut Criterion) {
    let volume = test_volume(64);

    c.bench_function("volume_scan_point_access_64", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for z in 0..64 {
                for y in 0..64 {
                    for x in 0..64 {
                        acc += black_box(&volume).voxel_at(IVec3::new(x, y, z)).color as u32;
                    }
                }
            }
            acc
        });
    });
}

fn bench_sampler_scan(c: &mut Criterion) {
    let volume = test_volume(64);

    c.bench_function("volume_scan_sampler_64", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            let mut cursor = black_box(&volume).sampler();
            for z in 0..64 {
                for y in 0..64 {
                    cursor.set_position(IVec3::new(0, y, z));
                    for _ in 0..64 {
                        acc += cursor.voxel().color as u32;
                        cursor.move_positive_x(1);
                    }
                }
            }
            acc
        });
    });
}

#[derive(Clone, Copy, PartialEq)]
struct Chunk {
    bounds: Aabb,
}

impl Bounded for Chunk {
    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

fn populated_tree() -> SpatialOctree<Chunk> {
    let mut tree = SpatialOctree::new(Aabb::new(Vec3::ZERO, Vec3::splat(64.0)), 5);
    for i in 0..16 {
        for j in 0..16 {
            for k in 0..16 {
                let min = Vec3::new(i as f32, j as f32, k as f32) * 3.9;
                tree.insert(Chunk {
                    bounds: Aabb::new(min, min + Vec3::ONE),
                });
            }
        }
    }
    tree
}

fn bench_octree_query(c: &mut Criterion) {
    let tree = populated_tree();
    let query = Aabb::new(Vec3::splat(10.0), Vec3::splat(30.0));

    c.bench_function("octree_query_box_4096", |b| {
        b.iter(|| {
            let mut results = Vec::new();
            tree.query_box(black_box(&query), &mut results);
            results.len()
        });
    });
}

criterion_group!(
    benches,
    bench_point_access_scan,
    bench_sampler_scan,
    bench_octree_query
);
criterion_main!(benches);
