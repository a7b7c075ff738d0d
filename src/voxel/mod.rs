//! Voxel data structures and operations

pub mod voxel;
pub mod volume;
pub mod sampler;

pub use voxel::Voxel;
pub use volume::VoxelVolume;
pub use sampler::Sampler;
