//! Stateful traversal cursor over a voxel volume

use crate::core::types::IVec3;
use crate::math::Region;

use super::volume::VoxelVolume;
use super::voxel::Voxel;

/// Out-of-range bits, one per axis
mod invalid {
    pub const X: u8 = 1 << 0;
    pub const Y: u8 = 1 << 1;
    pub const Z: u8 = 1 << 2;
    pub const ALL: u8 = X | Y | Z;
}

/// A cursor over one volume, caching the raw buffer offset of its current
/// position so neighboring reads cost a single add instead of a full
/// index computation.
///
/// The cached offset is meaningful exactly while all three out-of-range
/// bits are clear. Moves from a valid state adjust the offset by the
/// precomputed per-axis stride and recheck only the moved axis; moves from
/// an invalid state fall back to a full position resolution, since an
/// offset accumulated across an out-of-range excursion cannot be trusted.
/// Reads from an invalid position resolve to the volume's border value.
pub struct Sampler<'a> {
    volume: &'a VoxelVolume,
    region: Region,
    y_stride: isize,
    z_stride: isize,
    pos: IVec3,
    offset: isize,
    invalid: u8,
}

impl<'a> Sampler<'a> {
    /// Create an uninitialized cursor: position at the region's lower
    /// corner, all axes flagged out-of-range until the first
    /// `set_position`.
    pub fn new(volume: &'a VoxelVolume) -> Self {
        let region = volume.region();
        Self {
            volume,
            region,
            y_stride: region.width() as isize,
            z_stride: region.width() as isize * region.height() as isize,
            pos: region.min,
            offset: 0,
            invalid: invalid::ALL,
        }
    }

    /// Current logical position (tracked even while out of range)
    pub fn position(&self) -> IVec3 {
        self.pos
    }

    /// True when the position lies inside the volume's region on all axes
    pub fn is_valid(&self) -> bool {
        self.invalid == 0
    }

    /// Jump to an absolute position, recomputing validity on every axis
    /// and, if fully valid, the buffer offset from scratch.
    pub fn set_position(&mut self, pos: IVec3) {
        self.pos = pos;
        self.invalid = 0;
        if pos.x < self.region.min.x || pos.x > self.region.max.x {
            self.invalid |= invalid::X;
        }
        if pos.y < self.region.min.y || pos.y > self.region.max.y {
            self.invalid |= invalid::Y;
        }
        if pos.z < self.region.min.z || pos.z > self.region.max.z {
            self.invalid |= invalid::Z;
        }
        if self.invalid == 0 {
            self.offset = self.volume.index_of(pos) as isize;
        }
    }

    /// Voxel under the cursor: a cached-offset buffer read when valid,
    /// the border value otherwise.
    pub fn voxel(&self) -> Voxel {
        if self.invalid == 0 {
            self.volume.voxels()[self.offset as usize]
        } else {
            self.volume.border_value()
        }
    }

    /// Step `steps` cells along +X
    pub fn move_positive_x(&mut self, steps: u32) {
        if self.invalid == 0 {
            self.pos.x += steps as i32;
            self.offset += steps as isize;
            self.recheck_x();
        } else {
            self.set_position(self.pos + IVec3::new(steps as i32, 0, 0));
        }
    }

    /// Step `steps` cells along -X
    pub fn move_negative_x(&mut self, steps: u32) {
        if self.invalid == 0 {
            self.pos.x -= steps as i32;
            self.offset -= steps as isize;
            self.recheck_x();
        } else {
            self.set_position(self.pos - IVec3::new(steps as i32, 0, 0));
        }
    }

    /// Step `steps` cells along +Y
    pub fn move_positive_y(&mut self, steps: u32) {
        if self.invalid == 0 {
            self.pos.y += steps as i32;
            self.offset += steps as isize * self.y_stride;
            self.recheck_y();
        } else {
            self.set_position(self.pos + IVec3::new(0, steps as i32, 0));
        }
    }

    /// Step `steps` cells along -Y
    pub fn move_negative_y(&mut self, steps: u32) {
        if self.invalid == 0 {
            self.pos.y -= steps as i32;
            self.offset -= steps as isize * self.y_stride;
            self.recheck_y();
        } else {
            self.set_position(self.pos - IVec3::new(0, steps as i32, 0));
        }
    }

    /// Step `steps` cells along +Z
    pub fn move_positive_z(&mut self, steps: u32) {
        if self.invalid == 0 {
            self.pos.z += steps as i32;
            self.offset += steps as isize * self.z_stride;
            self.recheck_z();
        } else {
            self.set_position(self.pos + IVec3::new(0, 0, steps as i32));
        }
    }

    /// Step `steps` cells along -Z
    pub fn move_negative_z(&mut self, steps: u32) {
        if self.invalid == 0 {
            self.pos.z -= steps as i32;
            self.offset -= steps as isize * self.z_stride;
            self.recheck_z();
        } else {
            self.set_position(self.pos - IVec3::new(0, 0, steps as i32));
        }
    }

    fn recheck_x(&mut self) {
        if self.pos.x < self.region.min.x || self.pos.x > self.region.max.x {
            self.invalid |= invalid::X;
        } else {
            self.invalid &= !invalid::X;
        }
    }

    fn recheck_y(&mut self) {
        if self.pos.y < self.region.min.y || self.pos.y > self.region.max.y {
            self.invalid |= invalid::Y;
        } else {
            self.invalid &= !invalid::Y;
        }
    }

    fn recheck_z(&mut self) {
        if self.pos.z < self.region.min.z || self.pos.z > self.region.max.z {
            self.invalid |= invalid::Z;
        } else {
            self.invalid &= !invalid::Z;
        }
    }
}
