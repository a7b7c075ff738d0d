//! Dense region-addressed voxel volume

use std::fmt;

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::math::Region;

use super::sampler::Sampler;
use super::voxel::Voxel;

/// A dense 3D grid of voxels covering one integer region.
///
/// The volume owns exactly one contiguous buffer of
/// `width x height x depth` cells, addressed X-fastest, then Y, then Z.
/// The region is fixed at construction; resizing means building a new
/// volume. Reads outside the region resolve to a configurable border
/// value instead of failing, so edge-of-volume algorithms can scan across
/// the boundary without per-cell checks.
#[derive(Clone)]
pub struct VoxelVolume {
    region: Region,
    border: Voxel,
    data: Box<[Voxel]>,
}

impl VoxelVolume {
    /// Create a zero-filled (all air) volume covering `region`.
    ///
    /// Fails with `Error::InvalidRegion` if the region has a non-positive
    /// extent on any axis or its cell count overflows `usize`.
    pub fn new(region: Region) -> Result<Self> {
        let cells = region.cell_count().ok_or(Error::InvalidRegion(region))?;
        log::debug!(
            "allocating {}x{}x{} voxel volume ({} cells)",
            region.width(),
            region.height(),
            region.depth(),
            cells
        );
        Ok(Self {
            region,
            border: Voxel::EMPTY,
            data: vec![Voxel::EMPTY; cells].into_boxed_slice(),
        })
    }

    /// Copy of a sub-region of `source`, cropped to fit inside the source
    /// region.
    ///
    /// The new volume keeps world coordinates: its region is the cropped
    /// region itself, and the border value is inherited from the source.
    /// Fails when the crop leaves no cells.
    pub fn from_cropped(source: &VoxelVolume, region: Region) -> Result<Self> {
        let (volume, _) = Self::copy_cropped(source, region, false)?;
        Ok(volume)
    }

    /// Like [`from_cropped`](Self::from_cropped), additionally reporting
    /// whether every copied cell is air.
    ///
    /// The air check stops inspecting cells at the first non-air one; the
    /// copy itself always completes.
    pub fn from_cropped_with_air_check(
        source: &VoxelVolume,
        region: Region,
    ) -> Result<(Self, bool)> {
        Self::copy_cropped(source, region, true)
    }

    fn copy_cropped(source: &VoxelVolume, region: Region, check_air: bool) -> Result<(Self, bool)> {
        let cropped = region.cropped_to(&source.region);
        if !cropped.is_valid() {
            return Err(Error::InvalidRegion(region));
        }

        // Exact region match: one bulk buffer copy.
        if cropped == source.region {
            let volume = source.clone();
            let only_air = check_air && volume.data.iter().all(Voxel::is_empty);
            return Ok((volume, only_air));
        }

        let mut volume = Self::new(cropped)?;
        volume.border = source.border;

        // Rows are contiguous in X on both sides; remap per row between the
        // two strides.
        let row_len = cropped.width() as usize;
        let mut only_air = true;
        for z in cropped.min.z..=cropped.max.z {
            for y in cropped.min.y..=cropped.max.y {
                let row = IVec3::new(cropped.min.x, y, z);
                let src = source.index_of(row);
                let dst = volume.index_of(row);
                let src_row = &source.data[src..src + row_len];
                volume.data[dst..dst + row_len].copy_from_slice(src_row);
                if check_air && only_air {
                    only_air = src_row.iter().all(Voxel::is_empty);
                }
            }
        }

        Ok((volume, only_air))
    }

    /// Copy of several sub-regions of `source` into one volume.
    ///
    /// The new region is the accumulated bounding union of the requested
    /// sub-regions, cropped to the source region; cells of the union not
    /// covered by any listed sub-region stay air. Sub-regions are copied in
    /// input list order, so later regions overwrite earlier overlapping
    /// writes. Fails when the list is empty or the union misses the source
    /// entirely.
    pub fn from_regions(source: &VoxelVolume, regions: &[Region]) -> Result<Self> {
        let mut union = Region::new(IVec3::MAX, IVec3::MIN);
        for region in regions {
            union.expand_to_include(region);
        }
        let bounds = union.cropped_to(&source.region);
        if !bounds.is_valid() {
            return Err(Error::InvalidRegion(bounds));
        }

        let mut volume = Self::new(bounds)?;
        volume.border = source.border;
        log::debug!(
            "multi-region copy: {} sub-regions into {:?}",
            regions.len(),
            bounds
        );

        let mut cursor = source.sampler();
        for region in regions {
            let copy = region.cropped_to(&bounds);
            if !copy.is_valid() {
                continue;
            }
            // Walk source rows with the cursor, write destination by index.
            let row_len = copy.width() as usize;
            for z in copy.min.z..=copy.max.z {
                for y in copy.min.y..=copy.max.y {
                    let row = IVec3::new(copy.min.x, y, z);
                    cursor.set_position(row);
                    let dst = volume.index_of(row);
                    for i in 0..row_len {
                        volume.data[dst + i] = cursor.voxel();
                        cursor.move_positive_x(1);
                    }
                }
            }
        }

        Ok(volume)
    }

    /// The region this volume covers
    pub fn region(&self) -> Region {
        self.region
    }

    /// Extent along X in cells
    pub fn width(&self) -> i32 {
        self.region.width()
    }

    /// Extent along Y in cells
    pub fn height(&self) -> i32 {
        self.region.height()
    }

    /// Extent along Z in cells
    pub fn depth(&self) -> i32 {
        self.region.depth()
    }

    /// Read-only view of the whole buffer, X-fastest then Y then Z
    /// (for bulk consumers such as meshers)
    pub fn voxels(&self) -> &[Voxel] {
        &self.data
    }

    /// Buffer size in bytes
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Voxel>() * self.data.len()
    }

    /// The value returned for reads outside the region
    pub fn border_value(&self) -> Voxel {
        self.border
    }

    /// Change the border value. Stored cells are untouched.
    pub fn set_border_value(&mut self, voxel: Voxel) {
        self.border = voxel;
    }

    /// Voxel at `pos`, or the border value when `pos` lies outside the
    /// region. Never reads out of bounds.
    pub fn voxel_at(&self, pos: IVec3) -> Voxel {
        if self.region.contains_point(pos) {
            self.data[self.index_of(pos)]
        } else {
            self.border
        }
    }

    /// Write `voxel` at `pos`.
    ///
    /// Returns `Ok(true)` if the stored value changed, `Ok(false)` if the
    /// cell already held `voxel` (write skipped), and
    /// `Err(Error::PositionOutOfBounds)` when `pos` lies outside the region.
    pub fn set_voxel(&mut self, pos: IVec3, voxel: Voxel) -> Result<bool> {
        if !self.region.contains_point(pos) {
            return Err(Error::PositionOutOfBounds(pos));
        }
        let idx = self.index_of(pos);
        if self.data[idx] == voxel {
            return Ok(false);
        }
        self.data[idx] = voxel;
        Ok(true)
    }

    /// Zero-fill every cell in place; region and buffer stay as they are
    pub fn clear(&mut self) {
        self.data.fill(Voxel::EMPTY);
    }

    /// Create a traversal cursor over this volume
    pub fn sampler(&self) -> Sampler<'_> {
        Sampler::new(self)
    }

    /// Buffer index of an in-region position, X-fastest then Y then Z
    pub(crate) fn index_of(&self, pos: IVec3) -> usize {
        debug_assert!(self.region.contains_point(pos));
        let local = pos - self.region.min;
        (local.z as usize * self.region.height() as usize + local.y as usize)
            * self.region.width() as usize
            + local.x as usize
    }
}

impl fmt::Debug for VoxelVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelVolume")
            .field("region", &self.region)
            .field("border", &self.border)
            .finish_non_exhaustive()
    }
}
