//! Error types for the voxelgrid crate

use glam::IVec3;
use thiserror::Error;

use crate::math::Region;

/// Main error type for the crate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A region with non-positive extent on at least one axis, or one whose
    /// cell count does not fit in `usize`. Construction-time condition.
    #[error("invalid region {0:?}")]
    InvalidRegion(Region),

    /// A write was attempted outside a volume's region. Soft failure; occurs
    /// routinely in edge-of-volume algorithms and must be checked, not thrown.
    #[error("position ({}, {}, {}) outside volume region", .0.x, .0.y, .0.z)]
    PositionOutOfBounds(IVec3),
}
