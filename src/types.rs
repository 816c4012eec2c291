//! Identifier aliases shared across the engine.

/// Identifier of a context group (one source group of the hazard model).
pub type GroupId = u32;

/// Sub-model index `g`: one ground-motion model variant within a group's binding.
pub type SubModelIndex = u32;

/// Identifier of a logic-tree realization.
pub type RealizationId = u32;

/// Shape of an output array: (L1, L1, N).
pub type MrdShape = (usize, usize, usize);

/// Name of the dataset an orchestration run writes its result to.
pub const MRD_DATASET: &str = "mrd";
