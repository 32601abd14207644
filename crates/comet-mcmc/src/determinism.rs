use comet_core::RngHandle;

/// Substream reserved for initial-solution padding.
pub const PLANNER_STREAM: u64 = 0x504c_414e;

/// Substream reserved for permutation tests in exhaustive mode.
pub const EXHAUSTIVE_STREAM: u64 = 0x4558_4841;

/// RNG used by the initial-solution planner.
pub fn planner_rng(master_seed: u64) -> RngHandle {
    RngHandle::substream(master_seed, PLANNER_STREAM)
}

/// Seed installed into the computation context for exhaustive runs.
pub fn exhaustive_seed(master_seed: u64) -> u64 {
    comet_core::derive_substream_seed(master_seed, EXHAUSTIVE_STREAM)
}
