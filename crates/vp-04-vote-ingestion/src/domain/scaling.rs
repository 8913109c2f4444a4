//! Worker pool sizing.

/// Workers needed to drain `backlog` one batch each, within `[min, max]`.
pub fn desired_workers(backlog: usize, batch_size: usize, min: usize, max: usize) -> usize {
    let wanted = backlog.div_ceil(batch_size.max(1));
    wanted.clamp(min, max.max(min))
}
