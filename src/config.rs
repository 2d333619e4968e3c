pub const DEFAULT_TAPE_SIZE: usize = 30_000;
pub const DEFAULT_GROWTH: usize = 10_000;

/// Sizing of the tape a [`crate::interpreter::Machine`] starts with and grows by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Cells allocated up front
    pub tape_size: usize,
    /// Zeroed cells appended whenever the pointer reaches the last cell
    pub growth: usize,
}

impl MachineConfig {
    pub fn new(tape_size: usize, growth: usize) -> Self {
        // the pointer always has to address a live cell
        Self {
            tape_size: tape_size.max(1),
            growth: growth.max(1),
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_SIZE, DEFAULT_GROWTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sizes_are_clamped() {
        assert_eq!(MachineConfig::new(0, 0), MachineConfig { tape_size: 1, growth: 1 });
        assert_eq!(MachineConfig::default().tape_size, 30_000);
    }
}
