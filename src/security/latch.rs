//! One-way fault latches.
//!
//! Two distinct types so that an irreversible flag cannot be cleared by
//! code that clears the ordinary ones: [`IrreversibleLatch`] has no
//! clearing operation and no `Default`.

/// A sticky flag: once armed it stays armed until explicitly
/// acknowledged and cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyLatch {
    armed: bool,
}

impl StickyLatch {
    /// Creates an unarmed latch.
    pub const fn new() -> Self {
        Self { armed: false }
    }

    /// Arms the latch. Arming an armed latch is a no-op.
    #[inline]
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Clears the latch. Only the reset path calls this.
    #[inline]
    pub fn acknowledge_and_clear(&mut self) {
        self.armed = false;
    }

    /// Returns true while armed.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

/// A latch that can be armed but never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrreversibleLatch {
    armed: bool,
}

impl IrreversibleLatch {
    /// Creates an unarmed latch. Only valid at power-on.
    pub const fn new() -> Self {
        Self { armed: false }
    }

    /// Arms the latch permanently.
    #[inline]
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Returns true while armed.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticky_latch_cycle() {
        let mut latch = StickyLatch::default();
        assert!(!latch.is_armed());

        latch.arm();
        latch.arm();
        assert!(latch.is_armed());

        latch.acknowledge_and_clear();
        assert!(!latch.is_armed());
    }

    #[test]
    fn test_irreversible_latch_stays_armed() {
        let mut latch = IrreversibleLatch::new();
        assert!(!latch.is_armed());

        latch.arm();
        assert!(latch.is_armed());
    }
}
