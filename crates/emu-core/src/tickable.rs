//! Trait for components advanced by clock cycles.

/// A component that can be advanced one clock cycle at a time.
pub trait Tickable {
    /// Advance the component by one clock cycle.
    fn tick(&mut self);

    /// Advance the component by `count` cycles.
    ///
    /// Must produce identical results to calling `tick()` `count` times.
    fn tick_n(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }
}
