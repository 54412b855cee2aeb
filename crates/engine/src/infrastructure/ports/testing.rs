//! Testability ports for injecting randomness.

/// Source of die rolls. Production wires a thread-local RNG; tests wire a
/// scripted sequence so every roll is deterministic.
pub trait RandomPort: Send + Sync {
    /// A uniform value in the inclusive range [min, max].
    fn gen_range(&self, min: i32, max: i32) -> i32;
}
