//! Cooperative cancellation flag shared between a caller and a backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::Interrupt;

    #[test]
    fn clones_share_state() {
        let interrupt = Interrupt::new();
        let seen_by_backend = interrupt.clone();
        assert!(!seen_by_backend.is_triggered());
        interrupt.trigger();
        assert!(seen_by_backend.is_triggered());
    }
}
