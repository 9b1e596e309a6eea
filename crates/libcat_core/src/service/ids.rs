//! Id generators for in-memory services.

/// Source of fresh record ids.
pub trait IdGenerator {
    /// Returns the next id. Implementations never repeat a value.
    fn next_id(&mut self) -> i64;
}

/// Counter that hands out `first, first + 1, ...`.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    next: i64,
}

impl SequentialIdGenerator {
    /// Starts counting at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: i64) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl<F: FnMut() -> i64> IdGenerator for F {
    fn next_id(&mut self) -> i64 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, SequentialIdGenerator};

    #[test]
    fn sequential_ids_start_at_one_and_increase() {
        let mut ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn closures_act_as_generators() {
        let mut next = 100;
        let mut ids = move || {
            next += 10;
            next
        };
        assert_eq!(ids.next_id(), 110);
        assert_eq!(ids.next_id(), 120);
    }
}
