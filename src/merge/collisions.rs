use std::collections::HashMap;

/// Hands out zero-based repetition ordinals, first-seen order.
///
/// Build one per processing scope (one file, or one whole CSV pass) and drop
/// it afterwards; counts never carry over between scopes.
#[derive(Debug, Default)]
pub struct CollisionTracker {
    counts: HashMap<String, u32>,
}

impl CollisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for `key`, then bump it.
    pub fn next(&mut self, key: &str) -> u32 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        let ordinal = *count;
        *count += 1;
        ordinal
    }

    /// Key for scopes that span several files: identical identifiers in
    /// different files must stay independent.
    pub fn path_key(path: &str, identifier: &str) -> String {
        format!("{path}\0{identifier}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_first_seen_order() {
        let mut tracker = CollisionTracker::new();
        let ordinals: Vec<u32> = ["GREET", "GREET", "BYE"]
            .iter()
            .map(|id| tracker.next(id))
            .collect();
        assert_eq!(ordinals, vec![0, 1, 0]);
    }

    #[test]
    fn fresh_tracker_reproduces_ordinals() {
        let ids = ["A", "B", "A", "A", "B"];
        let run = || {
            let mut tracker = CollisionTracker::new();
            ids.iter().map(|id| tracker.next(id)).collect::<Vec<_>>()
        };
        assert_eq!(run(), vec![0, 0, 1, 2, 1]);
        assert_eq!(run(), run());
    }

    #[test]
    fn path_keys_keep_files_apart() {
        let mut tracker = CollisionTracker::new();
        let a = CollisionTracker::path_key("skits/a.text", "GREET");
        let b = CollisionTracker::path_key("skits/b.text", "GREET");
        assert_eq!(tracker.next(&a), 0);
        assert_eq!(tracker.next(&b), 0);
        assert_eq!(tracker.next(&a), 1);
    }
}
