//! Hands out ascending, unused numeric names during one run.

use std::collections::HashSet;

/// The run-local counter.
///
/// Every name returned is strictly larger than the one before it, is not
/// present on disk according to the probe, and has not been handed out
/// earlier in the same run.
#[derive(Debug)]
pub struct NumberAllocator {
    next: u64,
    claimed: HashSet<String>,
}

impl NumberAllocator {
    /// Start counting at `max_num + 1`
    pub fn seeded_from(max_num: u64) -> Self {
        Self {
            next: max_num + 1,
            claimed: HashSet::new(),
        }
    }

    /// The number the next search starts from
    pub fn next_number(&self) -> u64 {
        self.next
    }

    /// Claim the smallest free `<n><extension>` with `n >= next_number()`.
    ///
    /// `exists` reports whether a file name is already taken on disk.
    pub fn claim<F>(&mut self, extension: &str, exists: F) -> (u64, String)
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let candidate = self.next;
            let name = format!("{}{}", candidate, extension);
            self.next += 1;

            if self.claimed.contains(&name) || exists(&name) {
                tracing::debug!(candidate = %name, "candidate taken, advancing");
                continue;
            }

            self.claimed.insert(name.clone());
            return (candidate, name);
        }
    }
}
