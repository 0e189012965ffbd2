//! ObservationScope for scenario start/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` with elapsed time when `complete()` is called
//! - Logs `{name}_FAILED` via `fail()`, or on drop if never finished

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs begin and end events around one unit of work
///
/// ```ignore
/// let scope = ObservationScope::new("SCENARIO", &[("name", "between")]);
/// // ... run the scenario ...
/// scope.complete(&[("rows", "42")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    fields: Vec<(&'a str, String)>,
    started: Instant,
    finished: Cell<bool>,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started: Instant::now(),
            finished: Cell::new(false),
        }
    }

    fn base_fields(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    /// Logs `{name}_COMPLETE` with the scope's fields plus `extra`
    pub fn complete(self, extra: &[(&str, &str)]) {
        self.finished.set(true);
        let elapsed = self.started.elapsed().as_micros().to_string();
        let mut fields = self.base_fields();
        fields.extend(extra.iter().copied());
        fields.push(("elapsed_us", &elapsed));
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Logs `{name}_FAILED` at ERROR level
    pub fn fail(self, reason: &str) {
        self.finished.set(true);
        let mut fields = self.base_fields();
        fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.finished.get() {
            let mut fields = self.base_fields();
            fields.push(("reason", "scope dropped before completion"));
            Logger::error(&format!("{}_FAILED", self.name), &fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_marks_finished() {
        let scope = ObservationScope::new("TEST_SCOPE", &[("k", "v")]);
        assert!(!scope.finished.get());
        scope.complete(&[("rows", "1")]);
    }

    #[test]
    fn test_fail_consumes_scope() {
        let scope = ObservationScope::new("TEST_SCOPE", &[]);
        scope.fail("expected failure");
    }
}
