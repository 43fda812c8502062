//! Concurrent diagnostic collection.

use crossbeam::queue::SegQueue;

use super::rule::LintDiagnostic;

/// Append-only collection that rules running on any thread can push to.
///
/// Submissions arrive in no particular order; [`drain`](Self::drain) sorts
/// and de-duplicates once every matcher for the tree has finished.
#[derive(Default)]
pub struct DiagnosticSink {
    queue: SegQueue<LintDiagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: LintDiagnostic) {
        self.queue.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take everything submitted so far, ordered by position then rule code,
    /// with exact duplicates (same rule, span and message) removed.
    pub fn drain(&self) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::with_capacity(self.queue.len());
        while let Some(diagnostic) = self.queue.pop() {
            diagnostics.push(diagnostic);
        }
        diagnostics.sort_by(|a, b| {
            (a.span.start, a.span.end, a.code, &a.message)
                .cmp(&(b.span.start, b.span.end, b.code, &b.message))
        });
        diagnostics.dedup_by(|a, b| a.code == b.code && a.span == b.span && a.message == b.message);
        diagnostics
    }
}
