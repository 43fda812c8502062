//! Parser guards against runaway loops and unbounded recursion.

use super::ParseError;
use crate::syntax::token::Span;

/// Maximum iterations for any parser loop before it gives up.
const MAX_LOOP_ITERATIONS: usize = 100_000;

/// Maximum nesting of expressions and statements.
///
/// Deeper input is wrapped in an `Error` node instead of recursing further,
/// which keeps the parser well inside the default test-thread stack.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Guard against infinite loops in the parser.
///
/// ```ignore
/// let mut guard = LoopGuard::new("block_statements");
/// while !p.at(SyntaxKind::RBrace) {
///     if guard.check(p.current_span()).is_err() { break; }
///     // ... parse something ...
/// }
/// ```
pub struct LoopGuard {
    name: &'static str,
    count: usize,
    max: usize,
}

impl LoopGuard {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self::with_limit(name, MAX_LOOP_ITERATIONS)
    }

    #[inline]
    pub fn with_limit(name: &'static str, max: usize) -> Self {
        Self { name, count: 0, max }
    }

    /// Count one iteration; errors once the limit is passed.
    #[inline]
    pub fn check(&mut self, span: Span) -> Result<(), ParseError> {
        self.count += 1;
        if self.count > self.max {
            return Err(ParseError::LimitExceeded {
                message: format!("loop '{}' exceeded {} iterations", self.name, self.max),
                span,
            });
        }
        Ok(())
    }
}
