//! Recursive-descent parser for a C# subset.
//!
//! The parser turns a token stream into green-tree build events. It never
//! fails: anything it cannot make sense of is wrapped in an `Error` node and
//! reported as a [`ParseError`], and the resulting tree always renders back
//! to the exact input text.
//!
//! Trivia handling: whitespace and comments are held back and attached to
//! whichever node is open when the next significant token or node starts.
//! Closing a node never pulls pending trivia in, so no node except the root
//! starts or ends with trivia.

mod expr;
mod guards;
mod recovery;
mod stmt;

use thiserror::Error;
use tracing::trace;

use super::lexer::{tokenize, LexToken};
use super::make::{Checkpoint, GreenBuilder};
use super::token::{Span, SyntaxKind};
use super::tree::SyntaxTree;

pub use guards::MAX_PARSE_DEPTH;

/// A problem found while parsing. Parsing continues past every error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A specific token was required.
    #[error("expected {expected}, found {found}")]
    Expected {
        /// What the grammar needed at this point.
        expected: String,
        /// What was actually there.
        found: SyntaxKind,
        /// Location of the offending token.
        span: Span,
    },

    /// Characters the lexer could not classify.
    #[error("unrecognized input '{text}'")]
    InvalidToken {
        /// The raw text.
        text: String,
        /// Location.
        span: Span,
    },

    /// Nesting or loop limit exceeded.
    #[error("{message}")]
    LimitExceeded {
        /// Which limit was hit.
        message: String,
        /// Where parsing gave up.
        span: Span,
    },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::InvalidToken { span, .. }
            | ParseError::LimitExceeded { span, .. } => *span,
        }
    }
}

/// Result of parsing one source text.
#[derive(Debug)]
pub struct Parse {
    /// The tree; present even when `errors` is not empty.
    pub tree: SyntaxTree,
    /// Errors in source order.
    pub errors: Vec<ParseError>,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse `source` into a lossless syntax tree.
pub fn parse(source: &str) -> Parse {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.compilation_unit();
    let Parser {
        builder, mut errors, ..
    } = parser;

    errors.sort_by_key(|e| e.span().start);
    let tree = SyntaxTree::new(builder.finish());
    trace!(nodes = tree.len(), errors = errors.len(), "parsed source");
    Parse { tree, errors }
}

pub(crate) struct Parser<'s> {
    source: &'s str,
    tokens: Vec<LexToken>,
    /// Index of the next unconsumed token, trivia included.
    pos: usize,
    builder: GreenBuilder,
    errors: Vec<ParseError>,
    depth: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, tokens: Vec<LexToken>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            builder: GreenBuilder::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    // ---- Lookahead ----

    /// Index of the `n`th significant token at or after `pos`.
    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .nth(n)
            .map(|(i, _)| self.pos + i)
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n)
            .map(|i| self.tokens[i].kind)
            .unwrap_or(SyntaxKind::Eof)
    }

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(SyntaxKind::Eof)
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.nth_index(0) {
            Some(i) => self.tokens[i].span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    /// Raw position, used by loops to detect lack of progress.
    pub(crate) fn position(&self) -> usize {
        self.nth_index(0).unwrap_or(self.tokens.len())
    }

    // ---- Consuming ----

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            let text = token.span.slice(self.source);
            self.builder.token(token.kind, text);
            self.pos += 1;
        }
    }

    /// Consume the current significant token (with any trivia before it).
    pub(crate) fn bump(&mut self) {
        self.flush_trivia();
        let Some(&token) = self.tokens.get(self.pos) else {
            return;
        };
        if token.kind == SyntaxKind::ErrorToken {
            self.errors.push(ParseError::InvalidToken {
                text: token.span.slice(self.source).to_string(),
                span: token.span,
            });
        }
        self.builder.token(token.kind, token.span.slice(self.source));
        self.pos += 1;
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record an error; never skips anything.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_expected(describe(kind));
        false
    }

    pub(crate) fn error_expected(&mut self, expected: impl Into<String>) {
        let err = ParseError::Expected {
            expected: expected.into(),
            found: self.current(),
            span: self.current_span(),
        };
        // One error per position is enough.
        if self.errors.last().map(ParseError::span) != Some(err.span()) {
            self.errors.push(err);
        }
    }

    /// Record an error and wrap the current token in an `Error` node.
    pub(crate) fn bump_error(&mut self, expected: &str) {
        self.error_expected(expected);
        if self.at_eof() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    // ---- Tree events ----

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    pub(crate) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    /// Run `f` one nesting level deeper, or skip a balanced group when the
    /// depth limit is reached.
    pub(crate) fn with_depth(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        if self.depth >= MAX_PARSE_DEPTH {
            self.errors.push(ParseError::LimitExceeded {
                message: format!("maximum nesting depth ({}) exceeded", MAX_PARSE_DEPTH),
                span: self.current_span(),
            });
            let before = self.position();
            recovery::skip_balanced(self);
            return self.position() != before;
        }
        self.depth += 1;
        let parsed = f(self);
        self.depth -= 1;
        parsed
    }

    // ---- Top level ----

    fn compilation_unit(&mut self) {
        self.builder.start_node(SyntaxKind::CompilationUnit);
        self.declarations(false);
        self.flush_trivia();
        self.builder.finish_node();
    }

    /// Declarations until end of input, or until `}` when `in_block`.
    fn declarations(&mut self, in_block: bool) {
        let mut guard = guards::LoopGuard::new("declarations");
        loop {
            if self.at_eof() || (in_block && self.at(SyntaxKind::RBrace)) {
                break;
            }
            if let Err(err) = guard.check(self.current_span()) {
                self.errors.push(err);
                break;
            }
            let before = self.position();
            match self.current() {
                SyntaxKind::UsingKw => self.using_directive(),
                SyntaxKind::NamespaceKw => self.namespace_declaration(),
                SyntaxKind::RBrace => self.bump_error("declaration"),
                _ => self.type_or_member(),
            }
            if self.position() == before {
                self.bump_error("declaration");
            }
        }
    }

    fn using_directive(&mut self) {
        self.start_node(SyntaxKind::UsingDirective);
        self.bump();
        self.eat(SyntaxKind::StaticKw);
        self.qualified_name_tokens();
        if self.eat(SyntaxKind::Eq) {
            self.qualified_name_tokens();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn namespace_declaration(&mut self) {
        self.start_node(SyntaxKind::NamespaceDeclaration);
        self.bump();
        self.qualified_name_tokens();
        if self.eat(SyntaxKind::Semicolon) {
            // File-scoped: everything that follows belongs to it.
            self.declarations(false);
        } else if self.expect(SyntaxKind::LBrace) {
            self.declarations(true);
            self.expect(SyntaxKind::RBrace);
        }
        self.finish_node();
    }

    /// `A.B.C` as bare tokens.
    fn qualified_name_tokens(&mut self) {
        if !self.eat(SyntaxKind::Ident) {
            self.error_expected("name");
            return;
        }
        while self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Ident {
            self.bump();
            self.bump();
        }
    }

    /// A class, or a member inside a class body.
    fn type_or_member(&mut self) {
        let checkpoint = self.checkpoint();
        while self.current().is_modifier() {
            self.bump();
        }

        if self.at(SyntaxKind::ClassKw) {
            self.start_node_at(checkpoint, SyntaxKind::ClassDeclaration);
            self.class_rest();
            self.finish_node();
            return;
        }

        // Constructor: `Name(`
        if self.at(SyntaxKind::Ident) && self.nth(1) == SyntaxKind::LParen {
            self.start_node_at(checkpoint, SyntaxKind::MethodDeclaration);
            self.bump();
            self.method_rest();
            self.finish_node();
            return;
        }

        if self.scan_type(0).is_none() {
            recovery::sync_to_declaration_boundary(self);
            return;
        }
        let kind = match self.scan_type(0).map(|n| (self.nth(n), self.nth(n + 1))) {
            Some((SyntaxKind::Ident, SyntaxKind::LParen)) => SyntaxKind::MethodDeclaration,
            Some((SyntaxKind::Ident, SyntaxKind::LBrace | SyntaxKind::FatArrow)) => {
                SyntaxKind::PropertyDeclaration
            }
            _ => SyntaxKind::FieldDeclaration,
        };
        self.start_node_at(checkpoint, kind);
        self.type_ref();
        match kind {
            SyntaxKind::MethodDeclaration => {
                self.bump();
                self.method_rest();
            }
            SyntaxKind::PropertyDeclaration => {
                self.bump();
                self.property_rest();
            }
            _ => {
                self.variable_declarators();
                self.expect(SyntaxKind::Semicolon);
            }
        }
        self.finish_node();
    }

    /// `{ get; set; } [= init;]` or `=> expr;`, after the property name.
    fn property_rest(&mut self) {
        if self.eat(SyntaxKind::FatArrow) {
            self.expression();
            self.expect(SyntaxKind::Semicolon);
            return;
        }

        self.start_node(SyntaxKind::AccessorList);
        self.bump();
        let mut guard = guards::LoopGuard::new("accessors");
        while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            let before = self.position();
            self.accessor();
            if self.position() == before {
                self.bump_error("accessor");
            }
        }
        self.expect(SyntaxKind::RBrace);
        self.finish_node();

        if self.eat(SyntaxKind::Eq) {
            self.expression();
            self.expect(SyntaxKind::Semicolon);
        }
    }

    /// `get;`, `private set { .. }`, `get => expr;`
    fn accessor(&mut self) {
        if !self.current().is_modifier() && !self.at(SyntaxKind::Ident) {
            return;
        }
        self.start_node(SyntaxKind::Accessor);
        while self.current().is_modifier() {
            self.bump();
        }
        self.expect(SyntaxKind::Ident);
        match self.current() {
            SyntaxKind::LBrace => self.block(),
            SyntaxKind::FatArrow => {
                self.bump();
                self.expression();
                self.expect(SyntaxKind::Semicolon);
            }
            _ => {
                self.expect(SyntaxKind::Semicolon);
            }
        }
        self.finish_node();
    }

    fn class_rest(&mut self) {
        self.bump();
        self.expect(SyntaxKind::Ident);
        if self.eat(SyntaxKind::Colon) {
            self.type_ref();
            while self.eat(SyntaxKind::Comma) {
                self.type_ref();
            }
        }
        if self.expect(SyntaxKind::LBrace) {
            self.declarations(true);
            self.expect(SyntaxKind::RBrace);
        }
    }

    /// Parameter list and body, after the method name.
    fn method_rest(&mut self) {
        self.parameter_list();
        match self.current() {
            SyntaxKind::LBrace => self.block(),
            SyntaxKind::FatArrow => {
                self.bump();
                self.expression();
                self.expect(SyntaxKind::Semicolon);
            }
            _ => {
                self.expect(SyntaxKind::Semicolon);
            }
        }
    }

    fn parameter_list(&mut self) {
        self.start_node(SyntaxKind::ParameterList);
        self.expect(SyntaxKind::LParen);
        let mut guard = guards::LoopGuard::new("parameters");
        while !self.at(SyntaxKind::RParen) && !self.at_eof() {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            let before = self.position();
            self.parameter();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
            if self.position() == before {
                break;
            }
        }
        self.expect(SyntaxKind::RParen);
        self.finish_node();
    }

    /// `Type name [= default]` or, in lambdas, just `name`.
    pub(crate) fn parameter(&mut self) {
        self.start_node(SyntaxKind::Parameter);
        let typed = self
            .scan_type(0)
            .is_some_and(|n| self.nth(n) == SyntaxKind::Ident);
        if typed {
            self.type_ref();
        }
        self.expect(SyntaxKind::Ident);
        if self.eat(SyntaxKind::Eq) {
            self.expression();
        }
        self.finish_node();
    }

    /// `a = 1, b` after a type.
    pub(crate) fn variable_declarators(&mut self) {
        let mut guard = guards::LoopGuard::new("declarators");
        loop {
            if guard.check(self.current_span()).is_err() {
                break;
            }
            self.start_node(SyntaxKind::VariableDeclarator);
            self.expect(SyntaxKind::Ident);
            if self.eat(SyntaxKind::Eq) {
                self.expression();
            }
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }

    // ---- Types ----

    /// Lookahead: if a type starts at significant token `n`, the index just
    /// past it.
    pub(crate) fn scan_type(&self, mut n: usize) -> Option<usize> {
        match self.nth(n) {
            SyntaxKind::VarKw | SyntaxKind::VoidKw => return Some(n + 1),
            SyntaxKind::Ident => n += 1,
            _ => return None,
        }
        while self.nth(n) == SyntaxKind::Dot && self.nth(n + 1) == SyntaxKind::Ident {
            n += 2;
        }
        if self.nth(n) == SyntaxKind::Lt {
            n += 1;
            loop {
                n = self.scan_type(n)?;
                match self.nth(n) {
                    SyntaxKind::Comma => n += 1,
                    SyntaxKind::Gt => {
                        n += 1;
                        break;
                    }
                    _ => return None,
                }
            }
        }
        while self.nth(n) == SyntaxKind::LBracket && self.nth(n + 1) == SyntaxKind::RBracket {
            n += 2;
        }
        if self.nth(n) == SyntaxKind::Question {
            n += 1;
        }
        Some(n)
    }

    pub(crate) fn type_ref(&mut self) {
        let Some(end) = self.scan_type(0) else {
            self.error_expected("type");
            return;
        };
        self.start_node(SyntaxKind::TypeRef);
        for _ in 0..end {
            self.bump();
        }
        self.finish_node();
    }
}

/// Human-readable token name for error messages.
fn describe(kind: SyntaxKind) -> String {
    let text = match kind {
        SyntaxKind::LParen => "'('",
        SyntaxKind::RParen => "')'",
        SyntaxKind::LBrace => "'{'",
        SyntaxKind::RBrace => "'}'",
        SyntaxKind::LBracket => "'['",
        SyntaxKind::RBracket => "']'",
        SyntaxKind::Semicolon => "';'",
        SyntaxKind::Comma => "','",
        SyntaxKind::FatArrow => "'=>'",
        SyntaxKind::Ident => "identifier",
        SyntaxKind::InKw => "'in'",
        _ => return format!("{:?}", kind),
    };
    text.to_string()
}
