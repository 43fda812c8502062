//! Syntax kinds and source locations.
//!
//! A single [`SyntaxKind`] enum tags both tokens (leaves, which own source
//! text) and nodes (interior elements). Keeping them in one enum lets the
//! arena store tokens and nodes side by side and lets rules register for
//! either.

use std::fmt;

use serde::Serialize;

/// Kind tag for every element in a syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Trivia
    Whitespace,
    LineComment,
    BlockComment,

    // Literals and names
    Ident,
    IntLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,

    // Keywords
    UsingKw,
    NamespaceKw,
    ClassKw,
    PublicKw,
    PrivateKw,
    ProtectedKw,
    InternalKw,
    StaticKw,
    ReadonlyKw,
    AsyncKw,
    OverrideKw,
    VirtualKw,
    AbstractKw,
    SealedKw,
    VoidKw,
    VarKw,
    NewKw,
    ReturnKw,
    ThrowKw,
    TryKw,
    CatchKw,
    FinallyKw,
    WhenKw,
    IfKw,
    ElseKw,
    WhileKw,
    ForeachKw,
    InKw,
    TrueKw,
    FalseKw,
    NullKw,
    ThisKw,
    AwaitKw,
    IsKw,
    AsKw,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    /// `?.`, null-conditional member access.
    QuestionDot,
    Colon,
    Question,
    QuestionQuestion,
    FatArrow,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Amp,
    Pipe,
    AmpAmp,
    PipePipe,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PlusPlus,
    MinusMinus,

    /// Unrecognized character(s).
    ErrorToken,
    /// End of input (never stored in a tree).
    Eof,

    // Nodes
    CompilationUnit,
    UsingDirective,
    NamespaceDeclaration,
    ClassDeclaration,
    MethodDeclaration,
    FieldDeclaration,
    PropertyDeclaration,
    AccessorList,
    Accessor,
    ParameterList,
    Parameter,
    TypeRef,
    Block,
    LocalDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    ReturnStatement,
    ThrowStatement,
    IfStatement,
    ElseClause,
    WhileStatement,
    ForEachStatement,
    TryStatement,
    CatchClause,
    CatchDeclaration,
    CatchFilter,
    FinallyClause,
    EmptyStatement,
    Invocation,
    MemberAccess,
    ElementAccess,
    ArgumentList,
    Argument,
    IdentifierName,
    Literal,
    ParenthesizedExpression,
    BinaryExpression,
    PrefixUnary,
    PostfixUnary,
    Assignment,
    ObjectCreation,
    SimpleLambda,
    ParenthesizedLambda,
    /// A region the parser could not make sense of.
    Error,
}

impl SyntaxKind {
    /// Whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace | SyntaxKind::LineComment | SyntaxKind::BlockComment
        )
    }

    /// Returns true if this kind is a leaf (owns text).
    pub fn is_token(self) -> bool {
        self <= SyntaxKind::Eof
    }

    /// Returns true if this kind is an interior node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this token is a declaration modifier.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::InternalKw
                | SyntaxKind::StaticKw
                | SyntaxKind::ReadonlyKw
                | SyntaxKind::AsyncKw
                | SyntaxKind::OverrideKw
                | SyntaxKind::VirtualKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::SealedKw
        )
    }

    /// Returns true if this token is a literal.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntLiteral
                | SyntaxKind::RealLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
        )
    }

    /// Returns true for statement nodes.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::LocalDeclaration
                | SyntaxKind::ExpressionStatement
                | SyntaxKind::ReturnStatement
                | SyntaxKind::ThrowStatement
                | SyntaxKind::IfStatement
                | SyntaxKind::WhileStatement
                | SyntaxKind::ForEachStatement
                | SyntaxKind::TryStatement
                | SyntaxKind::EmptyStatement
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Byte range in the source text, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Returns true if `other` lies entirely within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Maps byte offsets to line/column positions.
///
/// Columns count characters, not bytes, so multi-byte identifiers report
/// the column an editor would show.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Line/column of `offset` within `text` (the same text the index was built from).
    pub fn line_col(&self, text: &str, offset: usize) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let end = offset.min(text.len());
        let column = text[line_start..end].chars().count();
        LineCol {
            line: line as u32 + 1,
            column: column as u32 + 1,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
