//! Lexer for the C# subset understood by the reference parser.
//!
//! Built on the logos library. Unlike a compiler lexer, trivia (whitespace
//! and comments) is kept as ordinary tokens so the tree built from them
//! reproduces the source byte-for-byte.

use logos::Logos;

use super::token::{Span, SyntaxKind};

/// Logos-based token enum for lexing.
///
/// Used internally by logos; converted to [`SyntaxKind`] after lexing.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("using")]
    Using,
    #[token("namespace")]
    Namespace,
    #[token("class")]
    Class,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("internal")]
    Internal,
    #[token("static")]
    Static,
    #[token("readonly")]
    Readonly,
    #[token("async")]
    Async,
    #[token("override")]
    Override,
    #[token("virtual")]
    Virtual,
    #[token("abstract")]
    Abstract,
    #[token("sealed")]
    Sealed,
    #[token("void")]
    Void,
    #[token("var")]
    Var,
    #[token("new")]
    New,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("when")]
    When,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("foreach")]
    Foreach,
    #[token("in")]
    In,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("this")]
    This,
    #[token("await")]
    Await,
    #[token("is")]
    Is,
    #[token("as")]
    As,

    // Identifiers (must come after keywords); `@` escapes a keyword
    #[regex(r"@?[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+[uUlL]*")]
    #[regex(r"0[xX][0-9a-fA-F]+[uUlL]*")]
    IntLiteral,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"[0-9]+[fFdDmM]")]
    RealLiteral,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"\$"([^"\\\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    StringLiteral,

    #[regex(r"'([^'\\\n]|\\.)'")]
    CharLiteral,

    // Operators (longest first)
    #[token("??")]
    QuestionQuestion,
    #[token("?.")]
    QuestionDot,
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
}

impl LogosToken {
    fn kind(self) -> SyntaxKind {
        use LogosToken as L;
        use SyntaxKind as K;
        match self {
            L::Whitespace => K::Whitespace,
            L::LineComment => K::LineComment,
            L::BlockComment => K::BlockComment,
            L::Using => K::UsingKw,
            L::Namespace => K::NamespaceKw,
            L::Class => K::ClassKw,
            L::Public => K::PublicKw,
            L::Private => K::PrivateKw,
            L::Protected => K::ProtectedKw,
            L::Internal => K::InternalKw,
            L::Static => K::StaticKw,
            L::Readonly => K::ReadonlyKw,
            L::Async => K::AsyncKw,
            L::Override => K::OverrideKw,
            L::Virtual => K::VirtualKw,
            L::Abstract => K::AbstractKw,
            L::Sealed => K::SealedKw,
            L::Void => K::VoidKw,
            L::Var => K::VarKw,
            L::New => K::NewKw,
            L::Return => K::ReturnKw,
            L::Throw => K::ThrowKw,
            L::Try => K::TryKw,
            L::Catch => K::CatchKw,
            L::Finally => K::FinallyKw,
            L::When => K::WhenKw,
            L::If => K::IfKw,
            L::Else => K::ElseKw,
            L::While => K::WhileKw,
            L::Foreach => K::ForeachKw,
            L::In => K::InKw,
            L::True => K::TrueKw,
            L::False => K::FalseKw,
            L::Null => K::NullKw,
            L::This => K::ThisKw,
            L::Await => K::AwaitKw,
            L::Is => K::IsKw,
            L::As => K::AsKw,
            L::Ident => K::Ident,
            L::IntLiteral => K::IntLiteral,
            L::RealLiteral => K::RealLiteral,
            L::StringLiteral => K::StringLiteral,
            L::CharLiteral => K::CharLiteral,
            L::QuestionQuestion => K::QuestionQuestion,
            L::QuestionDot => K::QuestionDot,
            L::FatArrow => K::FatArrow,
            L::EqEq => K::EqEq,
            L::BangEq => K::BangEq,
            L::LtEq => K::LtEq,
            L::GtEq => K::GtEq,
            L::AmpAmp => K::AmpAmp,
            L::PipePipe => K::PipePipe,
            L::PlusEq => K::PlusEq,
            L::MinusEq => K::MinusEq,
            L::StarEq => K::StarEq,
            L::SlashEq => K::SlashEq,
            L::PlusPlus => K::PlusPlus,
            L::MinusMinus => K::MinusMinus,
            L::LParen => K::LParen,
            L::RParen => K::RParen,
            L::LBrace => K::LBrace,
            L::RBrace => K::RBrace,
            L::LBracket => K::LBracket,
            L::RBracket => K::RBracket,
            L::Semicolon => K::Semicolon,
            L::Comma => K::Comma,
            L::Dot => K::Dot,
            L::Colon => K::Colon,
            L::Question => K::Question,
            L::Eq => K::Eq,
            L::Lt => K::Lt,
            L::Gt => K::Gt,
            L::Plus => K::Plus,
            L::Minus => K::Minus,
            L::Star => K::Star,
            L::Slash => K::Slash,
            L::Percent => K::Percent,
            L::Bang => K::Bang,
            L::Amp => K::Amp,
            L::Pipe => K::Pipe,
        }
    }
}

/// Consume a block comment after its opening `/*`.
///
/// An unterminated comment runs to the end of input and is reported as an
/// error token.
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// A lexed token: its kind and where it sits in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexToken {
    pub kind: SyntaxKind,
    pub span: Span,
}

/// Tokenize `source` completely.
///
/// Never fails: characters logos cannot match become [`SyntaxKind::ErrorToken`]
/// tokens, so the concatenated token texts always equal `source`.
pub fn tokenize(source: &str) -> Vec<LexToken> {
    let mut lexer = LogosToken::lexer(source);
    let mut tokens: Vec<LexToken> = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let kind = match result {
            Ok(token) => token.kind(),
            Err(()) => SyntaxKind::ErrorToken,
        };
        let span = Span::new(range.start, range.end);

        // Merge runs of unknown characters into one error token
        if kind == SyntaxKind::ErrorToken {
            if let Some(last) = tokens.last_mut() {
                if last.kind == SyntaxKind::ErrorToken && last.span.end == span.start {
                    last.span.end = span.end;
                    continue;
                }
            }
        }

        tokens.push(LexToken { kind, span });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        tokenize(source)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("throw ex; throwable"),
            vec![
                SyntaxKind::ThrowKw,
                SyntaxKind::Ident,
                SyntaxKind::Semicolon,
                SyntaxKind::Ident
            ]
        );
    }

    #[test]
    fn test_member_chain() {
        assert_eq!(
            kinds("xs.Where(x => x > 1).First()"),
            vec![
                SyntaxKind::Ident,
                SyntaxKind::Dot,
                SyntaxKind::Ident,
                SyntaxKind::LParen,
                SyntaxKind::Ident,
                SyntaxKind::FatArrow,
                SyntaxKind::Ident,
                SyntaxKind::Gt,
                SyntaxKind::IntLiteral,
                SyntaxKind::RParen,
                SyntaxKind::Dot,
                SyntaxKind::Ident,
                SyntaxKind::LParen,
                SyntaxKind::RParen,
            ]
        );
    }

    #[test]
    fn test_trivia_is_kept() {
        let source = "a /* note */ // tail\n  b";
        let tokens = tokenize(source);
        let rebuilt: String = tokens.iter().map(|t| t.span.slice(source)).collect();
        assert_eq!(rebuilt, source);
        assert!(tokens.iter().any(|t| t.kind == SyntaxKind::BlockComment));
        assert!(tokens.iter().any(|t| t.kind == SyntaxKind::LineComment));
    }

    #[test]
    fn test_block_comment_forms() {
        for source in ["/**/", "/* a * b */", "/*** stars ***/", "/* x\n * y\n */"] {
            let tokens = tokenize(source);
            assert_eq!(tokens.len(), 1, "{:?}", source);
            assert_eq!(tokens[0].kind, SyntaxKind::BlockComment);
        }
        assert_eq!(
            kinds("a /* one */ / /* two */ b"),
            vec![SyntaxKind::Ident, SyntaxKind::Slash, SyntaxKind::Ident]
        );
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let source = "a /* open\n b";
        let tokens = tokenize(source);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, SyntaxKind::ErrorToken);
        assert_eq!(last.span.slice(source), "/* open\n b");
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(kinds(r#""a \"b\"""#), vec![SyntaxKind::StringLiteral]);
        assert_eq!(kinds(r#"@"c:\dir""""#), vec![SyntaxKind::StringLiteral]);
        assert_eq!(kinds(r#"$"{x}""#), vec![SyntaxKind::StringLiteral]);
        assert_eq!(kinds("'c'"), vec![SyntaxKind::CharLiteral]);
    }

    #[test]
    fn test_unknown_characters_become_one_error_token() {
        let source = "a ## b";
        let tokens = tokenize(source);
        let errors: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == SyntaxKind::ErrorToken)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.slice(source), "##");
    }
}
