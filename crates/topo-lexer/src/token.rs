//! Token types for the topo lexer.

use topo_types::Span;
use std::fmt;

/// Reserved identifiers. The lexer emits a keyword token for each.
pub const ALL_KEYWORDS: &[&str] = &["import"];

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in the topo language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Unsigned decimal integer: `0`, `21`
    IntLit(u64),
    /// Double-quoted string with escapes resolved: `"172.17.0.0/18"`
    StringLiteral(String),

    // ── Names ────────────────────────────────────────────────

    /// `site1`, `appinfra`, `AppService`
    Identifier(String),
    /// `import`
    Import,

    // ── Punctuation ──────────────────────────────────────────

    /// `::`
    ColonColon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `=`
    Eq,
    /// `.`
    Dot,

    // ── Special ──────────────────────────────────────────────

    /// Statement separator.
    Newline,
    Eof,
}

impl TokenKind {
    /// Look up a reserved word; `None` for ordinary identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        match s {
            "import" => Some(TokenKind::Import),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::Import)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::StringLiteral(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Import => f.write_str("import"),
            TokenKind::ColonColon => f.write_str("::"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Eq => f.write_str("="),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword_recognises_all() {
        for kw in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(kw).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.to_string(), *kw);
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(TokenKind::from_keyword("Import"), None);
        assert_eq!(TokenKind::from_keyword("appinfra"), None);
    }

    #[test]
    fn test_display_punctuation() {
        let rendered: Vec<String> = [
            TokenKind::ColonColon,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Comma,
            TokenKind::Eq,
            TokenKind::Dot,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(rendered, ["::", "(", ")", ",", "=", "."]);
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(TokenKind::IntLit(21).to_string(), "21");
        assert_eq!(
            TokenKind::StringLiteral("10.0.0.0/8".into()).to_string(),
            "\"10.0.0.0/8\""
        );
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
