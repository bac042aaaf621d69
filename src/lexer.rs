//! Tokenizer shared by the C# and JSON extractors.
//!
//! Tokens come from the ECMAScript lexer of `swc_ecma_parser`, which covers
//! the part of C# and JSON that extraction needs: names, numbers, quoted
//! strings and punctuators. Comments and whitespace are skipped, tokens the
//! lexer rejects are dropped.

use strum_macros::{Display, EnumIs};
use swc_common::{
    BytePos, FileName, FilePathMapping, GLOBALS, Globals, SourceMap, Span,
};
use swc_ecma_ast::{Expr, Lit};
use swc_ecma_parser::{Parser, StringInput, Syntax, lexer::Lexer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Operator,
    Name,
    String,
    Number,
}

/// A token of the tokenized source.
///
/// `value` is the source text of the token, except for strings, which are
/// unquoted with their escapes resolved. `line` is the 1-based line, on which
/// the token starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
}

fn syntax() -> Syntax {
    Syntax::Es(Default::default())
}

fn classify(text: &str) -> Option<TokenKind> {
    let mut chars = text.chars();

    Some(match chars.next()? {
        '"' | '\'' => TokenKind::String,
        '0'..='9' => TokenKind::Number,
        '.' if chars.next().is_some_and(|c| c.is_ascii_digit()) => {
            TokenKind::Number
        }
        c if c.is_alphabetic() || c == '_' || c == '$' => TokenKind::Name,
        _ => TokenKind::Operator,
    })
}

fn span_text(src: &str, start: BytePos, span: Span) -> Option<&str> {
    let lo = span.lo.0.checked_sub(start.0)? as usize;
    let hi = span.hi.0.checked_sub(start.0)? as usize;
    src.get(lo..hi)
}

/// Parses a single string literal. Must run inside [`GLOBALS`].
fn cook_string(raw: &str, start: BytePos) -> Option<String> {
    let end = BytePos(start.0.checked_add(u32::try_from(raw.len()).ok()?)?);
    let mut parser =
        Parser::new(syntax(), StringInput::new(raw, start, end), None);

    match *parser.parse_expr().ok()? {
        Expr::Lit(Lit::Str(string)) => {
            Some(string.value.to_string_lossy().to_string())
        }
        _ => None,
    }
}

/// Tokenizes `source`. Lines start at 1, `\r\n` and `\n` each end a line.
///
/// # Example
/// ```
/// use babel_thrive::{TokenKind, tokenize};
///
/// let tokens = tokenize("Tr(\"Hi\\tthere\");");
///
/// assert_eq!(tokens[2].kind, TokenKind::String);
/// assert_eq!(tokens[2].value, "Hi\tthere");
/// ```
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    GLOBALS.set(&Globals::new(), || {
        let source_map = SourceMap::new(FilePathMapping::empty());
        let file = source_map
            .new_source_file(FileName::Anon.into(), source.to_owned());
        let start = file.start_pos;

        let lexer = Lexer::new(
            syntax(),
            Default::default(),
            StringInput::from(&*file),
            None,
        );

        lexer
            .filter_map(|token| {
                let text = span_text(&file.src, start, token.span)?;
                let kind = classify(text)?;

                let value = if kind.is_string() {
                    cook_string(text, token.span.lo)?
                } else {
                    text.to_owned()
                };

                Some(Token {
                    kind,
                    value,
                    line: source_map.lookup_char_pos(token.span.lo).line,
                })
            })
            .collect()
    })
}

/// Turns a raw quoted string literal into its logical text.
///
/// Escapes are resolved the way ECMAScript does it. Returns [`None`], if
/// `raw` isn't a complete string literal.
///
/// # Example
/// ```
/// use babel_thrive::unquote_string;
///
/// assert_eq!(
///     unquote_string(r#""Hello,\n\"World\"""#).as_deref(),
///     Some("Hello,\n\"World\"")
/// );
/// assert_eq!(unquote_string("Hello"), None);
/// ```
#[must_use]
pub fn unquote_string(raw: &str) -> Option<String> {
    GLOBALS.set(&Globals::new(), || cook_string(raw, BytePos(1)))
}
