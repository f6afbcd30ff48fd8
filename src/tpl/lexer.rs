use crate::tpl::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Literal text between delimited spans, kept verbatim.
    Text(String),
    /// `{{ expr }}`, holding the trimmed expression text.
    Output(String),
    /// `{% keyword args %}`
    Directive { keyword: String, args: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Splits template source into text, output and directive tokens.
///
/// A delimited span runs from `{{` (or `{%`) to the first `}}` (or `%}`) on
/// the same line. Anything else, including unbalanced delimiters, stays text.
/// Whitespace-only text between spans is dropped.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos + 1 < bytes.len() {
        if bytes[pos] == b'{' {
            let close = match bytes[pos + 1] {
                b'{' => Some("}}"),
                b'%' => Some("%}"),
                _ => None,
            };
            if let Some(end) = close.and_then(|c| find_close(source, pos + 2, c)) {
                push_text(&mut tokens, source, text_start, pos);
                tokens.push(delimited(source, Span::new(pos, end)));
                pos = end;
                text_start = end;
                continue;
            }
        }
        pos += 1;
    }
    push_text(&mut tokens, source, text_start, source.len());
    tokens
}

fn find_close(source: &str, from: usize, close: &str) -> Option<usize> {
    let rest = &source[from..];
    let line_end = rest.find(['\n', '\r']).unwrap_or(rest.len());
    rest[..line_end].find(close).map(|i| from + i + close.len())
}

fn push_text(tokens: &mut Vec<Token>, source: &str, start: usize, end: usize) {
    let text = &source[start..end];
    if !text.trim().is_empty() {
        tokens.push(Token {
            kind: TokenKind::Text(text.to_string()),
            span: Span::new(start, end),
        });
    }
}

fn delimited(source: &str, span: Span) -> Token {
    let raw = &source[span.range()];
    let inner = raw[2..raw.len() - 2].trim();
    let kind = if raw.starts_with("{{") {
        TokenKind::Output(inner.to_string())
    } else {
        let (keyword, args) = inner
            .split_once(char::is_whitespace)
            .map_or((inner, ""), |(k, a)| (k, a.trim()));
        TokenKind::Directive {
            keyword: keyword.to_string(),
            args: args.to_string(),
        }
    };
    Token { kind, span }
}
