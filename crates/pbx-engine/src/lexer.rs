//! Whitespace tokenizer.
//!
//! The language has no quoting, escapes or comments: a token is any maximal
//! run of non-whitespace characters. Tokens are case-folded here so later
//! stages only ever see lowercase text.

/// One case-folded token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercased token text.
    pub text: String,
    /// Position in the token stream.
    pub index: usize,
    /// 1-based source line.
    pub line: usize,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

/// Splits program text into case-folded tokens.
///
/// # Example
///
/// ```rust
/// use pbx_engine::lexer::tokenize;
///
/// let tokens = tokenize("R + 0.1\nG\tSQRT g");
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["r", "+", "0.1", "g", "sqrt", "g"]);
/// assert_eq!(tokens[3].line, 2);
/// ```
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut start: Option<(usize, usize)> = None;

    for (offset, ch) in source.char_indices() {
        if ch.is_whitespace() {
            if let Some((begin, begin_line)) = start.take() {
                push_token(&mut tokens, &source[begin..offset], begin, begin_line);
            }
            if ch == '\n' {
                line += 1;
            }
        } else if start.is_none() {
            start = Some((offset, line));
        }
    }
    if let Some((begin, begin_line)) = start {
        push_token(&mut tokens, &source[begin..], begin, begin_line);
    }

    tokens
}

fn push_token(tokens: &mut Vec<Token>, raw: &str, offset: usize, line: usize) {
    tokens.push(Token {
        text: raw.to_lowercase(),
        index: tokens.len(),
        line,
        offset,
    });
}
