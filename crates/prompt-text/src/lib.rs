//! Quote-aware command-line tokenizer.
//!
//! Splits a raw command-line string into [`Token`]s that remember their exact
//! source byte range, so downstream matching and styling can map back onto
//! the original text without re-deriving positions.

/// How a token was quoted in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteType {
    None,
    Single,
    Double,
}

/// A single token produced by [`tokenize`].
///
/// `raw` is the exact source substring (including any quotes); `value` is
/// the unescaped/unquoted content. `source[start..end] == raw` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub raw: String,
    pub start: usize,
    pub end: usize,
    pub quote_type: QuoteType,
}

impl Token {
    pub fn is_quoted(&self) -> bool {
        self.quote_type != QuoteType::None
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_at(&self, offset_chars: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset_chars)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }
}

/// Tokenize a raw command-line string. Total: never fails, even on an
/// unterminated quoted string (which consumes to end of input).
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(text);
    let mut tokens = Vec::new();

    loop {
        scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }
        tokens.push(parse_token(&mut scanner));
    }

    tokens
}

fn parse_token(scanner: &mut Scanner<'_>) -> Token {
    let start = scanner.pos;
    match scanner.peek() {
        Some('"') => parse_quoted(scanner, start, '"'),
        Some('\'') => parse_quoted(scanner, start, '\''),
        _ => parse_unquoted(scanner, start),
    }
}

fn parse_quoted(scanner: &mut Scanner<'_>, start: usize, quote_char: char) -> Token {
    scanner.advance(); // opening quote
    let mut value = String::new();

    while let Some(c) = scanner.peek() {
        if c == '\\' {
            if let Some(next) = scanner.peek_at(1) {
                if next == quote_char || next == '\\' {
                    scanner.advance();
                    scanner.advance();
                    value.push(next);
                    continue;
                }
            }
            scanner.advance();
            value.push('\\');
        } else if c == quote_char {
            scanner.advance();
            break;
        } else {
            scanner.advance();
            value.push(c);
        }
    }

    let end = scanner.pos;
    let raw = scanner.text[start..end].to_string();
    let quote_type = if quote_char == '"' {
        QuoteType::Double
    } else {
        QuoteType::Single
    };

    Token {
        value,
        raw,
        start,
        end,
        quote_type,
    }
}

fn parse_unquoted(scanner: &mut Scanner<'_>, start: usize) -> Token {
    let mut value = String::new();
    let mut has_embedded_quote = false;
    let mut embedded_quote_char: Option<char> = None;

    while let Some(c) = scanner.peek() {
        if c == ' ' || c == '\t' {
            break;
        }

        if c == '\\' {
            if let Some(next) = scanner.peek_at(1) {
                if matches!(next, ' ' | '\t' | '\\' | '\'' | '"') {
                    scanner.advance();
                    scanner.advance();
                    value.push(next);
                    continue;
                }
            }
            scanner.advance();
            value.push('\\');
        } else if c == '"' || c == '\'' {
            has_embedded_quote = true;
            let quote_char = c;
            embedded_quote_char = Some(quote_char);
            scanner.advance(); // opening quote

            while let Some(inner) = scanner.peek() {
                if inner == '\\' {
                    if let Some(next) = scanner.peek_at(1) {
                        if next == quote_char || next == '\\' {
                            scanner.advance();
                            scanner.advance();
                            value.push(next);
                            continue;
                        }
                    }
                    scanner.advance();
                    value.push('\\');
                } else if inner == quote_char {
                    scanner.advance();
                    break;
                } else {
                    scanner.advance();
                    value.push(inner);
                }
            }
        } else {
            scanner.advance();
            value.push(c);
        }
    }

    let end = scanner.pos;
    let raw = scanner.text[start..end].to_string();

    let quote_type = if has_embedded_quote {
        match embedded_quote_char {
            Some('"') => QuoteType::Double,
            Some('\'') => QuoteType::Single,
            _ => QuoteType::None,
        }
    } else {
        QuoteType::None
    };

    Token {
        value,
        raw,
        start,
        end,
        quote_type,
    }
}

/// Join tokens' raw source substrings with single spaces. Not injective when
/// whitespace was collapsed during tokenization; useful as a diagnostic aid.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.raw.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

const SPECIAL_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '"', '\'', '\\', '$', '`', '!', '|', '&', ';', '(', ')', '<', '>',
];

/// Whether a value requires quoting to round-trip through [`rebuild_command`].
pub fn needs_quoting(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    value.chars().any(|c| SPECIAL_CHARS.contains(&c))
}

/// Rebuild a command line from tokens' unescaped `value`s, applying minimal
/// quoting: double quotes preferred, single quotes if the value contains a
/// double quote, and backslash-escaped double quotes as a last resort.
pub fn rebuild_command(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| quote_value(&t.value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_value(value: &str) -> String {
    if !needs_quoting(value) {
        return value.to_string();
    }
    if !value.contains('"') {
        format!("\"{value}\"")
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn simple_split() {
        let tokens = tokenize("gcc -I/tmp/foo -o test main.c");
        assert_eq!(
            values(&tokens),
            vec!["gcc", "-I/tmp/foo", "-o", "test", "main.c"]
        );
    }

    #[test]
    fn embedded_quote_value() {
        let tokens = tokenize(r#"gcc -DNAME="hello world" main.c"#);
        assert_eq!(values(&tokens), vec!["gcc", "-DNAME=hello world", "main.c"]);
        assert_eq!(tokens[1].quote_type, QuoteType::Double);
        assert!(tokens[1].raw.contains('"'));
    }

    #[test]
    fn fully_quoted_token() {
        let tokens = tokenize(r#"echo 'hello world'"#);
        assert_eq!(values(&tokens), vec!["echo", "hello world"]);
        assert_eq!(tokens[1].quote_type, QuoteType::Single);
    }

    #[test]
    fn escaped_space_in_unquoted_token() {
        let tokens = tokenize(r"foo\ bar baz");
        assert_eq!(values(&tokens), vec!["foo bar", "baz"]);
    }

    #[test]
    fn unterminated_quote_consumes_to_end() {
        let tokens = tokenize(r#"gcc "unterminated"#);
        assert_eq!(values(&tokens), vec!["gcc", "unterminated"]);
    }

    #[test]
    fn position_fidelity() {
        let text = "gcc -I/tmp/foo -o test main.c";
        for token in tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.raw);
        }
    }

    #[test]
    fn exact_round_trip_without_collapsing() {
        let text = "gcc -I/tmp/foo -o test main.c";
        let tokens = tokenize(text);
        assert_eq!(detokenize(&tokens), text);
    }

    #[test]
    fn rebuild_quotes_values_with_spaces() {
        let tokens = tokenize(r#"gcc -DNAME="hello world" main.c"#);
        assert_eq!(
            rebuild_command(&tokens),
            r#"gcc "-DNAME=hello world" main.c"#
        );
    }

    #[test]
    fn needs_quoting_detects_empty_and_special() {
        assert!(needs_quoting(""));
        assert!(needs_quoting("a b"));
        assert!(needs_quoting("a;b"));
        assert!(!needs_quoting("main.c"));
    }
}
