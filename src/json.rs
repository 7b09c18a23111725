//! Flat JSON tokenizer.
//!
//! Produces tokens in pre-order: a container token is followed directly by
//! the tokens of its children. Nothing is decoded; tokens only record the
//! byte span they cover, so callers compare and copy raw source text.
//!
//! Object sizes count keys and values, so a well formed object always has an
//! even size. Several top-level values may follow each other; rejecting
//! trailing values is left to the consumer.

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Object,
    Array,
    String,
    /// Number, `true`, `false` or `null`.
    Primitive,
}

impl TokenKind {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Object => "object",
            TokenKind::Array => "array",
            TokenKind::String => "string",
            TokenKind::Primitive => "primitive",
        }
    }
}

/// One node of the token stream.
///
/// For strings `start..end` excludes the quotes. For containers it covers
/// the brackets and `size` is the number of direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub size: usize,
}

impl Token {
    /// Raw source text covered by this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// A tokenizer failure at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: &'static str,
}

impl SyntaxError {
    /// Attach the file name and resolve the offset to a line number.
    pub fn into_error(self, file: &str, source: &str) -> crate::error::Error {
        crate::error::Error::Syntax {
            file: file.to_string(),
            line: line_of(source, self.offset),
            message: self.message.to_string(),
        }
    }
}

/// 1-based line number of a byte offset.
pub fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    TopLevel,
    Value,
    ValueOrClose,
    Key,
    KeyOrClose,
    Colon,
    CommaOrClose,
}

struct Frame {
    index: usize,
    kind: TokenKind,
}

/// Tokenize `source` into a flat pre-order token list.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let bytes = source.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut expect = Expect::TopLevel;
    let mut i = 0;

    let fail = |offset: usize, message: &'static str| Err(SyntaxError { offset, message });

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }
            b'{' | b'[' => {
                if !matches!(expect, Expect::TopLevel | Expect::Value | Expect::ValueOrClose) {
                    return fail(i, "unexpected container");
                }
                let kind = if c == b'{' {
                    TokenKind::Object
                } else {
                    TokenKind::Array
                };
                add_child(&mut tokens, &stack);
                stack.push(Frame {
                    index: tokens.len(),
                    kind,
                });
                tokens.push(Token {
                    kind,
                    start: i,
                    end: i,
                    size: 0,
                });
                expect = if kind == TokenKind::Object {
                    Expect::KeyOrClose
                } else {
                    Expect::ValueOrClose
                };
                i += 1;
            }
            b'}' | b']' => {
                let kind = if c == b'}' {
                    TokenKind::Object
                } else {
                    TokenKind::Array
                };
                let closable = match expect {
                    Expect::CommaOrClose => true,
                    Expect::KeyOrClose => kind == TokenKind::Object,
                    Expect::ValueOrClose => kind == TokenKind::Array,
                    _ => false,
                };
                match stack.last() {
                    Some(frame) if closable && frame.kind == kind => {
                        tokens[frame.index].end = i + 1;
                        stack.pop();
                    }
                    _ => return fail(i, "unexpected closing bracket"),
                }
                expect = after_value(&stack);
                i += 1;
            }
            b'"' => {
                let start = i + 1;
                let end = scan_string(bytes, start)?;
                let is_key = matches!(expect, Expect::Key | Expect::KeyOrClose);
                if !is_key
                    && !matches!(expect, Expect::TopLevel | Expect::Value | Expect::ValueOrClose)
                {
                    return fail(i, "unexpected string");
                }
                add_child(&mut tokens, &stack);
                tokens.push(Token {
                    kind: TokenKind::String,
                    start,
                    end,
                    size: 0,
                });
                expect = if is_key {
                    Expect::Colon
                } else {
                    after_value(&stack)
                };
                i = end + 1;
            }
            b':' => {
                if expect != Expect::Colon {
                    return fail(i, "unexpected ':'");
                }
                expect = Expect::Value;
                i += 1;
            }
            b',' => {
                if expect != Expect::CommaOrClose {
                    return fail(i, "unexpected ','");
                }
                expect = match stack.last() {
                    Some(frame) if frame.kind == TokenKind::Object => Expect::Key,
                    _ => Expect::Value,
                };
                i += 1;
            }
            b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                if !matches!(expect, Expect::TopLevel | Expect::Value | Expect::ValueOrClose) {
                    return fail(i, "unexpected primitive");
                }
                let end = scan_primitive(bytes, i)?;
                add_child(&mut tokens, &stack);
                tokens.push(Token {
                    kind: TokenKind::Primitive,
                    start: i,
                    end,
                    size: 0,
                });
                expect = after_value(&stack);
                i = end;
            }
            _ => return fail(i, "unexpected character"),
        }
    }

    if let Some(frame) = stack.last() {
        return fail(tokens[frame.index].start, "unclosed bracket");
    }
    Ok(tokens)
}

fn add_child(tokens: &mut [Token], stack: &[Frame]) {
    if let Some(frame) = stack.last() {
        tokens[frame.index].size += 1;
    }
}

fn after_value(stack: &[Frame]) -> Expect {
    if stack.is_empty() {
        Expect::TopLevel
    } else {
        Expect::CommaOrClose
    }
}

/// Find the closing quote of a string whose body starts at `start`.
fn scan_string(bytes: &[u8], start: usize) -> Result<usize, SyntaxError> {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Ok(i),
            b'\\' => {
                match bytes.get(i + 1) {
                    Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => i += 2,
                    Some(b'u') => {
                        let hex = bytes.get(i + 2..i + 6).ok_or(SyntaxError {
                            offset: i,
                            message: "truncated unicode escape",
                        })?;
                        if !hex.iter().all(u8::is_ascii_hexdigit) {
                            return Err(SyntaxError {
                                offset: i,
                                message: "invalid unicode escape",
                            });
                        }
                        i += 6;
                    }
                    _ => {
                        return Err(SyntaxError {
                            offset: i,
                            message: "invalid escape",
                        });
                    }
                }
            }
            _ => i += 1,
        }
    }
    Err(SyntaxError {
        offset: start - 1,
        message: "unterminated string",
    })
}

fn scan_primitive(bytes: &[u8], start: usize) -> Result<usize, SyntaxError> {
    let end = bytes[start..]
        .iter()
        .position(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b',' | b']' | b'}' | b':'))
        .map_or(bytes.len(), |n| start + n);
    let text = &bytes[start..end];
    let valid = match text {
        b"true" | b"false" | b"null" => true,
        _ => {
            !text.is_empty()
                && text
                    .iter()
                    .all(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
        }
    };
    if valid {
        Ok(end)
    } else {
        Err(SyntaxError {
            offset: start,
            message: "invalid primitive",
        })
    }
}
