//! Mode-switching tokenizer
//!
//! The tokenizer alternates between two scanning modes. In literal mode,
//! `read_text` passes raw template text through until the next `<%`
//! delimiter. In code mode, `peek`/`next`/`consume` deliver tokens with
//! one-token lookahead: peeking lexes at most one token ahead and never
//! advances, `consume` discards a token that was already peeked.
//!
//! Line and column positions are tracked across both modes, including
//! newlines inside literal text and comments, so parse errors point at
//! the right place in the template.

use crate::config::constants::lexical::{MAX_IDENTIFIER_LENGTH, MAX_STRING_SIZE};
use crate::logging::codes;
use crate::tokens::{classify_word, Token};
use crate::utils::{Position, Span, Spanned};

/// Lexical analysis errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexError {
    #[error("Invalid character '{character}' at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unterminated string literal starting at line {line}")]
    UnterminatedString { line: u32 },

    #[error("Invalid number literal '{text}' at line {line}")]
    InvalidNumber { text: String, line: u32 },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String literal too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },
}

impl LexError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
        }
    }
}

/// Tokenizer over template source with one pending-token lookahead
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: Position,
    pending: Option<Spanned<Token>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
            pending: None,
        }
    }

    /// Current scan position (start of the pending token if one is held)
    pub fn position(&self) -> Position {
        match &self.pending {
            Some(spanned) => spanned.span.start(),
            None => self.pos,
        }
    }

    // ------------------------------------------------------------------
    // Literal passthrough mode
    // ------------------------------------------------------------------

    /// Consume raw literal text up to (not including) the next `<%`.
    ///
    /// The delimiter itself is consumed so the next token request scans
    /// in code mode. At end of input the remaining text is returned.
    pub fn read_text(&mut self) -> String {
        debug_assert!(
            self.pending.is_none(),
            "read_text called with a pending token"
        );

        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => break,
                Some('<') if self.peek_char_at(1) == Some('%') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
        text
    }

    // ------------------------------------------------------------------
    // Code mode with one-token lookahead
    // ------------------------------------------------------------------

    /// Lex the next token if none is pending, without advancing past it
    pub fn peek(&mut self) -> Result<&Token, LexError> {
        Ok(&self.pending_token()?.value)
    }

    /// Span of the token `peek` would return
    pub fn peek_span(&mut self) -> Result<Span, LexError> {
        Ok(self.pending_token()?.span)
    }

    fn pending_token(&mut self) -> Result<&Spanned<Token>, LexError> {
        let token = match self.pending.take() {
            Some(spanned) => spanned,
            None => self.lex_token()?,
        };
        Ok(self.pending.insert(token))
    }

    /// Lex (or take the pending token) and advance past it
    pub fn next(&mut self) -> Result<Spanned<Token>, LexError> {
        match self.pending.take() {
            Some(token) => Ok(token),
            None => self.lex_token(),
        }
    }

    /// Advance past a token that was already peeked
    pub fn consume(&mut self) {
        debug_assert!(self.pending.is_some(), "consume without a peeked token");
        self.pending = None;
    }

    // ------------------------------------------------------------------
    // Character-level scanning
    // ------------------------------------------------------------------

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos.offset..].chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.source[self.pos.offset..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    /// Skip whitespace and `//` comments, counting newlines
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_char_at(1) == Some('/') => {
                    while let Some(ch) = self.peek_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_token(&mut self) -> Result<Spanned<Token>, LexError> {
        self.skip_trivia();

        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(Spanned::new(Token::Eof, Span::new(start, start)));
        };

        let token = match ch {
            '%' if self.peek_char() == Some('>') => {
                self.bump();
                Token::CloseTag
            }
            '%' => Token::Percent,
            '+' if self.peek_char() == Some('+') => {
                self.bump();
                Token::Inc
            }
            '+' => Token::Plus,
            '-' if self.peek_char() == Some('-') => {
                self.bump();
                Token::Dec
            }
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '=' if self.peek_char() == Some('=') => {
                self.bump();
                Token::Eq
            }
            '=' => Token::Assign,
            '!' if self.peek_char() == Some('=') => {
                self.bump();
                Token::Ne
            }
            '!' => Token::Not,
            '<' if self.peek_char() == Some('<') => {
                self.bump();
                Token::Shl
            }
            '<' if self.peek_char() == Some('=') => {
                self.bump();
                Token::Le
            }
            '<' => Token::Lt,
            '>' if self.peek_char() == Some('>') => {
                self.bump();
                Token::Shr
            }
            '>' if self.peek_char() == Some('=') => {
                self.bump();
                Token::Ge
            }
            '>' => Token::Gt,
            '&' if self.peek_char() == Some('&') => {
                self.bump();
                Token::AndAnd
            }
            '&' => Token::Amp,
            '|' if self.peek_char() == Some('|') => {
                self.bump();
                Token::OrOr
            }
            '|' => Token::Pipe,
            '^' => Token::Caret,
            '~' => Token::Tilde,
            '@' => Token::At,
            '.' => Token::Dot,
            ',' => Token::Comma,
            ';' => Token::Semi,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '"' => self.lex_string(start)?,
            '0'..='9' => self.lex_number(ch, start)?,
            'a'..='z' | 'A'..='Z' | '_' => self.lex_word(ch)?,
            _ => {
                return Err(LexError::InvalidCharacter {
                    character: ch,
                    line: start.line,
                    column: start.column,
                });
            }
        };

        Ok(Spanned::new(token, Span::new(start, self.pos)))
    }

    /// Double-quoted string: no escape processing, may not span lines
    fn lex_string(&mut self, start: Position) -> Result<Token, LexError> {
        let mut content = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedString { line: start.line });
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some(ch) => {
                    content.push(ch);
                    self.bump();
                    if content.len() > MAX_STRING_SIZE {
                        return Err(LexError::StringTooLarge {
                            size: content.len(),
                        });
                    }
                }
            }
        }
        Ok(Token::Str(content))
    }

    /// Decimal literal; a dot only joins the number when a digit follows
    fn lex_number(&mut self, first: char, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first);

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            text.push('.');
            self.bump();
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Token::Float(value)),
                _ => Err(LexError::InvalidNumber {
                    text,
                    line: start.line,
                }),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(Token::Int(value)),
                Err(_) => Err(LexError::InvalidNumber {
                    text,
                    line: start.line,
                }),
            }
        }
    }

    /// Identifier or keyword
    fn lex_word(&mut self, first: char) -> Result<Token, LexError> {
        let mut word = String::new();
        word.push(first);

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        if word.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexError::IdentifierTooLong { length: word.len() });
        }

        Ok(classify_word(&word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn all_tokens(code: &str) -> Vec<Token> {
        let source = format!("<%{}%>", code);
        let mut tokenizer = Tokenizer::new(&source);
        assert_eq!(tokenizer.read_text(), "");
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next().unwrap().into_inner();
            if token == Token::CloseTag {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn literal_mode_passes_text_through() {
        let mut tokenizer = Tokenizer::new("wire [7:0] bus; <% a %> tail");
        assert_eq!(tokenizer.read_text(), "wire [7:0] bus; ");
        assert_eq!(
            tokenizer.next().unwrap().into_inner(),
            Token::Ident("a".to_string())
        );
        assert_eq!(tokenizer.next().unwrap().into_inner(), Token::CloseTag);
        assert_eq!(tokenizer.read_text(), " tail");
        assert_eq!(tokenizer.next().unwrap().into_inner(), Token::Eof);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut tokenizer = Tokenizer::new("<% x y %>");
        tokenizer.read_text();
        assert_eq!(tokenizer.peek().unwrap(), &Token::Ident("x".to_string()));
        assert_eq!(tokenizer.peek().unwrap(), &Token::Ident("x".to_string()));
        tokenizer.consume();
        assert_eq!(tokenizer.peek().unwrap(), &Token::Ident("y".to_string()));
    }

    #[test]
    fn multi_character_operators() {
        assert_eq!(
            all_tokens("== != ++ -- << >> <= >= && ||"),
            vec![
                Token::Eq,
                Token::Ne,
                Token::Inc,
                Token::Dec,
                Token::Shl,
                Token::Shr,
                Token::Le,
                Token::Ge,
                Token::AndAnd,
                Token::OrOr,
            ]
        );
    }

    #[test]
    fn percent_is_modulo_unless_closing() {
        assert_eq!(all_tokens("a % b"), vec![
            Token::Ident("a".to_string()),
            Token::Percent,
            Token::Ident("b".to_string()),
        ]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            all_tokens("a // comment with = tokens\nb"),
            vec![Token::Ident("a".to_string()), Token::Ident("b".to_string())]
        );
    }

    #[test]
    fn numbers_int_and_float() {
        assert_eq!(
            all_tokens("42 3.5 7.name"),
            vec![
                Token::Int(42),
                Token::Float(3.5),
                Token::Int(7),
                Token::Dot,
                Token::Ident("name".to_string()),
            ]
        );
    }

    #[test]
    fn string_literals_have_no_escapes() {
        assert_eq!(
            all_tokens(r#"s = "a\nb""#),
            vec![
                Token::Ident("s".to_string()),
                Token::Assign,
                Token::Str("a\\nb".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut tokenizer = Tokenizer::new("<% \"never closed %>");
        tokenizer.read_text();
        assert_matches!(
            tokenizer.next(),
            Err(LexError::UnterminatedString { line: 1 })
        );
    }

    #[test]
    fn string_may_not_span_lines() {
        let mut tokenizer = Tokenizer::new("<% \"first\nsecond\" %>");
        tokenizer.read_text();
        assert_matches!(tokenizer.next(), Err(LexError::UnterminatedString { .. }));
    }

    #[test]
    fn lines_counted_through_literal_text_and_comments() {
        let mut tokenizer = Tokenizer::new("line1\nline2\n<% // note\nx %>");
        tokenizer.read_text();
        let spanned = tokenizer.next().unwrap();
        assert_eq!(spanned.value, Token::Ident("x".to_string()));
        assert_eq!(spanned.span.start().line, 4);
    }

    #[test]
    fn invalid_character_reports_position() {
        let mut tokenizer = Tokenizer::new("<% $ %>");
        tokenizer.read_text();
        assert_matches!(
            tokenizer.next(),
            Err(LexError::InvalidCharacter {
                character: '$',
                line: 1,
                ..
            })
        );
    }

    #[test]
    fn static_marker_and_keywords() {
        assert_eq!(
            all_tokens("@ if else for while print printf func"),
            vec![
                Token::At,
                Token::If,
                Token::Else,
                Token::For,
                Token::While,
                Token::Print,
                Token::Printf,
                Token::Func,
            ]
        );
    }

    #[test]
    fn template_without_code_region() {
        let mut tokenizer = Tokenizer::new("just plain text");
        assert_eq!(tokenizer.read_text(), "just plain text");
        assert_eq!(tokenizer.next().unwrap().into_inner(), Token::Eof);
    }

    #[test]
    fn oversized_identifier_rejected() {
        let long = "x".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let source = format!("<% {} %>", long);
        let mut tokenizer = Tokenizer::new(&source);
        tokenizer.read_text();
        assert_matches!(tokenizer.next(), Err(LexError::IdentifierTooLong { .. }));
    }
}
