//! R+ lexer - tokenizes source text into tokens.
//!
//! Single pass, one character of lookahead, never aborts: malformed input
//! surfaces as `Error` tokens that the parser rejects.

/// The closed set of token kinds the lexer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (decimal or 0x-prefixed hex)
    Number,
    /// Floating-point literal (fraction, optional exponent)
    Float,
    /// String literal (lexeme carries the decoded value)
    Str,
    /// Character literal (lexeme carries the decoded value)
    Char,
    /// Identifier
    Identifier,

    // Keywords
    /// `if`
    If,
    /// `else`
    Else,
    /// `for`
    For,
    /// `while`
    While,
    /// `return`
    Return,
    /// `function`
    Function,
    /// `var`
    Var,
    /// `const`
    Const,
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `void`
    Void,
    /// `int` type keyword
    IntType,
    /// `float` type keyword
    FloatType,
    /// `string` type keyword
    StringType,
    /// `bool` type keyword
    BoolType,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Assign,
    /// `!`
    Not,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `<<`
    LtLt,
    /// `>>`
    GtGt,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `->`
    Arrow,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `.`
    Dot,

    // Special
    /// End of input
    Eof,
    /// Unrecognized byte (lexeme carries the byte)
    Error,
}

/// A lexeme tagged with its kind and 1-based source position.
///
/// String and char tokens carry the *decoded* value: escape sequences are
/// already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token's kind
    pub kind: TokenKind,
    /// The token's text (decoded for string/char literals)
    pub lexeme: String,
    /// Line of the token's first character (1-based)
    pub line: u32,
    /// Column of the token's first character (1-based)
    pub column: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "return" => TokenKind::Return,
        "function" => TokenKind::Function,
        "var" => TokenKind::Var,
        "const" => TokenKind::Const,
        "class" => TokenKind::Class,
        "struct" => TokenKind::Struct,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "void" => TokenKind::Void,
        "int" => TokenKind::IntType,
        "float" => TokenKind::FloatType,
        "string" => TokenKind::StringType,
        "bool" => TokenKind::BoolType,
        _ => return None,
    };
    Some(kind)
}

/// Lexical analyzer for R+ source text.
///
/// # Examples
///
/// ```
/// use parser::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("var x = 1;").tokenize();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::Var,
///         TokenKind::Identifier,
///         TokenKind::Assign,
///         TokenKind::Number,
///         TokenKind::Semicolon,
///         TokenKind::Eof,
///     ]
/// );
/// ```
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    /// Create a new lexer for the given source text.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current line (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column (1-based).
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Tokenize the entire input, ending with the `Eof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    /// Scan and return the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.is_at_end() {
            return Token::new(TokenKind::Eof, "", self.line, self.column);
        }

        let line = self.line;
        let column = self.column;
        let ch = self.advance();

        match ch {
            '(' => Token::new(TokenKind::LParen, "(", line, column),
            ')' => Token::new(TokenKind::RParen, ")", line, column),
            '{' => Token::new(TokenKind::LBrace, "{", line, column),
            '}' => Token::new(TokenKind::RBrace, "}", line, column),
            '[' => Token::new(TokenKind::LBracket, "[", line, column),
            ']' => Token::new(TokenKind::RBracket, "]", line, column),
            ',' => Token::new(TokenKind::Comma, ",", line, column),
            ';' => Token::new(TokenKind::Semicolon, ";", line, column),
            ':' => Token::new(TokenKind::Colon, ":", line, column),
            '?' => Token::new(TokenKind::Question, "?", line, column),
            '.' => Token::new(TokenKind::Dot, ".", line, column),
            '^' => Token::new(TokenKind::Caret, "^", line, column),
            '~' => Token::new(TokenKind::Tilde, "~", line, column),

            '=' => {
                if self.match_char('=') {
                    Token::new(TokenKind::EqEq, "==", line, column)
                } else {
                    Token::new(TokenKind::Assign, "=", line, column)
                }
            }
            '!' => {
                if self.match_char('=') {
                    Token::new(TokenKind::NotEq, "!=", line, column)
                } else {
                    Token::new(TokenKind::Not, "!", line, column)
                }
            }
            '<' => {
                if self.match_char('=') {
                    Token::new(TokenKind::LtEq, "<=", line, column)
                } else if self.match_char('<') {
                    Token::new(TokenKind::LtLt, "<<", line, column)
                } else {
                    Token::new(TokenKind::Lt, "<", line, column)
                }
            }
            '>' => {
                if self.match_char('=') {
                    Token::new(TokenKind::GtEq, ">=", line, column)
                } else if self.match_char('>') {
                    Token::new(TokenKind::GtGt, ">>", line, column)
                } else {
                    Token::new(TokenKind::Gt, ">", line, column)
                }
            }
            '&' => {
                if self.match_char('&') {
                    Token::new(TokenKind::AndAnd, "&&", line, column)
                } else {
                    Token::new(TokenKind::Amp, "&", line, column)
                }
            }
            '|' => {
                if self.match_char('|') {
                    Token::new(TokenKind::OrOr, "||", line, column)
                } else {
                    Token::new(TokenKind::Pipe, "|", line, column)
                }
            }
            '+' => {
                if self.match_char('+') {
                    Token::new(TokenKind::PlusPlus, "++", line, column)
                } else if self.match_char('=') {
                    Token::new(TokenKind::PlusEq, "+=", line, column)
                } else {
                    Token::new(TokenKind::Plus, "+", line, column)
                }
            }
            '-' => {
                if self.match_char('-') {
                    Token::new(TokenKind::MinusMinus, "--", line, column)
                } else if self.match_char('=') {
                    Token::new(TokenKind::MinusEq, "-=", line, column)
                } else if self.match_char('>') {
                    Token::new(TokenKind::Arrow, "->", line, column)
                } else {
                    Token::new(TokenKind::Minus, "-", line, column)
                }
            }
            '*' => {
                if self.match_char('=') {
                    Token::new(TokenKind::StarEq, "*=", line, column)
                } else {
                    Token::new(TokenKind::Star, "*", line, column)
                }
            }
            '/' => {
                if self.match_char('=') {
                    Token::new(TokenKind::SlashEq, "/=", line, column)
                } else {
                    Token::new(TokenKind::Slash, "/", line, column)
                }
            }
            '%' => {
                if self.match_char('=') {
                    Token::new(TokenKind::PercentEq, "%=", line, column)
                } else {
                    Token::new(TokenKind::Percent, "%", line, column)
                }
            }

            '"' => self.scan_string(line, column),
            '\'' => self.scan_char(line, column),

            c if c.is_ascii_digit() => self.scan_number(c, line, column),
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(c, line, column),

            c => Token::new(TokenKind::Error, c.to_string(), line, column),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            let c = self.peek();

            if c.is_whitespace() {
                self.advance();
                continue;
            }

            if c == '/' && self.peek_next() == Some('/') {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
                if !self.is_at_end() {
                    self.advance();
                }
                continue;
            }

            // Block comments do not nest: an inner /* is plain content.
            if c == '/' && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                while !self.is_at_end() {
                    if self.peek() == '*' && self.peek_next() == Some('/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    fn scan_string(&mut self, line: u32, column: u32) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' && self.peek_next().is_some() {
                self.advance();
                let escaped = self.advance();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    '0' => '\0',
                    other => other,
                });
            } else {
                value.push(self.advance());
            }
        }

        // Closing quote is optional at end of input.
        if !self.is_at_end() {
            self.advance();
        }

        Token::new(TokenKind::Str, value, line, column)
    }

    fn scan_char(&mut self, line: u32, column: u32) -> Token {
        let mut value = String::new();

        if !self.is_at_end() && self.peek() == '\\' {
            self.advance();
            if !self.is_at_end() {
                let escaped = self.advance();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '\'' => '\'',
                    '0' => '\0',
                    other => other,
                });
            }
        } else if !self.is_at_end() {
            value.push(self.advance());
        }

        if !self.is_at_end() && self.peek() == '\'' {
            self.advance();
        }

        Token::new(TokenKind::Char, value, line, column)
    }

    fn scan_number(&mut self, first: char, line: u32, column: u32) -> Token {
        let mut value = String::new();
        value.push(first);

        // Hex integer, including the degenerate bare "0x".
        if first == '0' && matches!(self.peek_checked(), Some('x') | Some('X')) {
            value.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_hexdigit() {
                value.push(self.advance());
            }
            return Token::new(TokenKind::Number, value, line, column);
        }

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        // A '.' only promotes to float when a digit follows it.
        if self.peek_checked() == Some('.')
            && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            value.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                value.push(self.advance());
            }

            if matches!(self.peek_checked(), Some('e') | Some('E')) {
                value.push(self.advance());
                if matches!(self.peek_checked(), Some('+') | Some('-')) {
                    value.push(self.advance());
                }
                while !self.is_at_end() && self.peek().is_ascii_digit() {
                    value.push(self.advance());
                }
            }

            return Token::new(TokenKind::Float, value, line, column);
        }

        Token::new(TokenKind::Number, value, line, column)
    }

    fn scan_identifier(&mut self, first: char, line: u32, column: u32) -> Token {
        let mut value = String::new();
        value.push(first);

        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            value.push(self.advance());
        }

        match keyword_kind(&value) {
            Some(kind) => Token::new(kind, value, line, column),
            None => Token::new(TokenKind::Identifier, value, line, column),
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars[self.position]
    }

    fn peek_checked(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.position];
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_checked() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}
