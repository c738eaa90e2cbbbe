//! Lexer (tokenizer) for filter expressions.
//!
//! The lexer is an explicit state machine. Each state scans a prefix of the
//! remaining input, queues zero or more tokens and names the next state:
//!
//! ```text
//! Start ──► GroupOrName ──► Operator ──► Values ──► Logic ──► Done
//!              ▲  │ "("                                 │
//!              └──┘                                     │ ";" "," "and" "or"
//!              ▲                                        │
//!              └────────────────────────────────────────┘
//! ```
//!
//! Malformed input never loops: the failing state records a [`FilterError`],
//! queues a single [`TokenKind::Error`] token and moves to `Done`.

use std::collections::VecDeque;
use std::fmt;

use super::error::{FilterError, FilterResult};

/// Characters that terminate a selector.
const NAME_TERMINATORS: &[char] = &['=', '<', '>', '!'];

/// Characters that may not appear in a bare value.
pub(crate) const RESERVED: &[char] = &['"', '\'', '(', ')', ';', ',', '=', '!', '~', '<', '>'];

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A selector (field name).
    Name,
    /// An operator symbol such as `==` or `=gt=`.
    Operator,
    /// Start of the argument list of a comparison.
    ValuesStart,
    /// End of the argument list of a comparison.
    ValuesEnd,
    /// A single argument, already unquoted and unescaped.
    Value,
    /// Conjunction (`;` or `and`).
    And,
    /// Disjunction (`,` or `or`).
    Or,
    /// Opening parenthesis of a group.
    GroupStart,
    /// Closing parenthesis of a group.
    GroupEnd,
    /// Lexical error; the value holds the message.
    Error,
    /// End of input.
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Name => "name",
            TokenKind::Operator => "operator",
            TokenKind::ValuesStart => "values-start",
            TokenKind::ValuesEnd => "values-end",
            TokenKind::Value => "value",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::GroupStart => "group-start",
            TokenKind::GroupEnd => "group-end",
            TokenKind::Error => "error",
            TokenKind::EndOfInput => "end-of-input",
        };
        f.write_str(name)
    }
}

/// A token produced by the [`Lexer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The token text (unescaped contents for values).
    pub value: String,
    /// Byte offset into the input where the token starts.
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    /// Returns true for the tokens that end a token stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::Error | TokenKind::EndOfInput)
    }
}

/// Scan states of the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    GroupOrName,
    Operator,
    Values,
    Logic,
    Done,
}

/// Lexer for tokenizing filter expressions.
///
/// Tokens are produced lazily through [`Lexer::next_token`] or the
/// [`Iterator`] implementation, which yields every token up to and including
/// the terminal `EndOfInput` or `Error` token.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input string.
    position: usize,
    state: State,
    pending: VecDeque<Token>,
    /// The most recent selector, for error context.
    selector: String,
    error: Option<FilterError>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            state: State::Start,
            pending: VecDeque::new(),
            selector: String::new(),
            error: None,
            finished: false,
        }
    }

    /// Returns the next token.
    ///
    /// After the terminal token has been returned, further calls keep
    /// returning `EndOfInput`.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }
            if self.state == State::Done {
                return Token::new(TokenKind::EndOfInput, "", self.input.len());
            }

            let step = match self.state {
                State::Start => self.lex_start(),
                State::GroupOrName => self.lex_group_or_name(),
                State::Operator => self.lex_operator(),
                State::Values => self.lex_values(),
                State::Logic => self.lex_logic(),
                State::Done => Ok(State::Done),
            };

            match step {
                Ok(next) => {
                    tracing::trace!(from = ?self.state, to = ?next, position = self.position, "lexer transition");
                    self.state = next;
                }
                Err(error) => {
                    let position = error.position();
                    self.pending
                        .push_back(Token::new(TokenKind::Error, error.to_string(), position));
                    self.error = Some(error);
                    self.state = State::Done;
                }
            }
        }
    }

    /// Takes the error that stopped the lexer, if any.
    pub fn take_error(&mut self) -> Option<FilterError> {
        self.error.take()
    }

    /// Collects all tokens, including the terminal one.
    pub fn tokenize(self) -> Vec<Token> {
        self.collect()
    }

    // ==================== Character helpers ====================

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn accept(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn accept_any(&mut self, set: &[char]) -> bool {
        match self.peek() {
            Some(c) if set.contains(&c) => {
                self.position += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// Accepts a word connective such as `and`, but only when it is not the
    /// prefix of a longer selector (`andrew==1`).
    fn accept_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        if !rest.starts_with(keyword) {
            return false;
        }
        match rest[keyword.len()..].chars().next() {
            None => {}
            Some(c) if c.is_whitespace() || c == '(' => {}
            Some(_) => return false,
        }
        self.position += keyword.len();
        true
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            self.position += c.len_utf8();
        }
        &self.input[start..self.position]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn emit(&mut self, kind: TokenKind, value: impl Into<String>, position: usize) {
        self.pending.push_back(Token::new(kind, value, position));
    }

    // ==================== States ====================

    fn lex_start(&mut self) -> FilterResult<State> {
        self.skip_whitespace();
        if self.at_end() {
            self.emit(TokenKind::EndOfInput, "", self.position);
            return Ok(State::Done);
        }
        Ok(State::GroupOrName)
    }

    fn lex_group_or_name(&mut self) -> FilterResult<State> {
        self.skip_whitespace();
        let start = self.position;
        if self.accept('(') {
            self.emit(TokenKind::GroupStart, "(", start);
            return Ok(State::GroupOrName);
        }

        // An operand is missing here. Emit what stands in its place and let
        // the parser report the structural error.
        if self.at_end() {
            self.emit(TokenKind::EndOfInput, "", start);
            return Ok(State::Done);
        }
        if self.accept(')') {
            self.emit(TokenKind::GroupEnd, ")", start);
            return Ok(State::Logic);
        }
        if self.lex_connective(start) {
            return Ok(State::GroupOrName);
        }

        let run = self.take_while(|c| !NAME_TERMINATORS.contains(&c));
        let name = run.trim();
        if name.is_empty() {
            return Err(FilterError::MissingSelector { position: start });
        }
        if let Some((offset, character)) = run.char_indices().find(|(_, c)| RESERVED.contains(c))
        {
            return Err(FilterError::UnexpectedCharacter {
                character,
                position: start + offset,
            });
        }

        let leading = run.len() - run.trim_start().len();
        self.selector = name.to_string();
        self.emit(TokenKind::Name, name, start + leading);
        Ok(State::Operator)
    }

    fn lex_operator(&mut self) -> FilterResult<State> {
        let start = self.position;
        match self.peek() {
            None => {
                return Err(FilterError::MissingOperator {
                    selector: self.selector.clone(),
                    position: start,
                })
            }
            Some('=') => {
                // padded form `=xx=`; `==` is the empty case
                self.next_char();
                loop {
                    match self.peek() {
                        Some('=') => {
                            self.next_char();
                            break;
                        }
                        Some(c) if c.is_ascii_alphabetic() => {
                            self.next_char();
                        }
                        _ => {
                            return Err(FilterError::MalformedOperator {
                                symbol: self.input[start..self.position].to_string(),
                                position: start,
                            })
                        }
                    }
                }
            }
            Some(_) => {
                // > >= < <= ! !=
                self.accept_any(&['>', '<', '!']);
                self.accept('=');
            }
        }

        let symbol = &self.input[start..self.position];
        self.emit(TokenKind::Operator, symbol, start);
        Ok(State::Values)
    }

    fn lex_values(&mut self) -> FilterResult<State> {
        self.skip_whitespace();
        let start = self.position;

        if self.accept('(') {
            self.emit(TokenKind::ValuesStart, "(", start);
            loop {
                self.skip_whitespace();
                self.lex_value()?;
                self.skip_whitespace();
                let at = self.position;
                match self.next_char() {
                    Some(',') => continue,
                    Some(')') => {
                        self.emit(TokenKind::ValuesEnd, ")", at);
                        break;
                    }
                    Some(character) => {
                        return Err(FilterError::UnexpectedCharacter {
                            character,
                            position: at,
                        })
                    }
                    None => {
                        return Err(FilterError::UnterminatedValueList {
                            selector: self.selector.clone(),
                            position: start,
                        })
                    }
                }
            }
        } else {
            self.emit(TokenKind::ValuesStart, "", start);
            self.lex_value()?;
            self.emit(TokenKind::ValuesEnd, "", self.position);
        }

        Ok(State::Logic)
    }

    /// Reads a single value, quoted or bare.
    fn lex_value(&mut self) -> FilterResult<()> {
        let start = self.position;
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.next_char();
                let mut value = String::new();
                loop {
                    match self.next_char() {
                        Some('\\') => match self.next_char() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(FilterError::UnterminatedQuote { position: start }),
                        },
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(FilterError::UnterminatedQuote { position: start }),
                    }
                }
                self.emit(TokenKind::Value, value, start);
            }
            _ => {
                let run = self.take_while(|c| !c.is_whitespace() && !RESERVED.contains(&c));
                if run.is_empty() {
                    return Err(FilterError::MissingValue {
                        selector: self.selector.clone(),
                        position: start,
                    });
                }
                self.emit(TokenKind::Value, run, start);
            }
        }
        Ok(())
    }

    fn lex_logic(&mut self) -> FilterResult<State> {
        loop {
            self.skip_whitespace();
            let at = self.position;
            if !self.accept(')') {
                break;
            }
            self.emit(TokenKind::GroupEnd, ")", at);
        }

        let start = self.position;
        let Some(character) = self.peek() else {
            self.emit(TokenKind::EndOfInput, "", start);
            return Ok(State::Done);
        };

        if self.lex_connective(start) {
            return Ok(State::GroupOrName);
        }
        tracing::trace!(%character, position = start, "operand without a connective");
        Err(FilterError::MissingLogical { position: start })
    }

    /// Emits a connective token if one starts at the current position.
    fn lex_connective(&mut self, start: usize) -> bool {
        let kind = if self.accept(';') || self.accept_keyword("and") {
            TokenKind::And
        } else if self.accept(',') || self.accept_keyword("or") {
            TokenKind::Or
        } else {
            return false;
        };

        let text = &self.input[start..self.position];
        self.emit(kind, text, start);
        self.skip_whitespace();
        true
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.is_terminal();
        Some(token)
    }
}
