//! Stack-machine parser for filter expressions.

use super::ast::{Comparison, Logic, Node};
use super::error::{FilterError, FilterResult};
use super::lexer::{Lexer, Token, TokenKind};
use super::operator::Operator;

/// Maximum depth of nested groups.
pub const MAX_GROUP_DEPTH: usize = 64;

/// Parser for RSQL-style filter expressions.
///
/// The parser drives a [`Lexer`] and assembles the AST with an explicit
/// stack of open groups. The implicit top-level group sits at the bottom of
/// the stack; a `(` pushes a new group and the matching `)` pops it and
/// appends it to its parent. A single slot holds the comparison under
/// construction.
///
/// # Grammar
///
/// ```text
/// expression ::= operand (logical operand)*
/// operand    ::= "(" expression ")" | comparison
/// logical    ::= ";" | "and" | "," | "or"
/// comparison ::= name operator values
/// values     ::= value | "(" value ("," value)* ")"
/// value      ::= bare | "'" chars "'" | '"' chars '"'
/// ```
///
/// And and Or share one precedence level; sibling order is preserved so a
/// consumer can apply whatever precedence its backend uses.
///
/// # Example
///
/// ```
/// use rsql::filter::{FilterParser, Node, Logic};
///
/// let tree = FilterParser::parse("(a==1;b==2),c==3").unwrap();
/// let Node::Group(children) = &tree else { unreachable!() };
/// assert_eq!(children.len(), 3);
/// assert_eq!(children[1], Node::Logical(Logic::Or));
/// ```
pub struct FilterParser<'a> {
    lexer: Lexer<'a>,
    stack: Vec<GroupFrame>,
    pending: Option<PendingComparison>,
}

/// An open group and the position of its `(`.
struct GroupFrame {
    children: Vec<Node>,
    position: usize,
}

impl GroupFrame {
    fn new(position: usize) -> Self {
        Self {
            children: Vec::new(),
            position,
        }
    }

    fn ends_with_operand(&self) -> bool {
        matches!(
            self.children.last(),
            Some(Node::Comparison(_) | Node::Group(_))
        )
    }

    fn ends_with_logical(&self) -> bool {
        matches!(self.children.last(), Some(Node::Logical(_)))
    }
}

/// The comparison under construction.
struct PendingComparison {
    selector: String,
    operator: Option<(Operator, String)>,
    arguments: Vec<String>,
    values_position: Option<usize>,
}

impl<'a> FilterParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            stack: vec![GroupFrame::new(0)],
            pending: None,
        }
    }

    /// Parses a filter expression into its syntax tree.
    ///
    /// The result is always a [`Node::Group`]; an empty or whitespace-only
    /// expression yields an empty group.
    ///
    /// # Errors
    ///
    /// Returns a lexical [`FilterError`] for malformed tokens (unterminated
    /// quotes, missing selector/operator/value, unknown operator symbols) and
    /// a syntax [`FilterError`] for structural problems (unbalanced or empty
    /// groups, misplaced connectives, value lists on single-valued operators).
    pub fn parse(input: &'a str) -> FilterResult<Node> {
        let node = Self::new(input).run()?;
        tracing::debug!(
            comparisons = node.comparisons().len(),
            "parsed filter expression"
        );
        Ok(node)
    }

    fn run(mut self) -> FilterResult<Node> {
        loop {
            let token = self.lexer.next_token();
            match token.kind {
                TokenKind::Name => {
                    self.pending = Some(PendingComparison {
                        selector: token.value,
                        operator: None,
                        arguments: Vec::new(),
                        values_position: None,
                    });
                }
                TokenKind::Operator => {
                    let operator = Operator::from_symbol(&token.value).ok_or_else(|| {
                        FilterError::UnknownOperator {
                            symbol: token.value.clone(),
                            position: token.position,
                        }
                    })?;
                    let pending = self.pending_mut(&token)?;
                    pending.operator = Some((operator, token.value));
                }
                TokenKind::ValuesStart => {
                    self.pending_mut(&token)?.values_position = Some(token.position);
                }
                TokenKind::Value => {
                    let pending = self.pending_mut(&token)?;
                    pending.arguments.push(token.value);
                }
                TokenKind::ValuesEnd => {
                    let comparison = self.finish_comparison(&token)?;
                    self.push_operand(Node::Comparison(comparison), token.position)?;
                }
                TokenKind::And => self.push_logical(Logic::And, &token)?,
                TokenKind::Or => self.push_logical(Logic::Or, &token)?,
                TokenKind::GroupStart => self.open_group(token.position)?,
                TokenKind::GroupEnd => self.close_group(token.position)?,
                TokenKind::Error => {
                    return Err(self
                        .lexer
                        .take_error()
                        .unwrap_or_else(|| FilterError::unexpected_token(token.value, token.position)));
                }
                TokenKind::EndOfInput => return self.finish(token.position),
            }
        }
    }

    fn pending_mut(&mut self, token: &Token) -> FilterResult<&mut PendingComparison> {
        self.pending
            .as_mut()
            .ok_or_else(|| FilterError::unexpected_token(token.kind.to_string(), token.position))
    }

    fn top(&mut self) -> &mut GroupFrame {
        // the root frame is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn finish_comparison(&mut self, token: &Token) -> FilterResult<Comparison> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| FilterError::unexpected_token(token.kind.to_string(), token.position))?;
        let position = pending.values_position.unwrap_or(token.position);

        let Some((operator, symbol)) = pending.operator else {
            return Err(FilterError::MissingOperator {
                selector: pending.selector,
                position,
            });
        };
        if pending.arguments.is_empty() {
            return Err(FilterError::MissingValue {
                selector: pending.selector,
                position,
            });
        }
        if pending.arguments.len() > 1 && !operator.is_multi_valued() {
            return Err(FilterError::TooManyValues {
                selector: pending.selector,
                operator: symbol,
                count: pending.arguments.len(),
                position,
            });
        }

        Ok(Comparison {
            selector: pending.selector,
            operator,
            arguments: pending.arguments,
        })
    }

    fn push_operand(&mut self, node: Node, position: usize) -> FilterResult<()> {
        let top = self.top();
        if top.ends_with_operand() {
            return Err(FilterError::MissingLogical { position });
        }
        top.children.push(node);
        Ok(())
    }

    fn push_logical(&mut self, logic: Logic, token: &Token) -> FilterResult<()> {
        let top = self.top();
        if !top.ends_with_operand() {
            return Err(FilterError::MisplacedLogical {
                operator: token.value.clone(),
                position: token.position,
            });
        }
        top.children.push(Node::Logical(logic));
        Ok(())
    }

    fn open_group(&mut self, position: usize) -> FilterResult<()> {
        if self.stack.len() > MAX_GROUP_DEPTH {
            return Err(FilterError::NestingTooDeep {
                limit: MAX_GROUP_DEPTH,
                position,
            });
        }
        if self.top().ends_with_operand() {
            return Err(FilterError::MissingLogical { position });
        }
        self.stack.push(GroupFrame::new(position));
        Ok(())
    }

    fn close_group(&mut self, position: usize) -> FilterResult<()> {
        if self.stack.len() == 1 {
            return Err(FilterError::UnexpectedGroupEnd { position });
        }
        let frame = self.top();
        if frame.children.is_empty() {
            return Err(FilterError::EmptyGroup {
                position: frame.position,
            });
        }
        if frame.ends_with_logical() {
            return Err(FilterError::DanglingLogical { position });
        }

        let Some(frame) = self.stack.pop() else {
            return Err(FilterError::UnexpectedGroupEnd { position });
        };
        self.push_operand(Node::Group(frame.children), frame.position)
    }

    fn finish(mut self, position: usize) -> FilterResult<Node> {
        if self.stack.len() > 1 {
            return Err(FilterError::UnclosedGroup {
                open: self.stack.len() - 1,
                position: self.top().position,
            });
        }
        let root = self.top();
        if root.ends_with_logical() {
            return Err(FilterError::DanglingLogical { position });
        }
        Ok(Node::Group(std::mem::take(&mut root.children)))
    }
}
