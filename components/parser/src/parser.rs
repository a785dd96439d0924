//! Recursive descent parser for R+.
//!
//! The grammar is LL(1): statements dispatch on the current token,
//! expressions are parsed by precedence climbing. Parsing is fail-fast and
//! aborts on the first mismatch; no partial AST is returned.

use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use core_types::{RpError, SourcePosition};

/// R+ parser over a token vector produced by the lexer.
///
/// # Examples
///
/// ```
/// use parser::{Lexer, Parser};
///
/// let tokens = Lexer::new("var x = 1 + 2;").tokenize();
/// let program = Parser::new(tokens).parse().unwrap();
/// assert_eq!(program.body.len(), 1);
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a parser over a token vector.
    ///
    /// The vector is expected to end with an `Eof` token; one is appended
    /// if missing so lookahead never runs off the end.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Self { tokens, current: 0 }
    }

    /// Parse the whole token stream into a program.
    pub fn parse(&mut self) -> Result<Program, RpError> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    /// Skip ahead to a likely statement boundary after an error.
    ///
    /// Advances past the next `;` or stops in front of the next
    /// statement-starter keyword. Not invoked by [`parse`](Self::parse);
    /// embedders driving statement-at-a-time parsing can call it to resume
    /// after a failure.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, RpError> {
        if self.is_at_end() {
            return Err(RpError::syntax("Unexpected end of input"));
        }

        match self.peek().kind {
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Var | TokenKind::Const => self.parse_variable_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        let expression = self.parse_expression()?;
        self.match_kind(TokenKind::Semicolon);
        Ok(Statement::ExpressionStatement {
            expression,
            position,
        })
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        let kind = if self.match_kind(TokenKind::Const) {
            VariableKind::Const
        } else {
            self.consume(TokenKind::Var, "Expected 'var'")?;
            VariableKind::Var
        };

        let mut declarations = Vec::new();
        loop {
            let name = self
                .consume(TokenKind::Identifier, "Expected variable name")?
                .lexeme;
            let init = if self.match_kind(TokenKind::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarations.push(VariableDeclarator { name, init });
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        self.match_kind(TokenKind::Semicolon);
        Ok(Statement::VariableDeclaration {
            kind,
            declarations,
            position,
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        self.consume(TokenKind::If, "Expected 'if'")?;
        self.consume(TokenKind::LParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after if condition")?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            consequent,
            alternate,
            position,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        self.consume(TokenKind::While, "Expected 'while'")?;
        self.consume(TokenKind::LParen, "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after while condition")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While {
            condition,
            body,
            position,
        })
    }

    fn parse_for_statement(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        self.consume(TokenKind::For, "Expected 'for'")?;
        self.consume(TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if matches!(self.peek().kind, TokenKind::Var | TokenKind::Const) {
            // The declaration parser consumes the terminating ';' itself.
            Some(ForInit::Declaration(Box::new(
                self.parse_variable_declaration()?,
            )))
        } else {
            Some(ForInit::Expression(self.parse_expression()?))
        };
        if !matches!(init, Some(ForInit::Declaration(_))) {
            self.consume(TokenKind::Semicolon, "Expected ';' after for loop initializer")?;
        }

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after for loop condition")?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::For {
            init,
            condition,
            update,
            body,
            position,
        })
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        self.consume(TokenKind::Function, "Expected 'function'")?;
        let name = self
            .consume(TokenKind::Identifier, "Expected function name")?
            .lexeme;
        self.consume(TokenKind::LParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self
                    .consume(TokenKind::Identifier, "Expected parameter name")?
                    .lexeme;
                params.push(param);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "Expected ')' after parameters")?;

        let body = match self.parse_block()? {
            Statement::Block { body, .. } => body,
            _ => unreachable!("parse_block always returns a block"),
        };

        Ok(Statement::FunctionDeclaration {
            name,
            params,
            body,
            is_async: false,
            is_generator: false,
            position,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        self.consume(TokenKind::Return, "Expected 'return'")?;

        let argument = if self.check(TokenKind::Semicolon) || self.is_at_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.match_kind(TokenKind::Semicolon);

        Ok(Statement::Return { argument, position })
    }

    fn parse_block(&mut self) -> Result<Statement, RpError> {
        let position = self.peek_position();
        self.consume(TokenKind::LBrace, "Expected '{'")?;

        let mut body = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RBrace, "Expected '}'")?;
        Ok(Statement::Block { body, position })
    }

    // Expressions, lowest precedence first.

    fn parse_expression(&mut self) -> Result<Expression, RpError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression, RpError> {
        let expr = self.parse_logical_or()?;

        if self.match_kind(TokenKind::Assign) {
            let position = expr.position();
            let value = self.parse_assignment()?;
            return match expr {
                Expression::Identifier { .. } => Ok(Expression::Assign {
                    target: Box::new(expr),
                    value: Box::new(value),
                    compound_op: None,
                    position,
                }),
                _ => Err(RpError::syntax("Invalid assignment target")),
            };
        }

        Ok(expr)
    }

    fn parse_logical_or(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_logical_and()?;
        while self.match_kind(TokenKind::OrOr) {
            let right = self.parse_logical_and()?;
            expr = binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_equality()?;
        while self.match_kind(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            expr = binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_relational()?;
        loop {
            let op = if self.match_kind(TokenKind::EqEq) {
                BinaryOp::Equal
            } else if self.match_kind(TokenKind::NotEq) {
                BinaryOp::NotEqual
            } else {
                break;
            };
            let right = self.parse_relational()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_relational(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = if self.match_kind(TokenKind::Lt) {
                BinaryOp::Less
            } else if self.match_kind(TokenKind::LtEq) {
                BinaryOp::LessEqual
            } else if self.match_kind(TokenKind::Gt) {
                BinaryOp::Greater
            } else if self.match_kind(TokenKind::GtEq) {
                BinaryOp::GreaterEqual
            } else {
                break;
            };
            let right = self.parse_additive()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = if self.match_kind(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.match_kind(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.match_kind(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.match_kind(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.match_kind(TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expression, RpError> {
        let op = if self.check(TokenKind::Not) {
            Some(UnaryOp::Not)
        } else if self.check(TokenKind::Minus) {
            Some(UnaryOp::Neg)
        } else {
            None
        };

        if let Some(op) = op {
            let token = self.advance().clone();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
                prefix: true,
                position: SourcePosition::new(token.line, token.column),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression, RpError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_kind(TokenKind::LParen) {
                let position = expr.position();
                let mut args = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
                expr = Expression::Call {
                    callee: Box::new(expr),
                    args,
                    position,
                };
            } else if self.match_kind(TokenKind::LBracket) {
                let position = expr.position();
                let index = self.parse_expression()?;
                self.consume(TokenKind::RBracket, "Expected ']' after array index")?;
                expr = Expression::Index {
                    array: Box::new(expr),
                    index: Box::new(index),
                    position,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, RpError> {
        let token = self.peek().clone();
        let position = SourcePosition::new(token.line, token.column);

        match token.kind {
            TokenKind::Number => {
                self.advance();
                Ok(literal(LiteralKind::Number, token.lexeme, position))
            }
            TokenKind::Float => {
                self.advance();
                Ok(literal(LiteralKind::Float, token.lexeme, position))
            }
            TokenKind::Str => {
                self.advance();
                Ok(literal(LiteralKind::String, token.lexeme, position))
            }
            // Character literals evaluate as one-character strings.
            TokenKind::Char => {
                self.advance();
                Ok(literal(LiteralKind::String, token.lexeme, position))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expression::Identifier {
                    name: token.lexeme,
                    position,
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(literal(LiteralKind::Bool, "true", position))
            }
            TokenKind::False => {
                self.advance();
                Ok(literal(LiteralKind::Bool, "false", position))
            }
            TokenKind::Null => {
                self.advance();
                Ok(literal(LiteralKind::Null, "null", position))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RBracket, "Expected ']' after array elements")?;
                Ok(Expression::ArrayLiteral { elements, position })
            }
            TokenKind::Eof => Err(RpError::syntax("Unexpected end of input")),
            _ => Err(
                RpError::syntax(format!("Unexpected token: {}", token.lexeme))
                    .with_position(position),
            ),
        }
    }

    // Token stream helpers.

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_position(&self) -> SourcePosition {
        let token = self.peek();
        SourcePosition::new(token.line, token.column)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, RpError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        let token = self.peek();
        Err(
            RpError::syntax(format!("{} at line {}", message, token.line))
                .with_position(SourcePosition::new(token.line, token.column)),
        )
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let position = left.position();
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        position,
    }
}

fn literal(kind: LiteralKind, text: impl Into<String>, position: SourcePosition) -> Expression {
    Expression::Literal {
        kind,
        text: text.into(),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Program, RpError> {
        Parser::new(Lexer::new(source).tokenize()).parse()
    }

    fn parse_ok(source: &str) -> Program {
        parse(source).unwrap()
    }

    #[test]
    fn test_precedence_multiplication_binds_tighter() {
        let program = parse_ok("1 + 2 * 3;");
        assert_eq!(program.to_string(), "(1 + (2 * 3));");
    }

    #[test]
    fn test_precedence_relational_vs_logical() {
        let program = parse_ok("a < 1 && b > 2 || !c;");
        assert_eq!(program.to_string(), "(((a < 1) && (b > 2)) || (!c));");
    }

    #[test]
    fn test_unary_is_right_associative() {
        // A space keeps the lexer from producing '--'.
        let program = parse_ok("- -1;");
        assert_eq!(program.to_string(), "(-(-1));");
        let program = parse_ok("!!x;");
        assert_eq!(program.to_string(), "(!(!x));");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let program = parse_ok("a = b = 1;");
        assert_eq!(program.to_string(), "(a = (b = 1));");
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("1 = 2;").unwrap_err();
        assert_eq!(err.message, "Invalid assignment target");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        let program = parse_ok("(1 + 2) * 3;");
        assert_eq!(program.to_string(), "((1 + 2) * 3);");
    }

    #[test]
    fn test_call_and_index_chain() {
        let program = parse_ok("f(1, 2)[0](3);");
        assert_eq!(program.to_string(), "f(1, 2)[0](3);");
    }

    #[test]
    fn test_array_literal() {
        let program = parse_ok("[1, 2.5, \"x\"];");
        assert_eq!(program.to_string(), "[1, 2.5, \"x\"];");
    }

    #[test]
    fn test_if_else_statement() {
        let program = parse_ok("if (x) { 1; } else { 2; }");
        assert_eq!(program.to_string(), "if (x) { 1; } else { 2; }");
    }

    #[test]
    fn test_while_statement() {
        let program = parse_ok("while (x < 3) { x = x + 1; }");
        assert_eq!(program.to_string(), "while ((x < 3)) { (x = (x + 1)); }");
    }

    #[test]
    fn test_for_statement() {
        let program = parse_ok("for (x = 0; x < 5; x = x + 1) {}");
        assert!(matches!(
            &program.body[0],
            Statement::For {
                init: Some(ForInit::Expression(_)),
                condition: Some(_),
                update: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_empty_for_clauses_are_legal() {
        let program = parse_ok("for (;;) {}");
        assert!(matches!(
            &program.body[0],
            Statement::For {
                init: None,
                condition: None,
                update: None,
                ..
            }
        ));
    }

    #[test]
    fn test_function_declaration() {
        let program = parse_ok("function add(a, b) { return a + b; }");
        match &program.body[0] {
            Statement::FunctionDeclaration { name, params, body, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params, &["a".to_string(), "b".to_string()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_return_without_value() {
        let program = parse_ok("function f() { return; }");
        match &program.body[0] {
            Statement::FunctionDeclaration { body, .. } => {
                assert!(matches!(body[0], Statement::Return { argument: None, .. }));
            }
            other => panic!("expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_var_declaration() {
        let program = parse_ok("var x = 1, y;");
        match &program.body[0] {
            Statement::VariableDeclaration { kind, declarations, .. } => {
                assert_eq!(*kind, VariableKind::Var);
                assert_eq!(declarations.len(), 2);
                assert!(declarations[0].init.is_some());
                assert!(declarations[1].init.is_none());
            }
            other => panic!("expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_consume_error_includes_line() {
        let err = parse("if (x { 1; }").unwrap_err();
        assert!(err.message.contains("Expected ')' after if condition"));
        assert!(err.message.contains("at line 1"));
    }

    #[test]
    fn test_unexpected_token_error() {
        let err = parse("1 + ;").unwrap_err();
        assert!(err.message.starts_with("Unexpected token"));
    }

    #[test]
    fn test_lex_error_token_is_rejected() {
        let err = parse("1 + @;").unwrap_err();
        assert!(err.message.contains("Unexpected token"));
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = parse("1 +").unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");
    }

    #[test]
    fn test_compound_assignment_is_not_wired() {
        // += is tokenized but the assignment parser only handles '='.
        assert!(parse("a += 1;").is_err());
    }

    #[test]
    fn test_statement_terminators_are_optional() {
        let program = parse_ok("1 + 2");
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_pretty_print_round_trip() {
        let sources = [
            "function f(a) { return (a + 1) * 2; }",
            "if (x < 3) { y = 1; } else { y = 2; }",
            "var a = [1, 2, 3]; a[0];",
            "while (!done) { step(); }",
        ];
        for source in sources {
            let first = parse_ok(source);
            let printed = first.to_string();
            let second = parse_ok(&printed);
            assert_eq!(printed, second.to_string(), "source: {}", source);
        }
    }

    #[test]
    fn test_synchronize_skips_to_statement_boundary() {
        let tokens = Lexer::new("@ @ ; var x = 1;").tokenize();
        let mut parser = Parser::new(tokens);
        assert!(parser.parse_statement().is_err());
        parser.synchronize();
        assert!(parser.parse_statement().is_ok());
    }

    #[test]
    fn test_synchronize_stops_before_keyword() {
        let tokens = Lexer::new("@ @ return 1;").tokenize();
        let mut parser = Parser::new(tokens);
        assert!(parser.parse_statement().is_err());
        parser.synchronize();
        assert_eq!(parser.peek().kind, TokenKind::Return);
    }
}
