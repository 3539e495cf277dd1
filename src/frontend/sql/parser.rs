use log::debug;

use crate::common::value::Value;
use crate::frontend::sql::ast::*;
use crate::frontend::sql::errors::ParseError;
use crate::frontend::sql::lexer::{Keyword, Lexeme, Token, tokenize};

/// Parses a single restricted SELECT statement.
///
/// ```text
/// SELECT <items|*> FROM <table> [JOIN <table> ON <col> = <col>]*
///     [WHERE <cmp> [(AND|OR) <cmp>]*] [LIMIT <n>] [;]
/// ```
///
/// AND and OR share one precedence level and fold left to right.
pub fn parse(sql: &str) -> Result<SelectStmt, ParseError> {
    let tokens = tokenize(sql)?;
    debug!("lexed {} tokens", tokens.len());
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_select()
}

struct Parser {
    tokens: Vec<Lexeme>,
    pos: usize,
}

impl Parser {
    fn parse_select(&mut self) -> Result<SelectStmt, ParseError> {
        self.expect_keyword(Keyword::Select, "SELECT")?;
        let projection = self.parse_projection()?;

        self.expect_keyword(Keyword::From, "FROM")?;
        let from = self.parse_table_ref()?;

        let mut joins = Vec::new();
        while self.eat_keyword(Keyword::Join) {
            joins.push(self.parse_join()?);
        }

        let selection = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_predicate()?)
        } else {
            None
        };

        let limit = if self.eat_keyword(Keyword::Limit) {
            Some(self.parse_limit()?)
        } else {
            None
        };

        self.eat(&Token::Semicolon);
        if self.peek().token != Token::EOF {
            return Err(self.expected("end of statement"));
        }

        Ok(SelectStmt {
            projection,
            from,
            joins,
            selection,
            limit,
        })
    }

    fn parse_projection(&mut self) -> Result<Projection, ParseError> {
        if self.eat(&Token::Star) {
            return Ok(Projection::Wildcard);
        }
        if !matches!(self.peek().token, Token::Ident(_)) {
            return Err(self.expected("column list"));
        }

        let mut items = vec![self.parse_select_item()?];
        while self.eat(&Token::Comma) {
            items.push(self.parse_select_item()?);
        }
        Ok(Projection::Items(items))
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        let column = self.parse_column_ref()?;

        let op = match self.peek().token {
            Token::Plus => ArithOp::Add,
            Token::Minus => ArithOp::Sub,
            Token::Star => ArithOp::Mul,
            Token::Slash => ArithOp::Div,
            _ => return Ok(SelectItem::Column(column)),
        };
        self.advance();

        let start = self.pos;
        match self.parse_literal()? {
            Some(operand @ (Value::Int64(_) | Value::Float64(_))) => {
                let text = self.tokens[start..self.pos]
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<String>();
                Ok(SelectItem::Arithmetic {
                    column,
                    op,
                    operand,
                    text,
                })
            }
            _ => {
                self.pos = start;
                Err(self.expected("number"))
            }
        }
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let lexeme = self.peek().clone();
        match lexeme.token {
            Token::Ident(name) => {
                self.advance();
                Ok(TableRef {
                    name,
                    position: lexeme.position,
                })
            }
            _ => Err(self.expected("table name")),
        }
    }

    fn parse_join(&mut self) -> Result<JoinClause, ParseError> {
        let table = self.parse_table_ref()?;
        self.expect_keyword(Keyword::On, "ON")?;
        let left = self.parse_column_ref()?;
        if !self.eat(&Token::Eq) {
            return Err(self.expected("'='"));
        }
        let right = self.parse_column_ref()?;
        Ok(JoinClause { table, left, right })
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef, ParseError> {
        let lexeme = self.peek().clone();
        let first = match lexeme.token {
            Token::Ident(name) => name,
            _ => return Err(self.expected("column name")),
        };
        self.advance();

        if !self.eat(&Token::Dot) {
            return Ok(ColumnRef {
                table: None,
                name: first,
                position: lexeme.position,
            });
        }

        match self.peek().token.clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(ColumnRef {
                    table: Some(first),
                    name,
                    position: lexeme.position,
                })
            }
            _ => Err(self.expected("column name")),
        }
    }

    fn parse_predicate(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_comparison()?;

        loop {
            let op = if self.eat_keyword(Keyword::And) {
                LogicalOp::And
            } else if self.eat_keyword(Keyword::Or) {
                LogicalOp::Or
            } else {
                break;
            };

            let rhs = self.parse_comparison()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(rhs),
            };
        }

        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_operand()?;

        let op = match self.peek().token {
            Token::Eq => CompareOp::Eq,
            Token::NotEq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Lte,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Gte,
            _ => return Err(self.expected("comparison operator")),
        };
        self.advance();

        let right = self.parse_operand()?;
        Ok(Expr::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek().token, Token::Ident(_)) {
            return Ok(Expr::Column(self.parse_column_ref()?));
        }
        match self.parse_literal()? {
            Some(value) => Ok(Expr::Literal(value)),
            None => Err(self.expected("column or literal")),
        }
    }

    /// Parses `[-] number` or a string literal. Returns `None` without consuming
    /// anything when the next token does not start a literal.
    fn parse_literal(&mut self) -> Result<Option<Value>, ParseError> {
        let negative = self.peek().token == Token::Minus;
        if negative {
            self.advance();
        }

        let value = match self.peek().token.clone() {
            Token::Int(v) if negative => Value::Int64(-v),
            Token::Int(v) => Value::Int64(v),
            Token::Float(v) if negative => Value::Float64(-v),
            Token::Float(v) => Value::Float64(v),
            Token::String(s) if !negative => Value::String(s),
            _ if negative => return Err(self.expected("number")),
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(value))
    }

    fn parse_limit(&mut self) -> Result<usize, ParseError> {
        let lexeme = self.peek().clone();
        match lexeme.token {
            Token::Int(n) => {
                self.advance();
                usize::try_from(n).map_err(|_| ParseError::InvalidLiteral {
                    literal: lexeme.text,
                    position: lexeme.position,
                })
            }
            _ => Err(self.expected("row count after LIMIT")),
        }
    }

    // ---------- token helpers ----------

    fn peek(&self) -> &Lexeme {
        // the token stream always ends with EOF, which is never consumed
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.peek().token != Token::EOF {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if &self.peek().token == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        self.eat(&Token::Keyword(kw))
    }

    fn expect_keyword(&mut self, kw: Keyword, name: &str) -> Result<(), ParseError> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.expected(name))
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        let lexeme = self.peek();
        ParseError::Expected {
            expected: what.to_string(),
            found: lexeme.describe(),
            position: lexeme.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_where_limit() {
        let stmt = parse(
            "SELECT name FROM users JOIN orders ON users.id = orders.user_id WHERE age > 25 LIMIT 10;",
        )
        .unwrap();

        assert_eq!(stmt.from.name, "users");
        assert_eq!(stmt.joins.len(), 1);
        assert_eq!(stmt.joins[0].table.name, "orders");
        assert_eq!(stmt.joins[0].left.display_name(), "users.id");
        assert_eq!(stmt.joins[0].right.display_name(), "orders.user_id");
        assert_eq!(stmt.limit, Some(10));
        assert_eq!(stmt.selection.unwrap().to_string(), "age > 25");
    }

    #[test]
    fn parses_wildcard() {
        let stmt = parse("select * from users").unwrap();
        assert_eq!(stmt.projection, Projection::Wildcard);
        assert!(stmt.selection.is_none());
        assert!(stmt.limit.is_none());
    }

    #[test]
    fn and_or_fold_left_to_right() {
        let stmt = parse("SELECT a FROM t WHERE a = 1 AND b = 2 OR c = 3 AND d = 4").unwrap();

        // (((a = 1 AND b = 2) OR c = 3) AND d = 4)
        match stmt.selection.unwrap() {
            Expr::Logical { left, op, .. } => {
                assert_eq!(op, LogicalOp::And);
                match *left {
                    Expr::Logical { op, .. } => assert_eq!(op, LogicalOp::Or),
                    other => panic!("expected OR, got {other:?}"),
                }
            }
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn parses_literal_kinds() {
        let stmt = parse("SELECT a FROM t WHERE a = 'Bob' OR b < -2 OR c >= 1.5").unwrap();
        assert_eq!(
            stmt.selection.unwrap().to_string(),
            "a = 'Bob' OR b < -2 OR c >= 1.5"
        );
    }

    #[test]
    fn parses_arithmetic_items() {
        let stmt = parse("SELECT id, age + 100, score * 1.5 FROM t").unwrap();
        let Projection::Items(items) = stmt.projection else {
            panic!("expected items");
        };

        assert_eq!(items.len(), 3);
        match &items[1] {
            SelectItem::Arithmetic {
                column,
                op,
                operand,
                text,
            } => {
                assert_eq!(column.name, "age");
                assert_eq!(*op, ArithOp::Add);
                assert_eq!(*operand, Value::Int64(100));
                assert_eq!(text, "100");
            }
            other => panic!("expected arithmetic, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_list_points_at_from() {
        let err = parse("SELECT FROM users").unwrap_err();

        assert_eq!(err.position().column, 8);
        assert_eq!(err.message(), "expected column list, found FROM");
    }

    #[test]
    fn missing_from_is_reported() {
        let err = parse("SELECT name users").unwrap_err();
        assert_eq!(err.message(), "expected FROM, found users");
    }

    #[test]
    fn join_requires_equality() {
        let err = parse("SELECT a FROM t JOIN u ON t.a < u.b").unwrap_err();
        assert_eq!(err.message(), "expected '=', found <");
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse("SELECT a FROM t LIMIT 1 2").unwrap_err();
        assert_eq!(err.message(), "expected end of statement, found 2");
    }

    #[test]
    fn parentheses_are_not_supported() {
        let err = parse("SELECT a FROM t WHERE (a = 1)").unwrap_err();
        assert_eq!(err.message(), "expected column or literal, found (");
    }

    #[test]
    fn incomplete_predicate_reports_end_of_input() {
        let err = parse("SELECT a FROM t WHERE a >").unwrap_err();
        assert_eq!(
            err.message(),
            "expected column or literal, found end of input"
        );
    }
}
