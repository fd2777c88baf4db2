// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Recursive-descent parser for class definition files

use crate::ast::{
    Accessor, AccessorKind, Attribute, AttributeValue, Block, BlockKind, Body, BodyPiece, ClassDeclaration, CommentBlock, Declaration, DeclarationKind, LineRange,
    QualifiedName,
};
use crate::parser::common::{Delimiter, Keyword, Operator, ParseError, ParseErrorKind, ParseResult, ParserConfig, Token, TokenType};
use crate::parser::traits::SyntaxParser;
use tracing::debug;

/// Class definition syntax parser
pub struct ClassdefSyntaxParser<'src> {
    source: &'src str,
    config: ParserConfig,
}

impl<'src> ClassdefSyntaxParser<'src> {
    /// Create a parser over the source the tokens were scanned from
    pub fn new(source: &'src str, config: ParserConfig) -> Self {
        Self { source, config }
    }
}

impl<'src> SyntaxParser<ClassDeclaration> for ClassdefSyntaxParser<'src> {
    fn parse_tokens(&mut self, tokens: &[Token]) -> ParseResult<ClassDeclaration> {
        if !tokens.last().is_some_and(|t| t.token_type == TokenType::Eof) {
            return Err(ParseError::unexpected_eof(crate::parser::common::Position::start(), "token stream ending in end of file"));
        }
        ClassParser::new(self.source, tokens, &self.config).parse_file()
    }

    fn name(&self) -> &'static str {
        "classdef"
    }
}

/// A scanned comment before grouping into blocks
struct RawComment {
    block: CommentBlock,
    delimited: bool,
}

/// Parsed method signature
struct Signature {
    name: String,
    accessor: Option<Accessor>,
    params: Vec<String>,
    returns: Vec<String>,
}

struct ClassParser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    config: &'a ParserConfig,
    pos: usize,
    last_consumed: Option<&'a Token>,
    comments: Vec<RawComment>,
}

impl<'a> ClassParser<'a> {
    fn new(source: &'a str, tokens: &'a [Token], config: &'a ParserConfig) -> Self {
        Self {
            source,
            tokens,
            config,
            pos: 0,
            last_consumed: None,
            comments: Vec::new(),
        }
    }

    fn parse_file(mut self) -> ParseResult<ClassDeclaration> {
        self.skip_layout(true);

        let classdef = self.peek();
        match &classdef.token_type {
            TokenType::Keyword(Keyword::Classdef) => {}
            TokenType::Eof => return Err(ParseError::unsupported(classdef.span.start, "a file without a class definition")),
            _ => return Err(ParseError::unsupported(classdef.span.start, "a file that does not start with 'classdef'")),
        }
        self.advance();

        let attributes = if self.check_delimiter(Delimiter::LeftParen) { self.parse_attribute_list()? } else { Vec::new() };
        let (name_token, name) = self.expect_identifier("class name")?;
        let superclasses = if self.peek().is_operator(&Operator::Less) {
            self.advance();
            self.parse_superclasses()?
        } else {
            Vec::new()
        };
        let header = LineRange::new(classdef.line(), self.last_line());
        self.end_header()?;
        debug!(class = %name, superclasses = superclasses.len(), "parsed class header");

        let mut blocks = Vec::new();
        loop {
            self.skip_layout(true);
            let token = self.peek();
            match (structural_keyword(token), &token.token_type) {
                (Some(Keyword::End), _) => {
                    self.advance();
                    break;
                }
                (Some(Keyword::Properties), _) => blocks.push(self.parse_block(BlockKind::Properties)?),
                (Some(Keyword::Methods), _) => blocks.push(self.parse_block(BlockKind::Methods)?),
                (Some(Keyword::Events), _) => blocks.push(self.parse_block(BlockKind::Events)?),
                (Some(Keyword::Enumeration), _) => return Err(ParseError::unsupported(token.span.start, "an enumeration block")),
                (_, TokenType::Keyword(keyword)) => return Err(unrecognized_block(token, keyword.as_str())),
                (_, TokenType::Identifier(word)) => return Err(unrecognized_block(token, word)),
                (_, TokenType::Eof) => return Err(ParseError::unexpected_eof(token.span.start, &format!("'end' closing class '{}'", name))),
                _ => return Err(self.unexpected(token, "a block keyword")),
            }
        }

        self.parse_local_functions()?;

        let class = ClassDeclaration {
            name,
            superclasses,
            attributes,
            blocks,
            comments: group_comments(std::mem::take(&mut self.comments)),
            header,
            position: name_token.span.start,
        };
        validate_accessors(&class)?;
        Ok(class)
    }

    fn parse_superclasses(&mut self) -> ParseResult<Vec<QualifiedName>> {
        let mut superclasses = vec![self.parse_qualified_name("superclass name")?];
        loop {
            let token = self.peek();
            if token.is_operator(&Operator::Ampersand) || token.is_delimiter(Delimiter::Comma) {
                self.advance();
                self.skip_layout(true);
                superclasses.push(self.parse_qualified_name("superclass name")?);
            } else if token.token_type == TokenType::Newline && self.list_continues_after_newline() {
                self.skip_layout(true);
                superclasses.push(self.parse_qualified_name("superclass name")?);
            } else {
                return Ok(superclasses);
            }
        }
    }

    /// A superclass list continues when the next statement starts with a plain identifier
    fn list_continues_after_newline(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !matches!(t.token_type, TokenType::Newline | TokenType::Comment(_) | TokenType::BlockComment(_) | TokenType::Continuation(_)))
            .is_some_and(|t| matches!(t.token_type, TokenType::Identifier(_)))
    }

    fn parse_block(&mut self, kind: BlockKind) -> ParseResult<Block> {
        let keyword = self.advance();
        let attributes = if self.check_delimiter(Delimiter::LeftParen) { self.parse_attribute_list()? } else { Vec::new() };
        self.end_header()?;

        let abstract_block = kind == BlockKind::Methods && asserts(&attributes, "Abstract");
        let mut members = Vec::new();
        loop {
            self.skip_layout(true);
            let token = self.peek();
            match (structural_keyword(token), &token.token_type, kind) {
                (Some(Keyword::End), _, _) => {
                    self.advance();
                    break;
                }
                (Some(Keyword::Function), _, BlockKind::Methods) => members.push(self.parse_function(abstract_block)?),
                (_, TokenType::Eof, _) => return Err(ParseError::unexpected_eof(token.span.start, &format!("'end' closing {} block", kind))),
                (None, TokenType::Identifier(_), BlockKind::Properties) => members.push(self.parse_property()?),
                (None, TokenType::Identifier(_), BlockKind::Events) => members.push(self.parse_event()?),
                (None, TokenType::Identifier(_) | TokenType::Delimiter(Delimiter::LeftBracket), BlockKind::Methods) => {
                    members.push(self.parse_bare_signature(abstract_block)?)
                }
                _ => return Err(self.unexpected(token, &format!("a member declaration or 'end' in {} block", kind))),
            }
        }

        debug!(kind = %kind, members = members.len(), "parsed block");
        Ok(Block {
            kind,
            attributes,
            members,
            position: keyword.span.start,
        })
    }

    fn parse_attribute_list(&mut self) -> ParseResult<Vec<Attribute>> {
        self.expect_delimiter(Delimiter::LeftParen, "'('")?;
        let mut attributes = Vec::new();

        loop {
            self.skip_newlines();
            if self.check_delimiter(Delimiter::RightParen) {
                self.advance();
                return Ok(attributes);
            }

            let negated = self.peek().is_operator(&Operator::Tilde);
            if negated {
                self.advance();
            }
            let (name_token, name) = self.expect_identifier("attribute name")?;
            self.skip_newlines();

            let value = if !negated && self.peek().is_operator(&Operator::Assign) {
                self.advance();
                self.skip_newlines();
                self.parse_attribute_value()?
            } else {
                AttributeValue::Flag(!negated)
            };
            attributes.push(Attribute {
                name,
                value,
                position: name_token.span.start,
            });

            self.skip_newlines();
            let separator = self.peek();
            if separator.is_delimiter(Delimiter::Comma) {
                self.advance();
            } else if !separator.is_delimiter(Delimiter::RightParen) {
                return Err(self.unexpected(separator, "',' or ')' in attribute list"));
            }
        }
    }

    fn parse_attribute_value(&mut self) -> ParseResult<AttributeValue> {
        let first = self.peek();
        let mut last = first;
        let mut count = 0usize;
        let mut depth = 0usize;

        loop {
            let token = self.peek();
            match &token.token_type {
                TokenType::Eof => return Err(ParseError::unexpected_eof(token.span.start, "')' closing attribute list")),
                TokenType::Delimiter(Delimiter::Comma | Delimiter::RightParen) if depth == 0 => break,
                TokenType::Delimiter(d) if d.is_opening() => depth += 1,
                TokenType::Delimiter(d) if d.is_closing() => depth = depth.saturating_sub(1),
                _ => {}
            }
            last = token;
            count += 1;
            self.advance();
        }

        if count == 0 {
            return Err(self.unexpected(first, "attribute value"));
        }
        let value = match (&first.token_type, count) {
            (TokenType::Identifier(word), 1) if word.eq_ignore_ascii_case("true") => AttributeValue::Flag(true),
            (TokenType::Identifier(word), 1) if word.eq_ignore_ascii_case("false") => AttributeValue::Flag(false),
            (TokenType::Identifier(word), 1) => AttributeValue::Word(word.clone()),
            (TokenType::CharLiteral(text) | TokenType::StringLiteral(text), 1) => AttributeValue::Word(text.clone()),
            _ => AttributeValue::Raw(self.source[first.offset..last.end_offset()].to_string()),
        };
        Ok(value)
    }

    fn parse_property(&mut self) -> ParseResult<Declaration> {
        let (name_token, name) = self.expect_identifier("property name")?;
        let mut type_ref = None;

        if self.peek().is_operator(&Operator::At) {
            self.advance();
            type_ref = Some(self.parse_qualified_name("property type")?);
            while matches!(self.peek().token_type, TokenType::Identifier(_)) {
                self.advance();
            }
        } else {
            if self.check_delimiter(Delimiter::LeftParen) {
                self.skip_group()?;
            }
            if matches!(self.peek().token_type, TokenType::Identifier(_)) {
                type_ref = Some(self.parse_qualified_name("property class")?);
            }
            if self.check_delimiter(Delimiter::LeftBrace) {
                self.skip_group()?;
            }
        }

        let default_value = if self.peek().is_operator(&Operator::Assign) {
            self.advance();
            Some(self.parse_default_value()?)
        } else {
            None
        };

        let header = LineRange::new(name_token.line(), self.last_line());
        self.end_statement()?;

        Ok(Declaration {
            kind: DeclarationKind::Property,
            name,
            type_ref,
            default_value,
            params: Vec::new(),
            returns: Vec::new(),
            body: None,
            is_abstract: false,
            accessor: None,
            header,
            position: name_token.span.start,
        })
    }

    /// Capture a default value verbatim up to the end of the statement
    fn parse_default_value(&mut self) -> ParseResult<String> {
        let first = self.peek();
        if is_statement_end(first) {
            return Err(self.unexpected(first, "default value"));
        }

        let mut last = first;
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match &token.token_type {
                TokenType::Eof => break,
                TokenType::Newline | TokenType::Comment(_) | TokenType::BlockComment(_) | TokenType::Delimiter(Delimiter::Comma | Delimiter::Semicolon)
                    if depth == 0 =>
                {
                    break;
                }
                TokenType::Delimiter(d) if d.is_opening() => depth += 1,
                TokenType::Delimiter(d) if d.is_closing() => depth = depth.saturating_sub(1),
                _ => {}
            }
            last = token;
            self.advance();
        }

        Ok(self.source[first.offset..last.end_offset()].to_string())
    }

    fn parse_event(&mut self) -> ParseResult<Declaration> {
        let (name_token, name) = self.expect_identifier("event name")?;
        let header = LineRange::new(name_token.line(), self.last_line());
        self.end_statement()?;

        Ok(Declaration {
            kind: DeclarationKind::Event,
            name,
            type_ref: None,
            default_value: None,
            params: Vec::new(),
            returns: Vec::new(),
            body: None,
            is_abstract: false,
            accessor: None,
            header,
            position: name_token.span.start,
        })
    }

    fn parse_function(&mut self, abstract_block: bool) -> ParseResult<Declaration> {
        let function = self.advance();
        let signature = self.parse_signature()?;
        let header = LineRange::new(function.line(), self.last_line());
        self.end_header()?;

        let body = if abstract_block { None } else { Some(self.parse_body(&signature.name)?) };
        Ok(self.method(signature, body, abstract_block, header, function))
    }

    fn parse_bare_signature(&mut self, abstract_block: bool) -> ParseResult<Declaration> {
        let first = self.peek();
        let signature = self.parse_signature()?;
        let header = LineRange::new(first.line(), self.last_line());
        self.end_statement()?;
        Ok(self.method(signature, None, abstract_block, header, first))
    }

    fn method(&self, signature: Signature, body: Option<Body>, is_abstract: bool, header: LineRange, first: &Token) -> Declaration {
        Declaration {
            kind: DeclarationKind::Method,
            name: signature.name,
            type_ref: None,
            default_value: None,
            params: signature.params,
            returns: signature.returns,
            body,
            is_abstract,
            accessor: signature.accessor,
            header,
            position: first.span.start,
        }
    }

    /// `[outs] = name(params)`, `out = name(params)` or `name(params)`
    fn parse_signature(&mut self) -> ParseResult<Signature> {
        let mut returns = Vec::new();

        if self.check_delimiter(Delimiter::LeftBracket) {
            self.advance();
            loop {
                self.skip_newlines();
                let token = self.peek();
                match &token.token_type {
                    TokenType::Delimiter(Delimiter::RightBracket) => {
                        self.advance();
                        break;
                    }
                    TokenType::Delimiter(Delimiter::Comma) => {
                        self.advance();
                    }
                    TokenType::Identifier(name) => {
                        returns.push(name.clone());
                        self.advance();
                    }
                    _ => return Err(self.unexpected(token, "return value name or ']'")),
                }
            }
            self.expect_operator(Operator::Assign, "'=' after return values")?;
        } else if matches!(self.peek_nth(1).token_type, TokenType::Operator(Operator::Assign)) {
            let (_, output) = self.expect_identifier("return value name")?;
            returns.push(output);
            self.advance();
        }

        let (_, first) = self.expect_identifier("function name")?;
        let mut segments = vec![first];
        while self.peek().is_operator(&Operator::Dot) {
            self.advance();
            let (_, segment) = self.expect_identifier("name after '.'")?;
            segments.push(segment);
        }

        let accessor = match segments.as_slice() {
            [prefix, property] if prefix == "get" || prefix == "set" => Some(Accessor {
                kind: if prefix == "get" { AccessorKind::Get } else { AccessorKind::Set },
                property: property.clone(),
            }),
            _ => None,
        };
        let name = match &accessor {
            Some(accessor) => accessor.property.clone(),
            None => segments.join("."),
        };

        let mut params = Vec::new();
        if self.check_delimiter(Delimiter::LeftParen) {
            self.advance();
            loop {
                self.skip_newlines();
                let token = self.peek();
                match &token.token_type {
                    TokenType::Delimiter(Delimiter::RightParen) => {
                        self.advance();
                        break;
                    }
                    TokenType::Delimiter(Delimiter::Comma) => {
                        self.advance();
                    }
                    TokenType::Identifier(param) => {
                        params.push(param.clone());
                        self.advance();
                    }
                    TokenType::Operator(Operator::Tilde) => {
                        params.push("~".to_string());
                        self.advance();
                    }
                    _ => return Err(self.unexpected(token, "parameter name or ')'")),
                }
            }
        }

        Ok(Signature { name, accessor, params, returns })
    }

    /// Parse a function body up to its closing `end`
    fn parse_body(&mut self, name: &str) -> ParseResult<Body> {
        let first_index = self.pos;
        let mut depth = 1usize;
        let mut index = first_index;

        let end_index = loop {
            let token = &self.tokens[index];
            match token.token_type {
                TokenType::Eof => return Err(ParseError::unexpected_eof(token.span.start, &format!("'end' closing function '{}'", name))),
                TokenType::Keyword(Keyword::End) => {
                    depth -= 1;
                    if depth == 0 {
                        break index;
                    }
                }
                TokenType::Keyword(keyword) if keyword.opens_body_construct() => {
                    depth += 1;
                    if depth > self.config.max_nesting_depth {
                        return Err(ParseError::unsupported(token.span.start, "nesting deeper than the configured limit"));
                    }
                }
                _ => {}
            }
            index += 1;
        };

        let body_tokens = &self.tokens[first_index..end_index];
        let end_token = &self.tokens[end_index];
        let doc_len = leading_doc_len(body_tokens);
        let doc = self.comment_group(&body_tokens[..doc_len]);
        let start = match doc_len.checked_sub(1) {
            Some(last_doc) => body_tokens[last_doc].end_offset(),
            None => self.last_consumed.map_or(end_token.offset, |t| t.end_offset()),
        };
        let pieces = self.body_pieces(&body_tokens[doc_len..], start, end_token.offset);

        self.pos = end_index;
        self.advance();
        Ok(Body { doc, pieces })
    }

    /// Split body text into verbatim code, comments and literals
    fn body_pieces(&self, tokens: &[Token], start: usize, end: usize) -> Vec<BodyPiece> {
        let mut pieces = Vec::new();
        let mut cursor = start;
        for token in tokens {
            let piece = match &token.token_type {
                TokenType::Comment(text) => BodyPiece::Comment(vec![text.clone()]),
                TokenType::BlockComment(lines) => BodyPiece::Comment(lines.clone()),
                TokenType::CharLiteral(text) | TokenType::StringLiteral(text) => BodyPiece::Literal(text.clone()),
                TokenType::Continuation(text) => {
                    push_code(&mut pieces, &self.source[cursor..token.offset]);
                    push_code(&mut pieces, "...");
                    if !text.trim().is_empty() {
                        pieces.push(BodyPiece::Comment(vec![text.clone()]));
                    }
                    cursor = token.end_offset();
                    continue;
                }
                _ => continue,
            };
            push_code(&mut pieces, &self.source[cursor..token.offset]);
            pieces.push(piece);
            cursor = token.end_offset();
        }
        push_code(&mut pieces, &self.source[cursor..end]);
        pieces
    }

    fn parse_local_functions(&mut self) -> ParseResult<()> {
        loop {
            self.skip_layout(false);
            let token = self.peek();
            match &token.token_type {
                TokenType::Eof => return Ok(()),
                TokenType::Keyword(Keyword::Function) if self.config.allow_local_functions => {
                    let function = self.parse_function(false)?;
                    debug!(function = %function.name, "dropping local function");
                }
                TokenType::Keyword(Keyword::Function) => return Err(ParseError::unsupported(token.span.start, "a local function after the class definition")),
                _ => return Err(self.unexpected(token, "end of file after class definition")),
            }
        }
    }

    fn parse_qualified_name(&mut self, what: &str) -> ParseResult<QualifiedName> {
        let (_, first) = self.expect_identifier(what)?;
        let mut segments = vec![first];
        while self.peek().is_operator(&Operator::Dot) {
            self.advance();
            let (_, segment) = self.expect_identifier(what)?;
            segments.push(segment);
        }
        Ok(QualifiedName::new(segments))
    }

    /// Skip a balanced bracket group starting at the current opener
    fn skip_group(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            let token = self.advance();
            match token.token_type {
                TokenType::Eof => return Err(ParseError::unexpected_eof(token.span.start, "closing bracket")),
                TokenType::Delimiter(d) if d.is_opening() => depth += 1,
                TokenType::Delimiter(d) if d.is_closing() => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip statement separators and blank lines; class-level comments are recorded when `record` is set
    fn skip_layout(&mut self, record: bool) {
        loop {
            let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
            match &token.token_type {
                TokenType::Newline | TokenType::Continuation(_) | TokenType::Delimiter(Delimiter::Comma | Delimiter::Semicolon) => {}
                TokenType::Comment(_) | TokenType::BlockComment(_) => {
                    if record {
                        if let Some(comment) = self.raw_comment(token) {
                            self.comments.push(comment);
                        }
                    }
                }
                _ => return,
            }
            self.pos += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().token_type, TokenType::Newline | TokenType::Comment(_) | TokenType::BlockComment(_)) {
            self.advance();
        }
    }

    fn end_statement(&mut self) -> ParseResult<()> {
        let token = self.peek();
        if is_statement_end(token) { Ok(()) } else { Err(self.unexpected(token, "end of statement")) }
    }

    /// Class, block and function headers may be followed by their first statement on the same line
    fn end_header(&mut self) -> ParseResult<()> {
        let token = self.peek();
        if is_statement_end(token) || matches!(token.token_type, TokenType::Identifier(_) | TokenType::Delimiter(Delimiter::LeftBracket)) {
            Ok(())
        } else {
            Err(self.unexpected(token, "end of statement"))
        }
    }

    fn raw_comment(&self, token: &Token) -> Option<RawComment> {
        let (lines, delimited) = match &token.token_type {
            TokenType::Comment(text) => (vec![text.clone()], false),
            TokenType::BlockComment(lines) => (lines.clone(), true),
            _ => return None,
        };
        Some(RawComment {
            block: CommentBlock {
                lines,
                first_line: token.span.start.line,
                last_line: token.span.end.line,
                own_line: self.starts_line(token),
                position: token.span.start,
            },
            delimited,
        })
    }

    fn comment_group(&self, tokens: &[Token]) -> Option<CommentBlock> {
        let raw = tokens.iter().filter_map(|t| self.raw_comment(t)).collect();
        group_comments(raw).into_iter().next()
    }

    fn starts_line(&self, token: &Token) -> bool {
        let before = &self.source[..token.offset];
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        before[line_start..].trim().is_empty()
    }

    /// Current token, skipping continuations
    fn peek(&self) -> &'a Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &'a Token {
        let last = self.tokens.len() - 1;
        let mut index = self.pos;
        let mut remaining = n;
        loop {
            while index < last && matches!(self.tokens[index].token_type, TokenType::Continuation(_)) {
                index += 1;
            }
            if remaining == 0 || index >= last {
                return &self.tokens[index.min(last)];
            }
            remaining -= 1;
            index += 1;
        }
    }

    fn advance(&mut self) -> &'a Token {
        let last = self.tokens.len() - 1;
        while self.pos < last && matches!(self.tokens[self.pos].token_type, TokenType::Continuation(_)) {
            self.pos += 1;
        }
        let token = &self.tokens[self.pos.min(last)];
        if self.pos < last {
            self.pos += 1;
        }
        self.last_consumed = Some(token);
        token
    }

    fn last_line(&self) -> usize {
        self.last_consumed.map_or(1, |t| t.span.end.line.max(t.span.start.line))
    }

    fn check_delimiter(&self, delimiter: Delimiter) -> bool {
        self.peek().is_delimiter(delimiter)
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<(&'a Token, String)> {
        let token = self.peek();
        match &token.token_type {
            TokenType::Identifier(name) => {
                self.advance();
                Ok((token, name.clone()))
            }
            _ => Err(self.unexpected(token, what)),
        }
    }

    fn expect_delimiter(&mut self, delimiter: Delimiter, what: &str) -> ParseResult<&'a Token> {
        let token = self.peek();
        if token.is_delimiter(delimiter) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(token, what))
        }
    }

    fn expect_operator(&mut self, operator: Operator, what: &str) -> ParseResult<&'a Token> {
        let token = self.peek();
        if token.is_operator(&operator) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(token, what))
        }
    }

    fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        match token.token_type {
            TokenType::Eof => ParseError::unexpected_eof(token.span.start, expected),
            TokenType::Newline => ParseError::unexpected_token(token.span.start, "end of line".to_string(), Some(expected.to_string())),
            _ => ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some(expected.to_string())),
        }
    }
}

fn unrecognized_block(token: &Token, word: &str) -> ParseError {
    ParseError::new(ParseErrorKind::UnrecognizedBlock, token.span.start, format!("unrecognized block keyword '{}'", word))
}

/// Keyword tokens only appear at statement starts, so they also end the previous statement
fn is_statement_end(token: &Token) -> bool {
    token.is_statement_end() || token.is_keyword() || matches!(token.token_type, TokenType::Comment(_) | TokenType::BlockComment(_))
}

/// Structural keywords, also when written on the same line as the previous header
fn structural_keyword(token: &Token) -> Option<Keyword> {
    match &token.token_type {
        TokenType::Keyword(keyword) => Some(*keyword),
        TokenType::Identifier(word) => Keyword::from_statement_start(word).filter(|keyword| {
            matches!(keyword, Keyword::Properties | Keyword::Methods | Keyword::Events | Keyword::Enumeration | Keyword::Function | Keyword::End)
        }),
        _ => None,
    }
}

/// Whether a boolean attribute is asserted anywhere in the list
fn asserts(attributes: &[Attribute], name: &str) -> bool {
    attributes.iter().any(|attribute| {
        attribute.name.eq_ignore_ascii_case(name)
            && match &attribute.value {
                AttributeValue::Flag(value) => *value,
                AttributeValue::Word(word) => word.eq_ignore_ascii_case("true"),
                AttributeValue::Raw(_) => false,
            }
    })
}

/// Number of body tokens making up the opening comment block
fn leading_doc_len(tokens: &[Token]) -> usize {
    let mut len = 0;
    let mut seen_comment = false;
    let mut previous_line = 0;
    for (index, token) in tokens.iter().enumerate() {
        match &token.token_type {
            TokenType::Newline | TokenType::Delimiter(Delimiter::Comma | Delimiter::Semicolon) => {}
            TokenType::Comment(_) if !seen_comment || token.line() == previous_line + 1 => {
                seen_comment = true;
                previous_line = token.line();
                len = index + 1;
            }
            TokenType::BlockComment(_) if !seen_comment => return index + 1,
            _ => break,
        }
    }
    len
}

fn push_code(pieces: &mut Vec<BodyPiece>, text: &str) {
    if text.is_empty() {
        return;
    }
    match pieces.last_mut() {
        Some(BodyPiece::Code(code)) => code.push_str(text),
        _ => pieces.push(BodyPiece::Code(text.to_string())),
    }
}

/// Join line comments on consecutive lines into blocks
fn group_comments(raw: Vec<RawComment>) -> Vec<CommentBlock> {
    let mut groups: Vec<CommentBlock> = Vec::new();
    let mut previous_delimited = true;

    for comment in raw {
        let joinable =
            !comment.delimited && !previous_delimited && comment.block.own_line && groups.last().is_some_and(|g| g.last_line + 1 == comment.block.first_line);
        previous_delimited = comment.delimited;

        if joinable {
            if let Some(group) = groups.last_mut() {
                group.lines.extend(comment.block.lines);
                group.last_line = comment.block.last_line;
            }
        } else {
            groups.push(comment.block);
        }
    }
    groups
}

/// Every accessor must serve a declared property with the right arity
fn validate_accessors(class: &ClassDeclaration) -> ParseResult<()> {
    for member in class.members() {
        let Some(accessor) = &member.accessor else {
            continue;
        };
        if class.property(&accessor.property).is_none() {
            return Err(ParseError::new(
                ParseErrorKind::UnknownAccessorTarget,
                member.position,
                format!("accessor '{}' refers to undeclared property '{}'", member.source_name(), accessor.property),
            ));
        }

        let expected = match accessor.kind {
            AccessorKind::Get => 0,
            AccessorKind::Set => 1,
        };
        let actual = member.params.len().saturating_sub(1);
        if member.params.is_empty() || actual != expected {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAccessor,
                member.position,
                format!(
                    "accessor '{}' must take the object and {} parameter{}, found {}",
                    member.source_name(),
                    expected,
                    if expected == 1 { "" } else { "s" },
                    actual
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classdef::ClassdefScanner;
    use crate::parser::common::{ErrorCategory, Position};
    use crate::parser::traits::Lexer;

    fn parse(source: &str) -> ParseResult<ClassDeclaration> {
        let tokens = ClassdefScanner::new().tokenize(source)?;
        ClassdefSyntaxParser::new(source, ParserConfig::default()).parse_tokens(&tokens)
    }

    fn members(class: &ClassDeclaration) -> Vec<&Declaration> {
        class.members().collect()
    }

    #[test]
    fn test_header_and_constant_block() {
        let class = parse("classdef A < B.C\n  properties(Constant)\n    x = 1;\n  end\nend\n").unwrap();
        assert_eq!(class.name, "A");
        assert_eq!(class.superclasses, vec![QualifiedName::from_dotted("B.C")]);
        assert_eq!(class.blocks[0].attributes[0].name, "Constant");
        assert_eq!(class.blocks[0].attributes[0].value, AttributeValue::Flag(true));
        assert_eq!(members(&class)[0].default_value.as_deref(), Some("1"));
    }

    #[test]
    fn test_single_line_class() {
        let class = parse("classdef A < B.C  properties(Constant)  x = 1;  end end").unwrap();
        assert_eq!(class.blocks.len(), 1);
        assert_eq!(members(&class)[0].name, "x");
    }

    #[test]
    fn test_superclass_list_forms() {
        let class = parse("classdef (Sealed) A < a.b & c ...\n   & d.e\n  methods\n  end\nend").unwrap();
        let names: Vec<_> = class.superclasses.iter().map(|s| s.dotted()).collect();
        assert_eq!(names, vec!["a.b", "c", "d.e"]);
        assert_eq!(class.attributes[0].name, "Sealed");

        let class = parse("classdef A < a.b &\n  c\nend").unwrap();
        assert_eq!(class.superclasses.len(), 2);
    }

    #[test]
    fn test_attribute_values() {
        let class = parse("classdef A\n properties (SetAccess = private, ~Hidden, GetAccess='protected', Transient = true)\n p\n end\nend").unwrap();
        let attributes = &class.blocks[0].attributes;
        assert_eq!(attributes[0].value, AttributeValue::Word("private".into()));
        assert_eq!(attributes[1].value, AttributeValue::Flag(false));
        assert_eq!(attributes[2].value, AttributeValue::Word("protected".into()));
        assert_eq!(attributes[3].value, AttributeValue::Flag(true));

        let class = parse("classdef A\n methods (Access = {?B, ?C})\n end\nend").unwrap();
        assert_eq!(class.blocks[0].attributes[0].value, AttributeValue::Raw("{?B, ?C}".into()));
    }

    #[test]
    fn test_multiline_default_is_verbatim() {
        let source = "classdef A\n properties\n  s = struct('a', [], ... note\n     'b', {'c'}) % doc\n  t@pkg.Type\n  u (1,1) double {mustBePositive} = 3\n end\nend";
        let class = parse(source).unwrap();
        let props = members(&class);
        assert_eq!(props[0].default_value.as_deref(), Some("struct('a', [], ... note\n     'b', {'c'})"));
        assert_eq!(props[0].header, LineRange::new(3, 4));
        assert_eq!(props[1].type_ref, Some(QualifiedName::from_dotted("pkg.Type")));
        assert_eq!(props[2].type_ref, Some(QualifiedName::from_dotted("double")));
        assert_eq!(props[2].default_value.as_deref(), Some("3"));
    }

    #[test]
    fn test_methods_and_signatures() {
        let source = "classdef A\n methods\n  function [a, b] = two(obj, x)\n   if x, a = 1; end\n   b = 2;\n  end\n  function obj = A(p)\n  end\n  r = proto(obj, y)\n end\n methods (Abstract)\n  function r = abs1(obj)\n  [c d] = abs2(obj)\n end\nend";
        let class = parse(source).unwrap();
        let methods = members(&class);
        assert_eq!(methods[0].returns, vec!["a", "b"]);
        assert_eq!(methods[0].params, vec!["obj", "x"]);
        assert!(methods[0].body.is_some());
        assert!(class.is_constructor(methods[1]));
        assert!(methods[2].body.is_none() && !methods[2].is_abstract);
        assert!(methods[3].is_abstract && methods[3].body.is_none());
        assert_eq!(methods[4].returns, vec!["c", "d"]);
    }

    #[test]
    fn test_accessor_and_body_doc() {
        let source = "classdef A\n properties\n  prop\n end\n methods\n  function v = get.prop(this)\n   % getter doc\n   % second line\n   v = 'x'; % inline\n  end\n end\nend";
        let class = parse(source).unwrap();
        let getter = members(&class)[1];
        assert_eq!(getter.accessor, Some(Accessor { kind: AccessorKind::Get, property: "prop".into() }));
        let body = getter.body.as_ref().unwrap();
        let doc = body.doc.as_ref().unwrap();
        assert_eq!(doc.lines, vec![" getter doc", " second line"]);
        assert!(body.pieces.contains(&BodyPiece::Literal("x".into())));
        assert!(body.pieces.contains(&BodyPiece::Comment(vec![" inline".into()])));
        assert!(!body.pieces.iter().any(|p| matches!(p, BodyPiece::Comment(lines) if lines[0].contains("getter"))));
    }

    #[test]
    fn test_comment_grouping() {
        let source = "% lead 1\n% lead 2\nclassdef A % same line\n % next\n\n % free\n properties\n end\nend";
        let class = parse(source).unwrap();
        assert_eq!(class.comments.len(), 3);
        assert_eq!(class.comments[0].lines, vec![" lead 1", " lead 2"]);
        assert!(!class.comments[1].own_line);
        assert_eq!(class.comments[1].lines, vec![" same line", " next"]);
        assert_eq!((class.comments[2].first_line, class.comments[2].last_line), (6, 6));
    }

    #[test]
    fn test_local_functions_dropped() {
        let class = parse("classdef A\nend\nfunction helper(x)\n  disp(x)\nend\n").unwrap();
        assert!(class.blocks.is_empty());
    }

    #[test]
    fn test_structural_errors() {
        let err = parse("function f()\nend").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnsupportedConstructError);

        let err = parse("classdef A\n enumeration\n  X\n end\nend").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnsupportedConstructError);
        assert_eq!(err.position, Position::new(2, 2));

        let err = parse("classdef A\n options\n end\nend").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnrecognizedBlock);
        assert_eq!(err.category(), ErrorCategory::SyntaxError);

        let err = parse("classdef A\n properties\n  x = 1\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_accessor_validation() {
        let err = parse("classdef A\n methods\n  function v = get.missing(obj)\n  end\n end\nend").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownAccessorTarget);

        let err = parse("classdef A\n properties\n  p\n end\n methods\n  function v = get.p(obj, extra)\n  end\n end\nend").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidAccessor);
        assert_eq!(err.position, Position::new(6, 3));

        assert!(parse("classdef A\n properties\n  p\n end\n methods\n  function set.p(obj, v)\n  end\n end\nend").is_ok());
    }
}
