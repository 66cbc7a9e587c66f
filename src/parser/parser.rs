//! Hand-written Sketch parser
//!
//! Every token, trivia included, lands in the green tree, so the tree text is
//! always the input text. Malformed input is wrapped in `ERROR` nodes.
//!
//! Function bodies are not parsed with the file: a balanced `{ ... }` region
//! becomes a single `BLOCK` token that is re-parsed by [`parse_block`] when
//! its children are first needed.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Green tree plus the syntax errors met on the way
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Typed rowan view of the result
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// No syntax errors were reported
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Message plus the range it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse a Sketch file into a CST rooted at `SOURCE_FILE`
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(input, &tokens);
    parser.parse_source_file();
    parser.finish()
}

/// Parse the text of a `BLOCK` token into a `BLOCK` node of braces and
/// statements
pub fn parse_block(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(input, &tokens);
    parser.parse_block_contents();
    parser.finish()
}

/// Token cursor feeding a `GreenNodeBuilder`
struct Parser<'a> {
    input: &'a str,
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: &'a [Token<'a>]) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // =========================================================================
    // Consuming tokens
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().map(|t| t.kind.is_trivia()).unwrap_or(false) {
            self.bump();
        }
    }

    /// Consume a balanced `{ ... }` region as one `BLOCK` token.
    fn bump_block(&mut self) {
        let Some(start) = self.current().map(|t| t.offset) else {
            return;
        };
        let mut depth = 0usize;
        let mut end = start;
        while let Some(token) = self.current() {
            end = token.offset + TextSize::of(token.text);
            match token.kind {
                SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_BRACE => depth -= 1,
                _ => {}
            }
            self.pos += 1;
            if depth == 0 {
                break;
            }
        }
        if depth != 0 {
            self.errors.push(SyntaxError::new(
                "unterminated block",
                TextRange::new(start, end),
            ));
        }
        let text = &self.input[TextRange::new(start, end)];
        self.builder.token(SyntaxKind::BLOCK.into(), text);
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(TextSize::of(self.input)));
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.builder.start_node(SyntaxKind::ERROR.into());
        // Make progress even when already at a recovery token.
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    fn parse_source_file(&mut self) {
        self.start_node(SyntaxKind::SOURCE_FILE);
        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            self.parse_item(&[SyntaxKind::CLASS_KW, SyntaxKind::FUN_KW, SyntaxKind::VAL_KW]);
        }
        self.finish_node();
    }

    fn parse_item(&mut self, recovery: &[SyntaxKind]) {
        match self.current_kind() {
            SyntaxKind::CLASS_KW => self.parse_class(),
            SyntaxKind::FUN_KW => self.parse_fun(),
            SyntaxKind::VAL_KW => self.parse_field(),
            _ => self.error_recover("expected class, fun or val", recovery),
        }
    }

    /// class IDENT { (fun | field)* }
    fn parse_class(&mut self) {
        self.start_node(SyntaxKind::CLASS);
        self.bump();
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.skip_trivia();
        if self.expect(SyntaxKind::L_BRACE) {
            loop {
                self.skip_trivia();
                if self.at_eof() || self.at(SyntaxKind::R_BRACE) {
                    break;
                }
                self.parse_item(&[
                    SyntaxKind::FUN_KW,
                    SyntaxKind::VAL_KW,
                    SyntaxKind::CLASS_KW,
                    SyntaxKind::R_BRACE,
                ]);
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// fun IDENT ( params ) block
    fn parse_fun(&mut self) {
        self.start_node(SyntaxKind::FUN);
        self.bump();
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.skip_trivia();
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_param_list();
            self.skip_trivia();
        } else {
            self.error("expected parameter list");
        }
        if self.at(SyntaxKind::L_BRACE) {
            self.bump_block();
        } else {
            self.error("expected function body");
        }
        self.finish_node();
    }

    fn parse_param_list(&mut self) {
        self.start_node(SyntaxKind::PARAM_LIST);
        self.bump();
        self.skip_trivia();
        while self.at(SyntaxKind::IDENT) {
            self.start_node(SyntaxKind::PARAM);
            self.bump();
            self.finish_node();
            self.skip_trivia();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
            self.skip_trivia();
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// val IDENT (= expr)? ;
    fn parse_field(&mut self) {
        self.start_node(SyntaxKind::FIELD);
        self.bump();
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.skip_trivia();
        if self.eat(SyntaxKind::EQ) {
            while !self.at_eof()
                && !self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE])
                && !self.current_kind().starts_item()
            {
                self.bump();
            }
        }
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `{` statement* `}` with nested blocks kept lazy.
    fn parse_block_contents(&mut self) {
        self.start_node(SyntaxKind::BLOCK);
        self.skip_trivia();
        self.expect(SyntaxKind::L_BRACE);
        loop {
            self.skip_trivia();
            if self.at_eof() || self.at(SyntaxKind::R_BRACE) {
                break;
            }
            self.parse_statement();
        }
        self.expect(SyntaxKind::R_BRACE);
        // Anything after the closing brace still belongs to the block text.
        while !self.at_eof() {
            self.bump();
        }
        self.finish_node();
    }

    /// Tokens up to and including `;`, or up to the end of a nested block.
    fn parse_statement(&mut self) {
        self.start_node(SyntaxKind::STATEMENT);
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            if self.at(SyntaxKind::L_BRACE) {
                self.bump_block();
                break;
            }
            let done = self.at(SyntaxKind::SEMICOLON);
            self.bump();
            if done {
                break;
            }
        }
        self.finish_node();
    }
}
