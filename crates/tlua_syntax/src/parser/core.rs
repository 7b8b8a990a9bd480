/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type, its `parse()` entrypoint, and the checkpoint machinery used by
/// speculative parses.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a single module while avoiding
///   a single “god file”.
/// - Comments are allocated as nodes while scanning but only linked to their owners once parsing completes; the
///   pending links live in a log that a checkpoint restore truncates together with the arena.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    nodes: usize,
    links: usize,
    last: ExprId,
}

/// Parser state.
///
/// ## Notes
/// - There is no error recovery: the first unmet expectation aborts the parse.
/// - `last` is the most recently completed node; a comment found by `trim` becomes its trailing comment.
pub struct Parser<'a> {
    source: Cow<'a, str>,
    pos: usize,
    ast: Ast,
    scopes: ScopeTree,
    scope: ScopeId,
    last: ExprId,
    comment_links: Vec<(ExprId, ExprId)>,
    lines: LineIndex,
}

impl<'a> Parser<'a> {
    /// Create a parser over `source`.
    ///
    /// ## Notes
    /// - Line endings are normalized (`\r\n` and a lone `\r` both become `\n`); reported offsets refer to the
    ///   normalized text.
    pub fn new(source: &'a str) -> Self {
        let source = normalize_line_endings(source);
        let lines = LineIndex::new(&source);
        let mut ast = Ast::new();
        // Leading comments attach to this placeholder; it is never part of a block.
        let start = ast.alloc(
            0,
            ExprKind::Comment(Comment {
                text: String::new(),
                level: None,
            }),
        );
        let scopes = ScopeTree::new();
        let scope = scopes.root();
        Self {
            source,
            pos: 0,
            ast,
            scopes,
            scope,
            last: start,
            comment_links: Vec::new(),
            lines,
        }
    }

    /// Parse the whole input as one chunk.
    ///
    /// ## Errors
    /// Returns the first [`ParseError`] encountered; leftover input after the top-level block is reported as
    /// `Unexpected symbol`.
    pub fn parse(mut self) -> ParseResult<MainChunk> {
        let start = self.last;
        let scope = self.open_scope();
        let block = self.block_in(scope)?;
        self.trim()?;
        if self.pos < self.source.len() {
            return self.fail("Unexpected symbol");
        }
        self.link_comments();
        let start_comment = self.ast[start].comment;
        tracing::debug!(nodes = self.ast.len(), scopes = self.scopes.len(), "parsed chunk");
        Ok(MainChunk::new(
            self.ast,
            self.scopes,
            Chunk { block, scope },
            self.lines,
            start_comment,
        ))
    }

    // ========================================================================
    // Arena and scope bookkeeping
    // ========================================================================

    /// Allocate a completed node and make it the owner of the next trailing comment.
    fn node(&mut self, index: usize, kind: ExprKind) -> ExprId {
        let id = self.ast.alloc(index, kind);
        self.last = id;
        id
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            nodes: self.ast.len(),
            links: self.comment_links.len(),
            last: self.last,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.ast.truncate(checkpoint.nodes);
        self.comment_links.truncate(checkpoint.links);
        self.last = checkpoint.last;
    }

    /// Create a child scope of the current scope (without entering it).
    fn open_scope(&mut self) -> ScopeId {
        self.scopes.push(self.scope)
    }

    /// Run `f` with `scope` as the current scope.
    fn in_scope<T>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let parent = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = parent;
        result
    }

    /// Append every logged comment to the end of its owner's chain.
    fn link_comments(&mut self) {
        for (owner, comment) in std::mem::take(&mut self.comment_links) {
            let mut tail = owner;
            while let Some(next) = self.ast[tail].comment {
                tail = next;
            }
            self.ast[tail].comment = Some(comment);
        }
    }

    // ========================================================================
    // Errors
    // ========================================================================

    fn line(&self) -> usize {
        self.lines.line(self.pos)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(message, index, self.lines.line(index))
    }

    fn fail<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        Err(self.error(message))
    }
}
