//! Turns a parsed (and possibly analyzed) chunk back into source text.
//!
//! ## Notes
//! - With `preserve_lines`, every node is placed on its source line when the output has not already moved
//!   past it, so statements, closing keywords and comments keep their vertical layout.
//! - Lambdas come out as `function ... end`; string literals are re-quoted; call sugar (`f"s"`, `f{...}`)
//!   becomes a parenthesized argument list. Reading the output back yields the same tree shape.
//! - A statement that starts with `(` is preceded by `;` so it cannot continue the previous statement as a
//!   call.

use std::fmt::Write as _;

use tlua_core::ConstantValue;
use tlua_core::lang::operators::OperatorId;
use tlua_syntax::annotations::write_returns;
use tlua_syntax::ast::{ExprId, ExprKind, Function, FunctionForm, MainChunk, Member, TableEntry};

use super::config::FormatConfig;
use super::writer::FormatWriter;

/// Unparse a chunk with the given configuration.
#[tracing::instrument(skip_all, fields(nodes = chunk.ast.len()))]
pub fn unparse(chunk: &MainChunk, config: &FormatConfig) -> String {
    Unparser::new(chunk, config).unparse()
}

/// Emits source text for a [`MainChunk`].
pub struct Unparser<'a> {
    chunk: &'a MainChunk,
    config: &'a FormatConfig,
    writer: FormatWriter,
}

impl<'a> Unparser<'a> {
    pub fn new(chunk: &'a MainChunk, config: &'a FormatConfig) -> Self {
        Self {
            chunk,
            config,
            writer: FormatWriter::new(config),
        }
    }

    pub fn unparse(mut self) -> String {
        let chunk = self.chunk;
        self.comment_chain(chunk.start_comment);
        self.statements(chunk.block());
        self.writer.finish()
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Move to the source line of `index` (line-preserving mode only).
    fn mark(&mut self, index: usize) {
        if self.config.preserve_lines {
            self.writer.ensure_line(self.chunk.line(index));
        }
    }

    fn begin_line(&mut self, index: usize) {
        if self.config.preserve_lines {
            self.mark(index);
            self.writer.space();
        } else {
            self.writer.break_line();
        }
    }

    fn keyword(&mut self, keyword: &str) {
        self.writer.space();
        self.writer.write(keyword);
        self.writer.space();
    }

    /// `end`, `else`, `elseif` and `until`: a new line, or the source line of the keyword.
    fn closing(&mut self, keyword: &str, index: usize) {
        self.begin_line(index);
        self.writer.write(keyword);
        self.writer.space();
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statements(&mut self, block: &[ExprId]) {
        for &statement in block {
            self.begin_line(self.start_index(statement));
            if self.starts_with_bracket(statement) {
                self.writer.write(";");
            }
            self.node(statement);
        }
    }

    fn body(&mut self, block: &[ExprId]) {
        self.writer.indent();
        self.statements(block);
        self.writer.dedent();
    }

    /// Offset of the leftmost token of a node.
    fn start_index(&self, id: ExprId) -> usize {
        match self.chunk.ast.kind(id) {
            ExprKind::FunctionCall(call) => self.start_index(call.target),
            ExprKind::FunctionSelfCall(call) => self.start_index(call.base),
            ExprKind::Field(field) => self.start_index(field.base),
            ExprKind::Method(method) => self.start_index(method.base),
            ExprKind::BinaryOp(op) => self.start_index(op.left),
            _ => self.chunk.ast[id].index,
        }
    }

    fn starts_with_bracket(&self, id: ExprId) -> bool {
        match self.chunk.ast.kind(id) {
            ExprKind::Brackets(_) => true,
            ExprKind::FunctionCall(call) => self.starts_with_bracket(call.target),
            ExprKind::FunctionSelfCall(call) => self.starts_with_bracket(call.base),
            ExprKind::Field(field) => self.starts_with_bracket(field.base),
            ExprKind::Assignment(assignment) if !assignment.local => assignment
                .variables
                .first()
                .is_some_and(|&first| self.starts_with_bracket(first)),
            _ => false,
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    fn node(&mut self, id: ExprId) {
        let chunk = self.chunk;
        let expr = &chunk.ast[id];
        let index = expr.index;

        match &expr.kind {
            ExprKind::Vararg => {
                self.mark(index);
                self.writer.write("...");
            }
            ExprKind::Break => {
                self.mark(index);
                self.writer.write("break");
            }
            ExprKind::Return(ret) => {
                self.mark(index);
                self.writer.write("return");
                self.writer.space();
                self.list(&ret.expressions);
            }
            ExprKind::Variable(variable) => {
                self.mark(index);
                self.writer.write(&variable.name);
                if variable.declaration && self.config.keep_annotations {
                    if let Some(parsed) = &expr.parsed_typing {
                        self.writer.write(":");
                        self.writer.space();
                        self.writer.write(&parsed.to_string());
                    }
                }
            }
            ExprKind::Field(field) => {
                self.node(field.base);
                self.mark(index);
                match &field.member {
                    Member::Name(name) => {
                        self.writer.write(".");
                        self.writer.write(name);
                    }
                    Member::Index(key) => {
                        self.writer.write("[");
                        self.node(*key);
                        self.writer.write("]");
                    }
                }
            }
            ExprKind::Method(method) => {
                self.node(method.base);
                self.mark(index);
                self.writer.write(":");
                self.writer.write(&method.name);
            }
            ExprKind::Do(node) => {
                self.mark(index);
                self.writer.write("do");
                self.body(&node.block);
                self.closing("end", node.end_index);
            }
            ExprKind::While(node) => {
                self.mark(index);
                self.writer.write("while");
                self.writer.space();
                self.node(node.condition);
                self.keyword("do");
                self.body(&node.block);
                self.closing("end", node.end_index);
            }
            ExprKind::Repeat(node) => {
                self.mark(index);
                self.writer.write("repeat");
                self.body(&node.block);
                self.closing("until", node.until_index);
                self.node(node.condition);
            }
            ExprKind::If(node) => {
                self.mark(index);
                for (i, branch) in node.branches.iter().enumerate() {
                    if i == 0 {
                        self.writer.write("if");
                        self.writer.space();
                    } else {
                        self.closing("elseif", branch.index);
                    }
                    self.node(branch.condition);
                    self.keyword("then");
                    self.body(&branch.block);
                }
                if let Some(otherwise) = &node.otherwise {
                    self.closing("else", node.else_index.unwrap_or(node.end_index));
                    self.body(otherwise);
                }
                self.closing("end", node.end_index);
            }
            ExprKind::NumericFor(node) => {
                self.mark(index);
                self.writer.write("for");
                self.writer.space();
                self.node(node.variable);
                self.keyword("=");
                self.node(node.start);
                self.writer.write(",");
                self.writer.space();
                self.node(node.limit);
                if let Some(step) = node.step {
                    self.writer.write(",");
                    self.writer.space();
                    self.node(step);
                }
                self.keyword("do");
                self.body(&node.block);
                self.closing("end", node.end_index);
            }
            ExprKind::GenericFor(node) => {
                self.mark(index);
                self.writer.write("for");
                self.writer.space();
                self.list(&node.variables);
                self.keyword("in");
                self.list(&node.expressions);
                self.keyword("do");
                self.body(&node.block);
                self.closing("end", node.end_index);
            }
            ExprKind::Assignment(assignment) => {
                self.mark(index);
                if assignment.local {
                    self.writer.write("local");
                    self.writer.space();
                }
                self.list(&assignment.variables);
                if !assignment.expressions.is_empty() {
                    self.keyword("=");
                    self.list(&assignment.expressions);
                }
            }
            ExprKind::UnaryOp(op) => {
                self.mark(index);
                self.writer.write(op.operator.as_str());
                if op.operator == OperatorId::Not {
                    self.writer.space();
                }
                self.node(op.operand);
            }
            ExprKind::BinaryOp(op) => {
                self.node(op.left);
                self.writer.space();
                self.mark(index);
                self.writer.write(op.operator.as_str());
                self.writer.space();
                self.node(op.right);
            }
            ExprKind::FunctionCall(call) => {
                self.node(call.target);
                self.mark(index);
                self.arguments(&call.arguments);
            }
            ExprKind::FunctionSelfCall(call) => {
                self.node(call.base);
                self.mark(index);
                self.writer.write(":");
                self.writer.write(&call.name);
                self.arguments(&call.arguments);
            }
            ExprKind::Brackets(inner) => {
                self.mark(index);
                self.writer.write("(");
                self.node(*inner);
                self.writer.write(")");
            }
            ExprKind::Constant(value) => {
                self.mark(index);
                self.constant(value);
            }
            ExprKind::Table(table) => {
                self.mark(index);
                self.writer.write("{");
                if !table.entries.is_empty() {
                    self.writer.space();
                    for (i, entry) in table.entries.iter().enumerate() {
                        if i > 0 {
                            self.writer.write(",");
                            self.writer.space();
                        }
                        self.table_entry(entry);
                    }
                    self.writer.space();
                }
                self.writer.write("}");
            }
            ExprKind::Function(function) => {
                self.mark(index);
                self.function(function);
            }
            ExprKind::Comment(comment) => {
                self.comment(index, &comment.text, comment.level);
                return;
            }
        }

        if self.config.emit_typings {
            if let Some(typing) = &expr.typing {
                self.writer.space();
                self.long_comment(&typing.typing.to_string());
            }
        }
        self.comment_chain(expr.comment);
    }

    fn list(&mut self, ids: &[ExprId]) {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                self.writer.write(",");
                self.writer.space();
            }
            self.node(id);
        }
    }

    fn arguments(&mut self, arguments: &[ExprId]) {
        self.writer.write("(");
        self.list(arguments);
        self.writer.write(")");
    }

    fn constant(&mut self, value: &ConstantValue) {
        match value {
            ConstantValue::Number(n) if !n.is_finite() => {
                self.writer.write("(");
                self.writer.write(&value.to_source());
                self.writer.write(")");
            }
            _ => self.writer.write(&value.to_source()),
        }
    }

    fn table_entry(&mut self, entry: &TableEntry) {
        let chunk = self.chunk;
        if let Some(key) = entry.key {
            match chunk.ast.kind(key) {
                ExprKind::Constant(ConstantValue::String(name)) if entry.named => {
                    self.mark(chunk.ast[key].index);
                    self.writer.write(name);
                    self.comment_chain(chunk.ast[key].comment);
                }
                _ => {
                    self.writer.write("[");
                    self.node(key);
                    self.writer.write("]");
                }
            }
            self.keyword("=");
        }
        self.node(entry.value);
    }

    fn function(&mut self, function: &Function) {
        match function.form {
            FunctionForm::Declaration => {
                if function.local {
                    self.writer.write("local");
                    self.writer.space();
                }
                self.writer.write("function");
                self.writer.space();
                if let Some(name) = function.name {
                    self.node(name);
                }
            }
            FunctionForm::Expression | FunctionForm::Lambda => self.writer.write("function"),
        }

        self.writer.write("(");
        for (i, param) in function.parameters.iter().enumerate() {
            if i > 0 {
                self.writer.write(",");
                self.writer.space();
            }
            self.mark(param.index);
            self.writer.write(&param.name);
            if self.config.keep_annotations {
                if let Some(parsed) = &param.parsed_typing {
                    self.writer.write(":");
                    self.writer.space();
                    self.writer.write(&parsed.to_string());
                }
            }
        }
        if function.variadic {
            if !function.parameters.is_empty() {
                self.writer.write(",");
                self.writer.space();
            }
            self.writer.write("...");
            if self.config.keep_annotations {
                if let Some(parsed) = &function.vararg_annotation {
                    self.writer.write(":");
                    self.writer.space();
                    self.writer.write(&parsed.to_string());
                }
            }
        }
        self.writer.write(")");

        if self.config.keep_annotations {
            if let Some(returns) = &function.returns_annotation {
                let mut text = String::new();
                // Writing into a String cannot fail.
                let _ = write_returns(&mut text, returns);
                self.writer.write(":");
                self.writer.space();
                self.writer.write(&text);
            }
        }

        self.body(&function.chunk.block);
        self.closing("end", function.end_index);
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn comment_chain(&mut self, head: Option<ExprId>) {
        let chunk = self.chunk;
        let mut next = head;
        while let Some(id) = next {
            let node = &chunk.ast[id];
            if let ExprKind::Comment(comment) = &node.kind {
                self.comment(node.index, &comment.text, comment.level);
            }
            next = node.comment;
        }
    }

    fn comment(&mut self, index: usize, text: &str, level: Option<usize>) {
        self.mark(index);
        self.writer.space();
        match level {
            None => {
                self.writer.write(&format!("--{text}"));
                self.writer.newline();
            }
            Some(level) => {
                let eq = "=".repeat(level);
                self.writer.write_raw(&format!("--[{eq}[{text}]{eq}]"));
                self.writer.space();
            }
        }
    }

    /// Emit `text` as a long comment at the lowest level that closes exactly at its end.
    fn long_comment(&mut self, text: &str) {
        let eq = "=".repeat(long_bracket_level(text));
        let mut comment = String::with_capacity(text.len() + 2 * eq.len() + 6);
        let _ = write!(comment, "--[{eq}[{text}]{eq}]");
        self.writer.write_raw(&comment);
        self.writer.space();
    }
}

/// Smallest number of `=` for which `]=*]` first occurs right after `text`.
pub(crate) fn long_bracket_level(text: &str) -> usize {
    (0..)
        .find(|&level| {
            let eq = "=".repeat(level);
            let closer = format!("]{eq}]");
            format!("{text}{closer}").find(&closer) == Some(text.len())
        })
        .unwrap_or(0)
}
