//! Abstract Syntax Tree for tlua.
//!
//! Every syntactic construct, statement or expression, is an [`Expr`] node stored in an append-only arena
//! ([`Ast`]) and addressed by [`ExprId`]. A block is an ordered list of ids.
//!
//! ## Notes
//! - Every node carries its source byte offset (`index`), an optional trailing comment (the head of a chain of
//!   [`ExprKind::Comment`] nodes), and two annotation slots: `parsed_typing` filled by the parser at annotated
//!   declaration sites, and `typing` filled by the analyzer.
//! - Block-shaped nodes remember the offsets of their closing keywords so the unparser can keep them on their
//!   original lines.

use std::ops::{Index, IndexMut};

use tlua_core::lang::operators::OperatorId;
use tlua_core::{ConstantValue, TypingHolder};

use crate::annotations::ParsedTyping;
use crate::lines::LineIndex;
use crate::scope::{ScopeId, ScopeTree, VarId};

/// Index of a node in an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordered statements of a block.
pub type Block = Vec<ExprId>;

/// Node arena.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Expr>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id.
    pub fn alloc(&mut self, index: usize, kind: ExprKind) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(Expr::new(index, kind));
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node allocated after the first `len` (used when a speculative parse is abandoned).
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Iterate the comment chain attached after `id`.
    pub fn comments(&self, id: ExprId) -> CommentChain<'_> {
        CommentChain {
            ast: self,
            next: self.get(id).comment,
        }
    }

    /// Iterate every node with its id.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.nodes.iter().enumerate().map(|(i, e)| (ExprId(i as u32), e))
    }
}

impl Index<ExprId> for Ast {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.get(id)
    }
}

impl IndexMut<ExprId> for Ast {
    fn index_mut(&mut self, id: ExprId) -> &mut Expr {
        self.get_mut(id)
    }
}

/// Iterator over a trailing comment chain.
pub struct CommentChain<'a> {
    ast: &'a Ast,
    next: Option<ExprId>,
}

impl<'a> Iterator for CommentChain<'a> {
    type Item = (ExprId, &'a Comment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.ast.get(id);
        self.next = node.comment;
        match &node.kind {
            ExprKind::Comment(comment) => Some((id, comment)),
            _ => None,
        }
    }
}

/// A syntax node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Byte offset where the node starts (for binary operators: where the operator is).
    pub index: usize,
    /// First comment trailing this node.
    pub comment: Option<ExprId>,
    /// Typing assigned by the analyzer.
    pub typing: Option<TypingHolder>,
    /// Annotation written at the declaration site.
    pub parsed_typing: Option<ParsedTyping>,
}

impl Expr {
    pub fn new(index: usize, kind: ExprKind) -> Self {
        Self {
            kind,
            index,
            comment: None,
            typing: None,
            parsed_typing: None,
        }
    }
}

/// Node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `...`
    Vararg,
    Break,
    Return(Return),
    Variable(Variable),
    /// `base.name` or `base[key]`
    Field(Field),
    /// `base:name` (only as the name of a function declaration)
    Method(Method),
    Do(Do),
    While(While),
    Repeat(Repeat),
    If(If),
    NumericFor(NumericFor),
    GenericFor(GenericFor),
    Assignment(Assignment),
    UnaryOp(UnaryOp),
    BinaryOp(BinaryOp),
    FunctionCall(FunctionCall),
    FunctionSelfCall(FunctionSelfCall),
    /// `( expr )`
    Brackets(ExprId),
    Constant(ConstantValue),
    Table(Table),
    Function(Function),
    Comment(Comment),
}

impl ExprKind {
    /// Short name of the variant, for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Vararg => "Vararg",
            ExprKind::Break => "Break",
            ExprKind::Return(_) => "Return",
            ExprKind::Variable(_) => "Variable",
            ExprKind::Field(_) => "Field",
            ExprKind::Method(_) => "Method",
            ExprKind::Do(_) => "Do",
            ExprKind::While(_) => "While",
            ExprKind::Repeat(_) => "Repeat",
            ExprKind::If(_) => "If",
            ExprKind::NumericFor(_) => "NumericFor",
            ExprKind::GenericFor(_) => "GenericFor",
            ExprKind::Assignment(_) => "Assignment",
            ExprKind::UnaryOp(_) => "UnaryOp",
            ExprKind::BinaryOp(_) => "BinaryOp",
            ExprKind::FunctionCall(_) => "FunctionCall",
            ExprKind::FunctionSelfCall(_) => "FunctionSelfCall",
            ExprKind::Brackets(_) => "Brackets",
            ExprKind::Constant(_) => "Constant",
            ExprKind::Table(_) => "Table",
            ExprKind::Function(_) => "Function",
            ExprKind::Comment(_) => "Comment",
        }
    }

    /// Whether postfix syntax (`[k]`, `.f`, `:m`, call arguments) may follow this node.
    pub fn is_prefix(&self) -> bool {
        matches!(
            self,
            ExprKind::Variable(_)
                | ExprKind::Field(_)
                | ExprKind::FunctionCall(_)
                | ExprKind::FunctionSelfCall(_)
                | ExprKind::Brackets(_)
        )
    }

    /// Whether this node may produce more than one value (calls and `...`).
    pub fn is_multi_value(&self) -> bool {
        matches!(self, ExprKind::Vararg | ExprKind::FunctionCall(_) | ExprKind::FunctionSelfCall(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub expressions: Vec<ExprId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub var: VarId,
    /// Whether this occurrence declares the variable (`local x`, parameters, loop variables).
    pub declaration: bool,
}

/// Key of a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// `base.name`
    Name(String),
    /// `base[expr]`
    Index(ExprId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub base: ExprId,
    pub member: Member,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub base: ExprId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Do {
    pub block: Block,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: ExprId,
    pub block: Block,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub block: Block,
    pub condition: ExprId,
    pub until_index: usize,
}

/// One `if`/`elseif` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub condition: ExprId,
    pub block: Block,
    /// Offset of the `if`/`elseif` keyword.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub branches: Vec<IfBranch>,
    pub otherwise: Option<Block>,
    pub else_index: Option<usize>,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericFor {
    /// The loop variable (a declaring [`ExprKind::Variable`]).
    pub variable: ExprId,
    pub start: ExprId,
    pub limit: ExprId,
    pub step: Option<ExprId>,
    pub block: Block,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericFor {
    /// The loop variables (declaring [`ExprKind::Variable`] nodes).
    pub variables: Vec<ExprId>,
    pub expressions: Vec<ExprId>,
    pub block: Block,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Targets: [`ExprKind::Variable`] or [`ExprKind::Field`] nodes.
    pub variables: Vec<ExprId>,
    pub expressions: Vec<ExprId>,
    /// `local a, b = ...`
    pub local: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub operator: OperatorId,
    pub operand: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub operator: OperatorId,
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub target: ExprId,
    pub arguments: Vec<ExprId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSelfCall {
    pub base: ExprId,
    pub name: String,
    pub arguments: Vec<ExprId>,
}

/// One entry of a table constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// `None` for positional entries; for `name = v` a string [`ExprKind::Constant`].
    pub key: Option<ExprId>,
    pub value: ExprId,
    /// Whether the key was written as a bare name (`name = v`) rather than `[k] = v`.
    pub named: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub entries: Vec<TableEntry>,
}

/// How a function was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionForm {
    /// `function name() end` / `local function name() end`
    Declaration,
    /// `function() end`
    Expression,
    /// `(a) => a + 1`
    Lambda,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub var: VarId,
    pub index: usize,
    pub parsed_typing: Option<ParsedTyping>,
    /// Typing assigned by the analyzer.
    pub typing: Option<TypingHolder>,
}

/// A function body together with the scope its parameters live in.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub block: Block,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub form: FunctionForm,
    /// Declared name: a [`ExprKind::Variable`], [`ExprKind::Field`] or [`ExprKind::Method`] node.
    pub name: Option<ExprId>,
    pub local: bool,
    /// Implicit `self` of `function a:m()`.
    pub self_var: Option<VarId>,
    pub parameters: Vec<Parameter>,
    /// Whether the parameter list ends in `...`.
    pub variadic: bool,
    pub vararg_annotation: Option<ParsedTyping>,
    /// Return annotation after `):`.
    pub returns_annotation: Option<Vec<ParsedTyping>>,
    pub chunk: Chunk,
    pub end_index: usize,
    /// Typing of `...` inside the body, assigned by the analyzer.
    pub vararg_typing: Option<TypingHolder>,
}

/// A source comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    /// `None` for a line comment; `Some(n)` for a long comment with `n` equals signs.
    pub level: Option<usize>,
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct MainChunk {
    pub ast: Ast,
    pub scopes: ScopeTree,
    pub chunk: Chunk,
    pub lines: LineIndex,
    /// Comment chain that precedes the first statement.
    pub start_comment: Option<ExprId>,
    analyzed: bool,
}

impl MainChunk {
    pub fn new(ast: Ast, scopes: ScopeTree, chunk: Chunk, lines: LineIndex, start_comment: Option<ExprId>) -> Self {
        Self {
            ast,
            scopes,
            chunk,
            lines,
            start_comment,
            analyzed: false,
        }
    }

    /// Top-level statements.
    pub fn block(&self) -> &Block {
        &self.chunk.block
    }

    /// Name of the variable a [`ExprKind::Variable`] node refers to.
    pub fn variable_name(&self, var: VarId) -> &str {
        self.scopes.name(var)
    }

    /// 1-based line of a byte offset.
    pub fn line(&self, offset: usize) -> usize {
        self.lines.line(offset)
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    /// Flag the chunk as analyzed; returns whether it already was.
    pub fn mark_analyzed(&mut self) -> bool {
        std::mem::replace(&mut self.analyzed, true)
    }
}
