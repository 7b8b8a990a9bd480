//! Analyzing walker for tlua chunks.
//!
//! Walks a parsed [`MainChunk`] once, assigns a [`TypingHolder`] to every value-producing node, and collects
//! [`Diagnostic`]s. Inference is flow-based: the [`FunctionFlow`] chain remembers what each variable currently holds,
//! and an unannotated declaration takes ("steals") the typing of the value it is assigned.
//!
//! ## Notes
//!
//! - **Single pass**: there is no declaration-collection pass. A global function is known from the statement that
//!   defines it onwards.
//! - **Main chunk**: analyzed as an implicit function taking `...any`, so `...` and `return` at top level are
//!   handled like in any other function.
//! - **Error accumulation**: diagnostics never stop the walk; every node still receives a typing (`any` when
//!   nothing better is known).
//! - **Rejection**: a chunk is analyzed at most once; see [`AnalysisError::AlreadyAnalyzed`].
//!
//! ## Examples
//!
//! ```rust
//! use tlua::frontend::analyzer::{TypeEnvironment, analyze};
//! use tlua::frontend::parser;
//!
//! let mut chunk = parser::parse("local a: number = 'x'").unwrap();
//! let analysis = analyze(&mut chunk, &TypeEnvironment::new()).unwrap();
//! assert_eq!(analysis.diagnostics[0].code.as_str(), "ERROR_CANNOT_CAST");
//! ```
//!
//! ## See also
//!
//! - [`flow`](super::flow) for the per-variable bookkeeping
//! - [`diagnostics`](super::diagnostics) for the finding catalog

mod access;
mod annotations;
mod calls;
mod control_flow;
mod functions;
mod ops;
mod variables;


use std::collections::BTreeMap;

use thiserror::Error;
use tlua_core::lang::typings;
use tlua_core::{Typing, TypingHolder};
use tlua_syntax::ast::{Ast, ExprId, ExprKind, MainChunk};
use tlua_syntax::diagnostics::ParseError;
use tlua_syntax::parser;
use tlua_syntax::walker::{self, Walker};

use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::flow::FunctionFlow;

/// Why a chunk could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("chunk has already been analyzed")]
    AlreadyAnalyzed,
}

/// Names and globals known before the chunk runs.
///
/// ## Examples
///
/// ```rust
/// use tlua::frontend::analyzer::TypeEnvironment;
/// use tlua_core::{Typing, TypingHolder};
///
/// let env = TypeEnvironment::new()
///     .with_type("Id", Typing::number())
///     .with_global("VERSION", TypingHolder::explicit(Typing::string()));
/// assert!(env.global("VERSION").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    types: BTreeMap<String, Typing>,
    globals: BTreeMap<String, TypingHolder>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` usable in annotations, as an alias of `typing`.
    pub fn with_type(mut self, name: impl Into<String>, typing: Typing) -> Self {
        let name = name.into();
        self.types.insert(name.clone(), Typing::alias(name, typing));
        self
    }

    /// Declare a global variable.
    pub fn with_global(mut self, name: impl Into<String>, typing: TypingHolder) -> Self {
        self.globals.insert(name.into(), typing);
        self
    }

    pub fn global(&self, name: &str) -> Option<&TypingHolder> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, &TypingHolder)> {
        self.globals.iter().map(|(name, typing)| (name.as_str(), typing))
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &Typing)> {
        self.types.iter().map(|(name, typing)| (name.as_str(), typing))
    }

    /// Declare a global from an annotation written in dialect syntax (`(s: string) => number`).
    ///
    /// Names in the annotation resolve against the builtin types and the types declared so far.
    ///
    /// ## Errors
    /// - [`DeclarationError::Syntax`] when `annotation` is not exactly one typing.
    /// - [`DeclarationError::UnknownType`] when it mentions an undeclared type name.
    pub fn declare_global(mut self, name: impl Into<String>, annotation: &str) -> Result<Self, DeclarationError> {
        let name = name.into();
        let typing = self.resolve_declaration(&name, annotation)?;
        self.globals.insert(name, TypingHolder::explicit(typing));
        Ok(self)
    }

    /// Declare a type name from an annotation written in dialect syntax.
    ///
    /// The name is kept as an alias, so diagnostics and typings show `name` rather than its expansion.
    ///
    /// ## Errors
    /// Same as [`TypeEnvironment::declare_global`].
    pub fn declare_type(mut self, name: impl Into<String>, annotation: &str) -> Result<Self, DeclarationError> {
        let name = name.into();
        let typing = self.resolve_declaration(&name, annotation)?;
        self.types.insert(name.clone(), Typing::alias(name, typing));
        Ok(self)
    }

    /// Declare a global table (`string`, `math`) whose members are given as annotations.
    ///
    /// The table's typing is a record named after the global.
    ///
    /// ## Errors
    /// Same as [`TypeEnvironment::declare_global`], reported for the first offending member.
    pub fn declare_table(mut self, name: impl Into<String>, members: &[(&str, &str)]) -> Result<Self, DeclarationError> {
        let name = name.into();
        let mut fields = BTreeMap::new();
        for (member, annotation) in members {
            let typing = self.resolve_declaration(&format!("{name}.{member}"), annotation)?;
            fields.insert(member.to_string(), typing);
        }
        let record = Typing::interface(Some(name.clone()), fields);
        self.globals.insert(name, TypingHolder::explicit(record));
        Ok(self)
    }

    fn resolve_declaration(&self, name: &str, annotation: &str) -> Result<Typing, DeclarationError> {
        let parsed = parser::parse_typing(annotation).map_err(|source| DeclarationError::Syntax {
            name: name.to_string(),
            source,
        })?;
        let mut unknown = None;
        let typing = annotations::resolve_typing(&parsed, &mut |type_name: &str| {
            if let Some(typing) = self.types.get(type_name) {
                return typing.clone();
            }
            if let Some(id) = typings::from_str(type_name) {
                return typings::typing_for(id);
            }
            unknown.get_or_insert_with(|| type_name.to_string());
            Typing::Any
        });
        match unknown {
            Some(type_name) => Err(DeclarationError::UnknownType {
                name: name.to_string(),
                type_name,
            }),
            None => Ok(typing),
        }
    }
}

/// Why an external declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("invalid annotation for `{name}`: {source}")]
    Syntax { name: String, source: ParseError },
    #[error("unknown type `{type_name}` in the declaration of `{name}`")]
    UnknownType { name: String, type_name: String },
}

/// Result of analyzing one chunk.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Findings in walk order.
    pub diagnostics: Vec<Diagnostic>,
    /// Positional union of everything the main chunk returns.
    pub returns: Vec<Typing>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Analyze `chunk`, writing typings onto its nodes.
///
/// ## Errors
/// - [`AnalysisError::AlreadyAnalyzed`] when the chunk went through this function before.
#[tracing::instrument(skip_all, fields(nodes = chunk.ast.len()))]
pub fn analyze(chunk: &mut MainChunk, env: &TypeEnvironment) -> Result<Analysis, AnalysisError> {
    if chunk.mark_analyzed() {
        return Err(AnalysisError::AlreadyAnalyzed);
    }

    let mut analyzer = Analyzer::new(chunk, env);
    let block = analyzer.chunk.block().clone();
    let main = Segment {
        node: None,
        function: Some(FunctionFrame {
            vararg: Some(TypingHolder::explicit(Typing::vararg(Typing::Any))),
            returns: Vec::new(),
            typing: TypingHolder::unknown(),
        }),
    };
    let frame = analyzer.with_segment(main, |analyzer| {
        analyzer.walk_block(&block);
        analyzer.current_segment().and_then(|segment| segment.function.take())
    });
    let returns = frame
        .map(|frame| functions::merge_returns(frame.returns.iter().map(|(_, typing)| typing)))
        .unwrap_or_default();

    tracing::debug!(diagnostics = analyzer.diagnostics.len(), "analysis finished");
    Ok(Analysis {
        diagnostics: analyzer.diagnostics,
        returns,
    })
}

/// Per-function state, attached to the segment of the function node.
#[derive(Debug, Clone)]
pub(crate) struct FunctionFrame {
    /// Typing of `...` inside the body; `None` for non-variadic functions.
    pub(crate) vararg: Option<TypingHolder>,
    /// Every `return` seen so far, with its node.
    pub(crate) returns: Vec<(ExprId, Typing)>,
    /// The function's own typing as far as it is known (the declared signature while the body is walked).
    pub(crate) typing: TypingHolder,
}

/// One entry of the path from the main chunk down to the node being walked.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    /// `None` for the main chunk.
    pub(crate) node: Option<ExprId>,
    pub(crate) function: Option<FunctionFrame>,
}

/// Analyzer state.
pub(crate) struct Analyzer<'a> {
    pub(crate) chunk: &'a mut MainChunk,
    pub(crate) flow: FunctionFlow,
    pub(crate) path: Vec<Segment>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> Analyzer<'a> {
    fn new(chunk: &'a mut MainChunk, env: &TypeEnvironment) -> Self {
        let mut flow = FunctionFlow::new();
        for (name, typing) in env.types() {
            flow.set_typing(name, typing.clone());
        }
        for (name, typing) in env.globals() {
            // Globals the chunk never mentions have no identity and need no entry.
            if let Some(var) = chunk.scopes.global_id(name) {
                flow.assign(var, typing.clone());
            }
        }
        Self {
            chunk,
            flow,
            path: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    // ========================================================================
    // Node typings
    // ========================================================================

    pub(crate) fn set_typing(&mut self, id: ExprId, typing: TypingHolder) {
        debug_assert!(
            self.chunk.ast[id].typing.is_none(),
            "INVARIANT: node {} typed twice",
            id.index()
        );
        self.chunk.ast[id].typing = Some(typing);
    }

    /// The typing a node received, or the non-explicit `any` when it received none.
    pub(crate) fn typing_of(&self, id: ExprId) -> TypingHolder {
        self.chunk.ast[id].typing.clone().unwrap_or_else(TypingHolder::unknown)
    }

    /// The single value a node yields in a scalar position.
    pub(crate) fn scalar(&self, id: ExprId) -> TypingHolder {
        let holder = self.typing_of(id);
        TypingHolder::new(holder.typing.collapse(), holder.explicit)
    }

    /// Values of an expression list: every expression contributes one value except the last, which contributes all
    /// of its values.
    pub(crate) fn spread(&self, expressions: &[ExprId]) -> Vec<Typing> {
        let mut out = Vec::with_capacity(expressions.len());
        for (i, &expr) in expressions.iter().enumerate() {
            if i + 1 == expressions.len() {
                out.extend(self.typing_of(expr).typing.tuple_elements());
            } else {
                out.push(self.scalar(expr).typing);
            }
        }
        out
    }

    /// The value position `position` of an expression list receives, if any expression supplies it.
    pub(crate) fn value_at(&self, expressions: &[ExprId], position: usize) -> Option<TypingHolder> {
        if expressions.is_empty() {
            return None;
        }
        let explicit = expressions
            .get(position)
            .or(expressions.last())
            .map(|&expr| self.typing_of(expr).explicit)
            .unwrap_or(false);
        let values = self.spread(expressions);
        let (fixed, tail) = tlua_core::typing::split_vararg(&values);
        let typing = match fixed.get(position) {
            Some(typing) => typing.collapse(),
            None => match tail {
                Some(tail) => tail.collapse(),
                None => Typing::nil(),
            },
        };
        Some(TypingHolder::new(typing, explicit))
    }

    // ========================================================================
    // Scoped helpers
    // ========================================================================

    /// Run `f` with `segment` on top of the path.
    pub(crate) fn with_segment<T>(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    /// Run `f` inside a fresh Function-Flow frame.
    pub(crate) fn with_flow<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.flow.push();
        let result = f(self);
        self.flow.pop();
        result
    }

    /// The segment of the node currently being walked.
    pub(crate) fn current_segment(&mut self) -> Option<&mut Segment> {
        self.path.last_mut()
    }

    /// The segment one level above the node currently being walked.
    pub(crate) fn parent_segment(&self) -> Option<&Segment> {
        let len = self.path.len();
        len.checked_sub(2).and_then(|i| self.path.get(i))
    }

    /// The innermost enclosing function frame (the main chunk's at worst).
    pub(crate) fn function_frame(&mut self) -> Option<&mut FunctionFrame> {
        self.path.iter_mut().rev().find_map(|segment| segment.function.as_mut())
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(code = %diagnostic.code, index = diagnostic.index, "diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

impl Walker for Analyzer<'_> {
    fn ast(&self) -> &Ast {
        &self.chunk.ast
    }

    fn walk(&mut self, id: ExprId) {
        let segment = Segment {
            node: Some(id),
            function: None,
        };
        self.with_segment(segment, |analyzer| walker::dispatch(analyzer, id));
    }

    fn walk_vararg(&mut self, id: ExprId) {
        self.analyze_vararg(id);
    }

    fn walk_return(&mut self, id: ExprId) {
        self.analyze_return(id);
    }

    fn walk_variable(&mut self, id: ExprId) {
        self.analyze_variable(id);
    }

    fn walk_field(&mut self, id: ExprId) {
        self.analyze_field(id);
    }

    fn walk_method(&mut self, id: ExprId) {
        self.analyze_method(id);
    }

    fn walk_numeric_for(&mut self, id: ExprId) {
        self.analyze_numeric_for(id);
    }

    fn walk_generic_for(&mut self, id: ExprId) {
        self.analyze_generic_for(id);
    }

    fn walk_assignment(&mut self, id: ExprId) {
        self.analyze_assignment(id);
    }

    fn walk_unary_op(&mut self, id: ExprId) {
        self.analyze_unary_op(id);
    }

    fn walk_binary_op(&mut self, id: ExprId) {
        self.analyze_binary_op(id);
    }

    fn walk_function_call(&mut self, id: ExprId) {
        self.analyze_function_call(id);
    }

    fn walk_function_self_call(&mut self, id: ExprId) {
        self.analyze_function_self_call(id);
    }

    fn walk_brackets(&mut self, id: ExprId) {
        walker::walk_children(self, id);
        if let ExprKind::Brackets(inner) = self.chunk.ast.kind(id) {
            let inner = *inner;
            let typing = self.scalar(inner);
            self.set_typing(id, typing);
        }
    }

    fn walk_constant(&mut self, id: ExprId) {
        self.analyze_constant(id);
    }

    fn walk_table(&mut self, id: ExprId) {
        self.analyze_table(id);
    }

    fn walk_function(&mut self, id: ExprId) {
        self.analyze_function(id);
    }
}
