//! Functions, returns and varargs.
//!
//! ## Notes
//! - While a body is walked, the function's typing is its declared signature (declared returns, or none), so a
//!   recursive call inside the body sees the parameters it must be called with.
//! - After the body, the returns are replaced by the positional union of every `return` the body produced. With a
//!   return annotation, each offending `return` is reported and the annotation stays authoritative.

use tlua_core::typing::{Parameter, split_vararg};
use tlua_core::{FunctionTyping, Typing, TypingHolder};
use tlua_syntax::ast::{ExprId, ExprKind};
use tlua_syntax::walker::Walker;

use super::{Analyzer, FunctionFrame};
use crate::frontend::diagnostics::errors;

impl Analyzer<'_> {
    pub(crate) fn analyze_function(&mut self, id: ExprId) {
        let index = self.chunk.ast[id].index;
        let ExprKind::Function(function) = self.chunk.ast.kind(id) else {
            return;
        };
        let function = function.clone();
        tracing::debug!(index, parameters = function.parameters.len(), "analyzing function");

        let vararg = if function.variadic {
            Some(match &function.vararg_annotation {
                Some(parsed) => self.resolve_annotation(parsed, index),
                None => Typing::Any,
            })
        } else {
            None
        };
        let declared_returns = function
            .returns_annotation
            .as_ref()
            .map(|parsed| self.resolve_annotations(parsed, index));

        let mut parameters = Vec::with_capacity(function.parameters.len());
        for param in &function.parameters {
            let typing = match &param.parsed_typing {
                Some(parsed) => TypingHolder::explicit(self.resolve_annotation(parsed, param.index)),
                None => {
                    self.report(errors::implicit_parameter(&param.name, param.index));
                    TypingHolder::unknown()
                }
            };
            parameters.push(Parameter::new(param.name.clone(), typing));
        }

        let self_typing = function.self_var.map(|_| self.method_receiver(function.name));
        let mut signature_parameters = Vec::with_capacity(parameters.len() + 1);
        if let Some(receiver) = &self_typing {
            signature_parameters.push(Parameter::new("self", receiver.clone()));
        }
        signature_parameters.extend(parameters.iter().cloned());
        let signature = FunctionTyping {
            parameters: signature_parameters,
            vararg: vararg.clone(),
            returns: declared_returns.clone().unwrap_or_default(),
        };
        let declared = TypingHolder::explicit(Typing::function(signature.clone()));

        if let ExprKind::Function(node) = &mut self.chunk.ast[id].kind {
            for (node_param, param) in node.parameters.iter_mut().zip(&parameters) {
                node_param.typing = Some(param.typing.clone());
            }
            node.vararg_typing = vararg.clone().map(|v| TypingHolder::explicit(Typing::vararg(v)));
        }

        if let Some(segment) = self.current_segment() {
            segment.function = Some(FunctionFrame {
                vararg: vararg.map(|v| TypingHolder::explicit(Typing::vararg(v))),
                returns: Vec::new(),
                typing: declared.clone(),
            });
        }

        // The name is bound before the body so the body can call the function recursively.
        let name_var = function.name.and_then(|name| match self.chunk.ast.kind(name) {
            ExprKind::Variable(variable) => Some(variable.var),
            _ => None,
        });
        if let Some(var) = name_var {
            self.flow.assign(var, declared.clone());
        }
        if let Some(name) = function.name {
            self.walk(name);
        }

        self.with_flow(|analyzer| {
            if let Some(var) = name_var {
                analyzer.flow.assign(var, declared.clone());
            }
            if let (Some(var), Some(receiver)) = (function.self_var, self_typing) {
                analyzer.flow.assign(var, receiver);
            }
            for (node_param, param) in function.parameters.iter().zip(&parameters) {
                if param.typing.explicit {
                    analyzer.flow.declare(node_param.var, param.typing.clone());
                } else {
                    analyzer.flow.assign(node_param.var, param.typing.clone());
                }
            }
            analyzer.walk_block(&function.chunk.block);
        });

        let frame = self.current_segment().and_then(|segment| segment.function.take());
        let returns = match (&declared_returns, frame) {
            (Some(declared), Some(frame)) => {
                self.check_returns(declared, &frame.returns);
                declared.clone()
            }
            (Some(declared), None) => declared.clone(),
            (None, Some(frame)) => merge_returns(frame.returns.iter().map(|(_, typing)| typing)),
            (None, None) => Vec::new(),
        };

        let typing = TypingHolder::explicit(Typing::function(FunctionTyping { returns, ..signature }));
        self.set_typing(id, typing.clone());
        if let Some(var) = name_var {
            self.flow.assign(var, typing.clone());
        }
        if let Some(name) = function.name {
            if !matches!(self.chunk.ast.kind(name), ExprKind::Variable(_)) {
                self.extend_record(name, &typing);
            }
        }
        tracing::trace!(index, typing = %typing.typing, "function typed");
    }

    /// The typing of `self` in `function base:name()`: whatever `base` currently holds.
    fn method_receiver(&self, name: Option<ExprId>) -> TypingHolder {
        let base = name.and_then(|name| match self.chunk.ast.kind(name) {
            ExprKind::Method(method) => Some(method.base),
            _ => None,
        });
        let var = base.and_then(|base| match self.chunk.ast.kind(base) {
            ExprKind::Variable(variable) => Some(variable.var),
            _ => None,
        });
        var.and_then(|var| self.flow.variable(var).cloned())
            .unwrap_or_else(TypingHolder::unknown)
    }

    fn check_returns(&mut self, declared: &[Typing], returns: &[(ExprId, Typing)]) {
        let target = Typing::Tuple(declared.to_vec());
        for (node, typing) in returns {
            if !target.can_cast_from(typing) {
                let index = self.chunk.ast[*node].index;
                self.report(errors::cannot_cast_return(&target.to_string(), &typing.to_string(), index));
            }
        }
    }

    pub(crate) fn analyze_return(&mut self, id: ExprId) {
        let ExprKind::Return(ret) = self.chunk.ast.kind(id) else {
            return;
        };
        let expressions = ret.expressions.clone();
        for &expr in &expressions {
            self.walk(expr);
        }
        let typing = Typing::Tuple(self.spread(&expressions));
        self.set_typing(id, TypingHolder::explicit(typing.clone()));
        let frame = self
            .function_frame()
            .expect("INVARIANT: the main chunk frame encloses every return");
        frame.returns.push((id, typing));
    }

    pub(crate) fn analyze_vararg(&mut self, id: ExprId) {
        let vararg = self.function_frame().and_then(|frame| frame.vararg.clone());
        if let Some(vararg) = vararg {
            self.set_typing(id, vararg);
        }
    }
}

/// Positional union of return tuples.
///
/// ## Notes
/// - A position some `return` does not supply contributes `nil` for that return.
/// - Trailing varargs merge with each other and with fixed positions past their start.
pub(crate) fn merge_returns<'t>(returns: impl IntoIterator<Item = &'t Typing>) -> Vec<Typing> {
    let tuples: Vec<Vec<Typing>> = returns.into_iter().map(Typing::tuple_elements).collect();
    let width = tuples
        .iter()
        .map(|elements| split_vararg(elements).0.len())
        .max()
        .unwrap_or(0);

    let mut merged = Vec::with_capacity(width);
    for position in 0..width {
        let members = tuples.iter().map(|elements| {
            let (fixed, tail) = split_vararg(elements);
            match fixed.get(position) {
                Some(typing) => typing.clone(),
                None => tail.cloned().unwrap_or_else(Typing::nil),
            }
        });
        merged.push(Typing::union(members));
    }

    let tails: Vec<Typing> = tuples
        .iter()
        .filter_map(|elements| split_vararg(elements).1.cloned())
        .collect();
    if !tails.is_empty() {
        merged.push(Typing::vararg(Typing::union(tails)));
    }
    merged
}
