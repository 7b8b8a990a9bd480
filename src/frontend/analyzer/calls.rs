//! Calls and argument checking.
//!
//! ## Notes
//! - Arguments are evaluated inside their own Function-Flow frame, so nothing learnt while typing them (a lambda
//!   argument's assignments, for instance) leaks into the calling block.
//! - A call reports at most one argument problem: the first arity or cast failure stops the check.
//! - The last argument spreads: `f(g())` passes every value `g` returns.

use tlua_core::typing::split_vararg;
use tlua_core::{FieldKey, FunctionTyping, Typing, TypingHolder};
use tlua_syntax::ast::{ExprId, ExprKind};
use tlua_syntax::walker::Walker;

use super::Analyzer;
use crate::frontend::diagnostics::errors;

/// The values a call passes, with the node each value came from (for diagnostics).
struct Arguments {
    values: Vec<Typing>,
    /// Node of each fixed value; spread values point at the last argument.
    nodes: Vec<usize>,
    call_index: usize,
}

impl Arguments {
    fn index_of(&self, position: usize) -> usize {
        self.nodes
            .get(position)
            .or(self.nodes.last())
            .copied()
            .unwrap_or(self.call_index)
    }
}

impl Analyzer<'_> {
    pub(crate) fn analyze_function_call(&mut self, id: ExprId) {
        let ExprKind::FunctionCall(call) = self.chunk.ast.kind(id) else {
            return;
        };
        let (target, arguments) = (call.target, call.arguments.clone());

        self.walk(target);
        self.with_flow(|analyzer| {
            for &argument in &arguments {
                analyzer.walk(argument);
            }
        });

        let callee = self.chunk.ast[target].typing.clone();
        let args = self.arguments(id, None, &arguments);
        self.dispatch_call(id, callee, args);
    }

    pub(crate) fn analyze_function_self_call(&mut self, id: ExprId) {
        let ExprKind::FunctionSelfCall(call) = self.chunk.ast.kind(id) else {
            return;
        };
        let (base, name, arguments) = (call.base, call.name.clone(), call.arguments.clone());

        self.walk(base);
        self.with_flow(|analyzer| {
            for &argument in &arguments {
                analyzer.walk(argument);
            }
        });

        let receiver = self.scalar(base);
        let callee = receiver
            .typing
            .field(FieldKey::Name(&name))
            .map(|typing| TypingHolder::new(typing, receiver.explicit));
        let args = self.arguments(id, Some(base), &arguments);
        self.dispatch_call(id, callee, args);
    }

    fn arguments(&self, call: ExprId, receiver: Option<ExprId>, arguments: &[ExprId]) -> Arguments {
        let call_index = self.chunk.ast[call].index;
        let mut values = Vec::new();
        let mut nodes = Vec::new();
        if let Some(receiver) = receiver {
            values.push(self.scalar(receiver).typing);
            nodes.push(self.chunk.ast[receiver].index);
        }
        let spread = self.spread(arguments);
        for (position, typing) in spread.into_iter().enumerate() {
            let node = arguments.get(position).or(arguments.last());
            if let Some(&node) = node {
                nodes.push(self.chunk.ast[node].index);
            }
            values.push(typing);
        }
        Arguments {
            values,
            nodes,
            call_index,
        }
    }

    /// Type the call node from the callee's typing and check the arguments against it.
    fn dispatch_call(&mut self, id: ExprId, callee: Option<TypingHolder>, args: Arguments) {
        let callee = callee.map(|holder| holder.typing.collapse()).unwrap_or(Typing::Any);
        tracing::debug!(callee = %callee, arguments = args.values.len(), "call");

        match callee.resolved() {
            Typing::Any => {
                self.set_typing(id, TypingHolder::implicit(Typing::vararg(Typing::Any)));
                self.report(errors::implicit_call(args.call_index));
            }
            Typing::Function(function) => {
                let function = function.clone();
                self.set_typing(id, TypingHolder::explicit(function.returns_tuple()));
                self.check_arguments(&function, &args);
            }
            other => {
                let rendered = other.to_string();
                self.set_typing(id, TypingHolder::implicit(Typing::vararg(Typing::Any)));
                self.report(errors::cannot_call(&rendered, args.call_index));
            }
        }
    }

    fn check_arguments(&mut self, function: &FunctionTyping, args: &Arguments) {
        let (fixed, tail) = split_vararg(&args.values);
        let parameters = &function.parameters;

        if function.vararg.is_none() && fixed.len() > parameters.len() {
            self.report(errors::wrong_parameters(
                parameters.len(),
                false,
                fixed.len(),
                args.call_index,
            ));
            return;
        }

        for (position, parameter) in parameters.iter().enumerate() {
            let Some(value) = fixed.get(position).or(tail) else {
                self.report(errors::wrong_parameters(
                    parameters.len(),
                    function.vararg.is_some(),
                    fixed.len(),
                    args.call_index,
                ));
                return;
            };
            if !parameter.typing.typing.can_cast_from(value) {
                self.report(errors::cannot_cast_parameter(
                    position,
                    &parameter.name,
                    &parameter.typing.typing.to_string(),
                    &value.to_string(),
                    args.index_of(position),
                ));
                return;
            }
        }

        let Some(vararg) = &function.vararg else {
            return;
        };
        let surplus = fixed.iter().enumerate().skip(parameters.len());
        for (position, value) in surplus.chain(tail.map(|tail| (fixed.len(), tail))) {
            if !vararg.can_cast_from(value) {
                self.report(errors::cannot_cast_vararg(
                    position,
                    &vararg.to_string(),
                    &value.to_string(),
                    args.index_of(position),
                ));
                return;
            }
        }
    }
}
