//! Resolution of parsed annotations into typings.

use tlua_core::typing::Parameter;
use tlua_core::{FunctionTyping, Typing, TypingHolder};
use tlua_syntax::annotations::{ParsedFunctionTyping, ParsedTyping};

use super::Analyzer;
use crate::frontend::diagnostics::errors;

impl Analyzer<'_> {
    /// Resolve an annotation, reporting unknown type names at `index`.
    ///
    /// Unknown names resolve to `any` so the walk can continue.
    pub(crate) fn resolve_annotation(&mut self, parsed: &ParsedTyping, index: usize) -> Typing {
        let flow = &self.flow;
        let mut unknown = Vec::new();
        let typing = resolve_typing(parsed, &mut |name: &str| {
            flow.typing(name).cloned().unwrap_or_else(|| {
                unknown.push(name.to_string());
                Typing::Any
            })
        });
        for name in unknown {
            self.report(errors::unknown_type(&name, index));
        }
        typing
    }

    /// Resolve a list of annotations (a return list).
    pub(crate) fn resolve_annotations(&mut self, parsed: &[ParsedTyping], index: usize) -> Vec<Typing> {
        parsed.iter().map(|p| self.resolve_annotation(p, index)).collect()
    }
}

/// Resolve an annotation, asking `lookup` for every type name it mentions.
pub(crate) fn resolve_typing<F: FnMut(&str) -> Typing>(parsed: &ParsedTyping, lookup: &mut F) -> Typing {
    match parsed {
        ParsedTyping::Name(name) => lookup(name),
        ParsedTyping::Constant(value) => Typing::Constant(value.clone()),
        ParsedTyping::Array(element) => Typing::array(resolve_typing(element, lookup)),
        ParsedTyping::Union(members) => Typing::union(members.iter().map(|m| resolve_typing(m, lookup))),
        ParsedTyping::Intersection(members) => Typing::intersection(members.iter().map(|m| resolve_typing(m, lookup))),
        ParsedTyping::Function(function) => Typing::function(resolve_signature(function, lookup)),
        ParsedTyping::Tuple(elements) => Typing::Tuple(elements.iter().map(|e| resolve_typing(e, lookup)).collect()),
        ParsedTyping::Vararg(element) => Typing::vararg(resolve_typing(element, lookup)),
    }
}

fn resolve_signature<F: FnMut(&str) -> Typing>(function: &ParsedFunctionTyping, lookup: &mut F) -> FunctionTyping {
    let parameters = function
        .parameters
        .iter()
        .map(|param| {
            let typing = match &param.typing {
                Some(parsed) => TypingHolder::explicit(resolve_typing(parsed, lookup)),
                None => TypingHolder::unknown(),
            };
            Parameter::new(param.name.clone(), typing)
        })
        .collect();
    let vararg = if function.variadic {
        Some(match &function.vararg {
            Some(parsed) => resolve_typing(parsed, lookup),
            None => Typing::Any,
        })
    } else {
        None
    };
    FunctionTyping {
        parameters,
        vararg,
        returns: function.returns.iter().map(|r| resolve_typing(r, lookup)).collect(),
    }
}
