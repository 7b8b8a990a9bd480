//! Function-Flow tracking.
//!
//! The analyzer keeps a chain of flow frames: one for the main chunk, one per function body, and one per call
//! while its arguments are evaluated. Each frame maps variable identities to what is currently known about them
//! and type names to typings, and lookups walk from the innermost frame outwards.
//!
//! ## Notes
//! - Keys are [`VarId`]s, never names, so a shadowing `local x` never collides with an outer `x`.
//! - A variable remembers two typings: the one it was declared with (used to check later assignments) and the one
//!   it was last assigned (what reads observe).
//! - Frames are strictly LIFO; the analyzer pushes and pops them through its scoped `with_flow` helper.

use std::collections::HashMap;

use tlua_core::lang::typings::{self, BUILTIN_TYPINGS};
use tlua_core::{Typing, TypingHolder};
use tlua_syntax::scope::VarId;

/// What is known about one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEntry {
    /// Typing from the declaration's annotation, if it had one.
    pub declared: Option<TypingHolder>,
    /// Typing of the most recent assignment.
    pub current: TypingHolder,
}

#[derive(Debug, Default)]
struct FlowFrame {
    variables: HashMap<VarId, FlowEntry>,
    typings: HashMap<String, Typing>,
}

/// The chain of flow frames.
#[derive(Debug)]
pub struct FunctionFlow {
    frames: Vec<FlowFrame>,
}

impl FunctionFlow {
    /// A chain holding one root frame seeded with the builtin type names.
    pub fn new() -> Self {
        let mut root = FlowFrame::default();
        for info in BUILTIN_TYPINGS {
            root.typings.insert(info.canonical.to_string(), typings::typing_for(info.id));
        }
        Self { frames: vec![root] }
    }

    /// Number of frames (1 when only the root is active).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self) {
        self.frames.push(FlowFrame::default());
        tracing::trace!(depth = self.frames.len(), "flow push");
    }

    /// Pop the innermost frame; the root frame is never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        tracing::trace!(depth = self.frames.len(), "flow pop");
    }

    fn top(&mut self) -> &mut FlowFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    // ========================================================================
    // Type names
    // ========================================================================

    /// Make a type name resolvable from the innermost frame on.
    pub fn set_typing(&mut self, name: impl Into<String>, typing: Typing) {
        self.top().typings.insert(name.into(), typing);
    }

    pub fn typing(&self, name: &str) -> Option<&Typing> {
        self.frames.iter().rev().find_map(|frame| frame.typings.get(name))
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// The entry for `var` in the innermost frame that knows it.
    pub fn entry(&self, var: VarId) -> Option<&FlowEntry> {
        self.frames.iter().rev().find_map(|frame| frame.variables.get(&var))
    }

    /// What a read of `var` observes.
    pub fn variable(&self, var: VarId) -> Option<&TypingHolder> {
        self.entry(var).map(|entry| &entry.current)
    }

    /// The typing `var` was declared with, if any frame recorded one.
    pub fn declared(&self, var: VarId) -> Option<&TypingHolder> {
        self.entry(var).and_then(|entry| entry.declared.as_ref())
    }

    /// Record a declaration with an annotation: both the declared and the current typing.
    pub fn declare(&mut self, var: VarId, typing: TypingHolder) {
        self.top().variables.insert(
            var,
            FlowEntry {
                declared: Some(typing.clone()),
                current: typing,
            },
        );
    }

    /// Record an assignment in the innermost frame, keeping the declared typing found further out.
    pub fn assign(&mut self, var: VarId, typing: TypingHolder) {
        let declared = self.declared(var).cloned();
        self.top().variables.insert(
            var,
            FlowEntry {
                declared,
                current: typing,
            },
        );
    }
}

impl Default for FunctionFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlua_syntax::scope::ScopeTree;

    fn vars() -> (VarId, VarId) {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        let a = scopes.declare(root, "x", 0);
        let b = scopes.declare(root, "x", 10);
        (a, b)
    }

    #[test]
    fn test_builtin_typings_are_seeded() {
        let flow = FunctionFlow::new();
        assert_eq!(flow.typing("number"), Some(&Typing::number()));
        assert_eq!(flow.typing("nil"), Some(&Typing::nil()));
        assert_eq!(flow.typing("Number"), None);
    }

    #[test]
    fn test_shadowed_declarations_stay_apart() {
        let (first, second) = vars();
        let mut flow = FunctionFlow::new();
        flow.assign(first, TypingHolder::explicit(Typing::number()));
        flow.assign(second, TypingHolder::explicit(Typing::string()));
        assert_eq!(flow.variable(first).map(|h| &h.typing), Some(&Typing::number()));
        assert_eq!(flow.variable(second).map(|h| &h.typing), Some(&Typing::string()));
    }

    #[test]
    fn test_inner_frames_shadow_and_pop() {
        let (var, _) = vars();
        let mut flow = FunctionFlow::new();
        flow.declare(var, TypingHolder::explicit(Typing::union([Typing::number(), Typing::nil()])));
        flow.push();
        flow.assign(var, TypingHolder::explicit(Typing::number()));
        assert_eq!(flow.variable(var).map(|h| &h.typing), Some(&Typing::number()));
        assert_eq!(
            flow.declared(var).map(|h| &h.typing),
            Some(&Typing::union([Typing::number(), Typing::nil()]))
        );
        flow.pop();
        assert_eq!(
            flow.variable(var).map(|h| &h.typing),
            Some(&Typing::union([Typing::number(), Typing::nil()]))
        );
    }

    #[test]
    fn test_root_frame_is_never_popped() {
        let mut flow = FunctionFlow::new();
        flow.pop();
        assert_eq!(flow.depth(), 1);
        assert!(flow.typing("string").is_some());
    }
}
