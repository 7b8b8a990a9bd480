//! Canonical rendering of typings.
//!
//! The rendered form is what diagnostics quote and what the unparser embeds next to typed nodes, so it reads
//! like annotation syntax: `number | nil`, `string[]`, `(a: number, ...: string) => (boolean, string)`.

use std::fmt;

use super::{FunctionTyping, Typing, split_vararg};

impl fmt::Display for Typing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typing::Any => f.write_str("any"),
            Typing::Class(class) => f.write_str(&class.name),
            Typing::Constant(value) => write!(f, "{}", value),
            Typing::Array(element) => {
                write_operand(f, element, needs_parens_in_suffix(element))?;
                f.write_str("[]")
            }
            Typing::Tuple(elements) => write_tuple(f, elements),
            Typing::Vararg(element) => {
                f.write_str("...")?;
                write_operand(f, element, needs_parens_in_suffix(element))
            }
            Typing::Union(members) => write_joined(f, members, " | ", |m| matches!(m, Typing::Function(_))),
            Typing::Intersection(members) => write_joined(f, members, " & ", |m| {
                matches!(m, Typing::Union(_) | Typing::Function(_))
            }),
            Typing::Interface(interface) => match &interface.name {
                Some(name) => f.write_str(name),
                None => {
                    if interface.fields.is_empty() {
                        return f.write_str("{}");
                    }
                    f.write_str("{ ")?;
                    for (i, (name, typing)) in interface.fields.iter().enumerate() {
                        if i > 0 {
                            f.write_str("; ")?;
                        }
                        write!(f, "{}: {}", name, typing)?;
                    }
                    f.write_str(" }")
                }
            },
            Typing::Alias(alias) => f.write_str(&alias.name),
            Typing::Function(function) => write!(f, "{}", function),
        }
    }
}

impl fmt::Display for FunctionTyping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", param.name, param.typing.typing)?;
        }
        if let Some(vararg) = &self.vararg {
            if !self.parameters.is_empty() {
                f.write_str(", ")?;
            }
            write!(f, "...: {}", vararg)?;
        }
        f.write_str(") => ")?;
        match self.returns.as_slice() {
            [single] if !matches!(single, Typing::Vararg(_)) => write!(f, "{}", single),
            elements => write_tuple(f, elements),
        }
    }
}

fn needs_parens_in_suffix(typing: &Typing) -> bool {
    matches!(typing, Typing::Union(_) | Typing::Intersection(_) | Typing::Function(_))
}

fn write_operand(f: &mut fmt::Formatter<'_>, typing: &Typing, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", typing)
    } else {
        write!(f, "{}", typing)
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    members: &[Typing],
    separator: &str,
    parens: impl Fn(&Typing) -> bool,
) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_operand(f, member, parens(member))?;
    }
    Ok(())
}

fn write_tuple(f: &mut fmt::Formatter<'_>, elements: &[Typing]) -> fmt::Result {
    let (fixed, tail) = split_vararg(elements);
    f.write_str("(")?;
    for (i, element) in fixed.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", element)?;
    }
    if let Some(tail) = tail {
        if !fixed.is_empty() {
            f.write_str(", ")?;
        }
        f.write_str("...")?;
        write_operand(f, tail, needs_parens_in_suffix(tail))?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::typing::{Parameter, TypingHolder};

    #[test]
    fn test_render_basic() {
        assert_eq!(Typing::Any.to_string(), "any");
        assert_eq!(Typing::union([Typing::number(), Typing::nil()]).to_string(), "number | nil");
        assert_eq!(Typing::array(Typing::string()).to_string(), "string[]");
        let optional_list = Typing::array(Typing::union([Typing::string(), Typing::nil()]));
        assert_eq!(optional_list.to_string(), "(string | nil)[]");
    }

    #[test]
    fn test_render_tuple_and_vararg() {
        let t = Typing::Tuple(vec![Typing::number(), Typing::vararg(Typing::string())]);
        assert_eq!(t.to_string(), "(number, ...string)");
        assert_eq!(Typing::Tuple(vec![]).to_string(), "()");
    }

    #[test]
    fn test_render_function() {
        let f = FunctionTyping {
            parameters: vec![Parameter::new("a", TypingHolder::explicit(Typing::number()))],
            vararg: Some(Typing::string()),
            returns: vec![Typing::boolean()],
        };
        assert_eq!(f.to_string(), "(a: number, ...: string) => boolean");
        let none = FunctionTyping::default();
        assert_eq!(none.to_string(), "() => ()");
    }

    #[test]
    fn test_render_interface() {
        let mut fields = BTreeMap::new();
        fields.insert("y".to_string(), Typing::number());
        fields.insert("x".to_string(), Typing::number());
        assert_eq!(Typing::interface(None, fields.clone()).to_string(), "{ x: number; y: number }");
        assert_eq!(Typing::interface(Some("Point".into()), fields).to_string(), "Point");
        assert_eq!(Typing::interface(None, BTreeMap::new()).to_string(), "{}");
    }

    #[test]
    fn test_render_constants() {
        assert_eq!(Typing::constant_bool(true).to_string(), "true");
        let s = Typing::Constant(crate::constant::ConstantValue::String("on".into()));
        assert_eq!(s.to_string(), "\"on\"");
    }
}
