//! Standard-library declarations
//!
//! The analyzer knows nothing about Lua's standard library on its own; these declarations are handed to it
//! as an ordinary [`TypeEnvironment`], written in the dialect's own annotation syntax.

use crate::frontend::analyzer::{DeclarationError, TypeEnvironment};

/// Global functions and their signatures.
const GLOBALS: &[(&str, &str)] = &[
    ("print", "(...: any) => ()"),
    ("tostring", "(value: any) => string"),
    ("tonumber", "(value: any, ...: number) => number | nil"),
    ("type", "(value: any) => string"),
    ("pairs", "(t: any) => (any, any, nil)"),
    ("ipairs", "(t: any) => (any, any, number)"),
    ("error", "(message: any, ...: number) => ()"),
    ("assert", "(value: any, ...: any) => (...any)"),
    ("select", "(index: number | string, ...: any) => (...any)"),
];

const STRING_MEMBERS: &[(&str, &str)] = &[
    ("len", "(s: string) => number"),
    ("sub", "(s: string, i: number, ...: number) => string"),
    ("upper", "(s: string) => string"),
    ("lower", "(s: string) => string"),
    ("rep", "(s: string, n: number) => string"),
    ("reverse", "(s: string) => string"),
    ("format", "(format: string, ...: any) => string"),
    ("byte", "(s: string, ...: number) => (...number)"),
    ("char", "(...: number) => string"),
    ("find", "(s: string, pattern: string, ...: any) => (...any)"),
];

const MATH_MEMBERS: &[(&str, &str)] = &[
    ("abs", "(x: number) => number"),
    ("ceil", "(x: number) => number"),
    ("floor", "(x: number) => number"),
    ("sqrt", "(x: number) => number"),
    ("max", "(x: number, ...: number) => number"),
    ("min", "(x: number, ...: number) => number"),
    ("random", "(...: number) => number"),
    ("pi", "number"),
    ("huge", "number"),
];

/// Build the environment holding the standard globals and the `string` and `math` tables.
///
/// ## Errors
/// Only if one of the declarations above is malformed.
pub fn standard_environment() -> Result<TypeEnvironment, DeclarationError> {
    let mut env = TypeEnvironment::new();
    for (name, annotation) in GLOBALS {
        env = env.declare_global(*name, annotation)?;
    }
    env = env.declare_table("string", STRING_MEMBERS)?;
    env = env.declare_table("math", MATH_MEMBERS)?;
    tracing::debug!(globals = env.globals().count(), "standard environment ready");
    Ok(env)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tlua_core::{FieldKey, Typing};

    use super::*;

    #[test]
    fn test_standard_environment_builds() {
        let env = standard_environment().unwrap();
        for (name, _) in GLOBALS {
            assert!(env.global(name).is_some(), "missing global {name}");
        }
        assert!(env.global("string").is_some());
        assert!(env.global("math").is_some());
    }

    #[test]
    fn test_standard_globals_are_explicit_functions() {
        let env = standard_environment().unwrap();
        let tostring = env.global("tostring").unwrap();
        assert!(tostring.explicit);
        assert_eq!(tostring.typing.to_string(), "(value: any) => string");
    }

    #[test]
    fn test_math_table_members() {
        let env = standard_environment().unwrap();
        let math = &env.global("math").unwrap().typing;
        assert_eq!(math.to_string(), "math");
        assert_eq!(math.field(FieldKey::Name("pi")), Some(Typing::number()));
        assert!(math.field(FieldKey::Name("floor")).is_some());
        assert_eq!(math.field(FieldKey::Name("nope")), None);
    }
}
