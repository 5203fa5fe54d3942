use std::fmt::Write;

use crate::{ClassType, Type, TypeEnv, WildcardBound};

/// Canonical text of a type: fully qualified class names with type arguments
/// (`java.util.List<java.lang.String>`).
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, true, &mut out);
    out
}

/// Presentable text of a type: simple class names (`List<String>`).
pub fn presentable_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, false, &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, qualified: bool, out: &mut String) {
    match ty {
        Type::Void => out.push_str("void"),
        Type::Primitive(p) => out.push_str(p.keyword()),
        Type::Null => out.push_str("null"),
        Type::Named(name) => out.push_str(name),
        Type::Unknown | Type::Error => out.push_str("<unknown>"),
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(tp) => out.push_str(&tp.name),
            None => out.push('?'),
        },
        Type::Array(component) => {
            write_type(env, component, qualified, out);
            out.push_str("[]");
        }
        Type::Wildcard(bound) => match bound {
            WildcardBound::Unbounded => out.push('?'),
            WildcardBound::Extends(b) => {
                out.push_str("? extends ");
                write_type(env, b, qualified, out);
            }
            WildcardBound::Super(b) => {
                out.push_str("? super ");
                write_type(env, b, qualified, out);
            }
        },
        Type::Intersection(parts) => {
            for (idx, part) in parts.iter().enumerate() {
                if idx > 0 {
                    out.push_str(" & ");
                }
                write_type(env, part, qualified, out);
            }
        }
        Type::Class(ClassType { def, args }) => {
            match env.class(*def) {
                Some(class) if qualified => out.push_str(&class.qualified_name()),
                Some(class) => out.push_str(class.simple_name()),
                None => {
                    let _ = write!(out, "<class#{}>", def.idx());
                }
            }
            if !args.is_empty() {
                out.push('<');
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    write_type(env, arg, qualified, out);
                }
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimitiveType, TypeStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_and_presentable_text() {
        let env = TypeStore::with_minimal_jdk();
        let map = env.class_id("java.util.Map").unwrap();
        let string = Type::class(env.well_known().string, vec![]);
        let ty = Type::class(
            map,
            vec![
                string,
                Type::Wildcard(WildcardBound::Extends(Box::new(Type::array(
                    Type::Primitive(PrimitiveType::Int),
                )))),
            ],
        );

        assert_eq!(
            format_type(&env, &ty),
            "java.util.Map<java.lang.String,? extends int[]>"
        );
        assert_eq!(presentable_type(&env, &ty), "Map<String,? extends int[]>");
    }
}
