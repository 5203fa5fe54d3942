//! Message and tooltip text.
//!
//! Messages name types canonically (`java.util.List<java.lang.String>`) and method signatures
//! presentably (`add(E)`). Tooltips are small HTML fragments rendered by the host.

use nova_types::java::overload::MethodCandidate;
use nova_types::{format_type, is_assignable, presentable_type, MethodDef, Type, TypeEnv};

/// `'(java.lang.String, int)'`-style argument list, without quotes.
pub(crate) fn arg_list(env: &dyn TypeEnv, args: &[Type]) -> String {
    let args: Vec<String> = args.iter().map(|a| format_type(env, a)).collect();
    format!("({})", args.join(", "))
}

pub(crate) fn param_list(env: &dyn TypeEnv, params: &[Type]) -> String {
    let params: Vec<String> = params.iter().map(|p| presentable_type(env, p)).collect();
    format!("({})", params.join(", "))
}

/// `name(P1, P2)` with the candidate's call-site parameter types.
pub(crate) fn candidate_signature(env: &dyn TypeEnv, candidate: &MethodCandidate) -> String {
    format!("{}{}", candidate.name(env), param_list(env, &candidate.params(env)))
}

/// `name(P1, P2)` with the parameter types as declared.
pub(crate) fn declared_signature(env: &dyn TypeEnv, candidate: &MethodCandidate) -> String {
    format!(
        "{}{}",
        candidate.name(env),
        param_list(env, candidate.declared_params(env))
    )
}

pub(crate) fn method_signature(env: &dyn TypeEnv, method: &MethodDef) -> String {
    format!("{}{}", method.name, param_list(env, &method.params))
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn red(text: &str) -> String {
    format!("<font color='red'>{}</font>", escape_html(text))
}

/// Required/found table for incompatible-types diagnostics.
pub(crate) fn incompatible_types_tooltip(env: &dyn TypeEnv, required: &Type, found: &Type) -> String {
    format!(
        "<html><table><tr><td>Required:</td><td>{}</td></tr>\
         <tr><td>Found:</td><td>{}</td></tr></table></html>",
        escape_html(&format_type(env, required)),
        red(&format_type(env, found)),
    )
}

/// Parameters next to arguments, one row per position, mismatching arguments in red.
pub(crate) fn mismatch_tooltip(
    env: &dyn TypeEnv,
    candidate: &MethodCandidate,
    owner: &str,
    args: &[Type],
) -> String {
    let params = candidate.params(env);
    let varargs = candidate.is_varargs(env);
    let mut out = format!(
        "<html><body>{} in {} cannot be applied to:<table>\
         <tr><td>Expected<br>Parameters:</td><td>Actual<br>Arguments:</td></tr>",
        escape_html(&candidate_signature(env, candidate)),
        escape_html(owner),
    );
    for row in 0..params.len().max(args.len()) {
        let param = params.get(row).or_else(|| if varargs { params.last() } else { None });
        let param_text = params
            .get(row)
            .map(|p| escape_html(&presentable_type(env, p)))
            .unwrap_or_default();
        let arg_text = match args.get(row) {
            Some(arg) => {
                let text = presentable_type(env, arg);
                let fits = param.is_some_and(|p| {
                    is_assignable(env, p, arg)
                        || (varargs && matches!(p, Type::Array(c) if is_assignable(env, c, arg)))
                });
                if fits {
                    escape_html(&text)
                } else {
                    red(&text)
                }
            }
            None => String::new(),
        };
        out.push_str(&format!("<tr><td>{param_text}</td><td>{arg_text}</td></tr>"));
    }
    out.push_str("</table></body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{PrimitiveType, TypeStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn tooltips_escape_generic_brackets() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let tooltip = incompatible_types_tooltip(
            &store,
            &Type::class(list, vec![string]),
            &Type::Primitive(PrimitiveType::Int),
        );
        assert_eq!(
            tooltip,
            "<html><table><tr><td>Required:</td><td>java.util.List&lt;java.lang.String&gt;</td></tr>\
             <tr><td>Found:</td><td><font color='red'>int</font></td></tr></table></html>"
        );
    }

    #[test]
    fn argument_lists_are_canonical() {
        let store = TypeStore::with_minimal_jdk();
        let string = Type::class(store.well_known().string, vec![]);
        assert_eq!(
            arg_list(&store, &[string, Type::Primitive(PrimitiveType::Int)]),
            "(java.lang.String, int)"
        );
        assert_eq!(arg_list(&store, &[]), "()");
    }
}
