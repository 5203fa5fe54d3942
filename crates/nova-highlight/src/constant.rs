//! Compile-time constant folding (JLS 15.28).
//!
//! Only what the rules need: switch labels, annotation values and narrowing of constant `int`
//! expressions. Names fold through `final` variables declared in the same file.

use nova_hir::{BinaryOp, ExprId, ExprKind, JavaFile, Literal, Member, Modifier, Symbol, UnaryOp, VarId, VarKind};
use nova_types::{PrimitiveType, Type};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Value {
    Bool(bool),
    Integral(i64),
    Floating(f64),
    Str(String),
}

impl Value {
    fn text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Integral(i) => i.to_string(),
            Value::Floating(f) => f.to_string(),
            Value::Str(s) => s.clone(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integral(i) => Some(*i as f64),
            Value::Floating(f) => Some(*f),
            _ => None,
        }
    }
}

const MAX_DEPTH: u32 = 32;

pub(crate) fn evaluate(file: &JavaFile, expr: ExprId) -> Option<Value> {
    eval(file, expr, 0)
}

pub(crate) fn is_constant(file: &JavaFile, expr: ExprId) -> bool {
    evaluate(file, expr).is_some()
}

/// Whether constant `value` survives narrowing to `target` (JLS 5.2).
pub(crate) fn fits(value: i64, target: PrimitiveType) -> bool {
    match target {
        PrimitiveType::Byte => i8::try_from(value).is_ok(),
        PrimitiveType::Short => i16::try_from(value).is_ok(),
        PrimitiveType::Char => u16::try_from(value).is_ok(),
        PrimitiveType::Int => i32::try_from(value).is_ok(),
        PrimitiveType::Long => true,
        _ => false,
    }
}

fn is_long(ty: &Type) -> bool {
    matches!(ty, Type::Primitive(PrimitiveType::Long))
}

fn wrap(value: i64, ty: &Type) -> i64 {
    if is_long(ty) {
        value
    } else {
        value as i32 as i64
    }
}

fn eval(file: &JavaFile, expr: ExprId, depth: u32) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    let node = &file.exprs[expr];
    match &node.kind {
        ExprKind::Literal(lit) => match lit {
            Literal::Int(v) => Some(Value::Integral(i64::from(*v))),
            Literal::Long(v) => Some(Value::Integral(*v)),
            Literal::Float(v) => Some(Value::Floating(f64::from(*v))),
            Literal::Double(v) => Some(Value::Floating(*v)),
            Literal::Char(c) => Some(Value::Integral(i64::from(u32::from(*c)))),
            Literal::String(s) => Some(Value::Str(s.clone())),
            Literal::Boolean(b) => Some(Value::Bool(*b)),
            Literal::Null => None,
        },
        ExprKind::Paren(inner) => eval(file, *inner, depth + 1),
        ExprKind::Name { resolution, .. } | ExprKind::FieldAccess { resolution, .. } => {
            let var = match resolution.symbol.as_ref()? {
                Symbol::Local(var) => *var,
                Symbol::Field { owner, index } => field_decl(file, *owner, *index)?,
                _ => return None,
            };
            let decl = &file.vars[var];
            if !decl.modifiers.has(Modifier::Final) {
                return None;
            }
            eval(file, decl.initializer?, depth + 1)
        }
        ExprKind::Unary { op, operand, .. } => {
            let value = eval(file, *operand, depth + 1)?;
            match (op, value) {
                (UnaryOp::Plus, v @ (Value::Integral(_) | Value::Floating(_))) => Some(v),
                (UnaryOp::Minus, Value::Integral(i)) => {
                    Some(Value::Integral(wrap(i.wrapping_neg(), &node.ty)))
                }
                (UnaryOp::Minus, Value::Floating(f)) => Some(Value::Floating(-f)),
                (UnaryOp::BitNot, Value::Integral(i)) => Some(Value::Integral(wrap(!i, &node.ty))),
                (UnaryOp::Not, Value::Bool(b)) => Some(Value::Bool(!b)),
                _ => None,
            }
        }
        ExprKind::Binary { op, lhs, rhs, .. } => {
            let lhs = eval(file, *lhs, depth + 1)?;
            let rhs = eval(file, *rhs, depth + 1)?;
            binary(*op, lhs, rhs, &node.ty)
        }
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => match eval(file, *condition, depth + 1)? {
            Value::Bool(true) => eval(file, *then_expr, depth + 1),
            Value::Bool(false) => eval(file, *else_expr, depth + 1),
            _ => None,
        },
        ExprKind::Cast { expr: inner, .. } => {
            let value = eval(file, *inner, depth + 1)?;
            match (&node.ty, value) {
                (Type::Primitive(p), Value::Integral(i)) if p.is_integral() => {
                    Some(Value::Integral(narrow(i, *p)))
                }
                (Type::Primitive(p), Value::Floating(f)) if p.is_integral() => {
                    Some(Value::Integral(float_to_integral(f, *p)))
                }
                (Type::Primitive(PrimitiveType::Float | PrimitiveType::Double), v) => {
                    v.as_f64().map(Value::Floating)
                }
                (Type::Primitive(PrimitiveType::Boolean), v @ Value::Bool(_)) => Some(v),
                (Type::Class(_), v @ Value::Str(_)) => Some(v),
                _ => None,
            }
        }
        _ => None,
    }
}

fn narrow(value: i64, target: PrimitiveType) -> i64 {
    match target {
        PrimitiveType::Byte => i64::from(value as i8),
        PrimitiveType::Short => i64::from(value as i16),
        PrimitiveType::Char => i64::from(value as u16),
        PrimitiveType::Int => i64::from(value as i32),
        _ => value,
    }
}

/// Shift distances are masked to the width of the promoted left operand (JLS 15.19).
fn shift(op: BinaryOp, a: i64, b: i64, ty: &Type) -> i64 {
    if is_long(ty) {
        let distance = (b & 0x3f) as u32;
        match op {
            BinaryOp::Shl => a << distance,
            BinaryOp::Shr => a >> distance,
            _ => ((a as u64) >> distance) as i64,
        }
    } else {
        let (a, distance) = (a as i32, (b & 0x1f) as u32);
        let v = match op {
            BinaryOp::Shl => a << distance,
            BinaryOp::Shr => a >> distance,
            _ => ((a as u32) >> distance) as i32,
        };
        i64::from(v)
    }
}

/// Floating to integral conversion: saturate to `long` or `int`, then narrow (JLS 5.1.3).
fn float_to_integral(value: f64, target: PrimitiveType) -> i64 {
    match target {
        PrimitiveType::Long => value as i64,
        _ => narrow(i64::from(value as i32), target),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value, ty: &Type) -> Option<Value> {
    use Value::*;

    if op == BinaryOp::Add && (matches!(lhs, Str(_)) || matches!(rhs, Str(_))) {
        return Some(Str(lhs.text() + &rhs.text()));
    }
    match (lhs, rhs) {
        (Integral(a), Integral(b)) => {
            let v = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                BinaryOp::Div => a.checked_div(b)?,
                BinaryOp::Rem => a.checked_rem(b)?,
                BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => shift(op, a, b, ty),
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                BinaryOp::BitXor => a ^ b,
                BinaryOp::Lt => return Some(Bool(a < b)),
                BinaryOp::Gt => return Some(Bool(a > b)),
                BinaryOp::Le => return Some(Bool(a <= b)),
                BinaryOp::Ge => return Some(Bool(a >= b)),
                BinaryOp::Eq => return Some(Bool(a == b)),
                BinaryOp::Ne => return Some(Bool(a != b)),
                BinaryOp::And | BinaryOp::Or => return None,
            };
            Some(Integral(wrap(v, ty)))
        }
        (Bool(a), Bool(b)) => match op {
            BinaryOp::And | BinaryOp::BitAnd => Some(Bool(a && b)),
            BinaryOp::Or | BinaryOp::BitOr => Some(Bool(a || b)),
            BinaryOp::BitXor | BinaryOp::Ne => Some(Bool(a != b)),
            BinaryOp::Eq => Some(Bool(a == b)),
            _ => None,
        },
        (a, b) => {
            let (a, b) = (a.as_f64()?, b.as_f64()?);
            match op {
                BinaryOp::Add => Some(Floating(a + b)),
                BinaryOp::Sub => Some(Floating(a - b)),
                BinaryOp::Mul => Some(Floating(a * b)),
                BinaryOp::Div => Some(Floating(a / b)),
                BinaryOp::Rem => Some(Floating(a % b)),
                BinaryOp::Lt => Some(Bool(a < b)),
                BinaryOp::Gt => Some(Bool(a > b)),
                BinaryOp::Le => Some(Bool(a <= b)),
                BinaryOp::Ge => Some(Bool(a >= b)),
                BinaryOp::Eq => Some(Bool(a == b)),
                BinaryOp::Ne => Some(Bool(a != b)),
                _ => None,
            }
        }
    }
}

/// The declaration of field `index` of `owner`, when `owner` is declared in `file`.
pub(crate) fn field_decl(file: &JavaFile, owner: nova_types::ClassId, index: usize) -> Option<VarId> {
    let class = file.class_decl(owner)?;
    file.classes[class].members.iter().find_map(|member| match member {
        Member::Field(var) => match file.vars[*var].kind {
            VarKind::Field { index: i, .. } if i == index => Some(*var),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_hir::FileBuilder;
    use nova_types::TypeStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn folds_through_final_fields() {
        let mut store = TypeStore::with_minimal_jdk();
        let text = "class A { static final int K = 2; int f() { return K * 3 + 1; } }";
        let mut b = FileBuilder::new(&mut store, "A.java", text);
        let mut value = None;
        b.class("class A", |b| {
            b.field("static final int K = 2", |b| {
                b.lit("2");
            });
            b.method("int f()", |b| {
                b.return_(|b| {
                    value = Some(b.binary("K * 3 + 1", |b| {
                        b.binary("K * 3", |b| {
                            b.name("K");
                            b.lit("3");
                        });
                        b.lit("1");
                    }));
                });
            });
        });
        let file = b.finish();
        assert_eq!(evaluate(&file, value.unwrap()), Some(Value::Integral(7)));
    }

    #[test]
    fn int_shift_distances_wrap_at_32() {
        let int = Type::Primitive(PrimitiveType::Int);
        let long = Type::Primitive(PrimitiveType::Long);
        let shl = |a, b, ty: &Type| binary(BinaryOp::Shl, Value::Integral(a), Value::Integral(b), ty);

        assert_eq!(shl(1, 32, &int), Some(Value::Integral(1)));
        assert_eq!(shl(1, 33, &int), Some(Value::Integral(2)));
        assert_eq!(shl(1, 31, &int), Some(Value::Integral(i64::from(i32::MIN))));
        assert_eq!(shl(1, 32, &long), Some(Value::Integral(1 << 32)));
        assert_eq!(shl(1, 64, &long), Some(Value::Integral(1)));
        assert_eq!(
            binary(BinaryOp::UShr, Value::Integral(-1), Value::Integral(28), &int),
            Some(Value::Integral(15))
        );
        assert_eq!(
            binary(BinaryOp::Shr, Value::Integral(-16), Value::Integral(34), &int),
            Some(Value::Integral(-4))
        );
    }

    #[test]
    fn floating_casts_saturate_through_int() {
        assert_eq!(float_to_integral(3e10, PrimitiveType::Int), i64::from(i32::MAX));
        assert_eq!(float_to_integral(3e10, PrimitiveType::Long), 30_000_000_000);
        assert_eq!(float_to_integral(3e10, PrimitiveType::Short), -1);
        assert_eq!(float_to_integral(f64::NAN, PrimitiveType::Int), 0);
        assert_eq!(float_to_integral(-2.9, PrimitiveType::Byte), -2);
    }

    #[test]
    fn narrowing_bounds() {
        assert!(fits(127, PrimitiveType::Byte));
        assert!(!fits(128, PrimitiveType::Byte));
        assert!(fits(65535, PrimitiveType::Char));
        assert!(!fits(-1, PrimitiveType::Char));
    }
}
