use nova_hir::{FileBuilder, TypeRefKind, TypeRefTarget, VarId};
use nova_types::{PrimitiveType, Type, TypeEnv, TypeStore};
use pretty_assertions::assert_eq;

#[test]
fn expression_types_follow_promotion_rules() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A {
  void f(byte bt, long ln, int[] xs, String s) {
    Object a = bt + bt;
    Object c = bt + ln;
    Object d = s + 1;
    Object e = xs[0];
    Object g = bt < ln;
    Object h = bt > 0 ? bt : ln;
    Object k = new int[3][];
    Object m = String.class;
  }
}
";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut out = Vec::new();
    b.class("class A", |b| {
        b.method("void f(byte bt, long ln, int[] xs, String s)", |b| {
            b.local("Object a = bt + bt", |b| {
                out.push(b.binary("bt + bt", |b| {
                    b.name("bt");
                    b.name("bt");
                }))
            });
            b.local("Object c = bt + ln", |b| {
                out.push(b.binary("bt + ln", |b| {
                    b.name("bt");
                    b.name("ln");
                }))
            });
            b.local("Object d = s + 1", |b| {
                out.push(b.binary("s + 1", |b| {
                    b.name("s");
                    b.lit("1");
                }))
            });
            b.local("Object e = xs[0]", |b| {
                out.push(b.index("xs[0]", |b| {
                    b.name("xs");
                    b.lit("0");
                }))
            });
            b.local("Object g = bt < ln", |b| {
                out.push(b.binary("bt < ln", |b| {
                    b.name("bt");
                    b.name("ln");
                }))
            });
            b.local("Object h = bt > 0 ? bt : ln", |b| {
                out.push(b.conditional("bt > 0 ? bt : ln", |b| {
                    b.binary("bt > 0", |b| {
                        b.name("bt");
                        b.lit("0");
                    });
                    b.name("bt");
                    b.name("ln");
                }))
            });
            b.local("Object k = new int[3][]", |b| {
                out.push(b.new_array("new int[3][]", |b| b.lit("3")))
            });
            b.local("Object m = String.class", |b| out.push(b.class_lit("String.class")));
        });
    });
    let file = b.finish();

    let wk = store.well_known();
    let string = Type::class(wk.string, vec![]);
    let int = Type::Primitive(PrimitiveType::Int);
    let types: Vec<Type> = out.iter().map(|e| file.exprs[*e].ty.clone()).collect();
    assert_eq!(
        types,
        vec![
            int.clone(),
            Type::Primitive(PrimitiveType::Long),
            string.clone(),
            int.clone(),
            Type::Primitive(PrimitiveType::Boolean),
            Type::Primitive(PrimitiveType::Long),
            Type::array(Type::array(int)),
            Type::class(wk.class, vec![string]),
        ]
    );
}

#[test]
fn generic_calls_are_typed_at_the_receiver() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List;\nclass A {\n  List<String> xs;\n  String first() { return xs.get(0); }\n}\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.import("import java.util.List");
    let mut call = None;
    b.class("class A", |b| {
        b.field("List<String> xs", |_| ());
        b.method("String first()", |b| {
            b.return_(|b| {
                call = Some(b.call("xs.get(0)", |b| {
                    b.name("xs");
                    b.lit("0");
                }));
            });
        });
    });
    let file = b.finish();

    let string = store.well_known().string;
    assert_eq!(file.exprs[call.unwrap()].ty, Type::class(string, vec![]));
}

#[test]
fn type_references_resolve_through_scopes() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Outer<T> {\n  class Inner {}\n  Inner inner;\n  T value;\n  Missing missing;\n}\n";
    let mut b = FileBuilder::new(&mut store, "Outer.java", text);
    let mut inner = None;
    let mut fields = Vec::new();
    let outer = b.class("class Outer<T>", |b| {
        inner = Some(b.class("class Inner", |_| ()));
        fields.push(b.field("Inner inner", |_| ()));
        fields.push(b.field("T value", |_| ()));
        fields.push(b.field("Missing missing", |_| ()));
    });
    let file = b.finish();

    let target = |var: VarId| match &file.type_refs[file.vars[var].ty].kind {
        TypeRefKind::Class { resolved, .. } => *resolved,
        other => panic!("expected a class reference, got {other:?}"),
    };
    assert_eq!(
        target(fields[0]),
        Some(TypeRefTarget::Class(file.classes[inner.unwrap()].def))
    );
    let t = file.type_params[file.classes[outer].type_params[0]].def;
    assert_eq!(target(fields[1]), Some(TypeRefTarget::TypeParam(t)));
    assert_eq!(target(fields[2]), None);
    assert_eq!(file.type_refs[file.vars[fields[2]].ty].ty, Type::Unknown);
}
