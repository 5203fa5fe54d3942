use nova_hir::{ExprId, ExprKind, FileBuilder, ImportTarget, JavaFile, Resolution, Symbol};
use nova_types::{PrimitiveType, Type, TypeEnv, TypeStore};
use pretty_assertions::assert_eq;

fn resolution(file: &JavaFile, expr: ExprId) -> &Resolution {
    match &file.exprs[expr].kind {
        ExprKind::Name { resolution, .. } | ExprKind::FieldAccess { resolution, .. } => resolution,
        other => panic!("expected a name, got {other:?}"),
    }
}

#[test]
fn names_resolve_to_locals_and_fields() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A {\n  int x;\n  int f(int p) { return p + x; }\n}\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let (mut p, mut x, mut sum) = (None, None, None);
    let mut method = None;
    let a = b.class("class A", |b| {
        b.field("int x", |_| ());
        method = Some(b.method("int f(int p)", |b| {
            b.return_(|b| {
                sum = Some(b.binary("p + x", |b| {
                    p = Some(b.name("p"));
                    x = Some(b.name("x"));
                }));
            });
        }));
    });
    let file = b.finish();

    let param = file.methods[method.unwrap()].params[0];
    assert_eq!(resolution(&file, p.unwrap()).symbol, Some(Symbol::Local(param)));
    let field = resolution(&file, x.unwrap());
    assert_eq!(
        field.symbol,
        Some(Symbol::Field {
            owner: file.classes[a].def,
            index: 0
        })
    );
    assert!(field.is_static_context_ok);
    assert_eq!(file.exprs[sum.unwrap()].ty, Type::Primitive(PrimitiveType::Int));
}

#[test]
fn instance_fields_are_flagged_in_static_context() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A {\n  int x;\n  static int f() { return x; }\n}\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut x = None;
    b.class("class A", |b| {
        b.field("int x", |_| ());
        b.method("static int f()", |b| {
            b.return_(|b| x = Some(b.name("x")));
        });
    });
    let file = b.finish();

    let x = resolution(&file, x.unwrap());
    assert!(x.is_valid);
    assert!(!x.is_static_context_ok);
}

#[test]
fn private_fields_of_other_classes_are_inaccessible() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { private int secret; }\nclass B { int f(A a) { return a.secret; } }\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut access = None;
    b.class("class A", |b| {
        b.field("private int secret", |_| ());
    });
    b.class("class B", |b| {
        b.method("int f(A a)", |b| {
            b.return_(|b| {
                access = Some(b.field_access("a.secret", |b| b.name("a")));
            });
        });
    });
    let file = b.finish();

    let access = access.unwrap();
    let resolved = resolution(&file, access);
    assert!(resolved.is_valid);
    assert!(!resolved.is_accessible);
    assert_eq!(file.exprs[access].ty, Type::Primitive(PrimitiveType::Int));
}

#[test]
fn field_types_are_viewed_through_the_receiver() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Box<T> { T value; }\nclass A { String f(Box<String> box) { return box.value; } }\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut access = None;
    b.class("class Box<T>", |b| {
        b.field("T value", |_| ());
    });
    b.class("class A", |b| {
        b.method("String f(Box<String> box)", |b| {
            b.return_(|b| {
                access = Some(b.field_access("box.value", |b| b.name("box")));
            });
        });
    });
    let file = b.finish();

    let string = store.well_known().string;
    assert_eq!(file.exprs[access.unwrap()].ty, Type::class(string, vec![]));
}

#[test]
fn case_labels_name_constants_of_the_selector_enum() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "enum E { ONE, TWO }\nclass A {\n  void f(E e) {\n    switch (e) {\n      case TWO: break;\n    }\n  }\n}\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut label = None;
    let e = b.class("enum E", |b| {
        b.enum_constant("ONE", |_| ());
        b.enum_constant("TWO", |_| ());
    });
    b.class("class A", |b| {
        b.method("void f(E e)", |b| {
            b.switch(|b| {
                b.name("e");
                b.case(|b| label = Some(b.name("TWO")));
                b.break_(None);
            });
        });
    });
    let file = b.finish();

    assert_eq!(
        resolution(&file, label.unwrap()).symbol,
        Some(Symbol::Field {
            owner: file.classes[e].def,
            index: 1
        })
    );
}

#[test]
fn imports_resolve_to_classes_packages_and_static_members() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.*;\nimport java.util.Missing;\nimport static java.lang.String.valueOf;\nclass A {}\n";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let on_demand = b.import("import java.util.*");
    let missing = b.import("import java.util.Missing");
    let static_member = b.import("import static java.lang.String.valueOf");
    b.class("class A", |_| ());
    let file = b.finish();

    assert_eq!(
        file.import_decls[on_demand].resolved,
        Some(ImportTarget::Package("java.util".to_string()))
    );
    assert_eq!(file.import_decls[missing].resolved, None);
    let string = store.well_known().string;
    assert_eq!(
        file.import_decls[static_member].resolved,
        Some(ImportTarget::StaticMember {
            owner: string,
            name: "valueOf".to_string(),
            exists: true
        })
    );
}

#[test]
fn identifiers_with_combining_marks_resolve() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { int f() { int e\u{301}x = 1; return e\u{301}x; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let (mut var, mut use_site) = (None, None);
    b.class("class A", |b| {
        b.method("int f()", |b| {
            var = Some(b.local("int e\u{301}x = 1", |b| b.lit("1")));
            b.return_(|b| use_site = Some(b.name("e\u{301}x")));
        });
    });
    let file = b.finish();

    let var = var.unwrap();
    assert_eq!(file.vars[var].name, "e\u{301}x");
    assert_eq!(
        resolution(&file, use_site.unwrap()).symbol,
        Some(Symbol::Local(var))
    );
}
