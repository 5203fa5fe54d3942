use nova_config::HighlightingConfig;
use nova_core::{JavaLanguageLevel, TextSize};
use nova_highlight::{codes, highlight_file, Program, QuickFix, Severity};
use nova_hir::FileBuilder;
use nova_types::TypeStore;
use pretty_assertions::assert_eq;

use super::{error, found, highlight};

#[test]
fn type_arguments_must_respect_bounds() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Box<T extends Number> {} class A { Box<String> s; Box<Integer> i; }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class Box<T extends Number>", |_| ());
    b.class("class A", |b| {
        b.field("Box<String> s", |_| ());
        b.field("Box<Integer> i", |_| ());
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::TYPE_ARGUMENT_OUT_OF_BOUNDS,
            "Type parameter 'java.lang.String' is not within its bound; should extend 'java.lang.Number'",
            "String",
        )]
    );
}

#[test]
fn a_cycle_is_reported_once() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A extends B {} class B extends A {}";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A extends B", |_| ());
    b.class("class B extends A", |_| ());
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(codes::CYCLIC_INHERITANCE, "Cyclic inheritance involving 'A'", "B")]
    );
}

#[test]
fn diamond_hierarchy_is_not_a_cycle() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "interface I {} interface J extends I {} interface K extends I {} class C implements J, K {}";
    let mut b = FileBuilder::new(&mut store, "C.java", text);
    b.class("interface I", |_| ());
    b.class("interface J extends I", |_| ());
    b.class("interface K extends I", |_| ());
    b.class("class C implements J, K", |_| ());
    let file = b.finish();

    assert_eq!(highlight(&store, &file), vec![]);
}

#[test]
fn covariant_returns_depend_on_the_language_level() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Base { Object get() { return null; } } \
                class Derived extends Base { String get() { return null; } }";
    let mut b = FileBuilder::new(&mut store, "Base.java", text);
    b.class("class Base", |b| {
        b.method("Object get()", |b| {
            b.return_(|b| b.lit("null"));
        });
    });
    b.class("class Derived extends Base", |b| {
        b.method("String get()", |b| {
            b.return_(|b| b.lit("null"));
        });
    });
    let file = b.finish();
    let config = HighlightingConfig::default();

    let modern = Program::new(&store).with_language_level(JavaLanguageLevel::Jdk1_5);
    assert_eq!(found(&modern, &file, &config), vec![]);

    let legacy = Program::new(&store).with_language_level(JavaLanguageLevel::Jdk1_4);
    let diagnostics = highlight_file(&legacy, &file, &config);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, codes::INCOMPATIBLE_RETURN_TYPE);
    assert_eq!(
        diagnostic.message,
        "'get()' in 'Derived' clashes with 'get()' in 'Base'; attempting to use incompatible return type"
    );
    assert_eq!(file.slice(diagnostic.range), "String");
    assert_eq!(
        diagnostic.fixes[0].action,
        QuickFix::SetLanguageLevel {
            level: JavaLanguageLevel::Jdk1_5
        }
    );
}

#[test]
fn every_repeated_method_is_a_duplicate() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { void f() {} void f() {} void f() {} }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.method("void f()", |_| ());
        b.method("void f()", |_| ());
        b.method("void f()", |_| ());
    });
    let file = b.finish();

    let duplicate = error(codes::DUPLICATE_METHOD, "'f()' is already defined in 'A'", "f");
    assert_eq!(highlight(&store, &file), vec![duplicate.clone(), duplicate]);
}

#[test]
fn raw_type_assigned_to_parameterized_is_unchecked() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List; class A { void f(List raw) { List<String> typed = raw; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.import("import java.util.List");
    b.class("class A", |b| {
        b.method("void f(List raw)", |b| {
            b.local("List<String> typed = raw", |b| b.name("raw"));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![(
            Severity::UncheckedWarning,
            codes::UNCHECKED_ASSIGNMENT,
            "Unchecked assignment: 'java.util.List' to 'java.util.List<java.lang.String>'".to_string(),
            "raw".to_string(),
        )]
    );

    let quiet = HighlightingConfig {
        report_unchecked: false,
        ..HighlightingConfig::default()
    };
    assert_eq!(found(&Program::new(&store), &file, &quiet), vec![]);
}

#[test]
fn annotation_without_required_attribute() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "@interface Foo { String value(); } @Foo class A {} @Foo(\"x\") class B {}";
    let mut b = FileBuilder::new(&mut store, "Foo.java", text);
    b.class("@interface Foo", |b| {
        b.method("String value()", |_| ());
    });
    b.annotation("@Foo", |_| ());
    b.class("class A", |_| ());
    b.annotation("@Foo(\"x\")", |b| b.lit("\"x\""));
    b.class("class B", |_| ());
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::MISSING_ANNOTATION_ATTRIBUTE);
    assert_eq!(diagnostics[0].message, "missing attribute 'value'");
    assert_eq!(file.slice(diagnostics[0].range), "@Foo");
    assert_eq!(
        diagnostics[0].fixes[0].action,
        QuickFix::AddMissingAttributes {
            names: vec!["value".to_string()]
        }
    );
}

#[test]
fn second_equal_case_label_is_a_duplicate() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { void f(int x) { switch (x) { case 1: break; case 1: break; } } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.method("void f(int x)", |b| {
            b.switch(|b| {
                b.name("x");
                b.case(|b| b.lit("1"));
                b.break_(None);
                b.case(|b| b.lit("1"));
                b.break_(None);
            });
        });
    });
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::DUPLICATE_SWITCH_LABEL);
    assert_eq!(diagnostics[0].message, "duplicate switch label");
    let second = text.rfind("case 1").unwrap() + "case ".len();
    assert_eq!(diagnostics[0].range.start(), TextSize::from(second as u32));
    assert_eq!(file.slice(diagnostics[0].range), "1");
}

#[test]
fn int_shift_labels_fold_with_masked_distance() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { void f(int x) { switch (x) { case 1 << 32: break; case 0: break; case 1: break; } } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.method("void f(int x)", |b| {
            b.switch(|b| {
                b.name("x");
                b.case(|b| {
                    b.binary("1 << 32", |b| {
                        b.lit("1");
                        b.lit("32");
                    })
                });
                b.break_(None);
                b.case(|b| b.lit("0"));
                b.break_(None);
                b.case(|b| b.lit("1"));
                b.break_(None);
            });
        });
    });
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::DUPLICATE_SWITCH_LABEL);
    let last = text.rfind("case 1").unwrap() + "case ".len();
    assert_eq!(diagnostics[0].range.start(), TextSize::from(last as u32));
}

#[test]
fn cycle_members_are_not_checked_for_assignability() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A extends B {} class B extends A {} class C { void f(A a) { Object o = a; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A extends B", |_| ());
    b.class("class B extends A", |_| ());
    b.class("class C", |b| {
        b.method("void f(A a)", |b| {
            b.local("Object o = a", |b| b.name("a"));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(codes::CYCLIC_INHERITANCE, "Cyclic inheritance involving 'A'", "B")]
    );
}

#[test]
fn generic_interface_inherited_with_different_arguments() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "interface I<T> {} interface J extends I<String> {} class C implements J, I<Integer> {}";
    let mut b = FileBuilder::new(&mut store, "C.java", text);
    b.class("interface I<T>", |_| ());
    b.class("interface J extends I<String>", |_| ());
    b.class("class C implements J, I<Integer>", |_| ());
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::INCONSISTENT_INHERITANCE,
            "'I' cannot be inherited with different type arguments: 'java.lang.String' and 'java.lang.Integer'",
            "C",
        )]
    );
}

#[test]
fn overriding_with_weaker_access() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Base { public void f() {} } class Sub extends Base { protected void f() {} }";
    let mut b = FileBuilder::new(&mut store, "Base.java", text);
    b.class("class Base", |b| {
        b.method("public void f()", |_| ());
    });
    b.class("class Sub extends Base", |b| {
        b.method("protected void f()", |_| ());
    });
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::WEAKER_ACCESS);
    assert_eq!(
        diagnostics[0].message,
        "'f()' in 'Sub' clashes with 'f()' in 'Base'; attempting to assign weaker access privileges ('protected'); was 'public'"
    );
    assert_eq!(file.slice(diagnostics[0].range), "protected");
    assert_eq!(
        diagnostics[0].fixes[0].action,
        QuickFix::AddModifier { modifier: "public" }
    );
}

#[test]
fn overriding_must_not_add_checked_exceptions() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.io.IOException; class Base { void f() {} } \
                class Sub extends Base { void f() throws IOException {} }";
    let mut b = FileBuilder::new(&mut store, "Base.java", text);
    b.import("import java.io.IOException");
    b.class("class Base", |b| {
        b.method("void f()", |_| ());
    });
    b.class("class Sub extends Base", |b| {
        b.method("void f() throws IOException", |_| ());
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::OVERRIDE_THROWS,
            "'f()' in 'Sub' clashes with 'f()' in 'Base'; overridden method does not throw 'java.io.IOException'",
            "IOException",
        )]
    );
}

#[test]
fn final_methods_cannot_be_overridden() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Base { final void f() {} } class Sub extends Base { void f() {} }";
    let mut b = FileBuilder::new(&mut store, "Base.java", text);
    b.class("class Base", |b| {
        b.method("final void f()", |_| ());
    });
    b.class("class Sub extends Base", |b| {
        b.method("void f()", |_| ());
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::FINAL_OVERRIDE,
            "'f()' cannot override 'f()' in 'Base'; overridden method is final",
            "f",
        )]
    );
}

#[test]
fn static_and_instance_methods_do_not_override_each_other() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Base { void f() {} static void g() {} } \
                class Sub extends Base { static void f() {} void g() {} }";
    let mut b = FileBuilder::new(&mut store, "Base.java", text);
    b.class("class Base", |b| {
        b.method("void f()", |_| ());
        b.method("static void g()", |_| ());
    });
    b.class("class Sub extends Base", |b| {
        b.method("static void f()", |_| ());
        b.method("void g()", |_| ());
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![
            error(
                codes::STATIC_OVERRIDE,
                "Static method 'f()' in 'Sub' cannot override instance method 'f()' in 'Base'",
                "f",
            ),
            error(
                codes::STATIC_OVERRIDE,
                "Instance method 'g()' in 'Sub' cannot override static method 'g()' in 'Base'",
                "g",
            ),
        ]
    );
}

#[test]
fn methods_with_the_same_erasure_clash() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List; class A { void f(List<String> a) {} void f(List<Integer> b) {} }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.import("import java.util.List");
    b.class("class A", |b| {
        b.method("void f(List<String> a)", |_| ());
        b.method("void f(List<Integer> b)", |_| ());
    });
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SAME_ERASURE);
    assert_eq!(
        diagnostics[0].message,
        "'f(List<Integer>)' clashes with 'f(List<String>)'; both methods have same erasure"
    );
    let second = text.rfind("f(").unwrap();
    assert_eq!(diagnostics[0].range.start(), TextSize::from(second as u32));
}

#[test]
fn inherited_method_with_the_same_erasure_clashes() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List; class Base { void f(List<String> a) {} } \
                class Sub extends Base { void f(List<Integer> b) {} }";
    let mut b = FileBuilder::new(&mut store, "Base.java", text);
    b.import("import java.util.List");
    b.class("class Base", |b| {
        b.method("void f(List<String> a)", |_| ());
    });
    b.class("class Sub extends Base", |b| {
        b.method("void f(List<Integer> b)", |_| ());
    });
    let file = b.finish();

    let clashes: Vec<_> = highlight(&store, &file)
        .into_iter()
        .filter(|(_, code, _, _)| *code == codes::SAME_ERASURE)
        .collect();
    assert_eq!(
        clashes,
        vec![error(
            codes::SAME_ERASURE,
            "'f(List<Integer>)' in 'Sub' clashes with 'f(List<String>)' in 'Base'; \
             both methods have same erasure, yet neither overrides the other",
            "f",
        )]
    );
}

#[test]
fn wildcards_outside_reference_parameters() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Box<T> {} interface I<T> {} class A implements I<?> { Object f() { return new Box<?>(); } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class Box<T>", |_| ());
    b.class("interface I<T>", |_| ());
    b.class("class A implements I<?>", |b| {
        b.method("Object f()", |b| {
            b.return_(|b| b.new_object("new Box<?>()", |_| ()));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![
            error(codes::NO_WILDCARD_EXPECTED, "No wildcard expected", "?"),
            error(
                codes::WILDCARD_INSTANTIATION,
                "Wildcard type '?' cannot be instantiated directly",
                "?",
            ),
        ]
    );
}

#[test]
fn cast_to_a_parameterized_type_is_unchecked() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List; class A { void f(Object o) { \
                List<String> s = (List<String>) o; List<?> w = (List<?>) o; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.import("import java.util.List");
    b.class("class A", |b| {
        b.method("void f(Object o)", |b| {
            b.local("List<String> s = (List<String>) o", |b| {
                b.cast("(List<String>) o", |b| b.name("o"))
            });
            b.local("List<?> w = (List<?>) o", |b| b.cast("(List<?>) o", |b| b.name("o")));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![(
            Severity::UncheckedWarning,
            codes::UNCHECKED_CAST,
            "Unchecked cast: 'java.lang.Object' to 'java.util.List<java.lang.String>'".to_string(),
            "(List<String>) o".to_string(),
        )]
    );
}

#[test]
fn same_parameterization_assigns_cleanly() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List; class A { void f(List<String> a) { List<String> b = a; b = a; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.import("import java.util.List");
    b.class("class A", |b| {
        b.method("void f(List<String> a)", |b| {
            b.local("List<String> b = a", |b| b.name("a"));
            b.expr_stmt(|b| {
                b.assign("b = a", |b| {
                    b.name("b");
                    b.name("a");
                })
            });
        });
    });
    let file = b.finish();

    assert_eq!(highlight(&store, &file), vec![]);
}
