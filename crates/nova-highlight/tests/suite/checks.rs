use nova_config::HighlightingConfig;
use nova_core::JavaLanguageLevel;
use nova_highlight::{codes, highlight_file, Program, QuickFix, Severity};
use nova_hir::FileBuilder;
use nova_types::TypeStore;
use pretty_assertions::assert_eq;

use super::{error, found, highlight};

#[test]
fn single_type_import_clashing_with_a_file_class() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.util.List; class List {}";
    let mut b = FileBuilder::new(&mut store, "List.java", text);
    b.import("import java.util.List");
    b.class("class List", |_| ());
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::IMPORT_CONFLICT);
    assert_eq!(
        diagnostics[0].message,
        "'java.util.List' is already defined in this compilation unit"
    );
    assert_eq!(file.slice(diagnostics[0].range), "import java.util.List;");
    assert_eq!(diagnostics[0].fixes[0].action, QuickFix::RemoveImport);
}

#[test]
fn assigning_an_initialized_final_field() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { final int x = 1; void f() { x = 2; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.field("final int x = 1", |b| b.lit("1"));
        b.method("void f()", |b| {
            b.expr_stmt(|b| {
                b.assign("x = 2", |b| {
                    b.name("x");
                    b.lit("2");
                })
            });
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::FINAL_ASSIGNMENT,
            "Cannot assign a value to final variable 'x'",
            "x"
        )]
    );
}

#[test]
fn break_needs_an_enclosing_loop_or_switch() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { void f() { break; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.method("void f()", |b| {
            b.break_(None);
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(codes::BREAK_OUTSIDE, "Break outside switch or loop", "break;")]
    );
}

#[test]
fn checked_exceptions_must_be_caught_or_declared() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.io.IOException; class A { \
                void g() throws IOException {} \
                void f() { g(); } \
                void h() { try { g(); } catch (IOException e) {} } \
                void k() throws IOException { g(); } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.import("import java.io.IOException");
    b.class("class A", |b| {
        b.method("void g() throws IOException", |_| ());
        b.method("void f()", |b| {
            b.expr_stmt(|b| b.call("g()", |_| ()));
        });
        b.method("void h()", |b| {
            b.try_(|b| {
                b.block(|b| {
                    b.expr_stmt(|b| b.call("g()", |_| ()));
                });
                b.catch(|b| {
                    b.block(|_| ());
                });
            });
        });
        b.method("void k() throws IOException", |b| {
            b.expr_stmt(|b| b.call("g()", |_| ()));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::UNHANDLED_EXCEPTION,
            "Unhandled exception: java.io.IOException",
            "g()"
        )]
    );
}

#[test]
fn top_level_class_declared_in_two_files() {
    let mut store = TypeStore::with_minimal_jdk();
    let first_text = "package p; class A {}";
    let mut b = FileBuilder::new(&mut store, "p/A.java", first_text);
    b.package("package p");
    b.class("class A", |_| ());
    let first = b.finish();

    let second_text = "package p; class A {}";
    let mut b = FileBuilder::new(&mut store, "p/Copy.java", second_text);
    b.package("package p");
    b.class("class A", |_| ());
    let second = b.finish();

    let mut program = Program::new(&store);
    program.add_file(&first);
    program.add_file(&second);

    let config = HighlightingConfig::default();
    let duplicate = vec![error(codes::DUPLICATE_CLASS, "Duplicate class: 'p.A'", "A")];
    assert_eq!(found(&program, &second, &config), duplicate);
    assert_eq!(found(&program, &first, &config), duplicate);
}

#[test]
fn enums_need_language_level_five() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "enum E { A }";
    let mut b = FileBuilder::new(&mut store, "E.java", text);
    b.class("enum E", |b| {
        b.enum_constant("A", |_| ());
    });
    let file = b.finish();

    let legacy = Program::new(&store).with_language_level(JavaLanguageLevel::Jdk1_4);
    let gates: Vec<_> = found(&legacy, &file, &HighlightingConfig::default())
        .into_iter()
        .filter(|(_, code, _, _)| *code == codes::LANGUAGE_LEVEL)
        .collect();
    assert_eq!(
        gates,
        vec![error(
            codes::LANGUAGE_LEVEL,
            "Enums are not supported at this language level",
            "E"
        )]
    );

    let modern = Program::new(&store).with_language_level(JavaLanguageLevel::Jdk1_5);
    assert!(found(&modern, &file, &HighlightingConfig::default())
        .iter()
        .all(|(_, code, _, _)| *code != codes::LANGUAGE_LEVEL));
}

#[test]
fn references_to_a_reassigned_parameter_are_marked() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { int f(int p) { p = p + 1; return p; } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.method("int f(int p)", |b| {
            b.expr_stmt(|b| {
                b.assign("p = p + 1", |b| {
                    b.name("p");
                    b.binary("p + 1", |b| {
                        b.name("p");
                        b.lit("1");
                    });
                })
            });
            b.return_(|b| b.name("p"));
        });
    });
    let file = b.finish();

    let marker = (
        Severity::Info,
        codes::REASSIGNED_PARAMETER,
        "Reassigned parameter 'p'".to_string(),
        "p".to_string(),
    );
    assert_eq!(highlight(&store, &file), vec![marker.clone(), marker.clone(), marker]);

    let quiet = HighlightingConfig {
        report_reassigned_parameters: false,
        ..HighlightingConfig::default()
    };
    assert_eq!(found(&Program::new(&store), &file, &quiet), vec![]);
}

fn guarded_final(text: &str, both_branches: bool) -> (TypeStore, nova_hir::JavaFile) {
    let mut store = TypeStore::with_minimal_jdk();
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.field("final int k", |_| ());
        b.method("A(int a)", |b| {
            b.if_(|b| {
                b.binary("a > 0", |b| {
                    b.name("a");
                    b.lit("0");
                });
                b.block(|b| {
                    b.expr_stmt(|b| {
                        b.assign("k = 1", |b| {
                            b.name("k");
                            b.lit("1");
                        })
                    });
                });
                if both_branches {
                    b.block(|b| {
                        b.expr_stmt(|b| {
                            b.assign("k = 2", |b| {
                                b.name("k");
                                b.lit("2");
                            })
                        });
                    });
                }
            });
        });
        b.method("A()", |b| {
            b.expr_stmt(|b| b.call("this(1)", |b| b.lit("1")));
        });
    });
    let file = b.finish();
    (store, file)
}

#[test]
fn blank_final_assigned_on_one_branch_is_not_initialized() {
    let (store, file) = guarded_final(
        "class A { final int k; A(int a) { if (a > 0) { k = 1; } } A() { this(1); } }",
        false,
    );
    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::FINAL_NOT_INITIALIZED,
            "Variable 'k' might not have been initialized",
            "k"
        )]
    );

    let (store, file) = guarded_final(
        "class A { final int k; A(int a) { if (a > 0) { k = 1; } else { k = 2; } } A() { this(1); } }",
        true,
    );
    assert_eq!(highlight(&store, &file), vec![]);
}

#[test]
fn constructor_argument_mismatch_carries_a_table() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class P { P(int x) {} } class A { void f() { new P(true); } }";
    let mut b = FileBuilder::new(&mut store, "P.java", text);
    b.class("class P", |b| {
        b.method("P(int x)", |_| ());
    });
    b.class("class A", |b| {
        b.method("void f()", |b| {
            b.expr_stmt(|b| b.new_object("new P(true)", |b| b.lit("true")));
        });
    });
    let file = b.finish();

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::ARGUMENT_MISMATCH);
    assert_eq!(diagnostics[0].message, "'P(int)' in 'P' cannot be applied to '(boolean)'");
    assert_eq!(file.slice(diagnostics[0].range), "(true)");
    assert_eq!(
        diagnostics[0].tooltip.as_deref(),
        Some(
            "<html><body>P(int) in P cannot be applied to:<table>\
             <tr><td>Expected<br>Parameters:</td><td>Actual<br>Arguments:</td></tr>\
             <tr><td>int</td><td><font color='red'>boolean</font></td></tr>\
             </table></body></html>"
        )
    );
}

#[test]
fn private_constructor_is_inaccessible_only_when_applicable() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class P { private P(int x) {} } class A { void f() { new P(1); new P(\"s\"); } }";
    let mut b = FileBuilder::new(&mut store, "P.java", text);
    b.class("class P", |b| {
        b.method("private P(int x)", |_| ());
    });
    b.class("class A", |b| {
        b.method("void f()", |b| {
            b.expr_stmt(|b| b.new_object("new P(1)", |b| b.lit("1")));
            b.expr_stmt(|b| b.new_object("new P(\"s\")", |b| b.lit("\"s\"")));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![
            error(codes::INACCESSIBLE, "'P(int)' has private access in 'P'", "(1)"),
            error(
                codes::ARGUMENT_MISMATCH,
                "'P(int)' in 'P' cannot be applied to '(java.lang.String)'",
                "(\"s\")",
            ),
        ]
    );
}

#[test]
fn superclass_without_a_no_argument_constructor() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class P { P(int x) {} } class Q extends P {} class R extends P { R() {} } \
                class V { V(int... xs) {} } class W extends V {}";
    let mut b = FileBuilder::new(&mut store, "P.java", text);
    b.class("class P", |b| {
        b.method("P(int x)", |_| ());
    });
    b.class("class Q extends P", |_| ());
    b.class("class R extends P", |b| {
        b.method("R()", |_| ());
    });
    b.class("class V", |b| {
        b.method("V(int... xs)", |_| ());
    });
    b.class("class W extends V", |_| ());
    let file = b.finish();

    let message = "There is no default constructor available in 'P'";
    assert_eq!(
        highlight(&store, &file),
        vec![
            error(codes::NO_DEFAULT_CONSTRUCTOR, message, "Q"),
            error(codes::NO_DEFAULT_CONSTRUCTOR, message, "R"),
        ]
    );

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    assert_eq!(diagnostics[0].fixes[0].action, QuickFix::AddDefaultConstructor);
    assert!(diagnostics[1].fixes.is_empty());
}

#[test]
fn inner_class_needs_an_enclosing_instance() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class Outer { class Inner {} static void f() { new Inner(); } } \
                class B { void g() { Object o = Outer.this; } }";
    let mut b = FileBuilder::new(&mut store, "Outer.java", text);
    b.class("class Outer", |b| {
        b.class("class Inner", |_| ());
        b.method("static void f()", |b| {
            b.expr_stmt(|b| b.new_object("new Inner()", |_| ()));
        });
    });
    b.class("class B", |b| {
        b.method("void g()", |b| {
            b.local("Object o = Outer.this", |b| b.this_qualified("Outer.this"));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![
            error(
                codes::NO_ENCLOSING_INSTANCE,
                "No enclosing instance of type 'Outer' is in scope",
                "Inner",
            ),
            error(codes::NOT_ENCLOSING_CLASS, "'Outer' is not an enclosing class", "Outer"),
        ]
    );
}

#[test]
fn fields_cannot_be_read_before_the_super_call() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class P { P(int x) {} } class A extends P { int k; A() { super(k); } }";
    let mut b = FileBuilder::new(&mut store, "P.java", text);
    b.class("class P", |b| {
        b.method("P(int x)", |_| ());
    });
    b.class("class A extends P", |b| {
        b.field("int k", |_| ());
        b.method("A()", |b| {
            b.expr_stmt(|b| b.call("super(k)", |b| b.name("k")));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::REFERENCE_BEFORE_SUPER,
            "Cannot reference 'k' before supertype constructor has been called",
            "k",
        )]
    );
}

#[test]
fn enums_cannot_be_instantiated() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "enum E { X } class A { Object f() { return new E(); } }";
    let mut b = FileBuilder::new(&mut store, "E.java", text);
    b.class("enum E", |b| {
        b.enum_constant("X", |_| ());
    });
    b.class("class A", |b| {
        b.method("Object f()", |b| {
            b.return_(|b| b.new_object("new E()", |_| ()));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(codes::ENUM_INSTANTIATION, "Enum types may not be instantiated", "E")]
    );
}

#[test]
fn enum_constructor_reads_only_constant_statics() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "enum E { X; static int count; static final int LIMIT = 3; \
                E() { int a = count; int b = LIMIT; } }";
    let mut b = FileBuilder::new(&mut store, "E.java", text);
    b.class("enum E", |b| {
        b.enum_constant("X", |_| ());
        b.field("static int count", |_| ());
        b.field("static final int LIMIT = 3", |b| b.lit("3"));
        b.method("E()", |b| {
            b.local("int a = count", |b| b.name("count"));
            b.local("int b = LIMIT", |b| b.name("LIMIT"));
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![error(
            codes::ILLEGAL_ENUM_STATIC_ACCESS,
            "It is illegal to access static member 'count' from enum constructor or instance initializer",
            "count",
        )]
    );
}

#[test]
fn enum_switch_labels_are_bare_constants() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "enum E { X, Y } class A { void f(E e) { \
                switch (e) { case X: break; case X: break; case E.Y: break; } } }";
    let mut b = FileBuilder::new(&mut store, "E.java", text);
    b.class("enum E", |b| {
        b.enum_constant("X", |_| ());
        b.enum_constant("Y", |_| ());
    });
    b.class("class A", |b| {
        b.method("void f(E e)", |b| {
            b.switch(|b| {
                b.name("e");
                b.case(|b| b.name("X"));
                b.break_(None);
                b.case(|b| b.name("X"));
                b.break_(None);
                b.case(|b| b.field_access("E.Y", |b| b.name("E")));
                b.break_(None);
            });
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![
            error(codes::DUPLICATE_SWITCH_LABEL, "duplicate switch label", "X"),
            error(
                codes::ENUM_CASE_LABEL,
                "An enum switch case label must be the unqualified name of an enumeration constant",
                "E.Y",
            ),
        ]
    );
}

#[test]
fn annotation_targets_and_repetition() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "import java.lang.annotation.ElementType; import java.lang.annotation.Target; \
                @Target({ElementType.METHOD, ElementType.METHOD}) @interface Marker {} \
                @Marker @Marker class A {}";
    let mut b = FileBuilder::new(&mut store, "Marker.java", text);
    b.import("import java.lang.annotation.ElementType");
    b.import("import java.lang.annotation.Target");
    b.annotation("@Target({ElementType.METHOD, ElementType.METHOD})", |b| {
        b.array_value("{ElementType.METHOD, ElementType.METHOD}", |b| {
            b.field_access("ElementType.METHOD", |b| b.name("ElementType"));
            b.field_access("ElementType.METHOD", |b| b.name("ElementType"));
        })
    });
    b.class("@interface Marker", |_| ());
    b.annotation("@Marker", |_| ());
    b.annotation("@Marker", |_| ());
    b.class("class A", |_| ());
    let file = b.finish();

    let not_applicable = error(
        codes::ANNOTATION_NOT_APPLICABLE,
        "'@Marker' not applicable to type",
        "@Marker",
    );
    assert_eq!(
        highlight(&store, &file),
        vec![
            error(
                codes::REPEATED_ANNOTATION_TARGET,
                "Repeated annotation target",
                "ElementType.METHOD",
            ),
            not_applicable.clone(),
            not_applicable,
            error(codes::DUPLICATE_ANNOTATION, "Duplicate annotation", "@Marker"),
        ]
    );

    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());
    let second_target = text.rfind("ElementType.METHOD").unwrap();
    assert_eq!(usize::from(diagnostics[0].range.start()), second_target);
    assert_eq!(
        diagnostics[1].fixes[0].action,
        QuickFix::RemoveAnnotation {
            name: "Marker".to_string()
        }
    );
}

#[test]
fn misplaced_continue_and_bad_labels() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { void f() { continue; x: { continue x; } \
                y: while (true) { y: break y; } break z; w: } }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    b.class("class A", |b| {
        b.method("void f()", |b| {
            b.continue_(None);
            b.labeled("x", |b| {
                b.block(|b| {
                    b.continue_(Some("x"));
                })
            });
            b.labeled("y", |b| {
                b.while_(|b| {
                    b.lit("true");
                    b.block(|b| {
                        b.labeled("y", |b| b.break_(Some("y")));
                    });
                })
            });
            b.break_(Some("z"));
            b.labeled("w", |_| ());
        });
    });
    let file = b.finish();

    assert_eq!(
        highlight(&store, &file),
        vec![
            error(codes::CONTINUE_OUTSIDE, "Continue outside of loop", "continue;"),
            error(codes::NOT_A_LOOP_LABEL, "Not a loop label: 'x'", "x"),
            error(codes::DUPLICATE_LABEL, "Label 'y' already in use", "y"),
            error(codes::UNDEFINED_LABEL, "Undefined label: 'z'", "z"),
            error(codes::LABEL_WITHOUT_STATEMENT, "Label without statement", "w"),
        ]
    );
}
