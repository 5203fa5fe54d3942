use nova_hir::{ClassContainer, FileBuilder, MethodSlot};
use nova_types::{ClassKind, PrimitiveType, Type, TypeEnv, TypeStore, Visibility};
use pretty_assertions::assert_eq;

#[test]
fn enum_definitions_get_implicit_members() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "enum Color { RED, GREEN; }";
    let mut b = FileBuilder::new(&mut store, "Color.java", text);
    let color = b.class("enum Color", |b| {
        b.enum_constant("RED", |_| ());
        b.enum_constant("GREEN", |_| ());
    });
    let file = b.finish();

    let def = store.class(file.classes[color].def).unwrap();
    assert_eq!(def.kind, ClassKind::Enum);
    assert!(def.is_final);
    let constants: Vec<&str> = def
        .fields
        .iter()
        .filter(|f| f.is_enum_constant)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(constants, vec!["RED", "GREEN"]);
    let methods: Vec<&str> = def.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["values", "valueOf"]);
    assert_eq!(def.constructors.len(), 1);
    assert_eq!(def.constructors[0].visibility, Visibility::Private);

    let enum_ = store.well_known().enum_;
    let self_type = Type::class(file.classes[color].def, vec![]);
    assert_eq!(def.super_class, Some(Type::class(enum_, vec![self_type])));
}

#[test]
fn interface_members_are_implicitly_public() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "interface Shape { int SIDES = 0; double area(); }";
    let mut b = FileBuilder::new(&mut store, "Shape.java", text);
    let shape = b.class("interface Shape", |b| {
        b.field("int SIDES = 0", |b| b.lit("0"));
        b.method("double area()", |_| ());
    });
    let file = b.finish();

    let def = store.class(file.classes[shape].def).unwrap();
    assert!(def.is_abstract);
    let field = &def.fields[0];
    assert!(field.is_static && field.is_final);
    assert_eq!(field.visibility, Visibility::Public);
    let method = &def.methods[0];
    assert!(method.is_abstract);
    assert_eq!(method.visibility, Visibility::Public);
    assert_eq!(method.return_type, Type::Primitive(PrimitiveType::Double));
    assert!(def.constructors.is_empty());
}

#[test]
fn member_and_local_classes_get_binary_names() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "package p;\nclass Outer {\n  static class Inner {}\n  void f() { class Local {} }\n}\n";
    let mut b = FileBuilder::new(&mut store, "Outer.java", text);
    b.package("package p");
    let mut inner = None;
    let mut local = None;
    b.class("class Outer", |b| {
        inner = Some(b.class("static class Inner", |_| ()));
        b.method("void f()", |b| {
            local = Some(b.class("class Local", |_| ()));
        });
    });
    let file = b.finish();

    let inner = &file.classes[inner.unwrap()];
    assert_eq!(inner.container, ClassContainer::Member);
    assert_eq!(store.class(inner.def).unwrap().name, "p.Outer$Inner");
    assert!(store.class(inner.def).unwrap().is_static);

    let local = &file.classes[local.unwrap()];
    assert_eq!(local.container, ClassContainer::Local);
    assert_eq!(store.class(local.def).unwrap().name, "p.Outer$1Local");
    assert!(local.enclosing_method.is_some());
}

#[test]
fn constructors_and_varargs_are_recorded() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { public A(String... names) {} void g() {} }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut ctor = None;
    let a = b.class("class A", |b| {
        ctor = Some(b.method("public A(String... names)", |_| ()));
        b.method("void g()", |_| ());
    });
    let file = b.finish();

    assert_eq!(file.methods[ctor.unwrap()].slot, MethodSlot::Constructor(0));
    let def = store.class(file.classes[a].def).unwrap();
    assert_eq!(def.constructors.len(), 1);
    let ctor = &def.constructors[0];
    assert!(ctor.is_varargs);
    assert_eq!(ctor.visibility, Visibility::Public);
    let string = store.well_known().string;
    assert_eq!(ctor.params, vec![Type::array(Type::class(string, vec![]))]);
    assert_eq!(def.methods[0].name, "g");
}

#[test]
fn anonymous_classes_extend_their_base() {
    let mut store = TypeStore::with_minimal_jdk();
    let text = "class A { Object o = new Object() { }; }";
    let mut b = FileBuilder::new(&mut store, "A.java", text);
    let mut body = None;
    b.class("class A", |b| {
        b.field("Object o = new Object() { }", |b| {
            b.new_object("new Object() { }", |b| {
                body = Some(b.class_body(|_| ()));
            });
        });
    });
    let file = b.finish();

    let anonymous = &file.classes[body.unwrap()];
    assert_eq!(anonymous.container, ClassContainer::Anonymous);
    let def = store.class(anonymous.def).unwrap();
    assert_eq!(def.name, "A$1");
    let object = store.well_known().object;
    assert_eq!(def.super_class, Some(Type::class(object, vec![])));
}
