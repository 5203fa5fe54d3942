use nova_types::{
    format_type, instantiate_as_supertype, is_assignable, is_subtype, supertype_substitutor,
    ClassDef, ClassKind, Type, TypeEnv, TypeStore,
};
use pretty_assertions::assert_eq;

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = TypeStore::with_minimal_jdk();

    let object = Type::class(env.well_known().object, vec![]);

    let list = env
        .class_id("java.util.List")
        .expect("List must exist in minimal JDK");
    let string = env.well_known().string;
    let list_string = Type::class(list, vec![Type::class(string, vec![])]);
    assert!(is_subtype(&env, &list_string, &object));

    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    assert!(is_subtype(&env, &cloneable, &object));
}

#[test]
fn intersection_subtyping_is_order_independent() {
    let env = TypeStore::with_minimal_jdk();

    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    let serializable = Type::class(env.well_known().serializable, vec![]);

    let ab = Type::Intersection(vec![cloneable.clone(), serializable.clone()]);
    let ba = Type::Intersection(vec![serializable.clone(), cloneable.clone()]);

    assert!(is_subtype(&env, &ab, &ba));
    assert!(is_subtype(&env, &ba, &ab));
    assert!(is_subtype(&env, &ab, &cloneable));
    assert!(!is_subtype(&env, &cloneable, &ab));
}

#[test]
fn simple_java_lang_names_resolve() {
    let env = TypeStore::with_minimal_jdk();
    assert_eq!(env.lookup_class("Object"), Some(env.well_known().object));
    assert_eq!(env.lookup_class("String"), Some(env.well_known().string));
    assert!(env.lookup_class("java.lang.annotation.ElementType").is_some());
    assert!(env.lookup_class("Nope").is_none());
}

#[test]
fn enum_constants_and_target_annotation_are_modelled() {
    let env = TypeStore::with_minimal_jdk();
    let element_type = env.lookup_class("java.lang.annotation.ElementType").unwrap();
    let def = env.class(element_type).unwrap();
    assert_eq!(def.kind, ClassKind::Enum);
    assert!(def.field("METHOD").is_some_and(|f| f.is_enum_constant));

    let target = env.lookup_class("java.lang.annotation.Target").unwrap();
    let value = &env.class(target).unwrap().methods[0];
    assert_eq!(value.name, "value");
    assert_eq!(
        format_type(&env, &value.return_type),
        "java.lang.annotation.ElementType[]"
    );
}

#[test]
fn user_generic_class_inherits_through_substitution() {
    let mut env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let string = Type::class(env.well_known().string, vec![]);

    // class Names<T> implements List<T> {}
    let t = env.add_type_param("T", vec![]);
    let names = env.add_class(ClassDef {
        name: "Names".to_string(),
        kind: ClassKind::Class,
        type_params: vec![t],
        interfaces: vec![Type::class(list, vec![Type::TypeVar(t)])],
        ..ClassDef::default()
    });

    let names_string = Type::class(names, vec![string.clone()]);
    assert_eq!(
        instantiate_as_supertype(&env, &names_string, list),
        Some(Type::class(list, vec![string.clone()]))
    );
    assert!(is_assignable(
        &env,
        &Type::class(list, vec![string.clone()]),
        &names_string
    ));

    let subst = supertype_substitutor(&env, names, list).unwrap();
    let e = env.class(list).unwrap().type_params[0];
    assert_eq!(subst.get(e), Some(Some(&Type::TypeVar(t))));
}
