//! The slice of the platform library the checks need to resolve against.

use crate::{
    ClassDef, ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, PrimitiveType, Type,
    TypeStore, TypeVarId, Visibility, WellKnownTypes,
};

const ELEMENT_TYPES: [&str; 10] = [
    "TYPE",
    "FIELD",
    "METHOD",
    "PARAMETER",
    "CONSTRUCTOR",
    "LOCAL_VARIABLE",
    "ANNOTATION_TYPE",
    "PACKAGE",
    "TYPE_PARAMETER",
    "TYPE_USE",
];

fn class(ty: ClassId) -> Type {
    Type::class(ty, vec![])
}

fn method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        params,
        return_type,
        visibility: Visibility::Public,
        ..MethodDef::default()
    }
}

fn abstract_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        is_abstract: true,
        ..method(name, params, return_type)
    }
}

fn public_ctor(params: Vec<Type>) -> ConstructorDef {
    ConstructorDef {
        params,
        visibility: Visibility::Public,
        ..ConstructorDef::default()
    }
}

fn public_class(name: &str, kind: ClassKind) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        kind,
        visibility: Visibility::Public,
        is_abstract: kind.is_interface(),
        ..ClassDef::default()
    }
}

pub(crate) fn populate(store: &mut TypeStore) -> WellKnownTypes {
    let object = store.intern_class_id("java.lang.Object");
    let string = store.intern_class_id("java.lang.String");
    let class_id = store.intern_class_id("java.lang.Class");
    let cloneable = store.intern_class_id("java.lang.Cloneable");
    let serializable = store.intern_class_id("java.io.Serializable");
    let comparable = store.intern_class_id("java.lang.Comparable");
    let char_sequence = store.intern_class_id("java.lang.CharSequence");
    let enum_ = store.intern_class_id("java.lang.Enum");
    let throwable = store.intern_class_id("java.lang.Throwable");
    let exception = store.intern_class_id("java.lang.Exception");
    let runtime_exception = store.intern_class_id("java.lang.RuntimeException");
    let error = store.intern_class_id("java.lang.Error");
    let iterable = store.intern_class_id("java.lang.Iterable");
    let iterator = store.intern_class_id("java.util.Iterator");
    let annotation = store.intern_class_id("java.lang.annotation.Annotation");
    let number = store.intern_class_id("java.lang.Number");

    let int = Type::Primitive(PrimitiveType::Int);
    let boolean = Type::Primitive(PrimitiveType::Boolean);

    store.define_class(
        object,
        ClassDef {
            constructors: vec![public_ctor(vec![])],
            methods: vec![
                method("equals", vec![class(object)], boolean.clone()),
                method("hashCode", vec![], int.clone()),
                method("toString", vec![], class(string)),
                MethodDef {
                    visibility: Visibility::Protected,
                    throws: vec![Type::Named("java.lang.CloneNotSupportedException".into())],
                    ..method("clone", vec![], class(object))
                },
                MethodDef {
                    is_final: true,
                    ..method("getClass", vec![], class(class_id))
                },
            ],
            ..public_class("java.lang.Object", ClassKind::Class)
        },
    );

    store.define_class(cloneable, public_class("java.lang.Cloneable", ClassKind::Interface));
    store.define_class(serializable, public_class("java.io.Serializable", ClassKind::Interface));

    let t = store.add_type_param("T", vec![]);
    store.define_class(
        comparable,
        ClassDef {
            type_params: vec![t],
            methods: vec![abstract_method("compareTo", vec![Type::TypeVar(t)], int.clone())],
            ..public_class("java.lang.Comparable", ClassKind::Interface)
        },
    );

    store.define_class(
        char_sequence,
        ClassDef {
            methods: vec![abstract_method("length", vec![], int.clone())],
            ..public_class("java.lang.CharSequence", ClassKind::Interface)
        },
    );

    store.define_class(
        string,
        ClassDef {
            is_final: true,
            interfaces: vec![
                class(serializable),
                Type::class(comparable, vec![class(string)]),
                class(char_sequence),
            ],
            constructors: vec![public_ctor(vec![]), public_ctor(vec![class(string)])],
            methods: vec![
                method("length", vec![], int.clone()),
                method("isEmpty", vec![], boolean.clone()),
                method("charAt", vec![int.clone()], Type::Primitive(PrimitiveType::Char)),
                method("substring", vec![int.clone()], class(string)),
                method("equals", vec![class(object)], boolean.clone()),
                MethodDef {
                    is_static: true,
                    ..method("valueOf", vec![class(object)], class(string))
                },
            ],
            ..public_class("java.lang.String", ClassKind::Class)
        },
    );

    let t = store.add_type_param("T", vec![]);
    store.define_class(
        class_id,
        ClassDef {
            is_final: true,
            type_params: vec![t],
            interfaces: vec![class(serializable)],
            methods: vec![method("getName", vec![], class(string))],
            ..public_class("java.lang.Class", ClassKind::Class)
        },
    );

    store.define_class(
        number,
        ClassDef {
            is_abstract: true,
            interfaces: vec![class(serializable)],
            constructors: vec![public_ctor(vec![])],
            methods: vec![abstract_method("intValue", vec![], int.clone())],
            ..public_class("java.lang.Number", ClassKind::Class)
        },
    );

    for primitive in PrimitiveType::ALL {
        let name = primitive.boxed_class_name();
        let id = store.intern_class_id(name);
        let super_class = primitive.is_numeric() && primitive != PrimitiveType::Char;
        store.define_class(
            id,
            ClassDef {
                is_final: true,
                super_class: super_class.then(|| class(number)),
                interfaces: vec![class(serializable), Type::class(comparable, vec![class(id)])],
                constructors: vec![public_ctor(vec![Type::Primitive(primitive)])],
                methods: vec![MethodDef {
                    is_static: true,
                    ..method("valueOf", vec![Type::Primitive(primitive)], class(id))
                }],
                ..public_class(name, ClassKind::Class)
            },
        );
    }

    let e = store.add_type_param("E", vec![]);
    if let Some(tp) = store.type_param_mut(e) {
        tp.upper_bounds = vec![Type::class(enum_, vec![Type::TypeVar(e)])];
    }
    store.define_class(
        enum_,
        ClassDef {
            is_abstract: true,
            type_params: vec![e],
            interfaces: vec![
                Type::class(comparable, vec![Type::TypeVar(e)]),
                class(serializable),
            ],
            constructors: vec![ConstructorDef {
                params: vec![class(string), int.clone()],
                visibility: Visibility::Protected,
                ..ConstructorDef::default()
            }],
            methods: vec![
                MethodDef {
                    is_final: true,
                    ..method("name", vec![], class(string))
                },
                MethodDef {
                    is_final: true,
                    ..method("ordinal", vec![], int.clone())
                },
                MethodDef {
                    is_final: true,
                    ..method("compareTo", vec![Type::TypeVar(e)], int.clone())
                },
            ],
            ..public_class("java.lang.Enum", ClassKind::Class)
        },
    );

    store.define_class(
        throwable,
        ClassDef {
            interfaces: vec![class(serializable)],
            constructors: vec![public_ctor(vec![]), public_ctor(vec![class(string)])],
            methods: vec![method("getMessage", vec![], class(string))],
            ..public_class("java.lang.Throwable", ClassKind::Class)
        },
    );
    let throwable_subclass = |name: &str, parent: ClassId| ClassDef {
        super_class: Some(class(parent)),
        constructors: vec![public_ctor(vec![]), public_ctor(vec![class(string)])],
        ..public_class(name, ClassKind::Class)
    };
    store.define_class(exception, throwable_subclass("java.lang.Exception", throwable));
    store.define_class(
        runtime_exception,
        throwable_subclass("java.lang.RuntimeException", exception),
    );
    store.define_class(error, throwable_subclass("java.lang.Error", throwable));
    for (name, parent) in [
        ("java.lang.IllegalArgumentException", runtime_exception),
        ("java.lang.IllegalStateException", runtime_exception),
        ("java.lang.CloneNotSupportedException", exception),
        ("java.lang.InterruptedException", exception),
        ("java.io.IOException", exception),
    ] {
        store.add_class(throwable_subclass(name, parent));
    }

    let t = store.add_type_param("T", vec![]);
    store.define_class(
        iterator,
        ClassDef {
            type_params: vec![t],
            methods: vec![
                abstract_method("hasNext", vec![], boolean.clone()),
                abstract_method("next", vec![], Type::TypeVar(t)),
            ],
            ..public_class("java.util.Iterator", ClassKind::Interface)
        },
    );
    let t = store.add_type_param("T", vec![]);
    store.define_class(
        iterable,
        ClassDef {
            type_params: vec![t],
            methods: vec![abstract_method(
                "iterator",
                vec![],
                Type::class(iterator, vec![Type::TypeVar(t)]),
            )],
            ..public_class("java.lang.Iterable", ClassKind::Interface)
        },
    );

    let collection = define_generic_interface(
        store,
        "java.util.Collection",
        &["E"],
        |params| {
            let e = Type::TypeVar(params[0]);
            (
                vec![Type::class(iterable, vec![e.clone()])],
                vec![
                    abstract_method("add", vec![e], Type::Primitive(PrimitiveType::Boolean)),
                    abstract_method("size", vec![], Type::Primitive(PrimitiveType::Int)),
                    abstract_method("isEmpty", vec![], Type::Primitive(PrimitiveType::Boolean)),
                ],
            )
        },
    );
    let list = define_generic_interface(store, "java.util.List", &["E"], |params| {
        let e = Type::TypeVar(params[0]);
        (
            vec![Type::class(collection, vec![e.clone()])],
            vec![abstract_method("get", vec![Type::Primitive(PrimitiveType::Int)], e)],
        )
    });
    let map = define_generic_interface(store, "java.util.Map", &["K", "V"], |params| {
        let k = Type::TypeVar(params[0]);
        let v = Type::TypeVar(params[1]);
        (
            vec![],
            vec![
                abstract_method("get", vec![Type::class(object, vec![])], v.clone()),
                abstract_method("put", vec![k, v.clone()], v),
            ],
        )
    });

    let e = store.add_type_param("E", vec![]);
    store.add_class(ClassDef {
        type_params: vec![e],
        interfaces: vec![
            Type::class(list, vec![Type::TypeVar(e)]),
            class(cloneable),
            class(serializable),
        ],
        constructors: vec![public_ctor(vec![]), public_ctor(vec![int.clone()])],
        methods: vec![
            method("add", vec![Type::TypeVar(e)], boolean.clone()),
            method("get", vec![int.clone()], Type::TypeVar(e)),
            method("size", vec![], int.clone()),
            method("isEmpty", vec![], boolean.clone()),
            method("iterator", vec![], Type::class(iterator, vec![Type::TypeVar(e)])),
        ],
        ..public_class("java.util.ArrayList", ClassKind::Class)
    });
    let k = store.add_type_param("K", vec![]);
    let v = store.add_type_param("V", vec![]);
    store.add_class(ClassDef {
        type_params: vec![k, v],
        interfaces: vec![
            Type::class(map, vec![Type::TypeVar(k), Type::TypeVar(v)]),
            class(cloneable),
            class(serializable),
        ],
        constructors: vec![public_ctor(vec![])],
        methods: vec![
            method("get", vec![class(object)], Type::TypeVar(v)),
            method("put", vec![Type::TypeVar(k), Type::TypeVar(v)], Type::TypeVar(v)),
        ],
        ..public_class("java.util.HashMap", ClassKind::Class)
    });

    store.define_class(
        annotation,
        public_class("java.lang.annotation.Annotation", ClassKind::Interface),
    );
    let element_type = store.intern_class_id("java.lang.annotation.ElementType");
    store.define_class(
        element_type,
        ClassDef {
            is_final: true,
            super_class: Some(Type::class(enum_, vec![class(element_type)])),
            fields: ELEMENT_TYPES
                .iter()
                .map(|name| FieldDef {
                    name: (*name).to_string(),
                    ty: class(element_type),
                    is_static: true,
                    is_final: true,
                    visibility: Visibility::Public,
                    is_enum_constant: true,
                })
                .collect(),
            ..public_class("java.lang.annotation.ElementType", ClassKind::Enum)
        },
    );
    let annotation_type = |name: &str, methods: Vec<MethodDef>| ClassDef {
        interfaces: vec![class(annotation)],
        methods,
        ..public_class(name, ClassKind::Annotation)
    };
    store.add_class(annotation_type(
        "java.lang.annotation.Target",
        vec![abstract_method("value", vec![], Type::array(class(element_type)))],
    ));
    store.add_class(annotation_type("java.lang.Override", vec![]));
    store.add_class(annotation_type("java.lang.Deprecated", vec![]));
    store.add_class(annotation_type(
        "java.lang.SuppressWarnings",
        vec![abstract_method("value", vec![], Type::array(class(string)))],
    ));

    WellKnownTypes {
        object,
        string,
        class: class_id,
        cloneable,
        serializable,
        enum_,
        throwable,
        exception,
        runtime_exception,
        error,
        iterable,
        annotation,
    }
}

type Members = (Vec<Type>, Vec<MethodDef>);

fn define_generic_interface(
    store: &mut TypeStore,
    name: &str,
    params: &[&str],
    members: impl FnOnce(&[TypeVarId]) -> Members,
) -> ClassId {
    let params: Vec<TypeVarId> = params
        .iter()
        .map(|param| store.add_type_param(*param, vec![]))
        .collect();
    let (interfaces, methods) = members(&params);
    store.add_class(ClassDef {
        type_params: params,
        interfaces,
        methods,
        ..public_class(name, ClassKind::Interface)
    })
}
