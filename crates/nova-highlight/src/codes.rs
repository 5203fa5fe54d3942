//! Stable diagnostic codes.
//!
//! Codes identify a diagnostic family independently of its message text; hosts use them for
//! suppression (`highlighting.suppressed_codes`) and tests assert on them.

// Language level gates.
pub const LANGUAGE_LEVEL: &str = "LANGUAGE_LEVEL";

// Names and references.
pub const CANNOT_RESOLVE_SYMBOL: &str = "CANNOT_RESOLVE_SYMBOL";
pub const INACCESSIBLE: &str = "INACCESSIBLE";
pub const STATIC_CONTEXT: &str = "STATIC_CONTEXT";
pub const REFERENCE_BEFORE_SUPER: &str = "REFERENCE_BEFORE_SUPER";
pub const NO_ENCLOSING_INSTANCE: &str = "NO_ENCLOSING_INSTANCE";
pub const NOT_ENCLOSING_CLASS: &str = "NOT_ENCLOSING_CLASS";
pub const ILLEGAL_ENUM_STATIC_ACCESS: &str = "ILLEGAL_ENUM_STATIC_ACCESS";

// Imports.
pub const IMPORT_CONFLICT: &str = "IMPORT_CONFLICT";

// Modifiers.
pub const REPEATED_MODIFIER: &str = "REPEATED_MODIFIER";
pub const MODIFIER_NOT_ALLOWED: &str = "MODIFIER_NOT_ALLOWED";
pub const ILLEGAL_MODIFIER_COMBINATION: &str = "ILLEGAL_MODIFIER_COMBINATION";

// Classes.
pub const PUBLIC_CLASS_FILE_NAME: &str = "PUBLIC_CLASS_FILE_NAME";
pub const DUPLICATE_CLASS: &str = "DUPLICATE_CLASS";
pub const CYCLIC_INHERITANCE: &str = "CYCLIC_INHERITANCE";
pub const INTERFACE_EXPECTED: &str = "INTERFACE_EXPECTED";
pub const NO_INTERFACE_EXPECTED: &str = "NO_INTERFACE_EXPECTED";
pub const INHERIT_FROM_FINAL: &str = "INHERIT_FROM_FINAL";
pub const INHERIT_FROM_ENUM: &str = "INHERIT_FROM_ENUM";
pub const ABSTRACT_METHOD_NOT_IMPLEMENTED: &str = "ABSTRACT_METHOD_NOT_IMPLEMENTED";
pub const NO_DEFAULT_CONSTRUCTOR: &str = "NO_DEFAULT_CONSTRUCTOR";
pub const INCONSISTENT_INHERITANCE: &str = "INCONSISTENT_INHERITANCE";
pub const UNRELATED_RETURN_TYPES: &str = "UNRELATED_RETURN_TYPES";
pub const LOCAL_ENUM: &str = "LOCAL_ENUM";
pub const INNER_CLASS_STATIC_DECLARATION: &str = "INNER_CLASS_STATIC_DECLARATION";
pub const ABSTRACT_INSTANTIATION: &str = "ABSTRACT_INSTANTIATION";
pub const ENUM_INSTANTIATION: &str = "ENUM_INSTANTIATION";

// Methods and constructors.
pub const ABSTRACT_METHOD_BODY: &str = "ABSTRACT_METHOD_BODY";
pub const NATIVE_METHOD_BODY: &str = "NATIVE_METHOD_BODY";
pub const INTERFACE_METHOD_BODY: &str = "INTERFACE_METHOD_BODY";
pub const MISSING_METHOD_BODY: &str = "MISSING_METHOD_BODY";
pub const ABSTRACT_METHOD_IN_NON_ABSTRACT_CLASS: &str = "ABSTRACT_METHOD_IN_NON_ABSTRACT_CLASS";
pub const MISSING_RETURN_TYPE: &str = "MISSING_RETURN_TYPE";
pub const DUPLICATE_METHOD: &str = "DUPLICATE_METHOD";
pub const SAME_ERASURE: &str = "SAME_ERASURE";
pub const STATIC_OVERRIDE: &str = "STATIC_OVERRIDE";
pub const FINAL_OVERRIDE: &str = "FINAL_OVERRIDE";
pub const WEAKER_ACCESS: &str = "WEAKER_ACCESS";
pub const INCOMPATIBLE_RETURN_TYPE: &str = "INCOMPATIBLE_RETURN_TYPE";
pub const OVERRIDE_THROWS: &str = "OVERRIDE_THROWS";
pub const METHOD_DOES_NOT_OVERRIDE: &str = "METHOD_DOES_NOT_OVERRIDE";
pub const VARARG_NOT_LAST: &str = "VARARG_NOT_LAST";
pub const CONSTRUCTOR_CALL_NOT_FIRST: &str = "CONSTRUCTOR_CALL_NOT_FIRST";
pub const RECURSIVE_CONSTRUCTOR_CALL: &str = "RECURSIVE_CONSTRUCTOR_CALL";
pub const ENUM_SUPER_CALL: &str = "ENUM_SUPER_CALL";
pub const ANNOTATION_MEMBER_PARAMETERS: &str = "ANNOTATION_MEMBER_PARAMETERS";

// Calls.
pub const CANNOT_RESOLVE_METHOD: &str = "CANNOT_RESOLVE_METHOD";
pub const CANNOT_RESOLVE_CONSTRUCTOR: &str = "CANNOT_RESOLVE_CONSTRUCTOR";
pub const AMBIGUOUS_CALL: &str = "AMBIGUOUS_CALL";
pub const ARGUMENT_MISMATCH: &str = "ARGUMENT_MISMATCH";
pub const ABSTRACT_SUPER_CALL: &str = "ABSTRACT_SUPER_CALL";

// Types and expressions.
pub const INCOMPATIBLE_TYPES: &str = "INCOMPATIBLE_TYPES";
pub const INCONVERTIBLE_TYPES: &str = "INCONVERTIBLE_TYPES";
pub const OPERATOR_NOT_APPLICABLE: &str = "OPERATOR_NOT_APPLICABLE";
pub const VARIABLE_EXPECTED: &str = "VARIABLE_EXPECTED";
pub const FINAL_ASSIGNMENT: &str = "FINAL_ASSIGNMENT";
pub const FINAL_ALREADY_ASSIGNED: &str = "FINAL_ALREADY_ASSIGNED";
pub const FINAL_NOT_INITIALIZED: &str = "FINAL_NOT_INITIALIZED";
pub const ARRAY_TYPE_EXPECTED: &str = "ARRAY_TYPE_EXPECTED";
pub const NOT_A_STATEMENT: &str = "NOT_A_STATEMENT";
pub const ILLEGAL_GENERIC_INSTANCEOF: &str = "ILLEGAL_GENERIC_INSTANCEOF";
pub const CONSTANT_EXPRESSION_REQUIRED: &str = "CONSTANT_EXPRESSION_REQUIRED";
pub const DUPLICATE_VARIABLE: &str = "DUPLICATE_VARIABLE";

// Unchecked warnings.
pub const UNCHECKED_ASSIGNMENT: &str = "UNCHECKED_ASSIGNMENT";
pub const UNCHECKED_CALL: &str = "UNCHECKED_CALL";
pub const UNCHECKED_CAST: &str = "UNCHECKED_CAST";
pub const UNCHECKED_OVERRIDE: &str = "UNCHECKED_OVERRIDE";

// Statements.
pub const RETURN_OUTSIDE_METHOD: &str = "RETURN_OUTSIDE_METHOD";
pub const RETURN_VALUE_FROM_VOID: &str = "RETURN_VALUE_FROM_VOID";
pub const MISSING_RETURN_VALUE: &str = "MISSING_RETURN_VALUE";
pub const ENUM_CASE_LABEL: &str = "ENUM_CASE_LABEL";
pub const DUPLICATE_SWITCH_LABEL: &str = "DUPLICATE_SWITCH_LABEL";
pub const DUPLICATE_DEFAULT_LABEL: &str = "DUPLICATE_DEFAULT_LABEL";
pub const CASE_OUTSIDE_SWITCH: &str = "CASE_OUTSIDE_SWITCH";
pub const COLON_EXPECTED: &str = "COLON_EXPECTED";
pub const UNDEFINED_LABEL: &str = "UNDEFINED_LABEL";
pub const NOT_A_LOOP_LABEL: &str = "NOT_A_LOOP_LABEL";
pub const BREAK_OUTSIDE: &str = "BREAK_OUTSIDE";
pub const CONTINUE_OUTSIDE: &str = "CONTINUE_OUTSIDE";
pub const DUPLICATE_LABEL: &str = "DUPLICATE_LABEL";
pub const LABEL_WITHOUT_STATEMENT: &str = "LABEL_WITHOUT_STATEMENT";
pub const FOREACH_NOT_APPLICABLE: &str = "FOREACH_NOT_APPLICABLE";

// Exceptions.
pub const UNHANDLED_EXCEPTION: &str = "UNHANDLED_EXCEPTION";
pub const EXCEPTION_NEVER_THROWN: &str = "EXCEPTION_NEVER_THROWN";
pub const EXCEPTION_ALREADY_CAUGHT: &str = "EXCEPTION_ALREADY_CAUGHT";

// Generics.
pub const WRONG_TYPE_ARGUMENT_COUNT: &str = "WRONG_TYPE_ARGUMENT_COUNT";
pub const NO_TYPE_PARAMETERS: &str = "NO_TYPE_PARAMETERS";
pub const PRIMITIVE_TYPE_ARGUMENT: &str = "PRIMITIVE_TYPE_ARGUMENT";
pub const TYPE_ARGUMENT_OUT_OF_BOUNDS: &str = "TYPE_ARGUMENT_OUT_OF_BOUNDS";
pub const WILDCARD_INSTANTIATION: &str = "WILDCARD_INSTANTIATION";
pub const NO_WILDCARD_EXPECTED: &str = "NO_WILDCARD_EXPECTED";
pub const WILDCARD_NOT_ALLOWED: &str = "WILDCARD_NOT_ALLOWED";
pub const GENERIC_ARRAY_CREATION: &str = "GENERIC_ARRAY_CREATION";
pub const TYPE_PARAMETER_INSTANTIATION: &str = "TYPE_PARAMETER_INSTANTIATION";
pub const DUPLICATE_TYPE_PARAMETER: &str = "DUPLICATE_TYPE_PARAMETER";
pub const TYPE_PARAMETERS_NOT_ALLOWED: &str = "TYPE_PARAMETERS_NOT_ALLOWED";

// Annotations.
pub const ANNOTATION_TYPE_EXPECTED: &str = "ANNOTATION_TYPE_EXPECTED";
pub const ANNOTATION_VALUE_NOT_CONSTANT: &str = "ANNOTATION_VALUE_NOT_CONSTANT";
pub const MISSING_ANNOTATION_ATTRIBUTE: &str = "MISSING_ANNOTATION_ATTRIBUTE";
pub const ANNOTATION_NOT_APPLICABLE: &str = "ANNOTATION_NOT_APPLICABLE";
pub const DUPLICATE_ANNOTATION: &str = "DUPLICATE_ANNOTATION";
pub const REPEATED_ANNOTATION_TARGET: &str = "REPEATED_ANNOTATION_TARGET";

// Informational markers.
pub const REASSIGNED_PARAMETER: &str = "REASSIGNED_PARAMETER";
