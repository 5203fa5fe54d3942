//! Construction of resolved trees over real Java source text.
//!
//! [`FileBuilder`] is driven by nested closures that mirror the shape of the source. Every call
//! names a snippet of the text (a keyword for compound statements, the full spelling for
//! expressions and declaration headers) which is located after the previous sibling, so node
//! ranges always point at the real source. Declarations are registered in the [`TypeStore`] as they
//! are built; [`FileBuilder::finish`] resolves type references, names and expression types.
//!
//! ```
//! use nova_hir::FileBuilder;
//! use nova_types::TypeStore;
//!
//! let mut store = TypeStore::with_minimal_jdk();
//! let text = "class A { int f() { return 1; } }";
//! let mut b = FileBuilder::new(&mut store, "A.java", text);
//! b.class("class A", |b| {
//!     b.method("int f()", |b| {
//!         b.return_(|b| b.lit("1"));
//!     });
//! });
//! let file = b.finish();
//! assert_eq!(file.types.len(), 1);
//! ```
//!
//! The builder is meant for fixtures and embedders that already know the shape of their input: a
//! snippet that cannot be found panics with the text it was looking for.

use std::rc::Rc;

use nova_core::{TextRange, TextSize};
use nova_types::{ClassDef, ClassId, ClassKind, PrimitiveType, Type, TypeStore};

use crate::hir::*;
use crate::ids::*;
use crate::resolve::{self, RefScope};
use crate::scan::{self, Cursor, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    File,
    ClassBody,
    Code,
    Annotation,
}

#[derive(Debug, Clone)]
enum Child {
    Expr(ExprId),
    Stmt(StmtId),
    Member(Member),
    Class(ClassDeclId),
    Catch(CatchClause),
    Finally(StmtId),
    Value(AnnotationValue),
    Arg(AnnotationArg),
}

struct Frame {
    context: Context,
    cursor: usize,
    window_end: usize,
    children: Vec<(Child, TextRange)>,
}

struct OpenClass {
    id: ClassDeclId,
    def: ClassId,
    binary_name: String,
    simple_name: String,
    fields: usize,
    methods: usize,
    constructors: usize,
}

pub struct FileBuilder<'s> {
    store: &'s mut TypeStore,
    text: Rc<str>,
    file: JavaFile,
    frames: Vec<Frame>,
    classes: Vec<OpenClass>,
    /// `None` entries mark class boundaries.
    methods: Vec<Option<MethodDeclId>>,
    pending_annotations: Vec<AnnotationId>,
    ref_scopes: Vec<RefScope>,
    in_class_header: bool,
    local_counter: u32,
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

fn start_of(range: TextRange) -> usize {
    u32::from(range.start()) as usize
}

fn end_of(range: TextRange) -> usize {
    u32::from(range.end()) as usize
}

fn exprs(children: &[(Child, TextRange)]) -> Vec<(ExprId, TextRange)> {
    children
        .iter()
        .filter_map(|(child, r)| match child {
            Child::Expr(e) => Some((*e, *r)),
            _ => None,
        })
        .collect()
}

fn stmts(children: &[(Child, TextRange)]) -> Vec<(StmtId, TextRange)> {
    children
        .iter()
        .filter_map(|(child, r)| match child {
            Child::Stmt(s) => Some((*s, *r)),
            _ => None,
        })
        .collect()
}

fn children_end(children: &[(Child, TextRange)]) -> Option<usize> {
    children.iter().map(|(_, r)| end_of(*r)).max()
}

fn nth_expr(children: &[(Child, TextRange)], n: usize, what: &str) -> ExprId {
    match exprs(children).get(n) {
        Some((e, _)) => *e,
        None => panic!("{what} needs at least {} expression(s)", n + 1),
    }
}

fn nth_stmt(children: &[(Child, TextRange)], n: usize, what: &str) -> StmtId {
    match stmts(children).get(n) {
        Some((s, _)) => *s,
        None => panic!("{what} needs at least {} statement(s)", n + 1),
    }
}

fn as_value(child: &Child) -> Option<AnnotationValue> {
    match child {
        Child::Expr(e) => Some(AnnotationValue::Expr(*e)),
        Child::Value(v) => Some(v.clone()),
        _ => None,
    }
}

impl<'s> FileBuilder<'s> {
    pub fn new(store: &'s mut TypeStore, file_name: &str, text: &str) -> Self {
        Self {
            store,
            text: Rc::from(text),
            file: JavaFile::new(file_name, text),
            frames: vec![Frame {
                context: Context::File,
                cursor: 0,
                window_end: text.len(),
                children: Vec::new(),
            }],
            classes: Vec::new(),
            methods: Vec::new(),
            pending_annotations: Vec::new(),
            ref_scopes: Vec::new(),
            in_class_header: false,
            local_counter: 0,
        }
    }

    /// Resolve the tree and fill in the registered class definitions.
    pub fn finish(self) -> JavaFile {
        let FileBuilder {
            store,
            mut file,
            ref_scopes,
            ..
        } = self;
        resolve::resolve_file(store, &mut file, &ref_scopes);
        file
    }

    // ---- locating --------------------------------------------------------------------------

    fn frame(&self) -> &Frame {
        self.frames.last().expect("the file frame is never popped")
    }

    fn frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("the file frame is never popped")
    }

    fn context(&self) -> Context {
        self.frame().context
    }

    /// Offset of the next occurrence of `needle` after the current cursor. Identifier-like needles
    /// only match on word boundaries.
    fn locate(&self, needle: &str) -> usize {
        let frame = self.frame();
        let (from, to) = (frame.cursor, frame.window_end);
        let hay = &self.text[from..to.max(from)];
        let starts_word = needle.chars().next().is_some_and(scan::is_ident_char);
        let ends_word = needle.chars().last().is_some_and(scan::is_ident_char);
        let mut search = 0;
        while let Some(idx) = hay[search..].find(needle) {
            let start = from + search + idx;
            let end = start + needle.len();
            let before_ok = !starts_word
                || !self.text[..start]
                    .chars()
                    .next_back()
                    .is_some_and(scan::is_ident_char);
            let after_ok = !ends_word
                || !self.text[end..].chars().next().is_some_and(scan::is_ident_char);
            if before_ok && after_ok {
                return start;
            }
            search += idx + needle.chars().next().map_or(1, char::len_utf8);
        }
        panic!(
            "`{needle}` not found in `{}` ({})",
            &self.text[from..to.max(from)],
            self.file.file_name
        );
    }

    fn window_end(&self) -> usize {
        self.frame().window_end
    }

    /// End of `token` when it is the next non-trivia text after `pos`.
    fn trailing(&self, pos: usize, token: &str) -> Option<usize> {
        let at = scan::skip_trivia(&self.text, pos);
        self.text[at..].starts_with(token).then_some(at + token.len())
    }

    fn attach(&mut self, child: Child, r: TextRange) {
        let frame = self.frame_mut();
        frame.children.push((child, r));
        frame.cursor = frame.cursor.max(end_of(r));
    }

    fn run_frame<R>(
        &mut self,
        context: Context,
        cursor: usize,
        window_end: usize,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Vec<(Child, TextRange)> {
        self.frames.push(Frame {
            context,
            cursor,
            window_end,
            children: Vec::new(),
        });
        f(self);
        match self.frames.pop() {
            Some(frame) => frame.children,
            None => Vec::new(),
        }
    }

    fn ref_scope(&self) -> RefScope {
        RefScope {
            class: self.classes.last().map(|c| c.id),
            method: self.methods.last().copied().flatten(),
            in_header: self.in_class_header,
        }
    }

    fn current_class(&mut self) -> &mut OpenClass {
        self.classes
            .last_mut()
            .unwrap_or_else(|| panic!("member declared outside of a class body"))
    }

    // ---- allocation ------------------------------------------------------------------------

    fn alloc_expr(&mut self, kind: ExprKind, start: usize, end: usize) -> ExprId {
        let r = range(start, end);
        let id = ExprId::from_raw(self.file.exprs.alloc(Expr {
            kind,
            range: r,
            ty: Type::Unknown,
        }));
        self.attach(Child::Expr(id), r);
        id
    }

    fn alloc_stmt(&mut self, kind: StmtKind, start: usize, end: usize) -> StmtId {
        StmtId::from_raw(self.file.stmts.alloc(Stmt {
            kind,
            range: range(start, end),
        }))
    }

    fn push_stmt(&mut self, kind: StmtKind, start: usize, end: usize) -> StmtId {
        let id = self.alloc_stmt(kind, start, end);
        self.attach(Child::Stmt(id), range(start, end));
        id
    }

    fn alloc_type_ref(&mut self, kind: TypeRefKind, start: usize, end: usize) -> TypeRefId {
        let scope = self.ref_scope();
        self.ref_scopes.push(scope);
        TypeRefId::from_raw(self.file.type_refs.alloc(TypeRef {
            kind,
            range: range(start, end),
            ty: Type::Unknown,
        }))
    }

    // ---- token-level parsing ---------------------------------------------------------------

    /// Dotted name at the cursor: `(text, start, end)`.
    fn dotted_name(cur: &mut Cursor<'_>) -> Option<(String, usize, usize)> {
        let first = cur.eat_ident()?;
        let mut name = first.text.to_string();
        let mut end = first.end;
        while cur.at(".")
            && cur
                .peek_nth(1)
                .is_some_and(|t| t.kind == TokenKind::Ident && t.text != "this" && t.text != "class" && t.text != "super")
        {
            cur.bump();
            if let Some(seg) = cur.bump() {
                name.push('.');
                name.push_str(seg.text);
                end = seg.end;
            }
        }
        Some((name, first.start, end))
    }

    fn parse_type_base(&mut self, cur: &mut Cursor<'_>) -> Option<TypeRefId> {
        if let Some(q) = cur.eat("?") {
            let kind = if cur.eat("extends").is_some() {
                Some(WildcardKind::Extends)
            } else if cur.eat("super").is_some() {
                Some(WildcardKind::Super)
            } else {
                None
            };
            let bound = match kind {
                Some(kind) => self.parse_type(cur).map(|(b, _)| (kind, b)),
                None => None,
            };
            let end = bound.map_or(q.end, |(_, b)| end_of(self.file.type_refs[b].range));
            return Some(self.alloc_type_ref(TypeRefKind::Wildcard(bound), q.start, end));
        }

        let first = cur.peek().filter(|t| t.kind == TokenKind::Ident)?;
        if let Some(primitive) = PrimitiveType::from_keyword(first.text) {
            cur.bump();
            return Some(self.alloc_type_ref(TypeRefKind::Primitive(primitive), first.start, first.end));
        }
        if first.text == "void" {
            cur.bump();
            return Some(self.alloc_type_ref(TypeRefKind::Void, first.start, first.end));
        }

        let (name, start, name_end) = Self::dotted_name(cur)?;
        let mut end = name_end;
        let mut args = Vec::new();
        let mut arg_list_range = None;
        if let Some(lt) = cur.eat("<") {
            loop {
                if let Some(gt) = cur.eat(">") {
                    arg_list_range = Some(range(lt.start, gt.end));
                    end = gt.end;
                    break;
                }
                if cur.eat(",").is_some() {
                    continue;
                }
                match self.parse_type(cur) {
                    Some((arg, _)) => args.push(arg),
                    None => break,
                }
            }
        }
        Some(self.alloc_type_ref(
            TypeRefKind::Class {
                name,
                name_range: range(start, name_end),
                args,
                arg_list_range,
                resolved: None,
            },
            start,
            end,
        ))
    }

    /// A type with array dimensions; the flag reports a trailing `...`.
    fn parse_type(&mut self, cur: &mut Cursor<'_>) -> Option<(TypeRefId, bool)> {
        let mut ty = self.parse_type_base(cur)?;
        let start = start_of(self.file.type_refs[ty].range);
        while cur.at("[") && cur.peek_nth(1).is_some_and(|t| t.text == "]") {
            cur.bump();
            let close = cur.bump()?;
            ty = self.alloc_type_ref(TypeRefKind::Array(ty), start, close.end);
        }
        if let Some(dots) = cur.eat("...") {
            ty = self.alloc_type_ref(TypeRefKind::Array(ty), start, dots.end);
            return Some((ty, true));
        }
        Some((ty, false))
    }

    fn parse_type_params(&mut self, cur: &mut Cursor<'_>) -> Vec<TypeParamId> {
        let mut out = Vec::new();
        if cur.eat("<").is_none() {
            return out;
        }
        loop {
            if cur.eat(">").is_some() || cur.is_empty() {
                break;
            }
            if cur.eat(",").is_some() {
                continue;
            }
            let Some(name) = cur.eat_ident() else {
                break;
            };
            let def = self.store.add_type_param(name.text, Vec::new());
            let mut bounds = Vec::new();
            let mut end = name.end;
            if cur.eat("extends").is_some() {
                loop {
                    if let Some((bound, _)) = self.parse_type(cur) {
                        end = end_of(self.file.type_refs[bound].range);
                        bounds.push(bound);
                    }
                    if cur.eat("&").is_none() {
                        break;
                    }
                }
            }
            out.push(TypeParamId::from_raw(self.file.type_params.alloc(TypeParamDecl {
                name: name.text.to_string(),
                name_range: range(name.start, name.end),
                range: range(name.start, end),
                bounds,
                def,
            })));
        }
        out
    }

    fn parse_modifiers(
        &mut self,
        cur: &mut Cursor<'_>,
        at: usize,
        mut annotations: Vec<AnnotationId>,
    ) -> ModifierList {
        let mut keywords = Vec::new();
        let mut end = None;
        loop {
            if cur.at("@")
                && cur
                    .peek_nth(1)
                    .is_some_and(|t| t.kind == TokenKind::Ident && t.text != "interface")
            {
                let Some(sign) = cur.bump() else { break };
                let Some((name, name_start, name_end)) = Self::dotted_name(cur) else {
                    break;
                };
                assert!(
                    !cur.at("("),
                    "annotation `@{name}` has arguments; declare it with `annotation`"
                );
                annotations.push(AnnotationId::from_raw(self.file.annotations.alloc(Annotation {
                    name,
                    name_range: range(name_start, name_end),
                    range: range(sign.start, name_end),
                    args: Vec::new(),
                    resolved: None,
                })));
                end = Some(name_end);
                continue;
            }
            match cur.peek() {
                Some(t) if t.kind == TokenKind::Ident => match Modifier::from_keyword(t.text) {
                    Some(modifier) => {
                        cur.bump();
                        keywords.push((modifier, range(t.start, t.end)));
                        end = Some(t.end);
                    }
                    None => break,
                },
                _ => break,
            }
        }

        let first_annotation = annotations
            .iter()
            .map(|a| start_of(self.file.annotations[*a].range))
            .min();
        let first_keyword = keywords.first().map(|(_, r)| start_of(*r));
        let start = match (first_annotation, first_keyword) {
            (Some(a), Some(k)) => a.min(k),
            (Some(a), None) => a,
            (None, Some(k)) => k,
            (None, None) => at,
        };
        let end = end
            .into_iter()
            .chain(
                annotations
                    .iter()
                    .map(|a| end_of(self.file.annotations[*a].range)),
            )
            .max()
            .unwrap_or(at);
        ModifierList {
            range: range(start, end.max(start)),
            keywords,
            annotations,
        }
    }

    /// `modifiers Type name[]`, shared by fields, locals and parameters.
    fn parse_var(
        &mut self,
        cur: &mut Cursor<'_>,
        at: usize,
        kind: VarKind,
        annotations: Vec<AnnotationId>,
    ) -> VarId {
        let modifiers = self.parse_modifiers(cur, at, annotations);
        let Some((mut ty, is_varargs)) = self.parse_type(cur) else {
            panic!("expected a type in `{}`", self.rest(cur));
        };
        let Some(name) = cur.eat_ident() else {
            panic!("expected a variable name in `{}`", self.rest(cur));
        };
        let mut end = name.end;
        let type_start = start_of(self.file.type_refs[ty].range);
        while cur.at("[") && cur.peek_nth(1).is_some_and(|t| t.text == "]") {
            cur.bump();
            if let Some(close) = cur.bump() {
                end = close.end;
            }
            ty = self.alloc_type_ref(TypeRefKind::Array(ty), type_start, end);
        }
        let start = if modifiers.range.is_empty() {
            type_start
        } else {
            start_of(modifiers.range)
        };
        VarId::from_raw(self.file.vars.alloc(VarDecl {
            name: name.text.to_string(),
            name_range: range(name.start, name.end),
            range: range(start, end),
            kind,
            modifiers,
            ty,
            initializer: None,
            is_varargs,
        }))
    }

    fn rest(&self, cur: &Cursor<'_>) -> String {
        match cur.peek() {
            Some(t) => self.text[t.start..].chars().take(40).collect(),
            None => String::new(),
        }
    }

    fn take_annotations(&mut self) -> Vec<AnnotationId> {
        std::mem::take(&mut self.pending_annotations)
    }

    // ---- file level ------------------------------------------------------------------------

    /// `package a.b;`
    pub fn package(&mut self, text: &str) {
        let start = self.locate(text);
        let end = start + text.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        cur.eat("package");
        let name = Self::dotted_name(&mut cur).map(|(n, _, _)| n).unwrap_or_default();
        let end = self.trailing(end, ";").unwrap_or(end);
        let annotations = self.take_annotations();
        let start = annotations
            .first()
            .map_or(start, |a| start_of(self.file.annotations[*a].range));
        self.file.package = Some(PackageDecl {
            name,
            range: range(start, end),
            annotations,
        });
        self.frame_mut().cursor = end;
    }

    /// `import [static] a.b.C[.*];`
    pub fn import(&mut self, text: &str) -> ImportId {
        let start = self.locate(text);
        let end = start + text.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        cur.eat("import");
        let is_static = cur.eat("static").is_some();
        let (path, path_start, path_end) =
            Self::dotted_name(&mut cur).unwrap_or_else(|| panic!("malformed import `{text}`"));
        let is_on_demand = cur.eat(".").is_some() && cur.eat("*").is_some();
        let end = self.trailing(end, ";").unwrap_or(end);
        let id = ImportId::from_raw(self.file.import_decls.alloc(ImportDecl {
            path,
            path_range: range(path_start, path_end),
            range: range(start, end),
            is_static,
            is_on_demand,
            resolved: None,
        }));
        self.file.imports.push(id);
        self.frame_mut().cursor = end;
        id
    }

    // ---- annotations -----------------------------------------------------------------------

    /// `@Name(...)`. Inside an annotation value it becomes a nested value; elsewhere it is attached
    /// to the next declaration. Arguments are built by `f` with [`Self::attr`] or as bare values
    /// (the `value` shorthand).
    pub fn annotation<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> AnnotationId {
        let start = self.locate(text);
        let end = start + text.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        cur.eat("@");
        let (name, name_start, name_end) =
            Self::dotted_name(&mut cur).unwrap_or_else(|| panic!("malformed annotation `{text}`"));
        let children = self.run_frame(Context::Annotation, name_end, end, f);
        let args = children
            .iter()
            .filter_map(|(child, r)| match child {
                Child::Arg(arg) => Some(arg.clone()),
                other => as_value(other).map(|value| AnnotationArg {
                    name: None,
                    name_range: None,
                    range: *r,
                    value,
                }),
            })
            .collect();
        let id = AnnotationId::from_raw(self.file.annotations.alloc(Annotation {
            name,
            name_range: range(name_start, name_end),
            range: range(start, end),
            args,
            resolved: None,
        }));
        if self.context() == Context::Annotation {
            self.attach(Child::Value(AnnotationValue::Annotation(id)), range(start, end));
        } else {
            self.pending_annotations.push(id);
            self.frame_mut().cursor = end;
        }
        id
    }

    /// `name = value` inside an annotation.
    pub fn attr<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) {
        let start = self.locate(text);
        let end = start + text.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        let name = cur
            .eat_ident()
            .unwrap_or_else(|| panic!("malformed annotation attribute `{text}`"));
        let value_start = cur.eat("=").map_or(name.end, |eq| eq.end);
        let children = self.run_frame(Context::Annotation, value_start, end, f);
        let value = children
            .iter()
            .find_map(|(child, _)| as_value(child))
            .unwrap_or_else(|| panic!("annotation attribute `{text}` has no value"));
        let r = range(start, end);
        self.attach(
            Child::Arg(AnnotationArg {
                name: Some(name.text.to_string()),
                name_range: Some(range(name.start, name.end)),
                range: r,
                value,
            }),
            r,
        );
    }

    /// `{v1, v2}` inside an annotation.
    pub fn array_value<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) {
        let start = self.locate(text);
        let end = start + text.len();
        let children = self.run_frame(Context::Annotation, start + 1, end, f);
        let elements = children.iter().filter_map(|(c, _)| as_value(c)).collect();
        let r = range(start, end);
        self.attach(Child::Value(AnnotationValue::Array { range: r, elements }), r);
    }

    // ---- declarations ----------------------------------------------------------------------

    /// A class, interface, enum or annotation type. `header` runs up to (not including) `{`;
    /// `f` builds the members. Top-level, member or local depending on where it is called.
    pub fn class<R>(&mut self, header: &str, f: impl FnOnce(&mut Self) -> R) -> ClassDeclId {
        let start = self.locate(header);
        let header_end = start + header.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, header_end));
        let annotations = self.take_annotations();
        let modifiers = self.parse_modifiers(&mut cur, start, annotations);

        let kind = if cur.eat("class").is_some() {
            ClassKind::Class
        } else if cur.eat("interface").is_some() {
            ClassKind::Interface
        } else if cur.eat("enum").is_some() {
            ClassKind::Enum
        } else if cur.at("@") && cur.peek_nth(1).is_some_and(|t| t.text == "interface") {
            cur.bump();
            cur.bump();
            ClassKind::Annotation
        } else {
            panic!("expected a class keyword in `{header}`");
        };
        let name = cur
            .eat_ident()
            .unwrap_or_else(|| panic!("expected a class name in `{header}`"));

        let container = match self.context() {
            Context::File => ClassContainer::TopLevel,
            Context::ClassBody => ClassContainer::Member,
            Context::Code | Context::Annotation => ClassContainer::Local,
        };
        let id = self.open_class(name.text, range(name.start, name.end), kind, container, modifiers);

        self.in_class_header = true;
        let type_params = self.parse_type_params(&mut cur);
        let mut extends = Vec::new();
        let mut implements = Vec::new();
        if cur.eat("extends").is_some() {
            while let Some((ty, _)) = self.parse_type(&mut cur) {
                extends.push(ty);
                if cur.eat(",").is_none() {
                    break;
                }
            }
        }
        if cur.eat("implements").is_some() {
            while let Some((ty, _)) = self.parse_type(&mut cur) {
                implements.push(ty);
                if cur.eat(",").is_none() {
                    break;
                }
            }
        }
        self.in_class_header = false;

        let open = scan::skip_trivia(&self.text, header_end);
        assert!(
            self.text[open..].starts_with('{'),
            "expected `{{` after class header `{header}`"
        );
        let end = self.close_class(id, open, f);

        let decl = &mut self.file.classes[id];
        decl.type_params = type_params;
        decl.extends = extends;
        decl.implements = implements;
        let start = if decl.modifiers.range.is_empty() {
            start
        } else {
            start.min(start_of(decl.modifiers.range))
        };
        decl.range = range(start, end);

        match container {
            ClassContainer::TopLevel => {
                self.file.types.push(id);
                self.frame_mut().cursor = end;
            }
            ClassContainer::Member => self.attach(Child::Member(Member::Class(id)), range(start, end)),
            _ => {
                self.push_stmt(StmtKind::LocalClass(id), start, end);
            }
        }
        id
    }

    /// Body of an anonymous class (inside [`Self::new_object`]) or of an enum constant.
    pub fn class_body<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> ClassDeclId {
        let open = self.locate("{");
        let id = self.open_class(
            "",
            range(open, open),
            ClassKind::Class,
            ClassContainer::Anonymous,
            ModifierList {
                range: range(open, open),
                ..ModifierList::default()
            },
        );
        let end = self.close_class(id, open, f);
        self.file.classes[id].range = range(open, end);
        self.attach(Child::Class(id), range(open, end));
        id
    }

    fn open_class(
        &mut self,
        name: &str,
        name_range: TextRange,
        kind: ClassKind,
        container: ClassContainer,
        modifiers: ModifierList,
    ) -> ClassDeclId {
        let parent = self.classes.last();
        let binary_name = match (container, parent) {
            (ClassContainer::TopLevel, _) | (_, None) => {
                self.local_counter = 0;
                match self.file.package_name() {
                    "" => name.to_string(),
                    package => format!("{package}.{name}"),
                }
            }
            (ClassContainer::Member, Some(parent)) => format!("{}${name}", parent.binary_name),
            (_, Some(parent)) => {
                self.local_counter += 1;
                format!("{}${}{name}", parent.binary_name, self.local_counter)
            }
        };
        let parent_id = self.classes.last().map(|c| c.id);
        let enclosing = self.classes.last().map(|c| c.def);
        let enclosing_method = match container {
            ClassContainer::Local | ClassContainer::Anonymous => self.methods.last().copied().flatten(),
            _ => None,
        };
        let def = self.store.add_class(ClassDef {
            name: binary_name.clone(),
            kind,
            enclosing,
            ..ClassDef::default()
        });
        let id = ClassDeclId::from_raw(self.file.classes.alloc(ClassDecl {
            name: name.to_string(),
            name_range,
            range: name_range,
            kind,
            container,
            modifiers,
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            anonymous_base: None,
            members: Vec::new(),
            parent: parent_id,
            enclosing_method,
            def,
        }));
        self.classes.push(OpenClass {
            id,
            def,
            binary_name,
            simple_name: name.to_string(),
            fields: 0,
            methods: 0,
            constructors: 0,
        });
        self.methods.push(None);
        id
    }

    /// Build the members between `open` and its matching brace; returns the end offset.
    fn close_class<R>(&mut self, id: ClassDeclId, open: usize, f: impl FnOnce(&mut Self) -> R) -> usize {
        let close = scan::matching_close(&self.text, open)
            .unwrap_or_else(|| panic!("unbalanced class body in {}", self.file.file_name));
        let children = self.run_frame(Context::ClassBody, open + 1, close, f);
        self.file.classes[id].members = children
            .iter()
            .filter_map(|(child, _)| match child {
                Child::Member(m) => Some(*m),
                _ => None,
            })
            .collect();
        self.classes.pop();
        self.methods.pop();
        close + 1
    }

    /// A method, constructor or annotation type element. `header` runs up to the body, the `;`
    /// or the `default` keyword; `f` builds the body statements or the default value.
    pub fn method<R>(&mut self, header: &str, f: impl FnOnce(&mut Self) -> R) -> MethodDeclId {
        let start = self.locate(header);
        let header_end = start + header.len();
        let owner = self.current_class().id;
        let owner_name = self.current_class().simple_name.clone();
        let id = MethodDeclId::from_raw(self.file.methods.alloc(MethodDecl {
            name: String::new(),
            name_range: range(start, start),
            range: range(start, header_end),
            modifiers: ModifierList::default(),
            type_params: Vec::new(),
            return_type: None,
            params: Vec::new(),
            param_list_range: range(start, start),
            throws: Vec::new(),
            body: None,
            default_value: None,
            owner,
            slot: MethodSlot::Method(0),
        }));
        self.methods.push(Some(id));

        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, header_end));
        let annotations = self.take_annotations();
        let modifiers = self.parse_modifiers(&mut cur, start, annotations);
        let type_params = self.parse_type_params(&mut cur);
        let constructor_shape = cur.peek().is_some_and(|t| t.kind == TokenKind::Ident)
            && cur.peek_nth(1).is_some_and(|t| t.text == "(");
        let return_type = if constructor_shape {
            None
        } else {
            self.parse_type(&mut cur).map(|(ty, _)| ty)
        };
        let name = cur
            .eat_ident()
            .unwrap_or_else(|| panic!("expected a method name in `{header}`"));
        let is_constructor = return_type.is_none() && name.text == owner_name;

        let open = cur
            .eat("(")
            .unwrap_or_else(|| panic!("expected `(` in `{header}`"));
        let mut params = Vec::new();
        while !cur.at(")") && !cur.is_empty() {
            if cur.eat(",").is_some() {
                continue;
            }
            let at = cur.peek().map_or(open.end, |t| t.start);
            params.push(self.parse_var(&mut cur, at, VarKind::Parameter { method: id }, Vec::new()));
        }
        let close = cur
            .eat(")")
            .unwrap_or_else(|| panic!("expected `)` in `{header}`"));
        let mut throws = Vec::new();
        if cur.eat("throws").is_some() {
            while let Some((ty, _)) = self.parse_type(&mut cur) {
                throws.push(ty);
                if cur.eat(",").is_none() {
                    break;
                }
            }
        }

        let after = scan::skip_trivia(&self.text, header_end);
        let mut body = None;
        let mut default_value = None;
        let end = if self.text[after..].starts_with('{') {
            let (block, end) = self.build_block(after, f);
            body = Some(block);
            end
        } else if self.text[after..].starts_with("default") {
            let value_start = after + "default".len();
            let semi = self.text[value_start..]
                .find(';')
                .map_or(self.window_end(), |n| value_start + n);
            let children = self.run_frame(Context::Annotation, value_start, semi, f);
            default_value = children.iter().find_map(|(c, _)| as_value(c));
            semi + 1
        } else {
            self.run_frame(Context::Code, header_end, header_end, f);
            self.trailing(header_end, ";").unwrap_or(header_end)
        };
        self.methods.pop();

        let class = self.current_class();
        let slot = if is_constructor {
            class.constructors += 1;
            MethodSlot::Constructor(class.constructors - 1)
        } else {
            class.methods += 1;
            MethodSlot::Method(class.methods - 1)
        };
        let start = if modifiers.range.is_empty() {
            start
        } else {
            start.min(start_of(modifiers.range))
        };
        let method = &mut self.file.methods[id];
        method.name = name.text.to_string();
        method.name_range = range(name.start, name.end);
        method.range = range(start, end);
        method.modifiers = modifiers;
        method.type_params = type_params;
        method.return_type = return_type;
        method.params = params;
        method.param_list_range = range(open.start, close.end);
        method.throws = throws;
        method.body = body;
        method.default_value = default_value;
        method.slot = slot;
        self.attach(Child::Member(Member::Method(id)), range(start, end));
        id
    }

    /// `modifiers Type name [= init]` (without the `;`); `f` builds the initializer.
    pub fn field<R>(&mut self, decl: &str, f: impl FnOnce(&mut Self) -> R) -> VarId {
        let class = self.current_class();
        let kind = VarKind::Field {
            owner: class.id,
            index: class.fields,
        };
        class.fields += 1;
        let (var, start, end) = self.declarator(decl, kind, f);
        let end = self.trailing(end, ";").unwrap_or(end);
        self.attach(Child::Member(Member::Field(var)), range(start, end));
        var
    }

    /// A local variable declaration statement (without the `;`).
    pub fn local<R>(&mut self, decl: &str, f: impl FnOnce(&mut Self) -> R) -> VarId {
        let (var, start, end) = self.declarator(decl, VarKind::Local, f);
        let end = self.trailing(end, ";").unwrap_or(end);
        self.push_stmt(StmtKind::LocalVars(vec![var]), start, end);
        var
    }

    fn declarator<R>(&mut self, decl: &str, kind: VarKind, f: impl FnOnce(&mut Self) -> R) -> (VarId, usize, usize) {
        let start = self.locate(decl);
        let end = start + decl.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        let annotations = self.take_annotations();
        let var = self.parse_var(&mut cur, start, kind, annotations);
        let init_start = cur.eat("=").map_or(end, |eq| eq.end);
        let children = self.run_frame(Context::Code, init_start, end, f);
        let initializer = exprs(&children).first().map(|(e, _)| *e);
        let var_decl = &mut self.file.vars[var];
        var_decl.initializer = initializer;
        let var_start = start_of(var_decl.range).min(start);
        var_decl.range = range(var_start, end);
        (var, var_start, end)
    }

    /// An instance initializer block.
    pub fn initializer<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> InitializerId {
        let open = self.locate("{");
        self.initializer_at(open, open, ModifierList::default(), f)
    }

    /// A `static { ... }` initializer.
    pub fn static_initializer<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> InitializerId {
        let start = self.locate("static");
        let open = scan::skip_trivia(&self.text, start + "static".len());
        let modifiers = ModifierList {
            range: range(start, start + "static".len()),
            keywords: vec![(Modifier::Static, range(start, start + "static".len()))],
            annotations: Vec::new(),
        };
        self.initializer_at(start, open, modifiers, f)
    }

    fn initializer_at<R>(
        &mut self,
        start: usize,
        open: usize,
        modifiers: ModifierList,
        f: impl FnOnce(&mut Self) -> R,
    ) -> InitializerId {
        let owner = self.current_class().id;
        let (body, end) = self.build_block(open, f);
        let id = InitializerId::from_raw(self.file.initializers.alloc(InitializerDecl {
            range: range(start, end),
            modifiers,
            body,
            owner,
        }));
        self.attach(Child::Member(Member::Initializer(id)), range(start, end));
        id
    }

    /// An enum constant; `f` builds the arguments and an optional [`Self::class_body`].
    pub fn enum_constant<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> EnumConstantId {
        let start = self.locate(name);
        let name_end = start + name.len();
        let annotations = self.take_annotations();
        let class = self.current_class();
        let owner = class.id;
        let field_index = class.fields;
        class.fields += 1;

        let mut end = name_end;
        let mut arg_list_range = None;
        let after = scan::skip_trivia(&self.text, name_end);
        if self.text[after..].starts_with('(') {
            if let Some(close) = scan::matching_close(&self.text, after) {
                arg_list_range = Some(range(after, close + 1));
                end = close + 1;
            }
        }
        let after = scan::skip_trivia(&self.text, end);
        if self.text[after..].starts_with('{') {
            if let Some(close) = scan::matching_close(&self.text, after) {
                end = close + 1;
            }
        }
        let children = self.run_frame(Context::Code, name_end, end, f);
        let args = exprs(&children).into_iter().map(|(e, _)| e).collect();
        let body = children.iter().find_map(|(c, _)| match c {
            Child::Class(id) => Some(*id),
            _ => None,
        });
        let range_start = annotations
            .first()
            .map_or(start, |a| start_of(self.file.annotations[*a].range));
        let id = EnumConstantId::from_raw(self.file.enum_constants.alloc(EnumConstantDecl {
            name: name.to_string(),
            name_range: range(start, name_end),
            range: range(range_start, end),
            annotations,
            args,
            arg_list_range,
            body,
            owner,
            field_index,
        }));
        self.attach(Child::Member(Member::EnumConstant(id)), range(range_start, end));
        id
    }

    // ---- statements ------------------------------------------------------------------------

    fn build_block<R>(&mut self, open: usize, f: impl FnOnce(&mut Self) -> R) -> (StmtId, usize) {
        let close = scan::matching_close(&self.text, open)
            .unwrap_or_else(|| panic!("unbalanced block in {}", self.file.file_name));
        let children = self.run_frame(Context::Code, open + 1, close, f);
        let body = stmts(&children).into_iter().map(|(s, _)| s).collect();
        (self.alloc_stmt(StmtKind::Block(body), open, close + 1), close + 1)
    }

    /// Compound statement starting with `keyword`: `(start, keyword end, children)`.
    fn keyword_stmt<R>(
        &mut self,
        keyword: &str,
        f: impl FnOnce(&mut Self) -> R,
    ) -> (usize, usize, Vec<(Child, TextRange)>) {
        let start = self.locate(keyword);
        let kw_end = start + keyword.len();
        let window_end = self.window_end();
        let children = self.run_frame(Context::Code, kw_end, window_end, f);
        (start, kw_end, children)
    }

    /// Parenthesised header after `keyword` (`for (...)`, `catch (...)`): `(keyword start, open, close)`.
    fn paren_header(&self, keyword: &str) -> (usize, usize, usize) {
        let start = self.locate(keyword);
        let open = scan::skip_trivia(&self.text, start + keyword.len());
        let close = scan::matching_close(&self.text, open)
            .unwrap_or_else(|| panic!("unbalanced `{keyword}` header in {}", self.file.file_name));
        (start, open, close)
    }

    pub fn block<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let open = self.locate("{");
        let (id, end) = self.build_block(open, f);
        self.attach(Child::Stmt(id), range(open, end));
        id
    }

    /// An expression statement; `f` builds the expression.
    pub fn expr_stmt<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let cursor = self.frame().cursor;
        let window_end = self.window_end();
        let children = self.run_frame(Context::Code, cursor, window_end, f);
        let (expr, r) = exprs(&children)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("expr_stmt needs an expression"));
        let end = self.trailing(end_of(r), ";").unwrap_or(end_of(r));
        self.push_stmt(StmtKind::Expr(expr), start_of(r), end)
    }

    pub fn if_<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("if", f);
        let condition = nth_expr(&children, 0, "if");
        let branches = stmts(&children);
        let then_branch = nth_stmt(&children, 0, "if");
        let else_branch = branches.get(1).map(|(s, _)| *s);
        let end = children_end(&children).unwrap_or(kw_end);
        self.push_stmt(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            start,
            end,
        )
    }

    pub fn while_<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("while", f);
        let condition = nth_expr(&children, 0, "while");
        let body = nth_stmt(&children, 0, "while");
        let end = children_end(&children).unwrap_or(kw_end);
        self.push_stmt(StmtKind::While { condition, body }, start, end)
    }

    pub fn do_while<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("do", f);
        let body = nth_stmt(&children, 0, "do_while");
        let condition = nth_expr(&children, 0, "do_while");
        let mut end = children_end(&children).unwrap_or(kw_end);
        if let Some(paren) = self.trailing(end, ")") {
            end = paren;
        }
        let end = self.trailing(end, ";").unwrap_or(end);
        self.push_stmt(StmtKind::DoWhile { body, condition }, start, end)
    }

    /// Classic `for`: init statements, condition and update expressions are told apart by their
    /// position relative to the header's semicolons.
    pub fn for_<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, open, close) = self.paren_header("for");
        let source = Rc::clone(&self.text);
        let mut depth = 0usize;
        let mut semis = Vec::new();
        for token in scan::tokenize(&source, open + 1, close) {
            match token.text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => semis.push(token.start),
                _ => {}
            }
        }
        let (first, second) = match semis.as_slice() {
            [a, b, ..] => (*a, *b),
            _ => panic!("`for` header without two `;` in {}", self.file.file_name),
        };
        let window_end = self.window_end();
        let children = self.run_frame(Context::Code, open + 1, window_end, f);

        let mut init = Vec::new();
        let mut condition = None;
        let mut update = Vec::new();
        let mut body = None;
        for (child, r) in &children {
            let at = start_of(*r);
            match child {
                Child::Stmt(s) if at < first => init.push(*s),
                Child::Stmt(s) if at > close => body = Some(*s),
                Child::Expr(e) if at < first => {
                    init.push(self.alloc_stmt(StmtKind::Expr(*e), at, end_of(*r)));
                }
                Child::Expr(e) if at < second => condition = Some(*e),
                Child::Expr(e) if at < close => update.push(*e),
                _ => {}
            }
        }
        let body = body.unwrap_or_else(|| panic!("`for` needs a body"));
        let end = children_end(&children).unwrap_or(close + 1);
        self.push_stmt(
            StmtKind::For {
                init,
                condition,
                update,
                body,
            },
            start,
            end,
        )
    }

    /// `for (T x : iterable) body`; the parameter is read from the header.
    pub fn foreach<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, open, close) = self.paren_header("for");
        let source = Rc::clone(&self.text);
        let tokens = scan::tokenize(&source, open + 1, close);
        let colon = tokens
            .iter()
            .find(|t| t.text == ":")
            .map(|t| t.start)
            .unwrap_or_else(|| panic!("foreach header without `:`"));
        let mut cur = Cursor::new(scan::tokenize(&source, open + 1, colon));
        let param = self.parse_var(&mut cur, open + 1, VarKind::ForeachParameter, Vec::new());
        let window_end = self.window_end();
        let children = self.run_frame(Context::Code, colon + 1, window_end, f);
        let iterable = nth_expr(&children, 0, "foreach");
        let body = nth_stmt(&children, 0, "foreach");
        let end = children_end(&children).unwrap_or(close + 1);
        self.push_stmt(
            StmtKind::Foreach {
                param,
                iterable,
                body,
            },
            start,
            end,
        )
    }

    /// `switch (selector) { ... }`; `f` builds the selector and then the body statements.
    pub fn switch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("switch", f);
        let selector = nth_expr(&children, 0, "switch");
        let body = stmts(&children).into_iter().map(|(s, _)| s).collect();
        let selector_end = exprs(&children)
            .first()
            .map_or(kw_end, |(_, r)| end_of(*r));
        let paren_end = self.trailing(selector_end, ")").unwrap_or(selector_end);
        let open = scan::skip_trivia(&self.text, paren_end);
        let end = scan::matching_close(&self.text, open)
            .map(|close| close + 1)
            .or_else(|| children_end(&children))
            .unwrap_or(kw_end);
        self.push_stmt(StmtKind::Switch { selector, body }, start, end)
    }

    /// `case value:`; `f` builds the value.
    pub fn case<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("case", f);
        let value = exprs(&children).first().map(|(e, _)| *e);
        let value_end = children_end(&children).unwrap_or(kw_end);
        let colon = self.trailing(value_end, ":");
        self.push_stmt(
            StmtKind::Case {
                value,
                has_colon: colon.is_some(),
            },
            start,
            colon.unwrap_or(value_end),
        )
    }

    pub fn default_case(&mut self) -> StmtId {
        let start = self.locate("default");
        let kw_end = start + "default".len();
        let colon = self.trailing(kw_end, ":");
        self.push_stmt(
            StmtKind::Case {
                value: None,
                has_colon: colon.is_some(),
            },
            start,
            colon.unwrap_or(kw_end),
        )
    }

    fn jump(&mut self, keyword: &str, label: Option<&str>) -> (usize, usize, Option<Label>) {
        let start = self.locate(keyword);
        let mut end = start + keyword.len();
        let label = label.map(|name| {
            let at = scan::skip_trivia(&self.text, end);
            assert!(
                self.text[at..].starts_with(name),
                "expected label `{name}` after `{keyword}`"
            );
            end = at + name.len();
            Label {
                name: name.to_string(),
                range: range(at, end),
            }
        });
        let end = self.trailing(end, ";").unwrap_or(end);
        (start, end, label)
    }

    pub fn break_(&mut self, label: Option<&str>) -> StmtId {
        let (start, end, label) = self.jump("break", label);
        self.push_stmt(StmtKind::Break(label), start, end)
    }

    pub fn continue_(&mut self, label: Option<&str>) -> StmtId {
        let (start, end, label) = self.jump("continue", label);
        self.push_stmt(StmtKind::Continue(label), start, end)
    }

    /// `label: body`; `f` may build no statement (`Label without statement`).
    pub fn labeled<R>(&mut self, label: &str, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let start = self.locate(label);
        let label_end = start + label.len();
        let colon = self
            .trailing(label_end, ":")
            .unwrap_or_else(|| panic!("expected `:` after label `{label}`"));
        let window_end = self.window_end();
        let children = self.run_frame(Context::Code, colon, window_end, f);
        let body = stmts(&children).first().map(|(s, _)| *s);
        let end = children_end(&children).unwrap_or(colon);
        self.push_stmt(
            StmtKind::Labeled {
                label: Label {
                    name: label.to_string(),
                    range: range(start, label_end),
                },
                body,
            },
            start,
            end,
        )
    }

    /// `return [value];`
    pub fn return_<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("return", f);
        let value = exprs(&children).first().map(|(e, _)| *e);
        let end = children_end(&children).unwrap_or(kw_end);
        let end = self.trailing(end, ";").unwrap_or(end);
        self.push_stmt(StmtKind::Return(value), start, end)
    }

    pub fn throw<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("throw", f);
        let value = nth_expr(&children, 0, "throw");
        let end = children_end(&children).unwrap_or(kw_end);
        let end = self.trailing(end, ";").unwrap_or(end);
        self.push_stmt(StmtKind::Throw(value), start, end)
    }

    /// `try { } catch ... finally { }`; `f` builds the body block, [`Self::catch`] clauses and an
    /// optional [`Self::finally`].
    pub fn try_<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("try", f);
        let body = nth_stmt(&children, 0, "try");
        let catches = children
            .iter()
            .filter_map(|(c, _)| match c {
                Child::Catch(clause) => Some(clause.clone()),
                _ => None,
            })
            .collect();
        let finally = children.iter().find_map(|(c, _)| match c {
            Child::Finally(s) => Some(*s),
            _ => None,
        });
        let end = children_end(&children).unwrap_or(kw_end);
        self.push_stmt(
            StmtKind::Try {
                body,
                catches,
                finally,
            },
            start,
            end,
        )
    }

    /// `catch (T e) { ... }`; the parameter is read from the header, `f` builds the block.
    pub fn catch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) {
        let (start, open, close) = self.paren_header("catch");
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, open + 1, close));
        let param = self.parse_var(&mut cur, open + 1, VarKind::CatchParameter, Vec::new());
        let window_end = self.window_end();
        let children = self.run_frame(Context::Code, close + 1, window_end, f);
        let body = nth_stmt(&children, 0, "catch");
        let end = children_end(&children).unwrap_or(close + 1);
        let r = range(start, end);
        self.attach(Child::Catch(CatchClause { param, body, range: r }), r);
    }

    pub fn finally<R>(&mut self, f: impl FnOnce(&mut Self) -> R) {
        let (start, kw_end, children) = self.keyword_stmt("finally", f);
        let body = nth_stmt(&children, 0, "finally");
        let end = children_end(&children).unwrap_or(kw_end);
        self.attach(Child::Finally(body), range(start, end));
    }

    pub fn synchronized<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> StmtId {
        let (start, kw_end, children) = self.keyword_stmt("synchronized", f);
        let lock = nth_expr(&children, 0, "synchronized");
        let body = nth_stmt(&children, 0, "synchronized");
        let end = children_end(&children).unwrap_or(kw_end);
        self.push_stmt(StmtKind::Synchronized { lock, body }, start, end)
    }

    pub fn empty(&mut self) -> StmtId {
        let start = self.locate(";");
        self.push_stmt(StmtKind::Empty, start, start + 1)
    }

    // ---- expressions -----------------------------------------------------------------------

    /// Locate the full spelling of an expression and build its operands inside it.
    fn expr_frame<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> (usize, usize, Vec<(Child, TextRange)>) {
        let start = self.locate(text);
        let end = start + text.len();
        let children = self.run_frame(Context::Code, start, end, f);
        (start, end, children)
    }

    fn leaf(&mut self, text: &str) -> (usize, usize) {
        let start = self.locate(text);
        (start, start + text.len())
    }

    /// Operator text between two operands.
    fn operator_between(&self, from: usize, to: usize) -> (String, TextRange) {
        let source = Rc::clone(&self.text);
        let tokens = scan::tokenize(&source, from, to);
        let op: String = tokens
            .iter()
            .filter(|t| t.text != "(" && t.text != ")")
            .map(|t| t.text)
            .collect();
        let start = tokens
            .iter()
            .find(|t| t.text != "(" && t.text != ")")
            .map_or(from, |t| t.start);
        let end = tokens
            .iter()
            .rev()
            .find(|t| t.text != "(" && t.text != ")")
            .map_or(to, |t| t.end);
        (op, range(start, end.max(start)))
    }

    pub fn lit(&mut self, text: &str) -> ExprId {
        let (start, end) = self.leaf(text);
        self.alloc_expr(ExprKind::Literal(scan::parse_literal(text)), start, end)
    }

    pub fn name(&mut self, text: &str) -> ExprId {
        let (start, end) = self.leaf(text);
        self.alloc_expr(
            ExprKind::Name {
                name: text.to_string(),
                resolution: Resolution::unresolved(),
            },
            start,
            end,
        )
    }

    pub fn this(&mut self) -> ExprId {
        let (start, end) = self.leaf("this");
        self.alloc_expr(ExprKind::This(None), start, end)
    }

    /// `Outer.this`
    pub fn this_qualified(&mut self, text: &str) -> ExprId {
        let (start, end) = self.leaf(text);
        let qualifier = self.qualifier_type(start, end);
        self.alloc_expr(ExprKind::This(qualifier), start, end)
    }

    pub fn super_(&mut self) -> ExprId {
        let (start, end) = self.leaf("super");
        self.alloc_expr(ExprKind::Super(None), start, end)
    }

    /// `Outer.super`
    pub fn super_qualified(&mut self, text: &str) -> ExprId {
        let (start, end) = self.leaf(text);
        let qualifier = self.qualifier_type(start, end);
        self.alloc_expr(ExprKind::Super(qualifier), start, end)
    }

    fn qualifier_type(&mut self, start: usize, end: usize) -> Option<TypeRefId> {
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        self.parse_type_base(&mut cur)
    }

    /// `T.class`
    pub fn class_lit(&mut self, text: &str) -> ExprId {
        let (start, end) = self.leaf(text);
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        let (ty, _) = self
            .parse_type(&mut cur)
            .unwrap_or_else(|| panic!("malformed class literal `{text}`"));
        self.alloc_expr(ExprKind::ClassLiteral(ty), start, end)
    }

    /// `qualifier.name`; `f` builds the qualifier.
    pub fn field_access<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let qualifier = nth_expr(&children, 0, "field_access");
        let source = Rc::clone(&self.text);
        let tokens = scan::tokenize(&source, start, end);
        let name = tokens
            .last()
            .filter(|t| t.kind == TokenKind::Ident)
            .copied()
            .unwrap_or_else(|| panic!("field access `{text}` must end in a name"));
        self.alloc_expr(
            ExprKind::FieldAccess {
                qualifier,
                name: name.text.to_string(),
                name_range: range(name.start, name.end),
                resolution: Resolution::unresolved(),
            },
            start,
            end,
        )
    }

    /// `[qualifier.]name(args)`, `this(args)` or `super(args)`; `f` builds the qualifier and the
    /// arguments in source order.
    pub fn call<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let close = end - 1;
        let open = scan::matching_open(&self.text, close)
            .filter(|open| *open >= start)
            .unwrap_or_else(|| panic!("call `{text}` must end with its argument list"));
        let source = Rc::clone(&self.text);
        let tokens = scan::tokenize(&source, start, open);
        let name = tokens
            .last()
            .filter(|t| t.kind == TokenKind::Ident)
            .copied()
            .unwrap_or_else(|| panic!("call `{text}` has no method name"));
        let operands = exprs(&children);
        let qualifier = operands
            .iter()
            .filter(|(_, r)| end_of(*r) <= name.start)
            .map(|(e, _)| *e)
            .last();
        let args: Vec<ExprId> = operands
            .iter()
            .filter(|(_, r)| start_of(*r) > open)
            .map(|(e, _)| *e)
            .collect();
        let arg_list_range = range(open, end);
        let kind = match name.text {
            "this" if qualifier.is_none() => ExprKind::ConstructorCall {
                kind: ConstructorCallKind::This,
                qualifier,
                args,
                arg_list_range,
            },
            "super" => ExprKind::ConstructorCall {
                kind: ConstructorCallKind::Super,
                qualifier,
                args,
                arg_list_range,
            },
            _ => ExprKind::MethodCall {
                qualifier,
                name: name.text.to_string(),
                name_range: range(name.start, name.end),
                args,
                arg_list_range,
            },
        };
        self.alloc_expr(kind, start, end)
    }

    /// `[outer.]new T(args) [{ body }]`; the type is read from the text, `f` builds the qualifier,
    /// the arguments and an optional [`Self::class_body`].
    pub fn new_object<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let start = self.locate(text);
        let end = start + text.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        let new_token = loop {
            match cur.bump() {
                Some(t) if t.text == "new" => break t,
                Some(_) => continue,
                None => panic!("`new` not found in `{text}`"),
            }
        };
        let class = self
            .parse_type_base(&mut cur)
            .unwrap_or_else(|| panic!("expected a type after `new` in `{text}`"));
        let open = cur
            .eat("(")
            .unwrap_or_else(|| panic!("expected arguments in `{text}`"));
        let close = scan::matching_close(&self.text, open.start).unwrap_or(end - 1);

        let children = self.run_frame(Context::Code, start, end, f);
        let operands = exprs(&children);
        let qualifier = operands
            .iter()
            .find(|(_, r)| end_of(*r) <= new_token.start)
            .map(|(e, _)| *e);
        let args = operands
            .iter()
            .filter(|(_, r)| start_of(*r) > open.start && end_of(*r) <= close)
            .map(|(e, _)| *e)
            .collect();
        let anonymous = children.iter().find_map(|(c, _)| match c {
            Child::Class(id) => Some(*id),
            _ => None,
        });
        if let Some(anonymous) = anonymous {
            self.file.classes[anonymous].anonymous_base = Some(class);
        }
        self.alloc_expr(
            ExprKind::New {
                qualifier,
                class,
                args,
                arg_list_range: range(open.start, close + 1),
                anonymous,
            },
            start,
            end,
        )
    }

    /// `new T[n][]` or `new T[] {...}`; `f` builds the dimension expressions and an optional
    /// [`Self::array_init`].
    pub fn new_array<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let start = self.locate(text);
        let end = start + text.len();
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start, end));
        cur.eat("new");
        let element = self
            .parse_type_base(&mut cur)
            .unwrap_or_else(|| panic!("expected an element type in `{text}`"));
        let mut extra_dims = 0;
        let mut dims_end = end_of(self.file.type_refs[element].range);
        while let Some(bracket) = cur.eat("[") {
            let close = scan::matching_close(&self.text, bracket.start).unwrap_or(end - 1);
            if scan::skip_trivia(&self.text, bracket.end) == close {
                extra_dims += 1;
            }
            dims_end = close + 1;
            cur.skip_to(close + 1);
        }

        let children = self.run_frame(Context::Code, start, end, f);
        let mut dims = Vec::new();
        let mut init = None;
        for (e, r) in exprs(&children) {
            if start_of(r) >= dims_end && matches!(self.file.exprs[e].kind, ExprKind::ArrayInit(_)) {
                init = Some(e);
            } else {
                dims.push(e);
            }
        }
        self.alloc_expr(
            ExprKind::NewArray {
                element,
                dims,
                extra_dims,
                init,
            },
            start,
            end,
        )
    }

    /// `{a, b}`
    pub fn array_init<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let elements = exprs(&children).into_iter().map(|(e, _)| e).collect();
        self.alloc_expr(ExprKind::ArrayInit(elements), start, end)
    }

    /// `target op= value`
    pub fn assign<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let operands = exprs(&children);
        let [(target, lhs), (value, rhs)] = operands[..] else {
            panic!("assignment `{text}` needs two operands");
        };
        let (op_text, op_range) = self.operator_between(end_of(lhs), start_of(rhs));
        let op = match op_text.strip_suffix('=') {
            Some("") | None => AssignOp(None),
            Some(binary) => AssignOp(BinaryOp::from_text(binary)),
        };
        self.alloc_expr(
            ExprKind::Assign {
                op,
                op_range,
                target,
                value,
            },
            start,
            end,
        )
    }

    pub fn binary<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let operands = exprs(&children);
        let [(lhs, lhs_range), (rhs, rhs_range)] = operands[..] else {
            panic!("binary expression `{text}` needs two operands");
        };
        let (op_text, op_range) = self.operator_between(end_of(lhs_range), start_of(rhs_range));
        let op = BinaryOp::from_text(&op_text)
            .unwrap_or_else(|| panic!("unknown binary operator `{op_text}`"));
        self.alloc_expr(
            ExprKind::Binary {
                op,
                op_range,
                lhs,
                rhs,
            },
            start,
            end,
        )
    }

    /// Prefix or postfix operator, told apart by the operand's position.
    pub fn unary<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let (operand, r) = exprs(&children)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("unary expression `{text}` needs an operand"));
        let prefix = start_of(r) > start;
        let (op_text, op_range) = if prefix {
            self.operator_between(start, start_of(r))
        } else {
            self.operator_between(end_of(r), end)
        };
        let op = match (op_text.as_str(), prefix) {
            ("++", true) => UnaryOp::PreInc,
            ("--", true) => UnaryOp::PreDec,
            ("++", false) => UnaryOp::PostInc,
            ("--", false) => UnaryOp::PostDec,
            ("+", _) => UnaryOp::Plus,
            ("-", _) => UnaryOp::Minus,
            ("~", _) => UnaryOp::BitNot,
            ("!", _) => UnaryOp::Not,
            (other, _) => panic!("unknown unary operator `{other}`"),
        };
        self.alloc_expr(
            ExprKind::Unary {
                op,
                op_range,
                operand,
            },
            start,
            end,
        )
    }

    /// `(T) expr`; the type is read from the text, `f` builds the operand.
    pub fn cast<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let start = self.locate(text);
        let end = start + text.len();
        let close = scan::matching_close(&self.text, start)
            .unwrap_or_else(|| panic!("cast `{text}` must start with `(`"));
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, start + 1, close));
        let (ty, _) = self
            .parse_type(&mut cur)
            .unwrap_or_else(|| panic!("expected a type in `{text}`"));
        let children = self.run_frame(Context::Code, close + 1, end, f);
        let expr = nth_expr(&children, 0, "cast");
        self.alloc_expr(ExprKind::Cast { ty, expr }, start, end)
    }

    /// `expr instanceof T`; `f` builds the operand.
    pub fn instance_of<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let (expr, r) = exprs(&children)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("instanceof `{text}` needs an operand"));
        let source = Rc::clone(&self.text);
        let mut cur = Cursor::new(scan::tokenize(&source, end_of(r), end));
        cur.eat("instanceof");
        let (ty, _) = self
            .parse_type(&mut cur)
            .unwrap_or_else(|| panic!("expected a type in `{text}`"));
        self.alloc_expr(ExprKind::InstanceOf { expr, ty }, start, end)
    }

    pub fn conditional<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let condition = nth_expr(&children, 0, "conditional");
        let then_expr = nth_expr(&children, 1, "conditional");
        let else_expr = nth_expr(&children, 2, "conditional");
        self.alloc_expr(
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            },
            start,
            end,
        )
    }

    /// `array[index]`
    pub fn index<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let array = nth_expr(&children, 0, "index");
        let index = nth_expr(&children, 1, "index");
        self.alloc_expr(ExprKind::ArrayAccess { array, index }, start, end)
    }

    pub fn paren<R>(&mut self, text: &str, f: impl FnOnce(&mut Self) -> R) -> ExprId {
        let (start, end, children) = self.expr_frame(text, f);
        let inner = nth_expr(&children, 0, "paren");
        self.alloc_expr(ExprKind::Paren(inner), start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ranges_point_at_the_source() {
        let mut store = TypeStore::with_minimal_jdk();
        let text = "class A {\n  int x = 1 + 2;\n}\n";
        let mut b = FileBuilder::new(&mut store, "A.java", text);
        let mut sum = None;
        b.class("class A", |b| {
            b.field("int x = 1 + 2", |b| {
                sum = Some(b.binary("1 + 2", |b| {
                    b.lit("1");
                    b.lit("2");
                }));
            });
        });
        let file = b.finish();
        let sum = sum.unwrap();
        assert_eq!(file.slice(file.exprs[sum].range), "1 + 2");
        let ExprKind::Binary { op, op_range, .. } = &file.exprs[sum].kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert_eq!(file.slice(*op_range), "+");
        let class = file.types[0];
        assert_eq!(file.slice(file.classes[class].range), "class A {\n  int x = 1 + 2;\n}");
    }

    #[test]
    fn identifiers_match_on_word_boundaries() {
        let mut store = TypeStore::with_minimal_jdk();
        let text = "class A { void f() { ab = a; } }";
        let mut b = FileBuilder::new(&mut store, "A.java", text);
        let mut name = None;
        b.class("class A", |b| {
            b.method("void f()", |b| {
                b.expr_stmt(|b| {
                    b.assign("ab = a", |b| {
                        b.name("ab");
                        name = Some(b.name("a"));
                    })
                });
            });
        });
        let file = b.finish();
        let range = file.exprs[name.unwrap()].range;
        assert_eq!(u32::from(range.start()), 26);
    }

    #[test]
    fn member_slots_follow_declaration_order() {
        let mut store = TypeStore::with_minimal_jdk();
        let text = "class A { A() {} void f() {} A(int x) {} void g() {} }";
        let mut b = FileBuilder::new(&mut store, "A.java", text);
        let mut ids = Vec::new();
        b.class("class A", |b| {
            ids.push(b.method("A()", |_| ()));
            ids.push(b.method("void f()", |_| ()));
            ids.push(b.method("A(int x)", |_| ()));
            ids.push(b.method("void g()", |_| ()));
        });
        let file = b.finish();
        let slots: Vec<MethodSlot> = ids.iter().map(|m| file.methods[*m].slot).collect();
        assert_eq!(
            slots,
            vec![
                MethodSlot::Constructor(0),
                MethodSlot::Method(0),
                MethodSlot::Constructor(1),
                MethodSlot::Method(1),
            ]
        );
    }

    #[test]
    fn annotations_attach_to_the_next_declaration() {
        let mut store = TypeStore::with_minimal_jdk();
        let text = "class A { @SuppressWarnings(\"x\") @Deprecated void f() {} }";
        let mut b = FileBuilder::new(&mut store, "A.java", text);
        let mut method = None;
        b.class("class A", |b| {
            b.annotation("@SuppressWarnings(\"x\")", |b| b.lit("\"x\""));
            method = Some(b.method("@Deprecated void f()", |_| ()));
        });
        let file = b.finish();
        let method = &file.methods[method.unwrap()];
        let names: Vec<&str> = method
            .modifiers
            .annotations
            .iter()
            .map(|a| file.annotations[*a].name.as_str())
            .collect();
        assert_eq!(names, vec!["SuppressWarnings", "Deprecated"]);
        assert_eq!(file.slice(method.range), "@SuppressWarnings(\"x\") @Deprecated void f() {}");
    }
}
