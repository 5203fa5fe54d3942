//! The program model queried by the rules.
//!
//! Per-node facts (expression types, name resolutions, resolved type references) live on the
//! [`JavaFile`] itself; this module covers what a single file cannot answer: the shared type
//! environment, per-file language levels, which files declare a top-level class, and cooperative
//! cancellation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nova_core::JavaLanguageLevel;
use nova_hir::JavaFile;
use nova_types::{TypeEnv, TypeStore};

pub trait ProgramModel {
    fn env(&self) -> &dyn TypeEnv;

    /// Language level of `file`; `None` falls back to the configured default.
    fn language_level(&self, file: &JavaFile) -> Option<JavaLanguageLevel>;

    /// Names of the files declaring the top-level class `qualified_name`, in registration order.
    fn declaring_files(&self, qualified_name: &str) -> Vec<String>;

    /// Polled while iterating large collections; a `true` aborts the pass.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// In-memory program: a type store plus the files registered with it.
pub struct Program<'s> {
    store: &'s TypeStore,
    default_level: Option<JavaLanguageLevel>,
    file_levels: HashMap<String, JavaLanguageLevel>,
    declarations: BTreeMap<String, Vec<String>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'s> Program<'s> {
    pub fn new(store: &'s TypeStore) -> Self {
        Self {
            store,
            default_level: None,
            file_levels: HashMap::new(),
            declarations: BTreeMap::new(),
            cancel: None,
        }
    }

    pub fn with_language_level(mut self, level: JavaLanguageLevel) -> Self {
        self.default_level = Some(level);
        self
    }

    pub fn set_file_language_level(&mut self, file_name: impl Into<String>, level: JavaLanguageLevel) {
        self.file_levels.insert(file_name.into(), level);
    }

    /// Share a flag that aborts running passes when set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Register the top-level classes of `file`.
    pub fn add_file(&mut self, file: &JavaFile) {
        for class in &file.types {
            let decl = &file.classes[*class];
            let qualified = match file.package_name() {
                "" => decl.name.clone(),
                package => format!("{package}.{}", decl.name),
            };
            let files = self.declarations.entry(qualified).or_default();
            if !files.contains(&file.file_name) {
                files.push(file.file_name.clone());
            }
        }
    }
}

impl ProgramModel for Program<'_> {
    fn env(&self) -> &dyn TypeEnv {
        self.store
    }

    fn language_level(&self, file: &JavaFile) -> Option<JavaLanguageLevel> {
        self.file_levels
            .get(&file.file_name)
            .copied()
            .or(self.default_level)
    }

    fn declaring_files(&self, qualified_name: &str) -> Vec<String> {
        self.declarations
            .get(qualified_name)
            .cloned()
            .unwrap_or_default()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_hir::FileBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn files_are_indexed_by_qualified_name() {
        let mut store = TypeStore::with_minimal_jdk();
        let text = "package p; class A {} class B {}";
        let mut b = FileBuilder::new(&mut store, "p/A.java", text);
        b.package("package p");
        b.class("class A", |_| ());
        b.class("class B", |_| ());
        let file = b.finish();

        let mut program = Program::new(&store);
        program.add_file(&file);
        program.add_file(&file);
        assert_eq!(program.declaring_files("p.A"), vec!["p/A.java".to_string()]);
        assert_eq!(program.declaring_files("p.C"), Vec::<String>::new());
        assert_eq!(program.language_level(&file), None);

        program.set_file_language_level("p/A.java", JavaLanguageLevel::Jdk1_4);
        assert_eq!(program.language_level(&file), Some(JavaLanguageLevel::Jdk1_4));
    }

    #[test]
    fn cancellation_flag_is_shared() {
        let store = TypeStore::with_minimal_jdk();
        let flag = Arc::new(AtomicBool::new(false));
        let program = Program::new(&store).with_cancellation(Arc::clone(&flag));
        assert!(!program.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(program.is_cancelled());
    }
}
