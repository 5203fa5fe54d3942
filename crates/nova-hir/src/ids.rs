use std::fmt;

macro_rules! define_ids {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl $name {
                pub(crate) fn from_raw(raw: u32) -> Self {
                    $name(raw)
                }

                #[must_use]
                pub fn idx(self) -> usize {
                    self.0 as usize
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }

            impl<T> std::ops::Index<$name> for Arena<T> {
                type Output = T;

                fn index(&self, index: $name) -> &Self::Output {
                    &self.data[index.idx()]
                }
            }

            impl<T> std::ops::IndexMut<$name> for Arena<T> {
                fn index_mut(&mut self, index: $name) -> &mut Self::Output {
                    &mut self.data[index.idx()]
                }
            }
        )*
    };
}

define_ids!(
    ClassDeclId,
    MethodDeclId,
    VarId,
    InitializerId,
    EnumConstantId,
    TypeParamId,
    TypeRefId,
    AnnotationId,
    ImportId,
    StmtId,
    ExprId,
);

#[derive(Debug, Clone, PartialEq)]
pub struct Arena<T> {
    data: Vec<T>,
}

impl<T> Arena<T> {
    pub fn alloc(&mut self, value: T) -> u32 {
        let idx = self.data.len() as u32;
        self.data.push(value);
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (i as u32, v))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { data: Vec::new() }
    }
}
