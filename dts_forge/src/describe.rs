//! Maps Rust types onto [`TypeRef`] expressions.
//!
//! `#[derive(ApiType)]` implements [`Describe`] for model types; the impls
//! below cover the std types that appear in their fields and in controller
//! signatures.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::catalog::{well_known, Primitive, TypePath, TypeRef};

pub trait Describe {
    fn type_ref() -> TypeRef;
}

macro_rules! describe_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Primitive(Primitive::$primitive)
                }
            }
        )*
    };
}

describe_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    str => String,
    () => Void,
    serde_json::Value => Object,
}

// Smart pointers and references are invisible on the wire.
impl<T: Describe + ?Sized> Describe for &T {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe> Describe for [T] {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }
}

macro_rules! describe_generic {
    ($($ty:ident<$($param:ident),+> => $path:ident),* $(,)?) => {
        $(
            impl<$($param: Describe),+> Describe for $ty<$($param),+> {
                fn type_ref() -> TypeRef {
                    TypeRef::generic(well_known::$path(), vec![$($param::type_ref()),+])
                }
            }
        )*
    };
}

describe_generic! {
    Vec<T> => vec,
    VecDeque<T> => vec_deque,
    HashSet<T> => hash_set,
    BTreeSet<T> => btree_set,
    Option<T> => option,
    HashMap<K, V> => hash_map,
    BTreeMap<K, V> => btree_map,
}

// The error side rarely implements `Describe`; it is recorded by name only.
// Either way the two-argument shape is unsupported for generation.
impl<T: Describe, E> Describe for Result<T, E> {
    fn type_ref() -> TypeRef {
        let error = TypePath::parse(std::any::type_name::<E>());
        TypeRef::generic(well_known::result(), vec![T::type_ref(), TypeRef::named(error)])
    }
}

#[cfg(feature = "axum")]
mod axum_impls {
    use super::*;

    impl<T: Describe> Describe for axum::Json<T> {
        fn type_ref() -> TypeRef {
            TypeRef::generic(well_known::axum_json(), vec![T::type_ref()])
        }
    }

    impl<T: Describe> Describe for axum::extract::Query<T> {
        fn type_ref() -> TypeRef {
            TypeRef::generic(well_known::axum_query(), vec![T::type_ref()])
        }
    }

    impl<T: Describe> Describe for axum::extract::Path<T> {
        fn type_ref() -> TypeRef {
            TypeRef::generic(well_known::axum_path(), vec![T::type_ref()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_and_text() {
        assert_eq!(u64::type_ref(), TypeRef::Primitive(Primitive::U64));
        assert_eq!(<&str>::type_ref(), TypeRef::Primitive(Primitive::String));
        assert_eq!(<()>::type_ref(), TypeRef::Primitive(Primitive::Void));
        assert_eq!(serde_json::Value::type_ref(), TypeRef::Primitive(Primitive::Object));
    }

    #[test]
    fn test_pointers_are_transparent() {
        assert_eq!(<Box<i32>>::type_ref(), i32::type_ref());
        assert_eq!(<Arc<str>>::type_ref(), String::type_ref());
        assert_eq!(<Rc<Vec<u8>>>::type_ref(), <Vec<u8>>::type_ref());
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            <Vec<bool>>::type_ref(),
            TypeRef::generic(well_known::vec(), vec![Primitive::Bool.into()])
        );
        assert_eq!(<[f32; 3]>::type_ref(), TypeRef::array(Primitive::F32.into()));
        assert_eq!(
            <HashMap<String, i64>>::type_ref(),
            TypeRef::generic(
                well_known::hash_map(),
                vec![Primitive::String.into(), Primitive::I64.into()]
            )
        );
        assert_eq!(
            <Option<u8>>::type_ref(),
            TypeRef::generic(well_known::option(), vec![Primitive::U8.into()])
        );
    }
}
