//! Generic-shape resolution: strips wrapper shapes off a declared type until
//! the payload type remains.

use serde::Serialize;

use crate::catalog::{GenericShape, Kind, TypeCatalog, TypeRef};
use crate::error::{GenerationError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    #[default]
    None,
    Array,
    Optional,
}

impl Modifier {
    pub fn suffix(self) -> &'static str {
        match self {
            Modifier::None => "",
            Modifier::Array => "[]",
            Modifier::Optional => "|null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPayload {
    pub payload: TypeRef,
    pub modifier: Modifier,
}

pub struct ShapeResolver<'a, C: TypeCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: TypeCatalog + ?Sized> ShapeResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Unwraps `ty` to a fixed point. Repeated array layers collapse into a
    /// single `Array` modifier; the most recent unwrap decides the modifier.
    ///
    /// Only the generic shape of `ty` is inspected, never its members.
    pub fn resolve(&self, ty: &TypeRef) -> Result<ResolvedPayload> {
        let mut current = ty.clone();
        let mut modifier = Modifier::None;

        loop {
            match self.catalog.kind(&current) {
                Ok(Kind::Array(element)) => {
                    modifier = Modifier::Array;
                    current = element;
                }
                Ok(Kind::Generic {
                    shape, mut args, ..
                }) => match shape {
                    GenericShape::Sequence => {
                        modifier = Modifier::Array;
                        current = args.remove(0);
                    }
                    GenericShape::Async | GenericShape::ActionResult => {
                        current = args.remove(0);
                    }
                    GenericShape::Optional if self.catalog.is_value_kind(&args[0])? => {
                        modifier = Modifier::Optional;
                        current = args.remove(0);
                    }
                    _ => {
                        return Err(GenerationError::UnsupportedGenericShape { ty: current });
                    }
                },
                // Named types are payloads whether or not the catalog knows
                // them; conversion reports unknown ones.
                Ok(_) | Err(GenerationError::UnknownType { .. }) => {
                    return Ok(ResolvedPayload {
                        payload: current,
                        modifier,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Element type of an array or sequence shape.
    pub fn sequence_element(&self, ty: &TypeRef) -> Option<TypeRef> {
        match ty {
            TypeRef::Array(element) => Some((**element).clone()),
            TypeRef::Generic { definition, args }
                if self.catalog.generic_shape(definition, args.len()) == GenericShape::Sequence =>
            {
                Some(args[0].clone())
            }
            _ => None,
        }
    }

    /// Argument of an optional shape over a value kind.
    pub fn optional_value(&self, ty: &TypeRef) -> Result<Option<TypeRef>> {
        match ty {
            TypeRef::Generic { definition, args }
                if self.catalog.generic_shape(definition, args.len()) == GenericShape::Optional =>
            {
                if self.catalog.is_value_kind(&args[0])? {
                    Ok(Some(args[0].clone()))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        well_known, Host, Primitive, StaticCatalog, TypeDefinition, TypeKind, TypePath,
    };

    fn model() -> TypeRef {
        TypeRef::named(TypePath::parse("shop::Product"))
    }

    fn sample_catalog(host: Host) -> StaticCatalog {
        let mut catalog = StaticCatalog::new(host);
        catalog.insert(TypeDefinition::new(TypePath::parse("shop::Product"), TypeKind::Class));
        catalog.insert(TypeDefinition::new(TypePath::parse("shop::Point"), TypeKind::Struct));
        catalog
    }

    fn vec_of(ty: TypeRef) -> TypeRef {
        TypeRef::generic(well_known::vec(), vec![ty])
    }

    fn option_of(ty: TypeRef) -> TypeRef {
        TypeRef::generic(well_known::option(), vec![ty])
    }

    #[test]
    fn test_plain_type_is_its_own_payload() {
        let catalog = sample_catalog(Host::Managed);
        let resolved = ShapeResolver::new(&catalog).resolve(&model()).unwrap();
        assert_eq!(resolved.payload, model());
        assert_eq!(resolved.modifier, Modifier::None);
    }

    #[test]
    fn test_async_action_result_sequence_chain() {
        let catalog = sample_catalog(Host::Managed);
        let ty = TypeRef::future(TypeRef::generic(
            well_known::axum_json(),
            vec![vec_of(model())],
        ));
        let resolved = ShapeResolver::new(&catalog).resolve(&ty).unwrap();
        assert_eq!(resolved.payload, model());
        assert_eq!(resolved.modifier, Modifier::Array);
    }

    #[test]
    fn test_repeated_arrays_collapse_to_one_modifier() {
        let catalog = sample_catalog(Host::Managed);
        let resolver = ShapeResolver::new(&catalog);
        let once = resolver.resolve(&TypeRef::array(model())).unwrap();
        let twice = resolver
            .resolve(&TypeRef::array(TypeRef::array(model())))
            .unwrap();
        let mixed = resolver.resolve(&vec_of(TypeRef::array(model()))).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, mixed);
        assert_eq!(twice.modifier, Modifier::Array);
    }

    #[test]
    fn test_optional_over_value_kind() {
        let catalog = sample_catalog(Host::Managed);
        let resolver = ShapeResolver::new(&catalog);
        let resolved = resolver
            .resolve(&option_of(Primitive::I32.into()))
            .unwrap();
        assert_eq!(resolved.payload, TypeRef::Primitive(Primitive::I32));
        assert_eq!(resolved.modifier, Modifier::Optional);

        let point = TypeRef::named(TypePath::parse("shop::Point"));
        let resolved = resolver.resolve(&option_of(point.clone())).unwrap();
        assert_eq!(resolved.payload, point);
    }

    #[test]
    fn test_optional_over_reference_kind_is_unsupported() {
        let catalog = sample_catalog(Host::Managed);
        let resolver = ShapeResolver::new(&catalog);
        assert!(matches!(
            resolver.resolve(&option_of(model())),
            Err(GenerationError::UnsupportedGenericShape { .. })
        ));

        let rust = sample_catalog(Host::Rust);
        let resolved = ShapeResolver::new(&rust)
            .resolve(&option_of(model()))
            .unwrap();
        assert_eq!(resolved.modifier, Modifier::Optional);
    }

    #[test]
    fn test_unrecognized_generics_fail() {
        let catalog = sample_catalog(Host::Managed);
        let resolver = ShapeResolver::new(&catalog);
        let result_ty = TypeRef::generic(well_known::result(), vec![model(), Primitive::String.into()]);
        match resolver.resolve(&TypeRef::future(result_ty.clone())) {
            Err(GenerationError::UnsupportedGenericShape { ty }) => assert_eq!(ty, result_ty),
            other => panic!("expected UnsupportedGenericShape, got {:?}", other),
        }

        let map = TypeRef::generic(
            well_known::hash_map(),
            vec![Primitive::String.into(), model()],
        );
        assert!(resolver.resolve(&map).is_err());
    }

    #[test]
    fn test_last_unwrap_decides_modifier() {
        let catalog = sample_catalog(Host::Managed);
        let resolved = ShapeResolver::new(&catalog)
            .resolve(&vec_of(option_of(Primitive::F64.into())))
            .unwrap();
        assert_eq!(resolved.payload, TypeRef::Primitive(Primitive::F64));
        assert_eq!(resolved.modifier, Modifier::Optional);
    }
}
