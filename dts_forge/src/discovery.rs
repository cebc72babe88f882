//! Entry-point discovery: finds the model types reachable from the
//! signatures of exposed API actions.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{MethodInfo, TypeCatalog, TypeDefinition, TypeKind, TypePath, TypeRef, Visibility};
use crate::config::{ExcludedTypes, GeneratorConfig};
use crate::error::Result;
use crate::resolver::ShapeResolver;

/// One exposed API action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSignature {
    pub controller: TypePath,
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<TypeRef>,
}

impl ActionSignature {
    /// Return type first, then parameters in declaration order.
    pub fn declared_types(&self) -> impl Iterator<Item = &TypeRef> {
        std::iter::once(&self.return_type).chain(self.params.iter())
    }
}

/// Decides which types are controllers and which methods are exposed actions.
pub trait EndpointClassifier {
    fn is_controller(&self, definition: &TypeDefinition) -> bool;
    fn is_action(&self, method: &MethodInfo) -> bool;
}

/// Classifies by declared capabilities and method markers.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    controller_markers: BTreeSet<String>,
    action_markers: BTreeSet<String>,
}

impl MarkerClassifier {
    pub fn new<I, J>(controller_markers: I, action_markers: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            controller_markers: controller_markers.into_iter().map(Into::into).collect(),
            action_markers: action_markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.controller_markers.iter().cloned(),
            config.action_markers.iter().cloned(),
        )
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

impl EndpointClassifier for MarkerClassifier {
    fn is_controller(&self, definition: &TypeDefinition) -> bool {
        definition.kind == TypeKind::Class
            && !definition.is_abstract
            && definition
                .capabilities
                .iter()
                .any(|capability| self.controller_markers.contains(capability))
    }

    fn is_action(&self, method: &MethodInfo) -> bool {
        method.visibility == Visibility::Public
            && method
                .markers
                .iter()
                .any(|marker| self.action_markers.contains(marker))
    }
}

pub fn discover_actions<C>(catalog: &C, classifier: &dyn EndpointClassifier) -> Vec<ActionSignature>
where
    C: TypeCatalog + ?Sized,
{
    catalog
        .definitions()
        .filter(|definition| classifier.is_controller(definition))
        .flat_map(|controller| {
            controller
                .methods
                .iter()
                .filter(|method| classifier.is_action(method))
                .map(move |method| ActionSignature {
                    controller: controller.path.clone(),
                    name: method.name.clone(),
                    return_type: method.return_type.clone(),
                    params: method.params.clone(),
                })
        })
        .collect()
}

/// The de-duplicated payload types of every exposed action, sorted by
/// namespace then name.
///
/// An action type with an unsupported generic shape aborts discovery.
pub fn discover_entry_types<C>(
    catalog: &C,
    classifier: &dyn EndpointClassifier,
    excluded: &ExcludedTypes,
) -> Result<Vec<TypeRef>>
where
    C: TypeCatalog + ?Sized,
{
    let resolver = ShapeResolver::new(catalog);
    let mut entries = Vec::new();

    for action in discover_actions(catalog, classifier) {
        debug!(controller = %action.controller, action = %action.name, "scanning action");
        for declared in action.declared_types() {
            let payload = resolver.resolve(declared)?.payload;
            if payload.is_builtin_primitive() || excluded.contains(&payload) {
                continue;
            }
            entries.push(payload);
        }
    }

    entries.sort_by(|a, b| {
        (a.namespace(), a.simple_name())
            .cmp(&(b.namespace(), b.simple_name()))
            .then_with(|| a.cmp(b))
    });
    entries.dedup();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{well_known, Primitive, StaticCatalog};
    use crate::error::GenerationError;

    fn path(qualified: &str) -> TypePath {
        TypePath::parse(qualified)
    }

    fn named(qualified: &str) -> TypeRef {
        TypeRef::named(path(qualified))
    }

    fn get(name: &str) -> MethodInfo {
        MethodInfo::new(name, Visibility::Public).marker("http_get")
    }

    fn shop_catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::default();
        for model in ["shop::models::Product", "shop::models::Filter", "shop::auth::Session"] {
            catalog.insert(TypeDefinition::new(path(model), TypeKind::Class));
        }
        catalog.insert(
            TypeDefinition::new(path("shop::ProductController"), TypeKind::Class)
                .capability("controller")
                .method(
                    get("list")
                        .returns(TypeRef::future(TypeRef::generic(
                            well_known::vec(),
                            vec![named("shop::models::Product")],
                        )))
                        .param(named("shop::models::Filter")),
                )
                .method(
                    get("find")
                        .returns(named("shop::models::Product"))
                        .param(Primitive::I32.into()),
                )
                .method(
                    MethodInfo::new("helper", Visibility::Public)
                        .returns(named("shop::auth::Session")),
                )
                .method(
                    MethodInfo::new("hidden", Visibility::Private)
                        .marker("http_get")
                        .returns(named("shop::auth::Session")),
                ),
        );
        catalog
    }

    #[test]
    fn test_only_marked_public_methods_are_actions() {
        let catalog = shop_catalog();
        let actions = discover_actions(&catalog, &MarkerClassifier::default());
        let names: Vec<_> = actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["list", "find"]);
    }

    #[test]
    fn test_entry_types_are_deduplicated_and_sorted() {
        let catalog = shop_catalog();
        let entries =
            discover_entry_types(&catalog, &MarkerClassifier::default(), &ExcludedTypes::default())
                .unwrap();
        assert_eq!(
            entries,
            vec![named("shop::models::Filter"), named("shop::models::Product")]
        );
    }

    #[test]
    fn test_abstract_and_unmarked_types_are_not_controllers() {
        let mut catalog = StaticCatalog::default();
        catalog.insert(TypeDefinition::new(path("app::Model"), TypeKind::Class));
        catalog.insert(
            TypeDefinition::new(path("app::BaseController"), TypeKind::Class)
                .capability("controller")
                .abstract_type()
                .method(get("list").returns(named("app::Model"))),
        );
        catalog.insert(
            TypeDefinition::new(path("app::Plain"), TypeKind::Class)
                .method(get("list").returns(named("app::Model"))),
        );
        assert!(discover_actions(&catalog, &MarkerClassifier::default()).is_empty());
    }

    #[test]
    fn test_opaque_types_are_excluded() {
        let mut catalog = StaticCatalog::default();
        catalog.insert(
            TypeDefinition::new(path("app::TextController"), TypeKind::Class)
                .capability("controller")
                .method(
                    get("echo")
                        .returns(Primitive::String.into())
                        .param(Primitive::Object.into())
                        .param(Primitive::Decimal.into()),
                )
                .method(get("ping").returns(Primitive::Void.into())),
        );
        let entries =
            discover_entry_types(&catalog, &MarkerClassifier::default(), &ExcludedTypes::default())
                .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unsupported_action_shape_aborts() {
        let mut catalog = shop_catalog();
        catalog.insert(
            TypeDefinition::new(path("shop::BrokenController"), TypeKind::Class)
                .capability("controller")
                .method(get("broken").returns(TypeRef::generic(
                    well_known::result(),
                    vec![named("shop::models::Product"), Primitive::String.into()],
                ))),
        );
        let result =
            discover_entry_types(&catalog, &MarkerClassifier::default(), &ExcludedTypes::default());
        assert!(matches!(
            result,
            Err(GenerationError::UnsupportedGenericShape { .. })
        ));
    }

    #[test]
    fn test_custom_markers() {
        let mut catalog = StaticCatalog::default();
        catalog.insert(TypeDefinition::new(path("app::Model"), TypeKind::Class));
        catalog.insert(
            TypeDefinition::new(path("app::Rpc"), TypeKind::Class)
                .capability("ControllerBase")
                .method(
                    MethodInfo::new("call", Visibility::Public)
                        .marker("HttpPost")
                        .returns(named("app::Model")),
                ),
        );
        let classifier = MarkerClassifier::new(["ControllerBase"], ["HttpGet", "HttpPost"]);
        let actions = discover_actions(&catalog, &classifier);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].controller, path("app::Rpc"));
    }
}
