//! Link-time registry of the types declared with `#[derive(ApiType)]` and
//! `#[controller]`.

use tracing::warn;

use crate::catalog::{Host, StaticCatalog, TypeDefinition};

/// Submitted once per registered type by the derive and attribute macros.
pub struct ApiTypeMetadata {
    pub describe: fn() -> TypeDefinition,
}

inventory::collect!(ApiTypeMetadata);

/// Every type registered in the running binary.
pub fn inventory_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::new(Host::Rust);
    for metadata in inventory::iter::<ApiTypeMetadata> {
        let definition = (metadata.describe)();
        let path = definition.path.clone();
        if catalog.insert(definition).is_some() {
            warn!(%path, "type registered more than once, keeping the last registration");
        }
    }
    catalog
}
