//! # dts_forge - TypeScript declarations from Rust API types
//!
//! `dts_forge` walks the types exchanged by an HTTP API and writes one
//! `.d.ts` declaration file per payload type, so a front end and a service
//! share a single source of truth for their request/response shapes.
//!
//! ## Core Features:
//!
//! - **`#[derive(ApiType)]`**: registers a struct or fieldless enum with the
//!   link-time type registry.
//!
//! - **`#[controller]`**: registers an `impl` block whose `#[action(..)]`
//!   methods are the exposed API actions.
//!
//! - **`Generator`**: runs Discover → Resolve → Convert → Wipe → Emit over
//!   any [`TypeCatalog`], either the registry or a JSON type description.
//!
//! ```ignore
//! use dts_forge::{controller, ApiType};
//!
//! #[derive(ApiType)]
//! pub struct Product {
//!     pub id: u64,
//!     pub tags: Vec<String>,
//! }
//!
//! pub struct ProductController;
//!
//! #[controller]
//! impl ProductController {
//!     #[action(GET)]
//!     pub async fn list() -> Vec<Product> { todo!() }
//! }
//!
//! dts_forge::generate("frontend/src/generated/types")?;
//! ```

// Lets the derive output's `::dts_forge::` paths resolve inside this crate's
// own tests.
extern crate self as dts_forge;

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod converter;
pub mod describe;
pub mod discovery;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod registry;
pub mod resolver;

use std::path::Path;

pub use catalog::{
    GenericShape, Host, Kind, MemberInfo, MethodInfo, Primitive, ShapeTable, StaticCatalog,
    TypeCatalog, TypeDefinition, TypeKind, TypePath, TypeRef, Visibility,
};
pub use config::{ExcludedTypes, GeneratorConfig, PrimitiveMap};
pub use converter::{Declaration, DeclarationConverter};
pub use describe::Describe;
pub use discovery::{ActionSignature, EndpointClassifier, MarkerClassifier};
pub use emitter::{DeclarationEmitter, Drift};
pub use error::{GenerationError, Result};
pub use generator::{GenerationReport, Generator};
pub use resolver::{Modifier, ResolvedPayload, ShapeResolver};

#[doc(hidden)]
pub use inventory;

#[cfg(feature = "macros")]
pub use dts_forge_macros::{controller, ApiType};

/// Regenerates `output_root` from every type registered in this binary,
/// using the default configuration.
pub fn generate(output_root: impl AsRef<Path>) -> Result<()> {
    Generator::new(registry::inventory_catalog()).generate(output_root)?;
    Ok(())
}
