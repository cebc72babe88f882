//! Generator configuration.
//!
//! Read from a standalone TOML file or from the
//! `[package.metadata.dts_forge]` table of a service's `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.dts_forge]
//! ts_output_dir = "frontend/src/generated/types/"
//! exclude = ["chrono::DateTime"]
//!
//! [package.metadata.dts_forge.primitives]
//! i64 = "string"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::catalog::{Primitive, ShapeTable, TypePath, TypeRef};
use crate::error::{GenerationError, Result};

pub const DEFAULT_FILE_SUFFIX: &str = ".d.ts";
pub const DEFAULT_OUTPUT_DIR: &str = "generated/ts";

/// Host primitive -> declaration primitive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimitiveMap {
    overrides: BTreeMap<Primitive, String>,
}

impl PrimitiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, primitive: Primitive, target: impl Into<String>) -> Self {
        self.overrides.insert(primitive, target.into());
        self
    }

    pub fn target(&self, primitive: Primitive) -> &str {
        self.overrides
            .get(&primitive)
            .map(String::as_str)
            .unwrap_or_else(|| primitive.default_target())
    }
}

/// Types that never get a declaration file of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedTypes {
    types: BTreeSet<TypeRef>,
}

impl Default for ExcludedTypes {
    fn default() -> Self {
        Self {
            types: [
                Primitive::Object,
                Primitive::String,
                Primitive::Decimal,
                Primitive::Void,
            ]
            .into_iter()
            .map(TypeRef::Primitive)
            .collect(),
        }
    }
}

impl ExcludedTypes {
    pub fn empty() -> Self {
        Self {
            types: BTreeSet::new(),
        }
    }

    pub fn with(mut self, ty: TypeRef) -> Self {
        self.types.insert(ty);
        self
    }

    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.types.contains(ty)
    }
}

fn default_controller_markers() -> Vec<String> {
    vec!["controller".to_string()]
}

fn default_action_markers() -> Vec<String> {
    ["http_get", "http_post", "http_put", "http_delete", "http_patch"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Output root, relative to the manifest or config file it came from.
    pub ts_output_dir: Option<PathBuf>,
    pub file_suffix: String,
    /// Overrides of the primitive map, keyed by primitive name (`i64`, `decimal`, ...).
    pub primitives: BTreeMap<String, String>,
    /// Qualified names (or primitive names) added to the exclusion set.
    pub exclude: Vec<String>,
    /// Generic definitions layered over the catalog's shape table.
    pub shapes: ShapeTable,
    pub controller_markers: Vec<String>,
    pub action_markers: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ts_output_dir: None,
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            primitives: BTreeMap::new(),
            exclude: Vec::new(),
            shapes: ShapeTable::default(),
            controller_markers: default_controller_markers(),
            action_markers: default_action_markers(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| GenerationError::Config(e.to_string()))
    }

    /// Loads a standalone config file. A relative `ts_output_dir` is resolved
    /// against the file's directory.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let source =
            fs::read_to_string(path).map_err(|e| GenerationError::filesystem(path, e))?;
        let config = Self::from_toml_str(&source)?;
        Ok(config.anchored_at(path.parent()))
    }

    /// Reads `[package.metadata.dts_forge]` from a `Cargo.toml`. Returns
    /// `None` when the manifest has no such table.
    pub fn from_cargo_manifest(manifest_path: &Path) -> Result<Option<Self>> {
        let source = fs::read_to_string(manifest_path)
            .map_err(|e| GenerationError::filesystem(manifest_path, e))?;
        let manifest: Value =
            toml::from_str(&source).map_err(|e| GenerationError::Config(e.to_string()))?;
        let Some(table) = manifest
            .get("package")
            .and_then(|package| package.get("metadata"))
            .and_then(|metadata| metadata.get("dts_forge"))
        else {
            return Ok(None);
        };
        let config: Self = table
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| GenerationError::Config(e.to_string()))?;
        Ok(Some(config.anchored_at(manifest_path.parent())))
    }

    fn anchored_at(mut self, base: Option<&Path>) -> Self {
        if let (Some(dir), Some(base)) = (self.ts_output_dir.as_ref(), base) {
            if dir.is_relative() {
                self.ts_output_dir = Some(base.join(dir));
            }
        }
        self
    }

    pub fn output_dir_or_default(&self) -> PathBuf {
        self.ts_output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn primitive_map(&self) -> Result<PrimitiveMap> {
        let mut map = PrimitiveMap::new();
        for (name, target) in &self.primitives {
            let primitive = Primitive::from_name(name).ok_or_else(|| {
                GenerationError::Config(format!("unknown primitive `{}` in primitives table", name))
            })?;
            map = map.with_override(primitive, target.clone());
        }
        Ok(map)
    }

    pub fn excluded_types(&self) -> ExcludedTypes {
        self.exclude
            .iter()
            .fold(ExcludedTypes::default(), |excluded, name| {
                let ty = match Primitive::from_name(name) {
                    Some(primitive) => TypeRef::Primitive(primitive),
                    None => TypeRef::Named(TypePath::parse(name)),
                };
                excluded.with(ty)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GenericShape;

    #[test]
    fn test_default_primitive_targets() {
        let map = PrimitiveMap::new();
        assert_eq!(map.target(Primitive::I32), "number");
        assert_eq!(map.target(Primitive::Decimal), "number");
        assert_eq!(map.target(Primitive::Char), "string");
        assert_eq!(map.target(Primitive::Bool), "boolean");
        assert_eq!(map.target(Primitive::Object), "any");
        assert_eq!(map.target(Primitive::Void), "void");
    }

    #[test]
    fn test_toml_overrides() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            ts_output_dir = "client/models"
            exclude = ["chrono::DateTime"]

            [primitives]
            i64 = "string"

            [shapes]
            "app::Page" = "sequence"
            "#,
        )
        .unwrap();

        assert_eq!(config.file_suffix, ".d.ts");
        assert_eq!(config.primitive_map().unwrap().target(Primitive::I64), "string");
        assert!(config
            .excluded_types()
            .contains(&TypeRef::Named(TypePath::parse("chrono::DateTime"))));
        assert!(config.excluded_types().contains(&TypeRef::Primitive(Primitive::String)));
        assert_eq!(
            config.shapes.lookup(&TypePath::parse("app::Page"), 1),
            GenericShape::Sequence
        );
    }

    #[test]
    fn test_unknown_primitive_is_a_config_error() {
        let config = GeneratorConfig::from_toml_str("[primitives]\nint = \"number\"\n").unwrap();
        assert!(matches!(config.primitive_map(), Err(GenerationError::Config(_))));
    }

    #[test]
    fn test_cargo_manifest_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(
            &manifest,
            r#"
[package]
name = "shop"
version = "0.1.0"

[package.metadata.dts_forge]
ts_output_dir = "frontend/src/generated/types/"
"#,
        )
        .unwrap();

        let config = GeneratorConfig::from_cargo_manifest(&manifest).unwrap().unwrap();
        assert_eq!(
            config.output_dir_or_default(),
            dir.path().join("frontend/src/generated/types/")
        );
    }

    #[test]
    fn test_cargo_manifest_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        fs::write(&manifest, "[package]\nname = \"shop\"\nversion = \"0.1.0\"\n").unwrap();
        assert!(GeneratorConfig::from_cargo_manifest(&manifest).unwrap().is_none());
    }
}
