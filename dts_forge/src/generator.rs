//! The generation pipeline: Discover → Resolve-all → Convert-all →
//! Wipe-output → Emit-all.
//!
//! Every step that can fail on the type graph runs before the output root is
//! touched, so a failed run leaves the previous output in place.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{
    GenericShape, Host, ShapeTable, TypeCatalog, TypeDefinition, TypePath, TypeRef,
};
use crate::config::GeneratorConfig;
use crate::converter::{Declaration, DeclarationConverter};
use crate::discovery::{discover_entry_types, EndpointClassifier, MarkerClassifier};
use crate::emitter::{DeclarationEmitter, Drift};
use crate::error::Result;

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub entry_types: Vec<TypeRef>,
    /// Absolute paths of the written files.
    pub files: Vec<PathBuf>,
}

/// A catalog with the configured shape overrides layered on top.
struct ShapeOverlay<'a, C: TypeCatalog + ?Sized> {
    inner: &'a C,
    shapes: &'a ShapeTable,
}

impl<C: TypeCatalog + ?Sized> TypeCatalog for ShapeOverlay<'_, C> {
    fn host(&self) -> Host {
        self.inner.host()
    }

    fn definitions(&self) -> Box<dyn Iterator<Item = &TypeDefinition> + '_> {
        self.inner.definitions()
    }

    fn definition(&self, path: &TypePath) -> Option<&TypeDefinition> {
        self.inner.definition(path)
    }

    fn generic_shape(&self, definition: &TypePath, arity: usize) -> GenericShape {
        match self.shapes.get(definition) {
            Some(_) => self.shapes.lookup(definition, arity),
            None => self.inner.generic_shape(definition, arity),
        }
    }
}

pub struct Generator<C: TypeCatalog> {
    catalog: C,
    config: GeneratorConfig,
    classifier: Option<Box<dyn EndpointClassifier>>,
}

impl<C: TypeCatalog> Generator<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            config: GeneratorConfig::default(),
            classifier: None,
        }
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the marker classifier built from the config.
    pub fn classifier(mut self, classifier: impl EndpointClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Discovers and converts every entry type, plus the member types they
    /// reference, without touching the disk. Sorted by namespace then name.
    pub fn plan(&self) -> Result<Vec<Declaration>> {
        let catalog = ShapeOverlay {
            inner: &self.catalog,
            shapes: &self.config.shapes,
        };
        let default_classifier;
        let classifier: &dyn EndpointClassifier = match &self.classifier {
            Some(classifier) => classifier.as_ref(),
            None => {
                default_classifier = MarkerClassifier::from_config(&self.config);
                &default_classifier
            }
        };

        let excluded = self.config.excluded_types();
        let entry_types = discover_entry_types(&catalog, classifier, &excluded)?;
        info!(count = entry_types.len(), "discovered entry types");

        // A nested type is always emitted through its outermost declaring
        // type, whether an action names it or only a member does.
        let declaring: HashMap<TypeRef, TypeRef> = catalog
            .definitions()
            .flat_map(|definition| {
                definition
                    .nested
                    .iter()
                    .map(move |nested| (nested.clone(), definition.type_ref()))
            })
            .collect();
        let outermost = |ty: TypeRef| {
            let mut seen = HashSet::new();
            let mut current = ty;
            while let Some(parent) = declaring.get(&current) {
                if !seen.insert(current.clone()) {
                    break;
                }
                current = parent.clone();
            }
            current
        };

        let converter = DeclarationConverter::new(&catalog, self.config.primitive_map()?)
            .file_suffix(self.config.file_suffix.clone());
        let mut declarations = Vec::new();
        let mut covered: HashSet<TypeRef> = HashSet::new();
        for entry in entry_types {
            let root = outermost(entry);
            if covered.contains(&root) {
                continue;
            }
            let declaration = converter.convert(&root)?;
            covered.extend(declaration.declared.iter().cloned());
            declarations.push(declaration);
        }

        // Member types that no action mentions still need a file of their own.
        let mut pending = VecDeque::new();
        for declaration in &declarations {
            for ty in &declaration.declared {
                pending.extend(converter.referenced_types(ty)?);
            }
        }
        while let Some(ty) = pending.pop_front() {
            let ty = outermost(ty);
            if covered.contains(&ty) || excluded.contains(&ty) {
                continue;
            }
            let Some(path) = ty.as_named() else {
                continue;
            };
            if catalog.definition(path).is_none() {
                debug!(%path, "referenced type is not in the catalog, leaving it undeclared");
                covered.insert(ty);
                continue;
            }
            let declaration = converter.convert(&ty)?;
            for declared in &declaration.declared {
                pending.extend(converter.referenced_types(declared)?);
            }
            covered.extend(declaration.declared.iter().cloned());
            declarations.push(declaration);
        }

        declarations.sort_by(|a, b| {
            (a.root.namespace(), a.root.simple_name())
                .cmp(&(b.root.namespace(), b.root.simple_name()))
        });
        Ok(declarations)
    }

    /// Rebuilds `output_root` from scratch.
    pub fn generate(&self, output_root: impl AsRef<Path>) -> Result<GenerationReport> {
        let declarations = self.plan()?;

        let emitter = DeclarationEmitter::new(output_root.as_ref());
        emitter.wipe()?;
        let mut report = GenerationReport::default();
        for declaration in &declarations {
            report.files.push(emitter.emit(declaration)?);
            report.entry_types.push(declaration.root.clone());
        }

        info!(
            root = %emitter.root().display(),
            files = report.files.len(),
            "generated declarations"
        );
        Ok(report)
    }

    /// What [`Generator::generate`] would change under `output_root`.
    pub fn check(&self, output_root: impl AsRef<Path>) -> Result<Vec<Drift>> {
        let declarations = self.plan()?;
        DeclarationEmitter::new(output_root.as_ref()).check(&declarations)
    }
}
