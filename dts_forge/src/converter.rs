//! Renders a payload type, and every type nested inside it, into the lines
//! of one declaration file.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::catalog::{GenericShape, Kind, MemberInfo, TypeCatalog, TypeRef};
use crate::config::{PrimitiveMap, DEFAULT_FILE_SUFFIX};
use crate::error::{GenerationError, Result};
use crate::resolver::{Modifier, ShapeResolver};

/// The generated text for one entry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub root: TypeRef,
    /// `root` and its nested types, in block order.
    pub declared: Vec<TypeRef>,
    /// Relative to the output root.
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl Declaration {
    /// File contents: every line terminated by `\n`.
    pub fn contents(&self) -> String {
        let mut contents = String::new();
        for line in &self.lines {
            contents.push_str(line);
            contents.push('\n');
        }
        contents
    }
}

pub struct DeclarationConverter<'a, C: TypeCatalog + ?Sized> {
    catalog: &'a C,
    resolver: ShapeResolver<'a, C>,
    primitives: PrimitiveMap,
    file_suffix: String,
}

impl<'a, C: TypeCatalog + ?Sized> DeclarationConverter<'a, C> {
    pub fn new(catalog: &'a C, primitives: PrimitiveMap) -> Self {
        Self {
            catalog,
            resolver: ShapeResolver::new(catalog),
            primitives,
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }

    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn convert(&self, root: &TypeRef) -> Result<Declaration> {
        let Some(root_path) = root.as_named() else {
            return Err(GenerationError::UnconvertibleKind {
                ty: root.clone(),
                kind: self.catalog.kind(root)?,
            });
        };

        let declared = self.gather(root)?;
        let mut lines = Vec::new();
        for ty in &declared {
            lines.push(String::new());
            match self.catalog.kind(ty)? {
                Kind::Class | Kind::Struct | Kind::Interface => {
                    self.convert_interface(&mut lines, ty)?
                }
                Kind::Enum => self.convert_enum(&mut lines, ty)?,
                kind => {
                    return Err(GenerationError::UnconvertibleKind {
                        ty: ty.clone(),
                        kind,
                    })
                }
            }
        }

        let path = root_path.declaration_path(&self.file_suffix);
        debug!(root = %root, path = %path.display(), lines = lines.len(), "converted declaration");
        Ok(Declaration {
            root: root.clone(),
            declared,
            path,
            lines,
        })
    }

    /// Named types mentioned by the exported members of `ty`, in member order.
    pub fn referenced_types(&self, ty: &TypeRef) -> Result<Vec<TypeRef>> {
        let mut referenced = Vec::new();
        for member in self.catalog.members(ty)? {
            if member.is_exported() {
                collect_named(&member.ty, &mut referenced);
            }
        }
        Ok(referenced)
    }

    /// `root` followed by its nested types, depth-first.
    fn gather(&self, root: &TypeRef) -> Result<Vec<TypeRef>> {
        let mut gathered = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root.clone()];

        while let Some(ty) = stack.pop() {
            if !visited.insert(ty.clone()) {
                continue;
            }
            let nested = self.catalog.nested_types(&ty)?;
            stack.extend(nested.into_iter().rev());
            gathered.push(ty);
        }
        Ok(gathered)
    }

    fn convert_interface(&self, lines: &mut Vec<String>, ty: &TypeRef) -> Result<()> {
        lines.push(format!("export interface {} {{", ty.simple_name()));
        for member in self.catalog.members(ty)? {
            if !member.is_exported() {
                continue;
            }
            lines.push(self.member_line(&member)?);
        }
        lines.push("}".to_string());
        Ok(())
    }

    fn convert_enum(&self, lines: &mut Vec<String>, ty: &TypeRef) -> Result<()> {
        lines.push(format!("export enum {} {{", ty.simple_name()));
        for variant in self.catalog.variants(ty)? {
            lines.push(format!("  {} = {},", variant.name, variant.value));
        }
        lines.push("}".to_string());
        Ok(())
    }

    fn member_line(&self, member: &MemberInfo) -> Result<String> {
        Ok(format!(
            "  {}: {};",
            lower_first(&member.name),
            self.render(&member.ty)?
        ))
    }

    /// Declaration-side text for a member type. Optional and array shapes
    /// compose at any depth; a union inside an array is parenthesized.
    /// Foreign named types are never inlined; only the map shape expands.
    fn render(&self, ty: &TypeRef) -> Result<String> {
        if let Some(value) = self.resolver.optional_value(ty)? {
            let value = self.render(&value)?;
            let suffix = Modifier::Optional.suffix();
            if value.ends_with(suffix) {
                return Ok(value);
            }
            return Ok(format!("{}{}", value, suffix));
        }
        if let Some(element) = self.resolver.sequence_element(ty) {
            let element = self.render(&element)?;
            let element = if element.contains('|') {
                format!("({})", element)
            } else {
                element
            };
            return Ok(format!("{}{}", element, Modifier::Array.suffix()));
        }

        Ok(match ty {
            TypeRef::Primitive(primitive) => self.primitives.target(*primitive).to_string(),
            TypeRef::Generic { definition, args }
                if self.catalog.generic_shape(definition, args.len()) == GenericShape::Map =>
            {
                format!(
                    "{{ [key: {}]: {} }}",
                    self.render(&args[0])?,
                    self.render(&args[1])?
                )
            }
            other => other.simple_name(),
        })
    }
}

fn collect_named(ty: &TypeRef, out: &mut Vec<TypeRef>) {
    match ty {
        TypeRef::Named(_) => out.push(ty.clone()),
        TypeRef::Array(element) => collect_named(element, out),
        TypeRef::Generic { args, .. } => {
            for arg in args {
                collect_named(arg, out);
            }
        }
        TypeRef::Primitive(_) => {}
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
