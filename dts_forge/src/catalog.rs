//! # Type Catalog
//!
//! A read-only view over the static type information of the host program.
//! Nothing here is mutated during a generation run; the resolver, discovery
//! and converter only query it.
//!
//! Metadata reaches a catalog in one of two ways:
//!
//! - from `#[derive(ApiType)]` / `#[controller]` registrations collected with
//!   `inventory` (see [`crate::registry`]), or
//! - from a JSON schema description loaded with [`StaticCatalog::from_json_str`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Namespace and simple name of a nominal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypePath {
    #[serde(default)]
    pub namespace: Vec<String>,
    pub name: String,
}

impl TypePath {
    pub fn new<I, S>(namespace: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    /// Builds a path from the output of `module_path!()` and a type name.
    pub fn from_module_path(module_path: &str, name: &str) -> Self {
        Self {
            namespace: module_path
                .split("::")
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
            name: name.to_string(),
        }
    }

    /// Parses `a::b::Name` (or dotted `A.B.Name`) into a path.
    pub fn parse(qualified: &str) -> Self {
        let separator = if qualified.contains("::") { "::" } else { "." };
        let mut segments: Vec<String> = qualified
            .split(separator)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .collect();
        let name = segments.pop().unwrap_or_default();
        Self {
            namespace: segments,
            name,
        }
    }

    pub fn qualified(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace.join("::"), self.name)
        }
    }

    /// Relative output path: one directory per namespace segment, then
    /// `Name` + `suffix`.
    pub fn declaration_path(&self, suffix: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in &self.namespace {
            path.push(segment);
        }
        path.push(format!("{}{}", self.name, suffix));
        path
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Paths of the generic definitions the `Describe` impls emit.
pub mod well_known {
    use super::TypePath;

    pub fn future() -> TypePath {
        TypePath::new(["core", "future"], "Future")
    }

    pub fn option() -> TypePath {
        TypePath::new(["core", "option"], "Option")
    }

    pub fn result() -> TypePath {
        TypePath::new(["core", "result"], "Result")
    }

    pub fn vec() -> TypePath {
        TypePath::new(["std", "vec"], "Vec")
    }

    pub fn vec_deque() -> TypePath {
        TypePath::new(["std", "collections"], "VecDeque")
    }

    pub fn hash_set() -> TypePath {
        TypePath::new(["std", "collections"], "HashSet")
    }

    pub fn btree_set() -> TypePath {
        TypePath::new(["std", "collections"], "BTreeSet")
    }

    pub fn hash_map() -> TypePath {
        TypePath::new(["std", "collections"], "HashMap")
    }

    pub fn btree_map() -> TypePath {
        TypePath::new(["std", "collections"], "BTreeMap")
    }

    pub fn axum_json() -> TypePath {
        TypePath::new(["axum"], "Json")
    }

    pub fn axum_query() -> TypePath {
        TypePath::new(["axum", "extract"], "Query")
    }

    pub fn axum_path() -> TypePath {
        TypePath::new(["axum", "extract"], "Path")
    }
}

/// The closed set of host primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Decimal,
    String,
    Object,
    Void,
}

impl Primitive {
    pub const ALL: [Primitive; 20] = [
        Primitive::Bool,
        Primitive::Char,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::I128,
        Primitive::Isize,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::U128,
        Primitive::Usize,
        Primitive::F32,
        Primitive::F64,
        Primitive::Decimal,
        Primitive::String,
        Primitive::Object,
        Primitive::Void,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
            Primitive::Isize => "isize",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::Usize => "usize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Decimal => "decimal",
            Primitive::String => "string",
            Primitive::Object => "object",
            Primitive::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL
            .into_iter()
            .find(|primitive| primitive.name().eq_ignore_ascii_case(name))
    }

    /// True primitives, as opposed to the opaque leaf kinds (text, decimal,
    /// object, void) that discovery excludes through the exclusion set.
    pub fn is_builtin(self) -> bool {
        !matches!(
            self,
            Primitive::Decimal | Primitive::String | Primitive::Object | Primitive::Void
        )
    }

    /// Value-kind under [`Host::Managed`] semantics.
    pub fn is_value_kind(self) -> bool {
        !matches!(self, Primitive::String | Primitive::Object)
    }

    /// Declaration-side name used when the primitive map has no override.
    pub fn default_target(self) -> &'static str {
        match self {
            Primitive::Bool => "boolean",
            Primitive::Char | Primitive::String => "string",
            Primitive::Object => "any",
            Primitive::Void => "void",
            _ => "number",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Nullability model of the host type system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    /// Text, object, class and interface types are reference kinds; only
    /// value kinds can be wrapped in the optional shape.
    #[default]
    Managed,
    /// Every type is a value; absence is only ever expressed through `Option`.
    Rust,
}

/// A structural type expression. Two equal expressions name the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Primitive(Primitive),
    Named(TypePath),
    Array(Box<TypeRef>),
    Generic {
        definition: TypePath,
        args: Vec<TypeRef>,
    },
}

impl TypeRef {
    pub fn named(path: TypePath) -> Self {
        TypeRef::Named(path)
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn generic(definition: TypePath, args: Vec<TypeRef>) -> Self {
        TypeRef::Generic { definition, args }
    }

    /// The type an `async fn` returning `inner` evaluates to.
    pub fn future(inner: TypeRef) -> Self {
        TypeRef::generic(well_known::future(), vec![inner])
    }

    pub fn as_named(&self) -> Option<&TypePath> {
        match self {
            TypeRef::Named(path) => Some(path),
            _ => None,
        }
    }

    pub fn namespace(&self) -> &[String] {
        match self {
            TypeRef::Named(path) => &path.namespace,
            TypeRef::Generic { definition, .. } => &definition.namespace,
            TypeRef::Array(element) => element.namespace(),
            TypeRef::Primitive(_) => &[],
        }
    }

    /// Bare name, as rendered for foreign named types.
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Primitive(primitive) => primitive.name().to_string(),
            TypeRef::Named(path) => path.name.clone(),
            TypeRef::Array(element) => format!("{}[]", element.simple_name()),
            TypeRef::Generic { definition, .. } => definition.name.clone(),
        }
    }

    pub fn is_builtin_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(primitive) if primitive.is_builtin())
    }
}

impl From<Primitive> for TypeRef {
    fn from(primitive: Primitive) -> Self {
        TypeRef::Primitive(primitive)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(primitive) => write!(f, "{}", primitive),
            TypeRef::Named(path) => write!(f, "{}", path),
            TypeRef::Array(element) => write!(f, "[{}]", element),
            TypeRef::Generic { definition, args } => {
                write!(f, "{}<", definition)?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn is_value_kind(self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Enum)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

fn readable_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    /// False for write-only members.
    #[serde(default = "readable_by_default")]
    pub readable: bool,
}

impl MemberInfo {
    pub fn public(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            readable: true,
        }
    }

    pub fn private(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            visibility: Visibility::Private,
            ..Self::public(name, ty)
        }
    }

    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Public && self.readable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// Framework markers attached to the method (e.g. `http_get`).
    #[serde(default)]
    pub markers: Vec<String>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub params: Vec<TypeRef>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            markers: Vec::new(),
            return_type: TypeRef::Primitive(Primitive::Void),
            params: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn param(mut self, ty: TypeRef) -> Self {
        self.params.push(ty);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub path: TypePath,
    pub kind: TypeKind,
    #[serde(default)]
    pub is_abstract: bool,
    /// Base types or declared capabilities, used to recognize controllers.
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub nested: Vec<TypeRef>,
    #[serde(default)]
    pub variants: Vec<EnumVariant>,
}

impl TypeDefinition {
    pub fn new(path: TypePath, kind: TypeKind) -> Self {
        Self {
            path,
            kind,
            is_abstract: false,
            capabilities: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            variants: Vec::new(),
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Named(self.path.clone())
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn nested(mut self, ty: TypeRef) -> Self {
        self.nested.push(ty);
        self
    }

    pub fn variant(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant {
            name: name.into(),
            value,
        });
        self
    }
}

/// Classification of a generic definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericShape {
    /// Array-like single-argument collection.
    Sequence,
    /// Asynchronous result wrapper; transparent.
    Async,
    /// HTTP action-result wrapper; transparent.
    ActionResult,
    /// Optional-value wrapper.
    Optional,
    /// Two-argument associative map.
    Map,
    Unrecognized,
}

impl GenericShape {
    pub fn arity(self) -> usize {
        match self {
            GenericShape::Map => 2,
            GenericShape::Unrecognized => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for GenericShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenericShape::Sequence => "sequence",
            GenericShape::Async => "async",
            GenericShape::ActionResult => "action-result",
            GenericShape::Optional => "optional",
            GenericShape::Map => "map",
            GenericShape::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// Answer of [`TypeCatalog::kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Primitive(Primitive),
    Class,
    Struct,
    Interface,
    Enum,
    Array(TypeRef),
    Generic {
        shape: GenericShape,
        definition: TypePath,
        args: Vec<TypeRef>,
    },
}

impl From<TypeKind> for Kind {
    fn from(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Class => Kind::Class,
            TypeKind::Struct => Kind::Struct,
            TypeKind::Interface => Kind::Interface,
            TypeKind::Enum => Kind::Enum,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Primitive(primitive) => write!(f, "primitive `{}`", primitive),
            Kind::Class => f.write_str("class"),
            Kind::Struct => f.write_str("struct"),
            Kind::Interface => f.write_str("interface"),
            Kind::Enum => f.write_str("enum"),
            Kind::Array(_) => f.write_str("array"),
            Kind::Generic {
                shape, definition, ..
            } => write!(f, "{} generic `{}`", shape, definition.name),
        }
    }
}

/// Generic definitions recognized by the resolver and converter.
///
/// Serialized as a map from qualified definition name to shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, GenericShape>", into = "BTreeMap<String, GenericShape>")]
pub struct ShapeTable {
    entries: BTreeMap<TypePath, GenericShape>,
}

impl ShapeTable {
    /// Shapes of the std (and axum) generics that `Describe` emits.
    pub fn rust_defaults() -> Self {
        let mut table = Self::default();
        for path in [
            well_known::vec(),
            well_known::vec_deque(),
            well_known::hash_set(),
            well_known::btree_set(),
        ] {
            table.insert(path, GenericShape::Sequence);
        }
        table.insert(well_known::future(), GenericShape::Async);
        for path in [
            well_known::axum_json(),
            well_known::axum_query(),
            well_known::axum_path(),
        ] {
            table.insert(path, GenericShape::ActionResult);
        }
        table.insert(well_known::option(), GenericShape::Optional);
        table.insert(well_known::hash_map(), GenericShape::Map);
        table.insert(well_known::btree_map(), GenericShape::Map);
        table
    }

    pub fn insert(&mut self, definition: TypePath, shape: GenericShape) {
        self.entries.insert(definition, shape);
    }

    /// Layers `overrides` on top of this table.
    pub fn extend(&mut self, overrides: &ShapeTable) {
        for (path, shape) in &overrides.entries {
            self.entries.insert(path.clone(), *shape);
        }
    }

    pub fn get(&self, definition: &TypePath) -> Option<GenericShape> {
        self.entries.get(definition).copied()
    }

    /// The shape of `definition` applied to `arity` arguments. A known
    /// definition used with the wrong number of arguments is unrecognized.
    pub fn lookup(&self, definition: &TypePath, arity: usize) -> GenericShape {
        match self.entries.get(definition) {
            Some(shape) if shape.arity() == arity => *shape,
            _ => GenericShape::Unrecognized,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, GenericShape>> for ShapeTable {
    fn from(raw: BTreeMap<String, GenericShape>) -> Self {
        Self {
            entries: raw
                .into_iter()
                .map(|(qualified, shape)| (TypePath::parse(&qualified), shape))
                .collect(),
        }
    }
}

impl From<ShapeTable> for BTreeMap<String, GenericShape> {
    fn from(table: ShapeTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(path, shape)| (path.qualified(), shape))
            .collect()
    }
}

/// Queryable metadata over the host's loaded types.
pub trait TypeCatalog {
    fn host(&self) -> Host {
        Host::Managed
    }

    /// Every loaded type, in a deterministic order.
    fn definitions(&self) -> Box<dyn Iterator<Item = &TypeDefinition> + '_>;

    fn definition(&self, path: &TypePath) -> Option<&TypeDefinition>;

    fn generic_shape(&self, definition: &TypePath, arity: usize) -> GenericShape;

    fn require(&self, path: &TypePath) -> Result<&TypeDefinition> {
        self.definition(path)
            .ok_or_else(|| GenerationError::UnknownType { path: path.clone() })
    }

    fn kind(&self, ty: &TypeRef) -> Result<Kind> {
        Ok(match ty {
            TypeRef::Primitive(primitive) => Kind::Primitive(*primitive),
            TypeRef::Array(element) => Kind::Array((**element).clone()),
            TypeRef::Generic { definition, args } => Kind::Generic {
                shape: self.generic_shape(definition, args.len()),
                definition: definition.clone(),
                args: args.clone(),
            },
            TypeRef::Named(path) => Kind::from(self.require(path)?.kind),
        })
    }

    fn members(&self, ty: &TypeRef) -> Result<Vec<MemberInfo>> {
        match ty {
            TypeRef::Named(path) => Ok(self.require(path)?.members.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn nested_types(&self, ty: &TypeRef) -> Result<Vec<TypeRef>> {
        match ty {
            TypeRef::Named(path) => Ok(self.require(path)?.nested.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn variants(&self, ty: &TypeRef) -> Result<Vec<EnumVariant>> {
        match ty {
            TypeRef::Named(path) => Ok(self.require(path)?.variants.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn is_value_kind(&self, ty: &TypeRef) -> Result<bool> {
        if self.host() == Host::Rust {
            return Ok(true);
        }
        match ty {
            TypeRef::Primitive(primitive) => Ok(primitive.is_value_kind()),
            TypeRef::Named(path) => Ok(self.require(path)?.kind.is_value_kind()),
            TypeRef::Array(_) | TypeRef::Generic { .. } => Ok(false),
        }
    }
}

impl<C: TypeCatalog + ?Sized> TypeCatalog for &C {
    fn host(&self) -> Host {
        (**self).host()
    }

    fn definitions(&self) -> Box<dyn Iterator<Item = &TypeDefinition> + '_> {
        (**self).definitions()
    }

    fn definition(&self, path: &TypePath) -> Option<&TypeDefinition> {
        (**self).definition(path)
    }

    fn generic_shape(&self, definition: &TypePath, arity: usize) -> GenericShape {
        (**self).generic_shape(definition, arity)
    }

    fn kind(&self, ty: &TypeRef) -> Result<Kind> {
        (**self).kind(ty)
    }

    fn members(&self, ty: &TypeRef) -> Result<Vec<MemberInfo>> {
        (**self).members(ty)
    }

    fn nested_types(&self, ty: &TypeRef) -> Result<Vec<TypeRef>> {
        (**self).nested_types(ty)
    }

    fn variants(&self, ty: &TypeRef) -> Result<Vec<EnumVariant>> {
        (**self).variants(ty)
    }

    fn is_value_kind(&self, ty: &TypeRef) -> Result<bool> {
        (**self).is_value_kind(ty)
    }
}

/// On-disk form of a [`StaticCatalog`].
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    host: Host,
    /// Layered over [`ShapeTable::rust_defaults`].
    #[serde(default)]
    shapes: ShapeTable,
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

/// In-memory catalog keyed by type path.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    host: Host,
    shapes: ShapeTable,
    types: BTreeMap<TypePath, TypeDefinition>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(Host::Managed)
    }
}

impl StaticCatalog {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            shapes: ShapeTable::rust_defaults(),
            types: BTreeMap::new(),
        }
    }

    pub fn with_shapes(mut self, overrides: &ShapeTable) -> Self {
        self.shapes.extend(overrides);
        self
    }

    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    /// Adds a definition, returning the one it replaced.
    pub fn insert(&mut self, definition: TypeDefinition) -> Option<TypeDefinition> {
        self.types.insert(definition.path.clone(), definition)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new(file.host).with_shapes(&file.shapes);
        for definition in file.types {
            catalog.insert(definition);
        }
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(path).map_err(|e| GenerationError::filesystem(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let file = CatalogFile {
            host: self.host,
            shapes: self.shapes.clone(),
            types: self.types.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

impl TypeCatalog for StaticCatalog {
    fn host(&self) -> Host {
        self.host
    }

    fn definitions(&self) -> Box<dyn Iterator<Item = &TypeDefinition> + '_> {
        Box::new(self.types.values())
    }

    fn definition(&self, path: &TypePath) -> Option<&TypeDefinition> {
        self.types.get(path)
    }

    fn generic_shape(&self, definition: &TypePath, arity: usize) -> GenericShape {
        self.shapes.lookup(definition, arity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_path_parsing() {
        let path = TypePath::parse("std::collections::HashMap");
        assert_eq!(path.namespace, vec!["std", "collections"]);
        assert_eq!(path.name, "HashMap");

        let dotted = TypePath::parse("System.Collections.Generic.List");
        assert_eq!(dotted.namespace, vec!["System", "Collections", "Generic"]);
        assert_eq!(dotted.name, "List");

        assert_eq!(TypePath::parse("Status").qualified(), "Status");
    }

    #[test]
    fn test_declaration_path_mirrors_namespace() {
        let path = TypePath::from_module_path("shop::models", "Product");
        assert_eq!(
            path.declaration_path(".d.ts"),
            PathBuf::from("shop").join("models").join("Product.d.ts")
        );
    }

    #[test]
    fn test_shape_lookup_checks_arity() {
        let shapes = ShapeTable::rust_defaults();
        assert_eq!(shapes.lookup(&well_known::vec(), 1), GenericShape::Sequence);
        assert_eq!(shapes.lookup(&well_known::vec(), 2), GenericShape::Unrecognized);
        assert_eq!(shapes.lookup(&well_known::hash_map(), 2), GenericShape::Map);
        assert_eq!(shapes.lookup(&well_known::result(), 2), GenericShape::Unrecognized);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let catalog = StaticCatalog::default();
        let missing = TypeRef::named(TypePath::parse("app::Missing"));
        match catalog.kind(&missing) {
            Err(GenerationError::UnknownType { path }) => assert_eq!(path.name, "Missing"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn test_value_kinds_depend_on_host() {
        let mut managed = StaticCatalog::new(Host::Managed);
        managed.insert(TypeDefinition::new(TypePath::parse("app::Model"), TypeKind::Class));
        let model = TypeRef::named(TypePath::parse("app::Model"));
        assert!(!managed.is_value_kind(&Primitive::String.into()).unwrap());
        assert!(managed.is_value_kind(&Primitive::I32.into()).unwrap());
        assert!(!managed.is_value_kind(&model).unwrap());

        let rust = StaticCatalog::new(Host::Rust);
        assert!(rust.is_value_kind(&Primitive::String.into()).unwrap());
    }

    #[test]
    fn test_json_catalog_layers_shapes_over_defaults() {
        let json = r#"{
            "host": "managed",
            "shapes": { "System.Collections.Generic.List": "sequence" },
            "types": [
                {
                    "path": { "namespace": ["App", "Models"], "name": "Item" },
                    "kind": "class",
                    "members": [ { "name": "Id", "type": { "primitive": "i32" } } ]
                }
            ]
        }"#;
        let catalog = StaticCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.generic_shape(&TypePath::parse("System.Collections.Generic.List"), 1),
            GenericShape::Sequence
        );
        assert_eq!(catalog.generic_shape(&well_known::option(), 1), GenericShape::Optional);

        let item = catalog.definition(&TypePath::parse("App.Models.Item")).unwrap();
        assert!(item.members[0].is_exported());
    }

    #[test]
    fn test_json_round_trip_preserves_definitions() {
        let mut catalog = StaticCatalog::new(Host::Rust);
        catalog.insert(
            TypeDefinition::new(TypePath::parse("app::Status"), TypeKind::Enum)
                .variant("Active", 0)
                .variant("Inactive", 1),
        );
        let json = catalog.to_json_string().unwrap();
        let reloaded = StaticCatalog::from_json_str(&json).unwrap();
        assert_eq!(reloaded.host(), Host::Rust);
        assert_eq!(
            reloaded.definition(&TypePath::parse("app::Status")),
            catalog.definition(&TypePath::parse("app::Status"))
        );
    }
}
