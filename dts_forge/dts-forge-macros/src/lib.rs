extern crate proc_macro;

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Attribute, Data,
    DeriveInput, Fields, FnArg, Ident, ImplItem, ItemImpl, LitStr, Result, ReturnType, Token,
    Type, Visibility,
};

/// Registers a struct or fieldless enum with the `dts_forge` type registry
/// and implements `dts_forge::Describe` for it.
///
/// Container attributes:
/// - `#[api_type(rename_all = "camelCase" | "snake_case" | "PascalCase")]`
///   (default `camelCase`)
/// - `#[api_type(nested(Line, State))]` declares types emitted into the same
///   declaration file.
///
/// Field attributes: `#[api_type(rename = "name")]`, `#[api_type(skip)]`.
#[proc_macro_derive(ApiType, attributes(api_type))]
pub fn derive_api_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_api_type(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Registers an inherent `impl` block as an API controller. Methods marked
/// `#[action(GET)]` (or `POST`, `PUT`, `DELETE`, `PATCH`) are its exposed
/// actions.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = TokenStream2::from(args);
        return syn::Error::new_spanned(args, "#[controller] takes no arguments")
            .into_compile_error()
            .into();
    }
    let item = parse_macro_input!(input as ItemImpl);
    expand_controller(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

// --- #[derive(ApiType)] ---

#[derive(Clone, Copy)]
enum RenameRule {
    CamelCase,
    SnakeCase,
    PascalCase,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "camelCase" => Ok(RenameRule::CamelCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            "PascalCase" => Ok(RenameRule::PascalCase),
            other => Err(syn::Error::new_spanned(
                lit,
                format!("unsupported rename_all rule `{}`", other),
            )),
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            RenameRule::CamelCase => name.to_lower_camel_case(),
            RenameRule::SnakeCase => name.to_snake_case(),
            RenameRule::PascalCase => name.to_upper_camel_case(),
        }
    }
}

struct ContainerArgs {
    rename_all: RenameRule,
    nested: Vec<Type>,
}

impl ContainerArgs {
    fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut args = ContainerArgs {
            rename_all: RenameRule::CamelCase,
            nested: Vec::new(),
        };
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("api_type")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    args.rename_all = RenameRule::from_lit(&lit)?;
                    Ok(())
                } else if meta.path.is_ident("nested") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    args.nested.extend(types);
                    Ok(())
                } else {
                    Err(meta.error("unsupported api_type attribute"))
                }
            })?;
        }
        Ok(args)
    }
}

#[derive(Default)]
struct FieldArgs {
    rename: Option<String>,
    skip: bool,
}

impl FieldArgs {
    fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut args = FieldArgs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("api_type")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    args.rename = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    args.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported api_type field attribute"))
                }
            })?;
        }
        Ok(args)
    }
}

fn expand_api_type(input: DeriveInput) -> Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ApiType cannot be derived for generic types",
        ));
    }
    let args = ContainerArgs::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let name = ident.to_string();

    let definition = match &input.data {
        Data::Struct(data) => {
            let members = struct_members(&data.fields, args.rename_all)?;
            quote! {
                ::dts_forge::TypeDefinition::new(
                    ::dts_forge::TypePath::from_module_path(module_path!(), #name),
                    ::dts_forge::TypeKind::Struct,
                )
                #(#members)*
            }
        }
        Data::Enum(data) => {
            let mut variants = Vec::new();
            for variant in &data.variants {
                if !matches!(variant.fields, Fields::Unit) {
                    return Err(syn::Error::new_spanned(
                        variant,
                        "ApiType enums must be fieldless",
                    ));
                }
                let variant_ident = &variant.ident;
                let variant_name = unraw(variant_ident);
                variants.push(quote! {
                    .variant(#variant_name, #ident::#variant_ident as i64)
                });
            }
            quote! {
                ::dts_forge::TypeDefinition::new(
                    ::dts_forge::TypePath::from_module_path(module_path!(), #name),
                    ::dts_forge::TypeKind::Enum,
                )
                #(#variants)*
            }
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "ApiType cannot be derived for unions",
            ))
        }
    };

    let nested = args.nested.iter().map(|ty| {
        quote! { .nested(<#ty as ::dts_forge::Describe>::type_ref()) }
    });
    let registration = register(quote! { #definition #(#nested)* });

    Ok(quote! {
        impl ::dts_forge::Describe for #ident {
            fn type_ref() -> ::dts_forge::TypeRef {
                ::dts_forge::TypeRef::Named(
                    ::dts_forge::TypePath::from_module_path(module_path!(), #name),
                )
            }
        }

        #registration
    })
}

fn struct_members(fields: &Fields, rename_all: RenameRule) -> Result<Vec<TokenStream2>> {
    let named = match fields {
        Fields::Named(named) => named,
        Fields::Unit => return Ok(Vec::new()),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                fields,
                "ApiType structs must have named fields",
            ))
        }
    };

    let mut members = Vec::new();
    for field in &named.named {
        let field_args = FieldArgs::from_attrs(&field.attrs)?;
        if field_args.skip {
            continue;
        }
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let member_name = field_args
            .rename
            .unwrap_or_else(|| rename_all.apply(&unraw(field_ident)));
        let ty = &field.ty;
        let constructor = if matches!(field.vis, Visibility::Public(_)) {
            quote! { public }
        } else {
            quote! { private }
        };
        members.push(quote! {
            .member(::dts_forge::MemberInfo::#constructor(
                #member_name,
                <#ty as ::dts_forge::Describe>::type_ref(),
            ))
        });
    }
    Ok(members)
}

// --- #[controller] ---

struct ActionArgs {
    method: Ident,
}

impl Parse for ActionArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let method: Ident = input.parse()?;
        Ok(ActionArgs { method })
    }
}

impl ActionArgs {
    fn marker(&self) -> Result<String> {
        let method = self.method.to_string().to_uppercase();
        match method.as_str() {
            "GET" | "POST" | "PUT" | "DELETE" | "PATCH" => {
                Ok(format!("http_{}", method.to_lowercase()))
            }
            _ => Err(syn::Error::new_spanned(
                &self.method,
                "expected one of GET, POST, PUT, DELETE, PATCH",
            )),
        }
    }
}

fn expand_controller(mut item: ItemImpl) -> Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[controller] must be placed on an inherent impl block",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[controller] cannot be placed on a generic impl block",
        ));
    }
    let name = match item.self_ty.as_ref() {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => unraw(&segment.ident),
            None => return Err(syn::Error::new_spanned(&item.self_ty, "expected a type name")),
        },
        other => return Err(syn::Error::new_spanned(other, "expected a type name")),
    };

    let mut methods = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let mut action = None;
        let mut kept = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            if attr.path().is_ident("action") {
                if action.is_some() {
                    return Err(syn::Error::new_spanned(attr, "duplicate #[action] attribute"));
                }
                action = Some(attr.parse_args::<ActionArgs>()?.marker()?);
            } else {
                kept.push(attr);
            }
        }
        method.attrs = kept;

        let Some(marker) = action else {
            continue;
        };
        methods.push(action_method(&method.sig, &method.vis, &marker)?);
    }

    let registration = register(quote! {
        ::dts_forge::TypeDefinition::new(
            ::dts_forge::TypePath::from_module_path(module_path!(), #name),
            ::dts_forge::TypeKind::Class,
        )
        .capability("controller")
        #(#methods)*
    });

    Ok(quote! {
        #item

        #registration
    })
}

fn action_method(sig: &syn::Signature, vis: &Visibility, marker: &str) -> Result<TokenStream2> {
    let method_name = unraw(&sig.ident);
    let visibility = if matches!(vis, Visibility::Public(_)) {
        quote! { ::dts_forge::Visibility::Public }
    } else {
        quote! { ::dts_forge::Visibility::Private }
    };

    let mut return_type = match &sig.output {
        ReturnType::Default => quote! { <() as ::dts_forge::Describe>::type_ref() },
        ReturnType::Type(_, ty) => describe_type(ty)?,
    };
    if sig.asyncness.is_some() {
        return_type = quote! { ::dts_forge::TypeRef::future(#return_type) };
    }

    let mut params = Vec::new();
    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            let param = describe_type(&pat_type.ty)?;
            params.push(quote! { .param(#param) });
        }
    }

    Ok(quote! {
        .method(
            ::dts_forge::MethodInfo::new(#method_name, #visibility)
                .marker(#marker)
                .returns(#return_type)
                #(#params)*
        )
    })
}

fn describe_type(ty: &Type) -> Result<TokenStream2> {
    if let Type::ImplTrait(_) = ty {
        return Err(syn::Error::new_spanned(
            ty,
            "action signatures must use concrete types; `impl Trait` cannot be described",
        ));
    }
    if ty.to_token_stream().to_string().split_whitespace().any(|t| t == "Self") {
        return Err(syn::Error::new_spanned(
            ty,
            "action signatures must name the controller type instead of `Self`",
        ));
    }
    Ok(quote! { <#ty as ::dts_forge::Describe>::type_ref() })
}

// --- Shared ---

/// Submits `definition` (an expression of type `TypeDefinition`) to the registry.
fn register(definition: TokenStream2) -> TokenStream2 {
    quote! {
        const _: () = {
            fn describe() -> ::dts_forge::TypeDefinition {
                #definition
            }

            ::dts_forge::inventory::submit! {
                ::dts_forge::registry::ApiTypeMetadata { describe }
            }
        };
    }
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(String::from).unwrap_or(name)
}
