//! Proc macros for record categories.
//!
//! Provides `#[derive(CategoryFields)]`, which generates an ordered field table and
//! by-name accessors for a struct whose fields are all `String`.
//!
//! # Example
//!
//! ```ignore
//! #[derive(CategoryFields)]
//! #[category(key = "worldview")]
//! struct Worldview {
//!     #[category(rename = "magicSystem")]
//!     magic_system: String,
//!     era: String,
//! }
//! ```
//!
//! The generated impl targets `crate::record::CategoryFields`, so the derive
//! is meant to be used inside `cosmo-core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Field, Lit, Meta, Type};

/// Derive macro for category field tables.
///
/// # Attributes
///
/// - `#[category(key = "...")]` - Override the category key (defaults to snake_case struct name)
/// - `#[category(rename = "...")]` on fields - Override the wire name of a field; the
///   Rust field name stays accepted as an alias in lookups
#[proc_macro_derive(CategoryFields, attributes(category))]
pub fn derive_category(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_category(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_category(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let key = get_category_key(&input)?;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "CategoryFields derive only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(&input, "CategoryFields derive only supports structs")),
    };

    let mut wire_names = Vec::new();
    let mut get_arms = Vec::new();
    let mut get_mut_arms = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if !is_string_type(&field.ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Category fields must be of type String",
            ));
        }

        let wire_name = get_field_name(field)?;
        let rust_name = ident.to_string();

        let patterns = if wire_name == rust_name {
            quote! { #wire_name }
        } else {
            quote! { #wire_name | #rust_name }
        };

        get_arms.push(quote! { #patterns => Some(self.#ident.as_str()), });
        get_mut_arms.push(quote! { #patterns => Some(&mut self.#ident), });
        wire_names.push(wire_name);
    }

    if wire_names.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "CategoryFields derive needs at least one field",
        ));
    }

    Ok(quote! {
        impl crate::record::CategoryFields for #struct_name {
            const KEY: &'static str = #key;
            const FIELDS: &'static [&'static str] = &[#(#wire_names),*];

            fn field(&self, name: &str) -> Option<&str> {
                match name {
                    #(#get_arms)*
                    _ => None,
                }
            }

            fn field_mut(&mut self, name: &str) -> Option<&mut String> {
                match name {
                    #(#get_mut_arms)*
                    _ => None,
                }
            }
        }
    })
}

fn get_category_key(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("category") {
            let meta = attr.parse_args::<Meta>()?;
            if let Some(value) = name_value(&meta, "key") {
                return Ok(value);
            }
        }
    }

    Ok(to_snake_case(&input.ident.to_string()))
}

fn get_field_name(field: &Field) -> syn::Result<String> {
    for attr in &field.attrs {
        if attr.path().is_ident("category") {
            let meta = attr.parse_args::<Meta>()?;
            if let Some(value) = name_value(&meta, "rename") {
                return Ok(value);
            }
        }
    }

    Ok(field
        .ident
        .as_ref()
        .map(|i| i.to_string())
        .unwrap_or_default())
}

fn name_value(meta: &Meta, name: &str) -> Option<String> {
    if let Meta::NameValue(nv) = meta {
        if nv.path.is_ident(name) {
            if let syn::Expr::Lit(expr_lit) = &nv.value {
                if let Lit::Str(s) = &expr_lit.lit {
                    return Some(s.value());
                }
            }
        }
    }
    None
}

fn is_string_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "String";
        }
    }
    false
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
