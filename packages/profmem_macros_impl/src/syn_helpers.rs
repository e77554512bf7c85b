use proc_macro2::{TokenStream, TokenTree};
use quote::{ToTokens, quote, quote_spanned};
use syn::ext::IdentExt;
use syn::{AttrStyle, Attribute, ItemFn, LitStr, ReturnType, Type};

/// Parses the item an attribute was applied to, accepting only plain synchronous functions.
pub(crate) fn parse_plain_fn(item: &TokenStream, attribute: &str) -> syn::Result<ItemFn> {
    let item_fn = syn::parse2::<ItemFn>(item.clone())?;

    if let Some(asyncness) = &item_fn.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            format!("#[{attribute}] does not support async functions"),
        ));
    }

    if let Some(constness) = &item_fn.sig.constness {
        return Err(syn::Error::new_spanned(
            constness,
            format!("#[{attribute}] does not support const functions"),
        ));
    }

    Ok(item_fn)
}

/// Splits the attributes of a function into those placed before it and those placed inside
/// its body (`#![...]`).
pub(crate) fn split_attributes(item_fn: &ItemFn) -> (Vec<&Attribute>, Vec<&Attribute>) {
    item_fn
        .attrs
        .iter()
        .partition(|attr| matches!(attr.style, AttrStyle::Outer))
}

/// The name a function is reported under: the `name` argument if given, otherwise the
/// function's own name.
pub(crate) fn display_name(name_arg: Option<&LitStr>, item_fn: &ItemFn) -> LitStr {
    name_arg.cloned().unwrap_or_else(|| {
        LitStr::new(
            &item_fn.sig.ident.unraw().to_string(),
            item_fn.sig.ident.span(),
        )
    })
}

/// An expression creating the `FunctionId` of the function, located at the function's name.
pub(crate) fn function_id(item_fn: &ItemFn, name: &LitStr) -> TokenStream {
    quote_spanned! { item_fn.sig.ident.span() =>
        ::profmem::FunctionId::new(::core::file!(), ::core::line!(), #name)
    }
}

/// The statements of the function body as a `move` closure.
///
/// The closure is annotated with the return type of the function where the type can be named
/// there, so `?` and `return` in the body keep their meaning. Otherwise the return type is left
/// to inference from the surrounding call.
pub(crate) fn body_as_closure(item_fn: &ItemFn) -> TokenStream {
    let stmts = &item_fn.block.stmts;

    match &item_fn.sig.output {
        ReturnType::Type(_, ty) if is_nameable_in_closure(ty) => quote! {
            move || -> #ty { #(#stmts)* }
        },
        _ => quote! {
            move || { #(#stmts)* }
        },
    }
}

// `impl Trait` is not allowed in closure signatures and elided or anonymous lifetimes would be
// resolved differently than in the function signature.
fn is_nameable_in_closure(ty: &Type) -> bool {
    is_nameable_tokens(ty.to_token_stream())
}

fn is_nameable_tokens(tokens: TokenStream) -> bool {
    tokens.into_iter().all(|token| match token {
        TokenTree::Ident(ident) => ident != "impl" && ident != "_",
        TokenTree::Punct(punct) => punct.as_char() != '&' && punct.as_char() != '\'',
        TokenTree::Group(group) => is_nameable_tokens(group.stream()),
        TokenTree::Literal(_) => true,
    })
}
