//! `#[profile_with_memory_usage]` runs every call of a function under a fresh profiling session
//! and reports the statistics and peak process memory.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Ident, LitStr};

use crate::args::AttributeArgs;
use crate::syn_helpers::{
    body_as_closure, display_name, function_id, parse_plain_fn, split_attributes,
};

// Tags accepted by `sort_key = ".."` and the `SortKey` variants they select.
const SORT_KEYS: &[(&str, &str)] = &[
    ("cumulative", "Cumulative"),
    ("calls", "Calls"),
    ("stdname", "StdName"),
    ("time", "Time"),
];

#[must_use]
pub fn entrypoint(attr: &TokenStream, input: &TokenStream) -> TokenStream {
    generate(attr, input).unwrap_or_else(syn::Error::into_compile_error)
}

fn generate(attr: &TokenStream, input: &TokenStream) -> syn::Result<TokenStream> {
    let args = AttributeArgs::parse(attr, &["sort_key", "name"])?;
    let sort_key = sort_key_variant(args.get("sort_key"))?;
    let item_fn = parse_plain_fn(input, "profile_with_memory_usage")?;

    let name = display_name(args.get("name"), &item_fn);
    let function_id = function_id(&item_fn, &name);
    let body = body_as_closure(&item_fn);
    let (outer_attrs, inner_attrs) = split_attributes(&item_fn);
    let vis = &item_fn.vis;
    let sig = &item_fn.sig;

    Ok(quote! {
        #(#outer_attrs)*
        #vis #sig {
            #(#inner_attrs)*
            ::profmem::__private::profile_with_memory_usage(
                #function_id,
                ::profmem::SortKey::#sort_key,
                #body,
            )
        }
    })
}

fn sort_key_variant(tag: Option<&LitStr>) -> syn::Result<Ident> {
    let Some(tag) = tag else {
        return Ok(Ident::new("Cumulative", Span::call_site()));
    };

    let value = tag.value();

    SORT_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == value)
        .map(|(_, variant)| Ident::new(variant, tag.span()))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                tag,
                format!(
                    "invalid sort key '{value}': expected one of 'cumulative', 'calls', 'stdname' or 'time'"
                ),
            )
        })
}
