//! `#[profiled]` measures a function whenever a profiling session is active on the calling
//! thread.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

use crate::args::AttributeArgs;
use crate::syn_helpers::{display_name, function_id, parse_plain_fn, split_attributes};

#[must_use]
pub fn entrypoint(attr: &TokenStream, input: &TokenStream) -> TokenStream {
    generate(attr, input).unwrap_or_else(syn::Error::into_compile_error)
}

fn generate(attr: &TokenStream, input: &TokenStream) -> syn::Result<TokenStream> {
    let args = AttributeArgs::parse(attr, &["name"])?;
    let item_fn = parse_plain_fn(input, "profiled")?;

    let name = display_name(args.get("name"), &item_fn);
    let function_id = function_id(&item_fn, &name);
    let (outer_attrs, inner_attrs) = split_attributes(&item_fn);
    let vis = &item_fn.vis;
    let sig = &item_fn.sig;
    let stmts = &item_fn.block.stmts;

    // Invisible to the function body.
    let scope = Ident::new("__profmem_scope", Span::mixed_site());

    Ok(quote! {
        #(#outer_attrs)*
        #vis #sig {
            #(#inner_attrs)*
            let #scope = ::profmem::enter(#function_id);
            #(#stmts)*
        }
    })
}
