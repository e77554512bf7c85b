//! `#[memory_usage]` reports elapsed time and peak process memory around every call of a
//! function.

use proc_macro2::TokenStream;
use quote::quote;

use crate::args::AttributeArgs;
use crate::syn_helpers::{body_as_closure, display_name, parse_plain_fn, split_attributes};

#[must_use]
pub fn entrypoint(attr: &TokenStream, input: &TokenStream) -> TokenStream {
    generate(attr, input).unwrap_or_else(syn::Error::into_compile_error)
}

fn generate(attr: &TokenStream, input: &TokenStream) -> syn::Result<TokenStream> {
    let args = AttributeArgs::parse(attr, &["name"])?;
    let item_fn = parse_plain_fn(input, "memory_usage")?;

    let name = display_name(args.get("name"), &item_fn);
    let body = body_as_closure(&item_fn);
    let (outer_attrs, inner_attrs) = split_attributes(&item_fn);
    let vis = &item_fn.vis;
    let sig = &item_fn.sig;

    Ok(quote! {
        #(#outer_attrs)*
        #vis #sig {
            #(#inner_attrs)*
            ::profmem::__private::memory_usage(#name, #body)
        }
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use syn::ItemFn;

    use super::*;

    fn expand(attr: TokenStream, input: TokenStream) -> String {
        entrypoint(&attr, &input).to_string()
    }

    #[test]
    fn wraps_body_and_keeps_signature() {
        let output = entrypoint(
            &TokenStream::new(),
            &quote! {
                /// Docs stay.
                pub fn add(a: u32, b: u32) -> u32 {
                    a + b
                }
            },
        );

        let item_fn: ItemFn = syn::parse2(output.clone()).unwrap();
        assert_eq!(item_fn.sig.ident, "add");
        assert_eq!(item_fn.sig.inputs.len(), 2);
        assert_eq!(item_fn.attrs.len(), 1);

        let expected_body = quote! {
            ::profmem::__private::memory_usage("add", move || -> u32 { a + b })
        };
        assert!(output.to_string().contains(&expected_body.to_string()));
    }

    #[test]
    fn custom_name_is_used() {
        let output = expand(quote!(name = "warm-up"), quote!(fn prepare() {}));

        assert!(output.contains("\"warm-up\""));
        assert!(!output.contains("\"prepare\""));
    }

    #[test]
    fn unknown_argument_is_compile_error() {
        let output = expand(quote!(sort_key = "calls"), quote!(fn prepare() {}));

        assert!(output.contains("compile_error"));
        assert!(output.contains("unknown argument `sort_key`"));
    }

    #[test]
    fn async_function_is_compile_error() {
        let output = expand(TokenStream::new(), quote!(async fn fetch() {}));

        assert!(output.contains("compile_error"));
    }
}
