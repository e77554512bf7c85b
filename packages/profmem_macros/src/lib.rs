#![allow(
    missing_docs,
    reason = "Private API, public API is documented in `profmem` package"
)]

use proc_macro::TokenStream;

#[proc_macro_attribute]
pub fn __macro_memory_usage(attr: TokenStream, item: TokenStream) -> TokenStream {
    profmem_macros_impl::memory_usage::entrypoint(&attr.into(), &item.into()).into()
}

#[proc_macro_attribute]
pub fn __macro_profile_with_memory_usage(attr: TokenStream, item: TokenStream) -> TokenStream {
    profmem_macros_impl::profile_with_memory_usage::entrypoint(&attr.into(), &item.into()).into()
}

#[proc_macro_attribute]
pub fn __macro_profiled(attr: TokenStream, item: TokenStream) -> TokenStream {
    profmem_macros_impl::profiled::entrypoint(&attr.into(), &item.into()).into()
}
