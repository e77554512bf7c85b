//! Parsing of `key = "value"` attribute arguments.

use proc_macro2::TokenStream;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, Lit, LitStr, MetaNameValue, Token};

/// The arguments given to one of our attributes, e.g. `#[profiled(name = "setup")]`.
#[derive(Debug, Default)]
pub(crate) struct AttributeArgs {
    values: Vec<(String, LitStr)>,
}

impl AttributeArgs {
    /// Parses the attribute arguments, accepting only the argument names in `allowed`.
    pub(crate) fn parse(attr: &TokenStream, allowed: &[&str]) -> syn::Result<Self> {
        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(attr.clone())?;

        let mut values: Vec<(String, LitStr)> = Vec::with_capacity(pairs.len());

        for pair in pairs {
            let Some(ident) = pair.path.get_ident() else {
                return Err(syn::Error::new_spanned(
                    &pair.path,
                    "expected a plain argument name",
                ));
            };

            let name = ident.to_string();

            if !allowed.contains(&name.as_str()) {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!(
                        "unknown argument `{name}`, expected one of: {}",
                        allowed.join(", ")
                    ),
                ));
            }

            if values.iter().any(|(existing, _)| *existing == name) {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!("argument `{name}` is specified more than once"),
                ));
            }

            let value = match pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(value),
                    ..
                }) => value,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        format!("argument `{name}` must be a string literal"),
                    ));
                }
            };

            values.push((name, value));
        }

        Ok(Self { values })
    }

    /// The value of the argument `name`, if it was given.
    pub(crate) fn get(&self, name: &str) -> Option<&LitStr> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use quote::quote;

    use super::*;

    #[test]
    fn empty_arguments() {
        let args = AttributeArgs::parse(&TokenStream::new(), &["name"]).unwrap();

        assert!(args.get("name").is_none());
    }

    #[test]
    fn string_arguments() {
        let args = AttributeArgs::parse(
            &quote!(name = "setup", sort_key = "calls"),
            &["name", "sort_key"],
        )
        .unwrap();

        assert_eq!(args.get("name").unwrap().value(), "setup");
        assert_eq!(args.get("sort_key").unwrap().value(), "calls");
    }

    #[test]
    fn trailing_comma_is_accepted() {
        let args = AttributeArgs::parse(&quote!(name = "setup",), &["name"]).unwrap();

        assert_eq!(args.get("name").unwrap().value(), "setup");
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let error = AttributeArgs::parse(&quote!(color = "red"), &["name"]).unwrap_err();

        assert!(error.to_string().contains("unknown argument `color`"));
    }

    #[test]
    fn duplicate_argument_is_rejected() {
        let error =
            AttributeArgs::parse(&quote!(name = "a", name = "b"), &["name"]).unwrap_err();

        assert!(error.to_string().contains("more than once"));
    }

    #[test]
    fn non_string_value_is_rejected() {
        let error = AttributeArgs::parse(&quote!(name = 42), &["name"]).unwrap_err();

        assert!(error.to_string().contains("must be a string literal"));
    }

    #[test]
    fn path_argument_name_is_rejected() {
        let error = AttributeArgs::parse(&quote!(a::b = "x"), &["name"]).unwrap_err();

        assert!(error.to_string().contains("plain argument name"));
    }
}
