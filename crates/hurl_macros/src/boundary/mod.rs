// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.


use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{ItemFn, Result, ReturnType, Signature, Type, parse_macro_input};

use crate::utils::bail;

#[cfg_attr(test, mutants::skip)] // procedural macro API cannot be used in tests directly
pub fn boundary(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = proc_macro2::TokenStream::from(args);
    let input = parse_macro_input!(input as ItemFn);

    impl_boundary_attribute(args, input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn impl_boundary_attribute(args: proc_macro2::TokenStream, mut fn_definition: ItemFn) -> Result<proc_macro2::TokenStream> {
    let return_type = check_signature(&fn_definition.sig)?.clone();

    // mixed-site hygiene keeps the binding invisible to user tokens in the annotation
    let caught = syn::Ident::new("caught", proc_macro2::Span::mixed_site());
    let recovered = if args.is_empty() {
        quote! { #caught }
    } else {
        let message = annotation_expr(args)?;
        quote! { #caught.annotate(#message) }
    };

    let body = &fn_definition.block;
    let block = quote! {
        {
            match ::hurl::catch(|| -> #return_type #body) {
                ::core::result::Result::Ok(returned) => returned,
                ::core::result::Result::Err(#caught) => ::core::result::Result::Err(::core::convert::From::from(#recovered)),
            }
        }
    };

    fn_definition.block = syn::parse2(block)?;

    Ok(quote! { #fn_definition })
}

/// Builds the annotation from either a plain string literal or a format string with arguments.
fn annotation_expr(args: proc_macro2::TokenStream) -> Result<proc_macro2::TokenStream> {
    let tokens: Vec<_> = args.into_iter().collect();

    let Some(proc_macro2::TokenTree::Literal(lit)) = tokens.first() else {
        bail!("boundary expects a string literal or a format string with arguments");
    };
    let lit_str = lit.to_string();
    if !is_quoted_string(&lit_str) {
        bail!(lit.span(), "boundary expects a string literal or a format string with arguments");
    }

    if tokens.len() > 1 || (lit_str.contains('{') && lit_str.contains('}')) {
        let format_tokens = proc_macro2::TokenStream::from_iter(tokens);
        Ok(quote! { ::std::format!(#format_tokens) })
    } else {
        Ok(quote! { #lit })
    }
}

fn is_quoted_string(lit: &str) -> bool {
    lit.len() >= 2 && lit.starts_with('"') && lit.ends_with('"')
}

/// Returns the declared return type, rejecting signatures a synchronous boundary cannot wrap.
fn check_signature(sig: &Signature) -> Result<&Type> {
    if let Some(asyncness) = &sig.asyncness {
        bail!(asyncness.span(), "boundary cannot be applied to async functions");
    }

    if let Some(constness) = &sig.constness {
        bail!(constness.span(), "boundary cannot be applied to const functions");
    }

    match &sig.output {
        ReturnType::Default => {
            bail!(sig.ident.span(), "boundary can only be applied to functions returning Result");
        }
        ReturnType::Type(_, ty) if matches!(**ty, Type::ImplTrait(_)) => {
            bail!(ty.span(), "boundary does not support `impl Trait` return types");
        }
        ReturnType::Type(_, ty) => Ok(ty),
    }
}

#[cfg(test)]
mod inline_tests {
    use super::*;

    #[test]
    fn annotation_expr_simple() {
        let expr = annotation_expr(quote! { "simple message" }).unwrap();
        assert_eq!(expr.to_string(), quote! { "simple message" }.to_string());
    }

    #[test]
    fn annotation_expr_interpolation() {
        let expr = annotation_expr(quote! { "failed to read {path}" }).unwrap();
        let expected = quote! { ::std::format!("failed to read {path}") };
        assert_eq!(expr.to_string(), expected.to_string());
    }

    #[test]
    fn annotation_expr_with_arguments() {
        let expr = annotation_expr(quote! { "error in {}: {}", module, code }).unwrap();
        let expected = quote! { ::std::format!("error in {}: {}", module, code) };
        assert_eq!(expr.to_string(), expected.to_string());
    }

    #[test]
    fn annotation_expr_with_one_brace() {
        let expr = annotation_expr(quote! { "simple {message" }).unwrap();
        assert_eq!(expr.to_string(), quote! { "simple {message" }.to_string());
    }

    #[test]
    fn annotation_expr_rejects_non_strings() {
        for args in [quote! { 42 }, quote! { 'c' }] {
            let err = annotation_expr(args).unwrap_err();
            assert_eq!(err.to_string(), "boundary expects a string literal or a format string with arguments");
        }

        let err = annotation_expr(quote! { format!("error in {}", name) }).unwrap_err();
        assert_eq!(err.to_string(), "boundary expects a string literal or a format string with arguments");
    }

    #[test]
    fn quoted_strings() {
        assert!(is_quoted_string("\"valid string\""));
        assert!(is_quoted_string("\"\""));
        assert!(!is_quoted_string("\""));
        assert!(!is_quoted_string("\"unterminated"));
        assert!(!is_quoted_string("12345"));
        assert!(!is_quoted_string("'c'"));
    }

    #[test]
    fn signature_with_result() {
        let sig: Signature = syn::parse_quote! { fn f() -> Result<(), String> };
        let ty = check_signature(&sig).unwrap();
        assert_eq!(quote! { #ty }.to_string(), quote! { Result<(), String> }.to_string());
    }

    #[test]
    fn signature_rejections() {
        let cases: [(Signature, &str); 4] = [
            (syn::parse_quote! { fn f() }, "boundary can only be applied to functions returning Result"),
            (
                syn::parse_quote! { async fn f() -> Result<(), String> },
                "boundary cannot be applied to async functions",
            ),
            (
                syn::parse_quote! { const fn f() -> Result<(), String> },
                "boundary cannot be applied to const functions",
            ),
            (
                syn::parse_quote! { fn f() -> impl Iterator<Item = u8> },
                "boundary does not support `impl Trait` return types",
            ),
        ];

        for (sig, expected) in cases {
            assert_eq!(check_signature(&sig).unwrap_err().to_string(), expected);
        }
    }
}
