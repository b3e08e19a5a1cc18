use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

const USAGE: &str = "rxcombine_macro::test only accepts: #[rxcombine_macro::test], \
                     #[rxcombine_macro::test(local)], #[rxcombine_macro::test(shared)], or \
                     string equivalents";

/// Marks a test function.
///
/// Sync functions become plain `#[test]`s. Async functions run on a tokio
/// runtime: `local` (the default) uses the current-thread flavor, `shared`
/// the multi-thread flavor, which is what scheduler tests hopping between
/// threads want.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let is_async = input.sig.asyncness.is_some();
  let raw_args = proc_macro2::TokenStream::from(attr);

  if !is_async {
    if !raw_args.is_empty() {
      return syn::Error::new(
        raw_args.span(),
        "rxcombine_macro::test flavor args are only supported for async tests",
      )
      .to_compile_error()
      .into();
    }
    return quote!( #[test] #input ).into();
  }

  let flavor = if raw_args.is_empty() {
    Ok("local".to_string())
  } else if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
    Ok(ident.to_string())
  } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
    Ok(lit.value())
  } else {
    Err(syn::Error::new(raw_args.span(), USAGE))
  };

  let tokio_args = match flavor.as_deref() {
    Ok("local") => quote!(flavor = "current_thread"),
    Ok("shared") => quote!(flavor = "multi_thread", worker_threads = 2),
    Ok(_) => return syn::Error::new(raw_args.span(), USAGE).to_compile_error().into(),
    Err(err) => return err.to_compile_error().into(),
  };

  quote!( #[tokio::test(#tokio_args)] #input ).into()
}
