use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

const PROFILES: &str = "high_performance, memory_efficient or default";

pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            input.sig.fn_token,
            "#[hq_runtime::main] can only be used on async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[hq_runtime::main] requires the function to return a Result",
        )
        .to_compile_error();
    }

    let preset = match runtime_preset(args) {
        Ok(preset) => preset,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #preset;
            let runtime = ::hq_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async move #block)
        }
    }
}

fn runtime_preset(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::hq_runtime::RuntimeConfig::default() });
    }

    let profile: Ident = syn::parse2(args)
        .map_err(|err| Error::new(err.span(), format!("expected a runtime profile: {PROFILES}")))?;

    match profile.to_string().as_str() {
        "high_performance" => Ok(quote! { ::hq_runtime::RuntimeConfig::high_performance() }),
        "memory_efficient" => Ok(quote! { ::hq_runtime::RuntimeConfig::memory_efficient() }),
        "default" => Ok(quote! { ::hq_runtime::RuntimeConfig::default() }),
        _ => Err(Error::new_spanned(profile, format!("unknown runtime profile; use {PROFILES}"))),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else { return false };
    let Type::Path(path) = &**ty else { return false };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
