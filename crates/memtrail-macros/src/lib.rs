use proc_macro::TokenStream;
#[cfg(not(feature = "memtrail-off"))]
use quote::quote;
#[cfg(not(feature = "memtrail-off"))]
use syn::parse::Parser;
#[cfg(not(feature = "memtrail-off"))]
use syn::{parse_macro_input, ItemFn, LitBool, LitStr};

/// Initializes allocation tracking and reports leaks when the program exits.
///
/// Apply this attribute to your program's entry point. It builds a tracking
/// guard ahead of the function body; when the guard is dropped at the end of
/// `main`, every still-tracked allocation is reported as a leak and a summary
/// is written to the log file and the console.
///
/// # Parameters
///
/// * `log_path` - Log destination path. Default: `"memtrail.log"`. The
///   `MEMTRAIL_LOG` env var overrides this at runtime.
/// * `stacks` - Capture an allocation stack for every tracked allocation and
///   print it with the leak report (requires the `backtrace` feature to
///   resolve frames). Default: `false`. `MEMTRAIL_STACKS=1` enables this at
///   runtime.
///
/// # Examples
///
/// ```rust,no_run
/// #[memtrail::main]
/// fn main() {
///     // Your code here
/// }
/// ```
///
/// Custom log destination:
///
/// ```rust,no_run
/// #[memtrail::main(log_path = "target/allocs.log")]
/// fn main() {
///     // Your code here
/// }
/// ```
///
/// # Limitations
///
/// Tracking can be initialized only once per process. A second guard (via this
/// macro or [`GuardBuilder`](../memtrail/struct.GuardBuilder.html)) will cause
/// a panic.
#[cfg(not(feature = "memtrail-off"))]
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    let mut log_path: Option<String> = None;
    let mut stacks = false;

    // Parse named args like: log_path="..", stacks=true
    if !attr.is_empty() {
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("log_path") {
                meta.input.parse::<syn::Token![=]>()?;
                let lit: LitStr = meta.input.parse()?;
                log_path = Some(lit.value());
                return Ok(());
            }

            if meta.path.is_ident("stacks") {
                meta.input.parse::<syn::Token![=]>()?;
                let lit: LitBool = meta.input.parse()?;
                stacks = lit.value();
                return Ok(());
            }

            Err(meta.error("Unknown parameter. Supported: log_path=\"..\", stacks=true"))
        });

        if let Err(e) = parser.parse2(proc_macro2::TokenStream::from(attr)) {
            return e.to_compile_error().into();
        }
    }

    let log_path_setter = match log_path {
        Some(path) => quote! { .log_path(#path) },
        None => quote! {},
    };
    let stacks_setter = if stacks {
        quote! { .capture_stacks(true) }
    } else {
        quote! {}
    };

    let guard_init = quote! {
        let _memtrail = memtrail::GuardBuilder::new()
            #log_path_setter
            #stacks_setter
            .build();
    };

    let body = quote! {
        #guard_init
        #block
    };

    let wrapped_body = if sig.asyncness.is_some() {
        quote! { async { #body }.await }
    } else {
        body
    };

    let output = quote! {
        #vis #sig {
            #wrapped_body
        }
    };

    output.into()
}

// When tracking is disabled with the memtrail-off feature the attribute leaves
// the entry point untouched: no guard, no log sink, no report.
#[cfg(feature = "memtrail-off")]
#[proc_macro_attribute]
pub fn main(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}
