use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Wrap a system with drop-guard timing when the `perf_stats` feature is
/// enabled.
///
/// The guard logs through `bevy::prelude::info!` when the system ran longer
/// than the threshold (default 1 ms, override with `#[profile(N)]`). If the
/// function takes a `tick: Res<SimTick>` parameter, the guard additionally
/// logs every 100 ticks so slow-but-steady systems still show up in traces.
///
/// Without `perf_stats` the attribute leaves the function untouched, so
/// there is no cost in release builds of the simulation.
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name = sig.ident.to_string();

    // A parameter literally named `tick` with a SimTick type opts the
    // system into tick-gated logging.
    let has_tick = sig.inputs.iter().any(|arg| match arg {
        FnArg::Typed(pat_type) => {
            let ty = &pat_type.ty;
            matches!(&*pat_type.pat, Pat::Ident(ident) if ident.ident == "tick")
                && quote!(#ty).to_string().contains("SimTick")
        }
        FnArg::Receiver(_) => false,
    });

    let tick_value = if has_tick {
        quote! { Some(tick.0) }
    } else {
        quote! { None }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    tick: Option<u64>,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        let periodic = self.tick.map(|t| t % 100 == 0).unwrap_or(false);
                        if elapsed.as_millis() > #threshold_ms || periodic {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name,
                    start: std::time::Instant::now(),
                    tick: #tick_value,
                }
            };

            #block
        }
    };

    output.into()
}
