//! Allocation-time stack capture for leak reports.
//!
//! Frames are captured unresolved when the record is created and symbolized
//! lazily when the leak report runs, so tracked allocations stay cheap. The
//! unwinder is an external facility: without the `backtrace` feature nothing
//! is ever captured and the report substitutes an "unavailable" marker.

cfg_if::cfg_if! {
    if #[cfg(feature = "backtrace")] {
        pub(crate) struct Stack(backtrace::Backtrace);

        impl Stack {
            pub(crate) fn capture() -> Option<Stack> {
                Some(Stack(backtrace::Backtrace::new_unresolved()))
            }

            /// Resolves symbols and renders one human-readable line per frame.
            pub(crate) fn frames(&mut self) -> Vec<String> {
                self.0.resolve();
                let mut lines = Vec::new();
                for (n, frame) in self.0.frames().iter().enumerate() {
                    let symbol = frame.symbols().first();
                    let name = symbol
                        .and_then(|s| s.name())
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    match symbol.and_then(|s| s.filename().map(|f| (f, s.lineno()))) {
                        Some((file, Some(line))) => {
                            lines.push(format!("frame #{n}: {name} ({}:{line})", file.display()));
                        }
                        _ => lines.push(format!("frame #{n}: {name}")),
                    }
                }
                lines
            }
        }
    } else {
        // Without an unwinder nothing is ever captured; the type only keeps
        // the record layout and the report's "unavailable" path uniform.
        #[allow(dead_code)]
        pub(crate) struct Stack;

        #[allow(dead_code)]
        impl Stack {
            pub(crate) fn capture() -> Option<Stack> {
                None
            }

            pub(crate) fn frames(&mut self) -> Vec<String> {
                Vec::new()
            }
        }
    }
}
