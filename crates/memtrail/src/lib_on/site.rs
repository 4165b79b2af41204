use std::fmt;

/// Longest file-path or function-name text retained per call site. Anything
/// longer is silently truncated at a char boundary.
pub(crate) const SITE_TEXT_CAP: usize = 255;

/// Call-site provenance: the (file, line, function) triple identifying where a
/// tracked operation was issued.
///
/// Built by the [`callsite!`](crate::callsite) macro; the tracker only stores
/// and formats it and has no say in how it was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    func: &'static str,
}

impl CallSite {
    pub fn new(file: &'static str, line: u32, func: &'static str) -> Self {
        Self {
            file: truncate(file),
            line,
            func: truncate(func),
        }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn func(&self) -> &'static str {
        self.func
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} in {}", self.file, self.line, self.func)
    }
}

fn truncate(s: &'static str) -> &'static str {
    if s.len() <= SITE_TEXT_CAP {
        return s;
    }
    let mut end = SITE_TEXT_CAP;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Captures the call-site provenance of the expansion point.
///
/// Expands to a [`CallSite`] built from `file!()`, `line!()` and the enclosing
/// function's name.
#[macro_export]
macro_rules! callsite {
    () => {
        $crate::CallSite::new(file!(), line!(), $crate::__func_name!())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __func_name {
    () => {{
        fn __here() {}
        fn name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        name_of(__here).trim_end_matches("::__here")
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_long_text() {
        let long: &'static str = Box::leak("x".repeat(400).into_boxed_str());
        let site = CallSite::new(long, 7, long);
        assert_eq!(site.file().len(), SITE_TEXT_CAP);
        assert_eq!(site.func().len(), SITE_TEXT_CAP);
        assert_eq!(site.line(), 7);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'é' is two bytes; 200 of them straddle the 255-byte cap.
        let text: &'static str = Box::leak("é".repeat(200).into_boxed_str());
        let site = CallSite::new(text, 1, "f");
        assert!(site.file().len() <= SITE_TEXT_CAP);
        assert_eq!(site.file().len() % 2, 0);
    }

    #[test]
    fn test_short_text_kept_verbatim() {
        let site = CallSite::new("src/main.rs", 42, "main");
        assert_eq!(site.file(), "src/main.rs");
        assert_eq!(site.func(), "main");
        assert_eq!(format!("{site}"), "src/main.rs:42 in main");
    }

    #[test]
    fn test_callsite_macro_names_enclosing_function() {
        let site = crate::callsite!();
        assert!(site.file().ends_with("site.rs"));
        assert!(
            site.func()
                .ends_with("test_callsite_macro_names_enclosing_function"),
            "unexpected func name: {}",
            site.func()
        );
    }
}
