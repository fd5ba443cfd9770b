//! Line classification for `.proto` sources

use std::sync::LazyLock;

use regex::Regex;

static PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^package\s+([^\s;]+)\s*;?$").expect("Invalid package regex")
});

static JAVA_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^option\s+java_package\s*=").expect("Invalid java_package regex")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s+(?:(public|weak)\s+)?"([^"]*)"\s*;?$"#).expect("Invalid import regex")
});

static MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^message\s+([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid message regex")
});

static SUB_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:enum|oneof)\s+[A-Za-z_]").expect("Invalid sub-block regex"));

/// What a single source line means to the patcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Package { namespace: &'a str },
    JavaPackage,
    Import { modifier: &'a str, path: &'a str },
    /// `option (<annotation>) ...`
    Annotation,
    /// `message Name`, with the byte offset of its opening brace when on the same line
    MessageOpen { name: &'a str, brace: Option<usize> },
    /// `enum` or `oneof`; `enters` is false when the block closes on the same line
    SubBlockOpen { enters: bool },
    /// Anything else, with its unquoted brace counts
    Other { opens: usize, closes: usize },
}

/// Classify `line`. `annotation_prefix` is `option (<annotation>)`.
pub(crate) fn classify<'a>(line: &'a str, annotation_prefix: &str) -> Line<'a> {
    let code = code(line);
    let trimmed = code.trim();

    if let Some(caps) = PACKAGE.captures(trimmed)
        && let Some(namespace) = caps.get(1)
    {
        return Line::Package {
            namespace: namespace.as_str(),
        };
    }

    if JAVA_PACKAGE.is_match(trimmed) {
        return Line::JavaPackage;
    }

    if let Some(caps) = IMPORT.captures(trimmed) {
        return Line::Import {
            modifier: caps.get(1).map_or("", |m| m.as_str()),
            path: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }

    if !annotation_prefix.is_empty() && trimmed.starts_with(annotation_prefix) {
        return Line::Annotation;
    }

    if let Some(caps) = MESSAGE.captures(trimmed)
        && let Some(name) = caps.get(1)
    {
        return Line::MessageOpen {
            name: name.as_str(),
            brace: first_open_brace(code),
        };
    }

    let (opens, closes) = braces(code);

    if SUB_BLOCK.is_match(trimmed) {
        return Line::SubBlockOpen {
            enters: opens > closes,
        };
    }

    Line::Other { opens, closes }
}

/// The part of `line` before a `//` comment that is not inside a string literal.
pub(crate) fn code(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut previous_slash = false;

    for (idx, ch) in line.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                previous_slash = false;
            }
            '/' if previous_slash => return &line[..idx - 1],
            '/' => previous_slash = true,
            _ => previous_slash = false,
        }
    }

    line
}

/// Count `{` and `}` outside string literals.
pub(crate) fn braces(code: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    visit_unquoted(code, |_, ch| {
        match ch {
            '{' => opens += 1,
            '}' => closes += 1,
            _ => {}
        }
        true
    });
    (opens, closes)
}

fn first_open_brace(code: &str) -> Option<usize> {
    let mut found = None;
    visit_unquoted(code, |idx, ch| {
        if ch == '{' {
            found = Some(idx);
            return false;
        }
        true
    });
    found
}

/// Call `visit` for each character outside quotes until it returns false.
fn visit_unquoted(code: &str, mut visit: impl FnMut(usize, char) -> bool) {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in code.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch == '"' || ch == '\'' {
            quote = Some(ch);
        } else if !visit(idx, ch) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "option (ann)";

    #[test]
    fn test_package_line() {
        assert_eq!(
            classify("package foo.bar;", PREFIX),
            Line::Package {
                namespace: "foo.bar"
            }
        );
        assert_eq!(
            classify("package foo.bar; // trailing", PREFIX),
            Line::Package {
                namespace: "foo.bar"
            }
        );
    }

    #[test]
    fn test_import_with_modifier() {
        assert_eq!(
            classify(r#"import public "a/b.proto";"#, PREFIX),
            Line::Import {
                modifier: "public",
                path: "a/b.proto"
            }
        );
        assert_eq!(
            classify(r#"import "a/b.proto";"#, PREFIX),
            Line::Import {
                modifier: "",
                path: "a/b.proto"
            }
        );
    }

    #[test]
    fn test_message_with_body_on_same_line() {
        let line = "  message Bar { uint32 x = 1; }";
        assert_eq!(
            classify(line, PREFIX),
            Line::MessageOpen {
                name: "Bar",
                brace: Some(14)
            }
        );
    }

    #[test]
    fn test_message_brace_on_next_line() {
        assert_eq!(
            classify("message Foo", PREFIX),
            Line::MessageOpen {
                name: "Foo",
                brace: None
            }
        );
    }

    #[test]
    fn test_field_named_message_is_not_a_block() {
        assert_eq!(
            classify("  string message = 1;", PREFIX),
            Line::Other {
                opens: 0,
                closes: 0
            }
        );
    }

    #[test]
    fn test_sub_blocks() {
        assert_eq!(
            classify("  oneof kind {", PREFIX),
            Line::SubBlockOpen { enters: true }
        );
        assert_eq!(
            classify("enum E { A = 0; }", PREFIX),
            Line::SubBlockOpen { enters: false }
        );
    }

    #[test]
    fn test_annotation_and_java_package() {
        assert_eq!(
            classify(r#"    option (ann) = "x.Y";"#, PREFIX),
            Line::Annotation
        );
        assert_eq!(
            classify(r#"option java_package = "com.x";"#, PREFIX),
            Line::JavaPackage
        );
    }

    #[test]
    fn test_braces_in_strings_and_comments_are_ignored() {
        assert_eq!(
            classify(r#"string s = 1 [default = "}"]; // }"#, PREFIX),
            Line::Other {
                opens: 0,
                closes: 0
            }
        );
        assert_eq!(
            classify("service Api { // {", PREFIX),
            Line::Other {
                opens: 1,
                closes: 0
            }
        );
    }

    #[test]
    fn test_code_keeps_urls_inside_strings() {
        let line = r#"option go_package = "https://example.com/x"; // note"#;
        assert_eq!(code(line), r#"option go_package = "https://example.com/x"; "#);
    }
}
