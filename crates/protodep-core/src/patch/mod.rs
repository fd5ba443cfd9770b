//! Rewriting of vendored `.proto` files
//!
//! A copied file is moved into the namespace implied by its destination path:
//!
//! - `package` is replaced by the destination directories joined with `.`
//! - `option java_package` follows, prefixed with `com.`
//! - every `message` gets `option (<annotation>) = "<old package>.<Message>"`
//!   so generated code can still name the upstream type it derives from
//! - imports of sibling dependencies point into the local output tree
//!
//! Patching never fails. Input that is empty or not UTF-8 is returned as-is.

mod line;

use std::borrow::Cow;

use protodep_fs::NormalizedPath;
use protodep_meta::Dependency;

use line::Line;

const INDENT: &str = "    ";

/// Prefix forced onto `java_package` values.
const JAVA_PACKAGE_PREFIX: &str = "com.";

/// Patches files for one resolution run.
#[derive(Debug, Clone)]
pub struct ProtoPatcher<'a> {
    annotation: &'a str,
    annotation_prefix: String,
    dependencies: &'a [Dependency],
    import_base: &'a str,
}

impl<'a> ProtoPatcher<'a> {
    /// - `annotation`: option name to inject; empty disables patching
    /// - `dependencies`: all manifest dependencies, for import rewriting
    /// - `local_base_dir`: the output sub-directory (`proto_outdir`)
    pub fn new(annotation: &'a str, dependencies: &'a [Dependency], local_base_dir: &'a str) -> Self {
        Self {
            annotation,
            annotation_prefix: format!("option ({annotation})"),
            dependencies,
            import_base: local_base_dir.strip_prefix("./").unwrap_or(local_base_dir),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.annotation.is_empty()
    }

    /// Patch `content`, which will be written to `destination` (relative to the
    /// output root, e.g. `google/protobuf/empty.proto`).
    pub fn patch<'c>(&self, content: &'c [u8], destination: &str) -> Cow<'c, [u8]> {
        if !self.is_enabled() || content.is_empty() {
            return Cow::Borrowed(content);
        }
        let Ok(text) = std::str::from_utf8(content) else {
            tracing::debug!(destination, "Skipping patch of non UTF-8 file");
            return Cow::Borrowed(content);
        };

        let namespace = namespace_for(destination);
        let scan = self.scan(text, &namespace);

        let Some(original_namespace) = scan.original_namespace.as_deref() else {
            return Cow::Owned(scan.lines.join("\n").into_bytes());
        };
        if scan.total_blocks == 0 {
            return Cow::Owned(scan.lines.join("\n").into_bytes());
        }

        let capacity = scan.lines.len() + scan.total_blocks.saturating_sub(scan.already_annotated);
        let mut rewriter = Rewriter {
            patcher: self,
            original_namespace,
            frames: Vec::new(),
            pending_message: None,
            eol: "",
            out: Vec::with_capacity(capacity),
        };
        for line in &scan.lines {
            rewriter.line(line);
        }

        tracing::trace!(
            destination,
            blocks = scan.total_blocks,
            replaced = scan.already_annotated,
            "Patched proto file"
        );

        Cow::Owned(rewriter.out.join("\n").into_bytes())
    }

    /// First pass: rewrite namespace lines and count messages and annotations.
    fn scan<'t>(&self, text: &'t str, namespace: &str) -> Scan<'t> {
        let mut scan = Scan {
            lines: Vec::new(),
            original_namespace: None,
            total_blocks: 0,
            already_annotated: 0,
        };

        for raw in text.split('\n') {
            let (body, eol) = split_line_end(raw);
            let rewritten = match line::classify(body, &self.annotation_prefix) {
                Line::Package { namespace: declared } => {
                    if scan.original_namespace.is_none() {
                        scan.original_namespace = Some(declared.to_string());
                    }
                    (!namespace.is_empty())
                        .then(|| format!("{}package {namespace};", indentation(body)))
                }
                Line::JavaPackage => (!namespace.is_empty()).then(|| {
                    format!(
                        "{}option java_package = \"{}\";",
                        indentation(body),
                        java_package(namespace)
                    )
                }),
                Line::MessageOpen { .. } => {
                    scan.total_blocks += 1;
                    None
                }
                Line::Annotation => {
                    scan.already_annotated += 1;
                    None
                }
                _ => None,
            };
            scan.lines
                .push(rewritten.map_or(Cow::Borrowed(raw), |line| Cow::Owned(line + eol)));
        }

        scan
    }

    fn rewrite_import(&self, raw: &str, modifier: &str, path: &str) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        let dependency = self
            .dependencies
            .iter()
            .find(|dep| dep.target.contains(path))?;

        let target = [self.import_base, dependency.path.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let modifier = if modifier.is_empty() {
            String::new()
        } else {
            format!("{modifier} ")
        };

        Some(format!("{}import {modifier}\"{target}\";", indentation(raw)))
    }
}

/// Destination directories joined with `.`: `x/y/foo.proto` gives `x.y`.
pub fn namespace_for(destination: &str) -> String {
    let path = NormalizedPath::new(destination);
    let segments: Vec<&str> = path.segments().collect();
    segments[..segments.len().saturating_sub(1)].join(".")
}

fn java_package(namespace: &str) -> String {
    if namespace.starts_with(JAVA_PACKAGE_PREFIX) {
        namespace.to_string()
    } else {
        format!("{JAVA_PACKAGE_PREFIX}{namespace}")
    }
}

/// Split a trailing `\r` off a line of CRLF input.
fn split_line_end(raw: &str) -> (&str, &'static str) {
    match raw.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (raw, ""),
    }
}

fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

struct Scan<'t> {
    lines: Vec<Cow<'t, str>>,
    original_namespace: Option<String>,
    total_blocks: usize,
    already_annotated: usize,
}

/// Block the rewriter is currently inside.
#[derive(Debug)]
enum Frame {
    Message(String),
    /// `enum` / `oneof`: nothing inside is annotated
    SubBlock,
    /// `service`, `extend`, aggregate options and anything else with braces
    Opaque,
}

/// Second pass: inject annotations while tracking block nesting.
struct Rewriter<'p, 'a> {
    patcher: &'p ProtoPatcher<'a>,
    original_namespace: &'p str,
    frames: Vec<Frame>,
    /// `message` line seen, `{` expected on a following line
    pending_message: Option<String>,
    /// Line ending of the input line being rewritten, carried onto its output
    eol: &'static str,
    out: Vec<String>,
}

impl Rewriter<'_, '_> {
    fn line(&mut self, raw: &str) {
        let (body, eol) = split_line_end(raw);
        self.eol = eol;
        self.body(body);
    }

    fn emit(&mut self, line: impl Into<String>) {
        let mut line = line.into();
        line.push_str(self.eol);
        self.out.push(line);
    }

    fn body(&mut self, raw: &str) {
        if let Some(name) = self.pending_message.take() {
            let body = raw.trim_start();
            if body.starts_with('{') {
                self.open_message(&name, raw, raw.len() - body.len());
                return;
            }
            if body.trim().is_empty() || body.starts_with("//") {
                self.pending_message = Some(name);
                self.emit(raw);
                return;
            }
        }

        match line::classify(raw, &self.patcher.annotation_prefix) {
            Line::Import { modifier, path } => {
                let rewritten = self.patcher.rewrite_import(raw, modifier, path);
                self.emit(rewritten.unwrap_or_else(|| raw.to_string()));
            }
            Line::Annotation => {
                // regenerated by the enclosing message
                if self.depth() == 0 {
                    self.emit(raw);
                }
            }
            Line::MessageOpen { name, brace } if !self.in_sub_block() => match brace {
                Some(brace) => self.open_message(name, raw, brace),
                None => {
                    self.pending_message = Some(name.to_string());
                    self.emit(raw);
                }
            },
            Line::MessageOpen { .. } => {
                self.emit(raw);
                let (opens, closes) = line::braces(line::code(raw));
                self.balance(opens, closes);
            }
            Line::SubBlockOpen { enters } => {
                self.emit(raw);
                if enters {
                    self.frames.push(Frame::SubBlock);
                }
            }
            Line::Other { opens, closes } => {
                self.emit(raw);
                self.balance(opens, closes);
            }
            Line::Package { .. } | Line::JavaPackage => self.emit(raw),
        }
    }

    /// Emit a message header, inject its annotation, then handle any body
    /// that follows the `{` on the same line.
    fn open_message(&mut self, name: &str, raw: &str, brace: usize) {
        let rest = raw[brace + 1..].trim();
        let split = !rest.is_empty() && !rest.starts_with("//");

        if split {
            self.emit(raw[..=brace].trim_end());
        } else {
            self.emit(raw);
        }

        self.frames.push(Frame::Message(name.to_string()));
        self.inject();

        if split {
            let depth = self.depth();
            let level = if rest.starts_with('}') { depth - 1 } else { depth };
            self.body(&format!("{}{rest}", INDENT.repeat(level)));
        }
    }

    fn inject(&mut self) {
        let path = self
            .frames
            .iter()
            .filter_map(|frame| match frame {
                Frame::Message(name) => Some(name.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(".");

        self.emit(format!(
            "{}{} = \"{}.{path}\";",
            INDENT.repeat(self.depth()),
            self.patcher.annotation_prefix,
            self.original_namespace
        ));
    }

    fn balance(&mut self, opens: usize, closes: usize) {
        if closes > opens {
            for _ in 0..closes - opens {
                self.frames.pop();
            }
        } else {
            for _ in 0..opens - closes {
                self.frames.push(Frame::Opaque);
            }
        }
    }

    /// Number of enclosing messages.
    fn depth(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| matches!(frame, Frame::Message(_)))
            .count()
    }

    fn in_sub_block(&self) -> bool {
        self.frames.iter().any(|frame| matches!(frame, Frame::SubBlock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patch(content: &str, destination: &str) -> String {
        let patcher = ProtoPatcher::new("ann", &[], "./proto");
        String::from_utf8(patcher.patch(content.as_bytes(), destination).into_owned()).unwrap()
    }

    #[test]
    fn test_namespace_for_destination() {
        assert_eq!(namespace_for("x/y/foo.proto"), "x.y");
        assert_eq!(namespace_for("./google/protobuf/empty.proto"), "google.protobuf");
        assert_eq!(namespace_for("foo.proto"), "");
    }

    #[test]
    fn test_java_package_prefix_not_doubled() {
        assert_eq!(java_package("x.y"), "com.x.y");
        assert_eq!(java_package("com.x.y"), "com.x.y");
    }

    #[test]
    fn test_disabled_patcher_borrows_input() {
        let patcher = ProtoPatcher::new("", &[], "proto");
        let content = b"package a;\nmessage A {}\n";

        assert!(matches!(patcher.patch(content, "x/a.proto"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_non_utf8_is_returned_unchanged() {
        let patcher = ProtoPatcher::new("ann", &[], "proto");
        let content = [0x70, 0xff, 0xfe, 0x0a];

        assert_eq!(patcher.patch(&content, "x/a.proto").as_ref(), &content);
    }

    #[test]
    fn test_empty_message_on_one_line() {
        let out = patch("package a;\nmessage Empty {}\n", "x/e.proto");

        assert_eq!(
            out,
            "package x;\nmessage Empty {\n    option (ann) = \"a.Empty\";\n}\n"
        );
    }

    #[test]
    fn test_brace_on_following_line() {
        let out = patch("package a;\nmessage A\n{\n  int32 v = 1;\n}\n", "x/a.proto");

        assert_eq!(
            out,
            "package x;\nmessage A\n{\n    option (ann) = \"a.A\";\n  int32 v = 1;\n}\n"
        );
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let input = "package a;\r\noption java_package = \"com.a\";\r\nmessage A {\r\n  message B { int32 v = 1; }\r\n}\r\n";
        let out = patch(input, "x/a.proto");

        assert_eq!(
            out,
            "package x;\r\noption java_package = \"com.x\";\r\nmessage A {\r\n    option (ann) = \"a.A\";\r\n  message B {\r\n        option (ann) = \"a.A.B\";\r\n        int32 v = 1; }\r\n}\r\n"
        );
    }

    #[test]
    fn test_service_braces_do_not_pop_messages() {
        let input = "package a;\nservice S {\n  rpc Get(A) returns (A) {\n    option (http) = { get: \"/a\" };\n  }\n}\nmessage A {\n}\n";
        let out = patch(input, "x/a.proto");

        assert!(out.contains("message A {\n    option (ann) = \"a.A\";\n}"));
        assert_eq!(out.matches("option (ann)").count(), 1);
    }
}
