//! Tree dumpers & diagnostics (spec.md §2 item 9): depth-first pretty
//! printers used by `--dump-trees`, plus type-name demangling for trace
//! `type_info` columns that carry a Rust type name rather than a grammar
//! kind string.

use std::fmt::Write as _;

use crate::tree::SyntaxNode;

/// Depth-first syntax dump: one line per node, indented by depth, showing
/// kind and range. Mirrors the original's `dumpSyntax` debug helper.
pub fn dump_syntax(root: SyntaxNode<'_>) -> String {
    let mut out = String::new();
    dump_syntax_rec(root, 0, &mut out);
    out
}

fn dump_syntax_rec(n: SyntaxNode<'_>, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{:indent$}{} {}", "", n.kind(), n.range(), indent = depth * 2);
    for child in n.children() {
        dump_syntax_rec(child, depth + 1, out);
    }
}

/// Elaborated-AST dump: like [`dump_syntax`] but annotates nodes this
/// implementation's heuristic elaborator recognizes as symbol-bearing
/// (declarations), since there is no separate typed AST layer here (see
/// `src/tree.rs` module doc, "edit-text-then-reparse").
pub fn dump_ast(root: SyntaxNode<'_>) -> String {
    let mut out = String::new();
    dump_ast_rec(root, 0, &mut out);
    out
}

fn dump_ast_rec(n: SyntaxNode<'_>, depth: usize, out: &mut String) {
    let tag = if is_symbol_bearing(n.kind()) { " [symbol]" } else { "" };
    let _ = writeln!(out, "{:indent$}{}{}", "", n.kind(), tag, indent = depth * 2);
    for child in n.children() {
        dump_ast_rec(child, depth + 1, out);
    }
}

fn is_symbol_bearing(kind: &str) -> bool {
    matches!(
        kind,
        "module_declaration"
            | "class_declaration"
            | "function_declaration"
            | "task_declaration"
            | "ansi_port_declaration"
            | "class_method_declaration"
            | "extern_tf_declaration"
            | "struct_union_member"
    )
}

/// Strips a Rust type's module-path prefix for trace readability, e.g.
/// `sv_bugpoint::rewriter::one_time::OneTimeRewriter` -> `OneTimeRewriter`.
/// The original tool ran `typeid(T).name()` through a demangler for the
/// same reason (spec.md §2 item 9); Rust type names aren't mangled, so this
/// is purely a path-prefix trim.
pub fn demangle_type_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}
