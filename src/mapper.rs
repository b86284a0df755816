//! Pair/set mappers (spec.md §4.3): walk a fully-parsed tree and produce
//! the removal sets the `SetRewriter` consumes.
//!
//! spec.md's mappers are specified against a fully elaborated semantic
//! model (symbols, scopes, resolved port connections) — a real SystemVerilog
//! elaborator is explicitly out of scope here (spec.md §1, "the real
//! elaborator is an external collaborator"). What follows is a heuristic
//! stand-in grounded directly in syntax: names are matched as text rather
//! than resolved through scopes. It is intentionally conservative — a
//! mapper that can't confidently pair two ranges just emits nothing for
//! that symbol rather than guessing, since an incomplete removal set is
//! simply discarded by the `SetRewriter` (spec.md §4.5) and costs nothing
//! but an oracle round-trip.

use crate::source_range::SourceRange;
use crate::sv_kinds::mapper as k;
use crate::tree::SyntaxNode;

/// Walk every descendant of `root` (including `root` itself), depth-first.
fn walk<'a, F: FnMut(SyntaxNode<'a>)>(n: SyntaxNode<'a>, f: &mut F) {
    f(n);
    for child in n.children() {
        walk(child, f);
    }
}

fn collect_kind<'a>(root: SyntaxNode<'a>, kind: &str) -> Vec<SyntaxNode<'a>> {
    let mut out = Vec::new();
    walk(root, &mut |n| {
        if n.kind() == kind {
            out.push(n);
        }
    });
    out
}

/// Best-effort identifier text for a declaration/reference node: the text of
/// its first named child whose kind looks like an identifier production, or
/// (failing that) the node's own text trimmed. Good enough for name-based
/// pairing; not a scope-aware symbol lookup.
fn identifier_name(n: SyntaxNode<'_>) -> Option<String> {
    for child in n.children() {
        if child.kind().contains("identifier") || child.kind() == "simple_identifier" {
            return Some(child.text().trim().to_string());
        }
    }
    None
}

/// **External-method mapper** (spec.md §4.3): pairs an `extern` method
/// prototype with its out-of-line definition by method name. Unmatched
/// prototypes (no out-of-line body found, e.g. a pure virtual) still emit a
/// singleton set so the prototype remains reducible on its own.
pub fn external_method_removal_sets(root: SyntaxNode<'_>) -> Vec<Vec<SourceRange>> {
    let impls = collect_kind(root, k::CLASS_METHOD_DECLARATION);
    let mut sets = Vec::new();
    for proto in collect_kind(root, k::EXTERN_TF_DECLARATION) {
        let Some(name) = identifier_name(proto) else {
            continue;
        };
        let mut set = vec![proto.range()];
        if let Some(implementation) = impls
            .iter()
            .find(|i| identifier_name(**i).as_deref() == Some(name.as_str()))
        {
            set.push(implementation.range());
        }
        sets.push(set);
    }
    sets
}

/// **Port mapper** (spec.md §4.3): for every named port connection at an
/// instantiation site, pair it with the matching `ansi_port_declaration` of
/// the same name found anywhere in the file (a same-file proxy for "the
/// instantiated module's port list", since cross-module symbol resolution
/// is out of scope). Defined-but-unconnected ports are not discoverable
/// from syntax alone under this approximation and are skipped — see
/// DESIGN.md, "Port mapper approximation".
pub fn port_removal_sets(root: SyntaxNode<'_>) -> Vec<Vec<SourceRange>> {
    let port_defs = collect_kind(root, k::PORT_DECLARATION);
    let mut sets = Vec::new();
    for instantiation in collect_kind(root, k::MODULE_INSTANTIATION) {
        for connection in collect_kind(instantiation, k::NAMED_PORT_CONNECTION) {
            let Some(name) = identifier_name(connection) else {
                continue;
            };
            let matching_def = port_defs
                .iter()
                .find(|d| identifier_name(**d).as_deref() == Some(name.as_str()));
            let mut set = vec![connection.range()];
            if let Some(def) = matching_def {
                set.push(def.range());
            }
            sets.push(set);
        }
    }
    sets
}

/// **Struct-field mapper** (spec.md §4.3): pairs each structure-pattern
/// setter key with the field it initializes (matched by name against the
/// field-list entries of the enclosing data type where the pattern appears
/// syntactically inside one, or emitted alone otherwise).
pub fn struct_field_removal_sets(root: SyntaxNode<'_>) -> Vec<Vec<SourceRange>> {
    let mut sets = Vec::new();
    for pattern in collect_kind(root, k::ASSIGNMENT_PATTERN) {
        for key in collect_kind(pattern, k::STRUCTURE_PATTERN_KEY) {
            let Some(name) = identifier_name(key) else {
                continue;
            };
            let field_def = collect_kind(root, crate::sv_kinds::member::STRUCT_UNION_MEMBER)
                .into_iter()
                .find(|m| identifier_name(*m).as_deref() == Some(name.as_str()));
            let mut set = vec![key.range()];
            if let Some(def) = field_def {
                set.push(def.range());
            }
            sets.push(set);
        }
    }
    sets
}

/// **Formal-argument mapper** (spec.md §4.3): registers each subroutine's
/// formal argument declarations — one removal set *per formal* — then for
/// every call to that subroutine appends the matching positional actual's
/// range into that same formal's set (`min(|formals|, |actuals|)` pairs,
/// per spec.md). Removing one formal therefore does not force removing the
/// routine's other formals in the same attempt.
pub fn formal_argument_removal_sets(root: SyntaxNode<'_>) -> Vec<Vec<SourceRange>> {
    let mut routines: Vec<(String, Vec<SourceRange>)> = Vec::new();
    for decl_kind in [k::FUNCTION_DECLARATION, k::TASK_DECLARATION] {
        for decl in collect_kind(root, decl_kind) {
            let Some(name) = identifier_name(decl) else {
                continue;
            };
            let formals: Vec<SourceRange> = collect_kind(decl, k::TF_PORT_ITEM)
                .iter()
                .map(SyntaxNode::range)
                .collect();
            if !formals.is_empty() {
                routines.push((name, formals));
            }
        }
    }

    // One set per formal, seeded with just that formal's own declaration
    // range; `routine_offsets[i]` is where routine `i`'s first formal's set
    // starts in the flattened `sets` vector.
    let mut sets: Vec<Vec<SourceRange>> = routines
        .iter()
        .flat_map(|(_, formals)| formals.iter().map(|formal| vec![*formal]))
        .collect();
    let mut routine_offsets = Vec::with_capacity(routines.len());
    let mut next_offset = 0usize;
    for (_, formals) in &routines {
        routine_offsets.push(next_offset);
        next_offset += formals.len();
    }

    for call in collect_kind(root, k::SUBROUTINE_CALL) {
        let Some(name) = identifier_name(call) else {
            continue;
        };
        let Some(routine_idx) = routines.iter().position(|(n, _)| n == &name) else {
            continue;
        };
        let Some(args_node) = collect_kind(call, k::LIST_OF_ARGUMENTS).into_iter().next() else {
            continue;
        };
        let actuals: Vec<SourceRange> = args_node.children().map(|c| c.range()).collect();
        let formal_count = routines[routine_idx].1.len();
        let pairs = formal_count.min(actuals.len());
        let base = routine_offsets[routine_idx];
        for (formal_pos, actual_range) in actuals.into_iter().take(pairs).enumerate() {
            sets[base + formal_pos].push(actual_range);
        }
    }

    sets.into_iter().filter(|s| !s.is_empty()).collect()
}
