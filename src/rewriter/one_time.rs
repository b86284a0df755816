//! The `OneTimeRewriter` family (spec.md §4.4): a single traversal
//! algorithm parameterized by a table of handled node categories, driving
//! the six-state cursor machine described in spec.md §3 "Rewriter State".

use crate::rewriter::SizeSieve;
use crate::source_range::SourceRange;
use crate::sv_kinds;
use crate::tree::{SyntaxNode, SyntaxTree};

/// spec.md §3 "Rewriter State".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriterState {
    SkipToStart,
    RemovalAllowed,
    RegisterChild,
    ExitRewritePoint,
    RegisterSuccessor,
    SkipToEnd,
}

/// How a handled category is edited when eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    /// `considerRemoval`: delete the single node.
    Node,
    /// `considerChildListRemoval`: delete every child in the node's list in
    /// one atomic edit (used by `bodyRemover`, which empties whole bodies).
    ChildList,
    /// `considerReplacement`: swap the node for a synthesized `int` token
    /// (used only by the type simplifier, spec.md §4.8).
    ReplaceWithInt,
}

#[derive(Debug, Clone, Copy)]
pub struct HandledCategory {
    pub kind: &'static str,
    pub mode: RemovalMode,
}

const fn node(kind: &'static str) -> HandledCategory {
    HandledCategory {
        kind,
        mode: RemovalMode::Node,
    }
}

/// One rewriter instantiation: a name (used as the stage id in the trace),
/// the node kinds it handles and how, and whether it keeps descending into
/// children after having handled a node (spec.md §4.4 table).
pub struct OneTimeRewriterSpec {
    pub name: &'static str,
    pub handled: &'static [HandledCategory],
    pub descend_after_handle: bool,
}

macro_rules! spec_table {
    ($name:ident, $display:expr, $descend:expr, [$($kind:expr),+ $(,)?]) => {
        pub static $name: OneTimeRewriterSpec = OneTimeRewriterSpec {
            name: $display,
            handled: &[$(node($kind)),+],
            descend_after_handle: $descend,
        };
    };
}

pub static BODY_REMOVER: OneTimeRewriterSpec = OneTimeRewriterSpec {
    name: "bodyRemover",
    handled: &[
        HandledCategory {
            kind: sv_kinds::body::MODULE_BODY_PARENT,
            mode: RemovalMode::ChildList,
        },
        HandledCategory {
            kind: sv_kinds::body::CLASS_BODY_PARENT,
            mode: RemovalMode::ChildList,
        },
        HandledCategory {
            kind: sv_kinds::body::FUNCTION_BODY_PARENT,
            mode: RemovalMode::ChildList,
        },
        HandledCategory {
            kind: sv_kinds::body::BLOCK_BODY_PARENT,
            mode: RemovalMode::ChildList,
        },
    ],
    descend_after_handle: true,
};

spec_table!(
    BODY_PARTS_REMOVER,
    "bodyPartsRemover",
    true,
    [
        sv_kinds::body_parts::LOOP_GENERATE,
        sv_kinds::body_parts::CONCURRENT_ASSERTION,
        sv_kinds::body_parts::ELSE_CLAUSE,
    ]
);

spec_table!(
    DECL_REMOVER,
    "declRemover",
    true,
    [
        sv_kinds::decl::FUNCTION,
        sv_kinds::decl::TASK,
        sv_kinds::decl::MODULE,
        sv_kinds::decl::TYPEDEF,
        sv_kinds::decl::CLASS,
        sv_kinds::decl::EXTENDS,
        sv_kinds::decl::IMPLEMENTS,
        sv_kinds::decl::CONSTRAINT,
        sv_kinds::decl::METHOD_DECLARATION,
        sv_kinds::decl::METHOD_PROTOTYPE,
        sv_kinds::decl::EXTERN_METHOD_PROTOTYPE,
    ]
);

spec_table!(
    STATEMENTS_REMOVER,
    "statementsRemover",
    true,
    [
        sv_kinds::statements::PROCEDURAL_BLOCK,
        sv_kinds::statements::PROCEDURAL_BLOCK_INITIAL,
        sv_kinds::statements::PROCEDURAL_BLOCK_FINAL,
        sv_kinds::statements::STATEMENT,
        sv_kinds::statements::LOCAL_VAR_DECL,
    ]
);

spec_table!(
    IMPORTS_REMOVER,
    "importsRemover",
    true,
    [sv_kinds::imports::PACKAGE_IMPORT]
);

spec_table!(
    MEMBER_REMOVER,
    "memberRemover",
    false,
    [
        sv_kinds::member::DATA_DECLARATION,
        sv_kinds::member::NET_DECLARATION,
        sv_kinds::member::STRUCT_UNION_MEMBER,
        sv_kinds::member::DECLARATOR,
        sv_kinds::member::PARAMETER_DECL_STATEMENT,
        sv_kinds::member::PARAMETER_DECL,
        sv_kinds::member::CLASS_PROPERTY,
    ]
);

spec_table!(
    PARAM_ASSIGN_REMOVER,
    "paramAssignRemover",
    false,
    [sv_kinds::param_assign::PARAMETER_VALUE_ASSIGNMENT]
);

spec_table!(
    CONT_ASSIGN_REMOVER,
    "contAssignRemover",
    false,
    [sv_kinds::cont_assign::CONTINUOUS_ASSIGN]
);

spec_table!(
    MODPORT_REMOVER,
    "modportRemover",
    false,
    [sv_kinds::modport::MODPORT_DECLARATION]
);

spec_table!(
    INSTANTIATION_REMOVER,
    "instantiationRemover",
    false,
    [sv_kinds::instantiation::HIERARCHY_INSTANTIATION]
);

spec_table!(
    BIND_REMOVER,
    "bindRemover",
    false,
    [sv_kinds::bind::BIND_DIRECTIVE]
);

spec_table!(
    MODULE_REMOVER,
    "moduleRemover",
    false,
    [sv_kinds::module::MODULE_DECLARATION]
);

spec_table!(
    LABEL_REMOVER,
    "labelRemover",
    false,
    [sv_kinds::label::NAMED_BLOCK_END_LABEL]
);

pub static TYPE_SIMPLIFIER: OneTimeRewriterSpec = OneTimeRewriterSpec {
    name: "typeSimplifier",
    handled: &[HandledCategory {
        kind: sv_kinds::data_type::DATA_TYPE,
        mode: RemovalMode::ReplaceWithInt,
    }],
    descend_after_handle: true,
};

/// One candidate edit found by a single `transform` call.
#[derive(Debug, Clone)]
enum Edit {
    RemoveNode(SourceRange),
    RemoveChildList { ranges: Vec<SourceRange> },
    Replace { range: SourceRange, text: String },
}

impl Edit {
    fn apply(&self, tree: &SyntaxTree) -> Result<SyntaxTree, String> {
        match self {
            Edit::RemoveNode(range) => tree.with_range_removed(*range),
            Edit::RemoveChildList { ranges } => tree.with_ranges_removed(ranges),
            Edit::Replace { range, text } => tree.with_range_replaced(*range, text),
        }
    }
}

/// A single-site incremental rewriter instance. Constructed fresh for every
/// reducer-loop stage (spec.md §3, "Lifecycle": "Rewriter objects are
/// created fresh at each stage; they carry only cursor state, not tree
/// state.").
pub struct OneTimeRewriter {
    spec: &'static OneTimeRewriterSpec,
    state: RewriterState,
    start_point: SourceRange,
    sieve: SizeSieve,

    // transient, recomputed by every `transform` call:
    rewrite_point: SourceRange,
    child_fallback: SourceRange,
    successor: SourceRange,
    found_edit: Option<Edit>,
    removed_type_tag: Option<&'static str>,
}

impl OneTimeRewriter {
    pub fn new(spec: &'static OneTimeRewriterSpec) -> Self {
        Self::with_sieve(spec, SizeSieve::new())
    }

    pub fn with_sieve(spec: &'static OneTimeRewriterSpec, sieve: SizeSieve) -> Self {
        OneTimeRewriter {
            spec,
            state: RewriterState::RemovalAllowed,
            start_point: SourceRange::NO_LOCATION,
            sieve,
            rewrite_point: SourceRange::NO_LOCATION,
            child_fallback: SourceRange::NO_LOCATION,
            successor: SourceRange::NO_LOCATION,
            found_edit: None,
            removed_type_tag: None,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        self.spec.name
    }

    pub fn sieve(&self) -> SizeSieve {
        self.sieve
    }

    pub fn removed_type_tag(&self) -> Option<&'static str> {
        self.removed_type_tag
    }

    /// Apply at most one removal/replacement. Returns the (possibly
    /// unchanged) candidate tree and whether the traversal is exhausted.
    pub fn transform(&mut self, tree: &SyntaxTree) -> Result<(SyntaxTree, bool), String> {
        let entry_state = self.state;
        let entry_start_point = self.start_point;

        loop {
            self.state = entry_state;
            self.start_point = entry_start_point;
            self.rewrite_point = SourceRange::NO_LOCATION;
            self.child_fallback = SourceRange::NO_LOCATION;
            self.successor = SourceRange::NO_LOCATION;
            self.found_edit = None;
            self.removed_type_tag = None;

            self.visit(tree.root(), true);

            let no_progress =
                self.child_fallback.is_no_location() && self.successor.is_no_location();
            if no_progress {
                self.sieve.shrink();
                if self.sieve.exhausted() {
                    return Ok((tree.clone(), true));
                }
                if self.found_edit.is_none() {
                    continue;
                }
            }

            let candidate = match &self.found_edit {
                None => tree.clone(),
                Some(edit) => edit.apply(tree)?,
            };
            return Ok((candidate, false));
        }
    }

    /// `advanceOnCommit`: resume from the successor of the removed node.
    pub fn advance_on_commit(&mut self) {
        self.start_point = self.successor;
        self.state = RewriterState::SkipToStart;
    }

    /// `advanceOnRollback`: resume inside the rejected subtree if possible,
    /// else from its successor. This is what drives scenario C (rollback
    /// descends into a smaller removal inside a rejected subtree).
    pub fn advance_on_rollback(&mut self) {
        self.start_point = if !self.child_fallback.is_no_location() {
            self.child_fallback
        } else {
            self.successor
        };
        self.state = RewriterState::SkipToStart;
    }

    fn visit(&mut self, n: SyntaxNode<'_>, is_optional: bool) {
        let r = n.range();

        // 1.
        if self.state == RewriterState::SkipToStart && r == self.start_point {
            self.state = RewriterState::RemovalAllowed;
        }

        // 2.
        if self.state == RewriterState::RegisterChild
            && !r.is_no_location()
            && r != self.rewrite_point
        {
            self.child_fallback = r;
            self.state = RewriterState::ExitRewritePoint;
            return;
        }

        // 3.
        if self.state == RewriterState::RegisterSuccessor && !r.is_no_location() {
            self.successor = r;
            self.state = RewriterState::SkipToEnd;
            return;
        }

        // 4.
        if self.state == RewriterState::SkipToEnd || self.state == RewriterState::ExitRewritePoint
        {
            return;
        }

        // 5.
        let mut descend = true;
        if let Some(category) = self.spec.handled.iter().find(|c| c.kind == n.kind()) {
            match category.mode {
                RemovalMode::Node => self.consider_removal(n, is_optional),
                RemovalMode::ChildList => self.consider_child_list_removal(n),
                RemovalMode::ReplaceWithInt => {
                    if !sv_kinds::data_type::PRIMITIVE_SHAPES.contains(&n.kind()) {
                        self.consider_replacement(n, " int");
                    }
                }
            }
            descend = self.spec.descend_after_handle;
        }
        if descend {
            for child in n.children() {
                let child_optional = child.is_optional();
                self.visit(child, child_optional);
            }
        }

        // 6.
        if (self.state == RewriterState::RegisterChild
            || self.state == RewriterState::ExitRewritePoint)
            && r == self.rewrite_point
        {
            self.state = RewriterState::RegisterSuccessor;
        }
    }

    fn eligible(&self, lines: u32, is_optional: bool) -> bool {
        self.state == RewriterState::RemovalAllowed && is_optional && self.sieve.in_range(lines)
    }

    fn consider_removal(&mut self, n: SyntaxNode<'_>, is_optional: bool) {
        if !self.eligible(n.line_count(), is_optional) {
            return;
        }
        self.found_edit = Some(Edit::RemoveNode(n.range()));
        self.rewrite_point = n.range();
        self.state = RewriterState::RegisterChild;
        self.removed_type_tag = Some(n.kind());
    }

    fn consider_child_list_removal(&mut self, parent: SyntaxNode<'_>) {
        if self.state != RewriterState::RemovalAllowed {
            return;
        }
        // Only the declaration's item/member list is a removal candidate,
        // never its header (name, port list, parameter list, extends
        // clause, block label, ...) — see `sv_kinds::body::header_child_kinds`.
        let header_kinds = sv_kinds::body::header_child_kinds(parent.kind());
        let children: Vec<_> = parent
            .children()
            .filter(|c| !header_kinds.contains(&c.kind()))
            .collect();
        if children.is_empty() {
            return;
        }
        let span = SourceRange::new(
            children.first().expect("checked non-empty").range().start,
            children.last().expect("checked non-empty").range().end,
        );
        if !self.sieve.in_range(span.line_count(parent.root_source())) {
            return;
        }
        self.found_edit = Some(Edit::RemoveChildList {
            ranges: children.iter().map(|c| c.range()).collect(),
        });
        self.rewrite_point = parent.range();
        self.state = RewriterState::RegisterChild;
        self.removed_type_tag = Some(parent.kind());
    }

    fn consider_replacement(&mut self, n: SyntaxNode<'_>, replacement: &str) {
        // The type simplifier isn't gated on `isOptional`: a data type can
        // be replaced wherever it occurs (spec.md §4.8, "Eligibility uses
        // the standard sieve" — no optionality clause, unlike removal).
        if self.state != RewriterState::RemovalAllowed || !self.sieve.in_range(n.line_count()) {
            return;
        }
        self.found_edit = Some(Edit::Replace {
            range: n.range(),
            text: replacement.to_string(),
        });
        self.rewrite_point = n.range();
        self.state = RewriterState::RegisterChild;
        self.removed_type_tag = Some(n.kind());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_edit_rule() {
        // However many eligible nodes the source contains, one `transform`
        // call changes at most one rewrite-point subtree (invariant 3).
        let source = "\
module m;
  assign a = 1;
  assign b = 2;
  assign c = 3;
endmodule
";
        let tree = SyntaxTree::parse(source).expect("parses");
        let mut rewriter = OneTimeRewriter::new(&CONT_ASSIGN_REMOVER);
        // force the sieve open so that these small statements are eligible
        rewriter.sieve = SizeSieve { lower: 0, upper: u32::MAX };
        let (candidate, _done) = rewriter.transform(&tree).expect("transform should succeed");
        assert!(candidate.source().len() < tree.source().len());
        // exactly one `assign` should have disappeared
        let removed_count =
            source.matches("assign").count() - candidate.source().matches("assign").count();
        assert_eq!(removed_count, 1);
    }

    #[test]
    fn cursor_progress_commit_then_rollback_advance_differently() {
        let mut rewriter = OneTimeRewriter::new(&MODULE_REMOVER);
        rewriter.successor = SourceRange::new(10, 20);
        rewriter.child_fallback = SourceRange::NO_LOCATION;
        rewriter.advance_on_commit();
        assert_eq!(rewriter.start_point, SourceRange::new(10, 20));
        assert_eq!(rewriter.state, RewriterState::SkipToStart);

        rewriter.successor = SourceRange::new(30, 40);
        rewriter.child_fallback = SourceRange::new(12, 18);
        rewriter.advance_on_rollback();
        assert_eq!(rewriter.start_point, SourceRange::new(12, 18));

        rewriter.child_fallback = SourceRange::NO_LOCATION;
        rewriter.advance_on_rollback();
        assert_eq!(rewriter.start_point, SourceRange::new(30, 40));
    }

    #[test]
    fn type_simplifier_never_touches_primitive_shapes() {
        let tree = SyntaxTree::parse("module m;\n  int x;\nendmodule\n").expect("parses");
        let mut rewriter = OneTimeRewriter::new(&TYPE_SIMPLIFIER);
        rewriter.sieve = SizeSieve { lower: 0, upper: u32::MAX };
        let (_candidate, done) = rewriter.transform(&tree).expect("should run");
        // `int` is already primitive: nothing eligible, sieve exhausts.
        assert!(done || rewriter.found_edit.is_none());
    }

    #[test]
    fn body_remover_does_not_panic_on_a_non_leading_module() {
        // `g` starts at a non-zero byte offset; `consider_child_list_removal`
        // must measure line count against the full source, not a substring
        // local to `g`'s own range (the bug this test guards against would
        // panic with an out-of-bounds slice on the second module).
        let source = "\
module m; endmodule
module g;
  assign x = 1;
endmodule
";
        let tree = SyntaxTree::parse(source).expect("parses");
        let mut rewriter = OneTimeRewriter::new(&BODY_REMOVER);
        rewriter.sieve = SizeSieve { lower: 0, upper: u32::MAX };
        let result = rewriter.transform(&tree);
        assert!(result.is_ok());
    }

    #[test]
    fn body_remover_never_deletes_the_module_header() {
        // Only the body member (the `assign`) is a removal candidate; the
        // module's own name must survive so the candidate still parses as
        // the same module.
        let source = "\
module g;
  assign x = 1;
endmodule
";
        let tree = SyntaxTree::parse(source).expect("parses");
        let mut rewriter = OneTimeRewriter::new(&BODY_REMOVER);
        rewriter.sieve = SizeSieve { lower: 0, upper: u32::MAX };
        let (candidate, _done) = rewriter.transform(&tree).expect("transform should succeed");
        assert!(candidate.source().contains('g'));
    }
}
