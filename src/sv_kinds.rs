//! Grammar node-kind names used to classify `tree-sitter-systemverilog`
//! parse nodes into the categories the spec's rewriters handle.
//!
//! The upstream C++ implementation (`original_source/sv-bugpoint.cpp`)
//! dispatches on slang's typed syntax classes (`ModuleDeclarationSyntax`,
//! `ContinuousAssignSyntax`, ...). `tree-sitter-systemverilog` exposes the
//! analogous IEEE 1800 grammar productions as snake_case node kinds; the
//! names below are this crate's mapping from one to the other. Centralizing
//! them here means every rewriter/mapper shares one source of truth instead
//! of re-deriving it.

/// Kinds handled by `bodyRemover` (whole child-list removal).
pub mod body {
    pub const MODULE_BODY_PARENT: &str = "module_declaration";
    pub const CLASS_BODY_PARENT: &str = "class_declaration";
    pub const FUNCTION_BODY_PARENT: &str = "function_body_declaration";
    pub const BLOCK_BODY_PARENT: &str = "seq_block";

    /// `original_source/source/BodyRemover.cpp` removes a typed field
    /// distinct from the declaration's own header (`node.members` /
    /// `node.items`, never the name, port list, parameter list, or
    /// extends/implements clause). A `tree-sitter-systemverilog` parse has
    /// no such dedicated field — the header and the items are simply
    /// sibling named children of the same declaration node — so this is
    /// the per-parent-kind denylist of header child kinds `bodyRemover`
    /// must exclude from the list it empties.
    pub fn header_child_kinds(parent_kind: &str) -> &'static [&'static str] {
        match parent_kind {
            MODULE_BODY_PARENT => &[
                "module_ansi_header",
                "module_nonansi_header",
                "module_keyword",
                "simple_identifier",
            ],
            CLASS_BODY_PARENT => &[
                "simple_identifier",
                "parameter_port_list",
                "class_extends",
                "interface_class_type",
            ],
            FUNCTION_BODY_PARENT => &[
                "function_data_type_or_implicit",
                "simple_identifier",
                "tf_port_list",
            ],
            BLOCK_BODY_PARENT => &["block_identifier"],
            _ => &[],
        }
    }
}

/// Kinds handled by `bodyPartsRemover` (single-node removal, but still
/// descended into afterwards since their own children may be removable).
pub mod body_parts {
    pub const LOOP_GENERATE: &str = "loop_generate_construct";
    pub const CONCURRENT_ASSERTION: &str = "concurrent_assertion_item";
    pub const ELSE_CLAUSE: &str = "conditional_generate_construct_else_clause";
}

/// Kinds handled by `declRemover`.
pub mod decl {
    pub const FUNCTION: &str = "function_declaration";
    pub const TASK: &str = "task_declaration";
    pub const MODULE: &str = "module_declaration";
    pub const TYPEDEF: &str = "type_declaration";
    pub const CLASS: &str = "class_declaration";
    pub const EXTENDS: &str = "class_extends";
    pub const IMPLEMENTS: &str = "interface_class_type";
    pub const CONSTRAINT: &str = "constraint_declaration";
    pub const METHOD_DECLARATION: &str = "class_method_declaration";
    pub const METHOD_PROTOTYPE: &str = "class_method_prototype";
    pub const EXTERN_METHOD_PROTOTYPE: &str = "extern_tf_declaration";
}

/// Kinds handled by `statementsRemover`.
pub mod statements {
    pub const PROCEDURAL_BLOCK: &str = "always_construct";
    pub const PROCEDURAL_BLOCK_INITIAL: &str = "initial_construct";
    pub const PROCEDURAL_BLOCK_FINAL: &str = "final_construct";
    pub const STATEMENT: &str = "statement_or_null";
    pub const LOCAL_VAR_DECL: &str = "variable_decl_assignment";
}

/// Kinds handled by `importsRemover`.
pub mod imports {
    pub const PACKAGE_IMPORT: &str = "package_import_declaration";
}

/// Kinds handled by `memberRemover` (no descent: the whole subtree is a leaf
/// from the reducer's point of view once it's a candidate).
pub mod member {
    pub const DATA_DECLARATION: &str = "data_declaration";
    pub const NET_DECLARATION: &str = "net_declaration";
    pub const STRUCT_UNION_MEMBER: &str = "struct_union_member";
    pub const DECLARATOR: &str = "variable_decl_assignment";
    pub const PARAMETER_DECL_STATEMENT: &str = "local_parameter_declaration";
    pub const PARAMETER_DECL: &str = "parameter_declaration";
    pub const CLASS_PROPERTY: &str = "class_property";
}

pub mod param_assign {
    pub const PARAMETER_VALUE_ASSIGNMENT: &str = "parameter_value_assignment";
}

pub mod cont_assign {
    pub const CONTINUOUS_ASSIGN: &str = "continuous_assign";
}

pub mod modport {
    pub const MODPORT_DECLARATION: &str = "modport_declaration";
}

pub mod instantiation {
    pub const HIERARCHY_INSTANTIATION: &str = "module_instantiation";
}

pub mod bind {
    pub const BIND_DIRECTIVE: &str = "bind_directive";
}

pub mod module {
    pub const MODULE_DECLARATION: &str = "module_declaration";
}

pub mod label {
    pub const NAMED_BLOCK_END_LABEL: &str = "block_identifier";
}

/// Kinds eligible for `typeSimplifier`'s replacement. Anything of kind
/// `data_type` that isn't already one of these primitive shapes is
/// replaced by a synthesized `int` token.
pub mod data_type {
    pub const DATA_TYPE: &str = "data_type";
    pub const INTEGER_VECTOR_TYPE: &str = "integer_vector_type";
    pub const INTEGER_ATOM_TYPE: &str = "integer_atom_type";
    pub const KEYWORD_INT: &str = "int";
    pub const IMPLICIT_DATA_TYPE: &str = "implicit_data_type";

    pub const PRIMITIVE_SHAPES: &[&str] =
        &[INTEGER_VECTOR_TYPE, INTEGER_ATOM_TYPE, KEYWORD_INT, IMPLICIT_DATA_TYPE];
}

/// Kinds used by the pair/set mappers (§4.3).
pub mod mapper {
    pub const MODULE_INSTANTIATION: &str = "module_instantiation";
    pub const HIERARCHICAL_INSTANCE: &str = "hierarchical_instance";
    pub const NAMED_PORT_CONNECTION: &str = "named_port_connection";
    pub const PORT_DECLARATION: &str = "ansi_port_declaration";
    pub const EXTERN_TF_DECLARATION: &str = "extern_tf_declaration";
    pub const CLASS_METHOD_DECLARATION: &str = "class_method_declaration";
    pub const ASSIGNMENT_PATTERN: &str = "assignment_pattern";
    pub const STRUCTURE_PATTERN_KEY: &str = "structure_pattern_key";
    pub const FUNCTION_DECLARATION: &str = "function_declaration";
    pub const TASK_DECLARATION: &str = "task_declaration";
    pub const TF_PORT_ITEM: &str = "tf_port_item";
    pub const SUBROUTINE_CALL: &str = "subroutine_call";
    pub const LIST_OF_ARGUMENTS: &str = "list_of_arguments";
}

/// Returns true if `kind` is one of the node categories the single-site
/// rewriter family ever marks as a *list* container (as opposed to a
/// single required child), which is this implementation's approximation
/// of the original parser's per-child `isChildOptional` mark (see
/// DESIGN.md, "Per-child optionality").
pub fn is_list_like_container(kind: &str) -> bool {
    matches!(
        kind,
        "module_declaration"
            | "class_declaration"
            | "function_body_declaration"
            | "seq_block"
            | "generate_block"
            | "package_declaration"
            | "list_of_port_connections"
            | "list_of_arguments"
            | "struct_union_member_list"
    )
}
