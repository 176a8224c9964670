//! Python capture handlers.

use super::factory;
use crate::model::{
    ClassDef, ExportInfo, FunctionDef, ImportDef, ImportKind, MethodDef, ParameterDef, Reference,
    ReferenceKind, ReceiverInfo, ReexportNames, ReexportRecord, SelfKeyword, Signature,
    VariableDef,
};
use crate::parsing::builder::{DefinitionBuilder, DirectiveKind, ScopeDirective};
use crate::parsing::capture::{Capture, node_text};
use crate::parsing::context::ProcessingContext;
use crate::parsing::factory::{
    detect_callback_context, detect_function_collection, initializer_text, is_async_callable,
};
use crate::types::{DefKind, ModulePath, SymbolId, SymbolName};
use tracing::debug;

pub fn handle_class(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Class, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_class(ClassDef {
        symbol_id,
        name,
        location,
        scope_id,
        extends: factory::extract_superclasses(capture.node, ctx.source()),
        methods: Vec::new(),
        properties: Vec::new(),
        constructors: Vec::new(),
        export: ExportInfo::private(),
    });
}

/// `def` at module or function scope. Functions directly in a class body
/// match this capture too but belong to the method handler.
pub fn handle_function(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let location = capture.location(ctx.file_path());
    if ctx.directly_in_class_body(&location) {
        return;
    }
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let symbol_id = SymbolId::for_definition(DefKind::Function, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_function(FunctionDef {
        symbol_id,
        name: Some(name),
        location,
        scope_id,
        signature: Signature {
            parameters: Vec::new(),
            return_type: factory::extract_return_type(capture.node, ctx.source())
                .map(SymbolName::new),
        },
        is_async: is_async_callable(capture.node, ctx.source()),
        export: ExportInfo::private(),
        callback_context: None,
    });
}

pub fn handle_method(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let Some((class_name, _)) = ctx.enclosing_class(&location) else {
        debug!("method '{name}' without an enclosing class scope");
        return;
    };
    let class_name = class_name.clone();

    builder.note_definition_name(&ctx.location(name_node));
    builder.add_method_to_class(
        class_name,
        MethodDef {
            symbol_id: SymbolId::for_definition(DefKind::Method, &location, Some(&name)),
            name,
            location,
            parameters: Vec::new(),
            return_type: factory::extract_return_type(capture.node, ctx.source())
                .map(SymbolName::new),
            is_static: factory::has_static_decorator(capture.node, ctx.source()),
            is_async: is_async_callable(capture.node, ctx.source()),
        },
    );
}

pub fn handle_lambda(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let location = capture.location(ctx.file_path());
    let scope_id = ctx.declaring_scope_id(&location);
    builder.add_function(FunctionDef {
        symbol_id: SymbolId::anonymous(&location),
        name: None,
        location,
        scope_id,
        signature: Signature::default(),
        is_async: false,
        export: ExportInfo::private(),
        callback_context: detect_callback_context(capture.node, ctx.source()),
    });
}

pub fn handle_parameter(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let name = SymbolName::new(capture.text(ctx.source()));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Parameter, &location, Some(&name));

    let mut type_annotation = None;
    let mut default_value = None;
    if let Some(parent) = capture.node.parent() {
        match parent.kind() {
            "typed_parameter" | "typed_default_parameter" => {
                type_annotation = parent
                    .child_by_field_name("type")
                    .map(|t| SymbolName::new(node_text(t, ctx.source()).trim()));
                default_value = parent
                    .child_by_field_name("value")
                    .map(|v| initializer_text(v, ctx.source()));
            }
            "default_parameter" => {
                default_value = parent
                    .child_by_field_name("value")
                    .map(|v| initializer_text(v, ctx.source()));
            }
            _ => {}
        }
    }

    let scope_id = ctx.get_scope_id(&location);
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_parameter_to_callable(ParameterDef {
        symbol_id,
        name,
        location,
        type_annotation,
        default_value,
    });
}

/// Assignment targets. The first binding in a scope is a declaration;
/// later ones are reassignments feeding the type-flow phase.
pub fn handle_variable(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let name = SymbolName::new(capture.text(ctx.source()));
    let location = capture.location(ctx.file_path());
    let scope_id = ctx.get_scope_id(&location);

    let assignment = capture.node.parent();
    let value_node = assignment.and_then(|a| a.child_by_field_name("right"));
    let annotation = assignment
        .and_then(|a| a.child_by_field_name("type"))
        .map(|t| node_text(t, ctx.source()).trim().to_string());
    let initializer = value_node.map(|v| initializer_text(v, ctx.source()));

    if builder.scope_declares(&scope_id, &name) {
        if let Some(value) = &initializer {
            builder.record_assignment(name, value.clone(), location);
        }
        return;
    }

    let symbol_id = SymbolId::for_definition(DefKind::Variable, &location, Some(&name));
    builder.note_definition_name(&location);
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.record_declaration(name.clone(), initializer.clone(), location.clone());
    if let Some(annotation) = &annotation {
        builder.record_annotation(name.clone(), annotation.clone(), location.clone());
    }
    builder.add_variable(VariableDef {
        symbol_id,
        name,
        location,
        scope_id,
        type_annotation: annotation.map(SymbolName::new),
        initializer,
        export: ExportInfo::private(),
        import_path: None,
        collection: value_node.and_then(|v| detect_function_collection(v, ctx.source())),
    });
}

/// `import pkg.sub` binds the top-level package name.
pub fn handle_import_module(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let dotted = capture.text(ctx.source());
    let bound = dotted.split('.').next().unwrap_or(dotted);
    let name = SymbolName::new(bound);
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));
    let scope_id = ctx.get_scope_id(&location);

    builder.note_definition_name(&location);
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_import(ImportDef {
        symbol_id,
        name,
        location,
        import_path: ModulePath::new(dotted),
        import_kind: ImportKind::Namespace,
        original_name: None,
        export: ExportInfo::private(),
    });
}

/// `import pkg.sub as ps` — the record sits at the alias node.
pub fn handle_import_module_aliased(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(dotted_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let Some(alias_node) = capture.node.child_by_field_name("alias") else {
        return;
    };
    let dotted = ctx.text(dotted_node);
    let name = SymbolName::new(ctx.text(alias_node));
    let location = ctx.location(alias_node);
    let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));
    let scope_id = ctx.get_scope_id(&location);

    builder.note_definition_name(&location);
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_import(ImportDef {
        symbol_id,
        name,
        location,
        import_path: ModulePath::new(dotted),
        import_kind: ImportKind::Namespace,
        original_name: None,
        export: ExportInfo::private(),
    });
}

/// `from pkg.sub import foo, bar as baz, *`.
pub fn handle_import_from(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(module_node) = capture.node.child_by_field_name("module_name") else {
        return;
    };
    let module = ctx.text(module_node).to_string();

    let mut cursor = capture.node.walk();
    for child in capture.node.named_children(&mut cursor) {
        if child.id() == module_node.id() {
            continue;
        }
        match child.kind() {
            "dotted_name" => {
                let name = SymbolName::new(ctx.text(child));
                let location = ctx.location(child);
                let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));
                let scope_id = ctx.get_scope_id(&location);
                builder.note_definition_name(&location);
                builder.declare(
                    &scope_id,
                    name.clone(),
                    symbol_id.clone(),
                    location.clone(),
                    false,
                );
                builder.add_import(ImportDef {
                    symbol_id,
                    name,
                    location,
                    import_path: ModulePath::new(module.clone()),
                    import_kind: ImportKind::Named,
                    original_name: None,
                    export: ExportInfo::private(),
                });
            }
            "aliased_import" => {
                let Some(original_node) = child.child_by_field_name("name") else {
                    continue;
                };
                let Some(alias_node) = child.child_by_field_name("alias") else {
                    continue;
                };
                let original = SymbolName::new(ctx.text(original_node));
                let name = SymbolName::new(ctx.text(alias_node));
                let location = ctx.location(alias_node);
                let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));
                let scope_id = ctx.get_scope_id(&location);
                builder.note_definition_name(&location);
                builder.declare(
                    &scope_id,
                    name.clone(),
                    symbol_id.clone(),
                    location.clone(),
                    false,
                );
                builder.add_import(ImportDef {
                    symbol_id,
                    name,
                    location,
                    import_path: ModulePath::new(module.clone()),
                    import_kind: ImportKind::Named,
                    original_name: Some(original),
                    export: ExportInfo::private(),
                });
            }
            "wildcard_import" => {
                builder.add_reexport(ReexportRecord {
                    source: ModulePath::new(module.clone()),
                    names: ReexportNames::All,
                    location: ctx.location(child),
                });
            }
            _ => {}
        }
    }
}

pub fn handle_call(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    builder.add_reference(Reference {
        kind: ReferenceKind::Call,
        location: capture.location(ctx.file_path()),
        name: SymbolName::new(capture.text(ctx.source())),
        resolved_symbol_id: None,
        receiver: None,
    });
}

/// Attribute callee: `obj.m()`, `self.m()`, `a.b.c()`.
pub fn handle_method_call(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(attr) = capture.node.child_by_field_name("attribute") else {
        return;
    };
    let Some(object) = capture.node.child_by_field_name("object") else {
        return;
    };

    let mut chain = Vec::new();
    attribute_chain(object, ctx.source(), &mut chain);
    let self_keyword = chain
        .first()
        .and_then(|n| SelfKeyword::from_text(n.as_str()));
    let is_self = self_keyword.is_some() && chain.len() == 1;

    builder.add_reference(Reference {
        kind: if is_self {
            ReferenceKind::SelfReferenceCall
        } else {
            ReferenceKind::Call
        },
        location: ctx.location(attr),
        name: SymbolName::new(ctx.text(attr)),
        resolved_symbol_id: None,
        receiver: Some(ReceiverInfo {
            receiver_location: ctx.location(object),
            property_chain: chain,
            is_self_reference: is_self,
            self_keyword,
        }),
    });
}

fn attribute_chain(node: tree_sitter::Node<'_>, source: &str, chain: &mut Vec<SymbolName>) {
    match node.kind() {
        "attribute" => {
            if let Some(object) = node.child_by_field_name("object") {
                attribute_chain(object, source, chain);
            }
            if let Some(attr) = node.child_by_field_name("attribute") {
                chain.push(SymbolName::new(node_text(attr, source)));
            }
        }
        "identifier" => chain.push(SymbolName::new(node_text(node, source))),
        _ => {}
    }
}

pub fn handle_variable_ref(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let location = capture.location(ctx.file_path());
    if builder.is_definition_name(&location) {
        return;
    }
    builder.add_reference(Reference {
        kind: ReferenceKind::Variable,
        location,
        name: SymbolName::new(capture.text(ctx.source())),
        resolved_symbol_id: None,
        receiver: None,
    });
}

pub fn handle_type_ref(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let location = capture.location(ctx.file_path());
    if builder.is_definition_name(&location) {
        return;
    }
    builder.add_reference(Reference {
        kind: ReferenceKind::Type,
        location,
        name: SymbolName::new(capture.text(ctx.source())),
        resolved_symbol_id: None,
        receiver: None,
    });
}

pub fn handle_global(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    builder.add_scope_directive(ScopeDirective {
        kind: DirectiveKind::Global,
        name: SymbolName::new(capture.text(ctx.source())),
        location: capture.location(ctx.file_path()),
    });
}

pub fn handle_nonlocal(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    builder.add_scope_directive(ScopeDirective {
        kind: DirectiveKind::Nonlocal,
        name: SymbolName::new(capture.text(ctx.source())),
        location: capture.location(ctx.file_path()),
    });
}
