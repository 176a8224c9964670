//! JavaScript capture handlers.
//!
//! One handler per capture name. Handlers are re-entrant: definition maps
//! key by symbol id and references dedup by location, so dispatching the
//! same capture twice leaves the builder unchanged.

use super::factory;
use crate::model::{
    ClassDef, ExportInfo, FunctionDef, ImportDef, ImportKind, MethodDef, ParameterDef,
    PropertyDef, Reference, ReferenceKind, ReceiverInfo, ReexportNames, ReexportRecord,
    Signature, TraitImplEdge, VariableDef,
};
use crate::parsing::builder::DefinitionBuilder;
use crate::parsing::capture::Capture;
use crate::parsing::context::ProcessingContext;
use crate::parsing::factory::{
    detect_callback_context, detect_function_collection, initializer_text, is_async_callable,
    strip_quotes,
};
use crate::types::{DefKind, ModulePath, SymbolId, SymbolName};
use tracing::debug;

/// `function foo() {}` and generator declarations.
pub fn handle_function(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Function, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        true,
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

/// Arrow functions and function expressions. Their id uses the anonymous
/// scheme; when passed straight into a call, the callback context records
/// the outer call for the call graph.
pub fn handle_anonymous_function(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let location = capture.location(ctx.file_path());
    let scope_id = ctx.declaring_scope_id(&location);
    let name = factory::name_of(capture.node, ctx.source()).map(SymbolName::new);
    let symbol_id = match &name {
        Some(name) => SymbolId::for_definition(DefKind::Function, &location, Some(name)),
        None => SymbolId::anonymous(&location),
    };

    builder.add_function(FunctionDef {
        symbol_id,
        name,
        location,
        scope_id,
        signature: Signature {
            parameters: Vec::new(),
            return_type: factory::extract_return_type(capture.node, ctx.source())
                .map(SymbolName::new),
        },
        is_async: is_async_callable(capture.node, ctx.source()),
        export: ExportInfo::private(),
        callback_context: detect_callback_context(capture.node, ctx.source()),
    });
}

pub fn handle_class(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
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

    for interface in factory::extract_implements(capture.node, ctx.source()) {
        builder.add_trait_impl(TraitImplEdge {
            type_name: name.clone(),
            trait_name: interface,
            location: location.clone(),
        });
    }

    builder.add_class(ClassDef {
        symbol_id,
        name,
        location,
        scope_id,
        extends: factory::extract_extends(capture.node, ctx.source()),
        methods: Vec::new(),
        properties: Vec::new(),
        constructors: Vec::new(),
        export: ExportInfo::private(),
    });
}

pub fn handle_method(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let Some((class_name, _)) = ctx.enclosing_class(&location) else {
        debug!("method '{name}' outside any class scope, skipping");
        return;
    };
    let class_name = class_name.clone();

    let method = MethodDef {
        symbol_id: SymbolId::for_definition(DefKind::Method, &location, Some(&name)),
        name: name.clone(),
        location: location.clone(),
        parameters: Vec::new(),
        return_type: factory::extract_return_type(capture.node, ctx.source()).map(SymbolName::new),
        is_static: factory::is_static_member(capture.node, ctx.source()),
        is_async: is_async_callable(capture.node, ctx.source()),
    };

    builder.note_definition_name(&ctx.location(name_node));
    if name.as_str() == "constructor" {
        builder.add_constructor_to_class(class_name, method);
    } else {
        builder.add_method_to_class(class_name, method);
    }
}

/// Class fields (`field_definition` in JS, `public_field_definition` in TS).
pub fn handle_property(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let name_node = capture
        .node
        .child_by_field_name("property")
        .or_else(|| capture.node.child_by_field_name("name"));
    let Some(name_node) = name_node else { return };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let Some((class_name, _)) = ctx.enclosing_class(&location) else {
        return;
    };
    let class_name = class_name.clone();

    builder.note_definition_name(&ctx.location(name_node));
    builder.add_property_to_class(
        class_name,
        PropertyDef {
            symbol_id: SymbolId::for_definition(DefKind::Property, &location, Some(&name)),
            name,
            location: location.clone(),
            type_annotation: factory::extract_type_annotation(capture.node, ctx.source())
                .map(SymbolName::new),
            is_static: factory::is_static_member(capture.node, ctx.source()),
        },
    );
}

/// `variable_declarator`: `let x = ...`, `const f = () => ...`, `var y`.
pub fn handle_variable(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    // Destructuring patterns produce their own bindings elsewhere.
    if name_node.kind() != "identifier" {
        return;
    }
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Variable, &location, Some(&name));
    let scope_id = ctx.get_scope_id(&location);

    // `var` hoists to the function scope; `let`/`const` stay block-scoped.
    let hoistable = capture
        .node
        .parent()
        .map(|p| p.kind() == "variable_declaration")
        .unwrap_or(false);

    let value_node = capture.node.child_by_field_name("value");
    let initializer = value_node.map(|v| initializer_text(v, ctx.source()));
    let annotation = factory::extract_type_annotation(capture.node, ctx.source());

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        hoistable,
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
        collection: value_node
            .and_then(|v| detect_function_collection(v, ctx.source())),
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

    // The grammar shapes parameters differently per language: a bare
    // identifier (JS), `assignment_pattern` defaults (JS), or
    // required/optional parameter wrappers with type fields (TS).
    let mut type_annotation = None;
    let mut default_value = None;
    if let Some(parent) = capture.node.parent() {
        match parent.kind() {
            "assignment_pattern" => {
                default_value = parent
                    .child_by_field_name("right")
                    .map(|n| initializer_text(n, ctx.source()));
            }
            "required_parameter" | "optional_parameter" => {
                type_annotation =
                    factory::extract_type_annotation(parent, ctx.source()).map(SymbolName::new);
                default_value = parent
                    .child_by_field_name("value")
                    .map(|n| initializer_text(n, ctx.source()));
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

/// `import { a, b as c } from './mod'`.
pub fn handle_import_named(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(source_module) = factory::import_source_of(capture.node, ctx.source()) else {
        return;
    };
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let alias_node = capture.node.child_by_field_name("alias");

    let original = SymbolName::new(ctx.text(name_node));
    // Aliased imports anchor at the alias node so lookups of the alias name
    // land on this record; the source-name node is covered here and needs
    // no capture of its own.
    let (bound_node, bound_name, original_name) = match alias_node {
        Some(alias) => (alias, SymbolName::new(ctx.text(alias)), Some(original)),
        None => (name_node, original, None),
    };

    let location = ctx.location(bound_node);
    let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&bound_name));

    builder.note_definition_name(&location);
    let root = builder.scopes().root_id().clone();
    builder.declare(
        &root,
        bound_name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_import(ImportDef {
        symbol_id,
        name: bound_name,
        location,
        import_path: ModulePath::new(source_module),
        import_kind: ImportKind::Named,
        original_name,
        export: ExportInfo::private(),
    });
}

/// `import * as ns from './mod'`.
pub fn handle_import_namespace(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(source_module) = factory::import_source_of(capture.node, ctx.source()) else {
        return;
    };
    let mut cursor = capture.node.walk();
    let Some(name_node) = capture
        .node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")
    else {
        return;
    };

    let name = SymbolName::new(ctx.text(name_node));
    let location = ctx.location(name_node);
    let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));

    builder.note_definition_name(&location);
    let root = builder.scopes().root_id().clone();
    builder.declare(&root, name.clone(), symbol_id.clone(), location.clone(), false);
    builder.add_import(ImportDef {
        symbol_id,
        name,
        location,
        import_path: ModulePath::new(source_module),
        import_kind: ImportKind::Namespace,
        original_name: None,
        export: ExportInfo::private(),
    });
}

/// `import Default from './mod'` — binds the target's default export.
pub fn handle_import_default(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(source_module) = factory::import_source_of(capture.node, ctx.source()) else {
        return;
    };
    let name = SymbolName::new(capture.text(ctx.source()));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));

    builder.note_definition_name(&location);
    let root = builder.scopes().root_id().clone();
    builder.declare(&root, name.clone(), symbol_id.clone(), location.clone(), false);
    builder.add_import(ImportDef {
        symbol_id,
        name,
        location,
        import_path: ModulePath::new(source_module),
        import_kind: ImportKind::Named,
        original_name: Some(SymbolName::new("default")),
        export: ExportInfo::private(),
    });
}

/// Export statements of every shape, plus `module.exports = {...}`.
/// The marks collected here become the per-file export cache at finalize.
pub fn handle_export_statement(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    if capture.node.kind() == "member_expression" {
        handle_commonjs_exports(capture, builder, ctx);
        return;
    }

    let node = capture.node;
    let source_module = node
        .child_by_field_name("source")
        .map(|n| strip_quotes(ctx.text(n)).to_string());

    let mut has_default = false;
    let mut clause = None;
    let mut star = false;
    let mut default_ident = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "default" => has_default = true,
            "export_clause" => clause = Some(child),
            "*" => star = true,
            "identifier" => default_ident = Some(child),
            _ => {}
        }
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        builder.mark_export_range(ctx.location(declaration), has_default);
        return;
    }

    if let Some(clause) = clause {
        let mut reexported = Vec::new();
        let mut cursor = clause.walk();
        for spec in clause.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = factory::name_of(spec, ctx.source()) else {
                continue;
            };
            let alias = spec
                .child_by_field_name("alias")
                .map(|a| SymbolName::new(ctx.text(a)));
            if source_module.is_some() {
                reexported.push((SymbolName::new(name), alias));
            } else {
                builder.mark_export_name(SymbolName::new(name), alias);
            }
        }
        if let Some(source_module) = source_module {
            builder.add_reexport(ReexportRecord {
                source: ModulePath::new(source_module),
                names: ReexportNames::Named(reexported),
                location: capture.location(ctx.file_path()),
            });
        }
        return;
    }

    if star && let Some(source_module) = source_module {
        builder.add_reexport(ReexportRecord {
            source: ModulePath::new(source_module),
            names: ReexportNames::All,
            location: capture.location(ctx.file_path()),
        });
        return;
    }

    if has_default && let Some(ident) = default_ident {
        builder.mark_default_export_name(SymbolName::new(ctx.text(ident)));
    }
}

/// `module.exports = { a, b: c }` in CommonJS files.
fn handle_commonjs_exports(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    if capture.text(ctx.source()) != "module.exports" {
        return;
    }
    let Some(assignment) = capture.node.parent() else {
        return;
    };
    let Some(right) = assignment.child_by_field_name("right") else {
        return;
    };

    match right.kind() {
        "object" => {
            let mut cursor = right.walk();
            for entry in right.named_children(&mut cursor) {
                match entry.kind() {
                    "shorthand_property_identifier" => {
                        builder.mark_export_name(SymbolName::new(ctx.text(entry)), None);
                    }
                    "pair" => {
                        let key = entry
                            .child_by_field_name("key")
                            .map(|k| SymbolName::new(strip_quotes(ctx.text(k))));
                        if let Some(value) = entry.child_by_field_name("value")
                            && value.kind() == "identifier"
                        {
                            builder.mark_export_name(SymbolName::new(ctx.text(value)), key);
                        }
                    }
                    _ => {}
                }
            }
        }
        "identifier" => {
            builder.mark_default_export_name(SymbolName::new(ctx.text(right)));
        }
        _ => {}
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

/// Member-expression callee: `obj.m()`, `a.b.c()`, `this.m()`, `super.m()`.
pub fn handle_method_call(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(property) = capture.node.child_by_field_name("property") else {
        return;
    };
    let Some(object) = capture.node.child_by_field_name("object") else {
        return;
    };

    let chain = factory::member_chain(capture.node, ctx.source());
    let self_keyword = factory::chain_self_keyword(&chain);
    let is_self = self_keyword.is_some() && chain.len() == 1;

    builder.add_reference(Reference {
        kind: if is_self {
            ReferenceKind::SelfReferenceCall
        } else {
            ReferenceKind::Call
        },
        location: ctx.location(property),
        name: SymbolName::new(ctx.text(property)),
        resolved_symbol_id: None,
        receiver: Some(ReceiverInfo {
            receiver_location: ctx.location(object),
            property_chain: chain,
            is_self_reference: is_self,
            self_keyword,
        }),
    });
}

pub fn handle_constructor_ref(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    builder.add_reference(Reference {
        kind: ReferenceKind::Constructor,
        location: capture.location(ctx.file_path()),
        name: SymbolName::new(capture.text(ctx.source())),
        resolved_symbol_id: None,
        receiver: None,
    });
}

/// Identifier reads and assignment targets. Assignments also feed the type
/// tracker's flow phase.
pub fn handle_variable_ref(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let location = capture.location(ctx.file_path());
    if builder.is_definition_name(&location) {
        return;
    }
    let name = SymbolName::new(capture.text(ctx.source()));

    if let Some(parent) = capture.node.parent()
        && parent.kind() == "assignment_expression"
        && parent
            .child_by_field_name("left")
            .map(|l| l.id() == capture.node.id())
            .unwrap_or(false)
        && let Some(right) = parent.child_by_field_name("right")
    {
        builder.record_assignment(
            name.clone(),
            initializer_text(right, ctx.source()),
            location.clone(),
        );
    }

    builder.add_reference(Reference {
        kind: ReferenceKind::Variable,
        location,
        name,
        resolved_symbol_id: None,
        receiver: None,
    });
}
