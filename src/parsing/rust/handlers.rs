//! Rust capture handlers.

use super::factory;
use crate::model::{
    ClassDef, EnumDef, EnumMember, ExportInfo, FunctionDef, ImportDef, ImportKind, InterfaceDef,
    MethodDef, ParameterDef, PropertyDef, Reference, ReferenceKind, ReceiverInfo, ReexportNames,
    ReexportRecord, SelfKeyword, Signature, TraitImplEdge, TypeAliasDef, VariableDef,
};
use crate::parsing::builder::DefinitionBuilder;
use crate::parsing::capture::{Capture, node_text};
use crate::parsing::context::ProcessingContext;
use crate::parsing::factory::{detect_function_collection, initializer_text, is_async_callable};
use crate::types::{DefKind, ModulePath, SymbolId, SymbolName};
use tracing::debug;

fn export_for(node: tree_sitter::Node<'_>, source: &str) -> ExportInfo {
    if factory::is_pub(node, source) {
        ExportInfo::exported()
    } else {
        ExportInfo::private()
    }
}

/// `struct` items become class records; named fields become properties
/// right away since the grammar keeps them inside the item.
pub fn handle_struct(
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

    let mut properties = Vec::new();
    if let Some(body) = capture.node.child_by_field_name("body")
        && body.kind() == "field_declaration_list"
    {
        let mut cursor = body.walk();
        for field in body.named_children(&mut cursor) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let Some(field_name) = field.child_by_field_name("name") else {
                continue;
            };
            let field_symbol = SymbolName::new(ctx.text(field_name));
            let field_location = ctx.location(field);
            properties.push(PropertyDef {
                symbol_id: SymbolId::for_definition(
                    DefKind::Property,
                    &field_location,
                    Some(&field_symbol),
                ),
                name: field_symbol,
                location: field_location,
                type_annotation: field
                    .child_by_field_name("type")
                    .map(|t| SymbolName::new(node_text(t, ctx.source()).trim())),
                is_static: false,
            });
        }
    }

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
        extends: Vec::new(),
        methods: Vec::new(),
        properties,
        constructors: Vec::new(),
        export: export_for(capture.node, ctx.source()),
    });
}

pub fn handle_enum(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Enum, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    let mut members = Vec::new();
    if let Some(body) = capture.node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for variant in body.named_children(&mut cursor) {
            if variant.kind() != "enum_variant" {
                continue;
            }
            let Some(variant_name) = variant.child_by_field_name("name") else {
                continue;
            };
            members.push(EnumMember {
                name: SymbolName::new(ctx.text(variant_name)),
                value: variant
                    .child_by_field_name("value")
                    .map(|v| node_text(v, ctx.source()).to_string()),
                location: ctx.location(variant),
            });
        }
    }

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_enum(EnumDef {
        symbol_id,
        name,
        location,
        members,
        export: export_for(capture.node, ctx.source()),
    });
}

/// Traits become interface records.
pub fn handle_trait(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Interface, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_interface(InterfaceDef {
        symbol_id,
        name,
        location,
        scope_id,
        extends: factory::extract_supertraits(capture.node, ctx.source()),
        methods: Vec::new(),
        properties: Vec::new(),
        export: export_for(capture.node, ctx.source()),
    });
}

/// `impl Trait for Type` records the trait-implementation edge consumed by
/// override detection. Inherent `impl Type` blocks carry no edge; their
/// methods attach through the labeled class scope either way.
pub fn handle_impl(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(type_node) = capture.node.child_by_field_name("type") else {
        return;
    };
    let Some(trait_node) = capture.node.child_by_field_name("trait") else {
        return;
    };
    builder.add_trait_impl(TraitImplEdge {
        type_name: SymbolName::new(factory::base_type_name(ctx.text(type_node))),
        trait_name: SymbolName::new(factory::base_type_name(ctx.text(trait_node))),
        location: capture.location(ctx.file_path()),
    });
}

pub fn handle_type_alias(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::TypeAlias, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    builder.note_definition_name(&ctx.location(name_node));
    builder.declare(
        &scope_id,
        name.clone(),
        symbol_id.clone(),
        location.clone(),
        false,
    );
    builder.add_type_alias(TypeAliasDef {
        symbol_id,
        name,
        location,
        aliased: capture
            .node
            .child_by_field_name("type")
            .map(|t| node_text(t, ctx.source()).trim().to_string())
            .unwrap_or_default(),
        export: export_for(capture.node, ctx.source()),
    });
}

/// Free functions. `function_item` inside an impl or trait body matches
/// this capture too; those belong to the method handlers.
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
        export: export_for(capture.node, ctx.source()),
        callback_context: None,
    });
}

fn method_from(
    capture: &Capture<'_>,
    ctx: &ProcessingContext<'_>,
    name: &SymbolName,
) -> MethodDef {
    let location = capture.location(ctx.file_path());
    MethodDef {
        symbol_id: SymbolId::for_definition(DefKind::Method, &location, Some(name)),
        name: name.clone(),
        location,
        parameters: Vec::new(),
        return_type: factory::extract_return_type(capture.node, ctx.source()).map(SymbolName::new),
        // An associated function without a self receiver is static.
        is_static: !factory::has_self_receiver(capture.node),
        is_async: is_async_callable(capture.node, ctx.source()),
    }
}

/// Functions in an `impl` body attach to the Self type's class record.
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
        debug!("method '{name}' without an enclosing impl scope");
        return;
    };
    let class_name = class_name.clone();

    builder.note_definition_name(&ctx.location(name_node));
    let method = method_from(capture, ctx, &name);
    builder.add_method_to_class(class_name, method);
}

/// Default trait methods belong to the trait, not to implementing types.
pub fn handle_default_trait_method(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let Some((trait_name, _)) = ctx.enclosing_class(&location) else {
        return;
    };
    let trait_name = trait_name.clone();

    builder.note_definition_name(&ctx.location(name_node));
    let method = method_from(capture, ctx, &name);
    builder.add_method_signature_to_interface(trait_name, method);
}

/// Required trait method signatures.
pub fn handle_method_signature(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    handle_default_trait_method(capture, builder, ctx);
}

/// `let` bindings plus `const` and `static` items.
pub fn handle_variable(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let name_node = match capture.node.kind() {
        "let_declaration" => capture.node.child_by_field_name("pattern"),
        _ => capture.node.child_by_field_name("name"),
    };
    let Some(name_node) = name_node else { return };
    if name_node.kind() != "identifier" {
        return;
    }
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Variable, &location, Some(&name));
    let scope_id = ctx.get_scope_id(&location);

    let value_node = capture.node.child_by_field_name("value");
    let initializer = value_node.map(|v| initializer_text(v, ctx.source()));
    let annotation = capture
        .node
        .child_by_field_name("type")
        .map(|t| node_text(t, ctx.source()).trim().to_string());

    builder.note_definition_name(&ctx.location(name_node));
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
        export: export_for(capture.node, ctx.source()),
        import_path: None,
        collection: value_node.and_then(|v| detect_function_collection(v, ctx.source())),
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

    let type_annotation = capture
        .node
        .parent()
        .and_then(|p| p.child_by_field_name("type"))
        .map(|t| SymbolName::new(node_text(t, ctx.source()).trim()));

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
        default_value: None,
    });
}

/// `use` declarations. Each bound name becomes an import record declared
/// into the containing scope; `pub use` additionally re-exports.
pub fn handle_use(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let is_reexport = factory::is_pub(capture.node, ctx.source());

    for target in factory::parse_use_tree(capture.node, ctx.source()) {
        if target.wildcard {
            if is_reexport {
                builder.add_reexport(ReexportRecord {
                    source: ModulePath::new(target.path),
                    names: ReexportNames::All,
                    location: ctx.location(target.anchor),
                });
            } else {
                debug!("glob import '{}::*' is not enumerable, skipping", target.path);
            }
            continue;
        }

        let name = SymbolName::new(target.bound_name);
        let location = ctx.location(target.anchor);
        let symbol_id = SymbolId::for_definition(DefKind::Import, &location, Some(&name));
        let scope_id = ctx.get_scope_id(&location);

        let mut export = ExportInfo::private();
        if is_reexport {
            export.is_exported = true;
            export.is_reexport = true;
        }

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
            import_path: ModulePath::new(target.path),
            import_kind: ImportKind::Named,
            original_name: target.original.map(SymbolName::new),
            export,
        });
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

/// `receiver.method()` through a field expression.
pub fn handle_method_call(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(field) = capture.node.child_by_field_name("field") else {
        return;
    };
    let Some(value) = capture.node.child_by_field_name("value") else {
        return;
    };

    let mut chain = Vec::new();
    receiver_chain(value, ctx.source(), &mut chain);
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
        location: ctx.location(field),
        name: SymbolName::new(ctx.text(field)),
        resolved_symbol_id: None,
        receiver: Some(ReceiverInfo {
            receiver_location: ctx.location(value),
            property_chain: chain,
            is_self_reference: is_self,
            self_keyword,
        }),
    });
}

fn receiver_chain(node: tree_sitter::Node<'_>, source: &str, chain: &mut Vec<SymbolName>) {
    match node.kind() {
        "field_expression" => {
            if let Some(value) = node.child_by_field_name("value") {
                receiver_chain(value, source, chain);
            }
            if let Some(field) = node.child_by_field_name("field") {
                chain.push(SymbolName::new(node_text(field, source)));
            }
        }
        "identifier" | "self" => chain.push(SymbolName::new(node_text(node, source))),
        _ => {}
    }
}

/// `Type::associated()` and `module::function()` calls.
pub fn handle_scoped_call(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = capture.node.child_by_field_name("name") else {
        return;
    };
    let chain: Vec<SymbolName> = capture
        .node
        .child_by_field_name("path")
        .map(|p| {
            node_text(p, ctx.source())
                .split("::")
                .filter(|s| !s.is_empty())
                .map(SymbolName::new)
                .collect()
        })
        .unwrap_or_default();

    builder.add_reference(Reference {
        kind: ReferenceKind::Call,
        location: ctx.location(name_node),
        name: SymbolName::new(ctx.text(name_node)),
        resolved_symbol_id: None,
        receiver: Some(ReceiverInfo {
            receiver_location: capture.location(ctx.file_path()),
            property_chain: chain,
            is_self_reference: false,
            self_keyword: None,
        }),
    });
}

/// `Point { x, y }` literals.
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
