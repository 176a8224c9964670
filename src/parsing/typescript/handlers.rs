//! TypeScript-specific capture handlers.

use crate::model::{
    EnumDef, EnumMember, ExportInfo, InterfaceDef, MethodDef, PropertyDef, Reference,
    ReferenceKind, TypeAliasDef,
};
use crate::parsing::builder::DefinitionBuilder;
use crate::parsing::capture::{Capture, node_text};
use crate::parsing::context::ProcessingContext;
use crate::parsing::factory::{initializer_text, strip_quotes};
use crate::parsing::javascript::factory;
use crate::types::{DefKind, SymbolId, SymbolName};
use tracing::debug;

pub fn handle_interface(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
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
        extends: factory::extract_interface_extends(capture.node, ctx.source()),
        methods: Vec::new(),
        properties: Vec::new(),
        export: ExportInfo::private(),
    });
}

/// `method_signature` inside an interface body.
pub fn handle_method_signature(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let Some((owner, _)) = ctx.enclosing_class(&location) else {
        debug!("method signature '{name}' outside any interface scope");
        return;
    };
    let owner = owner.clone();

    builder.note_definition_name(&ctx.location(name_node));
    builder.add_method_signature_to_interface(
        owner,
        MethodDef {
            symbol_id: SymbolId::for_definition(DefKind::Method, &location, Some(&name)),
            name,
            location,
            parameters: Vec::new(),
            return_type: factory::extract_return_type(capture.node, ctx.source())
                .map(SymbolName::new),
            is_static: false,
            is_async: false,
        },
    );
}

pub fn handle_property_signature(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let Some((owner, _)) = ctx.enclosing_class(&location) else {
        return;
    };
    let owner = owner.clone();

    builder.note_definition_name(&ctx.location(name_node));
    builder.add_property_to_class(
        owner,
        PropertyDef {
            symbol_id: SymbolId::for_definition(DefKind::Property, &location, Some(&name)),
            name,
            location,
            type_annotation: factory::extract_type_annotation(capture.node, ctx.source())
                .map(SymbolName::new),
            is_static: false,
        },
    );
}

pub fn handle_type_alias(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::TypeAlias, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    let aliased = capture
        .node
        .child_by_field_name("value")
        .map(|v| initializer_text(v, ctx.source()))
        .unwrap_or_default();

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
        aliased,
        export: ExportInfo::private(),
    });
}

pub fn handle_enum(
    capture: &Capture<'_>,
    builder: &mut DefinitionBuilder,
    ctx: &ProcessingContext<'_>,
) {
    let Some(name_node) = factory::name_node(capture.node) else {
        return;
    };
    let name = SymbolName::new(ctx.text(name_node));
    let location = capture.location(ctx.file_path());
    let symbol_id = SymbolId::for_definition(DefKind::Enum, &location, Some(&name));
    let scope_id = ctx.declaring_scope_id(&location);

    let mut members = Vec::new();
    if let Some(body) = capture.node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for entry in body.named_children(&mut cursor) {
            match entry.kind() {
                "property_identifier" => members.push(EnumMember {
                    name: SymbolName::new(ctx.text(entry)),
                    value: None,
                    location: ctx.location(entry),
                }),
                "enum_assignment" => {
                    let Some(member_name) = factory::name_of(entry, ctx.source()) else {
                        continue;
                    };
                    members.push(EnumMember {
                        name: SymbolName::new(member_name),
                        value: entry
                            .child_by_field_name("value")
                            .map(|v| strip_quotes(node_text(v, ctx.source())).to_string()),
                        location: ctx.location(entry),
                    });
                }
                _ => {}
            }
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
        export: ExportInfo::private(),
    });
}

/// Type-position identifiers: annotations and generic heads. Definition
/// name sites are skipped; definitions always dispatch first.
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
