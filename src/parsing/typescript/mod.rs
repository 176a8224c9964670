//! TypeScript capture handling.
//!
//! TypeScript's grammar is a superset of JavaScript's, so this module
//! starts from the JavaScript handler table and adds the type-level
//! constructs: interfaces, enums, type aliases, and type references.
//! Interface bodies are class-like scopes, so member signatures find their
//! owner the same way class methods do.

pub mod handlers;

use crate::parsing::handlers::HandlerMap;

/// Build the TypeScript capture-name to handler table.
pub fn handler_map() -> HandlerMap {
    let mut map = crate::parsing::javascript::handler_map();

    map.register("@definition.interface", handlers::handle_interface);
    map.register(
        "@definition.method.signature",
        handlers::handle_method_signature,
    );
    map.register(
        "@definition.property.signature",
        handlers::handle_property_signature,
    );
    map.register("@definition.type_alias", handlers::handle_type_alias);
    map.register("@definition.enum", handlers::handle_enum);
    map.register("@reference.type", handlers::handle_type_ref);

    map
}
