//! JavaScript capture handling.
//!
//! TypeScript shares most of this table; see the `typescript` module for
//! the additions (interfaces, enums, type aliases, typed parameters).

pub mod factory;
pub mod handlers;

use crate::parsing::handlers::{HandlerMap, handle_scope};

/// Build the JavaScript capture-name to handler table.
pub fn handler_map() -> HandlerMap {
    let mut map = HandlerMap::new();

    map.register("@scope.module", handle_scope);
    map.register("@scope.function", handle_scope);
    map.register("@scope.class", handle_scope);
    map.register("@scope.block", handle_scope);

    map.register("@definition.function", handlers::handle_function);
    map.register(
        "@definition.function.anonymous",
        handlers::handle_anonymous_function,
    );
    map.register("@definition.class", handlers::handle_class);
    map.register("@definition.method", handlers::handle_method);
    map.register("@definition.property", handlers::handle_property);
    map.register("@definition.variable", handlers::handle_variable);
    map.register("@definition.parameter", handlers::handle_parameter);

    map.register("@import.named", handlers::handle_import_named);
    map.register("@import.namespace", handlers::handle_import_namespace);
    map.register("@import.default", handlers::handle_import_default);
    map.register("@export.statement", handlers::handle_export_statement);

    map.register("@reference.call", handlers::handle_call);
    map.register("@reference.call.method", handlers::handle_method_call);
    map.register("@reference.constructor", handlers::handle_constructor_ref);
    map.register("@reference.variable", handlers::handle_variable_ref);

    map
}
