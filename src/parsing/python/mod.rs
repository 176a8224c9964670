//! Python capture handling.
//!
//! Methods are functions directly in a class body; the tie-break between
//! `@definition.function` and `@definition.method` on the same node lives
//! in the handlers, keyed off the scope tree. `global`/`nonlocal`
//! statements become scope directives applied as a finalization pass.

pub mod factory;
pub mod handlers;

use crate::parsing::handlers::{HandlerMap, handle_scope};

/// Build the Python capture-name to handler table.
pub fn handler_map() -> HandlerMap {
    let mut map = HandlerMap::new();

    map.register("@scope.module", handle_scope);
    map.register("@scope.function", handle_scope);
    map.register("@scope.class", handle_scope);
    map.register("@scope.lambda", handle_scope);
    map.register("@scope.comprehension", handle_scope);

    map.register("@definition.class", handlers::handle_class);
    map.register("@definition.function", handlers::handle_function);
    map.register("@definition.method", handlers::handle_method);
    map.register(
        "@definition.function.anonymous",
        handlers::handle_lambda,
    );
    map.register("@definition.parameter", handlers::handle_parameter);
    map.register("@definition.variable", handlers::handle_variable);

    map.register("@import.named", handlers::handle_import_module);
    map.register("@import.named.aliased", handlers::handle_import_module_aliased);
    map.register("@import.from", handlers::handle_import_from);

    map.register("@reference.call", handlers::handle_call);
    map.register("@reference.call.method", handlers::handle_method_call);
    map.register("@reference.variable", handlers::handle_variable_ref);
    map.register("@reference.type", handlers::handle_type_ref);
    map.register("@reference.global", handlers::handle_global);
    map.register("@reference.nonlocal", handlers::handle_nonlocal);

    map
}
