//! Rust capture handling.
//!
//! Structs are the class records; traits are the interface records. An
//! `impl` block is a class-like scope labeled with its Self type, so
//! method captures attach to the struct by name. `impl Trait for Type`
//! additionally records a trait-implementation edge for override
//! detection.

pub mod factory;
pub mod handlers;

use crate::parsing::handlers::{HandlerMap, handle_scope};

/// Build the Rust capture-name to handler table.
pub fn handler_map() -> HandlerMap {
    let mut map = HandlerMap::new();

    map.register("@scope.module", handle_scope);
    map.register("@scope.module.inline", handle_scope);
    map.register("@scope.function", handle_scope);
    map.register("@scope.class", handle_scope);
    map.register("@scope.block", handle_scope);

    map.register("@definition.class", handlers::handle_struct);
    map.register("@definition.enum", handlers::handle_enum);
    map.register("@definition.interface", handlers::handle_trait);
    map.register("@definition.impl", handlers::handle_impl);
    map.register("@definition.type_alias", handlers::handle_type_alias);
    map.register("@definition.function", handlers::handle_function);
    // TODO: key method attachment by module path + struct name; with two
    // same-named structs in different modules, `find_class_by_name` binds
    // methods to the first match.
    map.register("@definition.method", handlers::handle_method);
    map.register("@definition.method.default", handlers::handle_default_trait_method);
    map.register("@definition.method.signature", handlers::handle_method_signature);
    map.register("@definition.variable", handlers::handle_variable);
    map.register("@definition.parameter", handlers::handle_parameter);

    map.register("@import.use", handlers::handle_use);

    map.register("@reference.call", handlers::handle_call);
    map.register("@reference.call.method", handlers::handle_method_call);
    map.register("@reference.call.scoped", handlers::handle_scoped_call);
    map.register("@reference.constructor", handlers::handle_constructor_ref);
    map.register("@reference.type", handlers::handle_type_ref);

    map
}
