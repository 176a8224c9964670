//! Per-file definition accumulator.
//!
//! Handlers mutate a `DefinitionBuilder` as captures arrive; `finalize`
//! consumes it and produces the immutable [`SingleFileIndex`]. Member
//! attachments whose owner has not been indexed yet wait in pending queues
//! keyed by owner name; whatever is still pending at finalization becomes an
//! orphan warning, not an error.

use crate::error::Diagnostic;
use crate::model::{
    ClassDef, EnumDef, FunctionDef, ImportDef, InterfaceDef, LocalTypeTracking, MethodDef,
    ParameterDef, PropertyDef, Reference, ReferenceKind, ReexportRecord, SelfKeyword,
    SingleFileIndex, TraitImplEdge, TypeAliasDef, TypeAnnotation, TypeAssignment, TypeDeclaration,
    UnresolvedReference, VariableDef,
};
use crate::parsing::Language;
use crate::scope::{ResolvedName, ScopeKind, ScopeTree, SymbolResolver};
use crate::types::{FilePath, Location, LocationKey, ScopeId, SymbolId, SymbolName};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Which member list of a class a pending method goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSlot {
    Instance,
    Constructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Global,
    Nonlocal,
}

/// A `global x` / `nonlocal x` statement, applied as a finalization pass.
#[derive(Debug, Clone)]
pub struct ScopeDirective {
    pub kind: DirectiveKind,
    pub name: SymbolName,
    pub location: Location,
}

/// An export statement's effect, applied once all definitions exist.
#[derive(Debug, Clone, Default)]
struct ExportMarks {
    /// Ranges of export statements that wrap a declaration, with a
    /// default-export flag.
    declaration_ranges: Vec<(Location, bool)>,
    /// `export { a, b as c }` pairs of (source name, alias).
    named: Vec<(SymbolName, Option<SymbolName>)>,
    /// `export default <identifier>`.
    default_names: Vec<SymbolName>,
}

pub struct DefinitionBuilder {
    file_path: FilePath,
    language: Language,
    scopes: ScopeTree,

    classes: IndexMap<SymbolId, ClassDef>,
    interfaces: IndexMap<SymbolId, InterfaceDef>,
    functions: IndexMap<SymbolId, FunctionDef>,
    variables: IndexMap<SymbolId, VariableDef>,
    enums: IndexMap<SymbolId, EnumDef>,
    type_aliases: IndexMap<SymbolId, TypeAliasDef>,
    imports: IndexMap<SymbolId, ImportDef>,

    references: Vec<Reference>,
    reference_keys: HashSet<String>,

    pending_methods: Vec<(SymbolName, MethodDef, MethodSlot)>,
    pending_interface_methods: Vec<(SymbolName, MethodDef)>,
    pending_properties: Vec<(SymbolName, PropertyDef)>,
    pending_parameters: Vec<ParameterDef>,

    type_tracking: LocalTypeTracking,
    export_marks: ExportMarks,
    scope_directives: Vec<ScopeDirective>,
    reexports: Vec<ReexportRecord>,
    trait_impls: Vec<TraitImplEdge>,
    unresolved: Vec<UnresolvedReference>,
    diagnostics: Vec<Diagnostic>,
    definition_name_keys: HashSet<LocationKey>,
}

impl DefinitionBuilder {
    pub fn new(file_path: FilePath, language: Language, file_range: Location) -> Self {
        Self {
            file_path,
            language,
            scopes: ScopeTree::new(file_range),
            classes: IndexMap::new(),
            interfaces: IndexMap::new(),
            functions: IndexMap::new(),
            variables: IndexMap::new(),
            enums: IndexMap::new(),
            type_aliases: IndexMap::new(),
            imports: IndexMap::new(),
            references: Vec::new(),
            reference_keys: HashSet::new(),
            pending_methods: Vec::new(),
            pending_interface_methods: Vec::new(),
            pending_properties: Vec::new(),
            pending_parameters: Vec::new(),
            type_tracking: LocalTypeTracking::default(),
            export_marks: ExportMarks::default(),
            scope_directives: Vec::new(),
            reexports: Vec::new(),
            trait_impls: Vec::new(),
            unresolved: Vec::new(),
            diagnostics: Vec::new(),
            definition_name_keys: HashSet::new(),
        }
    }

    pub fn file_path(&self) -> &FilePath {
        &self.file_path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    // ===== scopes =====

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn scopes_snapshot(&self) -> ScopeTree {
        self.scopes.clone()
    }

    pub fn add_scope(&mut self, kind: ScopeKind, range: Location) -> ScopeId {
        self.scopes.insert(kind, range)
    }

    pub fn label_scope(&mut self, id: &ScopeId, label: SymbolName) {
        self.scopes.set_label(id, label);
    }

    pub fn declare(
        &mut self,
        scope_id: &ScopeId,
        name: SymbolName,
        symbol_id: SymbolId,
        location: Location,
        hoistable: bool,
    ) {
        self.scopes
            .declare(scope_id, name, symbol_id, location, hoistable);
    }

    // ===== definitions (insertion is a no-op on an existing id) =====

    pub fn add_class(&mut self, class: ClassDef) {
        self.classes.entry(class.symbol_id.clone()).or_insert(class);
    }

    pub fn add_interface(&mut self, interface: InterfaceDef) {
        self.interfaces
            .entry(interface.symbol_id.clone())
            .or_insert(interface);
    }

    pub fn add_function(&mut self, function: FunctionDef) {
        self.functions
            .entry(function.symbol_id.clone())
            .or_insert(function);
    }

    pub fn add_variable(&mut self, variable: VariableDef) {
        self.variables
            .entry(variable.symbol_id.clone())
            .or_insert(variable);
    }

    pub fn add_enum(&mut self, enum_def: EnumDef) {
        self.enums
            .entry(enum_def.symbol_id.clone())
            .or_insert(enum_def);
    }

    pub fn add_type_alias(&mut self, alias: TypeAliasDef) {
        self.type_aliases
            .entry(alias.symbol_id.clone())
            .or_insert(alias);
    }

    pub fn add_import(&mut self, import: ImportDef) {
        self.imports
            .entry(import.symbol_id.clone())
            .or_insert(import);
    }

    // ===== name-based lookups =====

    /// Name-based class lookup. Rust impl blocks and JS prototype patterns
    /// attach members through this because the definition and the member
    /// live in disjoint syntactic forms. First match wins on ambiguity.
    pub fn find_class_by_name(&self, name: &SymbolName) -> Option<SymbolId> {
        self.classes
            .values()
            .find(|c| &c.name == name)
            .map(|c| c.symbol_id.clone())
    }

    pub fn find_interface_by_name(&self, name: &SymbolName) -> Option<SymbolId> {
        self.interfaces
            .values()
            .find(|i| &i.name == name)
            .map(|i| i.symbol_id.clone())
    }

    // ===== member attachment with deferral =====

    /// Attach a method to a class by name; duplicates (same symbol id) are
    /// dropped, unknown classes buffer the method.
    pub fn add_method_to_class(&mut self, class_name: SymbolName, method: MethodDef) {
        self.attach_method(class_name, method, MethodSlot::Instance);
    }

    pub fn add_constructor_to_class(&mut self, class_name: SymbolName, method: MethodDef) {
        self.attach_method(class_name, method, MethodSlot::Constructor);
    }

    fn attach_method(&mut self, class_name: SymbolName, method: MethodDef, slot: MethodSlot) {
        if let Some(class_id) = self.find_class_by_name(&class_name) {
            let class = self.classes.get_mut(&class_id).expect("class just found");
            let list = match slot {
                MethodSlot::Instance => &mut class.methods,
                MethodSlot::Constructor => &mut class.constructors,
            };
            if !list.iter().any(|m| m.symbol_id == method.symbol_id) {
                list.push(method);
            }
        } else {
            self.pending_methods.push((class_name, method, slot));
        }
    }

    /// Attach a method signature to an interface/trait by name. Default
    /// trait methods land here too: they belong to the trait, not to any
    /// implementing type.
    pub fn add_method_signature_to_interface(
        &mut self,
        interface_name: SymbolName,
        method: MethodDef,
    ) {
        if let Some(id) = self.find_interface_by_name(&interface_name) {
            let interface = self.interfaces.get_mut(&id).expect("interface just found");
            if !interface.methods.iter().any(|m| m.symbol_id == method.symbol_id) {
                interface.methods.push(method);
            }
        } else {
            self.pending_interface_methods.push((interface_name, method));
        }
    }

    pub fn add_property_to_class(&mut self, class_name: SymbolName, property: PropertyDef) {
        if let Some(class_id) = self.find_class_by_name(&class_name) {
            let class = self.classes.get_mut(&class_id).expect("class just found");
            if !class.properties.iter().any(|p| p.symbol_id == property.symbol_id) {
                class.properties.push(property);
            }
        } else if let Some(id) = self.find_interface_by_name(&class_name) {
            let interface = self.interfaces.get_mut(&id).expect("interface just found");
            if !interface.properties.iter().any(|p| p.symbol_id == property.symbol_id) {
                interface.properties.push(property);
            }
        } else {
            self.pending_properties.push((class_name, property));
        }
    }

    /// Attach a parameter to the innermost callable whose range contains it.
    pub fn add_parameter_to_callable(&mut self, parameter: ParameterDef) {
        if !self.try_attach_parameter(&parameter) {
            self.pending_parameters.push(parameter);
        }
    }

    fn try_attach_parameter(&mut self, parameter: &ParameterDef) -> bool {
        let location = &parameter.location;

        // Innermost function owning the parameter: smallest containing range.
        let mut best: Option<(u32, u32)> = None;
        let mut best_fn: Option<SymbolId> = None;
        for function in self.functions.values() {
            if function.location.contains(location) {
                let span = (function.location.start_line, function.location.end_line);
                if best.is_none() || span_tighter(span, best.unwrap()) {
                    best = Some(span);
                    best_fn = Some(function.symbol_id.clone());
                }
            }
        }
        // Methods can be tighter than the function candidates (nested defs).
        let mut method_target: Option<(SymbolId, usize)> = None;
        for (class_id, class) in &self.classes {
            for (idx, method) in class.methods.iter().enumerate() {
                if method.location.contains(location) {
                    let span = (method.location.start_line, method.location.end_line);
                    if best.is_none() || span_tighter(span, best.unwrap()) {
                        best = Some(span);
                        best_fn = None;
                        method_target = Some((class_id.clone(), idx));
                    }
                }
            }
        }

        if let Some((class_id, idx)) = method_target {
            let class = self.classes.get_mut(&class_id).expect("class exists");
            let method = &mut class.methods[idx];
            if !method.parameters.iter().any(|p| p.symbol_id == parameter.symbol_id) {
                method.parameters.push(parameter.clone());
            }
            return true;
        }
        if let Some(function_id) = best_fn {
            let function = self.functions.get_mut(&function_id).expect("function exists");
            if !function
                .signature
                .parameters
                .iter()
                .any(|p| p.symbol_id == parameter.symbol_id)
            {
                function.signature.parameters.push(parameter.clone());
            }
            return true;
        }

        // Constructors and interface signatures, checked last; they are rare.
        for class in self.classes.values_mut() {
            for ctor in &mut class.constructors {
                if ctor.location.contains(location) {
                    if !ctor.parameters.iter().any(|p| p.symbol_id == parameter.symbol_id) {
                        ctor.parameters.push(parameter.clone());
                    }
                    return true;
                }
            }
        }
        for interface in self.interfaces.values_mut() {
            for method in &mut interface.methods {
                if method.location.contains(location) {
                    if !method.parameters.iter().any(|p| p.symbol_id == parameter.symbol_id) {
                        method.parameters.push(parameter.clone());
                    }
                    return true;
                }
            }
        }
        false
    }

    /// Remember where a definition's name token sits, so reference captures
    /// that also match definition sites (Rust `type_identifier`) can skip
    /// themselves. Definitions dispatch before references, so the set is
    /// complete by the time it is consulted.
    pub fn note_definition_name(&mut self, location: &Location) {
        self.definition_name_keys.insert(location.key());
    }

    pub fn is_definition_name(&self, location: &Location) -> bool {
        self.definition_name_keys.contains(&location.key())
    }

    /// Whether a scope already binds `name` (used to tell reassignment from
    /// first declaration in assignment-based languages).
    pub fn scope_declares(&self, scope_id: &ScopeId, name: &SymbolName) -> bool {
        self.scopes
            .get(scope_id)
            .map(|s| s.declarations.contains_key(name))
            .unwrap_or(false)
    }

    // ===== references =====

    /// Record a reference; duplicates by (kind, name, location) are dropped
    /// so re-entrant handlers stay idempotent.
    pub fn add_reference(&mut self, reference: Reference) {
        let key = format!(
            "{:?}:{}:{}",
            reference.kind,
            reference.name,
            reference.location.key()
        );
        if self.reference_keys.insert(key) {
            self.references.push(reference);
        }
    }

    // ===== type tracking =====

    pub fn record_annotation(&mut self, name: SymbolName, annotation: String, location: Location) {
        self.type_tracking.annotations.push(TypeAnnotation {
            name,
            annotation,
            location,
        });
    }

    pub fn record_declaration(
        &mut self,
        name: SymbolName,
        initializer: Option<String>,
        location: Location,
    ) {
        self.type_tracking.declarations.push(TypeDeclaration {
            name,
            initializer,
            location,
        });
    }

    pub fn record_assignment(&mut self, name: SymbolName, value: String, location: Location) {
        self.type_tracking.assignments.push(TypeAssignment {
            name,
            value,
            location,
        });
    }

    // ===== exports, directives, edges =====

    pub fn mark_export_range(&mut self, range: Location, is_default: bool) {
        self.export_marks.declaration_ranges.push((range, is_default));
    }

    pub fn mark_export_name(&mut self, name: SymbolName, alias: Option<SymbolName>) {
        self.export_marks.named.push((name, alias));
    }

    pub fn mark_default_export_name(&mut self, name: SymbolName) {
        self.export_marks.default_names.push(name);
    }

    pub fn add_reexport(&mut self, record: ReexportRecord) {
        if !self.reexports.contains(&record) {
            self.reexports.push(record);
        }
    }

    pub fn add_trait_impl(&mut self, edge: TraitImplEdge) {
        if !self.trait_impls.contains(&edge) {
            self.trait_impls.push(edge);
        }
    }

    pub fn add_scope_directive(&mut self, directive: ScopeDirective) {
        self.scope_directives.push(directive);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    // ===== finalization passes =====

    /// Language-specific scope fixups, run after all captures dispatched:
    /// JS/TS hoisting, Python `global`/`nonlocal` redirection.
    pub fn run_language_passes(&mut self) {
        match self.language {
            Language::JavaScript => {
                self.scopes.hoist_declarations();
            }
            Language::TypeScript => {
                self.scopes.hoist_declarations();
                self.merge_typescript_interfaces();
            }
            Language::Python => {
                self.apply_scope_directives();
            }
            // Rust `use` statements and impl blocks register their effects
            // directly in the import and method handlers.
            Language::Rust => {}
        }
    }

    /// TypeScript declaration merging: repeated `interface X` declarations
    /// contribute members to one record. The first declaration's id wins.
    fn merge_typescript_interfaces(&mut self) {
        let ids: Vec<SymbolId> = self.interfaces.keys().cloned().collect();
        let mut first_by_name: IndexMap<SymbolName, SymbolId> = IndexMap::new();

        for id in ids {
            let name = self.interfaces[&id].name.clone();
            match first_by_name.get(&name) {
                None => {
                    first_by_name.insert(name, id);
                }
                Some(primary_id) => {
                    let merged = self
                        .interfaces
                        .shift_remove(&id)
                        .expect("interface present");
                    let primary = self
                        .interfaces
                        .get_mut(primary_id)
                        .expect("primary interface present");
                    for method in merged.methods {
                        if !primary.methods.iter().any(|m| m.symbol_id == method.symbol_id) {
                            primary.methods.push(method);
                        }
                    }
                    for property in merged.properties {
                        if !primary
                            .properties
                            .iter()
                            .any(|p| p.symbol_id == property.symbol_id)
                        {
                            primary.properties.push(property);
                        }
                    }
                    for base in merged.extends {
                        if !primary.extends.contains(&base) {
                            primary.extends.push(base);
                        }
                    }
                }
            }
        }
    }

    fn apply_scope_directives(&mut self) {
        let directives = std::mem::take(&mut self.scope_directives);
        for directive in &directives {
            let chain = self.scopes.chain_ids_at(&directive.location);
            let Some(function_scope) = chain.iter().find(|id| {
                self.scopes
                    .get(id)
                    .map(|s| s.kind == ScopeKind::Function)
                    .unwrap_or(false)
            }) else {
                continue;
            };

            let target: Option<ScopeId> = match directive.kind {
                DirectiveKind::Global => Some(self.scopes.root_id().clone()),
                DirectiveKind::Nonlocal => chain
                    .iter()
                    .skip_while(|id| *id != function_scope)
                    .skip(1)
                    .find(|id| {
                        self.scopes
                            .get(id)
                            .map(|s| s.kind == ScopeKind::Function)
                            .unwrap_or(false)
                    })
                    .cloned(),
            };
            let Some(target) = target else { continue };

            if let Some((symbol_id, meta)) =
                self.scopes.undeclare(function_scope, &directive.name)
            {
                debug!(
                    "redirecting '{}' from {} to {} per {:?} directive",
                    directive.name, function_scope, target, directive.kind
                );
                self.scopes.declare(
                    &target,
                    directive.name.clone(),
                    symbol_id,
                    meta.location,
                    meta.hoistable,
                );
            }
        }
    }

    /// Resolve references against the file's own scope tree. Anything the
    /// scopes cannot answer joins the unresolved list for the cross-file
    /// resolver.
    pub fn resolve_local_references(&mut self) {
        self.drain_pending();

        let mut references = std::mem::take(&mut self.references);
        for reference in &mut references {
            if reference.resolved_symbol_id.is_some() {
                continue;
            }

            // Self-reference calls resolve against the enclosing class.
            if reference.kind == ReferenceKind::SelfReferenceCall {
                if let Some(id) = self.resolve_self_call(reference) {
                    reference.resolved_symbol_id = Some(id);
                } else {
                    self.push_unresolved(reference);
                }
                continue;
            }

            // Receiver-qualified method calls need receiver types; the
            // cross-file resolver owns those.
            if reference.kind == ReferenceKind::Call
                && reference
                    .receiver
                    .as_ref()
                    .is_some_and(|r| !r.is_self_reference)
            {
                self.push_unresolved(reference);
                continue;
            }

            let resolver = SymbolResolver::new(&self.scopes, self.language);
            match resolver.resolve(&reference.name, &reference.location) {
                ResolvedName::Definition(id) => reference.resolved_symbol_id = Some(id),
                ResolvedName::Builtin => {}
                ResolvedName::Unresolved => self.push_unresolved(reference),
            }
        }
        self.references = references;
    }

    fn push_unresolved(&mut self, reference: &Reference) {
        let scope_id = self.scopes.scope_at(&reference.location).clone();
        self.unresolved.push(UnresolvedReference {
            name: reference.name.clone(),
            location: reference.location.clone(),
            scope_id,
            kind: reference.kind,
        });
    }

    /// `this.m()` / `self.m()` against the enclosing class, walking
    /// `extends` within the file. `super.m()` starts one level up.
    fn resolve_self_call(&self, reference: &Reference) -> Option<SymbolId> {
        let scope = self.scopes.enclosing_class(&reference.location)?;
        let mut class_name = scope.label.clone()?;

        let from_super = reference
            .receiver
            .as_ref()
            .and_then(|r| r.self_keyword)
            == Some(SelfKeyword::Super);
        if from_super {
            let class = self.class_record_by_name(&class_name)?;
            class_name = class.extends.first()?.clone();
        }

        let mut hops = 0;
        loop {
            let class = self.class_record_by_name(&class_name)?;
            if let Some(method) = class.find_method(&reference.name) {
                return Some(method.symbol_id.clone());
            }
            hops += 1;
            if hops > 32 {
                return None;
            }
            class_name = class.extends.first()?.clone();
        }
    }

    fn class_record_by_name(&self, name: &SymbolName) -> Option<&ClassDef> {
        self.classes.values().find(|c| &c.name == name)
    }

    fn drain_pending(&mut self) {
        let pending_methods = std::mem::take(&mut self.pending_methods);
        for (class_name, method, slot) in pending_methods {
            if self.find_class_by_name(&class_name).is_some() {
                self.attach_method(class_name, method, slot);
            } else if self.find_interface_by_name(&class_name).is_some() {
                self.add_method_signature_to_interface(class_name, method);
            } else {
                warn!(
                    "orphan method '{}' in {}: no container named '{}'",
                    method.name, self.file_path, class_name
                );
                self.diagnostics.push(
                    Diagnostic::warning(format!(
                        "orphan method '{}': container '{}' was not indexed",
                        method.name, class_name
                    ))
                    .at(method.location.clone()),
                );
            }
        }

        let pending_interface_methods = std::mem::take(&mut self.pending_interface_methods);
        for (interface_name, method) in pending_interface_methods {
            if self.find_interface_by_name(&interface_name).is_some() {
                self.add_method_signature_to_interface(interface_name, method);
            } else {
                self.diagnostics.push(
                    Diagnostic::warning(format!(
                        "orphan method signature '{}': interface '{}' was not indexed",
                        method.name, interface_name
                    ))
                    .at(method.location.clone()),
                );
            }
        }

        let pending_properties = std::mem::take(&mut self.pending_properties);
        for (class_name, property) in pending_properties {
            if self.find_class_by_name(&class_name).is_some()
                || self.find_interface_by_name(&class_name).is_some()
            {
                self.add_property_to_class(class_name, property);
            } else {
                self.diagnostics.push(
                    Diagnostic::warning(format!(
                        "orphan property '{}': container '{}' was not indexed",
                        property.name, class_name
                    ))
                    .at(property.location.clone()),
                );
            }
        }

        let pending_parameters = std::mem::take(&mut self.pending_parameters);
        for parameter in pending_parameters {
            if !self.try_attach_parameter(&parameter) {
                self.diagnostics.push(
                    Diagnostic::warning(format!(
                        "orphan parameter '{}': no enclosing callable was indexed",
                        parameter.name
                    ))
                    .at(parameter.location.clone()),
                );
            }
        }
    }

    /// Consume the builder and produce the immutable per-file index.
    pub fn finalize(mut self) -> SingleFileIndex {
        self.drain_pending();
        self.apply_export_rules();

        let exported_names = self.build_export_cache();
        let type_bindings = self.build_type_bindings();

        SingleFileIndex {
            file_path: self.file_path,
            language: self.language,
            classes: self.classes,
            interfaces: self.interfaces,
            functions: self.functions,
            variables: self.variables,
            enums: self.enums,
            type_aliases: self.type_aliases,
            imports: self.imports,
            references: self.references,
            scopes: self.scopes,
            unresolved_references: self.unresolved,
            type_bindings,
            type_tracking: self.type_tracking,
            exported_names,
            reexports: self.reexports,
            trait_impls: self.trait_impls,
            diagnostics: self.diagnostics,
        }
    }

    fn apply_export_rules(&mut self) {
        match self.language {
            Language::Python => self.apply_python_exports(),
            Language::JavaScript | Language::TypeScript => self.apply_js_export_marks(),
            // Rust visibility is structural (`pub`); factories set it.
            Language::Rust => {}
        }
    }

    /// Python: module-scope names are exported unless they start with a
    /// single underscore; dunders stay public. Nested definitions are not
    /// exported.
    fn apply_python_exports(&mut self) {
        let root = self.scopes.root_id().clone();
        let is_public = |name: &SymbolName| {
            let s = name.as_str();
            !s.starts_with('_') || (s.starts_with("__") && s.ends_with("__") && s.len() > 4)
        };

        for class in self.classes.values_mut() {
            class.export.is_exported = class.scope_id == root && is_public(&class.name);
        }
        for function in self.functions.values_mut() {
            if let Some(name) = &function.name {
                function.export.is_exported = function.scope_id == root && is_public(name);
            }
        }
        for variable in self.variables.values_mut() {
            variable.export.is_exported = variable.scope_id == root && is_public(&variable.name);
        }
        let import_scopes: Vec<(SymbolId, ScopeId)> = self
            .imports
            .values()
            .map(|i| (i.symbol_id.clone(), self.scopes.scope_at(&i.location).clone()))
            .collect();
        for (id, scope_id) in import_scopes {
            if let Some(import) = self.imports.get_mut(&id) {
                import.export.is_exported = scope_id == root && is_public(&import.name);
            }
        }
    }

    /// JS/TS: apply the export statements collected during dispatch. The
    /// cache is positional (statement wraps declaration) plus name-based
    /// (`export { a as b }`, `export default foo`).
    fn apply_js_export_marks(&mut self) {
        let marks = std::mem::take(&mut self.export_marks);

        for (range, is_default) in &marks.declaration_ranges {
            macro_rules! mark_contained {
                ($map:expr) => {
                    for def in $map.values_mut() {
                        if range.contains(&def.location) {
                            def.export.is_exported = true;
                            def.export.is_default |= *is_default;
                        }
                    }
                };
            }
            mark_contained!(self.classes);
            mark_contained!(self.interfaces);
            mark_contained!(self.functions);
            mark_contained!(self.variables);
            mark_contained!(self.enums);
            mark_contained!(self.type_aliases);
        }

        for (name, alias) in &marks.named {
            self.mark_by_name(name, |export| {
                export.is_exported = true;
                export.export_name = alias.clone();
            });
        }

        for name in &marks.default_names {
            self.mark_by_name(name, |export| {
                export.is_exported = true;
                export.is_default = true;
            });
        }
    }

    fn mark_by_name(&mut self, name: &SymbolName, apply: impl Fn(&mut crate::model::ExportInfo)) {
        for class in self.classes.values_mut().filter(|c| &c.name == name) {
            apply(&mut class.export);
        }
        for interface in self.interfaces.values_mut().filter(|i| &i.name == name) {
            apply(&mut interface.export);
        }
        for function in self
            .functions
            .values_mut()
            .filter(|f| f.name.as_ref() == Some(name))
        {
            apply(&mut function.export);
        }
        for variable in self.variables.values_mut().filter(|v| &v.name == name) {
            apply(&mut variable.export);
        }
        for enum_def in self.enums.values_mut().filter(|e| &e.name == name) {
            apply(&mut enum_def.export);
        }
        for alias_def in self.type_aliases.values_mut().filter(|t| &t.name == name) {
            apply(&mut alias_def.export);
        }
        for import in self.imports.values_mut().filter(|i| &i.name == name) {
            apply(&mut import.export);
        }
    }

    fn build_export_cache(&self) -> IndexMap<SymbolName, SymbolId> {
        let mut cache = IndexMap::new();
        let put = |export: &crate::model::ExportInfo,
                       name: Option<&SymbolName>,
                       id: &SymbolId,
                       cache: &mut IndexMap<SymbolName, SymbolId>| {
            if !export.is_exported {
                return;
            }
            if let Some(name) = export.export_name.as_ref().or(name) {
                cache.entry(name.clone()).or_insert_with(|| id.clone());
            }
            if export.is_default {
                cache
                    .entry(SymbolName::new("default"))
                    .or_insert_with(|| id.clone());
            }
        };

        for (id, d) in &self.classes {
            put(&d.export, Some(&d.name), id, &mut cache);
        }
        for (id, d) in &self.interfaces {
            put(&d.export, Some(&d.name), id, &mut cache);
        }
        for (id, d) in &self.functions {
            put(&d.export, d.name.as_ref(), id, &mut cache);
        }
        for (id, d) in &self.variables {
            put(&d.export, Some(&d.name), id, &mut cache);
        }
        for (id, d) in &self.enums {
            put(&d.export, Some(&d.name), id, &mut cache);
        }
        for (id, d) in &self.type_aliases {
            put(&d.export, Some(&d.name), id, &mut cache);
        }
        for (id, d) in &self.imports {
            put(&d.export, Some(&d.name), id, &mut cache);
        }
        cache
    }

    fn build_type_bindings(&self) -> IndexMap<LocationKey, SymbolName> {
        let mut bindings = IndexMap::new();
        for annotation in &self.type_tracking.annotations {
            bindings.insert(
                annotation.location.key(),
                SymbolName::new(annotation.annotation.trim()),
            );
        }
        bindings
    }
}

fn span_tighter(a: (u32, u32), b: (u32, u32)) -> bool {
    (a.1 - a.0) < (b.1 - b.0)
}
