//! Type tracking: annotations, inference, and assignment flow.

use cartograph::model::ReferenceKind;
use cartograph::project::{FlowKind, MemoryFileTree};
use cartograph::types::{FilePath, SymbolName, TypeId};
use cartograph::{ProjectIndex, Settings};

fn resolved_project(files: &[(&str, &str)]) -> ProjectIndex {
    let mut project = ProjectIndex::new(Settings::default()).unwrap();
    for (path, source) in files {
        project.update_file(&FilePath::new(*path), source).unwrap();
    }
    let tree = MemoryFileTree::from_paths(files.iter().map(|(p, _)| p.to_string()));
    project.resolve_project(&tree);
    project
}

#[test]
fn ts_assignment_flow_narrows_to_number() {
    let source = "let x = \"hi\";\nx = 42;\n";
    let project = resolved_project(&[("flow.ts", source)]);
    let path = FilePath::new("flow.ts");

    let x_id = project
        .file(&path)
        .unwrap()
        .variables
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();

    let types = project.types();
    // Final type after the assignment.
    assert_eq!(types.variable_types.get(&x_id), Some(&TypeId::new("number")));

    let flows = &types.type_flows;
    assert_eq!(flows.len(), 2);
    assert_eq!(flows[0].kind, FlowKind::Initialization);
    assert_eq!(flows[0].from_type, None);
    assert_eq!(flows[0].to_type, TypeId::new("string"));
    assert_eq!(flows[1].kind, FlowKind::Assignment);
    assert_eq!(flows[1].from_type, Some(TypeId::new("string")));
    assert_eq!(flows[1].to_type, TypeId::new("number"));
}

#[test]
fn ts_annotation_beats_inference() {
    let source = "let n: number = \"oops\";\n";
    let project = resolved_project(&[("ann.ts", source)]);
    let path = FilePath::new("ann.ts");

    let n_id = project
        .file(&path)
        .unwrap()
        .variables
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();
    assert_eq!(
        project.types().variable_types.get(&n_id),
        Some(&TypeId::new("number"))
    );
}

#[test]
fn receiver_type_routes_method_call() {
    let source = "\
class Calculator {
    add(n: number): number {
        return n;
    }
}
const calc = new Calculator();
calc.add(2);
";
    let project = resolved_project(&[("calc.ts", source)]);
    let path = FilePath::new("calc.ts");
    let index = project.file(&path).unwrap();

    let add_id = index
        .class_by_name(&SymbolName::new("Calculator"))
        .unwrap()
        .find_method(&SymbolName::new("add"))
        .unwrap()
        .symbol_id
        .clone();

    let references = project.resolved_references(&path).unwrap();
    let call = references
        .iter()
        .find(|r| r.kind == ReferenceKind::Call && r.name.as_str() == "add")
        .expect("method call recorded");
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&add_id));

    // The receiver's inferred type is the class.
    let calc_id = index.variables.values().next().unwrap().symbol_id.clone();
    assert_eq!(
        project.types().variable_types.get(&calc_id),
        Some(&TypeId::new("Calculator"))
    );
}

#[test]
fn python_constructor_call_infers_class_type() {
    let source = "\
class Engine:
    def start(self):
        pass

engine = Engine()
engine.start()
";
    let project = resolved_project(&[("engine.py", source)]);
    let path = FilePath::new("engine.py");
    let index = project.file(&path).unwrap();

    let start_id = index
        .class_by_name(&SymbolName::new("Engine"))
        .unwrap()
        .find_method(&SymbolName::new("start"))
        .unwrap()
        .symbol_id
        .clone();

    let references = project.resolved_references(&path).unwrap();
    let call = references
        .iter()
        .find(|r| r.name.as_str() == "start")
        .expect("method call recorded");
    assert_eq!(call.resolved_symbol_id.as_ref(), Some(&start_id));
}

#[test]
fn annotation_generics_are_parsed_not_guessed() {
    let source = "let names: Map<string, Array<number>> = new Map();\n";
    let project = resolved_project(&[("g.ts", source)]);
    let path = FilePath::new("g.ts");

    let id = project
        .file(&path)
        .unwrap()
        .variables
        .values()
        .next()
        .unwrap()
        .symbol_id
        .clone();
    assert_eq!(
        project.types().variable_types.get(&id),
        Some(&TypeId::new("Map"))
    );
}
