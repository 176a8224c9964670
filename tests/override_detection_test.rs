//! Override detection across `extends` chains and trait implementations.

use cartograph::project::MemoryFileTree;
use cartograph::types::{FilePath, SymbolName};
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
fn ts_subclass_method_overrides_base() {
    let source = "\
class Animal {
    speak() {}
}
class Dog extends Animal {
    speak() {}
}
";
    let project = resolved_project(&[("zoo.ts", source)]);
    let index = project.file(&FilePath::new("zoo.ts")).unwrap();

    let animal = index.class_by_name(&SymbolName::new("Animal")).unwrap();
    let animal_speak = animal.find_method(&SymbolName::new("speak")).unwrap();
    let dog = index.class_by_name(&SymbolName::new("Dog")).unwrap();
    let dog_speak = dog.find_method(&SymbolName::new("speak")).unwrap();

    let overrides = project.overrides();
    assert_eq!(overrides.edges.len(), 1);

    let base = overrides
        .find_overridden_method(&dog_speak.symbol_id)
        .expect("Dog.speak overrides something");
    assert_eq!(base, &animal_speak.symbol_id);
    // The base method's recorded location is Animal.speak's line.
    assert_eq!(animal_speak.location.start_line, 2);
}

#[test]
fn ts_static_methods_do_not_override() {
    let source = "\
class Base {
    static create() {}
}
class Derived extends Base {
    static create() {}
}
";
    let project = resolved_project(&[("s.ts", source)]);
    assert!(project.overrides().edges.is_empty());
}

#[test]
fn override_chain_is_root_first() {
    let source = "\
class A:
    def m(self):
        pass

class B(A):
    def m(self):
        pass

class C(B):
    def m(self):
        pass
";
    let project = resolved_project(&[("chain.py", source)]);
    let index = project.file(&FilePath::new("chain.py")).unwrap();

    let method_of = |class_name: &str| {
        index
            .class_by_name(&SymbolName::new(class_name))
            .unwrap()
            .find_method(&SymbolName::new("m"))
            .unwrap()
            .symbol_id
            .clone()
    };
    let (a_m, b_m, c_m) = (method_of("A"), method_of("B"), method_of("C"));

    let chain = project.overrides().get_override_chain(&c_m);
    assert_eq!(chain, vec![a_m.clone(), b_m.clone(), c_m.clone()]);

    // Both subclass methods override the root method.
    let overriding = project.overrides().find_overriding_methods(&a_m);
    assert!(overriding.contains(&&b_m));
    assert!(overriding.contains(&&c_m));
}

#[test]
fn python_magic_methods_skip_override_except_init() {
    let source = "\
class Base:
    def __init__(self):
        pass
    def __str__(self):
        return \"\"

class Child(Base):
    def __init__(self):
        pass
    def __str__(self):
        return \"\"
";
    let project = resolved_project(&[("magic.py", source)]);
    let edges = &project.overrides().edges;
    assert_eq!(edges.len(), 1);

    let index = project.file(&FilePath::new("magic.py")).unwrap();
    let child_init = index
        .class_by_name(&SymbolName::new("Child"))
        .unwrap()
        .find_method(&SymbolName::new("__init__"))
        .unwrap();
    assert_eq!(edges[0].method, child_init.symbol_id);
}

#[test]
fn rust_trait_impl_is_explicit_override() {
    let source = "\
trait Display {
    fn fmt(&self) -> String;
}

struct P {}

impl Display for P {
    fn fmt(&self) -> String {
        String::new()
    }
}
";
    let project = resolved_project(&[("src/lib.rs", source)]);
    let index = project.file(&FilePath::new("src/lib.rs")).unwrap();

    let display_fmt = index
        .interface_by_name(&SymbolName::new("Display"))
        .unwrap()
        .find_method(&SymbolName::new("fmt"))
        .unwrap()
        .symbol_id
        .clone();
    let p = index.class_by_name(&SymbolName::new("P")).unwrap();
    let p_fmt = p.find_method(&SymbolName::new("fmt")).unwrap();
    assert!(!p_fmt.is_static);

    let overriding = project.overrides().find_overriding_methods(&display_fmt);
    assert!(overriding.contains(&&p_fmt.symbol_id));

    let edge = project
        .overrides()
        .edges
        .iter()
        .find(|e| e.method == p_fmt.symbol_id)
        .unwrap();
    assert!(edge.is_explicit);
}

#[test]
fn cross_file_extends_still_produces_edge() {
    let base = "\
export class Animal {
    speak() {}
}
";
    let derived = "\
import { Animal } from './animal';
class Dog extends Animal {
    speak() {}
}
";
    let project = resolved_project(&[("animal.ts", base), ("dog.ts", derived)]);
    assert_eq!(project.overrides().edges.len(), 1);
}
