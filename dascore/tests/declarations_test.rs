use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::Buffer;
use dascore::builder::{EnumerationEntry, VariableDeclaration};
use dascore::program::expressions::{ExprBlock, ExprCall, Expression, ExpressionKind};
use dascore::program::{BaseType, Enumeration, Module, Program, Structure, TypeDecl};
use dascore::source::InputSpan;
use dascore::{CompilationErrorKind, ParseContext};
use std::cell::RefCell;
use std::rc::Rc;

const SOURCE: &str = "def add(a, b : int) { return a + b; }\ndef add(x, y : int) { return x; }\n";

fn span(start: usize, end: usize) -> InputSpan {
    InputSpan::new(0, start, end)
}

fn typed(base_type: BaseType) -> Option<TypeDecl> {
    Some(TypeDecl::new(base_type))
}

fn body() -> Expression {
    Expression::new(InputSpan::builtin(), ExprBlock::new())
}

fn math_module() -> Module {
    let mut math = Module::new("math");
    let vec3 = Structure::new("Vec3", InputSpan::builtin());
    assert!(math.add_structure(Rc::new(RefCell::new(vec3))));

    let mut axis = Enumeration::new("Axis", BaseType::Int, InputSpan::builtin());
    assert!(axis.add("x") && axis.add("y") && axis.add("z"));
    axis.resolve_values();
    assert!(math.add_enumeration(Rc::new(RefCell::new(axis))));
    math
}

fn kinds(program: &Program) -> Vec<CompilationErrorKind> {
    program.errors().iter().map(|error| error.kind).collect()
}

#[test]
fn overloads_and_duplicates() {
    let mut program = Program::new();
    let mut context = ParseContext::new(&mut program);
    let pair = |name_a: &str, name_b: &str, base_type, at| {
        vec![VariableDeclaration::new(
            vec![(name_a.to_string(), at), (name_b.to_string(), at)],
            typed(base_type),
            at,
        )]
    };

    let first = context.make_function(span(0, 37), "add", pair("a", "b", BaseType::Int, span(8, 18)), None, body(), Vec::new());
    let float = context.make_function(span(0, 37), "add", pair("a", "b", BaseType::Float, span(8, 18)), None, body(), Vec::new());
    let duplicate = context.make_function(span(38, 71), "add", pair("x", "y", BaseType::Int, span(46, 56)), None, body(), Vec::new());
    assert!(first.is_some() && float.is_some());
    assert!(duplicate.is_none());

    assert_eq!(program.this_module.borrow().find_functions("add").len(), 2);
    assert_eq!(kinds(&program), vec![CompilationErrorKind::FunctionAlreadyDeclared]);
    assert!(program.failed());

    let mut files = SimpleFiles::new();
    let file = files.add("test.das", SOURCE);
    let mut buffer = Buffer::no_color();
    let config = codespan_reporting::term::Config::default();
    for error in program.errors() {
        codespan_reporting::term::emit(&mut buffer, &config, &files, &error.to_codespan(|_| file))
            .unwrap();
    }
    let rendered = String::from_utf8(buffer.into_inner()).unwrap();
    assert!(rendered.contains("E0005"));
    assert!(rendered.contains("test.das"));
    assert!(rendered.contains("previously declared here"));
}

#[test]
fn qualified_and_ambiguous_type_names() {
    let mut program = Program::new();
    assert!(program.add_module(math_module()));
    program.set_module_name("game");

    let mut context = ParseContext::new(&mut program);
    let local = context
        .make_structure(
            span(0, 10),
            "Vec3",
            None,
            vec![VariableDeclaration::new(
                vec![("x".to_string(), span(1, 2)), ("y".to_string(), span(3, 4))],
                typed(BaseType::Float),
                span(1, 4),
            )],
            Vec::new(),
        )
        .unwrap();

    assert!(program.make_type_declaration(span(20, 24), "Vec3").is_none());
    assert_eq!(kinds(&program), vec![CompilationErrorKind::StructureNotFound]);

    let math = program.make_type_declaration(span(30, 40), "math::Vec3").unwrap();
    assert_eq!(math.structure_ref().unwrap().borrow().module.as_deref(), Some("math"));
    let own = program.make_type_declaration(span(50, 56), "::Vec3").unwrap();
    assert!(Rc::ptr_eq(&own.structure_ref().unwrap(), &local));
    assert_eq!(own.structure_ref().unwrap().borrow().mangled_name(), "game::Vec3");

    let unknown = program.make_type_declaration(span(60, 67), "Quat").unwrap();
    assert!(unknown.is_alias());
    assert_eq!(program.errors().len(), 1);
}

#[test]
fn enumeration_constants_across_modules() {
    let mut program = Program::new();
    assert!(program.add_module(math_module()));
    let mut context = ParseContext::new(&mut program);

    let y = context.make_enum_constant(span(0, 6), "Axis", "y").unwrap();
    let z = context.make_enum_constant(span(7, 19), "math::Axis", "z").unwrap();
    for (constant, name) in &[(&y, "y"), (&z, "z")] {
        match constant.kind {
            ExpressionKind::ConstEnumeration(ref constant) => assert_eq!(constant.text, *name),
            _ => unreachable!(),
        }
    }

    context.make_enumeration(
        span(20, 40),
        "Axis",
        BaseType::Int,
        vec![EnumerationEntry::new("u", None, span(30, 31))],
    );
    assert!(context.make_enum_constant(span(41, 47), "Axis", "u").is_none());
    assert!(context.make_enum_constant(span(48, 58), "::Axis", "u").is_some());
    assert!(context.make_enum_constant(span(59, 69), "math::Axis", "w").is_none());

    assert_eq!(
        kinds(&program),
        vec![
            CompilationErrorKind::EnumerationNotFound,
            CompilationErrorKind::EnumerationNotFound
        ]
    );
    assert!(program.errors()[0].extra.as_ref().unwrap().contains("math::Axis"));
}

#[test]
fn built_program_prints_and_optimizes() {
    let mut program = Program::new();
    let mut context = ParseContext::new(&mut program);
    context.make_enumeration(
        span(0, 10),
        "Color",
        BaseType::Int,
        vec![EnumerationEntry::new("red", None, span(1, 2))],
    );
    context.add_globals(vec![VariableDeclaration::single("limit", typed(BaseType::Int), span(11, 16))]);

    let export = {
        let mut found = context.program.find_annotation("export");
        assert_eq!(found.len(), 1);
        dascore::program::AnnotationDeclaration::new(found.pop().unwrap())
    };
    let call = context.program.make_call(span(20, 26), "helper");
    let call = context.pipe_call(span(20, 30), call, Expression::const_string(span(27, 30), "hi"));
    let main_body = Expression::new(span(18, 40), ExprBlock::with_list(vec![call]));
    let main = context
        .make_function(span(17, 40), "main", Vec::new(), None, main_body, vec![export])
        .unwrap();
    let unused = context.make_function(span(41, 60), "unused", Vec::new(), None, body(), Vec::new());
    assert!(unused.is_some());
    assert!(!program.failed());

    let dump = program.to_string();
    assert!(dump.starts_with("(program"));
    assert!(dump.contains("(enum Color int"));
    assert!(dump.contains("(def main"));
    assert!(dump.contains("(def unused"));

    program.optimize();
    assert!(!program.failed());
    let dump = program.to_string();
    assert!(dump.contains("(def main"));
    assert!(!dump.contains("(def unused"));
    assert!(!dump.contains("limit"));
    assert!(main.borrow().exports);
    match main.borrow().body.as_ref().unwrap().as_block().unwrap().list[0].kind {
        ExpressionKind::Call(ExprCall { ref arguments, .. }) => assert_eq!(arguments.len(), 1),
        _ => unreachable!(),
    };
}
