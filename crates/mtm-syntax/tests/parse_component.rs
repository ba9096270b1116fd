use expect_test::expect;
use mtm_source::Target;
use mtm_syntax::{parse, BindingType, Channel, Statement, SyntaxVersion, UnifiedAst};

const COUNTER: &str = r#"---
target: reactjs
name: Counter
channels:
  - event: counterReset
    emit: onReset
theme: dark
---
import Button from './Button'

$count! = 0
$label: string = "Clicks"
$doubled! = $count * 2
$items! = []

$increment = () => {
  $count += 1
}

$load = async (url) => {
  $items = await fetch(url)
}

$onReset = () => {
  $count = 0
}

<template>
  <h1>{{$label}}: {{$count}}</h1>
  <p>Next: {{ $count + 1 }}</p>
  <button click="$increment()">Add</button>
</template>
"#;

fn outline(statements: &[Statement]) -> String {
    let mut lines = Vec::new();
    for statement in statements {
        match statement {
            Statement::Import(import) => lines.push(format!("import {}", import.module)),
            Statement::Variable(var) | Statement::ReactiveVariable(var) => {
                let annotation = var
                    .type_annotation
                    .as_ref()
                    .map(|annotation| format!(": {}", annotation.raw))
                    .unwrap_or_default();
                lines.push(format!(
                    "{} {}{} deps=[{}] triggers=[{}]",
                    if var.is_reactive { "reactive" } else { "const" },
                    var.name,
                    annotation,
                    var.dependencies.join(", "),
                    var.update_triggers.join(", ")
                ));
            }
            Statement::Function(func) => {
                let params: Vec<&str> = func.parameters.iter().map(|param| param.name.as_str()).collect();
                lines.push(format!(
                    "{}function {}({})",
                    if func.is_async { "async " } else { "" },
                    func.name,
                    params.join(", ")
                ));
            }
            Statement::Template(template) => {
                for binding in &template.bindings {
                    lines.push(match binding.binding_type {
                        BindingType::Variable => format!("template variable {}", binding.source),
                        BindingType::Expression => format!("template expression {}", binding.source),
                        BindingType::Event => format!("template event {} -> {}", binding.target, binding.source),
                    });
                }
            }
            Statement::Expression(_) => lines.push("expression".to_string()),
        }
    }
    lines.join("\n")
}

#[test]
fn parses_a_complete_component() {
    let UnifiedAst::Program(program) = parse(COUNTER).unwrap() else {
        panic!("expected modern program");
    };
    assert_eq!(program.syntax_version, SyntaxVersion::Modern);
    assert_eq!(program.frontmatter.target, Some(Target::React));
    assert_eq!(program.frontmatter.name.as_deref(), Some("Counter"));
    assert_eq!(
        program.frontmatter.channels,
        vec![Channel {
            event: "counterReset".to_string(),
            emit: "onReset".to_string(),
        }]
    );
    assert_eq!(program.frontmatter.extra.get("theme").and_then(|value| value.as_str()), Some("dark"));

    expect![[r#"
        import ./Button
        reactive count deps=[] triggers=[increment, onReset]
        const label: string deps=[] triggers=[]
        reactive doubled deps=[count] triggers=[]
        reactive items deps=[] triggers=[load]
        function increment()
        async function load(url)
        function onReset()
        template variable label
        template variable count
        template expression $count + 1
        template event click -> increment"#]]
    .assert_eq(&outline(&program.body));
}

#[test]
fn reactive_declarations_keep_their_own_statement_kind() {
    let UnifiedAst::Program(program) = parse("$a! = 1\n$b = 2\n").unwrap() else {
        panic!("expected modern program");
    };
    assert!(matches!(program.body[0], Statement::ReactiveVariable(_)));
    assert!(matches!(program.body[1], Statement::Variable(_)));
}
