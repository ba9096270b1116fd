//! Framework code generation for MTM components.
//!
//! Each target implements [`Transformer`] on top of a [`Dialect`], the small
//! set of decisions that differ between frameworks: how state is read and
//! written, how markup interpolates and binds events, which quote style the
//! output uses. Everything else (walking the program, rewriting `$name`
//! references, assembling sections) is shared.
//!
//! ```rust
//! use mtm_codegen::{transformer_for, TransformOptions};
//! use mtm_source::Target;
//!
//! let ast = mtm_syntax::parse("$count! = 0\n").unwrap();
//! let transformer = transformer_for(Target::Vue, TransformOptions::default());
//! let metadata = transformer.transform(&ast).into_metadata().unwrap();
//! assert_eq!(metadata.generated_code.state, vec!["const count = ref(0);".to_string()]);
//! ```

mod dialect;
mod emit;
mod jsx;
mod naming;
mod react;
mod rewrite;
mod solid;
mod svelte;
mod symbols;
mod template;
mod transformer;
mod vue;

pub use dialect::{Dialect, Place, Quote};
pub use emit::{arrow_function, braced, indent, join_sections, normalize_lines, parameter_list, print_expression};
pub use jsx::event_prop;
pub use naming::{capitalize, component_name, pascal_case, setter_name};
pub use react::ReactTransformer;
pub use rewrite::{rewrite_code, Rewritten};
pub use solid::SolidTransformer;
pub use svelte::SvelteTransformer;
pub use symbols::{StateShape, SymbolKind, Symbols};
pub use template::rewrite_template;
pub use transformer::{
    GeneratedCode, TemplateOutput, TransformMetadata, TransformOptions, Transformed, Transformer,
    DEFAULT_RUNTIME_MODULE,
};
pub use vue::VueTransformer;

use mtm_source::Target;

/// The transformer for `target`.
pub fn transformer_for(target: Target, options: TransformOptions) -> Box<dyn Transformer> {
    match target {
        Target::React => Box::new(ReactTransformer::new(options)),
        Target::Vue => Box::new(VueTransformer::new(options)),
        Target::Svelte => Box::new(SvelteTransformer::new(options)),
        Target::Solid => Box::new(SolidTransformer::new(options)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtm_syntax::{parse, UnifiedAst};

    fn generate(target: Target, source: &str) -> GeneratedCode {
        let ast = parse(source).unwrap();
        transformer_for(target, TransformOptions::default())
            .transform(&ast)
            .into_metadata()
            .unwrap()
            .generated_code
    }

    #[test]
    fn test_legacy_programs_pass_through() {
        let ast = parse("---\ntarget: vue\n---\n<div>{{ name }}</div>\n").unwrap();
        assert!(matches!(ast, UnifiedAst::LegacyProgram(_)));
        for target in Target::ALL {
            let transformer = transformer_for(target, TransformOptions::default());
            let transformed = transformer.transform(&ast);
            assert!(std::ptr::eq(transformed.ast(), &ast));
            assert!(transformed.metadata().is_none());
        }
    }

    #[test]
    fn test_reactive_state_per_target() {
        let source = "$counter! = 0\n";
        assert_eq!(generate(Target::React, source).state, vec!["const [counter, setCounter] = useState(0);"]);
        assert_eq!(generate(Target::Vue, source).state, vec!["const counter = ref(0);"]);
        assert_eq!(generate(Target::Svelte, source).state, vec!["const counter = writable(0);"]);
        assert_eq!(generate(Target::Solid, source).state, vec!["const [counter, setCounter] = createSignal(0);"]);
    }

    #[test]
    fn test_markup_bindings_per_target() {
        let source = "$name! = \"World\"\n$greet = () => {\n  $name = \"MTM\"\n}\n<template><p>Hello {{$name}}!</p><button click=\"$greet()\">Go</button></template>\n";
        let markup = |target| generate(target, source).template.unwrap().template;
        assert_eq!(markup(Target::React), "<p>Hello {name}!</p><button onClick={greet}>Go</button>");
        assert_eq!(markup(Target::Vue), "<p>Hello {{ name }}!</p><button @click=\"greet\">Go</button>");
        assert_eq!(markup(Target::Svelte), "<p>Hello {$name}!</p><button on:click={greet}>Go</button>");
        assert_eq!(markup(Target::Solid), "<p>Hello {name()}!</p><button onClick={greet}>Go</button>");

        let template = generate(Target::React, source).template.unwrap();
        assert_eq!(template.event_handlers, vec!["greet".to_string()]);
    }

    #[test]
    fn test_channels_import_the_runtime() {
        let source = "---\nchannels:\n  - event: reset\n    emit: onReset\n---\n$onReset = () => {}\n";
        let react = generate(Target::React, source);
        assert_eq!(react.imports[1], "import { signals } from \"@mtm/runtime\";");
        assert_eq!(react.effects, vec!["useEffect(() => signals.on(\"reset\", onReset), []);"]);

        let svelte = generate(Target::Svelte, source);
        assert_eq!(
            svelte.imports,
            vec!["import { onMount } from 'svelte';", "import { signals } from '@mtm/runtime';"]
        );
        assert_eq!(svelte.effects, vec!["onMount(() => signals.on('reset', onReset));"]);
    }

    #[test]
    fn test_transform_is_repeatable() {
        let source = "$count! = 0\n$inc = () => { $count++ }\n<template><b>{{$count}}</b></template>\n";
        let ast = parse(source).unwrap();
        let before = ast.clone();
        let transformer = VueTransformer::default();
        let first = transformer.transform(&ast).into_metadata().unwrap();
        let second = transformer.transform(&ast).into_metadata().unwrap();
        assert_eq!(first, second);
        assert_eq!(ast, before);
    }
}
