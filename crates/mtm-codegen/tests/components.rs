use expect_test::{expect, Expect};
use mtm_codegen::{transformer_for, TransformOptions};
use mtm_source::Target;
use mtm_syntax::parse;

const COUNTER: &str = r#"---
target: reactjs
name: Counter
channels:
  - event: counterReset
    emit: onReset
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

fn check(target: Target, source: &str, expected: Expect) {
    let ast = parse(source).unwrap();
    let metadata = transformer_for(target, TransformOptions::default())
        .transform(&ast)
        .into_metadata()
        .expect("modern program");
    assert_eq!(metadata.framework, target);
    expected.assert_eq(&metadata.generated_code.component);
}

#[test]
fn react_counter() {
    check(
        Target::React,
        COUNTER,
        expect![[r#"
            import { useCallback, useEffect, useState } from "react";
            import { signals } from "@mtm/runtime";
            import Button from './Button';

            export default function Counter() {
              const [count, setCount] = useState(0);
              const label = "Clicks";
              const [doubled, setDoubled] = useState(count * 2);
              const [items, setItems] = useState([]);

              const increment = useCallback(() => {
                setCount((prev) => prev + 1)
              }, []);

              const load = useCallback(async (url) => {
                setItems(await fetch(url))
              }, []);

              const onReset = useCallback(() => {
                setCount(0)
              }, []);

              useEffect(() => { setDoubled(count * 2); }, [count]);
              useEffect(() => signals.on("counterReset", onReset), []);

              return (
                <>
                  <h1>{label}: {count}</h1>
                  <p>Next: {count + 1}</p>
                  <button onClick={increment}>Add</button>
                </>
              );
            }
        "#]],
    );
}

#[test]
fn vue_counter() {
    check(
        Target::Vue,
        COUNTER,
        expect![[r#"
            <template>
              <h1>{{ label }}: {{ count }}</h1>
              <p>Next: {{ count + 1 }}</p>
              <button @click="increment">Add</button>
            </template>

            <script setup>
            import { onMounted, onUnmounted, reactive, ref, watch } from 'vue';
            import { signals } from '@mtm/runtime';
            import Button from './Button';

            const count = ref(0);
            const label = 'Clicks';
            const doubled = ref(count.value * 2);
            const items = reactive([]);

            const increment = () => {
              count.value += 1
            };

            const load = async (url) => {
              items.splice(0, items.length, ...await fetch(url))
            };

            const onReset = () => {
              count.value = 0
            };

            watch([count], () => { doubled.value = count.value * 2; });
            let unsubscribeCounterReset = () => {};
            onMounted(() => {
              unsubscribeCounterReset = signals.on('counterReset', onReset);
            });
            onUnmounted(() => unsubscribeCounterReset());
            </script>
        "#]],
    );
}

#[test]
fn svelte_counter() {
    check(
        Target::Svelte,
        COUNTER,
        expect![[r#"
            <script>
              import { onMount } from 'svelte';
              import { writable } from 'svelte/store';
              import { signals } from '@mtm/runtime';
              import Button from './Button';

              const count = writable(0);
              const label = 'Clicks';
              const doubled = writable($count * 2);
              const items = writable([]);

              function increment() {
                count.update((prev) => prev + 1)
              }

              async function load(url) {
                items.set(await fetch(url))
              }

              function onReset() {
                count.set(0)
              }

              $: doubled.set($count * 2);
              onMount(() => signals.on('counterReset', onReset));
            </script>

            <h1>{label}: {$count}</h1>
            <p>Next: {$count + 1}</p>
            <button on:click={increment}>Add</button>
        "#]],
    );
}

#[test]
fn solid_counter() {
    check(
        Target::Solid,
        COUNTER,
        expect![[r#"
            import { createEffect, createSignal, onCleanup } from "solid-js";
            import { signals } from "@mtm/runtime";
            import Button from './Button';

            export default function Counter() {
              const [count, setCount] = createSignal(0);
              const label = "Clicks";
              const [doubled, setDoubled] = createSignal(count() * 2);
              const [items, setItems] = createSignal([]);

              const increment = () => {
                setCount((prev) => prev + 1)
              };

              const load = async (url) => {
                setItems(await fetch(url))
              };

              const onReset = () => {
                setCount(0)
              };

              createEffect(() => setDoubled(count() * 2));
              createEffect(() => onCleanup(signals.on("counterReset", onReset)));

              return (
                <>
                  <h1>{label}: {count()}</h1>
                  <p>Next: {count() + 1}</p>
                  <button onClick={increment}>Add</button>
                </>
              );
            }
        "#]],
    );
}

#[test]
fn empty_component_names_fall_back_to_the_file_stem() {
    let ast = parse("$open! = false\n").unwrap();
    let options = TransformOptions {
        file_stem: Some("nav-menu".to_string()),
        ..TransformOptions::default()
    };
    let component = transformer_for(Target::React, options)
        .transform(&ast)
        .into_metadata()
        .unwrap()
        .generated_code
        .component;
    expect![[r#"
        import { useState } from "react";

        export default function NavMenu() {
          const [open, setOpen] = useState(false);

          return null;
        }
    "#]]
    .assert_eq(&component);
}

#[test]
fn svelte_expression_bodies_return() {
    let ast = parse("$total! = 0\n$double = (n) => n * 2\n").unwrap();
    let code = transformer_for(Target::Svelte, TransformOptions::default())
        .transform(&ast)
        .into_metadata()
        .unwrap()
        .generated_code;
    assert_eq!(code.functions, vec!["function double(n) {\n  return n * 2;\n}"]);
}
