/// Upper-cases the first character: `counter` -> `Counter`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// React/Solid setter for a state variable: `count` -> `setCount`.
pub fn setter_name(name: &str) -> String {
    format!("set{}", capitalize(name))
}

/// `todo-list`, `todo_list` and `todoList` all become `TodoList`.
pub fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// Name of the generated component: the frontmatter `name`, else the
/// PascalCase file stem, else `Component`.
pub fn component_name(declared: Option<&str>, stem: Option<&str>) -> String {
    if let Some(name) = declared.map(str::trim).filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    stem.map(pascal_case)
        .filter(|name| name.starts_with(|c: char| c.is_ascii_alphabetic()))
        .unwrap_or_else(|| "Component".to_string())
}
