use std::collections::HashSet;
use std::path::Path;

fn main() {
    let rules_path = Path::new("rules/column_rules.json");
    validate_rules_file(rules_path);
    set_build_dependencies();
}

fn validate_rules_file(rules_path: &Path) {
    // Ensure the default rules exist at build time
    assert!(
        rules_path.exists(),
        "\n\nRULES BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the column rules file before building.\n",
        rules_path.display()
    );

    let rules_contents = std::fs::read_to_string(rules_path).unwrap_or_else(|e| {
        panic!(
            "\n\nRULES BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            rules_path.display()
        );
    });

    let rules: serde_json::Value = serde_json::from_str(&rules_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nRULES BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            rules_path.display()
        );
    });

    validate_rules_structure(&rules);
}

fn validate_rules_structure(rules: &serde_json::Value) {
    assert!(
        rules.is_object(),
        "\n\nRULES BUILD ERROR: Root must be a JSON object\n\
         Got: {rules}\n"
    );

    let aliases = validate_string_list(rules, "species_aliases");
    assert!(
        aliases > 0,
        "\n\nRULES BUILD ERROR: 'species_aliases' must not be empty\n\
         At least one species column alias is required.\n"
    );

    let patterns = validate_string_list(rules, "sample_header_patterns");
    let exclusions = validate_string_list(rules, "metadata_exclusions");
    let taxonomy = validate_string_list(rules, "metadata_headers");

    if let Some(fallback) = rules.get("positional_species_fallback") {
        assert!(
            fallback.is_boolean(),
            "\n\nRULES BUILD ERROR: 'positional_species_fallback' must be a boolean\n\
             Got: {fallback}\n"
        );
    }

    println!(
        "cargo:warning=Validated column rules: {aliases} species aliases, {patterns} sample patterns, {exclusions} metadata exclusions, {taxonomy} taxonomy headers"
    );
}

fn validate_string_list(rules: &serde_json::Value, field: &str) -> usize {
    let value = rules.get(field).unwrap_or_else(|| {
        panic!(
            "\n\nRULES BUILD ERROR: Missing '{field}' field\n\
             The rules file must have a top-level '{field}' array.\n"
        );
    });

    let entries = value.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nRULES BUILD ERROR: '{field}' must be an array\n\
             Got: {value}\n"
        );
    });

    let mut seen = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let text = entry.as_str().unwrap_or_else(|| {
            panic!(
                "\n\nRULES BUILD ERROR: '{field}' entry {i} must be a string\n\
                 Got: {entry}\n"
            );
        });
        assert!(
            !text.trim().is_empty(),
            "\n\nRULES BUILD ERROR: '{field}' entry {i} is blank\n"
        );
        assert!(
            seen.insert(text),
            "\n\nRULES BUILD ERROR: Duplicate '{field}' entry '{text}'\n"
        );
    }

    entries.len()
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the rules change
    println!("cargo:rerun-if-changed=rules/column_rules.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
