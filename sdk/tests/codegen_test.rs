use modelgen_sdk::entity::codegen::{EmitOptions, EntityCodeGenerator, EntityGenerator, TargetLanguage};
use modelgen_sdk::{Codegen, ResolverOptions, codegen};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMAS: &[(&str, &str)] = &[
    ("Entity.json", r#"{ "name": "Entity", "fields": [{ "name": "id", "type": "u32" }] }"#),
    ("Hat.json", r#"{ "name": "Hat", "fields": [{ "name": "size", "type": "float32", "default": 1.5 }] }"#),
    (
        "Color.json",
        r#"{ "name": "Color", "type": "enum", "values": ["Red", "Green", "Blue"] }"#,
    ),
    (
        "Animal.json",
        r#"{
            "name": "Animal",
            "base": "Entity",
            "description": "Represents an animal with a hat.",
            "fields": [
                { "name": "age", "type": "integer-unsigned-32" },
                { "name": "height", "type": "float32" },
                { "name": "friends", "type": "collection<Entity>" },
                { "name": "owner", "type": "string", "default": "John" },
                { "name": "happy", "type": "boolean", "default": true },
                { "name": "color", "type": "Color", "default": "Blue" },
                { "name": "hat", "type": "Hat" }
            ]
        }"#,
    ),
];

fn write_schemas(dir: &Path) {
    for (name, content) in SCHEMAS {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn quiet() -> EmitOptions {
    EmitOptions {
        timestamp: false,
        ..EmitOptions::default()
    }
}

#[test]
fn test_cpp_header_layout() {
    let schema_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());

    let mut generator = EntityGenerator::new();
    let model = generator.resolve_paths(&[schema_dir.path()]).unwrap();
    assert_eq!(model.len(), 4);
    assert!(generator.lint(&model).is_empty());

    let targets = [(TargetLanguage::Cpp, out_dir.path().to_path_buf())];
    let results = Codegen::for_languages(&targets, &quiet()).generate_all(&model);
    assert!(results[0].success);
    assert_eq!(results[0].files_generated.len(), 4);

    let header = fs::read_to_string(out_dir.path().join("Animal.h")).unwrap();
    let expected_body = "\
namespace models {
\tstruct Animal : public Entity {
\t\tuint32_t m_age;
\t\tfloat m_height;
\t\tstd::vector<Entity> m_friends;
\t\tstd::string m_owner = \"John\";
\t\tbool m_happy = true;
\t\tColor m_color = Color::Blue;
\t\tHat m_hat;
\t};
}
";
    assert!(header.contains(expected_body), "unexpected header:\n{}", header);
    assert!(header.contains(" * Represents an animal with a hat.\n"));
    assert!(header.contains("#include \"Entity.h\"\n#include \"Color.h\"\n#include \"Hat.h\""));

    let hat = fs::read_to_string(out_dir.path().join("Hat.h")).unwrap();
    assert!(hat.contains("float m_size = 1.5f;"));
}

#[test]
fn test_generated_rust_module() {
    let schema_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());

    let results = codegen(
        &[schema_dir.path()],
        &[(TargetLanguage::Rust, out_dir.path().to_path_buf())],
        ResolverOptions::default(),
        &quiet(),
    )
    .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    // 4 models + mod.rs
    assert_eq!(results[0].files_generated.len(), 5);

    let module = fs::read_to_string(out_dir.path().join("mod.rs")).unwrap();
    let order: Vec<&str> = module
        .lines()
        .filter_map(|l| l.strip_prefix("pub mod "))
        .map(|l| l.trim_end_matches(';'))
        .collect();
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
    assert!(position("entity") < position("animal"));
    assert!(position("hat") < position("animal"));
    assert!(position("color") < position("animal"));

    let animal = fs::read_to_string(out_dir.path().join("animal.rs")).unwrap();
    assert!(animal.contains("pub id: u32"));
    assert!(animal.contains("pub friends: Vec<Entity>"));
    assert!(animal.contains("color: Color::Blue,"));
    assert!(animal.contains("happy: true,"));

    let color = fs::read_to_string(out_dir.path().join("color.rs")).unwrap();
    assert!(color.contains("pub enum Color"));
}

#[test]
fn test_all_languages_from_one_model() {
    let schema_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());

    let generator = EntityGenerator::new();
    let model = generator.resolve_paths(&[schema_dir.path()]).unwrap();

    let targets: Vec<(TargetLanguage, PathBuf)> = TargetLanguage::ALL
        .iter()
        .map(|l| (*l, out_dir.path().join(l.name())))
        .collect();
    let results = Codegen::for_languages(&targets, &quiet()).generate_all(&model);
    assert!(results.iter().all(|r| r.success));

    let cs = fs::read_to_string(out_dir.path().join("csharp/Animal.cs")).unwrap();
    assert!(cs.contains("public class Animal : Entity {"));
    assert!(cs.contains("public List<Entity> friends;"));

    let java = fs::read_to_string(out_dir.path().join("java/Animal.java")).unwrap();
    assert!(java.contains("public class Animal extends Entity {"));
    assert!(java.contains("public Color color = Color.Blue;"));

    let color = fs::read_to_string(out_dir.path().join("java/Color.java")).unwrap();
    assert!(color.contains("public enum Color {\n    Red,\n    Green,\n    Blue\n}"));
}

#[test]
fn test_emitting_same_model_twice_is_identical() {
    let schema_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());
    let model = EntityGenerator::new().resolve_paths(&[schema_dir.path()]).unwrap();

    let emitter = EntityCodeGenerator::with_options(TargetLanguage::Java, quiet());
    for entity in &model {
        assert_eq!(emitter.generate_entity(entity, &model), emitter.generate_entity(entity, &model));
    }
}

#[test]
fn test_namespace_fallback() {
    let schema_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());
    let model = EntityGenerator::new().resolve_paths(&[schema_dir.path()]).unwrap();

    let emitter = EntityCodeGenerator::with_options(
        TargetLanguage::Java,
        EmitOptions {
            timestamp: false,
            default_namespace: "zoo".to_string(),
        },
    );
    let code = emitter.generate_entity(model.get("Hat").unwrap(), &model);
    assert!(code.contains("package zoo;"));
}

#[test]
fn test_members_layout_matches_reference_header() {
    let schema_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());
    // same model, written the way the first-generation tool expected it
    fs::write(
        schema_dir.path().join("Animal.json"),
        r#"{
            "type": "class",
            "parent": "Entity",
            "comment": "Represents an animal with a hat.",
            "members": [
                { "name": "age", "type": "integer" },
                { "name": "height", "type": "float" },
                { "name": "friends", "type": "list<Entity>" },
                { "name": "owner", "type": "string", "default": "\"John\"" },
                { "name": "happy", "type": "boolean", "default": "true" },
                { "name": "color", "type": "Color" },
                { "name": "hat", "type": "Hat" }
            ]
        }"#,
    )
    .unwrap();

    let model = EntityGenerator::new().resolve_paths(&[schema_dir.path()]).unwrap();
    let targets = [(TargetLanguage::Cpp, out_dir.path().to_path_buf())];
    let results = Codegen::for_languages(&targets, &quiet()).generate_all(&model);
    assert!(results[0].success);

    let header = fs::read_to_string(out_dir.path().join("Animal.h")).unwrap();
    let members: Vec<&str> = header.lines().filter(|l| l.starts_with("\t\t")).collect();
    assert_eq!(
        members,
        [
            "\t\tuint32_t m_age;",
            "\t\tfloat m_height;",
            "\t\tstd::vector<Entity> m_friends;",
            "\t\tstd::string m_owner = \"John\";",
            "\t\tbool m_happy = true;",
            "\t\tColor m_color;",
            "\t\tHat m_hat;",
        ]
    );
    assert!(header.contains("namespace models {\n\tstruct Animal : public Entity {\n"));
    assert!(header.contains(" * Represents an animal with a hat.\n"));
}

#[test]
fn test_second_run_leaves_unchanged_files_alone() {
    let schema_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());
    let targets = [(TargetLanguage::Java, out_dir.path().to_path_buf())];

    // timestamps on, so only the fingerprint can keep the files stable
    let first = codegen(&[schema_dir.path()], &targets, ResolverOptions::default(), &EmitOptions::default()).unwrap();
    assert_eq!(first[0].files_generated.len(), 4);
    let before = fs::read_to_string(out_dir.path().join("Animal.java")).unwrap();

    let second = codegen(&[schema_dir.path()], &targets, ResolverOptions::default(), &EmitOptions::default()).unwrap();
    assert!(second[0].success);
    assert!(second[0].files_generated.is_empty());
    assert!(second[0].message.contains("4 files unchanged"));
    assert_eq!(fs::read_to_string(out_dir.path().join("Animal.java")).unwrap(), before);

    // a schema change rewrites only the affected file
    fs::write(
        schema_dir.path().join("Hat.json"),
        r#"{ "name": "Hat", "fields": [{ "name": "size", "type": "float32", "default": 2.5 }] }"#,
    )
    .unwrap();
    let third = codegen(&[schema_dir.path()], &targets, ResolverOptions::default(), &EmitOptions::default()).unwrap();
    assert_eq!(third[0].files_generated, vec![out_dir.path().join("Hat.java")]);
}

#[test]
fn test_subdir_places_output() {
    let schema_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_schemas(schema_dir.path());
    fs::write(
        schema_dir.path().join("Hat.json"),
        r#"{ "name": "Hat", "subdir": "wearables", "fields": [{ "name": "size", "type": "float32" }] }"#,
    )
    .unwrap();

    let targets = [(TargetLanguage::CSharp, out_dir.path().to_path_buf())];
    let results = codegen(&[schema_dir.path()], &targets, ResolverOptions::default(), &quiet()).unwrap();
    assert!(results[0].success);

    assert!(out_dir.path().join("wearables").join("Hat.cs").exists());
    assert!(out_dir.path().join("Animal.cs").exists());
    assert!(!out_dir.path().join("Hat.cs").exists());
}
