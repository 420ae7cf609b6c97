//! C++, C# and Java renderers
//!
//! These languages keep inheritance, so each file holds only the entity's
//! own fields and names its base. Serialization methods are not emitted.

use super::entity_gen::{EmitOptions, FINGERPRINT_LABEL};
use super::mapper::TargetTypeMapper;
use crate::entity::schema::{FieldType, Model, ResolvedEntity, ResolvedField};
use crate::entity::types::PrimitiveKind;

/// Comment block opening every C-family file
fn banner(entity: &ResolvedEntity, options: &EmitOptions, fingerprint: Option<&str>) -> String {
    let mut out = String::from("/*\n * WARNING! This file was autogenerated. Do not modify it!\n");
    if let Some(created) = options.creation_date() {
        out.push_str(" *\n");
        out.push_str(&format!(" * Creation date: {}\n", created));
    }
    if let Some(fingerprint) = fingerprint {
        out.push_str(&format!(" * {}{}\n", FINGERPRINT_LABEL, fingerprint));
    }
    if let Some(description) = &entity.description {
        out.push_str(" *\n");
        for line in description.lines() {
            if line.trim().is_empty() {
                out.push_str(" *\n");
            } else {
                out.push_str(&format!(" * {}\n", line));
            }
        }
    }
    out.push_str(" */\n\n");
    out
}

fn uses_primitive(fields: &[&ResolvedField], wanted: &[PrimitiveKind]) -> bool {
    fields
        .iter()
        .any(|f| matches!(f.field_type.base_type(), FieldType::Primitive(k) if wanted.contains(k)))
}

fn has_collection(fields: &[&ResolvedField]) -> bool {
    fields.iter().any(|f| f.field_type.is_collection())
}

/// Defaults are emitted only where the target can hold a literal
fn default_applies(field: &ResolvedField, model: &Model) -> bool {
    match &field.field_type {
        FieldType::Primitive(_) => true,
        FieldType::Reference(name) => model.is_enum(name),
        FieldType::Collection(_) => false,
    }
}

fn enumerators(entity: &ResolvedEntity, mapper: &dyn TargetTypeMapper, indent: &str) -> String {
    entity
        .enum_values()
        .iter()
        .map(|v| format!("{}{}", indent, mapper.enumerator_name(v)))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// `Name.h`
pub fn render_cpp(
    entity: &ResolvedEntity,
    model: &Model,
    mapper: &dyn TargetTypeMapper,
    options: &EmitOptions,
    fingerprint: Option<&str>,
) -> String {
    let namespace = options.namespace_for(entity);
    let guard = format!("{}_{}_H", guard_part(&namespace), guard_part(&entity.name));

    let mut out = banner(entity, options, fingerprint);
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));

    let body = if entity.is_enum() {
        out.push_str("#include <cstddef>\n\n");

        let mut body = format!("\tenum class {} {{\n", entity.name);
        body.push_str(&enumerators(entity, mapper, "\t\t"));
        body.push_str("\n\t};\n\n");
        body.push_str(&format!(
            "\tstatic const size_t {}Count = {};\n",
            entity.name,
            entity.enum_values().len()
        ));
        body
    } else {
        let own: Vec<&ResolvedField> = entity.own_fields().collect();

        let mut includes = Vec::new();
        if has_collection(&own) {
            includes.push("#include <vector>".to_string());
        }
        if uses_primitive(&own, &[PrimitiveKind::String]) {
            includes.push("#include <string>".to_string());
        }
        if uses_primitive(&own, &[PrimitiveKind::U32, PrimitiveKind::I32]) {
            includes.push("#include <cstdint>".to_string());
        }
        let parent = entity.parent();
        if let Some(parent) = parent {
            includes.push(format!("#include \"{}.h\"", parent));
        }
        for reference in &entity.references {
            if Some(reference.as_str()) != parent {
                includes.push(format!("#include \"{}.h\"", reference));
            }
        }
        if !includes.is_empty() {
            out.push_str(&includes.join("\n"));
            out.push_str("\n\n");
        }

        let inherits = parent.map(|p| format!(" : public {}", p)).unwrap_or_default();
        let mut body = format!("\tstruct {}{} {{\n", entity.name, inherits);
        for field in own {
            let mut member = format!(
                "\t\t{} {}",
                mapper.type_spelling(&field.field_type),
                mapper.member_name(&field.name)
            );
            if let Some(default) = field.default.as_ref().filter(|_| default_applies(field, model)) {
                member.push_str(&format!(" = {}", mapper.default_spelling(&field.field_type, default)));
            }
            member.push_str(";\n");
            body.push_str(&member);
        }
        body.push_str("\t};\n");
        body
    };

    out.push_str(&format!("namespace {} {{\n", namespace.replace('.', "::")));
    out.push_str(&body);
    out.push_str("}\n");
    out.push_str(&format!("\n#endif //{}\n", guard));
    out
}

fn guard_part(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

/// `Name.cs`
pub fn render_cs(
    entity: &ResolvedEntity,
    model: &Model,
    mapper: &dyn TargetTypeMapper,
    options: &EmitOptions,
    fingerprint: Option<&str>,
) -> String {
    let namespace = options.namespace_for(entity);
    let mut out = banner(entity, options, fingerprint);

    let body = if entity.is_enum() {
        format!(
            "    public enum {} {{\n{}\n    }}\n",
            entity.name,
            enumerators(entity, mapper, "        ")
        )
    } else {
        let own: Vec<&ResolvedField> = entity.own_fields().collect();
        if has_collection(&own) {
            out.push_str("using System.Collections.Generic;\n\n");
        }

        let inherits = entity.parent().map(|p| format!(" : {}", p)).unwrap_or_default();
        let mut body = format!("    public class {}{} {{\n", entity.name, inherits);
        for field in own {
            let mut member = format!(
                "        public {} {}",
                mapper.type_spelling(&field.field_type),
                mapper.member_name(&field.name)
            );
            if let Some(default) = field.default.as_ref().filter(|_| default_applies(field, model)) {
                member.push_str(&format!(" = {}", mapper.default_spelling(&field.field_type, default)));
            }
            member.push_str(";\n");
            body.push_str(&member);
        }
        body.push_str("    }\n");
        body
    };

    out.push_str(&format!("namespace {} {{\n", namespace));
    out.push_str(&body);
    out.push_str("}\n");
    out
}

/// Simple name of the implemented interface and the import it needs, if any
fn java_interface(entity: &ResolvedEntity, model: &Model, options: &EmitOptions, package: &str) -> Option<(String, Option<String>)> {
    let interface = entity.implements.as_deref()?;

    if let Some((path, simple)) = interface.rsplit_once('.') {
        let import = (path != package).then(|| interface.to_string());
        return Some((simple.to_string(), import));
    }
    if interface == "Serializable" {
        return Some((interface.to_string(), Some("java.io.Serializable".to_string())));
    }
    let import = model
        .get(interface)
        .map(|target| options.package_for(target))
        .filter(|target_package| target_package != package)
        .map(|target_package| format!("{}.{}", target_package, interface));
    Some((interface.to_string(), import))
}

/// `Name.java`
pub fn render_java(
    entity: &ResolvedEntity,
    model: &Model,
    mapper: &dyn TargetTypeMapper,
    options: &EmitOptions,
    fingerprint: Option<&str>,
) -> String {
    let package = options.package_for(entity);
    let mut out = banner(entity, options, fingerprint);
    out.push_str(&format!("package {};\n\n", package));

    if entity.is_enum() {
        out.push_str(&format!(
            "public enum {} {{\n{}\n}}\n",
            entity.name,
            enumerators(entity, mapper, "    ")
        ));
        return out;
    }

    let own: Vec<&ResolvedField> = entity.own_fields().collect();
    let interface = java_interface(entity, model, options, &package);

    let mut imports = Vec::new();
    if has_collection(&own) {
        imports.push("import java.util.ArrayList;".to_string());
    }
    let used = entity.parent().into_iter().chain(entity.references.iter().map(String::as_str));
    for name in used {
        let Some(target) = model.get(name) else {
            continue;
        };
        let target_package = options.package_for(target);
        if target_package != package {
            let import = format!("import {}.{};", target_package, name);
            if !imports.contains(&import) {
                imports.push(import);
            }
        }
    }
    if let Some((_, Some(path))) = &interface {
        let import = format!("import {};", path);
        if !imports.contains(&import) {
            imports.push(import);
        }
    }
    if !imports.is_empty() {
        out.push_str(&imports.join("\n"));
        out.push_str("\n\n");
    }

    let inherits = entity.parent().map(|p| format!(" extends {}", p)).unwrap_or_default();
    let implements = interface
        .map(|(name, _)| format!(" implements {}", name))
        .unwrap_or_default();
    out.push_str(&format!("public class {}{}{} {{\n", entity.name, inherits, implements));
    for field in own {
        let spelled = mapper.type_spelling(&field.field_type);
        let mut member = format!("    public {} {}", spelled, mapper.member_name(&field.name));

        let is_class_reference = matches!(&field.field_type, FieldType::Reference(name) if !model.is_enum(name));
        if field.field_type.is_collection() || is_class_reference {
            member.push_str(&format!(" = new {}()", spelled));
        } else if let Some(default) = field.default.as_ref().filter(|_| default_applies(field, model)) {
            member.push_str(&format!(" = {}", mapper.default_spelling(&field.field_type, default)));
        }
        member.push_str(";\n");
        out.push_str(&member);
    }
    out.push_str("}\n");
    out
}
