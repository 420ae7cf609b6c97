//! Code generation module for resolved models

pub mod cfamily;
pub mod entity_gen;
pub mod generator;
pub mod mapper;

pub use entity_gen::{EmitOptions, EntityCodeGenerator, WrittenFiles};
pub use generator::{EntityGenerator, discover_schema_files};
pub use mapper::{CppMapper, CsMapper, JavaMapper, RustMapper, TargetLanguage, TargetTypeMapper};
