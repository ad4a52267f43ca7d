//! Mock driver generation from the Vulkan API registry.
//!
//! `vkmock-codegen` reads an API description and emits a mock implementation
//! of every entry point: a header and a C++ source that together form a
//! loadable, callable driver that does no real work. Handles it returns are
//! unique and accepted by its own teardown calls.
//!
//! # Architecture
//!
//! ```text
//! Input              IR / engine                          Output Backends
//! ──────────     ────────────────────────────────────     ───────────────────
//! vk.xml   ─┐                     ┌─> Classifier       ┌─> mock-icd-header (.h)
//! JSON     ─┴─> ApiSpec ─> Synthesizer ─> Allocator ───┤
//!               (ir.rs)    ^  ^   └─> Override Table   └─> mock-icd-source (.cpp)
//!                          │  └ Extension Tables
//!                          └ SpecModel
//! ```
//!
//! Extension tables are built before synthesis; the enumeration overrides
//! read them. [`runtime::BackendContext`] models the generated backend's
//! shared state in-process.
//!
//! # Example
//!
//! ```
//! use vkmock_codegen::ir::{ApiSpec, Command, Param, TypeDef, TypeKind};
//! use vkmock_codegen::{GenerateOptions, generate};
//!
//! let mut spec = ApiSpec::new();
//! spec.add_type(TypeDef::new("VkDevice", TypeKind::DispatchableHandle));
//! spec.add_type(TypeDef::new("VkFence", TypeKind::NonDispatchableHandle));
//! spec.add_command(
//!     Command::new(
//!         "vkCreateFence",
//!         vec![Param::value("device", "VkDevice"), Param::out("pFence", "VkFence")],
//!     )
//!     .returning("VkResult"),
//! );
//!
//! let artifacts = generate(&spec, &GenerateOptions::default()).unwrap();
//! assert!(artifacts.header.contents.contains("{\"vkCreateFence\", (void*)CreateFence},"));
//! assert!(artifacts.source.contents.contains("*pFence = (VkFence)global_unique_handle++;"));
//! ```
//!
//! # Feature Flags
//!
//! - `input-registry` - Vulkan XML registry reader (roxmltree)
//! - `input-json` - JSON model reader
//! - `backend-header` - header artifact backend
//! - `backend-source` - source artifact backend

pub mod allocate;
pub mod classify;
pub mod error;
pub mod extensions;
pub mod generate;
pub mod guard;
pub mod input;
pub mod ir;
pub mod model;
pub mod output;
pub mod overrides;
pub mod registry;
pub mod runtime;
pub mod sink;
pub mod synth;
pub mod traits;

pub use allocate::{AllocationPlan, Cardinality, HandleKind, SpecInconsistency, plan_allocation};
pub use classify::{RoleSource, classify, classify_with_source};
pub use error::GenerateError;
pub use extensions::{ExtensionEntry, ExtensionFilter, ExtensionTables};
pub use generate::{Artifact, Artifacts, GenerateOptions, Generation, generate};
pub use input::{InputFormat, ParseError};
pub use model::SpecModel;
pub use overrides::{OverrideEntry, OverrideTable};
pub use registry::{backend_names, backends_by_kind, get_backend, register_backend};
pub use synth::{Body, Surface, SynthesizedCommand, Synthesizer};
pub use traits::{ArtifactKind, Backend};
