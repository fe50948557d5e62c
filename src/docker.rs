#![allow(clippy::module_name_repetitions)]
//! Docker image naming, build recipes, run arguments and the engine CLI.

pub mod engine;
pub mod images;
pub mod recipe;
pub mod run;
pub mod runtime;

pub use engine::{ContainerEngine, DockerCli, ExitCode, PreviewEngine};
pub use images::{resolve, ContainerKind, ImageNames, DEFAULT_OWNER_NAMESPACE};
pub use recipe::{generate, BuildRecipe, Instruction};
pub use run::{RunArgs, RunInputs};
pub use runtime::container_runtime_path;
