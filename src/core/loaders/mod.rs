pub mod descriptor;
pub mod family;
pub mod library;
pub mod plan;
pub mod resolver;

pub use descriptor::{read_embedded_descriptor, LoaderDescriptor, EMBEDDED_DESCRIPTOR_PATH};
pub use family::{LoaderFamily, LoaderVersion};
pub use library::{DependencyRole, DependencySource, DependencySpec, ResolvedLibrary};
pub use plan::{PackagingPlan, PackagingStrategy, DEFAULT_LAUNCHER_MAIN_CLASS};
pub use resolver::{check_compatibility, DependencyResolver, Resolution};
