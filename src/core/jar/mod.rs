mod assembler;
mod entry;
mod manifest;
mod services;

pub use assembler::{build_class_path, AssemblyReport, JarAssembler, LAUNCH_PROPERTIES_PATH};
pub use entry::{is_signature_file, EntryAction};
pub use manifest::{read_manifest_main_class, Manifest, MANIFEST_PATH};
pub use services::{RegistrationFiles, SERVICES_DIR};
