//! Strip packing problem model

pub mod instance;
pub mod io;
pub mod placement;

pub use instance::{Circuit, Instance, InstanceError};
pub use io::{
    create_example_instances, list_instance_files, load_instance_from_file, save_solution_to_file,
};
pub use placement::Placement;
