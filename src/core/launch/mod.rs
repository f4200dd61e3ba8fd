pub mod classpath;
pub mod task;

pub use classpath::{build_classpath, join_classpath};
pub use task::{build_launch_args, launch};
