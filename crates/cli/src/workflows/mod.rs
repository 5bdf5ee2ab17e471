mod setup_workflow;

pub use setup_workflow::*;
