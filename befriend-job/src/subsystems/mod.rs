pub mod graph_loader;
pub mod notify;
pub mod suggest;
