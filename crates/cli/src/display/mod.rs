pub mod formatter;

pub use formatter::{
    describe_source, format_edge, print_edge_set, print_graph, print_json,
    print_module_dependencies, print_projects, print_tasks,
};
