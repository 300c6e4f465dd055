mod hash_map_list;
mod node_path;

pub use hash_map_list::HashMapList;
pub use node_path::NodePath;
