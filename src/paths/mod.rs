pub mod object_id;
pub mod path;

pub use object_id::{candidate_file_paths, file_path_to_object_id, object_id_to_file_path};
pub use path::{
    heading_slug, normalize_dir_root, normalize_rel_path, os_path_to_string, vault_relative_path,
};
