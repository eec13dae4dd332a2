//! The canonical four-file bundle and its mapping to and from a file tree.

mod codec;
mod model;

pub use codec::{
    ROOT_FOLDER_ID, ROOT_FOLDER_NAME, SOURCE_FOLDER_ID, SOURCE_FOLDER_NAME, to_bundle, to_tree,
};
pub use model::{CanonicalFile, CodeBundle, DEFAULT_DATA_DOCUMENT};
