mod asset_index;

pub use asset_index::{object_path, object_url, AssetIndex, AssetObject, RESOURCES_URL};
