pub mod list;
pub mod lookup;
pub mod manager;
pub mod version;
