pub mod generate_tangents;
pub mod materials;
pub mod mesh_baker;
