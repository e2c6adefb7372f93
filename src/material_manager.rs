use std::collections::HashMap;

use glam::Vec4;
use id_arena::{Arena, Id};

use crate::asset_pipeline::materials::MaterialData;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GltfMaterialKey {
    pub file_name: String,
    pub material_name: String,
}

pub type MaterialId = Id<MaterialData>;

pub struct MaterialManager {
    materials: Arena<MaterialData>,
    materials_by_gltf: HashMap<GltfMaterialKey, MaterialId>,
    default_material: Option<MaterialId>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: Arena::new(),
            materials_by_gltf: HashMap::new(),
            default_material: None,
        }
    }

    pub fn add_material(&mut self, material_data: MaterialData) -> MaterialId {
        self.materials.alloc(material_data)
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialData> {
        self.materials.get(id)
    }

    pub fn name(&self, id: MaterialId) -> &str {
        self.get(id).map_or("Unknown material", |material| &material.name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.len() == 0
    }

    pub fn get_gltf_material(&self, file_name: &str, material_name: &str) -> Option<MaterialId> {
        let key = GltfMaterialKey {
            file_name: file_name.to_string(),
            material_name: material_name.to_string(),
        };
        self.materials_by_gltf.get(&key).copied()
    }

    /// Material used by glTF primitives that don't reference one.
    pub fn default_material(&mut self) -> MaterialId {
        match self.default_material {
            Some(id) => id,
            None => {
                let id = self.add_material(MaterialData::new("Default material"));
                self.default_material = Some(id);
                id
            }
        }
    }

    pub fn load_all_materials_from_gltf(&mut self, file_name: &str, document: &gltf::Document) {
        for material in document.materials() {
            let material_name = material
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("Material {}", material.index().unwrap_or(0)));

            let key = GltfMaterialKey {
                file_name: file_name.to_string(),
                material_name: material_name.clone(),
            };

            if self.materials_by_gltf.contains_key(&key) {
                continue;
            }

            let base_color = Vec4::from(material.pbr_metallic_roughness().base_color_factor());

            let id = self.add_material(MaterialData {
                name: material_name,
                base_color,
            });
            self.materials_by_gltf.insert(key, id);
        }

        log::debug!(
            "Loaded {} materials from {} ({} total)",
            document.materials().len(),
            file_name,
            self.len()
        );
    }

    /// Resolves a primitive's material, falling back to the default material.
    pub fn material_for_primitive(
        &mut self,
        file_name: &str,
        primitive: &gltf::Primitive,
    ) -> MaterialId {
        let material = primitive.material();
        let name = material
            .name()
            .map(String::from)
            .or_else(|| material.index().map(|index| format!("Material {index}")));

        name.and_then(|name| self.get_gltf_material(file_name, &name))
            .unwrap_or_else(|| self.default_material())
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_created_once() {
        let mut materials = MaterialManager::new();

        let first = materials.default_material();
        let second = materials.default_material();

        assert_eq!(first, second);
        assert_eq!(materials.len(), 1);
        assert_eq!(materials.name(first), "Default material");
    }

    #[test]
    fn added_materials_keep_their_names() {
        let mut materials = MaterialManager::new();
        let stone = materials.add_material(MaterialData::new("Stone"));
        let wood = materials.add_material(MaterialData::new("Wood"));

        assert_ne!(stone, wood);
        assert_eq!(materials.name(wood), "Wood");
    }
}
