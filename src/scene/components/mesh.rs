use std::rc::Rc;

use crate::resources::mesh::Mesh;
use crate::scene::component::Component;

/// Makes a game object renderable. The mesh is shared, not owned.
#[derive(Debug, Clone)]
pub struct MeshComponent {
    pub mesh: Rc<Mesh>,
}

impl MeshComponent {
    #[must_use]
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self { mesh }
    }
}

impl Component for MeshComponent {}
