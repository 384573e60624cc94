//! Transform System
//!
//! Keeps world matrices in sync with the hierarchy. The world recomputes
//! eagerly: every mutating call on a game object cascades through its
//! subtree before returning, so no caller ever observes a stale world matrix.
//!
//! The cascade only borrows the object store, which keeps it free of the
//! component bookkeeping in [`World`](crate::scene::World).

use glam::Mat4;

use crate::core::ObjectStore;
use crate::scene::GameObjectHandle;
use crate::scene::game_object::GameObject;

/// Recomputes the world matrix of `root` and of every descendant.
///
/// Uses an explicit stack instead of recursion so deep hierarchies cannot
/// overflow the call stack.
pub fn update_subtree(objects: &mut ObjectStore<GameObjectHandle, GameObject>, root: GameObjectHandle) {
    let Some(node) = objects.get(root) else {
        return;
    };
    let parent_world = node
        .parent
        .and_then(|parent| objects.get(parent))
        .map(|parent| *parent.transform.world_matrix());

    // Work stack: (handle, parent world matrix)
    let mut stack: Vec<(GameObjectHandle, Option<Mat4>)> = Vec::with_capacity(16);
    stack.push((root, parent_world));

    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = objects.get_mut(handle) else {
            continue;
        };

        node.transform.update_world_matrix(parent_world.as_ref());
        let current_world = *node.transform.world_matrix();

        // Reverse order keeps the depth-first visit in child order.
        for &child in node.children.iter().rev() {
            stack.push((child, Some(current_world)));
        }
    }
}
