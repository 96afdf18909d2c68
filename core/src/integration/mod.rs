//! Integration tests for randxform core
//!
//! Runs full transforms against the in-memory host: conservation of
//! polygons across island runs, per-unit sample independence, and the
//! guard scenarios that must abort before any mutation.

#[cfg(test)]
mod island_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::host::ItemId;
    use crate::memory::MemoryScene;

    /// `count` disjoint triangle fans of `size` triangles each.
    ///
    /// Fan `i` uses vertex indices starting at `i * 1000`, so fans never
    /// share a vertex and each one forms a single island.
    pub fn fans(count: u32, size: u32) -> Vec<Vec<u32>> {
        let mut polygons = Vec::new();
        for fan in 0..count {
            let base = fan * 1000;
            for tri in 0..size {
                polygons.push(vec![base, base + tri + 1, base + tri + 2]);
            }
        }
        polygons
    }

    /// Scene with one selected mesh made of `count` fans
    pub fn scene_with_fans(count: u32, size: u32) -> (MemoryScene, ItemId) {
        let mut scene = MemoryScene::new();
        let item = scene.add_selected_mesh("fans", fans(count, size));
        (scene, item)
    }
}
