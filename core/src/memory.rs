//! In-memory scene host
//!
//! [`MemoryScene`] implements [`SceneHost`] without any geometry: polygons
//! are ids with vertex-index lists, and connectivity means "shares a vertex
//! index within the same item". Channel writes, pivot requests and user
//! notifications are recorded so tests and the CLI can inspect them.
//!
//! Containers act as transform carriers: when polygons leave a container
//! whose channels or pivot were touched, those values are recorded on each
//! polygon as a [`BakedTransform`].

use std::collections::BTreeMap;
use std::path::Path;

use glam::DVec3;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::config::PivotAnchor;
use crate::error::{HostError, SceneError};
use crate::host::{Channels, ItemId, PolygonId, SceneHost, Severity};

/// Transform a polygon carried out of a container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BakedTransform {
    pub channels: Channels,
    pub pivot: Option<PivotAnchor>,
}

/// Message passed to [`SceneHost::notify`]
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Recorded mutating host call
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    CreateContainer { item: ItemId, name: String },
    DestroyContainer { item: ItemId },
    MovePolygons { from: ItemId, to: ItemId, count: usize },
    RecenterPivot { item: ItemId, anchor: PivotAnchor },
    SetScale { item: ItemId, scale: DVec3 },
    SetRotation { item: ItemId, rotation: DVec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Mesh,
    Container,
}

#[derive(Debug, Clone)]
struct SceneItem {
    name: String,
    kind: ItemKind,
    polygons: Vec<PolygonId>,
    channels: Channels,
    pivot: Option<PivotAnchor>,
}

#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<u32>,
    baked: Vec<BakedTransform>,
}

/// Scene host backed by plain collections
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    items: BTreeMap<ItemId, SceneItem>,
    polygons: HashMap<PolygonId, Polygon>,
    selection: Vec<ItemId>,
    next_item: u64,
    next_polygon: u64,
    created: usize,
    ops: Vec<HostOp>,
    notifications: Vec<Notification>,
    failing: HashSet<String>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh item with one polygon per vertex-index list
    pub fn add_mesh(&mut self, name: &str, polygons: Vec<Vec<u32>>) -> ItemId {
        let item = self.alloc_item();
        let ids = polygons
            .into_iter()
            .map(|vertices| self.alloc_polygon(vertices))
            .collect();
        self.items.insert(
            item,
            SceneItem {
                name: name.to_string(),
                kind: ItemKind::Mesh,
                polygons: ids,
                channels: Channels::default(),
                pivot: None,
            },
        );
        item
    }

    /// Add a mesh item and append it to the selection
    pub fn add_selected_mesh(&mut self, name: &str, polygons: Vec<Vec<u32>>) -> ItemId {
        let item = self.add_mesh(name, polygons);
        self.selection.push(item);
        item
    }

    pub fn select(&mut self, item: ItemId) {
        if !self.selection.contains(&item) {
            self.selection.push(item);
        }
    }

    /// Make every later call of the named operation fail until
    /// [`clear_failures`](Self::clear_failures)
    pub fn fail_on(&mut self, op: &str) {
        self.failing.insert(op.to_string());
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Ids of all items currently in the scene, ascending
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn item_name(&self, item: ItemId) -> Option<&str> {
        self.items.get(&item).map(|entry| entry.name.as_str())
    }

    /// Pivot anchor last applied to the item, if any
    pub fn pivot(&self, item: ItemId) -> Option<PivotAnchor> {
        self.items.get(&item).and_then(|entry| entry.pivot)
    }

    /// Number of containers created so far
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Transforms a polygon picked up from containers, oldest first
    pub fn baked_transforms(&self, polygon: PolygonId) -> &[BakedTransform] {
        self.polygons
            .get(&polygon)
            .map_or(&[][..], |entry| entry.baked.as_slice())
    }

    /// Canonical island partition of an item: each island sorted, islands sorted
    pub fn island_sets(&self, item: ItemId) -> Vec<Vec<PolygonId>> {
        let Some(entry) = self.items.get(&item) else {
            return Vec::new();
        };
        let mut seen: HashSet<PolygonId> = HashSet::new();
        let mut islands = Vec::new();
        for &seed in &entry.polygons {
            if seen.contains(&seed) {
                continue;
            }
            let mut island = self.flood(entry, seed);
            seen.extend(island.iter().copied());
            island.sort();
            islands.push(island);
        }
        islands.sort();
        islands
    }

    fn alloc_item(&mut self) -> ItemId {
        self.next_item += 1;
        ItemId(self.next_item)
    }

    fn alloc_polygon(&mut self, vertices: Vec<u32>) -> PolygonId {
        self.next_polygon += 1;
        let id = PolygonId(self.next_polygon);
        self.polygons.insert(
            id,
            Polygon {
                vertices,
                baked: Vec::new(),
            },
        );
        id
    }

    fn check(&self, op: &'static str) -> Result<(), HostError> {
        if self.failing.contains(op) {
            return Err(HostError::new(op, "injected failure"));
        }
        Ok(())
    }

    fn item(&self, op: &'static str, item: ItemId) -> Result<&SceneItem, HostError> {
        self.items
            .get(&item)
            .ok_or_else(|| HostError::unknown_item(op, item))
    }

    fn item_mut(&mut self, op: &'static str, item: ItemId) -> Result<&mut SceneItem, HostError> {
        self.items
            .get_mut(&item)
            .ok_or_else(|| HostError::unknown_item(op, item))
    }

    /// Breadth-first walk over polygons sharing a vertex index within `entry`
    fn flood(&self, entry: &SceneItem, seed: PolygonId) -> Vec<PolygonId> {
        let mut by_vertex: HashMap<u32, Vec<PolygonId>> = HashMap::new();
        for &polygon in &entry.polygons {
            if let Some(data) = self.polygons.get(&polygon) {
                for &vertex in &data.vertices {
                    by_vertex.entry(vertex).or_default().push(polygon);
                }
            }
        }

        let mut visited: HashSet<PolygonId> = HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        let mut island = Vec::new();
        visited.insert(seed);
        queue.push_back(seed);

        while let Some(polygon) = queue.pop_front() {
            island.push(polygon);
            let Some(data) = self.polygons.get(&polygon) else {
                continue;
            };
            for vertex in &data.vertices {
                for &neighbor in by_vertex.get(vertex).map_or(&[][..], Vec::as_slice) {
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        island
    }
}

impl SceneHost for MemoryScene {
    fn selected_meshes(&self) -> Result<Vec<ItemId>, HostError> {
        self.check("selected_meshes")?;
        Ok(self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                self.items
                    .get(id)
                    .is_some_and(|entry| entry.kind == ItemKind::Mesh)
            })
            .collect())
    }

    fn polygons(&self, item: ItemId) -> Result<Vec<PolygonId>, HostError> {
        self.check("polygons")?;
        Ok(self.item("polygons", item)?.polygons.clone())
    }

    fn connect_island(&self, item: ItemId, seed: PolygonId) -> Result<Vec<PolygonId>, HostError> {
        self.check("connect_island")?;
        let entry = self.item("connect_island", item)?;
        if !entry.polygons.contains(&seed) {
            return Err(HostError::new(
                "connect_island",
                format!("polygon {} is not on item {item}", seed.0),
            ));
        }
        Ok(self.flood(entry, seed))
    }

    fn create_container(&mut self, name: &str) -> Result<ItemId, HostError> {
        self.check("create_container")?;
        let item = self.alloc_item();
        self.items.insert(
            item,
            SceneItem {
                name: name.to_string(),
                kind: ItemKind::Container,
                polygons: Vec::new(),
                channels: Channels::default(),
                pivot: None,
            },
        );
        self.created += 1;
        self.ops.push(HostOp::CreateContainer {
            item,
            name: name.to_string(),
        });
        Ok(item)
    }

    fn destroy_container(&mut self, item: ItemId) -> Result<(), HostError> {
        self.check("destroy_container")?;
        let entry = self.item("destroy_container", item)?;
        if entry.kind != ItemKind::Container {
            return Err(HostError::new(
                "destroy_container",
                format!("item {item} is not a container"),
            ));
        }
        // Polygons still inside go with the container
        if let Some(entry) = self.items.remove(&item) {
            for polygon in entry.polygons {
                self.polygons.remove(&polygon);
            }
        }
        self.ops.push(HostOp::DestroyContainer { item });
        Ok(())
    }

    fn move_polygons(
        &mut self,
        from: ItemId,
        to: ItemId,
        polygons: &[PolygonId],
    ) -> Result<(), HostError> {
        self.check("move_polygons")?;
        self.item("move_polygons", to)?;
        let source = self.item("move_polygons", from)?;
        if let Some(missing) = polygons.iter().find(|p| !source.polygons.contains(*p)) {
            return Err(HostError::new(
                "move_polygons",
                format!("polygon {} is not on item {from}", missing.0),
            ));
        }

        let carried = (source.kind == ItemKind::Container
            && (source.channels != Channels::default() || source.pivot.is_some()))
        .then_some(BakedTransform {
            channels: source.channels,
            pivot: source.pivot,
        });

        let moving: HashSet<PolygonId> = polygons.iter().copied().collect();
        self.item_mut("move_polygons", from)?
            .polygons
            .retain(|polygon| !moving.contains(polygon));
        self.item_mut("move_polygons", to)?
            .polygons
            .extend_from_slice(polygons);

        if let Some(baked) = carried {
            for polygon in polygons {
                if let Some(data) = self.polygons.get_mut(polygon) {
                    data.baked.push(baked);
                }
            }
        }

        self.ops.push(HostOp::MovePolygons {
            from,
            to,
            count: polygons.len(),
        });
        Ok(())
    }

    fn recenter_pivot(&mut self, item: ItemId, anchor: PivotAnchor) -> Result<(), HostError> {
        self.check("recenter_pivot")?;
        self.item_mut("recenter_pivot", item)?.pivot = Some(anchor);
        self.ops.push(HostOp::RecenterPivot { item, anchor });
        Ok(())
    }

    fn set_scale(&mut self, item: ItemId, scale: DVec3) -> Result<(), HostError> {
        self.check("set_scale")?;
        self.item_mut("set_scale", item)?.channels.scale = scale;
        self.ops.push(HostOp::SetScale { item, scale });
        Ok(())
    }

    fn set_rotation(&mut self, item: ItemId, rotation: DVec3) -> Result<(), HostError> {
        self.check("set_rotation")?;
        self.item_mut("set_rotation", item)?.channels.rotation = rotation;
        self.ops.push(HostOp::SetRotation { item, rotation });
        Ok(())
    }

    fn channels(&self, item: ItemId) -> Result<Channels, HostError> {
        self.check("channels")?;
        Ok(self.item("channels", item)?.channels)
    }

    fn notify(&mut self, severity: Severity, title: &str, message: &str) {
        self.notifications.push(Notification {
            severity,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

// ============================================================================
// Scene fixtures (TOML)
// ============================================================================

/// TOML description of a [`MemoryScene`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    #[serde(default)]
    pub items: Vec<ItemDescription>,
}

/// One mesh item of a [`SceneDescription`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDescription {
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<PivotAnchor>,
    /// Vertex-index list per polygon
    #[serde(default)]
    pub polygons: Vec<Vec<u32>>,
    /// Transforms carried by the polygons, oldest first per polygon
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub baked: Vec<BakedDescription>,
}

/// One [`BakedTransform`] of a described polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BakedDescription {
    /// Index into the item's `polygons`
    pub polygon: usize,
    pub scale: [f64; 3],
    pub rotation: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<PivotAnchor>,
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl MemoryScene {
    /// Build a scene from a description; selected items keep file order
    pub fn from_description(description: &SceneDescription) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        for entry in &description.items {
            let item = scene.add_mesh(&entry.name, entry.polygons.clone());
            let Some(target) = scene.items.get_mut(&item) else {
                continue;
            };
            target.channels = Channels {
                scale: DVec3::from_array(entry.scale),
                rotation: DVec3::from_array(entry.rotation),
            };
            target.pivot = entry.pivot;
            let ids = target.polygons.clone();

            for record in &entry.baked {
                let polygon = ids
                    .get(record.polygon)
                    .and_then(|id| scene.polygons.get_mut(id))
                    .ok_or_else(|| SceneError::UnknownPolygon {
                        item: entry.name.clone(),
                        polygon: record.polygon,
                    })?;
                polygon.baked.push(BakedTransform {
                    channels: Channels {
                        scale: DVec3::from_array(record.scale),
                        rotation: DVec3::from_array(record.rotation),
                    },
                    pivot: record.pivot,
                });
            }

            if entry.selected {
                scene.selection.push(item);
            }
        }
        Ok(scene)
    }

    /// Describe the mesh items of the scene. Containers are left out.
    pub fn to_description(&self) -> SceneDescription {
        let items = self
            .items
            .iter()
            .filter(|(_, entry)| entry.kind == ItemKind::Mesh)
            .map(|(id, entry)| {
                let data: Vec<&Polygon> = entry
                    .polygons
                    .iter()
                    .filter_map(|polygon| self.polygons.get(polygon))
                    .collect();
                let baked = data
                    .iter()
                    .enumerate()
                    .flat_map(|(index, polygon)| {
                        polygon.baked.iter().map(move |baked| BakedDescription {
                            polygon: index,
                            scale: baked.channels.scale.to_array(),
                            rotation: baked.channels.rotation.to_array(),
                            pivot: baked.pivot,
                        })
                    })
                    .collect();
                ItemDescription {
                    name: entry.name.clone(),
                    selected: self.selection.contains(id),
                    scale: entry.channels.scale.to_array(),
                    rotation: entry.channels.rotation.to_array(),
                    pivot: entry.pivot,
                    polygons: data.iter().map(|polygon| polygon.vertices.clone()).collect(),
                    baked,
                }
            })
            .collect();
        SceneDescription { items }
    }

    /// Load a scene fixture from a TOML file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let description: SceneDescription = toml::from_str(&content)?;
        Self::from_description(&description)
    }

    /// Write the mesh items of the scene to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = toml::to_string_pretty(&self.to_description())?;
        std::fs::write(path, content).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_island_follows_shared_vertices() {
        let mut scene = MemoryScene::new();
        let item = scene.add_mesh(
            "strip",
            vec![vec![0, 1, 2], vec![2, 3, 4], vec![4, 5, 6], vec![7, 8, 9]],
        );
        let polygons = scene.polygons(item).unwrap();

        let mut island = scene.connect_island(item, polygons[0]).unwrap();
        island.sort();
        assert_eq!(island, polygons[..3].to_vec());

        let lone = scene.connect_island(item, polygons[3]).unwrap();
        assert_eq!(lone, vec![polygons[3]]);
    }

    #[test]
    fn test_connect_island_is_per_item() {
        let mut scene = MemoryScene::new();
        let a = scene.add_mesh("a", vec![vec![0, 1, 2]]);
        let b = scene.add_mesh("b", vec![vec![0, 1, 2]]);
        let seed = scene.polygons(a).unwrap()[0];

        assert_eq!(scene.connect_island(a, seed).unwrap(), vec![seed]);
        assert!(scene.connect_island(b, seed).is_err());
    }

    #[test]
    fn test_move_polygons_requires_ownership() {
        let mut scene = MemoryScene::new();
        let a = scene.add_mesh("a", vec![vec![0, 1, 2]]);
        let b = scene.add_mesh("b", vec![vec![3, 4, 5]]);
        let foreign = scene.polygons(b).unwrap();

        let err = scene.move_polygons(a, b, &foreign).unwrap_err();
        assert_eq!(err.op, "move_polygons");
        assert_eq!(scene.polygons(b).unwrap(), foreign);
    }

    #[test]
    fn test_move_out_of_touched_container_bakes() {
        let mut scene = MemoryScene::new();
        let mesh = scene.add_mesh("mesh", vec![vec![0, 1, 2]]);
        let polygon = scene.polygons(mesh).unwrap()[0];
        let container = scene.create_container("temp").unwrap();

        scene.move_polygons(mesh, container, &[polygon]).unwrap();
        assert!(scene.baked_transforms(polygon).is_empty());

        scene.recenter_pivot(container, PivotAnchor::Left).unwrap();
        scene.set_scale(container, DVec3::splat(3.0)).unwrap();
        scene.move_polygons(container, mesh, &[polygon]).unwrap();

        let baked = scene.baked_transforms(polygon);
        assert_eq!(baked.len(), 1);
        assert_eq!(baked[0].pivot, Some(PivotAnchor::Left));
        assert_eq!(baked[0].channels.scale, DVec3::splat(3.0));
    }

    #[test]
    fn test_destroy_only_containers() {
        let mut scene = MemoryScene::new();
        let mesh = scene.add_mesh("mesh", Vec::new());
        assert!(scene.destroy_container(mesh).is_err());

        let container = scene.create_container("temp").unwrap();
        scene.destroy_container(container).unwrap();
        assert_eq!(scene.item_ids(), vec![mesh]);
    }

    #[test]
    fn test_selection_skips_containers() {
        let mut scene = MemoryScene::new();
        let mesh = scene.add_selected_mesh("mesh", Vec::new());
        let container = scene.create_container("temp").unwrap();
        scene.select(container);

        assert_eq!(scene.selected_meshes().unwrap(), vec![mesh]);
    }

    #[test]
    fn test_fail_on_persists_until_cleared() {
        let mut scene = MemoryScene::new();
        scene.fail_on("selected_meshes");
        assert!(scene.selected_meshes().is_err());
        assert!(scene.selected_meshes().is_err());
        scene.clear_failures();
        assert!(scene.selected_meshes().is_ok());
    }

    #[test]
    fn test_description_roundtrip() {
        let text = r#"
[[items]]
name = "rocks"
selected = true
rotation = [0.0, 45.0, 0.0]
polygons = [[0, 1, 2], [5, 6, 7]]

[[items]]
name = "ground"
polygons = [[0, 1, 2, 3]]
"#;
        let description: SceneDescription = toml::from_str(text).unwrap();
        let scene = MemoryScene::from_description(&description).unwrap();

        let selected = scene.selected_meshes().unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(scene.item_name(selected[0]), Some("rocks"));
        assert_eq!(
            scene.channels(selected[0]).unwrap().rotation,
            DVec3::new(0.0, 45.0, 0.0)
        );
        assert_eq!(scene.island_sets(selected[0]).len(), 2);
        assert_eq!(scene.to_description(), description);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        let mut scene = MemoryScene::new();
        scene.add_selected_mesh("cube", vec![vec![0, 1, 2], vec![2, 3, 0]]);

        scene.save(&path).unwrap();
        let loaded = MemoryScene::load(&path).unwrap();
        assert_eq!(loaded.to_description(), scene.to_description());
    }

    #[test]
    fn test_baked_transforms_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        let mut scene = MemoryScene::new();
        let mesh = scene.add_selected_mesh("rocks", vec![vec![0, 1, 2], vec![5, 6, 7]]);
        let polygons = scene.polygons(mesh).unwrap();
        let container = scene.create_container("temp").unwrap();
        scene.move_polygons(mesh, container, &polygons[1..]).unwrap();
        scene.recenter_pivot(container, PivotAnchor::Bottom).unwrap();
        scene.set_rotation(container, DVec3::new(0.0, 90.0, 0.0)).unwrap();
        scene.move_polygons(container, mesh, &polygons[1..]).unwrap();

        let description = scene.to_description();
        assert_eq!(description.items[0].baked.len(), 1);
        assert_eq!(description.items[0].baked[0].polygon, 1);

        scene.save(&path).unwrap();
        let loaded = MemoryScene::load(&path).unwrap();
        assert_eq!(loaded.to_description(), description);

        let item = loaded.selected_meshes().unwrap()[0];
        let moved = loaded.polygons(item).unwrap()[1];
        assert_eq!(
            loaded.baked_transforms(moved),
            scene.baked_transforms(polygons[1])
        );
    }

    #[test]
    fn test_baked_record_must_name_a_polygon() {
        let text = r#"
[[items]]
name = "rocks"
polygons = [[0, 1, 2]]

[[items.baked]]
polygon = 3
scale = [1.0, 1.0, 1.0]
rotation = [0.0, 0.0, 0.0]
"#;
        let description: SceneDescription = toml::from_str(text).unwrap();
        match MemoryScene::from_description(&description) {
            Err(SceneError::UnknownPolygon { item, polygon }) => {
                assert_eq!(item, "rocks");
                assert_eq!(polygon, 3);
            }
            other => panic!("expected UnknownPolygon, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_scene_reports_scene_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        std::fs::write(&path, "[[items]]\npolygons = 3\n").unwrap();

        let err = MemoryScene::load(&path).unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse scene"));
    }
}
