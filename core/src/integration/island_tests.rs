//! Island mode: conservation and independence

use glam::DVec3;

use crate::config::{PivotAnchor, Range, TransformConfig};
use crate::error::HostError;
use crate::host::{Channels, ItemId, PolygonId, SceneHost, Severity};
use crate::islands::{ISLAND_CONTAINER_NAME, RESULT_CONTAINER_NAME};
use crate::memory::{HostOp, MemoryScene};
use crate::runner::{ItemOutcome, run};

use super::test_utils::*;

fn island_config() -> TransformConfig {
    TransformConfig {
        polygon_islands: true,
        seed: Some(31337),
        ..TransformConfig::default()
    }
}

/// Every polygon returns to the target and island membership is unchanged
#[test]
fn test_conservation_across_shapes() {
    for (count, size) in [(1, 1), (1, 12), (4, 3), (9, 1), (16, 5)] {
        let (mut scene, item) = scene_with_fans(count, size);
        let islands_before = scene.island_sets(item);
        let mut polygons_before = scene.polygons(item).unwrap();
        polygons_before.sort();

        let report = run(&mut scene, &island_config()).unwrap();

        let mut polygons_after = scene.polygons(item).unwrap();
        polygons_after.sort();
        assert_eq!(polygons_after, polygons_before, "fans {count}x{size}");
        assert_eq!(scene.island_sets(item), islands_before, "fans {count}x{size}");
        assert_eq!(report.units(), count as usize);
    }
}

#[test]
fn test_multiple_targets_keep_their_own_polygons() {
    let mut scene = MemoryScene::new();
    let a = scene.add_selected_mesh("a", fans(3, 2));
    let b = scene.add_selected_mesh("b", fans(2, 4));
    let a_before = scene.island_sets(a);
    let b_before = scene.island_sets(b);

    let report = run(&mut scene, &island_config()).unwrap();

    assert_eq!(scene.island_sets(a), a_before);
    assert_eq!(scene.island_sets(b), b_before);
    assert_eq!(report.units(), 5);
    assert_eq!(scene.item_ids(), vec![a, b]);
}

/// Each island's polygons share one baked transform, distinct from the others
#[test]
fn test_islands_sampled_independently() {
    let (mut scene, _item) = scene_with_fans(6, 2);
    let mut config = island_config();
    config.scale.x = Range::new(0.1, 10.0);
    config.rotation.z = Range::new(-180.0, 180.0);

    let report = run(&mut scene, &config).unwrap();
    let ItemOutcome::Islands(islands) = &report.items[0] else {
        panic!("expected island outcome");
    };

    let mut seen_scales = Vec::new();
    for outcome in &islands.islands {
        let first = scene.baked_transforms(outcome.polygons[0])[0];
        for polygon in &outcome.polygons {
            assert_eq!(scene.baked_transforms(*polygon), &[first]);
        }
        assert_eq!(Some(first.channels.scale), outcome.sample.scale);
        seen_scales.push(first.channels.scale.x);
    }
    seen_scales.sort_by(f64::total_cmp);
    seen_scales.dedup();
    assert_eq!(seen_scales.len(), 6);
}

#[test]
fn test_every_island_pivoted_at_anchor() {
    for anchor in PivotAnchor::ALL {
        let (mut scene, _item) = scene_with_fans(3, 1);
        let mut config = island_config();
        config.pivot_position = anchor.name().to_string();

        run(&mut scene, &config).unwrap();

        let pivots: Vec<PivotAnchor> = scene
            .ops()
            .iter()
            .filter_map(|op| match op {
                HostOp::RecenterPivot { anchor, .. } => Some(*anchor),
                _ => None,
            })
            .collect();
        assert_eq!(pivots, vec![anchor; 3]);
    }
}

/// One island is fully reintegrated before the next one is isolated
#[test]
fn test_islands_processed_one_at_a_time() {
    let (mut scene, _item) = scene_with_fans(3, 2);
    run(&mut scene, &island_config()).unwrap();

    let mut open_temps = 0i32;
    let mut temps = Vec::new();
    for op in scene.ops() {
        match op {
            HostOp::CreateContainer { item, name } if name == ISLAND_CONTAINER_NAME => {
                open_temps += 1;
                temps.push(*item);
                assert_eq!(open_temps, 1, "two temporary containers alive at once");
            }
            HostOp::DestroyContainer { item } if temps.contains(item) => open_temps -= 1,
            _ => {}
        }
    }
    assert_eq!(open_temps, 0);
    assert_eq!(temps.len(), 3);
}

#[test]
fn test_result_container_created_once_per_target() {
    let mut scene = MemoryScene::new();
    scene.add_selected_mesh("a", fans(2, 1));
    scene.add_selected_mesh("b", fans(2, 1));
    run(&mut scene, &island_config()).unwrap();

    let results = scene
        .ops()
        .iter()
        .filter(|op| matches!(op, HostOp::CreateContainer { name, .. } if name == RESULT_CONTAINER_NAME))
        .count();
    assert_eq!(results, 2);
}

#[test]
fn test_uniform_scale_per_island() {
    let (mut scene, _item) = scene_with_fans(4, 1);
    let mut config = island_config();
    config.uniform_scale = true;
    config.scale.uniform = Range::fixed(2.0);
    config.scale.x = Range::new(5.0, 9.0);

    let report = run(&mut scene, &config).unwrap();
    let ItemOutcome::Islands(islands) = &report.items[0] else {
        panic!("expected island outcome");
    };
    for outcome in &islands.islands {
        assert_eq!(outcome.sample.scale, Some(DVec3::splat(2.0)));
    }
}

#[test]
fn test_target_channels_untouched_in_island_mode() {
    let (mut scene, item) = scene_with_fans(3, 1);
    run(&mut scene, &island_config()).unwrap();
    assert_eq!(scene.channels(item).unwrap(), Channels::default());
}

/// Host whose connectivity query leaves the seed out of its own island
struct SeedlessHost(MemoryScene);

impl SceneHost for SeedlessHost {
    fn selected_meshes(&self) -> Result<Vec<ItemId>, HostError> {
        self.0.selected_meshes()
    }
    fn polygons(&self, item: ItemId) -> Result<Vec<PolygonId>, HostError> {
        self.0.polygons(item)
    }
    fn connect_island(&self, item: ItemId, seed: PolygonId) -> Result<Vec<PolygonId>, HostError> {
        let mut island = self.0.connect_island(item, seed)?;
        island.retain(|polygon| *polygon != seed);
        Ok(island)
    }
    fn create_container(&mut self, name: &str) -> Result<ItemId, HostError> {
        self.0.create_container(name)
    }
    fn destroy_container(&mut self, item: ItemId) -> Result<(), HostError> {
        self.0.destroy_container(item)
    }
    fn move_polygons(
        &mut self,
        from: ItemId,
        to: ItemId,
        polygons: &[PolygonId],
    ) -> Result<(), HostError> {
        self.0.move_polygons(from, to, polygons)
    }
    fn recenter_pivot(&mut self, item: ItemId, anchor: PivotAnchor) -> Result<(), HostError> {
        self.0.recenter_pivot(item, anchor)
    }
    fn set_scale(&mut self, item: ItemId, scale: DVec3) -> Result<(), HostError> {
        self.0.set_scale(item, scale)
    }
    fn set_rotation(&mut self, item: ItemId, rotation: DVec3) -> Result<(), HostError> {
        self.0.set_rotation(item, rotation)
    }
    fn channels(&self, item: ItemId) -> Result<Channels, HostError> {
        self.0.channels(item)
    }
    fn notify(&mut self, severity: Severity, title: &str, message: &str) {
        self.0.notify(severity, title, message)
    }
}

#[test]
fn test_seed_kept_when_host_omits_it() {
    let (scene, item) = scene_with_fans(3, 3);
    let before = scene.island_sets(item);
    let mut host = SeedlessHost(scene);

    let report = run(&mut host, &island_config()).unwrap();

    assert_eq!(report.units(), 3);
    assert_eq!(host.0.island_sets(item), before);
}
