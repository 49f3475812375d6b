//! Reel sets and the reels component
//!
//! A reel set is a list of circular strips. The reels component picks a reel
//! set, draws one stop per strip and appends the visible window as a new
//! scene. An optional multiplier table fills a matching other-scene.

use serde::{Deserialize, Serialize};

use crate::component::{Component, StepContext};
use crate::error::{EngineError, EngineResult};
use crate::grid::{OtherScene, Scene, SymbolCode};
use crate::random::RandomSource;
use crate::weights::WeightTable;

/// Circular reel strips
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelSet {
    reels: Vec<Vec<SymbolCode>>,
}

impl ReelSet {
    pub fn new(reels: Vec<Vec<SymbolCode>>) -> Self {
        Self { reels }
    }

    pub fn reels(&self) -> &[Vec<SymbolCode>] {
        &self.reels
    }

    pub fn width(&self) -> usize {
        self.reels.len()
    }

    /// Visible window of `height` rows starting at each stop
    pub fn window(&self, stops: &[usize], height: usize) -> Scene {
        let columns = self
            .reels
            .iter()
            .zip(stops)
            .map(|(strip, &stop)| {
                (0..height)
                    .map(|i| strip.get((stop + i) % strip.len().max(1)).copied().unwrap_or_default())
                    .collect()
            })
            .collect();
        Scene::from_columns(columns).unwrap_or_else(|| Scene::new(0, 0))
    }

    /// Draw one stop per reel
    pub fn spin(&self, height: usize, src: &mut dyn RandomSource) -> EngineResult<Scene> {
        let mut stops = Vec::with_capacity(self.reels.len());
        for strip in &self.reels {
            stops.push(src.draw(strip.len() as u64)? as usize);
        }
        log::trace!("stops {:?}", stops);
        Ok(self.window(&stops, height))
    }
}

/// Reels component configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReelsNode {
    /// Reel set names; a single entry is used without a draw
    pub reel_sets: WeightTable<String>,
    pub height: usize,
    /// Per-cell multiplier values for the other-scene
    pub multipliers: Option<WeightTable<i32>>,
}

impl ReelsNode {
    pub fn new(reel_set: impl Into<String>, height: usize) -> Self {
        Self {
            reel_sets: WeightTable::single(reel_set.into()),
            height,
            multipliers: None,
        }
    }

    pub(crate) fn step(&self, component: &Component, ctx: &mut StepContext<'_, '_>) -> EngineResult<()> {
        let game = ctx.state.game();
        let (name, selected) = self.reel_sets.draw(ctx.src)?;
        let reel_set = game
            .reel_sets
            .get(&name)
            .ok_or_else(|| EngineError::UnknownReelSet(name.clone()))?;

        let scene = reel_set.spin(self.height, ctx.src)?.with_reel_set(name);
        log::debug!("{}: new scene\n{}", component.name, scene);

        let other = match &self.multipliers {
            Some(table) => {
                let mut other = OtherScene::new(scene.width(), scene.height());
                for x in 0..scene.width() {
                    for y in 0..scene.height() {
                        let (v, _) = table.draw(ctx.src)?;
                        other.set(x, y, v);
                    }
                }
                Some(other)
            }
            None => None,
        };

        let play = ctx.state.play_mut();
        let scene_index = play.add_scene(scene);
        let other_index = other.map(|o| play.add_other_scene(o));

        let data = ctx.state.data_mut(component.handle)?;
        data.used_scenes.push(scene_index);
        data.used_other_scenes.extend(other_index);
        data.selected_index = selected as i32;
        Ok(())
    }
}
