//! Chunked corridor generation
//!
//! The corridor is cut into horizontal chunks of `chunk_height`. Chunk 0 is
//! centered on the player's start position; negative indices lie above it
//! (the player starts out moving up, screen space being y-down).
//!
//! `ChunkManager` keeps a sliding window of `chunks_to_load` chunks around
//! the player's current chunk. A chunk's obstacles are never stored beyond
//! its residency: they are regenerated from `base_seed + index` whenever the
//! chunk comes back into the window.
//!
//! Window changes are split in two steps so generation can run elsewhere:
//! [`ChunkManager::plan`] decides which chunks to add and drop,
//! [`ChunkLayout::generate`] builds the new chunks (pure, `Send`), and
//! [`ChunkManager::apply`] publishes the result, unless a restart happened in
//! between.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use super::sampler::BlueNoiseSampler;
use super::shape::Rectangle;
use crate::settings::GameConfig;

/// Chunk geometry and seeding, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLayout {
    chunk_height: u32,
    sample_width: f32,
    square_size: f32,
    boundary_width: f32,
    stroke_margin: f32,
    min_distance: f32,
    base_seed: i64,
    sampler: BlueNoiseSampler,
    /// World x of a chunk's left edge, centers the field on the viewport
    sample_origin_x: f32,
    /// World y of chunk 0's top edge
    chunk_start_y: f32,
}

impl ChunkLayout {
    /// Layout for a corridor whose chunk 0 is centered on `player_start_y`
    pub fn new(config: &GameConfig, player_start_y: f32) -> Self {
        Self {
            chunk_height: config.chunk_height.max(1),
            sample_width: config.sample_width,
            square_size: config.square_size,
            boundary_width: config.boundary_width,
            stroke_margin: config.stroke_margin,
            min_distance: config.min_distance,
            base_seed: config.base_seed,
            sampler: BlueNoiseSampler::new(config.cells_per_min_distance, config.max_cell_dist),
            sample_origin_x: -(config.sample_width - config.viewport_width as f32) / 2.0,
            chunk_start_y: player_start_y - (config.chunk_height / 2) as f32,
        }
    }

    #[inline]
    pub fn chunk_height(&self) -> u32 {
        self.chunk_height
    }

    #[inline]
    pub fn square_size(&self) -> f32 {
        self.square_size
    }

    pub fn canvas_width(&self) -> f32 {
        self.boundary_width * 2.0 + self.sample_width
    }

    /// Chunk containing a signed vertical travel distance from the start
    ///
    /// Offsetting by half a chunk toward the travel sign before the
    /// truncating division keeps chunk 0 centered on the start position.
    pub fn chunk_index_for(&self, travel: i64) -> i64 {
        let height = self.chunk_height as i64;
        let half = height / 2;
        if travel < 0 {
            (travel - half) / height
        } else {
            (travel + half) / height
        }
    }

    /// World position of a chunk's top-left corner
    pub fn chunk_offset(&self, index: i64) -> Vec2 {
        Vec2::new(
            self.sample_origin_x,
            index as f32 * self.chunk_height as f32 + self.chunk_start_y,
        )
    }

    pub fn seed_for(&self, index: i64) -> u64 {
        self.base_seed.wrapping_add(index) as u64
    }

    /// The two corridor walls in chunk-local coordinates, left then right
    pub fn walls(&self) -> [Rectangle; 2] {
        let height = self.chunk_height as f32;
        [
            Rectangle::new(0.0, 0.0, self.boundary_width, height),
            Rectangle::new(
                self.boundary_width + self.sample_width,
                0.0,
                self.boundary_width,
                height,
            ),
        ]
    }

    /// Region obstacle anchors are drawn from, chunk-local
    ///
    /// Top and bottom are pulled in by a quarter of the spacing so two
    /// neighbouring chunks meet without a visible seam; right and bottom also
    /// lose a square (plus stroke) so every square stays inside the chunk.
    pub fn sample_region(&self) -> Rectangle {
        let quarter = self.min_distance / 4.0;
        let inset = self.square_size + self.stroke_margin;
        Rectangle::new(
            self.boundary_width,
            quarter,
            self.sample_width - inset,
            self.chunk_height as f32 - quarter * 2.0 - inset,
        )
    }

    /// Obstacle anchors of one chunk, chunk-local
    pub fn sample_points(&self, index: i64) -> Vec<Vec2> {
        let region = self.sample_region();
        self.sampler.sample(
            region.width(),
            region.height(),
            self.min_distance,
            region.top_left(),
            self.seed_for(index),
        )
    }

    /// Build a chunk from scratch
    pub fn generate(&self, index: i64) -> Chunk {
        let points: Arc<[Vec2]> = self.sample_points(index).into();

        let mut rects = Vec::with_capacity(points.len() + 2);
        rects.extend(self.walls());
        rects.extend(points.iter().map(|&p| Rectangle::square(p, self.square_size)));

        log::debug!("Generated chunk {} ({} obstacles)", index, points.len());

        Chunk {
            index,
            points,
            surface: ChunkSurface {
                width: self.canvas_width(),
                height: self.chunk_height as f32,
                rects,
            },
            offset: self.chunk_offset(index),
        }
    }
}

/// Drawable layout of one chunk: filled rectangles in chunk-local space
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSurface {
    pub width: f32,
    pub height: f32,
    /// Walls first, then one square per obstacle
    pub rects: Vec<Rectangle>,
}

/// One generated chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: i64,
    /// Top-left corners of the obstacle squares, chunk-local
    pub points: Arc<[Vec2]>,
    pub surface: ChunkSurface,
    /// Where the chunk sits in world space
    pub offset: Vec2,
}

/// Obstacle anchors of the active chunk and the offset into world space
#[derive(Debug, Clone, PartialEq)]
pub struct ObstaclePointSet {
    pub points: Arc<[Vec2]>,
    pub offset: Vec2,
}

impl ObstaclePointSet {
    pub fn empty() -> Self {
        Self {
            points: Arc::from(Vec::new()),
            offset: Vec2::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Chunks to add and drop for one window move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    /// Restart generation this plan belongs to
    pub epoch: u64,
    pub current: i64,
    pub generate: Vec<i64>,
    pub evict: Vec<i64>,
}

/// Sliding window of resident chunks
#[derive(Debug)]
pub struct ChunkManager {
    layout: Arc<ChunkLayout>,
    chunks_to_load: usize,
    current_chunk: i64,
    last_chunk: Option<i64>,
    /// Published chunk list, replaced wholesale on every change
    chunks: Arc<[Chunk]>,
    /// Obstacle anchors by chunk index, resident chunks only
    point_cache: HashMap<i64, Arc<[Vec2]>>,
    epoch: u64,
}

impl ChunkManager {
    pub fn new(config: &GameConfig, player_start_y: f32) -> Self {
        Self {
            layout: Arc::new(ChunkLayout::new(config, player_start_y)),
            chunks_to_load: config.chunks_to_load(),
            current_chunk: 0,
            last_chunk: None,
            chunks: Arc::from(Vec::new()),
            point_cache: HashMap::new(),
            epoch: 0,
        }
    }

    pub fn layout(&self) -> &Arc<ChunkLayout> {
        &self.layout
    }

    #[inline]
    pub fn chunks_to_load(&self) -> usize {
        self.chunks_to_load
    }

    #[inline]
    pub fn current_chunk(&self) -> i64 {
        self.current_chunk
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Snapshot of the resident chunks
    pub fn chunks(&self) -> Arc<[Chunk]> {
        Arc::clone(&self.chunks)
    }

    /// Sorted indices of the resident chunks
    pub fn resident_indices(&self) -> Vec<i64> {
        let mut indices: Vec<i64> = self.chunks.iter().map(|c| c.index).collect();
        indices.sort_unstable();
        indices
    }

    /// Offset of the window's lowest index from its center chunk
    ///
    /// Even windows keep the extra chunk on the positive side.
    fn mid_index(&self) -> i64 {
        let n = self.chunks_to_load as i64;
        if n % 2 != 0 { n / 2 } else { n / 2 - 1 }
    }

    /// Window of chunk indices centered on `center`
    pub fn window_around(&self, center: i64) -> std::ops::RangeInclusive<i64> {
        let low = center - self.mid_index();
        low..=low + self.chunks_to_load as i64 - 1
    }

    /// Recompute the current chunk and, if it changed, decide what to load
    pub fn plan(&mut self, travel: i64) -> Option<WindowPlan> {
        self.current_chunk = self.layout.chunk_index_for(travel);
        if self.last_chunk == Some(self.current_chunk) {
            return None;
        }

        // last_chunk only advances in apply, so a dropped plan is planned again
        let movement = self.last_chunk.map(|last| self.current_chunk - last);
        log::info!(
            "Current chunk: {} (moved {:?})",
            self.current_chunk,
            movement
        );

        let target = self.window_around(self.current_chunk);
        let plan = if self.chunks.is_empty() {
            WindowPlan {
                epoch: self.epoch,
                current: self.current_chunk,
                generate: target.collect(),
                evict: Vec::new(),
            }
        } else {
            let resident = self.resident_indices();
            let mut generate: Vec<i64> = target
                .clone()
                .filter(|index| resident.binary_search(index).is_err())
                .collect();
            // Nearest chunk first in the direction of travel
            if movement.unwrap_or(0) < 0 {
                generate.reverse();
            }
            WindowPlan {
                epoch: self.epoch,
                current: self.current_chunk,
                generate,
                evict: resident
                    .into_iter()
                    .filter(|index| !target.contains(index))
                    .collect(),
            }
        };
        Some(plan)
    }

    /// Publish generated chunks for a plan
    ///
    /// Returns the new snapshot, or `None` if the plan predates a restart.
    /// Until a plan is applied, every [`plan`](Self::plan) call proposes it again.
    pub fn apply(&mut self, plan: WindowPlan, generated: Vec<Chunk>) -> Option<Arc<[Chunk]>> {
        if plan.epoch != self.epoch {
            log::warn!(
                "Discarding chunk plan from epoch {} (now {})",
                plan.epoch,
                self.epoch
            );
            return None;
        }

        for index in &plan.evict {
            self.point_cache.remove(index);
            log::debug!("Evicted chunk {}", index);
        }

        let mut next: Vec<Chunk> = self
            .chunks
            .iter()
            .filter(|c| !plan.evict.contains(&c.index))
            .cloned()
            .collect();
        for chunk in generated {
            self.point_cache.insert(chunk.index, Arc::clone(&chunk.points));
            next.push(chunk);
        }

        self.chunks = next.into();
        self.last_chunk = Some(plan.current);
        Some(self.chunks())
    }

    /// Plan, generate in place and publish
    pub fn update(&mut self, travel: i64) -> Option<Arc<[Chunk]>> {
        let plan = self.plan(travel)?;
        let generated = plan
            .generate
            .iter()
            .map(|&index| self.layout.generate(index))
            .collect();
        self.apply(plan, generated)
    }

    /// Obstacles of the active chunk in world placement
    ///
    /// Empty if the active chunk has not been generated yet.
    pub fn current_points(&self) -> ObstaclePointSet {
        match self.point_cache.get(&self.current_chunk) {
            Some(points) => ObstaclePointSet {
                points: Arc::clone(points),
                offset: self.layout.chunk_offset(self.current_chunk),
            },
            None => ObstaclePointSet::empty(),
        }
    }

    /// Drop every chunk and invalidate in-flight plans
    pub fn restart(&mut self) {
        self.chunks = Arc::from(Vec::new());
        self.point_cache.clear();
        self.current_chunk = 0;
        self.last_chunk = None;
        self.epoch += 1;
    }
}
