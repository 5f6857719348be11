//! time.rs
//!
//! The two clocks the globe runs on.
//! Animation time starts at the first running frame and drives the spin,
//! wall-clock time drives the sun. They are independent on purpose, the sun
//! keeps its real-world pacing no matter how long loading took.

use bevy::prelude::*;
use chrono::{DateTime, Utc};

/// Seconds since the render loop started
#[derive(Resource, Debug, Default)]
pub struct AnimationClock {
    started_at: Option<f64>,
    elapsed: f32,
}

impl AnimationClock {
    // first tick pins the start, later ticks measure from it
    pub fn tick(&mut self, now_secs: f64) -> f32 {
        let start = *self.started_at.get_or_insert(now_secs);
        self.elapsed = (now_secs - start).max(0.0) as f32;
        self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Source of real-world time for the sun
#[derive(Resource, Debug, Clone, Copy, Default)]
pub enum WallClock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl WallClock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            WallClock::System => Utc::now(),
            WallClock::Fixed(time) => *time,
        }
    }
}

pub fn tick_animation_clock(mut clock: ResMut<AnimationClock>, time: Res<Time>) {
    clock.tick(time.elapsed_secs_f64());
}
