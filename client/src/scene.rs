//! Headless scene and audio: they keep track of what would be shown and
//! played, and log it.

use log::{debug, trace};
use shared::{AudioCue, AudioProvider, SceneEntity, SceneProvider};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct HeadlessScene {
    entities: HashSet<SceneEntity>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entity: SceneEntity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SceneProvider for HeadlessScene {
    fn add(&mut self, entity: SceneEntity) {
        if self.entities.insert(entity) {
            trace!("scene + {:?}", entity);
        }
    }

    fn remove(&mut self, entity: SceneEntity) {
        if self.entities.remove(&entity) {
            trace!("scene - {:?}", entity);
        }
    }
}

/// Counts cues instead of playing them.
#[derive(Debug, Default)]
pub struct LogAudio {
    played: u64,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioProvider for LogAudio {
    fn play(&mut self, cue: AudioCue) {
        self.played += 1;
        debug!("audio {:?}", cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ProjectileId;

    #[test]
    fn test_scene_add_remove() {
        let mut scene = HeadlessScene::new();
        scene.add(SceneEntity::Player(1));
        scene.add(SceneEntity::Projectile(ProjectileId(0)));
        scene.add(SceneEntity::Player(1));
        assert_eq!(scene.len(), 2);

        scene.remove(SceneEntity::Player(1));
        scene.remove(SceneEntity::Player(1));
        assert!(!scene.contains(SceneEntity::Player(1)));
        assert!(scene.contains(SceneEntity::Projectile(ProjectileId(0))));
    }

    #[test]
    fn test_audio_counts() {
        let mut audio = LogAudio::new();
        audio.play(AudioCue::Fire { owner: 1 });
        audio.play(AudioCue::Reload { owner: 1 });
        assert_eq!(audio.played(), 2);
    }
}
