//! Playback controller use case

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use bytes::Bytes;
use uuid::Uuid;

use crate::domain::capture::CapturedArtifact;
use crate::domain::playback::{PlaybackState, TransientUrl};

use super::ports::{MediaElement, MediaSource, PlaybackError};

/// Registry of live transient references, the equivalent of the browser's
/// object URL table. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    live: Arc<Mutex<HashMap<TransientUrl, Bytes>>>,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a reference that resolves to `data` until revoked
    pub fn create(&self, data: Bytes) -> TransientUrl {
        let url = TransientUrl::mint();
        self.table().insert(url.clone(), data);
        url
    }

    pub fn resolve(&self, url: &TransientUrl) -> Option<Bytes> {
        self.table().get(url).cloned()
    }

    /// Revoke a reference. Returns whether it was live.
    pub fn revoke(&self, url: &TransientUrl) -> bool {
        self.table().remove(url).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<TransientUrl, Bytes>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct BoundArtifact {
    artifact_id: Uuid,
    url: TransientUrl,
}

/// Drives one media element for previewing captured artifacts.
///
/// Holds at most one live transient reference at a time.
pub struct PlaybackController<E: MediaElement> {
    element: E,
    urls: ObjectUrls,
    bound: Option<BoundArtifact>,
    state: PlaybackState,
}

impl<E: MediaElement> PlaybackController<E> {
    pub fn new(element: E, urls: ObjectUrls) -> Self {
        Self {
            element,
            urls,
            bound: None,
            state: PlaybackState::Stopped,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn bound_url(&self) -> Option<&TransientUrl> {
        self.bound.as_ref().map(|b| &b.url)
    }

    pub fn bound_artifact(&self) -> Option<Uuid> {
        self.bound.as_ref().map(|b| b.artifact_id)
    }

    /// Play an artifact.
    ///
    /// Resumes when this artifact is bound and paused, does nothing when it is
    /// already playing, and otherwise rebinds under a fresh reference.
    pub fn play(&mut self, artifact: &CapturedArtifact) -> Result<(), PlaybackError> {
        if self.bound_artifact() == Some(artifact.id()) {
            match self.state {
                PlaybackState::Playing => return Ok(()),
                PlaybackState::Paused => {
                    self.element.play()?;
                    self.state = PlaybackState::Playing;
                    tracing::debug!(artifact = %artifact.id(), "playback resumed");
                    return Ok(());
                }
                PlaybackState::Stopped => {}
            }
        }

        self.unbind();
        self.state = PlaybackState::Stopped;

        let url = self.urls.create(artifact.data().clone());
        let source = MediaSource {
            url: url.clone(),
            mime_type: artifact.mime_type(),
            data: artifact.data().clone(),
        };
        if let Err(e) = self.element.load(source) {
            self.urls.revoke(&url);
            tracing::warn!(artifact = %artifact.id(), "failed to load artifact: {}", e);
            return Err(e);
        }
        self.bound = Some(BoundArtifact {
            artifact_id: artifact.id(),
            url,
        });

        if let Err(e) = self.element.play() {
            self.unbind();
            tracing::warn!(artifact = %artifact.id(), "failed to start playback: {}", e);
            return Err(e);
        }
        self.state = PlaybackState::Playing;
        tracing::info!(
            artifact = %artifact.id(),
            mime_type = %artifact.mime_type(),
            bytes = artifact.size_bytes(),
            "playback started"
        );
        Ok(())
    }

    /// Pause, keeping the bound reference
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.element.pause();
            self.state = PlaybackState::Paused;
        }
    }

    /// Natural end of playback. Returns whether the state changed.
    pub fn on_ended(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Stopped;
        tracing::debug!("playback ended");
        true
    }

    /// Check the element for a natural end and apply it
    pub fn poll(&mut self) -> bool {
        self.state == PlaybackState::Playing && self.element.has_ended() && self.on_ended()
    }

    /// Poll until playback is no longer running
    pub async fn wait_until_ended(&mut self, poll_interval: StdDuration) {
        while self.state == PlaybackState::Playing && !self.poll() {
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Unload the element and revoke the bound reference
    pub fn dispose(&mut self) {
        self.unbind();
        self.state = PlaybackState::Stopped;
    }

    fn unbind(&mut self) {
        if let Some(bound) = self.bound.take() {
            self.element.unload();
            self.urls.revoke(&bound.url);
        }
    }
}

impl<E: MediaElement> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::MediaMimeType;

    #[derive(Default)]
    struct MockElement {
        loaded: Option<MediaSource>,
        loads: usize,
        plays: usize,
        pauses: usize,
        ended: bool,
        fail_load: bool,
        fail_play: bool,
    }

    impl MediaElement for MockElement {
        fn load(&mut self, source: MediaSource) -> Result<(), PlaybackError> {
            if self.fail_load {
                return Err(PlaybackError::Unsupported {
                    mime_type: source.mime_type.to_string(),
                    message: "cannot decode".into(),
                });
            }
            self.loads += 1;
            self.ended = false;
            self.loaded = Some(source);
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.plays += 1;
            if self.fail_play {
                return Err(PlaybackError::OutputUnavailable("no sink".into()));
            }
            Ok(())
        }

        fn pause(&mut self) {
            self.pauses += 1;
        }

        fn unload(&mut self) {
            self.loaded = None;
        }

        fn has_ended(&self) -> bool {
            self.ended
        }
    }

    fn artifact(data: &'static [u8]) -> CapturedArtifact {
        CapturedArtifact::new(Bytes::from_static(data), MediaMimeType::AudioWebm)
    }

    #[test]
    fn play_binds_fresh_reference() {
        let urls = ObjectUrls::new();
        let mut player = PlaybackController::new(MockElement::default(), urls.clone());
        let take = artifact(b"abc");

        player.play(&take).unwrap();
        assert!(player.is_playing());
        assert_eq!(urls.live_count(), 1);

        let url = player.bound_url().unwrap().clone();
        assert_eq!(urls.resolve(&url).unwrap().as_ref(), b"abc");
        assert_eq!(player.element().loaded.as_ref().unwrap().url, url);
    }

    #[test]
    fn play_twice_is_noop() {
        let mut player = PlaybackController::new(MockElement::default(), ObjectUrls::new());
        let take = artifact(b"abc");

        player.play(&take).unwrap();
        player.play(&take).unwrap();
        assert_eq!(player.element().loads, 1);
        assert_eq!(player.element().plays, 1);
    }

    #[test]
    fn play_after_pause_resumes_same_reference() {
        let urls = ObjectUrls::new();
        let mut player = PlaybackController::new(MockElement::default(), urls.clone());
        let take = artifact(b"abc");

        player.play(&take).unwrap();
        let url = player.bound_url().cloned();
        player.pause();
        assert_eq!(player.state(), PlaybackState::Paused);

        player.play(&take).unwrap();
        assert!(player.is_playing());
        assert_eq!(player.bound_url().cloned(), url);
        assert_eq!(player.element().loads, 1);
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn different_artifact_revokes_previous_reference() {
        let urls = ObjectUrls::new();
        let mut player = PlaybackController::new(MockElement::default(), urls.clone());
        let first = artifact(b"first");
        let second = artifact(b"second");

        player.play(&first).unwrap();
        let first_url = player.bound_url().unwrap().clone();
        player.play(&second).unwrap();

        assert!(urls.resolve(&first_url).is_none());
        assert_eq!(urls.live_count(), 1);
        assert_eq!(player.bound_artifact(), Some(second.id()));
    }

    #[test]
    fn ended_flips_state_exactly_once() {
        let mut player = PlaybackController::new(MockElement::default(), ObjectUrls::new());
        player.play(&artifact(b"abc")).unwrap();

        assert!(player.on_ended());
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(!player.on_ended());
        assert!(!player.on_ended());
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn finished_artifact_replays_under_new_reference() {
        let urls = ObjectUrls::new();
        let mut player = PlaybackController::new(MockElement::default(), urls.clone());
        let take = artifact(b"abc");

        player.play(&take).unwrap();
        let old = player.bound_url().unwrap().clone();
        player.on_ended();
        player.play(&take).unwrap();

        assert_ne!(player.bound_url().unwrap(), &old);
        assert_eq!(urls.live_count(), 1);
        assert!(player.is_playing());
    }

    #[test]
    fn poll_detects_natural_end() {
        let mut player = PlaybackController::new(MockElement::default(), ObjectUrls::new());
        player.play(&artifact(b"abc")).unwrap();
        assert!(!player.poll());

        player.element.ended = true;
        assert!(player.poll());
        assert!(!player.poll());
    }

    #[test]
    fn load_failure_leaves_no_reference() {
        let urls = ObjectUrls::new();
        let element = MockElement {
            fail_load: true,
            ..Default::default()
        };
        let mut player = PlaybackController::new(element, urls.clone());

        let err = player.play(&artifact(b"abc")).unwrap_err();
        assert!(matches!(err, PlaybackError::Unsupported { .. }));
        assert_eq!(urls.live_count(), 0);
        assert!(!player.is_playing());
    }

    #[test]
    fn failed_start_on_new_artifact_does_not_resume_it_later() {
        let urls = ObjectUrls::new();
        let mut player = PlaybackController::new(MockElement::default(), urls.clone());
        let first = artifact(b"first");
        let second = artifact(b"second");

        player.play(&first).unwrap();
        player.pause();
        assert_eq!(player.state(), PlaybackState::Paused);

        player.element.fail_play = true;
        assert!(player.play(&second).is_err());
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(player.bound_url().is_none());
        assert_eq!(urls.live_count(), 0);

        // The retry loads the artifact again rather than resuming
        player.element.fail_play = false;
        player.play(&second).unwrap();
        assert!(player.is_playing());
        assert_eq!(player.bound_artifact(), Some(second.id()));
        assert_eq!(player.element().loads, 3);
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn dispose_and_drop_revoke_reference() {
        let urls = ObjectUrls::new();
        let mut player = PlaybackController::new(MockElement::default(), urls.clone());
        player.play(&artifact(b"abc")).unwrap();

        player.dispose();
        assert_eq!(urls.live_count(), 0);
        assert!(player.element().loaded.is_none());

        player.play(&artifact(b"def")).unwrap();
        drop(player);
        assert_eq!(urls.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_until_ended_returns_when_stopped() {
        let mut player = PlaybackController::new(MockElement::default(), ObjectUrls::new());
        player.play(&artifact(b"abc")).unwrap();
        player.element.ended = true;

        player.wait_until_ended(StdDuration::from_millis(50)).await;
        assert_eq!(player.state(), PlaybackState::Stopped);
    }
}
