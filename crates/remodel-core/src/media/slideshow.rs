//! Audio-synchronized slideshow over the step visuals.
//!
//! The image on screen is a pure function of playback time:
//! `min(floor(t / duration * count), count - 1)`. Playback starts with the
//! audio, freezes on the final image once the audio ends or is stopped, and
//! releases the audio output on close or drop.

use std::{fmt, time::Duration};

use log::debug;
use tokio::time::Instant;

use crate::{
    error::{RemodelError, Result},
    models::{AudioClip, Image},
};

/// Index of the image shown `elapsed` into a clip of `duration`.
///
/// ```rust
/// use std::time::Duration;
/// use remodel_core::media::slideshow::displayed_index;
///
/// let index = displayed_index(Duration::from_secs(5), Duration::from_secs(8), 4);
/// assert_eq!(index, Some(2));
/// ```
pub fn displayed_index(elapsed: Duration, duration: Duration, image_count: usize) -> Option<usize> {
    if image_count == 0 {
        return None;
    }
    let last = image_count - 1;
    if duration.is_zero() {
        return Some(last);
    }
    let fraction = elapsed.as_secs_f64() / duration.as_secs_f64();
    let index = (fraction * image_count as f64).floor();
    if index < 0.0 {
        return Some(0);
    }
    Some((index as usize).min(last))
}

/// Sink that actually makes the narration audible.
pub trait AudioOutput: Send {
    fn play(&mut self, clip: &AudioClip) -> Result<()>;

    /// Stops playback and releases the device. Must be idempotent.
    fn stop(&mut self);
}

/// Output for headless runs.
#[derive(Debug, Default)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn play(&mut self, _clip: &AudioClip) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Ready,
    Playing { started: Instant },
    /// Audio ended or was stopped; frozen on the final image
    Finished,
}

pub struct Slideshow {
    images: Vec<Image>,
    clip: AudioClip,
    output: Box<dyn AudioOutput>,
    state: PlaybackState,
    released: bool,
}

impl Slideshow {
    pub fn new(images: Vec<Image>, clip: AudioClip, output: Box<dyn AudioOutput>) -> Result<Self> {
        if images.is_empty() {
            return Err(RemodelError::invalid_input("images")
                .with_reason("a slideshow needs at least one step visual"));
        }
        Ok(Self {
            images,
            clip,
            output,
            state: PlaybackState::Ready,
            released: false,
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.clip.duration()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Time each image stays on screen.
    pub fn frame_interval(&self) -> Duration {
        self.duration() / self.images.len() as u32
    }

    /// Starts the audio and the clock together. Restarts from the top when
    /// called again.
    pub fn play(&mut self) -> Result<()> {
        self.output.play(&self.clip)?;
        self.released = false;
        self.state = PlaybackState::Playing {
            started: Instant::now(),
        };
        debug!(
            "Slideshow playing {} images over {:?}",
            self.images.len(),
            self.duration()
        );
        Ok(())
    }

    /// Playback position, capped at the clip length.
    pub fn elapsed(&mut self) -> Duration {
        self.refresh();
        match self.state {
            PlaybackState::Ready => Duration::ZERO,
            PlaybackState::Playing { started } => started.elapsed(),
            PlaybackState::Finished => self.duration(),
        }
    }

    pub fn current_index(&mut self) -> usize {
        self.refresh();
        match self.state {
            PlaybackState::Ready => 0,
            PlaybackState::Finished => self.images.len() - 1,
            PlaybackState::Playing { started } => {
                displayed_index(started.elapsed(), self.duration(), self.images.len())
                    .unwrap_or(0)
            }
        }
    }

    pub fn current_image(&mut self) -> &Image {
        let index = self.current_index();
        &self.images[index]
    }

    pub fn is_finished(&mut self) -> bool {
        self.refresh();
        self.state == PlaybackState::Finished
    }

    /// Stops the audio and freezes on the final image.
    pub fn stop(&mut self) {
        self.release();
        self.state = PlaybackState::Finished;
    }

    /// Closes the view, releasing the audio output.
    pub fn close(mut self) {
        self.release();
    }

    fn refresh(&mut self) {
        if let PlaybackState::Playing { started } = self.state {
            if started.elapsed() >= self.duration() {
                self.stop();
            }
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.output.stop();
            self.released = true;
        }
    }
}

// The audio output is a trait object; show the playback state instead.
impl fmt::Debug for Slideshow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slideshow")
            .field("images", &self.images.len())
            .field("clip", &self.clip)
            .field("state", &self.state)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for Slideshow {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct CountingOutput {
        plays: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl AudioOutput for CountingOutput {
        fn play(&mut self, _clip: &AudioClip) -> Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn images(count: usize) -> Vec<Image> {
        (0..count)
            .map(|i| Image::from_base64("image/png", &format!("img{i}")))
            .collect()
    }

    /// Eight seconds of 24 kHz audio.
    fn eight_seconds() -> AudioClip {
        AudioClip::new(vec![0; 8 * 24_000], 24_000)
    }

    #[test]
    fn test_displayed_index_formula() {
        let duration = Duration::from_secs(8);
        assert_eq!(displayed_index(Duration::ZERO, duration, 4), Some(0));
        assert_eq!(displayed_index(Duration::from_secs(5), duration, 4), Some(2));
        assert_eq!(displayed_index(Duration::from_millis(7999), duration, 4), Some(3));
        assert_eq!(displayed_index(Duration::from_secs(20), duration, 4), Some(3));
        assert_eq!(displayed_index(Duration::from_secs(1), duration, 0), None);
        assert_eq!(displayed_index(Duration::from_secs(1), Duration::ZERO, 3), Some(2));
    }

    #[test]
    fn test_rejects_empty_image_list() {
        assert!(Slideshow::new(vec![], eight_seconds(), Box::new(SilentOutput)).is_err());
    }

    #[test]
    fn test_debug_summarizes_playback() {
        let show = Slideshow::new(images(4), eight_seconds(), Box::new(SilentOutput)).unwrap();
        let debug = format!("{show:?}");
        assert!(debug.contains("images: 4"));
        assert!(debug.contains("state: Ready"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_follows_audio_clock() {
        let output = CountingOutput::default();
        let mut show = Slideshow::new(images(4), eight_seconds(), Box::new(output.clone())).unwrap();
        assert_eq!(show.frame_interval(), Duration::from_secs(2));
        assert_eq!(show.current_index(), 0);

        show.play().unwrap();
        assert_eq!(output.plays.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(show.current_index(), 2);
        assert!(!show.is_finished());

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(show.is_finished());
        assert_eq!(show.current_index(), 3);
        assert_eq!(show.elapsed(), Duration::from_secs(8));
        assert_eq!(output.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_on_final_image() {
        let output = CountingOutput::default();
        let mut show = Slideshow::new(images(4), eight_seconds(), Box::new(output.clone())).unwrap();
        show.play().unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        show.stop();
        assert_eq!(show.current_index(), 3);
        assert_eq!(output.stops.load(Ordering::SeqCst), 1);

        show.close();
        assert_eq!(output.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_output() {
        let output = CountingOutput::default();
        {
            let mut show =
                Slideshow::new(images(2), eight_seconds(), Box::new(output.clone())).unwrap();
            show.play().unwrap();
        }
        assert_eq!(output.stops.load(Ordering::SeqCst), 1);
    }
}
