//! Rotating hero title.
//!
//! [`Typewriter`] is a pure state machine: each [`Typewriter::tick`] advances
//! one step and returns the text to display plus how long to wait before the
//! next tick. [`spawn`] drives it on a tokio task; dropping the returned
//! [`TypewriterHandle`] cancels the timer.
//!
//! The generated page runs the same loop in the browser from the titles and
//! delays rendered into `data-*` attributes on the hero.

use crate::config::TypewriterConfig;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TypewriterError {
    #[error("typewriter needs at least one title")]
    NoTitles,
    #[error("delays must satisfy delete < type < pause (got {delete:?}, {typing:?}, {pause:?})")]
    DelayOrder {
        delete: Duration,
        typing: Duration,
        pause: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub typing: Duration,
    pub deleting: Duration,
    /// Wait after a title is fully typed, before deleting starts.
    pub pause: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(100),
            deleting: Duration::from_millis(50),
            pause: Duration::from_millis(2000),
        }
    }
}

impl From<&TypewriterConfig> for Delays {
    fn from(config: &TypewriterConfig) -> Self {
        Self {
            typing: Duration::from_millis(config.type_delay_ms),
            deleting: Duration::from_millis(config.delete_delay_ms),
            pause: Duration::from_millis(config.pause_ms),
        }
    }
}

impl Delays {
    pub fn check(&self) -> Result<(), TypewriterError> {
        if self.deleting < self.typing && self.typing < self.pause {
            Ok(())
        } else {
            Err(TypewriterError::DelayOrder {
                delete: self.deleting,
                typing: self.typing,
                pause: self.pause,
            })
        }
    }
}

/// One rendered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    titles: Vec<Vec<char>>,
    delays: Delays,
    index: usize,
    shown: usize,
    deleting: bool,
}

impl Typewriter {
    pub fn new<S: AsRef<str>>(titles: &[S], delays: Delays) -> Result<Self, TypewriterError> {
        if titles.is_empty() {
            return Err(TypewriterError::NoTitles);
        }
        delays.check()?;
        Ok(Self {
            titles: titles.iter().map(|t| t.as_ref().chars().collect()).collect(),
            delays,
            index: 0,
            shown: 0,
            deleting: false,
        })
    }

    pub fn from_config(config: &TypewriterConfig) -> Result<Self, TypewriterError> {
        Self::new(&config.titles, Delays::from(config))
    }

    /// Index of the title currently being typed or deleted.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn text(&self) -> String {
        self.titles[self.index][..self.shown].iter().collect()
    }

    pub fn tick(&mut self) -> Frame {
        let len = self.titles[self.index].len();
        let delay = if !self.deleting {
            if self.shown < len {
                self.shown += 1;
                self.delays.typing
            } else {
                self.deleting = true;
                self.delays.pause
            }
        } else if self.shown > 0 {
            self.shown -= 1;
            self.delays.deleting
        } else {
            self.deleting = false;
            self.index = (self.index + 1) % self.titles.len();
            self.delays.typing
        };
        Frame {
            text: self.text(),
            delay,
        }
    }
}

impl Iterator for Typewriter {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        Some(self.tick())
    }
}

/// Cancels the timer task when dropped.
#[derive(Debug)]
pub struct TypewriterHandle {
    task: JoinHandle<()>,
}

impl TypewriterHandle {
    pub fn cancel(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TypewriterHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `typewriter` on the current tokio runtime, calling `on_frame` with the
/// text of each frame. Runs until the handle is dropped.
pub fn spawn<F>(mut typewriter: Typewriter, mut on_frame: F) -> TypewriterHandle
where
    F: FnMut(&str) + Send + 'static,
{
    let task = tokio::spawn(async move {
        loop {
            let frame = typewriter.tick();
            on_frame(&frame.text);
            tokio::time::sleep(frame.delay).await;
        }
    });
    TypewriterHandle { task }
}
