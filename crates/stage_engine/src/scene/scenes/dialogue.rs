//! Dialogue scene - reveals a scripted conversation line by line
//!
//! The script is obtained outside the frame loop (file, network, ...) and
//! handed over through a [`ContentSlot`]. The scene's ticker only ever
//! looks at the slot, so a slow or failing source never stalls a frame.
//!
//! ```text
//! Loading ──Ready──► Revealing ──last line──► Finished
//!    │
//!    └──Failed──► Unavailable (fallback sprite, terminal)
//! ```

use crate::core::config::DialogueConfig;
use crate::foundation::collections::SpriteHandle;
use crate::foundation::math::{Vec2, Viewport};
use crate::render::Stage;
use crate::scene::{Scene, SceneContext, SceneKind};
use crate::scheduler::TickError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Failure to obtain a dialogue script
#[derive(Error, Debug)]
pub enum ContentError {
    /// Reading the source failed
    #[error("failed to read dialogue: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not a valid script
    #[error("failed to parse dialogue: {0}")]
    Parse(#[from] serde_json::Error),

    /// The script has no lines
    #[error("dialogue script has no lines")]
    Empty,

    /// The source reported it has nothing to offer
    #[error("dialogue unavailable: {0}")]
    Unavailable(String),
}

/// Which side of the view a speaker's bubbles appear on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarSide {
    /// Left column
    #[default]
    Left,
    /// Right column
    Right,
}

/// One spoken line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Speaker name
    pub name: String,
    /// Spoken text
    pub text: String,
}

/// A speaker and the side they talk from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    /// Speaker name, matched against [`DialogueLine::name`]
    pub name: String,
    /// Side of the view
    #[serde(default)]
    pub position: AvatarSide,
}

/// A full conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueScript {
    /// Lines in speaking order
    pub dialogue: Vec<DialogueLine>,
    /// Known speakers
    #[serde(default)]
    pub avatars: Vec<Avatar>,
}

impl DialogueScript {
    /// Parse a script from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let script: Self = serde_json::from_str(json)?;
        if script.dialogue.is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(script)
    }

    /// Read and parse a JSON script file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Side `name` speaks from; unknown speakers default to the left
    pub fn side_of(&self, name: &str) -> AvatarSide {
        self.avatars
            .iter()
            .find(|a| a.name == name)
            .map_or(AvatarSide::Left, |a| a.position)
    }
}

/// What a [`ContentSlot`] currently holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentState {
    /// Nothing delivered yet
    #[default]
    Pending,
    /// Script delivered
    Ready(Rc<DialogueScript>),
    /// Delivery failed with this reason
    Failed(String),
}

/// Single-assignment mailbox between a content source and a scene
#[derive(Debug, Clone, Default)]
pub struct ContentSlot(Rc<RefCell<ContentState>>);

impl ContentSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle the slot with a script or a failure
    ///
    /// Only the first delivery counts; later ones are ignored and return
    /// `false`.
    pub fn deliver(&self, result: Result<DialogueScript, ContentError>) -> bool {
        let mut state = self.0.borrow_mut();
        if *state != ContentState::Pending {
            log::warn!("[DIALOGUE] Dialogue content delivered twice, ignoring");
            return false;
        }
        *state = match result {
            Ok(script) => ContentState::Ready(Rc::new(script)),
            Err(e) => ContentState::Failed(e.to_string()),
        };
        true
    }

    /// Snapshot of the slot
    pub fn state(&self) -> ContentState {
        self.0.borrow().clone()
    }

    /// Whether nothing has been delivered yet
    pub fn is_pending(&self) -> bool {
        *self.0.borrow() == ContentState::Pending
    }
}

/// Progress of the dialogue view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialoguePhase {
    /// Waiting for content; a spinner turns
    Loading,
    /// Lines appear one per interval
    Revealing,
    /// Every line is shown
    Finished,
    /// Content could not be obtained; the fallback sprite is shown
    Unavailable,
}

struct Bubble {
    sprite: SpriteHandle,
    side: AvatarSide,
}

struct DialogueView {
    config: DialogueConfig,
    viewport: Viewport,
    phase: DialoguePhase,
    visible: bool,
    spinner: SpriteHandle,
    fallback: Option<SpriteHandle>,
    script: Option<Rc<DialogueScript>>,
    bubbles: Vec<Bubble>,
    reveal_timer: f32,
    /// How far the content has scrolled up, world units
    scroll: f32,
}

impl DialogueView {
    fn update(&mut self, slot: &ContentSlot, stage: &mut Stage, delta: f32) {
        match self.phase {
            DialoguePhase::Loading => {
                let spin = self.config.spinner_speed * delta;
                stage.update(self.spinner, |s| s.set_rotation(s.rotation() + spin));
                match slot.state() {
                    ContentState::Pending => {}
                    ContentState::Ready(script) => self.begin_reveal(script, stage),
                    ContentState::Failed(reason) => self.fail(&reason, stage),
                }
            }
            DialoguePhase::Revealing => {
                self.reveal_timer += delta;
                if self.reveal_timer >= self.config.line_interval {
                    self.reveal_timer = 0.0;
                    self.reveal_next(stage);
                }
            }
            DialoguePhase::Finished | DialoguePhase::Unavailable => {}
        }

        if !self.bubbles.is_empty() {
            let target = self.target_scroll();
            let ease = 1.0 - (-self.config.scroll_rate * delta).exp();
            self.scroll += (target - self.scroll) * ease;
            self.layout(stage);
        }
    }

    fn begin_reveal(&mut self, script: Rc<DialogueScript>, stage: &mut Stage) {
        log::info!("[DIALOGUE] Dialogue ready: {} line(s)", script.dialogue.len());
        stage.update(self.spinner, |s| s.set_visible(false));
        self.script = Some(script);
        self.phase = DialoguePhase::Revealing;
        // First line shows on the next frame
        self.reveal_timer = self.config.line_interval;
    }

    fn fail(&mut self, reason: &str, stage: &mut Stage) {
        log::warn!("[DIALOGUE] Dialogue unavailable: {}", reason);
        stage.update(self.spinner, |s| s.set_visible(false));
        let fallback = stage.create_sprite(&self.config.fallback_texture);
        let center = self.viewport.center();
        let visible = self.visible;
        stage.update(fallback, |s| {
            s.set_position(center);
            s.set_visible(visible);
        });
        self.fallback = Some(fallback);
        self.phase = DialoguePhase::Unavailable;
    }

    fn reveal_next(&mut self, stage: &mut Stage) {
        let Some(script) = &self.script else {
            return;
        };
        let Some(line) = script.dialogue.get(self.bubbles.len()) else {
            self.phase = DialoguePhase::Finished;
            return;
        };
        let side = script.side_of(&line.name);
        log::debug!("[DIALOGUE] {}: {}", line.name, line.text);

        let sprite = stage.create_sprite(&self.config.bubble_texture);
        let visible = self.visible;
        stage.update(sprite, |s| s.set_visible(visible));
        self.bubbles.push(Bubble { sprite, side });

        if self.bubbles.len() == script.dialogue.len() {
            self.phase = DialoguePhase::Finished;
        }
    }

    /// Scroll that keeps the newest line in view
    fn target_scroll(&self) -> f32 {
        let content = self.config.margin * 2.0 + self.bubbles.len() as f32 * self.config.line_height;
        (content - self.viewport.height).max(0.0)
    }

    fn bubble_position(&self, index: usize, side: AvatarSide) -> Vec2 {
        let column = match side {
            AvatarSide::Left => self.config.left_x,
            AvatarSide::Right => self.config.right_x,
        };
        let y = self.config.margin + (index as f32 + 0.5) * self.config.line_height - self.scroll;
        Vec2::new(self.viewport.width * column, y)
    }

    fn layout(&self, stage: &mut Stage) {
        for (index, bubble) in self.bubbles.iter().enumerate() {
            let position = self.bubble_position(index, bubble.side);
            stage.update(bubble.sprite, |s| s.set_position(position));
        }
        let center = self.viewport.center();
        stage.update(self.spinner, |s| s.set_position(center));
        if let Some(fallback) = self.fallback {
            stage.update(fallback, |s| s.set_position(center));
        }
    }

    fn set_visible(&mut self, stage: &mut Stage, visible: bool) {
        self.visible = visible;
        let loading = self.phase == DialoguePhase::Loading;
        stage.update(self.spinner, |s| s.set_visible(visible && loading));
        for bubble in &self.bubbles {
            stage.update(bubble.sprite, |s| s.set_visible(visible));
        }
        if let Some(fallback) = self.fallback {
            stage.update(fallback, |s| s.set_visible(visible));
        }
    }

    fn destroy(&mut self, stage: &mut Stage) {
        stage.destroy_sprite(self.spinner);
        if let Some(fallback) = self.fallback.take() {
            stage.destroy_sprite(fallback);
        }
        for bubble in self.bubbles.drain(..) {
            stage.destroy_sprite(bubble.sprite);
        }
    }
}

/// Scrolling conversation fed from a [`ContentSlot`]
pub struct DialogueScene {
    slot: ContentSlot,
    view: Rc<RefCell<DialogueView>>,
}

impl DialogueScene {
    /// Create the scene in its loading state
    pub fn new(ctx: &mut SceneContext<'_>) -> Self {
        let config = ctx.config.dialogue.clone();
        let spinner = ctx.stage.create_sprite(&config.loading_texture);
        let view = DialogueView {
            config,
            viewport: ctx.viewport,
            phase: DialoguePhase::Loading,
            visible: false,
            spinner,
            fallback: None,
            script: None,
            bubbles: Vec::new(),
            reveal_timer: 0.0,
            scroll: 0.0,
        };
        view.layout(ctx.stage);
        Self {
            slot: ContentSlot::new(),
            view: Rc::new(RefCell::new(view)),
        }
    }

    /// Where the script is delivered
    pub fn slot(&self) -> &ContentSlot {
        &self.slot
    }

    /// Current phase
    pub fn phase(&self) -> DialoguePhase {
        self.view.borrow().phase
    }

    /// Lines revealed so far
    pub fn revealed_lines(&self) -> usize {
        self.view.borrow().bubbles.len()
    }

    /// Current scroll offset
    pub fn scroll_offset(&self) -> f32 {
        self.view.borrow().scroll
    }

    /// Fallback sprite, once content has failed
    pub fn fallback_sprite(&self) -> Option<SpriteHandle> {
        self.view.borrow().fallback
    }
}

impl Scene for DialogueScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Dialogue
    }

    fn activate(&mut self, ctx: &mut SceneContext<'_>) {
        self.view.borrow_mut().set_visible(ctx.stage, true);

        let view = Rc::clone(&self.view);
        let slot = self.slot.clone();
        ctx.scheduler.register(ctx.id, "dialogue", move |frame| {
            let mut view = view.try_borrow_mut().map_err(|_| TickError::StateBusy("dialogue"))?;
            view.update(&slot, frame.stage, frame.delta);
            Ok(())
        });
    }

    fn deactivate(&mut self, ctx: &mut SceneContext<'_>) {
        self.view.borrow_mut().set_visible(ctx.stage, false);
    }

    fn teardown(&mut self, ctx: &mut SceneContext<'_>) {
        self.view.borrow_mut().destroy(ctx.stage);
    }

    fn resize(&mut self, ctx: &mut SceneContext<'_>) {
        let mut view = self.view.borrow_mut();
        view.viewport = ctx.viewport;
        // Jump straight to the new target so a resize is idempotent
        view.scroll = view.target_scroll();
        view.layout(ctx.stage);
    }

    fn content_slot(&self) -> Option<ContentSlot> {
        Some(self.slot.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
