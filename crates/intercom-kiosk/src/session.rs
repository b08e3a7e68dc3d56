//! Keypad-driven kiosk session.
//!
//! A session owns the unit and passcode buffers, walks the
//! [`KioskStep`] machine as keys arrive, hands complete attempts to an
//! [`AccessCheck`] and sends [`DoorCommand::Open`] when one is granted.
//!
//! # Examples
//!
//! ```no_run
//! use intercom_kiosk::{KeypadKey, KioskSession, DoorCommand};
//! use intercom_storage::{Database, StoredValidator};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::in_memory().await?;
//! let (door_tx, mut door_rx) = mpsc::channel(8);
//! let mut session = KioskSession::new(StoredValidator::new(db.pool().clone()), door_tx);
//!
//! for key in intercom_kiosk::parse_keys("204 # 4521 #")? {
//!     session.press(key).await?;
//! }
//! println!("{}", session.message());
//!
//! if let Ok(DoorCommand::Open { unit_number }) = door_rx.try_recv() {
//!     println!("door opened for {unit_number}");
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use intercom_core::constants::{
    DEFAULT_FEEDBACK_MS, MAX_PASSCODE_LENGTH, MAX_UNIT_LENGTH, MIN_PASSCODE_LENGTH,
};
use intercom_core::{DisplayMessages, Verdict};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::check::AccessCheck;
use crate::door::DoorCommand;
use crate::error::{KioskError, Result};
use crate::keypad::KeypadKey;
use crate::step::KioskStep;

/// Kiosk behaviour settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    /// How long the outcome stays on the panel
    pub feedback_duration: Duration,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            feedback_duration: Duration::from_millis(DEFAULT_FEEDBACK_MS),
        }
    }
}

impl KioskConfig {
    pub fn feedback_duration(mut self, duration: Duration) -> Self {
        self.feedback_duration = duration;
        self
    }
}

/// One entrance panel.
///
/// Not shareable between tasks; drive it from a single loop such as
/// [`KioskSession::run`].
pub struct KioskSession<C> {
    checker: C,
    door_tx: mpsc::Sender<DoorCommand>,
    config: KioskConfig,
    step: KioskStep,
    unit: String,
    passcode: String,
    message: &'static str,
    last_verdict: Option<Verdict>,
    feedback_deadline: Option<Instant>,
}

impl<C: AccessCheck> KioskSession<C> {
    pub fn new(checker: C, door_tx: mpsc::Sender<DoorCommand>) -> Self {
        Self::with_config(checker, door_tx, KioskConfig::default())
    }

    pub fn with_config(checker: C, door_tx: mpsc::Sender<DoorCommand>, config: KioskConfig) -> Self {
        Self {
            checker,
            door_tx,
            config,
            step: KioskStep::UnitEntry,
            unit: String::new(),
            passcode: String::new(),
            message: DisplayMessages::ENTER_UNIT,
            last_verdict: None,
            feedback_deadline: None,
        }
    }

    pub fn step(&self) -> KioskStep {
        self.step
    }

    /// Text currently on the panel
    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn unit_input(&self) -> &str {
        &self.unit
    }

    /// One `*` per typed passcode digit
    pub fn masked_passcode(&self) -> String {
        "*".repeat(self.passcode.len())
    }

    /// Outcome of the most recent check, if it completed
    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    pub fn feedback_deadline(&self) -> Option<Instant> {
        self.feedback_deadline
    }

    /// Handle one key press.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::DoorChannelClosed`] if a granted attempt cannot
    /// reach the door controller. A failing [`AccessCheck`] is not returned;
    /// the panel shows the system error message instead.
    pub async fn press(&mut self, key: KeypadKey) -> Result<()> {
        match self.step {
            KioskStep::UnitEntry => self.press_unit(key),
            KioskStep::PasscodeEntry => self.press_passcode(key).await,
            KioskStep::Processing => {
                debug!(%key, "key ignored while processing");
                Ok(())
            }
            // Any key dismisses the outcome
            KioskStep::Feedback => self.reset(),
        }
    }

    fn press_unit(&mut self, key: KeypadKey) -> Result<()> {
        match key {
            KeypadKey::Digit(_) => {
                if self.unit.len() < MAX_UNIT_LENGTH
                    && let Some(c) = key.as_char()
                {
                    self.unit.push(c);
                }
            }
            KeypadKey::Backspace => {
                self.unit.pop();
            }
            KeypadKey::Clear | KeypadKey::Cancel => {
                self.unit.clear();
                self.message = DisplayMessages::ENTER_UNIT;
            }
            KeypadKey::Enter => {
                if self.unit.is_empty() {
                    self.message = DisplayMessages::ENTER_UNIT;
                } else {
                    self.transition(KioskStep::PasscodeEntry)?;
                    self.message = DisplayMessages::ENTER_PASSCODE;
                }
            }
        }
        Ok(())
    }

    async fn press_passcode(&mut self, key: KeypadKey) -> Result<()> {
        match key {
            KeypadKey::Digit(_) => {
                if self.passcode.len() < MAX_PASSCODE_LENGTH
                    && let Some(c) = key.as_char()
                {
                    self.passcode.push(c);
                }
            }
            KeypadKey::Backspace => {
                self.passcode.pop();
            }
            KeypadKey::Clear => {
                self.passcode.clear();
                self.message = DisplayMessages::ENTER_PASSCODE;
            }
            KeypadKey::Cancel => {
                self.transition(KioskStep::UnitEntry)?;
                self.unit.clear();
                self.passcode.clear();
                self.message = DisplayMessages::ENTER_UNIT;
            }
            KeypadKey::Enter => {
                if self.passcode.len() < MIN_PASSCODE_LENGTH {
                    self.passcode.clear();
                    self.message = DisplayMessages::PASSCODE_LENGTH;
                } else {
                    self.submit().await?;
                }
            }
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<()> {
        self.transition(KioskStep::Processing)?;
        self.message = DisplayMessages::PROCESSING;

        let passcode = std::mem::take(&mut self.passcode);
        let outcome = self.checker.check(&self.unit, &passcode).await;

        self.transition(KioskStep::Feedback)?;
        self.feedback_deadline = Some(Instant::now() + self.config.feedback_duration);

        match outcome {
            Ok(verdict) => {
                self.message = verdict.display_message();
                let granted = verdict.is_granted();
                self.last_verdict = Some(verdict);

                if granted {
                    info!(unit = %self.unit, "opening door");
                    self.door_tx
                        .send(DoorCommand::Open {
                            unit_number: self.unit.clone(),
                        })
                        .await
                        .map_err(|_| KioskError::DoorChannelClosed)?;
                }
            }
            Err(e) => {
                error!(unit = %self.unit, error = %e, "access check failed");
                self.message = DisplayMessages::SYSTEM_ERROR;
                self.last_verdict = None;
            }
        }
        Ok(())
    }

    /// Leave the feedback screen and wait for the next unit.
    pub fn reset(&mut self) -> Result<()> {
        self.transition(KioskStep::UnitEntry)?;
        self.unit.clear();
        self.passcode.clear();
        self.message = DisplayMessages::ENTER_UNIT;
        self.feedback_deadline = None;
        Ok(())
    }

    /// Reset if the feedback screen has been shown long enough.
    ///
    /// Returns `true` if the session went back to unit entry.
    pub fn expire_feedback(&mut self, now: Instant) -> Result<bool> {
        match self.feedback_deadline {
            Some(deadline) if self.step == KioskStep::Feedback && deadline <= now => {
                self.reset()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Drive the session from a key channel until it closes.
    pub async fn run(mut self, mut keys: mpsc::Receiver<KeypadKey>) -> Result<()> {
        loop {
            let deadline = self.feedback_deadline;
            tokio::select! {
                key = keys.recv() => match key {
                    Some(key) => self.press(key).await?,
                    None => {
                        debug!("keypad channel closed");
                        return Ok(());
                    }
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.expire_feedback(Instant::now())?;
                }
            }
        }
    }

    fn transition(&mut self, to: KioskStep) -> Result<()> {
        if !self.step.can_transition_to(&to) {
            return Err(KioskError::InvalidStepTransition {
                from: self.step,
                to,
            });
        }
        debug!(from = %self.step, %to, "kiosk step");
        self.step = to;
        Ok(())
    }
}
