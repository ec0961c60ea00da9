//! Arm controller with synchronous observers.
//!
//! [`ArmController`] owns the [`Arm`], builds its [`OrderedChain`] on
//! initialization, validates joint turns, and notifies registered observers
//! in-line, before the mutating call returns.
//!
//! Observers only receive the event, never the controller, so they cannot
//! re-enter a mutating operation from inside a notification.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use armtable_core::JointId;
//! use armtable_kinematics::{ArmController, ArmEvent};
//!
//! let events = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&events);
//!
//! let mut controller = ArmController::with_defaults();
//! controller.subscribe(move |e: &ArmEvent| sink.borrow_mut().push(e.clone()));
//! controller.initialize_arm().unwrap();
//! controller.turn(JointId(1), 45).unwrap();
//!
//! assert!(matches!(events.borrow()[0], ArmEvent::Initialized { joints: 6, .. }));
//! assert!(matches!(events.borrow()[1], ArmEvent::JointTurned { to: 45, .. }));
//! ```

use nalgebra::Point3;

use armtable_core::{ArmError, ControllerConfig, EmptyInputError, JointId, SessionConfig};
use armtable_model::{load_arm, Arm};

use crate::chain::OrderedChain;
use crate::workspace::{WorkspaceEnumerator, WorkspaceTable};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// State change delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ArmEvent {
    /// The chain was (re)built.
    Initialized { joints: usize, linkages: usize },
    /// A joint accepted a new angle.
    JointTurned {
        joint: JointId,
        chain_index: Option<usize>,
        from: i16,
        to: i16,
    },
    /// The pose changed; carries the new end-effector position.
    Moved { end_effector: Point3<f64> },
}

/// Receives [`ArmEvent`]s synchronously.
pub trait ArmObserver {
    fn notify(&mut self, event: &ArmEvent);
}

impl<F: FnMut(&ArmEvent)> ArmObserver for F {
    fn notify(&mut self, event: &ArmEvent) {
        self(event);
    }
}

// ---------------------------------------------------------------------------
// ArmController
// ---------------------------------------------------------------------------

/// Owns one arm and its ordered chain.
///
/// Single-threaded: a host that reads positions from another thread must
/// serialize access to the controller itself.
pub struct ArmController {
    arm: Arm,
    chain: Option<OrderedChain>,
    config: ControllerConfig,
    observers: Vec<Box<dyn ArmObserver>>,
}

impl ArmController {
    pub fn new(arm: Arm, config: ControllerConfig) -> Self {
        Self {
            arm,
            chain: None,
            config,
            observers: Vec::new(),
        }
    }

    /// Controller for the built-in 6-joint arm.
    pub fn with_defaults() -> Self {
        Self::new(Arm::six_joint(), ControllerConfig::default())
    }

    /// Controller for the arm a session config points at, or the built-in
    /// arm when none is configured.
    pub fn from_session(session: &SessionConfig) -> Result<Self, ArmError> {
        let arm = match &session.arm_path {
            Some(path) => load_arm(path)?,
            None => Arm::six_joint(),
        };
        Ok(Self::new(arm, session.controller.clone()))
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn subscribe(&mut self, observer: impl ArmObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn arm(&self) -> &Arm {
        &self.arm
    }

    /// The ordered chain, once [`initialize_arm`](Self::initialize_arm) succeeded.
    pub fn chain(&self) -> Option<&OrderedChain> {
        self.chain.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.chain.is_some()
    }

    /// Build the ordered chain from the arm's topology.
    ///
    /// On failure no chain is exposed, even if an earlier call succeeded.
    /// On success observers get [`ArmEvent::Initialized`], followed by the
    /// homing notifications when `start_at_home` is set.
    pub fn initialize_arm(&mut self) -> Result<&OrderedChain, ArmError> {
        self.chain = None;
        let chain = match OrderedChain::linearize(&mut self.arm) {
            Ok(chain) => chain,
            Err(err) => {
                tracing::error!(arm = %self.arm.name(), error = %err, "arm initialization failed");
                return Err(err.into());
            }
        };

        tracing::info!(
            arm = %self.arm.name(),
            joints = chain.len(),
            linkages = chain.segments().len(),
            "arm initialized"
        );
        let event = ArmEvent::Initialized {
            joints: chain.len(),
            linkages: chain.segments().len(),
        };
        self.chain = Some(chain);
        self.emit(&event);

        if self.config.start_at_home {
            self.go_home()?;
        }
        self.require_chain()
    }

    /// Set a joint to `degrees`, returning the previous angle.
    ///
    /// Fires exactly one [`ArmEvent::JointTurned`], then
    /// [`ArmEvent::Moved`] if the arm is initialized and `emit_moved_on_turn`
    /// is set. A rejected angle leaves the joint unchanged and fires nothing.
    pub fn turn(&mut self, joint: JointId, degrees: i16) -> Result<i16, ArmError> {
        let from = match self.arm.set_angle(joint, degrees) {
            Ok(from) => from,
            Err(err) => {
                tracing::warn!(%joint, degrees, error = %err, "turn rejected");
                return Err(err.into());
            }
        };
        tracing::debug!(%joint, from, to = degrees, "joint turned");

        let chain_index = self.arm.joint(joint)?.chain_index();
        self.emit(&ArmEvent::JointTurned {
            joint,
            chain_index,
            from,
            to: degrees,
        });
        if self.config.emit_moved_on_turn {
            self.emit_moved()?;
        }
        Ok(from)
    }

    /// [`turn`](Self::turn) addressed by joint name.
    pub fn turn_named(&mut self, name: &str, degrees: i16) -> Result<i16, ArmError> {
        let joint = self
            .arm
            .joint_id(name)
            .ok_or_else(|| ArmError::UnknownJointName(name.to_owned()))?;
        self.turn(joint, degrees)
    }

    /// Return every joint to its home angle.
    ///
    /// Fires one [`ArmEvent::JointTurned`] per joint that moved and, if any
    /// did, a single [`ArmEvent::Moved`] (when the arm is initialized).
    /// Returns the number of joints that moved.
    pub fn go_home(&mut self) -> Result<usize, ArmError> {
        let changed = self.arm.home();
        for &(joint, from, to) in &changed {
            let chain_index = self.arm.joint(joint)?.chain_index();
            self.emit(&ArmEvent::JointTurned {
                joint,
                chain_index,
                from,
                to,
            });
        }
        if !changed.is_empty() {
            self.emit_moved()?;
        }
        tracing::debug!(moved = changed.len(), "arm homed");
        Ok(changed.len())
    }

    /// Current end-effector position.
    pub fn end_effector(&self) -> Result<Point3<f64>, ArmError> {
        let chain = self.require_chain()?;
        let angles = chain.angles_from(&self.arm)?;
        Ok(chain.end_effector(&angles)?)
    }

    /// Current position of chain joint `index`.
    pub fn position_of(&self, index: usize) -> Result<Point3<f64>, ArmError> {
        Ok(self.require_chain()?.position_in(&self.arm, index)?)
    }

    /// Current positions of every chain joint, base first.
    pub fn joint_positions(&self) -> Result<Vec<Point3<f64>>, ArmError> {
        let chain = self.require_chain()?;
        let angles = chain.angles_from(&self.arm)?;
        Ok(chain.joint_positions(&angles)?)
    }

    /// Sweep the workspace around the current pose.
    pub fn enumerate_workspace(
        &self,
        enumerator: &WorkspaceEnumerator,
    ) -> Result<WorkspaceTable, ArmError> {
        enumerator.enumerate(&self.arm, self.require_chain()?)
    }

    fn require_chain(&self) -> Result<&OrderedChain, ArmError> {
        self.chain
            .as_ref()
            .ok_or(ArmError::EmptyInput(EmptyInputError::EmptyChain))
    }

    fn emit_moved(&mut self) -> Result<(), ArmError> {
        if self.chain.is_none() {
            return Ok(());
        }
        let end_effector = self.end_effector()?;
        self.emit(&ArmEvent::Moved { end_effector });
        Ok(())
    }

    fn emit(&mut self, event: &ArmEvent) {
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }
}

impl std::fmt::Debug for ArmController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmController")
            .field("arm", &self.arm.name())
            .field("initialized", &self.is_initialized())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
