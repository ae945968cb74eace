//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and the
//! board-specific collaborators: the motor power stage and the position
//! feedback source.

pub mod motor;
pub mod sensor;

pub use motor::{Direction, MotorDrive};
pub use sensor::PositionSensor;
