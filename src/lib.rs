#![allow(non_snake_case)]

//! Operational space control of a robot arm's end-effector.
//!
//! Each control tick reads the arm's kinematics and dynamics from a physics
//! engine, turns the task-space pose error into a PD wrench, and maps it back
//! to actuator commands through the operational-space mass matrix:
//!
//! ```text
//! τ = Jᵀ Λ F + c(q, v),   Λ = (J M⁻¹ Jᵀ)⁻¹
//! ```
//!
//! The engine itself sits behind the [`physics::Physics`] trait. A small
//! prismatic-chain simulator ([`sim::PrismaticChain`]) implements it for tests
//! and demos.

use types::Float;
pub extern crate nalgebra as na;

pub mod config;
pub mod control;
pub mod convergence;
pub mod error;
pub mod integrators;
pub mod joint_space;
pub mod kinematics;
pub mod linalg;
pub mod mass_model;
pub mod orientation;
pub mod pd;
pub mod physics;
pub mod plot;
pub mod robot;
pub mod sim;
pub mod target;
pub mod torque;
pub mod types;
pub mod util;

pub const GRAVITY: Float = 9.81;

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;
