//! A serial chain of prismatic joints, simulated with the joint-space
//! equations of motion
//!     M(q) vdot + c(q) = τ_actuator + τ_passive
//!
//! Every link slides along a world-fixed axis relative to its predecessor, so
//! M is constant in q and the bias force is pure gravity load. This is enough
//! to exercise the controller end to end: a gantry arm with a gripper finger
//! hanging off the last carriage.

use itertools::izip;
use na::{DMatrix, DVector, UnitQuaternion, UnitVector3, Vector3};
use thiserror::Error;
use tracing::warn;

use crate::{
    integrators::semi_implicit_euler_step, physics::Physics, robot::Robotiq2F85, types::Float,
    GRAVITY,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("chain has no links")]
    Empty,

    #[error("link {name}: {reason}")]
    InvalidLink { name: String, reason: String },

    #[error("site {name} is attached to link {link}, but the chain has {num_links} links")]
    InvalidSite {
        name: String,
        link: usize,
        num_links: usize,
    },

    #[error("timestep must be finite and > 0, got {0}")]
    InvalidTimestep(Float),
}

/// How a link is actuated.
#[derive(Debug, Clone, PartialEq)]
pub enum Drive {
    /// Joint force = gear * ctrl.
    Motor { gear: Float },
    /// Position servo: ctrl in [0, ctrl_max] maps to a target in [0, stroke].
    Servo {
        kp: Float,
        kv: Float,
        stroke: Float,
        ctrl_max: Float,
        force_range: (Float, Float),
    },
    Passive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    pub name: String,
    pub mass: Float,
    pub axis: UnitVector3<Float>,
    pub damping: Float,
    pub drive: Drive,
}

impl ChainLink {
    pub fn motor(name: &str, mass: Float, axis: UnitVector3<Float>, gear: Float) -> Self {
        ChainLink {
            name: name.to_string(),
            mass,
            axis,
            damping: 0.0,
            drive: Drive::Motor { gear },
        }
    }

    /// Gripper finger driven like a Robotiq 2F-85: 0 opens, 255 closes.
    pub fn finger(name: &str, mass: Float, axis: UnitVector3<Float>) -> Self {
        ChainLink {
            name: name.to_string(),
            mass,
            axis,
            damping: 0.0,
            drive: Drive::Servo {
                kp: 50.0,
                kv: 5.0,
                stroke: 0.04,
                ctrl_max: Robotiq2F85::CLOSED,
                force_range: Robotiq2F85::FORCE_RANGE,
            },
        }
    }

    pub fn passive(name: &str, mass: Float, axis: UnitVector3<Float>) -> Self {
        ChainLink {
            name: name.to_string(),
            mass,
            axis,
            damping: 0.0,
            drive: Drive::Passive,
        }
    }

    pub fn with_damping(mut self, damping: Float) -> Self {
        self.damping = damping;
        self
    }

    fn is_actuated(&self) -> bool {
        !matches!(self.drive, Drive::Passive)
    }
}

/// A named point rigidly attached to a link.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSpec {
    pub name: String,
    pub link: usize,
    pub offset: Vector3<Float>,
    pub orientation: UnitQuaternion<Float>,
}

impl SiteSpec {
    pub fn new(name: &str, link: usize, offset: Vector3<Float>) -> Self {
        SiteSpec {
            name: name.to_string(),
            link,
            offset,
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn with_orientation(mut self, orientation: UnitQuaternion<Float>) -> Self {
        self.orientation = orientation;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChainBuilder {
    links: Vec<ChainLink>,
    sites: Vec<SiteSpec>,
    base: Vector3<Float>,
    gravity: Vector3<Float>,
    dt: Float,
}

impl Default for ChainBuilder {
    fn default() -> Self {
        ChainBuilder {
            links: vec![],
            sites: vec![],
            base: Vector3::zeros(),
            gravity: Vector3::new(0.0, 0.0, -GRAVITY),
            dt: 0.002,
        }
    }
}

impl ChainBuilder {
    pub fn link(mut self, link: ChainLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn site(mut self, site: SiteSpec) -> Self {
        self.sites.push(site);
        self
    }

    pub fn base(mut self, base: Vector3<Float>) -> Self {
        self.base = base;
        self
    }

    pub fn gravity(mut self, gravity: Vector3<Float>) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn timestep(mut self, dt: Float) -> Self {
        self.dt = dt;
        self
    }

    pub fn build(self) -> Result<PrismaticChain, SimError> {
        if self.links.is_empty() {
            return Err(SimError::Empty);
        }
        for link in &self.links {
            if !link.mass.is_finite() || link.mass <= 0.0 {
                return Err(SimError::InvalidLink {
                    name: link.name.clone(),
                    reason: format!("mass must be > 0, got {}", link.mass),
                });
            }
            if !link.damping.is_finite() || link.damping < 0.0 {
                return Err(SimError::InvalidLink {
                    name: link.name.clone(),
                    reason: format!("damping must be >= 0, got {}", link.damping),
                });
            }
        }
        for site in &self.sites {
            if site.link >= self.links.len() {
                return Err(SimError::InvalidSite {
                    name: site.name.clone(),
                    link: site.link,
                    num_links: self.links.len(),
                });
            }
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidTimestep(self.dt));
        }

        let nv = self.links.len();
        let nu = self.links.iter().filter(|link| link.is_actuated()).count();
        Ok(PrismaticChain {
            links: self.links,
            sites: self.sites,
            base: self.base,
            gravity: self.gravity,
            dt: self.dt,
            q: DVector::zeros(nv),
            v: DVector::zeros(nv),
            ctrl: DVector::zeros(nu),
            time: 0.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrismaticChain {
    links: Vec<ChainLink>,
    sites: Vec<SiteSpec>,
    base: Vector3<Float>,
    gravity: Vector3<Float>,
    dt: Float,
    q: DVector<Float>,
    v: DVector<Float>,
    ctrl: DVector<Float>,
    time: Float,
}

impl PrismaticChain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    pub fn set_state(&mut self, q: &DVector<Float>, v: &DVector<Float>) {
        self.q.copy_from(q);
        self.v.copy_from(v);
    }

    pub fn q(&self) -> &DVector<Float> {
        &self.q
    }

    pub fn v(&self) -> &DVector<Float> {
        &self.v
    }

    pub fn ctrl(&self) -> &DVector<Float> {
        &self.ctrl
    }

    pub fn timestep(&self) -> Float {
        self.dt
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// DOF driven by each actuator, in actuator order.
    pub fn actuator_dofs(&self) -> Vec<usize> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_actuated())
            .map(|(dof, _)| dof)
            .collect()
    }

    /// Generalized forces produced by the current control vector.
    pub fn actuator_forces(&self) -> DVector<Float> {
        let mut qfrc = DVector::zeros(self.links.len());
        for (dof, ctrl) in izip!(self.actuator_dofs(), self.ctrl.iter()) {
            let link = &self.links[dof];
            qfrc[dof] = match &link.drive {
                Drive::Motor { gear } => gear * ctrl,
                Drive::Servo {
                    kp,
                    kv,
                    stroke,
                    ctrl_max,
                    force_range,
                } => {
                    let target = ctrl.clamp(0.0, *ctrl_max) / ctrl_max * stroke;
                    let force = kp * (target - self.q[dof]) - kv * self.v[dof];
                    force.clamp(force_range.0, force_range.1)
                }
                Drive::Passive => 0.0,
            };
        }
        qfrc
    }

    /// Callers check [`Physics::has_site`] first.
    ///
    /// # Panics
    /// If no site is called `name`.
    fn find_site(&self, name: &str) -> &SiteSpec {
        match self.sites.iter().find(|site| site.name == name) {
            Some(site) => site,
            None => panic!("site {} not found in chain", name),
        }
    }
}

impl Physics for PrismaticChain {
    fn nv(&self) -> usize {
        self.links.len()
    }

    fn nu(&self) -> usize {
        self.ctrl.len()
    }

    /// M_jk = Σ_{i >= max(j, k)} m_i (a_j · a_k)
    fn mass_matrix(&self) -> DMatrix<Float> {
        let n = self.links.len();
        let mut mass_matrix = DMatrix::zeros(n, n);
        for j in 0..n {
            for k in 0..n {
                let carried: Float = self.links[j.max(k)..].iter().map(|link| link.mass).sum();
                mass_matrix[(j, k)] = carried * self.links[j].axis.dot(&*self.links[k].axis);
            }
        }
        mass_matrix
    }

    fn has_site(&self, site: &str) -> bool {
        self.sites.iter().any(|s| s.name == site)
    }

    fn site_jacobian(&self, site: &str) -> (DMatrix<Float>, DMatrix<Float>) {
        let site = self.find_site(site);
        let n = self.links.len();
        let mut jacp = DMatrix::zeros(3, n);
        for (dof, link) in self.links.iter().enumerate().take(site.link + 1) {
            jacp.set_column(dof, &link.axis.into_inner());
        }
        (jacp, DMatrix::zeros(3, n))
    }

    /// Gravity load only: c_j = -Σ_{i >= j} m_i (a_j · g)
    fn bias_forces(&self) -> DVector<Float> {
        let n = self.links.len();
        DVector::from_fn(n, |j, _| {
            let carried: Float = self.links[j..].iter().map(|link| link.mass).sum();
            -carried * self.links[j].axis.dot(&self.gravity)
        })
    }

    fn actuator_moment(&self) -> DMatrix<Float> {
        let dofs = self.actuator_dofs();
        let mut moment = DMatrix::zeros(dofs.len(), self.links.len());
        for (actuator, dof) in dofs.into_iter().enumerate() {
            moment[(actuator, dof)] = match self.links[dof].drive {
                Drive::Motor { gear } => gear,
                _ => 1.0,
            };
        }
        moment
    }

    fn site_position(&self, site: &str) -> Vector3<Float> {
        let site = self.find_site(site);
        let mut position = self.base + site.offset;
        for (link, q) in izip!(self.links.iter(), self.q.iter()).take(site.link + 1) {
            position += link.axis.into_inner() * *q;
        }
        position
    }

    fn site_orientation(&self, site: &str) -> UnitQuaternion<Float> {
        self.find_site(site).orientation
    }

    fn joint_velocities(&self) -> DVector<Float> {
        self.v.clone()
    }

    /// Panics if `ctrl` does not have one entry per actuator.
    fn set_control(&mut self, ctrl: &DVector<Float>) {
        if ctrl.len() != self.ctrl.len() {
            panic!(
                "control vector has length {}, chain has {} actuators",
                ctrl.len(),
                self.ctrl.len()
            );
        }
        self.ctrl.copy_from(ctrl);
    }

    fn step(&mut self) {
        let passive = DVector::from_iterator(
            self.links.len(),
            izip!(self.links.iter(), self.v.iter()).map(|(link, v)| -link.damping * v),
        );
        let rhs = self.actuator_forces() + passive - self.bias_forces();

        let vdot = match self.mass_matrix().cholesky() {
            Some(chol) => chol.solve(&rhs),
            None => {
                warn!("mass matrix is not positive definite, holding velocities");
                DVector::zeros(self.links.len())
            }
        };

        let (q, v) = semi_implicit_euler_step(&self.q, &self.v, &vdot, self.dt);
        self.q = q;
        self.v = v;
        self.time += self.dt;
    }

    fn time(&self) -> Float {
        self.time
    }
}
