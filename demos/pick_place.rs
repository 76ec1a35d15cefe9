use gorilla_osc::config::{ControllerConfig, ConvergenceThresholds, GainsConfig, TaskGains};
use gorilla_osc::control::Osc;
use gorilla_osc::physics::Physics;
use gorilla_osc::plot::plot;
use gorilla_osc::robot::{Robotiq2F85, SerialArm};
use gorilla_osc::sim::{ChainLink, PrismaticChain, SiteSpec};
use gorilla_osc::target::GripperStatus;
use gorilla_osc::types::Float;
use gorilla_osc::PI;
use nalgebra::{vector, DMatrix, DVector, UnitQuaternion, Vector3};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Engine wrapper that records the height of one site after every step.
struct HeightRecorder<P: Physics> {
    inner: P,
    site: String,
    heights: Vec<Float>,
}

impl<P: Physics> Physics for HeightRecorder<P> {
    fn nv(&self) -> usize {
        self.inner.nv()
    }

    fn nu(&self) -> usize {
        self.inner.nu()
    }

    fn mass_matrix(&self) -> DMatrix<Float> {
        self.inner.mass_matrix()
    }

    fn has_site(&self, site: &str) -> bool {
        self.inner.has_site(site)
    }

    fn site_jacobian(&self, site: &str) -> (DMatrix<Float>, DMatrix<Float>) {
        self.inner.site_jacobian(site)
    }

    fn bias_forces(&self) -> DVector<Float> {
        self.inner.bias_forces()
    }

    fn actuator_moment(&self) -> DMatrix<Float> {
        self.inner.actuator_moment()
    }

    fn site_position(&self, site: &str) -> Vector3<Float> {
        self.inner.site_position(site)
    }

    fn site_orientation(&self, site: &str) -> UnitQuaternion<Float> {
        self.inner.site_orientation(site)
    }

    fn joint_velocities(&self) -> DVector<Float> {
        self.inner.joint_velocities()
    }

    fn set_control(&mut self, ctrl: &DVector<Float>) {
        self.inner.set_control(ctrl)
    }

    fn step(&mut self) {
        self.inner.step();
        self.heights.push(self.inner.site_position(&self.site).z);
    }

    fn time(&self) -> Float {
        self.inner.time()
    }
}

/// Move a gripper above an object, then down to a pregrasp pose with the
/// fingers closed.
///
///          base
///    x ----[====]         gantry carriages slide along x, y and z
///            |  y
///            |
///          z |
///           [ ]  attachment
///           /\   pinch
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gorilla_osc=info".parse()?),
        )
        .init();

    // Hand pointing down
    let down = UnitQuaternion::from_euler_angles(0.0, PI, 0.0);
    let dt = 0.002;
    let chain = PrismaticChain::builder()
        .base(vector![0.3, 0.0, 0.8])
        .link(ChainLink::motor("x", 4.0, Vector3::x_axis(), 1.0).with_damping(0.5))
        .link(ChainLink::motor("y", 3.0, Vector3::y_axis(), 1.0).with_damping(0.5))
        .link(ChainLink::motor("z", 2.0, Vector3::z_axis(), 1.0).with_damping(0.5))
        .link(ChainLink::finger("right_driver", 0.1, Vector3::y_axis()))
        .site(SiteSpec::new("attachment", 2, Vector3::zeros()).with_orientation(down))
        .site(
            SiteSpec::new(Robotiq2F85::TCP_SITE, 2, vector![0.0, 0.0, -0.15])
                .with_orientation(down),
        )
        .timestep(dt)
        .build()?;
    let physics = HeightRecorder {
        inner: chain,
        site: Robotiq2F85::TCP_SITE.to_string(),
        heights: vec![],
    };

    let arm = SerialArm::with_dofs(3, "attachment");
    let gripper = Robotiq2F85::new(3, 3);
    let config = ControllerConfig::new(
        GainsConfig::new(TaskGains::new(100.0, 1.0), TaskGains::new(50.0, 1.0)),
        ConvergenceThresholds::default(),
    )
    .with_gripper(gripper.actuation());
    let mut osc = Osc::new(physics, &arm, &gripper, config)?;

    // Above target
    let target = vector![0.45, 0.0, 0.6];
    osc.set_target_position(target);
    osc.set_target_velocity(Vector3::zeros());
    osc.set_target_orientation(down);
    osc.set_target_angular_velocity(Vector3::zeros());
    let report = osc.run_controller(1.0)?;
    info!(?report, "above target");

    // Pregrasp
    osc.set_target_position(target - vector![0.0, 0.0, 0.4]);
    osc.set_gripper_status(GripperStatus::Closed);
    let report = osc.run_controller(1.0)?;
    info!(?report, "pregrasp");

    let recorder = osc.into_physics();
    plot("osc_height.png", "TCP height vs. time", &recorder.heights, dt)?;
    Ok(())
}
