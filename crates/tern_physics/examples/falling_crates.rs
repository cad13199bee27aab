//! Falling Crates Demo
//!
//! Headless walkthrough of tern_physics:
//! - Box and sphere bodies derived from mesh bounds, sharing cached shapes
//! - A static ground and a heightfield ramp
//! - A kinematic pusher following its node
//! - Forces, impulses and torques
//! - Collision events and raycasts
//!
//! Run with: cargo run -p tern_physics --example falling_crates

use tern_physics::{
    CollisionEventType, Heightfield, PhysicsConfig, PhysicsController, Ray, RigidBodyParams,
    ShapeType,
};
use tern_scene::{Geometry, Model, Node, SceneGraph, Vec3};

fn main() -> tern_physics::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PhysicsConfig::load(path)?,
        None => PhysicsConfig::default(),
    };
    let mut physics = PhysicsController::new(config);
    let mut scene = SceneGraph::new();

    let cube = Model::from_geometry(Geometry::cube(0.5));

    // ========== Static world ==========

    let ground = scene.add(
        Node::new("ground")
            .with_scale(Vec3::new(40.0, 1.0, 40.0))
            .with_model(cube.clone()),
    );
    physics.create_rigid_body(&scene, ground, &ShapeType::Box, &RigidBodyParams::static_body().stone())?;

    let ramp = scene.add(Node::new("ramp").with_position(Vec3::new(10.0, 0.5, 0.0)));
    let field = Heightfield::from_fn(8, 8, Vec3::new(8.0, 1.0, 8.0), |_, col| col as f32 * 0.3);
    physics.create_rigid_body(&scene, ramp, &ShapeType::Heightfield(field), &RigidBodyParams::static_body())?;

    // ========== Dynamic bodies ==========

    let mut crates = Vec::new();
    for i in 0..5 {
        let node = scene.add(
            Node::new(format!("crate_{i}"))
                .with_position(Vec3::new(i as f32 * 1.5 - 3.0, 4.0 + i as f32, 0.0))
                .with_model(cube.clone()),
        );
        let body = physics.create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default().wood())?;
        crates.push(body);
    }

    let ball_node = scene.add(
        Node::new("ball")
            .with_position(Vec3::new(0.0, 8.0, 3.0))
            .with_model(cube.clone()),
    );
    let ball = physics.create_rigid_body(
        &scene,
        ball_node,
        &ShapeType::Sphere,
        &RigidBodyParams::default().with_mass(0.5).bouncy(),
    )?;

    let pusher_node = scene.add(
        Node::new("pusher")
            .with_position(Vec3::new(-8.0, 1.0, 0.0))
            .with_model(cube.clone()),
    );
    physics.create_rigid_body(
        &scene,
        pusher_node,
        &ShapeType::Box,
        &RigidBodyParams::default().with_kinematic(true),
    )?;

    tracing::info!(
        "{} bodies on {}, {} cached shapes",
        physics.body_count(),
        physics.backend_name(),
        physics.cached_shape_count()
    );

    // ========== Simulate ==========

    let dt = 1.0 / 60.0;
    physics.apply_impulse(ball, Vec3::new(2.0, 0.0, -1.0), None)?;
    physics.apply_torque_impulse(crates[0], Vec3::new(0.0, 0.5, 0.0))?;

    for frame in 0..240 {
        if let Some(pusher) = scene.get_mut(pusher_node) {
            pusher.position.x += 2.0 * dt;
        }
        // Forces last for one step, so keep pushing while wanted
        if frame < 60 {
            physics.apply_force(crates[4], Vec3::new(0.0, 0.0, 5.0), Some(Vec3::new(0.0, 0.5, 0.0)))?;
        }

        physics.step(&mut scene, dt);

        for event in physics.collision_events() {
            if event.event_type == CollisionEventType::Started {
                let name = |id| scene.get(id).map(|n| n.name.as_str()).unwrap_or("?");
                tracing::info!("frame {frame}: {} hit {}", name(event.node_a), name(event.node_b));
            }
        }
    }

    for body in &crates {
        if let Some(node) = scene.get(body.node()) {
            tracing::info!(
                "{} rests at ({:.2}, {:.2}, {:.2}), awake: {}",
                node.name,
                node.position.x,
                node.position.y,
                node.position.z,
                physics.is_active(*body)?
            );
        }
    }

    let probe = Ray::new(Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
    if let Some(hit) = physics.raycast(&probe, 50.0) {
        let name = scene.get(hit.node).map(|n| n.name.as_str()).unwrap_or("?");
        tracing::info!("Probe hit {} at height {:.2}", name, hit.position.y);
    }

    // Dropping a node takes its body with it on the next step
    scene.remove(ball_node);
    physics.step(&mut scene, dt);
    physics.prune_shapes();
    tracing::info!(
        "{} bodies left, {} cached shapes",
        physics.body_count(),
        physics.cached_shape_count()
    );

    Ok(())
}
