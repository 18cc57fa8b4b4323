#[cfg(test)]
mod tests {
    use glam::Vec3;

    use tankwar_core::config::AgentConfig;
    use tankwar_core::constants::DT;
    use tankwar_core::enums::{Archetype, BehaviorKind, RejectReason};
    use tankwar_core::events::AiEvent;
    use tankwar_core::types::{flatten, AgentId, ObjectId, Pose};

    use crate::agent::{Agent, TickReport};
    use crate::behavior::Behavior;
    use crate::patrol::PatrolRoute;
    use crate::perception::{can_hear_target, can_see_target, can_see_target_within, HearingMemory};
    use crate::timer::Deadline;
    use crate::world::{
        ray_sphere, turn_toward, MovableBody, ProjectileSpawner, RayHit, TargetView, TickContext,
        WorldQuery,
    };

    const AGENT: AgentId = ObjectId(1);
    const PLAYER: ObjectId = ObjectId(100);

    // --- Fakes ---

    struct FakeBody {
        pose: Pose,
    }

    impl FakeBody {
        fn at(position: Vec3, forward: Vec3) -> Self {
            Self {
                pose: Pose::new(position, forward),
            }
        }
    }

    impl MovableBody for FakeBody {
        fn pose(&self) -> Pose {
            self.pose
        }

        fn move_in_direction(&mut self, direction: Vec3, speed: f32) {
            self.pose.position += flatten(direction).normalize_or_zero() * speed * DT;
        }

        fn rotate_toward(&mut self, point: Vec3, max_degrees_per_sec: f32) {
            let desired = point - self.pose.position;
            self.pose.forward =
                turn_toward(self.pose.forward, desired, (max_degrees_per_sec * DT).to_radians());
        }
    }

    struct Sphere {
        id: ObjectId,
        center: Vec3,
        radius: f32,
    }

    #[derive(Default)]
    struct FakeWorld {
        player: Option<TargetView>,
        walls: Vec<Sphere>,
    }

    impl FakeWorld {
        fn with_player(position: Vec3, making_noise: bool) -> Self {
            Self {
                player: Some(TargetView {
                    id: PLAYER,
                    position,
                    making_noise,
                }),
                walls: Vec::new(),
            }
        }

        fn wall(mut self, center: Vec3, radius: f32) -> Self {
            let id = ObjectId(200 + self.walls.len() as u32);
            self.walls.push(Sphere { id, center, radius });
            self
        }

        fn move_player(&mut self, position: Vec3) {
            if let Some(player) = &mut self.player {
                player.position = position;
            }
        }
    }

    impl WorldQuery for FakeWorld {
        fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
            let player = self.player.map(|p| Sphere {
                id: p.id,
                center: p.position,
                radius: 1.0,
            });
            self.walls
                .iter()
                .chain(player.as_ref())
                .filter_map(|s| {
                    ray_sphere(origin, direction, s.center, s.radius)
                        .filter(|d| *d <= max_distance)
                        .map(|distance| RayHit {
                            object: s.id,
                            distance,
                        })
                })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        }

        fn nearest_target(&self, _from: Vec3) -> Option<ObjectId> {
            self.player.map(|p| p.id)
        }

        fn resolve_target(&self, id: ObjectId) -> Option<TargetView> {
            self.player.filter(|p| p.id == id)
        }
    }

    #[derive(Default)]
    struct FakeSpawner {
        shots: Vec<(AgentId, Vec3, Vec3)>,
    }

    impl ProjectileSpawner for FakeSpawner {
        fn fire(
            &mut self,
            shooter: AgentId,
            origin: Vec3,
            direction: Vec3,
            _speed: f32,
            _damage: f32,
        ) {
            self.shots.push((shooter, origin, direction));
        }
    }

    fn agent(archetype: Archetype) -> Agent {
        Agent::new(AGENT, AgentConfig::for_archetype(archetype), PatrolRoute::default())
    }

    fn agent_with_route(archetype: Archetype, waypoints: Vec<Vec3>) -> Agent {
        Agent::new(
            AGENT,
            AgentConfig::for_archetype(archetype),
            PatrolRoute::new(waypoints, true),
        )
    }

    fn tick(
        agent: &mut Agent,
        body: &mut FakeBody,
        world: &FakeWorld,
        spawner: &mut FakeSpawner,
        now: f32,
    ) -> TickReport {
        let mut ctx = TickContext {
            now,
            body,
            world,
            spawner,
        };
        agent.tick(&mut ctx)
    }

    fn target_at(position: Vec3) -> TargetView {
        TargetView {
            id: PLAYER,
            position,
            making_noise: false,
        }
    }

    // --- Perception ---

    #[test]
    fn test_sees_target_ahead_at_five() {
        let config = AgentConfig::for_archetype(Archetype::Chase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 5.0), false);
        let target = target_at(Vec3::new(0.0, 0.0, 5.0));
        assert!(can_see_target(&pose, Some(&target), &config.sensors, &world));
    }

    #[test]
    fn test_occluder_at_three_blocks_vision() {
        let config = AgentConfig::for_archetype(Archetype::Chase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 5.0), false)
            .wall(Vec3::new(0.0, 0.0, 3.0), 0.5);
        let target = target_at(Vec3::new(0.0, 0.0, 5.0));
        assert!(!can_see_target(&pose, Some(&target), &config.sensors, &world));
    }

    #[test]
    fn test_vision_rejects_at_or_beyond_detection_range() {
        let config = AgentConfig::for_archetype(Archetype::Chase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);

        let at_range = Vec3::new(0.0, 0.0, 20.0);
        let world = FakeWorld::with_player(at_range, false);
        assert!(!can_see_target(&pose, Some(&target_at(at_range)), &config.sensors, &world));

        let inside = Vec3::new(0.0, 0.0, 19.5);
        let world = FakeWorld::with_player(inside, false);
        assert!(can_see_target(&pose, Some(&target_at(inside)), &config.sensors, &world));
    }

    #[test]
    fn test_vision_cone_uses_half_fov() {
        let config = AgentConfig::for_archetype(Archetype::Chase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);

        // 45 degrees off axis: inside the 60 degree half-angle.
        let inside = Vec3::new(5.0, 0.0, 5.0);
        let world = FakeWorld::with_player(inside, false);
        assert!(can_see_target(&pose, Some(&target_at(inside)), &config.sensors, &world));

        // 70 degrees off axis.
        let outside = Vec3::new(
            5.0 * 70f32.to_radians().sin(),
            0.0,
            5.0 * 70f32.to_radians().cos(),
        );
        let world = FakeWorld::with_player(outside, false);
        assert!(!can_see_target(&pose, Some(&target_at(outside)), &config.sensors, &world));
    }

    #[test]
    fn test_missing_target_is_never_seen_or_heard() {
        let config = AgentConfig::for_archetype(Archetype::Chase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut memory = HearingMemory::default();
        assert!(!can_see_target(&pose, None, &config.sensors, &world));
        assert!(!can_hear_target(&pose, None, &config.sensors, &mut memory, 10.0));
        assert_eq!(memory.last_heard(), None);
    }

    #[test]
    fn test_ambush_gate_rejects_before_vision() {
        let config = AgentConfig::for_archetype(Archetype::Ambush);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);
        let far = Vec3::new(0.0, 0.0, 15.0);
        let world = FakeWorld::with_player(far, false);
        let target = target_at(far);
        assert!(can_see_target(&pose, Some(&target), &config.sensors, &world));
        assert!(!can_see_target_within(&pose, Some(&target), &config.sensors, 10.0, &world));

        let near = Vec3::new(0.0, 0.0, 8.0);
        let world = FakeWorld::with_player(near, false);
        assert!(can_see_target_within(
            &pose,
            Some(&target_at(near)),
            &config.sensors,
            10.0,
            &world
        ));
    }

    #[test]
    fn test_hearing_debounced_per_cooldown() {
        let config = AgentConfig::for_archetype(Archetype::PatrolChase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);
        let target = TargetView {
            id: PLAYER,
            position: Vec3::new(0.0, 0.0, -10.0),
            making_noise: true,
        };
        let mut memory = HearingMemory::default();

        let mut heard = 0;
        let mut now = 0.0;
        // Four seconds of continuous noise: at most one hit per 2 s window.
        while now < 4.0 {
            if can_hear_target(&pose, Some(&target), &config.sensors, &mut memory, now) {
                heard += 1;
            }
            now += DT;
        }
        assert_eq!(heard, 2);

        let mut memory = HearingMemory::default();
        assert!(can_hear_target(&pose, Some(&target), &config.sensors, &mut memory, 0.0));
        assert!(!can_hear_target(&pose, Some(&target), &config.sensors, &mut memory, 2.0));
        assert!(can_hear_target(&pose, Some(&target), &config.sensors, &mut memory, 2.01));
    }

    #[test]
    fn test_hearing_requires_noise_and_range() {
        let config = AgentConfig::for_archetype(Archetype::PatrolChase);
        let pose = Pose::new(Vec3::ZERO, Vec3::Z);
        let mut memory = HearingMemory::default();

        let quiet = TargetView {
            id: PLAYER,
            position: Vec3::new(0.0, 0.0, 5.0),
            making_noise: false,
        };
        assert!(!can_hear_target(&pose, Some(&quiet), &config.sensors, &mut memory, 0.0));

        let distant = TargetView {
            id: PLAYER,
            position: Vec3::new(0.0, 0.0, 15.5),
            making_noise: true,
        };
        assert!(!can_hear_target(&pose, Some(&distant), &config.sensors, &mut memory, 0.0));
        assert_eq!(memory.last_heard(), None);
    }

    // --- Patrol route ---

    #[test]
    fn test_route_cycles_and_wraps() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
        ];
        let mut route = PatrolRoute::new(points.clone(), true);
        assert_eq!(route.cursor(), 0);
        assert_eq!(route.next_waypoint(), Some(points[0]));
        assert_eq!(route.next_waypoint(), Some(points[1]));
        assert_eq!(route.next_waypoint(), Some(points[2]));
        assert_eq!(route.next_waypoint(), Some(points[0]));
    }

    #[test]
    fn test_one_shot_route_ends() {
        let mut route = PatrolRoute::new(vec![Vec3::X, Vec3::Z], false);
        assert_eq!(route.next_waypoint(), Some(Vec3::X));
        assert_eq!(route.next_waypoint(), Some(Vec3::Z));
        assert!(route.is_finished());
        assert_eq!(route.next_waypoint(), None);
        assert_eq!(route.next_waypoint(), None);

        route.restart();
        assert_eq!(route.next_waypoint(), Some(Vec3::X));
    }

    #[test]
    fn test_route_mutators() {
        let mut route = PatrolRoute::default();
        assert!(route.is_empty());
        assert_eq!(route.next_waypoint(), None);

        route.push(Vec3::X);
        route.extend([Vec3::Y, Vec3::Z]);
        assert_eq!(route.len(), 3);
        assert_eq!(route.waypoints()[2], Vec3::Z);

        route.next_waypoint();
        route.replace(vec![Vec3::NEG_X], false);
        assert_eq!(route.cursor(), 0);
        assert!(!route.is_looping());
        route.set_looping(true);
        assert_eq!(route.next_waypoint(), Some(Vec3::NEG_X));
        assert_eq!(route.next_waypoint(), Some(Vec3::NEG_X));
    }

    // --- Timers ---

    #[test]
    fn test_deadline_fires_only_for_its_generation() {
        let deadline = Deadline::arm(1.0, 2.0, 4);
        assert!(!deadline.is_due(2.5, 4));
        assert!(deadline.is_due(3.0, 4));
        assert!(deadline.is_stale(5));
        assert!(!deadline.is_due(10.0, 5));
    }

    // --- Geometry helpers ---

    #[test]
    fn test_turn_toward_is_rate_limited() {
        let turned = turn_toward(Vec3::Z, Vec3::X, 10f32.to_radians());
        let angle = Vec3::Z.angle_between(turned).to_degrees();
        assert!((angle - 10.0).abs() < 1e-3);
        assert!(turned.x > 0.0);

        let left = turn_toward(Vec3::Z, Vec3::NEG_X, 10f32.to_radians());
        assert!(left.x < 0.0);

        let snapped = turn_toward(Vec3::Z, Vec3::new(0.1, 0.0, 1.0), 10f32.to_radians());
        assert!((snapped - Vec3::new(0.1, 0.0, 1.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_ray_sphere() {
        let hit = ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 5.0), 1.0);
        assert!((hit.unwrap() - 4.0).abs() < 1e-5);
        assert!(ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, 5.0), 1.0).is_none());
        assert!(ray_sphere(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 0.0, 5.0), 1.0).is_none());
        // Origin inside the sphere.
        assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_move_forward_follows_facing() {
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::X);
        body.move_forward(5.0);
        assert!((body.pose().position - Vec3::new(5.0 * DT, 0.0, 0.0)).length() < 1e-6);
    }

    // --- Transitions and policy ---

    #[test]
    fn test_initial_behaviors() {
        assert_eq!(agent(Archetype::Patrol).current_behavior_kind(), BehaviorKind::Patrol);
        assert_eq!(agent(Archetype::PatrolChase).current_behavior_kind(), BehaviorKind::Patrol);
        assert_eq!(agent(Archetype::Flee).current_behavior_kind(), BehaviorKind::Patrol);
        assert_eq!(agent(Archetype::Chase).current_behavior_kind(), BehaviorKind::Chase);
        assert_eq!(agent(Archetype::Ambush).current_behavior_kind(), BehaviorKind::Ambush);
    }

    #[test]
    fn test_same_kind_transition_is_noop() {
        let mut a = agent_with_route(Archetype::PatrolChase, vec![Vec3::X, Vec3::Z]);
        let before = a.behavior().clone();
        let cursor = a.route().cursor();

        let err = a.change_state(BehaviorKind::Patrol).unwrap_err();
        assert_eq!(err.reason, RejectReason::SameKind);
        assert_eq!(a.generation(), 0);
        assert_eq!(a.behavior(), &before);
        // Enter did not run again.
        assert_eq!(a.route().cursor(), cursor);
    }

    #[test]
    fn test_ambush_never_chases() {
        let mut a = agent(Archetype::Ambush);
        let err = a.change_state(BehaviorKind::Chase).unwrap_err();
        assert_eq!(err.reason, RejectReason::AmbushNeverChases);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Ambush);

        a.change_state(BehaviorKind::Attack).unwrap();
        let err = a.change_state(BehaviorKind::Chase).unwrap_err();
        assert_eq!(err.reason, RejectReason::AmbushNeverChases);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Attack);
    }

    #[test]
    fn test_fleeing_blocks_patrol() {
        let mut a = agent_with_route(Archetype::Flee, vec![Vec3::X]);
        assert_eq!(a.change_state(BehaviorKind::Flee), Ok(BehaviorKind::Patrol));
        assert!(a.is_fleeing());

        let err = a.change_state(BehaviorKind::Patrol).unwrap_err();
        assert_eq!(err.reason, RejectReason::StillFleeing);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Flee);
        assert_eq!(a.generation(), 1);
    }

    #[test]
    fn test_leaving_flee_for_chase_clears_fleeing() {
        let mut a = agent_with_route(Archetype::Flee, vec![Vec3::X]);
        a.change_state(BehaviorKind::Flee).unwrap();
        assert_eq!(a.change_state(BehaviorKind::Chase), Ok(BehaviorKind::Flee));
        assert!(!a.is_fleeing());

        // With no target, Chase hands off to Patrol on the next tick.
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();
        let report = tick(&mut a, &mut body, &world, &mut spawner, 0.0);

        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
        assert!(report.events.contains(&AiEvent::BehaviorChanged {
            agent: AGENT,
            from: BehaviorKind::Chase,
            to: BehaviorKind::Patrol,
        }));
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, AiEvent::TransitionRejected { .. })));
    }

    #[test]
    fn test_non_flee_lineage_may_leave_flee() {
        let mut a = agent(Archetype::PatrolChase);
        a.change_state(BehaviorKind::Flee).unwrap();
        assert!(a.change_state(BehaviorKind::Patrol).is_ok());
    }

    #[test]
    fn test_generation_counts_applied_transitions() {
        let mut a = agent(Archetype::Ambush);
        a.change_state(BehaviorKind::Attack).unwrap();
        let _ = a.change_state(BehaviorKind::Chase);
        a.change_state(BehaviorKind::Ambush).unwrap();
        assert_eq!(a.generation(), 2);
    }

    // --- Reactive loop ---

    #[test]
    fn test_patrol_advances_on_arrival() {
        let near = Vec3::new(0.0, 0.0, 0.5);
        let far = Vec3::new(0.0, 0.0, 10.0);
        let mut a = agent_with_route(Archetype::PatrolChase, vec![near, far]);
        assert_eq!(a.behavior(), &Behavior::Patrol { waypoint: Some(near) });

        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();
        tick(&mut a, &mut body, &world, &mut spawner, 0.0);

        assert_eq!(a.behavior(), &Behavior::Patrol { waypoint: Some(far) });
        assert!(body.pose.position.z > 0.0);
    }

    #[test]
    fn test_patrol_with_empty_route_stands_idle() {
        let mut a = agent(Archetype::PatrolChase);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();
        for i in 0..10 {
            tick(&mut a, &mut body, &world, &mut spawner, i as f32 * DT);
        }
        assert_eq!(body.pose.position, Vec3::ZERO);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
    }

    #[test]
    fn test_patrol_chase_sighting_starts_chase() {
        let mut a = agent_with_route(Archetype::PatrolChase, vec![Vec3::new(0.0, 0.0, 50.0)]);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 10.0), false);
        let mut spawner = FakeSpawner::default();

        let report = tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Chase);
        assert!(report.events.contains(&AiEvent::BehaviorChanged {
            agent: AGENT,
            from: BehaviorKind::Patrol,
            to: BehaviorKind::Chase,
        }));
        assert_eq!(a.target(), Some(PLAYER));
    }

    #[test]
    fn test_patrol_archetype_ignores_sighting() {
        let mut a = agent_with_route(Archetype::Patrol, vec![Vec3::new(0.0, 0.0, 50.0)]);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 10.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
    }

    #[test]
    fn test_flee_archetype_sighting_starts_flee() {
        let mut a = agent_with_route(Archetype::Flee, vec![Vec3::new(0.0, 0.0, 50.0)]);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 10.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Flee);
        assert!(a.is_fleeing());
    }

    #[test]
    fn test_hearing_forces_chase_from_behind() {
        let mut a = agent_with_route(Archetype::Patrol, vec![Vec3::new(0.0, 0.0, 50.0)]);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, -10.0), true);
        let mut spawner = FakeSpawner::default();

        let report = tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Chase);
        assert!(report.events.contains(&AiEvent::TargetHeard { agent: AGENT }));
        assert_eq!(a.last_heard(), Some(0.0));
    }

    #[test]
    fn test_patrol_hearing_and_loop_hearing_share_one_stamp() {
        let mut a = agent_with_route(Archetype::PatrolChase, vec![Vec3::new(0.0, 0.0, 50.0)]);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, -10.0), true);
        let mut spawner = FakeSpawner::default();

        let report = tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Chase);
        let heard = report
            .events
            .iter()
            .filter(|e| matches!(e, AiEvent::TargetHeard { .. }))
            .count();
        assert_eq!(heard, 1);
        assert_eq!(a.last_heard(), Some(0.0));
    }

    #[test]
    fn test_hearing_forces_flee_for_flee_lineage() {
        let mut a = agent_with_route(Archetype::Flee, vec![Vec3::new(0.0, 0.0, 50.0)]);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, -10.0), true);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Flee);
    }

    #[test]
    fn test_ambush_hearing_rejected() {
        let mut a = agent(Archetype::Ambush);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, -5.0), true);
        let mut spawner = FakeSpawner::default();

        let report = tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Ambush);
        assert!(report.events.contains(&AiEvent::TransitionRejected {
            agent: AGENT,
            requested: BehaviorKind::Chase,
            reason: RejectReason::AmbushNeverChases,
        }));
    }

    #[test]
    fn test_ambush_outside_range_stays() {
        let mut a = agent(Archetype::Ambush);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 15.0), false);
        let mut spawner = FakeSpawner::default();

        for i in 0..20 {
            tick(&mut a, &mut body, &world, &mut spawner, i as f32 * DT);
        }
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Ambush);
        assert!(spawner.shots.is_empty());
        assert_eq!(body.pose.position, Vec3::ZERO);
    }

    #[test]
    fn test_ambush_inside_range_attacks() {
        let mut a = agent(Archetype::Ambush);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 8.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Attack);

        tick(&mut a, &mut body, &world, &mut spawner, DT);
        assert_eq!(spawner.shots.len(), 1);
        let (shooter, origin, direction) = spawner.shots[0];
        assert_eq!(shooter, AGENT);
        assert!((origin - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-5);
        assert!((direction - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_attack_waits_for_alignment() {
        let mut a = agent(Archetype::Ambush);
        a.change_state(BehaviorKind::Attack).unwrap();
        let target = Vec3::new(8.0 * 40f32.to_radians().sin(), 0.0, 8.0 * 40f32.to_radians().cos());
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(target, false);
        let mut spawner = FakeSpawner::default();

        let mut now = 0.0;
        for _ in 0..30 {
            let before = spawner.shots.len();
            tick(&mut a, &mut body, &world, &mut spawner, now);
            if spawner.shots.len() > before {
                assert!(body.pose.alignment_with(target) > 0.95);
            } else {
                assert!(now < a.next_fire_at() || body.pose.alignment_with(target) <= 0.95);
            }
            now += DT;
        }
        assert_eq!(spawner.shots.len(), 1);
        // First tick turns 3.6 degrees from 40: still far off.
        assert!(a.next_fire_at() > 0.0);
    }

    #[test]
    fn test_attack_gives_up_after_grace() {
        let mut a = agent(Archetype::Ambush);
        a.change_state(BehaviorKind::Attack).unwrap();
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 8.0), false)
            .wall(Vec3::new(0.0, 0.0, 4.0), 1.0);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        tick(&mut a, &mut body, &world, &mut spawner, 1.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Attack);
        tick(&mut a, &mut body, &world, &mut spawner, 2.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Ambush);
        assert!(spawner.shots.is_empty());
    }

    #[test]
    fn test_attack_grace_resets_on_sight() {
        let mut a = agent(Archetype::Ambush);
        a.change_state(BehaviorKind::Attack).unwrap();
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let blocked = FakeWorld::with_player(Vec3::new(0.0, 0.0, 8.0), false)
            .wall(Vec3::new(0.0, 0.0, 4.0), 1.0);
        let clear = FakeWorld::with_player(Vec3::new(0.0, 0.0, 8.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &blocked, &mut spawner, 0.0);
        tick(&mut a, &mut body, &clear, &mut spawner, 1.5);
        tick(&mut a, &mut body, &blocked, &mut spawner, 1.6);
        tick(&mut a, &mut body, &blocked, &mut spawner, 2.5);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Attack);
        tick(&mut a, &mut body, &blocked, &mut spawner, 4.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Ambush);
    }

    #[test]
    fn test_attack_without_target_returns_to_ambush() {
        let mut a = agent(Archetype::Ambush);
        a.change_state(BehaviorKind::Attack).unwrap();
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Ambush);
    }

    #[test]
    fn test_chase_moves_and_fires_when_aligned() {
        let mut a = agent(Archetype::Chase);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 12.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Chase);
        assert!((body.pose.position.z - 6.0 * DT).abs() < 1e-5);
        assert_eq!(spawner.shots.len(), 1);

        tick(&mut a, &mut body, &world, &mut spawner, DT);
        assert_eq!(spawner.shots.len(), 1, "cooldown holds the second shot");
        tick(&mut a, &mut body, &world, &mut spawner, 1.5);
        assert_eq!(spawner.shots.len(), 2);
    }

    #[test]
    fn test_chase_shortcut_needs_alignment() {
        let mut a = agent(Archetype::Chase);
        // 45 degrees off: visible but cos(45) < 0.9 even after one 3.6 degree turn.
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(8.0, 0.0, 8.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Chase);
        assert!(spawner.shots.is_empty());
    }

    #[test]
    fn test_unarmed_agent_never_fires() {
        let mut config = AgentConfig::for_archetype(Archetype::Chase);
        config.weapon = None;
        let mut a = Agent::new(AGENT, config, PatrolRoute::default());
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 10.0), false);
        let mut spawner = FakeSpawner::default();

        for i in 0..100 {
            tick(&mut a, &mut body, &world, &mut spawner, i as f32 * DT);
        }
        assert!(spawner.shots.is_empty());
    }

    #[test]
    fn test_chase_loses_target_to_patrol() {
        let mut a = agent(Archetype::Chase);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, -12.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
    }

    #[test]
    fn test_chase_holds_while_audible() {
        let mut a = agent(Archetype::Chase);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, -12.0), true);
        let mut spawner = FakeSpawner::default();

        for i in 0..5 {
            tick(&mut a, &mut body, &world, &mut spawner, i as f32 * DT);
        }
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Chase);
        assert!(body.pose.position.z < 0.0);
    }

    #[test]
    fn test_chase_without_target_patrols() {
        let mut a = agent(Archetype::Chase);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
        assert_eq!(a.target(), None);
    }

    #[test]
    fn test_flee_gains_distance_then_patrols() {
        let mut a = agent_with_route(Archetype::Flee, vec![Vec3::new(30.0, 0.0, 0.0)]);
        a.change_state(BehaviorKind::Flee).unwrap();
        let player = Vec3::new(0.0, 0.0, 10.0);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let mut world = FakeWorld::with_player(player, false);
        let mut spawner = FakeSpawner::default();

        let before = body.pose.position.distance(player);
        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        let after = body.pose.position.distance(player);
        assert!(after > before);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Flee);

        // Threat now at the safe distance.
        world.move_player(body.pose.position + Vec3::new(0.0, 0.0, 15.0));
        tick(&mut a, &mut body, &world, &mut spawner, DT);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
        assert!(!a.is_fleeing());
    }

    #[test]
    fn test_flee_keeps_running_until_safe() {
        let mut a = agent_with_route(Archetype::Flee, vec![Vec3::new(30.0, 0.0, 0.0)]);
        a.change_state(BehaviorKind::Flee).unwrap();
        let player = Vec3::new(0.0, 0.0, 10.0);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(player, false);
        let mut spawner = FakeSpawner::default();

        let mut now = 0.0;
        let mut last = body.pose.position.distance(player);
        while a.current_behavior_kind() == BehaviorKind::Flee {
            tick(&mut a, &mut body, &world, &mut spawner, now);
            let distance = body.pose.position.distance(player);
            if a.current_behavior_kind() == BehaviorKind::Flee {
                assert!(distance > last);
            }
            last = distance;
            now += DT;
            assert!(now < 5.0, "never reached safety");
        }
        assert!(last >= 15.0);
        assert!(!a.is_fleeing());
    }

    #[test]
    fn test_flee_strafes_around_blocked_retreat() {
        let mut a = agent(Archetype::Flee);
        a.change_state(BehaviorKind::Flee).unwrap();
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 5.0), false)
            .wall(Vec3::new(0.0, 0.0, -2.0), 1.0);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        match a.behavior() {
            Behavior::Flee {
                destination: Some(point),
                ..
            } => assert!((*point - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4),
            other => panic!("unexpected behavior {other:?}"),
        }
        assert!(body.pose.position.x > 0.0);
    }

    #[test]
    fn test_flee_holds_when_boxed_in() {
        let mut a = agent(Archetype::Flee);
        a.change_state(BehaviorKind::Flee).unwrap();
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 5.0), false)
            .wall(Vec3::new(0.0, 0.0, -2.0), 1.0)
            .wall(Vec3::new(2.0, 0.0, 0.0), 1.0)
            .wall(Vec3::new(-2.0, 0.0, 0.0), 1.0);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(body.pose.position, Vec3::ZERO);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Flee);
    }

    #[test]
    fn test_flee_without_target_returns_to_patrol() {
        let mut a = agent(Archetype::Flee);
        a.change_state(BehaviorKind::Flee).unwrap();
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.current_behavior_kind(), BehaviorKind::Patrol);
        assert!(!a.is_fleeing());
    }

    #[test]
    fn test_restart_patrol_heads_for_first_waypoint() {
        let first = Vec3::new(0.0, 0.0, 20.0);
        let second = Vec3::new(20.0, 0.0, 20.0);
        let mut a = agent_with_route(Archetype::Patrol, vec![first, second]);
        a.route_mut().next_waypoint();
        a.restart_patrol();

        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let world = FakeWorld::default();
        let mut spawner = FakeSpawner::default();
        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.behavior(), &Behavior::Patrol { waypoint: Some(first) });
        assert_eq!(a.route().cursor(), 1);
    }

    #[test]
    fn test_one_behavior_and_generation_track_events() {
        let mut a = agent_with_route(
            Archetype::PatrolChase,
            vec![Vec3::new(0.0, 0.0, 20.0), Vec3::new(20.0, 0.0, 0.0)],
        );
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let mut world = FakeWorld::with_player(Vec3::new(30.0, 0.0, 30.0), true)
            .wall(Vec3::new(5.0, 0.0, 5.0), 1.0);
        let mut spawner = FakeSpawner::default();

        let mut changes = 0;
        let mut now = 0.0;
        for i in 0..400 {
            let angle = i as f32 * 0.02;
            world.move_player(Vec3::new(12.0 * angle.cos(), 0.0, 12.0 * angle.sin()));
            let report = tick(&mut a, &mut body, &world, &mut spawner, now);
            changes += report
                .events
                .iter()
                .filter(|e| matches!(e, AiEvent::BehaviorChanged { .. }))
                .count();
            assert_eq!(a.behavior().kind(), a.current_behavior_kind());
            now += DT;
        }
        assert_eq!(a.generation(), changes as u64);
    }

    #[test]
    fn test_target_dropped_when_unresolvable() {
        let mut a = agent(Archetype::Chase);
        let mut body = FakeBody::at(Vec3::ZERO, Vec3::Z);
        let mut world = FakeWorld::with_player(Vec3::new(0.0, 0.0, 10.0), false);
        let mut spawner = FakeSpawner::default();

        tick(&mut a, &mut body, &world, &mut spawner, 0.0);
        assert_eq!(a.target(), Some(PLAYER));

        world.player = None;
        tick(&mut a, &mut body, &world, &mut spawner, DT);
        assert_eq!(a.target(), None);
    }
}
