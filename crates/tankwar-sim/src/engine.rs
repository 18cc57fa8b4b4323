//! Simulation engine: the headless arena.
//!
//! `SimulationEngine` owns the hecs ECS world and the agent registry,
//! processes queued commands, runs all systems, and produces
//! `ArenaSnapshot`s. Fully deterministic for a given seed and command stream.

use std::collections::VecDeque;

use glam::Vec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tankwar_ai::Agent;
use tankwar_core::commands::SimCommand;
use tankwar_core::components::{Collider, Health, Player, PlayerControl};
use tankwar_core::config::{AgentSpawn, LevelConfig, ObstacleSpawn};
use tankwar_core::constants::{MUZZLE_OFFSET, PROJECTILE_DAMAGE, PROJECTILE_SPEED, TICK_RATE};
use tankwar_core::enums::BehaviorKind;
use tankwar_core::events::AiEvent;
use tankwar_core::state::ArenaSnapshot;
use tankwar_core::types::{AgentId, ObjectId, Pose, SimTime};

use crate::arena::{ArenaView, ShotRequest};
use crate::error::CommandError;
use crate::registry::AgentRegistry;
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Fixed ticks per simulated second.
    pub tick_rate: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: TICK_RATE,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    registry: AgentRegistry,
    time: SimTime,
    dt: f32,
    paused: bool,
    rng: ChaCha8Rng,
    next_object_id: u32,
    player_spawns: Vec<Vec3>,
    command_queue: VecDeque<SimCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<AiEvent>,
}

impl SimulationEngine {
    /// Create an empty arena with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            registry: AgentRegistry::default(),
            time: SimTime::default(),
            dt: 1.0 / config.tick_rate.max(1) as f32,
            paused: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_object_id: 1,
            player_spawns: Vec::new(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Build an engine and load a level in one step.
    pub fn from_level(config: SimConfig, level: &LevelConfig) -> Self {
        let mut engine = Self::new(config);
        engine.load_level(level);
        engine
    }

    /// Reset the arena and populate it from a level.
    ///
    /// The player spawns at the first listed spawn point, if there is one.
    pub fn load_level(&mut self, level: &LevelConfig) {
        self.world.clear();
        self.registry.clear();
        self.time = SimTime::default();
        self.paused = false;
        self.next_object_id = 1;
        self.command_queue.clear();
        self.events.clear();
        if let Some(seed) = level.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        self.player_spawns = level.player_spawns.clone();

        for obstacle in &level.obstacles {
            self.spawn_obstacle(obstacle);
        }
        for spawn in &level.agents {
            self.spawn_agent(spawn);
        }
        if let Some(position) = level.player_spawns.first().copied() {
            self.spawn_player(Some(position));
        }
        tracing::info!(
            agents = self.registry.len(),
            obstacles = level.obstacles.len(),
            "level loaded"
        );
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> ArenaSnapshot {
        self.process_commands();

        if !self.paused {
            self.run_systems();
            self.time.advance(self.dt);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.paused, events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Borrow an agent's brain.
    pub fn agent(&self, id: AgentId) -> Option<hecs::Ref<'_, Agent>> {
        let entity = self.registry.get(id)?;
        self.world.get::<&Agent>(entity).ok()
    }

    pub fn agent_pose(&self, id: AgentId) -> Option<Pose> {
        let entity = self.registry.get(id)?;
        self.world.get::<&Pose>(entity).ok().map(|pose| *pose)
    }

    pub fn player_id(&self) -> Option<ObjectId> {
        self.player_entity()
            .and_then(|entity| self.world.get::<&Collider>(entity).ok().map(|c| c.id))
    }

    pub fn player_pose(&self) -> Option<Pose> {
        self.player_entity()
            .and_then(|entity| self.world.get::<&Pose>(entity).ok().map(|pose| *pose))
    }

    // --- Registry queries ---

    /// Agent closest to `position`. Ties go to the lower id.
    pub fn nearest_agent(&self, position: Vec3) -> Option<AgentId> {
        self.registry
            .iter()
            .filter_map(|(id, entity)| {
                let pose = self.world.get::<&Pose>(entity).ok()?;
                Some((id, pose.position.distance_squared(position)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Agent with the most remaining health. Ties go to the lower id.
    pub fn strongest_agent(&self) -> Option<AgentId> {
        self.registry
            .iter()
            .filter_map(|(id, entity)| {
                let health = self.world.get::<&Health>(entity).ok()?;
                Some((id, health.current))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(id, _)| id)
    }

    /// Agents currently in Chase, in id order.
    pub fn chasing_agents(&self) -> Vec<AgentId> {
        self.registry
            .iter()
            .filter(|(_, entity)| {
                self.world
                    .get::<&Agent>(*entity)
                    .map(|agent| agent.current_behavior_kind() == BehaviorKind::Chase)
                    .unwrap_or(false)
            })
            .map(|(id, _)| id)
            .collect()
    }

    // --- Spawning ---

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    pub fn spawn_obstacle(&mut self, obstacle: &ObstacleSpawn) -> ObjectId {
        let id = self.allocate_id();
        world_setup::spawn_obstacle(&mut self.world, id, obstacle);
        id
    }

    /// Spawn and register an AI tank.
    pub fn spawn_agent(&mut self, spawn: &AgentSpawn) -> AgentId {
        let id = self.allocate_id();
        let entity = world_setup::spawn_agent(&mut self.world, id, spawn);
        self.registry.register(id, entity);
        tracing::info!(
            agent = %id,
            archetype = ?spawn.config.archetype,
            position = ?spawn.position,
            "agent spawned"
        );
        id
    }

    /// Spawn the player, replacing any existing one. Picks a spawn point when none is given.
    pub fn spawn_player(&mut self, position: Option<Vec3>) -> ObjectId {
        if let Some(existing) = self.player_entity() {
            let _ = self.world.despawn(existing);
        }
        let position = match position {
            Some(position) => position,
            None => world_setup::pick_spawn_point(&mut self.rng, &self.player_spawns),
        };
        let id = self.allocate_id();
        world_setup::spawn_player(&mut self.world, id, position);
        tracing::info!(player = %id, ?position, "player spawned");
        self.events.push(AiEvent::PlayerSpawned { position });
        id
    }

    /// Remove an agent from the registry and the world.
    pub fn despawn_agent(&mut self, id: AgentId) -> Result<(), CommandError> {
        let entity = self
            .registry
            .unregister(id)
            .ok_or(CommandError::UnknownAgent(id))?;
        let _ = self.world.despawn(entity);
        tracing::info!(agent = %id, "agent despawned");
        Ok(())
    }

    fn player_entity(&self) -> Option<Entity> {
        self.world
            .query::<&Player>()
            .iter()
            .next()
            .map(|(entity, _)| entity)
    }

    fn agent_entity(&self, id: AgentId) -> Result<Entity, CommandError> {
        self.registry.get(id).ok_or(CommandError::UnknownAgent(id))
    }

    fn agent_mut(&mut self, id: AgentId) -> Result<hecs::RefMut<'_, Agent>, CommandError> {
        let entity = self.agent_entity(id)?;
        self.world
            .get::<&mut Agent>(entity)
            .map_err(|_| CommandError::UnknownAgent(id))
    }

    // --- Commands ---

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                tracing::warn!(%err, "command dropped");
            }
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand) -> Result<(), CommandError> {
        match command {
            SimCommand::SetPlayerVelocity { velocity } => {
                let entity = self.player_entity().ok_or(CommandError::NoPlayer)?;
                if let Ok(mut control) = self.world.get::<&mut PlayerControl>(entity) {
                    control.velocity = velocity;
                }
            }
            SimCommand::PlayerFire => {
                let entity = self.player_entity().ok_or(CommandError::NoPlayer)?;
                self.player_fire(entity);
            }
            SimCommand::SpawnPlayer { position } => {
                self.spawn_player(position);
            }
            SimCommand::ForceBehavior { agent, kind } => {
                let result = self.agent_mut(agent)?.change_state(kind);
                match result {
                    Ok(from) => self.events.push(AiEvent::BehaviorChanged {
                        agent,
                        from,
                        to: kind,
                    }),
                    Err(rejected) => {
                        self.events.push(AiEvent::TransitionRejected {
                            agent,
                            requested: kind,
                            reason: rejected.reason,
                        });
                        return Err(rejected.into());
                    }
                }
            }
            SimCommand::SetPatrolRoute {
                agent,
                waypoints,
                looping,
            } => {
                if waypoints.is_empty() {
                    return Err(CommandError::EmptyRoute(agent));
                }
                let mut brain = self.agent_mut(agent)?;
                brain.route_mut().replace(waypoints, looping);
                brain.restart_patrol();
            }
            SimCommand::AppendWaypoint { agent, waypoint } => {
                self.agent_mut(agent)?.route_mut().push(waypoint);
            }
            SimCommand::RestartPatrol { agent } => {
                self.agent_mut(agent)?.restart_patrol();
            }
            SimCommand::DespawnAgent { agent } => {
                self.despawn_agent(agent)?;
            }
            SimCommand::Pause => {
                self.paused = true;
            }
            SimCommand::Resume => {
                self.paused = false;
            }
        }
        Ok(())
    }

    fn player_fire(&mut self, entity: Entity) {
        let now = self.time.elapsed_secs;
        let (Ok(pose), Ok(collider)) = (
            self.world.get::<&Pose>(entity).map(|p| *p),
            self.world.get::<&Collider>(entity).map(|c| *c),
        ) else {
            return;
        };
        if let Ok(mut control) = self.world.get::<&mut PlayerControl>(entity) {
            control.last_fired_secs = Some(now);
        }
        let shot = ShotRequest {
            shooter: collider.id,
            origin: pose.position + pose.forward * MUZZLE_OFFSET,
            direction: pose.forward,
            speed: PROJECTILE_SPEED,
            damage: PROJECTILE_DAMAGE,
        };
        world_setup::spawn_projectile(&mut self.world, &shot, now);
        tracing::debug!(player = %collider.id, "player fired");
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now = self.time.elapsed_secs;

        // 1. Player movement
        let view = ArenaView::capture(&self.world, now);
        systems::movement::run(&mut self.world, &view, self.dt);

        // 2. Agents: perceive, decide, steer, request shots
        let view = ArenaView::capture(&self.world, now);
        let shots = systems::agents::run(
            &mut self.world,
            &view,
            &self.registry,
            now,
            self.dt,
            &mut self.events,
        );
        for shot in &shots {
            world_setup::spawn_projectile(&mut self.world, shot, now);
        }

        // 3. Projectiles: fly, hit, expire
        let view = ArenaView::capture(&self.world, now);
        systems::projectiles::run(&mut self.world, &view, now, self.dt, &mut self.events);

        // 4. Cleanup (spent shells, destroyed tanks)
        systems::cleanup::run(
            &mut self.world,
            &mut self.registry,
            &mut self.despawn_buffer,
            &mut self.events,
        );
    }
}
