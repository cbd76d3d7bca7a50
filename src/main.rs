//! Village Sim - Entry Point
//!
//! Loads a scenario, then either runs a fixed number of ticks headless or
//! opens a console where the mayor advances time, hands out tasks, collects
//! taxes and talks to villagers.

use std::io::{self, Write};
use std::path::PathBuf;

use ahash::AHashMap;
use clap::Parser;
use tokio::runtime::Runtime;

use village_sim::command::console::{parse_console_command, ConsoleCommand, HELP};
use village_sim::command::CommandExecutor;
use village_sim::core::config::SimulationConfig;
use village_sim::core::error::{Result, VillageError};
use village_sim::core::types::NpcId;
use village_sim::dialogue::ScriptedDialogue;
use village_sim::ecs::world::World;
use village_sim::entity::tasks::{available_tasks, TaskKind};
use village_sim::entity::Assignment;
use village_sim::llm::client::LlmClient;
use village_sim::llm::context::VillageContext;
use village_sim::llm::conversation::NpcConversation;
use village_sim::llm::parser::parse_order;
use village_sim::simulation::events::VillageEvent;
use village_sim::simulation::tick::run_simulation_tick;
use village_sim::world::load_scenario;

/// Village simulation with mayor-issued tasks
#[derive(Parser, Debug)]
#[command(name = "village-sim")]
#[command(about = "Run a village of working NPCs and hand them orders")]
struct Args {
    /// Scenario file (TOML)
    #[arg(long, default_value = "data/village.toml")]
    scenario: PathBuf,

    /// Simulation config file (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run this many ticks without the console, then print a summary
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("village_sim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let world = load_scenario(&args.scenario, config)?;
    tracing::info!(scenario = %args.scenario.display(), "Village Sim starting...");

    if let Some(ticks) = args.ticks {
        run_headless(world, ticks);
        return Ok(());
    }

    // Create the async runtime for LLM calls
    let runtime = Runtime::new()?;

    // Optional - the console works without a model
    let llm = match LlmClient::from_env() {
        Ok(client) => match runtime.block_on(client.probe()) {
            Ok(()) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "LLM backend unreachable - natural language orders disabled");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "running without natural language orders");
            None
        }
    };

    let mut session = Session {
        world,
        llm,
        runtime,
        scripted: AHashMap::new(),
        conversations: AHashMap::new(),
    };
    session.run()?;
    Ok(())
}

fn run_headless(mut world: World, ticks: u64) {
    for _ in 0..ticks {
        for event in run_simulation_tick(&mut world) {
            if !event.is_noise() {
                println!("[tick {}] {}", world.current_tick, event);
            }
        }
    }
    println!();
    display_status(&world);
    println!("Treasury: {} gold", world.treasury.gold());
}

struct Session {
    world: World,
    llm: Option<LlmClient>,
    runtime: Runtime,
    scripted: AHashMap<NpcId, ScriptedDialogue>,
    conversations: AHashMap<NpcId, NpcConversation>,
}

impl Session {
    fn run(&mut self) -> Result<()> {
        println!("\n=== VILLAGE SIM ===");
        println!("{HELP}");
        if self.llm.is_some() {
            println!("  <any text>               - Natural language order (parsed by LLM)");
        }
        println!();

        loop {
            print!("[{:?} | day {}]> ", self.world.calendar.period(), self.world.calendar.current_day());
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match parse_console_command(input) {
                Some(ConsoleCommand::Quit) => break,
                Some(command) => self.handle(command),
                None => self.natural_language_order(input),
            }
        }

        println!(
            "\nGoodbye! {} villagers, {} ticks elapsed, {} gold in the treasury.",
            self.world.entity_count(),
            self.world.current_tick,
            self.world.treasury.gold()
        );
        Ok(())
    }

    fn handle(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::Tick => {
                self.advance(1);
                println!("Tick {} complete.", self.world.current_tick);
            }
            ConsoleCommand::Run(n) => {
                println!("Running {} ticks...", n);
                self.advance(n);
                println!("Completed {} ticks. Now at tick {}.", n, self.world.current_tick);
            }
            ConsoleCommand::Status => display_status(&self.world),
            ConsoleCommand::Report { npc } => {
                if let Some(id) = self.lookup(&npc) {
                    if let Ok(report) = self.world.task_report(id) {
                        println!("{report}");
                    }
                }
            }
            ConsoleCommand::Assign { npc, task } => {
                let Some(id) = self.lookup(&npc) else { return };
                match self.world.assign_task_named(id, &task) {
                    Ok(Assignment::Started(task)) => println!("{npc} started {task}."),
                    Ok(Assignment::Queued { task, position }) => {
                        println!("{npc} will {task} next (position {position} in line).")
                    }
                    Err(e) => println!("{e}. Known tasks: {}", task_names()),
                }
            }
            ConsoleCommand::Submit { npc } => {
                let Some(id) = self.lookup(&npc) else { return };
                match self.world.submit_to_treasury(id) {
                    Ok(0) => println!("{npc} has nothing to submit."),
                    Ok(amount) => println!(
                        "{npc} submitted {amount} gold. Treasury: {} gold.",
                        self.world.treasury.gold()
                    ),
                    Err(e) => println!("{e}"),
                }
            }
            ConsoleCommand::Talk { npc, message } => {
                let Some(id) = self.lookup(&npc) else { return };
                let reply = self.talk(id, &message);
                println!("{npc}: {reply}");
            }
            ConsoleCommand::Say { message } => {
                let radius = self.world.config.interaction_radius;
                let Some(id) = self.world.nearest_npc_to_mayor(radius) else {
                    println!("Nobody is within {radius} of the mayor.");
                    return;
                };
                let name = self.world.npc(id).map(|npc| npc.name.clone()).unwrap_or_default();
                let reply = self.talk(id, &message);
                println!("{name}: {reply}");
            }
            ConsoleCommand::Treasury => println!("Treasury: {} gold", self.world.treasury.gold()),
            ConsoleCommand::Merchants => {
                for merchant in &self.world.merchants {
                    println!("{}\n", merchant.info());
                }
            }
            ConsoleCommand::Tasks { npc: None } => println!("Tasks: {}", task_names()),
            ConsoleCommand::Tasks { npc: Some(npc) } => {
                let Some(id) = self.lookup(&npc) else { return };
                if let Some(villager) = self.world.npc(id) {
                    println!("Orders for {} ({}):", villager.name, villager.npc_type);
                    for (i, action) in available_tasks(villager.npc_type).iter().enumerate() {
                        println!("  {}. {}", i + 1, action.label());
                    }
                }
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => {}
        }
    }

    fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            for event in run_simulation_tick(&mut self.world) {
                if announce(&event) {
                    println!("  {event}");
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<NpcId> {
        let id = self.world.npc_by_name(name).map(|npc| npc.id);
        if id.is_none() {
            println!("{}", VillageError::NpcNotFound(name.to_string()));
        }
        id
    }

    fn talk(&mut self, id: NpcId, message: &str) -> String {
        let Some(npc) = self.world.npc(id) else {
            return "...".to_string();
        };

        match &self.llm {
            Some(client) => {
                let conversation = self
                    .conversations
                    .entry(id)
                    .or_insert_with(|| NpcConversation::new(&npc.name, npc.npc_type, npc.persona.as_deref()));
                let rng = &mut self.world.rng;
                self.runtime
                    .block_on(conversation.respond(Some(client), message, rng))
            }
            None => {
                let dialogue = self
                    .scripted
                    .entry(id)
                    .or_insert_with(|| ScriptedDialogue::new(&npc.name, npc.npc_type));
                dialogue.respond(message, &mut self.world.rng)
            }
        }
    }

    fn natural_language_order(&mut self, input: &str) {
        let Some(client) = &self.llm else {
            println!("Unknown command. Type 'help' for the list.");
            return;
        };

        let context = VillageContext::from_world(&self.world);
        let order = match self.runtime.block_on(parse_order(client, input, &context)) {
            Ok(order) => order,
            Err(e) => {
                println!("Could not parse order: {e}");
                return;
            }
        };

        println!();
        println!("Parsed Order:");
        println!("  Action: {:?}", order.action);
        if let Some(task) = &order.task {
            println!("  Task: {task}");
        }
        if let Some(subjects) = &order.subjects {
            println!("  Subjects: {subjects:?}");
        }
        println!("  Confidence: {:.0}%", order.confidence * 100.0);

        let result = CommandExecutor::execute(&mut self.world, &order);
        for message in &result.messages {
            println!("{message}");
        }
        if let Some(error) = &result.error {
            println!("Order failed: {error}");
        }
    }
}

/// Events worth printing while ticks run in the console
fn announce(event: &VillageEvent) -> bool {
    matches!(
        event,
        VillageEvent::TaskCompleted { .. }
            | VillageEvent::ResumedWork { .. }
            | VillageEvent::SaleCompleted { .. }
            | VillageEvent::SaleRejected { .. }
            | VillageEvent::DayStarted { .. }
    )
}

fn task_names() -> String {
    TaskKind::ALL
        .iter()
        .map(|t| t.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_status(world: &World) {
    println!(
        "--- Tick {} | Day {} ({:?}) | Villagers: {} ---",
        world.current_tick,
        world.calendar.current_day(),
        world.calendar.period(),
        world.entity_count()
    );
    for npc in world.npcs() {
        println!("  {}", npc.status_line());
    }
}
