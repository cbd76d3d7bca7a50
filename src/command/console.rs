//! Console command grammar
//!
//! Anything that does not parse here is treated by the binary as a natural
//! language order for the LLM.

use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_till1};
use nom::character::complete::{space0, space1};
use nom::combinator::{all_consuming, map, opt, rest, value, verify};
use nom::sequence::{preceded, terminated};
use nom::{IResult, Parser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Tick,
    Run(u32),
    Status,
    Report { npc: String },
    Assign { npc: String, task: String },
    Submit { npc: String },
    Talk { npc: String, message: String },
    /// Talk to whoever stands closest to the mayor
    Say { message: String },
    Treasury,
    Merchants,
    /// Order menu for one villager, or the task list
    Tasks { npc: Option<String> },
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  tick / t                 - Advance the simulation by one tick
  run <n>                  - Run n ticks
  status / s               - Show every villager
  report <npc>             - Production report for a villager
  assign <npc> <task>      - Hand a task to a villager
  submit <npc>             - Villager hands earnings to the treasury
  talk <npc> <message>     - Talk to a villager
  say <message>            - Talk to the nearest villager
  tasks [npc]              - Show the order menu
  treasury                 - Show treasury gold
  merchants                - Show merchant ledgers
  help                     - Show this list
  quit / q                 - Exit";

/// Parse one console line. `None` means the line is not a console command.
pub fn parse_console_command(input: &str) -> Option<ConsoleCommand> {
    all_consuming(terminated(command, space0))
        .parse(input.trim())
        .ok()
        .map(|(_, cmd)| cmd)
}

fn command(input: &str) -> IResult<&str, ConsoleCommand> {
    alt((
        run,
        report,
        assign,
        submit,
        talk,
        say,
        tasks,
        value(ConsoleCommand::Treasury, tag_no_case("treasury")),
        value(ConsoleCommand::Merchants, tag_no_case("merchants")),
        value(ConsoleCommand::Status, alt((tag_no_case("status"), tag_no_case("s")))),
        value(ConsoleCommand::Tick, alt((tag_no_case("tick"), tag_no_case("t")))),
        value(ConsoleCommand::Help, alt((tag_no_case("help"), tag_no_case("?")))),
        value(
            ConsoleCommand::Quit,
            alt((tag_no_case("quit"), tag_no_case("exit"), tag_no_case("q"))),
        ),
    ))
    .parse(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace()).parse(input)
}

/// Remainder of the line, which must not be blank
fn text(input: &str) -> IResult<&str, String> {
    map(verify(rest, |s: &str| !s.trim().is_empty()), |s: &str| {
        s.trim().to_string()
    })
    .parse(input)
}

fn npc_arg<'a>(keyword: &'static str) -> impl Parser<&'a str, Output = String, Error = nom::error::Error<&'a str>> {
    map(preceded((tag_no_case(keyword), space1), word), str::to_string)
}

fn run(input: &str) -> IResult<&str, ConsoleCommand> {
    map(
        preceded((tag_no_case("run"), space1), nom::character::complete::u32),
        ConsoleCommand::Run,
    )
    .parse(input)
}

fn report(input: &str) -> IResult<&str, ConsoleCommand> {
    map(npc_arg("report"), |npc| ConsoleCommand::Report { npc }).parse(input)
}

fn submit(input: &str) -> IResult<&str, ConsoleCommand> {
    map(npc_arg("submit"), |npc| ConsoleCommand::Submit { npc }).parse(input)
}

fn assign(input: &str) -> IResult<&str, ConsoleCommand> {
    map((npc_arg("assign"), preceded(space1, text)), |(npc, task)| {
        ConsoleCommand::Assign { npc, task }
    })
    .parse(input)
}

fn talk(input: &str) -> IResult<&str, ConsoleCommand> {
    map((npc_arg("talk"), preceded(space1, text)), |(npc, message)| {
        ConsoleCommand::Talk { npc, message }
    })
    .parse(input)
}

fn say(input: &str) -> IResult<&str, ConsoleCommand> {
    map(preceded((tag_no_case("say"), space1), text), |message| {
        ConsoleCommand::Say { message }
    })
    .parse(input)
}

fn tasks(input: &str) -> IResult<&str, ConsoleCommand> {
    map(
        preceded(tag_no_case("tasks"), opt(preceded(space1, word))),
        |npc: Option<&str>| ConsoleCommand::Tasks {
            npc: npc.map(str::to_string),
        },
    )
    .parse(input)
}
