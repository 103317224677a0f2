//! The demo's subcommands.

use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use subcmd::{
    params_from_yaml, BoxError, Cmd, Commands, Context, CustomValue, DefaultValue, Kind, Map,
    Param, Prefixer, Rest, RunError, Subcmd, UsageError,
};
use tracing::debug;

use crate::roster::{Employee, Roster};

const WAIT_PARAMS: &str = r#"
- name: -delay
  kind: duration
  default: 1s
  doc: how long to `pause`
- name: label?
  kind: string
  default: done
  doc: printed when the pause is over
"#;

/// Prefix of executables that extend the demo, e.g. `subcmd-demo-report`.
pub const EXTENSION_PREFIX: &str = "subcmd-demo-";

/// The top-level command.
///
/// Serialized into the environment of extension executables, which can read
/// it back with `subcmd::parse_env::<App>()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct App {
    pub roster_file: Option<PathBuf>,
    #[serde(skip)]
    wait_params: Vec<Param>,
}

impl App {
    pub fn new(roster_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let wait_params = params_from_yaml(WAIT_PARAMS).context("loading wait parameters")?;
        Ok(Self {
            roster_file,
            wait_params,
        })
    }
}

impl Cmd for App {
    fn subcmds(&self) -> Map {
        Commands::new()
            .command(
                "list",
                "list employees",
                list,
                vec![
                    Param::flag("managers", Kind::Bool).doc("only managers"),
                    Param::flag("reverse", Kind::Bool).doc("reverse name order"),
                ],
            )
            .command(
                "add",
                "add an employee",
                add,
                vec![
                    Param::flag("manager", Kind::Bool).doc("mark as a manager"),
                    Param::flag("title", Kind::String)
                        .default("engineer")
                        .doc("job `title`"),
                    Param::positional("name", Kind::String),
                ],
            )
            .command(
                "show",
                "show one employee",
                show,
                vec![Param::positional("name", Kind::String)],
            )
            .command(
                "tag",
                "tag an employee",
                tag,
                vec![
                    Param::flag("tags", Kind::Custom)
                        .default(DefaultValue::custom(Tags::default()))
                        .doc("comma-separated `tags`, repeatable"),
                    Param::positional("name", Kind::String),
                ],
            )
            .subcmd(
                "wait",
                Subcmd::new("pause before exiting")
                    .handler(wait)
                    .params(self.wait_params.clone()),
            )
            .command("team", "team-wide queries", team, vec![])
            .build()
    }

    fn prefixer(&self) -> Option<&dyn Prefixer> {
        Some(self)
    }
}

impl Prefixer for App {
    fn prefix(&self) -> &str {
        EXTENSION_PREFIX
    }

    fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A repeatable, comma-separated list of tags.
#[derive(Debug, Clone, Default)]
pub struct Tags(pub Vec<String>);

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl CustomValue for Tags {
    fn set(&mut self, token: &str) -> Result<(), BoxError> {
        for tag in token.split(',').map(str::trim) {
            if tag.is_empty() {
                return Err("empty tag".into());
            }
            self.0.push(tag.to_string());
        }
        Ok(())
    }
}

/// Finds the usage error behind `err`, looking through nested `run` calls.
pub fn usage_of(err: &RunError) -> Option<&UsageError> {
    err.usage().or_else(|| {
        err.handler_error()
            .and_then(|e| e.downcast_ref::<RunError>())
            .and_then(usage_of)
    })
}

fn roster(ctx: &Context) -> anyhow::Result<&Roster> {
    ctx.state().get_required::<Roster>()
}

fn describe(e: &Employee) -> String {
    let mut line = format!("{:<8} {}", e.name, e.title);
    if e.manager {
        line.push_str(" (manager)");
    }
    if !e.tags.is_empty() {
        line.push_str(&format!(" [{}]", e.tags.join(", ")));
    }
    line
}

fn list(ctx: Context, managers: bool, reverse: bool, _rest: Vec<String>) -> anyhow::Result<()> {
    if let Some(flags) = ctx.flag_set() {
        for flag in flags.visit_set() {
            debug!(flag = %flag.name, value = %flag.value, "flag given");
        }
    }

    let mut employees = roster(&ctx)?.snapshot();
    employees.retain(|e| !managers || e.manager);
    employees.sort_by(|a, b| a.name.cmp(&b.name));
    if reverse {
        employees.reverse();
    }
    for e in &employees {
        println!("{}", describe(e));
    }
    Ok(())
}

fn add(
    ctx: Context,
    manager: bool,
    title: String,
    name: String,
    _rest: Vec<String>,
) -> anyhow::Result<()> {
    roster(&ctx)?.add(Employee {
        name: name.clone(),
        title,
        manager,
        tags: Vec::new(),
    })?;
    println!("added {name}");
    Ok(())
}

fn show(ctx: Context, name: String, _rest: Vec<String>) -> anyhow::Result<()> {
    let employee = roster(&ctx)?
        .find(&name)
        .with_context(|| format!("no employee named {name}"))?;
    print!("{}", serde_yaml::to_string(&employee)?);
    Ok(())
}

fn tag(
    ctx: Context,
    tags: Box<dyn CustomValue>,
    name: String,
    _rest: Vec<String>,
) -> anyhow::Result<()> {
    let tags = tags
        .downcast_ref::<Tags>()
        .context("tags flag has an unexpected type")?;
    anyhow::ensure!(!tags.0.is_empty(), "no tags given, use -tags");
    roster(&ctx)?.tag(&name, &tags.0)?;
    println!("tagged {name}: {tags}");
    Ok(())
}

fn wait(ctx: Context, delay: Duration, label: String, _rest: Rest) -> anyhow::Result<()> {
    let deadline = Instant::now() + delay;
    while Instant::now() < deadline {
        anyhow::ensure!(!ctx.is_cancelled(), "cancelled");
        let left = deadline.saturating_duration_since(Instant::now());
        thread::sleep(left.min(Duration::from_millis(50)));
    }
    println!("{label}");
    Ok(())
}

fn team_commands() -> Map {
    Commands::new()
        .command(
            "size",
            "count employees",
            |ctx: Context, _rest: Vec<String>| -> anyhow::Result<()> {
                println!("{}", roster(&ctx)?.snapshot().len());
                Ok(())
            },
            vec![],
        )
        .command(
            "managers",
            "list managers",
            |ctx: Context, _rest: Vec<String>| -> anyhow::Result<()> {
                for e in roster(&ctx)?.snapshot().iter().filter(|e| e.manager) {
                    println!("{}", e.name);
                }
                Ok(())
            },
            vec![],
        )
        .build()
}

fn team(ctx: Context, rest: Vec<String>) -> anyhow::Result<()> {
    subcmd::run(&ctx, &team_commands(), rest.as_slice())?;
    Ok(())
}
