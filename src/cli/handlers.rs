use super::commands::{BatchLine, Cli, Commands, ListCmd, SessionArgs, TaskCmd};
use crate::app::Service;
use crate::config;
use crate::domain::{archive_line, list_line, task_line, Direction};
use crate::error::ServiceError;
use crate::persistence;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Entry point for a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    if cli.command == Commands::Init {
        let current_dir = std::env::current_dir().context("Could not determine current directory")?;
        let data_dir = config::init_local_data_dir(&current_dir)?;
        println!("Initialized data directory: {}", data_dir.display());
        return Ok(());
    }

    let path = config::state_file(cli.file)?;
    let mut session = Session::open(&path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.command == Commands::Batch {
        let stdin = io::stdin();
        session.run_batch(stdin.lock(), &mut out)
    } else {
        session.execute(cli.command, &mut out)
    }
}

/// A loaded service bound to the state file it autosaves to
pub struct Session {
    path: PathBuf,
    service: Service,
}

impl Session {
    /// Load the state file, recovering from a corrupt one when possible
    pub fn open(path: &Path) -> Result<Self> {
        let (state, status) = persistence::load_with_recovery(path)
            .with_context(|| format!("Failed to load state from {}", path.display()))?;
        if let Some(message) = status {
            eprintln!("{}", message);
        }
        Ok(Self {
            path: path.to_path_buf(),
            service: Service::new(state),
        })
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Run one command, persisting the state if it changed.
    ///
    /// Ordering boundaries and empty operations are reported as a notice and
    /// count as success.
    pub fn execute(&mut self, command: Commands, out: &mut dyn Write) -> Result<()> {
        let mutates = command.mutates();
        match self.apply(command, out) {
            Ok(()) => {
                if mutates {
                    persistence::autosave(&self.path, &self.service.state())
                        .with_context(|| format!("Failed to save state to {}", self.path.display()))?;
                }
                Ok(())
            }
            Err(err) => {
                if let Some(e) = err.downcast_ref::<ServiceError>() {
                    if e.kind().is_benign() {
                        eprintln!("note: {}", e);
                        return Ok(());
                    }
                }
                Err(err)
            }
        }
    }

    /// Run commands line by line; blank lines and `#` comments are skipped.
    /// Stops at the first failing line.
    pub fn run_batch(&mut self, input: impl BufRead, out: &mut dyn Write) -> Result<()> {
        for (idx, line) in input.lines().enumerate() {
            let line = line.context("Failed to read batch input")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let command = BatchLine::try_parse_from(line.split_whitespace())
                .map_err(|e| anyhow::anyhow!("line {}: {}", idx + 1, e))?
                .command;
            if matches!(command, Commands::Init | Commands::Batch) {
                anyhow::bail!("line {}: command not available in batch mode", idx + 1);
            }
            self.execute(command, out)
                .with_context(|| format!("line {}", idx + 1))?;
        }
        Ok(())
    }

    fn apply(&mut self, command: Commands, out: &mut dyn Write) -> Result<()> {
        let svc = &mut self.service;
        match command {
            Commands::Init | Commands::Batch => anyhow::bail!("command not available here"),
            Commands::Lists => {
                for list in svc.lists() {
                    writeln!(out, "{}", list_line(&list))?;
                }
            }
            Commands::List(cmd) => apply_list(svc, cmd, out)?,
            Commands::Tasks { list: Some(list_id) } => {
                svc.get_list(&list_id)?;
                for task in svc.tasks(&list_id) {
                    writeln!(out, "{}", task_line(&task))?;
                }
            }
            Commands::Tasks { list: None } => {
                for list in svc.lists() {
                    writeln!(out, "{}", list_line(&list))?;
                    for task in svc.tasks(&list.id) {
                        writeln!(out, "  {}", task_line(&task))?;
                    }
                }
            }
            Commands::Task(cmd) => apply_task(svc, cmd, out)?,
            Commands::Show => {
                for task in svc.filtered_tasks() {
                    writeln!(out, "{}", task_line(&task))?;
                }
            }
            Commands::ClearDone(r) => {
                let count = svc.clear_completed_to_archive(&r.list)?;
                writeln!(out, "archived {} task(s)", count)?;
            }
            Commands::ArchiveAll(r) => {
                let count = svc.archive_all_to_archive(&r.list)?;
                writeln!(out, "archived {} task(s)", count)?;
            }
            Commands::DeleteAll(r) => {
                let count = svc.delete_all_tasks(&r.list)?;
                writeln!(out, "deleted {} task(s)", count)?;
            }
            Commands::History { list } => {
                for entry in svc.archived_for_list(list.as_deref().unwrap_or(""))? {
                    writeln!(out, "{}", archive_line(&entry))?;
                }
            }
            Commands::Filter { value } => {
                let filter = svc.set_filter(&value)?;
                writeln!(out, "filter: {}", filter)?;
            }
            Commands::Search { query } => {
                svc.set_query(&query.join(" "));
                writeln!(out, "query: {}", svc.state().query)?;
            }
            Commands::Session(args) => apply_session(svc, args, out)?,
            Commands::Undo => {
                svc.undo()?;
                writeln!(out, "undone")?;
            }
        }
        Ok(())
    }
}

fn apply_list(svc: &mut Service, cmd: ListCmd, out: &mut dyn Write) -> Result<()> {
    let list = match cmd {
        ListCmd::Add { name, color } => svc.create_list(&name.join(" "), &color)?,
        ListCmd::Rename { id, name, color } => svc.update_list(&id, &name.join(" "), &color)?,
        ListCmd::Rm { id } => {
            svc.delete_list(&id)?;
            writeln!(out, "deleted list {}", id)?;
            return Ok(());
        }
        ListCmd::Up { id } => svc.move_list(&id, Direction::Up)?,
        ListCmd::Down { id } => svc.move_list(&id, Direction::Down)?,
    };
    writeln!(out, "{}", list_line(&list))?;
    Ok(())
}

fn apply_task(svc: &mut Service, cmd: TaskCmd, out: &mut dyn Write) -> Result<()> {
    let task = match cmd {
        TaskCmd::Add { list, text } => svc.create_task(&list, &text.join(" "))?,
        TaskCmd::Edit { id, text } => svc.update_task(&id, &text.join(" "))?,
        TaskCmd::Rm { id } => {
            svc.delete_task(&id)?;
            writeln!(out, "deleted task {}", id)?;
            return Ok(());
        }
        TaskCmd::Toggle { id } => svc.toggle_done(&id)?,
        TaskCmd::Priority { id, level } => svc.set_task_priority(&id, level)?,
        TaskCmd::Up { id } => svc.move_task(&id, Direction::Up)?,
        TaskCmd::Down { id } => svc.move_task(&id, Direction::Down)?,
    };
    writeln!(out, "{}", task_line(&task))?;
    Ok(())
}

fn apply_session(svc: &mut Service, args: SessionArgs, out: &mut dyn Write) -> Result<()> {
    svc.set_session_context(&args.list, &args.focus)?;
    if args.onboarded {
        svc.mark_onboarding_seen();
    }
    let session = svc.state().metadata.session;
    writeln!(out, "active list: {}", session.active_list_id)?;
    writeln!(out, "focus: {}", session.focus)?;
    Ok(())
}
