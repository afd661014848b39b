//! Implementation of the `stitch jobs` command.
//!
//! Every job is spawned before any is waited on, so the jobs run in parallel. The
//! batch is then joined in the order given; a failing job does not stop the others.

use std::ffi::OsString;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use stitch_lib::{Cmd, Procs, TempArena, TempStr, procs_wait_and_reset};

use crate::output::{format_duration, print_error, print_info, print_success};

/// Separator between jobs on the command line.
const JOB_SEPARATOR: &str = ":::";

pub fn cmd_jobs(args: Vec<OsString>) -> Result<bool> {
  let jobs = split_jobs(args)?;
  let start = Instant::now();

  let mut arena = TempArena::new();
  let mut labels: Vec<TempStr> = Vec::with_capacity(jobs.len());
  let mut procs = Procs::with_capacity(jobs.len());

  let checkpoint = arena.save();
  for (i, job) in jobs.iter().enumerate() {
    let label = arena
      .sprintf(format_args!("[{}/{}] {}", i + 1, jobs.len(), job))
      .context("Failed to format job label")?;
    labels.push(label);
    procs.push(job.run_async());
  }

  for label in &labels {
    if let Some(label) = arena.get(*label) {
      print_info(label);
    }
  }
  arena.rewind(checkpoint);

  let success = procs_wait_and_reset(&mut procs);
  let elapsed = format_duration(start.elapsed());
  if success {
    print_success(&format!("{} job(s) finished in {}", jobs.len(), elapsed));
  } else {
    print_error(&format!("one or more of {} job(s) failed after {}", jobs.len(), elapsed));
  }

  Ok(success)
}

fn split_jobs(args: Vec<OsString>) -> Result<Vec<Cmd>> {
  let mut jobs = vec![Cmd::new()];
  for arg in args {
    if arg == JOB_SEPARATOR {
      jobs.push(Cmd::new());
    } else if let Some(job) = jobs.last_mut() {
      job.arg(arg);
    }
  }

  if let Some(position) = jobs.iter().position(Cmd::is_empty) {
    bail!("Job {} is empty", position + 1);
  }
  Ok(jobs)
}
