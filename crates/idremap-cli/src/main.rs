//! idremap: remap a container account's UID/GID in /etc/passwd and /etc/group.

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use idremap_core::precondition::{ensure_permitted, HostEnvironment};
use idremap_core::{apply, FileSet, UpdateRequest};
use tracing_subscriber::EnvFilter;

const LONG_ABOUT: &str = "\
Changes the numeric ids of an existing user and group inside a container's
/etc/passwd and /etc/group, so file ownership on bind mounts lines up with
the host. The account itself is left alone: only the id fields of its
lines are rewritten. The previous generation of each file is kept as a
.backup sibling.

Must run as the superuser, inside a container.";

#[derive(Debug, Parser)]
#[command(name = "idremap", version, about = "Adapt a container's account files to host ids", long_about = LONG_ABOUT)]
struct Cli {
    /// Existing user name from /etc/passwd. Must respect [a-z_][a-z0-9_]{0,30}
    username: Option<String>,

    /// New user id, in the range 0-2147483647
    uid: Option<String>,

    /// Existing group name from /etc/group. Must respect [a-z_][a-z0-9_]{0,30}
    groupname: Option<String>,

    /// New group id, in the range 0-2147483647
    gid: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let (username, uid, groupname, gid) =
        match (&cli.username, &cli.uid, &cli.groupname, &cli.gid) {
            (None, None, None, None) => {
                // Bare invocation is a request for the help page.
                let _ = Cli::command().print_help();
                return ExitCode::SUCCESS;
            }
            (Some(username), Some(uid), Some(groupname), Some(gid)) => {
                (username, uid, groupname, gid)
            }
            _ => {
                eprintln!("idremap: expected <username> <uid> <groupname> <gid>");
                return ExitCode::FAILURE;
            }
        };

    match run(username, uid, groupname, gid) {
        Ok(applied) => {
            println!(
                "Passwd and group updated for user {}({}) with uid:{} and gid:{}",
                applied.username, applied.groupname, applied.uid, applied.gid
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("idremap: {err:#}. Aborted");
            ExitCode::FAILURE
        }
    }
}

/// The four values a successful run applied, for the confirmation line.
struct Applied {
    username: String,
    uid: String,
    groupname: String,
    gid: String,
}

fn run(username: &str, uid: &str, groupname: &str, gid: &str) -> anyhow::Result<Applied> {
    ensure_permitted(&HostEnvironment).context("unable to update account files")?;

    let request = UpdateRequest::new(username, uid, groupname, gid)?;
    let files = FileSet::system();
    apply(&request, &files).with_context(|| {
        format!(
            "unable to update {} and {}",
            files.accounts().path().display(),
            files.groups().path().display()
        )
    })?;

    Ok(Applied {
        username: request.user().to_string(),
        uid: request.uid().to_string(),
        groupname: request.group().to_string(),
        gid: request.gid().to_string(),
    })
}
